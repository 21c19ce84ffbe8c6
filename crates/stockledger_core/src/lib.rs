//! Core domain logic for the stock ledger.
//! This crate owns the append-only observation ledger and the
//! latest-per-item projection derived from it.

pub mod chart;
pub mod db;
pub mod logging;
pub mod model;
pub mod projection;
pub mod repo;
pub mod service;

pub use chart::{plan_chart, Bar, BarChart, ChartOutcome, ChartPlan, ChartRenderer};
pub use logging::{default_log_level, init_logging, logging_status, LoggingError};
pub use model::observation::{
    Observation, ObservationDraft, ObservationField, SequenceId, ValidationError,
};
pub use projection::{
    current_levels, current_levels_ordered, current_levels_ordered_by, latest_per_item,
    CurrentLevels, LevelEntry, LevelOrder,
};
pub use repo::ledger_repo::{LedgerRepository, RepoError, RepoResult, SqliteLedgerRepository};
pub use service::stock_service::StockService;

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
