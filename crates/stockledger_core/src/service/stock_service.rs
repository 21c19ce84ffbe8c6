//! Stock ledger use-case service.
//!
//! # Responsibility
//! - Validate and record observations.
//! - Serve current-level views and the chart plan from a full scan.
//!
//! # Invariants
//! - Validation happens before any storage call; a rejected observation
//!   never reaches the repository.
//! - Read operations never write.
//! - Log events carry ids and counts only, never item names.

use crate::chart::{plan_chart, ChartOutcome, ChartPlan, ChartRenderer};
use crate::model::observation::{Observation, ObservationDraft, ValidationError};
use crate::projection::{
    current_levels, current_levels_ordered_by, latest_per_item, CurrentLevels, LevelEntry,
    LevelOrder,
};
use crate::repo::ledger_repo::{LedgerRepository, RepoResult};
use chrono::NaiveDate;
use log::{info, warn};

/// Use-case service over a ledger repository.
pub struct StockService<R: LedgerRepository> {
    repo: R,
}

impl<R: LedgerRepository> StockService<R> {
    pub fn new(repo: R) -> Self {
        Self { repo }
    }

    /// Records one observation from raw text input (form fields, CLI args).
    ///
    /// # Errors
    /// - `RepoError::Validation` with `MissingField`, `InvalidQuantity` or
    ///   `InvalidDate`; the ledger is left untouched.
    /// - `RepoError::Db` when storage fails.
    pub fn record_observation(
        &self,
        item_name: &str,
        quantity: &str,
        record_date: &str,
    ) -> RepoResult<Observation> {
        let draft = ObservationDraft::parse(item_name, quantity, record_date)
            .inspect_err(log_rejection)?;
        self.append(&draft)
    }

    /// Records one observation from already-typed input.
    pub fn record_observation_typed(
        &self,
        item_name: &str,
        quantity: i64,
        record_date: NaiveDate,
    ) -> RepoResult<Observation> {
        let draft =
            ObservationDraft::new(item_name, quantity, record_date).inspect_err(log_rejection)?;
        self.append(&draft)
    }

    /// Current quantity per item.
    pub fn current_levels(&self) -> RepoResult<CurrentLevels> {
        let observations = self.repo.scan_all()?;
        Ok(current_levels(&observations))
    }

    /// Current levels ordered by item name ascending.
    pub fn current_levels_ordered(&self) -> RepoResult<Vec<LevelEntry>> {
        self.current_levels_ordered_by(LevelOrder::ByItem)
    }

    pub fn current_levels_ordered_by(&self, order: LevelOrder) -> RepoResult<Vec<LevelEntry>> {
        let observations = self.repo.scan_all()?;
        Ok(current_levels_ordered_by(&observations, order))
    }

    /// Winning observation per item, ordered by item name ascending.
    pub fn latest_observations(&self) -> RepoResult<Vec<Observation>> {
        let observations = self.repo.scan_all()?;
        Ok(latest_per_item(&observations)
            .into_values()
            .cloned()
            .collect())
    }

    /// Chart plan for the current levels; `ChartPlan::NoData` on an empty ledger.
    pub fn chart_plan(&self) -> RepoResult<ChartPlan> {
        let levels = self.current_levels_ordered()?;
        let plan = plan_chart(&levels);
        info!(
            "event=chart_plan module=service status=ok bars={}",
            levels.len()
        );
        Ok(plan)
    }

    /// Plans the chart and hands it to `renderer` when there is data.
    ///
    /// The outer `Result` carries storage errors, the inner one renderer errors.
    pub fn render_chart<C: ChartRenderer>(
        &self,
        renderer: &C,
    ) -> RepoResult<Result<ChartOutcome<C::Output>, C::Error>> {
        Ok(self.chart_plan()?.render_with(renderer))
    }

    /// Number of observations stored in the ledger.
    pub fn observation_count(&self) -> RepoResult<u64> {
        self.repo.count()
    }

    fn append(&self, draft: &ObservationDraft) -> RepoResult<Observation> {
        let observation = self.repo.append(draft)?;
        info!(
            "event=observation_record module=service status=ok sequence_id={}",
            observation.sequence_id
        );
        Ok(observation)
    }
}

fn log_rejection(err: &ValidationError) {
    warn!(
        "event=observation_record module=service status=rejected reason={}",
        err.code()
    );
}
