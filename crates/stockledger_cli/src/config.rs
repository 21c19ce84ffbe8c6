//! Resolved runtime configuration for the CLI.
//!
//! Values come from command-line flags with environment fallbacks (see
//! `main.rs`); this module only turns them into absolute, validated paths.

use anyhow::{Context, Result};
use std::path::{Path, PathBuf};

pub const DEFAULT_DB_PATH: &str = "stock.db";
pub const DEFAULT_CHART_DIR: &str = "static/images";
pub const DEFAULT_LOG_DIR: &str = "logs";
pub const CHART_FILE_NAME: &str = "stock_analysis.json";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CliConfig {
    pub db_path: PathBuf,
    pub chart_dir: PathBuf,
    pub log_level: String,
    pub log_dir: PathBuf,
}

impl CliConfig {
    pub fn resolve(
        db_path: &Path,
        chart_dir: &Path,
        log_level: Option<&str>,
        log_dir: &Path,
    ) -> Result<Self> {
        let cwd = std::env::current_dir().context("failed to read current directory")?;
        Ok(Self::resolve_against(
            &cwd, db_path, chart_dir, log_level, log_dir,
        ))
    }

    fn resolve_against(
        base: &Path,
        db_path: &Path,
        chart_dir: &Path,
        log_level: Option<&str>,
        log_dir: &Path,
    ) -> Self {
        Self {
            db_path: absolutize(base, db_path),
            chart_dir: absolutize(base, chart_dir),
            log_level: log_level
                .map(str::to_string)
                .unwrap_or_else(|| stockledger_core::default_log_level().to_string()),
            log_dir: absolutize(base, log_dir),
        }
    }

    pub fn chart_path(&self) -> PathBuf {
        self.chart_dir.join(CHART_FILE_NAME)
    }
}

fn absolutize(base: &Path, path: &Path) -> PathBuf {
    if path.is_absolute() {
        path.to_path_buf()
    } else {
        base.join(path)
    }
}
