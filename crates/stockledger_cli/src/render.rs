//! Chart renderer that writes the bar-chart plan as a JSON document.

use anyhow::{Context, Result};
use std::path::PathBuf;
use stockledger_core::{BarChart, ChartRenderer};

pub struct JsonFileRenderer {
    path: PathBuf,
}

impl JsonFileRenderer {
    pub fn new(path: PathBuf) -> Self {
        Self { path }
    }
}

impl ChartRenderer for JsonFileRenderer {
    type Output = PathBuf;
    type Error = anyhow::Error;

    fn render(&self, chart: &BarChart) -> Result<PathBuf> {
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("failed to create chart directory {}", parent.display()))?;
        }
        let json = chart.to_json().context("failed to serialize chart")?;
        std::fs::write(&self.path, json)
            .with_context(|| format!("failed to write chart to {}", self.path.display()))?;
        Ok(self.path.clone())
    }
}
