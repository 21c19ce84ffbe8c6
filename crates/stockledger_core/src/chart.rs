//! Bar-chart plan for the current stock levels view.
//!
//! # Responsibility
//! - Describe the chart a renderer should draw, without drawing it.
//! - Signal "no data" explicitly so an empty chart is never produced.
//!
//! # Invariants
//! - `BarChart::bars` is never empty.
//! - Bar order is the order of the input levels.

use crate::projection::LevelEntry;
use serde::{Deserialize, Serialize};

pub const CHART_TITLE: &str = "Current Stock Levels";
pub const CHART_X_LABEL: &str = "Item Name";
pub const CHART_Y_LABEL: &str = "Current Quantity";
pub const CHART_LABEL_ROTATION_DEG: u16 = 45;

/// Horizontal anchoring of x-axis tick labels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LabelAlign {
    Center,
    Right,
}

impl LabelAlign {
    /// Upright labels sit centered under their bar; tilted labels end at it.
    pub fn for_rotation(degrees: u16) -> Self {
        if degrees % 180 == 0 {
            Self::Center
        } else {
            Self::Right
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Bar {
    pub label: String,
    pub value: i64,
}

/// Renderer-facing description of the current-levels bar chart.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BarChart {
    pub title: String,
    pub x_label: String,
    pub y_label: String,
    pub label_rotation_deg: u16,
    pub label_align: LabelAlign,
    /// Largest bar value; renderers use it to scale the y axis.
    pub max_quantity: i64,
    pub bars: Vec<Bar>,
}

impl BarChart {
    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }
}

/// Outcome of planning a chart from current levels.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ChartPlan {
    /// The ledger holds no observations; nothing must be rendered.
    NoData,
    Bars(BarChart),
}

/// Builds the chart plan for an ordered current-level tabulation.
pub fn plan_chart(levels: &[LevelEntry]) -> ChartPlan {
    if levels.is_empty() {
        return ChartPlan::NoData;
    }

    let bars: Vec<Bar> = levels
        .iter()
        .map(|entry| Bar {
            label: entry.item_name.clone(),
            value: entry.quantity,
        })
        .collect();
    let max_quantity = bars.iter().map(|bar| bar.value).max().unwrap_or(0);

    ChartPlan::Bars(BarChart {
        title: CHART_TITLE.to_string(),
        x_label: CHART_X_LABEL.to_string(),
        y_label: CHART_Y_LABEL.to_string(),
        label_rotation_deg: CHART_LABEL_ROTATION_DEG,
        label_align: LabelAlign::for_rotation(CHART_LABEL_ROTATION_DEG),
        max_quantity,
        bars,
    })
}

/// External collaborator that turns a chart plan into an artifact
/// (image file, JSON document, terminal drawing).
pub trait ChartRenderer {
    type Output;
    type Error;

    fn render(&self, chart: &BarChart) -> Result<Self::Output, Self::Error>;
}

/// Result of a gated render request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ChartOutcome<T> {
    NoData,
    Rendered(T),
}

impl ChartPlan {
    /// Invokes `renderer` only when there is at least one bar.
    pub fn render_with<R: ChartRenderer>(
        &self,
        renderer: &R,
    ) -> Result<ChartOutcome<R::Output>, R::Error> {
        match self {
            Self::NoData => Ok(ChartOutcome::NoData),
            Self::Bars(chart) => renderer.render(chart).map(ChartOutcome::Rendered),
        }
    }
}
