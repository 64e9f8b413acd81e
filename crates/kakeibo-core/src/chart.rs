//! Line chart description, rendered client side by Plotly.js
//!
//! Field names follow the Plotly figure schema so the JSON can be handed to
//! `Plotly.newPlot` unchanged.

use kakeibo_config::Config;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::dashboard::DashboardTable;
use crate::types::SeriesKind;

pub const X_AXIS_TITLE: &str = "取引日";
pub const X_TICK_ANGLE: i32 = 45;

/// Presentation settings taken from the `dashboard` config section
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChartSettings {
    pub title: String,
    pub tick_prefix: String,
    pub tick_suffix: String,
}

impl ChartSettings {
    pub fn from_config(config: &Config) -> Self {
        Self {
            title: config.dashboard.title.clone(),
            tick_prefix: config.dashboard.tick_prefix.clone(),
            tick_suffix: config.dashboard.tick_suffix.clone(),
        }
    }
}

impl Default for ChartSettings {
    fn default() -> Self {
        Self::from_config(&Config::default())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Trace {
    #[serde(rename = "type")]
    pub kind: String,
    pub mode: String,
    pub name: String,
    pub x: Vec<String>,
    pub y: Vec<Decimal>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AxisTitle {
    pub text: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct XAxis {
    pub title: AxisTitle,
    pub tickangle: i32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct YAxis {
    pub tickprefix: String,
    pub ticksuffix: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Layout {
    pub title: AxisTitle,
    pub showlegend: bool,
    pub xaxis: XAxis,
    pub yaxis: YAxis,
}

/// Figure with one line per selected series
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChartSpec {
    pub data: Vec<Trace>,
    pub layout: Layout,
}

impl ChartSpec {
    pub fn series_names(&self) -> Vec<&str> {
        self.data.iter().map(|t| t.name.as_str()).collect()
    }
}

/// Build the figure for a selection, in selection order.
///
/// Returns `None` when nothing is selected so the caller can render an
/// empty placeholder instead of an empty figure.
pub fn chart_spec(
    table: &DashboardTable,
    selected: &[SeriesKind],
    settings: &ChartSettings,
) -> Option<ChartSpec> {
    if selected.is_empty() {
        return None;
    }

    let x = table.dates();
    let data = selected
        .iter()
        .map(|kind| Trace {
            kind: "scatter".to_string(),
            mode: "lines".to_string(),
            name: kind.label().to_string(),
            x: x.clone(),
            y: table.series(*kind),
        })
        .collect();

    Some(ChartSpec {
        data,
        layout: Layout {
            title: AxisTitle {
                text: settings.title.clone(),
            },
            showlegend: true,
            xaxis: XAxis {
                title: AxisTitle {
                    text: X_AXIS_TITLE.to_string(),
                },
                tickangle: X_TICK_ANGLE,
            },
            yaxis: YAxis {
                tickprefix: settings.tick_prefix.clone(),
                ticksuffix: settings.tick_suffix.clone(),
            },
        },
    })
}
