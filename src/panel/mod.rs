//! # Panel Factory
//!
//! Wraps a [`Metric`] into a typed [`Panel`] with the visual defaults each
//! panel kind requires: units, value bounds, threshold ladders, and stat
//! display options. Factories are pure and total over validated inputs; the
//! `datasource` and `title` strings pass through untouched.
//!
//! Panel `id` fields are assigned later by the dashboard assembler; factory
//! output carries `id: 0` until placed into a document.

pub mod types;

pub use types::{
    ColorConfig, FieldConfig, FieldDefaults, GridPos, Panel, PanelType, ReduceOptions,
    StatOptions, Target, ThresholdMode, ThresholdStep, Thresholds,
};

use crate::error::EngineError;
use serde::{Deserialize, Serialize};

/// A built PromQL query paired with its display label and optional
/// color-coding ladder.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Metric {
    pub query: String,
    pub label: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub thresholds: Option<Thresholds>,
}

impl Metric {
    /// Pair a query with its display label.
    ///
    /// # Errors
    ///
    /// Returns [`EngineError::EmptyQuery`] for an empty or whitespace-only
    /// query; a dashboard must never render a panel with an empty target.
    pub fn new(query: impl Into<String>, label: impl Into<String>) -> Result<Self, EngineError> {
        let query = query.into();
        let label = label.into();
        if query.trim().is_empty() {
            return Err(EngineError::EmptyQuery { label });
        }
        Ok(Self {
            query,
            label,
            thresholds: None,
        })
    }

    /// Attach a color ladder used by stat panels.
    pub fn with_thresholds(mut self, thresholds: Thresholds) -> Self {
        self.thresholds = Some(thresholds);
        self
    }
}

fn target(metric: &Metric) -> Target {
    Target {
        expr: metric.query.clone(),
        legend_format: metric.label.clone(),
        ref_id: "A".to_string(),
    }
}

/// Stat panel on a 0-100 percent scale.
///
/// Thresholds come from the metric when present and are omitted entirely
/// otherwise (no empty thresholds object in the JSON).
pub fn stat_percentage_panel(
    title: impl Into<String>,
    position: GridPos,
    datasource: impl Into<String>,
    metric: &Metric,
) -> Panel {
    Panel {
        id: 0,
        title: title.into(),
        panel_type: PanelType::Stat,
        grid_pos: position,
        datasource: datasource.into(),
        targets: vec![target(metric)],
        field_config: FieldConfig {
            defaults: FieldDefaults {
                unit: Some("percent".to_string()),
                min: Some(0.0),
                max: Some(100.0),
                thresholds: metric.thresholds.clone(),
                color: metric.thresholds.as_ref().map(|_| ColorConfig::thresholds()),
            },
        },
        options: Some(StatOptions::last_value()),
    }
}

/// Timeseries panel with caller-supplied unit and bounds.
///
/// `None` for any of `unit`/`min`/`max` means "auto" to the consumer and is
/// left out of the serialized field config.
pub fn time_series_panel(
    title: impl Into<String>,
    position: GridPos,
    datasource: impl Into<String>,
    metric: &Metric,
    unit: Option<&str>,
    min: Option<f64>,
    max: Option<f64>,
) -> Panel {
    Panel {
        id: 0,
        title: title.into(),
        panel_type: PanelType::Timeseries,
        grid_pos: position,
        datasource: datasource.into(),
        targets: vec![target(metric)],
        field_config: FieldConfig {
            defaults: FieldDefaults {
                unit: unit.map(str::to_string),
                min,
                max,
                thresholds: metric.thresholds.clone(),
                color: None,
            },
        },
        options: None,
    }
}

/// Timeseries panel fixed to the 0-100 percent scale.
pub fn time_series_percentage_panel(
    title: impl Into<String>,
    position: GridPos,
    datasource: impl Into<String>,
    metric: &Metric,
) -> Panel {
    time_series_panel(
        title,
        position,
        datasource,
        metric,
        Some("percent"),
        Some(0.0),
        Some(100.0),
    )
}

/// Stat panel encoding the burn-rate convention.
///
/// A burn rate of 1 consumes the error budget exactly as allotted, so the
/// ladder is fixed: green below 1, orange at 1, red at 2. Displays the last
/// value with value-only coloring.
pub fn burn_rate_panel(
    title: impl Into<String>,
    position: GridPos,
    datasource: impl Into<String>,
    metric: &Metric,
) -> Panel {
    let ladder = Thresholds {
        mode: ThresholdMode::Absolute,
        steps: vec![
            ThresholdStep::Base {
                color: "green".to_string(),
            },
            ThresholdStep::At {
                value: 1.0,
                color: "orange".to_string(),
            },
            ThresholdStep::At {
                value: 2.0,
                color: "red".to_string(),
            },
        ],
    };
    Panel {
        id: 0,
        title: title.into(),
        panel_type: PanelType::Stat,
        grid_pos: position,
        datasource: datasource.into(),
        targets: vec![target(metric)],
        field_config: FieldConfig {
            defaults: FieldDefaults {
                unit: None,
                min: None,
                max: None,
                thresholds: Some(ladder),
                color: Some(ColorConfig::thresholds()),
            },
        },
        options: Some(StatOptions::last_value()),
    }
}
