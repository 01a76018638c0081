//! Panel data structures with Grafana-compatible JSON shapes
//!
//! Field names follow the dashboard document contract (`gridPos`,
//! `legendFormat`, `refId`, `fieldConfig`); everything round-trips through
//! JSON without loss. Absent optional fields are skipped entirely so a panel
//! never serializes an empty `thresholds` or `options` object.

use crate::error::EngineError;
use serde::{Deserialize, Serialize};

/// Renderable panel kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PanelType {
    Stat,
    Timeseries,
}

/// Rectangle a panel occupies, in dashboard grid units (24 columns wide).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct GridPos {
    pub x: u32,
    pub y: u32,
    pub w: u32,
    pub h: u32,
}

impl GridPos {
    /// Whether two rectangles share any grid cell.
    pub fn overlaps(&self, other: &GridPos) -> bool {
        self.x < other.x + other.w
            && other.x < self.x + self.w
            && self.y < other.y + other.h
            && other.y < self.y + self.h
    }
}

/// One query bound to a panel.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Target {
    pub expr: String,
    #[serde(rename = "legendFormat")]
    pub legend_format: String,
    #[serde(rename = "refId")]
    pub ref_id: String,
}

/// Threshold evaluation mode. Only absolute ladders are produced.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ThresholdMode {
    Absolute,
}

/// One rung of a color ladder.
///
/// `Base` is the default color below every bound and serializes with
/// `"value": null`; `At` colors everything at or above its bound. Modeling
/// the sentinel as a variant instead of a nullable number keeps "no bound"
/// unambiguous in the API while preserving the wire shape.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(from = "ThresholdStepRepr", into = "ThresholdStepRepr")]
pub enum ThresholdStep {
    Base { color: String },
    At { value: f64, color: String },
}

impl ThresholdStep {
    /// The bound, if this step has one.
    pub fn value(&self) -> Option<f64> {
        match self {
            ThresholdStep::Base { .. } => None,
            ThresholdStep::At { value, .. } => Some(*value),
        }
    }

    /// The color applied from this step upward.
    pub fn color(&self) -> &str {
        match self {
            ThresholdStep::Base { color } | ThresholdStep::At { color, .. } => color,
        }
    }
}

/// Wire shape of a threshold step: `{"color": ..., "value": <number|null>}`.
#[derive(Serialize, Deserialize)]
struct ThresholdStepRepr {
    color: String,
    value: Option<f64>,
}

impl From<ThresholdStepRepr> for ThresholdStep {
    fn from(repr: ThresholdStepRepr) -> Self {
        match repr.value {
            None => ThresholdStep::Base { color: repr.color },
            Some(value) => ThresholdStep::At {
                value,
                color: repr.color,
            },
        }
    }
}

impl From<ThresholdStep> for ThresholdStepRepr {
    fn from(step: ThresholdStep) -> Self {
        ThresholdStepRepr {
            value: step.value(),
            color: step.color().to_string(),
        }
    }
}

/// A validated color ladder: one base step followed by ascending bounds.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Thresholds {
    pub mode: ThresholdMode,
    pub steps: Vec<ThresholdStep>,
}

impl Thresholds {
    /// Build a ladder from a base color and `(bound, color)` rungs.
    ///
    /// The base step is created here, so exactly one exists by construction.
    ///
    /// # Errors
    ///
    /// Returns [`EngineError::ThresholdOrder`] when a bound is not strictly
    /// above its predecessor (index counts the bounded rungs from zero).
    pub fn new(
        base_color: impl Into<String>,
        bounds: Vec<(f64, String)>,
    ) -> Result<Self, EngineError> {
        let mut previous: Option<f64> = None;
        for (index, (value, _)) in bounds.iter().enumerate() {
            if previous.is_some_and(|p| *value <= p) {
                return Err(EngineError::ThresholdOrder { index });
            }
            previous = Some(*value);
        }

        let mut steps = Vec::with_capacity(bounds.len() + 1);
        steps.push(ThresholdStep::Base {
            color: base_color.into(),
        });
        steps.extend(
            bounds
                .into_iter()
                .map(|(value, color)| ThresholdStep::At { value, color }),
        );
        Ok(Self {
            mode: ThresholdMode::Absolute,
            steps,
        })
    }
}

/// Per-field display defaults (unit, bounds, color rules).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FieldDefaults {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub unit: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub min: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub thresholds: Option<Thresholds>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub color: Option<ColorConfig>,
}

/// Field color source.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ColorConfig {
    pub mode: String,
}

impl ColorConfig {
    /// Color values by the threshold ladder.
    pub fn thresholds() -> Self {
        Self {
            mode: "thresholds".to_string(),
        }
    }
}

/// Wrapper matching the `fieldConfig: {defaults: {...}}` document shape.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FieldConfig {
    pub defaults: FieldDefaults,
}

/// Value-reduction settings for stat panels.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReduceOptions {
    pub calcs: Vec<String>,
    pub values: bool,
}

/// Display options for stat panels.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StatOptions {
    #[serde(rename = "reduceOptions")]
    pub reduce_options: ReduceOptions,
    #[serde(rename = "colorMode")]
    pub color_mode: String,
    #[serde(rename = "textMode")]
    pub text_mode: String,
}

impl StatOptions {
    /// Single "last" value, value-only coloring and text.
    pub fn last_value() -> Self {
        Self {
            reduce_options: ReduceOptions {
                calcs: vec!["last".to_string()],
                values: false,
            },
            color_mode: "value".to_string(),
            text_mode: "value".to_string(),
        }
    }
}

/// One visual tile of a dashboard, immutable once assembled.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Panel {
    pub id: u32,
    pub title: String,
    #[serde(rename = "type")]
    pub panel_type: PanelType,
    #[serde(rename = "gridPos")]
    pub grid_pos: GridPos,
    pub datasource: String,
    pub targets: Vec<Target>,
    #[serde(rename = "fieldConfig")]
    pub field_config: FieldConfig,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub options: Option<StatOptions>,
}
