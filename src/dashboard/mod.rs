//! # Dashboard Assembler
//!
//! Composes panels into one persistable [`Dashboard`] document with a
//! deterministic grid layout. The assembler decides layout and composition
//! only; query content comes from the query builder and visual encoding from
//! the panel factory.
//!
//! ## Layout
//!
//! Panels tile two columns of the 24-column grid: panel `i` occupies
//! `x = (i % 2) * 12`, `y = (i / 2) * 8`, 12 columns wide, 8 rows tall.
//! Generated layouts are non-overlapping by construction.

pub mod types;

pub use types::Dashboard;

use crate::config::SloConfig;
use crate::error::EngineError;
use crate::panel::{
    burn_rate_panel, stat_percentage_panel, time_series_panel, time_series_percentage_panel,
    GridPos, Metric, Panel, Thresholds,
};
use crate::query::{
    availability_query, burn_rate_query, filtered_availability_query, latency_percentage_query,
    percentile_latency_query, success_rate_query, MetricFilter, RatioUnit,
};
use tracing::debug;

/// Panel width in grid columns (two panels per 24-column row).
const PANEL_WIDTH: u32 = 12;
/// Panel height in grid rows.
const PANEL_HEIGHT: u32 = 8;

/// Dashboard-level metadata for generic assembly.
#[derive(Debug, Clone)]
pub struct DashboardSpec {
    pub title: String,
    pub tags: Vec<String>,
    pub datasource: String,
    pub refresh: String,
    pub timezone: String,
}

impl DashboardSpec {
    /// Spec with the conventional refresh interval and timezone.
    pub fn new(title: impl Into<String>, datasource: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            tags: Vec::new(),
            datasource: datasource.into(),
            refresh: "10s".to_string(),
            timezone: "browser".to_string(),
        }
    }

    pub fn with_tags(mut self, tags: Vec<String>) -> Self {
        self.tags = tags;
        self
    }
}

/// Grid rectangle for the panel at `index` in the two-column layout.
fn grid_position(index: usize) -> GridPos {
    let index = index as u32;
    GridPos {
        x: (index % 2) * PANEL_WIDTH,
        y: (index / 2) * PANEL_HEIGHT,
        w: PANEL_WIDTH,
        h: PANEL_HEIGHT,
    }
}

/// Assign sequential ids and freeze the panel list into a document.
fn compose(spec: &DashboardSpec, mut panels: Vec<Panel>) -> Dashboard {
    for (index, panel) in panels.iter_mut().enumerate() {
        panel.id = index as u32 + 1;
    }
    debug!(
        title = %spec.title,
        panels = panels.len(),
        "assembled dashboard"
    );
    Dashboard {
        title: spec.title.clone(),
        tags: spec.tags.clone(),
        timezone: spec.timezone.clone(),
        refresh: spec.refresh.clone(),
        panels,
    }
}

/// Compose one timeseries-percentage panel per metric, in supplied order.
///
/// # Errors
///
/// Returns [`EngineError::EmptyQuery`] when any metric carries an empty
/// query; a dashboard must never render a panel with an empty target.
pub fn assemble(spec: &DashboardSpec, metrics: &[Metric]) -> Result<Dashboard, EngineError> {
    let mut panels = Vec::with_capacity(metrics.len());
    for (index, metric) in metrics.iter().enumerate() {
        if metric.query.trim().is_empty() {
            return Err(EngineError::EmptyQuery {
                label: metric.label.clone(),
            });
        }
        panels.push(time_series_percentage_panel(
            metric.label.clone(),
            grid_position(index),
            spec.datasource.clone(),
            metric,
        ));
    }
    Ok(compose(spec, panels))
}

/// Generate the full SLO dashboard for one service.
///
/// Emits the standard signal set: total availability, total success rate,
/// the configured latency percentile, and the latency-below-threshold share.
/// When `organic_filter` is configured, organic availability and success
/// rate panels are interleaved after their total counterparts. When
/// `burn_rate` is enabled, availability and success burn-rate stat panels
/// are appended last.
///
/// # Errors
///
/// Returns [`EngineError::Config`] when the configuration fails validation.
pub fn service_slo_dashboard(config: &SloConfig) -> Result<Dashboard, EngineError> {
    config.validate()?;

    let namespace = config.namespace.as_str();
    let range = config.time_range;
    let datasource = config.datasource.as_str();
    let organic = config.organic_filter.as_deref().map(MetricFilter::new);
    let organic = organic.filter(|f| !f.is_empty());

    let objective_ladder = Thresholds::new(
        "red",
        vec![(config.objective * 100.0, "green".to_string())],
    )?;

    let mut panels: Vec<Panel> = Vec::new();

    // Availability stats, total then organic.
    let metric = Metric::new(
        availability_query(namespace, range, RatioUnit::Percent),
        "Availability",
    )?
    .with_thresholds(objective_ladder.clone());
    panels.push(stat_percentage_panel(
        "Availability (total)",
        grid_position(panels.len()),
        datasource,
        &metric,
    ));
    if let Some(filter) = &organic {
        let metric = Metric::new(
            filtered_availability_query(namespace, range, Some(filter), RatioUnit::Percent),
            "Availability",
        )?
        .with_thresholds(objective_ladder.clone());
        panels.push(stat_percentage_panel(
            "Availability (organic)",
            grid_position(panels.len()),
            datasource,
            &metric,
        ));
    }

    // Success-rate timeseries, total then organic.
    let metric = Metric::new(
        success_rate_query(namespace, range, None, RatioUnit::Percent),
        "Success rate",
    )?;
    panels.push(time_series_percentage_panel(
        "Success rate (total)",
        grid_position(panels.len()),
        datasource,
        &metric,
    ));
    if let Some(filter) = &organic {
        let metric = Metric::new(
            success_rate_query(namespace, range, Some(filter), RatioUnit::Percent),
            "Success rate",
        )?;
        panels.push(time_series_percentage_panel(
            "Success rate (organic)",
            grid_position(panels.len()),
            datasource,
            &metric,
        ));
    }

    // Latency percentile in milliseconds, over the organic slice when set.
    let metric = Metric::new(
        percentile_latency_query(namespace, range, config.percentile, organic.as_ref()),
        format!("p{:.0}", config.percentile * 100.0),
    )?;
    panels.push(time_series_panel(
        format!("Latency p{:.0}", config.percentile * 100.0),
        grid_position(panels.len()),
        datasource,
        &metric,
        Some("ms"),
        None,
        None,
    ));

    // Share of requests under the latency threshold.
    let metric = Metric::new(
        latency_percentage_query(
            namespace,
            range,
            config.latency_threshold_ms,
            organic.as_ref(),
            RatioUnit::Percent,
        ),
        format!("< {} ms", config.latency_threshold_ms),
    )?;
    panels.push(time_series_percentage_panel(
        format!("Requests under {} ms", config.latency_threshold_ms),
        grid_position(panels.len()),
        datasource,
        &metric,
    ));

    // Burn-rate stats compose over the fraction-scale queries.
    if config.burn_rate {
        let metric = Metric::new(
            burn_rate_query(
                &availability_query(namespace, range, RatioUnit::Fraction),
                config.objective,
            )?,
            "Availability burn",
        )?;
        panels.push(burn_rate_panel(
            "Availability burn rate",
            grid_position(panels.len()),
            datasource,
            &metric,
        ));

        let metric = Metric::new(
            burn_rate_query(
                &success_rate_query(namespace, range, organic.as_ref(), RatioUnit::Fraction),
                config.objective,
            )?,
            "Success burn",
        )?;
        panels.push(burn_rate_panel(
            "Success burn rate",
            grid_position(panels.len()),
            datasource,
            &metric,
        ));
    }

    let spec = DashboardSpec {
        title: config.effective_title(),
        tags: config.tags.clone(),
        datasource: datasource.to_string(),
        refresh: config.refresh.clone(),
        timezone: config.timezone.clone(),
    };
    Ok(compose(&spec, panels))
}
