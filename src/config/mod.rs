//! Declarative SLO configuration
//!
//! [`SloConfig`] carries every parameter the engine needs to generate a
//! service dashboard: the metric namespace, the datasource identifier, SLO
//! targets, and optional label filtering for the organic-traffic slice.
//!
//! # Configuration Precedence
//!
//! 1. Environment variables (`SLOSCOPE_*`)
//! 2. Configuration file (TOML)
//! 3. Default values (lowest priority)
//!
//! # Example
//!
//! ```rust
//! use sloscope::config::SloConfig;
//!
//! let toml = r#"
//! namespace = "checkout"
//! datasource = "prometheus"
//! objective = 0.999
//! time_range = "5m"
//! "#;
//! let config: SloConfig = toml::from_str(toml).unwrap();
//! assert_eq!(config.namespace, "checkout");
//! assert_eq!(config.objective, 0.999);
//! config.validate().unwrap();
//! ```

pub mod error;

pub use error::ConfigError;

use crate::query::TimeRange;
use serde::{Deserialize, Serialize};
use std::path::Path;
use tracing::debug;

/// Declarative SLO parameters for one service's dashboard generation.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SloConfig {
    /// Metric namespace, prefixed onto every metric name.
    pub namespace: String,
    /// Datasource identifier, passed through verbatim into every panel.
    pub datasource: String,
    /// Dashboard title; defaults to "{namespace} SLO" when empty.
    pub title: String,
    /// Ordered dashboard tags.
    pub tags: Vec<String>,
    /// Range-vector duration for every query.
    pub time_range: TimeRange,
    /// Latency quantile, in (0, 1].
    pub percentile: f64,
    /// Histogram bucket boundary for the latency-within signal, in ms.
    pub latency_threshold_ms: u32,
    /// Availability/success objective, in [0, 1).
    pub objective: f64,
    /// Label-matcher fragment selecting organic (non-synthetic) traffic.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub organic_filter: Option<String>,
    /// Whether burn-rate panels are appended to the dashboard.
    pub burn_rate: bool,
    /// Dashboard refresh interval.
    pub refresh: String,
    /// Dashboard timezone.
    pub timezone: String,
}

impl Default for SloConfig {
    fn default() -> Self {
        Self {
            namespace: String::new(),
            datasource: "prometheus".to_string(),
            title: String::new(),
            tags: Vec::new(),
            time_range: TimeRange::Minutes2,
            percentile: 0.95,
            latency_threshold_ms: 250,
            objective: 0.99,
            organic_filter: None,
            burn_rate: true,
            refresh: "10s".to_string(),
            timezone: "browser".to_string(),
        }
    }
}

impl SloConfig {
    /// Load configuration from a TOML file.
    ///
    /// If path is None, returns default configuration.
    /// If path doesn't exist, returns NotFound error.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        match path {
            Some(p) => {
                if !p.exists() {
                    return Err(ConfigError::NotFound(p.to_path_buf()));
                }
                let content = std::fs::read_to_string(p)?;
                let config: SloConfig =
                    toml::from_str(&content).map_err(|e| ConfigError::Parse(e.to_string()))?;
                debug!(path = %p.display(), namespace = %config.namespace, "loaded slo config");
                Ok(config)
            }
            None => Ok(Self::default()),
        }
    }

    /// Apply environment variable overrides.
    ///
    /// Supports SLOSCOPE_* variables for the common settings. Invalid values
    /// are silently ignored (file/default values are kept).
    pub fn with_env_overrides(mut self) -> Self {
        if let Ok(namespace) = std::env::var("SLOSCOPE_NAMESPACE") {
            self.namespace = namespace;
        }
        if let Ok(datasource) = std::env::var("SLOSCOPE_DATASOURCE") {
            self.datasource = datasource;
        }
        if let Ok(objective) = std::env::var("SLOSCOPE_OBJECTIVE") {
            if let Ok(o) = objective.parse() {
                self.objective = o;
            }
        }
        if let Ok(range) = std::env::var("SLOSCOPE_TIME_RANGE") {
            if let Ok(r) = range.parse() {
                self.time_range = r;
            }
        }
        self
    }

    /// The effective dashboard title.
    pub fn effective_title(&self) -> String {
        if self.title.is_empty() {
            format!("{} SLO", self.namespace)
        } else {
            self.title.clone()
        }
    }

    /// Validate configuration.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.namespace.is_empty() {
            return Err(ConfigError::MissingField("namespace".to_string()));
        }
        if !is_metric_prefix(&self.namespace) {
            return Err(ConfigError::Validation {
                field: "namespace".to_string(),
                message: "must match [a-zA-Z_][a-zA-Z0-9_]*".to_string(),
            });
        }
        if self.datasource.is_empty() {
            return Err(ConfigError::MissingField("datasource".to_string()));
        }
        if !(0.0..1.0).contains(&self.objective) {
            return Err(ConfigError::Validation {
                field: "objective".to_string(),
                message: format!("{} is outside [0, 1)", self.objective),
            });
        }
        if !(self.percentile > 0.0 && self.percentile <= 1.0) {
            return Err(ConfigError::Validation {
                field: "percentile".to_string(),
                message: format!("{} is outside (0, 1]", self.percentile),
            });
        }
        if self.latency_threshold_ms == 0 {
            return Err(ConfigError::Validation {
                field: "latency_threshold_ms".to_string(),
                message: "threshold must be positive".to_string(),
            });
        }
        Ok(())
    }
}

/// Prometheus metric-name prefix check: `[a-zA-Z_][a-zA-Z0-9_]*`.
fn is_metric_prefix(s: &str) -> bool {
    let mut chars = s.chars();
    match chars.next() {
        Some(c) if c.is_ascii_alphabetic() || c == '_' => {}
        _ => return false,
    }
    chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
}

#[cfg(test)]
mod tests {
    use super::*;

    fn valid_config() -> SloConfig {
        SloConfig {
            namespace: "app".to_string(),
            ..SloConfig::default()
        }
    }

    #[test]
    fn test_slo_config_defaults() {
        let config = SloConfig::default();
        assert_eq!(config.datasource, "prometheus");
        assert_eq!(config.time_range, TimeRange::Minutes2);
        assert_eq!(config.percentile, 0.95);
        assert_eq!(config.latency_threshold_ms, 250);
        assert_eq!(config.objective, 0.99);
        assert!(config.burn_rate);
        assert_eq!(config.refresh, "10s");
        assert_eq!(config.timezone, "browser");
    }

    #[test]
    fn test_config_parse_minimal_toml() {
        let toml = r#"
        namespace = "checkout"
        "#;
        let config: SloConfig = toml::from_str(toml).unwrap();
        assert_eq!(config.namespace, "checkout");
        assert_eq!(config.datasource, "prometheus"); // Default
        config.validate().unwrap();
    }

    #[test]
    fn test_config_parse_full_toml() {
        let toml = r#"
        namespace = "checkout"
        datasource = "prom-main"
        title = "Checkout SLO"
        tags = ["slo", "checkout"]
        time_range = "5m"
        percentile = 0.99
        latency_threshold_ms = 200
        objective = 0.999
        organic_filter = 'http_route=~"/api/.*"'
        burn_rate = false
        refresh = "30s"
        "#;
        let config: SloConfig = toml::from_str(toml).unwrap();
        assert_eq!(config.time_range, TimeRange::Minutes5);
        assert_eq!(config.tags, vec!["slo".to_string(), "checkout".to_string()]);
        assert_eq!(
            config.organic_filter.as_deref(),
            Some(r#"http_route=~"/api/.*""#)
        );
        assert!(!config.burn_rate);
        config.validate().unwrap();
    }

    #[test]
    fn test_config_rejects_unknown_time_range_token() {
        let toml = r#"
        namespace = "app"
        time_range = "90s"
        "#;
        assert!(toml::from_str::<SloConfig>(toml).is_err());
    }

    #[test]
    fn test_validate_missing_namespace() {
        let config = SloConfig::default();
        assert!(matches!(
            config.validate(),
            Err(ConfigError::MissingField(field)) if field == "namespace"
        ));
    }

    #[test]
    fn test_validate_malformed_namespace() {
        let config = SloConfig {
            namespace: "9checkout".to_string(),
            ..SloConfig::default()
        };
        assert!(matches!(
            config.validate(),
            Err(ConfigError::Validation { field, .. }) if field == "namespace"
        ));

        let config = SloConfig {
            namespace: "check-out".to_string(),
            ..SloConfig::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_validate_objective_bounds() {
        let mut config = valid_config();
        config.objective = 1.0;
        assert!(config.validate().is_err());
        config.objective = -0.1;
        assert!(config.validate().is_err());
        config.objective = 0.0;
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_validate_percentile_bounds() {
        let mut config = valid_config();
        config.percentile = 0.0;
        assert!(config.validate().is_err());
        config.percentile = 1.0;
        assert!(config.validate().is_ok());
        config.percentile = 1.01;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_validate_zero_latency_threshold() {
        let mut config = valid_config();
        config.latency_threshold_ms = 0;
        assert!(matches!(
            config.validate(),
            Err(ConfigError::Validation { field, .. }) if field == "latency_threshold_ms"
        ));
    }

    #[test]
    fn test_effective_title_falls_back_to_namespace() {
        let config = valid_config();
        assert_eq!(config.effective_title(), "app SLO");

        let config = SloConfig {
            title: "Custom".to_string(),
            ..valid_config()
        };
        assert_eq!(config.effective_title(), "Custom");
    }

    #[test]
    fn test_load_missing_file_is_not_found() {
        let err = SloConfig::load(Some(Path::new("/nonexistent/slo.toml"))).unwrap_err();
        assert!(matches!(err, ConfigError::NotFound(_)));
    }

    #[test]
    fn test_load_none_returns_defaults() {
        let config = SloConfig::load(None).unwrap();
        assert!(config.namespace.is_empty());
    }
}
