//! Engine error types
//!
//! Every failure in this crate is a configuration or programming defect
//! detected at construction time and surfaced synchronously. There is no
//! recoverable class: the engine performs no I/O beyond config loading.

use crate::config::ConfigError;
use thiserror::Error;

/// Fatal errors raised while building queries, panels, or dashboards.
#[derive(Error, Debug)]
pub enum EngineError {
    /// Invalid or missing SLO configuration.
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// A metric reached the panel factory or assembler without a query.
    #[error("metric '{label}' has an empty query; a panel must never render an empty target")]
    EmptyQuery { label: String },

    /// Burn-rate objective outside `[0, 1)`.
    #[error("slo objective {value} is outside [0, 1)")]
    ObjectiveOutOfRange { value: f64 },

    /// Threshold ladder step not strictly above its predecessor.
    #[error("threshold step {index} is not above the previous step")]
    ThresholdOrder { index: usize },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_messages_name_the_offender() {
        let err = EngineError::EmptyQuery {
            label: "Availability".to_string(),
        };
        assert!(err.to_string().contains("Availability"));

        let err = EngineError::ObjectiveOutOfRange { value: 1.5 };
        assert!(err.to_string().contains("1.5"));

        let err = EngineError::ThresholdOrder { index: 2 };
        assert!(err.to_string().contains('2'));
    }

    #[test]
    fn test_config_error_converts() {
        let source = ConfigError::MissingField("namespace".to_string());
        let err: EngineError = source.into();
        assert!(matches!(err, EngineError::Config(_)));
        assert!(err.to_string().contains("namespace"));
    }
}
