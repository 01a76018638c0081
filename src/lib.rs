//! Sloscope - SLO metrics-query and dashboard-generation engine
//!
//! Given a service's metric namespace and declarative SLO parameters, this
//! library deterministically produces PromQL query strings (availability,
//! success rate, percentile latency, burn rate) and structured dashboard
//! panel definitions that embed them with correct visual encoding.
//!
//! Everything is pure and synchronous: no queries are executed, no backend
//! is contacted, no dashboard is rendered. The provisioning layer supplies a
//! namespace and datasource identifier and consumes the generated documents.
//!
//! ```rust
//! use sloscope::config::SloConfig;
//! use sloscope::dashboard::service_slo_dashboard;
//!
//! let config = SloConfig {
//!     namespace: "checkout".to_string(),
//!     ..SloConfig::default()
//! };
//! let dashboard = service_slo_dashboard(&config).unwrap();
//! assert!(!dashboard.panels.is_empty());
//! ```

pub mod config;
pub mod dashboard;
pub mod error;
pub mod panel;
pub mod query;

pub use error::EngineError;
