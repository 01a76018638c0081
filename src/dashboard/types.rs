//! Dashboard document type

use crate::panel::Panel;
use serde::{Deserialize, Serialize};

/// One persistable dashboard document.
///
/// The shape round-trips through JSON without loss; the provisioning layer
/// serializes it as the body of a dashboard-provisioning call. Panels are
/// owned exclusively by the document and ordered as assembled.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Dashboard {
    pub title: String,
    pub tags: Vec<String>,
    pub timezone: String,
    pub refresh: String,
    pub panels: Vec<Panel>,
}
