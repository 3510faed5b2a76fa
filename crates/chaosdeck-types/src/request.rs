//! Request bodies for the two dispatch endpoints.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Body of `POST /api/action`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ActionRequest {
    pub action: String,
    #[serde(default)]
    pub params: BTreeMap<String, String>,
    /// Opt-in switches for verification families the service may bundle
    /// with the action (e.g. a heavyweight virtualization test family).
    /// An empty map requests none and stays off the wire.
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub tests: BTreeMap<String, bool>,
}

impl ActionRequest {
    pub fn new(action: impl Into<String>) -> Self {
        Self {
            action: action.into(),
            params: BTreeMap::new(),
            tests: BTreeMap::new(),
        }
    }
}

/// Body of `POST /api/functest`. Parameter values are strings or numbers,
/// exactly as collected from the form.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FuncTestRequest {
    pub key: String,
    #[serde(default)]
    pub params: BTreeMap<String, serde_json::Value>,
}
