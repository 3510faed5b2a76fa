//! Result payloads: per-node command results and the envelopes returned by
//! `POST /api/action` and `POST /api/functest`.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Line/character counts of the *untruncated* original output. Present only
/// on truncated results; the counts are always at least what was delivered.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct OutputMeta {
    #[serde(default)]
    pub total_lines: u64,
    #[serde(default)]
    pub total_chars: u64,
}

/// Outcome of one command on one node.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NodeResult {
    #[serde(default)]
    pub node: String,
    #[serde(default)]
    pub host: String,
    #[serde(default)]
    pub cmd: Option<String>,
    #[serde(default)]
    pub exit_code: i32,
    /// Wall-clock seconds as measured by the execution service.
    #[serde(default)]
    pub elapsed: f64,
    #[serde(default)]
    pub stdout: Option<String>,
    #[serde(default)]
    pub stderr: Option<String>,
    #[serde(default)]
    pub truncated: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub stdout_meta: Option<OutputMeta>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub stderr_meta: Option<OutputMeta>,
}

impl NodeResult {
    /// Per-node success. Informational only: the envelope `ok` computed by
    /// the service is authoritative and never recomputed from this.
    pub fn succeeded(&self) -> bool {
        self.exit_code == 0
    }
}

/// Auxiliary verification run bundled with an action response when the
/// caller opted in via test flags.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BundledTest {
    pub title: String,
    pub ok: bool,
    #[serde(default)]
    pub results: Vec<NodeResult>,
}

/// Response of `POST /api/action`. `results` preserves the service's
/// iteration order verbatim.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ActionResponse {
    pub ok: bool,
    #[serde(default)]
    pub action: Option<String>,
    #[serde(default)]
    pub results: Vec<NodeResult>,
    #[serde(default)]
    pub tests: Vec<BundledTest>,
}

/// One named verification probe with one result per target node.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CheckResult {
    pub title: String,
    pub ok: bool,
    #[serde(default)]
    pub cmd: String,
    #[serde(default)]
    pub results: Vec<NodeResult>,
}

/// The bound action's portion of a functional test run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ActionOutcome {
    #[serde(default)]
    pub ok: bool,
    #[serde(default)]
    pub action: String,
    #[serde(default)]
    pub results: Vec<NodeResult>,
    #[serde(default)]
    pub error: Option<String>,
}

/// Response of `POST /api/functest`.
///
/// `ok` reflects the bound action's outcome only; baseline/verify checks
/// are diagnostic and never feed back into it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TestExecutionResponse {
    pub ok: bool,
    #[serde(default)]
    pub key: Option<String>,
    pub title: String,
    #[serde(default)]
    pub baseline: Vec<CheckResult>,
    #[serde(default)]
    pub verify: Vec<CheckResult>,
    #[serde(default)]
    pub action: Option<ActionOutcome>,
    #[serde(default)]
    pub has_cleanup: bool,
    /// Cleanup binding echoed by the service for this scenario, when any.
    #[serde(default)]
    pub cleanup_action: Option<String>,
    #[serde(default)]
    pub cleanup_params: BTreeMap<String, serde_json::Value>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn decodes_untruncated_node_result() {
        let result: NodeResult = serde_json::from_str(
            r#"{"node":"slave1","host":"192.168.1.2","exit_code":0,
                "elapsed":0.4,"stdout":"tc applied","truncated":false}"#,
        )
        .unwrap();
        assert!(result.succeeded());
        assert!(!result.truncated);
        assert!(result.stdout_meta.is_none());
    }

    #[test]
    fn decodes_truncated_node_result_with_meta() {
        let result: NodeResult = serde_json::from_str(
            r#"{"node":"slave1","host":"192.168.1.2","exit_code":0,"elapsed":1.2,
                "stdout":"...","truncated":true,
                "stdout_meta":{"total_lines":500,"total_chars":12000}}"#,
        )
        .unwrap();
        let meta = result.stdout_meta.expect("meta travels with truncation");
        assert_eq!(meta.total_lines, 500);
        assert_eq!(meta.total_chars, 12000);
    }

    #[test]
    fn action_response_preserves_result_order() {
        let response: ActionResponse = serde_json::from_str(
            r#"{"ok":false,"action":"delay","results":[
                {"node":"master","host":"h0","exit_code":0,"elapsed":0.1},
                {"node":"slave1","host":"h1","exit_code":1,"elapsed":0.2},
                {"node":"slave2","host":"h2","exit_code":0,"elapsed":0.3}]}"#,
        )
        .unwrap();
        let order: Vec<&str> = response.results.iter().map(|r| r.node.as_str()).collect();
        assert_eq!(order, ["master", "slave1", "slave2"]);
        // Partial node failure: the envelope verdict is the service's, not ours.
        assert!(!response.ok);
        assert!(response.results.iter().any(|r| !r.succeeded()));
    }

    #[test]
    fn functest_response_defaults_optional_sections() {
        let response: TestExecutionResponse =
            serde_json::from_str(r#"{"ok":true,"title":"Delay test"}"#).unwrap();
        assert!(response.baseline.is_empty());
        assert!(response.verify.is_empty());
        assert!(response.action.is_none());
        assert!(response.cleanup_action.is_none());
    }

    #[test]
    fn functest_response_decodes_full_cycle() {
        let response: TestExecutionResponse = serde_json::from_str(
            r#"{"ok":true,"key":"test_net_delay","title":"Delay test",
                "baseline":[{"title":"ping before","ok":true,"cmd":"ping -c 1 h1",
                             "results":[{"node":"master","host":"h0","exit_code":0,"elapsed":0.1}]}],
                "verify":[{"title":"ping after","ok":false,"cmd":"ping -c 1 h1",
                           "results":[{"node":"master","host":"h0","exit_code":1,"elapsed":2.0}]}],
                "action":{"ok":true,"action":"delay","results":[]},
                "has_cleanup":true,"cleanup_action":"delay_clear"}"#,
        )
        .unwrap();
        // A failing verify check must not flip the service-computed ok.
        assert!(response.ok);
        assert!(!response.verify[0].ok);
        assert_eq!(response.cleanup_action.as_deref(), Some("delay_clear"));
    }
}
