//! Catalog types: nodes, action/test definitions and parameter schemas.
//!
//! These mirror `GET /api/config` and `GET /api/testcases`. The catalog is
//! service-owned; the console never invents actions, it only renders what
//! the service enumerates.

use serde::{Deserialize, Serialize};

/// Input widget kind for a single parameter field.
///
/// Unknown kinds sent by a newer service fall back to `Text`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase", from = "String")]
pub enum FieldKind {
    #[default]
    Text,
    Number,
    Select,
    /// Free text suggesting known node names/hosts, not constrained to them.
    Node,
}

impl From<String> for FieldKind {
    fn from(value: String) -> Self {
        match value.as_str() {
            "number" => FieldKind::Number,
            "select" => FieldKind::Select,
            "node" => FieldKind::Node,
            _ => FieldKind::Text,
        }
    }
}

/// One choice of a `select` field.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SelectOption {
    pub value: String,
    pub label: String,
}

/// Declarative dependency carried on the *controlling* field.
///
/// When the field's current value equals `when`, the rule applies to every
/// field named in `targets`: `disable` disables and blanks it, `hint`
/// replaces its placeholder. Rules replace per-action special-casing in the
/// console; no field names are hardcoded anywhere downstream.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct FieldRule {
    pub when: String,
    pub targets: Vec<String>,
    #[serde(default)]
    pub disable: bool,
    #[serde(default)]
    pub hint: Option<String>,
}

fn default_true() -> bool {
    true
}

/// Schema of a single parameter field.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ParamSpec {
    pub name: String,
    pub label: String,
    #[serde(rename = "type", default)]
    pub kind: FieldKind,
    #[serde(default)]
    pub options: Vec<SelectOption>,
    /// Pre-filled value; the service sends strings or bare numbers.
    #[serde(default)]
    pub default: Option<serde_json::Value>,
    #[serde(default)]
    pub placeholder: Option<String>,
    /// Advisory only; enforcement is the execution service's job.
    #[serde(default = "default_true")]
    pub required: bool,
    #[serde(default)]
    pub help: Option<String>,
    #[serde(default)]
    pub rules: Vec<FieldRule>,
}

impl ParamSpec {
    /// The default value rendered as field text, if any.
    pub fn default_text(&self) -> Option<String> {
        match self.default.as_ref()? {
            serde_json::Value::String(s) => Some(s.clone()),
            serde_json::Value::Number(n) => Some(n.to_string()),
            serde_json::Value::Bool(b) => Some(b.to_string()),
            _ => None,
        }
    }
}

/// One dispatchable fault-injection or operational command.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ActionDefinition {
    pub key: String,
    pub title: String,
    #[serde(default)]
    pub desc: String,
    pub group: String,
    #[serde(default)]
    pub danger: bool,
    #[serde(default)]
    pub params: Vec<ParamSpec>,
}

/// Display/ordering bucket for actions and tests.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GroupDefinition {
    pub key: String,
    pub title: String,
    #[serde(default)]
    pub desc: String,
}

/// Fixed prefix linking a test key to its cleanup action key when the
/// catalog does not spell the binding out.
pub const TEST_KEY_PREFIX: &str = "test_";

/// A named baseline/action/verify scenario.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TestDefinition {
    pub key: String,
    pub title: String,
    #[serde(default)]
    pub desc: String,
    pub group: String,
    #[serde(default)]
    pub params: Vec<ParamSpec>,
    #[serde(default)]
    pub has_baseline: bool,
    #[serde(default)]
    pub has_cleanup: bool,
    /// Explicit cleanup binding. Older services omit it, in which case the
    /// key is derived by stripping [`TEST_KEY_PREFIX`] from `key`, a naming
    /// coupling between the test and action catalogs that has to hold.
    #[serde(default)]
    pub cleanup_action_key: Option<String>,
}

impl TestDefinition {
    /// Action key to dispatch for cleanup, if this test has one.
    ///
    /// A derived key with no catalog counterpart dispatches nothing; that
    /// is the caller's lookup to make.
    pub fn cleanup_key(&self) -> Option<String> {
        if !self.has_cleanup {
            return None;
        }
        if let Some(key) = &self.cleanup_action_key {
            return Some(key.clone());
        }
        self.key.strip_prefix(TEST_KEY_PREFIX).map(str::to_string)
    }
}

/// One cluster node as enumerated by the service.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NodeInfo {
    pub name: String,
    pub host: String,
    #[serde(default)]
    pub port: Option<u16>,
    #[serde(default)]
    pub role: String,
    #[serde(default)]
    pub local: bool,
}

/// Output caps applied server-side before results come back.
///
/// Both values at or below zero means uncapped output.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct OutputLimits {
    #[serde(default)]
    pub max_lines: i64,
    #[serde(default)]
    pub max_chars: i64,
}

impl OutputLimits {
    pub fn is_unlimited(&self) -> bool {
        self.max_lines <= 0 && self.max_chars <= 0
    }
}

/// Response of `GET /api/config`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ConfigResponse {
    #[serde(default)]
    pub nodes: Vec<NodeInfo>,
    #[serde(default)]
    pub groups: Vec<GroupDefinition>,
    #[serde(default)]
    pub actions: Vec<ActionDefinition>,
    #[serde(default)]
    pub output: OutputLimits,
}

/// Response of `GET /api/testcases`. The service may bundle extra fields
/// (e.g. the group list again); they are ignored here.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TestcasesResponse {
    #[serde(default)]
    pub tests: Vec<TestDefinition>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn param_spec_defaults_from_wire() {
        let spec: ParamSpec = serde_json::from_str(
            r#"{"name":"ms","label":"Delay (ms)","type":"number","default":200}"#,
        )
        .unwrap();
        assert_eq!(spec.kind, FieldKind::Number);
        assert_eq!(spec.default_text().as_deref(), Some("200"));
        assert!(spec.required, "required defaults to true");
        assert!(spec.rules.is_empty());
    }

    #[test]
    fn unknown_field_kind_falls_back_to_text() {
        let spec: ParamSpec =
            serde_json::from_str(r#"{"name":"x","label":"X","type":"slider"}"#).unwrap();
        assert_eq!(spec.kind, FieldKind::Text);
    }

    #[test]
    fn cleanup_key_prefers_explicit_binding() {
        let mut test: TestDefinition = serde_json::from_str(
            r#"{"key":"test_net_delay","title":"t","group":"network","has_cleanup":true}"#,
        )
        .unwrap();
        assert_eq!(test.cleanup_key().as_deref(), Some("net_delay"));

        test.cleanup_action_key = Some("delay_clear".into());
        assert_eq!(test.cleanup_key().as_deref(), Some("delay_clear"));
    }

    #[test]
    fn cleanup_key_absent_without_flag_or_prefix() {
        let test = TestDefinition {
            key: "net_delay".into(),
            title: "t".into(),
            desc: String::new(),
            group: "network".into(),
            params: vec![],
            has_baseline: false,
            has_cleanup: true,
            cleanup_action_key: None,
        };
        assert_eq!(test.cleanup_key(), None, "no prefix to strip");

        let no_cleanup = TestDefinition {
            has_cleanup: false,
            key: "test_net_delay".into(),
            ..test
        };
        assert_eq!(no_cleanup.cleanup_key(), None);
    }

    #[test]
    fn output_limits_unlimited_only_when_both_nonpositive() {
        assert!(OutputLimits { max_lines: 0, max_chars: -1 }.is_unlimited());
        assert!(!OutputLimits { max_lines: 200, max_chars: 0 }.is_unlimited());
        assert!(!OutputLimits { max_lines: 200, max_chars: 8000 }.is_unlimited());
    }

    #[test]
    fn config_response_tolerates_missing_sections() {
        let cfg: ConfigResponse = serde_json::from_str(r#"{"nodes":[]}"#).unwrap();
        assert!(cfg.actions.is_empty());
        assert!(cfg.output.is_unlimited());
    }
}
