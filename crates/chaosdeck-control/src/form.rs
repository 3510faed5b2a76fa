//! Parameter-form model: one editable field per [`ParamSpec`], collected on
//! demand into the name→value mapping an [`chaosdeck_types::ActionRequest`]
//! carries.
//!
//! Forms are transient: the view that creates one owns it and drops it on
//! re-render or catalog swap. Required-ness is rendered as a hint only;
//! enforcement belongs to the execution service.

use chaosdeck_types::{FieldKind, ParamSpec};
use std::collections::BTreeMap;

/// One field's live state. The spec is kept alongside so views can render
/// labels, options and help without a catalog lookup.
#[derive(Debug, Clone)]
pub struct FieldState {
    pub spec: ParamSpec,
    pub value: String,
    pub enabled: bool,
    /// Current placeholder; field rules may override the spec's.
    pub placeholder: String,
}

impl FieldState {
    fn new(spec: &ParamSpec) -> Self {
        let value = match spec.kind {
            // Selects always hold a concrete choice: the default, else the
            // first option.
            FieldKind::Select => spec
                .default_text()
                .or_else(|| spec.options.first().map(|o| o.value.clone()))
                .unwrap_or_default(),
            _ => spec.default_text().unwrap_or_default(),
        };
        Self {
            value,
            enabled: true,
            placeholder: spec.placeholder.clone().unwrap_or_default(),
            spec: spec.clone(),
        }
    }
}

/// Editable field set for one action or test scenario.
#[derive(Debug, Clone, Default)]
pub struct ParamForm {
    fields: Vec<FieldState>,
    suggestions: Vec<String>,
}

impl ParamForm {
    pub fn new(params: &[ParamSpec], suggestions: Vec<String>) -> Self {
        let mut form = Self {
            fields: params.iter().map(FieldState::new).collect(),
            suggestions,
        };
        form.apply_rules();
        form
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn fields(&self) -> &[FieldState] {
        &self.fields
    }

    pub fn field_mut(&mut self, index: usize) -> Option<&mut FieldState> {
        self.fields.get_mut(index)
    }

    /// Node/host suggestions for `node`-kind fields.
    pub fn suggestions(&self) -> &[String] {
        &self.suggestions
    }

    pub fn value(&self, name: &str) -> Option<&str> {
        self.fields
            .iter()
            .find(|f| f.spec.name == name)
            .map(|f| f.value.as_str())
    }

    /// Set a field's value and re-evaluate dependency rules.
    pub fn set_value(&mut self, name: &str, value: impl Into<String>) -> bool {
        let Some(field) = self.fields.iter_mut().find(|f| f.spec.name == name) else {
            return false;
        };
        field.value = value.into();
        self.apply_rules();
        true
    }

    /// Re-evaluate every field rule against current values.
    ///
    /// Each pass starts from the spec-declared state (enabled, spec
    /// placeholder), then matching rules disable/blank their targets and
    /// apply hint placeholders. Deselecting re-enables the target; its
    /// blanked value stays blank.
    pub fn apply_rules(&mut self) {
        for field in &mut self.fields {
            field.enabled = true;
            field.placeholder = field.spec.placeholder.clone().unwrap_or_default();
        }

        let mut disable: Vec<String> = Vec::new();
        let mut hints: Vec<(String, String)> = Vec::new();
        for field in &self.fields {
            for rule in &field.spec.rules {
                if field.value != rule.when {
                    continue;
                }
                for target in &rule.targets {
                    if rule.disable {
                        disable.push(target.clone());
                    }
                    if let Some(hint) = &rule.hint {
                        hints.push((target.clone(), hint.clone()));
                    }
                }
            }
        }

        for field in &mut self.fields {
            if disable.iter().any(|t| *t == field.spec.name) {
                field.enabled = false;
                field.value.clear();
            }
            if let Some((_, hint)) = hints.iter().find(|(t, _)| *t == field.spec.name) {
                field.placeholder = hint.clone();
            }
        }
    }

    /// Read every enabled field, trimmed. Fields whose trimmed value is
    /// empty are omitted entirely; disabled fields are never collected.
    pub fn collect(&self) -> BTreeMap<String, String> {
        let mut params = BTreeMap::new();
        for field in &self.fields {
            if !field.enabled {
                continue;
            }
            let value = field.value.trim();
            if value.is_empty() {
                continue;
            }
            params.insert(field.spec.name.clone(), value.to_string());
        }
        params
    }

    /// Like [`collect`](Self::collect), but number-kind fields become JSON
    /// numbers, as the functional-test endpoint expects.
    pub fn collect_typed(&self) -> BTreeMap<String, serde_json::Value> {
        self.collect()
            .into_iter()
            .map(|(name, value)| {
                let kind = self
                    .fields
                    .iter()
                    .find(|f| f.spec.name == name)
                    .map(|f| f.spec.kind);
                let typed = match kind {
                    Some(FieldKind::Number) => value
                        .parse::<i64>()
                        .map(serde_json::Value::from)
                        .or_else(|_| value.parse::<f64>().map(serde_json::Value::from))
                        .unwrap_or(serde_json::Value::String(value)),
                    _ => serde_json::Value::String(value),
                };
                (name, typed)
            })
            .collect()
    }
}
