//! The catalog snapshot: everything the service enumerates, fetched as one
//! unit and replaced wholesale.
//!
//! There is no global cache. The console's app state owns the current
//! `Catalog` value and swaps it atomically after a successful fetch; a
//! failed fetch returns an error and the owner keeps the previous snapshot.
//! In-flight operations that captured references to the prior snapshot keep
//! them; that staleness is cosmetic and accepted.

use chaosdeck_client::{ClientError, ExecutionClient};
use chaosdeck_types::{
    ActionDefinition, GroupDefinition, NodeInfo, OutputLimits, TestDefinition,
};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("catalog load failed: {0}")]
    Load(#[from] ClientError),
}

/// Immutable snapshot of nodes, groups, actions, tests and output limits.
#[derive(Debug, Clone, Default)]
pub struct Catalog {
    pub nodes: Vec<NodeInfo>,
    pub groups: Vec<GroupDefinition>,
    pub actions: Vec<ActionDefinition>,
    pub tests: Vec<TestDefinition>,
    pub output: OutputLimits,
}

impl Catalog {
    /// Fetch a complete new snapshot. Either both endpoint reads succeed and
    /// a full catalog is returned, or the error propagates and nothing of
    /// the partial fetch escapes. No retry: reloading is an operator action.
    pub async fn fetch(client: &dyn ExecutionClient) -> Result<Self, CatalogError> {
        let config = client.fetch_config().await?;
        let testcases = client.fetch_testcases().await?;
        Ok(Self {
            nodes: config.nodes,
            groups: config.groups,
            actions: config.actions,
            tests: testcases.tests,
            output: config.output,
        })
    }

    /// True before the first successful load.
    pub fn is_empty(&self) -> bool {
        self.actions.is_empty() && self.tests.is_empty() && self.nodes.is_empty()
    }

    pub fn action(&self, key: &str) -> Option<&ActionDefinition> {
        self.actions.iter().find(|a| a.key == key)
    }

    pub fn group(&self, key: &str) -> Option<&GroupDefinition> {
        self.groups.iter().find(|g| g.key == key)
    }

    pub fn test(&self, key: &str) -> Option<&TestDefinition> {
        self.tests.iter().find(|t| t.key == key)
    }

    /// Actions of one group, in catalog order. An action whose group matches
    /// no known group is reachable through no group and therefore never
    /// rendered; accepted invariant, not a bug.
    pub fn actions_in_group(&self, group_key: &str) -> Vec<&ActionDefinition> {
        self.actions.iter().filter(|a| a.group == group_key).collect()
    }

    pub fn tests_in_group(&self, group_key: &str) -> Vec<&TestDefinition> {
        self.tests.iter().filter(|t| t.group == group_key).collect()
    }

    /// Display title for an action key; unknown keys echo back.
    pub fn action_title<'a>(&'a self, key: &'a str) -> &'a str {
        self.action(key).map(|a| a.title.as_str()).unwrap_or(key)
    }

    /// Node name and host suggestions for `node`-kind fields. Suggestions
    /// only: values are never validated against this set.
    pub fn node_suggestions(&self) -> Vec<String> {
        let mut suggestions = Vec::with_capacity(self.nodes.len() * 2);
        for node in &self.nodes {
            suggestions.push(node.name.clone());
            suggestions.push(node.host.clone());
        }
        suggestions
    }
}
