//! Functional-test orchestration.
//!
//! The baseline → action → verify sequencing runs server-side; this module
//! invokes it, normalizes the embedded node results, and models the
//! per-test-view state machine. Cleanup is a separate, manually triggered
//! action dispatch.

use chaosdeck_client::{ClientError, ExecutionClient};
use chaosdeck_types::{
    ActionResponse, FuncTestRequest, TestDefinition, TestExecutionResponse,
};
use std::collections::BTreeMap;

use crate::dispatch::{self, normalize_node_result};

/// Lifecycle of one test view.
///
/// `Idle → Running → {Succeeded | Failed | Errored}`, plus
/// `→ CleaningUp → Idle` when a cleanup is triggered. The run control stays
/// disabled for the whole `Running`/`CleaningUp` duration: the service
/// promises no idempotency, so a second concurrent run of the same test
/// instance must be impossible.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TestRunState {
    #[default]
    Idle,
    Running,
    /// Test ran; the bound action succeeded.
    Succeeded,
    /// Test ran; the bound action failed.
    Failed,
    /// The call itself failed (transport/service error).
    Errored,
    CleaningUp,
}

impl TestRunState {
    /// Whether the run control may fire.
    pub fn can_run(&self) -> bool {
        !matches!(self, TestRunState::Running | TestRunState::CleaningUp)
    }

    /// Whether the cleanup control may fire: only after a completed run.
    pub fn can_clean(&self) -> bool {
        matches!(
            self,
            TestRunState::Succeeded | TestRunState::Failed | TestRunState::Errored
        )
    }

    pub fn is_running(&self) -> bool {
        matches!(self, TestRunState::Running)
    }

    pub fn start(&mut self) -> bool {
        if !self.can_run() {
            return false;
        }
        *self = TestRunState::Running;
        true
    }

    /// Transition out of `Running` on a structured response. The verdict is
    /// the service-computed `ok`: the bound action's outcome only, never
    /// recomputed from baseline/verify checks.
    pub fn finish(&mut self, response: &TestExecutionResponse) {
        *self = if response.ok {
            TestRunState::Succeeded
        } else {
            TestRunState::Failed
        };
    }

    pub fn fail(&mut self) {
        *self = TestRunState::Errored;
    }

    pub fn begin_cleanup(&mut self) -> bool {
        if !self.can_clean() {
            return false;
        }
        *self = TestRunState::CleaningUp;
        true
    }

    /// Cleanup finished (either way); back to idle.
    pub fn cleanup_done(&mut self) {
        *self = TestRunState::Idle;
    }
}

/// Run one functional test as a single `functest` call.
pub async fn run_test(
    client: &dyn ExecutionClient,
    test: &TestDefinition,
    params: BTreeMap<String, serde_json::Value>,
) -> Result<TestExecutionResponse, ClientError> {
    let request = FuncTestRequest {
        key: test.key.clone(),
        params,
    };
    let mut response = client.run_functest(&request).await?;
    for check in response.baseline.iter_mut().chain(response.verify.iter_mut()) {
        for result in &mut check.results {
            normalize_node_result(result);
        }
    }
    if let Some(action) = &mut response.action {
        for result in &mut action.results {
            normalize_node_result(result);
        }
    }
    Ok(response)
}

/// Dispatch the cleanup action bound to `test`, preferring the binding the
/// service echoed in the last response over the catalog-derived key.
///
/// Returns the resolved key with the dispatch result, or `None` without
/// touching the network when no cleanup key can be resolved. A derived key
/// that names nothing silently does nothing.
pub async fn run_cleanup(
    client: &dyn ExecutionClient,
    test: &TestDefinition,
    echoed_cleanup: Option<&str>,
    params: BTreeMap<String, String>,
) -> Option<(String, Result<ActionResponse, ClientError>)> {
    let key = echoed_cleanup
        .map(str::to_string)
        .or_else(|| test.cleanup_key())?;
    let result = dispatch::dispatch(client, &key, params, BTreeMap::new()).await;
    Some((key, result))
}
