//! In-process [`ExecutionClient`] with scripted responses.
//!
//! Serves tests and offline demos: responses are queued per action/test
//! key, every call is recorded, and the peak number of concurrently
//! in-flight dispatches is tracked so sequencing contracts can be asserted.

use async_trait::async_trait;
use chaosdeck_types::{
    ActionRequest, ActionResponse, ConfigResponse, FuncTestRequest, TestExecutionResponse,
    TestcasesResponse,
};
use std::collections::{HashMap, VecDeque};
use std::sync::Mutex;

use crate::{ClientError, ExecutionClient, Result};

type Scripted<T> = HashMap<String, VecDeque<std::result::Result<T, String>>>;

#[derive(Default)]
struct ScriptState {
    healthy: bool,
    config: ConfigResponse,
    testcases: TestcasesResponse,
    actions: Scripted<ActionResponse>,
    functests: Scripted<TestExecutionResponse>,
    dispatched: Vec<ActionRequest>,
    functest_calls: Vec<FuncTestRequest>,
    in_flight: usize,
    max_in_flight: usize,
}

#[derive(Default)]
pub struct ScriptedClient {
    state: Mutex<ScriptState>,
}

impl ScriptedClient {
    pub fn new() -> Self {
        let client = Self::default();
        client.state.lock().unwrap().healthy = true;
        client
    }

    pub fn with_config(self, config: ConfigResponse) -> Self {
        self.state.lock().unwrap().config = config;
        self
    }

    pub fn with_testcases(self, testcases: TestcasesResponse) -> Self {
        self.state.lock().unwrap().testcases = testcases;
        self
    }

    pub fn set_healthy(&self, healthy: bool) {
        self.state.lock().unwrap().healthy = healthy;
    }

    /// Queue the next response for `action`. Unscripted actions succeed
    /// with an empty result set.
    pub fn script_action(&self, action: &str, response: ActionResponse) {
        self.state
            .lock()
            .unwrap()
            .actions
            .entry(action.to_string())
            .or_default()
            .push_back(Ok(response));
    }

    /// Queue a failure for `action`, surfaced as a service-detail error.
    pub fn fail_action(&self, action: &str, detail: &str) {
        self.state
            .lock()
            .unwrap()
            .actions
            .entry(action.to_string())
            .or_default()
            .push_back(Err(detail.to_string()));
    }

    pub fn script_functest(&self, key: &str, response: TestExecutionResponse) {
        self.state
            .lock()
            .unwrap()
            .functests
            .entry(key.to_string())
            .or_default()
            .push_back(Ok(response));
    }

    pub fn fail_functest(&self, key: &str, detail: &str) {
        self.state
            .lock()
            .unwrap()
            .functests
            .entry(key.to_string())
            .or_default()
            .push_back(Err(detail.to_string()));
    }

    /// Every `/api/action` request received, in arrival order.
    pub fn dispatched(&self) -> Vec<ActionRequest> {
        self.state.lock().unwrap().dispatched.clone()
    }

    /// Action keys in arrival order.
    pub fn dispatched_keys(&self) -> Vec<String> {
        self.state
            .lock()
            .unwrap()
            .dispatched
            .iter()
            .map(|r| r.action.clone())
            .collect()
    }

    pub fn functest_calls(&self) -> Vec<FuncTestRequest> {
        self.state.lock().unwrap().functest_calls.clone()
    }

    /// Peak number of dispatches that were in flight at the same time.
    pub fn max_in_flight(&self) -> usize {
        self.state.lock().unwrap().max_in_flight
    }

    fn enter(&self, request: &ActionRequest) {
        let mut state = self.state.lock().unwrap();
        state.in_flight += 1;
        state.max_in_flight = state.max_in_flight.max(state.in_flight);
        state.dispatched.push(request.clone());
    }

    fn leave(&self, action: &str) -> Result<ActionResponse> {
        let mut state = self.state.lock().unwrap();
        state.in_flight -= 1;
        match state.actions.get_mut(action).and_then(VecDeque::pop_front) {
            Some(Ok(response)) => Ok(response),
            Some(Err(detail)) => Err(ClientError::Service(detail)),
            None => Ok(ActionResponse {
                ok: true,
                action: Some(action.to_string()),
                results: Vec::new(),
                tests: Vec::new(),
            }),
        }
    }
}

#[async_trait]
impl ExecutionClient for ScriptedClient {
    async fn health(&self) -> Result<()> {
        if self.state.lock().unwrap().healthy {
            Ok(())
        } else {
            Err(ClientError::Status(503))
        }
    }

    async fn fetch_config(&self) -> Result<ConfigResponse> {
        let state = self.state.lock().unwrap();
        if !state.healthy {
            return Err(ClientError::Status(503));
        }
        Ok(state.config.clone())
    }

    async fn fetch_testcases(&self) -> Result<TestcasesResponse> {
        let state = self.state.lock().unwrap();
        if !state.healthy {
            return Err(ClientError::Status(503));
        }
        Ok(state.testcases.clone())
    }

    async fn dispatch(&self, request: &ActionRequest) -> Result<ActionResponse> {
        self.enter(request);
        // Give concurrently issued dispatches a chance to interleave so
        // max_in_flight catches callers that fail to serialize.
        tokio::task::yield_now().await;
        self.leave(&request.action)
    }

    async fn run_functest(&self, request: &FuncTestRequest) -> Result<TestExecutionResponse> {
        let mut state = self.state.lock().unwrap();
        state.functest_calls.push(request.clone());
        match state
            .functests
            .get_mut(&request.key)
            .and_then(VecDeque::pop_front)
        {
            Some(Ok(response)) => Ok(response),
            Some(Err(detail)) => Err(ClientError::Service(detail)),
            None => Err(ClientError::Service(format!(
                "unscripted functional test: {}",
                request.key
            ))),
        }
    }
}
