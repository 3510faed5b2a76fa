//! ExecutionClient trait: the sole API boundary between chaosdeck and the
//! execution service. The console and the orchestration core depend on this
//! crate, never on a concrete transport.

pub mod error;
pub mod http;
pub mod scripted;

use async_trait::async_trait;
use chaosdeck_types::{
    ActionRequest, ActionResponse, ConfigResponse, FuncTestRequest, TestExecutionResponse,
    TestcasesResponse,
};

pub use error::ClientError;
pub use http::HttpClient;
pub use scripted::ScriptedClient;

pub type Result<T> = std::result::Result<T, ClientError>;

/// The five operations the execution service exposes.
///
/// Every call is a single request/response: no retry, no client-side
/// timeout, no cancellation. The caller owns lifecycle (disabling its
/// trigger control for the duration of the call).
#[async_trait]
pub trait ExecutionClient: Send + Sync {
    /// Reachability probe; `Ok` on HTTP 200, anything else is offline.
    async fn health(&self) -> Result<()>;

    /// Fetch nodes, groups, action definitions and output limits.
    async fn fetch_config(&self) -> Result<ConfigResponse>;

    /// Fetch the functional-test scenario list.
    async fn fetch_testcases(&self) -> Result<TestcasesResponse>;

    /// Dispatch one action invocation.
    async fn dispatch(&self, request: &ActionRequest) -> Result<ActionResponse>;

    /// Run one functional test; baseline → action → verify happens
    /// server-side.
    async fn run_functest(&self, request: &FuncTestRequest) -> Result<TestExecutionResponse>;
}
