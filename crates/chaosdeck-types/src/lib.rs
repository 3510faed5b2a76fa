//! Shared API types for chaosdeck.
//!
//! Every request and response exchanged with the execution service is
//! defined here, once, and reused by the client, the orchestration core
//! and the console. Optional wire fields are true `Option`s with
//! `#[serde(default)]`; unknown fields sent by newer services are ignored.

pub mod catalog;
pub mod request;
pub mod result;

pub use catalog::{
    ActionDefinition, ConfigResponse, FieldKind, FieldRule, GroupDefinition, NodeInfo,
    OutputLimits, ParamSpec, SelectOption, TestDefinition, TestcasesResponse,
};
pub use request::{ActionRequest, FuncTestRequest};
pub use result::{
    ActionOutcome, ActionResponse, BundledTest, CheckResult, NodeResult, OutputMeta,
    TestExecutionResponse,
};
