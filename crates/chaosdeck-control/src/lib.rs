//! Client-side orchestration core for the chaosdeck console.
//!
//! Pure logic over the [`chaosdeck_client::ExecutionClient`] trait: the
//! catalog snapshot, the parameter-form model, action dispatch with result
//! normalization, the functional-test orchestration and its per-view state
//! machine, the eight-step recovery sequencer and the append-only history
//! ledger. No UI code lives here.

pub mod catalog;
pub mod dispatch;
pub mod form;
pub mod history;
pub mod orchestrator;
pub mod recovery;

pub use catalog::{Catalog, CatalogError};
pub use dispatch::{dispatch, normalize_response};
pub use form::{FieldState, ParamForm};
pub use history::{DispatchOutcome, HistoryEntry, HistoryLedger};
pub use orchestrator::{run_cleanup, run_test, TestRunState};
pub use recovery::{recover_all, RecoveryStep, RECOVERY_STEPS, RECOVERY_TITLE_PREFIX};
