//! Single-action dispatch and response normalization.

use chaosdeck_client::{ClientError, ExecutionClient};
use chaosdeck_types::{ActionRequest, ActionResponse, NodeResult, OutputMeta};
use std::collections::BTreeMap;

/// Send one action invocation. One request, no retry, no timeout; the
/// caller owns lifecycle. The only client-side side effect is the
/// normalization below; fault injection happens entirely server-side.
pub async fn dispatch(
    client: &dyn ExecutionClient,
    action_key: &str,
    params: BTreeMap<String, String>,
    test_flags: BTreeMap<String, bool>,
) -> Result<ActionResponse, ClientError> {
    let request = ActionRequest {
        action: action_key.to_string(),
        params,
        tests: test_flags,
    };
    let response = client.dispatch(&request).await?;
    Ok(normalize_response(response))
}

/// Enforce the truncation invariant on every node result:
/// `stdout_meta.is_some() ⇔ truncated` (same for `stderr_meta`).
///
/// The service historically sent metadata unconditionally; stray metadata on
/// untruncated results is dropped. A truncated result missing its metadata
/// gets one synthesized from the delivered counts, which keeps the
/// "totals ≥ delivered" bound with equality. Result order is untouched.
pub fn normalize_response(mut response: ActionResponse) -> ActionResponse {
    for result in &mut response.results {
        normalize_node_result(result);
    }
    for test in &mut response.tests {
        for result in &mut test.results {
            normalize_node_result(result);
        }
    }
    response
}

pub(crate) fn normalize_node_result(result: &mut NodeResult) {
    if result.truncated {
        if result.stdout_meta.is_none() {
            result.stdout_meta = Some(delivered_meta(result.stdout.as_deref()));
        }
        if result.stderr_meta.is_none() {
            result.stderr_meta = Some(delivered_meta(result.stderr.as_deref()));
        }
    } else {
        result.stdout_meta = None;
        result.stderr_meta = None;
    }
}

fn delivered_meta(text: Option<&str>) -> OutputMeta {
    let text = text.unwrap_or_default();
    OutputMeta {
        total_lines: if text.is_empty() { 0 } else { text.lines().count() as u64 },
        total_chars: text.chars().count() as u64,
    }
}
