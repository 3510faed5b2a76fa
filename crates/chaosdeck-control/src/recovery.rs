//! The "recover everything" sequencer.
//!
//! Eight canonical cleanup actions, dispatched strictly one after another.
//! Fault-clearing actions can touch overlapping kernel/network state
//! (shared traffic-control rules among them), so step N+1 is issued only
//! after step N's response has been received, success or failure.

use chaosdeck_client::ExecutionClient;
use chrono::Local;
use std::collections::BTreeMap;

use crate::catalog::Catalog;
use crate::dispatch;
use crate::history::HistoryEntry;

/// One canonical recovery step.
#[derive(Debug, Clone, Copy)]
pub struct RecoveryStep {
    pub key: &'static str,
    pub params: &'static [(&'static str, &'static str)],
}

/// Ledger-entry title prefix for every sequencer step.
pub const RECOVERY_TITLE_PREFIX: &str = "Bulk recovery";

/// The fixed order. `vm_network` is the one parameterized step: it is the
/// clear variant of the virtual-network fault action.
pub const RECOVERY_STEPS: [RecoveryStep; 8] = [
    RecoveryStep { key: "delay_clear", params: &[] },
    RecoveryStep { key: "loss_clear", params: &[] },
    RecoveryStep { key: "reorder_clear", params: &[] },
    RecoveryStep { key: "isolate_clear", params: &[] },
    RecoveryStep { key: "mem_stress_clear", params: &[] },
    RecoveryStep { key: "disk_fill_clear", params: &[] },
    RecoveryStep { key: "vm_network", params: &[("net_type", "clear")] },
    RecoveryStep { key: "kvm_clear", params: &[] },
];

/// Run every catalog-present step in order, best effort.
///
/// A step whose key is absent from `catalog` is skipped without a request
/// and without a ledger entry. A failed step never aborts the sequence.
/// Each attempted step's outcome goes through `sink` as one history entry.
/// There is no aggregate result; completion is observable only by the
/// caller's trigger re-enabling.
pub async fn recover_all<F>(client: &dyn ExecutionClient, catalog: &Catalog, mut sink: F)
where
    F: FnMut(HistoryEntry),
{
    for step in &RECOVERY_STEPS {
        let Some(action) = catalog.action(step.key) else {
            tracing::debug!(key = step.key, "recovery step not in catalog, skipping");
            continue;
        };
        let title = format!("{RECOVERY_TITLE_PREFIX}: {}", action.title);
        let params: BTreeMap<String, String> = step
            .params
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();

        tracing::info!(key = step.key, "recovery step started");
        let started_at = Local::now();
        let result = dispatch::dispatch(client, step.key, params, BTreeMap::new()).await;
        if let Err(err) = &result {
            tracing::warn!(key = step.key, error = %err, "recovery step failed");
        }
        sink(HistoryEntry::from_result(title, step.key, started_at, result));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::history::DispatchOutcome;
    use chaosdeck_client::ScriptedClient;
    use chaosdeck_types::ActionDefinition;

    fn catalog_with(keys: &[&str]) -> Catalog {
        Catalog {
            actions: keys
                .iter()
                .map(|key| {
                    serde_json::from_str::<ActionDefinition>(&format!(
                        r#"{{"key":"{key}","title":"Title of {key}","group":"network"}}"#
                    ))
                    .unwrap()
                })
                .collect(),
            ..Catalog::default()
        }
    }

    fn full_catalog() -> Catalog {
        catalog_with(&[
            "delay_clear",
            "loss_clear",
            "reorder_clear",
            "isolate_clear",
            "mem_stress_clear",
            "disk_fill_clear",
            "vm_network",
            "kvm_clear",
        ])
    }

    #[tokio::test]
    async fn issues_every_step_in_the_fixed_order_sequentially() {
        let client = ScriptedClient::new();
        let mut entries = Vec::new();
        recover_all(&client, &full_catalog(), |e| entries.push(e)).await;

        assert_eq!(
            client.dispatched_keys(),
            [
                "delay_clear",
                "loss_clear",
                "reorder_clear",
                "isolate_clear",
                "mem_stress_clear",
                "disk_fill_clear",
                "vm_network",
                "kvm_clear"
            ]
        );
        // Never more than one request in flight: strictly sequential.
        assert_eq!(client.max_in_flight(), 1);
        assert_eq!(entries.len(), 8);
        assert!(entries
            .iter()
            .all(|e| e.title.starts_with("Bulk recovery: Title of ")));
    }

    #[tokio::test]
    async fn vm_network_step_selects_the_clear_variant() {
        let client = ScriptedClient::new();
        recover_all(&client, &full_catalog(), |_| {}).await;

        let requests = client.dispatched();
        let vm = requests.iter().find(|r| r.action == "vm_network").unwrap();
        assert_eq!(vm.params.get("net_type").map(String::as_str), Some("clear"));
        assert!(vm.tests.is_empty());
    }

    #[tokio::test]
    async fn catalog_absent_steps_are_skipped_silently() {
        let client = ScriptedClient::new();
        let mut catalog = full_catalog();
        catalog.actions.retain(|a| a.key != "disk_fill_clear");

        let mut entries = Vec::new();
        recover_all(&client, &catalog, |e| entries.push(e)).await;

        let keys = client.dispatched_keys();
        assert_eq!(keys.len(), 7);
        assert!(!keys.contains(&"disk_fill_clear".to_string()));
        // With disk_fill_clear gone the virtual-network clear is 6th.
        assert_eq!(keys[5], "vm_network");
        assert_eq!(entries.len(), 7);
        assert!(!entries.iter().any(|e| e.action_key == "disk_fill_clear"));
    }

    #[tokio::test]
    async fn a_failing_step_does_not_stop_the_rest() {
        let client = ScriptedClient::new();
        client.fail_action("loss_clear", "tc not found");

        let mut entries = Vec::new();
        recover_all(&client, &full_catalog(), |e| entries.push(e)).await;

        assert_eq!(client.dispatched_keys().len(), 8);
        assert_eq!(entries.len(), 8);
        let failed = entries.iter().find(|e| e.action_key == "loss_clear").unwrap();
        assert!(!failed.succeeded());
        match &failed.outcome {
            DispatchOutcome::Error(msg) => assert_eq!(msg, "tc not found"),
            other => panic!("expected error outcome, got {other:?}"),
        }
        // Steps after the failure still ran and recorded.
        assert!(entries.iter().any(|e| e.action_key == "kvm_clear"));
    }

    #[tokio::test]
    async fn empty_catalog_issues_no_requests() {
        let client = ScriptedClient::new();
        let mut entries = Vec::new();
        recover_all(&client, &Catalog::default(), |e| entries.push(e)).await;
        assert!(client.dispatched().is_empty());
        assert!(entries.is_empty());
    }
}
