//! Append-only, newest-first ledger of dispatch outcomes.
//!
//! Entries are immutable snapshots taken at dispatch time: title, action
//! key and payload as they were then. A later catalog refresh never touches
//! them; a stale title is a historical fact, not a live view. The ledger
//! lives only in memory and dies with the process.

use chaosdeck_client::ClientError;
use chaosdeck_types::ActionResponse;
use chrono::{DateTime, Local};

/// What came back from one dispatch.
#[derive(Debug, Clone)]
pub enum DispatchOutcome {
    Response(ActionResponse),
    Error(String),
}

/// Immutable record of one past dispatch.
#[derive(Debug, Clone)]
pub struct HistoryEntry {
    pub title: String,
    pub action_key: String,
    pub started_at: DateTime<Local>,
    pub outcome: DispatchOutcome,
}

impl HistoryEntry {
    pub fn from_result(
        title: impl Into<String>,
        action_key: impl Into<String>,
        started_at: DateTime<Local>,
        result: Result<ActionResponse, ClientError>,
    ) -> Self {
        let outcome = match result {
            Ok(response) => DispatchOutcome::Response(response),
            Err(err) => DispatchOutcome::Error(err.to_string()),
        };
        Self {
            title: title.into(),
            action_key: action_key.into(),
            started_at,
            outcome,
        }
    }

    /// Whether this entry records a service-confirmed success.
    pub fn succeeded(&self) -> bool {
        matches!(&self.outcome, DispatchOutcome::Response(r) if r.ok)
    }
}

#[derive(Debug, Clone, Default)]
pub struct HistoryLedger {
    entries: Vec<HistoryEntry>,
}

impl HistoryLedger {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert newest-first.
    pub fn append(&mut self, entry: HistoryEntry) {
        self.entries.insert(0, entry);
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }

    /// Entries, most recent first.
    pub fn entries(&self) -> &[HistoryEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry(title: &str) -> HistoryEntry {
        HistoryEntry::from_result(
            title,
            "delay",
            Local::now(),
            Ok(ActionResponse {
                ok: true,
                action: Some("delay".into()),
                results: vec![],
                tests: vec![],
            }),
        )
    }

    #[test]
    fn append_inserts_newest_first() {
        let mut ledger = HistoryLedger::new();
        ledger.append(entry("first"));
        ledger.append(entry("second"));
        ledger.append(entry("third"));

        let titles: Vec<&str> = ledger.entries().iter().map(|e| e.title.as_str()).collect();
        assert_eq!(titles, ["third", "second", "first"]);
    }

    #[test]
    fn clear_empties_the_ledger() {
        let mut ledger = HistoryLedger::new();
        ledger.append(entry("a"));
        ledger.clear();
        assert!(ledger.is_empty());
    }

    #[test]
    fn entries_keep_their_snapshot_after_later_appends() {
        let mut ledger = HistoryLedger::new();
        ledger.append(entry("Network delay"));
        // A catalog refresh would rename the action; the entry keeps the
        // title it was created with.
        ledger.append(entry("Renamed delay"));
        assert_eq!(ledger.entries()[1].title, "Network delay");
    }

    #[test]
    fn error_outcomes_are_recorded_as_failures() {
        let failed = HistoryEntry::from_result(
            "Network delay",
            "delay",
            Local::now(),
            Err(ClientError::Service("boom".into())),
        );
        assert!(!failed.succeeded());
        match &failed.outcome {
            DispatchOutcome::Error(msg) => assert_eq!(msg, "boom"),
            other => panic!("expected error outcome, got {other:?}"),
        }
    }
}
