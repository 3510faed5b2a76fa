//! Console application state and frame loop.
//!
//! Single control-flow, event-triggered model: every operator action spawns
//! one async call chain on the app's tokio runtime, parking its result in a
//! slot polled each frame. The triggering control is disabled while its
//! slot is pending (mutual exclusion per control, not a global lock) and
//! re-enabled in the drain path whatever the outcome, so no failure leaves
//! a control permanently disabled.

use chaosdeck_client::{ExecutionClient, HttpClient};
use chaosdeck_control::{
    dispatch, recover_all, run_cleanup, run_test, Catalog, HistoryEntry, HistoryLedger, ParamForm,
    TestRunState,
};
use chaosdeck_types::TestExecutionResponse;
use chrono::Local;
use eframe::egui;
use egui::{Color32, RichText};
use std::collections::{BTreeMap, HashMap, HashSet};
use std::sync::{Arc, Mutex};

use crate::format;
use crate::panels::tests::{tests_panel, TestsAction, TestsView};
use crate::panels::{actions, history, nodes};

/// Async result holder: the spawned task fills it, `update` drains it.
type Slot<T> = Arc<Mutex<Option<T>>>;

fn new_slot<T>() -> Slot<T> {
    Arc::new(Mutex::new(None))
}

fn take_slot<T>(slot: &Slot<T>) -> Option<T> {
    slot.try_lock().ok().and_then(|mut guard| guard.take())
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
enum Health {
    #[default]
    Unknown,
    Online,
    Offline,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
enum Tab {
    #[default]
    Actions,
    Tests,
}

/// Shared between the recovery task and the frame loop; entries appear in
/// the ledger as each step completes, not all at once at the end.
#[derive(Default)]
struct RecoveryProgress {
    entries: Vec<HistoryEntry>,
    done: bool,
}

pub struct ChaosApp {
    client: Arc<HttpClient>,
    runtime: Arc<tokio::runtime::Runtime>,

    catalog: Catalog,
    ledger: HistoryLedger,
    health: Health,
    load_error: Option<String>,
    tab: Tab,

    // Actions view: one transient form per action card, dropped wholesale
    // on catalog swap.
    forms: HashMap<String, ParamForm>,
    kvm_tests: bool,

    // Tests view.
    selected_group: Option<String>,
    open_test: Option<String>,
    test_form: ParamForm,
    test_state: TestRunState,
    test_report: Option<TestExecutionResponse>,
    test_error: Option<String>,
    cleanup_notice: Option<String>,

    // In-flight call chains.
    pending_catalog: Option<Slot<(bool, Result<Catalog, String>)>>,
    pending_dispatches: HashMap<String, Slot<HistoryEntry>>,
    pending_test: Option<(String, Slot<Result<TestExecutionResponse, String>>)>,
    pending_cleanup: Option<Slot<Option<HistoryEntry>>>,
    pending_recovery: Option<Arc<Mutex<RecoveryProgress>>>,
}

impl ChaosApp {
    pub fn new(_cc: &eframe::CreationContext<'_>, base_url: &str) -> Self {
        let runtime = Arc::new(
            tokio::runtime::Builder::new_multi_thread()
                .enable_all()
                .build()
                .expect("failed to create tokio runtime"),
        );

        let mut app = Self {
            client: Arc::new(HttpClient::new(base_url)),
            runtime,
            catalog: Catalog::default(),
            ledger: HistoryLedger::new(),
            health: Health::Unknown,
            load_error: None,
            tab: Tab::Actions,
            forms: HashMap::new(),
            kvm_tests: false,
            selected_group: None,
            open_test: None,
            test_form: ParamForm::default(),
            test_state: TestRunState::Idle,
            test_report: None,
            test_error: None,
            cleanup_notice: None,
            pending_catalog: None,
            pending_dispatches: HashMap::new(),
            pending_test: None,
            pending_cleanup: None,
            pending_recovery: None,
        };
        app.refresh();
        app
    }

    // =========================================================================
    // CALL CHAINS
    // =========================================================================

    /// Health probe + catalog fetch. On failure the previous snapshot stays;
    /// retry is the operator pressing the button again.
    fn refresh(&mut self) {
        if self.pending_catalog.is_some() {
            return;
        }
        let client = self.client.clone();
        let slot: Slot<(bool, Result<Catalog, String>)> = new_slot();
        let out = slot.clone();
        self.runtime.spawn(async move {
            let healthy = client.health().await.is_ok();
            let catalog = Catalog::fetch(&*client).await.map_err(|e| e.to_string());
            *out.lock().unwrap() = Some((healthy, catalog));
        });
        self.pending_catalog = Some(slot);
    }

    fn dispatch_action(&mut self, action_key: &str) {
        if self.pending_dispatches.contains_key(action_key) {
            return;
        }
        let Some(definition) = self.catalog.action(action_key) else {
            return;
        };
        let title = definition.title.clone();
        let params = self
            .forms
            .get(action_key)
            .map(ParamForm::collect)
            .unwrap_or_default();
        let mut test_flags = BTreeMap::new();
        if self.kvm_tests {
            test_flags.insert("kvm".to_string(), true);
        }

        let client = self.client.clone();
        let key = action_key.to_string();
        let slot: Slot<HistoryEntry> = new_slot();
        let out = slot.clone();
        self.runtime.spawn(async move {
            let started_at = Local::now();
            let result = dispatch(&*client, &key, params, test_flags).await;
            let entry = HistoryEntry::from_result(title, key, started_at, result);
            *out.lock().unwrap() = Some(entry);
        });
        self.pending_dispatches.insert(action_key.to_string(), slot);
    }

    fn start_recovery(&mut self) {
        if self.pending_recovery.is_some() || self.catalog.is_empty() {
            return;
        }
        let client = self.client.clone();
        // The sequencer runs against the snapshot captured here; a refresh
        // mid-run does not redirect it.
        let catalog = self.catalog.clone();
        let progress = Arc::new(Mutex::new(RecoveryProgress::default()));
        let task_progress = progress.clone();
        self.runtime.spawn(async move {
            let sink_progress = task_progress.clone();
            recover_all(&*client, &catalog, move |entry| {
                sink_progress.lock().unwrap().entries.push(entry);
            })
            .await;
            task_progress.lock().unwrap().done = true;
        });
        self.pending_recovery = Some(progress);
    }

    fn select_test(&mut self, key: String) {
        let params = self
            .catalog
            .test(&key)
            .map(|t| t.params.clone())
            .unwrap_or_default();
        self.test_form = ParamForm::new(&params, self.catalog.node_suggestions());
        self.open_test = Some(key);
        self.test_state = TestRunState::Idle;
        self.test_report = None;
        self.test_error = None;
        self.cleanup_notice = None;
    }

    fn start_test_run(&mut self) {
        let Some(key) = self.open_test.clone() else {
            return;
        };
        let Some(test) = self.catalog.test(&key).cloned() else {
            return;
        };
        if !self.test_state.start() {
            return;
        }
        self.test_report = None;
        self.test_error = None;
        self.cleanup_notice = None;

        let params = self.test_form.collect_typed();
        let client = self.client.clone();
        let slot: Slot<Result<TestExecutionResponse, String>> = new_slot();
        let out = slot.clone();
        self.runtime.spawn(async move {
            let result = run_test(&*client, &test, params)
                .await
                .map_err(|e| e.to_string());
            *out.lock().unwrap() = Some(result);
        });
        self.pending_test = Some((key, slot));
    }

    fn start_cleanup(&mut self) {
        let Some(key) = self.open_test.clone() else {
            return;
        };
        let Some(test) = self.catalog.test(&key).cloned() else {
            return;
        };
        if !self.test_state.begin_cleanup() {
            return;
        }
        self.cleanup_notice = None;

        let echoed = self
            .test_report
            .as_ref()
            .and_then(|r| r.cleanup_action.clone());
        let params = self.test_form.collect();
        let title = format!("Cleanup: {}", test.title);
        let client = self.client.clone();
        let slot: Slot<Option<HistoryEntry>> = new_slot();
        let out = slot.clone();
        self.runtime.spawn(async move {
            let started_at = Local::now();
            let outcome = run_cleanup(&*client, &test, echoed.as_deref(), params).await;
            let entry = outcome.map(|(action_key, result)| {
                HistoryEntry::from_result(title, action_key, started_at, result)
            });
            *out.lock().unwrap() = Some(entry);
        });
        self.pending_cleanup = Some(slot);
    }

    // =========================================================================
    // RESULT DRAINING
    // =========================================================================

    fn poll_pending(&mut self) {
        // Catalog swap: wholesale replacement on success, previous snapshot
        // retained on failure.
        let catalog_result = self.pending_catalog.as_ref().and_then(|s| take_slot(s));
        if let Some((healthy, result)) = catalog_result {
            self.health = if healthy { Health::Online } else { Health::Offline };
            match result {
                Ok(catalog) => {
                    self.forms.clear();
                    self.catalog = catalog;
                    self.load_error = None;
                }
                Err(message) => self.load_error = Some(message),
            }
            self.pending_catalog = None;
        }

        // Finished action dispatches become ledger entries and free their
        // control.
        let finished: Vec<(String, HistoryEntry)> = self
            .pending_dispatches
            .iter()
            .filter_map(|(key, slot)| take_slot(slot).map(|entry| (key.clone(), entry)))
            .collect();
        for (key, entry) in finished {
            self.ledger.append(entry);
            self.pending_dispatches.remove(&key);
        }

        // Test run result.
        let test_result = self.pending_test.as_ref().and_then(|(_, s)| take_slot(s));
        if let Some(result) = test_result {
            let key = self.pending_test.take().map(|(k, _)| k);
            if key.as_deref() == self.open_test.as_deref() {
                match result {
                    Ok(report) => {
                        self.test_state.finish(&report);
                        self.test_report = Some(report);
                        self.test_error = None;
                    }
                    Err(message) => {
                        self.test_state.fail();
                        self.test_error = Some(message);
                    }
                }
            } else {
                // The view navigated away; the result has no home anymore.
                self.test_state = TestRunState::Idle;
            }
        }

        // Cleanup result.
        let cleanup_result = self.pending_cleanup.as_ref().and_then(|s| take_slot(s));
        if let Some(maybe_entry) = cleanup_result {
            match maybe_entry {
                Some(entry) => {
                    self.cleanup_notice = Some(if entry.succeeded() {
                        "Cleanup completed; fault state cleared.".to_string()
                    } else {
                        "Cleanup dispatched; see history for errors.".to_string()
                    });
                    self.ledger.append(entry);
                }
                None => {
                    self.cleanup_notice =
                        Some("No cleanup action is bound for this test.".to_string());
                }
            }
            self.test_state.cleanup_done();
            self.pending_cleanup = None;
        }

        // Recovery steps stream in as they complete.
        let mut recovery_done = false;
        if let Some(progress) = &self.pending_recovery {
            if let Ok(mut guard) = progress.try_lock() {
                for entry in guard.entries.drain(..) {
                    self.ledger.append(entry);
                }
                recovery_done = guard.done;
            }
        }
        if recovery_done {
            self.pending_recovery = None;
        }
    }

    fn has_pending(&self) -> bool {
        self.pending_catalog.is_some()
            || self.pending_test.is_some()
            || self.pending_cleanup.is_some()
            || self.pending_recovery.is_some()
            || !self.pending_dispatches.is_empty()
    }
}

impl eframe::App for ChaosApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        self.poll_pending();
        if self.has_pending() {
            ctx.request_repaint();
        }

        egui::TopBottomPanel::top("header").show(ctx, |ui| {
            ui.horizontal(|ui| {
                ui.heading("Chaosdeck");
                match self.health {
                    Health::Unknown => {
                        ui.label(RichText::new("checking…").weak());
                    }
                    Health::Online => {
                        ui.label(RichText::new("● online").color(Color32::from_rgb(74, 180, 110)));
                    }
                    Health::Offline => {
                        ui.label(RichText::new("● offline").color(Color32::from_rgb(220, 90, 90)));
                    }
                }
                ui.separator();
                ui.label(
                    RichText::new(format::output_limit_text(&self.catalog.output))
                        .small()
                        .weak(),
                );
                ui.separator();

                let loading = self.pending_catalog.is_some();
                if ui
                    .add_enabled(!loading, egui::Button::new("Refresh catalog"))
                    .clicked()
                {
                    self.refresh();
                }

                let recovering = self.pending_recovery.is_some();
                let recover_label = if recovering {
                    "Recovering…"
                } else {
                    "Recover all"
                };
                if ui
                    .add_enabled(
                        !recovering && !self.catalog.is_empty(),
                        egui::Button::new(recover_label),
                    )
                    .clicked()
                {
                    self.start_recovery();
                }

                ui.checkbox(&mut self.kvm_tests, "bundle kvm checks")
                    .on_hover_text(
                        "Ask the service to run its virtualization test family \
                         alongside each dispatched action",
                    );

                if loading || recovering {
                    ui.spinner();
                }
            });
            if let Some(error) = &self.load_error {
                ui.colored_label(Color32::from_rgb(220, 90, 90), error);
            }
        });

        egui::SidePanel::right("history")
            .default_width(380.0)
            .show(ctx, |ui| {
                let action = history::history_panel(ui, &self.ledger);
                if action.clear {
                    self.ledger.clear();
                }
            });

        egui::CentralPanel::default().show(ctx, |ui| {
            ui.horizontal(|ui| {
                if ui
                    .selectable_label(self.tab == Tab::Actions, "Actions")
                    .clicked()
                {
                    self.tab = Tab::Actions;
                }
                if ui
                    .selectable_label(self.tab == Tab::Tests, "Tests")
                    .clicked()
                {
                    self.tab = Tab::Tests;
                }
            });
            ui.separator();

            match self.tab {
                Tab::Actions => {
                    egui::ScrollArea::vertical()
                        .auto_shrink([false, false])
                        .show(ui, |ui| {
                            nodes::nodes_panel(ui, &self.catalog.nodes);
                            ui.separator();
                            let busy: HashSet<String> =
                                self.pending_dispatches.keys().cloned().collect();
                            let action =
                                actions::actions_panel(ui, &self.catalog, &mut self.forms, &busy);
                            if let Some(key) = action.dispatch {
                                self.dispatch_action(&key);
                            }
                        });
                }
                Tab::Tests => {
                    egui::ScrollArea::vertical()
                        .auto_shrink([false, false])
                        .show(ui, |ui| {
                            let view = TestsView {
                                catalog: &self.catalog,
                                selected_group: self.selected_group.as_deref(),
                                open_test: self.open_test.as_deref(),
                                state: self.test_state,
                                report: self.test_report.as_ref(),
                                error: self.test_error.as_deref(),
                                notice: self.cleanup_notice.as_deref(),
                            };
                            let action = tests_panel(ui, &view, &mut self.test_form);
                            match action {
                                TestsAction::None => {}
                                TestsAction::SelectGroup(group) => {
                                    self.selected_group = Some(group);
                                }
                                TestsAction::OpenTest(key) => self.select_test(key),
                                TestsAction::Back => self.open_test = None,
                                TestsAction::Run => self.start_test_run(),
                                TestsAction::Cleanup => self.start_cleanup(),
                            }
                        });
                }
            }
        });
    }
}
