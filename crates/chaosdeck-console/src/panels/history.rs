//! History panel: the newest-first ledger of past dispatch outcomes.
//!
//! Entries are snapshots from dispatch time and render as such; a catalog
//! refresh never rewrites them.

use chaosdeck_control::{DispatchOutcome, HistoryLedger};
use egui::{Color32, RichText, ScrollArea, Ui};

use super::results;
use crate::format;

#[derive(Default)]
pub struct HistoryPanelAction {
    pub clear: bool,
}

pub fn history_panel(ui: &mut Ui, ledger: &HistoryLedger) -> HistoryPanelAction {
    let mut action = HistoryPanelAction::default();

    ui.horizontal(|ui| {
        ui.heading("History");
        if ui
            .add_enabled(!ledger.is_empty(), egui::Button::new("Clear").small())
            .clicked()
        {
            action.clear = true;
        }
    });
    ui.separator();

    if ledger.is_empty() {
        ui.label(RichText::new("No dispatches yet.").weak());
        return action;
    }

    ScrollArea::vertical()
        .auto_shrink([false, false])
        .show(ui, |ui| {
            for entry in ledger.entries() {
                let accent = if entry.succeeded() {
                    results::OK_GREEN
                } else {
                    results::FAIL_RED
                };
                egui::Frame::default()
                    .fill(Color32::from_rgb(38, 40, 46))
                    .rounding(6.0)
                    .inner_margin(8.0)
                    .show(ui, |ui| {
                        ui.horizontal(|ui| {
                            ui.label(RichText::new(&entry.title).strong());
                            let status = if entry.succeeded() { "success" } else { "failed" };
                            ui.label(RichText::new(status).color(accent));
                        });
                        ui.label(
                            RichText::new(format!(
                                "{} | action: {}",
                                entry.started_at.format(format::TIMESTAMP_FMT),
                                entry.action_key
                            ))
                            .small()
                            .weak(),
                        );

                        match &entry.outcome {
                            DispatchOutcome::Response(response) => {
                                for result in &response.results {
                                    results::node_result(ui, result);
                                }
                                for test in &response.tests {
                                    ui.horizontal(|ui| {
                                        let mark = if test.ok { "✓" } else { "✗" };
                                        let color = if test.ok {
                                            results::OK_GREEN
                                        } else {
                                            results::FAIL_RED
                                        };
                                        ui.label(RichText::new(mark).color(color));
                                        ui.label(
                                            RichText::new(format!("bundled: {}", test.title))
                                                .small(),
                                        );
                                    });
                                    for result in &test.results {
                                        results::node_result(ui, result);
                                    }
                                }
                            }
                            DispatchOutcome::Error(message) => {
                                ui.label(
                                    RichText::new(message).small().color(results::FAIL_RED),
                                );
                            }
                        }
                    });
                ui.add_space(6.0);
            }
        });

    action
}
