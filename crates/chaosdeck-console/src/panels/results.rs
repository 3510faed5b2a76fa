//! Shared rendering for per-node results and verification checks.

use chaosdeck_types::{CheckResult, NodeResult};
use egui::{Color32, RichText, Ui};

use crate::format;

pub const OK_GREEN: Color32 = Color32::from_rgb(74, 180, 110);
pub const FAIL_RED: Color32 = Color32::from_rgb(220, 90, 90);
pub const TRUNC_AMBER: Color32 = Color32::from_rgb(222, 170, 60);

/// One node's command outcome: header line, command, outputs, truncation
/// badge.
pub fn node_result(ui: &mut Ui, result: &NodeResult) {
    egui::Frame::default()
        .fill(Color32::from_rgb(32, 34, 38))
        .rounding(4.0)
        .inner_margin(6.0)
        .show(ui, |ui| {
            ui.horizontal(|ui| {
                ui.label(RichText::new(format!("{}@{}", result.node, result.host)).strong());
                let status = if result.succeeded() {
                    RichText::new("ok").color(OK_GREEN)
                } else {
                    RichText::new("failed").color(FAIL_RED)
                };
                ui.label(status);
                ui.label(
                    RichText::new(format!(
                        "exit={} | {}",
                        result.exit_code,
                        format::elapsed_text(result.elapsed)
                    ))
                    .small()
                    .weak(),
                );
            });

            if let Some(cmd) = &result.cmd {
                if !cmd.is_empty() {
                    ui.label(RichText::new(format!("$ {cmd}")).monospace().small().weak());
                }
            }

            if let Some(meta) = &result.stdout_meta {
                ui.label(
                    RichText::new(format::truncation_text(meta))
                        .small()
                        .color(TRUNC_AMBER),
                );
            }

            let stdout = result.stdout.as_deref().unwrap_or("");
            let stderr = result.stderr.as_deref().unwrap_or("");
            if stdout.is_empty() && stderr.is_empty() {
                ui.label(RichText::new("(no output)").small().weak());
            }
            if !stdout.is_empty() {
                ui.label(RichText::new(stdout).monospace().small());
            }
            if !stderr.is_empty() {
                ui.label(RichText::new(stderr).monospace().small().color(FAIL_RED));
            }
        });
    ui.add_space(2.0);
}

/// One baseline/verify probe: pass/fail title, command, per-node results.
pub fn check_result(ui: &mut Ui, check: &CheckResult) {
    let accent = if check.ok { OK_GREEN } else { FAIL_RED };
    egui::Frame::default()
        .fill(Color32::from_rgb(38, 40, 46))
        .rounding(4.0)
        .inner_margin(8.0)
        .show(ui, |ui| {
            ui.horizontal(|ui| {
                ui.label(RichText::new(if check.ok { "✓" } else { "✗" }).color(accent));
                ui.label(RichText::new(&check.title).strong());
            });
            if !check.cmd.is_empty() {
                ui.label(RichText::new(format!("$ {}", check.cmd)).monospace().small().weak());
            }
            for result in &check.results {
                node_result(ui, result);
            }
        });
    ui.add_space(4.0);
}
