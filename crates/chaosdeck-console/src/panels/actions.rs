//! Grouped action cards with their parameter forms.

use chaosdeck_control::{Catalog, ParamForm};
use egui::{Color32, RichText, Ui};
use std::collections::{HashMap, HashSet};

use super::form::param_form_ui;
use super::results::FAIL_RED;

/// What the operator did this frame.
#[derive(Default)]
pub struct ActionsPanelAction {
    /// Action key whose run control was clicked.
    pub dispatch: Option<String>,
}

/// Render one section per known group, in catalog order. Actions bound to
/// an unknown group are reachable through no section and never render.
pub fn actions_panel(
    ui: &mut Ui,
    catalog: &Catalog,
    forms: &mut HashMap<String, ParamForm>,
    busy: &HashSet<String>,
) -> ActionsPanelAction {
    let mut panel_action = ActionsPanelAction::default();

    if catalog.actions.is_empty() {
        ui.label(RichText::new("No actions loaded. Refresh the catalog.").weak());
        return panel_action;
    }

    for group in &catalog.groups {
        let actions = catalog.actions_in_group(&group.key);
        if actions.is_empty() {
            continue;
        }

        ui.heading(&group.title);
        if !group.desc.is_empty() {
            ui.label(RichText::new(&group.desc).small().weak());
        }
        ui.add_space(4.0);

        for action in actions {
            egui::Frame::default()
                .fill(Color32::from_rgb(38, 40, 46))
                .rounding(6.0)
                .inner_margin(10.0)
                .show(ui, |ui| {
                    ui.horizontal(|ui| {
                        ui.label(RichText::new(&action.title).strong());
                        if action.danger {
                            ui.label(RichText::new("high risk").small().color(FAIL_RED));
                        }
                    });
                    if !action.desc.is_empty() {
                        ui.label(RichText::new(&action.desc).small().weak());
                    }

                    if !action.params.is_empty() {
                        ui.add_space(4.0);
                        let form = forms.entry(action.key.clone()).or_insert_with(|| {
                            ParamForm::new(&action.params, catalog.node_suggestions())
                        });
                        param_form_ui(ui, form, &action.key);
                    }

                    ui.add_space(4.0);
                    let running = busy.contains(&action.key);
                    let label = if running { "Running…" } else { "Run" };
                    if ui.add_enabled(!running, egui::Button::new(label)).clicked() {
                        panel_action.dispatch = Some(action.key.clone());
                    }
                });
            ui.add_space(6.0);
        }
        ui.add_space(8.0);
    }

    panel_action
}
