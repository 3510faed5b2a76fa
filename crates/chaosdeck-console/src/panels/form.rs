//! Parameter-form rendering over the [`ParamForm`] model.

use chaosdeck_control::ParamForm;
use chaosdeck_types::FieldKind;
use egui::{ComboBox, RichText, TextEdit, Ui};

/// Render every field of `form`, typed per kind. Returns true when any
/// value changed this frame; dependency rules are re-applied on change.
pub fn param_form_ui(ui: &mut Ui, form: &mut ParamForm, id_salt: &str) -> bool {
    let mut changed = false;
    let suggestions = form.suggestions().to_vec();

    for index in 0..form.len() {
        let Some(field) = form.field_mut(index) else {
            continue;
        };
        let spec = field.spec.clone();

        ui.horizontal(|ui| {
            let mut label = RichText::new(&spec.label);
            if !spec.required {
                label = RichText::new(format!("{} (optional)", spec.label));
            }
            ui.label(label.small());
        });

        match spec.kind {
            FieldKind::Select => {
                let mut selected = field.value.clone();
                let selected_label = spec
                    .options
                    .iter()
                    .find(|o| o.value == selected)
                    .map(|o| o.label.clone())
                    .unwrap_or_else(|| selected.clone());
                ComboBox::from_id_salt((id_salt, &spec.name))
                    .selected_text(selected_label)
                    .width(200.0)
                    .show_ui(ui, |ui| {
                        for option in &spec.options {
                            ui.selectable_value(
                                &mut selected,
                                option.value.clone(),
                                option.label.clone(),
                            );
                        }
                    });
                if selected != field.value {
                    field.value = selected;
                    changed = true;
                }
            }
            FieldKind::Node => {
                let response = ui.add_enabled(
                    field.enabled,
                    TextEdit::singleline(&mut field.value)
                        .hint_text(field.placeholder.clone())
                        .desired_width(200.0),
                );
                if response.changed() {
                    changed = true;
                }
                if !suggestions.is_empty() {
                    ui.label(
                        RichText::new(format!("known: {}", suggestions.join(", ")))
                            .small()
                            .weak(),
                    );
                }
            }
            FieldKind::Number | FieldKind::Text => {
                let response = ui.add_enabled(
                    field.enabled,
                    TextEdit::singleline(&mut field.value)
                        .hint_text(field.placeholder.clone())
                        .desired_width(200.0),
                );
                if response.changed() {
                    changed = true;
                }
            }
        }

        if let Some(help) = &spec.help {
            ui.label(RichText::new(help).small().weak());
        }
        ui.add_space(4.0);
    }

    if changed {
        form.apply_rules();
    }
    changed
}
