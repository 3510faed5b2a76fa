//! Node overview strip.

use chaosdeck_types::NodeInfo;
use egui::{Color32, RichText, Ui};

pub fn nodes_panel(ui: &mut Ui, nodes: &[NodeInfo]) {
    if nodes.is_empty() {
        ui.label(RichText::new("No nodes loaded.").weak());
        return;
    }

    ui.horizontal_wrapped(|ui| {
        for node in nodes {
            egui::Frame::default()
                .fill(Color32::from_rgb(36, 38, 44))
                .rounding(6.0)
                .inner_margin(8.0)
                .show(ui, |ui| {
                    ui.vertical(|ui| {
                        ui.label(RichText::new(&node.name).strong());
                        let endpoint = match node.port {
                            Some(port) => format!("{}:{}", node.host, port),
                            None => node.host.clone(),
                        };
                        ui.label(RichText::new(endpoint).small().weak());
                        if !node.role.is_empty() {
                            ui.label(RichText::new(format!("role: {}", node.role)).small().weak());
                        }
                        let (tag, color) = if node.local {
                            ("local", Color32::from_rgb(90, 150, 220))
                        } else {
                            ("ssh", Color32::from_rgb(150, 120, 210))
                        };
                        ui.label(RichText::new(tag).small().color(color));
                    });
                });
        }
    });
}
