// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! Toast-style notices in the bottom-right corner.

use crate::context::{NoticeLevel, Notices};

/// Display the notices. Returns the index of a notice the user dismissed.
pub fn show(ctx: &egui::Context, notices: &Notices) -> Option<usize> {
    if notices.is_empty() {
        return None;
    }

    let mut dismissed = None;
    egui::Area::new(egui::Id::new("notices"))
        .anchor(egui::Align2::RIGHT_BOTTOM, egui::vec2(-12.0, -12.0))
        .order(egui::Order::Tooltip)
        .show(ctx, |ui| {
            ui.set_max_width(360.0);
            for (index, notice) in notices.iter().enumerate() {
                let (fill, icon) = match notice.level {
                    NoticeLevel::Info => (egui::Color32::from_rgb(30, 70, 120), "ℹ"),
                    NoticeLevel::Warning => (egui::Color32::from_rgb(130, 95, 20), "⚠"),
                    NoticeLevel::Error => (egui::Color32::from_rgb(140, 35, 35), "✖"),
                };
                egui::Frame::popup(ui.style()).fill(fill).show(ui, |ui| {
                    ui.horizontal(|ui| {
                        ui.label(egui::RichText::new(icon).color(egui::Color32::WHITE));
                        ui.label(egui::RichText::new(&notice.text).color(egui::Color32::WHITE));
                        if ui.small_button("✕").clicked() {
                            dismissed = Some(index);
                        }
                    });
                });
                ui.add_space(4.0);
            }
        });
    dismissed
}
