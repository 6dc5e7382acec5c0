// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! Overlay panel.
//!
//! The form for adding text and image overlays, and the list of existing
//! overlays with delete confirmation.

use crate::board::OverlayBoard;
use crate::models::overlay::{Overlay, OverlayId, OverlayKind};
use crate::ui::images::{ImageCache, ImageState};

/// Characters of content quoted in the delete confirmation
const CONFIRM_QUOTE_CHARS: usize = 30;

/// Result of panel interaction.
pub enum PropertiesAction {
    None,
    Create { kind: OverlayKind, content: String },
    /// Ask the user to confirm deleting an overlay
    RequestDelete(OverlayId),
}

/// Contents of the add-overlay form.
#[derive(Debug, Default)]
pub struct AddForm {
    pub kind: OverlayKind,
    pub content: String,
    pub preview: bool,
}

impl AddForm {
    pub fn clear(&mut self) {
        self.content.clear();
        self.preview = false;
    }
}

/// Display the overlay panel.
pub fn show(
    ui: &mut egui::Ui,
    form: &mut AddForm,
    board: &OverlayBoard,
    images: &mut ImageCache,
) -> PropertiesAction {
    let mut action = PropertiesAction::None;

    ui.heading("Add Overlay");
    ui.add_space(4.0);

    ui.horizontal(|ui| {
        ui.radio_value(&mut form.kind, OverlayKind::Text, "Text");
        ui.radio_value(&mut form.kind, OverlayKind::Image, "Image");
    });

    let hint = match form.kind {
        OverlayKind::Text => "Overlay text",
        OverlayKind::Image => "https://example.com/logo.png",
    };
    ui.add(
        egui::TextEdit::singleline(&mut form.content)
            .hint_text(hint)
            .desired_width(f32::INFINITY),
    );

    ui.horizontal(|ui| {
        if ui.button("Add").clicked() {
            action = PropertiesAction::Create {
                kind: form.kind,
                content: form.content.clone(),
            };
        }
        ui.toggle_value(&mut form.preview, "Preview");
        if ui.button("Clear").clicked() {
            form.clear();
        }
    });

    if form.preview && !form.content.trim().is_empty() {
        ui.add_space(4.0);
        preview(ui, form, images);
    }

    ui.add_space(8.0);
    ui.separator();

    ui.heading(format!("Overlays ({})", board.overlays().len()));
    if !board.is_loaded() {
        ui.horizontal(|ui| {
            ui.spinner();
            ui.label("Loading overlays...");
        });
        return action;
    }
    if board.overlays().is_empty() {
        ui.label(egui::RichText::new("No overlays yet").weak());
        return action;
    }

    egui::ScrollArea::vertical().show(ui, |ui| {
        for overlay in board.overlays() {
            ui.group(|ui| {
                ui.horizontal(|ui| {
                    ui.label(egui::RichText::new(overlay.kind.label()).strong());
                    ui.label(format!("{:.0}%", overlay.opacity * 100.0));
                    ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                        let deleting = board.is_deleting(&overlay.id);
                        if ui.add_enabled(!deleting, egui::Button::new("Delete")).clicked() {
                            action = PropertiesAction::RequestDelete(overlay.id.clone());
                        }
                    });
                });
                ui.label(egui::RichText::new(&overlay.content).weak());
            });
        }
    });

    action
}

fn preview(ui: &mut egui::Ui, form: &AddForm, images: &mut ImageCache) {
    let content = form.content.trim();
    match form.kind {
        OverlayKind::Text => {
            egui::Frame::none()
                .fill(egui::Color32::from_black_alpha(150))
                .rounding(4.0)
                .inner_margin(8.0)
                .show(ui, |ui| {
                    ui.label(egui::RichText::new(content).color(egui::Color32::WHITE).size(18.0));
                });
        }
        OverlayKind::Image => match images.get(content) {
            ImageState::Ready(texture) => {
                let image = egui::Image::from_texture(egui::load::SizedTexture::from_handle(texture));
                ui.add(image.max_size(egui::vec2(200.0, 100.0)));
            }
            ImageState::Loading => {
                ui.horizontal(|ui| {
                    ui.spinner();
                    ui.label("Loading preview...");
                });
            }
            ImageState::Failed => {
                ui.colored_label(egui::Color32::LIGHT_RED, "Image Error");
            }
        },
    }
}

/// Text of the delete confirmation for an overlay.
pub fn confirm_text(overlay: &Overlay) -> String {
    let quoted: String = overlay.content.chars().take(CONFIRM_QUOTE_CHARS).collect();
    format!("Delete overlay \"{}...\"?", quoted)
}

/// Show the delete confirmation. Returns the user's answer once given.
pub fn confirm_delete(ctx: &egui::Context, overlay: &Overlay) -> Option<bool> {
    let mut answer = None;
    egui::Window::new("Confirm Delete")
        .collapsible(false)
        .resizable(false)
        .anchor(egui::Align2::CENTER_CENTER, egui::vec2(0.0, 0.0))
        .show(ctx, |ui| {
            ui.label(confirm_text(overlay));
            ui.add_space(8.0);
            ui.horizontal(|ui| {
                if ui.button("Delete").clicked() {
                    answer = Some(true);
                }
                if ui.button("Cancel").clicked() {
                    answer = Some(false);
                }
            });
        });
    answer
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::overlay;

    #[test]
    fn test_confirm_text_quotes_first_30_chars() {
        let mut long = overlay("a", 0.0, 0.0, 10.0, 10.0);
        long.content = "Breaking news: the quick brown fox jumps over the lazy dog".to_string();
        assert_eq!(confirm_text(&long), "Delete overlay \"Breaking news: the quick brown...\"?");

        let mut short = overlay("b", 0.0, 0.0, 10.0, 10.0);
        short.content = "LIVE".to_string();
        assert_eq!(confirm_text(&short), "Delete overlay \"LIVE...\"?");
    }

    #[test]
    fn test_confirm_text_counts_chars_not_bytes() {
        let mut wide = overlay("c", 0.0, 0.0, 10.0, 10.0);
        wide.content = "é".repeat(40);
        assert_eq!(confirm_text(&wide), format!("Delete overlay \"{}...\"?", "é".repeat(30)));
    }

    #[test]
    fn test_form_clear() {
        let mut form = AddForm {
            kind: OverlayKind::Image,
            content: "https://example.com/a.png".to_string(),
            preview: true,
        };
        form.clear();
        assert!(form.content.is_empty());
        assert!(!form.preview);
        assert_eq!(form.kind, OverlayKind::Image);
    }
}
