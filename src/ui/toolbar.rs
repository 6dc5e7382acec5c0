// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! Stream toolbar.
//!
//! URL entry, start/stop and the fullscreen toggle.

use crate::engine::frame::RenderTarget;
use crate::models::session::SessionState;

pub enum ToolbarAction {
    None,
    Start,
    Stop,
    ToggleFullscreen,
}

/// Display the toolbar for the given session state.
pub fn show(
    ui: &mut egui::Ui,
    source_url: &mut String,
    state: SessionState,
    target: RenderTarget,
) -> ToolbarAction {
    let mut action = ToolbarAction::None;

    ui.horizontal(|ui| {
        ui.spacing_mut().item_spacing.x = 8.0;

        ui.label("Stream URL:");

        let editable = state == SessionState::Idle;
        let input = ui.add_enabled(
            editable,
            egui::TextEdit::singleline(source_url)
                .hint_text("rtsp://... or https://.../index.m3u8")
                .desired_width(420.0),
        );
        let submitted = input.lost_focus() && ui.input(|i| i.key_pressed(egui::Key::Enter));

        match state {
            SessionState::Idle => {
                if ui.button("▶ Start").clicked() || submitted {
                    action = ToolbarAction::Start;
                }
            }
            SessionState::Starting => {
                ui.add_enabled(false, egui::Button::new("Starting..."));
                ui.spinner();
            }
            SessionState::Playing => {
                if ui.button("■ Stop").clicked() {
                    action = ToolbarAction::Stop;
                }
            }
            SessionState::Stopping => {
                ui.add_enabled(false, egui::Button::new("Stopping..."));
                ui.spinner();
            }
        }

        ui.separator();

        let label = match target {
            RenderTarget::Normal => "⛶ Fullscreen",
            RenderTarget::Fullscreen => "Exit Fullscreen",
        };
        if ui.button(label).on_hover_text("F11").clicked() {
            action = ToolbarAction::ToggleFullscreen;
        }

        ui.separator();

        let hint = match state {
            SessionState::Idle => "Enter a stream URL and press Start",
            SessionState::Starting => "Waiting for the stream to become available",
            SessionState::Playing => "Click an overlay to select it, drag to move, drag an edge to resize",
            SessionState::Stopping => "Releasing the stream",
        };
        ui.label(egui::RichText::new(hint).italics().weak());
    });

    action
}
