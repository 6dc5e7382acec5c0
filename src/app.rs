// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! Main application state and egui App implementation.
//!
//! `DeckApp` owns the [`DeckContext`] plus the purely visual state (form
//! contents, textures, the pending delete confirmation). Each frame it
//! drains background results, lays out the panels and feeds the resulting
//! actions back into the context.

use crate::context::DeckContext;
use crate::engine::frame::RenderTarget;
use crate::models::overlay::OverlayId;
use crate::ui::canvas::{self, CanvasAction};
use crate::ui::images::ImageCache;
use crate::ui::properties::{self, AddForm, PropertiesAction};
use crate::ui::{notices, toolbar};
use std::time::{Duration, Instant};

/// Repaint interval while a background call is outstanding
const BUSY_REPAINT: Duration = Duration::from_millis(100);
/// Repaint interval for the live clock
const PLAYING_REPAINT: Duration = Duration::from_secs(1);

pub struct DeckApp {
    deck: DeckContext,
    images: ImageCache,
    form: AddForm,
    /// Contents of the stream URL field
    source_url: String,
    /// Overlay awaiting delete confirmation
    pending_delete: Option<OverlayId>,
    /// Fullscreen state last requested from the window
    viewport_target: RenderTarget,
    /// Fullscreen state the window last reported
    window_fullscreen: Option<bool>,
}

impl DeckApp {
    pub fn new(mut deck: DeckContext, images: ImageCache) -> Self {
        deck.startup();
        Self {
            deck,
            images,
            form: AddForm::default(),
            source_url: String::new(),
            pending_delete: None,
            viewport_target: RenderTarget::Normal,
            window_fullscreen: None,
        }
    }

    fn toggle_fullscreen(&mut self, now: Instant) {
        let target = self.deck.toggle_fullscreen(now);
        log::info!("Switching to {:?} view", target);
    }

    /// Follow fullscreen changes the window made without us asking.
    fn follow_window(&mut self, ctx: &egui::Context, now: Instant) {
        let reported = ctx.input(|i| i.viewport().fullscreen);
        if reported == self.window_fullscreen {
            return;
        }
        self.window_fullscreen = reported;

        let Some(fullscreen) = reported else {
            return;
        };
        let target = if fullscreen {
            RenderTarget::Fullscreen
        } else {
            RenderTarget::Normal
        };
        if target != self.viewport_target {
            log::info!("Window switched to {:?} view", target);
            self.viewport_target = target;
            self.deck.follow_window(target, now);
        }
    }

    /// Apply canvas actions in the order they were produced.
    ///
    /// Failures are already queued as notices by the context.
    fn apply_canvas(&mut self, ctx: &egui::Context, actions: Vec<CanvasAction>, now: Instant) {
        for action in actions {
            match action {
                CanvasAction::SurfaceMeasured(frame) => {
                    if self.deck.observe_frame(frame, now) {
                        ctx.request_repaint();
                    }
                }
                CanvasAction::PointerPressed { x, y } => self.deck.pointer_pressed(x, y),
                CanvasAction::ClickOverlay(id) => self.deck.click_overlay(&id, now),
                CanvasAction::BeginGesture(id, kind) => {
                    self.deck.begin_gesture(&id, kind);
                }
                CanvasAction::UpdateGesture { dx, dy } => self.deck.update_gesture(dx, dy),
                CanvasAction::EndGesture => {
                    let _ = self.deck.end_gesture(now);
                }
                CanvasAction::PreviewOpacity(id, opacity) => self.deck.preview_opacity(&id, opacity),
                CanvasAction::CommitOpacity(id) => {
                    let _ = self.deck.commit_opacity(&id, now);
                }
                CanvasAction::Delete(id) => {
                    let _ = self.deck.delete_overlay(&id, now);
                }
            }
        }
    }

    fn show_delete_confirmation(&mut self, ctx: &egui::Context, now: Instant) {
        let Some(id) = self.pending_delete.clone() else {
            return;
        };
        let answer = self
            .deck
            .board()
            .get(&id)
            .map(|overlay| properties::confirm_delete(ctx, overlay));

        match answer {
            // Gone already
            None => self.pending_delete = None,
            Some(Some(true)) => {
                self.pending_delete = None;
                let _ = self.deck.delete_overlay(&id, now);
            }
            Some(Some(false)) => self.pending_delete = None,
            Some(None) => {}
        }
    }

    fn schedule_repaint(&self, ctx: &egui::Context, now: Instant) {
        if self.deck.is_busy() || self.images.is_loading() {
            ctx.request_repaint_after(BUSY_REPAINT);
        }
        if self.deck.is_playing() {
            ctx.request_repaint_after(PLAYING_REPAINT);
        }
        if let Some(deadline) = self.deck.next_deadline(now) {
            ctx.request_repaint_after(deadline);
        }
    }
}

impl eframe::App for DeckApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        let now = Instant::now();

        // Check for completed background work
        self.deck.poll(now);
        self.images.poll(ctx);
        self.follow_window(ctx, now);

        // Handle keyboard events
        // Only process if no text field is focused (to avoid deleting while typing)
        if !ctx.wants_keyboard_input() {
            if ctx.input(|i| i.key_pressed(egui::Key::Delete) || i.key_pressed(egui::Key::Backspace)) {
                self.deck.delete_selected(now);
            }
            if ctx.input(|i| i.key_pressed(egui::Key::F11)) {
                self.toggle_fullscreen(now);
            }
        }
        if ctx.input(|i| i.key_pressed(egui::Key::Escape)) {
            self.deck.cancel_gesture(now);
            self.deck.exit_fullscreen(now);
        }

        let fullscreen = self.deck.render_target() == RenderTarget::Fullscreen;

        if !fullscreen {
            // Toolbar
            let toolbar_action = egui::TopBottomPanel::top("toolbar")
                .show(ctx, |ui| {
                    toolbar::show(
                        ui,
                        &mut self.source_url,
                        self.deck.session().state(),
                        self.deck.render_target(),
                    )
                })
                .inner;

            match toolbar_action {
                toolbar::ToolbarAction::Start => {
                    let url = self.source_url.clone();
                    let _ = self.deck.start_stream(&url, now);
                }
                toolbar::ToolbarAction::Stop => {
                    let _ = self.deck.stop_stream(now);
                }
                toolbar::ToolbarAction::ToggleFullscreen => self.toggle_fullscreen(now),
                toolbar::ToolbarAction::None => {}
            }

            // Overlay panel (right side)
            let properties_action = egui::SidePanel::right("properties")
                .default_width(280.0)
                .show(ctx, |ui| properties::show(ui, &mut self.form, self.deck.board(), &mut self.images))
                .inner;

            match properties_action {
                PropertiesAction::Create { kind, content } => {
                    if self.deck.create_overlay(kind, &content, now).is_ok() {
                        self.form.clear();
                    }
                }
                PropertiesAction::RequestDelete(id) => self.pending_delete = Some(id),
                PropertiesAction::None => {}
            }
        }

        // Video surface (center)
        let mut panel = egui::CentralPanel::default();
        if fullscreen {
            panel = panel.frame(egui::Frame::none().fill(egui::Color32::BLACK));
        }
        let canvas_actions = panel
            .show(ctx, |ui| canvas::show(ui, &self.deck, &mut self.images, !fullscreen))
            .inner;
        self.apply_canvas(ctx, canvas_actions, now);

        self.show_delete_confirmation(ctx, now);

        if let Some(index) = notices::show(ctx, self.deck.notices()) {
            self.deck.notices_mut().dismiss(index);
        }

        // Keep the window in step with the render target
        let target = self.deck.render_target();
        if target != self.viewport_target {
            ctx.send_viewport_cmd(egui::ViewportCommand::Fullscreen(target == RenderTarget::Fullscreen));
            self.viewport_target = target;
        }

        self.schedule_repaint(ctx, now);
    }

    fn on_exit(&mut self, _gl: Option<&eframe::glow::Context>) {
        log::info!("Shutting down");
        self.deck.shutdown();
    }
}
