// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! Video surface with the overlay layer on top.
//!
//! The surface shows the player state and, while playing, every overlay at
//! the pixel rectangle the geometry engine computed for it. Overlays can be
//! dragged by the body and resized from any edge or corner; the selected one
//! gets handle dots and an opacity slider.

use crate::context::{DeckContext, OverlayView};
use crate::engine::{GestureKind, ResizeHandle};
use crate::models::overlay::{OverlayId, OverlayKind, OPACITY_MAX, OPACITY_MIN};
use crate::models::session::SessionState;
use crate::ui::images::{ImageCache, ImageState};
use crate::util::geometry::{Frame, PixelRect};

/// Thickness of the grab strip along each edge
const EDGE_GRAB: f32 = 6.0;
/// Side of the grab square at each corner
const CORNER_GRAB: f32 = 12.0;
const STATUS_HEIGHT: f32 = 22.0;

/// Result of canvas interaction, applied in order by the app.
#[derive(Debug, Clone, PartialEq)]
pub enum CanvasAction {
    /// Size of the video surface laid out this frame
    SurfaceMeasured(Frame),
    /// Pointer went down at surface coordinates
    PointerPressed { x: f64, y: f64 },
    ClickOverlay(OverlayId),
    BeginGesture(OverlayId, GestureKind),
    /// Pointer movement since the previous update
    UpdateGesture { dx: f64, dy: f64 },
    EndGesture,
    PreviewOpacity(OverlayId, f64),
    CommitOpacity(OverlayId),
    Delete(OverlayId),
}

/// Display the video surface and handle overlay interaction.
pub fn show(
    ui: &mut egui::Ui,
    deck: &DeckContext,
    images: &mut ImageCache,
    show_status: bool,
) -> Vec<CanvasAction> {
    let mut actions = Vec::new();

    let mut size = ui.available_size();
    if show_status {
        size.y = (size.y - STATUS_HEIGHT).max(0.0);
    }
    let (surface, _) = ui.allocate_exact_size(size, egui::Sense::hover());
    actions.push(CanvasAction::SurfaceMeasured(Frame::new(
        surface.width() as f64,
        surface.height() as f64,
    )));

    draw_surface(ui, surface, deck);

    let mut slider_rects = Vec::new();
    for view in deck.overlay_views() {
        let rect = to_screen(surface, view.rect);
        draw_overlay(ui.painter(), rect, &view, images);
        overlay_interaction(ui, rect, &view, &mut actions);

        if view.selected {
            slider_rects.push(opacity_slider(ui.ctx(), rect, &view, &mut actions));
        }
    }

    let press = ui.input(|i| {
        if i.pointer.any_pressed() {
            i.pointer.press_origin()
        } else {
            None
        }
    });
    if let Some(pos) = press {
        // Handled before any click this press starts
        if !slider_rects.iter().any(|r| r.contains(pos)) {
            let pressed = CanvasAction::PointerPressed {
                x: (pos.x - surface.min.x) as f64,
                y: (pos.y - surface.min.y) as f64,
            };
            actions.insert(1, pressed);
        }
    }

    if show_status {
        status_line(ui, deck);
    }

    actions
}

fn to_screen(surface: egui::Rect, rect: PixelRect) -> egui::Rect {
    egui::Rect::from_min_size(
        surface.min + egui::vec2(rect.x as f32, rect.y as f32),
        egui::vec2(rect.width as f32, rect.height as f32),
    )
}

/// Draw the player surface for the current session state.
fn draw_surface(ui: &mut egui::Ui, surface: egui::Rect, deck: &DeckContext) {
    let painter = ui.painter_at(surface);
    painter.rect_filled(surface, 0.0, egui::Color32::BLACK);

    let center = surface.center();
    let session = deck.session();
    match session.state() {
        SessionState::Idle => {
            painter.text(
                center - egui::vec2(0.0, 12.0),
                egui::Align2::CENTER_CENTER,
                "No stream",
                egui::FontId::proportional(28.0),
                egui::Color32::from_gray(200),
            );
            painter.text(
                center + egui::vec2(0.0, 20.0),
                egui::Align2::CENTER_CENTER,
                "Enter an RTSP or HLS URL above and press Start",
                egui::FontId::proportional(14.0),
                egui::Color32::from_gray(150),
            );
        }
        SessionState::Starting | SessionState::Stopping => {
            let message = match (session.state(), session.session().source_url.as_deref()) {
                (SessionState::Starting, Some(url)) => format!("Starting {}...", url),
                (SessionState::Starting, None) => "Starting stream...".to_string(),
                _ => "Stopping stream...".to_string(),
            };
            let spinner = egui::Rect::from_center_size(center - egui::vec2(0.0, 20.0), egui::vec2(24.0, 24.0));
            ui.put(spinner, egui::Spinner::new().size(24.0));
            painter.text(
                center + egui::vec2(0.0, 16.0),
                egui::Align2::CENTER_CENTER,
                message,
                egui::FontId::proportional(16.0),
                egui::Color32::from_gray(200),
            );
        }
        SessionState::Playing => {
            if let Some(player) = session.player() {
                let elapsed = player.attached_at().elapsed().as_secs();
                painter.text(
                    surface.left_top() + egui::vec2(12.0, 12.0),
                    egui::Align2::LEFT_TOP,
                    format!("● LIVE  {:02}:{:02}", elapsed / 60, elapsed % 60),
                    egui::FontId::proportional(14.0),
                    egui::Color32::from_rgb(230, 60, 60),
                );
                painter.text(
                    surface.left_bottom() + egui::vec2(12.0, -12.0),
                    egui::Align2::LEFT_BOTTOM,
                    player.source(),
                    egui::FontId::monospace(12.0),
                    egui::Color32::from_gray(120),
                );
            }
        }
    }
}

fn draw_overlay(painter: &egui::Painter, rect: egui::Rect, view: &OverlayView<'_>, images: &mut ImageCache) {
    let opacity = view.opacity as f32;

    match view.overlay.kind {
        OverlayKind::Text => {
            painter.rect_filled(rect, 4.0, egui::Color32::from_black_alpha(150).gamma_multiply(opacity));
            painter.text(
                rect.center(),
                egui::Align2::CENTER_CENTER,
                &view.overlay.content,
                egui::FontId::proportional(18.0),
                egui::Color32::WHITE.gamma_multiply(opacity),
            );
        }
        OverlayKind::Image => match images.get(&view.overlay.content) {
            ImageState::Ready(texture) => {
                let fitted = fit_within(rect, texture.size_vec2());
                painter.image(
                    texture.id(),
                    fitted,
                    egui::Rect::from_min_max(egui::pos2(0.0, 0.0), egui::pos2(1.0, 1.0)),
                    egui::Color32::WHITE.gamma_multiply(opacity),
                );
            }
            ImageState::Loading => {
                painter.rect_filled(rect, 4.0, egui::Color32::from_black_alpha(100));
                painter.text(
                    rect.center(),
                    egui::Align2::CENTER_CENTER,
                    "Loading...",
                    egui::FontId::proportional(13.0),
                    egui::Color32::from_gray(180),
                );
            }
            ImageState::Failed => {
                painter.rect_filled(rect, 4.0, egui::Color32::from_rgba_unmultiplied(120, 20, 20, 160));
                painter.text(
                    rect.center(),
                    egui::Align2::CENTER_CENTER,
                    "Image Error",
                    egui::FontId::proportional(14.0),
                    egui::Color32::WHITE,
                );
            }
        },
    }

    if view.selected {
        painter.rect_stroke(rect, 4.0, egui::Stroke::new(2.0, egui::Color32::from_rgb(80, 160, 255)));
        for corner in [rect.left_top(), rect.right_top(), rect.left_bottom(), rect.right_bottom()] {
            painter.circle_filled(corner, 4.0, egui::Color32::WHITE);
            painter.circle_stroke(corner, 4.0, egui::Stroke::new(1.0, egui::Color32::from_rgb(80, 160, 255)));
        }
    } else if view.deleting {
        painter.rect_stroke(rect, 4.0, egui::Stroke::new(1.0, egui::Color32::from_gray(90)));
    }
}

/// Largest rect with the image's aspect ratio centered inside `rect`.
fn fit_within(rect: egui::Rect, image: egui::Vec2) -> egui::Rect {
    if image.x <= 0.0 || image.y <= 0.0 {
        return rect;
    }
    let scale = (rect.width() / image.x).min(rect.height() / image.y);
    egui::Rect::from_center_size(rect.center(), image * scale)
}

fn overlay_interaction(
    ui: &mut egui::Ui,
    rect: egui::Rect,
    view: &OverlayView<'_>,
    actions: &mut Vec<CanvasAction>,
) {
    let id = &view.overlay.id;

    let body = ui.interact(rect, egui::Id::new(("overlay", id)), egui::Sense::click_and_drag());
    if body.hovered() {
        ui.ctx().set_cursor_icon(egui::CursorIcon::Grab);
    }
    if body.clicked() {
        actions.push(CanvasAction::ClickOverlay(id.clone()));
    }
    track_gesture(&body, id, GestureKind::Drag, actions);

    for (index, handle) in ResizeHandle::ALL.into_iter().enumerate() {
        let response = ui.interact(
            handle_rect(rect, handle),
            egui::Id::new(("resize", id, index)),
            egui::Sense::drag(),
        );
        if response.hovered() || response.dragged() {
            ui.ctx().set_cursor_icon(cursor_for(handle));
        }
        track_gesture(&response, id, GestureKind::Resize(handle), actions);
    }

    if ui.rect_contains_pointer(rect) && !view.deleting {
        let button = egui::Rect::from_min_size(rect.right_top() + egui::vec2(-22.0, 2.0), egui::vec2(20.0, 20.0));
        if ui.put(button, egui::Button::new("✕").small()).on_hover_text("Delete overlay").clicked() {
            actions.push(CanvasAction::Delete(id.clone()));
        }
    }
}

fn track_gesture(
    response: &egui::Response,
    id: &OverlayId,
    kind: GestureKind,
    actions: &mut Vec<CanvasAction>,
) {
    let delta = if response.dragged() { response.drag_delta() } else { egui::Vec2::ZERO };
    actions.extend(gesture_actions(
        id,
        kind,
        response.drag_started(),
        delta,
        response.drag_stopped(),
    ));
}

/// Actions for one frame of pointer input on a drag target.
///
/// `delta` is the movement during this frame only; the engine accumulates.
pub(crate) fn gesture_actions(
    id: &OverlayId,
    kind: GestureKind,
    started: bool,
    delta: egui::Vec2,
    stopped: bool,
) -> Vec<CanvasAction> {
    let mut actions = Vec::new();
    if started {
        actions.push(CanvasAction::BeginGesture(id.clone(), kind));
    }
    if delta != egui::Vec2::ZERO {
        actions.push(CanvasAction::UpdateGesture {
            dx: delta.x as f64,
            dy: delta.y as f64,
        });
    }
    if stopped {
        actions.push(CanvasAction::EndGesture);
    }
    actions
}

fn handle_rect(rect: egui::Rect, handle: ResizeHandle) -> egui::Rect {
    let corner = |pos: egui::Pos2| egui::Rect::from_center_size(pos, egui::vec2(CORNER_GRAB, CORNER_GRAB));
    let inset = CORNER_GRAB / 2.0;
    let half = EDGE_GRAB / 2.0;
    match handle {
        ResizeHandle::Top => egui::Rect::from_x_y_ranges(
            rect.left() + inset..=rect.right() - inset,
            rect.top() - half..=rect.top() + half,
        ),
        ResizeHandle::Bottom => egui::Rect::from_x_y_ranges(
            rect.left() + inset..=rect.right() - inset,
            rect.bottom() - half..=rect.bottom() + half,
        ),
        ResizeHandle::Left => egui::Rect::from_x_y_ranges(
            rect.left() - half..=rect.left() + half,
            rect.top() + inset..=rect.bottom() - inset,
        ),
        ResizeHandle::Right => egui::Rect::from_x_y_ranges(
            rect.right() - half..=rect.right() + half,
            rect.top() + inset..=rect.bottom() - inset,
        ),
        ResizeHandle::TopLeft => corner(rect.left_top()),
        ResizeHandle::TopRight => corner(rect.right_top()),
        ResizeHandle::BottomLeft => corner(rect.left_bottom()),
        ResizeHandle::BottomRight => corner(rect.right_bottom()),
    }
}

fn cursor_for(handle: ResizeHandle) -> egui::CursorIcon {
    match handle {
        ResizeHandle::Top | ResizeHandle::Bottom => egui::CursorIcon::ResizeVertical,
        ResizeHandle::Left | ResizeHandle::Right => egui::CursorIcon::ResizeHorizontal,
        ResizeHandle::TopLeft | ResizeHandle::BottomRight => egui::CursorIcon::ResizeNwSe,
        ResizeHandle::TopRight | ResizeHandle::BottomLeft => egui::CursorIcon::ResizeNeSw,
    }
}

/// Opacity slider shown beneath the selected overlay. Returns its screen rect.
fn opacity_slider(
    ctx: &egui::Context,
    rect: egui::Rect,
    view: &OverlayView<'_>,
    actions: &mut Vec<CanvasAction>,
) -> egui::Rect {
    let id = &view.overlay.id;
    let mut percent = view.opacity * 100.0;

    let area = egui::Area::new(egui::Id::new(("opacity", id)))
        .fixed_pos(rect.left_bottom() + egui::vec2(0.0, 6.0))
        .order(egui::Order::Foreground)
        .show(ctx, |ui| {
            egui::Frame::popup(ui.style())
                .show(ui, |ui| {
                    ui.horizontal(|ui| {
                        ui.label("Opacity");
                        ui.add(
                            egui::Slider::new(&mut percent, OPACITY_MIN * 100.0..=OPACITY_MAX * 100.0)
                                .suffix("%")
                                .integer(),
                        )
                    })
                    .inner
                })
                .inner
        });

    let slider = area.inner;
    if slider.changed() {
        actions.push(CanvasAction::PreviewOpacity(id.clone(), percent / 100.0));
    }
    if slider.drag_stopped() || (slider.changed() && !slider.dragged()) {
        actions.push(CanvasAction::CommitOpacity(id.clone()));
    }
    area.response.rect
}

fn status_line(ui: &mut egui::Ui, deck: &DeckContext) {
    ui.horizontal(|ui| {
        ui.label(format!("Stream: {}", deck.session().state()));
        ui.separator();
        ui.label(format!("Overlays: {}", deck.board().overlays().len()));
        ui.separator();
        let frame = deck.frame();
        ui.label(format!("Surface: {:.0}×{:.0}", frame.width, frame.height));
        if let Some(id) = deck.selection().selected() {
            ui.separator();
            ui.label(format!("Selected: {}", id));
        }
    });
}
