// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! Application context.
//!
//! `DeckContext` owns every piece of session state: the overlay board, the
//! geometry engine, the frame observer, the session controller and the
//! selection. The shell calls into it from input handlers and once per
//! frame through [`DeckContext::poll`]; nothing else holds this state.

use crate::board::{BoardEvent, OverlayBoard};
use crate::config::AppConfig;
use crate::engine::frame::{FrameObserver, RenderTarget};
use crate::engine::{GeometryEngine, GestureKind};
use crate::error::{DeckError, DeckResult};
use crate::io::store::OverlayStore;
use crate::io::stream::StreamService;
use crate::io::tasks::SharedSpawner;
use crate::models::overlay::{
    clamp_opacity, Overlay, OverlayDraft, OverlayId, OverlayKind, OverlayPatch, DEFAULT_POSITION,
    DEFAULT_SIZE,
};
use crate::models::session::SessionState;
use crate::session::player::PlayerFactory;
use crate::session::selection::Selection;
use crate::session::{SessionController, SessionEvent};
use crate::util::geometry::{from_pixels, Frame, PixelRect};
use std::sync::Arc;
use std::time::{Duration, Instant};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoticeLevel {
    Info,
    Warning,
    Error,
}

/// A short message shown to the user until it expires.
#[derive(Debug, Clone, PartialEq)]
pub struct Notice {
    pub level: NoticeLevel,
    pub text: String,
    expires_at: Instant,
}

#[derive(Debug)]
pub struct Notices {
    items: Vec<Notice>,
    duration: Duration,
}

impl Notices {
    pub fn new(duration: Duration) -> Self {
        Self {
            items: Vec::new(),
            duration,
        }
    }

    pub fn push(&mut self, level: NoticeLevel, text: impl Into<String>, now: Instant) {
        self.items.push(Notice {
            level,
            text: text.into(),
            expires_at: now + self.duration,
        });
    }

    pub fn dismiss(&mut self, index: usize) {
        if index < self.items.len() {
            self.items.remove(index);
        }
    }

    /// Drop expired notices.
    pub fn tick(&mut self, now: Instant) {
        self.items.retain(|n| n.expires_at > now);
    }

    pub fn iter(&self) -> impl Iterator<Item = &Notice> {
        self.items.iter()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    fn next_expiry(&self, now: Instant) -> Option<Duration> {
        self.items
            .iter()
            .map(|n| n.expires_at.saturating_duration_since(now))
            .min()
    }
}

/// What the shell needs to draw one overlay.
#[derive(Debug, Clone, Copy)]
pub struct OverlayView<'a> {
    pub overlay: &'a Overlay,
    pub rect: PixelRect,
    /// Opacity to draw with, including an unsaved slider preview
    pub opacity: f64,
    pub selected: bool,
    pub deleting: bool,
}

pub struct DeckContext {
    board: OverlayBoard,
    engine: GeometryEngine,
    frames: FrameObserver,
    session: SessionController,
    selection: Selection,
    notices: Notices,
    opacity_preview: Option<(OverlayId, f64)>,
}

impl DeckContext {
    pub fn new(
        config: &AppConfig,
        store: Arc<dyn OverlayStore>,
        service: Arc<dyn StreamService>,
        spawner: SharedSpawner,
        players: Box<dyn PlayerFactory>,
    ) -> Self {
        Self {
            board: OverlayBoard::new(store, Arc::clone(&spawner)),
            engine: GeometryEngine::new(),
            frames: FrameObserver::new(config.fullscreen_settle()),
            session: SessionController::new(service, spawner, players, config.start_settle()),
            selection: Selection::new(config.selection_timeout()),
            notices: Notices::new(config.notice_duration()),
            opacity_preview: None,
        }
    }

    pub fn board(&self) -> &OverlayBoard {
        &self.board
    }

    pub fn session(&self) -> &SessionController {
        &self.session
    }

    pub fn selection(&self) -> &Selection {
        &self.selection
    }

    pub fn notices(&self) -> &Notices {
        &self.notices
    }

    pub fn notices_mut(&mut self) -> &mut Notices {
        &mut self.notices
    }

    pub fn frame(&self) -> Frame {
        self.frames.frame()
    }

    pub fn render_target(&self) -> RenderTarget {
        self.frames.target()
    }

    pub fn is_playing(&self) -> bool {
        self.session.state() == SessionState::Playing
    }

    /// Load overlays and probe the conversion service.
    pub fn startup(&mut self) {
        self.board.refresh();
        self.session.refresh_status();
    }

    /// Whether a background call is outstanding.
    pub fn is_busy(&self) -> bool {
        self.board.is_busy() || self.session.is_busy()
    }

    /// Time until the next timer fires, if any is armed.
    pub fn next_deadline(&self, now: Instant) -> Option<Duration> {
        [
            self.session.settle_remaining(now),
            self.selection.countdown_remaining(now),
            self.frames.settle_remaining(now),
            self.notices.next_expiry(now),
        ]
        .into_iter()
        .flatten()
        .min()
    }

    /// Apply finished background work and expired timers.
    pub fn poll(&mut self, now: Instant) {
        let was_playing = self.is_playing();
        for event in self.session.poll(now) {
            self.report_session(event, now);
        }
        if was_playing && !self.is_playing() {
            self.leave_playing();
        }

        let events = self.board.poll();
        if !events.is_empty() {
            for event in events {
                self.report_board(event, now);
            }
            self.engine.sync(self.board.overlays());
        }

        self.selection.tick(now);
        self.notices.tick(now);
    }

    /// Report the measured size of the active render surface.
    pub fn observe_frame(&mut self, measured: Frame, now: Instant) -> bool {
        match self.frames.observe(measured, now) {
            Some(frame) => {
                self.engine.on_frame_changed(frame, self.board.overlays());
                true
            }
            None => false,
        }
    }

    pub fn toggle_fullscreen(&mut self, now: Instant) -> RenderTarget {
        self.frames.toggle_fullscreen(now)
    }

    /// Leave fullscreen if it is active.
    pub fn exit_fullscreen(&mut self, now: Instant) -> bool {
        self.frames.switch_target(RenderTarget::Normal, now)
    }

    /// Adopt a fullscreen change the window made on its own, such as one
    /// from the window manager. The surface is re-measured after settling.
    pub fn follow_window(&mut self, target: RenderTarget, now: Instant) -> bool {
        self.frames.switch_target(target, now)
    }

    pub fn start_stream(&mut self, source_url: &str, now: Instant) -> DeckResult<()> {
        let result = self.session.start(source_url);
        self.check(result, now)
    }

    pub fn stop_stream(&mut self, now: Instant) -> DeckResult<()> {
        let was_playing = self.is_playing();
        let result = self.session.stop();
        if was_playing && !self.is_playing() {
            self.leave_playing();
        }
        self.check(result, now)
    }

    pub fn create_overlay(&mut self, kind: OverlayKind, content: &str, now: Instant) -> DeckResult<()> {
        let mut draft = OverlayDraft::new(kind, content);
        let rect = PixelRect::new(
            DEFAULT_POSITION.x,
            DEFAULT_POSITION.y,
            DEFAULT_SIZE.width,
            DEFAULT_SIZE.height,
        );
        if let Some(normalized) = from_pixels(&rect, self.frames.frame()) {
            draft.normalized_position = Some(normalized.position);
            draft.normalized_size = Some(normalized.size);
        }
        let result = self.board.create(draft);
        self.check(result, now)
    }

    /// A click on an overlay toggles its selection.
    pub fn click_overlay(&mut self, id: &str, now: Instant) {
        self.selection.toggle(id, now);
    }

    /// A pointer press anywhere on the video surface.
    pub fn pointer_pressed(&mut self, x: f64, y: f64) {
        let rect = self.selection.selected().and_then(|id| self.engine.rect(id));
        if self.selection.pointer_pressed(x, y, rect) {
            self.opacity_preview = None;
        }
    }

    pub fn begin_gesture(&mut self, id: &str, kind: GestureKind) -> bool {
        if !self.is_playing() || !self.engine.begin_gesture(id, kind) {
            return false;
        }
        self.selection.interaction_started(id);
        true
    }

    pub fn update_gesture(&mut self, dx: f64, dy: f64) {
        self.engine.update_gesture(dx, dy);
    }

    /// Finish the active gesture and send its single update.
    pub fn end_gesture(&mut self, now: Instant) -> DeckResult<()> {
        let Some(id) = self.engine.active_gesture().map(|(id, _)| id.to_string()) else {
            return Ok(());
        };
        let result = match self.engine.end_gesture() {
            Some(commit) => self.board.commit_gesture(&commit),
            None => Ok(()),
        };
        self.engine.sync(self.board.overlays());
        self.selection.interaction_ended(&id, now);
        self.check(result, now)
    }

    pub fn cancel_gesture(&mut self, now: Instant) {
        if let Some(id) = self.engine.active_gesture().map(|(id, _)| id.to_string()) {
            self.engine.cancel_gesture();
            self.selection.interaction_ended(&id, now);
        }
    }

    /// Show a new opacity on screen without saving it.
    pub fn preview_opacity(&mut self, id: &str, opacity: f64) {
        self.selection.interaction_started(id);
        self.opacity_preview = Some((id.to_string(), clamp_opacity(opacity)));
    }

    /// Save the previewed opacity.
    pub fn commit_opacity(&mut self, id: &str, now: Instant) -> DeckResult<()> {
        self.selection.interaction_ended(id, now);
        let Some((preview_id, opacity)) = self.opacity_preview.take() else {
            return Ok(());
        };
        if preview_id != id {
            return Ok(());
        }
        if self.board.get(id).map(|o| o.opacity) == Some(opacity) {
            return Ok(());
        }
        let result = self.board.update(id, OverlayPatch::opacity(opacity));
        self.check(result, now)
    }

    pub fn delete_overlay(&mut self, id: &str, now: Instant) -> DeckResult<()> {
        let result = self.board.delete(id);
        self.check(result, now)
    }

    /// Delete key handler. Does nothing unless the key listener is attached.
    pub fn delete_selected(&mut self, now: Instant) -> bool {
        if self.session.delete_key().is_none() {
            return false;
        }
        let Some(id) = self.selection.selected().map(str::to_string) else {
            return false;
        };
        self.delete_overlay(&id, now).is_ok()
    }

    /// Overlays to draw, in list order. Empty unless playing.
    pub fn overlay_views(&self) -> Vec<OverlayView<'_>> {
        if !self.is_playing() {
            return Vec::new();
        }
        self.board
            .overlays()
            .iter()
            .filter_map(|overlay| {
                let rect = self.engine.rect(&overlay.id)?;
                let opacity = match self.opacity_preview {
                    Some((ref id, opacity)) if *id == overlay.id => opacity,
                    _ => overlay.opacity,
                };
                Some(OverlayView {
                    overlay,
                    rect,
                    opacity,
                    selected: self.selection.is_selected(&overlay.id),
                    deleting: self.board.is_deleting(&overlay.id),
                })
            })
            .collect()
    }

    /// Release the player and stop a live stream. Called on exit.
    pub fn shutdown(&mut self) {
        self.engine.cancel_gesture();
        self.selection.clear();
        self.session.shutdown();
    }

    fn leave_playing(&mut self) {
        self.engine.cancel_gesture();
        self.selection.clear();
        self.opacity_preview = None;
    }

    fn check(&mut self, result: DeckResult<()>, now: Instant) -> DeckResult<()> {
        if let Err(ref e) = result {
            let level = match e {
                DeckError::Validation(_) | DeckError::InvalidState { .. } => NoticeLevel::Warning,
                DeckError::Remote(_) | DeckError::Player(_) => NoticeLevel::Error,
            };
            self.notices.push(level, e.to_string(), now);
        }
        result
    }

    fn report_session(&mut self, event: SessionEvent, now: Instant) {
        let (level, text) = match event {
            SessionEvent::Converting { source_url } => {
                (NoticeLevel::Info, format!("Converting {}. Loading stream...", source_url))
            }
            SessionEvent::Playing { .. } => (NoticeLevel::Info, "Stream started successfully!".to_string()),
            SessionEvent::StartFailed(e) => (NoticeLevel::Error, e.to_string()),
            SessionEvent::Stopped => (NoticeLevel::Info, "Stream stopped".to_string()),
            SessionEvent::StopWarning(e) => (
                NoticeLevel::Warning,
                format!("Stream stopped, but the server did not confirm: {}", e),
            ),
            SessionEvent::BackendActive(status) => (
                NoticeLevel::Info,
                format!(
                    "The server is already converting {}",
                    status.source_url.as_deref().unwrap_or("a stream")
                ),
            ),
        };
        self.notices.push(level, text, now);
    }

    fn report_board(&mut self, event: BoardEvent, now: Instant) {
        match event {
            BoardEvent::Loaded(_) | BoardEvent::Updated(_) => {}
            BoardEvent::Created(_) => {
                self.notices.push(NoticeLevel::Info, "Overlay created successfully!", now);
            }
            BoardEvent::Deleted(id) => {
                self.selection.forget(&id);
                if matches!(self.opacity_preview, Some((ref p, _)) if *p == id) {
                    self.opacity_preview = None;
                }
                self.notices.push(NoticeLevel::Info, "Overlay deleted successfully!", now);
            }
            BoardEvent::LoadFailed(e) | BoardEvent::CreateFailed(e) => {
                self.notices.push(NoticeLevel::Error, e.to_string(), now);
            }
            BoardEvent::UpdateFailed { error, .. } | BoardEvent::DeleteFailed { error, .. } => {
                self.notices.push(NoticeLevel::Error, error.to_string(), now);
            }
        }
    }
}
