// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! Overlay geometry engine.
//!
//! The engine owns the pixel rectangle of every overlay, derived from the
//! overlay's normalized record and the current container frame. It is the
//! only writer of that cache. Frame changes recompute the cache from the
//! normalized record and never the other way round; the only path from
//! pixels back to percentages is the end of a user gesture, which yields
//! exactly one [`GestureCommit`].

pub mod frame;
pub mod gesture;

pub use gesture::{GestureCommit, GestureKind, ResizeHandle};

use crate::models::overlay::{Overlay, OverlayId};
use crate::util::geometry::{from_pixels, to_pixels, Frame, PixelRect};
use gesture::Gesture;
use std::collections::HashMap;

#[derive(Debug, Default)]
pub struct GeometryEngine {
    frame: Frame,
    cache: HashMap<OverlayId, PixelRect>,
    gesture: Option<Gesture>,
}

impl GeometryEngine {
    pub fn new() -> Self {
        Self::default()
    }

    /// Pixel rectangle to draw the overlay at.
    pub fn rect(&self, id: &str) -> Option<PixelRect> {
        match self.gesture {
            Some(ref gesture) if gesture.id == id => Some(gesture.current),
            _ => self.cache.get(id).copied(),
        }
    }

    pub fn active_gesture(&self) -> Option<(&str, GestureKind)> {
        self.gesture.as_ref().map(|g| (g.id.as_str(), g.kind))
    }

    /// Recompute the cache from the overlays' normalized records.
    ///
    /// The overlay under an active gesture keeps its live rectangle. Entries
    /// for overlays no longer in the list are dropped, and a gesture on a
    /// vanished overlay is cancelled.
    pub fn sync(&mut self, overlays: &[Overlay]) {
        self.cache.retain(|id, _| overlays.iter().any(|o| &o.id == id));

        if let Some(ref gesture) = self.gesture {
            if !overlays.iter().any(|o| o.id == gesture.id) {
                log::debug!("Overlay {} removed mid-gesture", gesture.id);
                self.gesture = None;
            }
        }

        for overlay in overlays {
            self.cache.insert(overlay.id.clone(), to_pixels(overlay, self.frame));
        }
    }

    /// React to a new container frame.
    pub fn on_frame_changed(&mut self, frame: Frame, overlays: &[Overlay]) {
        self.frame = frame;
        self.sync(overlays);
    }

    /// Begin a drag or resize. Only one gesture runs at a time.
    pub fn begin_gesture(&mut self, id: &str, kind: GestureKind) -> bool {
        if self.gesture.is_some() {
            return false;
        }
        let Some(origin) = self.cache.get(id).copied() else {
            return false;
        };
        log::debug!("Begin {:?} on overlay {}", kind, id);
        self.gesture = Some(Gesture::new(id.to_string(), kind, origin));
        true
    }

    /// Feed the pointer movement since the previous update to the active gesture.
    pub fn update_gesture(&mut self, dx: f64, dy: f64) {
        let frame = self.frame;
        if let Some(ref mut gesture) = self.gesture {
            gesture.move_by(dx, dy, frame);
        }
    }

    /// Finish the active gesture.
    ///
    /// Returns `None` when no gesture is active or when the frame has not
    /// been measured; in the latter case the normalized record is left
    /// untouched and the next sync restores the rectangle from it.
    pub fn end_gesture(&mut self) -> Option<GestureCommit> {
        let gesture = self.gesture.take()?;
        self.cache.insert(gesture.id.clone(), gesture.current);

        let Some(normalized) = from_pixels(&gesture.current, self.frame) else {
            log::warn!("Gesture on {} ended before the frame was measured", gesture.id);
            return None;
        };

        Some(GestureCommit {
            id: gesture.id,
            kind: gesture.kind,
            rect: gesture.current,
            normalized,
        })
    }

    /// Abandon the active gesture, restoring its starting rectangle.
    pub fn cancel_gesture(&mut self) {
        if let Some(gesture) = self.gesture.take() {
            self.cache.insert(gesture.id, gesture.origin);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::overlay::{NormalizedPosition, NormalizedSize, OverlayKind};

    fn overlay(id: &str, x: f64, y: f64, w: f64, h: f64) -> Overlay {
        Overlay {
            id: id.to_string(),
            kind: OverlayKind::Text,
            content: id.to_string(),
            normalized_position: Some(NormalizedPosition { x_pct: x, y_pct: y }),
            normalized_size: Some(NormalizedSize {
                width_pct: w,
                height_pct: h,
            }),
            legacy_position: None,
            legacy_size: None,
            opacity: 1.0,
        }
    }

    #[test]
    fn test_frame_change_rescales_without_touching_overlays() {
        let overlays = vec![overlay("a", 10.0, 20.0, 25.0, 10.0)];
        let snapshot = overlays.clone();
        let mut engine = GeometryEngine::new();

        engine.on_frame_changed(Frame::new(400.0, 300.0), &overlays);
        assert_eq!(engine.rect("a"), Some(PixelRect::new(40.0, 60.0, 100.0, 30.0)));

        engine.on_frame_changed(Frame::new(1920.0, 1080.0), &overlays);
        assert_eq!(engine.rect("a"), Some(PixelRect::new(192.0, 216.0, 480.0, 108.0)));

        engine.on_frame_changed(Frame::new(400.0, 300.0), &overlays);
        assert_eq!(engine.rect("a"), Some(PixelRect::new(40.0, 60.0, 100.0, 30.0)));
        assert_eq!(overlays, snapshot);
    }

    #[test]
    fn test_pure_frame_changes_emit_no_commits() {
        let overlays = vec![overlay("a", 10.0, 20.0, 25.0, 10.0), overlay("b", 50.0, 50.0, 10.0, 10.0)];
        let mut engine = GeometryEngine::new();
        let mut commits = Vec::new();

        for (w, h) in [(400.0, 300.0), (1920.0, 1080.0), (0.0, 0.0), (640.0, 360.0)] {
            engine.on_frame_changed(Frame::new(w, h), &overlays);
            // No gesture is active, so ending one yields nothing
            commits.extend(engine.end_gesture());
        }
        assert!(commits.is_empty());
    }

    #[test]
    fn test_drag_commit() {
        let overlays = vec![overlay("a", 0.0, 0.0, 25.0, 10.0)];
        let mut engine = GeometryEngine::new();
        engine.on_frame_changed(Frame::new(400.0, 300.0), &overlays);

        assert!(engine.begin_gesture("a", GestureKind::Drag));
        engine.update_gesture(30.0, 10.0);
        engine.update_gesture(20.0, 40.0);
        assert_eq!(engine.rect("a"), Some(PixelRect::new(50.0, 50.0, 100.0, 30.0)));

        let commit = engine.end_gesture().unwrap();
        assert_eq!(commit.id, "a");
        assert!((commit.normalized.position.x_pct - 12.5).abs() < 1e-9);
        assert!((commit.normalized.position.y_pct - 16.667).abs() < 1e-3);
        assert!(engine.active_gesture().is_none());
    }

    #[test]
    fn test_frame_change_during_gesture_keeps_live_rect() {
        let overlays = vec![overlay("a", 0.0, 0.0, 25.0, 10.0), overlay("b", 50.0, 50.0, 10.0, 10.0)];
        let mut engine = GeometryEngine::new();
        engine.on_frame_changed(Frame::new(400.0, 300.0), &overlays);

        engine.begin_gesture("a", GestureKind::Drag);
        engine.update_gesture(50.0, 50.0);
        engine.on_frame_changed(Frame::new(800.0, 600.0), &overlays);

        assert_eq!(engine.rect("a"), Some(PixelRect::new(50.0, 50.0, 100.0, 30.0)));
        assert_eq!(engine.rect("b"), Some(PixelRect::new(400.0, 300.0, 80.0, 60.0)));
    }

    #[test]
    fn test_single_gesture_at_a_time() {
        let overlays = vec![overlay("a", 0.0, 0.0, 25.0, 10.0), overlay("b", 50.0, 50.0, 10.0, 10.0)];
        let mut engine = GeometryEngine::new();
        engine.on_frame_changed(Frame::new(400.0, 300.0), &overlays);

        assert!(engine.begin_gesture("a", GestureKind::Drag));
        assert!(!engine.begin_gesture("b", GestureKind::Resize(ResizeHandle::Right)));
        assert!(!engine.begin_gesture("missing", GestureKind::Drag));
    }

    #[test]
    fn test_unmeasured_frame_yields_no_commit() {
        let overlays = vec![overlay("a", 10.0, 10.0, 25.0, 10.0)];
        let mut engine = GeometryEngine::new();
        engine.sync(&overlays);

        assert!(engine.begin_gesture("a", GestureKind::Drag));
        engine.update_gesture(10.0, 10.0);
        assert!(engine.end_gesture().is_none());
    }

    #[test]
    fn test_cancel_and_removal() {
        let mut overlays = vec![overlay("a", 0.0, 0.0, 25.0, 10.0)];
        let mut engine = GeometryEngine::new();
        engine.on_frame_changed(Frame::new(400.0, 300.0), &overlays);

        engine.begin_gesture("a", GestureKind::Drag);
        engine.update_gesture(100.0, 100.0);
        engine.cancel_gesture();
        assert_eq!(engine.rect("a"), Some(PixelRect::new(0.0, 0.0, 100.0, 30.0)));

        engine.begin_gesture("a", GestureKind::Drag);
        overlays.clear();
        engine.sync(&overlays);
        assert!(engine.active_gesture().is_none());
        assert!(engine.rect("a").is_none());
    }
}
