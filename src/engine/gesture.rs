// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! Drag and resize gestures.

use crate::models::overlay::{OverlayId, OverlayPatch};
use crate::util::geometry::{clamp_to_frame, Frame, NormalizedRect, PixelRect};

/// Smallest width or height a resize can produce.
pub const MIN_SIZE_PX: f64 = 20.0;

/// Edge or corner grabbed for a resize.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResizeHandle {
    Top,
    Bottom,
    Left,
    Right,
    TopLeft,
    TopRight,
    BottomLeft,
    BottomRight,
}

impl ResizeHandle {
    pub const ALL: [ResizeHandle; 8] = [
        ResizeHandle::Top,
        ResizeHandle::Bottom,
        ResizeHandle::Left,
        ResizeHandle::Right,
        ResizeHandle::TopLeft,
        ResizeHandle::TopRight,
        ResizeHandle::BottomLeft,
        ResizeHandle::BottomRight,
    ];

    fn moves_left(self) -> bool {
        matches!(self, ResizeHandle::Left | ResizeHandle::TopLeft | ResizeHandle::BottomLeft)
    }

    fn moves_right(self) -> bool {
        matches!(self, ResizeHandle::Right | ResizeHandle::TopRight | ResizeHandle::BottomRight)
    }

    fn moves_top(self) -> bool {
        matches!(self, ResizeHandle::Top | ResizeHandle::TopLeft | ResizeHandle::TopRight)
    }

    fn moves_bottom(self) -> bool {
        matches!(self, ResizeHandle::Bottom | ResizeHandle::BottomLeft | ResizeHandle::BottomRight)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GestureKind {
    Drag,
    Resize(ResizeHandle),
}

/// An in-progress gesture. Tracks the total pointer delta since the start
/// so the rectangle is always recomputed from the origin.
#[derive(Debug, Clone)]
pub(crate) struct Gesture {
    pub id: OverlayId,
    pub kind: GestureKind,
    pub origin: PixelRect,
    pub current: PixelRect,
    dx: f64,
    dy: f64,
}

impl Gesture {
    pub fn new(id: OverlayId, kind: GestureKind, origin: PixelRect) -> Self {
        Self {
            id,
            kind,
            origin,
            current: origin,
            dx: 0.0,
            dy: 0.0,
        }
    }

    /// Accumulate a pointer delta and recompute the live rectangle.
    pub fn move_by(&mut self, dx: f64, dy: f64, frame: Frame) {
        self.dx += dx;
        self.dy += dy;
        self.current = match self.kind {
            GestureKind::Drag => dragged(self.origin, self.dx, self.dy, frame),
            GestureKind::Resize(handle) => resized(self.origin, handle, self.dx, self.dy, frame),
        };
    }
}

fn dragged(origin: PixelRect, dx: f64, dy: f64, frame: Frame) -> PixelRect {
    clamp_to_frame(
        PixelRect::new(origin.x + dx, origin.y + dy, origin.width, origin.height),
        frame,
    )
}

fn resized(origin: PixelRect, handle: ResizeHandle, dx: f64, dy: f64, frame: Frame) -> PixelRect {
    let (min_x, max_x, min_y, max_y) = if frame.is_measured() {
        (0.0, frame.width, 0.0, frame.height)
    } else {
        (f64::NEG_INFINITY, f64::INFINITY, f64::NEG_INFINITY, f64::INFINITY)
    };

    let mut left = origin.x;
    let mut right = origin.x + origin.width;
    let mut top = origin.y;
    let mut bottom = origin.y + origin.height;

    if handle.moves_left() {
        left = (left + dx).min(right - MIN_SIZE_PX).max(min_x);
    }
    if handle.moves_right() {
        right = (right + dx).max(left + MIN_SIZE_PX).min(max_x);
    }
    if handle.moves_top() {
        top = (top + dy).min(bottom - MIN_SIZE_PX).max(min_y);
    }
    if handle.moves_bottom() {
        bottom = (bottom + dy).max(top + MIN_SIZE_PX).min(max_y);
    }

    clamp_to_frame(PixelRect::new(left, top, right - left, bottom - top), frame)
}

/// Result of a finished gesture: the one update sent to the store.
#[derive(Debug, Clone, PartialEq)]
pub struct GestureCommit {
    pub id: OverlayId,
    pub kind: GestureKind,
    pub rect: PixelRect,
    pub normalized: NormalizedRect,
}

impl GestureCommit {
    /// Store patch. Legacy pixel fields are written together with the
    /// normalized ones, never alone.
    pub fn patch(&self) -> OverlayPatch {
        let mut patch = OverlayPatch {
            legacy_position: Some(self.rect.position()),
            normalized_position: Some(self.normalized.position),
            ..Default::default()
        };
        if let GestureKind::Resize(_) = self.kind {
            patch.legacy_size = Some(self.rect.size());
            patch.normalized_size = Some(self.normalized.size);
        }
        patch
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn frame() -> Frame {
        Frame::new(400.0, 300.0)
    }

    #[test]
    fn test_drag_accumulates_from_origin() {
        let mut gesture = Gesture::new("a".into(), GestureKind::Drag, PixelRect::new(10.0, 10.0, 100.0, 50.0));
        gesture.move_by(20.0, 15.0, frame());
        gesture.move_by(20.0, 25.0, frame());
        assert_eq!(gesture.current, PixelRect::new(50.0, 50.0, 100.0, 50.0));
    }

    #[test]
    fn test_drag_stays_in_bounds() {
        let mut gesture = Gesture::new("a".into(), GestureKind::Drag, PixelRect::new(10.0, 10.0, 100.0, 50.0));
        gesture.move_by(1000.0, -1000.0, frame());
        assert_eq!(gesture.current, PixelRect::new(300.0, 0.0, 100.0, 50.0));
    }

    #[test]
    fn test_resize_top_left_moves_origin() {
        let origin = PixelRect::new(100.0, 100.0, 100.0, 50.0);
        let mut gesture = Gesture::new("a".into(), GestureKind::Resize(ResizeHandle::TopLeft), origin);
        gesture.move_by(-20.0, -10.0, frame());
        assert_eq!(gesture.current, PixelRect::new(80.0, 90.0, 120.0, 60.0));
    }

    #[test]
    fn test_resize_enforces_minimum_and_bounds() {
        let origin = PixelRect::new(100.0, 100.0, 100.0, 50.0);

        let mut shrink = Gesture::new("a".into(), GestureKind::Resize(ResizeHandle::BottomRight), origin);
        shrink.move_by(-500.0, -500.0, frame());
        assert_eq!(shrink.current, PixelRect::new(100.0, 100.0, MIN_SIZE_PX, MIN_SIZE_PX));

        let mut grow = Gesture::new("a".into(), GestureKind::Resize(ResizeHandle::Right), origin);
        grow.move_by(1000.0, 40.0, frame());
        assert_eq!(grow.current, PixelRect::new(100.0, 100.0, 300.0, 50.0));
    }

    #[test]
    fn test_drag_patch_has_no_size() {
        let commit = GestureCommit {
            id: "a".into(),
            kind: GestureKind::Drag,
            rect: PixelRect::new(50.0, 50.0, 100.0, 30.0),
            normalized: crate::util::geometry::from_pixels(&PixelRect::new(50.0, 50.0, 100.0, 30.0), frame()).unwrap(),
        };
        let patch = commit.patch();
        assert!(patch.legacy_position.is_some());
        assert!(patch.normalized_position.is_some());
        assert!(patch.legacy_size.is_none());
        assert!(patch.normalized_size.is_none());
    }
}
