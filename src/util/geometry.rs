// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! Geometric utility functions.
//!
//! This module provides the coordinate transformations between the
//! percentage-based overlay record and the pixel rectangles used for
//! drawing and interaction.

use crate::models::overlay::{
    NormalizedPosition, NormalizedSize, Overlay, PixelPosition, PixelSize, DEFAULT_POSITION,
    DEFAULT_SIZE,
};

/// Measured pixel size of the active rendering surface.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Frame {
    pub width: f64,
    pub height: f64,
}

impl Frame {
    pub fn new(width: f64, height: f64) -> Self {
        Self { width, height }
    }

    /// A frame is usable for conversion only once both sides are positive.
    pub fn is_measured(&self) -> bool {
        self.width.is_finite() && self.height.is_finite() && self.width > 0.0 && self.height > 0.0
    }
}

/// Axis-aligned rectangle in container pixels.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PixelRect {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

impl PixelRect {
    pub fn new(x: f64, y: f64, width: f64, height: f64) -> Self {
        Self { x, y, width, height }
    }

    pub fn contains(&self, x: f64, y: f64) -> bool {
        x >= self.x && x <= self.x + self.width && y >= self.y && y <= self.y + self.height
    }

    pub fn position(&self) -> PixelPosition {
        PixelPosition { x: self.x, y: self.y }
    }

    pub fn size(&self) -> PixelSize {
        PixelSize {
            width: self.width,
            height: self.height,
        }
    }
}

/// Position and size in percent of the container.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct NormalizedRect {
    pub position: NormalizedPosition,
    pub size: NormalizedSize,
}

/// Which record a spatial field is rendered from, in precedence order.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Geometry<N, P> {
    Normalized(N),
    LegacyPixel(P),
    Default,
}

impl Geometry<NormalizedPosition, PixelPosition> {
    /// Resolve the position source of an overlay for the given frame.
    pub fn position_of(overlay: &Overlay, frame: Frame) -> Self {
        match (overlay.normalized_position, overlay.legacy_position) {
            (Some(normalized), _) if frame.is_measured() => Geometry::Normalized(normalized),
            (_, Some(legacy)) => Geometry::LegacyPixel(legacy),
            _ => Geometry::Default,
        }
    }

    fn resolve(self, frame: Frame) -> PixelPosition {
        match self {
            Geometry::Normalized(p) => PixelPosition {
                x: p.x_pct / 100.0 * frame.width,
                y: p.y_pct / 100.0 * frame.height,
            },
            Geometry::LegacyPixel(p) => p,
            Geometry::Default => DEFAULT_POSITION,
        }
    }
}

impl Geometry<NormalizedSize, PixelSize> {
    /// Resolve the size source of an overlay for the given frame.
    pub fn size_of(overlay: &Overlay, frame: Frame) -> Self {
        match (overlay.normalized_size, overlay.legacy_size) {
            (Some(normalized), _) if frame.is_measured() => Geometry::Normalized(normalized),
            (_, Some(legacy)) => Geometry::LegacyPixel(legacy),
            _ => Geometry::Default,
        }
    }

    fn resolve(self, frame: Frame) -> PixelSize {
        match self {
            Geometry::Normalized(s) => PixelSize {
                width: s.width_pct / 100.0 * frame.width,
                height: s.height_pct / 100.0 * frame.height,
            },
            Geometry::LegacyPixel(s) => s,
            Geometry::Default => DEFAULT_SIZE,
        }
    }
}

/// Convert an overlay's stored geometry to a pixel rectangle.
///
/// Falls back to the legacy pixel fields, then to the defaults, when the
/// frame has not been measured or a normalized field is missing.
pub fn to_pixels(overlay: &Overlay, frame: Frame) -> PixelRect {
    let position = Geometry::position_of(overlay, frame).resolve(frame);
    let size = Geometry::size_of(overlay, frame).resolve(frame);
    PixelRect::new(position.x, position.y, size.width, size.height)
}

/// Convert a pixel rectangle to percentages of the frame.
///
/// Returns `None` for an unmeasured frame so callers keep their last
/// normalized values.
pub fn from_pixels(rect: &PixelRect, frame: Frame) -> Option<NormalizedRect> {
    if !frame.is_measured() {
        return None;
    }
    Some(NormalizedRect {
        position: NormalizedPosition {
            x_pct: rect.x / frame.width * 100.0,
            y_pct: rect.y / frame.height * 100.0,
        },
        size: NormalizedSize {
            width_pct: rect.width / frame.width * 100.0,
            height_pct: rect.height / frame.height * 100.0,
        },
    })
}

/// Keep a rectangle inside the frame: size first, then position.
pub fn clamp_to_frame(rect: PixelRect, frame: Frame) -> PixelRect {
    if !frame.is_measured() {
        return rect;
    }
    let width = rect.width.min(frame.width);
    let height = rect.height.min(frame.height);
    PixelRect {
        x: rect.x.clamp(0.0, frame.width - width),
        y: rect.y.clamp(0.0, frame.height - height),
        width,
        height,
    }
}
