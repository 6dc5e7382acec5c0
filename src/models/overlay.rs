// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! Overlay data structures.
//!
//! This module defines the overlay record exchanged with the overlay store,
//! along with the draft and patch shapes used to create and update it.
//! Field names on the wire follow the backend's JSON (`positionPercent`,
//! `sizePercent`, ...).

use serde::{Deserialize, Deserializer, Serialize};

/// Identifier assigned by the overlay store.
pub type OverlayId = String;

/// Lowest opacity an overlay may be given.
pub const OPACITY_MIN: f64 = 0.1;
/// Highest opacity an overlay may be given.
pub const OPACITY_MAX: f64 = 1.0;

/// Position used when neither normalized nor legacy fields exist.
pub const DEFAULT_POSITION: PixelPosition = PixelPosition { x: 100.0, y: 100.0 };
/// Size used when neither normalized nor legacy fields exist.
pub const DEFAULT_SIZE: PixelSize = PixelSize {
    width: 200.0,
    height: 100.0,
};

/// Kind of overlay.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OverlayKind {
    #[default]
    Text,
    Image,
}

impl OverlayKind {
    pub fn label(self) -> &'static str {
        match self {
            OverlayKind::Text => "Text",
            OverlayKind::Image => "Image",
        }
    }
}

/// Top-left corner as a percentage of the container's width and height.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct NormalizedPosition {
    #[serde(rename = "x")]
    pub x_pct: f64,
    #[serde(rename = "y")]
    pub y_pct: f64,
}

/// Size as a percentage of the container's width and height.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct NormalizedSize {
    #[serde(rename = "width")]
    pub width_pct: f64,
    #[serde(rename = "height")]
    pub height_pct: f64,
}

/// Absolute pixel position (legacy records).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PixelPosition {
    pub x: f64,
    pub y: f64,
}

/// Absolute pixel size (legacy records).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PixelSize {
    pub width: f64,
    pub height: f64,
}

/// A user-placed annotation rendered above the video.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Overlay {
    pub id: OverlayId,
    #[serde(rename = "type")]
    pub kind: OverlayKind,
    pub content: String,
    #[serde(rename = "positionPercent", default, skip_serializing_if = "Option::is_none")]
    pub normalized_position: Option<NormalizedPosition>,
    #[serde(rename = "sizePercent", default, skip_serializing_if = "Option::is_none")]
    pub normalized_size: Option<NormalizedSize>,
    #[serde(rename = "position", default, skip_serializing_if = "Option::is_none")]
    pub legacy_position: Option<PixelPosition>,
    #[serde(rename = "size", default, skip_serializing_if = "Option::is_none")]
    pub legacy_size: Option<PixelSize>,
    #[serde(default = "default_opacity", deserialize_with = "deserialize_opacity")]
    pub opacity: f64,
}

impl Overlay {
    /// Apply a patch in place. Used for optimistic local updates.
    pub fn apply(&mut self, patch: &OverlayPatch) {
        if let Some(ref content) = patch.content {
            self.content = content.clone();
        }
        if let Some(opacity) = patch.opacity {
            self.opacity = clamp_opacity(opacity);
        }
        if let Some(position) = patch.legacy_position {
            self.legacy_position = Some(position);
        }
        if let Some(size) = patch.legacy_size {
            self.legacy_size = Some(size);
        }
        if let Some(position) = patch.normalized_position {
            self.normalized_position = Some(position);
        }
        if let Some(size) = patch.normalized_size {
            self.normalized_size = Some(size);
        }
    }
}

/// Payload for creating a new overlay.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OverlayDraft {
    #[serde(rename = "type")]
    pub kind: OverlayKind,
    pub content: String,
    #[serde(rename = "position")]
    pub legacy_position: PixelPosition,
    #[serde(rename = "size")]
    pub legacy_size: PixelSize,
    #[serde(rename = "positionPercent", skip_serializing_if = "Option::is_none")]
    pub normalized_position: Option<NormalizedPosition>,
    #[serde(rename = "sizePercent", skip_serializing_if = "Option::is_none")]
    pub normalized_size: Option<NormalizedSize>,
}

impl OverlayDraft {
    /// Create a draft at the default position and size.
    pub fn new(kind: OverlayKind, content: impl Into<String>) -> Self {
        Self {
            kind,
            content: content.into(),
            legacy_position: DEFAULT_POSITION,
            legacy_size: DEFAULT_SIZE,
            normalized_position: None,
            normalized_size: None,
        }
    }
}

/// Partial update sent to the overlay store.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct OverlayPatch {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub content: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub opacity: Option<f64>,
    #[serde(rename = "position", skip_serializing_if = "Option::is_none")]
    pub legacy_position: Option<PixelPosition>,
    #[serde(rename = "size", skip_serializing_if = "Option::is_none")]
    pub legacy_size: Option<PixelSize>,
    #[serde(rename = "positionPercent", skip_serializing_if = "Option::is_none")]
    pub normalized_position: Option<NormalizedPosition>,
    #[serde(rename = "sizePercent", skip_serializing_if = "Option::is_none")]
    pub normalized_size: Option<NormalizedSize>,
}

impl OverlayPatch {
    pub fn opacity(opacity: f64) -> Self {
        Self {
            opacity: Some(clamp_opacity(opacity)),
            ..Default::default()
        }
    }
}

/// Clamp an opacity into `[OPACITY_MIN, OPACITY_MAX]`; NaN becomes fully opaque.
pub fn clamp_opacity(opacity: f64) -> f64 {
    if opacity.is_nan() {
        return OPACITY_MAX;
    }
    opacity.clamp(OPACITY_MIN, OPACITY_MAX)
}

fn default_opacity() -> f64 {
    OPACITY_MAX
}

fn deserialize_opacity<'de, D>(deserializer: D) -> Result<f64, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = Option::<f64>::deserialize(deserializer)?;
    Ok(raw.map(clamp_opacity).unwrap_or(OPACITY_MAX))
}
