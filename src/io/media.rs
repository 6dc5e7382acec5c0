// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! Image overlay loading.
//!
//! This module fetches the image behind an image overlay (over HTTP(S) or
//! from a `file://` path) and decodes it into RGBA pixels suitable for an
//! egui texture.

use anyhow::{Context, Result};
use std::path::Path;

/// Decoded RGBA image.
#[derive(Debug, Clone)]
pub struct LoadedImage {
    pub width: u32,
    pub height: u32,
    pub pixels: Vec<u8>,
}

/// Decode an encoded image (PNG, JPEG, ...) from memory.
pub fn decode_image(bytes: &[u8]) -> Result<LoadedImage> {
    let rgba = image::load_from_memory(bytes)
        .context("Unsupported or corrupt image data")?
        .to_rgba8();
    Ok(LoadedImage {
        width: rgba.width(),
        height: rgba.height(),
        pixels: rgba.into_raw(),
    })
}

/// Load an image from the local filesystem.
pub fn load_image(path: &Path) -> Result<LoadedImage> {
    let rgba = image::open(path)
        .with_context(|| format!("Failed to open image {}", path.display()))?
        .to_rgba8();
    Ok(LoadedImage {
        width: rgba.width(),
        height: rgba.height(),
        pixels: rgba.into_raw(),
    })
}

/// Fetch and decode the image an overlay points at.
pub fn fetch_image(client: &reqwest::blocking::Client, url: &str) -> Result<LoadedImage> {
    if let Some(path) = url.strip_prefix("file://") {
        return load_image(Path::new(path));
    }

    let bytes = client
        .get(url)
        .send()
        .with_context(|| format!("Failed to fetch {}", url))?
        .error_for_status()
        .with_context(|| format!("Image request for {} was rejected", url))?
        .bytes()
        .context("Failed to read image body")?;

    decode_image(&bytes)
}
