// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! Textures for image overlays.
//!
//! Each distinct image URL is fetched once on a background job. Decoded
//! pixels come back over a channel and are uploaded as egui textures on the
//! UI thread.

use crate::io::media::{fetch_image, LoadedImage};
use crate::io::tasks::SharedSpawner;
use std::collections::HashMap;
use std::sync::mpsc::{channel, Receiver, Sender};

/// Load state of one image URL.
pub enum ImageState<'a> {
    Loading,
    Ready(&'a egui::TextureHandle),
    Failed,
}

enum Entry {
    Loading,
    Ready(egui::TextureHandle),
    Failed,
}

pub struct ImageCache {
    client: reqwest::blocking::Client,
    spawner: SharedSpawner,
    entries: HashMap<String, Entry>,
    tx: Sender<(String, anyhow::Result<LoadedImage>)>,
    rx: Receiver<(String, anyhow::Result<LoadedImage>)>,
}

impl ImageCache {
    pub fn new(client: reqwest::blocking::Client, spawner: SharedSpawner) -> Self {
        let (tx, rx) = channel();
        Self {
            client,
            spawner,
            entries: HashMap::new(),
            tx,
            rx,
        }
    }

    pub fn is_loading(&self) -> bool {
        self.entries.values().any(|e| matches!(e, Entry::Loading))
    }

    /// Upload finished downloads as textures.
    pub fn poll(&mut self, ctx: &egui::Context) {
        while let Ok((url, result)) = self.rx.try_recv() {
            let entry = match result {
                Ok(image) => {
                    log::info!("Loaded overlay image {} ({}x{})", url, image.width, image.height);
                    let size = [image.width as usize, image.height as usize];
                    let color_image = egui::ColorImage::from_rgba_unmultiplied(size, &image.pixels);
                    Entry::Ready(ctx.load_texture(&url, color_image, egui::TextureOptions::LINEAR))
                }
                Err(e) => {
                    log::error!("Failed to load overlay image {}: {:#}", url, e);
                    Entry::Failed
                }
            };
            self.entries.insert(url, entry);
        }
    }

    /// Look up an image, starting the download on first use.
    pub fn get(&mut self, url: &str) -> ImageState<'_> {
        if !self.entries.contains_key(url) {
            self.entries.insert(url.to_string(), Entry::Loading);
            let client = self.client.clone();
            let tx = self.tx.clone();
            let url = url.to_string();
            self.spawner.spawn(Box::new(move || {
                let result = fetch_image(&client, &url);
                let _ = tx.send((url, result));
            }));
        }

        match self.entries.get(url) {
            Some(Entry::Ready(texture)) => ImageState::Ready(texture),
            Some(Entry::Failed) => ImageState::Failed,
            _ => ImageState::Loading,
        }
    }
}
