// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! Overlay Deck
//!
//! A desktop viewer for live video streams with free-floating text and
//! image overlays that keep their place across window resizes and
//! fullscreen.

mod app;
mod board;
mod config;
mod context;
mod engine;
mod error;
mod io;
mod models;
mod session;
#[cfg(test)]
mod testing;
mod ui;
mod util;

use anyhow::Result;
use app::DeckApp;
use config::AppConfig;
use context::DeckContext;
use io::api::ApiClient;
use io::store::HttpOverlayStore;
use io::stream::HttpStreamService;
use io::tasks::{SharedSpawner, ThreadSpawner};
use session::player::SurfacePlayerFactory;
use std::sync::Arc;
use ui::images::ImageCache;

fn main() -> Result<()> {
    // Initialize logging
    env_logger::init();

    let config = AppConfig::load()?;
    let api = ApiClient::new(&config.api_base_url, config.request_timeout())?;
    log::info!("Using backend at {}", api.base_url());

    let spawner: SharedSpawner = Arc::new(ThreadSpawner);
    let images = ImageCache::new(api.http().clone(), Arc::clone(&spawner));
    let deck = DeckContext::new(
        &config,
        Arc::new(HttpOverlayStore::new(api.clone())),
        Arc::new(HttpStreamService::new(api)),
        spawner,
        Box::new(SurfacePlayerFactory),
    );

    // Configure egui options
    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_inner_size([1280.0, 720.0])
            .with_min_inner_size([800.0, 600.0])
            .with_title("Overlay Deck"),
        ..Default::default()
    };

    // Run the application
    eframe::run_native(
        "Overlay Deck",
        options,
        Box::new(move |_cc| Ok(Box::new(DeckApp::new(deck, images)))),
    )
    .map_err(|e| anyhow::anyhow!("Application error: {}", e))?;

    Ok(())
}
