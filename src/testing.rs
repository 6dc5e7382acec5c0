// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! Test doubles for the store, the conversion service and the player.

use crate::error::{DeckError, DeckResult};
use crate::io::store::OverlayStore;
use crate::io::stream::StreamService;
use crate::models::overlay::{
    NormalizedPosition, NormalizedSize, Overlay, OverlayDraft, OverlayKind, OverlayPatch,
};
use crate::models::session::StreamStatus;
use crate::session::player::{Player, PlayerFactory};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Instant;

pub const CONVERTED_URL: &str = "http://localhost:5001/static/stream/playlist.m3u8";

/// Text overlay with normalized geometry only.
pub fn overlay(id: &str, x: f64, y: f64, w: f64, h: f64) -> Overlay {
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

#[derive(Default)]
pub struct FakeStore {
    pub overlays: Mutex<Vec<Overlay>>,
    pub updates: Mutex<Vec<(String, OverlayPatch)>>,
    pub creates: Mutex<Vec<OverlayDraft>>,
    pub fail: AtomicBool,
    /// Mimic a backend that only stores pixel fields
    pub drop_percent: bool,
}

impl FakeStore {
    pub fn with(overlays: Vec<Overlay>) -> Self {
        Self {
            overlays: Mutex::new(overlays),
            ..Default::default()
        }
    }

    pub fn set_failing(&self, fail: bool) {
        self.fail.store(fail, Ordering::SeqCst);
    }

    pub fn update_count(&self) -> usize {
        self.updates.lock().unwrap().len()
    }

    fn check(&self) -> DeckResult<()> {
        if self.fail.load(Ordering::SeqCst) {
            return Err(DeckError::remote("Failed to update overlay"));
        }
        Ok(())
    }
}

impl OverlayStore for FakeStore {
    fn list(&self) -> DeckResult<Vec<Overlay>> {
        self.check()?;
        Ok(self.overlays.lock().unwrap().clone())
    }

    fn create(&self, draft: &OverlayDraft) -> DeckResult<Overlay> {
        self.check()?;
        self.creates.lock().unwrap().push(draft.clone());
        let mut overlays = self.overlays.lock().unwrap();
        let overlay = Overlay {
            id: format!("id{}", overlays.len() + 1),
            kind: draft.kind,
            content: draft.content.clone(),
            normalized_position: draft.normalized_position,
            normalized_size: draft.normalized_size,
            legacy_position: Some(draft.legacy_position),
            legacy_size: Some(draft.legacy_size),
            opacity: 1.0,
        };
        overlays.push(overlay.clone());
        Ok(overlay)
    }

    fn update(&self, id: &str, patch: &OverlayPatch) -> DeckResult<Overlay> {
        self.updates.lock().unwrap().push((id.to_string(), patch.clone()));
        self.check()?;
        let mut overlays = self.overlays.lock().unwrap();
        let overlay = overlays
            .iter_mut()
            .find(|o| o.id == id)
            .ok_or_else(|| DeckError::remote(format!("Overlay not found: {}", id)))?;
        overlay.apply(patch);
        if self.drop_percent {
            overlay.normalized_position = None;
            overlay.normalized_size = None;
        }
        Ok(overlay.clone())
    }

    fn delete(&self, id: &str) -> DeckResult<()> {
        self.check()?;
        self.overlays.lock().unwrap().retain(|o| o.id != id);
        Ok(())
    }
}

#[derive(Default)]
pub struct FakeService {
    pub start_calls: Mutex<Vec<String>>,
    pub stop_calls: AtomicUsize,
    pub fail_start: bool,
    pub fail_stop: bool,
    pub active: bool,
}

impl FakeService {
    pub fn stops(&self) -> usize {
        self.stop_calls.load(Ordering::SeqCst)
    }
}

impl StreamService for FakeService {
    fn start(&self, source_url: &str) -> DeckResult<String> {
        self.start_calls.lock().unwrap().push(source_url.to_string());
        if self.fail_start {
            return Err(DeckError::remote("FFmpeg is not installed or not in PATH"));
        }
        Ok(CONVERTED_URL.to_string())
    }

    fn stop(&self) -> DeckResult<()> {
        self.stop_calls.fetch_add(1, Ordering::SeqCst);
        if self.fail_stop {
            return Err(DeckError::remote(crate::io::api::NETWORK_FAILURE));
        }
        Ok(())
    }

    fn status(&self) -> DeckResult<StreamStatus> {
        Ok(StreamStatus {
            active: self.active,
            source_url: self.active.then(|| "rtsp://cam/1".to_string()),
        })
    }
}

/// Player counters shared between a factory and its players.
#[derive(Default, Clone)]
pub struct Counters {
    pub created: Arc<AtomicUsize>,
    pub disposed: Arc<AtomicUsize>,
}

impl Counters {
    /// Players created and not yet disposed.
    pub fn live(&self) -> usize {
        self.created.load(Ordering::SeqCst) - self.disposed.load(Ordering::SeqCst)
    }
}

struct CountingPlayer {
    source: String,
    attached_at: Instant,
    disposed: bool,
    counters: Counters,
}

impl Player for CountingPlayer {
    fn source(&self) -> &str {
        &self.source
    }

    fn attached_at(&self) -> Instant {
        self.attached_at
    }

    fn dispose(&mut self) {
        if !self.disposed {
            self.disposed = true;
            self.counters.disposed.fetch_add(1, Ordering::SeqCst);
        }
    }

    fn is_disposed(&self) -> bool {
        self.disposed
    }
}

pub struct CountingFactory(pub Counters);

impl PlayerFactory for CountingFactory {
    fn create(&self, playable_url: &str) -> anyhow::Result<Box<dyn Player>> {
        self.0.created.fetch_add(1, Ordering::SeqCst);
        Ok(Box::new(CountingPlayer {
            source: playable_url.to_string(),
            attached_at: Instant::now(),
            disposed: false,
            counters: self.0.clone(),
        }))
    }
}
