// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! Client-side overlay list.
//!
//! The board mirrors the overlay store and is the only place that talks to
//! it. Updates are applied locally at once, so a gesture commit is visible
//! before the next frame recomputation, and rolled back to the last
//! known-good copy if the store rejects them. Creates and deletes only
//! change the list once the store confirms.

use crate::engine::GestureCommit;
use crate::error::{DeckError, DeckResult};
use crate::io::store::OverlayStore;
use crate::io::tasks::SharedSpawner;
use crate::models::overlay::{Overlay, OverlayDraft, OverlayId, OverlayPatch};
use std::collections::{HashMap, HashSet};
use std::sync::mpsc::{channel, Receiver, Sender};
use std::sync::Arc;

/// Outcome of a store round trip.
#[derive(Debug, Clone, PartialEq)]
pub enum BoardEvent {
    Loaded(usize),
    LoadFailed(DeckError),
    Created(OverlayId),
    CreateFailed(DeckError),
    Updated(OverlayId),
    UpdateFailed { id: OverlayId, error: DeckError },
    Deleted(OverlayId),
    DeleteFailed { id: OverlayId, error: DeckError },
}

enum Reply {
    Listed(DeckResult<Vec<Overlay>>),
    Created(DeckResult<Overlay>),
    Updated {
        id: OverlayId,
        patch: OverlayPatch,
        result: DeckResult<Overlay>,
    },
    Deleted {
        id: OverlayId,
        result: DeckResult<()>,
    },
}

/// Updates in flight for one overlay and the copy to roll back to.
struct PendingUpdate {
    count: usize,
    last_good: Overlay,
}

pub struct OverlayBoard {
    store: Arc<dyn OverlayStore>,
    spawner: SharedSpawner,
    overlays: Vec<Overlay>,
    loaded: bool,
    pending_updates: HashMap<OverlayId, PendingUpdate>,
    pending_deletes: HashSet<OverlayId>,
    in_flight: usize,
    tx: Sender<Reply>,
    rx: Receiver<Reply>,
}

impl OverlayBoard {
    pub fn new(store: Arc<dyn OverlayStore>, spawner: SharedSpawner) -> Self {
        let (tx, rx) = channel();
        Self {
            store,
            spawner,
            overlays: Vec::new(),
            loaded: false,
            pending_updates: HashMap::new(),
            pending_deletes: HashSet::new(),
            in_flight: 0,
            tx,
            rx,
        }
    }

    pub fn overlays(&self) -> &[Overlay] {
        &self.overlays
    }

    pub fn get(&self, id: &str) -> Option<&Overlay> {
        self.overlays.iter().find(|o| o.id == id)
    }

    pub fn is_loaded(&self) -> bool {
        self.loaded
    }

    pub fn is_busy(&self) -> bool {
        self.in_flight > 0
    }

    pub fn is_deleting(&self, id: &str) -> bool {
        self.pending_deletes.contains(id)
    }

    fn submit(&mut self, work: impl FnOnce(&dyn OverlayStore) -> Reply + Send + 'static) {
        let store = Arc::clone(&self.store);
        let tx = self.tx.clone();
        self.in_flight += 1;
        self.spawner.spawn(Box::new(move || {
            let _ = tx.send(work(store.as_ref()));
        }));
    }

    /// Load the overlay list from the store.
    pub fn refresh(&mut self) {
        self.submit(|store| Reply::Listed(store.list()));
    }

    pub fn create(&mut self, mut draft: OverlayDraft) -> DeckResult<()> {
        draft.content = draft.content.trim().to_string();
        if draft.content.is_empty() {
            return Err(DeckError::validation("Please enter content for the overlay"));
        }
        self.submit(move |store| Reply::Created(store.create(&draft)));
        Ok(())
    }

    /// Apply `patch` locally and send it to the store.
    pub fn update(&mut self, id: &str, patch: OverlayPatch) -> DeckResult<()> {
        if patch.content.as_deref().map(|c| c.trim().is_empty()) == Some(true) {
            return Err(DeckError::validation("Overlay content cannot be empty"));
        }
        let Some(overlay) = self.overlays.iter_mut().find(|o| o.id == id) else {
            return Err(DeckError::validation(format!("Overlay not found: {}", id)));
        };

        self.pending_updates
            .entry(overlay.id.clone())
            .or_insert_with(|| PendingUpdate {
                count: 0,
                last_good: overlay.clone(),
            })
            .count += 1;
        overlay.apply(&patch);

        let id = id.to_string();
        self.submit(move |store| {
            let result = store.update(&id, &patch);
            Reply::Updated { id, patch, result }
        });
        Ok(())
    }

    /// Send the single update produced by a finished gesture.
    pub fn commit_gesture(&mut self, commit: &GestureCommit) -> DeckResult<()> {
        self.update(&commit.id, commit.patch())
    }

    /// Ask the store to delete an overlay. The list changes on success.
    pub fn delete(&mut self, id: &str) -> DeckResult<()> {
        if self.get(id).is_none() {
            return Err(DeckError::validation(format!("Overlay not found: {}", id)));
        }
        if !self.pending_deletes.insert(id.to_string()) {
            return Ok(());
        }
        let id = id.to_string();
        self.submit(move |store| {
            let result = store.delete(&id);
            Reply::Deleted { id, result }
        });
        Ok(())
    }

    /// Apply finished store calls.
    pub fn poll(&mut self) -> Vec<BoardEvent> {
        let mut events = Vec::new();

        while let Ok(reply) = self.rx.try_recv() {
            self.in_flight = self.in_flight.saturating_sub(1);
            match reply {
                Reply::Listed(Ok(overlays)) => {
                    log::info!("Loaded {} overlays", overlays.len());
                    self.overlays = overlays;
                    self.loaded = true;
                    events.push(BoardEvent::Loaded(self.overlays.len()));
                }
                Reply::Listed(Err(error)) => {
                    log::error!("Failed to fetch overlays: {}", error);
                    self.loaded = true;
                    events.push(BoardEvent::LoadFailed(error));
                }
                Reply::Created(Ok(overlay)) => {
                    log::info!("Added overlay {}, total: {}", overlay.id, self.overlays.len() + 1);
                    let id = overlay.id.clone();
                    self.overlays.push(overlay);
                    events.push(BoardEvent::Created(id));
                }
                Reply::Created(Err(error)) => {
                    log::error!("Failed to create overlay: {}", error);
                    events.push(BoardEvent::CreateFailed(error));
                }
                Reply::Updated { id, patch, result } => {
                    events.push(self.finish_update(id, patch, result));
                }
                Reply::Deleted { id, result } => {
                    self.pending_deletes.remove(&id);
                    match result {
                        Ok(()) => {
                            self.overlays.retain(|o| o.id != id);
                            self.pending_updates.remove(&id);
                            log::info!("Deleted overlay {}, total: {}", id, self.overlays.len());
                            events.push(BoardEvent::Deleted(id));
                        }
                        Err(error) => {
                            log::error!("Failed to delete overlay {}: {}", id, error);
                            events.push(BoardEvent::DeleteFailed { id, error });
                        }
                    }
                }
            }
        }

        events
    }

    fn finish_update(&mut self, id: OverlayId, patch: OverlayPatch, result: DeckResult<Overlay>) -> BoardEvent {
        let Some(pending) = self.pending_updates.get_mut(&id) else {
            // Deleted while the update was in flight
            return BoardEvent::Updated(id);
        };
        pending.count = pending.count.saturating_sub(1);
        let settled = pending.count == 0;

        match result {
            Ok(mut confirmed) => {
                // Keep what we sent even if the store echoes fewer fields
                confirmed.apply(&patch);
                pending.last_good = confirmed.clone();
                if settled {
                    self.pending_updates.remove(&id);
                    if let Some(slot) = self.overlays.iter_mut().find(|o| o.id == id) {
                        *slot = confirmed;
                    }
                }
                BoardEvent::Updated(id)
            }
            Err(error) => {
                log::error!("Failed to update overlay {}: {}", id, error);
                let last_good = pending.last_good.clone();
                if settled {
                    self.pending_updates.remove(&id);
                }
                if let Some(slot) = self.overlays.iter_mut().find(|o| o.id == id) {
                    *slot = last_good;
                }
                BoardEvent::UpdateFailed { id, error }
            }
        }
    }
}
