// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! Player resource.
//!
//! Decoding is done elsewhere; what the session controller needs is a
//! resource it can attach to a playable URL and dispose of. `PlayerSlot`
//! guarantees there is never more than one.

use anyhow::Result;
use std::time::Instant;

/// An attached video player.
pub trait Player {
    /// Playable URL the player is attached to.
    fn source(&self) -> &str;
    /// When playback began.
    fn attached_at(&self) -> Instant;
    /// Release the player. Calling it again is a no-op.
    fn dispose(&mut self);
    fn is_disposed(&self) -> bool;
}

/// Creates players for playable URLs.
pub trait PlayerFactory {
    fn create(&self, playable_url: &str) -> Result<Box<dyn Player>>;
}

/// Holds at most one player; attaching disposes the previous one first.
#[derive(Default)]
pub struct PlayerSlot {
    player: Option<Box<dyn Player>>,
}

impl PlayerSlot {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn attach(&mut self, factory: &dyn PlayerFactory, playable_url: &str) -> Result<()> {
        self.release();
        let player = factory.create(playable_url)?;
        log::info!("Player attached to {}", player.source());
        self.player = Some(player);
        Ok(())
    }

    /// Dispose the current player, if any.
    pub fn release(&mut self) {
        if let Some(mut player) = self.player.take() {
            player.dispose();
            debug_assert!(player.is_disposed(), "player still attached after dispose");
            log::info!("Player released");
        }
    }

    pub fn current(&self) -> Option<&dyn Player> {
        self.player.as_deref()
    }
}

impl Drop for PlayerSlot {
    fn drop(&mut self) {
        self.release();
    }
}

/// Player drawn by the canvas: records the attached URL and when playback began.
#[derive(Debug)]
pub struct SurfacePlayer {
    source: String,
    attached_at: Instant,
    disposed: bool,
}

impl Player for SurfacePlayer {
    fn source(&self) -> &str {
        &self.source
    }

    fn attached_at(&self) -> Instant {
        self.attached_at
    }

    fn dispose(&mut self) {
        if !self.disposed {
            log::debug!("Disposing surface player for {}", self.source);
            self.disposed = true;
        }
    }

    fn is_disposed(&self) -> bool {
        self.disposed
    }
}

#[derive(Debug, Default, Clone, Copy)]
pub struct SurfacePlayerFactory;

impl PlayerFactory for SurfacePlayerFactory {
    fn create(&self, playable_url: &str) -> Result<Box<dyn Player>> {
        if playable_url.trim().is_empty() {
            anyhow::bail!("No playable URL");
        }
        Ok(Box::new(SurfacePlayer {
            source: playable_url.to_string(),
            attached_at: Instant::now(),
            disposed: false,
        }))
    }
}
