// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! Stream session state.

use std::fmt;

/// Lifecycle state of the single active video session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SessionState {
    #[default]
    Idle,
    Starting,
    Playing,
    Stopping,
}

impl fmt::Display for SessionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            SessionState::Idle => "idle",
            SessionState::Starting => "starting",
            SessionState::Playing => "playing",
            SessionState::Stopping => "stopping",
        };
        f.write_str(name)
    }
}

/// The process-wide stream session.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct StreamSession {
    pub state: SessionState,
    /// URL the user asked to watch
    pub source_url: Option<String>,
    /// URL the player is attached to (HLS manifest)
    pub playable_url: Option<String>,
}

impl StreamSession {
    /// Reset to an idle session with no URLs.
    pub fn clear(&mut self) {
        *self = Self::default();
    }
}

/// Conversion service status as reported by the backend.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StreamStatus {
    pub active: bool,
    pub source_url: Option<String>,
}
