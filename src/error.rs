// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! Error types for user-facing operations.
//!
//! Startup and media plumbing use `anyhow`; everything a user action can
//! trigger reports a [`DeckError`] so callers can tell a rejected request
//! from a failed round trip.

use crate::models::session::SessionState;

/// Errors surfaced to the user.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum DeckError {
    /// Rejected before any external call was made.
    #[error("{0}")]
    Validation(String),

    /// The overlay store or the conversion service failed.
    #[error("{0}")]
    Remote(String),

    /// The player could not be attached to the playable URL.
    #[error("Video player error: {0}")]
    Player(String),

    /// The operation is not accepted in the current session state.
    #[error("Cannot {action} while the stream is {state}")]
    InvalidState {
        action: &'static str,
        state: SessionState,
    },
}

impl DeckError {
    pub fn validation(message: impl Into<String>) -> Self {
        DeckError::Validation(message.into())
    }

    pub fn remote(message: impl Into<String>) -> Self {
        DeckError::Remote(message.into())
    }
}

pub type DeckResult<T> = Result<T, DeckError>;
