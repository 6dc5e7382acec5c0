// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! Single-flight scheduled task.
//!
//! A `ScheduledTask` holds at most one pending deadline. Scheduling again
//! replaces (cancels) whatever was pending. The UI loop polls it with the
//! current time once per frame; nothing sleeps.

use std::time::{Duration, Instant};

/// A cancellable deadline carrying a payload delivered on expiry.
#[derive(Debug)]
pub struct ScheduledTask<T> {
    pending: Option<(Instant, T)>,
}

impl<T> Default for ScheduledTask<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> ScheduledTask<T> {
    pub fn new() -> Self {
        Self { pending: None }
    }

    /// Schedule `payload` to fire `delay` after `now`, replacing any pending task.
    pub fn schedule(&mut self, now: Instant, delay: Duration, payload: T) {
        self.pending = Some((now + delay, payload));
    }

    /// Cancel the pending task, returning its payload.
    pub fn cancel(&mut self) -> Option<T> {
        self.pending.take().map(|(_, payload)| payload)
    }

    pub fn is_pending(&self) -> bool {
        self.pending.is_some()
    }

    /// Time left before the task fires, if one is pending.
    pub fn remaining(&self, now: Instant) -> Option<Duration> {
        self.pending
            .as_ref()
            .map(|(deadline, _)| deadline.saturating_duration_since(now))
    }

    /// Fire the task if its deadline has passed. Fires at most once.
    pub fn poll(&mut self, now: Instant) -> Option<T> {
        let due = matches!(self.pending, Some((deadline, _)) if now >= deadline);
        if due {
            self.cancel()
        } else {
            None
        }
    }
}
