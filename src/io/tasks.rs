// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! Background job execution.
//!
//! Network calls run off the UI thread and report back over an mpsc
//! channel that the owner drains with `try_recv` once per frame.

use std::sync::Arc;

/// A unit of background work.
pub type Job = Box<dyn FnOnce() + Send + 'static>;

/// Runs jobs away from the UI thread.
pub trait Spawner: Send + Sync {
    fn spawn(&self, job: Job);
}

/// Spawns one OS thread per job.
#[derive(Debug, Default, Clone, Copy)]
pub struct ThreadSpawner;

impl Spawner for ThreadSpawner {
    fn spawn(&self, job: Job) {
        std::thread::spawn(job);
    }
}

pub type SharedSpawner = Arc<dyn Spawner>;

/// Runs jobs immediately on the calling thread.
#[cfg(test)]
#[derive(Debug, Default, Clone, Copy)]
pub struct InlineSpawner;

#[cfg(test)]
impl Spawner for InlineSpawner {
    fn spawn(&self, job: Job) {
        job();
    }
}
