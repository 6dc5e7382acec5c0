// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! Container frame observer.
//!
//! Owns the measured frame of the active render target. The shell reports
//! the size of whichever surface it laid out this frame; the observer
//! decides whether that counts as a frame change. After a switch between
//! the normal and fullscreen targets, measurements are ignored until the
//! settle delay has passed, since the window layout lags the transition.

use crate::util::geometry::Frame;
use crate::util::timer::ScheduledTask;
use std::time::{Duration, Instant};

/// Measurements closer than this are the same frame.
const FRAME_EPSILON: f64 = 0.01;

/// Surface the overlays are rendered onto.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RenderTarget {
    #[default]
    Normal,
    Fullscreen,
}

/// Single writer of the container frame.
#[derive(Debug)]
pub struct FrameObserver {
    target: RenderTarget,
    frame: Frame,
    settle: ScheduledTask<RenderTarget>,
    settle_delay: Duration,
}

impl FrameObserver {
    pub fn new(settle_delay: Duration) -> Self {
        Self {
            target: RenderTarget::Normal,
            frame: Frame::default(),
            settle: ScheduledTask::new(),
            settle_delay,
        }
    }

    pub fn target(&self) -> RenderTarget {
        self.target
    }

    pub fn frame(&self) -> Frame {
        self.frame
    }

    pub fn is_settling(&self) -> bool {
        self.settle.is_pending()
    }

    pub fn settle_remaining(&self, now: Instant) -> Option<Duration> {
        self.settle.remaining(now)
    }

    /// Switch the render target. Returns `false` if it was already active.
    pub fn switch_target(&mut self, target: RenderTarget, now: Instant) -> bool {
        if self.target == target {
            return false;
        }
        log::info!("Render target {:?} -> {:?}", self.target, target);
        self.target = target;
        self.settle.schedule(now, self.settle_delay, target);
        true
    }

    pub fn toggle_fullscreen(&mut self, now: Instant) -> RenderTarget {
        let next = match self.target {
            RenderTarget::Normal => RenderTarget::Fullscreen,
            RenderTarget::Fullscreen => RenderTarget::Normal,
        };
        self.switch_target(next, now);
        next
    }

    /// Report the measured size of the active surface.
    ///
    /// Returns the new frame when it differs from the current one and no
    /// target switch is still settling.
    pub fn observe(&mut self, measured: Frame, now: Instant) -> Option<Frame> {
        if self.is_settling() {
            match self.settle.poll(now) {
                Some(target) => log::debug!("Re-measuring {:?} surface", target),
                None => return None,
            }
        }

        let unchanged = (measured.width - self.frame.width).abs() < FRAME_EPSILON
            && (measured.height - self.frame.height).abs() < FRAME_EPSILON;
        if unchanged {
            return None;
        }

        log::debug!(
            "Container frame {:.0}x{:.0} -> {:.0}x{:.0}",
            self.frame.width,
            self.frame.height,
            measured.width,
            measured.height
        );
        self.frame = measured;
        Some(measured)
    }
}
