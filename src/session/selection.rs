// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! Overlay selection with an inactivity countdown.
//!
//! At most one overlay is selected. Selecting starts a countdown; touching
//! the selected overlay (opacity slider, drag, resize) pauses it and letting
//! go restarts it. When it runs out, or the user clicks elsewhere, the
//! selection is cleared.

use crate::models::overlay::OverlayId;
use crate::util::geometry::PixelRect;
use crate::util::timer::ScheduledTask;
use std::time::{Duration, Instant};

#[derive(Debug)]
pub struct Selection {
    selected: Option<OverlayId>,
    countdown: ScheduledTask<OverlayId>,
    window: Duration,
}

impl Selection {
    pub fn new(window: Duration) -> Self {
        Self {
            selected: None,
            countdown: ScheduledTask::new(),
            window,
        }
    }

    pub fn selected(&self) -> Option<&str> {
        self.selected.as_deref()
    }

    pub fn is_selected(&self, id: &str) -> bool {
        self.selected.as_deref() == Some(id)
    }

    pub fn countdown_remaining(&self, now: Instant) -> Option<Duration> {
        self.countdown.remaining(now)
    }

    /// Select an overlay and (re)start the countdown.
    pub fn select(&mut self, id: &str, now: Instant) {
        self.selected = Some(id.to_string());
        self.countdown.schedule(now, self.window, id.to_string());
    }

    /// Click on an overlay: selects it, or deselects it if already selected.
    pub fn toggle(&mut self, id: &str, now: Instant) {
        if self.is_selected(id) {
            self.clear();
        } else {
            self.select(id, now);
        }
    }

    /// The user started interacting with an overlay.
    pub fn interaction_started(&mut self, id: &str) {
        if self.is_selected(id) {
            self.countdown.cancel();
        }
    }

    /// The user finished interacting with an overlay.
    pub fn interaction_ended(&mut self, id: &str, now: Instant) {
        if self.is_selected(id) {
            self.countdown.schedule(now, self.window, id.to_string());
        }
    }

    /// A pointer press landed at `(x, y)`. Clears the selection when the
    /// press is outside the selected overlay's rectangle.
    pub fn pointer_pressed(&mut self, x: f64, y: f64, selected_rect: Option<PixelRect>) -> bool {
        if self.selected.is_none() {
            return false;
        }
        let inside = selected_rect.map(|r| r.contains(x, y)).unwrap_or(false);
        if !inside {
            self.clear();
        }
        !inside
    }

    /// Forget an overlay that no longer exists.
    pub fn forget(&mut self, id: &str) {
        if self.is_selected(id) {
            self.clear();
        }
    }

    pub fn clear(&mut self) {
        self.countdown.cancel();
        self.selected = None;
    }

    /// Advance the countdown. Returns the overlay deselected by expiry.
    pub fn tick(&mut self, now: Instant) -> Option<OverlayId> {
        let expired = self.countdown.poll(now)?;
        log::debug!("Selection of {} expired", expired);
        self.selected = None;
        Some(expired)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const WINDOW: Duration = Duration::from_secs(5);

    #[test]
    fn test_selection_expires() {
        let start = Instant::now();
        let mut selection = Selection::new(WINDOW);
        selection.select("a", start);

        assert_eq!(selection.tick(start + Duration::from_secs(4)), None);
        assert!(selection.is_selected("a"));
        assert_eq!(selection.tick(start + Duration::from_millis(5001)), Some("a".to_string()));
        assert_eq!(selection.selected(), None);
    }

    #[test]
    fn test_interaction_pauses_countdown() {
        let start = Instant::now();
        let mut selection = Selection::new(WINDOW);
        selection.select("a", start);

        selection.interaction_started("a");
        assert_eq!(selection.tick(start + Duration::from_secs(60)), None);
        assert!(selection.is_selected("a"));

        let released = start + Duration::from_secs(60);
        selection.interaction_ended("a", released);
        assert_eq!(selection.tick(released + Duration::from_secs(4)), None);
        assert_eq!(selection.tick(released + WINDOW), Some("a".to_string()));
    }

    #[test]
    fn test_interaction_with_other_overlay_is_ignored() {
        let start = Instant::now();
        let mut selection = Selection::new(WINDOW);
        selection.select("a", start);
        selection.interaction_started("b");
        selection.interaction_ended("b", start + Duration::from_secs(3));

        assert_eq!(selection.tick(start + WINDOW), Some("a".to_string()));
    }

    #[test]
    fn test_new_selection_replaces_countdown() {
        let start = Instant::now();
        let mut selection = Selection::new(WINDOW);
        selection.select("a", start);
        selection.select("b", start + Duration::from_secs(3));

        // The first countdown must not fire on behalf of "b"
        assert_eq!(selection.tick(start + WINDOW), None);
        assert!(selection.is_selected("b"));
        assert_eq!(
            selection.tick(start + Duration::from_secs(8)),
            Some("b".to_string())
        );
    }

    #[test]
    fn test_toggle_and_click_outside() {
        let start = Instant::now();
        let mut selection = Selection::new(WINDOW);

        selection.toggle("a", start);
        assert!(selection.is_selected("a"));
        selection.toggle("a", start);
        assert_eq!(selection.selected(), None);
        assert!(selection.countdown_remaining(start).is_none());

        selection.select("a", start);
        let rect = Some(PixelRect::new(10.0, 10.0, 100.0, 50.0));
        assert!(!selection.pointer_pressed(50.0, 30.0, rect));
        assert!(selection.is_selected("a"));
        assert!(selection.pointer_pressed(300.0, 30.0, rect));
        assert_eq!(selection.selected(), None);
    }

    #[test]
    fn test_forget_deleted_overlay() {
        let start = Instant::now();
        let mut selection = Selection::new(WINDOW);
        selection.select("a", start);
        selection.forget("b");
        assert!(selection.is_selected("a"));
        selection.forget("a");
        assert_eq!(selection.selected(), None);
    }
}
