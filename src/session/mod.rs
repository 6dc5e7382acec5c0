// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! Stream session controller.
//!
//! Drives the single video session through
//! `Idle -> Starting -> Playing -> Stopping -> Idle`. Calls to the
//! conversion service run on a background job; replies are picked up by
//! [`SessionController::poll`] on the UI thread, which is also where the
//! post-start settle delay is timed.

pub mod player;
pub mod selection;

use crate::error::{DeckError, DeckResult};
use crate::io::stream::StreamService;
use crate::io::tasks::SharedSpawner;
use crate::models::session::{SessionState, StreamSession, StreamStatus};
use crate::util::timer::ScheduledTask;
use player::{Player, PlayerFactory, PlayerSlot};
use std::sync::mpsc::{channel, Receiver, Sender};
use std::sync::Arc;
use std::time::{Duration, Instant};

/// URL prefixes a source may start with.
pub const ACCEPTED_SCHEMES: [&str; 3] = ["rtsp://", "http://", "https://"];

/// Check a source URL before anything is sent anywhere.
pub fn validate_source_url(url: &str) -> DeckResult<&str> {
    let url = url.trim();
    if url.is_empty() {
        return Err(DeckError::validation("Please enter a stream URL"));
    }
    if !ACCEPTED_SCHEMES.iter().any(|scheme| url.starts_with(scheme)) {
        return Err(DeckError::validation(
            "Invalid stream URL. Must start with rtsp://, http://, or https://",
        ));
    }
    Ok(url)
}

/// Whether the player can attach to the URL without conversion (an HLS
/// playlist served over HTTP).
pub fn is_directly_playable(url: &str) -> bool {
    if !(url.starts_with("http://") || url.starts_with("https://")) {
        return false;
    }
    let path = url.split(['?', '#']).next().unwrap_or(url);
    path.to_ascii_lowercase().ends_with(".m3u8")
}

/// Something the shell should tell the user about.
#[derive(Debug, Clone, PartialEq)]
pub enum SessionEvent {
    /// The conversion service accepted the source; waiting for output.
    Converting { source_url: String },
    Playing { playable_url: String },
    StartFailed(DeckError),
    Stopped,
    /// The session is idle but the service could not confirm teardown.
    StopWarning(DeckError),
    /// The service already has a conversion running.
    BackendActive(StreamStatus),
}

enum Reply {
    Started {
        source_url: String,
        result: DeckResult<String>,
    },
    Stopped(DeckResult<()>),
    Status(DeckResult<StreamStatus>),
}

/// Global delete-key binding. Exists only while the session is playing.
#[derive(Debug)]
pub struct DeleteKeyListener(());

impl DeleteKeyListener {
    fn attach() -> Self {
        log::debug!("Delete key listener attached");
        Self(())
    }
}

impl Drop for DeleteKeyListener {
    fn drop(&mut self) {
        log::debug!("Delete key listener detached");
    }
}

/// Sole writer of the stream session.
pub struct SessionController {
    service: Arc<dyn StreamService>,
    spawner: SharedSpawner,
    players: Box<dyn PlayerFactory>,
    player: PlayerSlot,
    session: StreamSession,
    settle: ScheduledTask<String>,
    settle_delay: Duration,
    delete_key: Option<DeleteKeyListener>,
    in_flight: usize,
    tx: Sender<Reply>,
    rx: Receiver<Reply>,
}

impl SessionController {
    pub fn new(
        service: Arc<dyn StreamService>,
        spawner: SharedSpawner,
        players: Box<dyn PlayerFactory>,
        settle_delay: Duration,
    ) -> Self {
        let (tx, rx) = channel();
        Self {
            service,
            spawner,
            players,
            player: PlayerSlot::new(),
            session: StreamSession::default(),
            settle: ScheduledTask::new(),
            settle_delay,
            delete_key: None,
            in_flight: 0,
            tx,
            rx,
        }
    }

    pub fn state(&self) -> SessionState {
        self.session.state
    }

    pub fn session(&self) -> &StreamSession {
        &self.session
    }

    pub fn player(&self) -> Option<&dyn Player> {
        self.player.current()
    }

    /// Keyboard deletion is live only while playing.
    pub fn delete_key(&self) -> Option<&DeleteKeyListener> {
        self.delete_key.as_ref()
    }

    /// Whether a reply or the settle delay is still outstanding.
    pub fn is_busy(&self) -> bool {
        self.in_flight > 0 || self.settle.is_pending()
    }

    pub fn settle_remaining(&self, now: Instant) -> Option<Duration> {
        self.settle.remaining(now)
    }

    /// Start a session for `source_url`.
    pub fn start(&mut self, source_url: &str) -> DeckResult<()> {
        if self.session.state != SessionState::Idle {
            return Err(DeckError::InvalidState {
                action: "start a stream",
                state: self.session.state,
            });
        }
        let source_url = validate_source_url(source_url)?.to_string();
        self.session.source_url = Some(source_url.clone());

        if is_directly_playable(&source_url) {
            log::info!("{} is directly playable", source_url);
            return self.enter_playing(source_url);
        }

        self.session.state = SessionState::Starting;
        let service = Arc::clone(&self.service);
        let tx = self.tx.clone();
        self.in_flight += 1;
        self.spawner.spawn(Box::new(move || {
            let result = service.start(&source_url);
            let _ = tx.send(Reply::Started { source_url, result });
        }));
        Ok(())
    }

    /// Stop the playing session. A no-op in any other state.
    pub fn stop(&mut self) -> DeckResult<()> {
        if self.session.state != SessionState::Playing {
            log::debug!("Ignoring stop while {}", self.session.state);
            return Ok(());
        }

        self.player.release();
        self.delete_key = None;
        self.session.state = SessionState::Stopping;

        let service = Arc::clone(&self.service);
        let tx = self.tx.clone();
        self.in_flight += 1;
        self.spawner.spawn(Box::new(move || {
            let _ = tx.send(Reply::Stopped(service.stop()));
        }));
        Ok(())
    }

    /// Ask the conversion service what it is doing.
    pub fn refresh_status(&mut self) {
        let service = Arc::clone(&self.service);
        let tx = self.tx.clone();
        self.in_flight += 1;
        self.spawner.spawn(Box::new(move || {
            let _ = tx.send(Reply::Status(service.status()));
        }));
    }

    /// Apply finished background calls and the settle timer.
    pub fn poll(&mut self, now: Instant) -> Vec<SessionEvent> {
        let mut events = Vec::new();

        while let Ok(reply) = self.rx.try_recv() {
            self.in_flight = self.in_flight.saturating_sub(1);
            match reply {
                Reply::Started { source_url, result } => {
                    if self.session.state != SessionState::Starting {
                        log::warn!("Dropping stale start reply for {}", source_url);
                        continue;
                    }
                    match result {
                        Ok(playable_url) => {
                            log::info!(
                                "Conversion started, attaching in {:?}",
                                self.settle_delay
                            );
                            self.settle.schedule(now, self.settle_delay, playable_url);
                            events.push(SessionEvent::Converting { source_url });
                        }
                        Err(e) => {
                            log::error!("Failed to start stream: {}", e);
                            self.session.clear();
                            events.push(SessionEvent::StartFailed(e));
                        }
                    }
                }
                Reply::Stopped(result) => {
                    if self.session.state != SessionState::Stopping {
                        continue;
                    }
                    self.session.clear();
                    match result {
                        Ok(()) => events.push(SessionEvent::Stopped),
                        Err(e) => {
                            log::warn!("Stream teardown failed: {}", e);
                            events.push(SessionEvent::StopWarning(e));
                        }
                    }
                }
                Reply::Status(result) => match result {
                    Ok(status) if status.active => events.push(SessionEvent::BackendActive(status)),
                    Ok(_) => {}
                    Err(e) => log::warn!("Stream status unavailable: {}", e),
                },
            }
        }

        if let Some(playable_url) = self.settle.poll(now) {
            if self.session.state == SessionState::Starting {
                match self.enter_playing(playable_url.clone()) {
                    Ok(()) => events.push(SessionEvent::Playing { playable_url }),
                    Err(e) => events.push(SessionEvent::StartFailed(e)),
                }
            }
        }

        events
    }

    /// Release everything on exit. Safe to call more than once.
    pub fn shutdown(&mut self) {
        self.settle.cancel();
        self.player.release();
        self.delete_key = None;
        if matches!(self.session.state, SessionState::Starting | SessionState::Playing) {
            log::info!("Stopping stream on exit");
            if let Err(e) = self.service.stop() {
                log::warn!("Stream teardown on exit failed: {}", e);
            }
        }
        self.session.clear();
    }

    fn enter_playing(&mut self, playable_url: String) -> DeckResult<()> {
        if let Err(e) = self.player.attach(self.players.as_ref(), &playable_url) {
            log::error!("Failed to attach player: {:#}", e);
            self.session.clear();
            return Err(DeckError::Player(e.to_string()));
        }
        self.session.playable_url = Some(playable_url);
        self.session.state = SessionState::Playing;
        self.delete_key = Some(DeleteKeyListener::attach());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::io::tasks::InlineSpawner;
    use crate::testing::{CountingFactory, Counters, FakeService, CONVERTED_URL};
    use std::sync::atomic::Ordering;

    const SETTLE: Duration = Duration::from_millis(2000);

    fn controller(service: FakeService) -> (SessionController, Arc<FakeService>, Counters) {
        let service = Arc::new(service);
        let counters = Counters::default();
        let controller = SessionController::new(
            service.clone(),
            Arc::new(InlineSpawner),
            Box::new(CountingFactory(counters.clone())),
            SETTLE,
        );
        (controller, service, counters)
    }

    fn play(controller: &mut SessionController, now: Instant) {
        controller.start("rtsp://cam/1").unwrap();
        controller.poll(now);
        controller.poll(now + SETTLE);
        assert_eq!(controller.state(), SessionState::Playing);
    }

    #[test]
    fn test_validate_source_url() {
        assert!(validate_source_url("rtsp://rtsp.stream/pattern").is_ok());
        assert_eq!(validate_source_url("  https://a/b  ").unwrap(), "https://a/b");
        assert!(matches!(validate_source_url("ftp://bad"), Err(DeckError::Validation(_))));
        assert!(matches!(validate_source_url("   "), Err(DeckError::Validation(_))));
    }

    #[test]
    fn test_directly_playable() {
        assert!(is_directly_playable("https://cdn.example.com/live/index.m3u8"));
        assert!(is_directly_playable("http://host/LIVE.M3U8?token=abc"));
        assert!(!is_directly_playable("rtsp://host/stream.m3u8"));
        assert!(!is_directly_playable("https://host/video.mp4"));
    }

    #[test]
    fn test_bad_scheme_is_rejected() {
        let (mut controller, service, _) = controller(FakeService::default());
        let result = controller.start("ftp://bad");

        assert!(matches!(result, Err(DeckError::Validation(_))));
        assert_eq!(controller.state(), SessionState::Idle);
        assert!(controller.session().source_url.is_none());
        assert!(service.start_calls.lock().unwrap().is_empty());
    }

    #[test]
    fn test_direct_url_plays_without_backend() {
        let (mut controller, service, counters) = controller(FakeService::default());
        let url = "https://cdn.example.com/live/index.m3u8";
        controller.start(url).unwrap();

        assert_eq!(controller.state(), SessionState::Playing);
        assert_eq!(controller.session().playable_url.as_deref(), Some(url));
        assert_eq!(controller.player().map(|p| p.source()), Some(url));
        assert!(controller.delete_key().is_some());
        assert!(service.start_calls.lock().unwrap().is_empty());
        assert_eq!(counters.live(), 1);
    }

    #[test]
    fn test_start_waits_for_settle_delay() {
        let now = Instant::now();
        let (mut controller, service, counters) = controller(FakeService::default());

        controller.start("rtsp://cam/1").unwrap();
        assert_eq!(controller.state(), SessionState::Starting);
        assert!(controller.delete_key().is_none());

        let events = controller.poll(now);
        assert_eq!(
            events,
            vec![SessionEvent::Converting {
                source_url: "rtsp://cam/1".to_string()
            }]
        );
        assert_eq!(controller.state(), SessionState::Starting);
        assert!(controller.poll(now + Duration::from_millis(1999)).is_empty());
        assert_eq!(counters.live(), 0);

        let events = controller.poll(now + SETTLE);
        assert_eq!(
            events,
            vec![SessionEvent::Playing {
                playable_url: CONVERTED_URL.to_string()
            }]
        );
        assert_eq!(controller.state(), SessionState::Playing);
        assert!(controller.delete_key().is_some());
        assert_eq!(counters.live(), 1);
        assert_eq!(service.start_calls.lock().unwrap().len(), 1);
    }

    #[test]
    fn test_start_while_starting_is_rejected() {
        let now = Instant::now();
        let (mut controller, service, _) = controller(FakeService::default());

        controller.start("rtsp://cam/1").unwrap();
        let second = controller.start("rtsp://cam/2");
        assert!(matches!(
            second,
            Err(DeckError::InvalidState {
                state: SessionState::Starting,
                ..
            })
        ));

        // Still rejected after the reply, while the settle delay runs
        controller.poll(now);
        assert!(controller.start("rtsp://cam/2").is_err());
        assert_eq!(service.start_calls.lock().unwrap().as_slice(), ["rtsp://cam/1"]);
        assert_eq!(controller.session().source_url.as_deref(), Some("rtsp://cam/1"));
    }

    #[test]
    fn test_start_failure_returns_to_idle() {
        let (mut controller, _, counters) = controller(FakeService {
            fail_start: true,
            ..Default::default()
        });

        controller.start("rtsp://cam/1").unwrap();
        let events = controller.poll(Instant::now());

        assert_eq!(
            events,
            vec![SessionEvent::StartFailed(DeckError::remote(
                "FFmpeg is not installed or not in PATH"
            ))]
        );
        assert_eq!(controller.state(), SessionState::Idle);
        assert!(controller.session().source_url.is_none());
        assert_eq!(counters.live(), 0);

        // Retrying is up to the user
        assert!(controller.start("rtsp://cam/1").is_ok());
    }

    #[test]
    fn test_stop_releases_player_first() {
        let now = Instant::now();
        let (mut controller, service, counters) = controller(FakeService::default());
        play(&mut controller, now);

        controller.stop().unwrap();
        assert_eq!(controller.state(), SessionState::Stopping);
        assert!(controller.player().is_none());
        assert!(controller.delete_key().is_none());
        assert_eq!(counters.live(), 0);

        assert_eq!(controller.poll(now), vec![SessionEvent::Stopped]);
        assert_eq!(controller.state(), SessionState::Idle);
        assert_eq!(service.stops(), 1);
    }

    #[test]
    fn test_stop_twice_is_a_no_op() {
        let now = Instant::now();
        let (mut controller, service, _) = controller(FakeService::default());
        play(&mut controller, now);

        controller.stop().unwrap();
        controller.poll(now);
        assert!(controller.stop().is_ok());
        assert_eq!(controller.state(), SessionState::Idle);
        assert_eq!(service.stops(), 1);
    }

    #[test]
    fn test_failed_teardown_still_idles() {
        let now = Instant::now();
        let (mut controller, _, _) = controller(FakeService {
            fail_stop: true,
            ..Default::default()
        });
        play(&mut controller, now);

        controller.stop().unwrap();
        let events = controller.poll(now);
        assert!(matches!(events.as_slice(), [SessionEvent::StopWarning(DeckError::Remote(_))]));
        assert_eq!(controller.state(), SessionState::Idle);
    }

    #[test]
    fn test_repeated_cycles_never_leak_players() {
        let mut now = Instant::now();
        let (mut controller, _, counters) = controller(FakeService::default());

        for _ in 0..5 {
            play(&mut controller, now);
            assert_eq!(counters.live(), 1);
            controller.stop().unwrap();
            controller.poll(now);
            assert_eq!(counters.live(), 0);
            now += SETTLE * 2;
        }
        assert_eq!(counters.created.load(Ordering::SeqCst), 5);
    }

    #[test]
    fn test_shutdown_is_idempotent() {
        let now = Instant::now();
        let (mut controller, service, counters) = controller(FakeService::default());
        play(&mut controller, now);

        controller.shutdown();
        controller.shutdown();
        assert_eq!(counters.live(), 0);
        assert_eq!(controller.state(), SessionState::Idle);
        assert_eq!(service.stops(), 1);
    }

    #[test]
    fn test_status_reports_active_backend() {
        let (mut controller, _, _) = controller(FakeService {
            active: true,
            ..Default::default()
        });
        controller.refresh_status();
        let events = controller.poll(Instant::now());
        assert!(matches!(
            events.as_slice(),
            [SessionEvent::BackendActive(StreamStatus { active: true, .. })]
        ));
        assert!(!controller.is_busy());
    }
}
