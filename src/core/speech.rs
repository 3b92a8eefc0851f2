//! # Speech Input Session
//!
//! Lifecycle of one dictation session, owned by a composer.
//!
//! ```text
//!            start()                  PermissionGranted
//!   Idle ─────────────▶ RequestingPermission ─────────────▶ Listening
//!    ▲  │                     │ PermissionDenied               │
//!    │  │ no capability       ▼                                │ Transcript / Error /
//!    │  └──────────────▶ Failed(..) ──▶ Idle                   │ Ended / stop()
//!    └─────────────────────────────────────────────────────────┘
//! ```
//!
//! The capture device answers asynchronously: it posts [`CaptureSignal`]s on
//! a channel owned by the session, and the event loop drains them with
//! [`SpeechInputSession::pump`]. Every signal is tagged with the generation
//! of the attempt that produced it. Stopping or tearing down bumps the
//! generation, so late signals from an old attempt are discarded and never
//! reach the composer.
//!
//! At most one [`CaptureHandle`] is alive per session. Dropping the session
//! stops it.

use std::fmt;
use std::sync::mpsc::{self, Receiver, Sender};

use log::{debug, info, warn};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SpeechError {
    /// The host has no speech capture at all.
    CapabilityUnavailable,
    /// The capture device refused access.
    PermissionDenied(String),
    /// Capture started but failed.
    Capture(String),
}

impl fmt::Display for SpeechError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SpeechError::CapabilityUnavailable => {
                write!(f, "Speech input is not available on this system")
            }
            SpeechError::PermissionDenied(reason) => {
                write!(f, "Microphone permission denied: {reason}")
            }
            SpeechError::Capture(reason) => write!(f, "Speech recognition error: {reason}"),
        }
    }
}

impl std::error::Error for SpeechError {}

/// What a capture device reports back.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CaptureSignal {
    PermissionGranted,
    PermissionDenied(String),
    /// A finalized transcript.
    Transcript(String),
    Error(String),
    /// The device stopped on its own without a transcript.
    Ended,
}

/// A signal tagged with the attempt it belongs to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CaptureEnvelope {
    pub generation: u64,
    pub signal: CaptureSignal,
}

/// Where a capture device posts its signals.
#[derive(Clone)]
pub struct CaptureSender {
    generation: u64,
    tx: Sender<CaptureEnvelope>,
}

impl CaptureSender {
    /// Post a signal. Returns false once the owning session is gone.
    pub fn send(&self, signal: CaptureSignal) -> bool {
        self.tx
            .send(CaptureEnvelope {
                generation: self.generation,
                signal,
            })
            .is_ok()
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }
}

/// A live capture stream.
pub trait CaptureHandle {
    /// Stop capturing. Must be idempotent.
    fn stop(&mut self);
}

/// The speech-to-text backend a session drives.
pub trait CaptureDevice {
    /// Whether this host can capture speech at all.
    fn is_available(&self) -> bool;

    /// Ask for access. The answer arrives later as `PermissionGranted` or
    /// `PermissionDenied` on `signals`.
    fn request_access(&mut self, signals: CaptureSender);

    /// Open the capture stream after access was granted. Transcripts,
    /// errors and end-of-stream are posted on `signals`.
    fn open(&mut self, signals: CaptureSender) -> Result<Box<dyn CaptureHandle>, SpeechError>;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SpeechState {
    Idle,
    RequestingPermission,
    Listening,
}

/// Outcomes the owning composer reacts to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SpeechUpdate {
    Listening,
    /// Finalized transcript. The session has already returned to idle.
    Transcript(String),
    Stopped,
    Failed(SpeechError),
}

pub struct SpeechInputSession {
    device: Box<dyn CaptureDevice>,
    state: SpeechState,
    handle: Option<Box<dyn CaptureHandle>>,
    generation: u64,
    tx: Sender<CaptureEnvelope>,
    rx: Receiver<CaptureEnvelope>,
}

impl SpeechInputSession {
    pub fn new(device: Box<dyn CaptureDevice>) -> Self {
        let (tx, rx) = mpsc::channel();
        Self {
            device,
            state: SpeechState::Idle,
            handle: None,
            generation: 0,
            tx,
            rx,
        }
    }

    pub fn state(&self) -> SpeechState {
        self.state
    }

    pub fn is_listening(&self) -> bool {
        self.state == SpeechState::Listening
    }

    fn sender(&self) -> CaptureSender {
        CaptureSender {
            generation: self.generation,
            tx: self.tx.clone(),
        }
    }

    /// Begin a session. No-op unless idle.
    pub fn start(&mut self) -> Option<SpeechUpdate> {
        if self.state != SpeechState::Idle {
            debug!("Speech start ignored in state {:?}", self.state);
            return None;
        }
        if !self.device.is_available() {
            warn!("Speech capture requested but no capture device is available");
            return Some(SpeechUpdate::Failed(SpeechError::CapabilityUnavailable));
        }
        self.generation += 1;
        self.state = SpeechState::RequestingPermission;
        info!("Requesting capture access (generation {})", self.generation);
        let signals = self.sender();
        self.device.request_access(signals);
        None
    }

    /// End listening without a transcript. No-op unless listening.
    pub fn stop(&mut self) -> Option<SpeechUpdate> {
        if self.state != SpeechState::Listening {
            return None;
        }
        self.release();
        Some(SpeechUpdate::Stopped)
    }

    /// The microphone button: start when idle, stop when listening.
    pub fn toggle(&mut self) -> Option<SpeechUpdate> {
        if self.is_listening() {
            self.stop()
        } else {
            self.start()
        }
    }

    /// Stop any live handle and invalidate in-flight signals.
    fn release(&mut self) {
        if let Some(mut handle) = self.handle.take() {
            handle.stop();
            debug!("Capture handle stopped (generation {})", self.generation);
        }
        self.generation += 1;
        self.state = SpeechState::Idle;
    }

    /// Apply one signal from the capture device.
    pub fn handle_signal(&mut self, envelope: CaptureEnvelope) -> Option<SpeechUpdate> {
        if envelope.generation != self.generation {
            debug!(
                "Discarding stale capture signal {:?} (generation {} != {})",
                envelope.signal, envelope.generation, self.generation
            );
            return None;
        }

        match (self.state, envelope.signal) {
            (SpeechState::RequestingPermission, CaptureSignal::PermissionGranted) => {
                let signals = self.sender();
                match self.device.open(signals) {
                    Ok(handle) => {
                        self.handle = Some(handle);
                        self.state = SpeechState::Listening;
                        info!("Listening for speech");
                        Some(SpeechUpdate::Listening)
                    }
                    Err(e) => {
                        warn!("Failed to open capture: {}", e);
                        self.release();
                        Some(SpeechUpdate::Failed(e))
                    }
                }
            }
            (SpeechState::RequestingPermission, CaptureSignal::PermissionDenied(reason)) => {
                warn!("Capture permission denied: {}", reason);
                self.release();
                Some(SpeechUpdate::Failed(SpeechError::PermissionDenied(reason)))
            }
            (SpeechState::Listening, CaptureSignal::Transcript(text)) => {
                // One transcript per session
                self.release();
                Some(SpeechUpdate::Transcript(text))
            }
            (SpeechState::Listening | SpeechState::RequestingPermission, CaptureSignal::Error(reason)) => {
                warn!("Capture error: {}", reason);
                self.release();
                Some(SpeechUpdate::Failed(SpeechError::Capture(reason)))
            }
            (SpeechState::Listening, CaptureSignal::Ended) => {
                self.release();
                Some(SpeechUpdate::Stopped)
            }
            (state, signal) => {
                debug!("Ignoring capture signal {:?} in state {:?}", signal, state);
                None
            }
        }
    }

    /// Drain pending signals from the capture device.
    pub fn pump(&mut self) -> Vec<SpeechUpdate> {
        let mut updates = Vec::new();
        while let Ok(envelope) = self.rx.try_recv() {
            if let Some(update) = self.handle_signal(envelope) {
                updates.push(update);
            }
        }
        updates
    }

    /// Stop everything. Safe to call more than once.
    pub fn teardown(&mut self) {
        if self.state != SpeechState::Idle || self.handle.is_some() {
            info!("Tearing down speech session");
        }
        self.release();
    }
}

impl Drop for SpeechInputSession {
    fn drop(&mut self) {
        self.teardown();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{FakeCapture, FakeCaptureLog};

    fn session(available: bool, grant: bool) -> (SpeechInputSession, FakeCaptureLog) {
        let (device, log) = FakeCapture::new(available, grant);
        (SpeechInputSession::new(Box::new(device)), log)
    }

    fn listening_session() -> (SpeechInputSession, FakeCaptureLog) {
        let (mut s, log) = session(true, true);
        assert_eq!(s.start(), None);
        assert_eq!(s.pump(), vec![SpeechUpdate::Listening]);
        (s, log)
    }

    #[test]
    fn test_unavailable_capability_fails_immediately() {
        let (mut s, log) = session(false, true);
        assert_eq!(
            s.start(),
            Some(SpeechUpdate::Failed(SpeechError::CapabilityUnavailable))
        );
        assert_eq!(s.state(), SpeechState::Idle);
        assert_eq!(log.opened(), 0);
        assert_eq!(log.access_requests(), 0);
    }

    #[test]
    fn test_permission_flow_reaches_listening() {
        let (mut s, log) = session(true, true);
        s.start();
        assert_eq!(s.state(), SpeechState::RequestingPermission);
        assert_eq!(s.pump(), vec![SpeechUpdate::Listening]);
        assert!(s.is_listening());
        assert_eq!(log.live(), 1);
    }

    #[test]
    fn test_permission_denied_returns_to_idle() {
        let (mut s, log) = session(true, false);
        s.start();
        let updates = s.pump();
        assert!(matches!(
            updates.as_slice(),
            [SpeechUpdate::Failed(SpeechError::PermissionDenied(_))]
        ));
        assert_eq!(s.state(), SpeechState::Idle);
        assert_eq!(log.opened(), 0);
    }

    #[test]
    fn test_transcript_stops_session_autonomously() {
        let (mut s, log) = listening_session();
        log.emit(CaptureSignal::Transcript("world".to_string()));
        assert_eq!(s.pump(), vec![SpeechUpdate::Transcript("world".to_string())]);
        assert_eq!(s.state(), SpeechState::Idle);
        assert_eq!(log.live(), 0);
        assert_eq!(log.stopped(), 1);
    }

    #[test]
    fn test_only_one_transcript_per_session() {
        let (mut s, log) = listening_session();
        log.emit(CaptureSignal::Transcript("one".to_string()));
        log.emit(CaptureSignal::Transcript("two".to_string()));
        assert_eq!(s.pump(), vec![SpeechUpdate::Transcript("one".to_string())]);
    }

    #[test]
    fn test_explicit_stop() {
        let (mut s, log) = listening_session();
        assert_eq!(s.toggle(), Some(SpeechUpdate::Stopped));
        assert_eq!(s.state(), SpeechState::Idle);
        assert_eq!(log.live(), 0);
    }

    #[test]
    fn test_stop_when_not_listening_is_noop() {
        let (mut s, log) = session(true, true);
        assert_eq!(s.stop(), None);
        s.start();
        assert_eq!(s.stop(), None, "still requesting permission");
        assert_eq!(log.stopped(), 0);
    }

    #[test]
    fn test_start_while_listening_is_noop() {
        let (mut s, log) = listening_session();
        assert_eq!(s.start(), None);
        assert!(s.pump().is_empty());
        assert_eq!(log.opened(), 1);
        assert_eq!(log.access_requests(), 1);
        assert_eq!(log.live(), 1);
    }

    #[test]
    fn test_double_start_before_grant_opens_one_handle() {
        let (mut s, log) = session(true, true);
        s.start();
        s.start();
        s.pump();
        assert_eq!(log.opened(), 1);
        assert_eq!(log.live(), 1);
    }

    #[test]
    fn test_signals_after_stop_are_discarded() {
        let (mut s, log) = listening_session();
        s.stop();
        log.emit(CaptureSignal::Transcript("late".to_string()));
        assert!(s.pump().is_empty());
    }

    #[test]
    fn test_capture_error_returns_to_idle() {
        let (mut s, log) = listening_session();
        log.emit(CaptureSignal::Error("no-speech".to_string()));
        assert_eq!(
            s.pump(),
            vec![SpeechUpdate::Failed(SpeechError::Capture("no-speech".to_string()))]
        );
        assert_eq!(s.state(), SpeechState::Idle);
        assert_eq!(log.live(), 0);
    }

    #[test]
    fn test_device_end_without_transcript() {
        let (mut s, log) = listening_session();
        log.emit(CaptureSignal::Ended);
        assert_eq!(s.pump(), vec![SpeechUpdate::Stopped]);
        assert_eq!(log.live(), 0);
    }

    #[test]
    fn test_drop_stops_live_handle() {
        let (s, log) = listening_session();
        drop(s);
        assert_eq!(log.live(), 0);
        assert_eq!(log.stopped(), 1);
        assert!(!log.emit(CaptureSignal::Transcript("gone".to_string())));
    }

    #[test]
    fn test_restart_after_transcript() {
        let (mut s, log) = listening_session();
        log.emit(CaptureSignal::Transcript("a".to_string()));
        s.pump();
        s.start();
        assert_eq!(s.pump(), vec![SpeechUpdate::Listening]);
        assert_eq!(log.opened(), 2);
        assert_eq!(log.live(), 1);
    }
}
