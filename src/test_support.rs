//! Test utilities shared across the crate.
//!
//! This module is only compiled during tests (`#[cfg(test)]`).

use std::cell::RefCell;
use std::rc::Rc;

use crate::core::speech::{CaptureDevice, CaptureHandle, CaptureSender, CaptureSignal, SpeechError};
use crate::core::workspace::{Conversation, Folder, ItemKind, Prompt, Workspace};

#[derive(Default)]
struct CaptureRecord {
    sender: Option<CaptureSender>,
    access_requests: usize,
    opened: usize,
    stopped: usize,
}

/// Observes a [`FakeCapture`] from the outside and injects signals into it.
#[derive(Clone, Default)]
pub struct FakeCaptureLog(Rc<RefCell<CaptureRecord>>);

impl FakeCaptureLog {
    pub fn access_requests(&self) -> usize {
        self.0.borrow().access_requests
    }

    pub fn opened(&self) -> usize {
        self.0.borrow().opened
    }

    pub fn stopped(&self) -> usize {
        self.0.borrow().stopped
    }

    /// Handles opened and not yet stopped.
    pub fn live(&self) -> usize {
        let record = self.0.borrow();
        record.opened - record.stopped
    }

    /// Post a signal as the device would. False when nothing is listening.
    pub fn emit(&self, signal: CaptureSignal) -> bool {
        match self.0.borrow().sender.as_ref() {
            Some(sender) => sender.send(signal),
            None => false,
        }
    }
}

/// Capture device that answers permission requests synchronously and
/// produces transcripts only when told to.
pub struct FakeCapture {
    available: bool,
    grant: bool,
    log: FakeCaptureLog,
}

impl FakeCapture {
    pub fn new(available: bool, grant: bool) -> (Self, FakeCaptureLog) {
        let log = FakeCaptureLog::default();
        (
            Self {
                available,
                grant,
                log: log.clone(),
            },
            log,
        )
    }
}

impl CaptureDevice for FakeCapture {
    fn is_available(&self) -> bool {
        self.available
    }

    fn request_access(&mut self, signals: CaptureSender) {
        let mut record = self.log.0.borrow_mut();
        record.access_requests += 1;
        signals.send(if self.grant {
            CaptureSignal::PermissionGranted
        } else {
            CaptureSignal::PermissionDenied("denied by test".to_string())
        });
        record.sender = Some(signals);
    }

    fn open(&mut self, signals: CaptureSender) -> Result<Box<dyn CaptureHandle>, SpeechError> {
        let mut record = self.log.0.borrow_mut();
        record.opened += 1;
        record.sender = Some(signals);
        Ok(Box::new(FakeHandle {
            log: self.log.clone(),
            stopped: false,
        }))
    }
}

struct FakeHandle {
    log: FakeCaptureLog,
    stopped: bool,
}

impl CaptureHandle for FakeHandle {
    fn stop(&mut self) {
        if !self.stopped {
            self.stopped = true;
            self.log.0.borrow_mut().stopped += 1;
        }
    }
}

/// A capture device with dictation disabled.
pub fn no_capture() -> Box<dyn CaptureDevice> {
    Box::new(FakeCapture::new(false, false).0)
}

/// Two conversation folders, one prompt folder, three conversations and
/// two prompts.
///
/// | id | name            | folder |
/// |----|-----------------|--------|
/// | c1 | Groceries       | -      |
/// | c2 | Budget review   | f1     |
/// | c3 | Trip planning   | -      |
/// | p1 | Translate       | p-f    |
/// | p2 | Summarize       | -      |
pub fn sample_workspace() -> Workspace {
    Workspace {
        folders: vec![
            Folder {
                id: "f1".to_string(),
                name: "Work".to_string(),
                kind: ItemKind::Conversation,
            },
            Folder {
                id: "f2".to_string(),
                name: "Personal".to_string(),
                kind: ItemKind::Conversation,
            },
            Folder {
                id: "p-f".to_string(),
                name: "Writing".to_string(),
                kind: ItemKind::Prompt,
            },
        ],
        conversations: vec![
            Conversation::with_id("c1", "Groceries", None),
            Conversation::with_id("c2", "Budget review", Some("f1")),
            Conversation::with_id("c3", "Trip planning", None),
        ],
        prompts: vec![
            Prompt::with_id("p1", "Translate", "Translate {{text}} into {{language}}", Some("p-f")),
            Prompt::with_id("p2", "Summarize", "Summarize this", None),
        ],
        ..Default::default()
    }
}
