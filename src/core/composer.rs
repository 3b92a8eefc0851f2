//! # Message Composer
//!
//! The text buffer the user writes into, the send guard, and dictation.
//!
//! ## Send guard
//!
//! `send()` refuses when the trimmed text is empty (the user gets a notice)
//! or while a response is streaming (silently). A successful send emits the
//! raw text as a user message and clears the buffer.
//!
//! ## Dictation
//!
//! The composer owns one [`SpeechInputSession`]. A finalized transcript is
//! appended to the buffer as `" " + transcript`, never replacing it.

use std::fmt;

use log::{debug, info};

use crate::core::intent::Intent;
use crate::core::speech::{CaptureDevice, SpeechInputSession, SpeechState, SpeechUpdate};
use crate::core::workspace::ChatMessage;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SendError {
    EmptyInput,
    StreamingInProgress,
}

impl fmt::Display for SendError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SendError::EmptyInput => write!(f, "Please enter a message"),
            SendError::StreamingInProgress => {
                write!(f, "Please wait for the current response to finish")
            }
        }
    }
}

impl std::error::Error for SendError {}

impl SendError {
    /// Whether the user should be told about this refusal.
    pub fn is_user_visible(&self) -> bool {
        matches!(self, SendError::EmptyInput)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct SendOutcome {
    pub message: ChatMessage,
    /// Narrow viewports give focus back after sending.
    pub release_focus: bool,
}

/// What the submit key resolved to.
#[derive(Debug, Clone, PartialEq)]
pub enum SubmitAction {
    /// The line-break modifier was held; the caller inserts a newline.
    InsertLineBreak,
    Sent(SendOutcome),
    Refused(SendError),
}

/// Visible composer height in text lines.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Autosize {
    pub lines: u16,
    /// Content is taller than `lines` and scrolls.
    pub overflow: bool,
}

pub struct MessageComposer {
    text: String,
    speech: SpeechInputSession,
    narrow_width: u16,
    max_lines: u16,
}

impl MessageComposer {
    pub fn new(device: Box<dyn CaptureDevice>, narrow_width: u16, max_lines: u16) -> Self {
        Self {
            text: String::new(),
            speech: SpeechInputSession::new(device),
            narrow_width,
            max_lines: max_lines.max(1),
        }
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn text_mut(&mut self) -> &mut String {
        &mut self.text
    }

    pub fn set_text(&mut self, text: String) {
        self.text = text;
    }

    pub fn is_dictating(&self) -> bool {
        self.speech.is_listening()
    }

    pub fn speech_state(&self) -> SpeechState {
        self.speech.state()
    }

    pub fn is_narrow(&self, viewport_width: u16) -> bool {
        viewport_width < self.narrow_width
    }

    pub fn send(&mut self, streaming: bool, viewport_width: u16) -> Result<SendOutcome, SendError> {
        if streaming {
            debug!("Send refused: response still streaming");
            return Err(SendError::StreamingInProgress);
        }
        if self.text.trim().is_empty() {
            debug!("Send refused: empty input");
            return Err(SendError::EmptyInput);
        }
        let content = std::mem::take(&mut self.text);
        info!("Sending message ({} chars)", content.len());
        Ok(SendOutcome {
            message: ChatMessage::user(content),
            release_focus: self.is_narrow(viewport_width),
        })
    }

    pub fn submit_key(
        &mut self,
        line_break_modifier: bool,
        streaming: bool,
        viewport_width: u16,
    ) -> SubmitAction {
        if line_break_modifier {
            return SubmitAction::InsertLineBreak;
        }
        match self.send(streaming, viewport_width) {
            Ok(outcome) => SubmitAction::Sent(outcome),
            Err(e) => SubmitAction::Refused(e),
        }
    }

    /// The microphone control.
    pub fn toggle_dictation(&mut self) -> Option<SpeechUpdate> {
        self.speech.toggle()
    }

    fn merge_transcript(&mut self, transcript: &str) {
        self.text.push(' ');
        self.text.push_str(transcript);
    }

    /// Drain dictation results, merging transcripts into the buffer.
    pub fn pump_speech(&mut self) -> Vec<SpeechUpdate> {
        let updates = self.speech.pump();
        for update in &updates {
            if let SpeechUpdate::Transcript(transcript) = update {
                self.merge_transcript(transcript);
            }
        }
        updates
    }

    /// The stop affordance exists only while a response streams.
    pub fn show_stop_button(&self, streaming: bool) -> bool {
        streaming
    }

    /// Stop the streaming response. Also ends dictation if it is running.
    pub fn stop_streaming(&mut self, streaming: bool) -> Option<Intent> {
        if !streaming {
            return None;
        }
        self.speech.stop();
        Some(Intent::StopStreaming)
    }

    /// Height for `content_lines` wrapped lines, capped at the configured max.
    pub fn autosize(&self, content_lines: u16) -> Autosize {
        Autosize {
            lines: content_lines.clamp(1, self.max_lines),
            overflow: content_lines > self.max_lines,
        }
    }

    pub fn max_lines(&self) -> u16 {
        self.max_lines
    }

    pub fn teardown(&mut self) {
        self.speech.teardown();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::speech::{CaptureSignal, SpeechError};
    use crate::core::workspace::Role;
    use crate::test_support::{FakeCapture, FakeCaptureLog};

    fn composer() -> (MessageComposer, FakeCaptureLog) {
        let (device, log) = FakeCapture::new(true, true);
        (MessageComposer::new(Box::new(device), 80, 4), log)
    }

    #[test]
    fn test_send_emits_raw_text_and_clears() {
        let (mut c, _) = composer();
        c.set_text("  hello  ".to_string());
        let outcome = c.send(false, 120).unwrap();
        assert_eq!(outcome.message.role, Role::User);
        assert_eq!(outcome.message.content, "  hello  ");
        assert!(!outcome.release_focus);
        assert!(c.text().is_empty());
    }

    #[test]
    fn test_send_empty_is_refused_with_notice() {
        let (mut c, _) = composer();
        c.set_text(" \n\t".to_string());
        let err = c.send(false, 120).unwrap_err();
        assert_eq!(err, SendError::EmptyInput);
        assert!(err.is_user_visible());
        assert_eq!(c.text(), " \n\t");
    }

    #[test]
    fn test_send_while_streaming_is_refused_silently() {
        let (mut c, _) = composer();
        c.set_text("hi".to_string());
        let err = c.send(true, 120).unwrap_err();
        assert_eq!(err, SendError::StreamingInProgress);
        assert!(!err.is_user_visible());
        assert_eq!(c.text(), "hi", "buffer kept for later");
    }

    #[test]
    fn test_empty_send_while_streaming_stays_silent() {
        let (mut c, _) = composer();
        let err = c.send(true, 120).unwrap_err();
        assert_eq!(err, SendError::StreamingInProgress);
        assert!(!err.is_user_visible());
    }

    #[test]
    fn test_narrow_viewport_releases_focus() {
        let (mut c, _) = composer();
        c.set_text("hi".to_string());
        assert!(c.send(false, 40).unwrap().release_focus);
    }

    #[test]
    fn test_submit_key_with_modifier_inserts_line_break() {
        let (mut c, _) = composer();
        c.set_text("hi".to_string());
        assert_eq!(c.submit_key(true, false, 120), SubmitAction::InsertLineBreak);
        assert_eq!(c.text(), "hi");
        assert!(matches!(c.submit_key(false, false, 120), SubmitAction::Sent(_)));
    }

    #[test]
    fn test_transcript_appends_with_space() {
        let (mut c, log) = composer();
        c.set_text("Hello".to_string());
        c.toggle_dictation();
        c.pump_speech();
        assert!(c.is_dictating());

        log.emit(CaptureSignal::Transcript("world".to_string()));
        c.pump_speech();
        assert_eq!(c.text(), "Hello world");
        assert!(!c.is_dictating());
    }

    #[test]
    fn test_dictation_failure_leaves_text() {
        let (device, _log) = FakeCapture::new(false, true);
        let mut c = MessageComposer::new(Box::new(device), 80, 4);
        c.set_text("keep".to_string());
        assert_eq!(
            c.toggle_dictation(),
            Some(SpeechUpdate::Failed(SpeechError::CapabilityUnavailable))
        );
        assert_eq!(c.text(), "keep");
    }

    #[test]
    fn test_stop_streaming_also_stops_dictation() {
        let (mut c, log) = composer();
        c.toggle_dictation();
        c.pump_speech();
        assert!(c.is_dictating());

        assert!(!c.show_stop_button(false));
        assert_eq!(c.stop_streaming(false), None);
        assert!(c.is_dictating());

        assert!(c.show_stop_button(true));
        assert_eq!(c.stop_streaming(true), Some(Intent::StopStreaming));
        assert!(!c.is_dictating());
        assert_eq!(log.live(), 0);
    }

    #[test]
    fn test_autosize_caps_at_max_lines() {
        let (c, _) = composer();
        assert_eq!(c.autosize(0), Autosize { lines: 1, overflow: false });
        assert_eq!(c.autosize(3), Autosize { lines: 3, overflow: false });
        assert_eq!(c.autosize(9), Autosize { lines: 4, overflow: true });
    }

    #[test]
    fn test_teardown_stops_capture() {
        let (mut c, log) = composer();
        c.toggle_dictation();
        c.pump_speech();
        c.teardown();
        assert_eq!(log.live(), 0);
        log.emit(CaptureSignal::Transcript("late".to_string()));
        c.pump_speech();
        assert!(c.text().is_empty());
    }
}
