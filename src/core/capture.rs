//! Concrete capture devices for dictation.
//!
//! - [`UnavailableCapture`]: no speech backend configured.
//! - [`CommandCapture`]: runs an external speech-to-text command and treats
//!   the first non-empty line it prints as the transcript.

use std::env;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::process::Stdio;

use log::{debug, info, warn};
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::process::Command;

use crate::core::speech::{CaptureDevice, CaptureHandle, CaptureSender, CaptureSignal, SpeechError};

/// Placeholder in configured args replaced by the recognition language.
const LANG_PLACEHOLDER: &str = "{lang}";

pub struct UnavailableCapture;

impl CaptureDevice for UnavailableCapture {
    fn is_available(&self) -> bool {
        false
    }

    fn request_access(&mut self, signals: CaptureSender) {
        signals.send(CaptureSignal::PermissionDenied(
            "no speech command configured".to_string(),
        ));
    }

    fn open(&mut self, _signals: CaptureSender) -> Result<Box<dyn CaptureHandle>, SpeechError> {
        Err(SpeechError::CapabilityUnavailable)
    }
}

/// Pick the capture device for the resolved `[speech]` settings.
pub fn device_for(command: Option<&str>, args: &[String], lang: &str) -> Box<dyn CaptureDevice> {
    match command.map(str::trim) {
        Some(command) if !command.is_empty() => {
            let args = args
                .iter()
                .map(|arg| arg.replace(LANG_PLACEHOLDER, lang))
                .collect();
            info!("Dictation via external command: {}", command);
            Box::new(CommandCapture::new(command, args))
        }
        _ => Box::new(UnavailableCapture),
    }
}

/// Dictation through an external process.
///
/// Access is granted when the program can be found and then spawned; a
/// program that cannot be run is reported as `PermissionDenied`. Opening
/// spawns the process on the tokio runtime; stopping aborts the reader task,
/// which drops the child and kills it.
pub struct CommandCapture {
    program: String,
    args: Vec<String>,
}

impl CommandCapture {
    pub fn new(program: &str, args: Vec<String>) -> Self {
        Self {
            program: program.to_string(),
            args,
        }
    }

    fn resolve(&self) -> Option<PathBuf> {
        let program = Path::new(&self.program);
        if program.components().count() > 1 {
            return program.is_file().then(|| program.to_path_buf());
        }
        let path = env::var_os("PATH")?;
        env::split_paths(&path)
            .map(|dir| dir.join(program))
            .find(|candidate| candidate.is_file())
    }
}

impl CaptureDevice for CommandCapture {
    fn is_available(&self) -> bool {
        true
    }

    fn request_access(&mut self, signals: CaptureSender) {
        match self.resolve() {
            Some(path) => {
                debug!("Resolved speech command to {}", path.display());
                signals.send(CaptureSignal::PermissionGranted);
            }
            None => {
                signals.send(CaptureSignal::PermissionDenied(format!(
                    "command not found: {}",
                    self.program
                )));
            }
        }
    }

    fn open(&mut self, signals: CaptureSender) -> Result<Box<dyn CaptureHandle>, SpeechError> {
        let runtime = tokio::runtime::Handle::try_current()
            .map_err(|_| SpeechError::Capture("no async runtime".to_string()))?;
        let _guard = runtime.enter();

        let mut child = Command::new(&self.program)
            .args(&self.args)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::null())
            .kill_on_drop(true)
            .spawn()
            .map_err(|e| match e.kind() {
                ErrorKind::NotFound | ErrorKind::PermissionDenied => {
                    SpeechError::PermissionDenied(format!("cannot run {}: {e}", self.program))
                }
                _ => SpeechError::Capture(e.to_string()),
            })?;

        let stdout = child
            .stdout
            .take()
            .ok_or_else(|| SpeechError::Capture("speech command has no stdout".to_string()))?;

        let task = runtime.spawn(async move {
            let mut lines = BufReader::new(stdout).lines();
            loop {
                match lines.next_line().await {
                    Ok(Some(line)) => {
                        let line = line.trim();
                        if !line.is_empty() {
                            signals.send(CaptureSignal::Transcript(line.to_string()));
                            return;
                        }
                    }
                    Ok(None) => break,
                    Err(e) => {
                        signals.send(CaptureSignal::Error(e.to_string()));
                        return;
                    }
                }
            }
            match child.wait().await {
                Ok(status) if status.success() => {
                    signals.send(CaptureSignal::Ended);
                }
                Ok(status) => {
                    signals.send(CaptureSignal::Error(format!("speech command exited with {status}")));
                }
                Err(e) => {
                    signals.send(CaptureSignal::Error(e.to_string()));
                }
            }
        });

        Ok(Box::new(CommandCaptureHandle {
            task: Some(task.abort_handle()),
        }))
    }
}

struct CommandCaptureHandle {
    task: Option<tokio::task::AbortHandle>,
}

impl CaptureHandle for CommandCaptureHandle {
    fn stop(&mut self) {
        if let Some(task) = self.task.take() {
            task.abort();
            debug!("Speech command stopped");
        }
    }
}

impl Drop for CommandCaptureHandle {
    fn drop(&mut self) {
        if self.task.is_some() {
            warn!("Speech command handle dropped without stop");
            self.stop();
        }
    }
}
