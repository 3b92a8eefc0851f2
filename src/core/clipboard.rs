//! # Code Block Copy & Save
//!
//! Fenced code blocks in assistant replies can be copied to the system
//! clipboard or written to a file.
//!
//! Copying flips a "Copied!" indicator that clears itself after
//! [`COPIED_RESET`]. The reset timer is owned by [`CopyFeedback`] and is
//! aborted when the feedback is dropped, so it can never fire into a view
//! that no longer exists.

use std::fmt;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::mpsc;
use std::time::Duration;

use log::{debug, warn};
use pulldown_cmark::{CodeBlockKind, Event, Parser, Tag, TagEnd};

pub const COPIED_RESET: Duration = Duration::from_secs(2);

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ClipboardError {
    /// The platform has no usable clipboard.
    Unavailable,
    Write(String),
}

impl fmt::Display for ClipboardError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ClipboardError::Unavailable => write!(f, "clipboard unavailable"),
            ClipboardError::Write(msg) => write!(f, "clipboard write failed: {msg}"),
        }
    }
}

impl std::error::Error for ClipboardError {}

pub trait Clipboard {
    fn write_text(&mut self, text: &str) -> Result<(), ClipboardError>;
}

/// Desktop clipboard via `arboard`. Opened lazily on each write.
pub struct SystemClipboard;

impl Clipboard for SystemClipboard {
    fn write_text(&mut self, text: &str) -> Result<(), ClipboardError> {
        let mut clipboard = arboard::Clipboard::new().map_err(|e| {
            debug!("No system clipboard: {}", e);
            ClipboardError::Unavailable
        })?;
        clipboard
            .set_text(text.to_string())
            .map_err(|e| ClipboardError::Write(e.to_string()))
    }
}

/// "Copied!" indicator with a self-clearing timer.
pub struct CopyFeedback {
    copied: bool,
    generation: u64,
    reset_after: Duration,
    timer: Option<tokio::task::AbortHandle>,
    tx: mpsc::Sender<u64>,
    rx: mpsc::Receiver<u64>,
}

impl Default for CopyFeedback {
    fn default() -> Self {
        Self::new(COPIED_RESET)
    }
}

impl CopyFeedback {
    pub fn new(reset_after: Duration) -> Self {
        let (tx, rx) = mpsc::channel();
        Self {
            copied: false,
            generation: 0,
            reset_after,
            timer: None,
            tx,
            rx,
        }
    }

    pub fn is_copied(&self) -> bool {
        self.copied
    }

    /// Copy `text`. Missing clipboard support is a silent no-op.
    pub fn copy(&mut self, clipboard: &mut dyn Clipboard, text: &str) -> Result<(), ClipboardError> {
        match clipboard.write_text(text) {
            Ok(()) => {}
            Err(ClipboardError::Unavailable) => return Ok(()),
            Err(e) => return Err(e),
        }
        self.cancel_timer();
        self.generation += 1;
        self.copied = true;

        let Ok(runtime) = tokio::runtime::Handle::try_current() else {
            warn!("No async runtime for copy indicator timer; clearing immediately");
            self.copied = false;
            return Ok(());
        };
        let generation = self.generation;
        let tx = self.tx.clone();
        let reset_after = self.reset_after;
        let task = runtime.spawn(async move {
            tokio::time::sleep(reset_after).await;
            // Receiver gone means the view was torn down
            let _ = tx.send(generation);
        });
        self.timer = Some(task.abort_handle());
        Ok(())
    }

    /// Apply any expired timers. Returns true if the indicator changed.
    pub fn pump(&mut self) -> bool {
        let mut changed = false;
        while let Ok(generation) = self.rx.try_recv() {
            if generation == self.generation && self.copied {
                self.copied = false;
                self.timer = None;
                changed = true;
            }
        }
        changed
    }

    fn cancel_timer(&mut self) {
        if let Some(timer) = self.timer.take() {
            timer.abort();
        }
    }

    /// Stop the pending timer. Called on teardown; also runs on drop.
    pub fn teardown(&mut self) {
        self.cancel_timer();
        self.generation += 1;
    }
}

impl Drop for CopyFeedback {
    fn drop(&mut self) {
        self.teardown();
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CodeBlock {
    pub language: String,
    pub value: String,
}

/// Fenced code blocks in markdown, in document order.
pub fn code_blocks(markdown: &str) -> Vec<CodeBlock> {
    let mut blocks = Vec::new();
    let mut current: Option<CodeBlock> = None;
    for event in Parser::new(markdown) {
        match event {
            Event::Start(Tag::CodeBlock(kind)) => {
                let language = match kind {
                    CodeBlockKind::Fenced(info) => {
                        info.split_whitespace().next().unwrap_or("").to_string()
                    }
                    CodeBlockKind::Indented => String::new(),
                };
                current = Some(CodeBlock {
                    language,
                    value: String::new(),
                });
            }
            Event::Text(text) => {
                if let Some(block) = current.as_mut() {
                    block.value.push_str(&text);
                }
            }
            Event::End(TagEnd::CodeBlock) => {
                if let Some(block) = current.take() {
                    blocks.push(block);
                }
            }
            _ => {}
        }
    }
    blocks
}

/// File extension for a code block language, `.file` when unknown.
pub fn extension_for(language: &str) -> &'static str {
    match language.to_lowercase().as_str() {
        "javascript" | "js" => ".js",
        "python" | "py" => ".py",
        "java" => ".java",
        "c" => ".c",
        "cpp" | "c++" => ".cpp",
        "c#" | "csharp" => ".cs",
        "ruby" => ".rb",
        "php" => ".php",
        "swift" => ".swift",
        "objective-c" => ".m",
        "kotlin" => ".kt",
        "typescript" | "ts" => ".ts",
        "go" => ".go",
        "perl" => ".pl",
        "rust" | "rs" => ".rs",
        "scala" => ".scala",
        "haskell" => ".hs",
        "lua" => ".lua",
        "shell" | "bash" | "sh" => ".sh",
        "sql" => ".sql",
        "html" => ".html",
        "css" => ".css",
        "json" => ".json",
        "yaml" | "yml" => ".yaml",
        "toml" => ".toml",
        "markdown" | "md" => ".md",
        _ => ".file",
    }
}

/// Suggested file name like `file-3fa.py`.
pub fn suggested_file_name(language: &str) -> String {
    let suffix: String = uuid::Uuid::new_v4().simple().to_string().chars().take(3).collect();
    format!("file-{}{}", suffix, extension_for(language))
}

/// Write a code block into `dir`. An empty `name` means the user cancelled.
pub fn save_code_block(dir: &Path, name: &str, block: &CodeBlock) -> io::Result<Option<PathBuf>> {
    let name = name.trim();
    if name.is_empty() {
        return Ok(None);
    }
    let path = dir.join(name);
    fs::write(&path, &block.value)?;
    Ok(Some(path))
}
