use std::io::Write;
use std::process::{Command, Stdio};
use std::sync::Mutex;

use crate::error::ClipboardError;

/// Destination for the one-line consumption summary.
pub trait ClipboardSink {
    fn copy(&self, text: &str) -> Result<(), ClipboardError>;
}

#[cfg(target_os = "macos")]
const CLIPBOARD_COMMANDS: &[(&str, &[&str])] = &[("pbcopy", &[])];

#[cfg(windows)]
const CLIPBOARD_COMMANDS: &[(&str, &[&str])] = &[("clip", &[])];

#[cfg(not(any(target_os = "macos", windows)))]
const CLIPBOARD_COMMANDS: &[(&str, &[&str])] = &[
    ("wl-copy", &[]),
    ("xclip", &["-selection", "clipboard"]),
    ("xsel", &["--clipboard", "--input"]),
];

/// Pipes text into the first platform clipboard command that runs.
#[derive(Debug, Clone, Default)]
pub struct SystemClipboard;

impl SystemClipboard {
    fn run(program: &str, args: &[&str], text: &str) -> Result<(), ClipboardError> {
        let failed = |reason: String| ClipboardError::CommandFailed {
            command: program.to_string(),
            reason,
        };

        let mut child = Command::new(program)
            .args(args)
            .stdin(Stdio::piped())
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .spawn()
            .map_err(|error| failed(error.to_string()))?;

        if let Some(mut stdin) = child.stdin.take()
            && let Err(error) = stdin.write_all(text.as_bytes())
        {
            // Reap the child before reporting.
            drop(stdin);
            let _ = child.kill();
            let _ = child.wait();
            return Err(failed(error.to_string()));
        }

        let status = child.wait().map_err(|error| failed(error.to_string()))?;
        if status.success() {
            Ok(())
        } else {
            Err(failed(format!("exited with {status}")))
        }
    }
}

impl ClipboardSink for SystemClipboard {
    fn copy(&self, text: &str) -> Result<(), ClipboardError> {
        let mut last_error = ClipboardError::Unavailable;
        for (program, args) in CLIPBOARD_COMMANDS {
            match Self::run(program, args, text) {
                Ok(()) => {
                    tracing::debug!(program, "summary copied to clipboard");
                    return Ok(());
                }
                Err(error) => last_error = error,
            }
        }
        Err(last_error)
    }
}

/// Discards everything; used when clipboard copying is switched off.
#[derive(Debug, Clone, Default)]
pub struct NoClipboard;

impl ClipboardSink for NoClipboard {
    fn copy(&self, _text: &str) -> Result<(), ClipboardError> {
        Ok(())
    }
}

/// Keeps copied text in memory.
#[derive(Debug, Default)]
pub struct MemoryClipboard {
    copied: Mutex<Vec<String>>,
}

impl MemoryClipboard {
    #[must_use]
    pub fn contents(&self) -> Vec<String> {
        self.copied
            .lock()
            .map(|copied| copied.clone())
            .unwrap_or_default()
    }
}

impl ClipboardSink for MemoryClipboard {
    fn copy(&self, text: &str) -> Result<(), ClipboardError> {
        if let Ok(mut copied) = self.copied.lock() {
            copied.push(text.to_string());
        }
        Ok(())
    }
}
