use crate::errors::PathClipError;
use arboard::Clipboard;
use std::io::{self, Write};
use tracing::debug;

/// Where the formatted output is delivered.
pub trait ClipboardSink: Send {
    fn write(&mut self, text: &str) -> Result<(), PathClipError>;
}

/// The system clipboard through `arboard`. The handle is opened per write;
/// nothing is held between calls.
#[derive(Debug, Default)]
pub struct SystemClipboard;

impl ClipboardSink for SystemClipboard {
    fn write(&mut self, text: &str) -> Result<(), PathClipError> {
        debug!("Initializing clipboard");
        let mut clipboard =
            Clipboard::new().map_err(|e| PathClipError::ClipboardInitError(e.to_string()))?;
        clipboard
            .set_text(text.to_owned())
            .map_err(|e| PathClipError::ClipboardWriteError(e.to_string()))
    }
}

/// Prints instead of copying, for pipes and headless sessions.
#[derive(Debug, Default)]
pub struct StdoutSink;

impl ClipboardSink for StdoutSink {
    fn write(&mut self, text: &str) -> Result<(), PathClipError> {
        let stdout = io::stdout();
        let mut handle = stdout.lock();
        handle.write_all(text.as_bytes())?;
        if !text.ends_with('\n') {
            handle.write_all(b"\n")?;
        }
        handle.flush()?;
        Ok(())
    }
}
