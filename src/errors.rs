use serde::Serialize;
use std::fmt;
use std::io::ErrorKind;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum PathClipError {
    #[error("Invalid path: {0}")]
    InvalidPath(String),

    #[error("Invalid pattern: {0}")]
    InvalidPattern(String),

    #[error("File not found: {0}")]
    NotFound(String),

    #[error("Not a regular file: {0}")]
    NotAFile(String),

    #[error("Permission denied: {0}")]
    PermissionError(String),

    #[error("File too large: {path} is {size} bytes (limit {max} bytes)")]
    SizeExceeded { path: String, size: u64, max: u64 },

    #[error("Cannot decode {0} as UTF-8 text")]
    DecodeError(String),

    #[error("IO Error: {0}")]
    IoError(String),

    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("Clipboard initialization failed: {0}")]
    ClipboardInitError(String),

    #[error("Clipboard write failed: {0}")]
    ClipboardWriteError(String),

    #[error("Tokenizer Error: {0}")]
    TokenizerError(String),

    #[error("Nothing to copy: {0}")]
    NoContent(String),
}

impl PathClipError {
    /// Maps an OS error raised while touching `path` onto the matching kind.
    pub fn from_io(path: &str, err: std::io::Error) -> Self {
        match err.kind() {
            ErrorKind::NotFound => PathClipError::NotFound(path.to_owned()),
            ErrorKind::PermissionDenied => PathClipError::PermissionError(path.to_owned()),
            _ => PathClipError::IoError(format!("{}: {}", path, err)),
        }
    }

    pub fn code(&self) -> ErrorCode {
        match self {
            PathClipError::InvalidPath(_) => ErrorCode::InvalidPath,
            PathClipError::InvalidPattern(_) => ErrorCode::InvalidPattern,
            PathClipError::NotFound(_) => ErrorCode::NotFound,
            PathClipError::NotAFile(_) => ErrorCode::NotAFile,
            PathClipError::PermissionError(_) => ErrorCode::PermissionDenied,
            PathClipError::SizeExceeded { .. } => ErrorCode::SizeExceeded,
            PathClipError::DecodeError(_) => ErrorCode::DecodeError,
            PathClipError::ConfigError(_) => ErrorCode::ConfigError,
            PathClipError::IoError(_)
            | PathClipError::ClipboardInitError(_)
            | PathClipError::ClipboardWriteError(_)
            | PathClipError::TokenizerError(_)
            | PathClipError::NoContent(_) => ErrorCode::IoError,
        }
    }
}

impl From<std::io::Error> for PathClipError {
    fn from(err: std::io::Error) -> Self {
        match err.kind() {
            ErrorKind::NotFound => PathClipError::NotFound(err.to_string()),
            ErrorKind::PermissionDenied => PathClipError::PermissionError(err.to_string()),
            _ => PathClipError::IoError(err.to_string()),
        }
    }
}

impl From<serde_json::Error> for PathClipError {
    fn from(err: serde_json::Error) -> Self {
        PathClipError::ConfigError(err.to_string())
    }
}

/// Stable identifiers attached to per-file failures.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorCode {
    InvalidPath,
    InvalidPattern,
    NotFound,
    NotAFile,
    PermissionDenied,
    SizeExceeded,
    DecodeError,
    IoError,
    ConfigError,
}

impl ErrorCode {
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorCode::InvalidPath => "INVALID_PATH",
            ErrorCode::InvalidPattern => "INVALID_PATTERN",
            ErrorCode::NotFound => "NOT_FOUND",
            ErrorCode::NotAFile => "NOT_A_FILE",
            ErrorCode::PermissionDenied => "PERMISSION_DENIED",
            ErrorCode::SizeExceeded => "SIZE_EXCEEDED",
            ErrorCode::DecodeError => "DECODE_ERROR",
            ErrorCode::IoError => "IO_ERROR",
            ErrorCode::ConfigError => "CONFIG_ERROR",
        }
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
