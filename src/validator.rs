//! Stateless checks over raw inputs and filesystem paths.
//!
//! Every check reports failure through a specific [`PathClipError`] kind so
//! callers can print something actionable instead of a bare `false`.

use crate::errors::PathClipError;
use chrono::{DateTime, Utc};
use glob::Pattern;
use std::fs;
use std::io::ErrorKind;
use std::path::Path;
use std::time::SystemTime;
use tracing::trace;

/// 50 MiB.
pub const DEFAULT_MAX_FILE_SIZE: u64 = 50 * 1024 * 1024;

const GLOB_CHARS: &[char] = &['*', '?', '[', '{'];
const ILLEGAL_PATH_CHARS: &[char] = &['<', '>', ':', '"', '|', '?', '*', '\0'];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputKind {
    Literal,
    GlobPattern,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileStats {
    pub exists: bool,
    pub is_file: bool,
    pub is_directory: bool,
    pub size: u64,
    pub last_modified: DateTime<Utc>,
}

impl FileStats {
    pub fn missing() -> Self {
        FileStats {
            exists: false,
            is_file: false,
            is_directory: false,
            size: 0,
            last_modified: DateTime::<Utc>::from(SystemTime::UNIX_EPOCH),
        }
    }

    pub fn from_metadata(metadata: &fs::Metadata) -> Self {
        FileStats {
            exists: true,
            is_file: metadata.is_file(),
            is_directory: metadata.is_dir(),
            size: metadata.len(),
            last_modified: modified_time(metadata),
        }
    }
}

pub(crate) fn modified_time(metadata: &fs::Metadata) -> DateTime<Utc> {
    metadata
        .modified()
        .map(DateTime::<Utc>::from)
        .unwrap_or_else(|_| DateTime::<Utc>::from(SystemTime::UNIX_EPOCH))
}

/// Must run before [`validate_path_syntax`]: wildcard characters are only
/// legal once an input is known to be a pattern.
pub fn classify_input(input: &str) -> InputKind {
    if input.contains(GLOB_CHARS) {
        InputKind::GlobPattern
    } else {
        InputKind::Literal
    }
}

pub fn validate_path_syntax(path: &str) -> Result<(), PathClipError> {
    if path.trim().is_empty() {
        return Err(PathClipError::InvalidPath(
            "path is empty or whitespace".to_owned(),
        ));
    }

    if let Some(bad) = strip_drive_prefix(path).chars().find(|c| ILLEGAL_PATH_CHARS.contains(c)) {
        return Err(PathClipError::InvalidPath(format!(
            "{} contains illegal character {:?}",
            path, bad
        )));
    }
    Ok(())
}

// `C:\foo` keeps its colon.
fn strip_drive_prefix(path: &str) -> &str {
    let bytes = path.as_bytes();
    if bytes.len() >= 2 && bytes[0].is_ascii_alphabetic() && bytes[1] == b':' {
        &path[2..]
    } else {
        path
    }
}

/// Rejects parent traversal, runs of three or more `*`, unbalanced braces
/// and anything `glob` itself refuses. Never touches the filesystem.
pub fn validate_glob_syntax(pattern: &str) -> Result<(), PathClipError> {
    if pattern.trim().is_empty() {
        return Err(PathClipError::InvalidPattern(
            "pattern is empty or whitespace".to_owned(),
        ));
    }

    for segment in pattern.split(['/', '\\']) {
        if segment == ".." {
            return Err(PathClipError::InvalidPattern(format!(
                "{}: parent directory traversal is not allowed",
                pattern
            )));
        }
        if segment.contains("***") {
            return Err(PathClipError::InvalidPattern(format!(
                "{}: malformed wildcard segment {:?}",
                pattern, segment
            )));
        }
    }

    let mut depth = 0i32;
    for c in pattern.chars() {
        match c {
            '{' => depth += 1,
            '}' => {
                depth -= 1;
                if depth < 0 {
                    break;
                }
            }
            _ => {}
        }
    }
    if depth != 0 {
        return Err(PathClipError::InvalidPattern(format!(
            "{}: unbalanced braces",
            pattern
        )));
    }

    Pattern::new(pattern)
        .map(|_| ())
        .map_err(|e| PathClipError::InvalidPattern(format!("{}: {}", pattern, e)))
}

/// Not-found is a normal outcome here (`exists == false`); only other OS
/// failures are errors.
pub fn stat_path(path: &Path) -> Result<FileStats, PathClipError> {
    match fs::metadata(path) {
        Ok(metadata) => Ok(FileStats::from_metadata(&metadata)),
        Err(e) if e.kind() == ErrorKind::NotFound => {
            trace!("stat: {} does not exist", path.display());
            Ok(FileStats::missing())
        }
        Err(e) => Err(PathClipError::IoError(format!("{}: {}", path.display(), e))),
    }
}

pub fn check_readable(path: &Path) -> Result<(), PathClipError> {
    fs::File::open(path)
        .map(|_| ())
        .map_err(|e| PathClipError::from_io(&path.display().to_string(), e))
}

pub fn check_size(path: &Path, max_bytes: u64) -> Result<(), PathClipError> {
    let stats = stat_path(path)?;
    if !stats.exists {
        return Err(PathClipError::NotFound(path.display().to_string()));
    }
    if stats.size > max_bytes {
        return Err(PathClipError::SizeExceeded {
            path: path.display().to_string(),
            size: stats.size,
            max: max_bytes,
        });
    }
    Ok(())
}
