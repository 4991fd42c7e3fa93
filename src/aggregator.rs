use crate::errors::{ErrorCode, PathClipError};
use crate::validator::{modified_time, DEFAULT_MAX_FILE_SIZE};
use chrono::{DateTime, Utc};
use futures::stream::{self, StreamExt};
use serde::Serialize;
use std::path::{Path, PathBuf};
use tokio::fs as async_fs;
use tokio::io::AsyncReadExt;
use tracing::{debug, trace, warn};

pub const DEFAULT_CONCURRENCY: usize = 8;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContentRecord {
    pub path: PathBuf,
    pub content: String,
    pub size: u64,
    pub last_modified: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AggregationError {
    pub path: String,
    pub message: String,
    pub code: ErrorCode,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AggregationResult {
    pub success: bool,
    pub records_processed: usize,
    pub total_size: u64,
    pub errors: Vec<AggregationError>,
}

/// Records that were read, plus the batch summary. Both are always returned;
/// the caller decides whether partial content is good enough.
#[derive(Debug, Clone, Default)]
pub struct Aggregation {
    pub records: Vec<ContentRecord>,
    pub result: AggregationResult,
}

#[derive(Debug, Clone)]
pub struct AggregatorConfig {
    pub max_file_size: u64,
    pub concurrency: usize,
}

impl Default for AggregatorConfig {
    fn default() -> Self {
        AggregatorConfig {
            max_file_size: DEFAULT_MAX_FILE_SIZE,
            concurrency: DEFAULT_CONCURRENCY,
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct FileAggregator {
    config: AggregatorConfig,
}

impl FileAggregator {
    pub fn new(config: AggregatorConfig) -> Self {
        FileAggregator { config }
    }

    /// Reads one file. The size and timestamp come from the same open
    /// handle the bytes are read from.
    pub async fn read_one(&self, path: &Path) -> Result<ContentRecord, PathClipError> {
        let display = path.display().to_string();
        trace!("Reading file: {}", path.display());

        // Stat first so FIFOs and sockets are rejected before open() can block.
        let metadata = async_fs::metadata(path)
            .await
            .map_err(|e| PathClipError::from_io(&display, e))?;
        if !metadata.is_file() {
            return Err(PathClipError::NotAFile(display));
        }

        let mut file = async_fs::File::open(path)
            .await
            .map_err(|e| PathClipError::from_io(&display, e))?;
        let metadata = file
            .metadata()
            .await
            .map_err(|e| PathClipError::from_io(&display, e))?;
        if !metadata.is_file() {
            return Err(PathClipError::NotAFile(display));
        }

        let size = metadata.len();
        if size > self.config.max_file_size {
            return Err(PathClipError::SizeExceeded {
                path: display,
                size,
                max: self.config.max_file_size,
            });
        }

        let mut bytes = Vec::with_capacity(size as usize);
        file.read_to_end(&mut bytes)
            .await
            .map_err(|e| PathClipError::from_io(&display, e))?;

        // The file may have grown between stat and read.
        if bytes.len() as u64 > self.config.max_file_size {
            return Err(PathClipError::SizeExceeded {
                path: display,
                size: bytes.len() as u64,
                max: self.config.max_file_size,
            });
        }

        let content = String::from_utf8(bytes).map_err(|_| PathClipError::DecodeError(display))?;

        Ok(ContentRecord {
            path: path.to_path_buf(),
            size: content.len() as u64,
            content,
            last_modified: modified_time(&metadata),
        })
    }

    /// Reads every path with bounded parallelism. Failures are collected per
    /// file and never stop the batch; records keep the input order.
    pub async fn read_many(&self, paths: &[PathBuf]) -> Aggregation {
        debug!(
            "Reading {} files (concurrency {})",
            paths.len(),
            self.config.concurrency
        );

        let outcomes: Vec<(&PathBuf, Result<ContentRecord, PathClipError>)> = stream::iter(
            paths
                .iter()
                .map(|path| async move { (path, self.read_one(path).await) })
                .collect::<Vec<_>>(),
        )
        .buffered(self.config.concurrency.max(1))
        .collect()
        .await;

        let mut aggregation = Aggregation::default();
        for (path, outcome) in outcomes {
            match outcome {
                Ok(record) => {
                    aggregation.result.total_size += record.size;
                    aggregation.records.push(record);
                }
                Err(e) => {
                    warn!("Failed to read file {}: {}", path.display(), e);
                    aggregation.result.errors.push(AggregationError {
                        path: path.display().to_string(),
                        message: e.to_string(),
                        code: e.code(),
                    });
                }
            }
        }

        aggregation.result.records_processed = aggregation.records.len();
        aggregation.result.success = aggregation.result.errors.is_empty();
        aggregation
    }
}

pub async fn aggregate(paths: &[PathBuf], config: AggregatorConfig) -> Aggregation {
    FileAggregator::new(config).read_many(paths).await
}
