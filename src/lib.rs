pub mod aggregator;
pub mod clipboard;
pub mod config;
pub mod copy;
pub mod errors;
pub mod formatter;
pub mod ignore;
pub mod logger;
pub mod range;
pub mod reporting;
pub mod resolver;
pub mod trie;
pub mod validator;

pub use aggregator::{aggregate, AggregationError, AggregationResult, ContentRecord, FileAggregator};
pub use config::{Config, ConfigStore};
pub use copy::copy_files_to_clipboard;
pub use errors::{ErrorCode, PathClipError};
pub use formatter::{format_records, OutputFormat};
pub use range::{parse_ranges, parse_removal, RemovalSpec};
pub use resolver::{resolve_inputs, PathResolver};
