use crate::aggregator::{Aggregation, AggregatorConfig, FileAggregator, DEFAULT_CONCURRENCY};
use crate::clipboard::ClipboardSink;
use crate::config::Config;
use crate::errors::PathClipError;
use crate::formatter::{ContentFormatter, OutputFormat};
use crate::ignore::ExcludePatterns;
use crate::reporting::{collect_stats, common_ancestor, render_stats};
use crate::resolver::{dedup_preserving_order, PathResolver, Resolution};
use async_trait::async_trait;
use std::path::PathBuf;
use tracing::{debug, info, trace, warn};

#[derive(Debug, Clone)]
pub struct CopyOptions {
    pub format: OutputFormat,
    pub include_headers: bool,
    pub max_file_size: u64,
    pub concurrency: usize,
    pub exclude_patterns: Vec<String>,
    /// `None` skips the per-file stats tree.
    pub tokenizer_model: Option<String>,
}

impl CopyOptions {
    pub fn from_config(config: &Config) -> Self {
        CopyOptions {
            format: config.output_format,
            include_headers: config.include_headers,
            max_file_size: config.max_file_size,
            concurrency: DEFAULT_CONCURRENCY,
            exclude_patterns: config.exclude_patterns.clone(),
            tokenizer_model: Some(config.tokenizer_model.clone()),
        }
    }
}

impl Default for CopyOptions {
    fn default() -> Self {
        CopyOptions::from_config(&Config::default())
    }
}

#[derive(Debug, Clone, Default)]
pub struct CopyOutcome {
    pub resolution: Resolution,
    pub aggregation: Aggregation,
    pub output: String,
    pub stats: Option<String>,
    /// False when no file could be read; the sink is not touched then.
    pub delivered: bool,
}

#[async_trait]
pub trait ClipboardCopier {
    async fn copy_files_to_clipboard(
        &self,
        inputs: Vec<String>,
        sink: &mut dyn ClipboardSink,
    ) -> Result<CopyOutcome, PathClipError>;
}

pub struct BasicClipboardCopier {
    options: CopyOptions,
    resolver: PathResolver,
}

impl BasicClipboardCopier {
    pub fn new(options: CopyOptions) -> Result<Self, PathClipError> {
        Ok(Self::with_resolver(options, PathResolver::new()?))
    }

    pub fn with_resolver(options: CopyOptions, resolver: PathResolver) -> Self {
        let resolver = resolver.exclude(ExcludePatterns::new(&options.exclude_patterns));
        BasicClipboardCopier { options, resolver }
    }

    /// Everything up to, but not including, delivery.
    pub async fn prepare(&self, inputs: &[String]) -> CopyOutcome {
        debug!("Expanding file patterns");
        let resolution = self.resolver.resolve_inputs(inputs);
        self.assemble(resolution).await
    }

    /// Stored entries are concrete files already. They are read as they are,
    /// so a name like `notes[1].txt` is never re-expanded and exclude patterns
    /// do not apply. A vanished entry surfaces as a `NOT_FOUND` read error.
    pub async fn prepare_entries(&self, entries: &[PathBuf]) -> CopyOutcome {
        debug!("Reading {} stored entries", entries.len());
        let resolution = Resolution {
            paths: dedup_preserving_order(entries.to_vec()),
            unresolved: Vec::new(),
        };
        self.assemble(resolution).await
    }

    pub async fn copy_entries(
        &self,
        entries: &[PathBuf],
        sink: &mut dyn ClipboardSink,
    ) -> Result<CopyOutcome, PathClipError> {
        let outcome = self.prepare_entries(entries).await;
        self.deliver(outcome, sink)
    }

    fn deliver(
        &self,
        mut outcome: CopyOutcome,
        sink: &mut dyn ClipboardSink,
    ) -> Result<CopyOutcome, PathClipError> {
        if outcome.aggregation.records.is_empty() {
            warn!("No readable files; clipboard left unchanged");
            return Ok(outcome);
        }

        sink.write(&outcome.output)?;
        outcome.delivered = true;
        info!(
            "Copied {} files ({} bytes) as {}",
            outcome.aggregation.result.records_processed,
            outcome.aggregation.result.total_size,
            self.options.format
        );
        Ok(outcome)
    }

    async fn assemble(&self, resolution: Resolution) -> CopyOutcome {
        let aggregator = FileAggregator::new(AggregatorConfig {
            max_file_size: self.options.max_file_size,
            concurrency: self.options.concurrency,
        });
        let aggregation = aggregator.read_many(&resolution.paths).await;

        let output = ContentFormatter::new(self.options.format, self.options.include_headers)
            .format(&aggregation.records);
        trace!("Final content length: {}", output.len());

        let stats = self.render_stats(&aggregation);

        CopyOutcome {
            resolution,
            aggregation,
            output,
            stats,
            delivered: false,
        }
    }

    fn render_stats(&self, aggregation: &Aggregation) -> Option<String> {
        let model = self.options.tokenizer_model.as_deref()?;
        if aggregation.records.is_empty() {
            return None;
        }
        match collect_stats(&aggregation.records, Some(model)) {
            Ok(trie) => {
                let label = common_ancestor(aggregation.records.iter().map(|r| r.path.as_path()))
                    .map(|p| p.display().to_string())
                    .unwrap_or_else(|| "Overall".to_owned());
                Some(render_stats(&trie, &label))
            }
            Err(e) => {
                warn!("Skipping stats: {}", e);
                None
            }
        }
    }
}

#[async_trait]
impl ClipboardCopier for BasicClipboardCopier {
    async fn copy_files_to_clipboard(
        &self,
        inputs: Vec<String>,
        sink: &mut dyn ClipboardSink,
    ) -> Result<CopyOutcome, PathClipError> {
        let outcome = self.prepare(&inputs).await;
        self.deliver(outcome, sink)
    }
}

pub async fn copy_files_to_clipboard(
    options: CopyOptions,
    inputs: Vec<String>,
    sink: &mut dyn ClipboardSink,
) -> Result<CopyOutcome, PathClipError> {
    let copier = BasicClipboardCopier::new(options)?;
    copier.copy_files_to_clipboard(inputs, sink).await
}
