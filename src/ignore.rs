use glob::Pattern;
use std::path::Path;
use tracing::{debug, warn};

/// User-configured exclusions, applied to directory and glob expansion.
/// Literal file inputs are never filtered.
#[derive(Debug, Clone, Default)]
pub struct ExcludePatterns {
    patterns: Vec<Pattern>,
}

impl ExcludePatterns {
    pub fn new(patterns: &[String]) -> Self {
        let compiled_patterns = patterns
            .iter()
            .filter_map(|p| match Pattern::new(p) {
                Ok(pattern) => Some(pattern),
                Err(e) => {
                    warn!("Invalid exclude pattern '{}': {}", p, e);
                    None
                }
            })
            .collect();

        debug!("Using exclude patterns: {:?}", patterns);

        ExcludePatterns {
            patterns: compiled_patterns,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.patterns.is_empty()
    }

    /// Tests the absolute path and, when `root` is an ancestor, the path
    /// relative to it, so both `/abs/**/*.log` and `target/**` work.
    pub fn should_exclude(&self, path: &Path, root: Option<&Path>) -> bool {
        if self.patterns.is_empty() {
            return false;
        }
        let full = path.to_string_lossy().replace('\\', "/");
        let relative = root
            .and_then(|r| path.strip_prefix(r).ok())
            .map(|rel| rel.to_string_lossy().replace('\\', "/"));

        self.patterns.iter().any(|pattern| {
            pattern.matches(&full)
                || relative
                    .as_deref()
                    .is_some_and(|rel| pattern.matches(rel))
        })
    }
}
