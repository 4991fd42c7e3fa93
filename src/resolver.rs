//! Turns raw user inputs (files, directories, glob patterns, `~` paths) into
//! an ordered, de-duplicated list of absolute regular-file paths.

use crate::errors::PathClipError;
use crate::ignore::ExcludePatterns;
use crate::validator::{
    classify_input, stat_path, validate_glob_syntax, validate_path_syntax, FileStats, InputKind,
};
use glob::{MatchOptions, Pattern};
use std::collections::HashSet;
use std::env;
use std::path::{Component, Path, PathBuf};
use tracing::{debug, trace, warn};
use walkdir::{DirEntry, WalkDir};

const GLOB_OPTIONS: MatchOptions = MatchOptions {
    case_sensitive: true,
    require_literal_separator: true,
    require_literal_leading_dot: true,
};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnresolvedInput {
    pub input: String,
    pub reason: String,
}

#[derive(Debug, Clone, Default)]
pub struct Resolution {
    pub paths: Vec<PathBuf>,
    pub unresolved: Vec<UnresolvedInput>,
}

#[derive(Debug, Clone)]
pub struct PathResolver {
    base_dir: PathBuf,
    home_dir: Option<PathBuf>,
    exclude: ExcludePatterns,
}

impl PathResolver {
    /// Resolves relative inputs against the current working directory.
    pub fn new() -> Result<Self, PathClipError> {
        let base_dir = env::current_dir()?;
        Ok(Self::with_base_dir(base_dir))
    }

    pub fn with_base_dir(base_dir: impl Into<PathBuf>) -> Self {
        PathResolver {
            base_dir: base_dir.into(),
            home_dir: dirs::home_dir(),
            exclude: ExcludePatterns::default(),
        }
    }

    pub fn home_dir(mut self, home_dir: Option<PathBuf>) -> Self {
        self.home_dir = home_dir;
        self
    }

    pub fn exclude(mut self, exclude: ExcludePatterns) -> Self {
        self.exclude = exclude;
        self
    }

    pub fn resolve_inputs(&self, inputs: &[String]) -> Resolution {
        debug!("Resolving {} inputs", inputs.len());
        let mut resolution = Resolution::default();

        for input in inputs {
            match self.resolve_one(input) {
                Ok(paths) if !paths.is_empty() => resolution.paths.extend(paths),
                Ok(_) => trace!("Input matched no files: {}", input),
                Err(e) => {
                    warn!("Skipping {}: {}", input, e);
                    resolution.unresolved.push(UnresolvedInput {
                        input: input.clone(),
                        reason: e.to_string(),
                    });
                }
            }
        }

        resolution.paths = dedup_preserving_order(resolution.paths);
        debug!(
            "Resolved {} files ({} inputs unresolved)",
            resolution.paths.len(),
            resolution.unresolved.len()
        );
        resolution
    }

    fn resolve_one(&self, input: &str) -> Result<Vec<PathBuf>, PathClipError> {
        let kind = classify_input(input);
        match kind {
            InputKind::Literal => validate_path_syntax(input)?,
            InputKind::GlobPattern => validate_glob_syntax(input)?,
        }

        let absolute = self.to_absolute(input);
        let stats = match stat_path(&absolute) {
            Ok(stats) => stats,
            // `file.txt/*.rs` fails with ENOTDIR; a pattern just matches nothing.
            Err(e) if kind == InputKind::GlobPattern => {
                trace!("stat failed for pattern {}: {}", input, e);
                FileStats::missing()
            }
            Err(e) => return Err(e),
        };

        if stats.is_directory {
            trace!("Walking directory: {}", absolute.display());
            return Ok(self.walk_directory(&absolute));
        }

        if kind == InputKind::GlobPattern {
            let matches = self.expand_glob(&self.absolute_pattern(input));
            // A file literally named `notes[1].txt` still resolves.
            if matches.is_empty() && stats.is_file {
                return Ok(vec![absolute]);
            }
            return Ok(matches);
        }

        if stats.is_file {
            return Ok(vec![absolute]);
        }

        if stats.exists {
            Err(PathClipError::NotAFile(absolute.display().to_string()))
        } else {
            Err(PathClipError::NotFound(absolute.display().to_string()))
        }
    }

    /// Expands `~`, anchors relative paths at the base directory and folds
    /// `.` and `..` components.
    pub fn to_absolute(&self, input: &str) -> PathBuf {
        let expanded = self.expand_home(input);
        let path = Path::new(&expanded);
        if path.is_absolute() {
            normalize(path)
        } else {
            normalize(&self.base_dir.join(path))
        }
    }

    fn expand_home(&self, input: &str) -> String {
        let Some(home) = &self.home_dir else {
            return input.to_owned();
        };
        if input == "~" {
            return home.to_string_lossy().into_owned();
        }
        match input
            .strip_prefix("~/")
            .or_else(|| input.strip_prefix("~\\"))
        {
            Some(rest) => home.join(rest).to_string_lossy().into_owned(),
            None => input.to_owned(),
        }
    }

    // The literal prefix (home or base dir) is escaped so its own brackets
    // are not read as wildcards.
    fn absolute_pattern(&self, input: &str) -> String {
        if let Some(home) = &self.home_dir {
            if let Some(rest) = input
                .strip_prefix("~/")
                .or_else(|| input.strip_prefix("~\\"))
            {
                return join_pattern(&Pattern::escape(&home.to_string_lossy()), rest);
            }
        }
        if Path::new(input).is_absolute() {
            input.to_owned()
        } else {
            join_pattern(&Pattern::escape(&self.base_dir.to_string_lossy()), input)
        }
    }

    fn walk_directory(&self, dir: &Path) -> Vec<PathBuf> {
        WalkDir::new(dir)
            .follow_links(true)
            .sort_by_file_name()
            .into_iter()
            .filter_entry(|e| e.depth() == 0 || !is_hidden(e))
            .filter_map(|entry| match entry {
                Ok(entry) => Some(entry),
                Err(e) => {
                    trace!("Skipping unreadable entry under {}: {}", dir.display(), e);
                    None
                }
            })
            .filter(|entry| entry.file_type().is_file())
            .map(|entry| normalize(entry.path()))
            .filter(|path| !self.exclude.should_exclude(path, Some(dir)))
            .collect()
    }

    fn expand_glob(&self, pattern: &str) -> Vec<PathBuf> {
        let mut files = Vec::new();
        for alternative in expand_braces(pattern) {
            let entries = match glob::glob_with(&alternative, GLOB_OPTIONS) {
                Ok(entries) => entries,
                Err(e) => {
                    warn!("Error processing pattern {}: {}", alternative, e);
                    continue;
                }
            };
            for entry in entries {
                match entry {
                    Ok(path) if path.is_file() => {
                        let path = normalize(&path);
                        if has_unrequested_hidden_component(&path, &alternative) {
                            trace!("Dropping hidden match: {}", path.display());
                        } else if self.exclude.should_exclude(&path, Some(&self.base_dir)) {
                            trace!("Excluded by pattern: {}", path.display());
                        } else {
                            files.push(path);
                        }
                    }
                    Ok(path) => trace!("Not a regular file: {}", path.display()),
                    Err(e) => trace!("Error reading glob match: {}", e),
                }
            }
        }
        files
    }
}

pub fn resolve_inputs(inputs: &[String]) -> Result<Resolution, PathClipError> {
    Ok(PathResolver::new()?.resolve_inputs(inputs))
}

/// Keeps the first occurrence of every path.
pub fn dedup_preserving_order(paths: Vec<PathBuf>) -> Vec<PathBuf> {
    let mut seen = HashSet::with_capacity(paths.len());
    paths
        .into_iter()
        .filter(|p| seen.insert(p.clone()))
        .collect()
}

/// Lexical normalization; does not touch the filesystem or follow links.
pub fn normalize(path: &Path) -> PathBuf {
    let mut normalized = PathBuf::new();
    for component in path.components() {
        match component {
            Component::Prefix(_) | Component::RootDir => normalized.push(component.as_os_str()),
            Component::CurDir => {}
            Component::ParentDir => {
                if !normalized.pop() {
                    normalized.push("..");
                }
            }
            Component::Normal(part) => normalized.push(part),
        }
    }
    normalized
}

/// Expands `{a,b}` alternations, innermost groups included, left to right.
pub fn expand_braces(pattern: &str) -> Vec<String> {
    let Some(open) = pattern.find('{') else {
        return vec![pattern.to_owned()];
    };

    let mut depth = 0;
    let mut close = None;
    let mut splits = Vec::new();
    for (i, c) in pattern[open..].char_indices() {
        let at = open + i;
        match c {
            '{' => depth += 1,
            '}' => {
                depth -= 1;
                if depth == 0 {
                    close = Some(at);
                    break;
                }
            }
            ',' if depth == 1 => splits.push(at),
            _ => {}
        }
    }

    let Some(close) = close else {
        return vec![pattern.to_owned()];
    };

    let prefix = &pattern[..open];
    let suffix = &pattern[close + 1..];
    let mut bounds = vec![open];
    bounds.extend(splits);
    bounds.push(close);

    bounds
        .windows(2)
        .flat_map(|w| {
            let option = &pattern[w[0] + 1..w[1]];
            expand_braces(&format!("{}{}{}", prefix, option, suffix))
        })
        .collect()
}

fn join_pattern(prefix: &str, rest: &str) -> String {
    let rest = rest.trim_start_matches("./");
    if prefix.ends_with('/') || prefix.ends_with('\\') {
        format!("{}{}", prefix, rest)
    } else {
        format!("{}/{}", prefix, rest)
    }
}

fn is_hidden(entry: &DirEntry) -> bool {
    entry
        .file_name()
        .to_str()
        .map(|name| name.starts_with('.'))
        .unwrap_or(false)
}

// `**` may still descend into dot-directories; only keep them when a
// pattern segment names them explicitly.
fn has_unrequested_hidden_component(path: &Path, pattern: &str) -> bool {
    let segments: Vec<&str> = pattern.split(|c: char| c == '/' || c == '\\').collect();
    path.components().any(|component| match component {
        Component::Normal(part) => {
            let name = part.to_string_lossy();
            name.starts_with('.') && !segments.iter().any(|segment| names_hidden(segment, &name))
        }
        _ => false,
    })
}

fn names_hidden(segment: &str, name: &str) -> bool {
    segment == name
        || (segment.starts_with('.')
            && Pattern::new(segment).is_ok_and(|pattern| pattern.matches(name)))
}
