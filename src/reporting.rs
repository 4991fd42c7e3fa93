use crate::aggregator::{AggregationResult, ContentRecord};
use crate::errors::PathClipError;
use crate::resolver::UnresolvedInput;
use crate::trie::{FileTally, Trie, TrieNode};
use std::fmt::Write;
use std::path::{Path, PathBuf};
use tiktoken_rs::get_bpe_from_model;
use tracing::debug;

/// One line per failed file and per unresolved input, headed by counts.
pub fn summarize(result: &AggregationResult, unresolved: &[UnresolvedInput]) -> String {
    let mut out = String::new();
    let _ = writeln!(
        out,
        "Read {} {} ({} bytes)",
        result.records_processed,
        plural(result.records_processed, "file", "files"),
        result.total_size
    );

    if !unresolved.is_empty() {
        let _ = writeln!(
            out,
            "{} {} could not be resolved:",
            unresolved.len(),
            plural(unresolved.len(), "input", "inputs")
        );
        for item in unresolved {
            let _ = writeln!(out, "  - {}: {}", item.input, item.reason);
        }
    }

    if !result.errors.is_empty() {
        let _ = writeln!(
            out,
            "{} {} failed:",
            result.errors.len(),
            plural(result.errors.len(), "file", "files")
        );
        for error in &result.errors {
            let _ = writeln!(out, "  - [{}] {}", error.code, error.message);
        }
    }
    out
}

/// Builds the stats trie. Token counts are only computed when a tokenizer
/// model is given.
pub fn collect_stats(
    records: &[ContentRecord],
    tokenizer_model: Option<&str>,
) -> Result<Trie, PathClipError> {
    let tokenizer = match tokenizer_model {
        Some(model) => Some(
            get_bpe_from_model(model).map_err(|e| PathClipError::TokenizerError(e.to_string()))?,
        ),
        None => None,
    };

    let root = common_ancestor(records.iter().map(|r| r.path.as_path()));
    let mut trie = Trie::new();
    for record in records {
        let tokens = tokenizer
            .as_ref()
            .map(|bpe| bpe.encode_ordinary(&record.content).len());
        let relative = root
            .as_deref()
            .and_then(|r| record.path.strip_prefix(r).ok())
            .filter(|rel| !rel.as_os_str().is_empty())
            .unwrap_or(record.path.as_path());
        trie.insert(
            relative,
            FileTally {
                bytes: record.size,
                tokens,
            },
        );
    }
    Ok(trie)
}

pub fn render_stats(trie: &Trie, root_label: &str) -> String {
    debug!("Rendering stats tree");
    let mut out = String::new();
    let _ = writeln!(out, "{} ({})", root_label, describe(&trie.root().total()));
    render_node(trie.root(), "", &mut out);
    out
}

fn render_node(node: &TrieNode, prefix: &str, out: &mut String) {
    let mut children: Vec<_> = node.children.iter().collect();
    children.sort_by(|a, b| a.0.cmp(b.0));

    for (i, (name, child)) in children.iter().enumerate() {
        let is_last_child = i == children.len() - 1;
        let connector = if is_last_child { "┗━━" } else { "┣━━" };

        if child.is_leaf() {
            let _ = writeln!(
                out,
                "{}{} {} ({})",
                prefix,
                connector,
                name,
                describe(&child.total())
            );
        } else {
            let _ = writeln!(
                out,
                "{}{} {}/ ({})",
                prefix,
                connector,
                name,
                describe(&child.total())
            );
            let new_prefix = format!("{}{}   ", prefix, if is_last_child { " " } else { "┃" });
            render_node(child, &new_prefix, out);
        }
    }
}

fn describe(tally: &FileTally) -> String {
    match tally.tokens {
        Some(tokens) => format!("{} bytes, {} tokens", tally.bytes, tokens),
        None => format!("{} bytes", tally.bytes),
    }
}

/// Deepest directory containing every path, if any.
pub fn common_ancestor<'a>(paths: impl IntoIterator<Item = &'a Path>) -> Option<PathBuf> {
    let mut paths = paths.into_iter();
    let mut ancestor = paths.next()?.parent()?.to_path_buf();
    for path in paths {
        while !path.starts_with(&ancestor) {
            if !ancestor.pop() {
                return None;
            }
        }
    }
    Some(ancestor)
}

fn plural<'a>(count: usize, one: &'a str, many: &'a str) -> &'a str {
    if count == 1 {
        one
    } else {
        many
    }
}
