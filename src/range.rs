//! Parsing of `remove` identifiers: `3`, `2-5`, or literal paths.
//!
//! Indices are 1-based everywhere in this module. The only conversion to a
//! 0-based offset happens inside [`apply_removal`].

use once_cell::sync::Lazy;
use regex::Regex;
use std::collections::BTreeSet;
use std::path::PathBuf;
use tracing::{debug, trace};

/// Widest `a-b` span `parse_ranges` will expand; wider ranges are invalid.
pub const MAX_RANGE_SPAN: usize = 1 << 20;

static SINGLE_INDEX: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^\d+$").expect("index regex is valid"));
static INDEX_RANGE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^(\d+)-(\d+)$").expect("range regex is valid"));

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SeparatedIdentifiers {
    pub numeric: Vec<String>,
    pub paths: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RemovalSpec {
    /// 1-based, ascending, no duplicates.
    pub indices: BTreeSet<usize>,
    pub paths: Vec<String>,
    pub invalid_inputs: Vec<String>,
    /// Valid indices past the end of the list; reported, never applied.
    pub out_of_range: Vec<usize>,
}

impl RemovalSpec {
    pub fn is_empty(&self) -> bool {
        self.indices.is_empty() && self.paths.is_empty()
    }
}

pub fn is_numeric_token(token: &str) -> bool {
    SINGLE_INDEX.is_match(token) || INDEX_RANGE.is_match(token)
}

pub fn separate(identifiers: &[String]) -> SeparatedIdentifiers {
    let (numeric, paths): (Vec<String>, Vec<String>) = identifiers
        .iter()
        .cloned()
        .partition(|token| is_numeric_token(token));
    SeparatedIdentifiers { numeric, paths }
}

/// Bad tokens land in `invalid_inputs`; they never abort the parse. Ranges
/// spanning more than [`MAX_RANGE_SPAN`] indices count as bad tokens.
pub fn parse_ranges(tokens: &[String]) -> RemovalSpec {
    parse_ranges_bounded(tokens, None)
}

// With an upper bound, range expansion stops at the bound so a token like
// `1-999999999` cannot allocate its whole span.
fn parse_ranges_bounded(tokens: &[String], upper: Option<usize>) -> RemovalSpec {
    let mut spec = RemovalSpec::default();
    let mut beyond = BTreeSet::new();

    for token in tokens {
        match parse_token(token) {
            Some((start, end)) if upper.is_none() && end - start >= MAX_RANGE_SPAN => {
                trace!("Range too wide to expand: {}", token);
                spec.invalid_inputs.push(token.clone());
            }
            Some((start, end)) => {
                let last = upper.map_or(end, |u| end.min(u));
                spec.indices.extend(start..=last);
                if let Some(u) = upper {
                    if end > u {
                        beyond.insert(start.max(u + 1));
                    }
                }
            }
            None => {
                trace!("Invalid removal identifier: {}", token);
                spec.invalid_inputs.push(token.clone());
            }
        }
    }

    spec.out_of_range = beyond.into_iter().collect();
    spec
}

fn parse_token(token: &str) -> Option<(usize, usize)> {
    if SINGLE_INDEX.is_match(token) {
        let index: usize = token.parse().ok()?;
        return (index > 0).then_some((index, index));
    }
    let captures = INDEX_RANGE.captures(token)?;
    let start: usize = captures[1].parse().ok()?;
    let end: usize = captures[2].parse().ok()?;
    (start > 0 && start <= end).then_some((start, end))
}

/// Parses identifiers against a list of `current_count` entries. Indices past
/// the end are moved to `out_of_range` (the first such index per token).
pub fn parse_removal(identifiers: &[String], current_count: usize) -> RemovalSpec {
    let separated = separate(identifiers);
    let mut spec = parse_ranges_bounded(&separated.numeric, Some(current_count));
    spec.paths = separated.paths;
    debug!(
        "Removal spec: {} indices, {} paths, {} invalid, {} out of range",
        spec.indices.len(),
        spec.paths.len(),
        spec.invalid_inputs.len(),
        spec.out_of_range.len()
    );
    spec
}

/// Removes the selected entries and returns them in list order.
///
/// `paths` must already be resolved to the same absolute form the list
/// stores. Index removals run from the highest index down so earlier
/// removals never shift later targets.
pub fn apply_removal(
    entries: &mut Vec<PathBuf>,
    indices: &BTreeSet<usize>,
    paths: &[PathBuf],
) -> Vec<PathBuf> {
    let mut targets: BTreeSet<usize> = indices
        .iter()
        .filter(|&&i| i >= 1 && i <= entries.len())
        .map(|&i| i - 1)
        .collect();
    for path in paths {
        if let Some(offset) = entries.iter().position(|e| e == path) {
            targets.insert(offset);
        }
    }

    let mut removed: Vec<PathBuf> = targets
        .iter()
        .rev()
        .map(|&offset| entries.remove(offset))
        .collect();
    removed.reverse();
    removed
}
