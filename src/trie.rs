use std::collections::HashMap;
use std::path::Path;
use tracing::trace;

/// Size and (optional) token estimate for one file.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FileTally {
    pub bytes: u64,
    pub tokens: Option<usize>,
}

impl FileTally {
    fn add(&mut self, other: FileTally) {
        self.bytes += other.bytes;
        self.tokens = match (self.tokens, other.tokens) {
            (Some(a), Some(b)) => Some(a + b),
            (a, b) => a.or(b),
        };
    }
}

/// Represents a node in a trie.
#[derive(Debug, Default)]
pub struct TrieNode {
    pub children: HashMap<String, TrieNode>,
    pub tally: Option<FileTally>,
}

impl TrieNode {
    pub fn new() -> Self {
        TrieNode::default()
    }

    /// Sum over the node and everything below it.
    pub fn total(&self) -> FileTally {
        let mut total = self.tally.unwrap_or_default();
        for child in self.children.values() {
            total.add(child.total());
        }
        total
    }

    pub fn is_leaf(&self) -> bool {
        self.tally.is_some() && self.children.is_empty()
    }
}

/// Path components as a tree, one leaf per file.
#[derive(Debug, Default)]
pub struct Trie {
    root: TrieNode,
}

impl Trie {
    pub fn new() -> Self {
        Trie::default()
    }

    pub fn insert(&mut self, path: &Path, tally: FileTally) {
        trace!("Inserting path into trie: {:?} ({:?})", path, tally);
        let mut current_node = &mut self.root;
        for component in path.iter() {
            let component_str = component.to_string_lossy().into_owned();
            current_node = current_node
                .children
                .entry(component_str)
                .or_insert_with(TrieNode::new);
        }
        if current_node.tally.is_some() {
            trace!("Overwriting existing tally for path: {:?}", path);
        }
        current_node.tally = Some(tally);
    }

    pub fn root(&self) -> &TrieNode {
        &self.root
    }
}
