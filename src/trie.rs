use std::collections::BTreeMap;
use tracing::trace;

/// A node of the path trie. Files carry a token estimate; directories only
/// aggregate their children.
#[derive(Debug, Default)]
pub struct TrieNode {
    pub children: BTreeMap<String, TrieNode>,
    pub token_count: Option<usize>,
}

impl TrieNode {
    pub fn new() -> Self {
        Self::default()
    }

    /// Calculates the total number of tokens in the subtree.
    pub fn calculate_total_tokens(&self) -> usize {
        self.token_count.unwrap_or(0)
            + self
                .children
                .values()
                .map(TrieNode::calculate_total_tokens)
                .sum::<usize>()
    }

    pub fn is_file(&self) -> bool {
        self.token_count.is_some()
    }
}

/// Trie over `/`-separated relative paths.
#[derive(Debug, Default)]
pub struct Trie {
    root: TrieNode,
}

impl Trie {
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts a `/`-separated path with its token count.
    pub fn insert(&mut self, relative_path: &str, token_count: usize) {
        let mut current_node = &mut self.root;
        for segment in relative_path.split('/').filter(|s| !s.is_empty()) {
            current_node = current_node
                .children
                .entry(segment.to_string())
                .or_default();
        }
        if current_node.token_count.is_some() {
            trace!("Overwriting existing token count for path: {}", relative_path);
        }
        current_node.token_count = Some(token_count);
    }

    pub fn get_root(&self) -> &TrieNode {
        &self.root
    }
}
