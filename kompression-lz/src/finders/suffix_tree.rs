//! Ukkonen suffix tree finder.
//!
//! The tree is built online over the buffer followed by a unique terminator
//! symbol (256), so every suffix ends at its own leaf. Nodes live in an
//! arena and refer to each other by index; every leaf edge ends at the
//! shared `leaf_end` counter, which is what lets each phase extend all
//! leaves at once.
//!
//! After construction a single DFS records each node's string depth, the
//! range of leaf ranks below it and the smallest suffix index in its
//! subtree. A query walks the path of the queried suffix from the root and
//! stops at the first child whose subtree holds no position inside the
//! window; the deepest reached node gives the match length and a range
//! maximum over its leaves gives the closest source.

use super::segment::{SegmentTree, max_tree};
use super::{MatchFinder, MatchStrategy, require_byte_units};
use crate::model::{FindLimits, Match};
use kompression_core::{KompressionError, Result};
use std::collections::HashMap;
use tracing::debug;

const ROOT: usize = 0;
const TERMINATOR: u16 = 256;

#[derive(Debug, Clone, Copy)]
enum EdgeEnd {
    /// Leaf edges end at the tree's shared `leaf_end`.
    Leaf,
    At(usize),
}

#[derive(Debug, Clone)]
struct Node {
    start: usize,
    end: EdgeEnd,
    children: HashMap<u16, usize>,
    suffix_link: usize,
    suffix_index: Option<usize>,
}

impl Node {
    fn new(start: usize, end: EdgeEnd) -> Self {
        Self {
            start,
            end,
            children: HashMap::new(),
            suffix_link: ROOT,
            suffix_index: None,
        }
    }
}

/// Suffix tree over a byte buffer.
#[derive(Debug, Clone)]
pub struct SuffixTree {
    text: Vec<u16>,
    nodes: Vec<Node>,
    leaf_end: usize,
    /// String depth at the end of each node's edge.
    depth: Vec<usize>,
    /// Smallest suffix index below each node.
    min_leaf: Vec<usize>,
    /// Leaf ranks `[first, last)` below each node.
    leaf_range: Vec<(usize, usize)>,
    /// Leaf rank of each suffix.
    rank_of: Vec<usize>,
}

impl SuffixTree {
    /// Build the tree for `data`.
    pub fn build(data: &[u8]) -> Self {
        let mut text: Vec<u16> = data.iter().map(|&b| b as u16).collect();
        text.push(TERMINATOR);

        let mut tree = Self {
            text,
            nodes: vec![Node::new(0, EdgeEnd::At(0))],
            leaf_end: 0,
            depth: Vec::new(),
            min_leaf: Vec::new(),
            leaf_range: Vec::new(),
            rank_of: Vec::new(),
        };
        tree.construct();
        tree.annotate();
        tree
    }

    /// Number of nodes, root included.
    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    /// Suffix indices in leaf order (children visited by ascending symbol,
    /// the terminator sorting after every byte).
    pub fn suffix_order(&self) -> Vec<usize> {
        let mut leaves: Vec<(usize, usize)> = self
            .nodes
            .iter()
            .enumerate()
            .filter_map(|(i, node)| node.suffix_index.map(|s| (self.leaf_range[i].0, s)))
            .collect();
        leaves.sort_unstable();
        leaves.into_iter().map(|(_, suffix)| suffix).collect()
    }

    /// Whether `pattern` occurs in the buffer.
    pub fn contains(&self, pattern: &[u8]) -> bool {
        let mut node = ROOT;
        let mut matched = 0;
        while matched < pattern.len() {
            let Some(&child) = self.nodes[node].children.get(&(pattern[matched] as u16)) else {
                return false;
            };
            let start = self.nodes[child].start;
            let end = self.edge_end(child);
            for i in start..end {
                if matched == pattern.len() {
                    return true;
                }
                if self.text[i] != pattern[matched] as u16 {
                    return false;
                }
                matched += 1;
            }
            node = child;
        }
        true
    }

    fn push_node(&mut self, start: usize, end: EdgeEnd) -> usize {
        self.nodes.push(Node::new(start, end));
        self.nodes.len() - 1
    }

    fn edge_end(&self, node: usize) -> usize {
        match self.nodes[node].end {
            EdgeEnd::Leaf => self.leaf_end,
            EdgeEnd::At(end) => end,
        }
    }

    fn edge_length(&self, node: usize) -> usize {
        self.edge_end(node) - self.nodes[node].start
    }

    fn construct(&mut self) {
        let mut active_node = ROOT;
        let mut active_edge = 0usize;
        let mut active_length = 0usize;
        let mut remaining = 0usize;

        for i in 0..self.text.len() {
            // Rule 1: every leaf grows by one symbol.
            self.leaf_end = i + 1;
            remaining += 1;
            let mut last_internal: Option<usize> = None;

            while remaining > 0 {
                if active_length == 0 {
                    active_edge = i;
                }
                let symbol = self.text[active_edge];

                match self.nodes[active_node].children.get(&symbol).copied() {
                    None => {
                        // Rule 2: new leaf hanging off the active node.
                        let leaf = self.push_node(i, EdgeEnd::Leaf);
                        self.nodes[active_node].children.insert(symbol, leaf);
                        if let Some(node) = last_internal.take() {
                            self.nodes[node].suffix_link = active_node;
                        }
                    }
                    Some(next) => {
                        let edge_length = self.edge_length(next);
                        if active_length >= edge_length {
                            // Skip/count down to the next node.
                            active_edge += edge_length;
                            active_length -= edge_length;
                            active_node = next;
                            continue;
                        }

                        if self.text[self.nodes[next].start + active_length] == self.text[i] {
                            // Rule 3: already present, end the phase.
                            if let Some(node) = last_internal.take() {
                                if active_node != ROOT {
                                    self.nodes[node].suffix_link = active_node;
                                }
                            }
                            active_length += 1;
                            break;
                        }

                        // Rule 2 with a split in the middle of the edge.
                        let split_start = self.nodes[next].start;
                        let split =
                            self.push_node(split_start, EdgeEnd::At(split_start + active_length));
                        self.nodes[active_node].children.insert(symbol, split);

                        let leaf = self.push_node(i, EdgeEnd::Leaf);
                        let leaf_symbol = self.text[i];
                        self.nodes[split].children.insert(leaf_symbol, leaf);

                        self.nodes[next].start += active_length;
                        let next_symbol = self.text[self.nodes[next].start];
                        self.nodes[split].children.insert(next_symbol, next);

                        if let Some(node) = last_internal.replace(split) {
                            self.nodes[node].suffix_link = split;
                        }
                    }
                }

                remaining -= 1;
                if active_node == ROOT && active_length > 0 {
                    active_length -= 1;
                    active_edge = i + 1 - remaining;
                } else if active_node != ROOT {
                    active_node = self.nodes[active_node].suffix_link;
                }
            }
        }
    }

    fn annotate(&mut self) {
        let count = self.nodes.len();
        let mut depth = vec![0usize; count];
        let mut min_leaf = vec![usize::MAX; count];
        let mut leaf_range = vec![(0usize, 0usize); count];
        let mut rank_of = vec![0usize; self.text.len()];
        let mut next_rank = 0;

        let mut stack = vec![(ROOT, false)];
        while let Some((node, expanded)) = stack.pop() {
            if expanded {
                leaf_range[node].1 = next_rank;
                min_leaf[node] = self.nodes[node]
                    .children
                    .values()
                    .map(|&child| min_leaf[child])
                    .min()
                    .unwrap_or(usize::MAX);
                continue;
            }

            leaf_range[node].0 = next_rank;
            if node != ROOT && self.nodes[node].children.is_empty() {
                let suffix = self.text.len() - depth[node];
                self.nodes[node].suffix_index = Some(suffix);
                rank_of[suffix] = next_rank;
                next_rank += 1;
                min_leaf[node] = suffix;
                leaf_range[node].1 = next_rank;
                continue;
            }

            stack.push((node, true));
            let mut children: Vec<(u16, usize)> = self.nodes[node]
                .children
                .iter()
                .map(|(&symbol, &child)| (symbol, child))
                .collect();
            children.sort_unstable();
            for &(_, child) in children.iter().rev() {
                depth[child] = depth[node] + self.edge_length(child);
                stack.push((child, false));
            }
        }

        self.depth = depth;
        self.min_leaf = min_leaf;
        self.leaf_range = leaf_range;
        self.rank_of = rank_of;
    }
}

/// Finder backed by a [`SuffixTree`].
///
/// The window must cover the whole buffer; construction of the index
/// otherwise fails with [`KompressionError::UnsupportedWindow`].
#[derive(Debug, Clone)]
pub struct SuffixTreeFinder {
    limits: FindLimits,
    tree: Option<SuffixTree>,
    /// Inserted suffix positions keyed by leaf rank.
    inserted: SegmentTree<i64>,
    next_insert: usize,
}

impl SuffixTreeFinder {
    /// Create a finder after validating `limits`.
    pub fn new(limits: FindLimits) -> Result<Self> {
        require_byte_units(&limits, MatchStrategy::SuffixTree)?;
        Ok(Self {
            limits,
            tree: None,
            inserted: max_tree(0),
            next_insert: 0,
        })
    }

    fn longest(&mut self, data: &[u8], at: usize) -> Option<(usize, usize)> {
        let tree = self.tree.as_ref()?;
        if at < self.limits.min_displacement {
            return None;
        }
        let hi = at - self.limits.min_displacement;
        while self.next_insert <= hi {
            let q = self.next_insert;
            self.inserted.set(tree.rank_of[q], q as i64);
            self.next_insert += 1;
        }

        let limit = self.limits.max_length.min(data.len() - at);
        if limit < self.limits.min_length {
            return None;
        }

        let mut node = ROOT;
        let mut depth = 0;
        while depth < limit {
            let symbol = data[at + depth] as u16;
            let Some(&child) = tree.nodes[node].children.get(&symbol) else {
                break;
            };
            if tree.min_leaf[child] > hi {
                break;
            }
            node = child;
            depth = tree.depth[child];
        }

        let length = depth.min(limit);
        if node == ROOT || length < self.limits.min_length {
            return None;
        }

        let (first, last) = tree.leaf_range[node];
        let source = self.inserted.query(first, last);
        debug_assert!(source >= 0 && source as usize <= hi);
        Some((at - source as usize, length))
    }
}

impl MatchFinder for SuffixTreeFinder {
    fn limits(&self) -> &FindLimits {
        &self.limits
    }

    fn prepare(&mut self, data: &[u8]) -> Result<()> {
        if self.limits.max_displacement < data.len() {
            return Err(KompressionError::unsupported_window(
                self.limits.max_displacement,
                data.len(),
            ));
        }
        let tree = SuffixTree::build(data);
        debug!(bytes = data.len(), nodes = tree.node_count(), "built suffix tree");
        self.inserted = max_tree(data.len() + 1);
        self.next_insert = 0;
        self.tree = Some(tree);
        Ok(())
    }

    fn find_matches(&mut self, data: &[u8], at: usize) -> Vec<Match> {
        self.longest(data, at)
            .map(|(displacement, length)| Match::new(at, displacement, length))
            .into_iter()
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_every_suffix_has_a_leaf() {
        let data = b"mississippi";
        let tree = SuffixTree::build(data);
        let mut order = tree.suffix_order();
        assert_eq!(order.len(), data.len() + 1);
        order.sort_unstable();
        assert_eq!(order, (0..=data.len()).collect::<Vec<_>>());
    }

    #[test]
    fn test_leaf_order_is_lexicographic() {
        let data = b"banana";
        let tree = SuffixTree::build(data);
        // Terminator sorts last, so "a" follows "anana" and "ana".
        assert_eq!(tree.suffix_order(), vec![1, 3, 5, 0, 2, 4, 6]);
    }

    #[test]
    fn test_contains() {
        let tree = SuffixTree::build(b"abracadabra");
        assert!(tree.contains(b"cada"));
        assert!(tree.contains(b"abra"));
        assert!(tree.contains(b""));
        assert!(!tree.contains(b"abrab"));
        assert!(!tree.contains(b"z"));
    }

    #[test]
    fn test_overlapping_match() {
        let data = b"ABABABABAB";
        let mut finder = SuffixTreeFinder::new(FindLimits::new(3, 0x12, 1, 0x1000)).unwrap();
        finder.prepare(data).unwrap();
        assert!(finder.find_matches(data, 0).is_empty());
        assert!(finder.find_matches(data, 1).is_empty());
        assert_eq!(finder.find_matches(data, 2), vec![Match::new(2, 2, 8)]);
    }

    #[test]
    fn test_window_must_cover_input() {
        let mut finder = SuffixTreeFinder::new(FindLimits::new(3, 0x12, 1, 8)).unwrap();
        assert!(matches!(
            finder.prepare(&[0u8; 9]),
            Err(KompressionError::UnsupportedWindow { window: 8, required: 9 })
        ));
        assert!(finder.prepare(&[0u8; 8]).is_ok());
    }
}
