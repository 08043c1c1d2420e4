//! Match finding strategies.
//!
//! Every finder answers the same question: what is the longest run starting
//! at a position that also occurs inside the allowed window behind it?
//! Ties go to the smallest displacement, so all strategies return identical
//! results for the same constraints and can be swapped freely.
//!
//! | Strategy | Build | Query | Window |
//! |----------|-------|-------|--------|
//! | [`NaiveWindowFinder`] | none | O(window × length) | any, any unit size |
//! | [`SuffixTreeFinder`] | O(n) Ukkonen | O(depth + log n) | must cover the input |
//! | [`SuffixArrayFinder`] | O(n) SA-IS | O(log n) | any |
//!
//! Finders are prepared once per compression call with the full buffer
//! (pre-buffer included) and then queried at strictly increasing positions.

mod naive;
pub(crate) mod segment;
mod suffix_array;
mod suffix_tree;

pub use naive::NaiveWindowFinder;
pub use suffix_array::{SuffixArray, SuffixArrayFinder};
pub use suffix_tree::{SuffixTree, SuffixTreeFinder};

use crate::model::{FindLimits, Match};
use kompression_core::Result;
use std::fmt;
use std::str::FromStr;

/// A match finding strategy.
pub trait MatchFinder: fmt::Debug + Send {
    /// Constraints this finder was built with.
    fn limits(&self) -> &FindLimits;

    /// Build any index needed for `data`.
    fn prepare(&mut self, data: &[u8]) -> Result<()>;

    /// Matches starting at `at`; at most one, the longest.
    ///
    /// Positions in the returned matches are indices into `data`.
    fn find_matches(&mut self, data: &[u8], at: usize) -> Vec<Match>;
}

/// Which finder implementation to use.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum MatchStrategy {
    /// Suffix array for byte-granular limits, naive window otherwise.
    #[default]
    Auto,
    /// Sliding window scan.
    Naive,
    /// Ukkonen suffix tree.
    SuffixTree,
    /// SA-IS suffix array.
    SuffixArray,
}

impl MatchStrategy {
    /// All strategies, for listings.
    pub const ALL: [MatchStrategy; 4] = [
        MatchStrategy::Auto,
        MatchStrategy::Naive,
        MatchStrategy::SuffixTree,
        MatchStrategy::SuffixArray,
    ];

    /// Strategy name.
    pub fn name(&self) -> &'static str {
        match self {
            MatchStrategy::Auto => "auto",
            MatchStrategy::Naive => "naive",
            MatchStrategy::SuffixTree => "suffix-tree",
            MatchStrategy::SuffixArray => "suffix-array",
        }
    }

    /// Build a finder for `limits`.
    pub fn finder(&self, limits: FindLimits) -> Result<Box<dyn MatchFinder>> {
        Ok(match self {
            MatchStrategy::Auto if limits.unit_size == 1 => {
                Box::new(SuffixArrayFinder::new(limits)?)
            }
            MatchStrategy::Auto | MatchStrategy::Naive => Box::new(NaiveWindowFinder::new(limits)?),
            MatchStrategy::SuffixTree => Box::new(SuffixTreeFinder::new(limits)?),
            MatchStrategy::SuffixArray => Box::new(SuffixArrayFinder::new(limits)?),
        })
    }
}

impl fmt::Display for MatchStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for MatchStrategy {
    type Err = kompression_core::KompressionError;

    fn from_str(s: &str) -> Result<Self> {
        let key: String = s
            .chars()
            .filter(|c| *c != '-' && *c != '_')
            .map(|c| c.to_ascii_lowercase())
            .collect();
        match key.as_str() {
            "auto" => Ok(MatchStrategy::Auto),
            "naive" => Ok(MatchStrategy::Naive),
            "suffixtree" | "tree" => Ok(MatchStrategy::SuffixTree),
            "suffixarray" | "array" => Ok(MatchStrategy::SuffixArray),
            _ => Err(kompression_core::KompressionError::configuration(format!(
                "unknown match strategy '{s}'"
            ))),
        }
    }
}

/// Longest common prefix of `data[a..]` and `data[b..]`, capped at `limit`.
#[inline]
pub(crate) fn common_prefix(data: &[u8], a: usize, b: usize, limit: usize) -> usize {
    data[a..]
        .iter()
        .zip(&data[b..])
        .take(limit)
        .take_while(|(x, y)| x == y)
        .count()
}

/// Reject constraint sets the index-based finders cannot serve.
fn require_byte_units(limits: &FindLimits, strategy: MatchStrategy) -> Result<()> {
    limits.validate()?;
    if limits.unit_size != 1 {
        return Err(kompression_core::KompressionError::configuration(format!(
            "{strategy} finder requires a unit size of 1, got {}",
            limits.unit_size
        )));
    }
    Ok(())
}
