//! SA-IS suffix array finder.
//!
//! The array is built with induced sorting: suffixes are classified as
//! S- or L-type, LMS suffixes are bucketed and induced, the resulting LMS
//! substrings are named, and the reduced string is only sorted recursively
//! when two LMS substrings share a name. A Kasai pass adds the LCP array.
//!
//! Queries keep the positions inside the current window in a max tree keyed
//! by rank. The rank interval of the queried byte (from `index_left`) is
//! searched for the nearest usable rank on each side of the queried suffix;
//! the better of the two LCPs is the match length, and the interval is then
//! narrowed to the ranks sharing that length, whose largest position is the
//! closest source.

use super::segment::{SegmentTree, max_tree, min_tree};
use super::{MatchFinder, MatchStrategy, require_byte_units};
use crate::model::{FindLimits, Match};
use kompression_core::Result;
use tracing::debug;

/// Suffix array of a byte buffer with its LCP array.
#[derive(Debug, Clone)]
pub struct SuffixArray {
    /// Suffix start positions in lexicographic order.
    pub suffixes: Vec<i32>,
    /// First rank whose suffix begins with each byte, or `-1`.
    pub index_left: [i32; 256],
    /// Rank of each suffix.
    rank: Vec<u32>,
    /// `lcp[i]` is the common prefix length of ranks `i - 1` and `i`.
    lcp: Vec<u32>,
}

impl SuffixArray {
    /// Build the suffix array for `data`.
    pub fn build(data: &[u8]) -> Self {
        let symbols: Vec<usize> = data.iter().map(|&b| b as usize).collect();
        let sorted = sa_is(&symbols, 255);

        let mut rank = vec![0u32; data.len()];
        for (r, &suffix) in sorted.iter().enumerate() {
            rank[suffix] = r as u32;
        }

        let mut index_left = [-1i32; 256];
        for (r, &suffix) in sorted.iter().enumerate().rev() {
            index_left[data[suffix] as usize] = r as i32;
        }

        let lcp = kasai(data, &sorted, &rank);

        Self {
            suffixes: sorted.into_iter().map(|s| s as i32).collect(),
            index_left,
            rank,
            lcp,
        }
    }

    /// Number of suffixes.
    pub fn len(&self) -> usize {
        self.suffixes.len()
    }

    /// Whether the buffer was empty.
    pub fn is_empty(&self) -> bool {
        self.suffixes.is_empty()
    }

    /// Rank of the suffix starting at `position`.
    pub fn rank(&self, position: usize) -> usize {
        self.rank[position] as usize
    }

    /// LCP array.
    pub fn lcp(&self) -> &[u32] {
        &self.lcp
    }

    /// Rank interval `[first, end)` of suffixes starting with `byte`.
    pub fn byte_range(&self, byte: u8) -> (usize, usize) {
        let first = self.index_left[byte as usize];
        if first < 0 {
            return (0, 0);
        }
        let end = self.index_left[byte as usize + 1..]
            .iter()
            .find(|&&r| r >= 0)
            .map_or(self.len(), |&r| r as usize);
        (first as usize, end)
    }
}

/// Induced sorting over symbols in `0..=upper`.
fn sa_is(s: &[usize], upper: usize) -> Vec<usize> {
    let n = s.len();
    match n {
        0 => return Vec::new(),
        1 => return vec![0],
        2 => return if s[0] < s[1] { vec![0, 1] } else { vec![1, 0] },
        _ => {}
    }

    // true = S-type
    let mut ls = vec![false; n];
    for i in (0..n - 1).rev() {
        ls[i] = if s[i] == s[i + 1] {
            ls[i + 1]
        } else {
            s[i] < s[i + 1]
        };
    }

    let mut sum_l = vec![0usize; upper + 1];
    let mut sum_s = vec![0usize; upper + 1];
    for i in 0..n {
        if !ls[i] {
            sum_s[s[i]] += 1;
        } else {
            sum_l[s[i] + 1] += 1;
        }
    }
    for i in 0..=upper {
        sum_s[i] += sum_l[i];
        if i < upper {
            sum_l[i + 1] += sum_s[i];
        }
    }

    // Entries are stored one-based so zero can mean empty.
    let induce = |sa: &mut [usize], lms: &[usize]| {
        sa.fill(0);
        let mut buf = sum_s.clone();
        for &d in lms {
            if d == n {
                continue;
            }
            let slot = buf[s[d]];
            buf[s[d]] += 1;
            sa[slot] = d + 1;
        }

        buf.copy_from_slice(&sum_l);
        let slot = buf[s[n - 1]];
        buf[s[n - 1]] += 1;
        sa[slot] = n;
        for i in 0..n {
            let v = sa[i];
            if v >= 2 && !ls[v - 2] {
                let slot = buf[s[v - 2]];
                buf[s[v - 2]] += 1;
                sa[slot] = v - 1;
            }
        }

        buf.copy_from_slice(&sum_l);
        for i in (0..n).rev() {
            let v = sa[i];
            if v >= 2 && ls[v - 2] {
                buf[s[v - 2] + 1] -= 1;
                sa[buf[s[v - 2] + 1]] = v - 1;
            }
        }
    };

    let mut lms_map = vec![0usize; n + 1];
    let mut lms = Vec::new();
    for i in 1..n {
        if !ls[i - 1] && ls[i] {
            lms.push(i);
            lms_map[i] = lms.len();
        }
    }
    let m = lms.len();

    let mut sa = vec![0usize; n];
    induce(&mut sa, &lms);

    if m > 0 {
        let mut sorted_lms: Vec<usize> = sa
            .iter()
            .map(|&v| v - 1)
            .filter(|&v| lms_map[v] != 0)
            .collect();

        // Name LMS substrings in sorted order.
        let mut reduced = vec![0usize; m];
        let mut names = 0;
        reduced[lms_map[sorted_lms[0]] - 1] = 0;
        for i in 1..m {
            let mut l = sorted_lms[i - 1];
            let mut r = sorted_lms[i];
            let end_l = if lms_map[l] < m { lms[lms_map[l]] } else { n };
            let end_r = if lms_map[r] < m { lms[lms_map[r]] } else { n };
            let same = if end_l - l != end_r - r {
                false
            } else {
                while l < end_l && s[l] == s[r] {
                    l += 1;
                    r += 1;
                }
                l != n && r != n && l == end_l && s[l] == s[r]
            };
            if !same {
                names += 1;
            }
            reduced[lms_map[sorted_lms[i]] - 1] = names;
        }

        let reduced_sa = if names + 1 == m {
            // Names are unique: the reduced order follows directly.
            let mut order = vec![0usize; m];
            for (i, &name) in reduced.iter().enumerate() {
                order[name] = i;
            }
            order
        } else {
            sa_is(&reduced, names)
        };

        for (slot, &i) in sorted_lms.iter_mut().zip(&reduced_sa) {
            *slot = lms[i];
        }
        induce(&mut sa, &sorted_lms);
    }

    for v in sa.iter_mut() {
        *v -= 1;
    }
    sa
}

fn kasai(data: &[u8], sorted: &[usize], rank: &[u32]) -> Vec<u32> {
    let n = data.len();
    let mut lcp = vec![0u32; n];
    let mut h = 0usize;
    for i in 0..n {
        let r = rank[i] as usize;
        if r == 0 {
            h = 0;
            continue;
        }
        let j = sorted[r - 1];
        while i + h < n && j + h < n && data[i + h] == data[j + h] {
            h += 1;
        }
        lcp[r] = h as u32;
        h = h.saturating_sub(1);
    }
    lcp
}

/// Finder backed by a [`SuffixArray`].
#[derive(Debug, Clone)]
pub struct SuffixArrayFinder {
    limits: FindLimits,
    array: Option<SuffixArray>,
    lcp_min: SegmentTree<u32>,
    /// Positions inside the current window keyed by rank.
    window: SegmentTree<i64>,
    next_insert: usize,
    next_remove: usize,
}

impl SuffixArrayFinder {
    /// Create a finder after validating `limits`.
    pub fn new(limits: FindLimits) -> Result<Self> {
        require_byte_units(&limits, MatchStrategy::SuffixArray)?;
        Ok(Self {
            limits,
            array: None,
            lcp_min: min_tree(&[]),
            window: max_tree(0),
            next_insert: 0,
            next_remove: 0,
        })
    }

    fn slide_window(&mut self, lo: usize, hi: usize) {
        let Some(array) = self.array.as_ref() else {
            return;
        };
        while self.next_insert <= hi {
            let q = self.next_insert;
            self.window.set(array.rank(q), q as i64);
            self.next_insert += 1;
        }
        while self.next_remove < lo {
            self.window.set(array.rank(self.next_remove), -1);
            self.next_remove += 1;
        }
    }

    fn longest(&mut self, data: &[u8], at: usize) -> Option<(usize, usize)> {
        if at < self.limits.min_displacement {
            return None;
        }
        let hi = at - self.limits.min_displacement;
        let lo = at.saturating_sub(self.limits.max_displacement);
        self.slide_window(lo, hi);

        let array = self.array.as_ref()?;
        let limit = self.limits.max_length.min(data.len() - at);
        if limit < self.limits.min_length {
            return None;
        }

        let r = array.rank(at);
        let (first, end) = array.byte_range(data[at]);

        let left = self
            .window
            .find_last(first, r, |v| v >= 0)
            .map_or(0, |j| self.lcp_min.query(j + 1, r + 1) as usize);
        let right = self
            .window
            .find_first(r + 1, end, |v| v >= 0)
            .map_or(0, |j| self.lcp_min.query(r + 1, j + 1) as usize);

        let length = left.max(right).min(limit);
        if length < self.limits.min_length {
            return None;
        }

        // Narrow to the ranks sharing `length` bytes with the query.
        let bound = length as u32;
        let group_start = self
            .lcp_min
            .find_last(0, r + 1, |v| v < bound)
            .unwrap_or(0);
        let group_end = self
            .lcp_min
            .find_first(r + 1, array.len(), |v| v < bound)
            .unwrap_or(array.len());

        let source = self.window.query(group_start, group_end);
        debug_assert!(source >= 0);
        Some((at - source as usize, length))
    }
}

impl MatchFinder for SuffixArrayFinder {
    fn limits(&self) -> &FindLimits {
        &self.limits
    }

    fn prepare(&mut self, data: &[u8]) -> Result<()> {
        let array = SuffixArray::build(data);
        debug!(bytes = data.len(), "built suffix array");
        self.lcp_min = min_tree(array.lcp());
        self.window = max_tree(data.len());
        self.next_insert = 0;
        self.next_remove = 0;
        self.array = Some(array);
        Ok(())
    }

    fn find_matches(&mut self, data: &[u8], at: usize) -> Vec<Match> {
        self.longest(data, at)
            .map(|(displacement, length)| Match::new(at, displacement, length))
            .into_iter()
            .collect()
    }
}
