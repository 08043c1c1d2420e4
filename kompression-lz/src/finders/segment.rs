//! Segment tree over suffix ranks.
//!
//! The tree and array finders store inserted suffix positions (max tree) and
//! LCP values (min tree) in it, and use the descent queries to locate the
//! nearest rank holding a usable value.

/// Fixed-size segment tree with a `Copy` value and an associative combine.
#[derive(Debug, Clone)]
pub(crate) struct SegmentTree<T: Copy> {
    len: usize,
    size: usize,
    tree: Vec<T>,
    identity: T,
    combine: fn(T, T) -> T,
}

impl<T: Copy> SegmentTree<T> {
    /// Tree of `len` identity values.
    pub fn new(len: usize, identity: T, combine: fn(T, T) -> T) -> Self {
        let size = len.max(1).next_power_of_two();
        Self {
            len,
            size,
            tree: vec![identity; 2 * size],
            identity,
            combine,
        }
    }

    /// Tree initialised from `values`.
    pub fn from_values(values: &[T], identity: T, combine: fn(T, T) -> T) -> Self {
        let mut seg = Self::new(values.len(), identity, combine);
        seg.tree[seg.size..seg.size + values.len()].copy_from_slice(values);
        for node in (1..seg.size).rev() {
            seg.tree[node] = combine(seg.tree[2 * node], seg.tree[2 * node + 1]);
        }
        seg
    }

    pub fn set(&mut self, index: usize, value: T) {
        debug_assert!(index < self.len);
        let mut node = self.size + index;
        self.tree[node] = value;
        while node > 1 {
            node /= 2;
            self.tree[node] = (self.combine)(self.tree[2 * node], self.tree[2 * node + 1]);
        }
    }

    /// Combined value over `[start, end)`.
    pub fn query(&self, start: usize, end: usize) -> T {
        let mut left = self.identity;
        let mut right = self.identity;
        let mut lo = start + self.size;
        let mut hi = end.min(self.len) + self.size;
        while lo < hi {
            if lo & 1 == 1 {
                left = (self.combine)(left, self.tree[lo]);
                lo += 1;
            }
            if hi & 1 == 1 {
                hi -= 1;
                right = (self.combine)(self.tree[hi], right);
            }
            lo /= 2;
            hi /= 2;
        }
        (self.combine)(left, right)
    }

    /// First index in `[start, end)` whose value satisfies `pred`.
    ///
    /// `pred` must hold for a combined value whenever it holds for one of
    /// its parts.
    pub fn find_first(&self, start: usize, end: usize, pred: impl Fn(T) -> bool) -> Option<usize> {
        self.first_in(1, 0, self.size, start, end.min(self.len), &pred)
    }

    /// Last index in `[start, end)` whose value satisfies `pred`.
    pub fn find_last(&self, start: usize, end: usize, pred: impl Fn(T) -> bool) -> Option<usize> {
        self.last_in(1, 0, self.size, start, end.min(self.len), &pred)
    }

    fn first_in(
        &self,
        node: usize,
        node_lo: usize,
        node_hi: usize,
        start: usize,
        end: usize,
        pred: &impl Fn(T) -> bool,
    ) -> Option<usize> {
        if node_hi <= start || end <= node_lo || !pred(self.tree[node]) {
            return None;
        }
        if node_hi - node_lo == 1 {
            return Some(node_lo);
        }
        let mid = (node_lo + node_hi) / 2;
        self.first_in(2 * node, node_lo, mid, start, end, pred)
            .or_else(|| self.first_in(2 * node + 1, mid, node_hi, start, end, pred))
    }

    fn last_in(
        &self,
        node: usize,
        node_lo: usize,
        node_hi: usize,
        start: usize,
        end: usize,
        pred: &impl Fn(T) -> bool,
    ) -> Option<usize> {
        if node_hi <= start || end <= node_lo || !pred(self.tree[node]) {
            return None;
        }
        if node_hi - node_lo == 1 {
            return Some(node_lo);
        }
        let mid = (node_lo + node_hi) / 2;
        self.last_in(2 * node + 1, mid, node_hi, start, end, pred)
            .or_else(|| self.last_in(2 * node, node_lo, mid, start, end, pred))
    }
}

/// Max tree where `-1` marks an empty slot.
pub(crate) fn max_tree(len: usize) -> SegmentTree<i64> {
    SegmentTree::new(len, -1, i64::max)
}

/// Min tree over fixed values.
pub(crate) fn min_tree(values: &[u32]) -> SegmentTree<u32> {
    SegmentTree::from_values(values, u32::MAX, u32::min)
}
