//! Sliding window scan.

use super::{MatchFinder, common_prefix};
use crate::model::{FindLimits, Match};
use kompression_core::Result;

/// Brute-force finder comparing every displacement in the window.
///
/// The only finder that supports unit sizes above one.
#[derive(Debug, Clone)]
pub struct NaiveWindowFinder {
    limits: FindLimits,
}

impl NaiveWindowFinder {
    /// Create a finder after validating `limits`.
    pub fn new(limits: FindLimits) -> Result<Self> {
        limits.validate()?;
        Ok(Self { limits })
    }

    /// Longest match at `at` as `(displacement, length)`.
    pub fn longest(&self, data: &[u8], at: usize) -> Option<(usize, usize)> {
        let unit = self.limits.unit_size;
        let max_length = self.limits.max_length.min(data.len().saturating_sub(at));
        let max_length = max_length - max_length % unit;
        if max_length < self.limits.min_length {
            return None;
        }

        let max_displacement = self.limits.max_displacement.min(at);
        let mut best: Option<(usize, usize)> = None;
        let mut displacement = self.limits.min_displacement;

        while displacement <= max_displacement {
            let length = common_prefix(data, at - displacement, at, max_length);
            let length = length - length % unit;
            if length >= self.limits.min_length && best.is_none_or(|(_, l)| length > l) {
                best = Some((displacement, length));
                if length == max_length {
                    break;
                }
            }
            displacement += unit;
        }

        best
    }
}

impl MatchFinder for NaiveWindowFinder {
    fn limits(&self) -> &FindLimits {
        &self.limits
    }

    fn prepare(&mut self, _data: &[u8]) -> Result<()> {
        Ok(())
    }

    fn find_matches(&mut self, data: &[u8], at: usize) -> Vec<Match> {
        self.longest(data, at)
            .map(|(displacement, length)| Match::new(at, displacement, length))
            .into_iter()
            .collect()
    }
}
