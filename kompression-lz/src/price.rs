//! Price models.
//!
//! A price model maps a literal (`None`) or a candidate match to the number
//! of bits it costs in a particular wire format. The optimal parser only
//! ever compares sums of prices, so any consistent unit works; every codec
//! in this workspace prices in bits, flag bits included.

use crate::model::Match;

/// Cost of encoding one literal unit or one match.
pub trait PriceModel {
    /// Price of `candidate`, or of a single literal unit when `None`.
    fn price(&self, candidate: Option<&Match>) -> u32;
}

impl<F> PriceModel for F
where
    F: Fn(Option<&Match>) -> u32,
{
    fn price(&self, candidate: Option<&Match>) -> u32 {
        self(candidate)
    }
}

/// Price model with a constant literal and match cost.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FixedPrice {
    /// Bits per literal unit.
    pub literal: u32,
    /// Bits per match.
    pub matched: u32,
}

impl FixedPrice {
    /// Create a fixed price model.
    pub const fn new(literal: u32, matched: u32) -> Self {
        Self { literal, matched }
    }
}

impl PriceModel for FixedPrice {
    fn price(&self, candidate: Option<&Match>) -> u32 {
        match candidate {
            None => self.literal,
            Some(_) => self.matched,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_closure_price() {
        let model = |m: Option<&Match>| m.map_or(9, |m| if m.length > 0x12 { 25 } else { 17 });
        assert_eq!(model.price(None), 9);
        assert_eq!(model.price(Some(&Match::new(0, 1, 3))), 17);
        assert_eq!(model.price(Some(&Match::new(0, 1, 0x20))), 25);
    }

    #[test]
    fn test_fixed_price() {
        let model = FixedPrice::new(9, 17);
        assert_eq!(model.price(None), 9);
        assert_eq!(model.price(Some(&Match::new(4, 2, 8))), 17);
    }
}
