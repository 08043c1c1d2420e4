//! Deflate length and distance slots (RFC 1951 section 3.2.5).
//!
//! A length or distance is sent as a slot symbol plus extra bits. Deflate
//! itself and the Taiko LZ81 hybrid share these tables.

use kompression_core::{KompressionError, Result};

/// Shortest length.
pub(crate) const MIN_LENGTH: usize = 3;
/// Longest length.
pub(crate) const MAX_LENGTH: usize = 258;
/// Largest distance.
pub(crate) const MAX_DISTANCE: usize = 0x8000;

/// Base length per slot.
pub(crate) const LENGTH_BASE: [u16; 29] = [
    3, 4, 5, 6, 7, 8, 9, 10, 11, 13, 15, 17, 19, 23, 27, 31, 35, 43, 51, 59, 67, 83, 99, 115, 131,
    163, 195, 227, 258,
];

/// Extra bits per length slot.
pub(crate) const LENGTH_EXTRA_BITS: [u8; 29] = [
    0, 0, 0, 0, 0, 0, 0, 0, 1, 1, 1, 1, 2, 2, 2, 2, 3, 3, 3, 3, 4, 4, 4, 4, 5, 5, 5, 5, 0,
];

/// Base distance per slot.
pub(crate) const DISTANCE_BASE: [u16; 30] = [
    1, 2, 3, 4, 5, 7, 9, 13, 17, 25, 33, 49, 65, 97, 129, 193, 257, 385, 513, 769, 1025, 1537,
    2049, 3073, 4097, 6145, 8193, 12289, 16385, 24577,
];

/// Extra bits per distance slot.
pub(crate) const DISTANCE_EXTRA_BITS: [u8; 30] = [
    0, 0, 0, 0, 1, 1, 2, 2, 3, 3, 4, 4, 5, 5, 6, 6, 7, 7, 8, 8, 9, 9, 10, 10, 11, 11, 12, 12, 13,
    13,
];

/// A value split into slot and extra bits.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct Slot {
    pub index: usize,
    pub extra_bits: u8,
    pub extra: u32,
}

fn split(value: usize, base: &[u16], extra_bits: &[u8]) -> Slot {
    let index = base.partition_point(|&b| b as usize <= value).saturating_sub(1);
    Slot {
        index,
        extra_bits: extra_bits[index],
        extra: (value - base[index] as usize) as u32,
    }
}

/// Slot of a match length in `3..=258`.
pub(crate) fn length_slot(length: usize) -> Slot {
    split(length, &LENGTH_BASE, &LENGTH_EXTRA_BITS)
}

/// Slot of a distance in `1..=0x8000`.
pub(crate) fn distance_slot(distance: usize) -> Slot {
    split(distance, &DISTANCE_BASE, &DISTANCE_EXTRA_BITS)
}

/// Base length and extra bit count of a decoded length slot.
pub(crate) fn length_base(index: usize) -> Result<(usize, u8)> {
    match (LENGTH_BASE.get(index), LENGTH_EXTRA_BITS.get(index)) {
        (Some(&base), Some(&bits)) => Ok((base as usize, bits)),
        _ => Err(KompressionError::invalid_header(format!(
            "length slot {index} out of range"
        ))),
    }
}

/// Base distance and extra bit count of a decoded distance slot.
pub(crate) fn distance_base(index: usize) -> Result<(usize, u8)> {
    match (DISTANCE_BASE.get(index), DISTANCE_EXTRA_BITS.get(index)) {
        (Some(&base), Some(&bits)) => Ok((base as usize, bits)),
        _ => Err(KompressionError::invalid_header(format!(
            "distance slot {index} out of range"
        ))),
    }
}

/// Extra bits a match costs on top of its slot symbols.
pub(crate) fn extra_cost(length: usize, distance: usize) -> u32 {
    (length_slot(length).extra_bits + distance_slot(distance).extra_bits) as u32
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_length_slots() {
        assert_eq!(length_slot(3), Slot { index: 0, extra_bits: 0, extra: 0 });
        assert_eq!(length_slot(12), Slot { index: 8, extra_bits: 1, extra: 1 });
        assert_eq!(length_slot(257), Slot { index: 27, extra_bits: 5, extra: 30 });
        assert_eq!(length_slot(258), Slot { index: 28, extra_bits: 0, extra: 0 });
    }

    #[test]
    fn test_distance_slots() {
        assert_eq!(distance_slot(1).index, 0);
        assert_eq!(distance_slot(6), Slot { index: 4, extra_bits: 1, extra: 1 });
        assert_eq!(distance_slot(0x8000), Slot { index: 29, extra_bits: 13, extra: 8191 });
    }

    #[test]
    fn test_every_value_fits_its_slot() {
        for length in MIN_LENGTH..=MAX_LENGTH {
            let slot = length_slot(length);
            let (base, bits) = length_base(slot.index).unwrap();
            assert_eq!(base + slot.extra as usize, length);
            assert!(slot.extra < 1 << bits);
        }
        for distance in 1..=MAX_DISTANCE {
            let slot = distance_slot(distance);
            let (base, bits) = distance_base(slot.index).unwrap();
            assert_eq!(base + slot.extra as usize, distance);
            assert!(slot.extra < 1 << bits);
        }
        assert!(length_base(29).is_err());
        assert!(distance_base(30).is_err());
    }
}
