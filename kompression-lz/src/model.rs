//! Matches, tokens and the constraint set shared by every finder.

use kompression_core::{KompressionError, Result};

/// A back-reference candidate.
///
/// `position` is relative to the start of the input being compressed; the
/// referenced run starts `displacement` bytes earlier and may overlap the
/// match itself when `length > displacement`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Match {
    /// Input position the match starts at.
    pub position: usize,
    /// Distance back to the referenced run.
    pub displacement: usize,
    /// Number of bytes copied.
    pub length: usize,
    /// Literal bytes stored after the match for formats that always follow
    /// a match with a literal.
    pub discrepancy: Option<Vec<u8>>,
}

impl Match {
    /// Create a match without trailing literals.
    pub fn new(position: usize, displacement: usize, length: usize) -> Self {
        Self {
            position,
            displacement,
            length,
            discrepancy: None,
        }
    }

    /// Number of input bytes covered, trailing literals included.
    pub fn span(&self) -> usize {
        self.length + self.discrepancy.as_ref().map_or(0, Vec::len)
    }
}

/// One element of a parse.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Token {
    /// A single literal byte.
    Literal(u8),
    /// A back-reference.
    Match(Match),
}

impl Token {
    /// Number of input bytes covered by the token.
    pub fn span(&self) -> usize {
        match self {
            Token::Literal(_) => 1,
            Token::Match(m) => m.span(),
        }
    }

    /// Rebuild the bytes a token stream describes.
    ///
    /// Used by tests and debug assertions to check that a parse is an exact
    /// partition of its input.
    pub fn replay(tokens: &[Token], pre_buffer: usize) -> Result<Vec<u8>> {
        let mut history = kompression_core::History::new().primed(pre_buffer);
        for token in tokens {
            match token {
                Token::Literal(b) => history.push(*b)?,
                Token::Match(m) => {
                    history.copy_match(m.displacement, m.length)?;
                    if let Some(bytes) = &m.discrepancy {
                        history.extend_from_slice(bytes)?;
                    }
                }
            }
        }
        Ok(history.into_output())
    }
}

/// Constraints a codec places on the matches it can encode.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct FindLimits {
    /// Shortest encodable match.
    pub min_length: usize,
    /// Longest encodable match.
    pub max_length: usize,
    /// Smallest encodable displacement.
    pub min_displacement: usize,
    /// Largest encodable displacement (the window size).
    pub max_displacement: usize,
    /// Granularity of positions, lengths and displacements.
    pub unit_size: usize,
}

impl FindLimits {
    /// Create a byte-granular constraint set.
    pub const fn new(
        min_length: usize,
        max_length: usize,
        min_displacement: usize,
        max_displacement: usize,
    ) -> Self {
        Self {
            min_length,
            max_length,
            min_displacement,
            max_displacement,
            unit_size: 1,
        }
    }

    /// Same constraints with a different unit size.
    pub const fn with_unit_size(mut self, unit_size: usize) -> Self {
        self.unit_size = unit_size;
        self
    }

    /// Check the constraint set is usable.
    pub fn validate(&self) -> Result<()> {
        if self.unit_size == 0 {
            return Err(KompressionError::configuration("unit size must be positive"));
        }
        if self.min_length == 0 || self.min_displacement == 0 {
            return Err(KompressionError::configuration(
                "minimum length and displacement must be positive",
            ));
        }
        if self.min_length > self.max_length {
            return Err(KompressionError::configuration(format!(
                "minimum length {} exceeds maximum length {}",
                self.min_length, self.max_length
            )));
        }
        if self.min_displacement > self.max_displacement {
            return Err(KompressionError::configuration(format!(
                "minimum displacement {} exceeds maximum displacement {}",
                self.min_displacement, self.max_displacement
            )));
        }
        let unit = self.unit_size;
        if [
            self.min_length,
            self.max_length,
            self.min_displacement,
            self.max_displacement,
        ]
        .iter()
        .any(|v| v % unit != 0)
        {
            return Err(KompressionError::configuration(format!(
                "lengths and displacements must be multiples of the unit size {unit}"
            )));
        }
        Ok(())
    }

    /// Whether a (displacement, length) pair satisfies the constraints.
    pub fn accepts(&self, displacement: usize, length: usize) -> bool {
        (self.min_length..=self.max_length).contains(&length)
            && (self.min_displacement..=self.max_displacement).contains(&displacement)
            && length % self.unit_size == 0
            && displacement % self.unit_size == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate() {
        assert!(FindLimits::new(3, 0x12, 1, 0x1000).validate().is_ok());
        assert!(FindLimits::new(0, 0x12, 1, 0x1000).validate().is_err());
        assert!(FindLimits::new(3, 2, 1, 0x1000).validate().is_err());
        assert!(FindLimits::new(3, 0x12, 8, 4).validate().is_err());
        assert!(FindLimits::new(4, 0x42, 2, 0xFFE)
            .with_unit_size(2)
            .validate()
            .is_ok());
        assert!(FindLimits::new(3, 0x42, 2, 0xFFE)
            .with_unit_size(2)
            .validate()
            .is_err());
    }

    #[test]
    fn test_accepts() {
        let limits = FindLimits::new(3, 0x12, 1, 0x1000);
        assert!(limits.accepts(1, 3));
        assert!(limits.accepts(0x1000, 0x12));
        assert!(!limits.accepts(0, 3));
        assert!(!limits.accepts(1, 0x13));
    }

    #[test]
    fn test_replay_with_discrepancy() {
        let tokens = vec![
            Token::Literal(b'a'),
            Token::Match(Match {
                position: 1,
                displacement: 1,
                length: 3,
                discrepancy: Some(vec![b'b']),
            }),
        ];
        assert_eq!(tokens[1].span(), 4);
        assert_eq!(Token::replay(&tokens, 0).unwrap(), b"aaaab");
    }
}
