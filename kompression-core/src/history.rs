//! Decode history for LZ back-references.
//!
//! Every decoder in the library produces its whole output in memory, so the
//! history is the output itself, optionally preceded by a run of zero bytes
//! for formats whose window starts out primed (the 4 KiB ring of
//! Okumura-style LZSS). Each copy is validated against what has actually been
//! produced and against the declared output size.

use crate::error::{KompressionError, Result};

/// Most bytes reserved ahead of the data that fills them. Declared sizes
/// come from untrusted headers.
const MAX_RESERVE: usize = 1 << 20;

/// Output buffer doubling as the back-reference window.
#[derive(Debug, Clone)]
pub struct History {
    /// Primed bytes followed by the produced output.
    buffer: Vec<u8>,
    /// Number of primed bytes at the front of `buffer`.
    prefix: usize,
    /// Declared output size, if any.
    limit: Option<usize>,
}

impl History {
    /// Create an empty history without a size limit.
    pub fn new() -> Self {
        Self {
            buffer: Vec::new(),
            prefix: 0,
            limit: None,
        }
    }

    /// Create a history whose output must not exceed `limit` bytes.
    pub fn with_limit(limit: usize) -> Self {
        let mut history = Self::new();
        history.buffer.reserve(limit.min(MAX_RESERVE));
        history.limit = Some(limit);
        history
    }

    /// Prime the window with `prefix` zero bytes that are never output.
    pub fn primed(mut self, prefix: usize) -> Self {
        let mut buffer = vec![0u8; prefix];
        buffer.append(&mut self.buffer);
        self.buffer = buffer;
        self.prefix += prefix;
        self
    }

    /// Number of output bytes produced so far.
    pub fn len(&self) -> usize {
        self.buffer.len() - self.prefix
    }

    /// Whether no output has been produced.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Declared output size, if any.
    pub fn limit(&self) -> Option<usize> {
        self.limit
    }

    /// Whether the declared size has been reached.
    pub fn is_full(&self) -> bool {
        self.limit.is_some_and(|limit| self.len() >= limit)
    }

    fn check_room(&self, count: usize) -> Result<()> {
        let wanted = self.len().saturating_add(count);
        match self.limit {
            Some(limit) if wanted > limit => Err(KompressionError::size_mismatch(limit, wanted)),
            _ => Ok(()),
        }
    }

    /// Append one literal byte.
    #[inline]
    pub fn push(&mut self, byte: u8) -> Result<()> {
        self.check_room(1)?;
        self.buffer.push(byte);
        Ok(())
    }

    /// Append literal bytes.
    pub fn extend_from_slice(&mut self, bytes: &[u8]) -> Result<()> {
        self.check_room(bytes.len())?;
        self.buffer.extend_from_slice(bytes);
        Ok(())
    }

    /// Append `count` copies of `byte`.
    pub fn fill(&mut self, byte: u8, count: usize) -> Result<()> {
        self.check_room(count)?;
        self.buffer.resize(self.buffer.len() + count, byte);
        Ok(())
    }

    /// Copy `length` bytes starting `distance` bytes back.
    ///
    /// `length` may exceed `distance`; the copy then repeats the bytes it has
    /// just produced.
    pub fn copy_match(&mut self, distance: usize, length: usize) -> Result<()> {
        if distance == 0 || distance > self.buffer.len() {
            return Err(KompressionError::invalid_distance(
                distance,
                self.buffer.len(),
            ));
        }
        self.check_room(length)?;

        let start = self.buffer.len() - distance;
        if length <= distance {
            self.buffer.extend_from_within(start..start + length);
        } else {
            self.buffer.reserve(length.min(MAX_RESERVE));
            for i in 0..length {
                let byte = self.buffer[start + i];
                self.buffer.push(byte);
            }
        }
        Ok(())
    }

    /// Produced output.
    pub fn output(&self) -> &[u8] {
        &self.buffer[self.prefix..]
    }

    /// Return the output, requiring the declared size to have been reached.
    pub fn finish(self) -> Result<Vec<u8>> {
        if let Some(limit) = self.limit {
            if self.len() != limit {
                return Err(KompressionError::size_mismatch(limit, self.len()));
            }
        }
        Ok(self.into_output())
    }

    /// Return the output regardless of the declared size.
    pub fn into_output(mut self) -> Vec<u8> {
        self.buffer.drain(..self.prefix);
        self.buffer
    }
}

impl Default for History {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_copy_non_overlapping() {
        let mut history = History::new();
        history.extend_from_slice(b"Hello").unwrap();
        history.copy_match(5, 5).unwrap();
        assert_eq!(history.output(), b"HelloHello");
    }

    #[test]
    fn test_copy_overlap_single_byte() {
        let mut history = History::new();
        history.push(b'X').unwrap();
        history.copy_match(1, 10).unwrap();
        assert_eq!(history.into_output(), vec![b'X'; 11]);
    }

    #[test]
    fn test_copy_overlap_pattern() {
        let mut history = History::new();
        history.extend_from_slice(b"AB").unwrap();
        history.copy_match(2, 6).unwrap();
        assert_eq!(history.output(), b"ABABABAB");
    }

    #[test]
    fn test_invalid_distance() {
        let mut history = History::new();
        assert!(history.copy_match(1, 1).is_err());
        history.push(1).unwrap();
        assert!(matches!(
            history.copy_match(2, 1),
            Err(KompressionError::InvalidDistance {
                distance: 2,
                history_size: 1
            })
        ));
        assert!(history.copy_match(0, 1).is_err());
    }

    #[test]
    fn test_primed_window() {
        let mut history = History::with_limit(4).primed(16);
        history.push(7).unwrap();
        history.copy_match(3, 3).unwrap();
        assert_eq!(history.len(), 4);
        assert!(history.is_full());
        assert_eq!(history.finish().unwrap(), vec![7, 0, 0, 7]);
    }

    #[test]
    fn test_limit_enforced() {
        let mut history = History::with_limit(2);
        history.extend_from_slice(b"ab").unwrap();
        assert!(matches!(
            history.push(b'c'),
            Err(KompressionError::SizeMismatch { .. })
        ));
        assert!(history.copy_match(1, 1).is_err());

        let short = History::with_limit(3);
        assert!(short.finish().is_err());
    }

    #[test]
    fn test_huge_declared_size() {
        let mut history = History::with_limit(usize::MAX);
        assert!(history.buffer.capacity() <= MAX_RESERVE);
        history.extend_from_slice(b"ok").unwrap();
        assert!(matches!(
            history.finish(),
            Err(KompressionError::SizeMismatch { actual: 2, .. })
        ));
    }
}
