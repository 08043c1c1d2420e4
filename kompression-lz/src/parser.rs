//! Cost-based optimal parsing.
//!
//! The parser turns the candidates reported by one or more finders into the
//! cheapest token stream covering the input. It runs in two passes:
//!
//! 1. **Forward**: every finder is queried at every unit position and the
//!    candidates are pooled per position.
//! 2. **Backward**: a shortest-path fill over positions,
//!    `cost[n] = 0` and
//!    `cost[i] = min(price(literal) + cost[i + unit],
//!                   price(m) + cost[i + len(m) + trailing])`
//!    for every candidate `m` at `i` and every encodable length up to the
//!    candidate's. Ties prefer the longer step, then the smaller
//!    displacement.
//!
//! A zero-filled pre-buffer may precede the input; matches can reference it
//! but it never produces tokens. Formats with end-of-block rules can keep
//! the last bytes literal and forbid matches that start too close to the
//! end.

use crate::finders::MatchFinder;
use crate::model::{Match, Token};
use crate::price::PriceModel;
use kompression_core::{KompressionError, Result};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use tracing::{debug, trace};

/// Default threshold above which matches are only tried at full length.
pub const NICE_LENGTH_DEFAULT: usize = 0x100;

/// Parser settings beyond the finders themselves.
#[derive(Debug, Clone, Default)]
pub struct ParseOptions {
    /// Zero bytes logically preceding the input.
    pub pre_buffer_size: usize,
    /// Literal bytes that must follow every match.
    pub trailing_literals: usize,
    /// Bytes at the end of the input that no match may cover.
    pub tail_literals: usize,
    /// No match may start within this many bytes of the end.
    pub tail_match_margin: usize,
    /// Matches longer than this are only tried at their full length.
    pub nice_length: Option<usize>,
    /// Checked once per position; set it to abandon the parse.
    pub cancel: Option<Arc<AtomicBool>>,
}

impl ParseOptions {
    /// Options with a zero pre-buffer of `size` bytes.
    pub fn with_pre_buffer(mut self, size: usize) -> Self {
        self.pre_buffer_size = size;
        self
    }

    /// Options with `count` literals after every match.
    pub fn with_trailing_literals(mut self, count: usize) -> Self {
        self.trailing_literals = count;
        self
    }

    /// Options keeping the last `literals` bytes literal and refusing
    /// matches that start fewer than `match_margin` bytes from the end.
    pub fn with_tail(mut self, literals: usize, match_margin: usize) -> Self {
        self.tail_literals = literals;
        self.tail_match_margin = match_margin;
        self
    }

    /// Options with a nice length.
    pub fn with_nice_length(mut self, nice_length: Option<usize>) -> Self {
        self.nice_length = nice_length;
        self
    }

    /// Options with a cancellation flag.
    pub fn with_cancel(mut self, cancel: Option<Arc<AtomicBool>>) -> Self {
        self.cancel = cancel;
        self
    }

    fn check_cancelled(&self) -> Result<()> {
        match &self.cancel {
            Some(flag) if flag.load(Ordering::Relaxed) => Err(KompressionError::Cancelled),
            _ => Ok(()),
        }
    }
}

/// Result of a parse.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseOutcome {
    /// Tokens covering the input in order.
    pub tokens: Vec<Token>,
    /// Sum of the prices of all tokens.
    pub cost: u64,
}

/// A pooled candidate and the shortest length its finder allows.
#[derive(Debug, Clone)]
struct Candidate {
    displacement: usize,
    length: usize,
    min_length: usize,
}

#[derive(Debug, Clone, Copy)]
enum Step {
    Literal,
    Match { displacement: usize, length: usize },
}

/// Optimal parser over a set of finders.
#[derive(Debug)]
pub struct OptimalParser {
    finders: Vec<Box<dyn MatchFinder>>,
    options: ParseOptions,
    unit: usize,
}

impl OptimalParser {
    /// Create a parser. All finders must share one unit size.
    pub fn new(finders: Vec<Box<dyn MatchFinder>>, options: ParseOptions) -> Result<Self> {
        let unit = finders.first().map_or(1, |f| f.limits().unit_size);
        if finders.iter().any(|f| f.limits().unit_size != unit) {
            return Err(KompressionError::configuration(
                "all finders of a parser must share one unit size",
            ));
        }
        if options.pre_buffer_size % unit != 0 {
            return Err(KompressionError::configuration(format!(
                "pre-buffer of {} bytes is not a multiple of the unit size {unit}",
                options.pre_buffer_size
            )));
        }
        Ok(Self {
            finders,
            options,
            unit,
        })
    }

    /// Parser options.
    pub fn options(&self) -> &ParseOptions {
        &self.options
    }

    /// Find the cheapest token stream for `input`.
    pub fn parse(&mut self, input: &[u8], price: &dyn PriceModel) -> Result<ParseOutcome> {
        let candidates = self.collect_candidates(input)?;
        let n = input.len();
        let unit = self.unit;
        let trailing = self.options.trailing_literals;

        let mut cost = vec![u64::MAX; n + 1];
        let mut steps = vec![Step::Literal; n + 1];
        cost[n] = 0;

        let literal_price = price.price(None) as u64;
        let mut trial = Match::new(0, 0, 0);

        for i in (0..n).step_by(unit).rev() {
            self.options.check_cancelled()?;

            let literal_span = unit.min(n - i);
            let mut best_cost = literal_price + cost[i + literal_span];
            let mut best_span = literal_span;
            let mut best_step = Step::Literal;
            let mut best_displacement = 0;

            for candidate in &candidates[i / unit] {
                trial.position = i;
                trial.displacement = candidate.displacement;

                let full_only = self
                    .options
                    .nice_length
                    .is_some_and(|nice| candidate.length > nice);
                let first = if full_only {
                    candidate.length
                } else {
                    candidate.min_length
                };

                for length in (first..=candidate.length).step_by(unit) {
                    let target = i + length + trailing;
                    if target > n {
                        break;
                    }
                    trial.length = length;
                    let total = price.price(Some(&trial)) as u64 + cost[target];
                    let span = length + trailing;
                    let better = total < best_cost
                        || (total == best_cost
                            && (span > best_span
                                || (span == best_span
                                    && candidate.displacement < best_displacement)));
                    if better {
                        best_cost = total;
                        best_span = span;
                        best_displacement = candidate.displacement;
                        best_step = Step::Match {
                            displacement: candidate.displacement,
                            length,
                        };
                    }
                }
            }

            cost[i] = best_cost;
            steps[i] = best_step;
        }

        let tokens = self.emit(input, &steps);
        debug!(
            input = n,
            tokens = tokens.len(),
            cost = cost[0],
            "optimal parse complete"
        );
        Ok(ParseOutcome {
            tokens,
            cost: cost[0],
        })
    }

    /// Always take the longest candidate; used as a baseline.
    pub fn parse_greedy(&mut self, input: &[u8], price: &dyn PriceModel) -> Result<ParseOutcome> {
        let candidates = self.collect_candidates(input)?;
        let n = input.len();
        let unit = self.unit;
        let trailing = self.options.trailing_literals;

        let mut steps = vec![Step::Literal; n + 1];
        let mut i = 0;
        while i < n {
            let best = candidates[i / unit]
                .iter()
                .filter(|c| i + c.length + trailing <= n)
                .max_by(|a, b| {
                    a.length
                        .cmp(&b.length)
                        .then(b.displacement.cmp(&a.displacement))
                });
            match best {
                Some(c) => {
                    steps[i] = Step::Match {
                        displacement: c.displacement,
                        length: c.length,
                    };
                    i += c.length + trailing;
                }
                None => i += unit.min(n - i),
            }
        }

        let tokens = self.emit(input, &steps);
        let cost = total_cost(&tokens, unit, price);
        Ok(ParseOutcome { tokens, cost })
    }

    fn collect_candidates(&mut self, input: &[u8]) -> Result<Vec<Vec<Candidate>>> {
        let pre = self.options.pre_buffer_size;
        let mut data = vec![0u8; pre];
        data.extend_from_slice(input);

        for finder in &mut self.finders {
            finder.prepare(&data)?;
        }

        let n = input.len();
        let unit = self.unit;
        let trailing = self.options.trailing_literals;
        let mut candidates: Vec<Vec<Candidate>> = vec![Vec::new(); n.div_ceil(unit)];
        let mut found = 0usize;

        for i in (0..n).step_by(unit) {
            self.options.check_cancelled()?;
            // Leave room for the literals that must follow.
            let room = if n - i < self.options.tail_match_margin {
                0
            } else {
                (n - i).saturating_sub(trailing + self.options.tail_literals)
            };
            for finder in &mut self.finders {
                let min_length = finder.limits().min_length;
                for m in finder.find_matches(&data, pre + i) {
                    let length = m.length.min(room);
                    let length = length - length % unit;
                    if length < min_length {
                        continue;
                    }
                    candidates[i / unit].push(Candidate {
                        displacement: m.displacement,
                        length,
                        min_length,
                    });
                    found += 1;
                }
            }
        }

        trace!(input = n, candidates = found, "collected match candidates");
        Ok(candidates)
    }

    fn emit(&self, input: &[u8], steps: &[Step]) -> Vec<Token> {
        let n = input.len();
        let trailing = self.options.trailing_literals;
        let mut tokens = Vec::new();
        let mut i = 0;
        while i < n {
            match steps[i] {
                Step::Literal => {
                    let end = (i + self.unit).min(n);
                    tokens.extend(input[i..end].iter().map(|&b| Token::Literal(b)));
                    i = end;
                }
                Step::Match {
                    displacement,
                    length,
                } => {
                    let discrepancy = (trailing > 0)
                        .then(|| input[i + length..i + length + trailing].to_vec());
                    tokens.push(Token::Match(Match {
                        position: i,
                        displacement,
                        length,
                        discrepancy,
                    }));
                    i += length + trailing;
                }
            }
        }
        tokens
    }
}

/// Price a token stream. Literal tokens are grouped into units.
pub fn total_cost(tokens: &[Token], unit: usize, price: &dyn PriceModel) -> u64 {
    let literals = tokens
        .iter()
        .filter(|t| matches!(t, Token::Literal(_)))
        .count();
    let literal_units = literals.div_ceil(unit.max(1)) as u64;
    let matches: u64 = tokens
        .iter()
        .filter_map(|t| match t {
            Token::Match(m) => Some(price.price(Some(m)) as u64),
            Token::Literal(_) => None,
        })
        .sum();
    literal_units * price.price(None) as u64 + matches
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::finders::{MatchStrategy, NaiveWindowFinder};
    use crate::model::FindLimits;
    use crate::price::FixedPrice;

    const LZ10_LIMITS: FindLimits = FindLimits::new(3, 0x12, 1, 0x1000);

    fn naive_parser(limits: FindLimits, options: ParseOptions) -> OptimalParser {
        OptimalParser::new(
            vec![Box::new(NaiveWindowFinder::new(limits).unwrap())],
            options,
        )
        .unwrap()
    }

    #[test]
    fn test_abab_scenario() {
        let mut parser = naive_parser(LZ10_LIMITS, ParseOptions::default());
        let outcome = parser
            .parse(b"ABABABABAB", &FixedPrice::new(9, 17))
            .unwrap();
        assert_eq!(
            outcome.tokens,
            vec![
                Token::Literal(b'A'),
                Token::Literal(b'B'),
                Token::Match(Match::new(2, 2, 8)),
            ]
        );
        assert_eq!(outcome.cost, 9 + 9 + 17);
    }

    #[test]
    fn test_empty_and_single() {
        let mut parser = naive_parser(LZ10_LIMITS, ParseOptions::default());
        let price = FixedPrice::new(9, 17);
        assert!(parser.parse(b"", &price).unwrap().tokens.is_empty());
        assert_eq!(
            parser.parse(b"x", &price).unwrap().tokens,
            vec![Token::Literal(b'x')]
        );
    }

    #[test]
    fn test_pre_buffer_references() {
        let options = ParseOptions::default().with_pre_buffer(0x10);
        let mut parser = naive_parser(LZ10_LIMITS, options);
        let outcome = parser.parse(&[0u8; 6], &FixedPrice::new(9, 17)).unwrap();
        assert_eq!(outcome.tokens.len(), 1);
        let Token::Match(m) = &outcome.tokens[0] else {
            panic!("expected a match");
        };
        assert_eq!(m.length, 6);
        assert_eq!(Token::replay(&outcome.tokens, 0x10).unwrap(), vec![0u8; 6]);
    }

    #[test]
    fn test_trailing_literals() {
        let options = ParseOptions::default().with_trailing_literals(1);
        let mut parser = naive_parser(FindLimits::new(2, 0xFF, 1, 0xFF), options);
        let input = b"abcabcabcX";
        let outcome = parser.parse(input, &FixedPrice::new(9, 24)).unwrap();
        for token in &outcome.tokens {
            if let Token::Match(m) = token {
                assert_eq!(m.discrepancy.as_ref().map(Vec::len), Some(1));
            }
        }
        assert_eq!(Token::replay(&outcome.tokens, 0).unwrap(), input);
    }

    #[test]
    fn test_tail_constraints() {
        let options = ParseOptions::default().with_tail(5, 12);
        let mut parser = naive_parser(FindLimits::new(4, 0xFFFF, 1, 0xFFFF), options);
        let input = [b'a'; 40];
        let outcome = parser.parse(&input, &FixedPrice::new(8, 24)).unwrap();
        assert_eq!(Token::replay(&outcome.tokens, 0).unwrap(), input);

        let mut position = 0;
        for token in &outcome.tokens {
            if let Token::Match(m) = token {
                assert!(position + 12 <= input.len());
                assert!(position + m.length + 5 <= input.len());
            }
            position += token.span();
        }
        assert!(outcome.tokens.iter().any(|t| matches!(t, Token::Match(_))));
        assert!(
            outcome.tokens[outcome.tokens.len() - 5..]
                .iter()
                .all(|t| matches!(t, Token::Literal(_)))
        );

        let short = parser.parse(&input[..12], &FixedPrice::new(8, 24)).unwrap();
        assert!(short.tokens.iter().all(|t| matches!(t, Token::Literal(_))));
    }

    #[test]
    fn test_unit_parse() {
        let limits = FindLimits::new(4, 0x42, 2, 0xFFE).with_unit_size(2);
        let mut parser = naive_parser(limits, ParseOptions::default());
        let input = b"abababababab";
        let outcome = parser.parse(input, &FixedPrice::new(17, 17)).unwrap();
        assert_eq!(Token::replay(&outcome.tokens, 0).unwrap(), input);
        assert!(matches!(outcome.tokens[2], Token::Match(_)));
    }

    #[test]
    fn test_cancellation() {
        let flag = Arc::new(AtomicBool::new(true));
        let options = ParseOptions::default().with_cancel(Some(flag));
        let mut parser = naive_parser(LZ10_LIMITS, options);
        assert!(matches!(
            parser.parse(b"some input", &FixedPrice::new(9, 17)),
            Err(KompressionError::Cancelled)
        ));
    }

    #[test]
    fn test_nice_length_keeps_full_matches() {
        let options = ParseOptions::default().with_nice_length(Some(8));
        let limits = FindLimits::new(3, 0x400, 1, 0x1000);
        let mut parser = OptimalParser::new(
            vec![MatchStrategy::SuffixArray.finder(limits).unwrap()],
            options,
        )
        .unwrap();
        let input = vec![7u8; 300];
        let outcome = parser.parse(&input, &FixedPrice::new(9, 17)).unwrap();
        assert_eq!(outcome.tokens.len(), 2);
        assert_eq!(Token::replay(&outcome.tokens, 0).unwrap(), input);
    }

    #[test]
    fn test_mixed_units_rejected() {
        let finders: Vec<Box<dyn MatchFinder>> = vec![
            Box::new(NaiveWindowFinder::new(LZ10_LIMITS).unwrap()),
            Box::new(
                NaiveWindowFinder::new(FindLimits::new(4, 0x42, 2, 0xFFE).with_unit_size(2))
                    .unwrap(),
            ),
        ];
        assert!(OptimalParser::new(finders, ParseOptions::default()).is_err());
    }
}
