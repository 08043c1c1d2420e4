//! Optimal parsing against greedy parsing and basic parse invariants.

use kompression_lz::{
    FindLimits, FixedPrice, Match, MatchStrategy, OptimalParser, ParseOptions, Token, total_cost,
};
use proptest::prelude::*;

const LZ10_LIMITS: FindLimits = FindLimits::new(3, 0x12, 1, 0x1000);
const LZ10_PRICE: FixedPrice = FixedPrice::new(9, 17);

/// Size of an LZ10 body: a flag byte per eight tokens, one byte per
/// literal, two per match.
fn lz10_body_len(tokens: &[Token]) -> usize {
    let payload: usize = tokens
        .iter()
        .map(|t| match t {
            Token::Literal(_) => 1,
            Token::Match(_) => 2,
        })
        .sum();
    tokens.len().div_ceil(8) + payload
}

fn parser(strategy: MatchStrategy) -> OptimalParser {
    OptimalParser::new(
        vec![strategy.finder(LZ10_LIMITS).unwrap()],
        ParseOptions::default(),
    )
    .unwrap()
}

#[test]
fn test_greedy_is_strictly_worse_on_adversarial_input() {
    // At offset 14 the longest match is "abc" (from offset 0), but taking one
    // literal first exposes "bcdefghij" (from offset 4).
    let input = b"abcZbcdefghijQabcdefghij";

    let optimal = parser(MatchStrategy::Naive).parse(input, &LZ10_PRICE).unwrap();
    let greedy = parser(MatchStrategy::Naive)
        .parse_greedy(input, &LZ10_PRICE)
        .unwrap();

    assert!(optimal.cost < greedy.cost);
    assert_eq!(optimal.cost, 15 * 9 + 17);
    assert_eq!(lz10_body_len(&optimal.tokens), 19);
    assert_eq!(lz10_body_len(&greedy.tokens), 20);
    assert_eq!(optimal.tokens[15], Token::Match(Match::new(15, 11, 9)));
    assert_eq!(Token::replay(&optimal.tokens, 0).unwrap(), input);
    assert_eq!(Token::replay(&greedy.tokens, 0).unwrap(), input);
}

#[test]
fn test_reported_cost_matches_tokens() {
    let input = b"The quick brown fox jumps over the lazy dog. ".repeat(20);
    let outcome = parser(MatchStrategy::SuffixArray)
        .parse(&input, &LZ10_PRICE)
        .unwrap();
    assert_eq!(outcome.cost, total_cost(&outcome.tokens, 1, &LZ10_PRICE));
}

#[test]
fn test_parse_is_deterministic() {
    let input: Vec<u8> = (0..5000u32).map(|i| (i * 31 % 17) as u8).collect();
    let first = parser(MatchStrategy::SuffixArray)
        .parse(&input, &LZ10_PRICE)
        .unwrap();
    let second = parser(MatchStrategy::SuffixArray)
        .parse(&input, &LZ10_PRICE)
        .unwrap();
    assert_eq!(first, second);
}

#[test]
fn test_multiple_finders_are_pooled() {
    // A short-range finder with cheap matches next to a long-range one.
    let near = FindLimits::new(2, 5, 1, 16);
    let far = FindLimits::new(4, 0x83, 1, 0x8000);
    let price = |m: Option<&Match>| match m {
        None => 9,
        Some(m) if m.length <= 5 && m.displacement <= 16 => 8,
        Some(_) => 24,
    };
    let mut parser = OptimalParser::new(
        vec![
            MatchStrategy::SuffixArray.finder(near).unwrap(),
            MatchStrategy::SuffixArray.finder(far).unwrap(),
        ],
        ParseOptions::default(),
    )
    .unwrap();

    let mut input = b"0123456789abcdefghijklmnopqrstuvwxyz".to_vec();
    input.extend_from_slice(b"xyxyx");
    input.extend_from_slice(b"0123456789abcdefghijklmnopqrstuvwxyz");

    let outcome = parser.parse(&input, &price).unwrap();
    assert_eq!(Token::replay(&outcome.tokens, 0).unwrap(), input);
    let matches: Vec<&Match> = outcome
        .tokens
        .iter()
        .filter_map(|t| match t {
            Token::Match(m) => Some(m),
            Token::Literal(_) => None,
        })
        .collect();
    assert!(matches.iter().any(|m| m.displacement <= 16));
    assert!(matches.iter().any(|m| m.displacement > 16));
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(48))]

    #[test]
    fn prop_optimal_never_worse_than_greedy(data in proptest::collection::vec(0u8..5, 0..500)) {
        let optimal = parser(MatchStrategy::SuffixArray).parse(&data, &LZ10_PRICE).unwrap();
        let greedy = parser(MatchStrategy::SuffixArray).parse_greedy(&data, &LZ10_PRICE).unwrap();
        prop_assert!(optimal.cost <= greedy.cost);
        prop_assert_eq!(Token::replay(&optimal.tokens, 0).unwrap(), data);
    }

    #[test]
    fn prop_tokens_respect_limits(data in proptest::collection::vec(0u8..3, 1..400)) {
        let outcome = parser(MatchStrategy::SuffixArray).parse(&data, &LZ10_PRICE).unwrap();
        let mut position = 0;
        for token in &outcome.tokens {
            if let Token::Match(m) = token {
                prop_assert_eq!(m.position, position);
                prop_assert!(LZ10_LIMITS.accepts(m.displacement, m.length));
                prop_assert!(m.displacement <= position);
            }
            position += token.span();
        }
        prop_assert_eq!(position, data.len());
    }
}
