//! All finders must agree: longest match, ties to the closest source.

use kompression_lz::{
    FindLimits, FixedPrice, MatchFinder, MatchStrategy, NaiveWindowFinder, OptimalParser,
    ParseOptions, SuffixArrayFinder, SuffixTreeFinder, Token,
};
use proptest::prelude::*;

fn all_matches(finder: &mut dyn MatchFinder, data: &[u8]) -> Vec<Vec<kompression_lz::Match>> {
    finder.prepare(data).unwrap();
    (0..data.len()).map(|at| finder.find_matches(data, at)).collect()
}

fn assert_finders_agree(data: &[u8], limits: FindLimits) {
    let expected = all_matches(&mut NaiveWindowFinder::new(limits).unwrap(), data);

    let from_array = all_matches(&mut SuffixArrayFinder::new(limits).unwrap(), data);
    assert_eq!(expected, from_array, "suffix array differs for {limits:?}");

    if limits.max_displacement >= data.len() {
        let from_tree = all_matches(&mut SuffixTreeFinder::new(limits).unwrap(), data);
        assert_eq!(expected, from_tree, "suffix tree differs for {limits:?}");
    }
}

fn sample_inputs() -> Vec<Vec<u8>> {
    vec![
        b"ABABABABAB".to_vec(),
        b"abracadabra abracadabra cadabra".to_vec(),
        vec![0u8; 300],
        b"The quick brown fox jumps over the lazy dog. ".repeat(12),
        (0..2000u32).map(|i| (i * i % 7) as u8).collect(),
        (0..1500u32)
            .map(|i| (i.wrapping_mul(2654435761) >> 29) as u8)
            .collect(),
    ]
}

#[test]
fn test_equivalence_full_window() {
    for data in sample_inputs() {
        assert_finders_agree(&data, FindLimits::new(3, 0x12, 1, 0x1000));
        assert_finders_agree(&data, FindLimits::new(2, 0x111, 1, 0x1000));
    }
}

#[test]
fn test_equivalence_min_displacement() {
    for data in sample_inputs() {
        assert_finders_agree(&data, FindLimits::new(3, 0x12, 3, 0x1002));
        assert_finders_agree(&data, FindLimits::new(3, 0x41, 5, 0x1004));
    }
}

#[test]
fn test_equivalence_small_window() {
    for data in sample_inputs() {
        assert_finders_agree(&data, FindLimits::new(3, 0x12, 1, 0x40));
        assert_finders_agree(&data, FindLimits::new(2, 5, 1, 16));
    }
}

#[test]
fn test_identical_token_streams() {
    let limits = FindLimits::new(3, 0x12, 1, 0x1000);
    let price = FixedPrice::new(9, 17);
    for data in sample_inputs() {
        let streams: Vec<Vec<Token>> = [
            MatchStrategy::Naive,
            MatchStrategy::SuffixTree,
            MatchStrategy::SuffixArray,
        ]
        .iter()
        .map(|strategy| {
            let finder = strategy.finder(limits).unwrap();
            let mut parser = OptimalParser::new(vec![finder], ParseOptions::default()).unwrap();
            parser.parse(&data, &price).unwrap().tokens
        })
        .collect();

        assert_eq!(streams[0], streams[1]);
        assert_eq!(streams[0], streams[2]);
        assert_eq!(Token::replay(&streams[0], 0).unwrap(), data);
    }
}

#[test]
fn test_tree_rejects_short_window() {
    let limits = FindLimits::new(3, 0x12, 1, 0x1000);
    let finder = MatchStrategy::SuffixTree.finder(limits).unwrap();
    let mut parser = OptimalParser::new(vec![finder], ParseOptions::default()).unwrap();
    let err = parser
        .parse(&vec![1u8; 0x1001], &FixedPrice::new(9, 17))
        .unwrap_err();
    assert!(err.is_configuration());
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    #[test]
    fn prop_finders_agree(
        data in proptest::collection::vec(0u8..4, 0..400),
        min_length in 2usize..5,
        extra in 0usize..40,
        min_displacement in 1usize..4,
    ) {
        let limits = FindLimits::new(min_length, min_length + extra, min_displacement, 0x1000);
        assert_finders_agree(&data, limits);
    }

    #[test]
    fn prop_windowed_finders_agree(
        data in proptest::collection::vec(0u8..3, 0..400),
        window in 1usize..64,
    ) {
        let limits = FindLimits::new(2, 0x20, 1, window);
        let expected = all_matches(&mut NaiveWindowFinder::new(limits).unwrap(), &data);
        let actual = all_matches(&mut SuffixArrayFinder::new(limits).unwrap(), &data);
        prop_assert_eq!(expected, actual);
    }
}
