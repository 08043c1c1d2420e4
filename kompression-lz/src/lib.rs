//! # Kompression LZ
//!
//! The LZ engine shared by every codec variant:
//!
//! - [`model`]: matches, tokens and constraint sets
//! - [`finders`]: naive window, Ukkonen suffix tree and SA-IS suffix array
//! - [`price`]: per-format cost models
//! - [`parser`]: the cost-based optimal parser
//!
//! A codec only declares its constraints and a price model; the engine
//! returns the cheapest token stream, which the codec then serializes.
//!
//! ## Example
//!
//! ```rust
//! use kompression_lz::finders::MatchStrategy;
//! use kompression_lz::model::{FindLimits, Match, Token};
//! use kompression_lz::parser::{OptimalParser, ParseOptions};
//! use kompression_lz::price::FixedPrice;
//!
//! let limits = FindLimits::new(3, 0x12, 1, 0x1000);
//! let finder = MatchStrategy::Naive.finder(limits).unwrap();
//! let mut parser = OptimalParser::new(vec![finder], ParseOptions::default()).unwrap();
//!
//! let outcome = parser.parse(b"ABABABABAB", &FixedPrice::new(9, 17)).unwrap();
//! assert_eq!(outcome.tokens[2], Token::Match(Match::new(2, 2, 8)));
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![allow(clippy::module_name_repetitions)]

pub mod finders;
pub mod model;
pub mod parser;
pub mod price;

pub use finders::{
    MatchFinder, MatchStrategy, NaiveWindowFinder, SuffixArray, SuffixArrayFinder, SuffixTree,
    SuffixTreeFinder,
};
pub use model::{FindLimits, Match, Token};
pub use parser::{NICE_LENGTH_DEFAULT, OptimalParser, ParseOptions, ParseOutcome, total_cost};
pub use price::{FixedPrice, PriceModel};
