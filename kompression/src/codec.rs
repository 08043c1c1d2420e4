//! Codec contracts.
//!
//! Every format exposes an [`Encoder`] and a [`Decoder`]. LZ formats do not
//! implement them by hand: they describe themselves as an [`LzScheme`]
//! (constraint sets, a price model and the bit layout) and are wrapped in
//! [`LzCodec`], which runs the shared finders and optimal parser.
//!
//! ```text
//! input ──► LzScheme::prepare_input ──► finders + OptimalParser ──► tokens
//!                                        (LzScheme::configure,            │
//!                                         LzScheme::price)                ▼
//! output ◄──────────────────────────────── LzScheme::serialize ◄──────────┘
//! ```

use kompression_core::Result;
use kompression_lz::{
    FindLimits, Match, MatchFinder, MatchStrategy, NICE_LENGTH_DEFAULT, OptimalParser,
    ParseOptions, Token,
};
use std::borrow::Cow;
use std::sync::Arc;
use std::sync::atomic::AtomicBool;

/// Options for a compression call.
#[derive(Debug, Clone, Default)]
pub struct CompressOptions {
    /// Match finder implementation.
    pub strategy: MatchStrategy,
    /// Overrides the format's nice length.
    pub nice_length: Option<usize>,
    /// Set to abandon the call.
    pub cancel: Option<Arc<AtomicBool>>,
}

impl CompressOptions {
    /// Default options.
    pub fn new() -> Self {
        Self::default()
    }

    /// Use a specific match finder.
    pub fn with_strategy(mut self, strategy: MatchStrategy) -> Self {
        self.strategy = strategy;
        self
    }

    /// Override the nice length.
    pub fn with_nice_length(mut self, nice_length: usize) -> Self {
        self.nice_length = Some(nice_length);
        self
    }

    /// Attach a cancellation flag.
    pub fn with_cancel(mut self, cancel: Arc<AtomicBool>) -> Self {
        self.cancel = Some(cancel);
        self
    }
}

/// Compresses whole buffers into one format.
pub trait Encoder: Send + Sync {
    /// Compress `input`.
    fn encode(&self, input: &[u8], options: &CompressOptions) -> Result<Vec<u8>>;
}

/// Decompresses whole buffers of one format.
pub trait Decoder: Send + Sync {
    /// Decompress `input`, which must be exactly the compressed range.
    fn decode(&self, input: &[u8]) -> Result<Vec<u8>>;
}

/// Engine settings declared by an LZ format.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LzConfig {
    /// One constraint set per match encoding tier.
    pub limits: &'static [FindLimits],
    /// Zero bytes the window starts out with.
    pub pre_buffer_size: usize,
    /// Literals stored with every match.
    pub trailing_literals: usize,
    /// Bytes at the end of the input that must stay literal.
    pub tail_literals: usize,
    /// Matches may not start within this many bytes of the end.
    pub tail_match_margin: usize,
    /// Matches longer than this are only tried at full length.
    pub nice_length: Option<usize>,
}

impl LzConfig {
    /// Configuration with the given tiers and no pre-buffer.
    pub const fn new(limits: &'static [FindLimits]) -> Self {
        Self {
            limits,
            pre_buffer_size: 0,
            trailing_literals: 0,
            tail_literals: 0,
            tail_match_margin: 0,
            nice_length: Some(NICE_LENGTH_DEFAULT),
        }
    }

    /// Prime the window with `size` zero bytes.
    pub const fn with_pre_buffer(mut self, size: usize) -> Self {
        self.pre_buffer_size = size;
        self
    }

    /// Store `count` literals with every match.
    pub const fn with_trailing_literals(mut self, count: usize) -> Self {
        self.trailing_literals = count;
        self
    }

    /// End-of-block rules: the last `literals` bytes are never covered by a
    /// match, and no match starts within `match_margin` bytes of the end.
    pub const fn with_tail(mut self, literals: usize, match_margin: usize) -> Self {
        self.tail_literals = literals;
        self.tail_match_margin = match_margin;
        self
    }
}

/// An LZ wire format, described for the shared engine.
pub trait LzScheme: Send + Sync {
    /// Constraint sets and parser settings.
    fn configure(&self) -> LzConfig;

    /// Bits needed for a literal unit (`None`) or a match.
    fn price(&self, candidate: Option<&Match>) -> u32;

    /// Write the token stream. `input` is the caller's buffer, before
    /// [`LzScheme::prepare_input`].
    fn serialize(&self, input: &[u8], tokens: &[Token]) -> Result<Vec<u8>>;

    /// Decode a compressed buffer.
    fn deserialize(&self, input: &[u8]) -> Result<Vec<u8>>;

    /// The buffer the parser works on. Formats that decode back to front
    /// parse a reversed copy.
    fn prepare_input<'a>(&self, input: &'a [u8]) -> Cow<'a, [u8]> {
        Cow::Borrowed(input)
    }
}

/// Adapter running an [`LzScheme`] through the finders and parser.
#[derive(Debug, Clone, Copy, Default)]
pub struct LzCodec<S>(pub S);

impl<S: LzScheme> LzCodec<S> {
    /// Optimal token stream for `data` under the scheme's constraints.
    pub fn parse(&self, data: &[u8], options: &CompressOptions) -> Result<Vec<Token>> {
        let config = self.0.configure();
        let finders = config
            .limits
            .iter()
            .map(|limits| options.strategy.finder(*limits))
            .collect::<Result<Vec<Box<dyn MatchFinder>>>>()?;

        let parse_options = ParseOptions::default()
            .with_pre_buffer(config.pre_buffer_size)
            .with_trailing_literals(config.trailing_literals)
            .with_tail(config.tail_literals, config.tail_match_margin)
            .with_nice_length(options.nice_length.or(config.nice_length))
            .with_cancel(options.cancel.clone());
        let mut parser = OptimalParser::new(finders, parse_options)?;

        let price = |candidate: Option<&Match>| self.0.price(candidate);
        Ok(parser.parse(data, &price)?.tokens)
    }
}

impl<S: LzScheme> Encoder for LzCodec<S> {
    fn encode(&self, input: &[u8], options: &CompressOptions) -> Result<Vec<u8>> {
        let data = self.0.prepare_input(input);
        let tokens = self.parse(&data, options)?;
        self.0.serialize(input, &tokens)
    }
}

impl<S: LzScheme> Decoder for LzCodec<S> {
    fn decode(&self, input: &[u8]) -> Result<Vec<u8>> {
        self.0.deserialize(input)
    }
}
