//! Token streams with interleaved flag groups.
//!
//! Most formats in this crate share the same skeleton: a flag group announces
//! whether each of the following items is a literal byte or a match, and the
//! items follow the group in order. Only the group layout, the flag polarity
//! and the match encoding differ, so those are the parameters here.

use byteorder::ReadBytesExt;
use kompression_core::{FlagLayout, FlagReader, FlagWriter, History, Result};
use kompression_lz::{Match, Token};
use std::io::Cursor;

/// Flag group layout plus the flag value that marks a literal.
#[derive(Debug, Clone, Copy)]
pub(crate) struct FlagStyle {
    pub layout: FlagLayout,
    pub literal_flag: bool,
}

impl FlagStyle {
    pub(crate) const fn new(layout: FlagLayout, literal_flag: bool) -> Self {
        Self {
            layout,
            literal_flag,
        }
    }
}

/// Append `tokens` to `output`, emitting one flag per token.
pub(crate) fn encode_flagged<F>(
    output: Vec<u8>,
    style: FlagStyle,
    tokens: &[Token],
    mut write_match: F,
) -> Vec<u8>
where
    F: FnMut(&mut FlagWriter, &Match),
{
    let mut writer = FlagWriter::with_output(style.layout, output);
    for token in tokens {
        match token {
            Token::Literal(byte) => {
                writer.write_flag(style.literal_flag);
                writer.push(*byte);
            }
            Token::Match(m) => {
                writer.write_flag(!style.literal_flag);
                write_match(&mut writer, m);
            }
        }
    }
    writer.finish()
}

/// Decode a flagged body into `history`.
///
/// With a size limit on `history` decoding stops once it is full and any
/// trailing padding is ignored; without one it stops at the end of `body`.
pub(crate) fn decode_flagged<F>(
    body: &[u8],
    style: FlagStyle,
    mut history: History,
    mut read_match: F,
) -> Result<Vec<u8>>
where
    F: FnMut(&mut Cursor<&[u8]>, &mut History) -> Result<()>,
{
    let mut cursor = Cursor::new(body);
    let mut flags = FlagReader::new(style.layout);
    let sized = history.limit().is_some();

    loop {
        let done = if sized {
            history.is_full()
        } else {
            cursor.position() as usize >= body.len()
        };
        if done {
            break;
        }

        if flags.read_flag(&mut cursor)? == style.literal_flag {
            history.push(cursor.read_u8()?)?;
        } else {
            read_match(&mut cursor, &mut history)?;
        }
    }

    history.finish()
}
