//! Decoding of source bytes into instructions.
//!
//! There is no separate parsing pass: the interpreter decodes each byte as
//! it reaches it, so an invalid byte is only reported when executed.

use crate::ExecutionError;

/// Instructions in the source
#[derive(Debug, PartialEq, Eq, Clone, Copy, Hash)]
#[cfg_attr(feature = "arbitrary", derive(arbitrary::Arbitrary))]
pub enum Token {
    Left,
    Right,
    Add,
    Subtract,
    Input,
    Output,
    BeginLoop,
    EndLoop,
    /// Whitespace, a no-op.
    Blank,
}

impl Token {
    /// Decode one source byte. `None` if the byte is not an instruction.
    pub fn decode(byte: u8) -> Option<Token> {
        match byte {
            b'<' => Some(Token::Left),
            b'>' => Some(Token::Right),
            b'+' => Some(Token::Add),
            b'-' => Some(Token::Subtract),
            b'.' => Some(Token::Output),
            b',' => Some(Token::Input),
            b'[' => Some(Token::BeginLoop),
            b']' => Some(Token::EndLoop),
            // Form feed and vertical tab count too, so not is_ascii_whitespace()
            b' ' | b'\t' | b'\n' | b'\r' | b'\x0c' | b'\x0b' => Some(Token::Blank),
            _ => None,
        }
    }

    /// Decode the byte at `position`, failing for anything that is not an instruction.
    pub(crate) fn decode_at(code: &[u8], position: usize) -> Result<Option<Token>, ExecutionError> {
        match code.get(position) {
            None => Ok(None),
            Some(&byte) => match Token::decode(byte) {
                Some(token) => Ok(Some(token)),
                None => Err(ExecutionError::InvalidInstruction { byte, position }),
            },
        }
    }
}

/// Find the `]` matching the `[` at `open`.
///
/// Only brackets are looked at, everything else in between is skipped
/// without being decoded.
pub fn find_loop_end(code: &[u8], open: usize) -> Result<usize, ExecutionError> {
    let mut depth = 0usize;
    for (pos, byte) in code.iter().enumerate().skip(open) {
        match byte {
            b'[' => depth += 1,
            b']' => {
                depth = depth.saturating_sub(1);
                if depth == 0 {
                    return Ok(pos);
                }
            }
            _ => (),
        }
    }
    Err(ExecutionError::UnmatchedLoopStart { position: open })
}
