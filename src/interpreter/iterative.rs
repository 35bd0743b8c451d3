//! Flat loop evaluation with an explicit stack of open loops.
//!
//! Behaves exactly like the recursive engine, but nesting depth only costs
//! heap memory. Bracket pairs are remembered the first time they are found,
//! so skipping the same loop again does not re-scan it.

use std::collections::HashMap;
use std::io::{Read, Write};

use crate::lexer::{find_loop_end, Token};
use crate::tape::Tape;
use crate::TapeAddr;

use super::{ExecuteCallbackData, ExecuteCallbackResult, ExecutionError, Machine};

impl<TapeT, R, W, F> Machine<'_, TapeT, R, W, F>
where
    TapeT: Tape,
    R: Read,
    W: Write,
    F: FnMut(ExecuteCallbackData, &TapeT, TapeAddr) -> ExecuteCallbackResult,
{
    pub(super) fn run_iterative(&mut self) -> Result<(), ExecutionError> {
        // Offsets of the `[` of every loop we are inside, innermost last.
        let mut frames: Vec<usize> = vec![];
        // `[` offset -> matching `]` offset, for pairs seen so far.
        let mut loop_ends: HashMap<usize, usize> = HashMap::new();

        let mut ip = 0;
        while let Some(token) = Token::decode_at(self.code, ip)? {
            if token == Token::Blank {
                ip += 1;
                continue;
            }
            self.notify(ExecuteCallbackData::Instruction {
                position: ip,
                token,
            })?;
            match token {
                Token::BeginLoop => {
                    if self.current_is_zero()? {
                        let end = match loop_ends.get(&ip) {
                            Some(&end) => end,
                            None => {
                                let end = find_loop_end(self.code, ip)?;
                                remember(&mut loop_ends, ip, end);
                                end
                            }
                        };
                        ip = end + 1;
                    } else {
                        frames.push(ip);
                        ip += 1;
                    }
                }
                Token::EndLoop => {
                    let Some(&open) = frames.last() else {
                        return Err(ExecutionError::UnmatchedLoopEnd { position: ip });
                    };
                    if self.current_is_zero()? {
                        frames.pop();
                        remember(&mut loop_ends, open, ip);
                        ip += 1;
                    } else {
                        self.notify(ExecuteCallbackData::LoopIteration { start: open + 1 })?;
                        ip = open + 1;
                    }
                }
                _ => {
                    self.apply(token)?;
                    ip += 1;
                }
            }
        }
        match frames.last() {
            Some(&open) => Err(ExecutionError::UnmatchedLoopStart { position: open }),
            None => Ok(()),
        }
    }
}

fn remember(loop_ends: &mut HashMap<usize, usize>, open: usize, end: usize) {
    if loop_ends.insert(open, end).is_none() {
        tracing::trace!(open, end, "found loop");
    }
}
