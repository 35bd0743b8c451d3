//! Re-entrant loop evaluation.
//!
//! Every loop that is entered gets its own nested call, which re-scans the
//! loop body from its start on every iteration. The call stack is the loop
//! stack, so nesting depth is limited by the available stack.

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
    pub(super) fn run_recursive(&mut self) -> Result<(), ExecutionError> {
        self.evaluate(0, true).map(|_| ())
    }

    /// Evaluate the code starting at `start`.
    ///
    /// For a loop body (`top_level` false) `start` is just after the `[`, and
    /// the return value is the offset just after the matching `]`, once the
    /// loop condition is false.
    fn evaluate(&mut self, start: usize, top_level: bool) -> Result<usize, ExecutionError> {
        let mut ip = start;
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
                    ip = if self.current_is_zero()? {
                        find_loop_end(self.code, ip)? + 1
                    } else {
                        self.evaluate(ip + 1, false)?
                    };
                }
                Token::EndLoop => {
                    if top_level {
                        return Err(ExecutionError::UnmatchedLoopEnd { position: ip });
                    }
                    if self.current_is_zero()? {
                        return Ok(ip + 1);
                    }
                    self.notify(ExecuteCallbackData::LoopIteration { start })?;
                    ip = start;
                }
                _ => {
                    self.apply(token)?;
                    ip += 1;
                }
            }
        }
        if top_level {
            Ok(ip)
        } else {
            Err(ExecutionError::UnmatchedLoopStart {
                position: start - 1,
            })
        }
    }
}
