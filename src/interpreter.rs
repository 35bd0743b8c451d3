use std::io::ErrorKind;
use std::io::Read;
use std::io::Write;

use thiserror::Error;

use crate::byte_utils::escape_byte;
use crate::lexer::Token;
use crate::settings::Engine;
use crate::tape::Tape;
use crate::BfNum;
use crate::TapeAddr;
use crate::TapeAddrError;

mod iterative;
mod recursive;

/// Error type for execution
#[derive(Debug, Error)]
pub enum ExecutionError {
    /// A byte that is neither an instruction nor whitespace was executed.
    #[error("Invalid character '{}' (ASCII code {byte:#04x}) at offset {position}", escape_byte(*.byte))]
    InvalidInstruction { byte: u8, position: usize },
    /// A `[` without matching `]`.
    #[error("Unbalanced bracket: loop starting at offset {position} is never closed")]
    UnmatchedLoopStart { position: usize },
    /// A `]` outside of any loop.
    #[error("Unbalanced bracket: ']' at offset {position} does not close any loop")]
    UnmatchedLoopEnd { position: usize },
    /// Tape pointer error.
    #[error("Tape pointer error: {0}")]
    TapeError(#[from] TapeAddrError),
    /// Reading from the input failed (end of input is not an error).
    #[error("Failed to read input: {0}")]
    InputError(#[source] std::io::Error),
    /// Writing to the output failed.
    #[error("Failed to write output: {0}")]
    OutputError(#[source] std::io::Error),
    /// Aborted by callback
    #[error("Callback aborted execution")]
    Aborted,
}

impl ExecutionError {
    /// Is this one of the unbalanced bracket errors?
    pub fn is_unbalanced(&self) -> bool {
        matches!(
            self,
            Self::UnmatchedLoopStart { .. } | Self::UnmatchedLoopEnd { .. }
        )
    }
}

impl PartialEq for ExecutionError {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Self::InputError(l0), Self::InputError(r0)) => l0.kind() == r0.kind(),
            (Self::OutputError(l0), Self::OutputError(r0)) => l0.kind() == r0.kind(),
            (
                Self::InvalidInstruction {
                    byte: lb,
                    position: lp,
                },
                Self::InvalidInstruction {
                    byte: rb,
                    position: rp,
                },
            ) => lb == rb && lp == rp,
            (Self::UnmatchedLoopStart { position: l }, Self::UnmatchedLoopStart { position: r }) => {
                l == r
            }
            (Self::UnmatchedLoopEnd { position: l }, Self::UnmatchedLoopEnd { position: r }) => {
                l == r
            }
            (Self::TapeError(l0), Self::TapeError(r0)) => l0 == r0,
            _ => core::mem::discriminant(self) == core::mem::discriminant(other),
        }
    }
}

/// Data sent to execution callback
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExecuteCallbackData {
    /// We are about to execute the instruction at this source offset.
    /// Whitespace is not reported.
    Instruction { position: usize, token: Token },
    /// We are starting another iteration of the loop whose body begins at
    /// this source offset.
    LoopIteration { start: usize },
}

/// Reply type for callback
pub enum ExecuteCallbackResult {
    /// Continue execution
    Continue,
    /// Abort execution
    Abort,
}

/// Everything an engine works on. Loop nesting shares one of these, the
/// tape and cursor are never copied.
struct Machine<'a, TapeT, R, W, F> {
    code: &'a [u8],
    tape: &'a mut TapeT,
    tape_ptr: &'a mut TapeAddr,
    input: &'a mut R,
    output: &'a mut W,
    callback: &'a mut F,
}

impl<TapeT, R, W, F> Machine<'_, TapeT, R, W, F>
where
    TapeT: Tape,
    R: Read,
    W: Write,
    F: FnMut(ExecuteCallbackData, &TapeT, TapeAddr) -> ExecuteCallbackResult,
{
    fn notify(&mut self, data: ExecuteCallbackData) -> Result<(), ExecutionError> {
        match (self.callback)(data, &*self.tape, *self.tape_ptr) {
            ExecuteCallbackResult::Continue => Ok(()),
            ExecuteCallbackResult::Abort => Err(ExecutionError::Aborted),
        }
    }

    fn current_is_zero(&self) -> Result<bool, ExecutionError> {
        Ok(self.tape.try_get(*self.tape_ptr)?.is_zero())
    }

    /// Execute a single non-loop instruction.
    fn apply(&mut self, token: Token) -> Result<(), ExecutionError> {
        let len = self.tape.len();
        match token {
            Token::Left => *self.tape_ptr = self.tape_ptr.left(len),
            Token::Right => *self.tape_ptr = self.tape_ptr.right(len),
            Token::Add => self.tape.try_modify(*self.tape_ptr, BfNum::ONE)?,
            Token::Subtract => self
                .tape
                .try_modify(*self.tape_ptr, BfNum::ZERO - BfNum::ONE)?,
            Token::Output => {
                let tmp: [u8; 1] = [self.tape.try_get(*self.tape_ptr)?.into()];
                self.output
                    .write_all(&tmp)
                    .map_err(ExecutionError::OutputError)?;
            }
            Token::Input => {
                // Prompts without a trailing newline must be visible before we block.
                self.output.flush().map_err(ExecutionError::OutputError)?;
                let value = read_byte(self.input)?;
                self.tape.try_set(*self.tape_ptr, value)?;
            }
            // Control flow belongs to the engines.
            Token::BeginLoop | Token::EndLoop | Token::Blank => (),
        }
        Ok(())
    }
}

/// Read one byte, end of input reads as zero.
fn read_byte(input: &mut impl Read) -> Result<BfNum, ExecutionError> {
    let mut tmp: [u8; 1] = [0; 1];
    loop {
        match input.read(&mut tmp) {
            Ok(0) => return Ok(BfNum::ZERO),
            Ok(_) => return Ok(tmp[0].into()),
            Err(err) if err.kind() == ErrorKind::Interrupted => continue,
            Err(err) => return Err(ExecutionError::InputError(err)),
        }
    }
}

/// Execute the program in `code` on `tape`, starting at `tape_ptr`.
///
/// The program is decoded as it runs: errors are raised when the offending
/// byte is reached, after any output produced before that point has been
/// written. On return `tape_ptr` holds the final cursor. Output is flushed
/// before returning, also on error.
pub fn execute<TapeT: Tape, F>(
    code: &[u8],
    engine: Engine,
    tape: &mut TapeT,
    tape_ptr: &mut TapeAddr,
    input: &mut impl Read,
    output: &mut impl Write,
    callback: &mut F,
) -> Result<(), ExecutionError>
where
    F: FnMut(ExecuteCallbackData, &TapeT, TapeAddr) -> ExecuteCallbackResult,
{
    tape_ptr.check(tape.len())?;
    tracing::debug!(
        ?engine,
        cells = tape.len(),
        program_len = code.len(),
        "starting execution"
    );

    let mut machine = Machine {
        code,
        tape,
        tape_ptr,
        input,
        output,
        callback,
    };
    let result = match engine {
        Engine::Iterative => machine.run_iterative(),
        Engine::Recursive => machine.run_recursive(),
    };
    let flushed = machine.output.flush().map_err(ExecutionError::OutputError);

    match &result {
        Ok(()) => tracing::debug!(cursor = %machine.tape_ptr, "execution finished"),
        Err(err) => tracing::debug!(cursor = %machine.tape_ptr, %err, "execution failed"),
    }
    result.and(flushed)
}

#[cfg(test)]
mod tests {
    use std::collections::VecDeque;
    use std::io;

    use crate::settings::Engine;
    use crate::tape::VecTape;
    use crate::test_utils::test_execute;
    use crate::TapeAddr;

    use super::execute;
    use super::ExecuteCallbackData;
    use super::ExecuteCallbackResult;
    use super::ExecutionError;

    const ENGINES: [Engine; 2] = [Engine::Iterative, Engine::Recursive];

    /// Run with a small tape and no input.
    fn run(code: &[u8], cells: usize, engine: Engine) -> crate::test_utils::ExecutionState {
        test_execute(code, cells, engine, &mut VecDeque::new())
    }

    #[test]
    fn test_execute_program() {
        for engine in ENGINES {
            let mut tape = VecTape::new(30000).unwrap();
            let mut tape_ptr: TapeAddr = 0.into();

            let mut input: VecDeque<u8> = VecDeque::from([65, 32]);
            let mut output: Vec<u8> = Vec::new();
            execute(
                b"+++>-->++[-]>+<>>>>>,.<,,",
                engine,
                &mut tape,
                &mut tape_ptr,
                &mut input,
                &mut output,
                &mut |_, _, _| ExecuteCallbackResult::Continue,
            )
            .unwrap();
            assert_eq!(usize::from(tape_ptr), 6);
            assert_eq!(tape.get(0.into()), 3.into());
            assert_eq!(tape.get(1.into()), 254.into());
            assert_eq!(tape.get(2.into()), 0.into());
            assert_eq!(tape.get(3.into()), 1.into());
            assert_eq!(tape.get(6.into()), 0.into());
            assert_eq!(tape.get(7.into()), 65.into());
            assert_eq!(output, vec![65]);
        }
    }

    #[test]
    fn test_echo() {
        for engine in ENGINES {
            let exec = test_execute(b",.", 10, engine, &mut VecDeque::from([0x41]));
            assert_eq!(exec.result, Some(Ok(())));
            assert_eq!(exec.output, vec![0x41]);
        }
    }

    #[test]
    fn test_end_of_input_reads_zero() {
        for engine in ENGINES {
            let exec = run(b"+,.", 10, engine);
            assert_eq!(exec.result, Some(Ok(())));
            assert_eq!(exec.output, vec![0]);
        }
    }

    #[test]
    fn test_cell_underflow() {
        for engine in ENGINES {
            let exec = run(b"-.", 10, engine);
            assert_eq!(exec.output, vec![0xff]);
            let exec = run(b"-+.", 10, engine);
            assert_eq!(exec.output, vec![0]);
        }
    }

    #[test]
    fn test_cursor_wraps_left() {
        for engine in ENGINES {
            let exec = run(b">>+++<<<.", 3, engine);
            assert_eq!(exec.result, Some(Ok(())));
            assert_eq!(exec.output, vec![3]);
            assert_eq!(exec.tape_ptr, TapeAddr(2));
        }
    }

    #[test]
    fn test_cursor_wraps_right() {
        for engine in ENGINES {
            let exec = run(b"+>>>.", 3, engine);
            assert_eq!(exec.output, vec![1]);
            assert_eq!(exec.tape_ptr, TapeAddr(0));
        }
    }

    #[test]
    fn test_whitespace_is_ignored() {
        for engine in ENGINES {
            let exec = run(b" +\t+\n+\r\x0b\x0c.", 10, engine);
            assert_eq!(exec.result, Some(Ok(())));
            assert_eq!(exec.output, vec![3]);
        }
    }

    #[test]
    fn test_invalid_instruction() {
        for engine in ENGINES {
            let exec = run(b"+.a.", 10, engine);
            assert_eq!(
                exec.result,
                Some(Err(ExecutionError::InvalidInstruction {
                    byte: b'a',
                    position: 2
                }))
            );
            // Everything before the bad byte has been executed.
            assert_eq!(exec.output, vec![1]);
        }
    }

    #[test]
    fn test_invalid_instruction_in_skipped_loop() {
        for engine in ENGINES {
            let exec = run(b"[comment].", 10, engine);
            assert_eq!(exec.result, Some(Ok(())));
            assert_eq!(exec.output, vec![0]);
        }
    }

    #[test]
    fn test_skipped_loop() {
        for engine in ENGINES {
            let exec = run(b"[+.[.]].", 10, engine);
            assert_eq!(exec.result, Some(Ok(())));
            assert_eq!(exec.output, vec![0]);
            // A skipped loop can be the last thing in the program.
            let exec = run(b"+.-[]", 10, engine);
            assert_eq!(exec.result, Some(Ok(())));
            assert_eq!(exec.output, vec![1]);
        }
    }

    #[test]
    fn test_loop_terminates() {
        for engine in ENGINES {
            // 3 * 5 = 15 in cell 1
            let exec = run(b"+++[>+++++<-]>.", 10, engine);
            assert_eq!(exec.result, Some(Ok(())));
            assert_eq!(exec.output, vec![15]);
            assert_eq!(exec.tape_ptr, TapeAddr(1));
        }
    }

    #[test]
    fn test_nested_loops() {
        for engine in ENGINES {
            // The inner loop runs to completion before the outer `-`.
            let exec = run(b"++[>+++[>++<-]<-]>>.", 10, engine);
            assert_eq!(exec.result, Some(Ok(())));
            assert_eq!(exec.output, vec![12]);

            let exec = run(b"+[[+]+]", 10, engine);
            assert_eq!(exec.result, Some(Err(ExecutionError::Aborted)));
            // The inner loop clears the outer loop's cell, so the outer body runs once.
            let exec = run(b"++[[-]>+<]>.", 10, engine);
            assert_eq!(exec.result, Some(Ok(())));
            assert_eq!(exec.output, vec![1]);
        }
    }

    #[test]
    fn test_cursor_carries_out_of_loops() {
        for engine in ENGINES {
            // Seek right to the first zero cell.
            let exec = run(b"+>+>+<<[>]+.", 10, engine);
            assert_eq!(exec.result, Some(Ok(())));
            assert_eq!(exec.tape_ptr, TapeAddr(3));
            assert_eq!(exec.output, vec![1]);
        }
    }

    #[test]
    fn test_infinite_loop_is_not_detected() {
        for engine in ENGINES {
            let exec = run(b"+[]", 10, engine);
            assert_eq!(exec.result, Some(Err(ExecutionError::Aborted)));
        }
    }

    #[test]
    fn test_unmatched_loop_start() {
        for engine in ENGINES {
            // Skipping a loop that never ends
            let exec = run(b"[+", 10, engine);
            assert_eq!(
                exec.result,
                Some(Err(ExecutionError::UnmatchedLoopStart { position: 0 }))
            );
            assert_eq!(exec.output, vec![]);
            // Running off the end of a loop body
            let exec = run(b"+[[-]+", 10, engine);
            assert_eq!(
                exec.result,
                Some(Err(ExecutionError::UnmatchedLoopStart { position: 1 }))
            );
            let exec = run(b"+[.[-]+[", 10, engine);
            assert_eq!(
                exec.result,
                Some(Err(ExecutionError::UnmatchedLoopStart { position: 7 }))
            );
            assert_eq!(exec.output, vec![1]);
        }
    }

    #[test]
    fn test_unmatched_loop_end() {
        for engine in ENGINES {
            let exec = run(b"+.]", 10, engine);
            assert_eq!(
                exec.result,
                Some(Err(ExecutionError::UnmatchedLoopEnd { position: 2 }))
            );
            assert_eq!(exec.output, vec![1]);
            // Also with a zero cell, a top level `]` never just returns.
            let exec = run(b"[]]", 10, engine);
            assert_eq!(
                exec.result,
                Some(Err(ExecutionError::UnmatchedLoopEnd { position: 2 }))
            );
            assert!(exec.result.unwrap().unwrap_err().is_unbalanced());
        }
    }

    #[test]
    fn test_cursor_out_of_range() {
        let mut tape = VecTape::new(3).unwrap();
        let mut tape_ptr: TapeAddr = 3.into();
        let result = execute(
            b"+",
            Engine::Iterative,
            &mut tape,
            &mut tape_ptr,
            &mut io::empty(),
            &mut io::sink(),
            &mut |_, _, _| ExecuteCallbackResult::Continue,
        );
        assert!(matches!(result, Err(ExecutionError::TapeError(_))));
    }

    struct FailingReader;

    impl io::Read for FailingReader {
        fn read(&mut self, _buf: &mut [u8]) -> io::Result<usize> {
            Err(io::Error::new(io::ErrorKind::BrokenPipe, "gone"))
        }
    }

    #[test]
    fn test_input_failure() {
        for engine in ENGINES {
            let mut tape = VecTape::new(3).unwrap();
            let mut tape_ptr: TapeAddr = 0.into();
            let mut output = Vec::new();
            let result = execute(
                b".,.",
                engine,
                &mut tape,
                &mut tape_ptr,
                &mut FailingReader,
                &mut output,
                &mut |_, _, _| ExecuteCallbackResult::Continue,
            );
            assert_eq!(
                result,
                Err(ExecutionError::InputError(io::ErrorKind::BrokenPipe.into()))
            );
            assert_eq!(output, vec![0]);
        }
    }

    /// Interrupted a few times before delivering its byte.
    struct InterruptedReader(usize, u8);

    impl io::Read for InterruptedReader {
        fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
            if self.0 > 0 {
                self.0 -= 1;
                return Err(io::ErrorKind::Interrupted.into());
            }
            buf[0] = self.1;
            Ok(1)
        }
    }

    #[test]
    fn test_interrupted_input_is_retried() {
        for engine in ENGINES {
            let mut tape = VecTape::new(3).unwrap();
            let mut tape_ptr: TapeAddr = 0.into();
            let mut output = Vec::new();
            let result = execute(
                b",.",
                engine,
                &mut tape,
                &mut tape_ptr,
                &mut InterruptedReader(3, 0x41),
                &mut output,
                &mut |_, _, _| ExecuteCallbackResult::Continue,
            );
            assert_eq!(result, Ok(()));
            assert_eq!(tape.get(0.into()), 0x41.into());
            assert_eq!(output, vec![0x41]);
        }
    }

    struct FailingWriter;

    impl io::Write for FailingWriter {
        fn write(&mut self, _buf: &[u8]) -> io::Result<usize> {
            Err(io::Error::new(io::ErrorKind::BrokenPipe, "closed"))
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    #[test]
    fn test_output_failure() {
        for engine in ENGINES {
            let mut tape = VecTape::new(3).unwrap();
            let mut tape_ptr: TapeAddr = 0.into();
            let result = execute(
                b"+.+",
                engine,
                &mut tape,
                &mut tape_ptr,
                &mut io::empty(),
                &mut FailingWriter,
                &mut |_, _, _| ExecuteCallbackResult::Continue,
            );
            assert_eq!(
                result,
                Err(ExecutionError::OutputError(io::ErrorKind::BrokenPipe.into()))
            );
            // Execution stops at the failed write.
            assert_eq!(tape.get(0.into()), 1.into());
        }
    }

    #[test]
    fn test_nul_byte_is_invalid() {
        for engine in ENGINES {
            let exec = run(b"+.\0+.", 10, engine);
            assert_eq!(
                exec.result,
                Some(Err(ExecutionError::InvalidInstruction {
                    byte: 0,
                    position: 2
                }))
            );
            assert_eq!(exec.output, vec![1]);
        }
    }

    #[test]
    fn test_callback_sees_loop_iterations() {
        for engine in ENGINES {
            let mut tape = VecTape::new(3).unwrap();
            let mut tape_ptr: TapeAddr = 0.into();
            let mut events = Vec::new();
            execute(
                b"++ [-]",
                engine,
                &mut tape,
                &mut tape_ptr,
                &mut io::empty(),
                &mut io::sink(),
                &mut |data, _, _| {
                    events.push(data);
                    ExecuteCallbackResult::Continue
                },
            )
            .unwrap();
            let iterations = events
                .iter()
                .filter(|e| matches!(e, ExecuteCallbackData::LoopIteration { start: 4 }))
                .count();
            assert_eq!(iterations, 1);
            // 2 adds, `[`, then `-` and `]` twice
            assert_eq!(events.len(), 2 + 1 + 4 + 1);
        }
    }

    #[test]
    fn test_error_messages() {
        let err = ExecutionError::InvalidInstruction {
            byte: b'\x07',
            position: 4,
        };
        assert_eq!(
            err.to_string(),
            "Invalid character '\\x07' (ASCII code 0x07) at offset 4"
        );
        let err = ExecutionError::UnmatchedLoopEnd { position: 2 };
        assert_eq!(
            err.to_string(),
            "Unbalanced bracket: ']' at offset 2 does not close any loop"
        );
    }
}
