use std::io::Read;

use crate::{
    settings::Engine, tape::VecTape, ExecuteCallbackResult, ExecutionError, TapeAddr,
};

/// Instructions a test run may execute before it is considered non-terminating.
pub const INSTRUCTION_BUDGET: usize = 500000;

#[derive(Debug, PartialEq)]
pub struct ExecutionState {
    pub result: Option<Result<(), ExecutionError>>,
    pub tape: VecTape,
    pub tape_ptr: TapeAddr,
    pub output: Vec<u8>,
}

impl ExecutionState {
    fn new(cells: usize) -> Self {
        Self {
            result: None,
            tape: VecTape::new(cells).expect("test tape"),
            tape_ptr: 0.into(),
            output: Default::default(),
        }
    }
}

/// Check that two runs of the same program are indistinguishable.
pub fn compare_runs(exec1: &ExecutionState, exec2: &ExecutionState) {
    assert_eq!(exec1.result, exec2.result);
    assert_eq!(exec1.output, exec2.output);
    assert_eq!(exec1.tape_ptr, exec2.tape_ptr);
    assert_eq!(exec1.tape, exec2.tape);
}

/// Run `code` on a fresh tape, aborting once [`INSTRUCTION_BUDGET`] is used up.
pub fn test_execute(
    code: &[u8],
    cells: usize,
    engine: Engine,
    input: &mut impl Read,
) -> ExecutionState {
    test_execute_with_budget(code, cells, engine, input, INSTRUCTION_BUDGET)
}

pub fn test_execute_with_budget(
    code: &[u8],
    cells: usize,
    engine: Engine,
    input: &mut impl Read,
    budget: usize,
) -> ExecutionState {
    let mut instr_count = 0;
    let mut exec = ExecutionState::new(cells);
    exec.result = Some(crate::execute(
        code,
        engine,
        &mut exec.tape,
        &mut exec.tape_ptr,
        input,
        &mut exec.output,
        &mut |_, _, _| {
            instr_count += 1;
            if instr_count > budget {
                ExecuteCallbackResult::Abort
            } else {
                ExecuteCallbackResult::Continue
            }
        },
    ));

    exec
}
