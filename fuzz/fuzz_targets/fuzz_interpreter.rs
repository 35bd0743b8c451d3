#![no_main]

use libfuzzer_sys::fuzz_target;
use ringtape::execute;
use ringtape::tape::VecTape;
use ringtape::ExecuteCallbackResult;
use ringtape::ExecutionError;
use ringtape::TapeAddr;
use ringtape_fuzz::FuzzInputSrc;

fuzz_target!(|data: FuzzInputSrc| {
    let mut input = data.input.clone();

    let mut instr_count = 0;
    let mut tape = VecTape::new(data.cells()).unwrap();
    let mut tape_ptr: TapeAddr = 0.into();
    let mut output: Vec<u8> = Vec::new();
    let exec_result = execute(
        &data.code,
        data.engine,
        &mut tape,
        &mut tape_ptr,
        &mut input,
        &mut output,
        &mut |_, tape, tp| {
            assert!(tp.0 < tape.cells().len());
            instr_count += 1;
            if instr_count > 500 {
                ExecuteCallbackResult::Abort
            } else {
                ExecuteCallbackResult::Continue
            }
        },
    );
    assert!(tape_ptr.0 < data.cells());
    match exec_result {
        Ok(_) => (),
        Err(err) => match err {
            ExecutionError::InvalidInstruction { .. } => (),
            ExecutionError::UnmatchedLoopStart { .. } => (),
            ExecutionError::UnmatchedLoopEnd { .. } => (),
            ExecutionError::Aborted => (),
            ExecutionError::TapeError(_)
            | ExecutionError::InputError(_)
            | ExecutionError::OutputError(_) => panic!("Unexpected error {err:?}"),
        },
    }
});
