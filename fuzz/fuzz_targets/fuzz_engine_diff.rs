#![no_main]

use libfuzzer_sys::fuzz_target;

use ringtape::settings::Engine;
use ringtape::test_utils::{compare_runs, test_execute_with_budget};
use ringtape_fuzz::FuzzInputSrc;

fuzz_target!(|data: FuzzInputSrc| {
    let cells = data.cells();
    let exec1 = test_execute_with_budget(
        &data.code,
        cells,
        Engine::Iterative,
        &mut data.input.clone(),
        5000,
    );
    let exec2 = test_execute_with_budget(
        &data.code,
        cells,
        Engine::Recursive,
        &mut data.input.clone(),
        5000,
    );
    compare_runs(&exec1, &exec2);
});
