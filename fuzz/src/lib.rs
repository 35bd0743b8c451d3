//! Fuzzing helper function

use std::collections::VecDeque;
use std::fmt::Debug;

use ringtape::settings::Engine;

/// Cap on the tape size, fuzzing should not be about allocation failures.
pub const MAX_CELLS: u16 = 4096;

#[derive(arbitrary::Arbitrary)]
pub struct FuzzInputSrc {
    pub code: Vec<u8>,
    pub input: VecDeque<u8>,
    pub cells: u16,
    pub engine: Engine,
}

impl FuzzInputSrc {
    pub fn cells(&self) -> usize {
        (self.cells % MAX_CELLS) as usize + 1
    }
}

impl Debug for FuzzInputSrc {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FuzzInputSrc")
            .field("code", &ringtape::byte_utils::as_bstr(&self.code))
            .field("input", &self.input)
            .field("cells", &self.cells())
            .field("engine", &self.engine)
            .finish()
    }
}
