//! Settings defining how to run a program

/// Number of cells on the tape unless configured otherwise.
pub const DEFAULT_CELLS: usize = 30000;

/// How loops are executed. Both engines behave identically.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash, clap::ValueEnum)]
#[cfg_attr(feature = "arbitrary", derive(arbitrary::Arbitrary))]
pub enum Engine {
    /// Flat dispatch loop with an explicit loop stack
    #[default]
    Iterative,
    /// Each loop is evaluated by a nested call (deep nesting may overflow the stack)
    Recursive,
}

/// Everything needed to set up a run
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Settings {
    /// Tape length, at least 1
    pub cells: usize,
    pub engine: Engine,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            cells: DEFAULT_CELLS,
            engine: Engine::default(),
        }
    }
}
