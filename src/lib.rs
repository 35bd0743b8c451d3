//! # ringtape - A Brainfuck interpreter with a circular tape
//!
//! The tape has a fixed number of cells (30000 by default) and the cursor
//! wraps around at both ends. Cells are bytes with wrapping arithmetic. End
//! of input reads as zero. Any byte that is not an instruction or whitespace
//! is an error, as are unbalanced brackets; both are reported when execution
//! reaches them.
//!
//! **NOTE! This is a command line program. This library does NOT provide a
//! stable API.**

// Re-export some symbols.
pub use interpreter::execute;
pub use interpreter::ExecuteCallbackData;
pub use interpreter::ExecuteCallbackResult;
pub use interpreter::ExecutionError;
pub use lexer::Token;
pub use types::BfNum;
pub use types::TapeAddr;
pub use types::TapeAddrError;

#[doc(hidden)]
pub mod byte_utils;
mod interpreter;
pub mod lexer;
pub mod settings;
pub mod tape;
#[doc(hidden)]
pub mod test_utils;
pub mod types;
