//! Implementations of the BF tape

use std::collections::TryReserveError;

use thiserror::Error;

use crate::{BfNum, TapeAddr, TapeAddrError};

/// Errors when creating a tape
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum TapeError {
    /// A tape needs at least one cell.
    #[error("Tape must have at least one cell")]
    Empty,
    /// The cells could not be allocated.
    #[error("Out of memory allocating {cells} cells: {source}")]
    OutOfMemory {
        cells: usize,
        #[source]
        source: TryReserveError,
    },
}

/// A trait implementing a tape for the BF program memory.
///
/// A tape has a fixed length for its entire lifetime. Addresses outside of
/// `[0, len)` are errors, wrapping is the job of the cursor ([`TapeAddr`]).
pub trait Tape {
    fn len(&self) -> usize;

    fn try_get(&self, offset: TapeAddr) -> Result<BfNum, TapeAddrError>;
    fn try_set(&mut self, offset: TapeAddr, value: BfNum) -> Result<(), TapeAddrError>;

    /// Add `diff` to a cell (wrapping).
    fn try_modify(&mut self, offset: TapeAddr, diff: BfNum) -> Result<(), TapeAddrError> {
        let value = self.try_get(offset)?;
        self.try_set(offset, value + diff)
    }

    fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// A fixed-length tape implemented with a Vec.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VecTape {
    data: Vec<BfNum>,
}

impl VecTape {
    /// Allocate a zero-initialised tape of `cells` cells.
    pub fn new(cells: usize) -> Result<Self, TapeError> {
        if cells == 0 {
            return Err(TapeError::Empty);
        }
        let mut data = Vec::new();
        data.try_reserve_exact(cells)
            .map_err(|source| TapeError::OutOfMemory { cells, source })?;
        data.resize(cells, BfNum::ZERO);
        tracing::debug!(cells, "allocated tape");
        Ok(Self { data })
    }

    /// Get a cell, reading outside the tape gives zero.
    pub fn get(&self, offset: TapeAddr) -> BfNum {
        self.data.get(offset.0).copied().unwrap_or_default()
    }

    /// All cells of the tape.
    pub fn cells(&self) -> &[BfNum] {
        &self.data
    }
}

impl Tape for VecTape {
    fn len(&self) -> usize {
        self.data.len()
    }

    fn try_get(&self, offset: TapeAddr) -> Result<BfNum, TapeAddrError> {
        let idx = offset.check(self.data.len())?;
        Ok(self.data[idx])
    }

    fn try_set(&mut self, offset: TapeAddr, value: BfNum) -> Result<(), TapeAddrError> {
        let idx = offset.check(self.data.len())?;
        self.data[idx] = value;
        Ok(())
    }

    fn try_modify(&mut self, offset: TapeAddr, diff: BfNum) -> Result<(), TapeAddrError> {
        let idx = offset.check(self.data.len())?;
        self.data[idx] += diff;
        Ok(())
    }
}
