//! Fundamental data types used throughout ringtape

use std::{
    fmt::Display,
    num::Wrapping,
    ops::{Add, AddAssign, Sub, SubAssign},
};
use thiserror::Error;

/// Error type for TapeAddr operations
#[derive(Debug, Clone, Copy, Error, Hash, PartialEq, Eq, PartialOrd, Ord)]
pub enum TapeAddrError {
    /// The address does not refer to a cell on the tape.
    #[error("Tape pointer {addr} is outside of the tape (length {len})")]
    OutOfRange { addr: TapeAddr, len: usize },
}

/// Newtype for the tape pointer (the cursor).
///
/// Movement is circular: the tape length is passed to [`TapeAddr::right`]
/// and [`TapeAddr::left`], which never produce an address outside
/// `[0, len)` as long as they start inside it.
#[derive(Debug, Default, Clone, Copy, Hash, PartialEq, Eq, PartialOrd, Ord)]
#[repr(transparent)]
#[cfg_attr(feature = "arbitrary", derive(arbitrary::Arbitrary))]
pub struct TapeAddr(pub usize);

impl TapeAddr {
    pub fn new(val: usize) -> Self {
        Self(val)
    }

    /// Move one cell to the right, wrapping to the start after the last cell.
    pub fn right(self, len: usize) -> Self {
        if self.0 + 1 >= len {
            Self(0)
        } else {
            Self(self.0 + 1)
        }
    }

    /// Move one cell to the left, wrapping to the last cell from the start.
    pub fn left(self, len: usize) -> Self {
        if self.0 == 0 {
            Self(len.saturating_sub(1))
        } else {
            Self(self.0 - 1)
        }
    }

    /// Check that this address is on a tape of length `len`.
    pub fn check(self, len: usize) -> Result<usize, TapeAddrError> {
        if self.0 < len {
            Ok(self.0)
        } else {
            Err(TapeAddrError::OutOfRange { addr: self, len })
        }
    }
}

impl From<usize> for TapeAddr {
    fn from(value: usize) -> Self {
        Self(value)
    }
}

impl From<TapeAddr> for usize {
    fn from(value: TapeAddr) -> Self {
        value.0
    }
}

impl Display for TapeAddr {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A BF number (u8 with wrapping semantics).
#[derive(Debug, Default, Clone, Copy, Hash, PartialEq, Eq, PartialOrd, Ord)]
#[repr(transparent)]
#[cfg_attr(feature = "arbitrary", derive(arbitrary::Arbitrary))]
pub struct BfNum(Wrapping<u8>);

impl BfNum {
    pub const ZERO: BfNum = BfNum(Wrapping(0));
    pub const ONE: BfNum = BfNum(Wrapping(1));

    pub fn is_zero(&self) -> bool {
        self.0 .0 == 0
    }
}

impl Add for BfNum {
    type Output = BfNum;

    fn add(self, rhs: Self) -> Self::Output {
        Self(self.0 + rhs.0)
    }
}

impl AddAssign for BfNum {
    fn add_assign(&mut self, rhs: Self) {
        self.0 += rhs.0;
    }
}

impl Sub for BfNum {
    type Output = BfNum;

    fn sub(self, rhs: Self) -> Self::Output {
        Self(self.0 - rhs.0)
    }
}

impl SubAssign for BfNum {
    fn sub_assign(&mut self, rhs: Self) {
        self.0 -= rhs.0;
    }
}

impl From<i32> for BfNum {
    fn from(value: i32) -> Self {
        Self(Wrapping::<u8>(value.rem_euclid(256) as u8))
    }
}

impl From<u8> for BfNum {
    fn from(value: u8) -> Self {
        Self(Wrapping::<u8>(value))
    }
}

impl From<BfNum> for u8 {
    fn from(value: BfNum) -> Self {
        value.0 .0
    }
}

impl Display for BfNum {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}
