//! Allocation primitives for the desktop core
//!
//! Every layer above this crate stores its long-lived state in one of three
//! containers instead of reaching for unmanaged allocation:
//!
//! | Container | Backing | Failure mode |
//! |-----------|---------|--------------|
//! | [`MemoryPool`] | equal-sized blocks tracked by a bitmap | `OutOfBlocks`, `DoubleFreeOrInvalidHandle` |
//! | [`FixedMap`] | open addressing, linear probing, 64-bit keys | `CapacityExceeded` |
//! | [`Vector`] | contiguous, doubling growth | none |
//!
//! All three are deterministic: the same sequence of calls always yields the
//! same handles, slots and iteration order.

#![no_std]

extern crate alloc;

mod map;
mod pool;
mod vector;

pub use map::FixedMap;
pub use pool::{BlockHandle, MemoryPool, PoolUsage};
pub use vector::Vector;

use mos_hal::ErrorKind;

/// Allocation errors
#[derive(Clone, Copy, Debug, PartialEq, Eq, thiserror::Error)]
pub enum AllocError {
    /// Every block in the pool is allocated
    #[error("memory pool exhausted")]
    OutOfBlocks,
    /// The block was already free, or the handle is out of range
    #[error("block {0:?} is not allocated or out of range")]
    DoubleFreeOrInvalidHandle(BlockHandle),
    /// Inserting a new key into a full table
    #[error("table capacity of {capacity} entries exceeded")]
    CapacityExceeded { capacity: usize },
    /// Pool geometry rejected at creation
    #[error("invalid pool layout: {0}")]
    InvalidLayout(&'static str),
}

impl AllocError {
    /// Classify this error
    pub fn kind(&self) -> ErrorKind {
        match self {
            AllocError::OutOfBlocks | AllocError::CapacityExceeded { .. } => {
                ErrorKind::ResourceExhausted
            }
            AllocError::DoubleFreeOrInvalidHandle(_) | AllocError::InvalidLayout(_) => {
                ErrorKind::InvalidState
            }
        }
    }
}
