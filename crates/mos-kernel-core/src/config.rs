//! Kernel configuration
//!
//! Constants are fixed at compile time and read once when the kernel is
//! created. `KernelConfig::default()` is built entirely from them.

use serde::{Deserialize, Serialize};

use crate::error::KernelError;

/// Kernel memory managed by the block pool (512 MB)
pub const KERNEL_MEMORY_SIZE: usize = 512 * 1024 * 1024;

/// Upper bound on live processes
pub const MAX_PROCESSES: usize = 1024;

/// Upper bound on threads across all processes
pub const MAX_THREADS: usize = 4096;

/// Bytes per kernel pool block
pub const POOL_BLOCK_SIZE: usize = 4096;

/// Pool blocks reserved for each process control block
pub const BLOCKS_PER_PROCESS: usize = 1;

/// Simulated CPU time charged per scheduling opportunity (microseconds)
pub const TIME_SLICE_US: u64 = 10_000;

/// Kernel configuration consumed at initialization
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct KernelConfig {
    /// Bytes of kernel memory
    pub memory_size: usize,
    /// Bytes per pool block
    pub block_size: usize,
    /// Blocks reserved per process
    pub blocks_per_process: usize,
    /// Process table size
    pub max_processes: usize,
    /// Thread limit (must cover at least one thread per process)
    pub max_threads: usize,
    /// CPU time charged per tick, in microseconds
    pub time_slice_us: u64,
}

impl Default for KernelConfig {
    fn default() -> Self {
        Self {
            memory_size: KERNEL_MEMORY_SIZE,
            block_size: POOL_BLOCK_SIZE,
            blocks_per_process: BLOCKS_PER_PROCESS,
            max_processes: MAX_PROCESSES,
            max_threads: MAX_THREADS,
            time_slice_us: TIME_SLICE_US,
        }
    }
}

impl KernelConfig {
    /// Number of blocks in the kernel pool
    pub fn block_count(&self) -> usize {
        if self.block_size == 0 {
            0
        } else {
            self.memory_size / self.block_size
        }
    }

    /// Reject configurations the kernel cannot boot with
    pub fn validate(&self) -> Result<(), KernelError> {
        if self.max_processes == 0 {
            return Err(KernelError::InvalidConfig("max_processes must be non-zero"));
        }
        if self.max_threads < self.max_processes {
            return Err(KernelError::InvalidConfig(
                "max_threads must be at least max_processes",
            ));
        }
        if self.block_size == 0 || self.memory_size < self.block_size {
            return Err(KernelError::InvalidConfig(
                "kernel memory must hold at least one block",
            ));
        }
        Ok(())
    }
}
