//! Core kernel types
//!
//! Pure data. The only behavior here is the state-machine edge check.

use alloc::string::String;
use alloc::vec::Vec;
use core::ops::Add;

use mos_alloc::{BlockHandle, PoolUsage};
use serde::{Deserialize, Serialize};

/// Process identifier
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct ProcessId(pub u64);

/// Process scheduling state
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum ProcessState {
    /// Waiting in the ready queue
    Ready,
    /// Holding the CPU for the current time slice
    Running,
    /// Parked until explicitly unblocked
    Blocked,
}

impl ProcessState {
    /// Whether the state machine has an edge from `self` to `next`
    pub fn can_transition_to(self, next: ProcessState) -> bool {
        matches!(
            (self, next),
            (ProcessState::Ready, ProcessState::Running)
                | (ProcessState::Running, ProcessState::Ready)
                | (ProcessState::Running, ProcessState::Blocked)
                | (ProcessState::Blocked, ProcessState::Ready)
        )
    }
}

/// Process descriptor
#[derive(Clone, Debug)]
pub struct Process {
    /// Process ID
    pub pid: ProcessId,
    /// Display name
    pub name: String,
    /// Consecutive scheduling opportunities per rotation (0 counts as 1)
    pub priority: u32,
    /// Current state
    pub state: ProcessState,
    /// Accumulated simulated CPU time (microseconds)
    pub cpu_time_us: u64,
    /// Scheduling opportunities received
    pub run_count: u64,
    /// Kernel pool blocks backing this process
    pub(crate) blocks: Vec<BlockHandle>,
}

impl Process {
    /// Pool blocks held by this process
    pub fn blocks(&self) -> &[BlockHandle] {
        &self.blocks
    }

    /// Serializable summary
    pub fn info(&self) -> ProcessInfo {
        ProcessInfo {
            pid: self.pid,
            name: self.name.clone(),
            priority: self.priority,
            state: self.state,
            cpu_time_us: self.cpu_time_us,
            run_count: self.run_count,
        }
    }
}

/// Process summary for shells and reports
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProcessInfo {
    pub pid: ProcessId,
    pub name: String,
    pub priority: u32,
    pub state: ProcessState,
    pub cpu_time_us: u64,
    pub run_count: u64,
}

/// Aggregate memory figures, in bytes.
///
/// Derived from pool usage on demand; never stored as a source of truth.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MemoryInfo {
    pub total: u64,
    pub used: u64,
    pub free: u64,
}

impl From<PoolUsage> for MemoryInfo {
    fn from(usage: PoolUsage) -> Self {
        Self {
            total: usage.total_bytes(),
            used: usage.used_bytes(),
            free: usage.free_bytes(),
        }
    }
}

impl Add for MemoryInfo {
    type Output = MemoryInfo;

    fn add(self, other: MemoryInfo) -> MemoryInfo {
        MemoryInfo {
            total: self.total + other.total,
            used: self.used + other.used,
            free: self.free + other.free,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_state_machine_edges() {
        use ProcessState::*;
        assert!(Ready.can_transition_to(Running));
        assert!(Running.can_transition_to(Ready));
        assert!(Running.can_transition_to(Blocked));
        assert!(Blocked.can_transition_to(Ready));

        assert!(!Blocked.can_transition_to(Running));
        assert!(!Ready.can_transition_to(Blocked));
        assert!(!Ready.can_transition_to(Ready));
    }

    #[test]
    fn test_memory_info_sum() {
        let a = MemoryInfo::from(PoolUsage {
            block_size: 10,
            total_blocks: 10,
            used_blocks: 3,
        });
        let b = MemoryInfo {
            total: 50,
            used: 50,
            free: 0,
        };
        let sum = a + b;
        assert_eq!(sum.total, 150);
        assert_eq!(sum.used, 80);
        assert_eq!(sum.free, 70);
    }
}
