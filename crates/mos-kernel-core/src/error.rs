//! Kernel errors

use mos_alloc::AllocError;
use mos_hal::ErrorKind;

use crate::types::{ProcessId, ProcessState};

/// Errors returned by kernel operations
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum KernelError {
    /// The process table holds `max` processes already
    #[error("process table full ({max} processes)")]
    ProcessTableFull { max: usize },

    /// No process with this id
    #[error("process {0:?} not found")]
    ProcessNotFound(ProcessId),

    /// The state machine has no such edge
    #[error("process {pid:?} cannot move from {from:?} to {to:?}")]
    InvalidTransition {
        pid: ProcessId,
        from: ProcessState,
        to: ProcessState,
    },

    /// Kernel block pool could not satisfy the request
    #[error("kernel memory: {0}")]
    OutOfMemory(#[from] AllocError),

    /// Configuration rejected at init
    #[error("invalid kernel configuration: {0}")]
    InvalidConfig(&'static str),
}

impl KernelError {
    /// Classify this error
    pub fn kind(&self) -> ErrorKind {
        match self {
            KernelError::ProcessTableFull { .. } => ErrorKind::ResourceExhausted,
            KernelError::ProcessNotFound(_) => ErrorKind::NotFound,
            KernelError::InvalidTransition { .. } | KernelError::InvalidConfig(_) => {
                ErrorKind::InvalidState
            }
            KernelError::OutOfMemory(e) => e.kind(),
        }
    }
}
