//! Runtime-checkable kernel invariants
//!
//! Used by unit tests, integration tests and debug assertions in the runtime
//! wrapper after every mutation.
//!
//! # Invariants
//!
//! 1. **Single Running**: at most one process is `Running`, and it is the one
//!    holding the scheduler's slice
//! 2. **Queue Consistency**: every queued pid exists, is `Ready` and appears once
//! 3. **No Starvation**: every `Ready` process is queued
//! 4. **Pool Ownership**: pool blocks in use equal the blocks held by processes
//! 5. **ID Monotonicity**: the next pid is greater than every live pid

use alloc::collections::BTreeSet;
use alloc::format;
use alloc::string::String;
use alloc::vec::Vec;

use crate::state::KernelState;
use crate::types::ProcessState;

/// An invariant violation with details
#[derive(Clone, Debug)]
pub struct InvariantViolation {
    /// Name of the violated invariant
    pub invariant: &'static str,
    /// Description of what went wrong
    pub description: String,
}

/// Check all kernel invariants.
///
/// Returns a list of violations (empty if all invariants hold).
pub fn check_all_invariants(state: &KernelState) -> Vec<InvariantViolation> {
    let mut violations = Vec::new();

    violations.extend(check_single_running(state));
    violations.extend(check_queue_consistency(state));
    violations.extend(check_ready_processes_queued(state));
    violations.extend(check_pool_ownership(state));
    violations.extend(check_id_monotonicity(state));

    violations
}

/// Invariant 1: one running process, matching the scheduler slot
fn check_single_running(state: &KernelState) -> Vec<InvariantViolation> {
    let mut violations = Vec::new();

    let running: Vec<_> = state
        .processes
        .values()
        .filter(|p| p.state == ProcessState::Running)
        .map(|p| p.pid)
        .collect();

    if running.len() > 1 {
        violations.push(InvariantViolation {
            invariant: "single_running",
            description: format!("{} processes are Running: {:?}", running.len(), running),
        });
    }

    let slot = state.scheduler.running();
    if running.first().copied() != slot {
        violations.push(InvariantViolation {
            invariant: "single_running",
            description: format!(
                "scheduler slot holds {:?} but table says {:?}",
                slot, running
            ),
        });
    }

    violations
}

/// Invariant 2: queued pids exist, are Ready and are unique
fn check_queue_consistency(state: &KernelState) -> Vec<InvariantViolation> {
    let mut violations = Vec::new();
    let mut seen = BTreeSet::new();

    for pid in state.scheduler.ready_queue() {
        if !seen.insert(pid) {
            violations.push(InvariantViolation {
                invariant: "queue_consistency",
                description: format!("process {} queued more than once", pid.0),
            });
        }

        match state.processes.get(pid.0) {
            None => violations.push(InvariantViolation {
                invariant: "queue_consistency",
                description: format!("queued process {} does not exist", pid.0),
            }),
            Some(p) if p.state != ProcessState::Ready => violations.push(InvariantViolation {
                invariant: "queue_consistency",
                description: format!("queued process {} is {:?}", pid.0, p.state),
            }),
            Some(_) => {}
        }
    }

    violations
}

/// Invariant 3: no Ready process is missing from the queue
fn check_ready_processes_queued(state: &KernelState) -> Vec<InvariantViolation> {
    let queued: BTreeSet<_> = state.scheduler.ready_queue().collect();

    state
        .processes
        .values()
        .filter(|p| p.state == ProcessState::Ready && !queued.contains(&p.pid))
        .map(|p| InvariantViolation {
            invariant: "ready_processes_queued",
            description: format!("Ready process {} is not in the ready queue", p.pid.0),
        })
        .collect()
}

/// Invariant 4: every used pool block belongs to exactly one process
fn check_pool_ownership(state: &KernelState) -> Vec<InvariantViolation> {
    let mut violations = Vec::new();
    let mut owned = BTreeSet::new();

    for process in state.processes.values() {
        for &block in process.blocks() {
            if !owned.insert(block) {
                violations.push(InvariantViolation {
                    invariant: "pool_ownership",
                    description: format!(
                        "block {} is held by more than one process",
                        block.index()
                    ),
                });
            }
            if !state.pool.is_allocated(block) {
                violations.push(InvariantViolation {
                    invariant: "pool_ownership",
                    description: format!(
                        "process {} holds free block {}",
                        process.pid.0,
                        block.index()
                    ),
                });
            }
        }
    }

    let used = state.pool.usage().used_blocks;
    if used != owned.len() {
        violations.push(InvariantViolation {
            invariant: "pool_ownership",
            description: format!(
                "pool reports {} used blocks but processes hold {}",
                used,
                owned.len()
            ),
        });
    }

    violations
}

/// Invariant 5: next_pid > all existing pids
fn check_id_monotonicity(state: &KernelState) -> Vec<InvariantViolation> {
    state
        .processes
        .keys()
        .filter(|&pid| pid >= state.next_pid)
        .map(|pid| InvariantViolation {
            invariant: "id_monotonicity",
            description: format!("process {} >= next_pid {}", pid, state.next_pid),
        })
        .collect()
}
