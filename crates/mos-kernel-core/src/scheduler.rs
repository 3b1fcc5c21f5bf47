//! Weighted round-robin scheduler
//!
//! A process with priority `P` receives `P` consecutive scheduling
//! opportunities (priority 0 counts as 1) before it rotates to the back of
//! the ready queue. New processes are admitted behind every queued process of
//! equal or higher priority, so higher priorities run sooner and equal
//! priorities keep creation order. Preempted and unblocked processes always
//! rotate to the back, which bounds the wait of any ready process to one
//! full rotation of the queue.

use alloc::collections::VecDeque;

use mos_alloc::FixedMap;

use crate::types::{Process, ProcessId, ProcessState};

/// The process currently holding the CPU
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
struct Slice {
    pid: ProcessId,
    /// Opportunities left after the current one
    remaining: u32,
}

/// Weighted round-robin scheduler
#[derive(Debug, Default)]
pub struct Scheduler {
    ready: VecDeque<ProcessId>,
    current: Option<Slice>,
    ticks: u64,
}

impl Scheduler {
    pub fn new() -> Self {
        Self::default()
    }

    /// Consecutive opportunities for a priority
    #[inline]
    pub fn quantum(priority: u32) -> u32 {
        priority.max(1)
    }

    /// Admit a newly created process, ordered by priority
    pub fn admit(&mut self, pid: ProcessId, priority: u32, table: &FixedMap<Process>) {
        let position = self.ready.iter().position(|queued| {
            table
                .get(queued.0)
                .map_or(false, |p| p.priority < priority)
        });
        match position {
            Some(index) => self.ready.insert(index, pid),
            None => self.ready.push_back(pid),
        }
    }

    /// Put a process at the back of the rotation
    pub fn requeue(&mut self, pid: ProcessId) {
        self.ready.push_back(pid);
    }

    /// Forget a process entirely
    pub fn remove(&mut self, pid: ProcessId) {
        self.ready.retain(|&queued| queued != pid);
        if self.running() == Some(pid) {
            self.current = None;
        }
    }

    /// Drop the running slot without requeueing (the caller changed its state)
    pub fn release(&mut self, pid: ProcessId) {
        if self.running() == Some(pid) {
            self.current = None;
        }
    }

    /// Process holding the current time slice
    pub fn running(&self) -> Option<ProcessId> {
        self.current.map(|slice| slice.pid)
    }

    /// Ready queue, front first
    pub fn ready_queue(&self) -> impl Iterator<Item = ProcessId> + '_ {
        self.ready.iter().copied()
    }

    /// Ticks executed so far
    pub fn ticks(&self) -> u64 {
        self.ticks
    }

    /// Advance one scheduling opportunity.
    ///
    /// Updates process states in `table` and returns the process that runs
    /// for this tick, or `None` when nothing is ready.
    pub fn tick(&mut self, table: &mut FixedMap<Process>) -> Option<ProcessId> {
        self.ticks += 1;

        if let Some(slice) = self.current.take() {
            let still_running = table
                .get(slice.pid.0)
                .map_or(false, |p| p.state == ProcessState::Running);

            if still_running && slice.remaining > 0 {
                self.current = Some(Slice {
                    pid: slice.pid,
                    remaining: slice.remaining - 1,
                });
                return Some(slice.pid);
            }

            if still_running {
                if let Some(process) = table.get_mut(slice.pid.0) {
                    process.state = ProcessState::Ready;
                }
                self.ready.push_back(slice.pid);
            }
        }

        while let Some(pid) = self.ready.pop_front() {
            let Some(process) = table.get_mut(pid.0) else {
                continue;
            };
            if process.state != ProcessState::Ready {
                continue;
            }

            process.state = ProcessState::Running;
            self.current = Some(Slice {
                pid,
                remaining: Self::quantum(process.priority) - 1,
            });
            return Some(pid);
        }

        None
    }
}
