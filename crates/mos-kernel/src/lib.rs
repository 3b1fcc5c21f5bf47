//! Simulated process kernel
//!
//! Wraps the pure [`KernelState`] with the parts that have side effects:
//! process entry callbacks, logging and the bounded run loop.
//!
//! ```text
//! Kernel::init ──▶ process_create ──▶ schedule_process / run ──▶ process_destroy
//!                        │                   │
//!                        ▼                   ▼
//!                  pool blocks         entry(pid) per opportunity
//! ```
//!
//! "Concurrency" is cooperative: every state change happens synchronously
//! inside one of these calls, driven by the event loop.

use log::{debug, info, trace};
use mos_alloc::FixedMap;

pub use mos_hal::ErrorKind;
pub use mos_kernel_core::config;
pub use mos_kernel_core::{
    check_all_invariants, InvariantViolation, KernelConfig, KernelError, KernelState, MemoryInfo,
    Process, ProcessId, ProcessInfo, ProcessState,
};

/// Code run each time a process receives a scheduling opportunity
pub type ProcessEntry = Box<dyn FnMut(ProcessId) + Send>;

/// Outcome of [`Kernel::run`]
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct RunSummary {
    /// Ticks executed
    pub ticks: u64,
    /// Ticks where a process ran
    pub dispatched: u64,
    /// Ticks with an empty ready queue
    pub idle: u64,
    /// Entry callbacks invoked
    pub entries_called: u64,
}

/// The runtime kernel
pub struct Kernel {
    state: KernelState,
    entries: FixedMap<ProcessEntry>,
}

impl Kernel {
    /// Boot a kernel from configuration (`kernel_init`)
    pub fn init(config: KernelConfig) -> Result<Self, KernelError> {
        let max_processes = config.max_processes;
        let state = KernelState::new(config)?;
        info!(
            "kernel: init {} MiB in {} blocks, {} process slots",
            state.config().memory_size / (1024 * 1024),
            state.config().block_count(),
            max_processes
        );
        Ok(Self {
            state,
            entries: FixedMap::with_capacity(max_processes),
        })
    }

    /// Pure state, read-only
    pub fn state(&self) -> &KernelState {
        &self.state
    }

    // ========================================================================
    // Process lifecycle
    // ========================================================================

    /// Create a process (`process_create`)
    ///
    /// # Returns
    /// * `Ok(pid)` - The process is `Ready` and queued
    /// * `Err(KernelError::ProcessTableFull)` - `max_processes` live processes exist
    /// * `Err(KernelError::OutOfMemory)` - kernel pool exhausted
    pub fn process_create(
        &mut self,
        name: &str,
        priority: u32,
        entry: Option<ProcessEntry>,
    ) -> Result<ProcessId, KernelError> {
        let pid = self.state.create_process(name, priority)?;

        if let Some(entry) = entry {
            // Same capacity as the process table, so this cannot overflow
            if let Err(e) = self.entries.put(pid.0, entry) {
                self.state.destroy_process(pid);
                return Err(e.into());
            }
        }

        debug!("kernel: created process {} '{}' priority {}", pid.0, name, priority);
        self.debug_check();
        Ok(pid)
    }

    /// Destroy a process regardless of state (`process_destroy`).
    ///
    /// Returns `false` for unknown pids.
    pub fn process_destroy(&mut self, pid: ProcessId) -> bool {
        self.entries.remove(pid.0);
        match self.state.destroy_process(pid) {
            Some(process) => {
                debug!(
                    "kernel: destroyed process {} '{}' after {} runs",
                    pid.0, process.name, process.run_count
                );
                self.debug_check();
                true
            }
            None => false,
        }
    }

    /// Running → Blocked
    pub fn block(&mut self, pid: ProcessId) -> Result<(), KernelError> {
        self.state.block(pid)?;
        debug!("kernel: process {} blocked", pid.0);
        Ok(())
    }

    /// Blocked → Ready
    pub fn unblock(&mut self, pid: ProcessId) -> Result<(), KernelError> {
        self.state.unblock(pid)?;
        debug!("kernel: process {} unblocked", pid.0);
        Ok(())
    }

    /// Running → Ready
    pub fn preempt(&mut self, pid: ProcessId) -> Result<(), KernelError> {
        self.state.preempt(pid)?;
        trace!("kernel: process {} preempted", pid.0);
        Ok(())
    }

    // ========================================================================
    // Scheduling
    // ========================================================================

    /// Advance one scheduling tick (`schedule_process`).
    ///
    /// Invokes the entry of the process that received the opportunity.
    pub fn schedule_process(&mut self) -> Option<ProcessId> {
        let pid = self.state.tick()?;
        trace!("kernel: tick {} -> process {}", self.state.ticks(), pid.0);

        if let Some(entry) = self.entries.get_mut(pid.0) {
            entry(pid);
        }
        self.debug_check();
        Some(pid)
    }

    /// Run a bounded number of ticks (`kernel_run`)
    pub fn run(&mut self, ticks: u64) -> RunSummary {
        let mut summary = RunSummary::default();
        for _ in 0..ticks {
            summary.ticks += 1;
            match self.schedule_process() {
                Some(pid) => {
                    summary.dispatched += 1;
                    if self.entries.contains_key(pid.0) {
                        summary.entries_called += 1;
                    }
                }
                None => summary.idle += 1,
            }
        }
        summary
    }

    // ========================================================================
    // Queries
    // ========================================================================

    /// Aggregate kernel memory (`get_memory_info`)
    pub fn memory_info(&self) -> MemoryInfo {
        self.state.memory_info()
    }

    pub fn process(&self, pid: ProcessId) -> Option<&Process> {
        self.state.get_process(pid)
    }

    /// Summaries of every live process, in pid order
    pub fn processes(&self) -> Vec<ProcessInfo> {
        self.state
            .list_processes()
            .into_iter()
            .map(Process::info)
            .collect()
    }

    pub fn running(&self) -> Option<ProcessId> {
        self.state.running()
    }

    pub fn process_count(&self) -> usize {
        self.state.process_count()
    }

    /// Verify table, queue and pool agree
    pub fn check_invariants(&self) -> Vec<InvariantViolation> {
        check_all_invariants(&self.state)
    }

    #[inline]
    fn debug_check(&self) {
        #[cfg(debug_assertions)]
        {
            let violations = check_all_invariants(&self.state);
            debug_assert!(violations.is_empty(), "kernel invariants: {:?}", violations);
        }
    }
}

impl std::fmt::Debug for Kernel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Kernel")
            .field("processes", &self.state.process_count())
            .field("running", &self.state.running())
            .field("ticks", &self.state.ticks())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicU64, Ordering};
    use std::sync::Arc;

    fn test_config() -> KernelConfig {
        KernelConfig {
            memory_size: 64 * 4096,
            max_processes: 8,
            max_threads: 32,
            ..Default::default()
        }
    }

    #[test]
    fn test_entry_called_per_opportunity() {
        let mut kernel = Kernel::init(test_config()).unwrap();
        let calls = Arc::new(AtomicU64::new(0));
        let counter = calls.clone();

        let pid = kernel
            .process_create(
                "worker",
                2,
                Some(Box::new(move |_| {
                    counter.fetch_add(1, Ordering::SeqCst);
                })),
            )
            .unwrap();
        kernel.process_create("idle", 1, None).unwrap();

        let summary = kernel.run(6);
        assert_eq!(summary.ticks, 6);
        assert_eq!(summary.dispatched, 6);
        assert_eq!(summary.entries_called, 4);
        assert_eq!(calls.load(Ordering::SeqCst), 4);
        assert_eq!(kernel.process(pid).unwrap().run_count, 4);
    }

    #[test]
    fn test_destroy_is_idempotent() {
        let mut kernel = Kernel::init(test_config()).unwrap();
        let pid = kernel.process_create("p", 1, None).unwrap();
        assert!(kernel.process_destroy(pid));
        assert!(!kernel.process_destroy(pid));
        assert!(!kernel.process_destroy(ProcessId(999)));
    }

    #[test]
    fn test_idle_ticks() {
        let mut kernel = Kernel::init(test_config()).unwrap();
        let summary = kernel.run(3);
        assert_eq!(summary.idle, 3);
        assert_eq!(summary.dispatched, 0);
    }
}
