//! Kernel state - pure data structure holding all kernel state
//!
//! This module contains the KernelState struct which owns the process table,
//! the scheduler and the kernel block pool. It has NO logging and NO callback
//! dependency; those are added by the runtime wrapper (`mos-kernel`).

use alloc::string::String;
use alloc::vec::Vec;

use mos_alloc::{FixedMap, MemoryPool, PoolUsage};

use crate::config::KernelConfig;
use crate::error::KernelError;
use crate::scheduler::Scheduler;
use crate::types::{MemoryInfo, Process, ProcessId, ProcessState};

/// The pure kernel state
pub struct KernelState {
    /// Process table, keyed by pid
    pub(crate) processes: FixedMap<Process>,
    /// Ready queue and running slot
    pub(crate) scheduler: Scheduler,
    /// Kernel block pool
    pub(crate) pool: MemoryPool,
    /// Next process ID to allocate
    pub(crate) next_pid: u64,
    /// Configuration fixed at creation
    pub(crate) config: KernelConfig,
}

impl KernelState {
    /// Create an empty kernel state from a validated configuration
    pub fn new(config: KernelConfig) -> Result<Self, KernelError> {
        config.validate()?;
        let pool = MemoryPool::new(config.block_size, config.block_count())?;

        Ok(Self {
            processes: FixedMap::with_capacity(config.max_processes),
            scheduler: Scheduler::new(),
            pool,
            next_pid: 1,
            config,
        })
    }

    /// Configuration this kernel was created with
    pub fn config(&self) -> &KernelConfig {
        &self.config
    }

    // ========================================================================
    // Read-only accessors
    // ========================================================================

    /// Get process info
    pub fn get_process(&self, pid: ProcessId) -> Option<&Process> {
        self.processes.get(pid.0)
    }

    /// All processes in pid order
    pub fn list_processes(&self) -> Vec<&Process> {
        let mut list: Vec<&Process> = self.processes.values().collect();
        list.sort_by_key(|p| p.pid);
        list
    }

    /// Number of live processes
    pub fn process_count(&self) -> usize {
        self.processes.len()
    }

    /// Process holding the current slice
    pub fn running(&self) -> Option<ProcessId> {
        self.scheduler.running()
    }

    /// Ready queue, front first
    pub fn ready_queue(&self) -> Vec<ProcessId> {
        self.scheduler.ready_queue().collect()
    }

    /// Scheduler ticks executed so far
    pub fn ticks(&self) -> u64 {
        self.scheduler.ticks()
    }

    /// Kernel pool block accounting
    pub fn pool_usage(&self) -> PoolUsage {
        self.pool.usage()
    }

    /// Kernel memory figures derived from the pool
    pub fn memory_info(&self) -> MemoryInfo {
        MemoryInfo::from(self.pool.usage())
    }

    // ========================================================================
    // State mutation (pure - no side effects)
    // ========================================================================

    /// Create a process in the `Ready` state
    ///
    /// # Returns
    /// * `Err(KernelError::ProcessTableFull)` - `max_processes` reached
    /// * `Err(KernelError::OutOfMemory)` - pool cannot back the process
    pub fn create_process(&mut self, name: &str, priority: u32) -> Result<ProcessId, KernelError> {
        if self.processes.is_full() {
            return Err(KernelError::ProcessTableFull {
                max: self.config.max_processes,
            });
        }

        let blocks = self.pool.allocate_many(self.config.blocks_per_process)?;
        let pid = ProcessId(self.next_pid);

        let process = Process {
            pid,
            name: String::from(name),
            priority,
            state: ProcessState::Ready,
            cpu_time_us: 0,
            run_count: 0,
            blocks: blocks.clone(),
        };

        if let Err(e) = self.processes.put(pid.0, process) {
            for block in blocks {
                let _ = self.pool.free(block);
            }
            return Err(e.into());
        }

        self.next_pid += 1;
        self.scheduler.admit(pid, priority, &self.processes);
        Ok(pid)
    }

    /// Remove a process regardless of state. Unknown pids are a no-op.
    pub fn destroy_process(&mut self, pid: ProcessId) -> Option<Process> {
        let process = self.processes.remove(pid.0)?;
        self.scheduler.remove(pid);
        for &block in &process.blocks {
            // Blocks were allocated for this process and freed nowhere else
            let freed = self.pool.free(block);
            debug_assert!(freed.is_ok());
        }
        Some(process)
    }

    /// Running → Blocked
    pub fn block(&mut self, pid: ProcessId) -> Result<(), KernelError> {
        self.transition(pid, ProcessState::Blocked)?;
        self.scheduler.release(pid);
        Ok(())
    }

    /// Blocked → Ready (joins the back of the rotation)
    pub fn unblock(&mut self, pid: ProcessId) -> Result<(), KernelError> {
        self.transition(pid, ProcessState::Ready)?;
        self.scheduler.requeue(pid);
        Ok(())
    }

    /// Running → Ready, giving up the rest of the slice
    pub fn preempt(&mut self, pid: ProcessId) -> Result<(), KernelError> {
        let state = self.state_of(pid)?;
        if state != ProcessState::Running {
            return Err(KernelError::InvalidTransition {
                pid,
                from: state,
                to: ProcessState::Ready,
            });
        }
        self.transition(pid, ProcessState::Ready)?;
        self.scheduler.release(pid);
        self.scheduler.requeue(pid);
        Ok(())
    }

    /// Advance one scheduling tick and charge the process that ran
    pub fn tick(&mut self) -> Option<ProcessId> {
        let pid = self.scheduler.tick(&mut self.processes)?;
        if let Some(process) = self.processes.get_mut(pid.0) {
            process.run_count += 1;
            process.cpu_time_us += self.config.time_slice_us;
        }
        Some(pid)
    }

    fn state_of(&self, pid: ProcessId) -> Result<ProcessState, KernelError> {
        self.processes
            .get(pid.0)
            .map(|p| p.state)
            .ok_or(KernelError::ProcessNotFound(pid))
    }

    fn transition(&mut self, pid: ProcessId, to: ProcessState) -> Result<(), KernelError> {
        let process = self
            .processes
            .get_mut(pid.0)
            .ok_or(KernelError::ProcessNotFound(pid))?;

        if !process.state.can_transition_to(to) {
            return Err(KernelError::InvalidTransition {
                pid,
                from: process.state,
                to,
            });
        }
        process.state = to;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mos_alloc::AllocError;

    fn small_config() -> KernelConfig {
        KernelConfig {
            memory_size: 16 * 64,
            block_size: 64,
            blocks_per_process: 2,
            max_processes: 4,
            max_threads: 16,
            time_slice_us: 100,
        }
    }

    #[test]
    fn test_create_and_destroy() {
        let mut state = KernelState::new(small_config()).unwrap();
        let pid = state.create_process("init", 1).unwrap();

        assert_eq!(pid, ProcessId(1));
        assert_eq!(state.get_process(pid).unwrap().state, ProcessState::Ready);
        assert_eq!(state.pool_usage().used_blocks, 2);

        assert!(state.destroy_process(pid).is_some());
        assert!(state.get_process(pid).is_none());
        assert_eq!(state.pool_usage().used_blocks, 0);

        // Idempotent teardown
        assert!(state.destroy_process(pid).is_none());
    }

    #[test]
    fn test_process_table_full() {
        let mut state = KernelState::new(small_config()).unwrap();
        for i in 0..4 {
            state.create_process("p", i).unwrap();
        }
        assert_eq!(
            state.create_process("overflow", 1),
            Err(KernelError::ProcessTableFull { max: 4 })
        );
    }

    #[test]
    fn test_out_of_kernel_memory() {
        let mut config = small_config();
        config.memory_size = 3 * 64;
        let mut state = KernelState::new(config).unwrap();

        state.create_process("a", 1).unwrap();
        assert_eq!(
            state.create_process("b", 1),
            Err(KernelError::OutOfMemory(AllocError::OutOfBlocks))
        );
        assert_eq!(state.process_count(), 1);
    }

    #[test]
    fn test_block_requires_running() {
        let mut state = KernelState::new(small_config()).unwrap();
        let pid = state.create_process("p", 1).unwrap();

        let err = state.block(pid).unwrap_err();
        assert!(matches!(err, KernelError::InvalidTransition { .. }));

        assert_eq!(state.tick(), Some(pid));
        state.block(pid).unwrap();
        assert_eq!(state.running(), None);
        assert_eq!(state.tick(), None);

        // Blocked → Running does not exist
        state.unblock(pid).unwrap();
        assert_eq!(state.get_process(pid).unwrap().state, ProcessState::Ready);
        assert_eq!(state.tick(), Some(pid));
    }

    #[test]
    fn test_preempt_rotates() {
        let mut state = KernelState::new(small_config()).unwrap();
        let a = state.create_process("a", 3).unwrap();
        let b = state.create_process("b", 1).unwrap();

        assert_eq!(state.tick(), Some(a));
        state.preempt(a).unwrap();
        assert_eq!(state.ready_queue(), [b, a]);
        assert_eq!(state.tick(), Some(b));
        assert!(state.preempt(a).is_err());
    }

    #[test]
    fn test_tick_charges_cpu_time() {
        let mut state = KernelState::new(small_config()).unwrap();
        let pid = state.create_process("p", 1).unwrap();
        for _ in 0..5 {
            state.tick();
        }
        let process = state.get_process(pid).unwrap();
        assert_eq!(process.run_count, 5);
        assert_eq!(process.cpu_time_us, 500);
        assert_eq!(state.ticks(), 5);
    }

    #[test]
    fn test_unknown_pid() {
        let mut state = KernelState::new(small_config()).unwrap();
        assert_eq!(
            state.unblock(ProcessId(42)),
            Err(KernelError::ProcessNotFound(ProcessId(42)))
        );
    }

    #[test]
    fn test_memory_info() {
        let mut state = KernelState::new(small_config()).unwrap();
        state.create_process("p", 1).unwrap();
        let info = state.memory_info();
        assert_eq!(info.total, 1024);
        assert_eq!(info.used, 128);
        assert_eq!(info.free, 896);
    }
}
