//! Kernel integration tests
//!
//! Scheduling fairness, table limits and memory accounting through the
//! public runtime API.

use std::collections::BTreeMap;
use std::sync::{Arc, Mutex};

use mos_kernel::{
    ErrorKind, Kernel, KernelConfig, KernelError, ProcessId, ProcessState, RunSummary,
};

fn init_logger() {
    let _ = env_logger::Builder::from_default_env()
        .is_test(true)
        .try_init();
}

fn small_kernel(max_processes: usize) -> Kernel {
    init_logger();
    Kernel::init(KernelConfig {
        memory_size: 256 * 4096,
        max_processes,
        max_threads: max_processes * 4,
        ..Default::default()
    })
    .unwrap()
}

/// Run `ticks` opportunities and count them per pid
fn run_counts(kernel: &mut Kernel, ticks: usize) -> BTreeMap<u64, u64> {
    let mut counts = BTreeMap::new();
    for _ in 0..ticks {
        if let Some(pid) = kernel.schedule_process() {
            *counts.entry(pid.0).or_insert(0) += 1;
        }
    }
    counts
}

// ============================================================================
// Fairness
// ============================================================================

#[test]
fn test_weighted_round_robin_ratio() {
    let mut kernel = small_kernel(8);
    let p1 = kernel.process_create("one", 1, None).unwrap();
    let p2 = kernel.process_create("two", 1, None).unwrap();
    let p3 = kernel.process_create("three", 2, None).unwrap();

    let counts = run_counts(&mut kernel, 8);
    assert_eq!(counts[&p1.0], 2);
    assert_eq!(counts[&p2.0], 2);
    assert_eq!(counts[&p3.0], 4);
}

#[test]
fn test_one_rotation_gives_each_its_priority() {
    let mut kernel = small_kernel(8);
    let priorities = [3u32, 1, 2, 4];
    let pids: Vec<ProcessId> = priorities
        .iter()
        .map(|&p| kernel.process_create("p", p, None).unwrap())
        .collect();

    let rotation: u64 = priorities.iter().map(|&p| p as u64).sum();
    let counts = run_counts(&mut kernel, rotation as usize);

    for (pid, &priority) in pids.iter().zip(&priorities) {
        assert_eq!(counts[&pid.0], priority as u64, "pid {}", pid.0);
    }
}

#[test]
fn test_equal_priority_is_creation_order() {
    let mut kernel = small_kernel(8);
    let order = Arc::new(Mutex::new(Vec::new()));

    for name in ["a", "b", "c"] {
        let order = order.clone();
        kernel
            .process_create(
                name,
                1,
                Some(Box::new(move |pid: ProcessId| {
                    order.lock().unwrap().push(pid.0);
                })),
            )
            .unwrap();
    }

    kernel.run(6);
    assert_eq!(*order.lock().unwrap(), vec![1, 2, 3, 1, 2, 3]);
}

#[test]
fn test_no_ready_process_is_starved() {
    let mut kernel = small_kernel(8);
    kernel.process_create("hog", 50, None).unwrap();
    let small = kernel.process_create("small", 1, None).unwrap();

    // One full rotation is 51 opportunities
    let counts = run_counts(&mut kernel, 51);
    assert_eq!(counts[&small.0], 1);
}

// ============================================================================
// State machine
// ============================================================================

#[test]
fn test_blocked_process_is_not_scheduled() {
    let mut kernel = small_kernel(8);
    let a = kernel.process_create("a", 1, None).unwrap();
    let b = kernel.process_create("b", 1, None).unwrap();

    assert_eq!(kernel.schedule_process(), Some(a));
    kernel.block(a).unwrap();
    assert_eq!(kernel.process(a).unwrap().state, ProcessState::Blocked);

    let counts = run_counts(&mut kernel, 4);
    assert_eq!(counts.get(&a.0), None);
    assert_eq!(counts[&b.0], 4);

    kernel.unblock(a).unwrap();
    let counts = run_counts(&mut kernel, 2);
    assert_eq!(counts[&a.0], 1);
    assert!(kernel.check_invariants().is_empty());
}

#[test]
fn test_unblock_of_ready_process_is_invalid_state() {
    let mut kernel = small_kernel(8);
    let pid = kernel.process_create("p", 1, None).unwrap();
    let err = kernel.unblock(pid).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::InvalidState);
}

#[test]
fn test_destroy_running_process() {
    let mut kernel = small_kernel(8);
    let a = kernel.process_create("a", 3, None).unwrap();
    let b = kernel.process_create("b", 1, None).unwrap();

    assert_eq!(kernel.schedule_process(), Some(a));
    assert!(kernel.process_destroy(a));
    assert_eq!(kernel.running(), None);
    assert_eq!(kernel.schedule_process(), Some(b));
    assert!(kernel.check_invariants().is_empty());
}

// ============================================================================
// Limits and accounting
// ============================================================================

#[test]
fn test_process_table_full_is_recoverable() {
    let mut kernel = small_kernel(2);
    let a = kernel.process_create("a", 1, None).unwrap();
    kernel.process_create("b", 1, None).unwrap();

    let err = kernel.process_create("c", 1, None).unwrap_err();
    assert_eq!(err, KernelError::ProcessTableFull { max: 2 });
    assert_eq!(err.kind(), ErrorKind::ResourceExhausted);
    assert!(err.kind().is_recoverable());

    // Freeing a slot makes room again
    kernel.process_destroy(a);
    assert!(kernel.process_create("c", 1, None).is_ok());
}

#[test]
fn test_memory_info_tracks_processes() {
    let mut kernel = small_kernel(8);
    let before = kernel.memory_info();
    assert_eq!(before.used, 0);
    assert_eq!(before.total, 256 * 4096);

    let pid = kernel.process_create("p", 1, None).unwrap();
    let during = kernel.memory_info();
    assert_eq!(during.used, 4096);
    assert_eq!(during.used + during.free, during.total);

    kernel.process_destroy(pid);
    assert_eq!(kernel.memory_info(), before);
}

#[test]
fn test_run_summary_counts_idle() {
    let mut kernel = small_kernel(4);
    let pid = kernel.process_create("p", 1, None).unwrap();
    kernel.schedule_process();
    kernel.block(pid).unwrap();

    let summary = kernel.run(3);
    assert_eq!(
        summary,
        RunSummary {
            ticks: 3,
            dispatched: 0,
            idle: 3,
            entries_called: 0,
        }
    );
}

#[test]
fn test_process_infos_in_pid_order() {
    let mut kernel = small_kernel(4);
    kernel.process_create("first", 1, None).unwrap();
    kernel.process_create("second", 5, None).unwrap();

    let infos = kernel.processes();
    let names: Vec<&str> = infos.iter().map(|i| i.name.as_str()).collect();
    assert_eq!(names, ["first", "second"]);
}
