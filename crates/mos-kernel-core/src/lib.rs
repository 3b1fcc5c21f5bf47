//! Kernel Core - Pure Process State Machine
//!
//! This crate contains the **pure, side-effect-free** part of the simulated
//! kernel: the process table, the weighted round-robin scheduler and the
//! memory accounting derived from the kernel's block pool.
//!
//! # Design Principles
//!
//! 1. **No logging, no callbacks**: entry points and diagnostics live in `mos-kernel`
//! 2. **Deterministic**: the same call sequence always yields the same pids,
//!    block handles and schedule
//! 3. **Checkable**: [`check_all_invariants`] verifies the table and the ready
//!    queue agree after any operation
//!
//! # Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────────────────┐
//! │                  mos-kernel-core                     │
//! │                                                      │
//! │   ┌───────────────┐        ┌───────────────┐         │
//! │   │  KernelState  │───────▶│   Scheduler   │         │
//! │   │  - processes  │        │  ready queue  │         │
//! │   │  - pool       │        │  time slices  │         │
//! │   └───────────────┘        └───────────────┘         │
//! └──────────────────────────────────────────────────────┘
//!                          │ used by
//!                          ▼
//! ┌──────────────────────────────────────────────────────┐
//! │                     mos-kernel                       │
//! │   entry callbacks, logging, run loop                 │
//! └──────────────────────────────────────────────────────┘
//! ```
//!
//! # Process States
//!
//! ```text
//!   create ──▶ Ready ◀──── preempt ──── Running
//!               │  ▲                     │  ▲
//!               │  └── unblock ─ Blocked ◀┘  │
//!               └──────── schedule ──────────┘
//! ```
//!
//! There is no edge between `Blocked` and `Running`.

#![no_std]
extern crate alloc;

pub mod config;
pub mod error;
pub mod invariants;
pub mod scheduler;
pub mod state;
pub mod types;

pub use config::KernelConfig;
pub use error::KernelError;
pub use invariants::{check_all_invariants, InvariantViolation};
pub use scheduler::Scheduler;
pub use state::KernelState;
pub use types::{MemoryInfo, Process, ProcessId, ProcessInfo, ProcessState};
