//! Desktop system binding
//!
//! Ties the process kernel to the compositor through an explicit
//! [`Desktop`] context:
//!
//! ```text
//!  shell ──▶ EventQueue ──▶ EventLoop ──publish──▶ SceneWriter
//!                           (kernel, windows)          │
//!                                                 spin::Mutex slot
//!                                                      │
//!                           RenderLoop ◀──take──── SceneReader
//!                           (compositor)
//! ```
//!
//! The event loop is the only writer of process and window state. The
//! render loop only ever sees complete snapshots, so the two can run on
//! separate threads (see [`Desktop::into_loops`]) or interleaved on one
//! ([`Desktop::run_frame`]).
//!
//! ## Example
//!
//! ```rust
//! use mos_desktop::CompositorConfig;
//! use mos_system::{Desktop, InboundEvent, SystemConfig};
//!
//! let config = SystemConfig {
//!     compositor: CompositorConfig {
//!         width: 1280,
//!         height: 800,
//!         ..Default::default()
//!     },
//!     ..Default::default()
//! };
//! let mut desktop = Desktop::boot(config).unwrap();
//! desktop.push_event(InboundEvent::LaunchApp { name: "Terminal".into() });
//!
//! let report = desktop.run_frame(1.0 / 60.0);
//! assert_eq!(report.window_order.len(), 1);
//! ```

mod apps;
mod config;
mod desktop;
mod event_loop;
mod events;
mod pacing;
mod render_loop;
mod scene;

pub use apps::{AppCapabilities, AppContent, AppDescriptor, AppKind};
pub use config::{PacingConfig, SystemConfig, MAX_FRAME_DT, SCHEDULER_TICKS_PER_FRAME};
pub use desktop::Desktop;
pub use event_loop::{EventLoop, IterationSummary, RunningApp};
pub use events::{EventQueue, EventSummary, InboundEvent, MAX_EVENTS_PER_ITERATION};
pub use pacing::FramePacer;
pub use render_loop::RenderLoop;
pub use scene::{scene_channel, SceneReader, SceneSnapshot, SceneWriter};

use mos_desktop::{RenderError, WindowError};
use mos_hal::ErrorKind;
use mos_kernel::{KernelError, ProcessId};

/// Errors surfaced by the desktop context
#[derive(Clone, Debug, PartialEq, thiserror::Error)]
pub enum SystemError {
    #[error("kernel: {0}")]
    Kernel(#[from] KernelError),

    #[error("window: {0}")]
    Window(#[from] WindowError),

    #[error("render: {0}")]
    Render(#[from] RenderError),

    /// No built-in application has this name
    #[error("unknown application '{0}'")]
    UnknownApp(String),

    /// The process id is not live
    #[error("process {0:?} not found")]
    UnknownProcess(ProcessId),

    #[error("invalid system configuration: {0}")]
    InvalidConfig(&'static str),
}

impl SystemError {
    /// Classify this error
    pub fn kind(&self) -> ErrorKind {
        match self {
            SystemError::Kernel(e) => e.kind(),
            SystemError::Window(e) => e.kind(),
            SystemError::Render(e) => e.kind(),
            SystemError::UnknownApp(_) | SystemError::UnknownProcess(_) => ErrorKind::NotFound,
            SystemError::InvalidConfig(_) => ErrorKind::InvalidState,
        }
    }
}
