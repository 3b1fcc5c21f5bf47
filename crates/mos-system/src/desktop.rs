//! Desktop context
//!
//! Explicitly constructed, explicitly passed. The caller builds one at
//! startup and drops it (or calls [`Desktop::shutdown`]) at exit; nothing
//! here is global.

use std::time::Instant;

use log::info;
use mos_desktop::{Compositor, FrameReport, WindowConfig, WindowId, WindowManager};
use mos_hal::GpuDevice;
use mos_kernel::{Kernel, MemoryInfo, ProcessId, RunSummary};

use crate::config::SystemConfig;
use crate::event_loop::{EventLoop, IterationSummary};
use crate::events::{EventQueue, InboundEvent};
use crate::pacing::FramePacer;
use crate::render_loop::RenderLoop;
use crate::scene::scene_channel;
use crate::SystemError;

/// Kernel, window registry and compositor, wired together
pub struct Desktop {
    event_loop: EventLoop,
    render_loop: RenderLoop,
    pacer: FramePacer,
    config: SystemConfig,
    last_iteration: IterationSummary,
}

impl Desktop {
    /// Boot every layer from one configuration
    pub fn new(config: SystemConfig, device: Box<dyn GpuDevice>) -> Result<Self, SystemError> {
        config.validate()?;

        let kernel = Kernel::init(config.kernel.clone())?;
        let windows = WindowManager::with_display(
            config.compositor.max_windows,
            config.compositor.width,
            config.compositor.height,
        );
        let compositor = Compositor::new(config.compositor.clone(), device)?;
        let (writer, reader) = scene_channel();

        info!(
            "Desktop up: {}x{} @ {} fps, {} process slots, {} window slots",
            config.compositor.width,
            config.compositor.height,
            config.pacing.target_fps,
            config.kernel.max_processes,
            config.compositor.max_windows
        );

        Ok(Self {
            event_loop: EventLoop::new(kernel, windows, writer, config.ticks_per_frame),
            render_loop: RenderLoop::new(compositor, reader),
            pacer: FramePacer::new(&config.pacing),
            config,
            last_iteration: IterationSummary::default(),
        })
    }

    /// Boot with the device picked by the GPU acceleration toggle
    pub fn boot(config: SystemConfig) -> Result<Self, SystemError> {
        let device = mos_hal::select_device(config.compositor.gpu_acceleration);
        Self::new(config, device)
    }

    pub fn config(&self) -> &SystemConfig {
        &self.config
    }

    pub fn kernel(&self) -> &Kernel {
        self.event_loop.kernel()
    }

    pub fn windows(&self) -> &WindowManager {
        self.event_loop.windows()
    }

    pub fn windows_mut(&mut self) -> &mut WindowManager {
        self.event_loop.windows_mut()
    }

    pub fn compositor(&self) -> &Compositor {
        self.render_loop.compositor()
    }

    pub fn event_loop(&self) -> &EventLoop {
        &self.event_loop
    }

    pub fn event_loop_mut(&mut self) -> &mut EventLoop {
        &mut self.event_loop
    }

    pub fn render_loop(&self) -> &RenderLoop {
        &self.render_loop
    }

    /// Handle for pushing inbound events
    pub fn events(&self) -> EventQueue {
        self.event_loop.events()
    }

    pub fn push_event(&self, event: InboundEvent) {
        self.event_loop.events().push(event);
    }

    /// What the most recent frame's event-loop iteration did
    pub fn last_iteration(&self) -> IterationSummary {
        self.last_iteration
    }

    // ========================================================================
    // Operations
    // ========================================================================

    pub fn launch_app(&mut self, name: &str) -> Result<ProcessId, SystemError> {
        self.event_loop.launch_app(name)
    }

    pub fn terminate_app(&mut self, pid: ProcessId) -> bool {
        self.event_loop.terminate_app(pid)
    }

    pub fn spawn_process(&mut self, name: &str, priority: u32) -> Result<ProcessId, SystemError> {
        self.event_loop.spawn_process(name, priority)
    }

    pub fn create_window(
        &mut self,
        owner: ProcessId,
        config: WindowConfig,
    ) -> Result<WindowId, SystemError> {
        self.event_loop.create_window(owner, config)
    }

    /// Drive scheduler ticks outside of a frame
    pub fn run_scheduler(&mut self, ticks: u64) -> RunSummary {
        self.event_loop.run_scheduler(ticks)
    }

    /// Kernel pool plus texture pool
    pub fn memory_info(&self) -> MemoryInfo {
        let textures = self.compositor().textures().usage();
        self.kernel().memory_info() + MemoryInfo::from(textures)
    }

    // ========================================================================
    // Frames
    // ========================================================================

    /// One event-loop iteration followed by one frame advanced by `dt`
    /// seconds (clamped to the pacing limit)
    pub fn run_frame(&mut self, dt: f32) -> FrameReport {
        self.last_iteration = self.event_loop.step();
        let dt = self.pacer.clamp_secs(dt);
        self.render_loop.render(dt)
    }

    /// Like [`run_frame`](Self::run_frame), with `dt` measured from the
    /// previous call
    pub fn tick(&mut self, now: Instant) -> FrameReport {
        let dt = self.pacer.begin_frame(now);
        self.last_iteration = self.event_loop.step();
        self.render_loop.render(dt)
    }

    pub fn pacer(&self) -> &FramePacer {
        &self.pacer
    }

    /// Split into the two loops so they can run on separate threads
    pub fn into_loops(self) -> (EventLoop, RenderLoop) {
        (self.event_loop, self.render_loop)
    }

    /// Terminate every app and release the device
    pub fn shutdown(mut self) {
        self.event_loop.terminate_all();
        self.render_loop.shutdown();
        info!("Desktop shut down");
    }
}

impl std::fmt::Debug for Desktop {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Desktop")
            .field("event_loop", &self.event_loop)
            .field("render_loop", &self.render_loop)
            .finish()
    }
}
