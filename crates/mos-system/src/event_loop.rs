//! Event loop
//!
//! The only writer of process and window state. Each iteration drains the
//! inbound queue, drives the scheduler and publishes a scene snapshot for
//! the render loop.

use std::collections::BTreeMap;
use std::sync::atomic::Ordering;
use std::sync::Arc;

use log::{debug, info, warn};
use mos_desktop::{ParticleConfig, Rect, Transition, WindowConfig, WindowId, WindowManager};
use mos_kernel::{Kernel, ProcessId, RunSummary};

use crate::apps::{AppCapabilities, AppContent, AppDescriptor, AppKind};
use crate::events::{EventQueue, EventSummary, InboundEvent, MAX_EVENTS_PER_ITERATION};
use crate::scene::{SceneSnapshot, SceneWriter};
use crate::SystemError;

/// Offset between successive windows of the same app
const CASCADE_STEP: i32 = 24;

/// A launched application
#[derive(Clone, Debug)]
pub struct RunningApp {
    pub descriptor: AppDescriptor,
    pub content: Arc<AppContent>,
}

/// What one event-loop iteration did
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct IterationSummary {
    pub events: EventSummary,
    pub scheduler: RunSummary,
    /// Sequence number of the published snapshot
    pub sequence: u64,
}

/// Owner of the kernel and the window registry
pub struct EventLoop {
    kernel: Kernel,
    windows: WindowManager,
    apps: BTreeMap<ProcessId, RunningApp>,
    events: EventQueue,
    scene: SceneWriter,
    ticks_per_frame: u64,
    sequence: u64,
    /// One-shot requests for the next snapshot
    transitions: Vec<(WindowId, Transition)>,
    particles: Vec<ParticleConfig>,
}

impl EventLoop {
    pub(crate) fn new(
        kernel: Kernel,
        windows: WindowManager,
        scene: SceneWriter,
        ticks_per_frame: u64,
    ) -> Self {
        Self {
            kernel,
            windows,
            apps: BTreeMap::new(),
            events: EventQueue::new(),
            scene,
            ticks_per_frame,
            sequence: 0,
            transitions: Vec::new(),
            particles: Vec::new(),
        }
    }

    pub fn kernel(&self) -> &Kernel {
        &self.kernel
    }

    pub fn kernel_mut(&mut self) -> &mut Kernel {
        &mut self.kernel
    }

    pub fn windows(&self) -> &WindowManager {
        &self.windows
    }

    pub fn windows_mut(&mut self) -> &mut WindowManager {
        &mut self.windows
    }

    /// Handle for pushing inbound events
    pub fn events(&self) -> EventQueue {
        self.events.clone()
    }

    pub fn app(&self, pid: ProcessId) -> Option<&RunningApp> {
        self.apps.get(&pid)
    }

    /// Running apps in pid order
    pub fn apps(&self) -> impl Iterator<Item = (ProcessId, &RunningApp)> {
        self.apps.iter().map(|(pid, app)| (*pid, app))
    }

    // ========================================================================
    // Applications
    // ========================================================================

    /// Start an app by name: one process plus its first window, focused and
    /// fading in. Single-instance apps that are already running are brought
    /// to the front instead.
    pub fn launch_app(&mut self, name: &str) -> Result<ProcessId, SystemError> {
        let kind =
            AppKind::from_name(name).ok_or_else(|| SystemError::UnknownApp(name.to_string()))?;
        let descriptor = kind.descriptor();

        let instances = self
            .apps
            .iter()
            .filter(|(_, app)| app.descriptor.kind == kind)
            .map(|(pid, _)| *pid)
            .collect::<Vec<_>>();

        if !descriptor.capabilities.contains(AppCapabilities::MULTI_WINDOW) {
            if let Some(&pid) = instances.first() {
                if let Some(&id) = self.windows.windows_for_process(pid.0).last() {
                    self.windows.focus(id)?;
                }
                debug!("{} already running as process {}, activated", descriptor.name, pid.0);
                return Ok(pid);
            }
        }

        let content = Arc::new(AppContent::new(kind));
        let runs = content.run_counter();
        let pid = self.kernel.process_create(
            descriptor.name,
            descriptor.priority,
            Some(Box::new(move |_: ProcessId| {
                runs.fetch_add(1, Ordering::Relaxed);
            })),
        )?;

        let shift = CASCADE_STEP * instances.len() as i32;
        let config = WindowConfig {
            title: descriptor.name.to_string(),
            bounds: descriptor.default_bounds.translate(shift, shift),
            owner: Some(pid.0),
            delegate: Some(content.clone()),
            ..Default::default()
        };
        let id = match self.windows.create(config) {
            Ok(id) => id,
            Err(e) => {
                self.kernel.process_destroy(pid);
                return Err(e.into());
            }
        };
        self.windows.focus(id)?;
        self.transitions.push((id, Transition::fade_in()));

        info!("Launched {} as process {} (window {})", descriptor.name, pid.0, id);
        self.apps.insert(pid, RunningApp { descriptor, content });
        Ok(pid)
    }

    /// Stop an app: close its windows and destroy its process.
    ///
    /// Returns `false` for unknown pids.
    pub fn terminate_app(&mut self, pid: ProcessId) -> bool {
        for id in self.windows.windows_for_process(pid.0) {
            self.windows.destroy(id);
        }
        let app = self.apps.remove(&pid);
        let existed = self.kernel.process_destroy(pid);
        if let Some(app) = app {
            info!("Terminated {} (process {})", app.descriptor.name, pid.0);
        }
        existed
    }

    // ========================================================================
    // Processes and windows
    // ========================================================================

    /// Create a bare process with no app attached
    pub fn spawn_process(&mut self, name: &str, priority: u32) -> Result<ProcessId, SystemError> {
        Ok(self.kernel.process_create(name, priority, None)?)
    }

    /// Create a window owned by a live process
    pub fn create_window(
        &mut self,
        owner: ProcessId,
        config: WindowConfig,
    ) -> Result<WindowId, SystemError> {
        if self.kernel.process(owner).is_none() {
            return Err(SystemError::UnknownProcess(owner));
        }
        Ok(self.windows.create(WindowConfig {
            owner: Some(owner.0),
            ..config
        })?)
    }

    /// Close a window. An app without `BACKGROUND` terminates with its last
    /// window. Returns `false` for unknown windows.
    pub fn close_window(&mut self, id: WindowId) -> bool {
        let owner = self.windows.get(id).and_then(|w| w.owner).map(ProcessId);
        if !self.windows.destroy(id) {
            return false;
        }
        if let Some(pid) = owner {
            let last = self.windows.windows_for_process(pid.0).is_empty();
            let background = self.apps.get(&pid).map(|app| {
                app.descriptor
                    .capabilities
                    .contains(AppCapabilities::BACKGROUND)
            });
            if last && background == Some(false) {
                self.terminate_app(pid);
            }
        }
        true
    }

    /// Queue a transition for the next frame
    pub fn start_transition(
        &mut self,
        id: WindowId,
        transition: Transition,
    ) -> Result<(), SystemError> {
        if !self.windows.contains(id) {
            return Err(mos_desktop::WindowError::UnknownWindow(id).into());
        }
        self.transitions.push((id, transition));
        Ok(())
    }

    pub fn spawn_particles(&mut self, config: ParticleConfig) {
        self.particles.push(config);
    }

    // ========================================================================
    // Iteration
    // ========================================================================

    /// Apply one inbound event
    pub fn handle(&mut self, event: InboundEvent) -> Result<(), SystemError> {
        match event {
            InboundEvent::LaunchApp { name } => {
                self.launch_app(&name)?;
            }
            InboundEvent::TerminateApp { pid } => {
                if !self.terminate_app(pid) {
                    debug!("Terminate for unknown process {} ignored", pid.0);
                }
            }
            InboundEvent::PointerDown { at } => {
                if let Some(id) = self.windows.window_at(at) {
                    self.windows.focus(id)?;
                }
            }
            InboundEvent::FocusWindow { id } => self.windows.focus(id)?,
            InboundEvent::MoveWindow { id, x, y } => self.windows.move_to(id, x, y)?,
            InboundEvent::ResizeWindow { id, width, height } => {
                self.windows.resize(id, width, height)?
            }
            InboundEvent::SetWindowState { id, state } => self.windows.set_state(id, state)?,
            InboundEvent::SetTitle { id, title } => self.windows.set_title(id, &title)?,
            InboundEvent::SetEffects { id, effects } => self.windows.set_effects(id, effects)?,
            InboundEvent::CloseWindow { id } => {
                if !self.close_window(id) {
                    debug!("Close for unknown window {} ignored", id);
                }
            }
            InboundEvent::BlockProcess { pid } => self.kernel.block(pid)?,
            InboundEvent::UnblockProcess { pid } => self.kernel.unblock(pid)?,
            InboundEvent::StartTransition { id, transition } => {
                self.start_transition(id, transition)?
            }
            InboundEvent::SpawnParticles { config } => self.spawn_particles(config),
        }
        Ok(())
    }

    /// Drain the inbound queue. Failed events are logged and dropped.
    pub fn process_events(&mut self) -> EventSummary {
        let mut summary = EventSummary::default();
        for event in self.events.drain(MAX_EVENTS_PER_ITERATION) {
            summary.processed += 1;
            if let Err(e) = self.handle(event) {
                warn!("Inbound event rejected ({:?}): {}", e.kind(), e);
                summary.failed += 1;
            }
        }
        summary.deferred = self.events.len();
        summary
    }

    /// Drive `ticks` scheduling opportunities
    pub fn run_scheduler(&mut self, ticks: u64) -> RunSummary {
        self.kernel.run(ticks)
    }

    /// Hand the current state to the render loop
    pub fn publish(&mut self) -> u64 {
        self.sequence += 1;
        self.scene.publish(SceneSnapshot {
            sequence: self.sequence,
            windows: self.windows.snapshot(),
            transitions: std::mem::take(&mut self.transitions),
            particles: std::mem::take(&mut self.particles),
            processes: self.kernel.processes(),
        });
        self.sequence
    }

    /// One full iteration: events, scheduler ticks, snapshot
    pub fn step(&mut self) -> IterationSummary {
        let events = self.process_events();
        let scheduler = self.run_scheduler(self.ticks_per_frame);
        let sequence = self.publish();
        IterationSummary {
            events,
            scheduler,
            sequence,
        }
    }

    /// Terminate every app, newest first
    pub(crate) fn terminate_all(&mut self) {
        let pids: Vec<ProcessId> = self.apps.keys().rev().copied().collect();
        for pid in pids {
            self.terminate_app(pid);
        }
    }

    /// Display rectangle the windows live in
    pub fn display(&self) -> Rect {
        self.windows.display()
    }
}

impl std::fmt::Debug for EventLoop {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EventLoop")
            .field("kernel", &self.kernel)
            .field("windows", &self.windows.count())
            .field("apps", &self.apps.len())
            .field("sequence", &self.sequence)
            .finish()
    }
}
