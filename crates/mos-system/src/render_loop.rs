//! Render loop
//!
//! Reads scene snapshots and composes frames. It never touches the kernel
//! or the window registry; between snapshots it redraws the last one.

use mos_desktop::{Compositor, FrameReport, Window};
use mos_kernel::ProcessInfo;

use crate::scene::SceneReader;

/// Owner of the compositor
pub struct RenderLoop {
    compositor: Compositor,
    reader: SceneReader,
    windows: Vec<Window>,
    processes: Vec<ProcessInfo>,
    sequence: u64,
}

impl RenderLoop {
    pub(crate) fn new(compositor: Compositor, reader: SceneReader) -> Self {
        Self {
            compositor,
            reader,
            windows: Vec::new(),
            processes: Vec::new(),
            sequence: 0,
        }
    }

    pub fn compositor(&self) -> &Compositor {
        &self.compositor
    }

    pub fn compositor_mut(&mut self) -> &mut Compositor {
        &mut self.compositor
    }

    /// Sequence of the snapshot being drawn (0 before the first one)
    pub fn sequence(&self) -> u64 {
        self.sequence
    }

    /// Windows of the snapshot being drawn, back to front
    pub fn windows(&self) -> &[Window] {
        &self.windows
    }

    /// Process table as of the snapshot being drawn
    pub fn processes(&self) -> &[ProcessInfo] {
        &self.processes
    }

    /// Pick up the newest snapshot, then compose one frame advanced by `dt`
    pub fn render(&mut self, dt: f32) -> FrameReport {
        if let Some(scene) = self.reader.take() {
            for (id, transition) in scene.transitions {
                self.compositor.start_transition(id, transition);
            }
            for config in scene.particles {
                self.compositor.spawn_particles(config);
            }
            self.windows = scene.windows;
            self.processes = scene.processes;
            self.sequence = scene.sequence;
        }
        self.compositor.compose(&self.windows, dt)
    }

    pub(crate) fn shutdown(&mut self) {
        self.compositor.shutdown();
    }
}

impl std::fmt::Debug for RenderLoop {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RenderLoop")
            .field("compositor", &self.compositor)
            .field("windows", &self.windows.len())
            .field("sequence", &self.sequence)
            .finish()
    }
}
