//! Event loop → render loop handoff
//!
//! Single writer, single reader. The writer publishes a complete
//! [`SceneSnapshot`] after each event-loop iteration; the reader takes the
//! latest one at the top of each frame. The slot lock is held only for the
//! swap, never while a frame is composed.
//!
//! Window lists replace each other (the reader only ever needs the newest),
//! but transition and particle requests are one-shot: if the reader has not
//! taken a snapshot before the next publish, its requests are carried into
//! the new one so none are lost.

use std::sync::Arc;

use mos_desktop::{ParticleConfig, Transition, Window, WindowId};
use mos_kernel::ProcessInfo;
use spin::Mutex;

/// Everything the render loop needs for one frame
#[derive(Clone, Debug, Default)]
pub struct SceneSnapshot {
    /// Event-loop iteration that produced this snapshot
    pub sequence: u64,
    /// Windows back to front
    pub windows: Vec<Window>,
    pub transitions: Vec<(WindowId, Transition)>,
    pub particles: Vec<ParticleConfig>,
    pub processes: Vec<ProcessInfo>,
}

type Slot = Arc<Mutex<Option<SceneSnapshot>>>;

/// Create a connected writer/reader pair
pub fn scene_channel() -> (SceneWriter, SceneReader) {
    let slot: Slot = Arc::new(Mutex::new(None));
    (
        SceneWriter {
            slot: Arc::clone(&slot),
        },
        SceneReader { slot },
    )
}

/// Event-loop side of the handoff
#[derive(Debug)]
pub struct SceneWriter {
    slot: Slot,
}

impl SceneWriter {
    /// Publish a snapshot, folding in requests the reader never took
    pub fn publish(&self, mut snapshot: SceneSnapshot) {
        let mut slot = self.slot.lock();
        if let Some(stale) = slot.take() {
            let mut transitions = stale.transitions;
            transitions.append(&mut snapshot.transitions);
            snapshot.transitions = transitions;

            let mut particles = stale.particles;
            particles.append(&mut snapshot.particles);
            snapshot.particles = particles;
        }
        *slot = Some(snapshot);
    }
}

/// Render-loop side of the handoff
#[derive(Debug)]
pub struct SceneReader {
    slot: Slot,
}

impl SceneReader {
    /// Take the newest snapshot, if one was published since the last take
    pub fn take(&self) -> Option<SceneSnapshot> {
        self.slot.lock().take()
    }
}
