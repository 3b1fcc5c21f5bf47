//! Inbound event queue
//!
//! The shell pushes events from wherever its toolkit delivers them; the
//! event loop drains the queue once per iteration. Cloned handles share one
//! queue.

use std::collections::VecDeque;
use std::sync::Arc;

use mos_desktop::{ParticleConfig, Point, Transition, WindowEffects, WindowId, WindowState};
use mos_kernel::ProcessId;
use serde::{Deserialize, Serialize};
use spin::Mutex;

/// Events drained per event-loop iteration; the rest wait for the next one
pub const MAX_EVENTS_PER_ITERATION: usize = 256;

/// Requests flowing from the shell into the core
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub enum InboundEvent {
    LaunchApp { name: String },
    TerminateApp { pid: ProcessId },
    /// Focus (and raise) the topmost window under a point
    PointerDown { at: Point },
    FocusWindow { id: WindowId },
    MoveWindow { id: WindowId, x: i32, y: i32 },
    ResizeWindow { id: WindowId, width: u32, height: u32 },
    SetWindowState { id: WindowId, state: WindowState },
    SetTitle { id: WindowId, title: String },
    SetEffects { id: WindowId, effects: WindowEffects },
    CloseWindow { id: WindowId },
    BlockProcess { pid: ProcessId },
    UnblockProcess { pid: ProcessId },
    StartTransition { id: WindowId, transition: Transition },
    SpawnParticles { config: ParticleConfig },
}

/// Shared FIFO of inbound events
#[derive(Clone, Debug, Default)]
pub struct EventQueue {
    inner: Arc<Mutex<VecDeque<InboundEvent>>>,
}

impl EventQueue {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&self, event: InboundEvent) {
        self.inner.lock().push_back(event);
    }

    pub fn len(&self) -> usize {
        self.inner.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.lock().is_empty()
    }

    /// Remove up to `max` events, oldest first
    pub fn drain(&self, max: usize) -> Vec<InboundEvent> {
        let mut queue = self.inner.lock();
        let take = queue.len().min(max);
        queue.drain(..take).collect()
    }
}

/// Outcome of one drain of the queue
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EventSummary {
    pub processed: usize,
    /// Events rejected with an error (logged, never fatal)
    pub failed: usize,
    /// Events left queued for the next iteration
    pub deferred: usize,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_drain_is_fifo_and_bounded() {
        let queue = EventQueue::new();
        let producer = queue.clone();
        for id in 0..5 {
            producer.push(InboundEvent::FocusWindow { id });
        }

        let first = queue.drain(3);
        assert_eq!(
            first,
            vec![
                InboundEvent::FocusWindow { id: 0 },
                InboundEvent::FocusWindow { id: 1 },
                InboundEvent::FocusWindow { id: 2 },
            ]
        );
        assert_eq!(queue.len(), 2);
        assert_eq!(queue.drain(10).len(), 2);
        assert!(queue.is_empty());
    }

    #[test]
    fn test_event_json() {
        let event = InboundEvent::LaunchApp {
            name: "Terminal".to_string(),
        };
        let json = serde_json::to_string(&event).unwrap();
        assert_eq!(json, r#"{"LaunchApp":{"name":"Terminal"}}"#);
        assert_eq!(serde_json::from_str::<InboundEvent>(&json).unwrap(), event);
    }
}
