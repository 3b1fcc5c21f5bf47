//! Window manager for lifecycle, focus, and z-order

use std::sync::Arc;

use log::debug;
use mos_alloc::{FixedMap, Vector};

use super::{
    Window, WindowConfig, WindowDelegate, WindowEffects, WindowError, WindowFlags, WindowId,
    WindowState,
};
use crate::config::{
    DISPLAY_HEIGHT, DISPLAY_WIDTH, DOCK_HEIGHT, MAX_TITLE_LEN, MENUBAR_HEIGHT, WINDOW_MIN_HEIGHT,
    WINDOW_MIN_WIDTH,
};
use crate::math::{Color, Point, Rect};

/// Window manager handling window lifecycle, z-order, and focus
///
/// The z-order collection is back to front: the last entry is drawn last and
/// sits visually on top. The focused window, if any, is always registered.
pub struct WindowManager {
    /// All windows by ID
    windows: FixedMap<Window>,
    /// Z-order, back to front
    z_order: Vector<WindowId>,
    focused: Option<WindowId>,
    /// Next window ID
    next_id: WindowId,
    /// Full display, used by `Fullscreen`
    display: Rect,
}

impl WindowManager {
    /// Create a manager for at most `max_windows` windows on the default display
    pub fn new(max_windows: usize) -> Self {
        Self::with_display(max_windows, DISPLAY_WIDTH, DISPLAY_HEIGHT)
    }

    pub fn with_display(max_windows: usize, width: u32, height: u32) -> Self {
        Self {
            windows: FixedMap::with_capacity(max_windows),
            z_order: Vector::with_capacity(max_windows.min(64)),
            focused: None,
            next_id: 1,
            display: Rect::from_size(width, height),
        }
    }

    /// Maximum number of windows
    pub fn capacity(&self) -> usize {
        self.windows.capacity()
    }

    /// Get the number of windows
    pub fn count(&self) -> usize {
        self.windows.len()
    }

    pub fn display(&self) -> Rect {
        self.display
    }

    /// Display minus the menu bar and the dock; `Maximized` fills this
    pub fn work_area(&self) -> Rect {
        let top = MENUBAR_HEIGHT.min(self.display.height);
        let height = self
            .display
            .height
            .saturating_sub(top)
            .saturating_sub(DOCK_HEIGHT);
        Rect::new(self.display.x, self.display.y + top as i32, self.display.width, height)
    }

    /// Largest size a window may take: the display, but never below the minimum
    fn max_size(&self) -> (u32, u32) {
        (
            self.display.width.max(WINDOW_MIN_WIDTH),
            self.display.height.max(WINDOW_MIN_HEIGHT),
        )
    }

    // ========================================================================
    // Lifecycle
    // ========================================================================

    /// Create a new window on top of the z-order. Does not grant focus.
    ///
    /// Bounds larger than the display are shrunk to it.
    pub fn create(&mut self, config: WindowConfig) -> Result<WindowId, WindowError> {
        let (max_width, max_height) = self.max_size();
        let bounds = config
            .bounds
            .with_size(config.bounds.width.min(max_width), config.bounds.height.min(max_height));
        let window = Window {
            id: 0,
            title: truncate_title(config.title),
            bounds,
            state: config.state,
            flags: config.flags,
            focused: false,
            background: config.background,
            owner: config.owner,
            effects: config.effects,
            restore_bounds: None,
            delegate: config.delegate,
        };
        self.register(window)
    }

    /// Register an externally built window, assigning it a fresh id
    pub fn register(&mut self, mut window: Window) -> Result<WindowId, WindowError> {
        if self.windows.is_full() {
            return Err(WindowError::WindowTableFull {
                max: self.windows.capacity(),
            });
        }

        let id = self.next_id;
        window.id = id;
        window.focused = false;

        self.windows
            .put(id, window)
            .map_err(|_| WindowError::WindowTableFull {
                max: self.windows.capacity(),
            })?;
        self.next_id += 1;
        self.z_order.push(id);

        debug!("window: registered {} ({} total)", id, self.windows.len());
        Ok(id)
    }

    /// Destroy a window. Unknown ids are a no-op returning `false`.
    ///
    /// Focus is cleared if the window held it; no other window is focused
    /// in its place.
    pub fn destroy(&mut self, id: WindowId) -> bool {
        let Some(window) = self.windows.remove(id) else {
            return false;
        };

        self.z_order.retain(|&wid| wid != id);
        if self.focused == Some(id) {
            self.focused = None;
        }

        if let Some(delegate) = window.delegate {
            delegate.closed(id);
        }
        debug!("window: destroyed {}", id);
        true
    }

    /// Get a window by ID
    pub fn get(&self, id: WindowId) -> Option<&Window> {
        self.windows.get(id)
    }

    pub fn contains(&self, id: WindowId) -> bool {
        self.windows.contains_key(id)
    }

    // ========================================================================
    // Focus and z-order
    // ========================================================================

    /// Get the currently focused window ID
    pub fn focused(&self) -> Option<WindowId> {
        self.focused
    }

    /// Focus a window and raise it to the front.
    ///
    /// Unknown windows leave the prior focus untouched.
    pub fn focus(&mut self, id: WindowId) -> Result<(), WindowError> {
        if !self.windows.contains_key(id) {
            return Err(WindowError::UnknownWindow(id));
        }

        if let Some(previous) = self.focused.take() {
            if let Some(window) = self.windows.get_mut(previous) {
                window.focused = false;
            }
        }
        if let Some(window) = self.windows.get_mut(id) {
            window.focused = true;
        }
        self.focused = Some(id);
        self.raise(id)
    }

    /// Move a window to the front, keeping the relative order of the rest
    pub fn raise(&mut self, id: WindowId) -> Result<(), WindowError> {
        let index = self
            .z_order
            .position(|&wid| wid == id)
            .ok_or(WindowError::UnknownWindow(id))?;
        self.z_order.move_to_end(index);
        Ok(())
    }

    /// Z-order, back to front
    pub fn z_order(&self) -> &[WindowId] {
        self.z_order.as_slice()
    }

    /// Get windows sorted by z-order (back to front)
    pub fn windows_by_z(&self) -> Vec<&Window> {
        self.z_order
            .iter()
            .filter_map(|&id| self.windows.get(id))
            .collect()
    }

    /// Copy of every window in z-order, for a render loop to read
    pub fn snapshot(&self) -> Vec<Window> {
        self.windows_by_z().into_iter().cloned().collect()
    }

    /// Windows owned by a process, back to front
    pub fn windows_for_process(&self, owner: u64) -> Vec<WindowId> {
        self.windows_by_z()
            .into_iter()
            .filter(|w| w.owner == Some(owner))
            .map(|w| w.id)
            .collect()
    }

    /// Find the topmost on-screen window at a position
    pub fn window_at(&self, pos: Point) -> Option<WindowId> {
        self.windows_by_z()
            .into_iter()
            .rev()
            .find(|w| w.is_interactive() && w.bounds.contains(pos))
            .map(|w| w.id)
    }

    // ========================================================================
    // Per-window mutation
    // ========================================================================

    pub fn set_title(&mut self, id: WindowId, title: &str) -> Result<(), WindowError> {
        let window = self.window_mut(id)?;
        window.title = truncate_title(title.to_string());
        Ok(())
    }

    /// Move a window to a new position
    pub fn move_to(&mut self, id: WindowId, x: i32, y: i32) -> Result<(), WindowError> {
        let window = self.window_mut(id)?;
        window.bounds.x = x;
        window.bounds.y = y;
        Ok(())
    }

    /// Resize a window, clamped between the minimum window size and the display
    pub fn resize(&mut self, id: WindowId, width: u32, height: u32) -> Result<(), WindowError> {
        let (max_width, max_height) = self.max_size();
        let window = self.window_mut(id)?;
        if !window.flags.contains(WindowFlags::RESIZABLE) {
            return Err(WindowError::NotResizable(id));
        }

        let width = width.clamp(WINDOW_MIN_WIDTH, max_width);
        let height = height.clamp(WINDOW_MIN_HEIGHT, max_height);
        let changed = window.bounds.width != width || window.bounds.height != height;
        window.bounds = window.bounds.with_size(width, height);

        if changed {
            let delegate = window.delegate.clone();
            notify_resized(delegate, id, width, height);
        }
        Ok(())
    }

    /// Set window state
    ///
    /// `Maximized` fills the work area and `Fullscreen` the whole display,
    /// both remembering the previous bounds; `Normal` restores them.
    pub fn set_state(&mut self, id: WindowId, state: WindowState) -> Result<(), WindowError> {
        let work_area = self.work_area();
        let display = self.display;
        let window = self.window_mut(id)?;

        if window.state == state {
            return Ok(());
        }

        let new_bounds = match state {
            WindowState::Minimized => {
                if !window.flags.contains(WindowFlags::MINIMIZABLE) {
                    return Err(WindowError::NotMinimizable(id));
                }
                None
            }
            WindowState::Maximized => {
                if !window.flags.contains(WindowFlags::MAXIMIZABLE) {
                    return Err(WindowError::NotMaximizable(id));
                }
                Some(work_area)
            }
            WindowState::Fullscreen => Some(display),
            WindowState::Normal => window.restore_bounds.take(),
            WindowState::Hidden => None,
        };

        if matches!(state, WindowState::Maximized | WindowState::Fullscreen)
            && window.restore_bounds.is_none()
        {
            window.restore_bounds = Some(window.bounds);
        }

        let previous = window.state;
        window.state = state;
        debug!("window: {} {:?} -> {:?}", id, previous, state);

        if let Some(bounds) = new_bounds {
            let resized =
                bounds.width != window.bounds.width || bounds.height != window.bounds.height;
            window.bounds = bounds;
            if resized {
                let delegate = window.delegate.clone();
                notify_resized(delegate, id, bounds.width, bounds.height);
            }
        }
        Ok(())
    }

    pub fn set_effects(&mut self, id: WindowId, effects: WindowEffects) -> Result<(), WindowError> {
        self.window_mut(id)?.effects = effects;
        Ok(())
    }

    pub fn set_background(&mut self, id: WindowId, color: Color) -> Result<(), WindowError> {
        self.window_mut(id)?.background = color;
        Ok(())
    }

    fn window_mut(&mut self, id: WindowId) -> Result<&mut Window, WindowError> {
        self.windows
            .get_mut(id)
            .ok_or(WindowError::UnknownWindow(id))
    }
}

fn notify_resized(
    delegate: Option<Arc<dyn WindowDelegate>>,
    id: WindowId,
    width: u32,
    height: u32,
) {
    if let Some(delegate) = delegate {
        delegate.resized(id, width, height);
    }
}

fn truncate_title(mut title: String) -> String {
    if title.len() > MAX_TITLE_LEN {
        let mut end = MAX_TITLE_LEN;
        while !title.is_char_boundary(end) {
            end -= 1;
        }
        title.truncate(end);
    }
    title
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicU32, Ordering};

    fn config(title: &str) -> WindowConfig {
        WindowConfig {
            title: title.to_string(),
            bounds: Rect::new(100, 100, 800, 600),
            ..Default::default()
        }
    }

    #[derive(Default)]
    struct Recorder {
        resized: AtomicU32,
        closed: AtomicU32,
    }

    impl WindowDelegate for Recorder {
        fn resized(&self, _id: WindowId, _width: u32, _height: u32) {
            self.resized.fetch_add(1, Ordering::SeqCst);
        }

        fn closed(&self, _id: WindowId) {
            self.closed.fetch_add(1, Ordering::SeqCst);
        }
    }

    #[test]
    fn test_window_creation() {
        let mut wm = WindowManager::new(8);
        let id = wm.create(config("Test")).unwrap();

        assert!(wm.get(id).is_some());
        assert_eq!(wm.count(), 1);
        assert_eq!(wm.focused(), None);
    }

    #[test]
    fn test_z_order_and_focus() {
        let mut wm = WindowManager::new(8);
        let w1 = wm.create(config("1")).unwrap();
        let w2 = wm.create(config("2")).unwrap();
        let w3 = wm.create(config("3")).unwrap();
        assert_eq!(wm.z_order(), [w1, w2, w3]);

        wm.focus(w1).unwrap();
        assert_eq!(wm.z_order(), [w2, w3, w1]);
        assert_eq!(wm.focused(), Some(w1));
        assert!(wm.get(w1).unwrap().focused);

        wm.focus(w3).unwrap();
        assert!(!wm.get(w1).unwrap().focused);
        assert_eq!(wm.z_order(), [w2, w1, w3]);
    }

    #[test]
    fn test_focus_unknown_keeps_prior_focus() {
        let mut wm = WindowManager::new(8);
        let w1 = wm.create(config("1")).unwrap();
        wm.focus(w1).unwrap();

        assert_eq!(wm.focus(99), Err(WindowError::UnknownWindow(99)));
        assert_eq!(wm.focused(), Some(w1));
    }

    #[test]
    fn test_destroy_focused_clears_focus() {
        let mut wm = WindowManager::new(8);
        let w1 = wm.create(config("1")).unwrap();
        let w2 = wm.create(config("2")).unwrap();
        wm.focus(w2).unwrap();

        assert!(wm.destroy(w2));
        assert_eq!(wm.focused(), None);
        assert_eq!(wm.z_order(), [w1]);
        assert!(!wm.destroy(w2));
    }

    #[test]
    fn test_window_table_full() {
        let mut wm = WindowManager::new(2);
        wm.create(config("1")).unwrap();
        wm.create(config("2")).unwrap();
        assert_eq!(
            wm.create(config("3")),
            Err(WindowError::WindowTableFull { max: 2 })
        );
    }

    #[test]
    fn test_resize_clamps_and_checks_flag() {
        let mut wm = WindowManager::new(8);
        let id = wm.create(config("r")).unwrap();
        wm.resize(id, 10, 10).unwrap();
        let bounds = wm.get(id).unwrap().bounds;
        assert_eq!((bounds.width, bounds.height), (WINDOW_MIN_WIDTH, WINDOW_MIN_HEIGHT));

        let fixed = wm
            .create(WindowConfig {
                flags: WindowFlags::TITLED | WindowFlags::CLOSABLE,
                ..config("fixed")
            })
            .unwrap();
        assert_eq!(wm.resize(fixed, 900, 900), Err(WindowError::NotResizable(fixed)));
    }

    #[test]
    fn test_size_never_exceeds_display() {
        let mut wm = WindowManager::with_display(8, 1920, 1080);
        let id = wm.create(config("big")).unwrap();
        wm.resize(id, u32::MAX, u32::MAX).unwrap();
        let bounds = wm.get(id).unwrap().bounds;
        assert_eq!((bounds.width, bounds.height), (1920, 1080));
        assert_eq!(bounds.position(), Point::new(100, 100));

        let created = wm
            .create(WindowConfig {
                bounds: Rect::new(0, 0, u32::MAX, 5000),
                ..config("huge")
            })
            .unwrap();
        assert_eq!(wm.get(created).unwrap().bounds, Rect::new(0, 0, 1920, 1080));
    }

    #[test]
    fn test_move_to_extreme_position() {
        let mut wm = WindowManager::with_display(8, 1920, 1080);
        let id = wm.create(config("far")).unwrap();
        wm.move_to(id, 0, i32::MAX - 1).unwrap();
        let bounds = wm.get(id).unwrap().bounds;
        assert_eq!(bounds.y, i32::MAX - 1);
        assert_eq!(bounds.bottom(), i32::MAX);
        assert_eq!(wm.window_at(Point::new(10, 10)), None);
    }

    #[test]
    fn test_maximize_and_restore() {
        let mut wm = WindowManager::with_display(8, 1920, 1080);
        let id = wm.create(config("m")).unwrap();

        wm.set_state(id, WindowState::Maximized).unwrap();
        let w = wm.get(id).unwrap();
        assert_eq!(w.bounds, wm.work_area());
        assert_eq!(w.bounds.y, MENUBAR_HEIGHT as i32);

        wm.set_state(id, WindowState::Normal).unwrap();
        assert_eq!(wm.get(id).unwrap().bounds, Rect::new(100, 100, 800, 600));
    }

    #[test]
    fn test_fullscreen_then_minimize_then_normal() {
        let mut wm = WindowManager::with_display(8, 1920, 1080);
        let id = wm.create(config("f")).unwrap();

        wm.set_state(id, WindowState::Fullscreen).unwrap();
        assert_eq!(wm.get(id).unwrap().bounds, Rect::from_size(1920, 1080));
        wm.set_state(id, WindowState::Minimized).unwrap();
        wm.set_state(id, WindowState::Normal).unwrap();
        assert_eq!(wm.get(id).unwrap().bounds, Rect::new(100, 100, 800, 600));
    }

    #[test]
    fn test_state_flags_enforced() {
        let mut wm = WindowManager::new(8);
        let id = wm
            .create(WindowConfig {
                flags: WindowFlags::TITLED,
                ..config("plain")
            })
            .unwrap();
        assert_eq!(
            wm.set_state(id, WindowState::Minimized),
            Err(WindowError::NotMinimizable(id))
        );
        assert_eq!(
            wm.set_state(id, WindowState::Maximized),
            Err(WindowError::NotMaximizable(id))
        );
        assert_eq!(wm.get(id).unwrap().state, WindowState::Normal);
    }

    #[test]
    fn test_delegate_notifications() {
        let recorder = Arc::new(Recorder::default());
        let mut wm = WindowManager::new(8);
        let id = wm
            .create(WindowConfig {
                delegate: Some(recorder.clone()),
                ..config("d")
            })
            .unwrap();

        wm.resize(id, 640, 480).unwrap();
        wm.resize(id, 640, 480).unwrap();
        wm.set_state(id, WindowState::Maximized).unwrap();
        assert_eq!(recorder.resized.load(Ordering::SeqCst), 2);

        wm.destroy(id);
        assert_eq!(recorder.closed.load(Ordering::SeqCst), 1);
        // The manager released its reference
        assert_eq!(Arc::strong_count(&recorder), 1);
    }

    #[test]
    fn test_hit_testing() {
        let mut wm = WindowManager::new(8);
        let back = wm.create(config("back")).unwrap();
        let front = wm
            .create(WindowConfig {
                bounds: Rect::new(300, 300, 400, 300),
                ..config("front")
            })
            .unwrap();

        assert_eq!(wm.window_at(Point::new(400, 400)), Some(front));
        assert_eq!(wm.window_at(Point::new(150, 150)), Some(back));
        assert_eq!(wm.window_at(Point::new(10, 10)), None);

        wm.set_state(front, WindowState::Minimized).unwrap();
        assert_eq!(wm.window_at(Point::new(400, 400)), Some(back));
    }

    #[test]
    fn test_windows_for_process() {
        let mut wm = WindowManager::new(8);
        let a = wm
            .create(WindowConfig {
                owner: Some(7),
                ..config("a")
            })
            .unwrap();
        wm.create(config("b")).unwrap();
        let c = wm
            .create(WindowConfig {
                owner: Some(7),
                ..config("c")
            })
            .unwrap();

        assert_eq!(wm.windows_for_process(7), [a, c]);
        wm.focus(a).unwrap();
        assert_eq!(wm.windows_for_process(7), [c, a]);
    }

    #[test]
    fn test_title_truncated() {
        let mut wm = WindowManager::new(2);
        let id = wm.create(config("t")).unwrap();
        wm.set_title(id, &"é".repeat(400)).unwrap();
        let title = &wm.get(id).unwrap().title;
        assert!(title.len() <= MAX_TITLE_LEN);
        assert_eq!(title.chars().count(), 255);
    }
}
