//! Built-in applications
//!
//! An application is a descriptor (name, capabilities, default window,
//! scheduling priority) plus an [`AppKind`] that knows how to paint its
//! window content. Each launched app gets one process and one
//! [`AppContent`] delegate; the process entry and the delegate share a run
//! counter, so content can react to how often the app was scheduled.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use bitflags::bitflags;
use log::debug;
use mos_desktop::{Color, PixelBuffer, Point, Rect, RenderError, Window, WindowDelegate, WindowId};
use serde::{Deserialize, Serialize};

bitflags! {
    /// What an application is allowed to do
    #[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
    pub struct AppCapabilities: u32 {
        /// More than one instance may run at a time
        const MULTI_WINDOW = 1 << 0;
        const FILE_ACCESS = 1 << 1;
        const NETWORK = 1 << 2;
        const NOTIFICATIONS = 1 << 3;
        /// Keeps running with no window on screen
        const BACKGROUND = 1 << 4;
    }
}

/// Application variants shipped with the system
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AppKind {
    Finder,
    Terminal,
    Safari,
    Mail,
    Calendar,
    SystemPreferences,
}

impl AppKind {
    pub const ALL: [AppKind; 6] = [
        AppKind::Finder,
        AppKind::Terminal,
        AppKind::Safari,
        AppKind::Mail,
        AppKind::Calendar,
        AppKind::SystemPreferences,
    ];

    /// Static descriptor of this app
    pub fn descriptor(self) -> AppDescriptor {
        use AppCapabilities as Cap;
        let (name, capabilities, bounds, priority) = match self {
            AppKind::Finder => (
                "Finder",
                Cap::MULTI_WINDOW | Cap::FILE_ACCESS | Cap::BACKGROUND,
                Rect::new(120, 120, 900, 560),
                2,
            ),
            AppKind::Terminal => (
                "Terminal",
                Cap::MULTI_WINDOW | Cap::FILE_ACCESS,
                Rect::new(200, 180, 720, 460),
                1,
            ),
            AppKind::Safari => (
                "Safari",
                Cap::MULTI_WINDOW | Cap::NETWORK,
                Rect::new(160, 90, 1200, 800),
                2,
            ),
            AppKind::Mail => (
                "Mail",
                Cap::NETWORK | Cap::NOTIFICATIONS | Cap::BACKGROUND,
                Rect::new(240, 110, 1100, 700),
                1,
            ),
            AppKind::Calendar => (
                "Calendar",
                Cap::NOTIFICATIONS,
                Rect::new(300, 140, 900, 640),
                1,
            ),
            AppKind::SystemPreferences => (
                "System Preferences",
                Cap::FILE_ACCESS,
                Rect::new(420, 160, 680, 560),
                1,
            ),
        };
        AppDescriptor {
            name,
            kind: self,
            capabilities,
            default_bounds: bounds,
            priority,
        }
    }

    /// Look an app up by its display name, ignoring case
    pub fn from_name(name: &str) -> Option<AppKind> {
        Self::ALL
            .into_iter()
            .find(|kind| kind.descriptor().name.eq_ignore_ascii_case(name))
    }

    fn paint(self, content: Rect, runs: u64, surface: &mut PixelBuffer) {
        match self {
            AppKind::Finder => {
                let sidebar =
                    Rect::new(content.x, content.y, 160.min(content.width), content.height);
                surface.draw_rect(sidebar, Color::rgb(222, 226, 232));
                surface.draw_rect(
                    Rect::new(
                        sidebar.right(),
                        content.y,
                        content.width.saturating_sub(sidebar.width),
                        content.height,
                    ),
                    Color::WHITE,
                );
                for i in 0..4 {
                    let icon = Rect::new(sidebar.right() + 24 + i * 96, content.y + 24, 64, 64);
                    surface.draw_rounded_rect(icon, 8, Color::rgb(110, 170, 240));
                }
            }
            AppKind::Terminal => {
                surface.draw_rect(content, Color::rgb(30, 30, 30));
                let prompt = Color::rgb(80, 220, 100);
                for line in 0..3 {
                    let y = content.y + 8 + line * 16;
                    surface.draw_rect(Rect::new(content.x + 8, y, 12, 10), prompt);
                }
                // Cursor blinks with every other scheduling opportunity
                if runs % 2 == 0 {
                    let cursor = Rect::new(content.x + 24, content.y + 40, 8, 12);
                    surface.draw_rect(cursor, Color::WHITE);
                }
            }
            AppKind::Safari => {
                let toolbar =
                    Rect::new(content.x, content.y, content.width, 36.min(content.height));
                surface.draw_rect(toolbar, Color::rgb(240, 240, 240));
                let address_x = content.x + content.width as i32 / 4;
                let address = Rect::new(address_x, content.y + 6, content.width / 2, 24);
                surface.draw_rounded_rect(address, 6, Color::WHITE);
                surface.draw_rect(
                    Rect::new(
                        content.x,
                        toolbar.bottom(),
                        content.width,
                        content.height.saturating_sub(toolbar.height),
                    ),
                    Color::WHITE,
                );
            }
            AppKind::Mail => {
                let column = content.width / 3;
                let list_x = content.x + column as i32;
                let mailboxes = Rect::new(content.x, content.y, column, content.height);
                let list = Rect::new(list_x, content.y, content.width - column, content.height);
                surface.draw_rect(mailboxes, Color::rgb(232, 236, 240));
                surface.draw_rect(list, Color::WHITE);
                for row in 0..6 {
                    let y = content.y + 44 + row * 40;
                    surface.draw_line(
                        Point::new(list_x, y),
                        Point::new(list_x + column as i32, y),
                        Color::rgb(220, 220, 220),
                    );
                }
            }
            AppKind::Calendar => {
                surface.draw_rect(content, Color::WHITE);
                let grid = Color::rgb(210, 210, 210);
                let (cols, rows) = (7, 5);
                let cell_w = content.width as i32 / cols;
                let cell_h = content.height as i32 / rows;
                for c in 1..cols {
                    let x = content.x + c * cell_w;
                    let top = Point::new(x, content.y);
                    surface.draw_line(top, Point::new(x, content.bottom() - 1), grid);
                }
                for r in 1..rows {
                    let y = content.y + r * cell_h;
                    let left = Point::new(content.x, y);
                    surface.draw_line(left, Point::new(content.right() - 1, y), grid);
                }
            }
            AppKind::SystemPreferences => {
                surface.draw_rect(content, Color::rgb(245, 245, 245));
                for i in 0..8 {
                    let cx = content.x + 60 + (i % 4) * 120;
                    let cy = content.y + 60 + (i / 4) * 110;
                    surface.draw_circle(cx, cy, 28, Color::rgb(140, 140, 150));
                }
            }
        }
    }
}

/// Application descriptor
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AppDescriptor {
    pub name: &'static str,
    pub kind: AppKind,
    pub capabilities: AppCapabilities,
    /// Where the first window opens
    pub default_bounds: Rect,
    /// Scheduling priority of the app's process
    pub priority: u32,
}

/// Window content provider for a running app
#[derive(Debug)]
pub struct AppContent {
    kind: AppKind,
    runs: Arc<AtomicU64>,
}

impl AppContent {
    pub fn new(kind: AppKind) -> Self {
        Self {
            kind,
            runs: Arc::new(AtomicU64::new(0)),
        }
    }

    pub fn kind(&self) -> AppKind {
        self.kind
    }

    /// Scheduling opportunities the app's process has received
    pub fn runs(&self) -> u64 {
        self.runs.load(Ordering::Relaxed)
    }

    /// Counter bumped by the app's process entry
    pub(crate) fn run_counter(&self) -> Arc<AtomicU64> {
        Arc::clone(&self.runs)
    }
}

impl WindowDelegate for AppContent {
    fn draw(&self, window: &Window, surface: &mut PixelBuffer) -> Result<(), RenderError> {
        self.kind.paint(window.content_rect(), self.runs(), surface);
        Ok(())
    }

    fn resized(&self, id: WindowId, width: u32, height: u32) {
        debug!("{:?}: window {} resized to {}x{}", self.kind, id, width, height);
    }

    fn closed(&self, id: WindowId) {
        debug!("{:?}: window {} closed", self.kind, id);
    }
}
