//! Desktop Compositor for the desktop core
//!
//! This crate provides the window and rendering half of the core:
//! - Window registry (create, destroy, focus, z-order, state)
//! - Window delegates (draw, resize and close notifications)
//! - Time-driven transitions with easing
//! - A software render pipeline with multi-pass effects, textures and particles
//!
//! ## Architecture
//!
//! - [`math`]: Geometry and color (`Rect`, `Point`, `Color`)
//! - [`window`]: Window lifecycle and management
//! - [`transition`]: Fade, slide and scale animations
//! - [`render`]: Pixel buffers, effect passes, textures and the [`Compositor`]
//! - [`config`]: Display constants and [`CompositorConfig`]
//!
//! ## Example
//!
//! ```rust
//! use mos_desktop::{Compositor, CompositorConfig, Rect, WindowConfig, WindowManager};
//! use mos_hal::SoftwareGpu;
//!
//! let mut wm = WindowManager::new(16);
//! let id = wm
//!     .create(WindowConfig {
//!         title: "Notes".to_string(),
//!         bounds: Rect::new(40, 40, 320, 240),
//!         ..Default::default()
//!     })
//!     .unwrap();
//!
//! let config = CompositorConfig {
//!     width: 640,
//!     height: 480,
//!     ..Default::default()
//! };
//! let mut compositor = Compositor::new(config, Box::new(SoftwareGpu::new())).unwrap();
//! let report = compositor.compose(&wm.snapshot(), 1.0 / 60.0);
//! assert_eq!(report.window_order, vec![id]);
//! ```
//!
//! ## Design Principles
//!
//! 1. **Pure Rust Core**: no native toolkit, every pass runs on CPU pixel buffers
//! 2. **Time Abstraction**: animations advance by a caller-supplied delta time
//! 3. **Graceful degradation**: GPU-only passes are skipped, never fatal

pub mod config;
pub mod math;
pub mod render;
pub mod transition;
pub mod window;

pub use config::CompositorConfig;
pub use math::{Color, Point, Rect};
pub use render::{
    Compositor, FrameReport, GraphicsContext, ParticleConfig, ParticleSystem, PixelBuffer,
    RenderError, TextureId, TextureStore,
};
pub use transition::{Easing, Transition, TransitionKind, TransitionSample};
pub use window::{
    GlassEffect, ShadowEffect, Window, WindowConfig, WindowDelegate, WindowEffects, WindowError,
    WindowFlags, WindowId, WindowManager, WindowState,
};
