//! Frame composition
//!
//! The compositor owns the framebuffer, the texture store, the active
//! transitions and the particle overlays. It never owns windows: every frame
//! it is handed a back-to-front snapshot and draws exactly that.
//!
//! Each frame starts by repainting the desktop background over the whole
//! framebuffer; every window is then rendered into its own freshly cleared
//! buffer of its bounds and blitted on top.
//!
//! A finished transition leaves its end value behind as the window's settled
//! state, so a window faded out stays invisible and a slide stays at its
//! final offset until another transition of the same kind replaces it.

use std::collections::BTreeMap;
use std::mem::discriminant;

use log::{debug, info, trace, warn};
use mos_hal::GpuDevice;
use serde::{Deserialize, Serialize};

use super::{
    GraphicsContext, ParticleConfig, ParticleSystem, PixelBuffer, RenderError, TextureStore,
};
use crate::config::CompositorConfig;
use crate::math::Color;
use crate::transition::{Transition, TransitionSample};
use crate::window::{ShadowEffect, Window, WindowFlags, WindowId, WindowState};

/// Horizontal spacing of the title bar buttons
const BUTTON_SPACING: i32 = 20;
const BUTTON_RADIUS: u32 = 6;

/// What happened while composing one frame
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FrameReport {
    /// Presented frame number, starting at 1
    pub frame: u64,
    /// Windows drawn, back to front
    pub window_order: Vec<WindowId>,
    /// Windows skipped this frame (empty bounds or failed draw)
    pub skipped: Vec<WindowId>,
    /// GPU-only passes skipped for lack of device support
    pub effects_skipped: u32,
    /// Live particles after this frame
    pub particles: usize,
    /// Transitions still running after this frame
    pub transitions_active: usize,
}

/// The render pipeline
pub struct Compositor {
    config: CompositorConfig,
    device: Box<dyn GpuDevice>,
    context: GraphicsContext,
    textures: TextureStore,
    transitions: BTreeMap<WindowId, Vec<Transition>>,
    /// End state of completed transitions; identity entries are dropped
    settled: BTreeMap<WindowId, TransitionSample>,
    /// Requests received since the last frame; they start at t = 0 next frame
    pending: Vec<(WindowId, Transition)>,
    particles: Vec<ParticleSystem>,
    warned_unsupported: bool,
}

impl Compositor {
    /// Validate the config, bring up the device and allocate the framebuffer.
    ///
    /// A device that fails to initialize is not an error: the compositor
    /// runs without GPU-only passes.
    pub fn new(
        config: CompositorConfig,
        mut device: Box<dyn GpuDevice>,
    ) -> Result<Self, RenderError> {
        config.validate()?;

        if config.gpu_acceleration {
            if let Err(e) = device.initialize() {
                warn!(
                    "GPU device '{}' unavailable, continuing without GPU effects: {}",
                    device.device_name(),
                    e
                );
            }
        }

        let textures = TextureStore::new(
            config.texture_block_size,
            config.texture_blocks(),
            config.max_windows * 4,
        )?;

        info!(
            "Compositor initialized: {}x{} on '{}' (gpu effects: {})",
            config.width,
            config.height,
            device.device_name(),
            config.gpu_acceleration && device.is_supported()
        );

        Ok(Self {
            context: GraphicsContext::new(config.width, config.height),
            config,
            device,
            textures,
            transitions: BTreeMap::new(),
            settled: BTreeMap::new(),
            pending: Vec::new(),
            particles: Vec::new(),
            warned_unsupported: false,
        })
    }

    /// `graphics_shutdown`: release the device. Frames composed afterwards
    /// skip GPU-only passes.
    pub fn shutdown(&mut self) {
        self.device.shutdown();
        info!("Compositor shut down after {} frames", self.context.frames_presented());
    }

    pub fn config(&self) -> &CompositorConfig {
        &self.config
    }

    pub fn device_name(&self) -> &str {
        self.device.device_name()
    }

    /// Whether GPU-only passes run this frame
    pub fn is_gpu_supported(&self) -> bool {
        self.config.gpu_acceleration && self.device.is_supported()
    }

    pub fn context(&self) -> &GraphicsContext {
        &self.context
    }

    pub fn framebuffer(&self) -> &PixelBuffer {
        self.context.framebuffer()
    }

    pub fn textures(&self) -> &TextureStore {
        &self.textures
    }

    pub fn textures_mut(&mut self) -> &mut TextureStore {
        &mut self.textures
    }

    // ========================================================================
    // Transitions and overlays
    // ========================================================================

    /// Queue a transition for a window. It replaces any running transition
    /// of the same kind and is first sampled at t = 0 on the next frame.
    pub fn start_transition(&mut self, id: WindowId, transition: Transition) {
        debug!("Transition queued for window {}: {:?}", id, transition.kind);
        self.pending.push((id, transition));
    }

    /// Running transitions of one window
    pub fn transitions_for(&self, id: WindowId) -> &[Transition] {
        self.transitions.get(&id).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Visual state a window rests at once its transitions have finished
    pub fn settled(&self, id: WindowId) -> TransitionSample {
        self.settled.get(&id).copied().unwrap_or_default()
    }

    /// Number of running transitions across all windows
    pub fn active_transitions(&self) -> usize {
        self.transitions.values().map(Vec::len).sum()
    }

    pub fn spawn_particles(&mut self, config: ParticleConfig) {
        debug!("Particle system spawned at {:?}", config.origin);
        self.particles.push(ParticleSystem::new(config));
    }

    pub fn particle_systems(&self) -> &[ParticleSystem] {
        &self.particles
    }

    fn insert_transition(&mut self, id: WindowId, transition: Transition) {
        let running = self.transitions.entry(id).or_default();
        let kind = discriminant(&transition.kind);
        running.retain(|t| discriminant(&t.kind) != kind);
        running.push(transition);
    }

    /// Settled state overridden by the running transitions of a window.
    /// At most one transition of each kind runs at a time.
    fn sample(&self, id: WindowId) -> TransitionSample {
        self.transitions_for(id)
            .iter()
            .fold(self.settled(id), |out, t| out.with(t))
    }

    // ========================================================================
    // Frame
    // ========================================================================

    /// Compose and present one frame.
    ///
    /// `windows` is the back-to-front snapshot to draw and `dt` the seconds
    /// elapsed since the previous frame. A window that fails to draw is
    /// skipped and logged; the frame always completes.
    pub fn compose(&mut self, windows: &[Window], dt: f32) -> FrameReport {
        let dt = dt.max(0.0);
        let gpu = self.is_gpu_supported();
        let mut report = FrameReport::default();

        for running in self.transitions.values_mut() {
            for t in running.iter_mut() {
                t.advance(dt);
            }
        }
        for (id, transition) in std::mem::take(&mut self.pending) {
            self.insert_transition(id, transition);
        }
        self.transitions
            .retain(|id, _| windows.iter().any(|w| w.id == *id));
        self.settled
            .retain(|id, _| windows.iter().any(|w| w.id == *id));

        self.context.framebuffer_mut().clear(Color::DESKTOP);

        for window in windows.iter().filter(|w| w.state != WindowState::Hidden) {
            match self.draw_window(window, gpu, &mut report) {
                Ok(()) => report.window_order.push(window.id),
                Err(e) => {
                    warn!("Skipping window {} this frame: {}", window.id, e);
                    report.skipped.push(window.id);
                }
            }
        }

        // Particle overlay
        for system in &mut self.particles {
            system.update(dt);
        }
        if !self.particles.is_empty() {
            if self.config.particles && gpu {
                let fb = self.context.framebuffer_mut();
                for system in &self.particles {
                    system.render(fb);
                }
            } else if self.config.particles {
                self.skip_gpu_pass("particles", &mut report);
            }
        }
        self.particles.retain(|s| !s.is_finished());

        report.frame = self.context.present();
        report.particles = self.particles.iter().map(ParticleSystem::len).sum();

        for (&id, running) in self.transitions.iter_mut() {
            let (done, active): (Vec<Transition>, Vec<Transition>) =
                running.iter().copied().partition(|t| t.is_complete());
            if !done.is_empty() {
                let base = self.settled.get(&id).copied().unwrap_or_default();
                let settled = done.iter().fold(base, |out, t| out.with(t));
                if settled == TransitionSample::default() {
                    self.settled.remove(&id);
                } else {
                    self.settled.insert(id, settled);
                }
            }
            *running = active;
        }
        self.transitions.retain(|_, running| !running.is_empty());
        report.transitions_active = self.active_transitions();

        trace!(
            "Frame {}: {} windows, {} skipped, {} effects skipped",
            report.frame,
            report.window_order.len(),
            report.skipped.len(),
            report.effects_skipped
        );
        report
    }

    /// Run every pass for one window and blit it
    fn draw_window(
        &mut self,
        window: &Window,
        gpu: bool,
        report: &mut FrameReport,
    ) -> Result<(), RenderError> {
        if window.bounds.is_empty() {
            return Err(RenderError::EmptyBounds(window.id));
        }

        let mut target = PixelBuffer::new(window.bounds.width, window.bounds.height);
        self.draw_base(window, &mut target);
        if let Some(delegate) = window.delegate() {
            delegate.draw(window, &mut target)?;
        }

        let sample = self.sample(window.id);
        let dest = window
            .bounds
            .translate(sample.offset.0.round() as i32, sample.offset.1.round() as i32)
            .scale_about_center(sample.scale);

        let effects = window.effects;

        if let Some(radius) = effects.blur {
            if self.config.blur {
                if gpu {
                    target.apply_blur(target.bounds(), radius);
                } else {
                    self.skip_gpu_pass("blur", report);
                }
            }
        }

        if self.config.shadow
            && (effects.shadow.is_some() || window.flags.contains(WindowFlags::SHADOW))
        {
            let shadow = effects
                .shadow
                .unwrap_or_else(|| ShadowEffect::with_blur(self.config.shadow_blur));
            let color = Color::BLACK.scale_alpha(shadow.intensity * sample.opacity);
            self.context.framebuffer_mut().apply_shadow(
                dest.translate(shadow.offset.0, shadow.offset.1),
                color,
                shadow.blur_radius,
            );
        }

        if let Some(glass) = effects.glass {
            if self.config.glass {
                if gpu {
                    target.apply_blur(target.bounds(), glass.blur_radius);
                    target.apply_glass(target.bounds(), glass.transparency);
                } else {
                    self.skip_gpu_pass("glass", report);
                }
            }
        }

        if let Some(intensity) = effects.vignette {
            if self.config.vignette {
                if gpu {
                    target.apply_vignette(target.bounds(), intensity);
                } else {
                    self.skip_gpu_pass("vignette", report);
                }
            }
        }

        self.context
            .framebuffer_mut()
            .blit_scaled(&target, dest, sample.opacity);
        Ok(())
    }

    /// Background, title bar and title bar buttons, in window-local space
    fn draw_base(&self, window: &Window, target: &mut PixelBuffer) {
        let radius = self.config.corner_radius.max(0.0).round() as u32;
        target.draw_rounded_rect(target.bounds(), radius, window.background);

        let Some(bar) = window.title_bar_rect() else {
            return;
        };
        let bar_color = if window.focused {
            Color::TITLE_ACTIVE
        } else {
            Color::TITLE_INACTIVE
        };
        // Recolor only covered pixels so the rounded corners survive
        for y in bar.y..bar.bottom() {
            for x in bar.x..bar.right() {
                if target.get(x, y).is_some_and(|p| p.a > 0) {
                    target.set(x, y, bar_color);
                }
            }
        }

        let cy = bar.y + bar.height as i32 / 2;
        let buttons = [
            (WindowFlags::CLOSABLE, Color::CLOSE),
            (WindowFlags::MINIMIZABLE, Color::MINIMIZE),
            (WindowFlags::MAXIMIZABLE, Color::MAXIMIZE),
        ];
        for (i, (flag, color)) in buttons.into_iter().enumerate() {
            if window.flags.contains(flag) {
                let cx = 12 + i as i32 * BUTTON_SPACING;
                target.draw_circle(cx, cy, BUTTON_RADIUS, color);
            }
        }
    }

    fn skip_gpu_pass(&mut self, pass: &str, report: &mut FrameReport) {
        report.effects_skipped += 1;
        if self.warned_unsupported {
            debug!("Skipping {} pass: GPU not supported", pass);
        } else {
            warn!(
                "GPU device '{}' does not support effect passes; skipping {}",
                self.device.device_name(),
                pass
            );
            self.warned_unsupported = true;
        }
    }
}

impl std::fmt::Debug for Compositor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Compositor")
            .field("device", &self.device.device_name())
            .field("frames", &self.context.frames_presented())
            .field("transitions", &self.active_transitions())
            .field("particles", &self.particles.len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::math::Rect;
    use crate::transition::{Easing, TransitionKind};
    use crate::window::{WindowConfig, WindowEffects, WindowManager};
    use mos_hal::{SoftwareGpu, UnsupportedGpu};

    fn small_config() -> CompositorConfig {
        CompositorConfig {
            width: 200,
            height: 150,
            texture_memory: 64 * 1024,
            ..Default::default()
        }
    }

    fn compositor(gpu: bool) -> Compositor {
        let device: Box<dyn GpuDevice> = if gpu {
            Box::new(SoftwareGpu::new())
        } else {
            Box::new(UnsupportedGpu::new())
        };
        Compositor::new(small_config(), device).unwrap()
    }

    fn manager_with(bounds: &[Rect]) -> (WindowManager, Vec<WindowId>) {
        let mut wm = WindowManager::with_display(8, 200, 150);
        let ids = bounds
            .iter()
            .map(|&bounds| {
                wm.create(WindowConfig {
                    bounds,
                    ..Default::default()
                })
                .unwrap()
            })
            .collect();
        (wm, ids)
    }

    #[test]
    fn test_compose_back_to_front() {
        let mut comp = compositor(true);
        let (mut wm, ids) = manager_with(&[Rect::new(10, 10, 80, 60), Rect::new(40, 30, 80, 60)]);
        wm.set_background(ids[0], Color::rgb(255, 0, 0)).unwrap();
        wm.set_background(ids[1], Color::rgb(0, 0, 255)).unwrap();

        let report = comp.compose(&wm.snapshot(), 0.016);
        assert_eq!(report.frame, 1);
        assert_eq!(report.window_order, ids);
        // Overlap shows the later window
        assert_eq!(comp.framebuffer().get(60, 65), Some(Color::rgb(0, 0, 255)));
        assert_eq!(comp.framebuffer().get(15, 40), Some(Color::rgb(255, 0, 0)));
    }

    #[test]
    fn test_hidden_skipped_minimized_drawn() {
        let mut comp = compositor(true);
        let (mut wm, ids) = manager_with(&[Rect::new(0, 0, 50, 50), Rect::new(60, 0, 50, 50)]);
        wm.set_state(ids[0], WindowState::Hidden).unwrap();
        wm.set_state(ids[1], WindowState::Minimized).unwrap();

        let report = comp.compose(&wm.snapshot(), 0.016);
        assert_eq!(report.window_order, vec![ids[1]]);
    }

    #[test]
    fn test_fade_boundaries_and_removal() {
        let mut comp = compositor(true);
        let (wm, ids) = manager_with(&[Rect::new(20, 20, 60, 60)]);
        comp.start_transition(
            ids[0],
            Transition::new(TransitionKind::Fade { from: 0.0, to: 1.0 }, 0.5, Easing::Linear),
        );

        // t = 0: fully transparent, desktop shows through
        comp.compose(&wm.snapshot(), 0.25);
        assert_eq!(comp.transitions_for(ids[0])[0].elapsed, 0.0);
        assert_eq!(comp.framebuffer().get(50, 60), Some(Color::DESKTOP));

        // t = d: exact end value, then gone
        let report = comp.compose(&wm.snapshot(), 0.5);
        assert_eq!(report.transitions_active, 0);
        assert_eq!(comp.framebuffer().get(50, 60), Some(Color::WINDOW));
        assert!(comp.transitions_for(ids[0]).is_empty());
    }

    #[test]
    fn test_fade_out_settles_hidden() {
        let mut comp = compositor(true);
        let (wm, ids) = manager_with(&[Rect::new(20, 20, 60, 60)]);
        comp.start_transition(ids[0], Transition::fade_out());
        comp.compose(&wm.snapshot(), 0.0);

        let report = comp.compose(&wm.snapshot(), 10.0);
        assert_eq!(report.transitions_active, 0);
        assert_eq!(comp.framebuffer().get(50, 60), Some(Color::DESKTOP));

        // Stays faded on later frames
        comp.compose(&wm.snapshot(), 0.016);
        assert_eq!(comp.framebuffer().get(50, 60), Some(Color::DESKTOP));
        assert_eq!(comp.settled(ids[0]).opacity, 0.0);

        // A fade back in replaces the settled opacity
        comp.start_transition(ids[0], Transition::fade_in());
        comp.compose(&wm.snapshot(), 0.0);
        assert_eq!(comp.framebuffer().get(50, 60), Some(Color::DESKTOP));
        comp.compose(&wm.snapshot(), 10.0);
        comp.compose(&wm.snapshot(), 0.016);
        assert_eq!(comp.framebuffer().get(50, 60), Some(Color::WINDOW));
        assert_eq!(comp.settled(ids[0]), TransitionSample::default());
    }

    #[test]
    fn test_slide_settles_at_end_offset() {
        let mut comp = compositor(true);
        let (wm, ids) = manager_with(&[Rect::new(20, 20, 60, 60)]);
        let slide = TransitionKind::Slide {
            from: (0.0, 0.0),
            to: (100.0, 0.0),
        };
        comp.start_transition(ids[0], Transition::new(slide, 0.5, Easing::Linear));
        comp.compose(&wm.snapshot(), 0.0);
        comp.compose(&wm.snapshot(), 1.0);

        for _ in 0..2 {
            let report = comp.compose(&wm.snapshot(), 0.016);
            assert_eq!(report.transitions_active, 0);
            assert_eq!(comp.framebuffer().get(50, 60), Some(Color::DESKTOP));
            assert_eq!(comp.framebuffer().get(150, 60), Some(Color::WINDOW));
        }
        assert_eq!(comp.settled(ids[0]).offset, (100.0, 0.0));
    }

    #[test]
    fn test_settled_state_dropped_with_window() {
        let mut comp = compositor(true);
        let (mut wm, ids) = manager_with(&[Rect::new(0, 0, 50, 50)]);
        comp.start_transition(ids[0], Transition::fade_out());
        comp.compose(&wm.snapshot(), 0.0);
        comp.compose(&wm.snapshot(), 10.0);
        assert_eq!(comp.settled(ids[0]).opacity, 0.0);

        wm.destroy(ids[0]);
        comp.compose(&wm.snapshot(), 0.0);
        assert_eq!(comp.settled(ids[0]), TransitionSample::default());
    }

    #[test]
    fn test_same_kind_replaces() {
        let mut comp = compositor(true);
        let (wm, ids) = manager_with(&[Rect::new(0, 0, 50, 50)]);
        comp.start_transition(ids[0], Transition::fade_in());
        comp.start_transition(ids[0], Transition::fade_out());
        comp.start_transition(ids[0], Transition::slide_in(0.0, 40.0));
        comp.compose(&wm.snapshot(), 0.0);
        assert_eq!(comp.transitions_for(ids[0]).len(), 2);
    }

    #[test]
    fn test_transitions_dropped_with_window() {
        let mut comp = compositor(true);
        let (mut wm, ids) = manager_with(&[Rect::new(0, 0, 50, 50)]);
        comp.start_transition(ids[0], Transition::fade_in());
        comp.compose(&wm.snapshot(), 0.0);
        assert_eq!(comp.active_transitions(), 1);

        wm.destroy(ids[0]);
        comp.compose(&wm.snapshot(), 0.0);
        assert_eq!(comp.active_transitions(), 0);
    }

    #[test]
    fn test_unsupported_device_skips_gpu_passes() {
        let mut comp = compositor(false);
        assert!(!comp.is_gpu_supported());
        let (mut wm, ids) = manager_with(&[Rect::new(10, 10, 60, 60)]);
        wm.set_effects(
            ids[0],
            WindowEffects {
                blur: Some(4.0),
                vignette: Some(0.5),
                ..Default::default()
            },
        )
        .unwrap();
        comp.spawn_particles(ParticleConfig::default());

        let report = comp.compose(&wm.snapshot(), 0.1);
        assert_eq!(report.window_order, ids);
        // blur + vignette + particles
        assert_eq!(report.effects_skipped, 3);
        // Particles still simulate
        assert!(report.particles > 0);
    }

    #[test]
    fn test_window_at_coordinate_limit() {
        let mut comp = compositor(true);
        let (mut wm, ids) = manager_with(&[Rect::new(20, 20, 60, 60)]);
        wm.move_to(ids[0], 0, i32::MAX - 1).unwrap();
        comp.start_transition(ids[0], Transition::slide_in(0.0, 40.0));

        let report = comp.compose(&wm.snapshot(), 0.016);
        assert_eq!(report.window_order, ids);
        assert_eq!(comp.framebuffer().get(50, 60), Some(Color::DESKTOP));
        assert_eq!(comp.framebuffer().get(199, 149), Some(Color::DESKTOP));

        wm.move_to(ids[0], i32::MIN, i32::MIN).unwrap();
        let report = comp.compose(&wm.snapshot(), 0.016);
        assert_eq!(report.window_order, ids);
        assert_eq!(comp.framebuffer().get(0, 0), Some(Color::DESKTOP));
    }

    #[test]
    fn test_moved_window_leaves_no_trail() {
        let mut comp = compositor(true);
        let (mut wm, ids) = manager_with(&[Rect::new(0, 0, 60, 60)]);
        comp.compose(&wm.snapshot(), 0.0);
        assert_eq!(comp.framebuffer().get(30, 40), Some(Color::WINDOW));

        wm.move_to(ids[0], 120, 40).unwrap();
        comp.compose(&wm.snapshot(), 0.0);
        assert_eq!(comp.framebuffer().get(30, 40), Some(Color::DESKTOP));
        assert_eq!(comp.framebuffer().get(150, 80), Some(Color::WINDOW));
    }

    #[test]
    fn test_shadow_without_gpu() {
        let mut comp = compositor(false);
        let (wm, _) = manager_with(&[Rect::new(50, 50, 60, 40)]);
        comp.compose(&wm.snapshot(), 0.0);
        // Below the window, inside the shadow reach
        let below = comp.framebuffer().get(80, 93).unwrap();
        assert_ne!(below, Color::DESKTOP);
    }

    #[test]
    fn test_shutdown_disables_gpu() {
        let mut comp = compositor(true);
        assert!(comp.is_gpu_supported());
        comp.shutdown();
        assert!(!comp.is_gpu_supported());
    }

    #[test]
    fn test_empty_bounds_skipped() {
        let mut comp = compositor(true);
        let mut wm = WindowManager::with_display(4, 200, 150);
        let id = wm.create(WindowConfig::default()).unwrap();
        let mut window = wm.get(id).unwrap().clone();
        window.bounds = Rect::new(0, 0, 0, 10);

        let report = comp.compose(&[window.clone()], 0.0);
        assert!(report.window_order.is_empty());
        assert_eq!(report.skipped, vec![window.id]);
    }
}
