//! Headless desktop demo
//!
//! Boots a desktop, launches a few apps through the event queue and drives
//! frames at the configured rate, logging each frame report as JSON.
//!
//! Environment:
//! * `MOS_FRAMES` - frames to run (default 120)
//! * `MOS_APPS` - comma-separated app names (default `Finder,Terminal,Safari`)
//! * `MOS_GPU` - `0` boots without GPU acceleration
//! * `MOS_THREADED` - `1` runs the event and render loops on separate threads
//! * `RUST_LOG` - log filter (default `info`)

use std::thread;
use std::time::Instant;

use log::{error, info};
use mos_desktop::{FrameReport, ParticleConfig, Transition};
use mos_system::{Desktop, FramePacer, InboundEvent, SystemConfig};

fn env_or<T: std::str::FromStr>(key: &str, default: T) -> T {
    std::env::var(key)
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(default)
}

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let frames: u64 = env_or("MOS_FRAMES", 120);
    let apps = std::env::var("MOS_APPS").unwrap_or_else(|_| "Finder,Terminal,Safari".to_string());
    let threaded = env_or("MOS_THREADED", 0u8) == 1;

    let mut config = SystemConfig::default();
    config.compositor.gpu_acceleration = env_or("MOS_GPU", 1u8) == 1;

    let desktop = match Desktop::boot(config) {
        Ok(desktop) => desktop,
        Err(e) => {
            error!("Boot failed ({:?}): {}", e.kind(), e);
            std::process::exit(1);
        }
    };
    info!("Rendering on {}", desktop.compositor().device_name());

    for name in apps.split(',').map(str::trim).filter(|n| !n.is_empty()) {
        desktop.push_event(InboundEvent::LaunchApp {
            name: name.to_string(),
        });
    }
    let display = desktop.windows().display();
    desktop.push_event(InboundEvent::SpawnParticles {
        config: ParticleConfig {
            origin: display.center(),
            ..Default::default()
        },
    });

    if threaded {
        run_threaded(desktop, frames);
    } else {
        run_interleaved(desktop, frames);
    }
}

/// Event loop and render loop take turns on this thread
fn run_interleaved(mut desktop: Desktop, frames: u64) {
    for _ in 0..frames {
        let started = Instant::now();
        let report = desktop.tick(started);
        log_report(&report);

        // Slide the focused window in once the launch fade is done
        if report.frame == 30 {
            if let Some(id) = desktop.windows().focused() {
                desktop.push_event(InboundEvent::StartTransition {
                    id,
                    transition: Transition::slide_in(0.0, 40.0),
                });
            }
        }

        thread::sleep(desktop.pacer().remaining(started, Instant::now()));
    }

    let memory = desktop.memory_info();
    info!(
        "Memory: {} KiB used of {} KiB",
        memory.used / 1024,
        memory.total / 1024
    );
    for process in desktop.kernel().processes() {
        info!(
            "  pid {:>3} {:<20} priority {} runs {:>4} cpu {} us",
            process.pid.0, process.name, process.priority, process.run_count, process.cpu_time_us
        );
    }
    desktop.shutdown();
}

/// Event loop on a worker thread, render loop here
fn run_threaded(desktop: Desktop, frames: u64) {
    let mut pacer = FramePacer::new(&desktop.config().pacing);
    let budget = pacer.frame_budget();
    let (mut event_loop, mut render_loop) = desktop.into_loops();

    let worker = thread::spawn(move || {
        for _ in 0..frames {
            let started = Instant::now();
            event_loop.step();
            thread::sleep(budget.saturating_sub(started.elapsed()));
        }
        event_loop
    });

    for _ in 0..frames {
        let started = Instant::now();
        let dt = pacer.begin_frame(started);
        let report = render_loop.render(dt);
        log_report(&report);
        thread::sleep(pacer.remaining(started, Instant::now()));
    }

    match worker.join() {
        Ok(event_loop) => info!(
            "Event loop done: {} processes, {} windows, render loop at snapshot {}",
            event_loop.kernel().process_count(),
            event_loop.windows().count(),
            render_loop.sequence()
        ),
        Err(_) => error!("Event loop thread panicked"),
    }
}

fn log_report(report: &FrameReport) {
    match serde_json::to_string(report) {
        Ok(json) => info!("{}", json),
        Err(e) => error!("Frame report not serializable: {}", e),
    }
}
