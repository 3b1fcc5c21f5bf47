//! Hardware Abstraction Layer for the desktop core
//!
//! This crate defines the device capability interface the compositor renders
//! through, plus the error taxonomy shared by every layer above it.
//!
//! # Device Implementations
//!
//! - **Software**: always supported, rasterizes every effect pass on the CPU
//! - **Unsupported**: explicit "no GPU" variant; GPU-only passes are skipped
//!
//! The compositor never inspects what backs a device. It asks
//! [`GpuDevice::is_supported`] once per frame and degrades when the answer is no.

#![no_std]

extern crate alloc;

use alloc::boxed::Box;
use alloc::string::String;

mod device;

pub use device::{SoftwareGpu, UnsupportedGpu};

/// Broad classification of every error raised by the core.
///
/// Resource exhaustion and not-found conditions are recoverable and always
/// returned to the caller. `InvalidState` is reported on mutation paths and
/// swallowed on teardown paths. `UnsupportedFeature` is logged and skipped.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// A pool, map, process table or window table is full
    ResourceExhausted,
    /// An unknown key, handle, window or process id was passed in
    NotFound,
    /// The operation is not valid for the entity's current state
    InvalidState,
    /// The operation needs a capability the device does not have
    UnsupportedFeature,
}

impl ErrorKind {
    /// Whether the caller can keep going after seeing this error
    pub fn is_recoverable(&self) -> bool {
        matches!(self, ErrorKind::ResourceExhausted | ErrorKind::NotFound)
    }
}

/// GPU device capability interface
///
/// Implementations wrap whatever native handle the platform provides
/// (device, command queue). The render pipeline only ever calls these four
/// methods.
pub trait GpuDevice: Send + 'static {
    /// Acquire the device and its command queue
    ///
    /// # Returns
    /// * `Ok(())` - Device is ready for rendering
    /// * `Err(HalError::DeviceUnavailable)` - No usable device
    fn initialize(&mut self) -> Result<(), HalError>;

    /// Release the device. Calling this twice is harmless.
    fn shutdown(&mut self);

    /// Whether GPU-only effect passes can run on this device
    fn is_supported(&self) -> bool;

    /// Human-readable device name for logs
    fn device_name(&self) -> &str;
}

impl<D: GpuDevice + ?Sized> GpuDevice for Box<D> {
    fn initialize(&mut self) -> Result<(), HalError> {
        (**self).initialize()
    }

    fn shutdown(&mut self) {
        (**self).shutdown()
    }

    fn is_supported(&self) -> bool {
        (**self).is_supported()
    }

    fn device_name(&self) -> &str {
        (**self).device_name()
    }
}

/// Pick a device from the acceleration toggle.
pub fn select_device(gpu_acceleration: bool) -> Box<dyn GpuDevice> {
    if gpu_acceleration {
        Box::new(SoftwareGpu::new())
    } else {
        Box::new(UnsupportedGpu::new())
    }
}

/// HAL errors
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum HalError {
    /// No device could be acquired
    #[error("GPU device unavailable: {0}")]
    DeviceUnavailable(String),
    /// Operation not supported on this device
    #[error("operation not supported by device")]
    NotSupported,
}

impl HalError {
    /// Classify this error
    pub fn kind(&self) -> ErrorKind {
        ErrorKind::UnsupportedFeature
    }
}
