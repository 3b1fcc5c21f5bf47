//! Built-in device variants

use alloc::string::String;

use crate::{GpuDevice, HalError};

/// CPU rasterizer standing in for a GPU.
///
/// Supports every effect pass. `initialize` and `shutdown` only flip state,
/// which keeps frame output deterministic under test.
#[derive(Debug)]
pub struct SoftwareGpu {
    name: String,
    initialized: bool,
}

impl SoftwareGpu {
    /// Create an uninitialized software device
    pub fn new() -> Self {
        Self {
            name: String::from("Software Rasterizer"),
            initialized: false,
        }
    }

    /// Whether `initialize` has been called without a matching `shutdown`
    pub fn is_initialized(&self) -> bool {
        self.initialized
    }
}

impl Default for SoftwareGpu {
    fn default() -> Self {
        Self::new()
    }
}

impl GpuDevice for SoftwareGpu {
    fn initialize(&mut self) -> Result<(), HalError> {
        self.initialized = true;
        Ok(())
    }

    fn shutdown(&mut self) {
        self.initialized = false;
    }

    fn is_supported(&self) -> bool {
        self.initialized
    }

    fn device_name(&self) -> &str {
        &self.name
    }
}

/// Explicit "no GPU" device.
#[derive(Debug, Default)]
pub struct UnsupportedGpu;

impl UnsupportedGpu {
    pub fn new() -> Self {
        Self
    }
}

impl GpuDevice for UnsupportedGpu {
    fn initialize(&mut self) -> Result<(), HalError> {
        Err(HalError::DeviceUnavailable(String::from(
            "no GPU acceleration on this platform",
        )))
    }

    fn shutdown(&mut self) {}

    fn is_supported(&self) -> bool {
        false
    }

    fn device_name(&self) -> &str {
        "Unsupported"
    }
}
