use crate::error::{PipelineError, Result};
use candle_core::Device;

/// Which device to run inference on.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum DeviceRequest {
    /// Run on the CPU.
    #[default]
    Cpu,
    /// Run on the CUDA device with this index.
    Cuda(usize),
}

impl DeviceRequest {
    /// Initialize the requested device.
    pub fn resolve(self) -> Result<Device> {
        match self {
            DeviceRequest::Cpu => Ok(Device::Cpu),
            DeviceRequest::Cuda(i) => Device::new_cuda(i).map_err(|e| {
                PipelineError::Device(format!(
                    "Failed to init CUDA device {i}: {e}. Try CPU as fallback."
                ))
            }),
        }
    }
}
