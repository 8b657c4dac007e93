use burn::backend::libtorch::LibTorchDevice;
use log::{info, warn};

/// Use the first CUDA device when available, otherwise fall back to the CPU
pub fn select_device() -> LibTorchDevice {
    if tch::Cuda::is_available() {
        info!("Using CUDA device 0");

        LibTorchDevice::Cuda(0)
    } else {
        warn!("CUDA is not available, falling back to the CPU");

        LibTorchDevice::Cpu
    }
}
