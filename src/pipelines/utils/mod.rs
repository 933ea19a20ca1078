use crate::error::{PipelineError, Result};
use candle_core::Device;

pub mod builder;
pub use builder::{BasePipelineBuilder, StandardPipelineBuilder};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum DeviceRequest {
    #[default]
    Cpu,
    Cuda(usize),
}

impl DeviceRequest {
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

macro_rules! impl_device_methods {
    (delegated: $builder:ident < $($gen:ident : $bound:path),* >) => {
        impl<$($gen: $bound),*> $builder<$($gen),*> {
            /// Use CPU for inference (default).
            pub fn cpu(mut self) -> Self {
                *self.0.device_request_mut() = crate::pipelines::utils::DeviceRequest::Cpu;
                self
            }

            /// Use a specific CUDA GPU for inference.
            pub fn cuda(mut self, index: usize) -> Self {
                *self.0.device_request_mut() = crate::pipelines::utils::DeviceRequest::Cuda(index);
                self
            }

            /// Apply an already resolved request.
            pub fn with_device(mut self, request: crate::pipelines::utils::DeviceRequest) -> Self {
                *self.0.device_request_mut() = request;
                self
            }
        }
    };
}

pub(crate) use impl_device_methods;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cpu_is_default_and_always_resolves() {
        assert_eq!(DeviceRequest::default(), DeviceRequest::Cpu);
        assert!(DeviceRequest::Cpu.resolve().unwrap().is_cpu());
    }

    #[cfg(not(feature = "cuda"))]
    #[test]
    fn cuda_without_support_is_a_device_error() {
        let err = DeviceRequest::Cuda(0).resolve().unwrap_err();
        assert!(matches!(err, PipelineError::Device(_)));
    }
}
