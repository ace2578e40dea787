use thiserror::Error;

/// Environment and compilation failures the accelerator runtime can
/// surface; `spla::Status` folds these into the library-wide status
/// enum (spec §6).
#[derive(Error, Debug, Clone)]
pub enum AccelError {
    #[error("no accelerator backend is configured")]
    NoAcceleration,
    #[error("OpenCL platform {0} not found")]
    PlatformNotFound(usize),
    #[error("OpenCL device {device} not found on platform {platform}")]
    DeviceNotFound { platform: usize, device: usize },
    #[error("kernel compilation failed: {0}")]
    CompilationError(String),
    #[error("accelerator runtime error: {0}")]
    Other(String),
}

#[cfg(feature = "accel")]
impl From<ocl::Error> for AccelError {
    fn from(e: ocl::Error) -> Self {
        AccelError::Other(e.to_string())
    }
}
