//! The accelerator runtime (spec §4.3): device handle, program cache,
//! vendor-specific wavefront sizing, and a temporary device-buffer pool.
//!
//! Everything in this crate is feature-gated behind `accel` (on by
//! default) so that a workspace build on a host without an OpenCL ICD
//! still succeeds; `spla`'s dispatcher simply finds no accelerator
//! candidates and runs CPU-only, the same outcome as
//! `force_no_acceleration(true)`.

mod device;
mod error;

#[cfg(feature = "accel")]
mod buffer_pool;
#[cfg(feature = "accel")]
mod program_cache;
#[cfg(feature = "accel")]
mod runtime;

pub use device::Vendor;
pub use error::AccelError;

#[cfg(feature = "accel")]
pub use buffer_pool::{TempBuffer, TempBufferPool};
#[cfg(feature = "accel")]
pub use program_cache::{ProgramCache, ProgramKey};
#[cfg(feature = "accel")]
pub use runtime::AccelRuntime;
