pub mod descriptor;
pub mod registry;
pub mod task;

pub use descriptor::Descriptor;
pub use registry::{global, AlgorithmRegistry, Candidate};
pub use task::Task;
