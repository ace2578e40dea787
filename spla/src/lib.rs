//! A GraphBLAS-style sparse linear algebra core.
//!
//! Containers ([`container::Scalar`], [`container::Vector`],
//! [`container::Matrix`], [`container::Array`]) hold type-erased
//! [`spla_types::Value`]s behind a multi-format storage manager that lazily
//! converts between CPU layouts and, when a backend is selected, an
//! accelerator-resident mirror (see [`container::format`]). Kernels
//! ([`kernels`]) are dispatched through an [`dispatch::AlgorithmRegistry`]
//! keyed by operation tag and element type, and can be chained into a
//! [`schedule::Schedule`] of deferred [`dispatch::Task`]s. Process-wide
//! configuration lives in [`library::Library`].

#![allow(clippy::too_many_arguments)]

pub mod container;
pub mod dispatch;
pub mod error;
pub mod kernels;
pub mod library;
pub mod schedule;

pub use container::{Array, Matrix, Scalar, Vector};
pub use dispatch::{Descriptor, Task};
pub use error::{Message, MessageCallback, SplaResult, Status};
pub use library::{AcceleratorFamily, Library};
pub use schedule::Schedule;

pub use spla_types::{Builtins, ElementTypeId, OpBinary, OpSelect, OpUnary, Value};
