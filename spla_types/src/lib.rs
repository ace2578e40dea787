//! Element-type descriptors and the operator registry.
//!
//! `spla` containers are not generic over a Rust type at the API boundary:
//! a vector or matrix is created with a *runtime* [`ElementTypeId`] and
//! carries type-erased [`Value`]s internally. Operators close over a
//! concrete Rust type but are shared as type-erased, reference-counted
//! records so that dispatch keys stay stable across calls.

#![allow(clippy::too_many_arguments)]

mod builtin;
mod op;
mod value;

pub use builtin::Builtins;
pub use op::{HostBinaryFn, HostSelectFn, HostUnaryFn, OpBinary, OpKey, OpSelect, OpUnary};
pub use value::Value;

use std::fmt;

/// The closed set of scalar element types the core supports.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ElementTypeId {
    I32,
    U32,
    F32,
}

impl ElementTypeId {
    pub const ALL: [ElementTypeId; 3] = [ElementTypeId::I32, ElementTypeId::U32, ElementTypeId::F32];

    /// Stable textual name, also used verbatim in generated kernel source
    /// as part of mangled kernel/program names.
    pub const fn name(self) -> &'static str {
        match self {
            ElementTypeId::I32 => "int32",
            ElementTypeId::U32 => "uint32",
            ElementTypeId::F32 => "float32",
        }
    }

    /// Canonical accelerator-side (OpenCL C) spelling of this type.
    pub const fn device_spelling(self) -> &'static str {
        match self {
            ElementTypeId::I32 => "int",
            ElementTypeId::U32 => "uint",
            ElementTypeId::F32 => "float",
        }
    }

    pub const fn byte_size(self) -> usize {
        match self {
            ElementTypeId::I32 => 4,
            ElementTypeId::U32 => 4,
            ElementTypeId::F32 => 4,
        }
    }

    pub const fn zero(self) -> Value {
        match self {
            ElementTypeId::I32 => Value::I32(0),
            ElementTypeId::U32 => Value::U32(0),
            ElementTypeId::F32 => Value::F32(0.0),
        }
    }
}

impl fmt::Display for ElementTypeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}
