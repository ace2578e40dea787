use spla_types::{ElementTypeId, Value};

use crate::error::{SplaResult, Status};

/// Holds exactly one value of a declared type (spec §3). Reductions
/// (`v_reduce`, `m_reduce`, ...) write their result here.
#[derive(Clone, Debug)]
pub struct Scalar {
    ty: ElementTypeId,
    value: Value,
}

impl Scalar {
    pub fn new(ty: ElementTypeId) -> Scalar {
        Scalar { ty, value: ty.zero() }
    }

    pub fn with_value(value: Value) -> Scalar {
        Scalar { ty: value.ty(), value }
    }

    pub fn element_type(&self) -> ElementTypeId {
        self.ty
    }

    pub fn get(&self) -> Value {
        self.value
    }

    pub fn set(&mut self, value: Value) -> SplaResult<()> {
        if value.ty() != self.ty {
            return Err(Status::InvalidArgument(format!(
                "value of type {:?} does not match scalar element type {:?}",
                value.ty(),
                self.ty
            )).emit());
        }
        self.value = value;
        Ok(())
    }

    pub fn clear(&mut self) {
        self.value = self.ty.zero();
    }
}
