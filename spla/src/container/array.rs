use spla_types::{ElementTypeId, Value};

use crate::error::{SplaResult, Status};

/// A dense 1-D sequence used to batch-build or batch-read vectors and
/// matrices (spec §3) — the plain `Vec<Value>` that `Vector::build`/
/// `read` and `Matrix::build`/`read` move data through, with no
/// decorations or validity bitmap of its own.
#[derive(Clone, Debug)]
pub struct Array {
    ty: ElementTypeId,
    values: Vec<Value>,
}

impl Array {
    pub fn new(ty: ElementTypeId) -> Array {
        Array { ty, values: Vec::new() }
    }

    pub fn from_values(ty: ElementTypeId, values: Vec<Value>) -> SplaResult<Array> {
        if let Some(bad) = values.iter().find(|v| v.ty() != ty) {
            return Err(Status::InvalidArgument(format!(
                "value of type {:?} does not match array element type {ty:?}",
                bad.ty()
            )).emit());
        }
        Ok(Array { ty, values })
    }

    pub fn element_type(&self) -> ElementTypeId {
        self.ty
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn as_slice(&self) -> &[Value] {
        &self.values
    }

    pub fn push(&mut self, value: Value) -> SplaResult<()> {
        if value.ty() != self.ty {
            return Err(Status::InvalidArgument(format!(
                "value of type {:?} does not match array element type {:?}",
                value.ty(),
                self.ty
            )).emit());
        }
        self.values.push(value);
        Ok(())
    }

    pub fn clear(&mut self) {
        self.values.clear();
    }

    pub fn resize(&mut self, len: usize) {
        self.values.resize(len, self.ty.zero());
    }
}
