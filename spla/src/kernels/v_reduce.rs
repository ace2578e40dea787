use spla_types::{OpBinary, Value};

use crate::container::scalar::Scalar;
use crate::container::vector::Vector;
use crate::error::{SplaResult, Status};

/// Reduces a vector's explicit entries with `op`, starting from `init`
/// (spec §6; exercised by scenario S4). Positions that were never
/// written do not contribute — reducing the logical fill value at every
/// position would make the result depend on the vector's length rather
/// than on what was actually stored.
pub fn v_reduce(result: &mut Scalar, v: &mut Vector, op: &OpBinary, init: Value) -> SplaResult<()> {
    let ty = v.element_type();
    if result.element_type() != ty || init.ty() != ty {
        return Err(Status::InvalidArgument(
            "result, init and vector must share the same element type".into(),
        ).emit());
    }
    if op.t_a() != ty || op.t_b() != ty || op.t_c() != ty {
        return Err(Status::InvalidArgument(
            "operator type does not match vector element type".into(),
        ).emit());
    }
    let entries = v.coo_snapshot()?;
    let acc = entries.into_iter().fold(init, |acc, (_, value)| op.apply(acc, value));
    result.set(acc)
}

#[cfg(test)]
mod tests {
    use super::*;
    use spla_types::{Builtins, ElementTypeId};

    // scenario S4
    #[test]
    fn scenario_s4_plus_reduce() {
        let mut v = Vector::new(20, ElementTypeId::I32);
        let keys = [1usize, 3, 4, 7, 9, 12, 15, 18];
        let values = [1, 2, 1, 3, 1, 2, 2, 2];
        assert_eq!(values.iter().sum::<i32>(), 14);
        for (&k, &val) in keys.iter().zip(&values) {
            v.set_value(k, Value::I32(val)).unwrap();
        }
        let mut result = Scalar::new(ElementTypeId::I32);
        v_reduce(&mut result, &mut v, &Builtins::plus(ElementTypeId::I32), Value::I32(0)).unwrap();
        assert_eq!(result.get(), Value::I32(14));
    }

    #[test]
    fn empty_vector_reduces_to_init() {
        let mut v = Vector::new(5, ElementTypeId::I32);
        let mut result = Scalar::new(ElementTypeId::I32);
        v_reduce(&mut result, &mut v, &Builtins::plus(ElementTypeId::I32), Value::I32(9)).unwrap();
        assert_eq!(result.get(), Value::I32(9));
    }
}
