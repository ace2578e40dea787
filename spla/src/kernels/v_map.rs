use spla_types::OpUnary;

use crate::container::vector::Vector;
use crate::error::{SplaResult, Status};

/// Element-wise unary map (spec §6's op-tag list). Applies `op` to every
/// position, including fill positions that have no explicit entry — the
/// output is always a fully dense logical vector even when `r` ends up
/// storing it sparsely.
pub fn v_map(r: &mut Vector, v: &Vector, op: &OpUnary) -> SplaResult<()> {
    if r.len() != v.len() {
        return Err(Status::InvalidArgument("r and v must have the same length".into()).emit());
    }
    if v.element_type() != op.t_in() {
        return Err(Status::InvalidArgument(
            "operator input type does not match vector element type".into(),
        ).emit());
    }
    if r.element_type() != op.t_out() {
        return Err(Status::InvalidArgument(
            "operator output type does not match result element type".into(),
        ).emit());
    }
    for i in 0..r.len() {
        r.set_value(i, op.apply(v.get(i)?))?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use spla_types::{Builtins, ElementTypeId, Value};

    #[test]
    fn applies_unary_op_everywhere() {
        let mut v = Vector::new(3, ElementTypeId::I32);
        v.set_value(1, Value::I32(4)).unwrap();
        let mut r = Vector::new(3, ElementTypeId::I32);
        v_map(&mut r, &v, &Builtins::ainv(ElementTypeId::I32)).unwrap();
        assert_eq!(r.get(0).unwrap(), Value::I32(0));
        assert_eq!(r.get(1).unwrap(), Value::I32(-4));
    }
}
