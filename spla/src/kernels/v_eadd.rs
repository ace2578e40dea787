use spla_types::OpBinary;

use crate::container::vector::Vector;
use crate::error::{SplaResult, Status};

/// Plain element-wise vector add (spec §6's op-tag list; mechanical
/// relative to [`super::v_eadd_fdb::v_eadd_fdb`] — same combining rule,
/// no feedback tracking). `r[i] = a[i] op b[i]` for every `i`, missing
/// entries read as fill.
pub fn v_eadd(r: &mut Vector, a: &Vector, b: &Vector, op: &OpBinary) -> SplaResult<()> {
    if a.len() != b.len() || a.len() != r.len() {
        return Err(Status::InvalidArgument(
            "a, b and r must have the same length".into(),
        ).emit());
    }
    let ty = r.element_type();
    if a.element_type() != ty || b.element_type() != ty {
        return Err(Status::InvalidArgument(
            "a, b and r must share the same element type".into(),
        ).emit());
    }
    if op.t_a() != ty || op.t_b() != ty || op.t_c() != ty {
        return Err(Status::InvalidArgument(
            "operator type does not match vector element type".into(),
        ).emit());
    }
    for i in 0..r.len() {
        let combined = op.apply(a.get(i)?, b.get(i)?);
        r.set_value(i, combined)?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use spla_types::{Builtins, ElementTypeId, Value};

    #[test]
    fn adds_elementwise_with_fill_for_missing_entries() {
        let mut a = Vector::new(4, ElementTypeId::I32);
        a.set_value(0, Value::I32(3)).unwrap();
        let mut b = Vector::new(4, ElementTypeId::I32);
        b.set_value(0, Value::I32(4)).unwrap();
        b.set_value(1, Value::I32(9)).unwrap();
        let mut r = Vector::new(4, ElementTypeId::I32);
        v_eadd(&mut r, &a, &b, &Builtins::plus(ElementTypeId::I32)).unwrap();
        assert_eq!(r.get(0).unwrap(), Value::I32(7));
        assert_eq!(r.get(1).unwrap(), Value::I32(9));
        assert_eq!(r.get(2).unwrap(), Value::I32(0));
    }
}
