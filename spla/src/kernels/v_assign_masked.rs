use spla_types::{OpBinary, OpSelect, Value};

use crate::container::vector::Vector;
use crate::error::{SplaResult, Status};

/// Masked scalar assignment (spec §6; exercised by scenario S3): for
/// every index `i` where `select(mask[i])` holds, `r[i] = op(r[i],
/// value)`; everywhere else `r` is untouched. Satisfies invariant 6
/// (mask containment) by construction — the write set is exactly the
/// indices the select operator admits.
pub fn v_assign_masked(
    r: &mut Vector,
    mask: &Vector,
    value: Value,
    op: &OpBinary,
    select: &OpSelect,
) -> SplaResult<()> {
    if r.len() != mask.len() {
        return Err(Status::InvalidArgument("r and mask must have the same length".into()).emit());
    }
    let ty = r.element_type();
    if value.ty() != ty {
        return Err(Status::InvalidArgument(
            "value type does not match vector element type".into(),
        ).emit());
    }
    if op.t_a() != ty || op.t_b() != ty || op.t_c() != ty {
        return Err(Status::InvalidArgument(
            "operator type does not match vector element type".into(),
        ).emit());
    }
    if select.t_in() != mask.element_type() {
        return Err(Status::InvalidArgument(
            "select operator type does not match mask element type".into(),
        ).emit());
    }
    for i in 0..r.len() {
        if select.apply(mask.get(i)?) {
            let updated = op.apply(r.get(i)?, value);
            r.set_value(i, updated)?;
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use spla_types::{Builtins, ElementTypeId};

    // scenario S3
    #[test]
    fn scenario_s3_second_assign() {
        let n = 20;
        let mut r = Vector::new(n, ElementTypeId::I32);
        for i in 0..n {
            r.set_value(i, Value::I32(14)).unwrap();
        }
        let mask_bits = [0, 0, 1, 0, 0, 1, 0, 0, 1, 0, 0, 1, 0, 0, 1, 1, 0, 0, 0, 0];
        let mut mask = Vector::new(n, ElementTypeId::I32);
        for (i, &bit) in mask_bits.iter().enumerate() {
            mask.set_value(i, Value::I32(bit)).unwrap();
        }
        let second = Builtins::second(ElementTypeId::I32);
        let nqzero = Builtins::nqzero(ElementTypeId::I32);
        v_assign_masked(&mut r, &mask, Value::I32(-5), &second, &nqzero).unwrap();
        for (i, &bit) in mask_bits.iter().enumerate() {
            if bit == 1 {
                assert_eq!(r.get(i).unwrap(), Value::I32(-5));
            } else {
                assert_eq!(r.get(i).unwrap(), Value::I32(14));
            }
        }
    }
}
