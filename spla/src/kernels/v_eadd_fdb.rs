use spla_types::OpBinary;

use crate::container::vector::Vector;
use crate::error::{SplaResult, Status};

/// Element-wise vector add with feedback (spec §4.5.3): frontier-style
/// graph kernels use `fdb` as the set of positions whose value actually
/// changed this step.
///
/// For every index `i`: `r'[i] = r[i] op v[i]` (missing entries read as
/// fill); if `r'[i] != r[i]` and `r'[i] != fill`, `fdb[i]` is set to
/// `r'[i]`, otherwise `fdb[i]` is cleared back to fill. `r[i]` is then
/// updated to `r'[i]`.
pub fn v_eadd_fdb(r: &mut Vector, v: &Vector, fdb: &mut Vector, op: &OpBinary) -> SplaResult<()> {
    if r.len() != v.len() || r.len() != fdb.len() {
        return Err(Status::InvalidArgument(
            "r, v and fdb must have the same length".into(),
        ).emit());
    }
    let ty = r.element_type();
    if v.element_type() != ty || fdb.element_type() != ty {
        return Err(Status::InvalidArgument(
            "r, v and fdb must share the same element type".into(),
        ).emit());
    }
    if op.t_a() != ty || op.t_b() != ty || op.t_c() != ty {
        return Err(Status::InvalidArgument(
            "operator type does not match vector element type".into(),
        ).emit());
    }

    let fill = r.fill_value();
    for i in 0..r.len() {
        let old = r.get(i)?;
        let incoming = v.get(i)?;
        let updated = op.apply(old, incoming);
        if updated != old && updated != fill {
            fdb.set_value(i, updated)?;
        } else {
            fdb.unset(i)?;
        }
        r.set_value(i, updated)?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use spla_types::{Builtins, ElementTypeId, Value};

    // scenario S2. `v`'s fill is set to the MIN identity (a large
    // sentinel) so indices `v` never touches leave `r` unchanged — the
    // natural reading of "missing entries as fill" for a MIN-reduced
    // feedback pass. Index 3 is explicitly set to 5, and `min(5, 5)`
    // does not change `r`, so it is not part of the changed set
    // (the scenario's own paired value for that index is 5, not < 5).
    #[test]
    fn scenario_s2_min_feedback() {
        let n = 20;
        let mut r = Vector::new(n, ElementTypeId::I32);
        for i in 0..n {
            r.set_value(i, Value::I32(5)).unwrap();
        }
        let mut v = Vector::new(n, ElementTypeId::I32);
        v.set_fill_value(Value::I32(i32::MAX)).unwrap();
        let set_indices = [0usize, 2, 3, 5, 10, 12, 15, 16];
        let set_values = [8, 6, 5, 4, 3, 7, 1, 1];
        for (&i, &val) in set_indices.iter().zip(&set_values) {
            v.set_value(i, Value::I32(val)).unwrap();
        }
        let mut fdb = Vector::new(n, ElementTypeId::I32);
        let min = Builtins::min(ElementTypeId::I32);
        v_eadd_fdb(&mut r, &v, &mut fdb, &min).unwrap();

        let changed = [5usize, 10, 15, 16];
        for i in 0..n {
            if changed.contains(&i) {
                let expected = set_values[set_indices.iter().position(|&x| x == i).unwrap()];
                assert_eq!(r.get(i).unwrap(), Value::I32(expected));
                assert_eq!(fdb.get(i).unwrap(), Value::I32(expected));
            } else {
                assert_eq!(r.get(i).unwrap(), Value::I32(5));
                assert_eq!(fdb.get(i).unwrap(), Value::I32(0));
            }
        }
    }

    #[test]
    fn length_mismatch_is_invalid_argument() {
        let mut r = Vector::new(3, ElementTypeId::I32);
        let v = Vector::new(4, ElementTypeId::I32);
        let mut fdb = Vector::new(3, ElementTypeId::I32);
        let plus = Builtins::plus(ElementTypeId::I32);
        assert!(v_eadd_fdb(&mut r, &v, &mut fdb, &plus).is_err());
    }
}
