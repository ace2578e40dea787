use spla_types::OpSelect;

use crate::container::vector::Vector;
use crate::error::{SplaResult, Status};

/// Counts the masked, explicitly-present entries of `v` — "masked,
/// filtered" (spec §2 supplemented features): used by frontier-sizing
/// heuristics in BFS-shaped algorithms built atop this core, where the
/// frontier is exactly the set of positions that are both newly stored
/// in `v` and admitted by the mask.
pub fn v_count_mf(v: &mut Vector, mask: &Vector, select: &OpSelect) -> SplaResult<usize> {
    if v.len() != mask.len() {
        return Err(Status::InvalidArgument("v and mask must have the same length".into()).emit());
    }
    if select.t_in() != mask.element_type() {
        return Err(Status::InvalidArgument(
            "select operator type does not match mask element type".into(),
        ).emit());
    }
    let entries = v.coo_snapshot()?;
    let mut count = 0;
    for (i, _) in entries {
        if select.apply(mask.get(i)?) {
            count += 1;
        }
    }
    Ok(count)
}

#[cfg(test)]
mod tests {
    use super::*;
    use spla_types::{Builtins, ElementTypeId, Value};

    #[test]
    fn counts_masked_present_entries_only() {
        let mut v = Vector::new(5, ElementTypeId::I32);
        v.set_value(0, Value::I32(1)).unwrap();
        v.set_value(2, Value::I32(1)).unwrap();
        v.set_value(4, Value::I32(1)).unwrap();
        let mut mask = Vector::new(5, ElementTypeId::I32);
        mask.set_value(0, Value::I32(1)).unwrap();
        mask.set_value(2, Value::I32(0)).unwrap();
        // index 4 has no explicit mask entry: fill is 0, NQZERO rejects it.
        let nqzero = Builtins::nqzero(ElementTypeId::I32);
        assert_eq!(v_count_mf(&mut v, &mask, &nqzero).unwrap(), 1);
    }

    #[test]
    fn empty_vector_counts_zero() {
        let mut v = Vector::new(5, ElementTypeId::I32);
        let mask = Vector::new(5, ElementTypeId::I32);
        let always = Builtins::always(ElementTypeId::I32);
        assert_eq!(v_count_mf(&mut v, &mask, &always).unwrap(), 0);
    }
}
