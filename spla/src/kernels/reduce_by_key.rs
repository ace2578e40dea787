use spla_types::{OpBinary, Value};

use crate::error::{SplaResult, Status};

/// The reduce-by-key primitive behind `vxm_masked`'s sort-then-reduce
/// phase (spec §4.5.4). `keys` must already be sorted; produces the
/// unique-key prefix together with the per-run `op`-reduction of values,
/// in input-key order.
///
/// The accelerator version of this algorithm is a three-step scan (flag
/// runs, reduce per workgroup, scan carry-ins across workgroups) so that
/// it parallelizes; this host reference walks the same runs sequentially,
/// which is equivalent for any associative `op` (spec invariant 5).
pub fn reduce_by_key(keys: &[usize], values: &[Value], op: &OpBinary) -> SplaResult<(Vec<usize>, Vec<Value>)> {
    if keys.len() != values.len() {
        return Err(Status::InvalidArgument(
            "keys and values must have the same length".into(),
        ).emit());
    }
    if keys.windows(2).any(|w| w[0] > w[1]) {
        return Err(Status::InvalidArgument("keys must be sorted".into()).emit());
    }

    let mut out_keys = Vec::new();
    let mut out_values = Vec::new();
    for (&key, &value) in keys.iter().zip(values) {
        if out_keys.last() == Some(&key) {
            let last = out_values.len() - 1;
            out_values[last] = op.apply(out_values[last], value);
        } else {
            out_keys.push(key);
            out_values.push(value);
        }
    }
    Ok((out_keys, out_values))
}

#[cfg(test)]
mod tests {
    use super::*;
    use spla_types::{Builtins, ElementTypeId};

    #[test]
    fn empty_input_is_empty_output() {
        let (keys, values) = reduce_by_key(&[], &[], &Builtins::plus(ElementTypeId::I32)).unwrap();
        assert!(keys.is_empty());
        assert!(values.is_empty());
    }

    #[test]
    fn rejects_unsorted_keys() {
        let plus = Builtins::plus(ElementTypeId::I32);
        assert!(reduce_by_key(&[2, 1], &[Value::I32(1), Value::I32(1)], &plus).is_err());
    }

    #[test]
    // scenario S6 (scaled to i32 values rather than raw bytes; a byte-wise
    // custom operator and PLUS over i32 exercise the same run-reduction
    // machinery).
    fn scenario_s6_runs_reduce_in_input_order() {
        let keys = vec![1, 2, 2, 4, 5, 5, 7, 8, 8, 8];
        let values: Vec<Value> = (1..=10).map(Value::I32).collect();
        let plus = Builtins::plus(ElementTypeId::I32);
        let (out_keys, out_values) = reduce_by_key(&keys, &values, &plus).unwrap();
        assert_eq!(out_keys, vec![1, 2, 4, 5, 7, 8]);
        // runs: [1]=1, [2,3]=2+3=5, [4]=4, [5,6]=5+6=11, [7]=7, [8,9,10]=8+9+10=27
        assert_eq!(
            out_values,
            vec![
                Value::I32(1),
                Value::I32(5),
                Value::I32(4),
                Value::I32(11),
                Value::I32(7),
                Value::I32(27),
            ]
        );
    }

    #[test]
    fn matches_sequential_left_fold_for_any_associative_op() {
        let keys = vec![3, 3, 3, 3];
        let values: Vec<Value> = vec![Value::I32(2), Value::I32(3), Value::I32(4), Value::I32(5)];
        let mult = Builtins::mult(ElementTypeId::I32);
        let (out_keys, out_values) = reduce_by_key(&keys, &values, &mult).unwrap();
        assert_eq!(out_keys, vec![3]);
        assert_eq!(out_values, vec![Value::I32(2 * 3 * 4 * 5)]);
    }
}
