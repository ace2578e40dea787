use spla_types::{OpBinary, OpSelect, Value};

use crate::container::matrix::Matrix;
use crate::container::vector::Vector;
use crate::error::{SplaResult, Status};
use crate::kernels::reduce_by_key::reduce_by_key;

/// Sparse vector x sparse matrix, masked (spec §4.5.2). `v` (length N)
/// is read through its sparse decoration; `a` is N x P; `mask` and `r`
/// are length P.
///
/// Three phases, run here as two passes plus a reduce rather than the
/// accelerator's count/collect/sort-reduce (the count pass only exists
/// on the accelerator to size the collect buffer up front; a `Vec` grows
/// on demand on the host):
///   1. **Collect.** For each explicit `(row i, v[i])`, walk row `i` of
///      `a`'s CSR form and, for every column `k` the mask admits, push
///      `(k, a[i,k] mult v[i])`.
///   2. **Sort-then-reduce.** Sort the collected pairs by column and
///      reduce same-column runs with `add`, producing a strictly
///      increasing column sequence (the output's sparsity pattern).
pub fn vxm_masked(
    r: &mut Vector,
    mask: &Vector,
    v: &mut Vector,
    a: &mut Matrix,
    mult: &OpBinary,
    add: &OpBinary,
    select: &OpSelect,
) -> SplaResult<()> {
    if v.len() != a.rows() {
        return Err(Status::InvalidArgument("vxm_masked: v.len() must equal a.rows()".into()).emit());
    }
    if r.len() != a.cols() || mask.len() != a.cols() {
        return Err(Status::InvalidArgument(
            "vxm_masked: r and mask must have length a.cols()".into(),
        ).emit());
    }
    let ty = r.element_type();
    if v.element_type() != ty
        || a.element_type() != ty
        || mult.t_a() != ty
        || mult.t_b() != ty
        || mult.t_c() != ty
        || add.t_a() != ty
        || add.t_b() != ty
        || add.t_c() != ty
    {
        return Err(Status::InvalidArgument(
            "vxm_masked: operator/container element types do not agree".into(),
        ).emit());
    }
    if select.t_in() != mask.element_type() {
        return Err(Status::InvalidArgument(
            "vxm_masked: select operator type does not match mask element type".into(),
        ).emit());
    }

    let csr = a.csr_snapshot()?;
    let explicit_v = v.coo_snapshot()?;

    let mut pairs: Vec<(usize, Value)> = Vec::new();
    for (row, v_i) in explicit_v {
        let start = csr.row_ptr[row];
        let end = csr.row_ptr[row + 1];
        for idx in start..end {
            let col = csr.col_idx[idx];
            if select.apply(mask.get(col)?) {
                pairs.push((col, mult.apply(csr.vals[idx], v_i)));
            }
        }
    }
    pairs.sort_by_key(|&(col, _)| col);
    let keys: Vec<usize> = pairs.iter().map(|&(col, _)| col).collect();
    let values: Vec<Value> = pairs.iter().map(|&(_, val)| val).collect();
    let (out_keys, out_values) = reduce_by_key(&keys, &values, add)?;

    r.clear();
    r.build(&out_keys, &out_values)
}

#[cfg(test)]
mod tests {
    use super::*;
    use spla_types::{Builtins, ElementTypeId};

    #[test]
    fn masked_sparse_product_merges_duplicate_columns() {
        // A is 3x4: row0 = {0:2, 2:3}, row1 = {0:1, 2:5}, row2 = {3:9}
        let mut a = Matrix::new(3, 4, ElementTypeId::I32);
        a.build(&[0, 0, 1, 1, 2], &[0, 2, 0, 2, 3], &[2, 3, 1, 5, 9].map(Value::I32))
            .unwrap();
        let mut v = Vector::new(3, ElementTypeId::I32);
        v.set_value(0, Value::I32(10)).unwrap();
        v.set_value(1, Value::I32(100)).unwrap();
        let mut mask = Vector::new(4, ElementTypeId::I32);
        for i in 0..4 {
            mask.set_value(i, Value::I32(1)).unwrap();
        }
        let mut r = Vector::new(4, ElementTypeId::I32);
        let mult = Builtins::mult(ElementTypeId::I32);
        let plus = Builtins::plus(ElementTypeId::I32);
        let nqzero = Builtins::nqzero(ElementTypeId::I32);
        vxm_masked(&mut r, &mask, &mut v, &mut a, &mult, &plus, &nqzero).unwrap();

        // col 0: 2*10 (row0) + 1*100 (row1) = 120
        // col 2: 3*10 (row0) + 5*100 (row1) = 530
        // col 3: no contribution (row2 never touched by v)
        assert_eq!(r.get(0).unwrap(), Value::I32(120));
        assert_eq!(r.get(2).unwrap(), Value::I32(530));
        assert_eq!(r.get(3).unwrap(), Value::I32(0));
        assert_eq!(r.get(1).unwrap(), Value::I32(0));
    }

    #[test]
    fn mask_rejecting_everything_yields_empty_output() {
        let mut a = Matrix::new(2, 2, ElementTypeId::I32);
        a.build(&[0, 1], &[0, 1], &[Value::I32(5), Value::I32(6)]).unwrap();
        let mut v = Vector::new(2, ElementTypeId::I32);
        v.set_value(0, Value::I32(1)).unwrap();
        let mask = Vector::new(2, ElementTypeId::I32);
        let mut r = Vector::new(2, ElementTypeId::I32);
        let mult = Builtins::mult(ElementTypeId::I32);
        let plus = Builtins::plus(ElementTypeId::I32);
        let nqzero = Builtins::nqzero(ElementTypeId::I32);
        vxm_masked(&mut r, &mask, &mut v, &mut a, &mult, &plus, &nqzero).unwrap();
        assert_eq!(r.get(0).unwrap(), Value::I32(0));
        assert_eq!(r.get(1).unwrap(), Value::I32(0));
    }

    #[test]
    fn empty_v_yields_empty_output() {
        let mut a = Matrix::new(2, 2, ElementTypeId::I32);
        a.build(&[0, 1], &[0, 1], &[Value::I32(5), Value::I32(6)]).unwrap();
        let mut v = Vector::new(2, ElementTypeId::I32);
        let mut mask = Vector::new(2, ElementTypeId::I32);
        mask.set_value(0, Value::I32(1)).unwrap();
        mask.set_value(1, Value::I32(1)).unwrap();
        let mut r = Vector::new(2, ElementTypeId::I32);
        let mult = Builtins::mult(ElementTypeId::I32);
        let plus = Builtins::plus(ElementTypeId::I32);
        let nqzero = Builtins::nqzero(ElementTypeId::I32);
        vxm_masked(&mut r, &mask, &mut v, &mut a, &mult, &plus, &nqzero).unwrap();
        assert_eq!(r.get(0).unwrap(), Value::I32(0));
        assert_eq!(r.get(1).unwrap(), Value::I32(0));
    }
}
