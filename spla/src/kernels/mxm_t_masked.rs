use spla_types::{OpBinary, OpSelect};

use crate::container::matrix::{Csr, Matrix};
use crate::error::{SplaResult, Status};

fn check_types(r: &Matrix, mask: &Matrix, a: &Matrix, bt: &Matrix, mult: &OpBinary, add: &OpBinary) -> SplaResult<()> {
    let ty = r.element_type();
    if a.element_type() != ty || bt.element_type() != ty {
        return Err(Status::InvalidArgument("mxmT_masked: operand element types do not agree".into()).emit());
    }
    if mult.t_a() != ty || mult.t_b() != ty || mult.t_c() != ty {
        return Err(Status::InvalidArgument("mxmT_masked: mult operator type does not match element type".into()).emit());
    }
    if add.t_a() != ty || add.t_b() != ty || add.t_c() != ty {
        return Err(Status::InvalidArgument("mxmT_masked: add operator type does not match element type".into()).emit());
    }
    if mask.rows() != r.rows() || mask.cols() != r.cols() {
        return Err(Status::InvalidArgument("mxmT_masked: mask must have r's shape".into()).emit());
    }
    Ok(())
}

/// Sparse-dense-friendly product against a pre-transposed right operand,
/// masked (spec §2 supplemented features): `r = mask ⊙ (a mult.add bT^T)`,
/// i.e. `r[i,j] = a[i,:] · bT[j,:]` wherever `mask[i,j]` passes `select`.
///
/// Taking `bT` already row-major avoids the CSC/transpose pass `mxm`
/// needs for the right operand: row `i` of `a` and row `j` of `bT` are
/// both sorted by column index, so the dot product is a merge-join
/// rather than a gather through `b`'s columns.
pub fn mxm_t_masked(
    r: &mut Matrix,
    mask: &mut Matrix,
    a: &mut Matrix,
    bt: &mut Matrix,
    mult: &OpBinary,
    add: &OpBinary,
    select: &OpSelect,
    init: spla_types::Value,
) -> SplaResult<()> {
    check_types(r, mask, a, bt, mult, add)?;
    if a.cols() != bt.cols() {
        return Err(Status::InvalidArgument("mxmT_masked: a.cols() must equal bt.cols()".into()).emit());
    }
    if r.rows() != a.rows() || r.cols() != bt.rows() {
        return Err(Status::InvalidArgument("mxmT_masked: r must be a.rows() x bt.rows()".into()).emit());
    }
    if select.t_in() != mask.element_type() {
        return Err(Status::InvalidArgument(
            "mxmT_masked: select operator type does not match mask element type".into(),
        ).emit());
    }

    let a_csr = a.csr_snapshot()?;
    let bt_csr = bt.csr_snapshot()?;
    let mask_entries = mask.coo_snapshot()?;

    let mut out_rows = Vec::new();
    let mut out_cols = Vec::new();
    let mut out_vals = Vec::new();

    for (i, j, mask_value) in mask_entries {
        if !select.apply(mask_value) {
            continue;
        }
        let value = dot_row(&a_csr, i, &bt_csr, j, mult, add, init);
        out_rows.push(i);
        out_cols.push(j);
        out_vals.push(value);
    }

    r.clear();
    r.build(&out_rows, &out_cols, &out_vals)
}

fn dot_row(
    a_csr: &Csr,
    row_a: usize,
    bt_csr: &Csr,
    row_bt: usize,
    mult: &OpBinary,
    add: &OpBinary,
    init: spla_types::Value,
) -> spla_types::Value {
    let mut p = a_csr.row_ptr[row_a];
    let p_end = a_csr.row_ptr[row_a + 1];
    let mut q = bt_csr.row_ptr[row_bt];
    let q_end = bt_csr.row_ptr[row_bt + 1];
    let mut acc = init;
    while p < p_end && q < q_end {
        let ca = a_csr.col_idx[p];
        let cb = bt_csr.col_idx[q];
        if ca == cb {
            acc = add.apply(acc, mult.apply(a_csr.vals[p], bt_csr.vals[q]));
            p += 1;
            q += 1;
        } else if ca < cb {
            p += 1;
        } else {
            q += 1;
        }
    }
    acc
}

#[cfg(test)]
mod tests {
    use super::*;
    use spla_types::{Builtins, ElementTypeId, Value};

    #[test]
    fn masked_dot_product_against_transposed_operand() {
        // A: 2x3 = [[1,2,0],[0,3,4]], B: 2x3 so B^T rows match A's columns:
        // B = [[5,0,1],[0,6,0]] -> bt (2x3) is literally B here since we pass
        // rows of bt directly as the "columns of B".
        let mut a = Matrix::new(2, 3, ElementTypeId::I32);
        a.build(&[0, 0, 1, 1], &[0, 1, 1, 2], &[1, 2, 3, 4].map(Value::I32)).unwrap();
        let mut bt = Matrix::new(2, 3, ElementTypeId::I32);
        bt.build(&[0, 0, 1], &[0, 2, 1], &[5, 1, 6].map(Value::I32)).unwrap();
        let mut mask = Matrix::new(2, 2, ElementTypeId::I32);
        mask.build(&[0, 0, 1, 1], &[0, 1, 0, 1], &[1, 1, 1, 1].map(Value::I32)).unwrap();
        let mut r = Matrix::new(2, 2, ElementTypeId::I32);
        let mult = Builtins::mult(ElementTypeId::I32);
        let plus = Builtins::plus(ElementTypeId::I32);
        let nqzero = Builtins::nqzero(ElementTypeId::I32);
        mxm_t_masked(&mut r, &mut mask, &mut a, &mut bt, &mult, &plus, &nqzero, Value::I32(0)).unwrap();

        // r[0,0] = row0(A)·row0(bt) = 1*5 + 2*0 = 5
        // r[0,1] = row0(A)·row1(bt) = 2*6 = 12
        // r[1,0] = row1(A)·row0(bt) = 3*0 + 4*1 = 4
        // r[1,1] = row1(A)·row1(bt) = 3*6 = 18
        assert_eq!(r.get(0, 0).unwrap(), Value::I32(5));
        assert_eq!(r.get(0, 1).unwrap(), Value::I32(12));
        assert_eq!(r.get(1, 0).unwrap(), Value::I32(4));
        assert_eq!(r.get(1, 1).unwrap(), Value::I32(18));
    }

    #[test]
    fn mask_excluded_cells_stay_at_fill() {
        let mut a = Matrix::new(1, 1, ElementTypeId::I32);
        a.build(&[0], &[0], &[Value::I32(9)]).unwrap();
        let mut bt = Matrix::new(1, 1, ElementTypeId::I32);
        bt.build(&[0], &[0], &[Value::I32(9)]).unwrap();
        let mut mask = Matrix::new(1, 1, ElementTypeId::I32);
        let mut r = Matrix::new(1, 1, ElementTypeId::I32);
        let mult = Builtins::mult(ElementTypeId::I32);
        let plus = Builtins::plus(ElementTypeId::I32);
        let nqzero = Builtins::nqzero(ElementTypeId::I32);
        mxm_t_masked(&mut r, &mut mask, &mut a, &mut bt, &mult, &plus, &nqzero, Value::I32(0)).unwrap();
        assert_eq!(r.get(0, 0).unwrap(), Value::I32(0));
    }
}
