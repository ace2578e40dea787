use std::collections::BTreeMap;

use spla_types::OpBinary;

use crate::container::matrix::Matrix;
use crate::error::{SplaResult, Status};

fn check_types(r: &Matrix, a: &Matrix, b: &Matrix, mult: &OpBinary, add: &OpBinary) -> SplaResult<()> {
    let ty = r.element_type();
    if a.element_type() != ty || b.element_type() != ty {
        return Err(Status::InvalidArgument("mxm: operand element types do not agree".into()).emit());
    }
    if mult.t_a() != ty || mult.t_b() != ty || mult.t_c() != ty {
        return Err(Status::InvalidArgument("mxm: mult operator type does not match element type".into()).emit());
    }
    if add.t_a() != ty || add.t_b() != ty || add.t_c() != ty {
        return Err(Status::InvalidArgument("mxm: add operator type does not match element type".into()).emit());
    }
    Ok(())
}

/// Sparse matrix product `r = a mult.add b` (spec §2 supplemented
/// features). `a` is M x K, `b` is K x N, `r` is M x N.
///
/// Row-wise gather-multiply-merge (Gustavson's algorithm): for each row
/// `i` of `a`, every explicit `(k, a_ik)` pulls in row `k` of `b` and
/// accumulates `a_ik mult b_kj` into a per-row scratch map keyed by `j`,
/// merging collisions with `add`. The scratch map is a `BTreeMap` so the
/// row's output columns come out already sorted, matching the direct-COO
/// fast path `Matrix::build` takes when its input is sorted and unique.
pub fn mxm(r: &mut Matrix, a: &mut Matrix, b: &mut Matrix, mult: &OpBinary, add: &OpBinary) -> SplaResult<()> {
    check_types(r, a, b, mult, add)?;
    if a.cols() != b.rows() {
        return Err(Status::InvalidArgument("mxm: a.cols() must equal b.rows()".into()).emit());
    }
    if r.rows() != a.rows() || r.cols() != b.cols() {
        return Err(Status::InvalidArgument("mxm: r must be a.rows() x b.cols()".into()).emit());
    }

    let a_csr = a.csr_snapshot()?;
    let b_csr = b.csr_snapshot()?;

    let mut out_rows = Vec::new();
    let mut out_cols = Vec::new();
    let mut out_vals = Vec::new();

    for i in 0..a.rows() {
        let mut row_acc: BTreeMap<usize, spla_types::Value> = BTreeMap::new();
        let a_start = a_csr.row_ptr[i];
        let a_end = a_csr.row_ptr[i + 1];
        for a_idx in a_start..a_end {
            let k = a_csr.col_idx[a_idx];
            let a_ik = a_csr.vals[a_idx];
            let b_start = b_csr.row_ptr[k];
            let b_end = b_csr.row_ptr[k + 1];
            for b_idx in b_start..b_end {
                let j = b_csr.col_idx[b_idx];
                let contribution = mult.apply(a_ik, b_csr.vals[b_idx]);
                row_acc
                    .entry(j)
                    .and_modify(|acc| *acc = add.apply(*acc, contribution))
                    .or_insert(contribution);
            }
        }
        for (j, v) in row_acc {
            out_rows.push(i);
            out_cols.push(j);
            out_vals.push(v);
        }
    }

    r.clear();
    r.build(&out_rows, &out_cols, &out_vals)
}
