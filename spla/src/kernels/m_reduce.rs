use spla_types::{OpBinary, Value};

use crate::container::matrix::Matrix;
use crate::container::scalar::Scalar;
use crate::container::vector::Vector;
use crate::error::{SplaResult, Status};

fn check_types(a: &Matrix, op: &OpBinary, init: Value) -> SplaResult<()> {
    let ty = a.element_type();
    if init.ty() != ty || op.t_a() != ty || op.t_b() != ty || op.t_c() != ty {
        return Err(Status::InvalidArgument(
            "m_reduce: operator/init type does not match matrix element type".into(),
        ).emit());
    }
    Ok(())
}

/// Folds each row of `a` with `op`, seeded with `init`, into `result[i]`
/// (spec §2 supplemented features, same reduce-by-key shape as §4.5.4
/// applied per row instead of per key-run). An empty row reduces to
/// `init`.
pub fn m_reduce_by_row(result: &mut Vector, a: &mut Matrix, op: &OpBinary, init: Value) -> SplaResult<()> {
    check_types(a, op, init)?;
    if result.len() != a.rows() {
        return Err(Status::InvalidArgument("m_reduce_by_row: result.len() must equal a.rows()".into()).emit());
    }
    let csr = a.csr_snapshot()?;
    for row in 0..a.rows() {
        let start = csr.row_ptr[row];
        let end = csr.row_ptr[row + 1];
        let acc = csr.vals[start..end].iter().fold(init, |acc, &v| op.apply(acc, v));
        result.set_value(row, acc)?;
    }
    Ok(())
}

/// Folds each column of `a` with `op`, seeded with `init`, into
/// `result[j]`.
pub fn m_reduce_by_column(result: &mut Vector, a: &mut Matrix, op: &OpBinary, init: Value) -> SplaResult<()> {
    check_types(a, op, init)?;
    if result.len() != a.cols() {
        return Err(Status::InvalidArgument(
            "m_reduce_by_column: result.len() must equal a.cols()".into(),
        ).emit());
    }
    let entries = a.coo_snapshot()?;
    let mut acc = vec![init; a.cols()];
    for (_, col, value) in entries {
        acc[col] = op.apply(acc[col], value);
    }
    for (col, value) in acc.into_iter().enumerate() {
        result.set_value(col, value)?;
    }
    Ok(())
}

/// Folds every explicit entry of `a` with `op`, seeded with `init`, into
/// a single scalar.
pub fn m_reduce(result: &mut Scalar, a: &mut Matrix, op: &OpBinary, init: Value) -> SplaResult<()> {
    check_types(a, op, init)?;
    let entries = a.coo_snapshot()?;
    let acc = entries.into_iter().fold(init, |acc, (_, _, v)| op.apply(acc, v));
    result.set(acc)
}
