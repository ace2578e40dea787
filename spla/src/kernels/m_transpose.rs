use spla_types::OpUnary;

use crate::container::matrix::Matrix;
use crate::error::SplaResult;

/// Transpose with an element-wise transform (spec §2 supplemented
/// features; exercised by scenario S5). The heavy lifting lives on
/// [`Matrix::transpose`] since it needs direct access to the CPU COO
/// decoration; this wrapper only exists so `m_transpose` appears under
/// the same op-tag surface as the rest of the kernel catalogue.
pub fn m_transpose(a: &mut Matrix, op: &OpUnary) -> SplaResult<Matrix> {
    a.transpose(op)
}
