use std::sync::Arc;

use hashbrown::HashMap;
use spla_types::{Builtins, ElementTypeId, OpBinary, OpUnary, Value};

use crate::container::format::{shortest_conversion_path, Access};
use crate::error::{SplaResult, Status};

/// Storage decorations a logical matrix can materialize (spec §3). The
/// CPU formats sit on a ring: `LIL <-> DOK <-> COO <-> CSR <-> CSC`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum MatrixFormat {
    CpuLil,
    CpuDok,
    CpuCoo,
    CpuCsr,
    CpuCsc,
    AccCoo,
    AccCsr,
    AccCsc,
}

const MATRIX_EDGES: [(MatrixFormat, MatrixFormat); 7] = [
    (MatrixFormat::CpuLil, MatrixFormat::CpuDok),
    (MatrixFormat::CpuDok, MatrixFormat::CpuCoo),
    (MatrixFormat::CpuCoo, MatrixFormat::CpuCsr),
    (MatrixFormat::CpuCsr, MatrixFormat::CpuCsc),
    (MatrixFormat::CpuCoo, MatrixFormat::AccCoo),
    (MatrixFormat::CpuCsr, MatrixFormat::AccCsr),
    (MatrixFormat::CpuCsc, MatrixFormat::AccCsc),
];

#[derive(Clone, Default)]
pub struct Csr {
    pub row_ptr: Vec<usize>,
    pub col_idx: Vec<usize>,
    pub vals: Vec<Value>,
}

#[derive(Clone, Default)]
pub struct Csc {
    pub col_ptr: Vec<usize>,
    pub row_idx: Vec<usize>,
    pub vals: Vec<Value>,
}

/// An M x N indexed grid with the same fill-value contract as [`super::vector::Vector`].
pub struct Matrix {
    rows: usize,
    cols: usize,
    ty: ElementTypeId,
    fill: Value,
    dup_op: Arc<OpBinary>,
    valid: Vec<MatrixFormat>,
    lil: Option<Vec<Vec<(usize, Value)>>>,
    dok: Option<HashMap<(usize, usize), Value>>,
    coo: Option<Vec<(usize, usize, Value)>>,
    csr: Option<Csr>,
    csc: Option<Csc>,
    acc_coo: Option<Vec<(usize, usize, Value)>>,
    acc_csr: Option<Csr>,
    acc_csc: Option<Csc>,
}

impl Matrix {
    pub fn new(rows: usize, cols: usize, ty: ElementTypeId) -> Matrix {
        Matrix {
            rows,
            cols,
            ty,
            fill: ty.zero(),
            dup_op: Builtins::second(ty),
            valid: vec![],
            lil: None,
            dok: None,
            coo: None,
            csr: None,
            csc: None,
            acc_coo: None,
            acc_csr: None,
            acc_csc: None,
        }
    }

    pub fn rows(&self) -> usize {
        self.rows
    }

    pub fn cols(&self) -> usize {
        self.cols
    }

    pub fn element_type(&self) -> ElementTypeId {
        self.ty
    }

    pub fn fill_value(&self) -> Value {
        self.fill
    }

    pub fn set_fill_value(&mut self, fill: Value) -> SplaResult<()> {
        self.check_type(fill)?;
        self.fill = fill;
        Ok(())
    }

    pub fn set_duplicate_op(&mut self, op: Arc<OpBinary>) -> SplaResult<()> {
        if op.t_a() != self.ty || op.t_b() != self.ty || op.t_c() != self.ty {
            return Err(Status::InvalidArgument(
                "duplicate-resolution operator type does not match matrix element type".into(),
            ).emit());
        }
        self.dup_op = op;
        Ok(())
    }

    fn check_type(&self, v: Value) -> SplaResult<()> {
        if v.ty() != self.ty {
            return Err(Status::InvalidArgument(format!(
                "value of type {:?} does not match matrix element type {:?}",
                v.ty(),
                self.ty
            )).emit());
        }
        Ok(())
    }

    fn check_coord(&self, row: usize, col: usize) -> SplaResult<()> {
        if row >= self.rows || col >= self.cols {
            return Err(Status::InvalidArgument(format!(
                "coordinate ({row}, {col}) out of bounds for {}x{} matrix",
                self.rows, self.cols
            )).emit());
        }
        Ok(())
    }

    pub fn clear(&mut self) {
        self.valid.clear();
        self.lil = None;
        self.dok = None;
        self.coo = None;
        self.csr = None;
        self.csc = None;
        self.acc_coo = None;
        self.acc_csr = None;
        self.acc_csc = None;
    }

    fn is_valid(&self, format: MatrixFormat) -> bool {
        self.valid.contains(&format)
    }

    fn ordered_valid_sources(&self) -> Vec<MatrixFormat> {
        let preference = [
            MatrixFormat::CpuCoo,
            MatrixFormat::CpuCsr,
            MatrixFormat::CpuCsc,
            MatrixFormat::AccCoo,
            MatrixFormat::AccCsr,
            MatrixFormat::AccCsc,
            MatrixFormat::CpuLil,
            MatrixFormat::CpuDok,
        ];
        preference.into_iter().filter(|f| self.is_valid(*f)).collect()
    }

    pub fn ensure(&mut self, format: MatrixFormat, access: Access) -> SplaResult<()> {
        match access {
            Access::Ctor => {
                self.allocate(format);
                Ok(())
            }
            Access::Wd => {
                self.allocate(format);
                self.valid.retain(|&f| f == format);
                if !self.valid.contains(&format) {
                    self.valid.push(format);
                }
                Ok(())
            }
            Access::Rw => {
                self.materialize(format)?;
                self.valid.retain(|&f| f == format);
                Ok(())
            }
            Access::Rwd => self.materialize(format),
        }
    }

    fn allocate(&mut self, format: MatrixFormat) {
        match format {
            MatrixFormat::CpuLil => {
                let rows = self.rows;
                self.lil.get_or_insert_with(|| vec![Vec::new(); rows]);
            }
            MatrixFormat::CpuDok => {
                self.dok.get_or_insert_with(HashMap::new);
            }
            MatrixFormat::CpuCoo => {
                self.coo.get_or_insert_with(Vec::new);
            }
            MatrixFormat::CpuCsr => {
                self.csr.get_or_insert_with(Csr::default);
            }
            MatrixFormat::CpuCsc => {
                self.csc.get_or_insert_with(Csc::default);
            }
            MatrixFormat::AccCoo => {
                self.acc_coo.get_or_insert_with(Vec::new);
            }
            MatrixFormat::AccCsr => {
                self.acc_csr.get_or_insert_with(Csr::default);
            }
            MatrixFormat::AccCsc => {
                self.acc_csc.get_or_insert_with(Csc::default);
            }
        }
    }

    fn materialize(&mut self, format: MatrixFormat) -> SplaResult<()> {
        if self.is_valid(format) {
            return Ok(());
        }
        self.allocate(format);
        if self.valid.is_empty() {
            self.valid.push(format);
            return Ok(());
        }
        let sources = self.ordered_valid_sources();
        let path = shortest_conversion_path(&MATRIX_EDGES, &sources, format)
            .expect("matrix format graph is connected");
        for pair in path.windows(2) {
            self.convert_step(pair[0], pair[1]);
        }
        if !self.valid.contains(&format) {
            self.valid.push(format);
        }
        Ok(())
    }

    fn coo_triples(&self) -> Vec<(usize, usize, Value)> {
        self.coo.clone().unwrap_or_default()
    }

    fn convert_step(&mut self, from: MatrixFormat, to: MatrixFormat) {
        use MatrixFormat::*;
        self.allocate(to);
        match (from, to) {
            (CpuLil, CpuDok) => {
                let lil = self.lil.clone().unwrap_or_default();
                let dok = self.dok.get_or_insert_with(HashMap::new);
                dok.clear();
                for (row, entries) in lil.into_iter().enumerate() {
                    for (col, value) in entries {
                        dok.insert((row, col), value);
                    }
                }
            }
            (CpuDok, CpuLil) => {
                let dok = self.dok.clone().unwrap_or_default();
                let mut lil = vec![Vec::new(); self.rows];
                for ((row, col), value) in dok {
                    lil[row].push((col, value));
                }
                for row in &mut lil {
                    row.sort_by_key(|&(c, _)| c);
                }
                self.lil = Some(lil);
            }
            (CpuDok, CpuCoo) => {
                let dok = self.dok.clone().unwrap_or_default();
                let mut triples: Vec<(usize, usize, Value)> =
                    dok.into_iter().map(|((r, c), v)| (r, c, v)).collect();
                triples.sort_by_key(|&(r, c, _)| (r, c));
                self.coo = Some(triples);
            }
            (CpuCoo, CpuDok) => {
                let coo = self.coo_triples();
                let dok = self.dok.get_or_insert_with(HashMap::new);
                dok.clear();
                for (r, c, v) in coo {
                    dok.insert((r, c), v);
                }
            }
            (CpuCoo, CpuCsr) => {
                let coo = self.coo_triples();
                self.csr = Some(coo_to_csr(&coo, self.rows));
            }
            (CpuCsr, CpuCoo) => {
                let csr = self.csr.clone().unwrap_or_default();
                self.coo = Some(csr_to_coo(&csr));
            }
            (CpuCsr, CpuCsc) => {
                let csr = self.csr.clone().unwrap_or_default();
                self.csc = Some(csr_to_csc(&csr, self.cols));
            }
            (CpuCsc, CpuCsr) => {
                let csc = self.csc.clone().unwrap_or_default();
                self.csr = Some(csc_to_csr(&csc, self.rows));
            }
            (CpuCoo, AccCoo) => self.acc_coo = Some(self.coo_triples()),
            (AccCoo, CpuCoo) => self.coo = self.acc_coo.clone(),
            (CpuCsr, AccCsr) => self.acc_csr = self.csr.clone(),
            (AccCsr, CpuCsr) => self.csr = self.acc_csr.clone(),
            (CpuCsc, AccCsc) => self.acc_csc = self.csc.clone(),
            (AccCsc, CpuCsc) => self.csc = self.acc_csc.clone(),
            _ => unreachable!("no direct edge between {from:?} and {to:?}"),
        }
    }

    pub fn get(&self, row: usize, col: usize) -> SplaResult<Value> {
        self.check_coord(row, col)?;
        if self.is_valid(MatrixFormat::CpuDok) {
            if let Some(dok) = &self.dok {
                return Ok(dok.get(&(row, col)).copied().unwrap_or(self.fill));
            }
        }
        if self.is_valid(MatrixFormat::CpuCoo) {
            if let Some(coo) = &self.coo {
                return Ok(coo
                    .binary_search_by_key(&(row, col), |&(r, c, _)| (r, c))
                    .ok()
                    .map(|pos| coo[pos].2)
                    .unwrap_or(self.fill));
            }
        }
        if self.is_valid(MatrixFormat::CpuCsr) {
            if let Some(csr) = &self.csr {
                let start = csr.row_ptr[row];
                let end = csr.row_ptr[row + 1];
                return Ok(csr.col_idx[start..end]
                    .binary_search(&col)
                    .ok()
                    .map(|pos| csr.vals[start + pos])
                    .unwrap_or(self.fill));
            }
        }
        if self.is_valid(MatrixFormat::CpuLil) {
            if let Some(lil) = &self.lil {
                return Ok(lil[row]
                    .iter()
                    .find(|&&(c, _)| c == col)
                    .map(|&(_, v)| v)
                    .unwrap_or(self.fill));
            }
        }
        Ok(self.fill)
    }

    /// Appends to the LIL decoration (spec §4.2).
    pub fn set_value(&mut self, row: usize, col: usize, v: Value) -> SplaResult<()> {
        self.check_coord(row, col)?;
        self.check_type(v)?;
        self.ensure(MatrixFormat::CpuLil, Access::Rwd)?;
        let lil_row = &mut self.lil.as_mut().unwrap()[row];
        if let Some(existing) = lil_row.iter_mut().find(|(c, _)| *c == col) {
            existing.1 = self.dup_op.apply(existing.1, v);
        } else {
            lil_row.push((col, v));
            lil_row.sort_by_key(|&(c, _)| c);
        }
        self.valid.retain(|&f| f == MatrixFormat::CpuLil);
        Ok(())
    }

    /// Equivalent to batched `set_value`; short-circuits to a direct COO
    /// build when `(rows, cols)` is already sorted by `(row, col)` and
    /// unique (spec §4.2).
    pub fn build(&mut self, rows: &[usize], cols: &[usize], values: &[Value]) -> SplaResult<()> {
        if rows.len() != cols.len() || rows.len() != values.len() {
            return Err(Status::InvalidArgument(
                "rows, cols and values must have the same length".into(),
            ).emit());
        }
        for (&r, &c) in rows.iter().zip(cols) {
            self.check_coord(r, c)?;
        }
        for &v in values {
            self.check_type(v)?;
        }

        let sorted_unique = (0..rows.len().saturating_sub(1))
            .all(|i| (rows[i], cols[i]) < (rows[i + 1], cols[i + 1]));

        self.clear();
        if sorted_unique {
            self.coo = Some(
                rows.iter()
                    .zip(cols)
                    .zip(values)
                    .map(|((&r, &c), &v)| (r, c, v))
                    .collect(),
            );
            self.valid = vec![MatrixFormat::CpuCoo];
        } else {
            self.ensure(MatrixFormat::CpuDok, Access::Wd)?;
            let dok = self.dok.as_mut().unwrap();
            for ((&r, &c), &v) in rows.iter().zip(cols).zip(values) {
                if let Some(existing) = dok.get(&(r, c)).copied() {
                    dok.insert((r, c), self.dup_op.apply(existing, v));
                } else {
                    dok.insert((r, c), v);
                }
            }
        }
        Ok(())
    }

    pub fn read(&mut self) -> SplaResult<(Vec<usize>, Vec<usize>, Vec<Value>)> {
        self.ensure(MatrixFormat::CpuCoo, Access::Rwd)?;
        let coo = self.coo.clone().unwrap_or_default();
        Ok((
            coo.iter().map(|&(r, _, _)| r).collect(),
            coo.iter().map(|&(_, c, _)| c).collect(),
            coo.iter().map(|&(_, _, v)| v).collect(),
        ))
    }

    pub fn set_format(&mut self, format: MatrixFormat) -> SplaResult<()> {
        self.ensure(format, Access::Rwd)
    }

    pub fn is_format_valid(&self, format: MatrixFormat) -> bool {
        self.is_valid(format)
    }

    pub(crate) fn csr(&self) -> Option<&Csr> {
        self.csr.as_ref()
    }

    /// Crate-internal convenience for kernels: ensures `CpuCoo` is valid
    /// without disturbing other formats and returns a snapshot of the
    /// explicit `(row, col, value)` entries in row-major order.
    pub(crate) fn coo_snapshot(&mut self) -> SplaResult<Vec<(usize, usize, Value)>> {
        self.ensure(MatrixFormat::CpuCoo, Access::Rwd)?;
        Ok(self.coo.clone().unwrap_or_default())
    }

    /// Crate-internal convenience: ensures `CpuCsr` is valid and returns a
    /// clone of its `(row_ptr, col_idx, vals)` triple, used by kernels
    /// that need direct per-row iteration (`mxv_masked`, `mxm`, ...).
    pub(crate) fn csr_snapshot(&mut self) -> SplaResult<Csr> {
        self.ensure(MatrixFormat::CpuCsr, Access::Rwd)?;
        Ok(self.csr.clone().unwrap_or_default())
    }

    /// `m_transpose` (spec §4.5's supplemented catalogue, exercised by
    /// scenario S5): rebuild as an N x M matrix with `op` applied
    /// element-wise.
    pub fn transpose(&mut self, op: &OpUnary) -> SplaResult<Matrix> {
        if op.t_in() != self.ty {
            return Err(Status::InvalidArgument(
                "transpose operator input type does not match matrix element type".into(),
            ).emit());
        }
        let (rows, cols, values) = self.read()?;
        let mut out = Matrix::new(self.cols, self.rows, op.t_out());
        out.set_fill_value(op.t_out().zero())?;
        let t_rows: Vec<usize> = cols;
        let t_cols: Vec<usize> = rows;
        let t_values: Vec<Value> = values.into_iter().map(|v| op.apply(v)).collect();
        let mut triples: Vec<(usize, usize, Value)> = t_rows
            .into_iter()
            .zip(t_cols)
            .zip(t_values)
            .map(|((r, c), v)| (r, c, v))
            .collect();
        triples.sort_by_key(|&(r, c, _)| (r, c));
        out.build(
            &triples.iter().map(|&(r, _, _)| r).collect::<Vec<_>>(),
            &triples.iter().map(|&(_, c, _)| c).collect::<Vec<_>>(),
            &triples.iter().map(|&(_, _, v)| v).collect::<Vec<_>>(),
        )?;
        Ok(out)
    }
}

fn coo_to_csr(coo: &[(usize, usize, Value)], rows: usize) -> Csr {
    let mut row_ptr = vec![0usize; rows + 1];
    for &(r, _, _) in coo {
        row_ptr[r + 1] += 1;
    }
    for i in 0..rows {
        row_ptr[i + 1] += row_ptr[i];
    }
    let col_idx = coo.iter().map(|&(_, c, _)| c).collect();
    let vals = coo.iter().map(|&(_, _, v)| v).collect();
    Csr { row_ptr, col_idx, vals }
}

fn csr_to_coo(csr: &Csr) -> Vec<(usize, usize, Value)> {
    let mut out = Vec::with_capacity(csr.vals.len());
    for row in 0..csr.row_ptr.len().saturating_sub(1) {
        for i in csr.row_ptr[row]..csr.row_ptr[row + 1] {
            out.push((row, csr.col_idx[i], csr.vals[i]));
        }
    }
    out
}

fn csr_to_csc(csr: &Csr, cols: usize) -> Csc {
    let mut col_ptr = vec![0usize; cols + 1];
    for &c in &csr.col_idx {
        col_ptr[c + 1] += 1;
    }
    for i in 0..cols {
        col_ptr[i + 1] += col_ptr[i];
    }
    let nnz = csr.vals.len();
    let mut row_idx = vec![0usize; nnz];
    let mut vals = vec![csr.vals.first().copied().unwrap_or(Value::I32(0)); nnz];
    let mut cursor = col_ptr.clone();
    for row in 0..csr.row_ptr.len().saturating_sub(1) {
        for i in csr.row_ptr[row]..csr.row_ptr[row + 1] {
            let c = csr.col_idx[i];
            let dest = cursor[c];
            row_idx[dest] = row;
            vals[dest] = csr.vals[i];
            cursor[c] += 1;
        }
    }
    Csc { col_ptr, row_idx, vals }
}

fn csc_to_csr(csc: &Csc, rows: usize) -> Csr {
    let mut row_ptr = vec![0usize; rows + 1];
    for &r in &csc.row_idx {
        row_ptr[r + 1] += 1;
    }
    for i in 0..rows {
        row_ptr[i + 1] += row_ptr[i];
    }
    let nnz = csc.vals.len();
    let mut col_idx = vec![0usize; nnz];
    let mut vals = vec![csc.vals.first().copied().unwrap_or(Value::I32(0)); nnz];
    let mut cursor = row_ptr.clone();
    for col in 0..csc.col_ptr.len().saturating_sub(1) {
        for i in csc.col_ptr[col]..csc.col_ptr[col + 1] {
            let r = csc.row_idx[i];
            let dest = cursor[r];
            col_idx[dest] = col;
            vals[dest] = csc.vals[i];
            cursor[r] += 1;
        }
    }
    Csr { row_ptr, col_idx, vals }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fill_value_contract() {
        let m = Matrix::new(3, 3, ElementTypeId::I32);
        assert_eq!(m.get(1, 1).unwrap(), Value::I32(0));
    }

    #[test]
    fn set_then_get_round_trips() {
        let mut m = Matrix::new(3, 3, ElementTypeId::I32);
        m.set_value(1, 2, Value::I32(5)).unwrap();
        assert_eq!(m.get(1, 2).unwrap(), Value::I32(5));
        assert_eq!(m.get(0, 0).unwrap(), Value::I32(0));
    }

    #[test]
    fn csr_csc_round_trip() {
        let mut m = Matrix::new(3, 3, ElementTypeId::I32);
        m.build(&[0, 0, 1, 2], &[0, 2, 1, 2], &[1, 2, 3, 4].map(Value::I32))
            .unwrap();
        m.set_format(MatrixFormat::CpuCsr).unwrap();
        m.set_format(MatrixFormat::CpuCsc).unwrap();
        assert_eq!(m.get(0, 0).unwrap(), Value::I32(1));
        assert_eq!(m.get(0, 2).unwrap(), Value::I32(2));
        assert_eq!(m.get(1, 1).unwrap(), Value::I32(3));
        assert_eq!(m.get(2, 2).unwrap(), Value::I32(4));
        assert_eq!(m.get(1, 0).unwrap(), Value::I32(0));
    }

    #[test]
    fn transpose_with_ainv() {
        // scenario S5, scaled down: M[i,j] = i*10+j when (i+j)%2==1
        let n = 4;
        let mut rows = vec![];
        let mut cols = vec![];
        let mut values = vec![];
        for i in 0..n {
            for j in 0..n {
                if (i + j) % 2 == 1 {
                    rows.push(i);
                    cols.push(j);
                    values.push(Value::I32((i * 10 + j) as i32));
                }
            }
        }
        let mut m = Matrix::new(n, n, ElementTypeId::I32);
        m.build(&rows, &cols, &values).unwrap();
        let ainv = Builtins::ainv(ElementTypeId::I32);
        let mut t = m.transpose(&ainv).unwrap();
        for i in 0..n {
            for j in 0..n {
                if (i + j) % 2 == 1 {
                    assert_eq!(t.get(j, i).unwrap(), Value::I32(-((i * 10 + j) as i32)));
                } else {
                    assert_eq!(t.get(j, i).unwrap(), Value::I32(0));
                }
            }
        }
    }

    #[test]
    fn lil_to_dok_to_coo_conversion_chain() {
        let mut m = Matrix::new(4, 4, ElementTypeId::I32);
        m.set_value(0, 1, Value::I32(9)).unwrap();
        m.set_value(2, 3, Value::I32(7)).unwrap();
        m.set_format(MatrixFormat::CpuCoo).unwrap();
        let (rows, cols, values) = m.read().unwrap();
        assert_eq!(rows, vec![0, 2]);
        assert_eq!(cols, vec![1, 3]);
        assert_eq!(values, vec![Value::I32(9), Value::I32(7)]);
    }

    #[test]
    fn empty_row_has_fill_everywhere() {
        let mut m = Matrix::new(4, 4, ElementTypeId::I32);
        m.set_value(3, 3, Value::I32(1)).unwrap();
        m.set_format(MatrixFormat::CpuCsr).unwrap();
        for j in 0..4 {
            assert_eq!(m.get(1, j).unwrap(), Value::I32(0));
        }
    }
}
