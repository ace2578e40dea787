use std::sync::Arc;

use hashbrown::HashMap;
use spla_types::{Builtins, ElementTypeId, OpBinary, Value};

use crate::container::format::{shortest_conversion_path, Access};
use crate::error::{SplaResult, Status};

/// Storage decorations a logical vector can materialize (spec §3).
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum VectorFormat {
    CpuDok,
    CpuDense,
    CpuCoo,
    AccDense,
    AccCoo,
}

const VECTOR_EDGES: [(VectorFormat, VectorFormat); 5] = [
    (VectorFormat::CpuDok, VectorFormat::CpuCoo),
    (VectorFormat::CpuCoo, VectorFormat::CpuDense),
    (VectorFormat::CpuDok, VectorFormat::CpuDense),
    (VectorFormat::CpuDense, VectorFormat::AccDense),
    (VectorFormat::CpuCoo, VectorFormat::AccCoo),
];

/// A length-N indexed sequence with a fill value (spec §3). Keeps a set
/// of format decorations in sync through a validity bitmap: at least one
/// format is always authoritative, and a write clears every bit except
/// the format it wrote through (unless the access was additive).
pub struct Vector {
    len: usize,
    ty: ElementTypeId,
    fill: Value,
    dup_op: Arc<OpBinary>,
    valid: Vec<VectorFormat>,
    dok: Option<HashMap<usize, Value>>,
    // a 1 x len row: (values, presence)
    dense: Option<(spla_util::Matrix<Value>, spla_util::Matrix<bool>)>,
    // sorted by index, unique
    coo: Option<Vec<(usize, Value)>>,
    // accelerator mirrors; simulated as host copies (see DESIGN.md)
    acc_dense: Option<Vec<Value>>,
    acc_coo: Option<Vec<(usize, Value)>>,
}

impl Vector {
    pub fn new(len: usize, ty: ElementTypeId) -> Vector {
        Vector {
            len,
            ty,
            fill: ty.zero(),
            dup_op: Builtins::second(ty),
            valid: vec![],
            dok: None,
            dense: None,
            coo: None,
            acc_dense: None,
            acc_coo: None,
        }
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn element_type(&self) -> ElementTypeId {
        self.ty
    }

    pub fn fill_value(&self) -> Value {
        self.fill
    }

    /// Reconfiguring the fill value never rewrites stored entries; it
    /// only changes what absent positions read as (spec §3).
    pub fn set_fill_value(&mut self, fill: Value) -> SplaResult<()> {
        self.check_type(fill)?;
        self.fill = fill;
        Ok(())
    }

    pub fn set_duplicate_op(&mut self, op: Arc<OpBinary>) -> SplaResult<()> {
        if op.t_a() != self.ty || op.t_b() != self.ty || op.t_c() != self.ty {
            return Err(Status::InvalidArgument(
                "duplicate-resolution operator type does not match vector element type".into(),
            ).emit());
        }
        self.dup_op = op;
        Ok(())
    }

    fn check_type(&self, v: Value) -> SplaResult<()> {
        if v.ty() != self.ty {
            return Err(Status::InvalidArgument(format!(
                "value of type {:?} does not match vector element type {:?}",
                v.ty(),
                self.ty
            )).emit());
        }
        Ok(())
    }

    fn check_index(&self, i: usize) -> SplaResult<()> {
        if i >= self.len {
            return Err(Status::InvalidArgument(format!(
                "index {i} out of bounds for length-{} vector",
                self.len
            )).emit());
        }
        Ok(())
    }

    /// Resets every decoration and the validity bitmap (spec §3
    /// lifecycle). The fill value and duplicate-resolution operator are
    /// untouched: they are properties of the logical container, not any
    /// format.
    pub fn clear(&mut self) {
        self.valid.clear();
        self.dok = None;
        self.dense = None;
        self.coo = None;
        self.acc_dense = None;
        self.acc_coo = None;
    }

    fn is_valid(&self, format: VectorFormat) -> bool {
        self.valid.contains(&format)
    }

    /// Orders currently-valid formats with the richest-structure ones
    /// first, so the BFS conversion search prefers keeping more useful
    /// data around when multiple sources are equally short.
    fn ordered_valid_sources(&self) -> Vec<VectorFormat> {
        let preference = [
            VectorFormat::CpuCoo,
            VectorFormat::CpuDense,
            VectorFormat::AccCoo,
            VectorFormat::AccDense,
            VectorFormat::CpuDok,
        ];
        preference.into_iter().filter(|f| self.is_valid(*f)).collect()
    }

    /// The format-prerequisite protocol (spec §4.2): ensures `format` is
    /// ready for the declared `access` before a kernel touches it
    /// directly.
    pub fn ensure(&mut self, format: VectorFormat, access: Access) -> SplaResult<()> {
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
            Access::Rwd => {
                self.materialize(format)?;
                Ok(())
            }
        }
    }

    fn allocate(&mut self, format: VectorFormat) {
        match format {
            VectorFormat::CpuDok => {
                self.dok.get_or_insert_with(HashMap::new);
            }
            VectorFormat::CpuDense => {
                let len = self.len;
                let fill = self.fill;
                self.dense.get_or_insert_with(|| {
                    (spla_util::Matrix::filled(1, len, fill), spla_util::Matrix::filled(1, len, false))
                });
            }
            VectorFormat::CpuCoo => {
                self.coo.get_or_insert_with(Vec::new);
            }
            VectorFormat::AccDense => {
                self.acc_dense.get_or_insert_with(Vec::new);
            }
            VectorFormat::AccCoo => {
                self.acc_coo.get_or_insert_with(Vec::new);
            }
        }
    }

    fn materialize(&mut self, format: VectorFormat) -> SplaResult<()> {
        if self.is_valid(format) {
            return Ok(());
        }
        self.allocate(format);
        if self.valid.is_empty() {
            // Nothing has ever been written: every format reads as "all
            // fill", so materializing any one of them is just allocation.
            self.valid.push(format);
            return Ok(());
        }
        let sources = self.ordered_valid_sources();
        let path = shortest_conversion_path(&VECTOR_EDGES, &sources, format)
            .expect("vector format graph is connected");
        for pair in path.windows(2) {
            self.convert_step(pair[0], pair[1]);
        }
        if !self.valid.contains(&format) {
            self.valid.push(format);
        }
        Ok(())
    }

    fn convert_step(&mut self, from: VectorFormat, to: VectorFormat) {
        use VectorFormat::*;
        self.allocate(to);
        match (from, to) {
            (CpuDok, CpuCoo) | (CpuCoo, CpuDok) | (CpuDok, CpuDense) => {
                self.rebuild_all_from(from);
            }
            (CpuCoo, CpuDense) => {
                let coo = self.coo.clone().unwrap_or_default();
                let fill = self.fill;
                let len = self.len;
                let (values, present) = self
                    .dense
                    .get_or_insert_with(|| (spla_util::Matrix::filled(1, len, fill), spla_util::Matrix::filled(1, len, false)));
                for v in values.row_mut(0).iter_mut() {
                    *v = fill;
                }
                for p in present.row_mut(0).iter_mut() {
                    *p = false;
                }
                for (i, v) in coo {
                    values.row_mut(0)[i] = v;
                    present.row_mut(0)[i] = true;
                }
            }
            (CpuDense, CpuCoo) => {
                let (values, present) = self.dense.clone().expect("source format not allocated");
                let coo = self.coo.get_or_insert_with(Vec::new);
                coo.clear();
                for (i, &present) in present.row(0).iter().enumerate() {
                    if present {
                        coo.push((i, values.row(0)[i]));
                    }
                }
            }
            (CpuDense, CpuDok) => {
                let (values, present) = self.dense.clone().expect("source format not allocated");
                let dok = self.dok.get_or_insert_with(HashMap::new);
                dok.clear();
                for (i, &present) in present.row(0).iter().enumerate() {
                    if present {
                        dok.insert(i, values.row(0)[i]);
                    }
                }
            }
            (CpuDense, AccDense) => {
                let (values, _) = self.dense.clone().expect("source format not allocated");
                self.acc_dense = Some(values.into_flat());
            }
            (AccDense, CpuDense) => {
                let values = self.acc_dense.clone().unwrap_or_default();
                let len = values.len();
                let present = spla_util::Matrix::filled(1, len, true);
                self.dense = Some((spla_util::Matrix::from_flat_vec(1, len, values), present));
            }
            (CpuCoo, AccCoo) => {
                self.acc_coo = self.coo.clone();
            }
            (AccCoo, CpuCoo) => {
                self.coo = self.acc_coo.clone();
            }
            _ => unreachable!("no direct edge between {from:?} and {to:?}"),
        }
    }

    /// Rebuilds the `to` decoration from the explicit `from` source,
    /// applying the duplicate-resolution operator when collapsing a DOK
    /// (which can hold entries built in any order) into a sorted format.
    fn rebuild_all_from(&mut self, from: VectorFormat) {
        let mut entries: Vec<(usize, Value)> = match from {
            VectorFormat::CpuDok => self
                .dok
                .as_ref()
                .expect("source format not allocated")
                .iter()
                .map(|(&i, &v)| (i, v))
                .collect(),
            VectorFormat::CpuCoo => self.coo.clone().expect("source format not allocated"),
            VectorFormat::CpuDense => {
                let (values, present) = self.dense.as_ref().expect("source format not allocated");
                present
                    .row(0)
                    .iter()
                    .enumerate()
                    .filter(|(_, &p)| p)
                    .map(|(i, _)| (i, values.row(0)[i]))
                    .collect()
            }
            VectorFormat::AccDense | VectorFormat::AccCoo => {
                unreachable!("accelerator formats are converted via convert_step directly")
            }
        };
        entries.sort_by_key(|(i, _)| *i);
        dedup_resolve(&mut entries, &self.dup_op);

        if self.dok.is_some() {
            self.dok = Some(entries.iter().copied().collect());
        }
        if self.coo.is_some() {
            self.coo = Some(entries.clone());
        }
        if self.dense.is_some() {
            let mut values = spla_util::Matrix::filled(1, self.len, self.fill);
            let mut present = spla_util::Matrix::filled(1, self.len, false);
            for &(i, v) in &entries {
                values.row_mut(0)[i] = v;
                present.row_mut(0)[i] = true;
            }
            self.dense = Some((values, present));
        }
    }

    /// `get(i)` returns the fill value when `i` has no stored entry
    /// (spec §3's fill-value contract).
    pub fn get(&self, i: usize) -> SplaResult<Value> {
        self.check_index(i)?;
        if let Some(dok) = &self.dok {
            if self.is_valid(VectorFormat::CpuDok) {
                return Ok(dok.get(&i).copied().unwrap_or(self.fill));
            }
        }
        if let Some((values, present)) = &self.dense {
            if self.is_valid(VectorFormat::CpuDense) {
                return Ok(if present.row(0)[i] { values.row(0)[i] } else { self.fill });
            }
        }
        if let Some(coo) = &self.coo {
            if self.is_valid(VectorFormat::CpuCoo) {
                return Ok(coo
                    .binary_search_by_key(&i, |&(idx, _)| idx)
                    .ok()
                    .map(|pos| coo[pos].1)
                    .unwrap_or(self.fill));
            }
        }
        Ok(self.fill)
    }

    /// Appends to the DOK decoration (spec §4.2's build semantics).
    pub fn set_value(&mut self, i: usize, v: Value) -> SplaResult<()> {
        self.check_index(i)?;
        self.check_type(v)?;
        self.ensure(VectorFormat::CpuDok, Access::Rwd)?;
        self.dok.as_mut().unwrap().insert(i, v);
        self.valid.retain(|&f| f == VectorFormat::CpuDok);
        Ok(())
    }

    /// Removes any stored entry at `i`, so a later `get(i)` returns the
    /// fill value again. Used by kernels that clear a feedback/output
    /// slot back to fill (e.g. `v_eadd_fdb`) rather than rewriting the
    /// whole container.
    pub fn unset(&mut self, i: usize) -> SplaResult<()> {
        self.check_index(i)?;
        self.ensure(VectorFormat::CpuDok, Access::Rwd)?;
        self.dok.as_mut().unwrap().remove(&i);
        self.valid.retain(|&f| f == VectorFormat::CpuDok);
        Ok(())
    }

    /// Equivalent to batched `set_value`, short-circuiting to a direct
    /// COO build when `keys` is already sorted and unique (spec §4.2).
    pub fn build(&mut self, keys: &[usize], values: &[Value]) -> SplaResult<()> {
        if keys.len() != values.len() {
            return Err(Status::InvalidArgument(
                "keys and values must have the same length".into(),
            ).emit());
        }
        for (&k, &v) in keys.iter().zip(values) {
            self.check_index(k)?;
            self.check_type(v)?;
        }

        let sorted_unique = keys.windows(2).all(|w| w[0] < w[1]);
        self.clear();
        if sorted_unique {
            self.coo = Some(keys.iter().zip(values).map(|(&k, &v)| (k, v)).collect());
            self.valid = vec![VectorFormat::CpuCoo];
        } else {
            self.ensure(VectorFormat::CpuDok, Access::Wd)?;
            let dok = self.dok.as_mut().unwrap();
            for (&k, &v) in keys.iter().zip(values) {
                if let Some(existing) = dok.get(&k).copied() {
                    dok.insert(k, self.dup_op.apply(existing, v));
                } else {
                    dok.insert(k, v);
                }
            }
        }
        Ok(())
    }

    /// Bulk read; returns the multiset of `(key, value)` pairs currently
    /// stored, in ascending key order (spec §4.2, round-trip property).
    pub fn read(&mut self) -> SplaResult<(Vec<usize>, Vec<Value>)> {
        self.ensure(VectorFormat::CpuCoo, Access::Rwd)?;
        let coo = self.coo.clone().unwrap_or_default();
        Ok((coo.iter().map(|&(i, _)| i).collect(), coo.iter().map(|&(_, v)| v).collect()))
    }

    pub fn set_format(&mut self, format: VectorFormat) -> SplaResult<()> {
        self.ensure(format, Access::Rwd)
    }

    pub fn is_format_valid(&self, format: VectorFormat) -> bool {
        self.is_valid(format)
    }

    pub(crate) fn dense_values(&self) -> Option<&(spla_util::Matrix<Value>, spla_util::Matrix<bool>)> {
        self.dense.as_ref()
    }

    pub(crate) fn coo_entries(&self) -> Option<&[(usize, Value)]> {
        self.coo.as_deref()
    }

    /// Crate-internal convenience for kernels: ensures `CpuCoo` is valid
    /// without disturbing other formats and returns a snapshot of the
    /// explicit `(index, value)` entries in ascending index order.
    pub(crate) fn coo_snapshot(&mut self) -> SplaResult<Vec<(usize, Value)>> {
        self.ensure(VectorFormat::CpuCoo, Access::Rwd)?;
        Ok(self.coo.clone().unwrap_or_default())
    }
}

pub(crate) fn dedup_resolve(entries: &mut Vec<(usize, Value)>, dup_op: &OpBinary) {
    let mut write = 0usize;
    for read in 0..entries.len() {
        if write > 0 && entries[write - 1].0 == entries[read].0 {
            let prev = entries[write - 1].1;
            entries[write - 1].1 = dup_op.apply(prev, entries[read].1);
        } else {
            entries[write] = entries[read];
            write += 1;
        }
    }
    entries.truncate(write);
}

#[cfg(test)]
mod tests {
    use super::*;
    use spla_types::Builtins;

    #[test]
    fn fill_value_contract() {
        let v = Vector::new(5, ElementTypeId::I32);
        assert_eq!(v.get(2).unwrap(), Value::I32(0));
    }

    #[test]
    fn set_then_get_round_trips() {
        let mut v = Vector::new(5, ElementTypeId::I32);
        v.set_value(2, Value::I32(7)).unwrap();
        assert_eq!(v.get(2).unwrap(), Value::I32(7));
        assert_eq!(v.get(0).unwrap(), Value::I32(0));
    }

    #[test]
    fn build_round_trip_sorted_unique() {
        let mut v = Vector::new(10, ElementTypeId::I32);
        v.build(&[1, 3, 5], &[Value::I32(10), Value::I32(30), Value::I32(50)])
            .unwrap();
        let (keys, values) = v.read().unwrap();
        assert_eq!(keys, vec![1, 3, 5]);
        assert_eq!(values, vec![Value::I32(10), Value::I32(30), Value::I32(50)]);
    }

    #[test]
    fn build_with_duplicates_applies_dup_op() {
        let mut v = Vector::new(10, ElementTypeId::I32);
        v.set_duplicate_op(Builtins::plus(ElementTypeId::I32)).unwrap();
        v.build(&[1, 1, 2], &[Value::I32(10), Value::I32(5), Value::I32(2)])
            .unwrap();
        assert_eq!(v.get(1).unwrap(), Value::I32(15));
        assert_eq!(v.get(2).unwrap(), Value::I32(2));
    }

    #[test]
    fn default_duplicate_op_is_second() {
        let mut v = Vector::new(10, ElementTypeId::I32);
        v.build(&[1, 1], &[Value::I32(10), Value::I32(99)]).unwrap();
        assert_eq!(v.get(1).unwrap(), Value::I32(99));
    }

    #[test]
    fn conversion_roundtrip_dense_then_coo() {
        let mut v = Vector::new(8, ElementTypeId::I32);
        v.set_value(3, Value::I32(1)).unwrap();
        v.set_value(5, Value::I32(2)).unwrap();
        v.set_format(VectorFormat::CpuDense).unwrap();
        assert!(v.is_format_valid(VectorFormat::CpuDense));
        v.set_format(VectorFormat::CpuCoo).unwrap();
        assert_eq!(v.get(3).unwrap(), Value::I32(1));
        assert_eq!(v.get(5).unwrap(), Value::I32(2));
        assert_eq!(v.get(0).unwrap(), Value::I32(0));
    }

    #[test]
    fn clear_resets_validity_and_fill_is_preserved() {
        let mut v = Vector::new(4, ElementTypeId::I32);
        v.set_fill_value(Value::I32(-1)).unwrap();
        v.set_value(0, Value::I32(9)).unwrap();
        v.clear();
        assert_eq!(v.get(0).unwrap(), Value::I32(-1));
    }

    #[test]
    fn out_of_bounds_index_is_invalid_argument() {
        let v = Vector::new(4, ElementTypeId::I32);
        assert_eq!(v.get(10), Err(Status::InvalidArgument(
            "index 10 out of bounds for length-4 vector".into()
        )));
    }
}
