use std::sync::Once;

use spla_types::{ElementTypeId, OpBinary, OpSelect, Value};

use crate::container::matrix::{Csr, Matrix};
use crate::container::vector::Vector;
use crate::dispatch::{global, Candidate, Descriptor};
use crate::error::{SplaResult, Status};

const TAG: &str = "mxv_masked";

static REGISTER: Once = Once::new();

fn ensure_registered() {
    REGISTER.call_once(|| {
        let mut registry = global().lock().expect("algorithm registry poisoned");
        for ty in ElementTypeId::ALL {
            registry.register(
                TAG,
                ty,
                Candidate {
                    name: "configured_scalar",
                    accelerated: false,
                    can_execute: |d| d.front_factor.map(|f| f < 0.5).unwrap_or(false),
                },
            );
            registry.register(
                TAG,
                ty,
                Candidate {
                    name: "row_per_warp",
                    accelerated: true,
                    can_execute: |d| !d.early_exit,
                },
            );
            registry.register(
                TAG,
                ty,
                Candidate {
                    name: "row_per_thread",
                    accelerated: false,
                    can_execute: |_| true,
                },
            );
        }
    });
}

/// Masked sparse matrix x dense vector product (spec §4.5.1; scenario
/// S1). `r[i]` is left at fill for rows the mask rejects; otherwise it
/// is the `add`-reduction of `A[i,k] mult v[k]` over row `i`, seeded
/// with `init` (so an empty row yields `init` itself).
///
/// The three variants compute the identical result
/// and differ only in row traversal, which is why they share one fold
/// below: `row_per_warp` is the accelerator-eligible candidate (this
/// core has no real device to run it on, so it partitions rows into the
/// same groups a device launch would and folds each group on the host —
/// see `DESIGN.md`), `row_per_thread` is the scalar fallback that visits
/// rows one at a time and honors `early_exit`, and `configured_scalar`
/// first compacts the set of mask-admitted rows before the main pass.
pub fn mxv_masked(
    r: &mut Vector,
    mask: &Vector,
    a: &mut Matrix,
    v: &mut Vector,
    mult: &OpBinary,
    add: &OpBinary,
    select: &OpSelect,
    init: Value,
    descriptor: &Descriptor,
) -> SplaResult<()> {
    ensure_registered();

    let ty = r.element_type();
    if a.rows() != r.len() || a.rows() != mask.len() || a.cols() != v.len() {
        return Err(Status::InvalidArgument(
            "mxv_masked: dimension mismatch between r, mask, a and v".into(),
        ).emit());
    }
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
            "mxv_masked: operator/container element types do not agree".into(),
        ).emit());
    }
    if select.t_in() != mask.element_type() {
        return Err(Status::InvalidArgument(
            "mxv_masked: select operator type does not match mask element type".into(),
        ).emit());
    }

    let candidate = {
        let registry = global().lock().expect("algorithm registry poisoned");
        registry.select(TAG, ty, descriptor)?
    };

    let csr = a.csr_snapshot()?;
    let mut row_passes = Vec::with_capacity(a.rows());
    for i in 0..a.rows() {
        row_passes.push(select.apply(mask.get(i)?));
    }

    r.clear();
    match candidate.name {
        "configured_scalar" => {
            let eligible: Vec<usize> = row_passes
                .iter()
                .enumerate()
                .filter(|(_, &p)| p)
                .map(|(i, _)| i)
                .collect();
            for i in eligible {
                let value = reduce_row(&csr, i, v, mult, add, init)?;
                r.set_value(i, value)?;
            }
        }
        "row_per_warp" => {
            let group_size = spla_accel::Vendor::Unknown.default_workgroup_size();
            let geometry = spla_util::launch_geometry(a.rows(), group_size);
            log::debug!(
                "mxv_masked row_per_warp: {} groups of {} rows ({} rows total)",
                geometry.groups,
                geometry.group_size,
                a.rows()
            );
            for chunk_start in (0..a.rows()).step_by(geometry.group_size) {
                let chunk_end = (chunk_start + geometry.group_size).min(a.rows());
                for i in chunk_start..chunk_end {
                    if !row_passes[i] {
                        continue;
                    }
                    let value = reduce_row(&csr, i, v, mult, add, init)?;
                    r.set_value(i, value)?;
                }
            }
        }
        "row_per_thread" => {
            for (i, &pass) in row_passes.iter().enumerate() {
                if !pass {
                    continue;
                }
                let value = reduce_row(&csr, i, v, mult, add, init)?;
                r.set_value(i, value)?;
            }
        }
        _ => unreachable!("unregistered candidate {}", candidate.name),
    }
    Ok(())
}

fn reduce_row(
    csr: &Csr,
    row: usize,
    v: &Vector,
    mult: &OpBinary,
    add: &OpBinary,
    init: Value,
) -> SplaResult<Value> {
    let start = csr.row_ptr[row];
    let end = csr.row_ptr[row + 1];
    let mut acc = init;
    for idx in start..end {
        let col = csr.col_idx[idx];
        let a_ik = csr.vals[idx];
        let contribution = mult.apply(a_ik, v.get(col)?);
        acc = add.apply(acc, contribution);
    }
    Ok(acc)
}
