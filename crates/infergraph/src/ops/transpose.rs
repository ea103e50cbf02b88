//! Axis permutation.

use std::sync::Arc;

use crate::kernel::collectors::NoCandidates;
use crate::kernel::{CollectorBox, Target};
use crate::tensor::{Shape, Tensor};

use super::support::{concrete_dims, expect_arity, locate_1, locate_n, should_calculate};
use super::{InferError, InferResult, Operator};

pub(super) fn infer(op: &Operator, inputs: &[Tensor]) -> InferResult {
    expect_arity(inputs, 1)?;
    let data = &inputs[0];
    let rank = data.rank();

    let perm: Vec<usize> = match op.ints_opt("perm")? {
        Some(perm) => {
            let mut seen = vec![false; rank];
            let mut out = Vec::with_capacity(rank);
            for &axis in perm {
                let axis = usize::try_from(axis).ok().filter(|&a| a < rank).ok_or_else(|| {
                    InferError::ShapeMismatch(format!("perm entry {axis} out of range"))
                })?;
                if seen[axis] {
                    return Err(InferError::ShapeMismatch(format!(
                        "perm repeats axis {axis}"
                    )));
                }
                seen[axis] = true;
                out.push(axis);
            }
            if out.len() != rank {
                return Err(InferError::ShapeMismatch(
                    "perm must cover every axis".to_string(),
                ));
            }
            out
        }
        None => (0..rank).rev().collect(),
    };

    let shape: Shape = perm.iter().map(|&axis| data.shape[axis].clone()).collect();
    let mut ans = Tensor::new(data.data_type, shape);
    if !should_calculate(inputs, &ans.shape) {
        return Ok(vec![ans]);
    }

    let out_dims = concrete_dims(&ans.shape)?;
    let in_dims = concrete_dims(&data.shape)?;
    let ele = data.data_type.size();
    let total: usize = out_dims.iter().product();
    let src = data.data.as_ref().unwrap();
    let mut out = vec![0u8; total * ele];
    let mut in_coords = vec![0usize; rank];
    for k in 0..total {
        let coords = locate_n(&out_dims, k);
        for (position, &axis) in perm.iter().enumerate() {
            in_coords[axis] = coords[position];
        }
        let offset = locate_1(&in_dims, &in_coords);
        out[k * ele..(k + 1) * ele].copy_from_slice(&src[offset * ele..(offset + 1) * ele]);
    }
    ans.data = Some(Arc::from(out.into_boxed_slice()));
    Ok(vec![ans])
}

pub(super) fn collector(_op: &Operator, target: Target) -> CollectorBox {
    Box::new(NoCandidates { target })
}
