//! Strided slicing with constant starts/ends/axes/steps operands.

use std::sync::Arc;

use crate::kernel::collectors::NoCandidates;
use crate::kernel::{CollectorBox, Target};
use crate::tensor::{DimExpr, Tensor};

use super::support::{
    concrete_dims, dim_value, expect_arity_range, index_values, locate_1, locate_n,
    normalize_axis, should_calculate,
};
use super::{InferError, InferResult, Operator};

struct AxisSlice {
    start: i64,
    step: i64,
}

pub(super) fn infer(_op: &Operator, inputs: &[Tensor]) -> InferResult {
    expect_arity_range(inputs, 3, 5)?;
    let data = &inputs[0];
    let starts = index_values(&inputs[1])?;
    let ends = index_values(&inputs[2])?;
    if starts.len() != ends.len() {
        return Err(InferError::ShapeMismatch(
            "slice starts and ends must have one length".to_string(),
        ));
    }
    let axes = match inputs.get(3) {
        Some(axes) => index_values(axes)?,
        None => (0..starts.len() as i64).collect(),
    };
    let steps = match inputs.get(4) {
        Some(steps) => index_values(steps)?,
        None => vec![1; starts.len()],
    };
    if axes.len() != starts.len() || steps.len() != starts.len() {
        return Err(InferError::ShapeMismatch(
            "slice control operands must have one length".to_string(),
        ));
    }

    let rank = data.rank();
    let mut shape = data.shape.clone();
    let mut plan: Vec<Option<AxisSlice>> = (0..rank).map(|_| None).collect();
    for ((&axis, &start), (&end, &step)) in
        axes.iter().zip(&starts).zip(ends.iter().zip(&steps))
    {
        let axis = normalize_axis(axis, rank)?;
        if step == 0 {
            return Err(InferError::ShapeMismatch("slice step must be non-zero".to_string()));
        }
        let dim = dim_value(&data.shape[axis])?;
        let (start, end) = if step > 0 {
            let start = (if start < 0 { start + dim } else { start }).clamp(0, dim);
            let end = (if end < 0 { end + dim } else { end }).clamp(0, dim);
            (start, end)
        } else {
            let start = (if start < 0 { start + dim } else { start }).clamp(0, dim - 1);
            let end = (if end < 0 { end + dim } else { end }).clamp(-1, dim - 1);
            (start, end)
        };
        let span = if step > 0 { end - start } else { start - end };
        let count = if span <= 0 {
            0
        } else {
            (span + step.abs() - 1) / step.abs()
        };
        shape[axis] = DimExpr::Value(count);
        plan[axis] = Some(AxisSlice { start, step });
    }

    let mut ans = Tensor::new(data.data_type, shape);
    if !should_calculate(&inputs[..1], &ans.shape) {
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
        for axis in 0..rank {
            in_coords[axis] = match &plan[axis] {
                Some(slice) => (slice.start + coords[axis] as i64 * slice.step) as usize,
                None => coords[axis],
            };
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
