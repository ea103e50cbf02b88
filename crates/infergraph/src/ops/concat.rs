//! Concatenation along one axis.

use std::sync::Arc;

use crate::kernel::collectors::NoCandidates;
use crate::kernel::{CollectorBox, Target};
use crate::tensor::{DimExpr, Shape, Tensor};

use super::support::{concrete_dims, dim_value, normalize_axis, should_calculate};
use super::{InferError, InferResult, Operator};

pub(super) fn infer(op: &Operator, inputs: &[Tensor]) -> InferResult {
    if inputs.len() < 2 {
        return Err(InferError::ShapeMismatch(
            "concat requires at least two inputs".to_string(),
        ));
    }
    let first = &inputs[0];
    let rank = first.rank();
    let axis = normalize_axis(op.attribute("axis")?.int()?, rank)?;
    let dtype = first.data_type;

    let mut axis_total = 0i64;
    for input in inputs {
        if input.data_type != dtype {
            return Err(InferError::TypeUnsupported(
                "concat inputs must share one element type".to_string(),
            ));
        }
        if input.rank() != rank {
            return Err(InferError::ShapeMismatch(
                "concat inputs must share one rank".to_string(),
            ));
        }
        for (position, (dim, expected)) in input.shape.iter().zip(&first.shape).enumerate() {
            if position != axis && dim != expected {
                return Err(InferError::ShapeMismatch(format!(
                    "concat inputs disagree on dimension {position}"
                )));
            }
        }
        axis_total += dim_value(&input.shape[axis])?;
    }

    let mut shape: Shape = first.shape.clone();
    shape[axis] = DimExpr::Value(axis_total);
    let mut ans = Tensor::new(dtype, shape);
    if !should_calculate(inputs, &ans.shape) {
        return Ok(vec![ans]);
    }

    // One outer run per leading block; inputs contribute interleaved inner
    // slices of axis_dim × trailing elements each.
    let out_dims = concrete_dims(&ans.shape)?;
    let ele = dtype.size();
    let outer: usize = out_dims[..axis].iter().product();
    let trailing: usize = out_dims[axis + 1..].iter().product();
    let total: usize = out_dims.iter().product();
    let chunks = inputs
        .iter()
        .map(|input| Ok(concrete_dims(&input.shape)?[axis] * trailing * ele))
        .collect::<Result<Vec<_>, InferError>>()?;
    let mut out = vec![0u8; total * ele];
    let mut cursor = 0usize;
    for run in 0..outer {
        for (input, &chunk) in inputs.iter().zip(&chunks) {
            let src = input.data.as_ref().unwrap();
            out[cursor..cursor + chunk].copy_from_slice(&src[run * chunk..(run + 1) * chunk]);
            cursor += chunk;
        }
    }
    ans.data = Some(Arc::from(out.into_boxed_slice()));
    Ok(vec![ans])
}

pub(super) fn collector(_op: &Operator, target: Target) -> CollectorBox {
    Box::new(NoCandidates { target })
}
