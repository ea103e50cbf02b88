//! Repeats a tensor along each axis by a constant factor.

use std::sync::Arc;

use crate::kernel::collectors::NoCandidates;
use crate::kernel::{CollectorBox, Target};
use crate::tensor::{DimExpr, Shape, Tensor};

use super::support::{
    concrete_dims, dim_value, expect_arity, index_values, locate_n, should_calculate,
};
use super::{InferError, InferResult, Operator};

pub(super) fn infer(_op: &Operator, inputs: &[Tensor]) -> InferResult {
    expect_arity(inputs, 2)?;
    let data = &inputs[0];
    let repeats = index_values(&inputs[1])?;
    if repeats.len() != data.rank() {
        return Err(InferError::ShapeMismatch(format!(
            "tile repeats rank {} does not match input rank {}",
            repeats.len(),
            data.rank()
        )));
    }

    let mut shape = Shape::new();
    for (dim, &repeat) in data.shape.iter().zip(&repeats) {
        if repeat < 0 {
            return Err(InferError::ShapeMismatch(format!(
                "negative tile repeat {repeat}"
            )));
        }
        if repeat == 1 {
            shape.push(dim.clone());
        } else {
            shape.push(DimExpr::Value(dim_value(dim)? * repeat));
        }
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
    for k in 0..total {
        let coords = locate_n(&out_dims, k);
        let mut offset = 0usize;
        let mut mul = 1usize;
        for (axis, &dim) in in_dims.iter().enumerate().rev() {
            offset += (coords[axis] % dim) * mul;
            mul *= dim;
        }
        out[k * ele..(k + 1) * ele].copy_from_slice(&src[offset * ele..(offset + 1) * ele]);
    }
    ans.data = Some(Arc::from(out.into_boxed_slice()));
    Ok(vec![ans])
}

pub(super) fn collector(_op: &Operator, target: Target) -> CollectorBox {
    Box::new(NoCandidates { target })
}
