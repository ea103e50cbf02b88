//! Convolution shape inference.

use crate::kernel::collectors::NoCandidates;
use crate::kernel::{CollectorBox, Target};
use crate::tensor::{DimExpr, Shape, Tensor};

use super::pool::spatial_output;
use super::support::{dim_value, expect_arity_range};
use super::{InferError, InferResult, Operator};

pub(super) fn infer(op: &Operator, inputs: &[Tensor]) -> InferResult {
    expect_arity_range(inputs, 2, 3)?;
    let (x, w) = (&inputs[0], &inputs[1]);
    if !x.data_type.is_float() || w.data_type != x.data_type {
        return Err(InferError::TypeUnsupported(
            "conv operands must share one float type".to_string(),
        ));
    }
    let rank = x.rank();
    if rank < 3 || w.rank() != rank {
        return Err(InferError::ShapeMismatch(
            "conv expects [N, C, spatial...] input and matching-rank weights".to_string(),
        ));
    }
    let spatial = rank - 2;
    let group = op.int_or("group", 1)?;
    if group <= 0 {
        return Err(InferError::ShapeMismatch("group must be positive".to_string()));
    }

    // Channel agreement is checked when both sides are resolvable.
    if let (Some(channels), Some(per_group)) = (x.shape[1].value(), w.shape[1].value()) {
        if per_group * group != channels {
            return Err(InferError::ShapeMismatch(format!(
                "{channels} input channels against {per_group} × {group} weight channels"
            )));
        }
    }
    if let Some(feature_maps) = w.shape[0].value() {
        if feature_maps % group != 0 {
            return Err(InferError::ShapeMismatch(format!(
                "{feature_maps} feature maps are not divisible into {group} groups"
            )));
        }
    }
    if let Some(bias) = inputs.get(2) {
        if bias.rank() != 1 || bias.data_type != x.data_type {
            return Err(InferError::ShapeMismatch(
                "conv bias must be a rank-1 tensor of the input type".to_string(),
            ));
        }
    }

    let strides = match op.ints_opt("strides")? {
        Some(values) => values.to_vec(),
        None => vec![1; spatial],
    };
    let pads = match op.ints_opt("pads")? {
        Some(values) => values.to_vec(),
        None => vec![0; spatial * 2],
    };
    let dilations = match op.ints_opt("dilations")? {
        Some(values) => values.to_vec(),
        None => vec![1; spatial],
    };
    if strides.len() != spatial || dilations.len() != spatial || pads.len() != spatial * 2 {
        return Err(InferError::ShapeMismatch(
            "window attribute ranks disagree with the spatial axes".to_string(),
        ));
    }
    if let Some(kernel_shape) = op.ints_opt("kernel_shape")? {
        for (given, dim) in kernel_shape.iter().zip(&w.shape[2..]) {
            if dim.value().is_some_and(|actual| actual != *given) {
                return Err(InferError::ShapeMismatch(
                    "kernel_shape disagrees with the weight tensor".to_string(),
                ));
            }
        }
    }

    let mut shape = Shape::new();
    shape.push(x.shape[0].clone());
    shape.push(w.shape[0].clone());
    for i in 0..spatial {
        let input = dim_value(&x.shape[2 + i])?;
        let kernel = dim_value(&w.shape[2 + i])?;
        shape.push(DimExpr::Value(spatial_output(
            input,
            kernel,
            pads[i],
            pads[spatial + i],
            strides[i],
            dilations[i],
            false,
        )?));
    }
    Ok(vec![Tensor::new(x.data_type, shape)])
}

pub(super) fn collector(_op: &Operator, target: Target) -> CollectorBox {
    Box::new(NoCandidates { target })
}
