//! Windowed pooling (AveragePool, LpPool, MaxPool).

use crate::kernel::collectors::NoCandidates;
use crate::kernel::{CollectorBox, Target};
use crate::tensor::{DimExpr, Shape, Tensor};

use super::support::{dim_value, expect_arity};
use super::{InferError, InferResult, Operator};

/// Shared spatial arithmetic for pooling and convolution:
/// `out = (in + pad_lo + pad_hi - dilation * (kernel - 1) - 1) / stride + 1`,
/// floored or ceiled per `ceil_mode`.
pub(super) fn spatial_output(
    input: i64,
    kernel: i64,
    pad_lo: i64,
    pad_hi: i64,
    stride: i64,
    dilation: i64,
    ceil_mode: bool,
) -> Result<i64, InferError> {
    if stride <= 0 || dilation <= 0 || kernel <= 0 {
        return Err(InferError::ShapeMismatch(
            "kernel, stride, and dilation must be positive".to_string(),
        ));
    }
    let effective = dilation * (kernel - 1) + 1;
    let span = input + pad_lo + pad_hi - effective;
    if span < 0 {
        return Err(InferError::ShapeMismatch(format!(
            "window of effective size {effective} exceeds padded input {}",
            input + pad_lo + pad_hi
        )));
    }
    let out = if ceil_mode {
        (span + stride - 1) / stride + 1
    } else {
        span / stride + 1
    };
    Ok(out)
}

/// Reads `kernel_shape`, `strides`, `pads`, `dilations` with ONNX defaults
/// for `spatial` trailing axes.
pub(super) fn window_attributes(
    op: &Operator,
    spatial: usize,
) -> Result<(Vec<i64>, Vec<i64>, Vec<i64>, Vec<i64>), InferError> {
    let kernel = op
        .attribute("kernel_shape")?
        .ints()?
        .to_vec();
    if kernel.len() != spatial {
        return Err(InferError::ShapeMismatch(format!(
            "kernel_shape rank {} does not match {spatial} spatial axes",
            kernel.len()
        )));
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
    Ok((kernel, strides, pads, dilations))
}

pub(super) fn infer(op: &Operator, inputs: &[Tensor]) -> InferResult {
    expect_arity(inputs, 1)?;
    let data = &inputs[0];
    if !data.data_type.is_float() {
        return Err(InferError::TypeUnsupported(format!(
            "{} over {}",
            op.op_type.name(),
            data.data_type.name()
        )));
    }
    let rank = data.rank();
    if rank < 3 {
        return Err(InferError::ShapeMismatch(
            "pooling expects [N, C, spatial...] input".to_string(),
        ));
    }
    let spatial = rank - 2;
    let (kernel, strides, pads, dilations) = window_attributes(op, spatial)?;
    let ceil_mode = op.int_or("ceil_mode", 0)? != 0;

    let mut shape: Shape = data.shape[..2].iter().cloned().collect();
    for i in 0..spatial {
        let input = dim_value(&data.shape[2 + i])?;
        shape.push(DimExpr::Value(spatial_output(
            input,
            kernel[i],
            pads[i],
            pads[spatial + i],
            strides[i],
            dilations[i],
            ceil_mode,
        )?));
    }
    Ok(vec![Tensor::new(data.data_type, shape)])
}

pub(super) fn collector(_op: &Operator, target: Target) -> CollectorBox {
    Box::new(NoCandidates { target })
}
