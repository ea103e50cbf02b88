//! Splits a tensor along one axis into equal or explicitly-sized parts.

use std::sync::Arc;

use crate::kernel::collectors::NoCandidates;
use crate::kernel::{CollectorBox, Target};
use crate::tensor::{DimExpr, Tensor};

use super::support::{
    concrete_dims, dim_value, expect_arity_range, index_values, normalize_axis, should_calculate,
};
use super::{InferError, InferResult, Operator};

pub(super) fn infer(op: &Operator, inputs: &[Tensor]) -> InferResult {
    expect_arity_range(inputs, 1, 2)?;
    let data = &inputs[0];
    let rank = data.rank();
    let axis = normalize_axis(op.int_or("axis", 0)?, rank)?;

    let sizes: Vec<i64> = if inputs.len() == 2 {
        let sizes = index_values(&inputs[1])?;
        if let Some(total) = data.shape[axis].value() {
            let sum: i64 = sizes.iter().sum();
            if sum != total {
                return Err(InferError::ShapeMismatch(format!(
                    "split sizes sum to {sum}, axis holds {total}"
                )));
            }
        }
        sizes
    } else {
        let pieces = op.int_or("num_outputs", 0)?;
        if pieces <= 0 {
            return Err(InferError::AttributeMissing("num_outputs".to_string()));
        }
        let total = dim_value(&data.shape[axis])?;
        if total % pieces != 0 {
            return Err(InferError::ShapeMismatch(format!(
                "axis extent {total} is not divisible into {pieces} parts"
            )));
        }
        vec![total / pieces; pieces as usize]
    };

    let fold = data.has_data() && data.shape.iter().all(DimExpr::has_value);
    let trailing: usize = if fold {
        concrete_dims(&data.shape)?[axis + 1..].iter().product()
    } else {
        0
    };
    let ele = data.data_type.size();

    let mut outputs = Vec::with_capacity(sizes.len());
    let mut offset_rows = 0i64;
    for &size in &sizes {
        if size < 0 {
            return Err(InferError::ShapeMismatch(format!("negative split size {size}")));
        }
        let mut shape = data.shape.clone();
        shape[axis] = DimExpr::Value(size);
        let mut part = Tensor::new(data.data_type, shape);
        if fold && should_calculate(&inputs[..1], &part.shape) {
            let dims = concrete_dims(&data.shape)?;
            let outer: usize = dims[..axis].iter().product();
            let src = data.data.as_ref().unwrap();
            let run = size as usize * trailing * ele;
            let stride = dims[axis] * trailing * ele;
            let start = offset_rows as usize * trailing * ele;
            let mut bytes = Vec::with_capacity(outer * run);
            for block in 0..outer {
                let from = block * stride + start;
                bytes.extend_from_slice(&src[from..from + run]);
            }
            part.data = Some(Arc::from(bytes.into_boxed_slice()));
        }
        offset_rows += size;
        outputs.push(part);
    }
    Ok(outputs)
}

pub(super) fn collector(_op: &Operator, target: Target) -> CollectorBox {
    Box::new(NoCandidates { target })
}
