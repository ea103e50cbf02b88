//! Element-wise select between two tensors under a boolean condition.

use std::sync::Arc;

use crate::kernel::collectors::NoCandidates;
use crate::kernel::{CollectorBox, Target};
use crate::tensor::{read_at, DataType, Tensor};

use super::support::{
    concrete_dims, expect_arity, locate_1, locate_n, multidir_broadcast, should_calculate,
};
use super::{InferError, InferResult, Operator};

pub(super) fn infer(_op: &Operator, inputs: &[Tensor]) -> InferResult {
    expect_arity(inputs, 3)?;
    let (cond, x, y) = (&inputs[0], &inputs[1], &inputs[2]);
    if cond.data_type != DataType::Bool {
        return Err(InferError::TypeUnsupported(
            "where condition must be Bool".to_string(),
        ));
    }
    if x.data_type != y.data_type {
        return Err(InferError::TypeUnsupported(
            "where branches must share one element type".to_string(),
        ));
    }

    let shape = multidir_broadcast(&[&cond.shape, &x.shape, &y.shape])?;
    let mut ans = Tensor::new(x.data_type, shape);
    if !should_calculate(inputs, &ans.shape) {
        return Ok(vec![ans]);
    }

    let out_dims = concrete_dims(&ans.shape)?;
    let cond_dims = concrete_dims(&cond.shape)?;
    let x_dims = concrete_dims(&x.shape)?;
    let y_dims = concrete_dims(&y.shape)?;
    let ele = x.data_type.size();
    let total: usize = out_dims.iter().product();
    let cond_data = cond.data.as_ref().unwrap();
    let x_data = x.data.as_ref().unwrap();
    let y_data = y.data.as_ref().unwrap();
    let mut out = vec![0u8; total * ele];
    for k in 0..total {
        let coords = locate_n(&out_dims, k);
        let take_x = read_at::<u8>(cond_data, locate_1(&cond_dims, &coords)) != 0;
        let (src, dims) = if take_x {
            (x_data, &x_dims)
        } else {
            (y_data, &y_dims)
        };
        let offset = locate_1(dims, &coords);
        out[k * ele..(k + 1) * ele].copy_from_slice(&src[offset * ele..(offset + 1) * ele]);
    }
    ans.data = Some(Arc::from(out.into_boxed_slice()));
    Ok(vec![ans])
}

pub(super) fn collector(_op: &Operator, target: Target) -> CollectorBox {
    Box::new(NoCandidates { target })
}
