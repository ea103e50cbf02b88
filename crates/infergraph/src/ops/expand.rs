//! Broadcasts a tensor to the shape given by a constant operand.

use std::sync::Arc;

use crate::kernel::collectors::NoCandidates;
use crate::kernel::{CollectorBox, Target};
use crate::tensor::{DimExpr, Shape, Tensor};

use super::support::{
    concrete_dims, expect_arity, index_values, locate_1, locate_n, multidir_broadcast,
    should_calculate,
};
use super::{InferResult, Operator};

pub(super) fn infer(_op: &Operator, inputs: &[Tensor]) -> InferResult {
    expect_arity(inputs, 2)?;
    let data = &inputs[0];
    let requested: Shape = index_values(&inputs[1])?
        .into_iter()
        .map(DimExpr::Value)
        .collect();
    let shape = multidir_broadcast(&[&data.shape, &requested])?;

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
        let offset = locate_1(&in_dims, &coords);
        out[k * ele..(k + 1) * ele].copy_from_slice(&src[offset * ele..(offset + 1) * ele]);
    }
    ans.data = Some(Arc::from(out.into_boxed_slice()));
    Ok(vec![ans])
}

pub(super) fn collector(_op: &Operator, target: Target) -> CollectorBox {
    Box::new(NoCandidates { target })
}
