//! Global pooling collapses every spatial axis to 1.

use crate::kernel::collectors::NoCandidates;
use crate::kernel::{CollectorBox, Target};
use crate::tensor::{DimExpr, Shape, Tensor};

use super::support::expect_arity;
use super::{InferError, InferResult, Operator};

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
    if data.rank() < 3 {
        return Err(InferError::ShapeMismatch(
            "global pooling expects [N, C, spatial...] input".to_string(),
        ));
    }
    let mut shape: Shape = data.shape[..2].iter().cloned().collect();
    for _ in 2..data.rank() {
        shape.push(DimExpr::Value(1));
    }
    Ok(vec![Tensor::new(data.data_type, shape)])
}

pub(super) fn collector(_op: &Operator, target: Target) -> CollectorBox {
    Box::new(NoCandidates { target })
}
