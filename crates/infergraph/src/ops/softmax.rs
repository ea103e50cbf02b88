//! Softmax keeps the input's type and shape; only the axis is validated.

use crate::kernel::collectors::NoCandidates;
use crate::kernel::{CollectorBox, Target};
use crate::tensor::Tensor;

use super::support::{expect_arity, normalize_axis};
use super::{InferError, InferResult, Operator};

pub(super) fn infer(op: &Operator, inputs: &[Tensor]) -> InferResult {
    expect_arity(inputs, 1)?;
    let data = &inputs[0];
    if !data.data_type.is_float() {
        return Err(InferError::TypeUnsupported(format!(
            "softmax over {}",
            data.data_type.name()
        )));
    }
    normalize_axis(op.int_or("axis", -1)?, data.rank())?;
    Ok(vec![Tensor::new(data.data_type, data.shape.clone())])
}

pub(super) fn collector(_op: &Operator, target: Target) -> CollectorBox {
    Box::new(NoCandidates { target })
}
