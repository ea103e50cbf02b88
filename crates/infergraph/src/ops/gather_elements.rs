//! Element-wise gather: output takes the indices' shape.

use crate::kernel::collectors::NoCandidates;
use crate::kernel::{CollectorBox, Target};
use crate::tensor::{DataType, Tensor};

use super::support::{expect_arity, normalize_axis};
use super::{InferError, InferResult, Operator};

pub(super) fn infer(op: &Operator, inputs: &[Tensor]) -> InferResult {
    expect_arity(inputs, 2)?;
    let (data, indices) = (&inputs[0], &inputs[1]);
    if !matches!(indices.data_type, DataType::I32 | DataType::I64) {
        return Err(InferError::TypeUnsupported(
            "gather indices must be I32 or I64".to_string(),
        ));
    }
    if data.rank() != indices.rank() || data.rank() == 0 {
        return Err(InferError::ShapeMismatch(
            "data and indices must share one non-zero rank".to_string(),
        ));
    }
    normalize_axis(op.int_or("axis", 0)?, data.rank())?;
    Ok(vec![Tensor::new(data.data_type, indices.shape.clone())])
}

pub(super) fn collector(_op: &Operator, target: Target) -> CollectorBox {
    Box::new(NoCandidates { target })
}
