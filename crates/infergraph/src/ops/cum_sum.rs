//! Cumulative sum along one axis; shape and type pass through.

use crate::kernel::collectors::NoCandidates;
use crate::kernel::{CollectorBox, Target};
use crate::tensor::{DataType, Tensor};

use super::support::{expect_arity, index_values, normalize_axis};
use super::{InferError, InferResult, Operator};

pub(super) fn infer(op: &Operator, inputs: &[Tensor]) -> InferResult {
    expect_arity(inputs, 2)?;
    let data = &inputs[0];
    if !data.data_type.is_numeric() {
        return Err(InferError::TypeUnsupported(format!(
            "cumsum over {}",
            data.data_type.name()
        )));
    }
    let axis = &inputs[1];
    if !matches!(axis.data_type, DataType::I32 | DataType::I64) {
        return Err(InferError::TypeUnsupported(
            "cumsum axis must be I32 or I64".to_string(),
        ));
    }
    if axis.has_data() {
        let values = index_values(axis)?;
        if values.len() != 1 {
            return Err(InferError::ShapeMismatch(
                "cumsum axis must hold one element".to_string(),
            ));
        }
        normalize_axis(values[0], data.rank())?;
    }
    op.int_or("exclusive", 0)?;
    op.int_or("reverse", 0)?;
    Ok(vec![Tensor::new(data.data_type, data.shape.clone())])
}

pub(super) fn collector(_op: &Operator, target: Target) -> CollectorBox {
    Box::new(NoCandidates { target })
}
