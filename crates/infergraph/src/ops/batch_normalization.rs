//! Inference-mode batch normalization; the output mirrors X.

use crate::kernel::collectors::NoCandidates;
use crate::kernel::{CollectorBox, Target};
use crate::tensor::Tensor;

use super::support::expect_arity;
use super::{InferError, InferResult, Operator};

pub(super) fn infer(op: &Operator, inputs: &[Tensor]) -> InferResult {
    expect_arity(inputs, 5)?;
    let x = &inputs[0];
    if !x.data_type.is_float() {
        return Err(InferError::TypeUnsupported(format!(
            "batch normalization over {}",
            x.data_type.name()
        )));
    }
    if x.rank() < 2 {
        return Err(InferError::ShapeMismatch(
            "batch normalization expects [N, C, ...] input".to_string(),
        ));
    }
    op.float_or("epsilon", 1e-5)?;
    op.float_or("momentum", 0.9)?;

    let param_type = inputs[1].data_type;
    for (index, param) in inputs[1..].iter().enumerate() {
        if !param.data_type.is_float() || param.data_type != param_type {
            return Err(InferError::TypeUnsupported(
                "batch normalization parameters must share one float type".to_string(),
            ));
        }
        if param.rank() != 1 {
            return Err(InferError::ShapeMismatch(format!(
                "batch normalization parameter {} must have rank 1",
                index + 1
            )));
        }
        let channels = &x.shape[1];
        if let (Some(have), Some(want)) = (param.shape[0].value(), channels.value()) {
            if have != want {
                return Err(InferError::ShapeMismatch(format!(
                    "parameter length {have} against {want} channels"
                )));
            }
        }
    }
    Ok(vec![Tensor::new(x.data_type, x.shape.clone())])
}

pub(super) fn collector(_op: &Operator, target: Target) -> CollectorBox {
    Box::new(NoCandidates { target })
}
