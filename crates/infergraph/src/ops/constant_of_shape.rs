//! Fills a constant tensor of the requested shape with one repeated value.

use std::sync::Arc;

use crate::kernel::collectors::NoCandidates;
use crate::kernel::{CollectorBox, Target};
use crate::tensor::{as_bytes, DataType, DimExpr, Shape, Tensor};

use super::support::{expect_arity, index_values};
use super::{InferError, InferResult, Operator};

pub(super) fn infer(op: &Operator, inputs: &[Tensor]) -> InferResult {
    expect_arity(inputs, 1)?;
    let dims = index_values(&inputs[0])?;
    let mut shape = Shape::new();
    let mut total = 1usize;
    for dim in dims {
        if dim < 0 {
            return Err(InferError::ShapeMismatch(format!(
                "negative dimension {dim} in constant shape"
            )));
        }
        total *= dim as usize;
        shape.push(DimExpr::Value(dim));
    }

    let (dtype, fill): (DataType, Vec<u8>) = match op.attribute_opt("value") {
        Some(attr) => {
            let value = attr.tensor()?;
            let data = value.data.as_ref().ok_or_else(|| {
                InferError::AttributeType("value tensor must carry data".to_string())
            })?;
            if value.elements_size() != Some(1) {
                return Err(InferError::AttributeType(
                    "value tensor must hold exactly one element".to_string(),
                ));
            }
            (value.data_type, data.as_ref().to_vec())
        }
        None => (DataType::F32, as_bytes(&[0f32]).to_vec()),
    };

    let mut bytes = Vec::with_capacity(total * fill.len());
    for _ in 0..total {
        bytes.extend_from_slice(&fill);
    }
    let mut ans = Tensor::new(dtype, shape);
    ans.data = Some(Arc::from(bytes.into_boxed_slice()));
    Ok(vec![ans])
}

pub(super) fn collector(_op: &Operator, target: Target) -> CollectorBox {
    Box::new(NoCandidates { target })
}
