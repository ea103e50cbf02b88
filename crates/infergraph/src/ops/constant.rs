//! Materializes an attribute as a constant edge.

use crate::kernel::collectors::NoCandidates;
use crate::kernel::{CollectorBox, Target};
use crate::tensor::Tensor;

use super::support::expect_arity;
use super::{InferError, InferResult, Operator};

pub(super) fn infer(op: &Operator, inputs: &[Tensor]) -> InferResult {
    expect_arity(inputs, 0)?;
    if let Some(attr) = op.attribute_opt("value") {
        return Ok(vec![attr.tensor()?.clone()]);
    }
    if let Some(attr) = op.attribute_opt("value_int") {
        return Ok(vec![tensor_err(Tensor::from_i64(&[], vec![attr.int()?]))?]);
    }
    if let Some(attr) = op.attribute_opt("value_ints") {
        let values = attr.ints()?.to_vec();
        let len = values.len() as i64;
        return Ok(vec![tensor_err(Tensor::from_i64(&[len], values))?]);
    }
    if let Some(attr) = op.attribute_opt("value_float") {
        return Ok(vec![tensor_err(Tensor::from_f32(&[], vec![attr.float()? as f32]))?]);
    }
    if let Some(attr) = op.attribute_opt("value_floats") {
        let values: Vec<f32> = attr.floats()?.iter().map(|&v| v as f32).collect();
        let len = values.len() as i64;
        return Ok(vec![tensor_err(Tensor::from_f32(&[len], values))?]);
    }
    Err(InferError::AttributeMissing("value".to_string()))
}

fn tensor_err(result: anyhow::Result<Tensor>) -> Result<Tensor, InferError> {
    result.map_err(|err| InferError::Internal(err.to_string()))
}

pub(super) fn collector(_op: &Operator, target: Target) -> CollectorBox {
    Box::new(NoCandidates { target })
}
