//! Reshape driven by a constant shape operand.

use crate::kernel::collectors::NoCandidates;
use crate::kernel::{CollectorBox, Target};
use crate::tensor::{DimExpr, Shape, Tensor};

use super::support::{dim_value, expect_arity, index_values, should_calculate};
use super::{InferError, InferResult, Operator};

/// A target entry of 0 copies the input dimension at that position (unless
/// `allowzero` is set); a single -1 is inferred from the element count, which
/// requires every input dimension to be bound.
pub(super) fn infer(op: &Operator, inputs: &[Tensor]) -> InferResult {
    expect_arity(inputs, 2)?;
    let data = &inputs[0];
    let targets = index_values(&inputs[1])?;
    let allowzero = op.int_or("allowzero", 0)? != 0;

    let mut shape = Shape::new();
    let mut inferred_at = None;
    for (position, &target) in targets.iter().enumerate() {
        match target {
            -1 => {
                if inferred_at.is_some() {
                    return Err(InferError::ShapeMismatch(
                        "reshape allows at most one -1 entry".to_string(),
                    ));
                }
                inferred_at = Some(position);
                shape.push(DimExpr::Value(1));
            }
            0 if !allowzero => {
                let dim = data.shape.get(position).ok_or_else(|| {
                    InferError::ShapeMismatch(format!(
                        "reshape entry {position} copies a nonexistent input dimension"
                    ))
                })?;
                shape.push(dim.clone());
            }
            value if value >= 0 => shape.push(DimExpr::Value(value)),
            value => {
                return Err(InferError::ShapeMismatch(format!(
                    "invalid reshape entry {value}"
                )))
            }
        }
    }

    if let Some(position) = inferred_at {
        let mut total = 1i64;
        for dim in &data.shape {
            total *= dim_value(dim)?;
        }
        let mut known = 1i64;
        for (i, dim) in shape.iter().enumerate() {
            if i != position {
                known *= dim_value(dim)?;
            }
        }
        if known == 0 || total % known != 0 {
            return Err(InferError::ShapeMismatch(format!(
                "cannot infer reshape dimension: {total} elements over {known}"
            )));
        }
        shape[position] = DimExpr::Value(total / known);
    } else {
        // Element counts must agree whenever both sides are resolvable.
        let have = data
            .shape
            .iter()
            .map(DimExpr::value)
            .try_fold(1i64, |acc, v| v.map(|v| acc * v));
        let want = shape
            .iter()
            .map(DimExpr::value)
            .try_fold(1i64, |acc, v| v.map(|v| acc * v));
        if let (Some(have), Some(want)) = (have, want) {
            if have != want {
                return Err(InferError::ShapeMismatch(format!(
                    "reshape changes the element count: {have} to {want}"
                )));
            }
        }
    }

    let mut ans = Tensor::new(data.data_type, shape);
    if should_calculate(inputs, &ans.shape) {
        // Same element count and layout; the payload is shared as-is.
        ans.data = data.data.clone();
    }
    Ok(vec![ans])
}

pub(super) fn collector(_op: &Operator, target: Target) -> CollectorBox {
    Box::new(NoCandidates { target })
}
