//! Inserts size-1 dimensions at the requested axes.

use crate::kernel::collectors::NoCandidates;
use crate::kernel::{CollectorBox, Target};
use crate::tensor::{DimExpr, Shape, Tensor};

use super::support::{expect_arity_range, index_values, normalize_axis, should_calculate};
use super::{InferError, InferResult, Operator};

pub(super) fn infer(op: &Operator, inputs: &[Tensor]) -> InferResult {
    expect_arity_range(inputs, 1, 2)?;
    let data = &inputs[0];
    let axes = if inputs.len() == 2 {
        index_values(&inputs[1])?
    } else {
        op.attribute("axes")?.ints()?.to_vec()
    };

    let out_rank = data.rank() + axes.len();
    let mut inserted = vec![false; out_rank];
    for axis in axes {
        let axis = normalize_axis(axis, out_rank)?;
        if inserted[axis] {
            return Err(InferError::ShapeMismatch(format!(
                "duplicate unsqueeze axis {axis}"
            )));
        }
        inserted[axis] = true;
    }

    let mut shape = Shape::new();
    let mut source = data.shape.iter();
    for slot in inserted {
        if slot {
            shape.push(DimExpr::Value(1));
        } else {
            shape.push(
                source
                    .next()
                    .ok_or_else(|| InferError::Internal("unsqueeze ran out of dims".to_string()))?
                    .clone(),
            );
        }
    }

    let mut ans = Tensor::new(data.data_type, shape);
    if should_calculate(inputs, &ans.shape) {
        ans.data = data.data.clone();
    }
    Ok(vec![ans])
}

pub(super) fn collector(_op: &Operator, target: Target) -> CollectorBox {
    Box::new(NoCandidates { target })
}
