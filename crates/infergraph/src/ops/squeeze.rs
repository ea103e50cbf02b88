//! Removes size-1 dimensions, either the listed axes or all of them.

use crate::kernel::collectors::NoCandidates;
use crate::kernel::{CollectorBox, Target};
use crate::tensor::{Shape, Tensor};

use super::support::{dim_value, expect_arity_range, index_values, normalize_axis, should_calculate};
use super::{InferError, InferResult, Operator};

pub(super) fn infer(op: &Operator, inputs: &[Tensor]) -> InferResult {
    expect_arity_range(inputs, 1, 2)?;
    let data = &inputs[0];
    let rank = data.rank();

    let axes = if inputs.len() == 2 {
        Some(index_values(&inputs[1])?)
    } else {
        op.ints_opt("axes")?.map(<[i64]>::to_vec)
    };

    let mut shape = Shape::new();
    match axes {
        Some(axes) => {
            let mut drop = vec![false; rank];
            for axis in axes {
                drop[normalize_axis(axis, rank)?] = true;
            }
            for (position, dim) in data.shape.iter().enumerate() {
                if drop[position] {
                    if dim_value(dim)? != 1 {
                        return Err(InferError::ShapeMismatch(format!(
                            "cannot squeeze non-1 dimension at axis {position}"
                        )));
                    }
                } else {
                    shape.push(dim.clone());
                }
            }
        }
        None => {
            for dim in &data.shape {
                if dim_value(dim)? != 1 {
                    shape.push(dim.clone());
                }
            }
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
