//! Gather along one axis of the data tensor.

use std::sync::Arc;

use rayon::prelude::*;

use crate::kernel::collectors::NoCandidates;
use crate::kernel::{CollectorBox, Target};
use crate::tensor::{DataType, Shape, Tensor};

use super::support::{
    concrete_dims, expect_arity, index_values, locate_n, normalize_axis, should_calculate,
};
use super::{InferError, InferResult, Operator};

/// Output shape is `data[:axis] ++ indices ++ data[axis+1:]`. Folding copies
/// element slices in parallel; every output position is written by exactly
/// one task, so the loop is data-parallel with no shared mutable state.
pub(super) fn infer(op: &Operator, inputs: &[Tensor]) -> InferResult {
    expect_arity(inputs, 2)?;
    let (data, indices) = (&inputs[0], &inputs[1]);
    if !matches!(indices.data_type, DataType::I32 | DataType::I64) {
        return Err(InferError::TypeUnsupported(format!(
            "gather indices must be I32 or I64, got {}",
            indices.data_type.name()
        )));
    }
    let rank = data.rank();
    let axis = normalize_axis(op.int_or("axis", 0)?, rank)?;

    let mut shape = Shape::new();
    shape.extend(data.shape[..axis].iter().cloned());
    shape.extend(indices.shape.iter().cloned());
    shape.extend(data.shape[axis + 1..].iter().cloned());
    let mut ans = Tensor::new(data.data_type, shape);
    if !should_calculate(inputs, &ans.shape) {
        return Ok(vec![ans]);
    }

    let out_dims = concrete_dims(&ans.shape)?;
    let data_dims = concrete_dims(&data.shape)?;
    let idx_dims = concrete_dims(&indices.shape)?;
    let idx_values = index_values(indices)?;
    let q = idx_dims.len();
    let ele = data.data_type.size();
    let total: usize = out_dims.iter().product();
    let src = data.data.as_ref().unwrap();

    let mut out = vec![0u8; total * ele];
    out.par_chunks_mut(ele.max(1))
        .enumerate()
        .try_for_each(|(i, dst)| -> Result<(), InferError> {
            let coords = locate_n(&out_dims, i);

            let mut ii = 0usize;
            let mut mul = 1usize;
            for j in (axis..axis + q).rev() {
                ii += coords[j] * mul;
                mul *= idx_dims[j - axis];
            }
            let mut index = idx_values[ii];
            if index < 0 {
                index += data_dims[axis] as i64;
            }
            if index < 0 || index >= data_dims[axis] as i64 {
                return Err(InferError::OutOfRange(format!(
                    "gather index {index} outside dimension {}",
                    data_dims[axis]
                )));
            }

            let mut offset = 0usize;
            let mut mul = 1usize;
            for j in (axis + q..out_dims.len()).rev() {
                offset += coords[j] * mul;
                mul *= data_dims[j - q + 1];
            }
            offset += index as usize * mul;
            mul *= data_dims[axis];
            for j in (0..axis).rev() {
                offset += coords[j] * mul;
                mul *= data_dims[j];
            }

            dst.copy_from_slice(&src[offset * ele..(offset + 1) * ele]);
            Ok(())
        })?;

    ans.data = Some(Arc::from(out.into_boxed_slice()));
    Ok(vec![ans])
}

pub(super) fn collector(_op: &Operator, target: Target) -> CollectorBox {
    Box::new(NoCandidates { target })
}
