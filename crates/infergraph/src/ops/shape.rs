//! Materializes a tensor's shape as a constant I64 vector.

use crate::kernel::collectors::NoCandidates;
use crate::kernel::{CollectorBox, Target};
use crate::tensor::{as_bytes, DataType, DimExpr, Shape, Tensor};

use super::support::{dim_value, expect_arity};
use super::{InferError, InferResult, Operator};

/// The output always carries data, so unbound dimensions inside the selected
/// `start..end` window surface as `UnknownVariable`.
pub(super) fn infer(op: &Operator, inputs: &[Tensor]) -> InferResult {
    expect_arity(inputs, 1)?;
    let data = &inputs[0];
    let rank = data.rank() as i64;

    let clamp = |value: i64| -> i64 {
        let value = if value < 0 { value + rank } else { value };
        value.clamp(0, rank)
    };
    let start = clamp(op.int_or("start", 0)?);
    let end = clamp(op.int_or("end", rank)?);
    let window = &data.shape[start as usize..(end.max(start)) as usize];

    let values = window
        .iter()
        .map(dim_value)
        .collect::<Result<Vec<i64>, InferError>>()?;
    let shape: Shape = [DimExpr::Value(values.len() as i64)].into_iter().collect();
    let mut ans = Tensor::new(DataType::I64, shape);
    ans.data = Some(as_bytes(&values).to_vec().into_boxed_slice().into());
    Ok(vec![ans])
}

pub(super) fn collector(_op: &Operator, target: Target) -> CollectorBox {
    Box::new(NoCandidates { target })
}
