//! Arithmetic sequence generator; all three operands must be constant scalars.

use std::sync::Arc;

use crate::kernel::collectors::NoCandidates;
use crate::kernel::{CollectorBox, Target};
use crate::tensor::{as_bytes, read_at, DataType, DimExpr, Shape, Tensor};

use super::support::expect_arity;
use super::{InferError, InferResult, Operator};

fn scalar_of(tensor: &Tensor, role: &str) -> Result<(), InferError> {
    if !tensor.has_data() {
        return Err(InferError::ShapeMismatch(format!(
            "range {role} must be constant"
        )));
    }
    if tensor.elements_size() != Some(1) {
        return Err(InferError::ShapeMismatch(format!(
            "range {role} must hold one element"
        )));
    }
    Ok(())
}

fn emit<T>(start: T, limit: T, delta: T) -> (i64, Vec<u8>)
where
    T: Copy + std::ops::Add<Output = T>,
    f64: From<T>,
{
    let span = f64::from(limit) - f64::from(start);
    let step = f64::from(delta);
    let count = if step == 0.0 {
        0
    } else {
        (span / step).ceil().max(0.0) as i64
    };
    let mut values: Vec<T> = Vec::with_capacity(count as usize);
    let mut current = start;
    for _ in 0..count {
        values.push(current);
        current = current + delta;
    }
    (count, as_bytes(&values).to_vec())
}

pub(super) fn infer(_op: &Operator, inputs: &[Tensor]) -> InferResult {
    expect_arity(inputs, 3)?;
    let (start, limit, delta) = (&inputs[0], &inputs[1], &inputs[2]);
    let dtype = start.data_type;
    if limit.data_type != dtype || delta.data_type != dtype {
        return Err(InferError::TypeUnsupported(
            "range operands must share one element type".to_string(),
        ));
    }
    scalar_of(start, "start")?;
    scalar_of(limit, "limit")?;
    scalar_of(delta, "delta")?;

    let s = start.data.as_ref().unwrap();
    let l = limit.data.as_ref().unwrap();
    let d = delta.data.as_ref().unwrap();
    let (count, bytes) = match dtype {
        DataType::F32 => emit::<f32>(read_at(s, 0), read_at(l, 0), read_at(d, 0)),
        DataType::F64 => emit::<f64>(read_at(s, 0), read_at(l, 0), read_at(d, 0)),
        DataType::I32 => emit::<i32>(read_at(s, 0), read_at(l, 0), read_at(d, 0)),
        DataType::I64 => {
            let (start, limit, delta) =
                (read_at::<i64>(s, 0), read_at::<i64>(l, 0), read_at::<i64>(d, 0));
            if delta == 0 {
                (0, Vec::new())
            } else {
                let count = ((limit - start) as f64 / delta as f64).ceil().max(0.0) as i64;
                let values: Vec<i64> = (0..count).map(|i| start + i * delta).collect();
                (count, as_bytes(&values).to_vec())
            }
        }
        other => {
            return Err(InferError::TypeUnsupported(format!(
                "range over {}",
                other.name()
            )))
        }
    };

    let shape: Shape = [DimExpr::Value(count)].into_iter().collect();
    let mut ans = Tensor::new(dtype, shape);
    ans.data = Some(Arc::from(bytes.into_boxed_slice()));
    Ok(vec![ans])
}

pub(super) fn collector(_op: &Operator, target: Target) -> CollectorBox {
    Box::new(NoCandidates { target })
}
