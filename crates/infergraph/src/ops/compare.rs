//! Broadcasting comparisons producing Bool tensors.

use std::sync::Arc;

use crate::kernel::collectors::NoCandidates;
use crate::kernel::{CollectorBox, Target};
use crate::tensor::{read_at, DataType, Tensor};

use super::support::{
    concrete_dims, expect_arity, locate_1, locate_n, multidir_broadcast, should_calculate,
};
use super::{InferError, InferResult, Operator};

#[derive(Clone, Copy, PartialEq, Eq)]
enum CompareOp {
    Equal,
    Greater,
    GreaterOrEqual,
    Less,
    LessOrEqual,
}

fn compare_op(name: &str) -> Option<CompareOp> {
    match name {
        "onnx::Equal" => Some(CompareOp::Equal),
        "onnx::Greater" => Some(CompareOp::Greater),
        "onnx::GreaterOrEqual" => Some(CompareOp::GreaterOrEqual),
        "onnx::Less" => Some(CompareOp::Less),
        "onnx::LessOrEqual" => Some(CompareOp::LessOrEqual),
        _ => None,
    }
}

fn fold<T: Copy + PartialOrd>(
    kind: CompareOp,
    a: &Tensor,
    b: &Tensor,
    a_dims: &[usize],
    b_dims: &[usize],
    out_dims: &[usize],
) -> Vec<u8> {
    let total = out_dims.iter().product();
    let a_data = a.data.as_ref().unwrap();
    let b_data = b.data.as_ref().unwrap();
    let mut out = vec![0u8; total];
    for (k, slot) in out.iter_mut().enumerate() {
        let coords = locate_n(out_dims, k);
        let x: T = read_at(a_data, locate_1(a_dims, &coords));
        let y: T = read_at(b_data, locate_1(b_dims, &coords));
        *slot = match kind {
            CompareOp::Equal => x == y,
            CompareOp::Greater => x > y,
            CompareOp::GreaterOrEqual => x >= y,
            CompareOp::Less => x < y,
            CompareOp::LessOrEqual => x <= y,
        } as u8;
    }
    out
}

pub(super) fn infer(op: &Operator, inputs: &[Tensor]) -> InferResult {
    expect_arity(inputs, 2)?;
    let kind = compare_op(op.op_type.name())
        .ok_or_else(|| InferError::Internal("not a comparison operator".to_string()))?;
    let (a, b) = (&inputs[0], &inputs[1]);
    let dtype = a.data_type;
    let type_ok = dtype.is_numeric() || (dtype.is_bool() && kind == CompareOp::Equal);
    if !type_ok || b.data_type != dtype {
        return Err(InferError::TypeUnsupported(format!(
            "{} over {} and {}",
            op.op_type.name(),
            dtype.name(),
            b.data_type.name()
        )));
    }

    let shape = multidir_broadcast(&[&a.shape, &b.shape])?;
    let mut ans = Tensor::new(DataType::Bool, shape);
    if !should_calculate(inputs, &ans.shape) {
        return Ok(vec![ans]);
    }

    let out_dims = concrete_dims(&ans.shape)?;
    let a_dims = concrete_dims(&a.shape)?;
    let b_dims = concrete_dims(&b.shape)?;
    let bytes = match dtype {
        DataType::F32 => fold::<f32>(kind, a, b, &a_dims, &b_dims, &out_dims),
        DataType::F64 => fold::<f64>(kind, a, b, &a_dims, &b_dims, &out_dims),
        DataType::I8 => fold::<i8>(kind, a, b, &a_dims, &b_dims, &out_dims),
        DataType::I16 => fold::<i16>(kind, a, b, &a_dims, &b_dims, &out_dims),
        DataType::I32 => fold::<i32>(kind, a, b, &a_dims, &b_dims, &out_dims),
        DataType::I64 => fold::<i64>(kind, a, b, &a_dims, &b_dims, &out_dims),
        DataType::U8 | DataType::Bool => fold::<u8>(kind, a, b, &a_dims, &b_dims, &out_dims),
        DataType::U16 => fold::<u16>(kind, a, b, &a_dims, &b_dims, &out_dims),
        DataType::U32 => fold::<u32>(kind, a, b, &a_dims, &b_dims, &out_dims),
        DataType::U64 => fold::<u64>(kind, a, b, &a_dims, &b_dims, &out_dims),
        // FP16/BF16 comparisons propagate shape only.
        _ => return Ok(vec![ans]),
    };
    ans.data = Some(Arc::from(bytes.into_boxed_slice()));
    Ok(vec![ans])
}

pub(super) fn collector(_op: &Operator, target: Target) -> CollectorBox {
    Box::new(NoCandidates { target })
}
