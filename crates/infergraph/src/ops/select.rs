//! N-ary element-wise Max/Min over a shared broadcast shape.

use std::sync::Arc;

use crate::kernel::collectors::NoCandidates;
use crate::kernel::{CollectorBox, Target};
use crate::tensor::{read_at, DataType, Tensor};

use super::support::{concrete_dims, locate_1, locate_n, multidir_broadcast, should_calculate};
use super::{InferError, InferResult, Operator};

#[derive(Clone, Copy)]
enum SelectOp {
    Max,
    Min,
}

fn select_op(name: &str) -> Option<SelectOp> {
    match name {
        "onnx::Max" => Some(SelectOp::Max),
        "onnx::Min" => Some(SelectOp::Min),
        _ => None,
    }
}

fn fold<T: Copy + PartialOrd>(
    kind: SelectOp,
    inputs: &[Tensor],
    dims: &[Vec<usize>],
    out_dims: &[usize],
) -> Vec<u8> {
    let total: usize = out_dims.iter().product();
    let mut out: Vec<T> = Vec::with_capacity(total);
    for k in 0..total {
        let coords = locate_n(out_dims, k);
        let mut best: Option<T> = None;
        for (input, input_dims) in inputs.iter().zip(dims) {
            let value: T = read_at(input.data.as_ref().unwrap(), locate_1(input_dims, &coords));
            best = Some(match best {
                None => value,
                Some(current) => match kind {
                    SelectOp::Max if value > current => value,
                    SelectOp::Min if value < current => value,
                    _ => current,
                },
            });
        }
        out.push(best.expect("select requires at least one input"));
    }
    crate::tensor::as_bytes(&out).to_vec()
}

pub(super) fn infer(op: &Operator, inputs: &[Tensor]) -> InferResult {
    if inputs.is_empty() {
        return Err(InferError::ShapeMismatch(
            "select requires at least one input".to_string(),
        ));
    }
    let kind = select_op(op.op_type.name())
        .ok_or_else(|| InferError::Internal("not a select operator".to_string()))?;
    let dtype = inputs[0].data_type;
    if !dtype.is_numeric() || inputs.iter().any(|t| t.data_type != dtype) {
        return Err(InferError::TypeUnsupported(format!(
            "{} requires one shared numeric type",
            op.op_type.name()
        )));
    }

    let shapes: Vec<_> = inputs.iter().map(|t| &t.shape).collect();
    let shape = multidir_broadcast(&shapes)?;
    let mut ans = Tensor::new(dtype, shape);
    if !should_calculate(inputs, &ans.shape) {
        return Ok(vec![ans]);
    }

    let out_dims = concrete_dims(&ans.shape)?;
    let dims = inputs
        .iter()
        .map(|t| concrete_dims(&t.shape))
        .collect::<Result<Vec<_>, _>>()?;
    let bytes = match dtype {
        DataType::F32 => fold::<f32>(kind, inputs, &dims, &out_dims),
        DataType::F64 => fold::<f64>(kind, inputs, &dims, &out_dims),
        DataType::I8 => fold::<i8>(kind, inputs, &dims, &out_dims),
        DataType::I16 => fold::<i16>(kind, inputs, &dims, &out_dims),
        DataType::I32 => fold::<i32>(kind, inputs, &dims, &out_dims),
        DataType::I64 => fold::<i64>(kind, inputs, &dims, &out_dims),
        DataType::U8 => fold::<u8>(kind, inputs, &dims, &out_dims),
        DataType::U16 => fold::<u16>(kind, inputs, &dims, &out_dims),
        DataType::U32 => fold::<u32>(kind, inputs, &dims, &out_dims),
        DataType::U64 => fold::<u64>(kind, inputs, &dims, &out_dims),
        _ => return Ok(vec![ans]),
    };
    ans.data = Some(Arc::from(bytes.into_boxed_slice()));
    Ok(vec![ans])
}

pub(super) fn collector(_op: &Operator, target: Target) -> CollectorBox {
    Box::new(NoCandidates { target })
}
