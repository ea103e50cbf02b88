//! The ten reduce variants share this routine; the kind is recovered from the
//! registered name.

use crate::kernel::collectors::NoCandidates;
use crate::kernel::{CollectorBox, Target};
use crate::tensor::{DimExpr, Shape, Tensor};

use super::support::{expect_arity_range, index_values, normalize_axis};
use super::{InferError, InferResult, Operator};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ReduceKind {
    Mean,
    L1,
    L2,
    LogSum,
    LogSumExp,
    Max,
    Min,
    Prod,
    Sum,
    SumSquare,
}

fn reduce_kind(name: &str) -> Option<ReduceKind> {
    match name {
        "onnx::ReduceMean" => Some(ReduceKind::Mean),
        "onnx::ReduceL1" => Some(ReduceKind::L1),
        "onnx::ReduceL2" => Some(ReduceKind::L2),
        "onnx::ReduceLogSum" => Some(ReduceKind::LogSum),
        "onnx::ReduceLogSumExp" => Some(ReduceKind::LogSumExp),
        "onnx::ReduceMax" => Some(ReduceKind::Max),
        "onnx::ReduceMin" => Some(ReduceKind::Min),
        "onnx::ReduceProd" => Some(ReduceKind::Prod),
        "onnx::ReduceSum" => Some(ReduceKind::Sum),
        "onnx::ReduceSumSquare" => Some(ReduceKind::SumSquare),
        _ => None,
    }
}

pub(super) fn infer(op: &Operator, inputs: &[Tensor]) -> InferResult {
    expect_arity_range(inputs, 1, 2)?;
    reduce_kind(op.op_type.name())
        .ok_or_else(|| InferError::Internal("not a reduce operator".to_string()))?;
    let data = &inputs[0];
    if !data.data_type.is_numeric() {
        return Err(InferError::TypeUnsupported(format!(
            "{} over {}",
            op.op_type.name(),
            data.data_type.name()
        )));
    }
    let rank = data.rank();
    let keepdims = op.int_or("keepdims", 1)? != 0;
    let noop_with_empty_axes = op.int_or("noop_with_empty_axes", 0)? != 0;

    let axes: Option<Vec<i64>> = if inputs.len() == 2 {
        Some(index_values(&inputs[1])?)
    } else {
        op.ints_opt("axes")?.map(<[i64]>::to_vec)
    };

    let mut reduced = vec![false; rank];
    match axes {
        Some(axes) if !axes.is_empty() => {
            for axis in axes {
                reduced[normalize_axis(axis, rank)?] = true;
            }
        }
        _ if noop_with_empty_axes => {}
        _ => reduced.fill(true),
    }

    let mut shape = Shape::new();
    for (dim, &gone) in data.shape.iter().zip(&reduced) {
        if !gone {
            shape.push(dim.clone());
        } else if keepdims {
            shape.push(DimExpr::Value(1));
        }
    }
    Ok(vec![Tensor::new(data.data_type, shape)])
}

pub(super) fn collector(_op: &Operator, target: Target) -> CollectorBox {
    Box::new(NoCandidates { target })
}
