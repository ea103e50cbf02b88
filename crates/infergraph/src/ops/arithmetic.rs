//! Add/Sub/Mul/Div/Pow and the boolean connectives And/Or/Xor.

use std::sync::Arc;

use crate::kernel::collectors::{NoCandidates, SimpleBinaryCollector};
use crate::kernel::{BinaryOp, Collector, CollectorBox, Resources, Target};
use crate::tensor::Tensor;

use super::support::{expect_arity, multidir_broadcast, should_calculate};
use super::{InferError, InferResult, Operator};

fn binary_op(name: &str) -> Option<BinaryOp> {
    match name {
        "onnx::Add" => Some(BinaryOp::Add),
        "onnx::Sub" => Some(BinaryOp::Sub),
        "onnx::Mul" => Some(BinaryOp::Mul),
        "onnx::Div" => Some(BinaryOp::Div),
        "onnx::Pow" => Some(BinaryOp::Pow),
        "onnx::And" => Some(BinaryOp::And),
        "onnx::Or" => Some(BinaryOp::Or),
        "onnx::Xor" => Some(BinaryOp::Xor),
        _ => None,
    }
}

/// Output shape is the multidirectional broadcast of both operands. When both
/// operands are constant and the shape is concrete, the result is computed
/// through the same CPU kernel a backend would run, so folding and lowering
/// agree; element kinds the kernel cannot serve fold to shape-only outputs.
pub(super) fn infer(op: &Operator, inputs: &[Tensor]) -> InferResult {
    expect_arity(inputs, 2)?;
    let kind = binary_op(op.op_type.name())
        .ok_or_else(|| InferError::Internal("not a simple-binary operator".to_string()))?;
    let (a, b) = (&inputs[0], &inputs[1]);
    let dtype = a.data_type;
    let type_ok = match kind {
        BinaryOp::And | BinaryOp::Or | BinaryOp::Xor => dtype.is_bool(),
        _ => dtype.is_numeric(),
    };
    if !type_ok || b.data_type != dtype {
        return Err(InferError::TypeUnsupported(format!(
            "{} over {} and {}",
            op.op_type.name(),
            dtype.name(),
            b.data_type.name()
        )));
    }

    let shape = multidir_broadcast(&[&a.shape, &b.shape])?;
    let mut ans = Tensor::new(dtype, shape);
    if !should_calculate(inputs, &ans.shape) {
        return Ok(vec![ans]);
    }

    let bytes = ans
        .bytes_size()
        .ok_or_else(|| InferError::Internal("fold gate admitted symbolic shape".to_string()))?;
    let collector = SimpleBinaryCollector {
        target: Target::Cpu,
        op: kind,
    };
    if let Some(kernel) = collector.filter(&[a, b], &[&ans]).into_iter().next() {
        let resources = Resources::default();
        let routine = kernel.lower(&resources);
        let mut out = vec![0u8; bytes];
        let (a_data, b_data) = (a.data.as_ref().unwrap(), b.data.as_ref().unwrap());
        routine(
            &resources,
            &[a_data.as_ref(), b_data.as_ref()],
            &mut [out.as_mut_slice()],
        );
        ans.data = Some(Arc::from(out.into_boxed_slice()));
    }
    Ok(vec![ans])
}

pub(super) fn collector(op: &Operator, target: Target) -> CollectorBox {
    match binary_op(op.op_type.name()) {
        Some(kind) => Box::new(SimpleBinaryCollector { target, op: kind }),
        None => Box::new(NoCandidates { target }),
    }
}
