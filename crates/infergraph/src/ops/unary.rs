//! The simple-unary family: trigonometry, activations, Not, Neg, Identity.

use std::sync::Arc;

use crate::kernel::collectors::{NoCandidates, SimpleUnaryCollector};
use crate::kernel::{Collector, CollectorBox, Resources, Target, UnaryOp};
use crate::tensor::Tensor;

use super::support::{expect_arity, should_calculate};
use super::{InferError, InferResult, Operator};

fn unary_op(name: &str) -> Option<UnaryOp> {
    let kind = match name {
        "onnx::Abs" => UnaryOp::Abs,
        "onnx::Acos" => UnaryOp::Acos,
        "onnx::Acosh" => UnaryOp::Acosh,
        "onnx::Asin" => UnaryOp::Asin,
        "onnx::Asinh" => UnaryOp::Asinh,
        "onnx::Atan" => UnaryOp::Atan,
        "onnx::Atanh" => UnaryOp::Atanh,
        "onnx::Cos" => UnaryOp::Cos,
        "onnx::Cosh" => UnaryOp::Cosh,
        "onnx::Sin" => UnaryOp::Sin,
        "onnx::Sinh" => UnaryOp::Sinh,
        "onnx::Tan" => UnaryOp::Tan,
        "onnx::Tanh" => UnaryOp::Tanh,
        "onnx::Relu" => UnaryOp::Relu,
        "onnx::Sqrt" => UnaryOp::Sqrt,
        "onnx::Sigmoid" => UnaryOp::Sigmoid,
        "onnx::Erf" => UnaryOp::Erf,
        "onnx::Log" => UnaryOp::Log,
        "onnx::Not" => UnaryOp::Not,
        "onnx::Neg" => UnaryOp::Neg,
        "onnx::Identity" => UnaryOp::Identity,
        _ => return None,
    };
    Some(kind)
}

fn type_allowed(kind: UnaryOp, input: &Tensor) -> bool {
    let dtype = input.data_type;
    match kind {
        UnaryOp::Identity => true,
        UnaryOp::Not => dtype.is_bool(),
        UnaryOp::Abs => dtype.is_numeric(),
        UnaryOp::Neg => dtype.is_signed(),
        _ => dtype.is_float(),
    }
}

/// Output mirrors the input's type and shape. Identity folds by sharing the
/// payload; everything else folds through the CPU unary kernel when the
/// element kind is supported there.
pub(super) fn infer(op: &Operator, inputs: &[Tensor]) -> InferResult {
    expect_arity(inputs, 1)?;
    let kind = unary_op(op.op_type.name())
        .ok_or_else(|| InferError::Internal("not a simple-unary operator".to_string()))?;
    let input = &inputs[0];
    if !type_allowed(kind, input) {
        return Err(InferError::TypeUnsupported(format!(
            "{} over {}",
            op.op_type.name(),
            input.data_type.name()
        )));
    }

    let mut ans = Tensor::new(input.data_type, input.shape.clone());
    if !should_calculate(inputs, &ans.shape) {
        return Ok(vec![ans]);
    }
    if kind == UnaryOp::Identity {
        ans.data = input.data.clone();
        return Ok(vec![ans]);
    }

    let bytes = ans
        .bytes_size()
        .ok_or_else(|| InferError::Internal("fold gate admitted symbolic shape".to_string()))?;
    let collector = SimpleUnaryCollector {
        target: Target::Cpu,
        op: kind,
    };
    if let Some(kernel) = collector.filter(&[input], &[&ans]).into_iter().next() {
        let resources = Resources::default();
        let routine = kernel.lower(&resources);
        let mut out = vec![0u8; bytes];
        let data = input.data.as_ref().unwrap();
        routine(&resources, &[data.as_ref()], &mut [out.as_mut_slice()]);
        ans.data = Some(Arc::from(out.into_boxed_slice()));
    }
    Ok(vec![ans])
}

pub(super) fn collector(op: &Operator, target: Target) -> CollectorBox {
    match unary_op(op.op_type.name()) {
        Some(kind) => Box::new(SimpleUnaryCollector { target, op: kind }),
        None => Box::new(NoCandidates { target }),
    }
}
