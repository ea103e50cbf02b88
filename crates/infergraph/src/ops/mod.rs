//! Operator model, the process-wide operator registry, and the per-operator
//! shape-inference routines.

mod operator;
mod registry;
pub(crate) mod support;

mod arithmetic;
mod batch_normalization;
mod cast;
mod compare;
mod concat;
mod constant;
mod constant_of_shape;
mod conv;
mod cum_sum;
mod einsum;
mod expand;
mod gather;
mod gather_elements;
mod gemm;
mod global_pool;
mod mat_mul;
mod pool;
mod range;
mod reduce;
mod reshape;
mod select;
mod shape;
mod slice;
mod softmax;
mod split;
mod squeeze;
mod tile;
mod transpose;
mod unary;
mod unsqueeze;
mod where_op;

use std::sync::Once;

use thiserror::Error;

use crate::tensor::Tensor;

pub use operator::{Attribute, Operator};
pub use registry::{register, CollectorFactory, InferFn, OpType};

/// Inference failure taxonomy. `UnknownVariable` is recoverable: the engine
/// accumulates it and keeps walking; every other kind aborts the graph.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum InferError {
    #[error("unknown variable {0}")]
    UnknownVariable(String),
    #[error("shape mismatch: {0}")]
    ShapeMismatch(String),
    #[error("data type not supported: {0}")]
    TypeUnsupported(String),
    #[error("required attribute {0} is missing")]
    AttributeMissing(String),
    #[error("attribute type error: {0}")]
    AttributeType(String),
    #[error("out of range: {0}")]
    OutOfRange(String),
    #[error("internal error: {0}")]
    Internal(String),
}

pub type InferResult = Result<Vec<Tensor>, InferError>;

static REGISTER: Once = Once::new();

/// Registers the full `onnx::` operator catalog.
///
/// Must run before the first `OpType::parse`; repeated calls are no-ops, so
/// every entry point (tests included) can call it defensively. This is the
/// bounded initialization window of the registry: after the first call
/// returns, the repository is only ever read.
pub fn register_all() {
    REGISTER.call_once(|| {
        register("onnx::BatchNormalization", batch_normalization::infer, batch_normalization::collector);
        register("onnx::Cast", cast::infer, cast::collector);
        register("onnx::Equal", compare::infer, compare::collector);
        register("onnx::Greater", compare::infer, compare::collector);
        register("onnx::GreaterOrEqual", compare::infer, compare::collector);
        register("onnx::Less", compare::infer, compare::collector);
        register("onnx::LessOrEqual", compare::infer, compare::collector);
        register("onnx::Concat", concat::infer, concat::collector);
        register("onnx::Constant", constant::infer, constant::collector);
        register("onnx::ConstantOfShape", constant_of_shape::infer, constant_of_shape::collector);
        register("onnx::Conv", conv::infer, conv::collector);
        register("onnx::CumSum", cum_sum::infer, cum_sum::collector);
        register("onnx::Einsum", einsum::infer, einsum::collector);
        register("onnx::Expand", expand::infer, expand::collector);
        register("onnx::Gather", gather::infer, gather::collector);
        register("onnx::GatherElements", gather_elements::infer, gather_elements::collector);
        register("onnx::Gemm", gemm::infer, gemm::collector);
        register("onnx::GlobalAveragePool", global_pool::infer, global_pool::collector);
        register("onnx::GlobalLpPool", global_pool::infer, global_pool::collector);
        register("onnx::GlobalMaxPool", global_pool::infer, global_pool::collector);
        register("onnx::MatMul", mat_mul::infer, mat_mul::collector);
        register("onnx::AveragePool", pool::infer, pool::collector);
        register("onnx::LpPool", pool::infer, pool::collector);
        register("onnx::MaxPool", pool::infer, pool::collector);
        register("onnx::Range", range::infer, range::collector);
        register("onnx::ReduceMean", reduce::infer, reduce::collector);
        register("onnx::ReduceL1", reduce::infer, reduce::collector);
        register("onnx::ReduceL2", reduce::infer, reduce::collector);
        register("onnx::ReduceLogSum", reduce::infer, reduce::collector);
        register("onnx::ReduceLogSumExp", reduce::infer, reduce::collector);
        register("onnx::ReduceMax", reduce::infer, reduce::collector);
        register("onnx::ReduceMin", reduce::infer, reduce::collector);
        register("onnx::ReduceProd", reduce::infer, reduce::collector);
        register("onnx::ReduceSum", reduce::infer, reduce::collector);
        register("onnx::ReduceSumSquare", reduce::infer, reduce::collector);
        register("onnx::Reshape", reshape::infer, reshape::collector);
        register("onnx::Max", select::infer, select::collector);
        register("onnx::Min", select::infer, select::collector);
        register("onnx::Shape", shape::infer, shape::collector);
        register("onnx::Add", arithmetic::infer, arithmetic::collector);
        register("onnx::Sub", arithmetic::infer, arithmetic::collector);
        register("onnx::Mul", arithmetic::infer, arithmetic::collector);
        register("onnx::Div", arithmetic::infer, arithmetic::collector);
        register("onnx::Pow", arithmetic::infer, arithmetic::collector);
        register("onnx::And", arithmetic::infer, arithmetic::collector);
        register("onnx::Or", arithmetic::infer, arithmetic::collector);
        register("onnx::Xor", arithmetic::infer, arithmetic::collector);
        register("onnx::Abs", unary::infer, unary::collector);
        register("onnx::Acos", unary::infer, unary::collector);
        register("onnx::Acosh", unary::infer, unary::collector);
        register("onnx::Asin", unary::infer, unary::collector);
        register("onnx::Asinh", unary::infer, unary::collector);
        register("onnx::Atan", unary::infer, unary::collector);
        register("onnx::Atanh", unary::infer, unary::collector);
        register("onnx::Cos", unary::infer, unary::collector);
        register("onnx::Cosh", unary::infer, unary::collector);
        register("onnx::Sin", unary::infer, unary::collector);
        register("onnx::Sinh", unary::infer, unary::collector);
        register("onnx::Tan", unary::infer, unary::collector);
        register("onnx::Tanh", unary::infer, unary::collector);
        register("onnx::Relu", unary::infer, unary::collector);
        register("onnx::Sqrt", unary::infer, unary::collector);
        register("onnx::Sigmoid", unary::infer, unary::collector);
        register("onnx::Erf", unary::infer, unary::collector);
        register("onnx::Log", unary::infer, unary::collector);
        register("onnx::Not", unary::infer, unary::collector);
        register("onnx::Neg", unary::infer, unary::collector);
        register("onnx::Identity", unary::infer, unary::collector);
        register("onnx::Slice", slice::infer, slice::collector);
        register("onnx::Softmax", softmax::infer, softmax::collector);
        register("onnx::Split", split::infer, split::collector);
        register("onnx::Squeeze", squeeze::infer, squeeze::collector);
        register("onnx::Tile", tile::infer, tile::collector);
        register("onnx::Transpose", transpose::infer, transpose::collector);
        register("onnx::Unsqueeze", unsqueeze::infer, unsqueeze::collector);
        register("onnx::Where", where_op::infer, where_op::collector);
    });
}
