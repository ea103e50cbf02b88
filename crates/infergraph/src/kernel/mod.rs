//! Kernel selection layer: hardware targets, candidate collectors, and the
//! lowering contract backend kernels implement.

mod broadcaster;
pub mod collectors;
mod kernels;

pub use broadcaster::{BroadcastError, Broadcaster};
pub use kernels::{BinaryBroadcastCpu, UnaryContiguousCpu};

use serde::{Deserialize, Serialize};

use crate::tensor::Tensor;

/// Hardware targets kernels can be lowered for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Target {
    Cpu,
    NvidiaGpu,
}

/// Element-wise binary operation kinds served by the simple-binary family.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BinaryOp {
    Add,
    Sub,
    Mul,
    Div,
    Pow,
    And,
    Or,
    Xor,
}

/// Element-wise unary operation kinds served by the simple-unary family.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum UnaryOp {
    Abs,
    Acos,
    Acosh,
    Asin,
    Asinh,
    Atan,
    Atanh,
    Cos,
    Cosh,
    Sin,
    Sinh,
    Tan,
    Tanh,
    Relu,
    Sqrt,
    Sigmoid,
    Erf,
    Log,
    Not,
    Neg,
    Identity,
}

/// Runtime resources a lowered routine may draw on (scratch allocators,
/// streams). The reference CPU kernels need none; the type exists so the
/// `lower` contract is stable across backends.
#[derive(Debug, Default)]
pub struct Resources;

/// A lowered, immediately-callable compute routine. Inputs are borrowed byte
/// payloads; outputs are caller-allocated buffers filled in place.
pub type Routine = Box<dyn Fn(&Resources, &[&[u8]], &mut [&mut [u8]]) + Send + Sync>;

/// An opaque lowerable unit produced by a collector.
pub trait Kernel: Send + Sync {
    /// Stable kernel identifier for logs and selection policies.
    fn name(&self) -> &'static str;

    /// Binds the kernel to runtime resources, yielding the executable routine.
    fn lower(&self, resources: &Resources) -> Routine;
}

pub type KernelBox = Box<dyn Kernel>;

/// Per-operator enumerator of backend kernel candidates.
///
/// `filter` receives the concrete input/output tensors of one node and
/// returns the candidates able to serve them, in preference order. Collectors
/// never allocate output buffers; selection among candidates is the caller's
/// concern.
pub trait Collector: Send + Sync {
    fn filter(&self, inputs: &[&Tensor], outputs: &[&Tensor]) -> Vec<KernelBox>;
}

pub type CollectorBox = Box<dyn Collector>;
