//! Candidate collectors, one per operator family.

use crate::tensor::Tensor;

use super::kernels::{BinaryBroadcastCpu, UnaryContiguousCpu};
use super::{BinaryOp, Collector, KernelBox, Target, UnaryOp};

/// Enumerates kernels for Add/Sub/Mul/Div/Pow/And/Or/Xor.
pub struct SimpleBinaryCollector {
    pub target: Target,
    pub op: BinaryOp,
}

impl Collector for SimpleBinaryCollector {
    fn filter(&self, inputs: &[&Tensor], outputs: &[&Tensor]) -> Vec<KernelBox> {
        let mut ans = Vec::new();
        match self.target {
            Target::Cpu => {
                if let Some(kernel) = BinaryBroadcastCpu::build(self.op, inputs[0], inputs[1], outputs[0]) {
                    ans.push(kernel);
                }
            }
            Target::NvidiaGpu => {}
        }
        ans
    }
}

/// Enumerates kernels for the simple-unary family (Abs .. Identity).
pub struct SimpleUnaryCollector {
    pub target: Target,
    pub op: UnaryOp,
}

impl Collector for SimpleUnaryCollector {
    fn filter(&self, inputs: &[&Tensor], outputs: &[&Tensor]) -> Vec<KernelBox> {
        let mut ans = Vec::new();
        match self.target {
            Target::Cpu => {
                if let Some(kernel) = UnaryContiguousCpu::build(self.op, inputs[0], outputs[0]) {
                    ans.push(kernel);
                }
            }
            Target::NvidiaGpu => {}
        }
        ans
    }
}

/// Collector for operator families whose kernels live in backend crates that
/// are not linked here; it never yields candidates.
pub struct NoCandidates {
    pub target: Target,
}

impl Collector for NoCandidates {
    fn filter(&self, _inputs: &[&Tensor], _outputs: &[&Tensor]) -> Vec<KernelBox> {
        Vec::new()
    }
}
