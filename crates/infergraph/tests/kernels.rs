use std::collections::HashMap;

use infergraph::kernel::collectors::{SimpleBinaryCollector, SimpleUnaryCollector};
use infergraph::kernel::{BinaryOp, Collector, Resources, Target, UnaryOp};
use infergraph::ops::{register_all, OpType, Operator};
use infergraph::tensor::{DataType, Tensor};

fn f32s(bytes: &[u8]) -> Vec<f32> {
    bytes
        .chunks_exact(4)
        .map(|chunk| f32::from_le_bytes(chunk.try_into().unwrap()))
        .collect()
}

#[test]
fn binary_collector_lowers_a_broadcast_kernel() {
    let a = Tensor::from_f32(&[2, 1], vec![1.0, 2.0]).unwrap();
    let b = Tensor::from_f32(&[3], vec![10.0, 20.0, 30.0]).unwrap();
    let out_spec = Tensor::new(
        DataType::F32,
        [2i64, 3].iter().map(|&d| d.into()).collect(),
    );

    let collector = SimpleBinaryCollector {
        target: Target::Cpu,
        op: BinaryOp::Add,
    };
    let kernels = collector.filter(&[&a, &b], &[&out_spec]);
    assert_eq!(kernels.len(), 1);
    assert_eq!(kernels[0].name(), "simple_binary_cpu");

    let resources = Resources::default();
    let routine = kernels[0].lower(&resources);
    let mut out = vec![0u8; 6 * 4];
    routine(
        &resources,
        &[
            a.data.as_ref().unwrap().as_ref(),
            b.data.as_ref().unwrap().as_ref(),
        ],
        &mut [out.as_mut_slice()],
    );
    assert_eq!(
        f32s(&out),
        vec![11.0, 21.0, 31.0, 12.0, 22.0, 32.0]
    );
}

#[test]
fn unary_collector_lowers_a_map_kernel() {
    let input = Tensor::from_f32(&[4], vec![-1.0, 0.0, 2.0, -3.5]).unwrap();
    let out_spec = Tensor::new(DataType::F32, [4i64].iter().map(|&d| d.into()).collect());

    let collector = SimpleUnaryCollector {
        target: Target::Cpu,
        op: UnaryOp::Relu,
    };
    let kernels = collector.filter(&[&input], &[&out_spec]);
    assert_eq!(kernels.len(), 1);

    let resources = Resources::default();
    let routine = kernels[0].lower(&resources);
    let mut out = vec![0u8; 16];
    routine(
        &resources,
        &[input.data.as_ref().unwrap().as_ref()],
        &mut [out.as_mut_slice()],
    );
    assert_eq!(f32s(&out), vec![0.0, 0.0, 2.0, 0.0]);
}

#[test]
fn gpu_target_has_no_linked_kernels() {
    let a = Tensor::from_f32(&[2], vec![1.0, 2.0]).unwrap();
    let out_spec = Tensor::new(DataType::F32, [2i64].iter().map(|&d| d.into()).collect());
    let collector = SimpleBinaryCollector {
        target: Target::NvidiaGpu,
        op: BinaryOp::Mul,
    };
    assert!(collector.filter(&[&a, &a], &[&out_spec]).is_empty());
}

#[test]
fn operators_dispatch_their_collector_factories() {
    register_all();
    let a = Tensor::from_f32(&[2], vec![1.0, 2.0]).unwrap();
    let out_spec = Tensor::new(DataType::F32, [2i64].iter().map(|&d| d.into()).collect());

    let add = Operator::new(OpType::parse("onnx::Add"), HashMap::new());
    let collector = add.candidate_kernels(Target::Cpu);
    assert_eq!(collector.filter(&[&a, &a], &[&out_spec]).len(), 1);

    let relu = Operator::new(OpType::parse("onnx::Relu"), HashMap::new());
    let collector = relu.candidate_kernels(Target::Cpu);
    assert_eq!(collector.filter(&[&a], &[&out_spec]).len(), 1);

    // Families whose kernels live out of tree enumerate nothing yet.
    let softmax = Operator::new(OpType::parse("onnx::Softmax"), HashMap::new());
    let collector = softmax.candidate_kernels(Target::Cpu);
    assert!(collector.filter(&[&a], &[&out_spec]).is_empty());
}

#[test]
fn unsupported_element_kinds_yield_no_candidates() {
    let shape = [2i64].iter().map(|&d| d.into()).collect();
    let a = Tensor::new(DataType::FP16, shape);
    let out_spec = a.clone();
    let collector = SimpleBinaryCollector {
        target: Target::Cpu,
        op: BinaryOp::Add,
    };
    assert!(collector.filter(&[&a, &a], &[&out_spec]).is_empty());
}
