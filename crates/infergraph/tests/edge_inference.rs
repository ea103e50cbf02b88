use std::collections::HashMap;

use infergraph::graph::{Edge, Graph, GraphTopo, Node};
use infergraph::ops::{register_all, Attribute, OpType, Operator};
use infergraph::tensor::{DataType, DimExpr, Shape, Tensor};

fn operator(name: &str, attributes: &[(&str, Attribute)]) -> Operator {
    register_all();
    let attributes: HashMap<String, Attribute> = attributes
        .iter()
        .map(|(key, value)| (key.to_string(), value.clone()))
        .collect();
    Operator::new(OpType::parse(name), attributes)
}

fn dims(tensor: &Tensor) -> Vec<i64> {
    tensor
        .shape
        .iter()
        .map(|dim| dim.value().expect("dimension must be bound"))
        .collect()
}

fn i32_values(tensor: &Tensor) -> Vec<i32> {
    tensor
        .data
        .as_ref()
        .expect("tensor must carry data")
        .chunks_exact(4)
        .map(|chunk| i32::from_le_bytes(chunk.try_into().unwrap()))
        .collect()
}

#[test]
fn add_folds_broadcast_constants() {
    let a = Tensor::from_i32(&[3], vec![1, 2, 3]).unwrap();
    let b = Tensor::from_i32(&[2, 1], vec![10, 20]).unwrap();
    let topo = GraphTopo::new(3, vec![0, 1], vec![2], vec![vec![0, 1]], vec![vec![2]]).unwrap();
    let mut graph = Graph::new(
        topo,
        vec![Node::new(operator("onnx::Add", &[]), "add")],
        vec![
            Edge::with_tensor(a, "a"),
            Edge::with_tensor(b, "b"),
            Edge::new("sum"),
        ],
    )
    .unwrap();

    let unknown = graph.fill_edge_info().unwrap();
    assert!(unknown.is_empty());
    let out = graph.edges()[2].tensor.as_ref().unwrap();
    assert_eq!(out.data_type, DataType::I32);
    assert_eq!(dims(out), vec![2, 3]);
    assert_eq!(i32_values(out), vec![11, 12, 13, 21, 22, 23]);
}

#[test]
fn gather_folds_constant_rows() {
    let data = Tensor::from_i32(&[3, 2], vec![1, 2, 3, 4, 5, 6]).unwrap();
    let indices = Tensor::from_i64(&[2], vec![2, 0]).unwrap();
    let topo = GraphTopo::new(3, vec![0, 1], vec![2], vec![vec![0, 1]], vec![vec![2]]).unwrap();
    let mut graph = Graph::new(
        topo,
        vec![Node::new(
            operator("onnx::Gather", &[("axis", Attribute::Int(0))]),
            "gather",
        )],
        vec![
            Edge::with_tensor(data, "data"),
            Edge::with_tensor(indices, "indices"),
            Edge::new("out"),
        ],
    )
    .unwrap();

    let unknown = graph.fill_edge_info().unwrap();
    assert!(unknown.is_empty());
    let out = graph.edges()[2].tensor.as_ref().unwrap();
    assert_eq!(dims(out), vec![2, 2]);
    assert_eq!(i32_values(out), vec![5, 6, 1, 2]);
}

#[test]
fn symbolic_batch_propagates_and_resolves_after_substitution() {
    let shape: Shape = [
        DimExpr::variable("N"),
        DimExpr::Value(3),
        DimExpr::Value(224),
        DimExpr::Value(224),
    ]
    .into_iter()
    .collect();
    let input = Tensor::new(DataType::F32, shape);
    let target = Tensor::from_i64(&[2], vec![-1, 150528]).unwrap();
    let topo = GraphTopo::new(3, vec![0], vec![2], vec![vec![0, 1]], vec![vec![2]]).unwrap();
    let mut graph = Graph::new(
        topo,
        vec![Node::new(operator("onnx::Reshape", &[]), "flatten")],
        vec![
            Edge::with_tensor(input, "x"),
            Edge::with_tensor(target, "target"),
            Edge::new("y"),
        ],
    )
    .unwrap();

    let unknown = graph.fill_edge_info().unwrap();
    assert_eq!(unknown.len(), 1);
    assert!(unknown.contains("N"));
    assert!(graph.edges()[2].tensor.is_none());

    assert!(!graph.substitute("batch", 8));
    assert!(graph.substitute("N", 8));
    let unknown = graph.fill_edge_info().unwrap();
    assert!(unknown.is_empty());
    let out = graph.edges()[2].tensor.as_ref().unwrap();
    assert_eq!(dims(out), vec![8, 150528]);
}

#[test]
fn set_input_rejects_shape_mismatch_and_leaves_the_edge_alone() {
    let declared = Tensor::new(
        DataType::F32,
        [DimExpr::Value(2), DimExpr::Value(3)].into_iter().collect(),
    );
    let topo = GraphTopo::new(2, vec![0], vec![1], vec![vec![0]], vec![vec![1]]).unwrap();
    let mut graph = Graph::new(
        topo,
        vec![Node::new(operator("onnx::Identity", &[]), "copy")],
        vec![Edge::with_tensor(declared, "x"), Edge::new("y")],
    )
    .unwrap();

    let wrong = Tensor::from_f32(&[2, 4], vec![0.0; 8]).unwrap();
    assert!(!graph.set_input(0, wrong));
    let edge = graph.edges()[0].tensor.as_ref().unwrap();
    assert_eq!(dims(edge), vec![2, 3]);
    assert!(!edge.has_data());

    let right = Tensor::from_f32(&[2, 3], vec![1.0; 6]).unwrap();
    assert!(graph.set_input(0, right));
    assert!(graph.edges()[0].tensor.as_ref().unwrap().has_data());
    let unknown = graph.fill_edge_info().unwrap();
    assert!(unknown.is_empty());
    assert!(graph.edges()[1].tensor.as_ref().unwrap().has_data());
}

#[test]
fn set_input_binds_declared_variables() {
    let declared = Tensor::new(
        DataType::F32,
        [DimExpr::variable("N"), DimExpr::Value(3)].into_iter().collect(),
    );
    let topo = GraphTopo::new(2, vec![0], vec![1], vec![vec![0]], vec![vec![1]]).unwrap();
    let mut graph = Graph::new(
        topo,
        vec![Node::new(operator("onnx::Identity", &[]), "copy")],
        vec![Edge::with_tensor(declared, "x"), Edge::new("y")],
    )
    .unwrap();

    // A differently-named variable at a variable position is rejected.
    let foreign = Tensor::new(
        DataType::F32,
        [DimExpr::variable("M"), DimExpr::Value(3)].into_iter().collect(),
    );
    assert!(!graph.set_input(0, foreign));

    let concrete = Tensor::from_f32(&[4, 3], vec![0.5; 12]).unwrap();
    assert!(graph.set_input(0, concrete));
    let edge = graph.edges()[0].tensor.as_ref().unwrap();
    assert_eq!(dims(edge), vec![4, 3]);

    let unknown = graph.fill_edge_info().unwrap();
    assert!(unknown.is_empty());
    assert_eq!(dims(graph.edges()[1].tensor.as_ref().unwrap()), vec![4, 3]);
}

#[test]
fn same_named_variables_unify_across_edges() {
    let lhs = Tensor::new(
        DataType::F32,
        [DimExpr::variable("N"), DimExpr::Value(3)].into_iter().collect(),
    );
    let rhs = Tensor::new(
        DataType::F32,
        [DimExpr::variable("N"), DimExpr::Value(3)].into_iter().collect(),
    );
    let topo = GraphTopo::new(3, vec![0, 1], vec![2], vec![vec![0, 1]], vec![vec![2]]).unwrap();
    let mut graph = Graph::new(
        topo,
        vec![Node::new(operator("onnx::Add", &[]), "add")],
        vec![
            Edge::with_tensor(lhs, "a"),
            Edge::with_tensor(rhs, "b"),
            Edge::new("sum"),
        ],
    )
    .unwrap();

    let a_var = graph.edges()[0].tensor.as_ref().unwrap().shape[0]
        .as_variable()
        .unwrap()
        .clone();
    let b_var = graph.edges()[1].tensor.as_ref().unwrap().shape[0]
        .as_variable()
        .unwrap()
        .clone();
    assert_eq!(a_var, b_var, "same name must mean the same variable object");

    // The unified variable broadcasts cleanly and one substitution binds both.
    let unknown = graph.fill_edge_info().unwrap();
    assert!(unknown.is_empty());
    assert!(graph.substitute("N", 5));
    assert_eq!(
        dims(graph.edges()[2].tensor.as_ref().unwrap()),
        vec![5, 3]
    );
}

#[test]
fn nodes_with_missing_inputs_are_skipped() {
    // x -> relu -> y, but x never receives a tensor.
    let topo = GraphTopo::new(2, vec![0], vec![1], vec![vec![0]], vec![vec![1]]).unwrap();
    let mut graph = Graph::new(
        topo,
        vec![Node::new(operator("onnx::Relu", &[]), "act")],
        vec![Edge::new("x"), Edge::new("y")],
    )
    .unwrap();
    let unknown = graph.fill_edge_info().unwrap();
    assert!(unknown.is_empty());
    assert!(graph.edges()[1].tensor.is_none());
}

#[test]
fn fatal_inference_errors_abort_the_walk() {
    // Bool arithmetic is a type error, not an unknown-variable recovery.
    let a = Tensor::with_bytes(
        DataType::Bool,
        [DimExpr::Value(2)].into_iter().collect(),
        vec![1, 0],
    )
    .unwrap();
    let b = a.clone();
    let topo = GraphTopo::new(3, vec![0, 1], vec![2], vec![vec![0, 1]], vec![vec![2]]).unwrap();
    let mut graph = Graph::new(
        topo,
        vec![Node::new(operator("onnx::Add", &[]), "add")],
        vec![
            Edge::with_tensor(a, "a"),
            Edge::with_tensor(b, "b"),
            Edge::new("sum"),
        ],
    )
    .unwrap();
    assert!(graph.fill_edge_info().is_err());
}
