//! The graph record and the shape-inference engine that walks it.

mod topology;

pub use topology::{GraphTopo, TopologyError};

use std::collections::{HashMap, HashSet};
use std::time::Instant;

use log::info;
use thiserror::Error;

use crate::ops::{InferError, Operator};
use crate::tensor::{shape_format, DimExpr, DimVariable, Tensor};

/// A computation node: operator plus the model-level name.
#[derive(Debug, Clone)]
pub struct Node {
    pub op: Operator,
    pub name: String,
}

impl Node {
    pub fn new(op: Operator, name: impl Into<String>) -> Self {
        Node {
            op,
            name: name.into(),
        }
    }
}

/// A tensor edge; the tensor is absent until inference resolves it.
#[derive(Debug, Clone)]
pub struct Edge {
    pub tensor: Option<Tensor>,
    pub name: String,
}

impl Edge {
    pub fn new(name: impl Into<String>) -> Self {
        Edge {
            tensor: None,
            name: name.into(),
        }
    }

    pub fn with_tensor(tensor: Tensor, name: impl Into<String>) -> Self {
        Edge {
            tensor: Some(tensor),
            name: name.into(),
        }
    }
}

#[derive(Debug, Error)]
pub enum GraphError {
    #[error(transparent)]
    Topology(#[from] TopologyError),
    #[error("{got} nodes against a topology of {expected}")]
    NodeCount { got: usize, expected: usize },
    #[error("{got} edges against a topology of {expected}")]
    EdgeCount { got: usize, expected: usize },
}

/// A model graph: topology, node operators, edge tensors, and the canonical
/// map of dimension variables collected from every tensor in the graph.
#[derive(Debug)]
pub struct Graph {
    topo: GraphTopo,
    nodes: Vec<Node>,
    edges: Vec<Edge>,
    variables: HashMap<String, DimVariable>,
}

impl Graph {
    /// Assembles a graph, validating availability order (initializer edges,
    /// meaning those already carrying tensors, count as available) and
    /// unifying same-named dimension variables onto one canonical object.
    pub fn new(topo: GraphTopo, nodes: Vec<Node>, edges: Vec<Edge>) -> Result<Self, GraphError> {
        if nodes.len() != topo.node_count() {
            return Err(GraphError::NodeCount {
                got: nodes.len(),
                expected: topo.node_count(),
            });
        }
        if edges.len() != topo.edge_count() {
            return Err(GraphError::EdgeCount {
                got: edges.len(),
                expected: topo.edge_count(),
            });
        }
        let preset = edges.iter().map(|edge| edge.tensor.is_some()).collect();
        topo.check_order(preset)?;

        let mut graph = Graph {
            topo,
            nodes,
            edges,
            variables: HashMap::new(),
        };
        graph.collect_variables();
        Ok(graph)
    }

    /// Within one graph no two distinct variable objects share a name; every
    /// dimension referencing a duplicate is rewritten to the canonical one.
    fn collect_variables(&mut self) {
        for edge in &mut self.edges {
            let Some(tensor) = edge.tensor.as_mut() else {
                continue;
            };
            let mut rewritten = false;
            for dim in tensor.shape.iter_mut() {
                let Some(var) = dim.as_variable() else {
                    continue;
                };
                match self.variables.get(var.name()) {
                    Some(canonical) => {
                        if canonical != var {
                            *dim = DimExpr::Variable(canonical.clone());
                            rewritten = true;
                        }
                    }
                    None => {
                        self.variables.insert(var.name().to_string(), var.clone());
                    }
                }
            }
            if rewritten {
                tensor.dep_variables = tensor
                    .shape
                    .iter()
                    .filter_map(|dim| dim.as_variable().cloned())
                    .collect();
            }
        }
    }

    pub fn topology(&self) -> &GraphTopo {
        &self.topo
    }

    pub fn nodes(&self) -> &[Node] {
        &self.nodes
    }

    pub fn edges(&self) -> &[Edge] {
        &self.edges
    }

    /// Binds a named dimension variable; `false` when the graph never
    /// mentions that name.
    pub fn substitute(&mut self, name: &str, value: i64) -> bool {
        match self.variables.get(name) {
            Some(var) => {
                var.bind(value);
                true
            }
            None => false,
        }
    }

    /// Unifies the i-th global input with a concrete tensor.
    ///
    /// Ranks must match and every dimension must reconcile: variables bind to
    /// supplied values, constants must agree, and a supplied variable must
    /// carry the same name as the declared one. On any mismatch this returns
    /// `false` without touching graph state. Element type and payload are
    /// taken from the supplied tensor.
    pub fn set_input(&mut self, i: usize, tensor: Tensor) -> bool {
        let Some(&edge_index) = self.topo.global_inputs().get(i) else {
            return false;
        };
        let edge = &mut self.edges[edge_index];
        let Some(current) = edge.tensor.as_mut() else {
            edge.tensor = Some(tensor);
            return true;
        };
        if tensor.rank() != current.rank() {
            return false;
        }
        for (declared, supplied) in current.shape.iter().zip(&tensor.shape) {
            match declared {
                DimExpr::Variable(var) => {
                    if let Some(other) = supplied.as_variable() {
                        if var.name() != other.name() {
                            return false;
                        }
                    }
                }
                DimExpr::Value(value) => {
                    if supplied.is_variable() || supplied.value() != Some(*value) {
                        return false;
                    }
                }
            }
        }
        for (declared, supplied) in current.shape.iter().zip(&tensor.shape) {
            if let (Some(var), Some(value)) = (declared.as_variable(), supplied.value()) {
                var.bind(value);
            }
        }
        current.data_type = tensor.data_type;
        current.data = tensor.data;
        true
    }

    /// Walks the graph in topological order, filling every resolvable output
    /// edge. Nodes whose inputs are still missing are skipped; routines that
    /// need an unbound variable add it to the returned set; every other
    /// failure aborts. An empty return set means the graph is fully resolved.
    pub fn fill_edge_info(&mut self) -> Result<HashSet<String>, InferError> {
        let mut unknown_variables = HashSet::new();
        info!("edge inference start");
        let start = Instant::now();

        'nodes: for (node_index, in_edges, out_edges) in self.topo.iter() {
            let mut inputs = Vec::with_capacity(in_edges.len());
            for &edge in in_edges {
                match &self.edges[edge].tensor {
                    Some(tensor) => inputs.push(tensor.clone()),
                    None => continue 'nodes,
                }
            }
            let node = &self.nodes[node_index];
            let header = format!(
                "nodes[{}] = {}({})",
                node_index,
                node.name,
                node.op.op_type.name()
            );
            match node.op.infer(&inputs) {
                Err(InferError::UnknownVariable(name)) => {
                    info!("{header}, inference failed: unknown variable {name}");
                    unknown_variables.insert(name);
                }
                Err(error) => {
                    info!("{header}, inference failed: {error}");
                    return Err(error);
                }
                Ok(outputs) => {
                    if outputs.len() < out_edges.len() {
                        return Err(InferError::OutOfRange(format!(
                            "node declares {} outputs, inference produced {}",
                            out_edges.len(),
                            outputs.len()
                        )));
                    }
                    let shapes = outputs
                        .iter()
                        .take(out_edges.len())
                        .map(|tensor| shape_format(&tensor.shape))
                        .collect::<Vec<_>>()
                        .join(" ");
                    for (&edge, tensor) in out_edges.iter().zip(outputs) {
                        self.edges[edge].tensor = Some(tensor);
                    }
                    info!("{header}, outputs = ( {shapes} )");
                }
            }
        }
        info!("inference cost time: {}µs", start.elapsed().as_micros());

        if unknown_variables.is_empty() {
            self.log_summary();
        }
        Ok(unknown_variables)
    }

    /// Classifies resolved nodes: *dynamic* nodes have at least one data-free
    /// output; *front* nodes are dynamic nodes whose inputs are all constant,
    /// the boundary between the folded region and the runtime region.
    fn log_summary(&self) {
        let has_data =
            |edge: usize| -> bool { self.edges[edge].tensor.as_ref().is_some_and(Tensor::has_data) };

        let mut dynamic_nodes: HashSet<&'static str> = HashSet::new();
        let mut front_nodes: HashSet<&'static str> = HashSet::new();
        info!("compute on device:");
        let mut ordinal = 0;
        for (node_index, in_edges, out_edges) in self.topo.iter() {
            if out_edges.iter().all(|&edge| has_data(edge)) {
                continue;
            }
            let node = &self.nodes[node_index];
            info!("{ordinal:>8}. {}", node.name);
            ordinal += 1;
            let kind = node.op.op_type.name();
            dynamic_nodes.insert(kind);
            if in_edges.iter().all(|&edge| has_data(edge)) {
                front_nodes.insert(kind);
            }
        }

        info!("types:");
        for (ordinal, kind) in dynamic_nodes.iter().enumerate() {
            if front_nodes.contains(kind) {
                info!("{ordinal:>8}.*{kind}");
            } else {
                info!("{ordinal:>8}. {kind}");
            }
        }

        info!("outputs:");
        for (ordinal, &edge_index) in self.topo.global_outputs().iter().enumerate() {
            let edge = &self.edges[edge_index];
            match &edge.tensor {
                Some(tensor) => info!(
                    "    outputs[{ordinal:>2}] = {} with {}",
                    edge.name,
                    shape_format(&tensor.shape)
                ),
                None => info!("    outputs[{ordinal:>2}] = {} unresolved", edge.name),
            }
        }
    }
}
