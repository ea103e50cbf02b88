//! Index-based DAG container: nodes reference edges by position, edges are
//! produced once, and iteration follows the stored (topological) order.

use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum TopologyError {
    #[error("edge {edge} is out of range ({edges} edges)")]
    EdgeOutOfRange { edge: usize, edges: usize },
    #[error("edge {edge} is produced by more than one node")]
    DuplicateProducer { edge: usize },
    #[error("node {node} consumes edge {edge} before it is available")]
    EdgeNotAvailable { node: usize, edge: usize },
}

/// Connectivity of a graph: which edges each node consumes and produces, plus
/// the global boundary. Tensors and operators live beside it in `Graph`.
#[derive(Debug, Clone, Default)]
pub struct GraphTopo {
    edge_count: usize,
    global_inputs: Vec<usize>,
    global_outputs: Vec<usize>,
    node_inputs: Vec<Vec<usize>>,
    node_outputs: Vec<Vec<usize>>,
}

impl GraphTopo {
    /// Builds a topology, checking edge bounds and the single-producer rule.
    /// Order-of-availability is checked by `Graph::new`, which knows which
    /// edges are initializers.
    pub fn new(
        edge_count: usize,
        global_inputs: Vec<usize>,
        global_outputs: Vec<usize>,
        node_inputs: Vec<Vec<usize>>,
        node_outputs: Vec<Vec<usize>>,
    ) -> Result<Self, TopologyError> {
        let check = |edge: usize| {
            if edge < edge_count {
                Ok(())
            } else {
                Err(TopologyError::EdgeOutOfRange {
                    edge,
                    edges: edge_count,
                })
            }
        };
        for &edge in global_inputs
            .iter()
            .chain(&global_outputs)
            .chain(node_inputs.iter().flatten())
            .chain(node_outputs.iter().flatten())
        {
            check(edge)?;
        }

        let mut produced = vec![false; edge_count];
        for &edge in node_outputs.iter().flatten() {
            if produced[edge] {
                return Err(TopologyError::DuplicateProducer { edge });
            }
            produced[edge] = true;
        }

        Ok(GraphTopo {
            edge_count,
            global_inputs,
            global_outputs,
            node_inputs,
            node_outputs,
        })
    }

    pub fn node_count(&self) -> usize {
        self.node_inputs.len()
    }

    pub fn edge_count(&self) -> usize {
        self.edge_count
    }

    pub fn global_inputs(&self) -> &[usize] {
        &self.global_inputs
    }

    pub fn global_outputs(&self) -> &[usize] {
        &self.global_outputs
    }

    /// Visits nodes in stored order as `(node, input edges, output edges)`.
    pub fn iter(&self) -> impl Iterator<Item = (usize, &[usize], &[usize])> {
        self.node_inputs
            .iter()
            .zip(&self.node_outputs)
            .enumerate()
            .map(|(node, (inputs, outputs))| (node, inputs.as_slice(), outputs.as_slice()))
    }

    /// Verifies every consumed edge is available by the time its consumer
    /// runs: a global input, a pre-seeded edge, or an earlier node's output.
    pub(super) fn check_order(&self, mut available: Vec<bool>) -> Result<(), TopologyError> {
        for &edge in &self.global_inputs {
            available[edge] = true;
        }
        for (node, inputs, outputs) in self.iter() {
            for &edge in inputs {
                if !available[edge] {
                    return Err(TopologyError::EdgeNotAvailable { node, edge });
                }
            }
            for &edge in outputs {
                available[edge] = true;
            }
        }
        Ok(())
    }
}
