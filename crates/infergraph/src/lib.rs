pub mod graph;
pub mod kernel;
pub mod ops;
pub mod tensor;

pub use graph::{Edge, Graph, Node};
pub use ops::{Attribute, InferError, OpType, Operator};
pub use tensor::{DataType, DimExpr, DimVariable, Shape, Tensor};
