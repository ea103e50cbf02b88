//! The tensor record carried on graph edges: element type, symbolic shape,
//! and an optional constant byte payload.

use std::collections::HashSet;
use std::mem::size_of;
use std::sync::Arc;

use anyhow::{ensure, Result};

use super::{shape_format, DataType, DimExpr, DimVariable, Shape};

/// Tensor metadata plus optional owned bytes.
///
/// When `data` is present every dimension of `shape` resolves to a value and
/// the payload length equals `elements × element size`; constructors enforce
/// the invariant. `dep_variables` tracks the variables the shape references so
/// the owning graph can canonicalize and substitute them.
#[derive(Debug, Clone)]
pub struct Tensor {
    pub data_type: DataType,
    pub shape: Shape,
    pub data: Option<Arc<[u8]>>,
    pub dep_variables: HashSet<DimVariable>,
}

impl Tensor {
    /// Builds a data-free tensor, collecting shape variables as dependencies.
    pub fn new(data_type: DataType, shape: Shape) -> Self {
        let dep_variables = collect_variables(&shape);
        Tensor {
            data_type,
            shape,
            data: None,
            dep_variables,
        }
    }

    /// Builds a constant tensor, validating the payload against the shape.
    pub fn with_bytes(data_type: DataType, shape: Shape, bytes: Vec<u8>) -> Result<Self> {
        let mut elements = 1usize;
        for dim in &shape {
            let value = dim.value().ok_or_else(|| {
                anyhow::anyhow!(
                    "constant tensor requires concrete dims, got {}",
                    shape_format(&shape)
                )
            })?;
            ensure!(value >= 0, "negative dimension {} in {}", value, shape_format(&shape));
            elements *= value as usize;
        }
        ensure!(
            bytes.len() == elements * data_type.size(),
            "payload length {} does not match {} × {} for shape {}",
            bytes.len(),
            elements,
            data_type.size(),
            shape_format(&shape)
        );
        let dep_variables = collect_variables(&shape);
        Ok(Tensor {
            data_type,
            shape,
            data: Some(Arc::from(bytes.into_boxed_slice())),
            dep_variables,
        })
    }

    /// Constructs an `F32` constant from raw values.
    pub fn from_f32(dims: &[i64], values: Vec<f32>) -> Result<Self> {
        Self::with_bytes(DataType::F32, value_shape(dims), as_bytes(&values).to_vec())
    }

    /// Constructs an `I32` constant from raw values.
    pub fn from_i32(dims: &[i64], values: Vec<i32>) -> Result<Self> {
        Self::with_bytes(DataType::I32, value_shape(dims), as_bytes(&values).to_vec())
    }

    /// Constructs an `I64` constant from raw values.
    pub fn from_i64(dims: &[i64], values: Vec<i64>) -> Result<Self> {
        Self::with_bytes(DataType::I64, value_shape(dims), as_bytes(&values).to_vec())
    }

    pub fn has_data(&self) -> bool {
        self.data.is_some()
    }

    pub fn rank(&self) -> usize {
        self.shape.len()
    }

    /// Total element count; `None` while any dimension is unresolved.
    pub fn elements_size(&self) -> Option<usize> {
        let mut product = 1usize;
        for dim in &self.shape {
            product *= usize::try_from(dim.value()?).ok()?;
        }
        Some(product)
    }

    /// Payload size in bytes implied by the shape.
    pub fn bytes_size(&self) -> Option<usize> {
        Some(self.elements_size()? * self.data_type.size())
    }
}

/// Tensors compare by type, shape, and payload; the dependency set is derived
/// from the shape and carries no extra information.
impl PartialEq for Tensor {
    fn eq(&self, other: &Self) -> bool {
        self.data_type == other.data_type
            && self.shape == other.shape
            && self.data == other.data
    }
}

fn collect_variables(shape: &Shape) -> HashSet<DimVariable> {
    shape
        .iter()
        .filter_map(|dim| dim.as_variable().cloned())
        .collect()
}

fn value_shape(dims: &[i64]) -> Shape {
    dims.iter().map(|&d| DimExpr::Value(d)).collect()
}

/// Views a typed slice as little-endian bytes. Sound for the plain-old-data
/// element types used here; alignment of `u8` is never an obstacle.
pub(crate) fn as_bytes<T: Copy>(values: &[T]) -> &[u8] {
    unsafe {
        std::slice::from_raw_parts(values.as_ptr() as *const u8, size_of::<T>() * values.len())
    }
}

/// Reads element `index` of a byte payload as `T`. The payload may come from
/// an `Arc<[u8]>` with byte alignment, so the read is unaligned.
pub(crate) fn read_at<T: Copy>(bytes: &[u8], index: usize) -> T {
    debug_assert!((index + 1) * size_of::<T>() <= bytes.len());
    unsafe { (bytes.as_ptr() as *const T).add(index).read_unaligned() }
}

/// Writes element `index` of a byte payload as `T`.
pub(crate) fn write_at<T: Copy>(bytes: &mut [u8], index: usize, value: T) {
    debug_assert!((index + 1) * size_of::<T>() <= bytes.len());
    unsafe { (bytes.as_mut_ptr() as *mut T).add(index).write_unaligned(value) }
}
