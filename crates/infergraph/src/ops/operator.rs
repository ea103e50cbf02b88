//! Attribute variants and the operator record nodes carry.

use std::collections::HashMap;

use crate::kernel::{CollectorBox, Target};
use crate::tensor::Tensor;

use super::registry::OpType;
use super::{InferError, InferResult};

/// Tagged attribute value. Equality is structural within one tag and `false`
/// across tags; the typed accessors fail on tag mismatch.
#[derive(Debug, Clone, PartialEq)]
pub enum Attribute {
    Int(i64),
    Ints(Vec<i64>),
    Float(f64),
    Floats(Vec<f64>),
    String(String),
    Strings(Vec<String>),
    Tensor(Tensor),
    Tensors(Vec<Tensor>),
}

macro_rules! accessor {
    ($name:ident, $variant:ident, $ty:ty) => {
        pub fn $name(&self) -> Result<&$ty, InferError> {
            match self {
                Attribute::$variant(value) => Ok(value),
                _ => Err(InferError::AttributeType(concat!(
                    "expected ",
                    stringify!($variant)
                )
                .to_string())),
            }
        }
    };
}

impl Attribute {
    pub fn int(&self) -> Result<i64, InferError> {
        match self {
            Attribute::Int(value) => Ok(*value),
            _ => Err(InferError::AttributeType("expected Int".to_string())),
        }
    }

    pub fn float(&self) -> Result<f64, InferError> {
        match self {
            Attribute::Float(value) => Ok(*value),
            _ => Err(InferError::AttributeType("expected Float".to_string())),
        }
    }

    accessor!(ints, Ints, [i64]);
    accessor!(floats, Floats, [f64]);
    accessor!(string, String, str);
    accessor!(strings, Strings, [String]);
    accessor!(tensor, Tensor, Tensor);
    accessor!(tensors, Tensors, [Tensor]);
}

/// An operator instance: interned kind plus named attributes.
#[derive(Debug, Clone, PartialEq)]
pub struct Operator {
    pub op_type: OpType,
    pub attributes: HashMap<String, Attribute>,
}

impl Operator {
    pub fn new(op_type: OpType, attributes: HashMap<String, Attribute>) -> Self {
        Operator {
            op_type,
            attributes,
        }
    }

    /// Looks up a required attribute.
    pub fn attribute(&self, name: &str) -> Result<&Attribute, InferError> {
        self.attributes
            .get(name)
            .ok_or_else(|| InferError::AttributeMissing(name.to_string()))
    }

    pub fn attribute_opt(&self, name: &str) -> Option<&Attribute> {
        self.attributes.get(name)
    }

    /// Integer attribute with a default when absent.
    pub fn int_or(&self, name: &str, default: i64) -> Result<i64, InferError> {
        match self.attributes.get(name) {
            Some(attr) => attr.int(),
            None => Ok(default),
        }
    }

    /// Float attribute with a default when absent.
    pub fn float_or(&self, name: &str, default: f64) -> Result<f64, InferError> {
        match self.attributes.get(name) {
            Some(attr) => attr.float(),
            None => Ok(default),
        }
    }

    /// Integer-list attribute; `None` when absent.
    pub fn ints_opt(&self, name: &str) -> Result<Option<&[i64]>, InferError> {
        match self.attributes.get(name) {
            Some(attr) => attr.ints().map(Some),
            None => Ok(None),
        }
    }

    /// Runs the registered shape-inference routine for this operator kind.
    pub fn infer(&self, inputs: &[Tensor]) -> InferResult {
        (self.op_type.infer_fn())(self, inputs)
    }

    /// Builds the kernel-candidate collector for this operator on `target`.
    pub fn candidate_kernels(&self, target: Target) -> CollectorBox {
        (self.op_type.collector_factory())(self, target)
    }
}
