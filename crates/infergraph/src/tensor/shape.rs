//! Symbolic dimension algebra: named variables, dimension expressions, and
//! shape formatting.

use std::fmt;
use std::hash::{Hash, Hasher};
use std::sync::{Arc, Mutex};

use smallvec::SmallVec;

struct DimVarInner {
    name: String,
    value: Mutex<Option<i64>>,
}

/// A named dimension slot whose concrete value may be bound late, either by
/// `Graph::substitute` or by matching a concrete input tensor.
///
/// Equality and hashing are by identity: two variables with the same name are
/// distinct until the owning graph canonicalizes them.
#[derive(Clone)]
pub struct DimVariable(Arc<DimVarInner>);

impl DimVariable {
    pub fn new(name: impl Into<String>) -> Self {
        DimVariable(Arc::new(DimVarInner {
            name: name.into(),
            value: Mutex::new(None),
        }))
    }

    pub fn with_value(name: impl Into<String>, value: i64) -> Self {
        DimVariable(Arc::new(DimVarInner {
            name: name.into(),
            value: Mutex::new(Some(value)),
        }))
    }

    pub fn name(&self) -> &str {
        &self.0.name
    }

    pub fn value(&self) -> Option<i64> {
        *self.0.value.lock().unwrap()
    }

    /// Binds the variable to a concrete value. Later bindings overwrite
    /// earlier ones; every holder of this variable observes the update.
    pub fn bind(&self, value: i64) {
        *self.0.value.lock().unwrap() = Some(value);
    }
}

impl PartialEq for DimVariable {
    fn eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.0, &other.0)
    }
}

impl Eq for DimVariable {}

impl Hash for DimVariable {
    fn hash<H: Hasher>(&self, state: &mut H) {
        (Arc::as_ptr(&self.0) as usize).hash(state);
    }
}

impl fmt::Debug for DimVariable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.value() {
            Some(value) => write!(f, "{}={}", self.name(), value),
            None => f.write_str(self.name()),
        }
    }
}

/// A single axis extent: a signed constant or a reference to a variable.
#[derive(Debug, Clone)]
pub enum DimExpr {
    Value(i64),
    Variable(DimVariable),
}

impl DimExpr {
    /// Creates a dimension referencing a fresh, unbound variable.
    pub fn variable(name: impl Into<String>) -> Self {
        DimExpr::Variable(DimVariable::new(name))
    }

    pub fn is_value(&self) -> bool {
        matches!(self, DimExpr::Value(_))
    }

    pub fn is_variable(&self) -> bool {
        matches!(self, DimExpr::Variable(_))
    }

    /// True for constants and for variables that are currently bound.
    pub fn has_value(&self) -> bool {
        self.value().is_some()
    }

    pub fn value(&self) -> Option<i64> {
        match self {
            DimExpr::Value(value) => Some(*value),
            DimExpr::Variable(var) => var.value(),
        }
    }

    pub fn as_variable(&self) -> Option<&DimVariable> {
        match self {
            DimExpr::Variable(var) => Some(var),
            DimExpr::Value(_) => None,
        }
    }
}

impl From<i64> for DimExpr {
    fn from(value: i64) -> Self {
        DimExpr::Value(value)
    }
}

impl From<DimVariable> for DimExpr {
    fn from(var: DimVariable) -> Self {
        DimExpr::Variable(var)
    }
}

/// Constants compare by value, variables by identity; a constant equals a
/// variable only when the variable is bound to the same value.
impl PartialEq for DimExpr {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (DimExpr::Value(lhs), DimExpr::Value(rhs)) => lhs == rhs,
            (DimExpr::Variable(lhs), DimExpr::Variable(rhs)) => lhs == rhs,
            (DimExpr::Value(value), DimExpr::Variable(var))
            | (DimExpr::Variable(var), DimExpr::Value(value)) => var.value() == Some(*value),
        }
    }
}

/// Ordered dimension list; most model shapes fit the inline capacity.
pub type Shape = SmallVec<[DimExpr; 4]>;

/// Renders a shape as a bracketed list, bound variables as `name=value`.
pub fn shape_format(shape: &Shape) -> String {
    let mut out = String::from("[");
    for (i, dim) in shape.iter().enumerate() {
        if i > 0 {
            out.push_str(", ");
        }
        match dim {
            DimExpr::Value(value) => out.push_str(&value.to_string()),
            DimExpr::Variable(var) => match var.value() {
                Some(value) => out.push_str(&format!("{}={}", var.name(), value)),
                None => out.push_str(var.name()),
            },
        }
    }
    out.push(']');
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use smallvec::smallvec;

    #[test]
    fn variable_equality_is_by_identity() {
        let a = DimVariable::new("N");
        let b = DimVariable::new("N");
        assert_ne!(a, b);
        assert_eq!(a, a.clone());
    }

    #[test]
    fn constant_matches_bound_variable() {
        let var = DimVariable::new("N");
        let dim = DimExpr::Variable(var.clone());
        assert_ne!(dim, DimExpr::Value(4));
        var.bind(4);
        assert_eq!(dim, DimExpr::Value(4));
        assert!(dim.has_value());
        assert_eq!(dim.value(), Some(4));

        let bound = DimVariable::with_value("B", 7);
        assert_eq!(DimExpr::Variable(bound), DimExpr::Value(7));
    }

    #[test]
    fn formats_bound_and_unbound_dims() {
        let n = DimVariable::new("N");
        let shape: Shape = smallvec![
            DimExpr::Variable(n.clone()),
            DimExpr::Value(3),
            DimExpr::Value(224),
        ];
        assert_eq!(shape_format(&shape), "[N, 3, 224]");
        n.bind(8);
        assert_eq!(shape_format(&shape), "[N=8, 3, 224]");
    }
}
