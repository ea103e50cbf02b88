//! Einsum shape inference from the subscript equation (no ellipsis support).

use std::collections::BTreeMap;

use crate::kernel::collectors::NoCandidates;
use crate::kernel::{CollectorBox, Target};
use crate::tensor::{DimExpr, Shape, Tensor};

use super::{InferError, InferResult, Operator};

fn merge(slot: &mut DimExpr, dim: &DimExpr, label: char) -> Result<(), InferError> {
    if slot == dim || *dim == DimExpr::Value(1) {
        return Ok(());
    }
    if *slot == DimExpr::Value(1) {
        *slot = dim.clone();
        return Ok(());
    }
    match (slot.value(), dim.value()) {
        (Some(a), Some(b)) if a == b => Ok(()),
        (Some(_), Some(_)) => Err(InferError::ShapeMismatch(format!(
            "einsum label '{label}' binds conflicting dimensions"
        ))),
        _ => {
            let unbound = [&*slot, dim]
                .into_iter()
                .find_map(|d| d.as_variable().filter(|v| v.value().is_none()))
                .expect("one side must be unbound here");
            Err(InferError::UnknownVariable(unbound.name().to_string()))
        }
    }
}

pub(super) fn infer(op: &Operator, inputs: &[Tensor]) -> InferResult {
    let equation: String = op
        .attribute("equation")?
        .string()?
        .chars()
        .filter(|c| !c.is_whitespace())
        .collect();
    if equation.contains("...") {
        return Err(InferError::ShapeMismatch(
            "einsum ellipsis is not supported".to_string(),
        ));
    }
    let (lhs, explicit_rhs) = match equation.split_once("->") {
        Some((lhs, rhs)) => (lhs, Some(rhs)),
        None => (equation.as_str(), None),
    };
    let terms: Vec<&str> = lhs.split(',').collect();
    if terms.len() != inputs.len() {
        return Err(InferError::ShapeMismatch(format!(
            "einsum equation names {} operands, got {}",
            terms.len(),
            inputs.len()
        )));
    }

    let dtype = inputs
        .first()
        .ok_or_else(|| InferError::ShapeMismatch("einsum requires inputs".to_string()))?
        .data_type;
    if !dtype.is_numeric() || inputs.iter().any(|t| t.data_type != dtype) {
        return Err(InferError::TypeUnsupported(
            "einsum operands must share one numeric type".to_string(),
        ));
    }

    let mut bindings: BTreeMap<char, DimExpr> = BTreeMap::new();
    let mut counts: BTreeMap<char, usize> = BTreeMap::new();
    for (term, input) in terms.iter().zip(inputs) {
        let labels: Vec<char> = term.chars().collect();
        if labels.iter().any(|c| !c.is_ascii_alphabetic()) {
            return Err(InferError::ShapeMismatch(format!(
                "invalid einsum term \"{term}\""
            )));
        }
        if labels.len() != input.rank() {
            return Err(InferError::ShapeMismatch(format!(
                "einsum term \"{term}\" does not match rank {}",
                input.rank()
            )));
        }
        for (label, dim) in labels.iter().zip(&input.shape) {
            *counts.entry(*label).or_insert(0) += 1;
            match bindings.get_mut(label) {
                Some(slot) => merge(slot, dim, *label)?,
                None => {
                    bindings.insert(*label, dim.clone());
                }
            }
        }
    }

    let output_labels: Vec<char> = match explicit_rhs {
        Some(rhs) => {
            let labels: Vec<char> = rhs.chars().collect();
            for label in &labels {
                if !bindings.contains_key(label) {
                    return Err(InferError::ShapeMismatch(format!(
                        "einsum output label '{label}' never appears on the left"
                    )));
                }
            }
            labels
        }
        // Implicit form: labels used exactly once, in alphabetical order.
        None => counts
            .iter()
            .filter(|(_, &count)| count == 1)
            .map(|(&label, _)| label)
            .collect(),
    };

    let shape: Shape = output_labels
        .iter()
        .map(|label| bindings[label].clone())
        .collect();
    Ok(vec![Tensor::new(dtype, shape)])
}

pub(super) fn collector(_op: &Operator, target: Target) -> CollectorBox {
    Box::new(NoCandidates { target })
}
