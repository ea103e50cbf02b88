//! Batched matrix multiplication with ONNX rank-1 promotion rules.

use crate::kernel::collectors::NoCandidates;
use crate::kernel::{CollectorBox, Target};
use crate::tensor::{DimExpr, Shape, Tensor};

use super::support::{expect_arity, multidir_broadcast};
use super::{InferError, InferResult, Operator};

/// Checks the contraction dimensions agree; an unresolved conflict surfaces
/// the unbound variable for the engine to accumulate.
pub(super) fn contract_dims(k_lhs: &DimExpr, k_rhs: &DimExpr) -> Result<(), InferError> {
    if k_lhs == k_rhs {
        return Ok(());
    }
    match (k_lhs.value(), k_rhs.value()) {
        (Some(a), Some(b)) if a == b => Ok(()),
        (Some(a), Some(b)) => Err(InferError::ShapeMismatch(format!(
            "contraction dimensions {a} and {b} disagree"
        ))),
        _ => {
            let unbound = [k_lhs, k_rhs]
                .into_iter()
                .find_map(|d| d.as_variable().filter(|v| v.value().is_none()))
                .expect("one side must be unbound here");
            Err(InferError::UnknownVariable(unbound.name().to_string()))
        }
    }
}

pub(super) fn infer(_op: &Operator, inputs: &[Tensor]) -> InferResult {
    expect_arity(inputs, 2)?;
    let (a, b) = (&inputs[0], &inputs[1]);
    let dtype = a.data_type;
    if !dtype.is_numeric() || b.data_type != dtype {
        return Err(InferError::TypeUnsupported(
            "matmul operands must share one numeric type".to_string(),
        ));
    }
    if a.rank() == 0 || b.rank() == 0 {
        return Err(InferError::ShapeMismatch(
            "matmul operands must have rank >= 1".to_string(),
        ));
    }

    // Rank-1 operands are promoted with a temporary unit axis that is removed
    // from the result again.
    let mut lhs: Shape = a.shape.clone();
    let lhs_vector = lhs.len() == 1;
    if lhs_vector {
        lhs.insert(0, DimExpr::Value(1));
    }
    let mut rhs: Shape = b.shape.clone();
    let rhs_vector = rhs.len() == 1;
    if rhs_vector {
        rhs.push(DimExpr::Value(1));
    }

    contract_dims(&lhs[lhs.len() - 1], &rhs[rhs.len() - 2])?;

    let lhs_batch: Shape = lhs[..lhs.len() - 2].iter().cloned().collect();
    let rhs_batch: Shape = rhs[..rhs.len() - 2].iter().cloned().collect();
    let mut shape = multidir_broadcast(&[&lhs_batch, &rhs_batch])?;
    if !lhs_vector {
        shape.push(lhs[lhs.len() - 2].clone());
    }
    if !rhs_vector {
        shape.push(rhs[rhs.len() - 1].clone());
    }
    Ok(vec![Tensor::new(dtype, shape)])
}

pub(super) fn collector(_op: &Operator, target: Target) -> CollectorBox {
    Box::new(NoCandidates { target })
}
