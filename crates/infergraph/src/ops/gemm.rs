//! General matrix multiply `alpha · op(A) × op(B) + beta · C`.

use crate::kernel::collectors::NoCandidates;
use crate::kernel::{CollectorBox, Target};
use crate::tensor::{DimExpr, Shape, Tensor};

use super::mat_mul::contract_dims;
use super::support::expect_arity_range;
use super::{InferError, InferResult, Operator};

pub(super) fn infer(op: &Operator, inputs: &[Tensor]) -> InferResult {
    expect_arity_range(inputs, 2, 3)?;
    let (a, b) = (&inputs[0], &inputs[1]);
    let dtype = a.data_type;
    if !dtype.is_numeric() || b.data_type != dtype {
        return Err(InferError::TypeUnsupported(
            "gemm operands must share one numeric type".to_string(),
        ));
    }
    if a.rank() != 2 || b.rank() != 2 {
        return Err(InferError::ShapeMismatch(
            "gemm operands must have rank 2".to_string(),
        ));
    }
    // alpha/beta only need to be well-typed when present.
    op.float_or("alpha", 1.0)?;
    op.float_or("beta", 1.0)?;
    let trans_a = op.int_or("transA", 0)? != 0;
    let trans_b = op.int_or("transB", 0)? != 0;

    let (m, k_lhs) = if trans_a {
        (&a.shape[1], &a.shape[0])
    } else {
        (&a.shape[0], &a.shape[1])
    };
    let (k_rhs, n) = if trans_b {
        (&b.shape[1], &b.shape[0])
    } else {
        (&b.shape[0], &b.shape[1])
    };
    contract_dims(k_lhs, k_rhs)?;

    if let Some(c) = inputs.get(2) {
        if c.data_type != dtype {
            return Err(InferError::TypeUnsupported(
                "gemm bias must share the operand type".to_string(),
            ));
        }
        if c.rank() > 2 {
            return Err(InferError::ShapeMismatch(
                "gemm bias must have rank <= 2".to_string(),
            ));
        }
        // Bias must be unidirectionally broadcastable to [M, N].
        for (dim, expected) in c.shape.iter().rev().zip([n, m]) {
            if dim == expected || *dim == DimExpr::Value(1) {
                continue;
            }
            if let (Some(have), Some(want)) = (dim.value(), expected.value()) {
                return Err(InferError::ShapeMismatch(format!(
                    "gemm bias dimension {have} does not broadcast to {want}"
                )));
            }
        }
    }

    let shape: Shape = [m.clone(), n.clone()].into_iter().collect();
    Ok(vec![Tensor::new(dtype, shape)])
}

pub(super) fn collector(_op: &Operator, target: Target) -> CollectorBox {
    Box::new(NoCandidates { target })
}
