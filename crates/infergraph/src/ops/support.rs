//! Shared helpers for the inference routines: arity and axis checks,
//! dimension resolution, the fold gate, symbolic broadcasting, and index
//! arithmetic over constant payloads.

use crate::tensor::{read_at, shape_format, DataType, DimExpr, Shape, Tensor};

use super::InferError;

pub(crate) fn expect_arity(inputs: &[Tensor], arity: usize) -> Result<(), InferError> {
    if inputs.len() == arity {
        Ok(())
    } else {
        Err(InferError::ShapeMismatch(format!(
            "expected {arity} inputs, got {}",
            inputs.len()
        )))
    }
}

pub(crate) fn expect_arity_range(
    inputs: &[Tensor],
    min: usize,
    max: usize,
) -> Result<(), InferError> {
    if (min..=max).contains(&inputs.len()) {
        Ok(())
    } else {
        Err(InferError::ShapeMismatch(format!(
            "expected {min}..={max} inputs, got {}",
            inputs.len()
        )))
    }
}

/// Resolves one dimension to its value, reporting the unbound variable.
pub(crate) fn dim_value(dim: &DimExpr) -> Result<i64, InferError> {
    match dim {
        DimExpr::Value(value) => Ok(*value),
        DimExpr::Variable(var) => var
            .value()
            .ok_or_else(|| InferError::UnknownVariable(var.name().to_string())),
    }
}

/// Resolves a whole shape to concrete non-negative extents.
pub(crate) fn concrete_dims(shape: &Shape) -> Result<Vec<usize>, InferError> {
    shape
        .iter()
        .map(|dim| {
            let value = dim_value(dim)?;
            usize::try_from(value).map_err(|_| {
                InferError::ShapeMismatch(format!(
                    "negative dimension in {}",
                    shape_format(shape)
                ))
            })
        })
        .collect()
}

/// The fold gate: true iff every input carries data and the output shape is
/// fully resolved.
pub(crate) fn should_calculate(inputs: &[Tensor], output: &Shape) -> bool {
    inputs.iter().all(Tensor::has_data) && output.iter().all(DimExpr::has_value)
}

/// Normalizes a possibly negative axis into `[0, rank)`.
pub(crate) fn normalize_axis(axis: i64, rank: usize) -> Result<usize, InferError> {
    let adjusted = if axis < 0 { axis + rank as i64 } else { axis };
    if (0..rank as i64).contains(&adjusted) {
        Ok(adjusted as usize)
    } else {
        Err(InferError::ShapeMismatch(format!(
            "axis {axis} out of range for rank {rank}"
        )))
    }
}

/// Multidirectional broadcast over symbolic shapes.
///
/// Dimensions are aligned from the right. A literal 1 broadcasts; equal
/// dimensions (constant by value, variables by identity, constants against
/// bound variables by value) merge. When neither side resolves the conflict
/// the unbound variable is reported so the engine can accumulate it.
pub(crate) fn multidir_broadcast(shapes: &[&Shape]) -> Result<Shape, InferError> {
    let rank = shapes.iter().map(|shape| shape.len()).max().unwrap_or(0);
    let mut out = Shape::new();
    for position in 0..rank {
        let mut merged: Option<&DimExpr> = None;
        for shape in shapes {
            if shape.len() + position < rank {
                continue;
            }
            let dim = &shape[shape.len() + position - rank];
            if matches!(dim, DimExpr::Value(1)) {
                continue;
            }
            let current = match merged {
                None => {
                    merged = Some(dim);
                    continue;
                }
                Some(current) => current,
            };
            if current == dim {
                continue;
            }
            match (current.value(), dim.value()) {
                (Some(1), _) => merged = Some(dim),
                (_, Some(1)) => {}
                (Some(a), Some(b)) => {
                    if a != b {
                        return Err(InferError::ShapeMismatch(format!(
                            "cannot broadcast {a} against {b}"
                        )));
                    }
                }
                _ => {
                    let unbound = [current, dim]
                        .into_iter()
                        .find_map(|d| d.as_variable().filter(|v| v.value().is_none()))
                        .expect("one side must be unbound here");
                    return Err(InferError::UnknownVariable(unbound.name().to_string()));
                }
            }
        }
        out.push(merged.cloned().unwrap_or(DimExpr::Value(1)));
    }
    Ok(out)
}

/// Decodes a row-major linear index into per-axis coordinates.
pub(crate) fn locate_n(dims: &[usize], mut k: usize) -> Vec<usize> {
    let mut coords = vec![0usize; dims.len()];
    for (coord, &dim) in coords.iter_mut().zip(dims).rev() {
        *coord = k % dim;
        k /= dim;
    }
    coords
}

/// Re-linearizes output coordinates into an input's offset, right-aligned and
/// treating size-1 axes as broadcast.
pub(crate) fn locate_1(dims: &[usize], coords: &[usize]) -> usize {
    let skip = coords.len() - dims.len();
    let mut offset = 0usize;
    let mut mul = 1usize;
    for (axis, &dim) in dims.iter().enumerate().rev() {
        if dim != 1 {
            offset += coords[skip + axis] * mul;
        }
        mul *= dim;
    }
    offset
}

/// Reads an index tensor (I32 or I64, constant) as `i64` values.
pub(crate) fn index_values(tensor: &Tensor) -> Result<Vec<i64>, InferError> {
    let data = tensor.data.as_ref().ok_or_else(|| {
        InferError::ShapeMismatch("index operand must be constant".to_string())
    })?;
    let count = tensor
        .elements_size()
        .ok_or_else(|| InferError::Internal("constant tensor with symbolic shape".to_string()))?;
    match tensor.data_type {
        DataType::I64 => Ok((0..count).map(|i| read_at::<i64>(data, i)).collect()),
        DataType::I32 => Ok((0..count).map(|i| read_at::<i32>(data, i) as i64).collect()),
        other => Err(InferError::TypeUnsupported(format!(
            "index operand must be I32 or I64, got {}",
            other.name()
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tensor::DimVariable;
    use smallvec::smallvec;

    #[test]
    fn broadcast_aligns_from_the_right() {
        let a: Shape = smallvec![DimExpr::Value(2), DimExpr::Value(1)];
        let b: Shape = smallvec![DimExpr::Value(3)];
        let out = multidir_broadcast(&[&a, &b]).unwrap();
        assert_eq!(out.as_slice(), &[DimExpr::Value(2), DimExpr::Value(3)]);
    }

    #[test]
    fn broadcast_keeps_symbolic_dims() {
        let n = DimVariable::new("N");
        let a: Shape = smallvec![DimExpr::Variable(n.clone()), DimExpr::Value(3)];
        let b: Shape = smallvec![DimExpr::Value(3)];
        let out = multidir_broadcast(&[&a, &b]).unwrap();
        assert_eq!(out[0].as_variable(), Some(&n));
        assert_eq!(out[1], DimExpr::Value(3));
    }

    #[test]
    fn broadcast_conflict_against_unbound_variable_is_recoverable() {
        let a: Shape = smallvec![DimExpr::variable("N")];
        let b: Shape = smallvec![DimExpr::Value(3)];
        assert_eq!(
            multidir_broadcast(&[&a, &b]),
            Err(InferError::UnknownVariable("N".to_string()))
        );
    }

    #[test]
    fn broadcast_rejects_constant_conflicts() {
        let a: Shape = smallvec![DimExpr::Value(2)];
        let b: Shape = smallvec![DimExpr::Value(3)];
        assert!(matches!(
            multidir_broadcast(&[&a, &b]),
            Err(InferError::ShapeMismatch(_))
        ));
    }

    #[test]
    fn locate_round_trip() {
        let dims = [2usize, 3, 4];
        for k in 0..24 {
            let coords = locate_n(&dims, k);
            assert_eq!(locate_1(&dims, &coords), k);
        }
        // Broadcast axis contributes nothing.
        assert_eq!(locate_1(&[3, 1], &[2, 5]), 2);
    }

    #[test]
    fn axis_normalization() {
        assert_eq!(normalize_axis(-1, 3).unwrap(), 2);
        assert_eq!(normalize_axis(0, 3).unwrap(), 0);
        assert!(normalize_axis(3, 3).is_err());
        assert!(normalize_axis(-4, 3).is_err());
    }
}
