use std::collections::HashMap;

use infergraph::ops::{register_all, Attribute, InferError, OpType, Operator};
use infergraph::tensor::{DataType, DimExpr, Shape, Tensor};

fn operator(name: &str, attributes: &[(&str, Attribute)]) -> Operator {
    register_all();
    let attributes: HashMap<String, Attribute> = attributes
        .iter()
        .map(|(key, value)| (key.to_string(), value.clone()))
        .collect();
    Operator::new(OpType::parse(name), attributes)
}

fn dims(tensor: &Tensor) -> Vec<i64> {
    tensor
        .shape
        .iter()
        .map(|dim| dim.value().expect("dimension must be bound"))
        .collect()
}

fn sym(dims_spec: &[i64], names: &[(usize, &str)]) -> Tensor {
    let mut shape: Shape = dims_spec.iter().map(|&d| DimExpr::Value(d)).collect();
    for &(position, name) in names {
        shape[position] = DimExpr::variable(name);
    }
    Tensor::new(DataType::F32, shape)
}

fn i32s(tensor: &Tensor) -> Vec<i32> {
    tensor
        .data
        .as_ref()
        .unwrap()
        .chunks_exact(4)
        .map(|chunk| i32::from_le_bytes(chunk.try_into().unwrap()))
        .collect()
}

fn i64s(tensor: &Tensor) -> Vec<i64> {
    tensor
        .data
        .as_ref()
        .unwrap()
        .chunks_exact(8)
        .map(|chunk| i64::from_le_bytes(chunk.try_into().unwrap()))
        .collect()
}

fn f32s(tensor: &Tensor) -> Vec<f32> {
    tensor
        .data
        .as_ref()
        .unwrap()
        .chunks_exact(4)
        .map(|chunk| f32::from_le_bytes(chunk.try_into().unwrap()))
        .collect()
}

fn bools(tensor: &Tensor) -> Vec<bool> {
    tensor.data.as_ref().unwrap().iter().map(|&b| b != 0).collect()
}

#[test]
fn arithmetic_type_and_fold_behavior() {
    let add = operator("onnx::Add", &[]);
    let a = Tensor::from_f32(&[2], vec![1.0, 2.0]).unwrap();
    let b = Tensor::from_f32(&[2], vec![0.5, -2.0]).unwrap();
    let out = add.infer(&[a, b]).unwrap().remove(0);
    assert_eq!(f32s(&out), vec![1.5, 0.0]);

    // Integer division by zero folds to 0 instead of trapping.
    let div = operator("onnx::Div", &[]);
    let a = Tensor::from_i32(&[3], vec![7, -9, 5]).unwrap();
    let b = Tensor::from_i32(&[3], vec![2, 3, 0]).unwrap();
    let out = div.infer(&[a, b]).unwrap().remove(0);
    assert_eq!(i32s(&out), vec![3, -3, 0]);

    let pow = operator("onnx::Pow", &[]);
    let a = Tensor::from_i64(&[3], vec![2, 3, 2]).unwrap();
    let b = Tensor::from_i64(&[3], vec![10, 0, -1]).unwrap();
    let out = pow.infer(&[a, b]).unwrap().remove(0);
    assert_eq!(i64s(&out), vec![1024, 1, 0]);

    // Symbolic operands broadcast without folding.
    let add = operator("onnx::Add", &[]);
    let lhs = sym(&[0, 3], &[(0, "N")]);
    let rhs = Tensor::new(DataType::F32, [DimExpr::Value(3)].into_iter().collect());
    let out = add.infer(&[lhs, rhs]).unwrap().remove(0);
    assert!(!out.has_data());
    assert_eq!(out.rank(), 2);
    assert_eq!(out.shape[1], DimExpr::Value(3));
    assert!(out.shape[0].is_variable());
}

#[test]
fn boolean_connectives_require_bool() {
    let and = operator("onnx::And", &[]);
    let shape: Shape = [DimExpr::Value(4)].into_iter().collect();
    let a = Tensor::with_bytes(DataType::Bool, shape.clone(), vec![1, 1, 0, 0]).unwrap();
    let b = Tensor::with_bytes(DataType::Bool, shape, vec![1, 0, 1, 0]).unwrap();
    let out = and.infer(&[a.clone(), b.clone()]).unwrap().remove(0);
    assert_eq!(bools(&out), vec![true, false, false, false]);

    let xor = operator("onnx::Xor", &[]);
    let out = xor.infer(&[a, b]).unwrap().remove(0);
    assert_eq!(bools(&out), vec![false, true, true, false]);

    let and = operator("onnx::And", &[]);
    let a = Tensor::from_i32(&[1], vec![1]).unwrap();
    let b = Tensor::from_i32(&[1], vec![1]).unwrap();
    assert!(matches!(
        and.infer(&[a, b]),
        Err(InferError::TypeUnsupported(_))
    ));
}

#[test]
fn comparisons_produce_bool_tensors() {
    let less = operator("onnx::Less", &[]);
    let a = Tensor::from_i32(&[3], vec![1, 5, 3]).unwrap();
    let b = Tensor::from_i32(&[1], vec![3]).unwrap();
    let out = less.infer(&[a, b]).unwrap().remove(0);
    assert_eq!(out.data_type, DataType::Bool);
    assert_eq!(bools(&out), vec![true, false, false]);
}

#[test]
fn select_folds_elementwise_extrema() {
    let max = operator("onnx::Max", &[]);
    let a = Tensor::from_i32(&[2], vec![1, 5]).unwrap();
    let b = Tensor::from_i32(&[2], vec![3, 2]).unwrap();
    let c = Tensor::from_i32(&[1], vec![4]).unwrap();
    let out = max.infer(&[a, b, c]).unwrap().remove(0);
    assert_eq!(i32s(&out), vec![4, 5]);
}

#[test]
fn unary_folds_and_identity_shares_payload() {
    let neg = operator("onnx::Neg", &[]);
    let input = Tensor::from_f32(&[3], vec![1.0, -2.0, 0.0]).unwrap();
    let out = neg.infer(&[input]).unwrap().remove(0);
    assert_eq!(f32s(&out), vec![-1.0, 2.0, 0.0]);

    let sqrt = operator("onnx::Sqrt", &[]);
    let input = Tensor::from_f32(&[2], vec![4.0, 9.0]).unwrap();
    let out = sqrt.infer(&[input]).unwrap().remove(0);
    assert_eq!(f32s(&out), vec![2.0, 3.0]);

    let not = operator("onnx::Not", &[]);
    let input = Tensor::with_bytes(
        DataType::Bool,
        [DimExpr::Value(2)].into_iter().collect(),
        vec![1, 0],
    )
    .unwrap();
    let out = not.infer(&[input]).unwrap().remove(0);
    assert_eq!(bools(&out), vec![false, true]);

    let identity = operator("onnx::Identity", &[]);
    let input = Tensor::from_i32(&[2], vec![7, 8]).unwrap();
    let payload = input.data.clone().unwrap();
    let out = identity.infer(&[input]).unwrap().remove(0);
    assert!(std::sync::Arc::ptr_eq(&payload, out.data.as_ref().unwrap()));

    let neg = operator("onnx::Neg", &[]);
    let unsigned = Tensor::with_bytes(
        DataType::U32,
        [DimExpr::Value(1)].into_iter().collect(),
        vec![0; 4],
    )
    .unwrap();
    assert!(matches!(
        neg.infer(&[unsigned]),
        Err(InferError::TypeUnsupported(_))
    ));
}

#[test]
fn concat_sums_the_axis_and_folds() {
    let concat = operator("onnx::Concat", &[("axis", Attribute::Int(1))]);
    let a = Tensor::from_i32(&[2, 1], vec![1, 3]).unwrap();
    let b = Tensor::from_i32(&[2, 2], vec![10, 11, 30, 31]).unwrap();
    let out = concat.infer(&[a, b]).unwrap().remove(0);
    assert_eq!(dims(&out), vec![2, 3]);
    assert_eq!(i32s(&out), vec![1, 10, 11, 3, 30, 31]);

    let concat = operator("onnx::Concat", &[("axis", Attribute::Int(0))]);
    let a = Tensor::from_i32(&[1, 2], vec![1, 2]).unwrap();
    let b = Tensor::from_i32(&[1, 3], vec![1, 2, 3]).unwrap();
    assert!(matches!(
        concat.infer(&[a, b]),
        Err(InferError::ShapeMismatch(_))
    ));
}

#[test]
fn reshape_squeeze_unsqueeze_share_payload() {
    let reshape = operator("onnx::Reshape", &[]);
    let data = Tensor::from_i32(&[2, 3], vec![0, 1, 2, 3, 4, 5]).unwrap();
    let payload = data.data.clone().unwrap();
    let target = Tensor::from_i64(&[2], vec![3, -1]).unwrap();
    let out = reshape.infer(&[data, target]).unwrap().remove(0);
    assert_eq!(dims(&out), vec![3, 2]);
    assert!(std::sync::Arc::ptr_eq(&payload, out.data.as_ref().unwrap()));

    let squeeze = operator("onnx::Squeeze", &[]);
    let data = Tensor::from_i32(&[1, 2, 1, 3], (0..6).collect()).unwrap();
    let out = squeeze.infer(&[data]).unwrap().remove(0);
    assert_eq!(dims(&out), vec![2, 3]);

    let unsqueeze = operator("onnx::Unsqueeze", &[("axes", Attribute::Ints(vec![0, 3]))]);
    let data = Tensor::from_i32(&[2, 3], (0..6).collect()).unwrap();
    let out = unsqueeze.infer(&[data]).unwrap().remove(0);
    assert_eq!(dims(&out), vec![1, 2, 3, 1]);

    let squeeze = operator("onnx::Squeeze", &[("axes", Attribute::Ints(vec![1]))]);
    let data = Tensor::from_i32(&[2, 3], (0..6).collect()).unwrap();
    assert!(matches!(
        squeeze.infer(&[data]),
        Err(InferError::ShapeMismatch(_))
    ));
}

#[test]
fn transpose_reverses_axes_by_default() {
    let transpose = operator("onnx::Transpose", &[]);
    let data = Tensor::from_i32(&[2, 3], vec![0, 1, 2, 3, 4, 5]).unwrap();
    let out = transpose.infer(&[data]).unwrap().remove(0);
    assert_eq!(dims(&out), vec![3, 2]);
    assert_eq!(i32s(&out), vec![0, 3, 1, 4, 2, 5]);

    let transpose = operator("onnx::Transpose", &[("perm", Attribute::Ints(vec![0, 0]))]);
    let data = Tensor::from_i32(&[2, 2], vec![0; 4]).unwrap();
    assert!(matches!(
        transpose.infer(&[data]),
        Err(InferError::ShapeMismatch(_))
    ));
}

#[test]
fn shape_operator_materializes_bound_dims() {
    let shape_op = operator("onnx::Shape", &[]);
    let data = Tensor::from_i32(&[4, 5], vec![0; 20]).unwrap();
    let out = shape_op.infer(&[data]).unwrap().remove(0);
    assert_eq!(out.data_type, DataType::I64);
    assert_eq!(dims(&out), vec![2]);
    assert_eq!(i64s(&out), vec![4, 5]);

    let shape_op = operator("onnx::Shape", &[]);
    let symbolic = sym(&[0, 7], &[(0, "N")]);
    assert_eq!(
        shape_op.infer(&[symbolic]),
        Err(InferError::UnknownVariable("N".to_string()))
    );
}

#[test]
fn cast_converts_between_coded_types() {
    // Wire code 6 is I32.
    let cast = operator("onnx::Cast", &[("to", Attribute::Int(6))]);
    let data = Tensor::from_i64(&[3], vec![-1, 0, 300]).unwrap();
    let out = cast.infer(&[data]).unwrap().remove(0);
    assert_eq!(out.data_type, DataType::I32);
    assert_eq!(i32s(&out), vec![-1, 0, 300]);

    // Wire code 9 is Bool.
    let cast = operator("onnx::Cast", &[("to", Attribute::Int(9))]);
    let data = Tensor::from_f32(&[3], vec![0.0, 0.5, -2.0]).unwrap();
    let out = cast.infer(&[data]).unwrap().remove(0);
    assert_eq!(bools(&out), vec![false, true, true]);

    let cast = operator("onnx::Cast", &[("to", Attribute::Int(8))]);
    let data = Tensor::from_f32(&[1], vec![0.0]).unwrap();
    assert!(matches!(
        cast.infer(&[data]),
        Err(InferError::TypeUnsupported(_))
    ));
}

#[test]
fn where_selects_per_element() {
    let where_op = operator("onnx::Where", &[]);
    let cond = Tensor::with_bytes(
        DataType::Bool,
        [DimExpr::Value(2), DimExpr::Value(1)].into_iter().collect(),
        vec![1, 0],
    )
    .unwrap();
    let x = Tensor::from_i32(&[2], vec![1, 2]).unwrap();
    let y = Tensor::from_i32(&[2], vec![9, 8]).unwrap();
    let out = where_op.infer(&[cond, x, y]).unwrap().remove(0);
    assert_eq!(dims(&out), vec![2, 2]);
    assert_eq!(i32s(&out), vec![1, 2, 9, 8]);
}

#[test]
fn slice_clamps_and_strides() {
    let slice = operator("onnx::Slice", &[]);
    let data = Tensor::from_i32(&[5], vec![0, 10, 20, 30, 40]).unwrap();
    let starts = Tensor::from_i64(&[1], vec![1]).unwrap();
    let ends = Tensor::from_i64(&[1], vec![1000]).unwrap();
    let out = slice.infer(&[data, starts, ends]).unwrap().remove(0);
    assert_eq!(dims(&out), vec![4]);
    assert_eq!(i32s(&out), vec![10, 20, 30, 40]);

    let slice = operator("onnx::Slice", &[]);
    let data = Tensor::from_i32(&[5], vec![0, 10, 20, 30, 40]).unwrap();
    let starts = Tensor::from_i64(&[1], vec![-1]).unwrap();
    let ends = Tensor::from_i64(&[1], vec![-6]).unwrap();
    let axes = Tensor::from_i64(&[1], vec![0]).unwrap();
    let steps = Tensor::from_i64(&[1], vec![-2]).unwrap();
    let out = slice.infer(&[data, starts, ends, axes, steps]).unwrap().remove(0);
    assert_eq!(dims(&out), vec![3]);
    assert_eq!(i32s(&out), vec![40, 20, 0]);
}

#[test]
fn expand_and_tile_replicate_payloads() {
    let expand = operator("onnx::Expand", &[]);
    let data = Tensor::from_i32(&[1, 2], vec![4, 7]).unwrap();
    let target = Tensor::from_i64(&[2], vec![3, 2]).unwrap();
    let out = expand.infer(&[data, target]).unwrap().remove(0);
    assert_eq!(dims(&out), vec![3, 2]);
    assert_eq!(i32s(&out), vec![4, 7, 4, 7, 4, 7]);

    let tile = operator("onnx::Tile", &[]);
    let data = Tensor::from_i32(&[2], vec![1, 2]).unwrap();
    let repeats = Tensor::from_i64(&[1], vec![3]).unwrap();
    let out = tile.infer(&[data, repeats]).unwrap().remove(0);
    assert_eq!(dims(&out), vec![6]);
    assert_eq!(i32s(&out), vec![1, 2, 1, 2, 1, 2]);
}

#[test]
fn range_emits_the_arithmetic_sequence() {
    let range = operator("onnx::Range", &[]);
    let start = Tensor::from_i64(&[], vec![0]).unwrap();
    let limit = Tensor::from_i64(&[], vec![5]).unwrap();
    let delta = Tensor::from_i64(&[], vec![2]).unwrap();
    let out = range.infer(&[start, limit, delta]).unwrap().remove(0);
    assert_eq!(dims(&out), vec![3]);
    assert_eq!(i64s(&out), vec![0, 2, 4]);
}

#[test]
fn split_produces_sized_parts() {
    let split = operator("onnx::Split", &[("num_outputs", Attribute::Int(2))]);
    let data = Tensor::from_i32(&[4], vec![1, 2, 3, 4]).unwrap();
    let outputs = split.infer(&[data]).unwrap();
    assert_eq!(outputs.len(), 2);
    assert_eq!(i32s(&outputs[0]), vec![1, 2]);
    assert_eq!(i32s(&outputs[1]), vec![3, 4]);

    let split = operator("onnx::Split", &[("axis", Attribute::Int(1))]);
    let data = Tensor::from_i32(&[2, 3], vec![1, 2, 3, 4, 5, 6]).unwrap();
    let sizes = Tensor::from_i64(&[2], vec![2, 1]).unwrap();
    let outputs = split.infer(&[data, sizes]).unwrap();
    assert_eq!(dims(&outputs[0]), vec![2, 2]);
    assert_eq!(dims(&outputs[1]), vec![2, 1]);
    assert_eq!(i32s(&outputs[0]), vec![1, 2, 4, 5]);
    assert_eq!(i32s(&outputs[1]), vec![3, 6]);
}

#[test]
fn constant_and_constant_of_shape_materialize_data() {
    let value = Tensor::from_i32(&[2], vec![6, 7]).unwrap();
    let constant = operator("onnx::Constant", &[("value", Attribute::Tensor(value))]);
    let out = constant.infer(&[]).unwrap().remove(0);
    assert_eq!(i32s(&out), vec![6, 7]);

    let fill = Tensor::from_i32(&[1], vec![9]).unwrap();
    let cos = operator("onnx::ConstantOfShape", &[("value", Attribute::Tensor(fill))]);
    let shape = Tensor::from_i64(&[2], vec![2, 2]).unwrap();
    let out = cos.infer(&[shape]).unwrap().remove(0);
    assert_eq!(dims(&out), vec![2, 2]);
    assert_eq!(i32s(&out), vec![9, 9, 9, 9]);
}

#[test]
fn reduce_shapes_follow_axes_and_keepdims() {
    let reduce = operator(
        "onnx::ReduceSum",
        &[("axes", Attribute::Ints(vec![1])), ("keepdims", Attribute::Int(1))],
    );
    let data = Tensor::from_f32(&[2, 3, 4], vec![0.0; 24]).unwrap();
    let out = reduce.infer(&[data]).unwrap().remove(0);
    assert_eq!(dims(&out), vec![2, 1, 4]);

    let reduce = operator(
        "onnx::ReduceMean",
        &[("axes", Attribute::Ints(vec![-1])), ("keepdims", Attribute::Int(0))],
    );
    let data = Tensor::from_f32(&[2, 3, 4], vec![0.0; 24]).unwrap();
    let out = reduce.infer(&[data]).unwrap().remove(0);
    assert_eq!(dims(&out), vec![2, 3]);

    let reduce = operator("onnx::ReduceMax", &[]);
    let data = Tensor::from_f32(&[2, 3], vec![0.0; 6]).unwrap();
    let out = reduce.infer(&[data]).unwrap().remove(0);
    assert_eq!(dims(&out), vec![1, 1]);
}

#[test]
fn matmul_broadcasts_batches_and_checks_contraction() {
    let matmul = operator("onnx::MatMul", &[]);
    let a = Tensor::new(
        DataType::F32,
        [DimExpr::Value(5), DimExpr::Value(1), DimExpr::Value(2), DimExpr::Value(3)]
            .into_iter()
            .collect(),
    );
    let b = Tensor::new(
        DataType::F32,
        [DimExpr::Value(4), DimExpr::Value(3), DimExpr::Value(6)]
            .into_iter()
            .collect(),
    );
    let out = matmul.infer(&[a, b]).unwrap().remove(0);
    assert_eq!(dims(&out), vec![5, 4, 2, 6]);

    let matmul = operator("onnx::MatMul", &[]);
    let a = Tensor::from_f32(&[3], vec![0.0; 3]).unwrap();
    let b = Tensor::from_f32(&[3, 4], vec![0.0; 12]).unwrap();
    let out = matmul.infer(&[a, b]).unwrap().remove(0);
    assert_eq!(dims(&out), vec![4]);

    let matmul = operator("onnx::MatMul", &[]);
    let a = Tensor::from_f32(&[2, 3], vec![0.0; 6]).unwrap();
    let b = Tensor::from_f32(&[4, 5], vec![0.0; 20]).unwrap();
    assert!(matches!(
        matmul.infer(&[a, b]),
        Err(InferError::ShapeMismatch(_))
    ));

    // An unresolved contraction dimension is recoverable, not fatal.
    let matmul = operator("onnx::MatMul", &[]);
    let a = sym(&[2, 0], &[(1, "K")]);
    let b = Tensor::from_f32(&[3, 4], vec![0.0; 12]).unwrap();
    assert_eq!(
        matmul.infer(&[a, b]),
        Err(InferError::UnknownVariable("K".to_string()))
    );
}

#[test]
fn gemm_respects_transpositions() {
    let gemm = operator(
        "onnx::Gemm",
        &[("transA", Attribute::Int(0)), ("transB", Attribute::Int(1))],
    );
    let a = Tensor::from_f32(&[2, 3], vec![0.0; 6]).unwrap();
    let b = Tensor::from_f32(&[4, 3], vec![0.0; 12]).unwrap();
    let bias = Tensor::from_f32(&[4], vec![0.0; 4]).unwrap();
    let out = gemm.infer(&[a, b, bias]).unwrap().remove(0);
    assert_eq!(dims(&out), vec![2, 4]);
}

#[test]
fn pooling_and_conv_shape_arithmetic() {
    let pool = operator(
        "onnx::MaxPool",
        &[
            ("kernel_shape", Attribute::Ints(vec![2, 2])),
            ("strides", Attribute::Ints(vec![2, 2])),
        ],
    );
    let x = Tensor::from_f32(&[1, 3, 32, 32], vec![0.0; 3 * 32 * 32]).unwrap();
    let out = pool.infer(&[x]).unwrap().remove(0);
    assert_eq!(dims(&out), vec![1, 3, 16, 16]);

    let global = operator("onnx::GlobalAveragePool", &[]);
    let x = Tensor::from_f32(&[1, 3, 8, 8], vec![0.0; 3 * 64]).unwrap();
    let out = global.infer(&[x]).unwrap().remove(0);
    assert_eq!(dims(&out), vec![1, 3, 1, 1]);

    let conv = operator(
        "onnx::Conv",
        &[
            ("strides", Attribute::Ints(vec![2, 2])),
            ("pads", Attribute::Ints(vec![3, 3, 3, 3])),
        ],
    );
    let x = sym(&[0, 3, 224, 224], &[(0, "N")]);
    let w = Tensor::from_f32(&[64, 3, 7, 7], vec![0.0; 64 * 3 * 49]).unwrap();
    let out = conv.infer(&[x, w]).unwrap().remove(0);
    assert!(out.shape[0].is_variable());
    assert_eq!(out.shape[1], DimExpr::Value(64));
    assert_eq!(out.shape[2], DimExpr::Value(112));
    assert_eq!(out.shape[3], DimExpr::Value(112));
}

#[test]
fn einsum_binds_labels() {
    let einsum = operator(
        "onnx::Einsum",
        &[("equation", Attribute::String("ij,jk->ik".to_string()))],
    );
    let a = Tensor::from_f32(&[2, 3], vec![0.0; 6]).unwrap();
    let b = Tensor::from_f32(&[3, 4], vec![0.0; 12]).unwrap();
    let out = einsum.infer(&[a, b]).unwrap().remove(0);
    assert_eq!(dims(&out), vec![2, 4]);

    // Implicit output: labels used once, alphabetically.
    let einsum = operator(
        "onnx::Einsum",
        &[("equation", Attribute::String("ij,jk".to_string()))],
    );
    let a = Tensor::from_f32(&[2, 3], vec![0.0; 6]).unwrap();
    let b = Tensor::from_f32(&[3, 4], vec![0.0; 12]).unwrap();
    let out = einsum.infer(&[a, b]).unwrap().remove(0);
    assert_eq!(dims(&out), vec![2, 4]);
}

#[test]
fn batch_normalization_and_softmax_pass_shapes_through() {
    let bn = operator("onnx::BatchNormalization", &[]);
    let x = Tensor::from_f32(&[2, 4, 3], vec![0.0; 24]).unwrap();
    let param = || Tensor::from_f32(&[4], vec![0.0; 4]).unwrap();
    let out = bn.infer(&[x, param(), param(), param(), param()]).unwrap().remove(0);
    assert_eq!(dims(&out), vec![2, 4, 3]);

    let softmax = operator("onnx::Softmax", &[]);
    let x = Tensor::from_f32(&[2, 5], vec![0.0; 10]).unwrap();
    let out = softmax.infer(&[x]).unwrap().remove(0);
    assert_eq!(dims(&out), vec![2, 5]);

    let softmax = operator("onnx::Softmax", &[]);
    let x = Tensor::from_i32(&[2, 5], vec![0; 10]).unwrap();
    assert!(matches!(
        softmax.infer(&[x]),
        Err(InferError::TypeUnsupported(_))
    ));
}

#[test]
fn gather_elements_takes_the_indices_shape() {
    let gather = operator("onnx::GatherElements", &[("axis", Attribute::Int(1))]);
    let data = Tensor::from_f32(&[3, 4], vec![0.0; 12]).unwrap();
    let indices = Tensor::from_i64(&[3, 2], vec![0; 6]).unwrap();
    let out = gather.infer(&[data, indices]).unwrap().remove(0);
    assert_eq!(dims(&out), vec![3, 2]);
    assert_eq!(out.data_type, DataType::F32);
}

#[test]
fn cum_sum_validates_axis_operand() {
    let cumsum = operator("onnx::CumSum", &[]);
    let x = Tensor::from_f32(&[2, 3], vec![0.0; 6]).unwrap();
    let axis = Tensor::from_i64(&[], vec![1]).unwrap();
    let out = cumsum.infer(&[x, axis]).unwrap().remove(0);
    assert_eq!(dims(&out), vec![2, 3]);

    let cumsum = operator("onnx::CumSum", &[]);
    let x = Tensor::from_f32(&[2, 3], vec![0.0; 6]).unwrap();
    let axis = Tensor::from_i64(&[], vec![5]).unwrap();
    assert!(matches!(
        cumsum.infer(&[x, axis]),
        Err(InferError::ShapeMismatch(_))
    ));
}

#[test]
fn infer_reports_missing_and_mistyped_attributes() {
    let concat = operator("onnx::Concat", &[]);
    let a = Tensor::from_i32(&[1], vec![1]).unwrap();
    let b = Tensor::from_i32(&[1], vec![2]).unwrap();
    assert_eq!(
        concat.infer(&[a, b]),
        Err(InferError::AttributeMissing("axis".to_string()))
    );

    let concat = operator("onnx::Concat", &[("axis", Attribute::Float(0.0))]);
    let a = Tensor::from_i32(&[1], vec![1]).unwrap();
    let b = Tensor::from_i32(&[1], vec![2]).unwrap();
    assert!(matches!(
        concat.infer(&[a, b]),
        Err(InferError::AttributeType(_))
    ));
}
