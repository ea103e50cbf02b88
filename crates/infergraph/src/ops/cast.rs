//! Element-type conversion.

use std::sync::Arc;

use half::{bf16, f16};

use crate::kernel::collectors::NoCandidates;
use crate::kernel::{CollectorBox, Target};
use crate::tensor::{as_bytes, read_at, DataType, Tensor};

use super::support::{expect_arity, should_calculate};
use super::{InferError, InferResult, Operator};

fn read_f64(dtype: DataType, bytes: &[u8], i: usize) -> Option<f64> {
    Some(match dtype {
        DataType::F32 => read_at::<f32>(bytes, i) as f64,
        DataType::F64 => read_at::<f64>(bytes, i),
        DataType::FP16 => read_at::<f16>(bytes, i).to_f64(),
        DataType::BF16 => read_at::<bf16>(bytes, i).to_f64(),
        DataType::I8 => read_at::<i8>(bytes, i) as f64,
        DataType::I16 => read_at::<i16>(bytes, i) as f64,
        DataType::I32 => read_at::<i32>(bytes, i) as f64,
        DataType::I64 => read_at::<i64>(bytes, i) as f64,
        DataType::U8 => read_at::<u8>(bytes, i) as f64,
        DataType::U16 => read_at::<u16>(bytes, i) as f64,
        DataType::U32 => read_at::<u32>(bytes, i) as f64,
        DataType::U64 => read_at::<u64>(bytes, i) as f64,
        DataType::Bool => (read_at::<u8>(bytes, i) != 0) as u8 as f64,
        _ => return None,
    })
}

fn read_i128(dtype: DataType, bytes: &[u8], i: usize) -> Option<i128> {
    Some(match dtype {
        DataType::I8 => read_at::<i8>(bytes, i) as i128,
        DataType::I16 => read_at::<i16>(bytes, i) as i128,
        DataType::I32 => read_at::<i32>(bytes, i) as i128,
        DataType::I64 => read_at::<i64>(bytes, i) as i128,
        DataType::U8 => read_at::<u8>(bytes, i) as i128,
        DataType::U16 => read_at::<u16>(bytes, i) as i128,
        DataType::U32 => read_at::<u32>(bytes, i) as i128,
        DataType::U64 => read_at::<u64>(bytes, i) as i128,
        DataType::Bool => (read_at::<u8>(bytes, i) != 0) as i128,
        _ => return None,
    })
}

fn is_integral(dtype: DataType) -> bool {
    matches!(
        dtype,
        DataType::I8
            | DataType::I16
            | DataType::I32
            | DataType::I64
            | DataType::U8
            | DataType::U16
            | DataType::U32
            | DataType::U64
            | DataType::Bool
    )
}

/// Converts a constant payload. Integral→integral pairs go through `i128` so
/// wide values survive; any pair touching a float goes through `f64`.
fn convert(from: DataType, to: DataType, bytes: &[u8], count: usize) -> Option<Vec<u8>> {
    macro_rules! collect {
        ($ty:ty, $get:expr) => {{
            let values: Vec<$ty> = (0..count).map($get).collect();
            Some(as_bytes(&values).to_vec())
        }};
    }

    if is_integral(from) && is_integral(to) {
        let get = |i: usize| read_i128(from, bytes, i).expect("integral source");
        return match to {
            DataType::I8 => collect!(i8, |i| get(i) as i8),
            DataType::I16 => collect!(i16, |i| get(i) as i16),
            DataType::I32 => collect!(i32, |i| get(i) as i32),
            DataType::I64 => collect!(i64, |i| get(i) as i64),
            DataType::U8 => collect!(u8, |i| get(i) as u8),
            DataType::U16 => collect!(u16, |i| get(i) as u16),
            DataType::U32 => collect!(u32, |i| get(i) as u32),
            DataType::U64 => collect!(u64, |i| get(i) as u64),
            DataType::Bool => collect!(u8, |i| (get(i) != 0) as u8),
            _ => None,
        };
    }

    if matches!(from, DataType::Complex64 | DataType::Complex128) {
        return None;
    }
    let get = |i: usize| read_f64(from, bytes, i).expect("complex sources were rejected");
    match to {
        DataType::F32 => collect!(f32, |i| get(i) as f32),
        DataType::F64 => collect!(f64, get),
        DataType::FP16 => collect!(f16, |i| f16::from_f64(get(i))),
        DataType::BF16 => collect!(bf16, |i| bf16::from_f64(get(i))),
        DataType::I8 => collect!(i8, |i| get(i) as i8),
        DataType::I16 => collect!(i16, |i| get(i) as i16),
        DataType::I32 => collect!(i32, |i| get(i) as i32),
        DataType::I64 => collect!(i64, |i| get(i) as i64),
        DataType::U8 => collect!(u8, |i| get(i) as u8),
        DataType::U16 => collect!(u16, |i| get(i) as u16),
        DataType::U32 => collect!(u32, |i| get(i) as u32),
        DataType::U64 => collect!(u64, |i| get(i) as u64),
        DataType::Bool => collect!(u8, |i| (get(i) != 0.0) as u8),
        _ => None,
    }
}

pub(super) fn infer(op: &Operator, inputs: &[Tensor]) -> InferResult {
    expect_arity(inputs, 1)?;
    let data = &inputs[0];
    let code = op.attribute("to")?.int()?;
    let to = u8::try_from(code)
        .ok()
        .and_then(DataType::parse)
        .ok_or_else(|| InferError::TypeUnsupported(format!("cast target code {code}")))?;

    let mut ans = Tensor::new(to, data.shape.clone());
    if !should_calculate(inputs, &ans.shape) {
        return Ok(vec![ans]);
    }
    let count = ans
        .elements_size()
        .ok_or_else(|| InferError::Internal("fold gate admitted symbolic shape".to_string()))?;
    if let Some(bytes) = convert(data.data_type, to, data.data.as_ref().unwrap(), count) {
        ans.data = Some(Arc::from(bytes.into_boxed_slice()));
    }
    Ok(vec![ans])
}

pub(super) fn collector(_op: &Operator, target: Target) -> CollectorBox {
    Box::new(NoCandidates { target })
}
