//! Reference CPU kernels for the element-wise families. Both are driven by
//! the same scalar tables the inference engine uses for constant folding, so
//! folded and lowered results agree bit for bit.

use crate::tensor::{read_at, write_at, DataType, Tensor};

use super::{BinaryOp, Broadcaster, Kernel, KernelBox, Resources, Routine, UnaryOp};

/// True when the reference CPU path can serve this (op, element type) pair.
/// FP16/BF16 stay unsupported here and degrade to shape-only folding.
pub(crate) fn binary_supported(op: BinaryOp, dtype: DataType) -> bool {
    match op {
        BinaryOp::And | BinaryOp::Or | BinaryOp::Xor => dtype.is_bool(),
        _ => matches!(
            dtype,
            DataType::F32
                | DataType::F64
                | DataType::I8
                | DataType::I16
                | DataType::I32
                | DataType::I64
                | DataType::U8
                | DataType::U16
                | DataType::U32
                | DataType::U64
        ),
    }
}

pub(crate) fn unary_supported(op: UnaryOp, dtype: DataType) -> bool {
    match op {
        UnaryOp::Identity => true,
        UnaryOp::Not => dtype.is_bool(),
        UnaryOp::Abs => matches!(
            dtype,
            DataType::F32
                | DataType::F64
                | DataType::I8
                | DataType::I16
                | DataType::I32
                | DataType::I64
                | DataType::U8
                | DataType::U16
                | DataType::U32
                | DataType::U64
        ),
        UnaryOp::Neg => matches!(
            dtype,
            DataType::F32 | DataType::F64 | DataType::I8 | DataType::I16 | DataType::I32 | DataType::I64
        ),
        _ => matches!(dtype, DataType::F32 | DataType::F64),
    }
}

fn element_loop<T: Copy>(plan: &Broadcaster, a: &[u8], b: &[u8], out: &mut [u8], f: impl Fn(T, T) -> T) {
    let mut pos = [0usize; 2];
    for k in 0..plan.outputs_count {
        plan.locate(k, &mut pos);
        let x = read_at::<T>(a, pos[0]);
        let y = read_at::<T>(b, pos[1]);
        write_at(out, k, f(x, y));
    }
}

/// Executes a broadcast binary op over raw payloads. Returns `false` when the
/// (op, element type) pair is unsupported, leaving `out` untouched.
///
/// Integer division and power are total: a zero divisor, `MIN / -1`, or an
/// out-of-range exponent yields 0 instead of trapping.
pub(crate) fn run_binary(
    op: BinaryOp,
    dtype: DataType,
    plan: &Broadcaster,
    a: &[u8],
    b: &[u8],
    out: &mut [u8],
) -> bool {
    if !binary_supported(op, dtype) {
        return false;
    }

    macro_rules! int_loop {
        ($t:ty) => {{
            let f: fn($t, $t) -> $t = match op {
                BinaryOp::Add => |x, y| x.wrapping_add(y),
                BinaryOp::Sub => |x, y| x.wrapping_sub(y),
                BinaryOp::Mul => |x, y| x.wrapping_mul(y),
                BinaryOp::Div => |x, y| x.checked_div(y).unwrap_or(0),
                BinaryOp::Pow => |x, y| match u32::try_from(y) {
                    Ok(exp) => x.checked_pow(exp).unwrap_or(0),
                    Err(_) => 0,
                },
                _ => return false,
            };
            element_loop::<$t>(plan, a, b, out, f)
        }};
    }
    macro_rules! float_loop {
        ($t:ty) => {{
            let f: fn($t, $t) -> $t = match op {
                BinaryOp::Add => |x, y| x + y,
                BinaryOp::Sub => |x, y| x - y,
                BinaryOp::Mul => |x, y| x * y,
                BinaryOp::Div => |x, y| x / y,
                BinaryOp::Pow => |x, y| x.powf(y),
                _ => return false,
            };
            element_loop::<$t>(plan, a, b, out, f)
        }};
    }

    match dtype {
        DataType::F32 => float_loop!(f32),
        DataType::F64 => float_loop!(f64),
        DataType::I8 => int_loop!(i8),
        DataType::I16 => int_loop!(i16),
        DataType::I32 => int_loop!(i32),
        DataType::I64 => int_loop!(i64),
        DataType::U8 => int_loop!(u8),
        DataType::U16 => int_loop!(u16),
        DataType::U32 => int_loop!(u32),
        DataType::U64 => int_loop!(u64),
        DataType::Bool => {
            let f: fn(u8, u8) -> u8 = match op {
                BinaryOp::And => |x, y| (x != 0 && y != 0) as u8,
                BinaryOp::Or => |x, y| (x != 0 || y != 0) as u8,
                BinaryOp::Xor => |x, y| ((x != 0) != (y != 0)) as u8,
                _ => return false,
            };
            element_loop::<u8>(plan, a, b, out, f)
        }
        _ => return false,
    }
    true
}

fn map_loop<T: Copy>(input: &[u8], out: &mut [u8], count: usize, f: impl Fn(T) -> T) {
    for i in 0..count {
        write_at(out, i, f(read_at::<T>(input, i)));
    }
}

/// Executes a contiguous unary op over a raw payload; `false` when the pair
/// is unsupported.
pub(crate) fn run_unary(
    op: UnaryOp,
    dtype: DataType,
    count: usize,
    input: &[u8],
    out: &mut [u8],
) -> bool {
    if !unary_supported(op, dtype) {
        return false;
    }
    if op == UnaryOp::Identity {
        out.copy_from_slice(input);
        return true;
    }

    macro_rules! float_unary {
        ($t:ty, $erf:path) => {{
            let f: fn($t) -> $t = match op {
                UnaryOp::Abs => |x| x.abs(),
                UnaryOp::Acos => |x| x.acos(),
                UnaryOp::Acosh => |x| x.acosh(),
                UnaryOp::Asin => |x| x.asin(),
                UnaryOp::Asinh => |x| x.asinh(),
                UnaryOp::Atan => |x| x.atan(),
                UnaryOp::Atanh => |x| x.atanh(),
                UnaryOp::Cos => |x| x.cos(),
                UnaryOp::Cosh => |x| x.cosh(),
                UnaryOp::Sin => |x| x.sin(),
                UnaryOp::Sinh => |x| x.sinh(),
                UnaryOp::Tan => |x| x.tan(),
                UnaryOp::Tanh => |x| x.tanh(),
                UnaryOp::Relu => |x| if x > 0.0 { x } else { 0.0 },
                UnaryOp::Sqrt => |x| x.sqrt(),
                UnaryOp::Sigmoid => |x| 1.0 / (1.0 + (-x).exp()),
                UnaryOp::Erf => |x| $erf(x),
                UnaryOp::Log => |x| x.ln(),
                UnaryOp::Neg => |x| -x,
                _ => return false,
            };
            map_loop::<$t>(input, out, count, f)
        }};
    }
    macro_rules! signed_unary {
        ($t:ty) => {{
            let f: fn($t) -> $t = match op {
                UnaryOp::Abs => |x| x.wrapping_abs(),
                UnaryOp::Neg => |x| x.wrapping_neg(),
                _ => return false,
            };
            map_loop::<$t>(input, out, count, f)
        }};
    }

    match dtype {
        DataType::F32 => float_unary!(f32, libm::erff),
        DataType::F64 => float_unary!(f64, libm::erf),
        DataType::I8 => signed_unary!(i8),
        DataType::I16 => signed_unary!(i16),
        DataType::I32 => signed_unary!(i32),
        DataType::I64 => signed_unary!(i64),
        // Abs on unsigned kinds is the identity.
        DataType::U8 | DataType::U16 | DataType::U32 | DataType::U64 => match op {
            UnaryOp::Abs => out.copy_from_slice(input),
            _ => return false,
        },
        DataType::Bool => match op {
            UnaryOp::Not => map_loop::<u8>(input, out, count, |x| (x == 0) as u8),
            _ => return false,
        },
        _ => return false,
    }
    true
}

fn concrete_dims(tensor: &Tensor) -> Option<Vec<usize>> {
    tensor
        .shape
        .iter()
        .map(|dim| usize::try_from(dim.value()?).ok())
        .collect()
}

/// Broadcast element-wise binary kernel over contiguous payloads.
pub struct BinaryBroadcastCpu {
    op: BinaryOp,
    dtype: DataType,
    plan: Broadcaster,
}

impl BinaryBroadcastCpu {
    /// Plans a kernel for the given tensors; `None` when the element type is
    /// unsupported, the operands disagree, or a shape is still symbolic.
    pub fn build(op: BinaryOp, a: &Tensor, b: &Tensor, c: &Tensor) -> Option<KernelBox> {
        let dtype = a.data_type;
        if b.data_type != dtype || c.data_type != dtype {
            return None;
        }
        if !binary_supported(op, dtype) {
            return None;
        }
        let a_dims = concrete_dims(a)?;
        let b_dims = concrete_dims(b)?;
        let plan = Broadcaster::new(&[&a_dims, &b_dims]).ok()?;
        if c.elements_size()? != plan.outputs_count {
            return None;
        }
        Some(Box::new(BinaryBroadcastCpu { op, dtype, plan }))
    }
}

impl Kernel for BinaryBroadcastCpu {
    fn name(&self) -> &'static str {
        "simple_binary_cpu"
    }

    fn lower(&self, _resources: &Resources) -> Routine {
        let op = self.op;
        let dtype = self.dtype;
        let plan = self.plan.clone();
        Box::new(move |_resources, inputs, outputs| {
            let out = &mut *outputs[0];
            let ok = run_binary(op, dtype, &plan, inputs[0], inputs[1], out);
            debug_assert!(ok, "kernel built for unsupported pair");
        })
    }
}

/// Contiguous element-wise unary kernel.
pub struct UnaryContiguousCpu {
    op: UnaryOp,
    dtype: DataType,
    count: usize,
}

impl UnaryContiguousCpu {
    pub fn build(op: UnaryOp, input: &Tensor, output: &Tensor) -> Option<KernelBox> {
        let dtype = input.data_type;
        if !unary_supported(op, dtype) {
            return None;
        }
        let count = input.elements_size()?;
        if output.elements_size()? != count {
            return None;
        }
        Some(Box::new(UnaryContiguousCpu { op, dtype, count }))
    }
}

impl Kernel for UnaryContiguousCpu {
    fn name(&self) -> &'static str {
        "simple_unary_cpu"
    }

    fn lower(&self, _resources: &Resources) -> Routine {
        let op = self.op;
        let dtype = self.dtype;
        let count = self.count;
        Box::new(move |_resources, inputs, outputs| {
            let out = &mut *outputs[0];
            let ok = run_unary(op, dtype, count, inputs[0], out);
            debug_assert!(ok, "kernel built for unsupported pair");
        })
    }
}
