//! Enumerates the scalar element types tensors can carry.

use serde::{Deserialize, Serialize};

/// Logical element type shared between graph edges and backend kernels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DataType {
    /// 32-bit floating point following IEEE-754 semantics.
    F32,
    /// 8-bit unsigned integer.
    U8,
    /// 8-bit signed integer.
    I8,
    /// 16-bit unsigned integer.
    U16,
    /// 16-bit signed integer.
    I16,
    /// 32-bit signed integer.
    I32,
    /// 64-bit signed integer, the canonical type for shape traffic.
    I64,
    /// Boolean stored as one byte.
    Bool,
    /// 16-bit floating point with full mantissa (fp16).
    FP16,
    /// 64-bit floating point.
    F64,
    /// 32-bit unsigned integer.
    U32,
    /// 64-bit unsigned integer.
    U64,
    /// Complex number of two `f32` parts.
    Complex64,
    /// Complex number of two `f64` parts.
    Complex128,
    /// 16-bit brain floating point as used by many accelerators.
    BF16,
}

impl DataType {
    /// Parses the persisted wire code (1..13). Code 8 and the codes for the
    /// complex and bfloat kinds are reserved and yield `None`.
    pub fn parse(code: u8) -> Option<Self> {
        match code {
            1 => Some(DataType::F32),
            2 => Some(DataType::U8),
            3 => Some(DataType::I8),
            4 => Some(DataType::U16),
            5 => Some(DataType::I16),
            6 => Some(DataType::I32),
            7 => Some(DataType::I64),
            9 => Some(DataType::Bool),
            10 => Some(DataType::FP16),
            11 => Some(DataType::F64),
            12 => Some(DataType::U32),
            13 => Some(DataType::U64),
            _ => None,
        }
    }

    /// Returns the wire code for kinds that have one.
    pub fn to_code(self) -> Option<u8> {
        match self {
            DataType::F32 => Some(1),
            DataType::U8 => Some(2),
            DataType::I8 => Some(3),
            DataType::U16 => Some(4),
            DataType::I16 => Some(5),
            DataType::I32 => Some(6),
            DataType::I64 => Some(7),
            DataType::Bool => Some(9),
            DataType::FP16 => Some(10),
            DataType::F64 => Some(11),
            DataType::U32 => Some(12),
            DataType::U64 => Some(13),
            DataType::Complex64 | DataType::Complex128 | DataType::BF16 => None,
        }
    }

    /// Returns the number of bytes required per scalar element.
    pub fn size(self) -> usize {
        match self {
            DataType::U8 | DataType::I8 | DataType::Bool => 1,
            DataType::U16 | DataType::I16 | DataType::FP16 | DataType::BF16 => 2,
            DataType::F32 | DataType::I32 | DataType::U32 => 4,
            DataType::I64 | DataType::F64 | DataType::U64 | DataType::Complex64 => 8,
            DataType::Complex128 => 16,
        }
    }

    /// Returns a stable human-readable label.
    pub fn name(self) -> &'static str {
        match self {
            DataType::F32 => "F32",
            DataType::U8 => "U8",
            DataType::I8 => "I8",
            DataType::U16 => "U16",
            DataType::I16 => "I16",
            DataType::I32 => "I32",
            DataType::I64 => "I64",
            DataType::Bool => "Bool",
            DataType::FP16 => "FP16",
            DataType::F64 => "F64",
            DataType::U32 => "U32",
            DataType::U64 => "U64",
            DataType::Complex64 => "Complex64",
            DataType::Complex128 => "Complex128",
            DataType::BF16 => "BF16",
        }
    }

    /// Strict IEEE-754 floating kinds (excludes BF16).
    pub fn is_ieee754(self) -> bool {
        matches!(self, DataType::F32 | DataType::FP16 | DataType::F64)
    }

    /// All floating kinds, including BF16.
    pub fn is_float(self) -> bool {
        matches!(
            self,
            DataType::F32 | DataType::FP16 | DataType::F64 | DataType::BF16
        )
    }

    /// Kinds whose value range includes negative numbers.
    pub fn is_signed(self) -> bool {
        matches!(
            self,
            DataType::F32
                | DataType::I32
                | DataType::I64
                | DataType::FP16
                | DataType::F64
                | DataType::BF16
        )
    }

    /// Every kind arithmetic is defined over: all but Bool and the complex pair.
    pub fn is_numeric(self) -> bool {
        matches!(
            self,
            DataType::F32
                | DataType::U8
                | DataType::I8
                | DataType::U16
                | DataType::I16
                | DataType::I32
                | DataType::I64
                | DataType::FP16
                | DataType::F64
                | DataType::U32
                | DataType::U64
                | DataType::BF16
        )
    }

    pub fn is_bool(self) -> bool {
        self == DataType::Bool
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn wire_codes_round_trip() {
        for code in 0..=u8::MAX {
            if let Some(dt) = DataType::parse(code) {
                assert_eq!(dt.to_code(), Some(code));
            }
        }
        assert_eq!(DataType::parse(8), None);
        assert_eq!(DataType::parse(14), None);
        assert_eq!(DataType::BF16.to_code(), None);
        assert_eq!(DataType::Complex128.to_code(), None);
    }

    #[test]
    fn classification_predicates() {
        assert!(DataType::BF16.is_float());
        assert!(!DataType::BF16.is_ieee754());
        assert!(DataType::FP16.is_ieee754());
        assert!(DataType::U64.is_numeric());
        assert!(!DataType::Bool.is_numeric());
        assert!(!DataType::Complex64.is_numeric());
        assert!(DataType::Bool.is_bool());
        assert!(DataType::I64.is_signed());
        assert!(!DataType::U32.is_signed());
    }

    #[test]
    fn element_sizes() {
        assert_eq!(DataType::Bool.size(), 1);
        assert_eq!(DataType::FP16.size(), 2);
        assert_eq!(DataType::F32.size(), 4);
        assert_eq!(DataType::Complex64.size(), 8);
        assert_eq!(DataType::Complex128.size(), 16);
    }
}
