//! Register classification (§4.D steps 1-2), grounded verbatim in
//! `tb/src/abi.c`'s `debug_type_size`/`debug_type_align`/`classify_reg`.

use crate::debug_type::DebugType;
use tb_ir::{DataType, DataTypeKind};
use tb_module::{Abi, PrototypeDataType};
use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RegClass {
    Integer,
    Sse,
    Memory,
}

#[derive(Debug, Error)]
pub enum AbiError {
    #[error("ABI not implemented: {0:?}")]
    NotImplemented(Abi),
}

/// `(bits + 7) / 8` for integers; 8 for pointers; record size is explicit;
/// float size by format tag. Matches `debug_type_size` exactly.
pub fn debug_type_size(t: &DebugType) -> u32 {
    match t {
        DebugType::Void => 0,
        DebugType::Bool => 1,
        DebugType::Int { bits, .. } => (*bits as u32 + 7) / 8,
        DebugType::Pointer => 8,
        DebugType::Float32 => 4,
        DebugType::Float64 => 8,
        DebugType::Record { size, .. } => *size,
    }
}

/// Alignment equals size for scalars; records carry an explicit align.
pub fn debug_type_align(t: &DebugType) -> u32 {
    match t {
        DebugType::Record { align, .. } => *align,
        other => debug_type_size(other),
    }
}

/// Win64 only; SystemV is declared `NotImplemented` (§4.D step 1).
pub fn classify_reg(abi: Abi, t: &DebugType) -> Result<RegClass, AbiError> {
    match abi {
        Abi::Win64 => {
            if debug_type_size(t) > 8 {
                return Ok(RegClass::Memory);
            }
            Ok(if matches!(t, DebugType::Float32 | DebugType::Float64) {
                RegClass::Sse
            } else {
                RegClass::Integer
            })
        }
    }
}

/// `debug_type_to_tb`: maps a debug type to its IR [`DataType`]. Aggregates,
/// functions, and arrays all degrade to a pointer per the original (this
/// core only models records, not arrays/functions-as-values).
pub fn debug_type_to_ir(t: &DebugType) -> DataType {
    match t {
        DebugType::Void => DataType::void(),
        DebugType::Bool => DataType::int(8),
        DebugType::Int { bits, .. } => DataType::int(*bits),
        DebugType::Pointer | DebugType::Record { .. } => DataType::ptr(),
        DebugType::Float32 => DataType::float32(),
        DebugType::Float64 => DataType::float64(),
    }
}

pub fn debug_type_to_prototype(t: &DebugType) -> PrototypeDataType {
    match t {
        DebugType::Void => PrototypeDataType::Void,
        DebugType::Bool => PrototypeDataType::Int(8),
        DebugType::Int { bits, .. } => PrototypeDataType::Int(*bits),
        DebugType::Pointer | DebugType::Record { .. } => PrototypeDataType::Ptr,
        DebugType::Float32 => PrototypeDataType::Float32,
        DebugType::Float64 => PrototypeDataType::Float64,
    }
}

pub fn prototype_to_ir(t: PrototypeDataType) -> DataType {
    match t {
        PrototypeDataType::Void => DataType::void(),
        PrototypeDataType::Int(bits) => DataType::int(bits),
        PrototypeDataType::Ptr => DataType::ptr(),
        PrototypeDataType::Float32 => DataType::float32(),
        PrototypeDataType::Float64 => DataType::float64(),
    }
}

pub fn ir_kind_is_control(dt: &DataType) -> bool {
    dt.kind == DataTypeKind::Control
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn win64_scalar_int_is_integer_class() {
        let t = DebugType::Int { bits: 32, signed: true };
        assert_eq!(classify_reg(Abi::Win64, &t).unwrap(), RegClass::Integer);
    }

    #[test]
    fn win64_float_is_sse_class() {
        assert_eq!(classify_reg(Abi::Win64, &DebugType::Float64).unwrap(), RegClass::Sse);
    }

    #[test]
    fn win64_large_record_is_memory_class() {
        let t = DebugType::Record { size: 16, align: 8 };
        assert_eq!(classify_reg(Abi::Win64, &t).unwrap(), RegClass::Memory);
    }

    #[test]
    fn win64_small_record_is_integer_class() {
        let t = DebugType::Record { size: 8, align: 8 };
        assert_eq!(classify_reg(Abi::Win64, &t).unwrap(), RegClass::Integer);
    }

    #[test]
    fn integer_size_rounds_bits_up_to_bytes() {
        assert_eq!(debug_type_size(&DebugType::Int { bits: 1, signed: false }), 1);
        assert_eq!(debug_type_size(&DebugType::Int { bits: 17, signed: false }), 3);
    }

    #[test]
    fn record_alignment_is_explicit_not_derived_from_size() {
        let t = DebugType::Record { size: 24, align: 8 };
        assert_eq!(debug_type_align(&t), 8);
    }
}
