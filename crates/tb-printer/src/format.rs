//! Shared label-formatting helpers used by both the DOT and JSON printers.

use tb_ir::{DataType, DataTypeKind};

pub fn format_dt(dt: &DataType) -> String {
    let base = match dt.kind {
        DataTypeKind::Int if dt.data == 0 => "void".to_string(),
        DataTypeKind::Int => format!("i{}", dt.data),
        DataTypeKind::Ptr => "ptr".to_string(),
        DataTypeKind::Float if dt.data == 64 => "f64".to_string(),
        DataTypeKind::Float => format!("f{}", dt.data),
        DataTypeKind::Tuple => "tuple".to_string(),
        DataTypeKind::Control => "ctrl".to_string(),
    };
    if dt.width == 0 {
        base
    } else {
        format!("{base}x{}", dt.vector_width())
    }
}

fn sign_extend(value: u64, bits: u16) -> i64 {
    if bits == 0 || bits >= 64 {
        return value as i64;
    }
    let shift = 64 - bits as u32;
    ((value << shift) as i64) >> shift
}

/// Integer constant formatting (supplemented from `ir_printer.c`): small
/// single-word constants (`< 0xFFFF`) print in decimal, sign-extended to
/// the node's bit width; multi-word or large constants print in hex, most
/// significant word first.
pub fn format_integer_const(words: &[u64], bits: u16) -> String {
    if words.len() == 1 && words[0] < 0xFFFF {
        return sign_extend(words[0], bits).to_string();
    }
    let hex = words
        .iter()
        .rev()
        .map(|w| format!("{w:016x}"))
        .collect::<Vec<_>>()
        .join("_");
    format!("0x{hex}")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn small_constant_prints_signed_decimal() {
        assert_eq!(format_integer_const(&[7], 32), "7");
        // 0xFFFFFFFF as an 8-bit-masked value isn't realistic, but negative
        // sign-extension of a small word is: 0x1F at 5 bits is all-ones -> -1.
        assert_eq!(format_integer_const(&[0x1F], 5), "-1");
    }

    #[test]
    fn large_or_multiword_constant_prints_hex_msw_first() {
        assert_eq!(format_integer_const(&[0x1_0000], 32), "0x0000000000010000");
        assert_eq!(
            format_integer_const(&[1, 2], 128),
            "0x0000000000000002_0000000000000001"
        );
    }
}
