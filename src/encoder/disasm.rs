//! Disassembly formatting: one `printf`-style template per addressing mode,
//! producing the mnemonic-plus-operand fragment a listing line embeds.

use super::Mode;
use crate::mnemonic::Mnemonic;
use crate::value::{is_defined, Value};

fn word(bytes: &[u8]) -> u32 {
    match bytes.len() {
        1 => bytes[0] as u32,
        2 => bytes[0] as u32 | (bytes[1] as u32) << 8,
        3 => bytes[0] as u32 | (bytes[1] as u32) << 8 | (bytes[2] as u32) << 16,
        _ => 0,
    }
}

fn addr(v: Value) -> String {
    if is_defined(v) {
        format!("${:04x}", v & 0xffff)
    } else {
        "$????".to_owned()
    }
}

pub fn format_disassembly(mnemonic: Mnemonic, mode: Mode, bytes: &[u8], operand_value: Value) -> String {
    use Mode::*;
    let name = mnemonic.as_str().to_lowercase();
    let n = word(bytes);
    match mode {
        Implied => name,
        Accumulator => format!("{} a", name),
        Immediate8 => format!("{} #${:02x}", name, n),
        Immediate16 => format!("{} #${:04x}", name, n),
        Zp => format!("{} ${:02x}", name, n),
        ZpX => format!("{} ${:02x},x", name, n),
        ZpY => format!("{} ${:02x},y", name, n),
        Abs => format!("{} ${:04x}", name, n),
        AbsX => format!("{} ${:04x},x", name, n),
        AbsY => format!("{} ${:04x},y", name, n),
        Long => format!("{} ${:06x}", name, n),
        LongX => format!("{} ${:06x},x", name, n),
        ZpIndirect => format!("{} (${:02x})", name, n),
        AbsIndirect => format!("{} (${:04x})", name, n),
        AbsIndirectX => format!("{} (${:04x},x)", name, n),
        IndirectX => format!("{} (${:02x},x)", name, n),
        IndirectY => format!("{} (${:02x}),y", name, n),
        DirectLong => format!("{} [${:02x}]", name, n),
        DirectLongY => format!("{} [${:02x}],y", name, n),
        StackRel => format!("{} ${:02x},s", name, n),
        StackRelY => format!("{} (${:02x},s),y", name, n),
        Relative | RelativeLong => format!("{} {}", name, addr(operand_value)),
        TwoOperand => {
            let src = bytes.first().copied().unwrap_or(0);
            let dst = bytes.get(1).copied().unwrap_or(0);
            format!("{} ${:02x},${:02x}", name, src, dst)
        }
        BitZp => format!("{} ${:02x}", name, bytes.first().copied().unwrap_or(0)),
        BitOffsZp => {
            let zp = bytes.first().copied().unwrap_or(0);
            format!("{} ${:02x},{}", name, zp, addr(operand_value))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn formats_absolute_and_immediate() {
        assert_eq!(format_disassembly(Mnemonic::LDA, Mode::Abs, &[0x34, 0x12], 0x1234), "lda $1234");
        assert_eq!(format_disassembly(Mnemonic::LDA, Mode::Immediate8, &[0x12], 0x12), "lda #$12");
    }

    #[test]
    fn formats_undefined_branch_target() {
        assert_eq!(format_disassembly(Mnemonic::BNE, Mode::Relative, &[0], crate::value::UNDEFINED), "bne $????");
    }
}
