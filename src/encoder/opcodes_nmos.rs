//! The base NMOS 6502 opcode matrix: every mnemonic available on stock
//! silicon, keyed by addressing mode.

use super::Mode::{self, *};
use crate::mnemonic::Mnemonic::{self, *};

/// `(mode, opcode)` rows for the eight "group 1" read/write mnemonics, which
/// all share the same addressing-mode layout.
fn group1(m: Mnemonic) -> Option<[(Mode, u8); 8]> {
    Some(match m {
        ORA => [(Immediate8, 0x09), (Zp, 0x05), (ZpX, 0x15), (Abs, 0x0D), (AbsX, 0x1D), (AbsY, 0x19), (IndirectX, 0x01), (IndirectY, 0x11)],
        AND => [(Immediate8, 0x29), (Zp, 0x25), (ZpX, 0x35), (Abs, 0x2D), (AbsX, 0x3D), (AbsY, 0x39), (IndirectX, 0x21), (IndirectY, 0x31)],
        EOR => [(Immediate8, 0x49), (Zp, 0x45), (ZpX, 0x55), (Abs, 0x4D), (AbsX, 0x5D), (AbsY, 0x59), (IndirectX, 0x41), (IndirectY, 0x51)],
        ADC => [(Immediate8, 0x69), (Zp, 0x65), (ZpX, 0x75), (Abs, 0x6D), (AbsX, 0x7D), (AbsY, 0x79), (IndirectX, 0x61), (IndirectY, 0x71)],
        CMP => [(Immediate8, 0xC9), (Zp, 0xC5), (ZpX, 0xD5), (Abs, 0xCD), (AbsX, 0xDD), (AbsY, 0xD9), (IndirectX, 0xC1), (IndirectY, 0xD1)],
        SBC => [(Immediate8, 0xE9), (Zp, 0xE5), (ZpX, 0xF5), (Abs, 0xED), (AbsX, 0xFD), (AbsY, 0xF9), (IndirectX, 0xE1), (IndirectY, 0xF1)],
        // STA has no immediate form; the sentinel 0xFF-free slot is simply never consulted for Immediate8.
        STA => [(Immediate8, 0x00 /* unused */), (Zp, 0x85), (ZpX, 0x95), (Abs, 0x8D), (AbsX, 0x9D), (AbsY, 0x99), (IndirectX, 0x81), (IndirectY, 0x91)],
        LDA => [(Immediate8, 0xA9), (Zp, 0xA5), (ZpX, 0xB5), (Abs, 0xAD), (AbsX, 0xBD), (AbsY, 0xB9), (IndirectX, 0xA1), (IndirectY, 0xB1)],
        _ => return None,
    })
}

fn shift(m: Mnemonic) -> Option<[(Mode, u8); 4]> {
    Some(match m {
        ASL => [(Zp, 0x06), (Abs, 0x0E), (ZpX, 0x16), (AbsX, 0x1E)],
        ROL => [(Zp, 0x26), (Abs, 0x2E), (ZpX, 0x36), (AbsX, 0x3E)],
        LSR => [(Zp, 0x46), (Abs, 0x4E), (ZpX, 0x56), (AbsX, 0x5E)],
        ROR => [(Zp, 0x66), (Abs, 0x6E), (ZpX, 0x76), (AbsX, 0x7E)],
        _ => return None,
    })
}

fn shift_accum(m: Mnemonic) -> Option<u8> {
    Some(match m {
        ASL => 0x0A,
        ROL => 0x2A,
        LSR => 0x4A,
        ROR => 0x6A,
        _ => return None,
    })
}

pub fn lookup(m: Mnemonic, mode: Mode) -> Option<u8> {
    if m == STA && mode == Immediate8 {
        return None;
    }
    if let Some(rows) = group1(m) {
        if let Some((_, op)) = rows.iter().find(|(r, _)| *r == mode) {
            return Some(*op);
        }
    }
    if let Some(rows) = shift(m) {
        if let Some((_, op)) = rows.iter().find(|(r, _)| *r == mode) {
            return Some(*op);
        }
    }
    if mode == Accumulator {
        if let Some(op) = shift_accum(m) {
            return Some(op);
        }
    }

    match (m, mode) {
        (STX, Zp) => Some(0x86),
        (STX, Abs) => Some(0x8E),
        (STX, ZpY) => Some(0x96),
        (LDX, Immediate8) => Some(0xA2),
        (LDX, Zp) => Some(0xA6),
        (LDX, Abs) => Some(0xAE),
        (LDX, ZpY) => Some(0xB6),
        (LDX, AbsY) => Some(0xBE),
        (STY, Zp) => Some(0x84),
        (STY, Abs) => Some(0x8C),
        (STY, ZpX) => Some(0x94),
        (LDY, Immediate8) => Some(0xA0),
        (LDY, Zp) => Some(0xA4),
        (LDY, Abs) => Some(0xAC),
        (LDY, ZpX) => Some(0xB4),
        (LDY, AbsX) => Some(0xBC),

        (BIT, Zp) => Some(0x24),
        (BIT, Abs) => Some(0x2C),

        (DEC, Zp) => Some(0xC6),
        (DEC, Abs) => Some(0xCE),
        (DEC, ZpX) => Some(0xD6),
        (DEC, AbsX) => Some(0xDE),
        (INC, Zp) => Some(0xE6),
        (INC, Abs) => Some(0xEE),
        (INC, ZpX) => Some(0xF6),
        (INC, AbsX) => Some(0xFE),

        (CPX, Immediate8) => Some(0xE0),
        (CPX, Zp) => Some(0xE4),
        (CPX, Abs) => Some(0xEC),
        (CPY, Immediate8) => Some(0xC0),
        (CPY, Zp) => Some(0xC4),
        (CPY, Abs) => Some(0xCC),

        (BPL, Relative) => Some(0x10),
        (BMI, Relative) => Some(0x30),
        (BVC, Relative) => Some(0x50),
        (BVS, Relative) => Some(0x70),
        (BCC, Relative) => Some(0x90),
        (BCS, Relative) => Some(0xB0),
        (BNE, Relative) => Some(0xD0),
        (BEQ, Relative) => Some(0xF0),

        (JMP, Abs) => Some(0x4C),
        (JMP, AbsIndirect) => Some(0x6C),
        (JSR, Abs) => Some(0x20),

        (BRK, Implied) => Some(0x00),
        (RTI, Implied) => Some(0x40),
        (RTS, Implied) => Some(0x60),
        (PHP, Implied) => Some(0x08),
        (CLC, Implied) => Some(0x18),
        (PLP, Implied) => Some(0x28),
        (SEC, Implied) => Some(0x38),
        (PHA, Implied) => Some(0x48),
        (CLI, Implied) => Some(0x58),
        (PLA, Implied) => Some(0x68),
        (SEI, Implied) => Some(0x78),
        (DEY, Implied) => Some(0x88),
        (TXA, Implied) => Some(0x8A),
        (TYA, Implied) => Some(0x98),
        (TXS, Implied) => Some(0x9A),
        (TAY, Implied) => Some(0xA8),
        (TAX, Implied) => Some(0xAA),
        (CLV, Implied) => Some(0xB8),
        (TSX, Implied) => Some(0xBA),
        (INY, Implied) => Some(0xC8),
        (DEX, Implied) => Some(0xCA),
        (CLD, Implied) => Some(0xD8),
        (INX, Implied) => Some(0xE8),
        (NOP, Implied) => Some(0xEA),
        (SED, Implied) => Some(0xF8),

        _ => None,
    }
}
