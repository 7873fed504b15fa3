//! The NMOS "illegal"/undocumented opcode addendum, selected only when the
//! target CPU is [`Cpu::Nmos6502Illegal`](crate::cpu::Cpu).

use super::Mode::{self, *};
use crate::mnemonic::Mnemonic::{self, *};

fn rmw_combo(m: Mnemonic) -> Option<[(Mode, u8); 7]> {
    Some(match m {
        SLO => [(Zp, 0x07), (ZpX, 0x17), (Abs, 0x0F), (AbsX, 0x1F), (AbsY, 0x1B), (IndirectX, 0x03), (IndirectY, 0x13)],
        RLA => [(Zp, 0x27), (ZpX, 0x37), (Abs, 0x2F), (AbsX, 0x3F), (AbsY, 0x3B), (IndirectX, 0x23), (IndirectY, 0x33)],
        SRE => [(Zp, 0x47), (ZpX, 0x57), (Abs, 0x4F), (AbsX, 0x5F), (AbsY, 0x5B), (IndirectX, 0x43), (IndirectY, 0x53)],
        RRA => [(Zp, 0x67), (ZpX, 0x77), (Abs, 0x6F), (AbsX, 0x7F), (AbsY, 0x7B), (IndirectX, 0x63), (IndirectY, 0x73)],
        DCP => [(Zp, 0xC7), (ZpX, 0xD7), (Abs, 0xCF), (AbsX, 0xDF), (AbsY, 0xDB), (IndirectX, 0xC3), (IndirectY, 0xD3)],
        ISC => [(Zp, 0xE7), (ZpX, 0xF7), (Abs, 0xEF), (AbsX, 0xFF), (AbsY, 0xFB), (IndirectX, 0xE3), (IndirectY, 0xF3)],
        _ => return None,
    })
}

pub fn lookup(m: Mnemonic, mode: Mode) -> Option<u8> {
    if let Some(rows) = rmw_combo(m) {
        if let Some((_, op)) = rows.iter().find(|(r, _)| *r == mode) {
            return Some(*op);
        }
    }

    match (m, mode) {
        (LAX, Zp) => Some(0xA7),
        (LAX, ZpY) => Some(0xB7),
        (LAX, Abs) => Some(0xAF),
        (LAX, AbsY) => Some(0xBF),
        (LAX, IndirectX) => Some(0xA3),
        (LAX, IndirectY) => Some(0xB3),

        (SAX, Zp) => Some(0x87),
        (SAX, ZpY) => Some(0x97),
        (SAX, Abs) => Some(0x8F),
        (SAX, IndirectX) => Some(0x83),

        (ANC, Immediate8) => Some(0x0B),
        (ALR, Immediate8) => Some(0x4B),
        (ARR, Immediate8) => Some(0x6B),
        (AXS, Immediate8) => Some(0xCB),
        (ANE, Immediate8) => Some(0x8B),

        (SHA, AbsY) => Some(0x9F),
        (SHA, IndirectY) => Some(0x93),
        (SHX, AbsY) => Some(0x9E),
        (SHY, AbsX) => Some(0x9C),
        (TAS, AbsY) => Some(0x9B),
        (LAS, AbsY) => Some(0xBB),

        (JAM, Implied) => Some(0x02),
        (TOP, Abs) => Some(0x0C),
        (TOP, AbsX) => Some(0x1C),
        (DOP, Zp) => Some(0x04),
        (DOP, Immediate8) => Some(0x80),
        (DOP, ZpX) => Some(0x14),

        _ => None,
    }
}
