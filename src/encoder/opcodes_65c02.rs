//! WDC 65C02 additions: new addressing modes for existing mnemonics, plus
//! the Rockwell/WDC bit-manipulation and branch-on-bit instruction families.

use super::Mode::{self, *};
use crate::mnemonic::Mnemonic::{self, *};

/// `(zp),y`-style indirect without indexing, added for the eight group-1
/// mnemonics (`AND (zp)`, etc.) that gained it on the 65C02.
fn group1_indirect(m: Mnemonic) -> Option<u8> {
    Some(match m {
        ORA => 0x12,
        AND => 0x32,
        EOR => 0x52,
        ADC => 0x72,
        STA => 0x92,
        LDA => 0xB2,
        CMP => 0xD2,
        SBC => 0xF2,
        _ => return None,
    })
}

fn bit_index(m: Mnemonic) -> Option<u8> {
    m.bit_index()
}

pub fn lookup(m: Mnemonic, mode: Mode) -> Option<u8> {
    if mode == ZpIndirect {
        if let Some(op) = group1_indirect(m) {
            return Some(op);
        }
    }

    if m.is_rmb_smb() {
        let n = bit_index(m)?;
        let base = if matches!(m, SMB0 | SMB1 | SMB2 | SMB3 | SMB4 | SMB5 | SMB6 | SMB7) { 0x87 } else { 0x07 };
        return match mode {
            BitZp => Some(base.wrapping_add(n.wrapping_mul(0x10))),
            _ => None,
        };
    }

    if m.is_bbr_bbs() {
        let n = bit_index(m)?;
        let base = if matches!(m, BBS0 | BBS1 | BBS2 | BBS3 | BBS4 | BBS5 | BBS6 | BBS7) { 0x8F } else { 0x0F };
        return match mode {
            BitOffsZp => Some(base.wrapping_add(n.wrapping_mul(0x10))),
            _ => None,
        };
    }

    match (m, mode) {
        (BIT, Immediate8) => Some(0x89),
        (BIT, ZpX) => Some(0x34),
        (BIT, AbsX) => Some(0x3C),

        (INC, Accumulator) => Some(0x1A),
        (DEC, Accumulator) => Some(0x3A),

        (STZ, Zp) => Some(0x64),
        (STZ, ZpX) => Some(0x74),
        (STZ, Abs) => Some(0x9C),
        (STZ, AbsX) => Some(0x9E),

        (TRB, Zp) => Some(0x14),
        (TRB, Abs) => Some(0x1C),
        (TSB, Zp) => Some(0x04),
        (TSB, Abs) => Some(0x0C),

        (JMP, AbsIndirectX) => Some(0x7C),

        (BRA, Relative) => Some(0x80),

        (PHX, Implied) => Some(0xDA),
        (PLX, Implied) => Some(0xFA),
        (PHY, Implied) => Some(0x5A),
        (PLY, Implied) => Some(0x7A),
        (WAI, Implied) => Some(0xCB),

        _ => None,
    }
}
