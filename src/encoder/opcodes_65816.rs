//! WDC 65816 additions: 24-bit long addressing, indirect-long, stack-relative
//! modes for the group-1 mnemonics, the block-move and bank-register
//! instructions, and the handful of mnemonics unique to this CPU.

use super::Mode::{self, *};
use crate::mnemonic::Mnemonic::{self, *};

/// `(long, long_x, direct_long, direct_long_y, stack_rel, stack_rel_y)`
/// opcode rows for the eight group-1 mnemonics.
fn group1_816(m: Mnemonic) -> Option<[(Mode, u8); 6]> {
    Some(match m {
        ORA => [(Long, 0x0F), (LongX, 0x1F), (DirectLong, 0x07), (DirectLongY, 0x17), (StackRel, 0x03), (StackRelY, 0x13)],
        AND => [(Long, 0x2F), (LongX, 0x3F), (DirectLong, 0x27), (DirectLongY, 0x37), (StackRel, 0x23), (StackRelY, 0x33)],
        EOR => [(Long, 0x4F), (LongX, 0x5F), (DirectLong, 0x47), (DirectLongY, 0x57), (StackRel, 0x43), (StackRelY, 0x53)],
        ADC => [(Long, 0x6F), (LongX, 0x7F), (DirectLong, 0x67), (DirectLongY, 0x77), (StackRel, 0x63), (StackRelY, 0x73)],
        STA => [(Long, 0x8F), (LongX, 0x9F), (DirectLong, 0x87), (DirectLongY, 0x97), (StackRel, 0x83), (StackRelY, 0x93)],
        LDA => [(Long, 0xAF), (LongX, 0xBF), (DirectLong, 0xA7), (DirectLongY, 0xB7), (StackRel, 0xA3), (StackRelY, 0xB3)],
        CMP => [(Long, 0xCF), (LongX, 0xDF), (DirectLong, 0xC7), (DirectLongY, 0xD7), (StackRel, 0xC3), (StackRelY, 0xD3)],
        SBC => [(Long, 0xEF), (LongX, 0xFF), (DirectLong, 0xE7), (DirectLongY, 0xF7), (StackRel, 0xE3), (StackRelY, 0xF3)],
        _ => return None,
    })
}

pub fn lookup(m: Mnemonic, mode: Mode) -> Option<u8> {
    if let Some(rows) = group1_816(m) {
        if let Some((_, op)) = rows.iter().find(|(r, _)| *r == mode) {
            return Some(*op);
        }
    }

    match (m, mode) {
        (MVN, TwoOperand) => Some(0x54),
        (MVP, TwoOperand) => Some(0x44),

        (COP, Immediate8) => Some(0x02),
        (JML, Long) => Some(0x5C),
        (JML, AbsIndirect) => Some(0xDC),
        (JSL, Long) => Some(0x22),
        (BRL, RelativeLong) => Some(0x82),
        (PEA, Abs) => Some(0xF4),
        (PEI, ZpIndirect) => Some(0xD4),
        (PER, RelativeLong) => Some(0x62),

        (PHB, Implied) => Some(0x8B),
        (PHD, Implied) => Some(0x0B),
        (PHK, Implied) => Some(0x4B),
        (PLB, Implied) => Some(0xAB),
        (PLD, Implied) => Some(0x2B),
        (REP, Immediate8) => Some(0xC2),
        (SEP, Immediate8) => Some(0xE2),
        (RTL, Implied) => Some(0x6B),
        (TCD, Implied) => Some(0x5B),
        (TCS, Implied) => Some(0x1B),
        (TDC, Implied) => Some(0x7B),
        (TSC, Implied) => Some(0x3B),
        (TXY, Implied) => Some(0x9B),
        (TYX, Implied) => Some(0xBB),
        (WDM, Immediate8) => Some(0x42),
        (STP, Implied) => Some(0xDB),
        (XBA, Implied) => Some(0xEB),
        (XCE, Implied) => Some(0xFB),

        _ => None,
    }
}
