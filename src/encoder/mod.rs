//! Instruction encoding. A table lookup keyed by `(Mnemonic, Mode)`, split
//! across one opcode table per CPU generation (matching the structure the
//! chip vendors actually documented them in) plus the NMOS illegal-opcode
//! addendum. `encode` resolves the operand's effective addressing mode,
//! selects the table for the active CPU, and writes 1..4 bytes through the
//! output buffer.

mod disasm;
mod opcodes_65816;
mod opcodes_65c02;
mod opcodes_illegal;
mod opcodes_nmos;

pub use disasm::format_disassembly;

use bitflags::bitflags;

use crate::ast::{Operand, WidthModifier};
use crate::cpu::Cpu;
use crate::diagnostics::{DiagKind, Diagnostics};
use crate::eval::{eval, EvalContext};
use crate::mnemonic::Mnemonic;
use crate::output::OutputBuffer;
use crate::token::Token;
use crate::value::*;

/// The effective addressing mode of one encoded instruction, after operand
/// parsing and size resolution have settled on a concrete shape. Each
/// variant corresponds to one of the `printf`-style disassembly templates.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum Mode {
    Implied,
    Accumulator,
    Immediate8,
    Immediate16,
    Zp,
    ZpX,
    ZpY,
    Abs,
    AbsX,
    AbsY,
    Long,
    LongX,
    ZpIndirect,
    AbsIndirect,
    AbsIndirectX,
    IndirectX,
    IndirectY,
    DirectLong,
    DirectLongY,
    StackRel,
    StackRelY,
    Relative,
    RelativeLong,
    TwoOperand,
    BitZp,
    BitOffsZp,
}

bitflags! {
    /// Which addressing modes a given (mnemonic, CPU) pair supports. Derived
    /// from the opcode tables themselves (a mode is "supported" iff some
    /// table has an entry for it), rather than hand-maintained twice.
    #[derive(Clone, Copy, PartialEq, Eq, Debug)]
    pub struct ModeSet: u32 {
        const IMPLIED        = 1 << 0;
        const ACCUMULATOR    = 1 << 1;
        const IMMEDIATE8     = 1 << 2;
        const IMMEDIATE16    = 1 << 3;
        const ZP             = 1 << 4;
        const ZP_X           = 1 << 5;
        const ZP_Y           = 1 << 6;
        const ABS            = 1 << 7;
        const ABS_X          = 1 << 8;
        const ABS_Y          = 1 << 9;
        const LONG           = 1 << 10;
        const LONG_X         = 1 << 11;
        const ZP_INDIRECT    = 1 << 12;
        const ABS_INDIRECT   = 1 << 13;
        const ABS_INDIRECT_X = 1 << 14;
        const INDIRECT_X     = 1 << 15;
        const INDIRECT_Y     = 1 << 16;
        const DIRECT_LONG    = 1 << 17;
        const DIRECT_LONG_Y  = 1 << 18;
        const STACK_REL      = 1 << 19;
        const STACK_REL_Y    = 1 << 20;
        const RELATIVE       = 1 << 21;
        const RELATIVE_LONG  = 1 << 22;
        const TWO_OPERAND    = 1 << 23;
        const BIT_ZP         = 1 << 24;
        const BIT_OFFS_ZP    = 1 << 25;
    }
}

fn flag_for(mode: Mode) -> ModeSet {
    use Mode::*;
    match mode {
        Implied => ModeSet::IMPLIED,
        Accumulator => ModeSet::ACCUMULATOR,
        Immediate8 => ModeSet::IMMEDIATE8,
        Immediate16 => ModeSet::IMMEDIATE16,
        Zp => ModeSet::ZP,
        ZpX => ModeSet::ZP_X,
        ZpY => ModeSet::ZP_Y,
        Abs => ModeSet::ABS,
        AbsX => ModeSet::ABS_X,
        AbsY => ModeSet::ABS_Y,
        Long => ModeSet::LONG,
        LongX => ModeSet::LONG_X,
        ZpIndirect => ModeSet::ZP_INDIRECT,
        AbsIndirect => ModeSet::ABS_INDIRECT,
        AbsIndirectX => ModeSet::ABS_INDIRECT_X,
        IndirectX => ModeSet::INDIRECT_X,
        IndirectY => ModeSet::INDIRECT_Y,
        DirectLong => ModeSet::DIRECT_LONG,
        DirectLongY => ModeSet::DIRECT_LONG_Y,
        StackRel => ModeSet::STACK_REL,
        StackRelY => ModeSet::STACK_REL_Y,
        Relative => ModeSet::RELATIVE,
        RelativeLong => ModeSet::RELATIVE_LONG,
        TwoOperand => ModeSet::TWO_OPERAND,
        BitZp => ModeSet::BIT_ZP,
        BitOffsZp => ModeSet::BIT_OFFS_ZP,
    }
}

/// Looks an opcode up across every table for the given mnemonic/mode pair,
/// restricted to tables available at `cpu`'s generation or earlier. The
/// tables carry one row per *opcode byte*, not per operand width, so a
/// 16-bit immediate (under `.m16`/`.x16`) is looked up under its 8-bit
/// counterpart's key; only the resolved operand byte count differs.
fn lookup(m: Mnemonic, mode: Mode, cpu: Cpu) -> Option<u8> {
    let mode = if mode == Mode::Immediate16 { Mode::Immediate8 } else { mode };
    if let Some(op) = opcodes_nmos::lookup(m, mode) {
        return Some(op);
    }
    if cpu == Cpu::Nmos6502Illegal {
        if let Some(op) = opcodes_illegal::lookup(m, mode) {
            return Some(op);
        }
    }
    if cpu.is_65c02_or_better() {
        if let Some(op) = opcodes_65c02::lookup(m, mode) {
            return Some(op);
        }
    }
    if cpu.is_65816() {
        if let Some(op) = opcodes_65816::lookup(m, mode) {
            return Some(op);
        }
    }
    None
}

fn supported_modes(m: Mnemonic, cpu: Cpu) -> ModeSet {
    use Mode::*;
    const ALL: &[Mode] = &[
        Implied, Accumulator, Immediate8, Immediate16, Zp, ZpX, ZpY, Abs, AbsX, AbsY,
        Long, LongX, ZpIndirect, AbsIndirect, AbsIndirectX, IndirectX, IndirectY,
        DirectLong, DirectLongY, StackRel, StackRelY, Relative, RelativeLong,
        TwoOperand, BitZp, BitOffsZp,
    ];
    let mut set = ModeSet::empty();
    for &mode in ALL {
        if lookup(m, mode, cpu).is_some() {
            set |= flag_for(mode);
        }
    }
    set
}

/// Per-statement 65816 register-width state the encoder consults for
/// auto-sized immediates, plus the current direct-page register (`.dp`)
/// consulted when sizing a zp/abs/long operand.
pub struct WidthFlags {
    pub m16: bool,
    pub x16: bool,
    pub page: u16,
}

/// Encodes one mnemonic statement: resolves the operand, selects a table
/// entry, writes bytes through `out`, and returns a disassembly fragment
/// (mnemonic + formatted operand, no address/byte columns) for the listing.
pub fn encode(
    mnemonic: Mnemonic,
    operand: Option<&Operand>,
    token: &Token,
    cpu: Cpu,
    widths: &WidthFlags,
    out: &mut OutputBuffer,
    ctx: &mut EvalContext,
) -> Option<String> {
    if !cpu.supports(mnemonic.min_cpu()) {
        ctx.diags.error(DiagKind::MnemonicUnavailable(mnemonic.as_str().to_owned()), Some(token.clone()));
        return None;
    }

    let resolved = resolve(mnemonic, operand, token, cpu, widths, out, ctx)?;

    // A `bra` promoted to a 16-bit displacement (out of short-branch range,
    // 65816 only) is emitted as `brl`'s opcode: the 65816 has no separate
    // long-branch-always opcode, so `resolve` hands back `RelativeLong` but
    // the table rows still live under `BRL`.
    let table_mnemonic = if mnemonic == Mnemonic::BRA && resolved.mode == Mode::RelativeLong {
        Mnemonic::BRL
    } else {
        mnemonic
    };

    let modes = supported_modes(table_mnemonic, cpu);
    if !modes.contains(flag_for(resolved.mode)) {
        ctx.diags.error(DiagKind::ModeNotSupported(mnemonic.as_str().to_owned()), Some(token.clone()));
        return None;
    }

    let opcode = match lookup(table_mnemonic, resolved.mode, cpu) {
        Some(op) => op,
        None => {
            ctx.diags.error(DiagKind::ModeNotSupported(mnemonic.as_str().to_owned()), Some(token.clone()));
            return None;
        }
    };

    out.write_byte(opcode);
    for b in &resolved.bytes {
        out.write_byte(*b);
    }

    Some(format_disassembly(mnemonic, resolved.mode, &resolved.bytes, resolved.operand_value))
}

/// The fully-resolved shape of one encoded instruction: the addressing mode
/// the opcode table should be consulted with, the operand bytes that follow
/// the opcode, and (for disassembly purposes) the numeric operand value.
struct Resolved {
    mode: Mode,
    bytes: Vec<u8>,
    operand_value: Value,
}

fn resolve(
    mnemonic: Mnemonic,
    operand: Option<&Operand>,
    token: &Token,
    cpu: Cpu,
    widths: &WidthFlags,
    out: &OutputBuffer,
    ctx: &mut EvalContext,
) -> Option<Resolved> {
    use Operand::*;

    let operand = match operand {
        None => {
            let mode = if mnemonic.is_accumulator_class() || is_implied_shift(mnemonic) {
                Mode::Accumulator
            } else {
                Mode::Implied
            };
            return Some(Resolved { mode, bytes: vec![], operand_value: UNDEFINED });
        }
        Some(o) => o,
    };

    match operand {
        Accumulator => Some(Resolved { mode: Mode::Accumulator, bytes: vec![], operand_value: UNDEFINED }),

        Immediate { expr, width } => {
            let v = eval(expr, ctx);
            let wide = match width {
                WidthModifier::W16 | WidthModifier::W24 => true,
                WidthModifier::W8 => false,
                WidthModifier::None => {
                    cpu.is_65816()
                        && ((mnemonic.is_accumulator_class() && widths.m16)
                            || (mnemonic.is_index_class() && widths.x16))
                }
            };
            if wide {
                let w = (v & 0xffff) as u16;
                Some(Resolved { mode: Mode::Immediate16, bytes: w.to_le_bytes().to_vec(), operand_value: v })
            } else {
                check_width(v, 1, ctx, token);
                Some(Resolved { mode: Mode::Immediate8, bytes: vec![low_byte(v)], operand_value: v })
            }
        }

        TwoOperands { src, dst } => {
            let s = eval(src, ctx);
            let d = eval(dst, ctx);
            Some(Resolved {
                mode: Mode::TwoOperand,
                bytes: vec![low_byte(s), low_byte(d)],
                operand_value: d,
            })
        }

        BitZp { zp, .. } => {
            // The bit index lives in the mnemonic itself (RMB3, SMB7, ...);
            // opcodes_65c02::lookup derives the opcode byte from it directly.
            let addr = eval(zp, ctx);
            check_width(addr, 1, ctx, token);
            Some(Resolved { mode: Mode::BitZp, bytes: vec![low_byte(addr)], operand_value: addr })
        }

        BitOffsZp { bit: _, zp, target } => {
            let addr = eval(zp, ctx);
            check_width(addr, 1, ctx, token);
            let dest = eval(target, ctx);
            let disp = branch_displacement(dest, out.logical_pc, 3, ctx, token);
            Some(Resolved { mode: Mode::BitOffsZp, bytes: vec![low_byte(addr), disp as u8], operand_value: addr })
        }

        ZpAbsolute { expr, width } if mnemonic.is_short_branch() => {
            let _ = width;
            let dest = eval(expr, ctx);

            // `bra` on a 65816 promotes to a long branch instead of erroring
            // out of range, so it needs to check range itself before
            // `branch_displacement` gets a chance to report BranchOutOfRange.
            if mnemonic == Mnemonic::BRA && cpu.is_65816() {
                if !is_defined(dest) {
                    *ctx.pass_needed = true;
                    return Some(Resolved { mode: Mode::Relative, bytes: vec![0], operand_value: dest });
                }
                let disp = dest - (out.logical_pc + 2);
                if (INT8_MIN..=INT8_MAX).contains(&disp) {
                    return Some(Resolved { mode: Mode::Relative, bytes: vec![disp as u8], operand_value: dest });
                }
                let promoted = dest.wrapping_sub(out.logical_pc + 3);
                let w = (promoted & 0xffff) as u16;
                return Some(Resolved { mode: Mode::RelativeLong, bytes: w.to_le_bytes().to_vec(), operand_value: dest });
            }

            let disp = branch_displacement(dest, out.logical_pc, 2, ctx, token);
            Some(Resolved { mode: Mode::Relative, bytes: vec![disp.byte()], operand_value: dest })
        }

        ZpAbsolute { expr, .. } if mnemonic.is_long_branch() => {
            let dest = eval(expr, ctx);
            let rel = (dest.wrapping_sub(out.logical_pc + 3)) as i64;
            if ctx.pass > 1 && !(INT16_MIN..=INT16_MAX).contains(&rel) {
                ctx.diags.error(DiagKind::BranchOutOfRange, Some(token.clone()));
            }
            let w = (rel & 0xffff) as u16;
            Some(Resolved { mode: Mode::RelativeLong, bytes: w.to_le_bytes().to_vec(), operand_value: dest })
        }

        ZpAbsolute { expr, width } => {
            let v = eval(expr, ctx);
            sized(v, *width, mnemonic, cpu, widths.page, Mode::Zp, Mode::Abs, Mode::Long, ctx, token)
        }
        IndexX { expr, width } => {
            let v = eval(expr, ctx);
            sized(v, *width, mnemonic, cpu, widths.page, Mode::ZpX, Mode::AbsX, Mode::LongX, ctx, token)
        }
        IndexY { expr, width } => {
            let v = eval(expr, ctx);
            sized(v, *width, mnemonic, cpu, widths.page, Mode::ZpY, Mode::AbsY, Mode::AbsY, ctx, token)
        }
        IndexS { expr, .. } => {
            let v = eval(expr, ctx);
            check_width(v, 1, ctx, token);
            Some(Resolved { mode: Mode::StackRel, bytes: vec![low_byte(v)], operand_value: v })
        }
        IndirectX { expr } => {
            let v = eval(expr, ctx);
            check_width(v, 1, ctx, token);
            Some(Resolved { mode: Mode::IndirectX, bytes: vec![low_byte(v)], operand_value: v })
        }
        IndirectY { expr } => {
            let v = eval(expr, ctx);
            check_width(v, 1, ctx, token);
            Some(Resolved { mode: Mode::IndirectY, bytes: vec![low_byte(v)], operand_value: v })
        }
        IndirectS { expr } => {
            let v = eval(expr, ctx);
            check_width(v, 1, ctx, token);
            Some(Resolved { mode: Mode::StackRelY, bytes: vec![low_byte(v)], operand_value: v })
        }
        Indirect { expr } => {
            let v = eval(expr, ctx);
            if mnemonic == Mnemonic::JMP && is_defined(v) && !fits_8(v) {
                Some(Resolved { mode: Mode::AbsIndirect, bytes: low_word(v).to_le_bytes().to_vec(), operand_value: v })
            } else {
                check_width(v, 1, ctx, token);
                Some(Resolved { mode: Mode::ZpIndirect, bytes: vec![low_byte(v)], operand_value: v })
            }
        }
        Direct { expr } => {
            let v = eval(expr, ctx);
            check_width(v, 1, ctx, token);
            Some(Resolved { mode: Mode::DirectLong, bytes: vec![low_byte(v)], operand_value: v })
        }
        DirectY { expr } => {
            let v = eval(expr, ctx);
            check_width(v, 1, ctx, token);
            Some(Resolved { mode: Mode::DirectLongY, bytes: vec![low_byte(v)], operand_value: v })
        }
        ExpressionList(_) => {
            ctx.diags.error(DiagKind::ModeNotSupported(mnemonic.as_str().to_owned()), Some(token.clone()));
            None
        }
    }
}

fn is_implied_shift(m: Mnemonic) -> bool {
    matches!(m, Mnemonic::ASL | Mnemonic::LSR | Mnemonic::ROL | Mnemonic::ROR)
}

fn check_width(v: Value, max_bytes: u8, ctx: &mut EvalContext, token: &Token) {
    if !is_defined(v) {
        return;
    }
    let ok = match max_bytes {
        1 => fits_8(v),
        2 => fits_16(v),
        3 => fits_24(v),
        _ => true,
    };
    if !ok {
        if ctx.pass == 1 {
            *ctx.pass_needed = true;
        } else {
            ctx.diags.error(DiagKind::IllegalQuantity, Some(token.clone()));
        }
    }
}

/// Picks zero-page / absolute / long based on an explicit width override, or
/// (absent one) the value's magnitude; an undefined forward reference
/// defaults to absolute, matching how a second pass would almost always need
/// at least that much room and avoiding a shrink-then-grow oscillation. A
/// 16-bit value whose high byte equals the active `.dp` direct-page
/// register is tried as zero-page first, since the 65816 addresses that
/// window directly. Whatever mode this picks, `widen_to_supported` then
/// retries zp -> abs -> long against `mnemonic`'s actual table rows, so a
/// mnemonic with no zero-page form (e.g. `jmp`) still encodes instead of
/// failing with "mode not supported".
fn sized(
    v: Value,
    width: WidthModifier,
    mnemonic: Mnemonic,
    cpu: Cpu,
    page: u16,
    zp: Mode,
    abs: Mode,
    long: Mode,
    ctx: &mut EvalContext,
    token: &Token,
) -> Option<Resolved> {
    let preferred = match width {
        WidthModifier::W8 => zp,
        WidthModifier::W16 => abs,
        WidthModifier::W24 => long,
        WidthModifier::None => {
            if !is_defined(v) {
                abs
            } else if fits_8(v) && zp != abs {
                zp
            } else if cpu.is_65816() && zp != abs && fits_16(v) && high_byte(v) as u16 == page {
                zp
            } else if fits_16(v) {
                if zp != abs {
                    tracing::trace!("operand too wide for zp, promoted to abs");
                }
                abs
            } else if cpu.is_65816() && fits_24(v) {
                tracing::trace!("operand too wide for abs, promoted to long");
                long
            } else {
                ctx.diags.error(DiagKind::IllegalQuantity, Some(token.clone()));
                abs
            }
        }
    };

    let mode = widen_to_supported(mnemonic, preferred, cpu, zp, abs, long);

    let n: u8 = if mode == zp { 1 } else if mode == abs { 2 } else { 3 };
    check_width(v, n, ctx, token);
    let w = v as u32;
    let bytes = match n {
        1 => vec![(w & 0xff) as u8],
        2 => vec![(w & 0xff) as u8, ((w >> 8) & 0xff) as u8],
        3 => vec![(w & 0xff) as u8, ((w >> 8) & 0xff) as u8, ((w >> 16) & 0xff) as u8],
        _ => unreachable!(),
    };
    Some(Resolved { mode, bytes, operand_value: v })
}

/// Retries `mode` forward through the zp -> abs -> long chain (starting at
/// whichever of the three `mode` already is) until `mnemonic` has a table
/// entry for the candidate, per §4.4's "if the lookup comes back BAD,
/// widen" rule. Stops at `long` even on a miss there; `encode` reports
/// `ModeNotSupported` itself when the final pick still has no table row.
fn widen_to_supported(mnemonic: Mnemonic, mode: Mode, cpu: Cpu, zp: Mode, abs: Mode, long: Mode) -> Mode {
    let chain = [zp, abs, long];
    let start = chain.iter().position(|&m| m == mode).unwrap_or(0);
    for &m in &chain[start..] {
        if lookup(mnemonic, m, cpu).is_some() {
            return m;
        }
    }
    long
}

/// A resolved branch displacement: either an in-range signed byte, or a
/// sentinel (rendered as a zero byte) once `BranchOutOfRange` has already
/// been reported.
struct Displacement(Option<i8>);

impl Displacement {
    fn byte(&self) -> u8 {
        self.0.unwrap_or(0) as u8
    }
}

fn branch_displacement(dest: Value, logical_pc: Value, size: Value, ctx: &mut EvalContext, token: &Token) -> Displacement {
    if !is_defined(dest) {
        *ctx.pass_needed = true;
        return Displacement(Some(0));
    }
    let disp = dest - (logical_pc + size);
    if (INT8_MIN..=INT8_MAX).contains(&disp) {
        Displacement(Some(disp as i8))
    } else {
        if ctx.pass == 1 {
            *ctx.pass_needed = true;
        } else {
            ctx.diags.error(DiagKind::BranchOutOfRange, Some(token.clone()));
        }
        Displacement(None)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::anon::AnonLabels;
    use crate::ast::Expr;
    use crate::source::SourceFile;
    use crate::symtab::SymbolTable;
    use crate::token::TokenKind;
    use std::rc::Rc;

    fn tok() -> Token {
        let file = Rc::new(SourceFile::new("t", "lda $1234\n"));
        Token::new(TokenKind::Ident, file, 1, 1, 0, 3)
    }

    fn run_encode(mnemonic: Mnemonic, operand: Option<&Operand>, cpu: Cpu, m16: bool) -> (Vec<u8>, bool) {
        run_encode_with_page(mnemonic, operand, cpu, m16, 0)
    }

    fn run_encode_with_page(mnemonic: Mnemonic, operand: Option<&Operand>, cpu: Cpu, m16: bool, page: u16) -> (Vec<u8>, bool) {
        let mut symbols = SymbolTable::new(false);
        let anon = AnonLabels::new();
        let mut diags = Diagnostics::new();
        let mut pass_needed = false;
        let mut out = OutputBuffer::new();
        out.begin_statement();
        {
            let mut ctx = EvalContext {
                symbols: &mut symbols,
                anon: &anon,
                diags: &mut diags,
                pc: out.logical_pc,
                pass: 2,
                local_label: None,
                pass_needed: &mut pass_needed,
            };
            let widths = WidthFlags { m16, x16: false, page };
            encode(mnemonic, operand, &tok(), cpu, &widths, &mut out, &mut ctx);
        }
        (out.bytes_written().to_vec(), diags.has_errors())
    }

    #[test]
    fn lda_absolute_forward_reference_picks_three_byte_form() {
        let expr = Expr::literal(tok(), 0x1234);
        let operand = Operand::ZpAbsolute { expr, width: WidthModifier::None };
        let (bytes, errors) = run_encode(Mnemonic::LDA, Some(&operand), Cpu::Nmos6502, false);
        assert!(!errors);
        assert_eq!(bytes, vec![0xad, 0x34, 0x12]);
    }

    #[test]
    fn lda_immediate_widens_under_m16() {
        let expr = Expr::literal(tok(), 0x1234);
        let operand = Operand::Immediate { expr, width: WidthModifier::None };
        let (bytes, errors) = run_encode(Mnemonic::LDA, Some(&operand), Cpu::Wdc65816, true);
        assert!(!errors);
        assert_eq!(bytes, vec![0xa9, 0x34, 0x12]);
    }

    #[test]
    fn inx_is_implied_single_byte() {
        let (bytes, errors) = run_encode(Mnemonic::INX, None, Cpu::Nmos6502, false);
        assert!(!errors);
        assert_eq!(bytes, vec![0xe8]);
    }

    #[test]
    fn jmp_widens_zp_sized_operand_to_abs_when_jmp_has_no_zp_form() {
        // $12 fits a zero-page byte, but `jmp` has no Zp table row (only
        // Abs/AbsIndirect) -- sized() must widen past it rather than report
        // ModeNotSupported.
        let expr = Expr::literal(tok(), 0x12);
        let operand = Operand::ZpAbsolute { expr, width: WidthModifier::None };
        let (bytes, errors) = run_encode(Mnemonic::JMP, Some(&operand), Cpu::Nmos6502, false);
        assert!(!errors);
        assert_eq!(bytes, vec![0x4c, 0x12, 0x00]);
    }

    #[test]
    fn lda_16bit_value_in_current_direct_page_truncates_to_zp() {
        let expr = Expr::literal(tok(), 0x2042);
        let operand = Operand::ZpAbsolute { expr, width: WidthModifier::None };
        let (bytes, errors) = run_encode_with_page(Mnemonic::LDA, Some(&operand), Cpu::Wdc65816, false, 0x20);
        assert!(!errors);
        assert_eq!(bytes, vec![0xa5, 0x42]);
    }

    #[test]
    fn bra_promoted_past_short_range_encodes_as_brl() {
        let expr = Expr::literal(tok(), 1000);
        let operand = Operand::ZpAbsolute { expr, width: WidthModifier::None };
        let (bytes, errors) = run_encode(Mnemonic::BRA, Some(&operand), Cpu::Wdc65816, false);
        assert!(!errors);
        assert_eq!(bytes[0], 0x82);
        assert_eq!(bytes.len(), 3);
    }
}
