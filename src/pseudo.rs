//! Pseudo-op execution: everything a [`Directive`](crate::directive::Directive)
//! can do to the assembly context besides the control-flow directives
//! (`.include`, `.macro`/`.endmacro`, `.end`) that the executor handles
//! itself before ever reaching here.

use crate::ast::{ListItem, Operand};
use crate::context::AssemblyContext;
use crate::diagnostics::{DiagKind, Diagnostics};
use crate::directive::Directive;
use crate::token::{decode_string_literal, Token};
use crate::value::{is_defined, size_of, Value};

fn items(operand: Option<&Operand>) -> &[ListItem] {
    match operand {
        Some(Operand::ExpressionList(v)) => v,
        _ => &[],
    }
}

/// Evaluates a list item that is expected to be an expression, reporting an
/// error for a string literal (never valid in a numeric context) and
/// treating `?` as "undefined for this position".
fn eval_item(item: &ListItem, ctx: &mut AssemblyContext, diags: &mut Diagnostics, token: &Token) -> Value {
    match item {
        ListItem::Expr(e) => ctx.eval(diags, e),
        ListItem::Query => crate::value::UNDEFINED,
        ListItem::Str(t) => {
            diags.error(
                DiagKind::UnexpectedToken { found: "string literal".into(), expected: "expression".into() },
                Some(t.clone()),
            );
            let _ = token;
            crate::value::UNDEFINED
        }
    }
}

/// Writes `value` at `width` bytes, little-endian. A defined value that
/// doesn't fit: zero-filled on the first pass (the value may yet resolve to
/// something that fits), reported as an illegal quantity afterward.
fn emit_sized(value: Value, width: u8, ctx: &mut AssemblyContext, diags: &mut Diagnostics, token: &Token) {
    if is_defined(value) && size_of(value) > width {
        if ctx.pass == 1 {
            ctx.output.skip(width as u32);
            return;
        }
        diags.error(DiagKind::IllegalQuantity, Some(token.clone()));
    }
    let w = value as u32;
    for i in 0..width {
        ctx.output.write_byte(((w >> (8 * i)) & 0xff) as u8);
    }
}

fn string_literal(operand: Option<&Operand>) -> String {
    match items(operand).first() {
        Some(ListItem::Str(t)) => decode_string_literal(t.text()),
        _ => String::new(),
    }
}

fn emit_string(s: &str, ctx: &mut AssemblyContext) {
    for b in s.bytes() {
        ctx.output.write_byte(b);
    }
}

/// Executes one pseudo-op statement. Returns a disassembly fragment for the
/// listing, mirroring what `encoder::encode` returns for instructions.
pub fn execute(
    directive: Directive,
    operand: Option<&Operand>,
    token: &Token,
    ctx: &mut AssemblyContext,
    diags: &mut Diagnostics,
) -> Option<String> {
    use Directive::*;
    match directive {
        Include | Macro | EndMacro => unreachable!("consumed entirely by the parser"),

        End => None,

        M8 => { ctx.m16 = false; Some(".m8".into()) }
        M16 => { ctx.m16 = true; Some(".m16".into()) }
        X8 => { ctx.x16 = false; Some(".x8".into()) }
        X16 => { ctx.x16 = true; Some(".x16".into()) }
        Mx8 => { ctx.m16 = false; ctx.x16 = false; Some(".mx8".into()) }
        Mx16 => { ctx.m16 = true; ctx.x16 = true; Some(".mx16".into()) }

        ProOn => { ctx.listing_enabled = true; Some(".pron".into()) }
        ProOff => { ctx.listing_enabled = false; Some(".proff".into()) }

        Dp => {
            let e = match items(operand).first() {
                Some(ListItem::Expr(e)) => Some(e.clone()),
                _ => None,
            };
            let v = e.map(|e| ctx.eval(diags, &e)).unwrap_or(0);
            ctx.page = (v & 0xffff) as u16;
            Some(format!(".dp ${:04x}", ctx.page))
        }

        Relocate => {
            let e = match items(operand).first() {
                Some(ListItem::Expr(e)) => Some(e.clone()),
                _ => None,
            };
            let v = e.map(|e| ctx.eval(diags, &e)).unwrap_or(0);
            ctx.output.relocate(v);
            Some(format!(".relocate ${:04x}", v & 0xffff))
        }
        EndRelocate => {
            ctx.output.end_relocate();
            Some(".endrelocate".into())
        }

        Align => {
            let e = match items(operand).first() {
                Some(ListItem::Expr(e)) => Some(e.clone()),
                _ => None,
            };
            let n = e.map(|e| ctx.eval(diags, &e)).unwrap_or(1).max(1) as u32;
            let pc = ctx.output.pc;
            let pad = (n - (pc % n)) % n;
            ctx.output.skip(pad);
            Some(format!(".align {}", n))
        }

        Byte | Word | Long | Dword => {
            let width = match directive {
                Byte => 1,
                Word => 2,
                Long => 3,
                Dword => 4,
                _ => unreachable!(),
            };
            for item in items(operand) {
                let v = eval_item(item, ctx, diags, token);
                emit_sized(v, width, ctx, diags, token);
            }
            Some(directive.as_str().to_owned())
        }

        Fill => {
            let list = items(operand);
            let n = match list.first() {
                Some(item) => eval_item(item, ctx, diags, token),
                None => 0,
            };
            let n = n.max(0) as u32;
            match list.get(1) {
                Some(item) => {
                    let v = eval_item(item, ctx, diags, token);
                    let width = if is_defined(v) { size_of(v).max(1) } else { 1 };
                    let w = v as u32;
                    for i in 0..n {
                        let shift = 8 * (i % width as u32);
                        ctx.output.write_byte(((w >> shift) & 0xff) as u8);
                    }
                }
                None => ctx.output.skip(n),
            }
            Some(format!(".fill {}", n))
        }

        Stringify => {
            for item in items(operand) {
                let v = eval_item(item, ctx, diags, token);
                if is_defined(v) {
                    emit_string(&v.to_string(), ctx);
                }
            }
            Some(".stringify".into())
        }

        Binary => {
            let list = items(operand);
            let path = match list.first() {
                Some(ListItem::Str(t)) => decode_string_literal(t.text()),
                _ => return Some(".binary".into()),
            };
            let data = match ctx.binaries.load(&path) {
                Ok(d) => d,
                Err(_) => {
                    diags.error(DiagKind::FileNotFound(path), Some(token.clone()));
                    return Some(".binary".into());
                }
            };
            let offset = match list.get(1) {
                Some(item @ ListItem::Expr(_)) => eval_item(item, ctx, diags, token).max(0) as usize,
                _ => 0,
            };
            let requested_count = match list.get(2) {
                Some(item @ ListItem::Expr(_)) => Some(eval_item(item, ctx, diags, token).max(0) as usize),
                _ => None,
            };
            if offset > data.len() {
                diags.error(DiagKind::IllegalQuantity, Some(token.clone()));
                return Some(".binary".into());
            }
            let available = data.len() - offset;
            let count = requested_count.unwrap_or(available);
            if count > available {
                diags.error(DiagKind::IllegalQuantity, Some(token.clone()));
            }
            let count = count.min(available);
            for &b in &data[offset..offset + count] {
                ctx.output.write_byte(b);
            }
            Some(format!(".binary \"{}\"", path))
        }

        Str => {
            let s = string_literal(operand);
            emit_string(&s, ctx);
            Some(format!(".string \"{}\"", s))
        }
        CString => {
            let s = string_literal(operand);
            emit_string(&s, ctx);
            ctx.output.write_byte(0);
            Some(format!(".cstring \"{}\"", s))
        }
        PString => {
            let s = string_literal(operand);
            let bytes = s.as_bytes();
            if bytes.len() > 255 {
                diags.error(DiagKind::IllegalQuantity, Some(token.clone()));
            }
            ctx.output.write_byte(bytes.len().min(255) as u8);
            emit_string(&s, ctx);
            Some(format!(".pstring \"{}\"", s))
        }
        LString => {
            let s = string_literal(operand);
            let bytes: Vec<u8> = s.bytes().collect();
            if bytes.iter().any(|b| b & 0x80 != 0) {
                diags.error(DiagKind::IllegalQuantity, Some(token.clone()));
            }
            let n = bytes.len();
            for (i, b) in bytes.iter().enumerate() {
                let mut v = b.wrapping_shl(1);
                if i + 1 == n {
                    v |= 1;
                }
                ctx.output.write_byte(v);
            }
            Some(format!(".lstring \"{}\"", s))
        }
        NString => {
            let s = string_literal(operand);
            let bytes: Vec<u8> = s.bytes().collect();
            if bytes.iter().any(|b| b & 0x80 != 0) {
                diags.error(DiagKind::IllegalQuantity, Some(token.clone()));
            }
            let n = bytes.len();
            for (i, b) in bytes.iter().enumerate() {
                let mut v = *b;
                if i + 1 == n {
                    v |= 0x80;
                }
                ctx.output.write_byte(v);
            }
            Some(format!(".nstring \"{}\"", s))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ast::Expr;
    use crate::cpu::Cpu;
    use crate::source::SourceFile;
    use crate::token::TokenKind;
    use std::rc::Rc;

    fn tok() -> Token {
        let file = Rc::new(SourceFile::new("t", "x\n"));
        Token::new(TokenKind::Ident, file, 1, 1, 0, 1)
    }

    fn str_tok(quoted: &str) -> Token {
        let file = Rc::new(SourceFile::new("t", &format!("{}\n", quoted)));
        Token::new(TokenKind::StringLiteral, file, 1, 1, 0, quoted.len())
    }

    #[test]
    fn byte_list_emits_each_value() {
        let mut ctx = AssemblyContext::new(Cpu::Nmos6502, false);
        ctx.begin_pass();
        let mut diags = Diagnostics::new();
        let items = vec![
            ListItem::Expr(Expr::literal(tok(), 1)),
            ListItem::Expr(Expr::literal(tok(), 2)),
        ];
        execute(Directive::Byte, Some(&Operand::ExpressionList(items)), &tok(), &mut ctx, &mut diags);
        assert_eq!(ctx.output.bytes_written(), &[1, 2]);
    }

    #[test]
    fn word_overflow_fills_zero_on_first_pass() {
        let mut ctx = AssemblyContext::new(Cpu::Nmos6502, false);
        ctx.begin_pass();
        let mut diags = Diagnostics::new();
        let items = vec![ListItem::Expr(Expr::literal(tok(), 0x1_0000))];
        execute(Directive::Word, Some(&Operand::ExpressionList(items)), &tok(), &mut ctx, &mut diags);
        assert_eq!(ctx.output.bytes_written(), &[0, 0]);
        assert!(!diags.has_errors());
    }

    #[test]
    fn cstring_appends_zero_terminator() {
        let mut ctx = AssemblyContext::new(Cpu::Nmos6502, false);
        ctx.begin_pass();
        let mut diags = Diagnostics::new();
        let t = str_tok("\"hi\"");
        let items = vec![ListItem::Str(t.clone())];
        execute(Directive::CString, Some(&Operand::ExpressionList(items)), &t, &mut ctx, &mut diags);
        assert_eq!(ctx.output.bytes_written(), &[b'h', b'i', 0]);
    }

    #[test]
    fn fill_replicates_value_pattern() {
        let mut ctx = AssemblyContext::new(Cpu::Nmos6502, false);
        ctx.begin_pass();
        let mut diags = Diagnostics::new();
        let items = vec![ListItem::Expr(Expr::literal(tok(), 4)), ListItem::Expr(Expr::literal(tok(), 0xab))];
        execute(Directive::Fill, Some(&Operand::ExpressionList(items)), &tok(), &mut ctx, &mut diags);
        assert_eq!(ctx.output.bytes_written(), &[0xab, 0xab, 0xab, 0xab]);
    }
}
