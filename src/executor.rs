//! Per-statement execution (§4.8): label bookkeeping, then dispatch to the
//! encoder or a pseudo-op handler. One call per statement per pass; the pass
//! driver in `pass.rs` supplies the loop and the convergence check.

use crate::ast::{Instruction, Label, Statement};
use crate::context::AssemblyContext;
use crate::diagnostics::{DiagKind, Diagnostics};
use crate::encoder::{self, WidthFlags};
use crate::eval::EvalContext;
use crate::pseudo;
use crate::value::is_defined;

/// Executes one statement, returning a disassembly fragment for the listing
/// (instructions and most directives produce one; labels-only and flow
/// directives don't).
pub fn execute_statement(stmt: &Statement, ctx: &mut AssemblyContext, diags: &mut Diagnostics) -> Option<String> {
    let logical_start_pc = ctx.output.logical_pc;
    handle_label(stmt, logical_start_pc, ctx, diags);

    match &stmt.instruction {
        None => None,
        Some(Instruction::MacroCall(_, _)) => None,

        Some(Instruction::Assign(tok, expr)) => {
            let v = ctx.eval(diags, expr);
            if is_defined(v) {
                let name = tok.text().to_owned();
                if ctx.pass == 1 {
                    if !ctx.symbols.define(&name, v) {
                        diags.error(DiagKind::DuplicateLabel(name), Some(tok.clone()));
                    }
                } else if ctx.symbols.update(&name, v) {
                    ctx.pass_needed = true;
                }
            }
            None
        }

        Some(Instruction::PcAssign(_, expr)) => {
            let v = ctx.eval(diags, expr);
            ctx.output.set_pc(v);
            None
        }

        Some(Instruction::Mnemonic(tok, mnemonic, operand)) => {
            ctx.output.begin_statement();
            let widths = WidthFlags { m16: ctx.m16, x16: ctx.x16, page: ctx.page };
            let local_label = ctx.local_label.clone();
            let frag = {
                let mut eval_ctx = EvalContext {
                    symbols: &mut ctx.symbols,
                    anon: &ctx.anon,
                    diags,
                    pc: ctx.output.logical_pc,
                    pass: ctx.pass,
                    local_label: local_label.as_deref(),
                    pass_needed: &mut ctx.pass_needed,
                };
                encoder::encode(*mnemonic, operand.as_ref(), tok, ctx.cpu, &widths, &mut ctx.output, &mut eval_ctx)
            };
            if ctx.output.overflowed() {
                diags.error(DiagKind::PcOverflow, Some(tok.clone()));
            }
            frag
        }

        Some(Instruction::Directive(tok, directive, operand)) => {
            ctx.output.begin_statement();
            let frag = pseudo::execute(*directive, operand.as_ref(), tok, ctx, diags);
            if ctx.output.overflowed() {
                diags.error(DiagKind::PcOverflow, Some(tok.clone()));
            }
            frag
        }
    }
}

/// Steps 2, 4, and 5 of §4.8: the anon-label slot table and the named-label
/// define/update dance. Runs for every statement, labeled or not, since the
/// anon slot table is keyed by statement index.
fn handle_label(stmt: &Statement, logical_start_pc: crate::value::Value, ctx: &mut AssemblyContext, diags: &mut Diagnostics) {
    let (plus, hyphen) = match &stmt.label {
        Some(Label::Anon { plus, .. }) => (*plus, !*plus),
        _ => (false, false),
    };
    if ctx.pass == 1 {
        ctx.anon.add_mode_slot(stmt.index, plus, hyphen);
    }

    match &stmt.label {
        Some(Label::Anon { plus, .. }) => {
            let changed = if *plus {
                ctx.anon.record_forward(stmt.index, logical_start_pc)
            } else {
                ctx.anon.record_backward(stmt.index, logical_start_pc)
            };
            if changed {
                tracing::trace!(statement = stmt.index, "anon label moved, another pass needed");
                ctx.pass_needed = true;
            }
        }
        Some(Label::Ident(tok)) => {
            let raw = tok.text();
            let name = if raw.starts_with('_') {
                let scope = ctx.local_label.clone().unwrap_or_default();
                format!("{}.{}", scope, raw)
            } else {
                raw.to_owned()
            };
            if ctx.pass == 1 {
                if !ctx.symbols.define(&name, logical_start_pc) {
                    diags.error(DiagKind::DuplicateLabel(name), Some(tok.clone()));
                }
            } else if ctx.symbols.update(&name, logical_start_pc) {
                tracing::trace!(label = %name, "label value changed, another pass needed");
                ctx.pass_needed = true;
            }
            if !raw.starts_with('_') {
                ctx.local_label = Some(raw.to_owned());
            }
        }
        None => {}
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ast::Expr;
    use crate::cpu::Cpu;
    use crate::mnemonic::Mnemonic;
    use crate::source::SourceFile;
    use crate::token::{Token, TokenKind};
    use std::rc::Rc;

    fn tok(text: &str) -> Token {
        let file = Rc::new(SourceFile::new("t", &format!("{}\n", text)));
        Token::new(TokenKind::Ident, file, 1, 1, 0, text.len())
    }

    #[test]
    fn named_label_defines_pc_and_updates_local_label() {
        let mut ctx = AssemblyContext::new(Cpu::Nmos6502, false);
        ctx.begin_pass();
        let mut diags = Diagnostics::new();
        let stmt = Statement { label: Some(Label::Ident(tok("loop"))), instruction: None, index: 0 };
        execute_statement(&stmt, &mut ctx, &mut diags);
        assert_eq!(ctx.symbols.lookup("loop"), Some(0));
        assert_eq!(ctx.local_label.as_deref(), Some("loop"));
    }

    #[test]
    fn duplicate_label_on_first_pass_is_an_error() {
        let mut ctx = AssemblyContext::new(Cpu::Nmos6502, false);
        ctx.begin_pass();
        let mut diags = Diagnostics::new();
        let stmt0 = Statement { label: Some(Label::Ident(tok("foo"))), instruction: None, index: 0 };
        let stmt1 = Statement { label: Some(Label::Ident(tok("foo"))), instruction: None, index: 1 };
        execute_statement(&stmt0, &mut ctx, &mut diags);
        execute_statement(&stmt1, &mut ctx, &mut diags);
        assert!(diags.has_errors());
    }

    #[test]
    fn mnemonic_statement_encodes_and_advances_pc() {
        let mut ctx = AssemblyContext::new(Cpu::Nmos6502, false);
        ctx.begin_pass();
        let mut diags = Diagnostics::new();
        let stmt = Statement {
            label: None,
            instruction: Some(Instruction::Mnemonic(tok("inx"), Mnemonic::INX, None)),
            index: 0,
        };
        let frag = execute_statement(&stmt, &mut ctx, &mut diags);
        assert_eq!(frag.as_deref(), Some("inx"));
        assert_eq!(ctx.output.pc, 1);
    }

    #[test]
    fn pc_assign_moves_both_cursors() {
        let mut ctx = AssemblyContext::new(Cpu::Nmos6502, false);
        ctx.begin_pass();
        let mut diags = Diagnostics::new();
        let expr = Expr::literal(tok("$c000"), 0xc000);
        let stmt = Statement { label: None, instruction: Some(Instruction::PcAssign(tok("*"), expr)), index: 0 };
        execute_statement(&stmt, &mut ctx, &mut diags);
        assert_eq!(ctx.output.pc, 0xc000);
        assert_eq!(ctx.output.logical_pc, 0xc000);
    }
}
