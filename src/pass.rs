//! The multi-pass driver (§4.7): parse once, then re-execute the whole
//! statement list pass after pass until no label moved, a hard error stops
//! things early, or the pass budget runs out.
//!
//! Unlike the pseudocode's interleaved "parse a statement, then execute it"
//! loop, this builds the full `Vec<Statement>` up front via
//! `Parser::parse_program` and re-walks it uniformly on every pass, first
//! included. The parser already hands back a complete list rather than a
//! pull-one-at-a-time stream, so there's no benefit to threading parse and
//! execute together, and a flat re-walk is far easier to reason about.

use std::rc::Rc;

use crate::ast::{Instruction, Label, Statement};
use crate::context::AssemblyContext;
use crate::cpu::Cpu;
use crate::diagnostics::{DiagKind, Diagnostics};
use crate::executor;
use crate::labelreport;
use crate::lexer::Lexer;
use crate::listing::{self, Marker};
use crate::parser::Parser;
use crate::source::SourceFile;
use crate::token::Token;

pub const MAX_PASSES: u32 = 4;

pub struct AssembleResult {
    pub context: AssemblyContext,
    pub passes_run: u32,
}

/// Runs the assembler end to end against one top-level source file: lex,
/// parse, then pass-loop to a fixed point. Returns the converged context
/// (output buffer, symbol table, listing) regardless of whether errors were
/// reported; the caller decides whether to still write output.
pub fn assemble(file: Rc<SourceFile>, cpu: Cpu, case_sensitive: bool, diags: &mut Diagnostics) -> AssembleResult {
    let lexer = Lexer::new(file, case_sensitive);
    let mut parser = Parser::new(lexer);
    let statements = parser.parse_program(diags);

    let mut ctx = AssemblyContext::new(cpu, case_sensitive);

    if diags.has_errors() {
        return AssembleResult { context: ctx, passes_run: 0 };
    }

    loop {
        ctx.begin_pass();
        let span = tracing::info_span!("pass", pass = ctx.pass);
        let _enter = span.enter();
        run_pass(&statements, &mut ctx, diags);
        if diags.has_fatal() {
            tracing::debug!("pass aborted on a fatal diagnostic");
            break;
        }
        if !ctx.pass_needed {
            tracing::debug!("converged");
            break;
        }
        if ctx.pass >= MAX_PASSES {
            diags.error(DiagKind::TooManyPasses, None);
            break;
        }
        tracing::debug!("another pass needed");
    }

    AssembleResult { context: ctx, passes_run: ctx.pass }
}

fn run_pass(statements: &[Statement], ctx: &mut AssemblyContext, diags: &mut Diagnostics) {
    for stmt in statements {
        if diags.has_fatal() {
            break;
        }
        let start_pc = ctx.output.pc;
        let logical_pc = ctx.output.logical_pc;
        let fragment = executor::execute_statement(stmt, ctx, diags);
        if !ctx.listing_enabled {
            continue;
        }
        let end_pc = ctx.output.pc as usize;
        let bytes = &ctx.output.all_bytes()[start_pc as usize..end_pc];
        let marker = statement_marker(stmt);
        let source_line = representative_token(stmt)
            .map(|t| t.file.line(t.line).to_owned())
            .unwrap_or_default();
        let line = listing::format_line(marker, logical_pc, bytes, fragment.as_deref(), &source_line);
        ctx.record_listing_line(line);
    }
}

fn statement_marker(stmt: &Statement) -> Marker {
    match &stmt.instruction {
        Some(Instruction::Mnemonic(..)) => Marker::Instruction,
        Some(Instruction::Directive(..)) => Marker::PseudoOp,
        Some(Instruction::Assign(..)) | Some(Instruction::PcAssign(..)) => Marker::Assignment,
        Some(Instruction::MacroCall(..)) | None => Marker::Unassembled,
    }
}

fn representative_token(stmt: &Statement) -> Option<&Token> {
    if let Some(instr) = &stmt.instruction {
        let tok = match instr {
            Instruction::Mnemonic(t, ..) => t,
            Instruction::Directive(t, ..) => t,
            Instruction::Assign(t, ..) => t,
            Instruction::PcAssign(t, ..) => t,
            Instruction::MacroCall(t, ..) => t,
        };
        return Some(tok);
    }
    match &stmt.label {
        Some(Label::Ident(t)) => Some(t),
        Some(Label::Anon { token, .. }) => Some(token),
        None => None,
    }
}

/// Builds the `-l`/`--label` report text from the converged context's symbol
/// table.
pub fn label_report(ctx: &AssemblyContext) -> String {
    labelreport::report(ctx.symbols.iter())
}

/// Joins the accumulated listing lines from the converged (final) pass.
pub fn listing_text(ctx: &AssemblyContext) -> String {
    ctx.listing.concat()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn assemble_str(src: &str, cpu: Cpu) -> AssembleResult {
        let file = Rc::new(SourceFile::new("t", src));
        let mut diags = Diagnostics::new();
        assemble(file, cpu, false, &mut diags)
    }

    #[test]
    fn simple_program_converges_in_one_pass() {
        let result = assemble_str("lda #$01\nsta $00\n", Cpu::Nmos6502);
        assert_eq!(result.passes_run, 1);
        assert_eq!(result.context.output.bytes_written(), &[0xa9, 0x01, 0x85, 0x00]);
    }

    #[test]
    fn forward_reference_to_a_label_needs_a_second_pass() {
        let result = assemble_str("jmp target\ntarget: nop\n", Cpu::Nmos6502);
        assert!(result.passes_run >= 2);
        assert_eq!(&result.context.output.bytes_written()[0..1], &[0x4c]);
    }

    #[test]
    fn label_report_lists_defined_symbols() {
        let result = assemble_str("start: nop\n", Cpu::Nmos6502);
        let text = label_report(&result.context);
        assert!(text.contains("start"));
    }
}
