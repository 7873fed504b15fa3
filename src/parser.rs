//! Recursive-descent statement/expression/operand parser. Owns the `Lexer`
//! directly and pulls tokens into a small lookahead buffer lazily; `.include`
//! and macro expansion splice their token vectors directly into that buffer
//! at the cursor, so nested expansion is just "parsing keeps going, reading
//! from a different place" rather than a separate control path.

use std::collections::HashMap;
use std::rc::Rc;

use crate::ast::{BinaryOp, Expr, Instruction, Label, ListItem, Operand, Statement, UnaryOp, WidthModifier};
use crate::diagnostics::{DiagKind, Diagnostics};
use crate::directive::Directive;
use crate::eval::{fold_binary, fold_unary};
use crate::lexer::Lexer;
use crate::macros::{self, Macro};
use crate::mnemonic::Mnemonic;
use crate::source::SourceFile;
use crate::strtab::normalize;
use crate::token::{decode_string_literal, Register, Token, TokenKind};
use crate::value::{Value, INT32_MIN, UINT32_MAX, UINT8_MAX, UNDEFINED};

pub struct Parser {
    lexer: Lexer,
    buffer: Vec<Token>,
    pos: usize,
    macros: HashMap<String, Rc<Macro>>,
    case_sensitive: bool,
    in_macro_def: bool,
    next_index: usize,
}

impl Parser {
    pub fn new(lexer: Lexer) -> Self {
        let case_sensitive = lexer.case_sensitive();
        Parser {
            lexer,
            buffer: Vec::new(),
            pos: 0,
            macros: HashMap::new(),
            case_sensitive,
            in_macro_def: false,
            next_index: 0,
        }
    }

    /// Parses the whole token stream (including everything pulled in by
    /// `.include` and macro expansion) into a flat statement list.
    pub fn parse_program(&mut self, diags: &mut Diagnostics) -> Vec<Statement> {
        let mut statements = Vec::new();
        loop {
            if self.peek().kind == TokenKind::Eof {
                break;
            }
            if let Some(stmt) = self.parse_statement(diags) {
                statements.push(stmt);
            }
        }
        statements
    }

    // -- token buffer -----------------------------------------------------

    fn fill(&mut self, n: usize) {
        while self.pos + n >= self.buffer.len() {
            let tok = self.lexer.next_token();
            let eof = tok.kind == TokenKind::Eof;
            self.buffer.push(tok);
            if eof {
                break;
            }
        }
    }

    fn peek(&mut self) -> &Token {
        self.fill(0);
        &self.buffer[self.pos]
    }

    fn peek_at(&mut self, ahead: usize) -> &Token {
        self.fill(ahead);
        let idx = (self.pos + ahead).min(self.buffer.len() - 1);
        &self.buffer[idx]
    }

    fn advance(&mut self) -> Token {
        self.fill(0);
        let tok = self.buffer[self.pos].clone();
        if tok.kind != TokenKind::Eof {
            self.pos += 1;
        }
        tok
    }

    /// Inserts `tokens` at the current cursor position, so the next
    /// `advance`/`peek` sees them before anything already buffered.
    fn splice(&mut self, tokens: Vec<Token>) {
        let rest = self.buffer.split_off(self.pos);
        self.buffer.truncate(self.pos);
        self.buffer.extend(tokens);
        self.buffer.extend(rest);
    }

    fn expect(&mut self, diags: &mut Diagnostics, kind: TokenKind, expected: &str) -> Token {
        if self.peek().kind == kind {
            self.advance()
        } else {
            let tok = self.peek().clone();
            diags.error(
                DiagKind::UnexpectedToken { found: tok.kind.to_string(), expected: expected.to_owned() },
                Some(tok.clone()),
            );
            tok
        }
    }

    fn expect_register(&mut self, diags: &mut Diagnostics, reg: Register) {
        if self.peek().kind == TokenKind::Register(reg) {
            self.advance();
        } else {
            let tok = self.peek().clone();
            diags.error(
                DiagKind::UnexpectedToken {
                    found: tok.kind.to_string(),
                    expected: format!("register '{}'", reg_name(reg)),
                },
                Some(tok),
            );
        }
    }

    fn recover(&mut self) {
        while !self.peek().kind.is_end_of_statement() {
            self.advance();
        }
        if matches!(self.peek().kind, TokenKind::Newline | TokenKind::Colon) {
            self.advance();
        }
    }

    // -- statements ---------------------------------------------------------

    fn parse_statement(&mut self, diags: &mut Diagnostics) -> Option<Statement> {
        if matches!(self.peek().kind, TokenKind::Newline | TokenKind::Colon) {
            self.advance();
            return Some(Statement { label: None, instruction: None, index: self.take_index() });
        }

        // `name .macro (...)` — the ident becomes the macro's name, not a label.
        if self.peek().kind == TokenKind::Ident && self.peek_at(1).kind == TokenKind::Directive(Directive::Macro) {
            self.parse_macro_def(diags);
            return Some(Statement { label: None, instruction: None, index: self.take_index() });
        }

        // `name = expr` / `* = expr`
        if self.peek().kind == TokenKind::Ident && self.peek_at(1).kind == TokenKind::Equal {
            let name_tok = self.advance();
            self.advance(); // '='
            let expr = self.parse_expr(diags, 1);
            self.expect_end_of_statement(diags);
            return Some(Statement {
                label: None,
                instruction: Some(Instruction::Assign(name_tok, expr)),
                index: self.take_index(),
            });
        }
        if self.peek().kind == TokenKind::Asterisk && self.peek_at(1).kind == TokenKind::Equal {
            let star_tok = self.advance();
            self.advance(); // '='
            let expr = self.parse_expr(diags, 1);
            self.expect_end_of_statement(diags);
            return Some(Statement {
                label: None,
                instruction: Some(Instruction::PcAssign(star_tok, expr)),
                index: self.take_index(),
            });
        }

        let label = self.parse_optional_label();
        let instruction = self.parse_optional_instruction(diags);
        self.expect_end_of_statement(diags);
        Some(Statement { label, instruction, index: self.take_index() })
    }

    fn take_index(&mut self) -> usize {
        let i = self.next_index;
        self.next_index += 1;
        i
    }

    fn parse_optional_label(&mut self) -> Option<Label> {
        match self.peek().kind.clone() {
            TokenKind::Ident => {
                let tok = self.advance();
                Some(Label::Ident(tok))
            }
            TokenKind::MultiPlus(_) | TokenKind::MultiHyphen(_) => {
                let tok = self.advance();
                let plus = matches!(tok.kind, TokenKind::MultiPlus(_));
                Some(Label::Anon { token: tok, plus })
            }
            _ => None,
        }
    }

    fn parse_optional_instruction(&mut self, diags: &mut Diagnostics) -> Option<Instruction> {
        match self.peek().kind.clone() {
            TokenKind::Mnemonic(m) => {
                let tok = self.advance();
                let operand = self.parse_operand_for_mnemonic(diags, m);
                Some(Instruction::Mnemonic(tok, m, operand))
            }
            TokenKind::Directive(Directive::Include) => {
                let tok = self.advance();
                self.parse_include(diags, tok);
                None
            }
            TokenKind::Directive(Directive::Macro) => {
                // A label-less `.macro` (no preceding name) is a definition error.
                let tok = self.peek().clone();
                diags.error(DiagKind::UnexpectedToken {
                    found: tok.kind.to_string(),
                    expected: "a name before '.macro'".into(),
                }, Some(tok));
                self.advance();
                self.skip_macro_body(diags);
                None
            }
            TokenKind::Directive(d) => {
                let tok = self.advance();
                let operand = self.parse_directive_operand(diags, d);
                Some(Instruction::Directive(tok, d, operand))
            }
            TokenKind::MacroName(_) => {
                let (call_tok, args) = self.parse_macro_call();
                let name = macro_key(&call_tok, self.case_sensitive);
                if let Some(mac) = self.macros.get(&name).cloned() {
                    let expanded = macros::expand(&mac, &call_tok, &args, None, diags);
                    self.splice(expanded);
                } else {
                    diags.error(DiagKind::UndefinedSymbol(call_tok.text().to_owned()), Some(call_tok.clone()));
                }
                Some(Instruction::MacroCall(call_tok, args))
            }
            _ if self.peek().kind.is_end_of_statement() => None,
            _ => {
                let tok = self.peek().clone();
                diags.error(
                    DiagKind::UnexpectedToken { found: tok.kind.to_string(), expected: "an instruction".into() },
                    Some(tok.clone()),
                );
                self.recover();
                None
            }
        }
    }

    fn expect_end_of_statement(&mut self, diags: &mut Diagnostics) {
        match self.peek().kind.clone() {
            TokenKind::Newline | TokenKind::Colon => {
                self.advance();
            }
            TokenKind::Eof => {}
            _ => {
                let tok = self.peek().clone();
                diags.error(
                    DiagKind::UnexpectedToken { found: tok.kind.to_string(), expected: "end of statement".into() },
                    Some(tok),
                );
                self.recover();
            }
        }
    }

    // -- `.include` -----------------------------------------------------

    fn parse_include(&mut self, diags: &mut Diagnostics, directive_tok: Token) {
        if self.peek().kind != TokenKind::StringLiteral {
            let tok = self.peek().clone();
            diags.error(
                DiagKind::UnexpectedToken { found: tok.kind.to_string(), expected: "string literal".into() },
                Some(tok),
            );
            self.recover();
            return;
        }
        let path_tok = self.advance();
        let path = decode_string_literal(path_tok.text());
        if self.lexer.currently_lexing(&path) {
            diags.error(DiagKind::RecursiveInclude(path), Some(path_tok));
            self.expect_end_of_statement(diags);
            return;
        }
        match SourceFile::from_path(&path) {
            Ok(file) => {
                tracing::debug!(path = %path, "include pushed");
                let tokens = self.lexer.include_and_process(Rc::new(file), directive_tok.line);
                self.splice(tokens);
            }
            Err(_) => {
                diags.error(DiagKind::FileNotFound(path), Some(path_tok));
            }
        }
        self.expect_end_of_statement(diags);
    }

    // -- `.macro` / `.endmacro` -------------------------------------------

    fn parse_macro_def(&mut self, diags: &mut Diagnostics) {
        let name_tok = self.advance(); // the ident preceding `.macro`
        let def_tok = self.advance(); // `.macro` itself — the provenance anchor
        let name: Rc<str> = Rc::from(format!(".{}", name_tok.text()));

        let mut params = Vec::new();
        if self.peek().kind == TokenKind::LParen {
            self.advance();
            if self.peek().kind != TokenKind::RParen {
                loop {
                    if self.peek().kind == TokenKind::Ident {
                        params.push(self.advance().text().to_owned());
                    } else {
                        let tok = self.peek().clone();
                        diags.error(
                            DiagKind::UnexpectedToken { found: tok.kind.to_string(), expected: "parameter name".into() },
                            Some(tok),
                        );
                        break;
                    }
                    if self.peek().kind == TokenKind::Comma {
                        self.advance();
                    } else {
                        break;
                    }
                }
            }
            self.expect(diags, TokenKind::RParen, "')'");
        }
        self.expect_end_of_statement(diags);

        if self.in_macro_def {
            diags.error(DiagKind::NestedMacro, Some(def_tok.clone()));
        }
        self.in_macro_def = true;

        let mut body = Vec::new();
        loop {
            match self.peek().kind.clone() {
                TokenKind::Eof => {
                    diags.error(DiagKind::UnterminatedMacro, Some(def_tok.clone()));
                    break;
                }
                TokenKind::Directive(Directive::EndMacro) => {
                    self.advance();
                    self.expect_end_of_statement(diags);
                    break;
                }
                _ => body.push(self.advance()),
            }
        }
        self.in_macro_def = false;

        let key = normalize(&name, self.case_sensitive);
        if self.macros.contains_key(&key) {
            diags.error(DiagKind::MacroRedefinition(name.to_string()), Some(name_tok));
        } else {
            self.lexer.define_macro_name(name.clone());
            self.macros.insert(key, Rc::new(Macro::new(name, def_tok, params, body, self.case_sensitive)));
        }
    }

    /// Used only when a `.macro` reached via `parse_optional_instruction`'s
    /// error path (no preceding name) still needs its body consumed so
    /// parsing can resync at `.endmacro` instead of cascading errors.
    fn skip_macro_body(&mut self, diags: &mut Diagnostics) {
        self.expect_end_of_statement(diags);
        loop {
            match self.peek().kind.clone() {
                TokenKind::Eof => break,
                TokenKind::Directive(Directive::EndMacro) => {
                    self.advance();
                    self.expect_end_of_statement(diags);
                    break;
                }
                _ => { self.advance(); }
            }
        }
    }

    fn parse_macro_call(&mut self) -> (Token, Vec<Vec<Token>>) {
        let call_tok = self.advance();
        let mut args = Vec::new();
        if !self.peek().kind.is_end_of_statement() {
            loop {
                args.push(self.collect_arg_tokens());
                if self.peek().kind == TokenKind::Comma {
                    self.advance();
                } else {
                    break;
                }
            }
        }
        (call_tok, args)
    }

    /// Collects one macro-call argument's tokens up to the next top-level
    /// comma or end of statement, honoring `()`/`[]`/`{}` nesting so an
    /// argument like `(a, b)` isn't split at its inner comma.
    fn collect_arg_tokens(&mut self) -> Vec<Token> {
        let mut depth = 0i32;
        let mut out = Vec::new();
        loop {
            let kind = self.peek().kind.clone();
            if depth == 0 && (kind == TokenKind::Comma || kind.is_end_of_statement()) {
                break;
            }
            match kind {
                TokenKind::LParen | TokenKind::LSquare | TokenKind::LCurly => depth += 1,
                TokenKind::RParen | TokenKind::RSquare | TokenKind::RCurly => depth -= 1,
                _ => {}
            }
            out.push(self.advance());
        }
        out
    }

    // -- expressions ------------------------------------------------------

    fn parse_expr(&mut self, diags: &mut Diagnostics, min_prec: u8) -> Expr {
        let mut lhs = self.parse_unary(diags);
        loop {
            let kind = self.peek().kind.clone();
            match binop_info(&kind, min_prec) {
                Some((prec, right_assoc, op)) if prec >= min_prec => {
                    let op_tok = self.advance();
                    let next_min = if right_assoc { prec } else { prec + 1 };
                    let rhs = self.parse_expr(diags, next_min);
                    lhs = Expr::binary(op, op_tok, lhs, rhs, fold_binary);
                }
                _ => break,
            }
        }
        if min_prec <= 3 && self.peek().kind == TokenKind::Query {
            let q_tok = self.advance();
            let branch_min = if min_prec <= 1 { 1 } else { 3 };
            let then_ = self.parse_expr(diags, branch_min);
            self.expect(diags, TokenKind::Colon, "':'");
            let else_ = self.parse_expr(diags, 3);
            lhs = Expr::ternary(q_tok, lhs, then_, else_);
        }
        lhs
    }

    fn parse_unary(&mut self, diags: &mut Diagnostics) -> Expr {
        match self.peek().kind.clone() {
            TokenKind::Bang => {
                let t = self.advance();
                let inner = self.parse_unary(diags);
                Expr::unary(UnaryOp::Not, t, inner, fold_unary)
            }
            TokenKind::Tilde => {
                let t = self.advance();
                let inner = self.parse_unary(diags);
                Expr::unary(UnaryOp::BitNot, t, inner, fold_unary)
            }
            TokenKind::LAngle => {
                let t = self.advance();
                let inner = self.parse_unary(diags);
                Expr::unary(UnaryOp::LowByte, t, inner, fold_unary)
            }
            TokenKind::RAngle => {
                let t = self.advance();
                let inner = self.parse_unary(diags);
                Expr::unary(UnaryOp::HighByte, t, inner, fold_unary)
            }
            TokenKind::Ampersand => {
                let t = self.advance();
                let inner = self.parse_unary(diags);
                Expr::unary(UnaryOp::LowWord, t, inner, fold_unary)
            }
            TokenKind::MultiPlus(1) if self.starts_primary_at(1) => {
                self.advance();
                self.parse_unary(diags)
            }
            TokenKind::MultiHyphen(1) if self.starts_primary_at(1) => {
                let t = self.advance();
                let inner = self.parse_unary(diags);
                Expr::unary(UnaryOp::Neg, t, inner, fold_unary)
            }
            _ => self.parse_primary(diags),
        }
    }

    fn parse_primary(&mut self, diags: &mut Diagnostics) -> Expr {
        let tok = self.peek().clone();
        match tok.kind.clone() {
            TokenKind::HexLiteral | TokenKind::BinLiteral | TokenKind::DecLiteral => {
                self.advance();
                let v = literal_value(&tok, diags);
                Expr::literal(tok, v)
            }
            TokenKind::CharLiteral(c) => {
                self.advance();
                let v = c as Value;
                if v > UINT8_MAX {
                    diags.error(DiagKind::IllegalLiteralRange, Some(tok.clone()));
                    Expr::literal(tok, UNDEFINED)
                } else {
                    Expr::literal(tok, v)
                }
            }
            TokenKind::Asterisk => {
                self.advance();
                Expr::ident(tok)
            }
            TokenKind::MultiPlus(_) | TokenKind::MultiHyphen(_) => {
                self.advance();
                Expr::ident(tok)
            }
            TokenKind::Ident => {
                self.advance();
                if self.peek().kind == TokenKind::LParen {
                    self.advance();
                    let mut params = Vec::new();
                    if self.peek().kind != TokenKind::RParen {
                        loop {
                            params.push(self.parse_expr(diags, 3));
                            if self.peek().kind == TokenKind::Comma {
                                self.advance();
                            } else {
                                break;
                            }
                        }
                    }
                    self.expect(diags, TokenKind::RParen, "')'");
                    Expr::fcn_call(tok, params)
                } else {
                    Expr::ident(tok)
                }
            }
            TokenKind::LParen => {
                self.advance();
                let e = self.parse_expr(diags, 3);
                self.expect(diags, TokenKind::RParen, "')'");
                e
            }
            _ => {
                diags.error(
                    DiagKind::UnexpectedToken { found: tok.kind.to_string(), expected: "an expression".into() },
                    Some(tok.clone()),
                );
                Expr::literal(tok, UNDEFINED)
            }
        }
    }

    fn starts_primary_at(&mut self, ahead: usize) -> bool {
        let k = self.peek_at(ahead).kind.clone();
        starts_primary(&k)
    }

    // -- operands ----------------------------------------------------------

    fn parse_operand_for_mnemonic(&mut self, diags: &mut Diagnostics, m: Mnemonic) -> Option<Operand> {
        if self.peek().kind.is_end_of_statement() {
            return None;
        }
        if m.is_bbr_bbs() {
            let zp = self.parse_expr(diags, 3);
            self.expect(diags, TokenKind::Comma, "','");
            let target = self.parse_expr(diags, 3);
            return Some(Operand::BitOffsZp { bit: m.bit_index().unwrap_or(0), zp, target });
        }
        if m.is_rmb_smb() {
            let zp = self.parse_expr(diags, 3);
            return Some(Operand::BitZp { bit: m.bit_index().unwrap_or(0), zp });
        }
        if m.is_mvn_mvp() {
            let src = self.parse_expr(diags, 3);
            self.expect(diags, TokenKind::Comma, "','");
            let dst = self.parse_expr(diags, 3);
            return Some(Operand::TwoOperands { src, dst });
        }
        self.parse_general_operand(diags)
    }

    fn parse_general_operand(&mut self, diags: &mut Diagnostics) -> Option<Operand> {
        match self.peek().kind.clone() {
            TokenKind::Hash => {
                self.advance();
                let width = self.maybe_consume_width();
                let expr = self.parse_expr(diags, 3);
                Some(Operand::Immediate { expr, width })
            }
            TokenKind::Register(Register::A) => {
                self.advance();
                Some(Operand::Accumulator)
            }
            TokenKind::LSquare => {
                let width = self.maybe_consume_width();
                if self.peek().kind != TokenKind::LSquare {
                    return Some(self.parse_value_operand_with_width(diags, width));
                }
                self.advance(); // '['
                let expr = self.parse_expr(diags, 3);
                self.expect(diags, TokenKind::RSquare, "']'");
                if self.peek().kind == TokenKind::Comma {
                    self.advance();
                    self.expect_register(diags, Register::Y);
                    Some(Operand::DirectY { expr })
                } else {
                    Some(Operand::Direct { expr })
                }
            }
            TokenKind::LParen => {
                self.advance();
                let expr = self.parse_expr(diags, 3);
                if self.peek().kind == TokenKind::Comma {
                    self.advance();
                    match self.peek().kind.clone() {
                        TokenKind::Register(Register::X) => {
                            self.advance();
                            self.expect(diags, TokenKind::RParen, "')'");
                            Some(Operand::IndirectX { expr })
                        }
                        TokenKind::Register(Register::S) => {
                            self.advance();
                            self.expect(diags, TokenKind::RParen, "')'");
                            self.expect(diags, TokenKind::Comma, "','");
                            self.expect_register(diags, Register::Y);
                            Some(Operand::IndirectS { expr })
                        }
                        _ => {
                            let tok = self.peek().clone();
                            diags.error(
                                DiagKind::UnexpectedToken {
                                    found: tok.kind.to_string(),
                                    expected: "register 'x' or 's'".into(),
                                },
                                Some(tok),
                            );
                            self.expect(diags, TokenKind::RParen, "')'");
                            Some(Operand::Indirect { expr })
                        }
                    }
                } else {
                    self.expect(diags, TokenKind::RParen, "')'");
                    if self.peek().kind == TokenKind::Comma {
                        self.advance();
                        self.expect_register(diags, Register::Y);
                        Some(Operand::IndirectY { expr })
                    } else {
                        Some(Operand::Indirect { expr })
                    }
                }
            }
            _ => {
                let width = self.maybe_consume_width();
                Some(self.parse_value_operand_with_width(diags, width))
            }
        }
    }

    fn parse_value_operand_with_width(&mut self, diags: &mut Diagnostics, width: WidthModifier) -> Operand {
        let expr = self.parse_expr(diags, 3);
        if self.peek().kind == TokenKind::Comma {
            self.advance();
            match self.peek().kind.clone() {
                TokenKind::Register(Register::X) => {
                    self.advance();
                    Operand::IndexX { expr, width }
                }
                TokenKind::Register(Register::Y) => {
                    self.advance();
                    Operand::IndexY { expr, width }
                }
                TokenKind::Register(Register::S) => {
                    self.advance();
                    Operand::IndexS { expr, width }
                }
                _ => {
                    let tok = self.peek().clone();
                    diags.error(
                        DiagKind::UnexpectedToken { found: tok.kind.to_string(), expected: "index register".into() },
                        Some(tok),
                    );
                    Operand::ZpAbsolute { expr, width }
                }
            }
        } else {
            Operand::ZpAbsolute { expr, width }
        }
    }

    /// Consumes a leading `[8]`/`[16]`/`[24]` width prefix and returns its
    /// meaning, but only when the bracket's sole content is one of those
    /// three literal spellings *and* something expression-shaped follows the
    /// closing bracket. Otherwise nothing is consumed — the bracket belongs
    /// to the caller's own `[e]` Direct-operand dispatch instead.
    fn maybe_consume_width(&mut self) -> WidthModifier {
        if self.peek().kind != TokenKind::LSquare {
            return WidthModifier::None;
        }
        let digit_kind = self.peek_at(1).kind.clone();
        let digit_text = self.peek_at(1).text().to_owned();
        let qualifies = digit_kind == TokenKind::DecLiteral
            && matches!(digit_text.as_str(), "8" | "16" | "24")
            && self.peek_at(2).kind == TokenKind::RSquare
            && starts_primary(&self.peek_at(3).kind.clone());
        if !qualifies {
            return WidthModifier::None;
        }
        self.advance(); // '['
        let digits = self.advance();
        self.advance(); // ']'
        match digits.text() {
            "8" => WidthModifier::W8,
            "16" => WidthModifier::W16,
            _ => WidthModifier::W24,
        }
    }

    // -- directive operands -------------------------------------------------

    fn parse_directive_operand(&mut self, diags: &mut Diagnostics, d: Directive) -> Option<Operand> {
        use Directive::*;
        match d {
            Include | Macro | EndMacro => unreachable!("handled by the statement dispatcher"),
            M8 | M16 | Mx8 | Mx16 | X8 | X16 | ProOn | ProOff | End | EndRelocate => None,
            Dp | Align | Relocate => {
                let e = self.parse_expr(diags, 3);
                Some(Operand::ExpressionList(vec![ListItem::Expr(e)]))
            }
            Str | CString | LString | NString | PString => {
                if self.peek().kind == TokenKind::StringLiteral {
                    let t = self.advance();
                    Some(Operand::ExpressionList(vec![ListItem::Str(t)]))
                } else {
                    let tok = self.peek().clone();
                    diags.error(
                        DiagKind::UnexpectedToken { found: tok.kind.to_string(), expected: "string literal".into() },
                        Some(tok),
                    );
                    None
                }
            }
            Binary => {
                let mut items = Vec::new();
                if self.peek().kind == TokenKind::StringLiteral {
                    items.push(ListItem::Str(self.advance()));
                } else {
                    let tok = self.peek().clone();
                    diags.error(
                        DiagKind::UnexpectedToken { found: tok.kind.to_string(), expected: "string literal".into() },
                        Some(tok),
                    );
                }
                while self.peek().kind == TokenKind::Comma {
                    self.advance();
                    items.push(self.parse_list_item(diags));
                }
                Some(Operand::ExpressionList(items))
            }
            Byte | Word | Dword | Long | Fill | Stringify => {
                let mut items = vec![self.parse_list_item(diags)];
                while self.peek().kind == TokenKind::Comma {
                    self.advance();
                    items.push(self.parse_list_item(diags));
                }
                Some(Operand::ExpressionList(items))
            }
        }
    }

    fn parse_list_item(&mut self, diags: &mut Diagnostics) -> ListItem {
        if self.peek().kind == TokenKind::Query {
            self.advance();
            ListItem::Query
        } else if self.peek().kind == TokenKind::StringLiteral {
            ListItem::Str(self.advance())
        } else {
            ListItem::Expr(self.parse_expr(diags, 3))
        }
    }
}

fn reg_name(r: Register) -> &'static str {
    match r {
        Register::A => "a",
        Register::X => "x",
        Register::Y => "y",
        Register::S => "s",
    }
}

fn macro_key(tok: &Token, case_sensitive: bool) -> String {
    normalize(tok.text(), case_sensitive)
}

fn starts_primary(kind: &TokenKind) -> bool {
    use TokenKind::*;
    matches!(
        kind,
        Ident | HexLiteral | BinLiteral | DecLiteral | CharLiteral(_) | Asterisk | LParen |
        MultiPlus(_) | MultiHyphen(_) | LAngle | RAngle | Ampersand | Bang | Tilde
    )
}

/// `(precedence, right-associative, op)` for a token in infix position, or
/// `None` if it isn't a binary operator at all. `Equal` only qualifies when
/// `min_prec <= 1` — the "only at the statement level" rule from the
/// precedence table.
fn binop_info(kind: &TokenKind, min_prec: u8) -> Option<(u8, bool, BinaryOp)> {
    use TokenKind as T;
    Some(match kind {
        T::Dot => (15, false, BinaryOp::Dot),
        T::DoubleCaret => (14, true, BinaryOp::Pow),
        T::Asterisk => (13, false, BinaryOp::Mul),
        T::Solidus => (13, false, BinaryOp::Div),
        T::Percent => (13, false, BinaryOp::Mod),
        T::MultiPlus(1) => (12, false, BinaryOp::Add),
        T::MultiHyphen(1) => (12, false, BinaryOp::Sub),
        T::LShift => (11, false, BinaryOp::Shl),
        T::RShift => (11, false, BinaryOp::Shr),
        T::ARShift => (11, false, BinaryOp::AShr),
        T::LAngle => (10, false, BinaryOp::Lt),
        T::Lte => (10, false, BinaryOp::Le),
        T::RAngle => (10, false, BinaryOp::Gt),
        T::Gte => (10, false, BinaryOp::Ge),
        T::Spaceship => (10, false, BinaryOp::Cmp),
        T::DoubleEqual => (9, false, BinaryOp::Eq),
        T::BangEqual => (9, false, BinaryOp::Ne),
        T::Ampersand => (8, false, BinaryOp::BitAnd),
        T::Caret => (7, false, BinaryOp::BitXor),
        T::Pipe => (6, false, BinaryOp::BitOr),
        T::DoubleAmpersand => (5, false, BinaryOp::AndAnd),
        T::DoublePipe => (4, false, BinaryOp::OrOr),
        T::Equal if min_prec <= 1 => (1, true, BinaryOp::Assign),
        _ => return None,
    })
}

/// Parses a lexed `HexLiteral`/`BinLiteral`/`DecLiteral` token's text into a
/// `Value`, range-checked to `[INT32_MIN, UINT32_MAX]` per the literal-range
/// rule; out-of-range or malformed digit runs report `IllegalLiteralRange`
/// and fold to `UNDEFINED` so parsing can continue.
fn literal_value(tok: &Token, diags: &mut Diagnostics) -> Value {
    let text = tok.text();
    let raw = match tok.kind {
        TokenKind::HexLiteral => i64::from_str_radix(&strip_underscores(&text[1..]), 16).ok(),
        TokenKind::BinLiteral => {
            let digits = &text[1..];
            let start = digits.find(|c: char| c == '0' || c == '1').unwrap_or(digits.len());
            i64::from_str_radix(&strip_underscores(&digits[start..]), 2).ok()
        }
        TokenKind::DecLiteral => strip_underscores(text).parse::<i64>().ok(),
        _ => None,
    };
    match raw {
        Some(v) if v >= INT32_MIN && v <= UINT32_MAX => v,
        _ => {
            diags.error(DiagKind::IllegalLiteralRange, Some(tok.clone()));
            UNDEFINED
        }
    }
}

fn strip_underscores(s: &str) -> String {
    s.chars().filter(|c| *c != '_').collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(text: &str) -> (Vec<Statement>, Diagnostics) {
        let file = Rc::new(SourceFile::new("t", text));
        let lexer = Lexer::new(file, false);
        let mut parser = Parser::new(lexer);
        let mut diags = Diagnostics::new();
        let stmts = parser.parse_program(&mut diags);
        (stmts, diags)
    }

    #[test]
    fn parses_label_and_mnemonic_with_immediate() {
        let (stmts, diags) = parse("start: lda #$42\n");
        assert!(!diags.has_errors());
        assert_eq!(stmts.len(), 1);
        match &stmts[0].label {
            Some(Label::Ident(t)) => assert_eq!(t.text(), "start"),
            other => panic!("expected label, got {:?}", other),
        }
        match &stmts[0].instruction {
            Some(Instruction::Mnemonic(_, Mnemonic::LDA, Some(Operand::Immediate { expr, .. }))) => {
                assert_eq!(expr.value(), 0x42);
            }
            other => panic!("expected lda #$42, got {:?}", other),
        }
    }

    #[test]
    fn label_with_colon_then_instruction_same_line() {
        let (stmts, diags) = parse("loop: inx : bne loop\n");
        assert!(!diags.has_errors());
        assert_eq!(stmts.len(), 2);
    }

    #[test]
    fn parses_precedence_climbing() {
        let (stmts, diags) = parse("x = 2 + 3 * 4\n");
        assert!(!diags.has_errors());
        match &stmts[0].instruction {
            Some(Instruction::Assign(_, expr)) => assert_eq!(expr.value(), 14),
            other => panic!("expected assign, got {:?}", other),
        }
    }

    #[test]
    fn parses_indirect_x_and_indirect_y() {
        let (stmts, diags) = parse("lda ($10,x)\nlda ($20),y\n");
        assert!(!diags.has_errors());
        assert!(matches!(
            &stmts[0].instruction,
            Some(Instruction::Mnemonic(_, Mnemonic::LDA, Some(Operand::IndirectX { .. })))
        ));
        assert!(matches!(
            &stmts[1].instruction,
            Some(Instruction::Mnemonic(_, Mnemonic::LDA, Some(Operand::IndirectY { .. })))
        ));
    }

    #[test]
    fn parses_accumulator_mode() {
        let (stmts, diags) = parse("asl a\n");
        assert!(!diags.has_errors());
        assert!(matches!(
            &stmts[0].instruction,
            Some(Instruction::Mnemonic(_, Mnemonic::ASL, Some(Operand::Accumulator)))
        ));
    }

    #[test]
    fn parses_rmb_with_bit_from_mnemonic() {
        let (stmts, diags) = parse("rmb3 $20\n");
        assert!(!diags.has_errors());
        match &stmts[0].instruction {
            Some(Instruction::Mnemonic(_, Mnemonic::RMB3, Some(Operand::BitZp { bit, .. }))) => assert_eq!(*bit, 3),
            other => panic!("expected rmb3 $20, got {:?}", other),
        }
    }

    #[test]
    fn parses_mvn_two_operands() {
        let (stmts, diags) = parse("mvn $00,$01\n");
        assert!(!diags.has_errors());
        assert!(matches!(
            &stmts[0].instruction,
            Some(Instruction::Mnemonic(_, Mnemonic::MVN, Some(Operand::TwoOperands { .. })))
        ));
    }

    #[test]
    fn parses_width_modifier_on_immediate() {
        let (stmts, diags) = parse("lda #[16]$1234\n");
        assert!(!diags.has_errors());
        match &stmts[0].instruction {
            Some(Instruction::Mnemonic(_, Mnemonic::LDA, Some(Operand::Immediate { width, .. }))) => {
                assert_eq!(*width, WidthModifier::W16);
            }
            other => panic!("expected immediate with width, got {:?}", other),
        }
    }

    #[test]
    fn parses_macro_definition_and_call() {
        let (stmts, diags) = parse("setbyte .macro (val)\nlda #\\val\n.endmacro\n.setbyte $7\n");
        assert!(!diags.has_errors(), "{:?}", diags.entries());
        // The macro def produces no AST statement of its own (no-op markers),
        // but the call site's expansion does: a new `lda #$7` statement.
        let found = stmts.iter().any(|s| matches!(
            &s.instruction,
            Some(Instruction::Mnemonic(_, Mnemonic::LDA, Some(Operand::Immediate { expr, .. }))) if expr.value() == 7
        ));
        assert!(found, "expected expanded lda #$7 among {:?}", stmts);
    }

    #[test]
    fn parses_byte_directive_list() {
        let (stmts, diags) = parse(".byte 1, 2, ?, 4\n");
        assert!(!diags.has_errors());
        match &stmts[0].instruction {
            Some(Instruction::Directive(_, Directive::Byte, Some(Operand::ExpressionList(items)))) => {
                assert_eq!(items.len(), 4);
                assert!(matches!(items[2], ListItem::Query));
            }
            other => panic!("expected .byte list, got {:?}", other),
        }
    }

    #[test]
    fn parses_ternary_expression() {
        let (stmts, diags) = parse("x = 1 ? 2 : 3\n");
        assert!(!diags.has_errors());
        assert!(matches!(&stmts[0].instruction, Some(Instruction::Assign(_, _))));
    }

    #[test]
    fn anon_label_plus_as_forward_ref_primary() {
        let (stmts, diags) = parse("bne +\n");
        assert!(!diags.has_errors());
        match &stmts[0].instruction {
            Some(Instruction::Mnemonic(_, Mnemonic::BNE, Some(Operand::ZpAbsolute { expr, .. }))) => {
                assert!(matches!(expr.kind, crate::ast::ExprKind::Ident));
            }
            other => panic!("expected bne + , got {:?}", other),
        }
    }

    #[test]
    fn unary_minus_is_arithmetic_negation() {
        let (stmts, diags) = parse("x = -1\n");
        assert!(!diags.has_errors());
        match &stmts[0].instruction {
            Some(Instruction::Assign(_, expr)) => assert_eq!(expr.value(), -1),
            other => panic!("expected assign, got {:?}", other),
        }
    }

    #[test]
    fn pc_assign_parses() {
        let (stmts, diags) = parse("* = $8000\n");
        assert!(!diags.has_errors());
        assert!(matches!(&stmts[0].instruction, Some(Instruction::PcAssign(_, _))));
    }
}
