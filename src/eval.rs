//! Two layers: [`fold_unary`]/[`fold_binary`] are pure, context-free
//! arithmetic — the closures `ast::Expr`'s smart constructors use to fold
//! constant subtrees at parse time. [`eval`] is the full, stateful
//! evaluator that walks a non-constant subtree against a symbol table,
//! the anonymous-label collection, and the diagnostics sink, honoring the
//! pass-dependent "defer on pass 1, report for real afterward" rule that
//! runs through the whole design.

use crate::anon::AnonLabels;
use crate::ast::{BinaryOp, Expr, ExprKind, UnaryOp};
use crate::diagnostics::{DiagKind, Diagnostics};
use crate::symtab::SymbolTable;
use crate::token::{Token, TokenKind};
use crate::value::*;

/// Pure unary arithmetic. Never fails: all of these operators are defined
/// for every `i64`, wrapping on the one case (`-i64::MIN`) where two's
/// complement negation has no positive counterpart.
pub fn fold_unary(op: UnaryOp, v: Value) -> Option<Value> {
    Some(match op {
        UnaryOp::Neg => v.wrapping_neg(),
        UnaryOp::Not => (v == 0) as Value,
        UnaryOp::BitNot => !v,
        UnaryOp::LowByte => low_byte(v) as Value,
        UnaryOp::HighByte => high_byte(v) as Value,
        UnaryOp::LowWord => low_word(v) as Value,
        UnaryOp::BankByte => bank_byte(v) as Value,
    })
}

/// Pure binary arithmetic. Returns `None` for division/modulo by zero and
/// for `<<`/`^^` overflow past `[INT64_MIN, INT64_MAX]` — the two cases the
/// design doc singles out for range checking. `Dot` and `Assign` always
/// return `None`: both require evaluation context (a symbol table, an
/// lvalue check) that a pure fold can't provide, so subtrees using them are
/// never constant.
pub fn fold_binary(op: BinaryOp, l: Value, r: Value) -> Option<Value> {
    use BinaryOp::*;
    Some(match op {
        Mul => l.wrapping_mul(r),
        Add => l.wrapping_add(r),
        Sub => l.wrapping_sub(r),
        Div => { if r == 0 { return None; } l.wrapping_div(r) }
        Mod => { if r == 0 { return None; } l.wrapping_rem(r) }
        Shl => checked_shl(l, r)?,
        Shr => ((l as u64) >> (r.clamp(0, 63) as u32)) as Value,
        AShr => l >> (r.clamp(0, 63) as u32),
        Lt => (l < r) as Value,
        Le => (l <= r) as Value,
        Gt => (l > r) as Value,
        Ge => (l >= r) as Value,
        Cmp => (l.cmp(&r) as i8) as Value,
        Eq => (l == r) as Value,
        Ne => (l != r) as Value,
        BitAnd => l & r,
        BitXor => l ^ r,
        BitOr => l | r,
        AndAnd => ((l != 0) && (r != 0)) as Value,
        OrOr => ((l != 0) || (r != 0)) as Value,
        Pow => checked_pow(l, r)?,
        Dot | Assign => return None,
    })
}

fn checked_shl(l: Value, r: Value) -> Option<Value> {
    if !(0..=63).contains(&r) {
        return None;
    }
    let wide = (l as i128) << r;
    if wide < i64::MIN as i128 || wide > i64::MAX as i128 {
        None
    } else {
        Some(wide as Value)
    }
}

fn checked_pow(l: Value, r: Value) -> Option<Value> {
    if !(0..=64).contains(&r) {
        return None;
    }
    let base = l as i128;
    let mut acc: i128 = 1;
    for _ in 0..r {
        acc = acc.checked_mul(base)?;
        if acc < i64::MIN as i128 || acc > i64::MAX as i128 {
            return None;
        }
    }
    Some(acc as Value)
}

/// Everything the evaluator needs to resolve an identifier or report a
/// recoverable error: the symbol table, the anonymous-label collection,
/// the diagnostics sink, the current logical program counter, the current
/// pass number (1-based), the active `local_label` scope for `_name`
/// lookups, and the `pass_needed` flag the pass driver consults.
pub struct EvalContext<'a> {
    pub symbols: &'a mut SymbolTable,
    pub anon: &'a AnonLabels,
    pub diags: &'a mut Diagnostics,
    pub pc: Value,
    pub pass: u32,
    pub local_label: Option<&'a str>,
    pub pass_needed: &'a mut bool,
}

/// Evaluates `expr`, recursing through non-constant subtrees. Constant
/// subtrees (see [`Expr::is_constant`]) return their cached value without
/// touching `ctx` at all.
pub fn eval(expr: &Expr, ctx: &mut EvalContext) -> Value {
    if expr.is_constant() {
        return expr.value();
    }
    let v = match &expr.kind {
        ExprKind::Literal(v) => *v,
        ExprKind::Ident => eval_ident(expr, ctx),
        ExprKind::Unary(op, inner) => eval_unary(*op, inner, ctx),
        ExprKind::Binary(op, l, r) => eval_binary(*op, &expr.token, l, r, ctx),
        ExprKind::Ternary(cond, then_, else_) => eval_ternary(cond, then_, else_, ctx),
        ExprKind::FcnCall(_) => {
            ctx.diags.error(DiagKind::UndefinedFunction, Some(expr.token.clone()));
            UNDEFINED
        }
    };
    expr.set_cached(v);
    v
}

fn eval_ident(expr: &Expr, ctx: &mut EvalContext) -> Value {
    match &expr.token.kind {
        TokenKind::Asterisk => ctx.pc,
        TokenKind::MultiPlus(n) => ctx.anon.forward_ref(*n),
        TokenKind::MultiHyphen(n) => ctx.anon.backward_ref(*n),
        TokenKind::Ident => lookup_named(expr.token.text(), &expr.token, ctx),
        _ => UNDEFINED,
    }
}

/// Identifier lookup order: direct symbol-table hit, then (for `_name`) the
/// scoped `<local_label>.<name>` form, then deferral on pass 1 or a hard
/// "undefined symbol" error afterward.
fn lookup_named(name: &str, token: &Token, ctx: &mut EvalContext) -> Value {
    if let Some(v) = ctx.symbols.lookup(name) {
        return v;
    }
    if name.starts_with('_') {
        if let Some(scope) = ctx.local_label {
            let scoped = format!("{}.{}", scope, name);
            if let Some(v) = ctx.symbols.lookup(&scoped) {
                return v;
            }
        }
    }
    if ctx.pass == 1 {
        tracing::trace!(symbol = %name, "forward reference, another pass needed");
        *ctx.pass_needed = true;
        UNDEFINED
    } else {
        ctx.diags.error(DiagKind::UndefinedSymbol(name.to_owned()), Some(token.clone()));
        UNDEFINED
    }
}

fn eval_unary(op: UnaryOp, inner: &Expr, ctx: &mut EvalContext) -> Value {
    let v = eval(inner, ctx);
    if !is_defined(v) {
        return UNDEFINED;
    }
    fold_unary(op, v).unwrap_or(UNDEFINED)
}

fn eval_binary(op: BinaryOp, token: &Token, lhs: &Expr, rhs: &Expr, ctx: &mut EvalContext) -> Value {
    match op {
        BinaryOp::Dot => eval_dot(token, lhs, rhs, ctx),
        BinaryOp::Assign => eval_assign(token, lhs, rhs, ctx),
        BinaryOp::AndAnd | BinaryOp::OrOr => eval_short_circuit(op, lhs, rhs, ctx),
        _ => {
            let l = eval(lhs, ctx);
            let r = eval(rhs, ctx);
            if !is_defined(l) || !is_defined(r) {
                return UNDEFINED;
            }
            match fold_binary(op, l, r) {
                Some(v) => v,
                None => {
                    let kind = match op {
                        BinaryOp::Div | BinaryOp::Mod => DiagKind::DivisionByZero,
                        BinaryOp::Shl | BinaryOp::Pow => DiagKind::ArithmeticOverflow,
                        _ => unreachable!("fold_binary only fails for division/shift/pow"),
                    };
                    if ctx.pass == 1 {
                        *ctx.pass_needed = true;
                    } else {
                        ctx.diags.error(kind, Some(token.clone()));
                    }
                    UNDEFINED
                }
            }
        }
    }
}

/// `a.b`: when both sides are bare identifiers, the dotted form is a single
/// scoped name, not arithmetic. Anything else falls through to `.` as a
/// generic binary operator, which has no numeric meaning and always yields
/// `UNDEFINED` (there is no dot-as-arithmetic case in this language).
fn eval_dot(token: &Token, lhs: &Expr, rhs: &Expr, ctx: &mut EvalContext) -> Value {
    if let (ExprKind::Ident, ExprKind::Ident) = (&lhs.kind, &rhs.kind) {
        if matches!(lhs.token.kind, TokenKind::Ident) && matches!(rhs.token.kind, TokenKind::Ident) {
            let dotted = format!("{}.{}", lhs.token.text(), rhs.token.text());
            return lookup_named(&dotted, token, ctx);
        }
    }
    UNDEFINED
}

fn eval_assign(token: &Token, lhs: &Expr, rhs: &Expr, ctx: &mut EvalContext) -> Value {
    let name = match (&lhs.kind, &lhs.token.kind) {
        (ExprKind::Ident, TokenKind::Ident) => lhs.token.text().to_owned(),
        _ => {
            ctx.diags.error(DiagKind::IllegalLvalue, Some(lhs.token.clone()));
            return UNDEFINED;
        }
    };
    let v = eval(rhs, ctx);
    if !is_defined(v) {
        return UNDEFINED;
    }
    if ctx.pass == 1 {
        if !ctx.symbols.define(&name, v) {
            ctx.diags.error(DiagKind::DuplicateLabel(name), Some(token.clone()));
        }
    } else if ctx.symbols.update(&name, v) {
        *ctx.pass_needed = true;
    }
    v
}

fn eval_short_circuit(op: BinaryOp, lhs: &Expr, rhs: &Expr, ctx: &mut EvalContext) -> Value {
    let l = eval(lhs, ctx);
    if !is_defined(l) {
        return UNDEFINED;
    }
    warn_if_not_boolean(l, op, &lhs.token, ctx);
    match op {
        BinaryOp::AndAnd if l == 0 => return 0,
        BinaryOp::OrOr if l != 0 => return 1,
        _ => {}
    }
    let r = eval(rhs, ctx);
    if !is_defined(r) {
        return UNDEFINED;
    }
    warn_if_not_boolean(r, op, &rhs.token, ctx);
    (r != 0) as Value
}

fn warn_if_not_boolean(v: Value, op: BinaryOp, token: &Token, ctx: &mut EvalContext) {
    if v != 0 && v != 1 {
        let (found, suggest) = if op == BinaryOp::AndAnd { ("&&", "&") } else { ("||", "|") };
        ctx.diags.warning(
            DiagKind::LogicalOperandNotBoolean(found.to_owned(), suggest.to_owned()),
            Some(token.clone()),
        );
    }
}

fn eval_ternary(cond: &Expr, then_: &Expr, else_: &Expr, ctx: &mut EvalContext) -> Value {
    let c = eval(cond, ctx);
    if !is_defined(c) {
        return UNDEFINED;
    }
    if c != 0 {
        eval(then_, ctx)
    } else {
        eval(else_, ctx)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::source::SourceFile;
    use std::rc::Rc;

    fn tok(kind: TokenKind) -> Token {
        let file = Rc::new(SourceFile::new("t", "x\n"));
        Token::new(kind, file, 1, 1, 0, 1)
    }

    fn ctx<'a>(
        symbols: &'a mut SymbolTable,
        anon: &'a AnonLabels,
        diags: &'a mut Diagnostics,
        pass: u32,
        pass_needed: &'a mut bool,
    ) -> EvalContext<'a> {
        EvalContext { symbols, anon, diags, pc: 0x1000, pass, local_label: None, pass_needed }
    }

    #[test]
    fn fold_binary_overflow_and_div_zero() {
        assert_eq!(fold_binary(BinaryOp::Div, 4, 0), None);
        assert_eq!(fold_binary(BinaryOp::Shl, 1, 100), None);
        assert_eq!(fold_binary(BinaryOp::Add, 2, 3), Some(5));
    }

    #[test]
    fn pc_reference_resolves_to_current_address() {
        let mut symbols = SymbolTable::new(false);
        let anon = AnonLabels::new();
        let mut diags = Diagnostics::new();
        let mut pass_needed = false;
        let mut c = ctx(&mut symbols, &anon, &mut diags, 1, &mut pass_needed);
        let e = Expr::ident(tok(TokenKind::Asterisk));
        assert_eq!(eval(&e, &mut c), 0x1000);
    }

    #[test]
    fn undefined_symbol_defers_on_pass_one_then_errors() {
        let mut symbols = SymbolTable::new(false);
        let anon = AnonLabels::new();
        let mut diags = Diagnostics::new();
        let mut pass_needed = false;
        {
            let mut c = ctx(&mut symbols, &anon, &mut diags, 1, &mut pass_needed);
            let t = Token::new(TokenKind::Ident, Rc::new(SourceFile::new("t", "foo\n")), 1, 1, 0, 3);
            let e = Expr::ident(t);
            assert_eq!(eval(&e, &mut c), UNDEFINED);
        }
        assert!(pass_needed);
        assert!(!diags.has_errors());

        let mut pass_needed2 = false;
        let mut c2 = ctx(&mut symbols, &anon, &mut diags, 2, &mut pass_needed2);
        let t = Token::new(TokenKind::Ident, Rc::new(SourceFile::new("t", "foo\n")), 1, 1, 0, 3);
        let e = Expr::ident(t);
        assert_eq!(eval(&e, &mut c2), UNDEFINED);
        assert!(diags.has_errors());
    }

    #[test]
    fn short_circuit_and_skips_rhs_when_lhs_false() {
        let mut symbols = SymbolTable::new(false);
        let anon = AnonLabels::new();
        let mut diags = Diagnostics::new();
        let mut pass_needed = false;
        let mut c = ctx(&mut symbols, &anon, &mut diags, 2, &mut pass_needed);
        let l = Expr::literal(tok(TokenKind::DecLiteral), 0);
        let r = Expr::ident(Token::new(TokenKind::Ident, Rc::new(SourceFile::new("t", "undef\n")), 1, 1, 0, 5));
        let e = Expr::binary(BinaryOp::AndAnd, tok(TokenKind::DoubleAmpersand), l, r, fold_binary);
        assert_eq!(eval(&e, &mut c), 0);
        assert!(!diags.has_errors()); // rhs never evaluated, so no undefined-symbol error
    }

    #[test]
    fn division_by_zero_is_deferred_then_reported() {
        let mut symbols = SymbolTable::new(false);
        let anon = AnonLabels::new();
        let mut diags = Diagnostics::new();
        let mut pass_needed = false;
        let l = Expr::literal(tok(TokenKind::DecLiteral), 10);
        let r = Expr::ident(Token::new(TokenKind::Ident, Rc::new(SourceFile::new("t", "z\n")), 1, 1, 0, 1));
        let e = Expr::binary(BinaryOp::Div, tok(TokenKind::Solidus), l, r, fold_binary);
        symbols.define("z", 0);
        {
            let mut c = ctx(&mut symbols, &anon, &mut diags, 2, &mut pass_needed);
            assert_eq!(eval(&e, &mut c), UNDEFINED);
        }
        assert!(diags.has_errors());
    }
}
