//! The expression AST and the operand forms built on top of it. Every node
//! carries a cached value cell; pure-constant subtrees (no identifier or
//! function-call anywhere beneath them) fold once at construction time
//! instead of re-evaluating every pass.

use std::cell::Cell;

use crate::token::Token;
use crate::value::{Value, UNDEFINED};

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum UnaryOp {
    Neg,
    Not,
    BitNot,
    LowByte,   // <x
    HighByte,  // >x
    LowWord,   // &x
    BankByte,  // default extractor: (x >> 16) & 0xff
}

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum BinaryOp {
    Mul, Div, Mod,
    Add, Sub,
    Shl, Shr, AShr,
    Lt, Le, Gt, Ge, Cmp,
    Eq, Ne,
    BitAnd, BitXor, BitOr,
    AndAnd, OrOr,
    Pow, // `^^`
    Dot, // scoped-identifier / general binary dot
    Assign,
}

/// A parsed expression node. `cached` holds a folded value for subtrees that
/// are provably constant (see [`is_constant`](Expr::is_constant)); it holds
/// `UNDEFINED` for everything else, including a subtree whose fold attempt
/// hit a recoverable error (division by zero, overflow) — those errors are
/// re-raised when the evaluator actually visits the node.
#[derive(Clone, Debug)]
pub struct Expr {
    pub kind: ExprKind,
    pub token: Token,
    cached: Cell<Value>,
    constant: bool,
}

#[derive(Clone, Debug)]
pub enum ExprKind {
    Literal(Value),
    Ident,
    Unary(UnaryOp, Box<Expr>),
    Binary(BinaryOp, Box<Expr>, Box<Expr>),
    Ternary(Box<Expr>, Box<Expr>, Box<Expr>),
    FcnCall(Vec<Expr>),
}

impl Expr {
    pub fn literal(token: Token, value: Value) -> Self {
        Expr { kind: ExprKind::Literal(value), token, cached: Cell::new(value), constant: true }
    }

    pub fn ident(token: Token) -> Self {
        Expr { kind: ExprKind::Ident, token, cached: Cell::new(UNDEFINED), constant: false }
    }

    pub fn unary(op: UnaryOp, token: Token, expr: Expr, fold: impl FnOnce(UnaryOp, Value) -> Option<Value>) -> Self {
        let constant = expr.constant;
        let cached = if constant {
            fold(op, expr.value()).unwrap_or(UNDEFINED)
        } else {
            UNDEFINED
        };
        Expr {
            kind: ExprKind::Unary(op, Box::new(expr)),
            token,
            cached: Cell::new(cached),
            constant: constant && cached != UNDEFINED,
        }
    }

    pub fn binary(
        op: BinaryOp,
        token: Token,
        lhs: Expr,
        rhs: Expr,
        fold: impl FnOnce(BinaryOp, Value, Value) -> Option<Value>,
    ) -> Self {
        let constant = lhs.constant && rhs.constant;
        let cached = if constant {
            fold(op, lhs.value(), rhs.value()).unwrap_or(UNDEFINED)
        } else {
            UNDEFINED
        };
        Expr {
            kind: ExprKind::Binary(op, Box::new(lhs), Box::new(rhs)),
            token,
            cached: Cell::new(cached),
            constant: constant && cached != UNDEFINED,
        }
    }

    pub fn ternary(token: Token, cond: Expr, then: Expr, else_: Expr) -> Self {
        Expr {
            kind: ExprKind::Ternary(Box::new(cond), Box::new(then), Box::new(else_)),
            token,
            cached: Cell::new(UNDEFINED),
            constant: false,
        }
    }

    pub fn fcn_call(token: Token, params: Vec<Expr>) -> Self {
        Expr { kind: ExprKind::FcnCall(params), token, cached: Cell::new(UNDEFINED), constant: false }
    }

    #[inline]
    pub fn is_constant(&self) -> bool {
        self.constant
    }

    /// The folded value, if this subtree is constant. `UNDEFINED` otherwise.
    #[inline]
    pub fn value(&self) -> Value {
        self.cached.get()
    }

    pub fn set_cached(&self, v: Value) {
        self.cached.set(v);
    }
}

/// An optional bit-width modifier prefixing a value expression: `[8]`,
/// `[16]`, or `[24]`.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum WidthModifier {
    None,
    W8,
    W16,
    W24,
}

impl WidthModifier {
    pub fn bytes(self) -> Option<u8> {
        match self {
            WidthModifier::None => None,
            WidthModifier::W8 => Some(1),
            WidthModifier::W16 => Some(2),
            WidthModifier::W24 => Some(3),
        }
    }
}

/// One item in a pseudo-op's comma-separated expression list: a real
/// expression, a bare `?` placeholder ("skip / undefined for this
/// position", used by `.fill`/`.binary`), or a raw string literal token
/// (the filename argument of `.binary`, the text argument of `.string` and
/// kin — these aren't numeric expressions, so they ride in the same list
/// rather than needing a second operand shape).
#[derive(Clone, Debug)]
pub enum ListItem {
    Expr(Expr),
    Str(Token),
    Query,
}

/// The closed set of operand forms. Each instruction/directive statement
/// owns at most one of these.
#[derive(Clone, Debug)]
pub enum Operand {
    Immediate { expr: Expr, width: WidthModifier },
    Accumulator,
    ZpAbsolute { expr: Expr, width: WidthModifier },
    IndexX { expr: Expr, width: WidthModifier },
    IndexY { expr: Expr, width: WidthModifier },
    IndexS { expr: Expr, width: WidthModifier },
    IndirectX { expr: Expr },
    IndirectY { expr: Expr },
    IndirectS { expr: Expr },
    Indirect { expr: Expr },
    Direct { expr: Expr },
    DirectY { expr: Expr },
    TwoOperands { src: Expr, dst: Expr },
    BitZp { bit: u8, zp: Expr },
    BitOffsZp { bit: u8, zp: Expr, target: Expr },
    ExpressionList(Vec<ListItem>),
}

/// A parsed label, distinguishing the three forms that `label` can take in
/// the grammar (`IDENT | MULTIPLUS | MULTIHYPHEN | ASTERISK`). `Asterisk`
/// never actually labels a statement — it's rolled into `Instruction::PcAssign`
/// instead, so this variant is unused by the parser but kept so `Label`
/// mirrors the grammar rule exactly.
#[derive(Clone, Debug)]
pub enum Label {
    Ident(Token),
    Anon { token: Token, plus: bool },
}

/// The instruction half of a statement.
#[derive(Clone, Debug)]
pub enum Instruction {
    Mnemonic(Token, crate::mnemonic::Mnemonic, Option<Operand>),
    Directive(Token, crate::directive::Directive, Option<Operand>),
    MacroCall(Token, Vec<Vec<Token>>),
    Assign(Token, Expr),
    PcAssign(Token, Expr),
}

/// One parsed line. `index` is this statement's position in assignment
/// order and doubles as the key into [`crate::anon::AnonLabels`]'s slot
/// table when `label` is `Label::Anon`.
#[derive(Clone, Debug)]
pub struct Statement {
    pub label: Option<Label>,
    pub instruction: Option<Instruction>,
    pub index: usize,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::source::SourceFile;
    use crate::token::TokenKind;
    use std::rc::Rc;

    fn tok() -> Token {
        let file = Rc::new(SourceFile::new("t", "x\n"));
        Token::new(TokenKind::Ident, file, 1, 1, 0, 1)
    }

    fn fold_unary(op: UnaryOp, v: Value) -> Option<Value> {
        Some(match op {
            UnaryOp::Neg => -v,
            UnaryOp::Not => (v == 0) as Value,
            UnaryOp::BitNot => !v,
            UnaryOp::LowByte => v & 0xff,
            UnaryOp::HighByte => (v >> 8) & 0xff,
            UnaryOp::LowWord => v & 0xffff,
            UnaryOp::BankByte => (v >> 16) & 0xff,
        })
    }

    fn fold_binary(op: BinaryOp, l: Value, r: Value) -> Option<Value> {
        Some(match op {
            BinaryOp::Add => l + r,
            BinaryOp::Mul => l * r,
            _ => return None,
        })
    }

    #[test]
    fn literal_is_constant() {
        let e = Expr::literal(tok(), 42);
        assert!(e.is_constant());
        assert_eq!(e.value(), 42);
    }

    #[test]
    fn pure_binary_folds_at_construction() {
        let l = Expr::literal(tok(), 2);
        let r = Expr::literal(tok(), 3);
        let e = Expr::binary(BinaryOp::Add, tok(), l, r, fold_binary);
        assert!(e.is_constant());
        assert_eq!(e.value(), 5);
    }

    #[test]
    fn ident_is_never_constant() {
        let e = Expr::ident(tok());
        assert!(!e.is_constant());
        assert_eq!(e.value(), UNDEFINED);
    }

    #[test]
    fn mixed_binary_is_not_constant() {
        let l = Expr::ident(tok());
        let r = Expr::literal(tok(), 3);
        let e = Expr::binary(BinaryOp::Add, tok(), l, r, fold_binary);
        assert!(!e.is_constant());
    }

    #[test]
    fn unary_folds_through_constant_child() {
        let inner = Expr::literal(tok(), 5);
        let e = Expr::unary(UnaryOp::Neg, tok(), inner, fold_unary);
        assert!(e.is_constant());
        assert_eq!(e.value(), -5);
    }
}
