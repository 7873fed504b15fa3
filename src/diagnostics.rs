//! The diagnostics accumulator (`Messages` in the ColdFire-targeting
//! ancestor of this module). Recoverable errors and warnings accumulate here
//! across the whole run; fatal errors propagate immediately as `Err`.

use std::fmt;

use crate::token::Token;

const MAX_DIAGNOSTICS: usize = 1000;

#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Debug)]
pub enum Severity {
    Warning,
    Error,
    Fatal,
}

/// The full taxonomy of §7: every recoverable or fatal condition the
/// assembler can report, grouped the way the design doc groups them.
#[derive(thiserror::Error, Clone, Debug)]
pub enum DiagKind {
    // Lex errors
    #[error("unterminated string literal")]
    UnterminatedString,
    #[error("unterminated character literal")]
    UnterminatedChar,
    #[error("bad escape sequence")]
    BadEscape,
    #[error("unrecognized character '{0}'")]
    UnrecognizedChar(char),
    #[error("illegal quantity: numeric literal out of range")]
    IllegalLiteralRange,

    // Parse errors
    #[error("unexpected {found}, expected {expected}")]
    UnexpectedToken { found: String, expected: String },
    #[error("missing operand")]
    MissingOperand,
    #[error("macro '{0}' is already defined")]
    MacroRedefinition(String),
    #[error(".macro definitions must not nest")]
    NestedMacro,
    #[error("recursive inclusion of '{0}'")]
    RecursiveInclude(String),
    #[error("no argument matches '\\{0}'")]
    NoSuchMacroArgument(String),
    #[error("required parameter {0} missing")]
    MissingMacroParameter(u32),
    #[error("a zero-argument macro was called with arguments")]
    MacroArgumentCountMismatch,
    #[error(".endmacro expected before end of file")]
    UnterminatedMacro,

    // Semantic errors
    #[error("symbol '{0}' is not defined")]
    UndefinedSymbol(String),
    #[error("'{0}' is already defined")]
    DuplicateLabel(String),
    #[error("illegal lvalue in assignment")]
    IllegalLvalue,
    #[error("undefined function")]
    UndefinedFunction,

    // Range errors
    #[error("illegal quantity: value does not fit in the expected width")]
    IllegalQuantity,
    #[error("relative branch too far")]
    BranchOutOfRange,
    #[error("arithmetic overflow")]
    ArithmeticOverflow,
    #[error("division by zero")]
    DivisionByZero,
    #[error("operand of '{0}' is not 0 or 1; did you mean '{1}'?")]
    LogicalOperandNotBoolean(String, String),

    // Encoder errors
    #[error("addressing mode not supported by '{0}'")]
    ModeNotSupported(String),
    #[error("mnemonic '{0}' is not available on the selected CPU")]
    MnemonicUnavailable(String),
    #[error("directive '{0}' is not valid on the selected CPU")]
    DirectiveUnavailable(String),
    #[error("program counter overflow")]
    PcOverflow,

    // I/O errors
    #[error("file not found: {0}")]
    FileNotFound(String),
    #[error("failed to write output: {0}")]
    OutputWriteFailed(String),

    // Convergence
    #[error("too many passes required for convergence")]
    TooManyPasses,

    // Accumulator overflow
    #[error("too many errors")]
    TooManyErrors,
}

#[derive(Clone, Debug)]
pub struct Diagnostic {
    pub severity: Severity,
    pub kind: DiagKind,
    /// Chain of tokens from innermost (the offending token) outward through
    /// macro-expansion and include provenance, used to render preamble
    /// lines before the final caret.
    pub token: Option<Token>,
}

impl Diagnostic {
    pub fn new(severity: Severity, kind: DiagKind, token: Option<Token>) -> Self {
        Diagnostic { severity, kind, token }
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let label = match self.severity {
            Severity::Warning => "warning",
            Severity::Error => "error",
            Severity::Fatal => "fatal error",
        };
        if let Some(tok) = &self.token {
            render_provenance(f, tok)?;
            writeln!(f, "{}:{}:{}: {}: {}", tok.file, tok.line, tok.column, label, self.kind)?;
            render_caret(f, tok)?;
        } else {
            writeln!(f, "{}: {}", label, self.kind)?;
        }
        Ok(())
    }
}

fn render_provenance(f: &mut fmt::Formatter, tok: &Token) -> fmt::Result {
    if let Some(def) = &tok.expanded_from_macro {
        writeln!(f, "{}:{}:{}: in expansion of macro defined here:", def.file, def.line, def.column)?;
    }
    if let Some(site) = &tok.included_from {
        writeln!(f, "{}:{}: included from here:", site.file, site.line)?;
    }
    Ok(())
}

fn render_caret(f: &mut fmt::Formatter, tok: &Token) -> fmt::Result {
    let line = tok.file.line(tok.line);
    writeln!(f, "{}", line)?;
    let col = tok.column.saturating_sub(1) as usize;
    writeln!(f, "{}^", " ".repeat(col))
}

pub mod color {
    pub const RED: &str = "\x1b[31m";
    pub const MAGENTA: &str = "\x1b[35m";
    pub const GREEN: &str = "\x1b[32m";
    pub const RESET: &str = "\x1b[0m";
}

/// Accumulates diagnostics for the whole run. Mirrors the teacher's
/// `Messages` type: error count is tracked separately from warning count so
/// the driver can ask "did anything go wrong" without scanning the list.
#[derive(Default)]
pub struct Diagnostics {
    entries: Vec<Diagnostic>,
    error_count: usize,
    warning_count: usize,
    capped: bool,
}

impl Diagnostics {
    pub fn new() -> Self {
        Diagnostics::default()
    }

    pub fn push(&mut self, d: Diagnostic) {
        if self.entries.len() >= MAX_DIAGNOSTICS {
            if !self.capped {
                self.capped = true;
                self.entries.push(Diagnostic::new(Severity::Fatal, DiagKind::TooManyErrors, None));
                self.error_count += 1;
            }
            return;
        }
        match d.severity {
            Severity::Warning => self.warning_count += 1,
            Severity::Error | Severity::Fatal => self.error_count += 1,
        }
        self.entries.push(d);
    }

    pub fn error(&mut self, kind: DiagKind, token: Option<Token>) {
        self.push(Diagnostic::new(Severity::Error, kind, token));
    }

    pub fn warning(&mut self, kind: DiagKind, token: Option<Token>) {
        self.push(Diagnostic::new(Severity::Warning, kind, token));
    }

    pub fn fatal(&mut self, kind: DiagKind, token: Option<Token>) {
        self.push(Diagnostic::new(Severity::Fatal, kind, token));
    }

    pub fn has_errors(&self) -> bool {
        self.error_count > 0
    }

    pub fn has_fatal(&self) -> bool {
        self.entries.iter().any(|d| d.severity == Severity::Fatal)
    }

    pub fn error_count(&self) -> usize {
        self.error_count
    }

    pub fn warning_count(&self) -> usize {
        self.warning_count
    }

    pub fn entries(&self) -> &[Diagnostic] {
        &self.entries
    }

    /// Renders every diagnostic to a string, colorized as §6 specifies (red
    /// error, magenta warning, green caret).
    pub fn render_colored(&self) -> String {
        use color::*;
        let mut out = String::new();
        for d in &self.entries {
            let tint = match d.severity {
                Severity::Warning => MAGENTA,
                Severity::Error | Severity::Fatal => RED,
            };
            let text = d.to_string();
            for (i, line) in text.lines().enumerate() {
                if i == 0 {
                    out.push_str(tint);
                    out.push_str(line);
                    out.push_str(RESET);
                    out.push('\n');
                } else if line.trim_start().starts_with('^') {
                    out.push_str(GREEN);
                    out.push_str(line);
                    out.push_str(RESET);
                    out.push('\n');
                } else {
                    out.push_str(line);
                    out.push('\n');
                }
            }
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn caps_at_max_diagnostics() {
        let mut diags = Diagnostics::new();
        for _ in 0..(MAX_DIAGNOSTICS + 5) {
            diags.error(DiagKind::DivisionByZero, None);
        }
        assert_eq!(diags.entries().len(), MAX_DIAGNOSTICS + 1);
        assert!(diags.has_fatal());
    }

    #[test]
    fn warnings_dont_count_as_errors() {
        let mut diags = Diagnostics::new();
        diags.warning(DiagKind::DivisionByZero, None);
        assert!(!diags.has_errors());
        assert_eq!(diags.warning_count(), 1);
    }
}
