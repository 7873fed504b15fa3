//! A defined `.macro`: its parameter map and raw body tokens, plus the
//! expansion algorithm that rewrites a call site into a fresh token vector
//! for the parser to splice in.
//!
//! Expansion walks the saved body tokens directly rather than
//! reconstructing and re-lexing source text: each body token was already
//! lexed correctly once, against the same reserved-word table the rest of
//! the file uses, so a nested call to a macro defined earlier in the file
//! already carries `TokenKind::MacroName` and needs no reclassification.
//! Substitution markers are replaced by the matching call-site argument's
//! own (already-lexed) tokens. Every emitted token is stamped with
//! `expanded_from_macro` pointing at the macro's `.macro` definition site,
//! which is what `diagnostics::render_provenance` reports.

use std::collections::HashMap;
use std::rc::Rc;

use crate::diagnostics::{DiagKind, Diagnostics};
use crate::strtab::normalize;
use crate::token::{Token, TokenKind};

pub struct Macro {
    pub name: Rc<str>,
    def_token: Token,
    params: HashMap<String, u32>,
    body: Vec<Token>,
    case_sensitive: bool,
}

impl Macro {
    pub fn new(name: Rc<str>, def_token: Token, params: Vec<String>, body: Vec<Token>, case_sensitive: bool) -> Self {
        let mut map = HashMap::new();
        for (i, p) in params.iter().enumerate() {
            map.insert(normalize(p, case_sensitive), (i + 1) as u32);
        }
        Macro { name, def_token, params: map, body, case_sensitive }
    }

    pub fn param_index(&self, name: &str) -> Option<u32> {
        self.params.get(&normalize(name, self.case_sensitive)).copied()
    }

    pub fn is_zero_arg(&self) -> bool {
        self.params.is_empty()
    }
}

/// Rewrites `mac`'s body against `args` (each an ordered token list for one
/// call-site argument) and returns the flat token vector to splice into the
/// parser's buffer at the call site, terminated by a synthetic `NEWLINE`.
pub fn expand(
    mac: &Macro,
    call_site: &Token,
    args: &[Vec<Token>],
    label: Option<&Token>,
    diags: &mut Diagnostics,
) -> Vec<Token> {
    let _span = tracing::info_span!("macro", name = %mac.name).entered();
    if mac.is_zero_arg() && !args.is_empty() {
        diags.error(DiagKind::MacroArgumentCountMismatch, Some(call_site.clone()));
    }

    let mut out = Vec::with_capacity(mac.body.len() + 1);

    if let Some(l) = label {
        out.push(stamp(l.clone(), mac));
    }

    for t in &mac.body {
        match &t.kind {
            TokenKind::MacroSubstitution => {
                let name = &t.text()[1..];
                match mac.param_index(name) {
                    Some(idx) if args.get((idx - 1) as usize).is_some() => {
                        splice_arg(&mut out, mac, args, idx);
                    }
                    Some(idx) => diags.error(DiagKind::MissingMacroParameter(idx), Some(t.clone())),
                    None => diags.error(DiagKind::NoSuchMacroArgument(name.to_owned()), Some(t.clone())),
                }
            }
            TokenKind::NumberedSubstitution(n) if *n >= 1 && args.get((*n - 1) as usize).is_some() => {
                splice_arg(&mut out, mac, args, *n);
            }
            TokenKind::NumberedSubstitution(n) => {
                diags.error(DiagKind::MissingMacroParameter(*n), Some(t.clone()));
            }
            _ => out.push(stamp(t.clone(), mac)),
        }
    }

    out.push(Token::synthetic(TokenKind::Newline, call_site));
    out
}

fn splice_arg(out: &mut Vec<Token>, mac: &Macro, args: &[Vec<Token>], idx: u32) {
    if let Some(arg_tokens) = args.get((idx - 1) as usize) {
        for at in arg_tokens {
            out.push(stamp(at.clone(), mac));
        }
    }
}

fn stamp(mut t: Token, mac: &Macro) -> Token {
    t.expanded_from_macro = Some(Box::new(mac.def_token.clone()));
    t
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lexer::Lexer;
    use crate::mnemonic::Mnemonic;
    use crate::source::SourceFile;

    fn tokens(text: &str) -> Vec<Token> {
        let file = Rc::new(SourceFile::new("body", text));
        let mut lexer = Lexer::new(file, false);
        let mut out = Vec::new();
        loop {
            let t = lexer.next_token();
            if t.kind == TokenKind::Eof {
                break;
            }
            out.push(t);
        }
        out
    }

    fn split_args(text: &str) -> Vec<Vec<Token>> {
        let toks = tokens(text);
        toks.iter()
            .filter(|t| t.kind != TokenKind::Newline)
            .map(|t| vec![t.clone()])
            .collect()
    }

    #[test]
    fn substitutes_named_and_numbered_params() {
        let body = tokens("lda \\val\nsta \\1\n");
        let def_tok = tokens("dummy\n").remove(0);
        let mac = Macro::new(Rc::from(".setbyte"), def_tok, vec!["val".to_owned()], body, false);
        let call_site = tokens("dummy\n").remove(0);
        let mut diags = Diagnostics::new();
        let args = split_args("$42\n");
        let toks = expand(&mac, &call_site, &args, None, &mut diags);
        assert!(!diags.has_errors());
        let kinds: Vec<_> = toks.iter().map(|t| t.kind.clone()).collect();
        assert_eq!(kinds, vec![
            TokenKind::Mnemonic(Mnemonic::LDA), TokenKind::HexLiteral, TokenKind::Newline,
            TokenKind::Mnemonic(Mnemonic::STA), TokenKind::HexLiteral, TokenKind::Newline,
            TokenKind::Newline,
        ]);
        assert!(toks[0].expanded_from_macro.is_some());
    }

    #[test]
    fn missing_argument_is_reported() {
        let body = tokens("lda \\1\n");
        let def_tok = tokens("dummy\n").remove(0);
        let mac = Macro::new(Rc::from(".m"), def_tok, vec![], body, false);
        let call_site = tokens("dummy\n").remove(0);
        let mut diags = Diagnostics::new();
        expand(&mac, &call_site, &[], None, &mut diags);
        assert!(diags.has_errors());
    }

    #[test]
    fn nested_macro_name_token_survives_expansion() {
        // A body token lexed after ".inner" was registered already carries
        // TokenKind::MacroName; expansion must pass it through unchanged
        // rather than reclassifying it from scratch.
        let file = Rc::new(SourceFile::new("t", ".inner\n"));
        let mut lexer = Lexer::new(file, false);
        lexer.define_macro_name(Rc::from(".inner"));
        let body_tok = lexer.next_token();
        assert_eq!(body_tok.kind, TokenKind::MacroName(Rc::from(".inner")));

        let def_tok = tokens("outer\n").remove(0);
        let mac = Macro::new(Rc::from(".outer"), def_tok, vec![], vec![body_tok], false);
        let call_site = tokens("dummy\n").remove(0);
        let mut diags = Diagnostics::new();
        let out = expand(&mac, &call_site, &[], None, &mut diags);
        assert_eq!(out[0].kind, TokenKind::MacroName(Rc::from(".inner")));
    }
}
