//! Character stream to token stream. Owns the include stack (one frame per
//! active `.include`) and the reserved-word table shared with the parser for
//! macro-name promotion.

use std::rc::Rc;
use strum::IntoEnumIterator;

use crate::directive::Directive;
use crate::mnemonic::Mnemonic;
use crate::source::SourceFile;
use crate::strtab::StrTable;
use crate::token::{IncludeSite, Register, Token, TokenKind};

/// What an identifier-shaped run of text promotes to, once looked up in the
/// reserved-word table.
#[derive(Clone, Debug)]
enum Reserved {
    Mnemonic(Mnemonic),
    Directive(Directive),
    Register(Register),
    MacroName(Rc<str>),
}

struct Frame {
    file: Rc<SourceFile>,
    line: u32,
    byte: usize,
    include_site: Option<IncludeSite>,
}

pub struct Lexer {
    stack: Vec<Frame>,
    reserved: StrTable<Reserved>,
    last: Option<TokenKind>,
}

impl Lexer {
    pub fn new(file: Rc<SourceFile>, case_sensitive: bool) -> Self {
        let mut reserved = StrTable::new(case_sensitive);
        seed_reserved(&mut reserved);
        Lexer {
            stack: vec![Frame { file, line: 1, byte: 0, include_site: None }],
            reserved,
            last: None,
        }
    }

    pub fn case_sensitive(&self) -> bool {
        self.reserved.case_sensitive()
    }

    /// Adds a finalized macro name (leading-dot spelling) to the
    /// reserved-word table, so later occurrences lex as `MacroName`.
    pub fn define_macro_name(&mut self, name: Rc<str>) {
        self.reserved.insert(&name, Reserved::MacroName(name.clone()));
    }

    pub fn is_macro_name(&self, name: &str) -> bool {
        matches!(self.reserved.get(name), Some(Reserved::MacroName(_)))
    }

    /// `true` if `name` is already on the include stack (a `.include` cycle).
    pub fn currently_lexing(&self, name: &str) -> bool {
        self.stack.iter().any(|f| f.file.name() == name)
    }

    /// Pushes `file` as a new frame; lexing resumes there until its EOF, then
    /// continues one past the `.include` site.
    pub fn include(&mut self, file: Rc<SourceFile>, from_line: u32) {
        let from_file = self.stack.last().unwrap().file.clone();
        self.stack.push(Frame {
            file,
            line: 1,
            byte: 0,
            include_site: Some(IncludeSite { file: from_file, line: from_line }),
        });
    }

    /// Drives lexing until the frame pushed by `include` is exhausted and the
    /// caller's frame is current again, collecting every token produced.
    pub fn include_and_process(&mut self, file: Rc<SourceFile>, from_line: u32) -> Vec<Token> {
        let target_depth = self.stack.len();
        self.include(file, from_line);
        let mut tokens = Vec::new();
        loop {
            let tok = self.next_token();
            if self.stack.len() < target_depth {
                break;
            }
            tokens.push(tok);
        }
        tokens
    }

    fn frame(&self) -> &Frame {
        self.stack.last().expect("lexer stack is never empty")
    }

    fn frame_mut(&mut self) -> &mut Frame {
        self.stack.last_mut().expect("lexer stack is never empty")
    }

    fn current_line(&self) -> &str {
        let f = self.frame();
        f.file.line(f.line)
    }

    fn peek_byte(&self) -> Option<u8> {
        self.current_line().as_bytes().get(self.frame().byte).copied()
    }

    fn peek_byte_at(&self, ahead: usize) -> Option<u8> {
        self.current_line().as_bytes().get(self.frame().byte + ahead).copied()
    }

    fn advance(&mut self) {
        self.frame_mut().byte += 1;
    }

    /// Advances past one full (possibly multi-byte) UTF-8 character.
    fn advance_char(&mut self) {
        let line = self.current_line();
        let byte = self.frame().byte;
        let len = line[byte..].chars().next().map(char::len_utf8).unwrap_or(1);
        self.frame_mut().byte += len;
    }

    fn at_line_end(&self) -> bool {
        self.frame().byte >= self.current_line().len()
    }

    fn column(&self) -> u32 {
        self.frame().byte as u32 + 1
    }

    fn make_token(&self, kind: TokenKind, start: usize, start_col: u32) -> Token {
        let f = self.frame();
        let mut tok = Token::new(kind, f.file.clone(), f.line, start_col, start, f.byte);
        tok.included_from = f.include_site.clone();
        tok
    }

    /// Returns the next token, `EOF` when the root file ends.
    pub fn next_token(&mut self) -> Token {
        let tok = self.scan();
        self.last = Some(tok.kind.clone());
        tok
    }

    fn scan(&mut self) -> Token {
        loop {
            self.skip_space_and_comments();
            if self.at_line_end() {
                let line_count = self.frame().file.line_count() as u32;
                if self.frame().line <= line_count {
                    let start = self.frame().byte;
                    let col = self.column();
                    let tok = self.make_token(TokenKind::Newline, start, col);
                    self.frame_mut().line += 1;
                    self.frame_mut().byte = 0;
                    return tok;
                }
                if self.stack.len() > 1 {
                    self.stack.pop();
                    continue;
                }
                let start = self.frame().byte;
                let col = self.column();
                return self.make_token(TokenKind::Eof, start, col);
            }
            return self.scan_token();
        }
    }

    fn skip_space_and_comments(&mut self) {
        loop {
            match self.peek_byte() {
                Some(b' ') | Some(b'\t') => self.advance(),
                Some(b';') => self.frame_mut().byte = self.current_line().len(),
                Some(b'/') if self.peek_byte_at(1) == Some(b'/') => {
                    self.frame_mut().byte = self.current_line().len();
                }
                Some(b'/') if self.peek_byte_at(1) == Some(b'*') => {
                    self.advance();
                    self.advance();
                    self.skip_block_comment();
                }
                _ => return,
            }
        }
    }

    fn skip_block_comment(&mut self) {
        loop {
            if self.peek_byte() == Some(b'*') && self.peek_byte_at(1) == Some(b'/') {
                self.advance();
                self.advance();
                return;
            }
            if self.at_line_end() {
                if self.frame().line as usize >= self.frame().file.line_count() {
                    return; // unterminated block comment at EOF; nothing more to skip
                }
                self.frame_mut().line += 1;
                self.frame_mut().byte = 0;
                continue;
            }
            self.advance();
        }
    }

    fn scan_token(&mut self) -> Token {
        let start = self.frame().byte;
        let col = self.column();
        let b = self.peek_byte().expect("not at line end");
        use TokenKind::*;
        match b {
            b'+' => self.lex_anon(b'+', start, col),
            b'-' => self.lex_anon(b'-', start, col),
            b'$' => self.lex_hex(start, col),
            b'%' => self.lex_percent(start, col),
            b'0'..=b'9' => self.lex_decimal(start, col),
            b'"' => self.lex_string(start, col),
            b'\'' => self.lex_char(start, col),
            b'.' => self.lex_dot(start, col),
            b'\\' => self.lex_backslash(start, col),
            b'<' => self.lex_langle(start, col),
            b'>' => self.lex_rangle(start, col),
            b':' => { self.advance(); self.make_token(Colon, start, col) }
            b',' => { self.advance(); self.make_token(Comma, start, col) }
            b'(' => { self.advance(); self.make_token(LParen, start, col) }
            b')' => { self.advance(); self.make_token(RParen, start, col) }
            b'[' => { self.advance(); self.make_token(LSquare, start, col) }
            b']' => { self.advance(); self.make_token(RSquare, start, col) }
            b'{' => { self.advance(); self.make_token(LCurly, start, col) }
            b'}' => { self.advance(); self.make_token(RCurly, start, col) }
            b'#' => { self.advance(); self.make_token(Hash, start, col) }
            b'*' => { self.advance(); self.make_token(Asterisk, start, col) }
            b'/' => { self.advance(); self.make_token(Solidus, start, col) }
            b'?' => { self.advance(); self.make_token(Query, start, col) }
            b'~' => { self.advance(); self.make_token(Tilde, start, col) }
            b'&' => {
                self.advance();
                if self.peek_byte() == Some(b'&') { self.advance(); self.make_token(DoubleAmpersand, start, col) }
                else { self.make_token(Ampersand, start, col) }
            }
            b'|' => {
                self.advance();
                if self.peek_byte() == Some(b'|') { self.advance(); self.make_token(DoublePipe, start, col) }
                else { self.make_token(Pipe, start, col) }
            }
            b'^' => {
                self.advance();
                if self.peek_byte() == Some(b'^') { self.advance(); self.make_token(DoubleCaret, start, col) }
                else { self.make_token(Caret, start, col) }
            }
            b'=' => {
                self.advance();
                if self.peek_byte() == Some(b'=') { self.advance(); self.make_token(DoubleEqual, start, col) }
                else { self.make_token(Equal, start, col) }
            }
            b'!' => {
                self.advance();
                if self.peek_byte() == Some(b'=') { self.advance(); self.make_token(BangEqual, start, col) }
                else { self.make_token(Bang, start, col) }
            }
            b'a'..=b'z' | b'A'..=b'Z' | b'_' => self.lex_ident(start, col),
            b if b >= 0x80 => self.lex_ident(start, col),
            _ => { self.advance(); self.make_token(Unrecognized, start, col) }
        }
    }

    fn lex_anon(&mut self, sign: u8, start: usize, col: u32) -> Token {
        let mut count = 0u32;
        while self.peek_byte() == Some(sign) {
            self.advance();
            count += 1;
        }
        let kind = if sign == b'+' { TokenKind::MultiPlus(count) } else { TokenKind::MultiHyphen(count) };
        self.make_token(kind, start, col)
    }

    fn lex_hex(&mut self, start: usize, col: u32) -> Token {
        self.advance(); // '$'
        let mut any = false;
        while let Some(b) = self.peek_byte() {
            if b.is_ascii_hexdigit() || b == b'_' {
                any = true;
                self.advance();
            } else {
                break;
            }
        }
        if !any {
            return self.make_token(TokenKind::Unrecognized, start, col);
        }
        self.make_token(TokenKind::HexLiteral, start, col)
    }

    /// `%` is a binary-literal prefix unless it's followed by neither `0` nor
    /// `1`, or the previous token could itself end an expression (in which
    /// case `%` reads as modulo).
    fn lex_percent(&mut self, start: usize, col: u32) -> Token {
        let looks_binary = matches!(self.peek_byte_at(1), Some(b'0') | Some(b'1'));
        let prev_ends_expr = self.last.as_ref().map(ends_expression).unwrap_or(false);
        if !looks_binary || prev_ends_expr {
            self.advance();
            return self.make_token(TokenKind::Percent, start, col);
        }
        self.advance(); // '%'
        while let Some(b) = self.peek_byte() {
            if b == b'0' || b == b'1' || b == b'_' {
                self.advance();
            } else {
                break;
            }
        }
        self.make_token(TokenKind::BinLiteral, start, col)
    }

    fn lex_decimal(&mut self, start: usize, col: u32) -> Token {
        while let Some(b) = self.peek_byte() {
            if b.is_ascii_digit() || b == b'_' {
                self.advance();
            } else {
                break;
            }
        }
        self.make_token(TokenKind::DecLiteral, start, col)
    }

    fn lex_string(&mut self, start: usize, col: u32) -> Token {
        self.advance(); // opening '"'
        loop {
            match self.peek_byte() {
                None => return self.make_token(TokenKind::Unrecognized, start, col),
                Some(b'"') => {
                    self.advance();
                    return self.make_token(TokenKind::StringLiteral, start, col);
                }
                Some(b'\\') => {
                    self.advance();
                    if self.peek_byte().is_none() {
                        return self.make_token(TokenKind::Unrecognized, start, col);
                    }
                    self.advance_char();
                }
                Some(_) => self.advance_char(),
            }
        }
    }

    fn lex_char(&mut self, start: usize, col: u32) -> Token {
        self.advance(); // opening '\''
        let decoded = match self.decode_escaped_char() {
            Some(c) => c,
            None => return self.make_token(TokenKind::Unrecognized, start, col),
        };
        if self.peek_byte() != Some(b'\'') {
            return self.make_token(TokenKind::Unrecognized, start, col);
        }
        self.advance(); // closing '\''
        self.make_token(TokenKind::CharLiteral(decoded), start, col)
    }

    /// Decodes one source character for a char literal: a bare (possibly
    /// multi-byte) character, or a backslash escape. `UINT8_MAX` range
    /// checking for the decoded value happens downstream, in the evaluator,
    /// where diagnostics can be raised; this only rejects shapes that can't
    /// form a `char` at all.
    fn decode_escaped_char(&mut self) -> Option<char> {
        match self.peek_byte()? {
            b'\\' => {
                self.advance();
                let b = self.peek_byte()?;
                match b {
                    b'\\' => { self.advance(); Some('\\') }
                    b'\'' => { self.advance(); Some('\'') }
                    b'"' => { self.advance(); Some('"') }
                    b'b' => { self.advance(); Some('\u{8}') }
                    b'f' => { self.advance(); Some('\u{c}') }
                    b'n' => { self.advance(); Some('\n') }
                    b'r' => { self.advance(); Some('\r') }
                    b't' => { self.advance(); Some('\t') }
                    b'v' => { self.advance(); Some('\u{b}') }
                    b'0'..=b'7' => {
                        let mut v: u32 = 0;
                        let mut n = 0;
                        while n < 3 {
                            match self.peek_byte() {
                                Some(d @ b'0'..=b'7') => {
                                    v = v * 8 + (d - b'0') as u32;
                                    self.advance();
                                    n += 1;
                                }
                                _ => break,
                            }
                        }
                        char::from_u32(v)
                    }
                    b'x' => {
                        self.advance();
                        self.decode_hex_escape(1, 2)
                    }
                    b'u' => {
                        self.advance();
                        self.decode_hex_escape(4, 4)
                    }
                    b'U' => {
                        self.advance();
                        self.decode_hex_escape(8, 8)
                    }
                    _ => None,
                }
            }
            _ => {
                let c = self.current_line()[self.frame().byte..].chars().next()?;
                self.advance_char();
                Some(c)
            }
        }
    }

    fn decode_hex_escape(&mut self, min_digits: usize, max_digits: usize) -> Option<char> {
        let mut v: u32 = 0;
        let mut n = 0;
        while n < max_digits {
            match self.peek_byte() {
                Some(b) if b.is_ascii_hexdigit() => {
                    v = v * 16 + (b as char).to_digit(16).unwrap();
                    self.advance();
                    n += 1;
                }
                _ => break,
            }
        }
        if n < min_digits {
            return None;
        }
        char::from_u32(v)
    }

    /// A leading `.` followed directly by identifier characters is scanned
    /// as a combined lexeme and looked up whole; if it resolves to a
    /// directive or macro name, that token wins. Otherwise the scan backs
    /// off to a lone `DOT`, leaving the identifier characters for the next
    /// call — this is what lets `label.sub` lex as `IDENT DOT IDENT`.
    fn lex_dot(&mut self, start: usize, col: u32) -> Token {
        self.advance(); // '.'
        let ident_start = self.frame().byte;
        while let Some(b) = self.peek_byte() {
            if b.is_ascii_alphanumeric() || b == b'_' || b >= 0x80 {
                self.advance();
            } else {
                break;
            }
        }
        if self.frame().byte > ident_start {
            let text = &self.current_line()[start..self.frame().byte];
            match self.reserved.get(text) {
                Some(Reserved::Directive(d)) => {
                    let d = *d;
                    return self.make_token(TokenKind::Directive(d), start, col);
                }
                Some(Reserved::MacroName(n)) => {
                    let n = n.clone();
                    return self.make_token(TokenKind::MacroName(n), start, col);
                }
                _ => self.frame_mut().byte = ident_start,
            }
        }
        self.make_token(TokenKind::Dot, start, col)
    }

    fn lex_backslash(&mut self, start: usize, col: u32) -> Token {
        self.advance(); // '\'
        match self.peek_byte() {
            Some(b) if b.is_ascii_digit() => {
                let digit_start = self.frame().byte;
                while let Some(b) = self.peek_byte() {
                    if b.is_ascii_digit() { self.advance(); } else { break; }
                }
                let text = &self.current_line()[digit_start..self.frame().byte];
                let n: u32 = text.parse().unwrap_or(0);
                self.make_token(TokenKind::NumberedSubstitution(n), start, col)
            }
            Some(b) if b.is_ascii_alphabetic() || b == b'_' || b >= 0x80 => {
                while let Some(b) = self.peek_byte() {
                    if b.is_ascii_alphanumeric() || b == b'_' || b >= 0x80 {
                        self.advance();
                    } else {
                        break;
                    }
                }
                self.make_token(TokenKind::MacroSubstitution, start, col)
            }
            _ => self.make_token(TokenKind::Unrecognized, start, col),
        }
    }

    fn lex_langle(&mut self, start: usize, col: u32) -> Token {
        self.advance(); // '<'
        if self.peek_byte() == Some(b'=') {
            self.advance();
            if self.peek_byte() == Some(b'>') {
                self.advance();
                return self.make_token(TokenKind::Spaceship, start, col);
            }
            return self.make_token(TokenKind::Lte, start, col);
        }
        if self.peek_byte() == Some(b'<') {
            self.advance();
            return self.make_token(TokenKind::LShift, start, col);
        }
        self.make_token(TokenKind::LAngle, start, col)
    }

    fn lex_rangle(&mut self, start: usize, col: u32) -> Token {
        self.advance(); // '>'
        if self.peek_byte() == Some(b'=') {
            self.advance();
            return self.make_token(TokenKind::Gte, start, col);
        }
        if self.peek_byte() == Some(b'>') {
            self.advance();
            if self.peek_byte() == Some(b'>') {
                self.advance();
                return self.make_token(TokenKind::ARShift, start, col);
            }
            return self.make_token(TokenKind::RShift, start, col);
        }
        self.make_token(TokenKind::RAngle, start, col)
    }

    fn lex_ident(&mut self, start: usize, col: u32) -> Token {
        while let Some(b) = self.peek_byte() {
            if b.is_ascii_alphanumeric() || b == b'_' || b >= 0x80 {
                self.advance();
            } else {
                break;
            }
        }
        let text = &self.current_line()[start..self.frame().byte];
        let kind = match self.reserved.get(text) {
            Some(Reserved::Mnemonic(m)) => TokenKind::Mnemonic(*m),
            Some(Reserved::Directive(d)) => TokenKind::Directive(*d),
            Some(Reserved::Register(r)) => TokenKind::Register(*r),
            Some(Reserved::MacroName(n)) => TokenKind::MacroName(n.clone()),
            None => TokenKind::Ident,
        };
        self.make_token(kind, start, col)
    }
}

/// `true` for token kinds that can end an expression — used to decide
/// whether a following `%` is modulo rather than a binary-literal prefix.
fn ends_expression(kind: &TokenKind) -> bool {
    use TokenKind::*;
    matches!(
        kind,
        Ident | HexLiteral | BinLiteral | DecLiteral | CharLiteral(_) | StringLiteral |
        RParen | RSquare | RCurly | Register(_) | MultiPlus(_) | MultiHyphen(_) |
        Mnemonic(_) | Directive(_) | MacroName(_) | Asterisk
    )
}

fn seed_reserved(table: &mut StrTable<Reserved>) {
    for m in Mnemonic::iter() {
        table.insert(m.as_str(), Reserved::Mnemonic(m));
    }
    for d in Directive::iter() {
        table.insert(d.as_str(), Reserved::Directive(d));
    }
    table.insert("a", Reserved::Register(Register::A));
    table.insert("x", Reserved::Register(Register::X));
    table.insert("y", Reserved::Register(Register::Y));
    table.insert("s", Reserved::Register(Register::S));
}

#[cfg(test)]
mod tests {
    use super::*;

    fn lex_all(text: &str) -> Vec<TokenKind> {
        let file = Rc::new(SourceFile::new("t", text));
        let mut lexer = Lexer::new(file, false);
        let mut kinds = Vec::new();
        loop {
            let tok = lexer.next_token();
            let done = tok.kind == TokenKind::Eof;
            kinds.push(tok.kind);
            if done {
                break;
            }
        }
        kinds
    }

    #[test]
    fn skips_whitespace_and_line_comments() {
        let kinds = lex_all("  lda #1 ; comment\n");
        assert_eq!(
            kinds,
            vec![
                TokenKind::Mnemonic(Mnemonic::LDA),
                TokenKind::Hash,
                TokenKind::DecLiteral,
                TokenKind::Newline,
                TokenKind::Eof,
            ]
        );
    }

    #[test]
    fn block_comment_spans_lines() {
        let kinds = lex_all("lda /* multi\nline */ #1\n");
        assert_eq!(
            kinds,
            vec![
                TokenKind::Mnemonic(Mnemonic::LDA),
                TokenKind::Hash,
                TokenKind::DecLiteral,
                TokenKind::Newline,
                TokenKind::Eof,
            ]
        );
    }

    #[test]
    fn hex_and_binary_literals() {
        let kinds = lex_all("$FF_00 %1010\n");
        assert_eq!(kinds, vec![
            TokenKind::HexLiteral, TokenKind::BinLiteral, TokenKind::Newline, TokenKind::Eof
        ]);
    }

    #[test]
    fn percent_after_ident_is_modulo() {
        let kinds = lex_all("x %1\n");
        assert_eq!(kinds, vec![
            TokenKind::Ident, TokenKind::Percent, TokenKind::DecLiteral, TokenKind::Newline, TokenKind::Eof
        ]);
    }

    #[test]
    fn percent_not_followed_by_bit_is_modulo() {
        let kinds = lex_all("%9\n");
        assert_eq!(kinds, vec![TokenKind::Percent, TokenKind::DecLiteral, TokenKind::Newline, TokenKind::Eof]);
    }

    #[test]
    fn anonymous_labels_coalesce() {
        let kinds = lex_all("++ -- +\n");
        assert_eq!(kinds, vec![
            TokenKind::MultiPlus(2), TokenKind::MultiHyphen(2), TokenKind::MultiPlus(1),
            TokenKind::Newline, TokenKind::Eof
        ]);
    }

    #[test]
    fn angle_longest_match() {
        let kinds = lex_all("< <= <=> << > >= >> >>>\n");
        assert_eq!(kinds, vec![
            TokenKind::LAngle, TokenKind::Lte, TokenKind::Spaceship, TokenKind::LShift,
            TokenKind::RAngle, TokenKind::Gte, TokenKind::RShift, TokenKind::ARShift,
            TokenKind::Newline, TokenKind::Eof,
        ]);
    }

    #[test]
    fn dot_directive_vs_scoped_ident() {
        let kinds = lex_all(".byte 1\nfoo.bar\n");
        assert_eq!(kinds[0], TokenKind::Directive(Directive::Byte));
        // "foo.bar": IDENT DOT IDENT, not a directive lookup collision.
        let rest = lex_all("foo.bar\n");
        assert_eq!(rest, vec![
            TokenKind::Ident, TokenKind::Dot, TokenKind::Ident, TokenKind::Newline, TokenKind::Eof
        ]);
    }

    #[test]
    fn registers_are_reserved() {
        let kinds = lex_all("asl a\n");
        assert_eq!(kinds, vec![
            TokenKind::Mnemonic(Mnemonic::ASL), TokenKind::Register(Register::A),
            TokenKind::Newline, TokenKind::Eof
        ]);
    }

    #[test]
    fn char_literal_escapes() {
        let kinds = lex_all("'\\n' 'a' '\\x41'\n");
        assert_eq!(kinds, vec![
            TokenKind::CharLiteral('\n'), TokenKind::CharLiteral('a'), TokenKind::CharLiteral('A'),
            TokenKind::Newline, TokenKind::Eof
        ]);
    }

    #[test]
    fn unterminated_string_is_unrecognized() {
        let kinds = lex_all("\"abc\n");
        assert_eq!(kinds, vec![TokenKind::Unrecognized, TokenKind::Newline, TokenKind::Eof]);
    }

    #[test]
    fn backslash_substitutions() {
        let kinds = lex_all("\\name \\2\n");
        assert_eq!(kinds, vec![
            TokenKind::MacroSubstitution, TokenKind::NumberedSubstitution(2),
            TokenKind::Newline, TokenKind::Eof
        ]);
    }

    #[test]
    fn include_push_and_pop_resumes_outer_source() {
        let outer = Rc::new(SourceFile::new("outer", "lda #1\n"));
        let mut lexer = Lexer::new(outer, false);
        assert_eq!(lexer.next_token().kind, TokenKind::Mnemonic(Mnemonic::LDA));
        assert_eq!(lexer.next_token().kind, TokenKind::Hash);
        let inner = Rc::new(SourceFile::new("inner", "nop\n"));
        lexer.include(inner, 1);
        let tok = lexer.next_token();
        assert_eq!(tok.kind, TokenKind::Mnemonic(Mnemonic::NOP));
        assert!(tok.included_from.is_some());
        assert_eq!(lexer.next_token().kind, TokenKind::Newline);
        // inner exhausted; resumes outer at the token after '#'
        assert_eq!(lexer.next_token().kind, TokenKind::DecLiteral);
    }

    #[test]
    fn include_and_process_collects_inner_tokens() {
        let outer = Rc::new(SourceFile::new("outer", "x\n"));
        let mut lexer = Lexer::new(outer, false);
        let inner = Rc::new(SourceFile::new("inner", "nop\n"));
        let toks = lexer.include_and_process(inner, 1);
        assert_eq!(toks.len(), 2); // Mnemonic(NOP), Newline
        assert_eq!(toks[0].kind, TokenKind::Mnemonic(Mnemonic::NOP));
        assert!(toks[0].included_from.is_some());
        // lexer has resumed the outer source
        assert_eq!(lexer.next_token().kind, TokenKind::Ident);
    }
}
