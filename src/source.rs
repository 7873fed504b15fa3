//! Source and binary file models. A `SourceFile` is pre-split into logical
//! lines so the lexer never has to re-scan for newlines; a `BinaryFile` is a
//! read-once blob cached by path for `.binary`.

use std::collections::HashMap;
use std::fmt;
use std::fs;
use std::io;
use std::path::Path;
use std::rc::Rc;

use crate::value::UINT24_MAX;

/// A source file, normalized to LF line endings and split into lines.
#[derive(Debug)]
pub struct SourceFile {
    name: String,
    lines: Vec<String>,
}

impl SourceFile {
    pub fn new(name: impl Into<String>, text: &str) -> Self {
        let normalized = normalize_newlines(text);
        let lines = normalized.lines().map(str::to_owned).collect();
        SourceFile { name: name.into(), lines }
    }

    pub fn from_path(path: impl AsRef<Path>) -> io::Result<Self> {
        let path = path.as_ref();
        let text = fs::read_to_string(path)?;
        Ok(Self::new(path.to_string_lossy().into_owned(), &text))
    }

    pub fn from_stdin() -> io::Result<Self> {
        use std::io::Read;
        let mut text = String::new();
        io::stdin().read_to_string(&mut text)?;
        Ok(Self::new("(stdin)", &text))
    }

    #[inline]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[inline]
    pub fn line_count(&self) -> usize {
        self.lines.len()
    }

    /// 1-based line lookup; returns `""` for a line one past the end (EOF).
    pub fn line(&self, line_no: u32) -> &str {
        self.lines
            .get((line_no as usize).wrapping_sub(1))
            .map(String::as_str)
            .unwrap_or("")
    }
}

impl fmt::Display for SourceFile {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(&self.name)
    }
}

/// Rewrites CRLF and bare CR to LF.
fn normalize_newlines(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut chars = text.chars().peekable();
    while let Some(c) = chars.next() {
        match c {
            '\r' => {
                if chars.peek() == Some(&'\n') {
                    chars.next();
                }
                out.push('\n');
            }
            c => out.push(c),
        }
    }
    out
}

/// A 0-based byte offset/line/column source position.
#[derive(Clone, Copy, Hash, PartialEq, Eq, Debug)]
pub struct Pos {
    pub line: u32,
    pub column: u32,
}

impl Pos {
    #[inline]
    pub fn bof() -> Self {
        Pos { line: 1, column: 1 }
    }
}

impl fmt::Display for Pos {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}:{}", self.line, self.column)
    }
}

/// A read-once binary file, bounded at `UINT24_MAX` bytes, cached by path so
/// repeated `.binary` directives across passes don't re-read disk.
#[derive(Default)]
pub struct BinaryFileCache {
    files: HashMap<String, Rc<Vec<u8>>>,
}

impl BinaryFileCache {
    pub fn new() -> Self {
        BinaryFileCache { files: HashMap::new() }
    }

    pub fn load(&mut self, path: &str) -> io::Result<Rc<Vec<u8>>> {
        if let Some(existing) = self.files.get(path) {
            return Ok(existing.clone());
        }
        let bytes = fs::read(path)?;
        if bytes.len() as i64 > UINT24_MAX {
            return Err(io::Error::new(
                io::ErrorKind::InvalidData,
                format!("'{}' exceeds the maximum binary-file size of {} bytes", path, UINT24_MAX),
            ));
        }
        let bytes = Rc::new(bytes);
        self.files.insert(path.to_owned(), bytes.clone());
        Ok(bytes)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn normalizes_crlf() {
        let f = SourceFile::new("t", "a\r\nb\rc\n");
        assert_eq!(f.line_count(), 3);
        assert_eq!(f.line(1), "a");
        assert_eq!(f.line(2), "b");
        assert_eq!(f.line(3), "c");
    }

    #[test]
    fn line_past_end_is_empty() {
        let f = SourceFile::new("t", "a\n");
        assert_eq!(f.line(2), "");
    }

    #[test]
    fn binary_cache_reuses_contents() {
        let dir = std::env::temp_dir().join("tiny6502-test-binfile");
        fs::write(&dir, [1u8, 2, 3]).unwrap();
        let mut cache = BinaryFileCache::new();
        let a = cache.load(dir.to_str().unwrap()).unwrap();
        let b = cache.load(dir.to_str().unwrap()).unwrap();
        assert!(Rc::ptr_eq(&a, &b));
        fs::remove_file(&dir).ok();
    }
}
