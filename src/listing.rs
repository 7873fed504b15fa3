//! The `.lst` disassembly listing. One line per executed statement, built
//! from the executor's disassembly fragment and the bytes written during
//! the (converged) final pass; continuation lines wrap the byte column
//! every 8 bytes for data pseudo-ops that emit long runs.

use crate::value::{is_defined, Value};

pub const BYTES_PER_LINE: usize = 8;

/// The column-0 marker distinguishing what kind of statement a line reports.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum Marker {
    Instruction,
    PseudoOp,
    Assignment,
    Unassembled,
}

impl Marker {
    fn as_char(self) -> char {
        match self {
            Marker::Instruction => '.',
            Marker::PseudoOp => '>',
            Marker::Assignment => '=',
            Marker::Unassembled => '-',
        }
    }
}

/// The three `;;`-prefixed header lines: source path, UTC timestamp, and the
/// CLI invocation that produced this listing.
pub fn header(source_path: &str, timestamp: &str, cli: &str) -> String {
    format!(";; {}\n;; {}\n;; {}\n", source_path, timestamp, cli)
}

fn pc_column(logical_pc: Value) -> String {
    if is_defined(logical_pc) {
        format!("{:04x}", (logical_pc as u32) & 0xffff)
    } else {
        "????".to_owned()
    }
}

/// Renders one statement's listing entry. `bytes` is the slice of output
/// actually written by this statement (may be empty, e.g. a bare label).
pub fn format_line(marker: Marker, logical_pc: Value, bytes: &[u8], fragment: Option<&str>, source_line: &str) -> String {
    let pc_col = pc_column(logical_pc);
    let frag = fragment.unwrap_or("");
    let mut out = String::new();

    if bytes.is_empty() {
        out.push_str(&format!("{}{:<5}{:<23}{:<17}{}\n", marker.as_char(), pc_col, "", frag, source_line));
        return out;
    }

    for (i, chunk) in bytes.chunks(BYTES_PER_LINE).enumerate() {
        let byte_col: String = chunk.iter().map(|b| format!("{:02x} ", b)).collect();
        if i == 0 {
            out.push_str(&format!("{}{:<5}{:<23}{:<17}{}\n", marker.as_char(), pc_col, byte_col, frag, source_line));
        } else {
            out.push_str(&format!("{:<6}{:<23}\n", "", byte_col));
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn instruction_line_carries_marker_and_pc() {
        let line = format_line(Marker::Instruction, 0x0800, &[0xa9, 0x01], Some("lda #$01"), "lda #1");
        assert!(line.starts_with('.'));
        assert!(line.contains("0800"));
        assert!(line.contains("a9 01"));
        assert!(line.contains("lda #$01"));
    }

    #[test]
    fn long_byte_run_wraps_every_eight() {
        let bytes = [0u8; 10];
        let line = format_line(Marker::PseudoOp, 0x1000, &bytes, Some(".byte"), ".byte 0,0,0,0,0,0,0,0,0,0");
        assert_eq!(line.lines().count(), 2);
    }

    #[test]
    fn undefined_pc_prints_question_marks() {
        let line = format_line(Marker::Instruction, crate::value::UNDEFINED, &[], None, "bne +");
        assert!(line.contains("????"));
    }
}
