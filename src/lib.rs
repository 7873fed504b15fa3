//! `tiny6502`: a multi-pass cross-assembler for the MOS 6502 family (NMOS,
//! NMOS with illegal opcodes, WDC 65C02, WDC 65816).

pub mod anon;
pub mod ast;
pub mod cli;
pub mod context;
pub mod cpu;
pub mod diagnostics;
pub mod directive;
pub mod encoder;
pub mod eval;
pub mod executor;
pub mod labelreport;
pub mod lexer;
pub mod listing;
pub mod macros;
pub mod mnemonic;
pub mod output;
pub mod parser;
pub mod pass;
pub mod pseudo;
pub mod source;
pub mod strtab;
pub mod symtab;
pub mod token;
pub mod value;
