//! The assembly context: the aggregate of every piece of state an executing
//! statement can read or mutate. One instance lives for the whole run; the
//! pass driver resets the per-pass pieces (output cursors, anon-label
//! iteration indices) between passes while the symbol table and binary-file
//! cache persist.

use crate::anon::AnonLabels;
use crate::ast::Expr;
use crate::cpu::Cpu;
use crate::diagnostics::Diagnostics;
use crate::eval::{self, EvalContext};
use crate::output::OutputBuffer;
use crate::source::BinaryFileCache;
use crate::symtab::SymbolTable;
use crate::value::Value;

pub struct AssemblyContext {
    pub cpu: Cpu,
    pub case_sensitive: bool,
    pub symbols: SymbolTable,
    pub anon: AnonLabels,
    pub output: OutputBuffer,
    pub binaries: BinaryFileCache,

    /// 65816 accumulator/memory and index register widths: `true` = 16-bit.
    pub m16: bool,
    pub x16: bool,
    /// 65816 direct-page register, set by `.dp`.
    pub page: u16,

    pub pass: u32,
    pub pass_needed: bool,

    /// The most recently seen non-underscore label, for `_name` scoping.
    pub local_label: Option<String>,

    /// `.pron`/`.proff`: whether disassembly lines accumulate into the
    /// listing buffer right now.
    pub listing_enabled: bool,
    pub listing: Vec<String>,
}

impl AssemblyContext {
    pub fn new(cpu: Cpu, case_sensitive: bool) -> Self {
        AssemblyContext {
            cpu,
            case_sensitive,
            symbols: SymbolTable::new(case_sensitive),
            anon: AnonLabels::new(),
            output: OutputBuffer::new(),
            binaries: BinaryFileCache::new(),
            m16: false,
            x16: false,
            page: 0,
            pass: 0,
            pass_needed: false,
            local_label: None,
            listing_enabled: true,
            listing: Vec::new(),
        }
    }

    /// Advances to a fresh pass: bumps the pass counter, publishes it as the
    /// `CURRENT_PASS` built-in, resets the output and anon-label cursors, and
    /// clears `pass_needed` for the driver to re-observe.
    pub fn begin_pass(&mut self) {
        self.pass += 1;
        self.symbols.set_current_pass(self.pass as Value);
        self.output.begin_pass();
        self.anon.begin_pass();
        self.pass_needed = false;
        self.local_label = None;
        self.listing.clear();
    }

    pub fn record_listing_line(&mut self, line: String) {
        if self.listing_enabled {
            self.listing.push(line);
        }
    }

    /// Evaluates `expr` against this context's symbol table, anon-label
    /// collection, and pass state, borrowing each field individually so the
    /// caller is still free to touch `self.output` once this call returns.
    pub fn eval(&mut self, diags: &mut Diagnostics, expr: &Expr) -> Value {
        let local_label = self.local_label.clone();
        let mut ectx = EvalContext {
            symbols: &mut self.symbols,
            anon: &self.anon,
            diags,
            pc: self.output.logical_pc,
            pass: self.pass,
            local_label: local_label.as_deref(),
            pass_needed: &mut self.pass_needed,
        };
        eval::eval(expr, &mut ectx)
    }
}
