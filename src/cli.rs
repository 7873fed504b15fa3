//! Command-line surface (§6, §4.9): exactly the option list the spec names,
//! plus a `-v`/`-vv` verbosity pair wired to `tracing_subscriber` — every
//! complete CLI in this corpus carries one, and the distilled option list
//! never meant to forbid it.

use std::path::PathBuf;

use clap::Parser;

use crate::cpu::Cpu;
use crate::output::OutputFormat;

#[derive(Parser, Debug)]
#[command(name = "tiny6502", version, about = "A multi-pass cross-assembler for the MOS 6502 family")]
pub struct Cli {
    /// Match identifiers and reserved words case-sensitively.
    #[arg(short = 'C', long = "case-sensitive")]
    pub case_sensitive: bool,

    /// Target CPU variant.
    #[arg(short = 'c', long = "cpu", value_enum, default_value_t = Cpu::Nmos6502)]
    pub cpu: Cpu,

    /// Defines a symbol before parsing, e.g. `-D VERSION=3`. May be repeated.
    #[arg(short = 'D', long = "define", value_name = "NAME=expr")]
    pub defines: Vec<String>,

    /// Output file format.
    #[arg(short = 'f', long = "format", value_enum, default_value_t = OutputFormatArg::Flat)]
    pub format: OutputFormatArg,

    /// Output file path.
    #[arg(short = 'o', long = "output", default_value = "a.out")]
    pub output: PathBuf,

    /// Emits a symbol report to this path.
    #[arg(short = 'l', long = "label", value_name = "file")]
    pub label: Option<PathBuf>,

    /// Emits a disassembly listing to this path.
    #[arg(short = 'L', long = "list", value_name = "file")]
    pub list: Option<PathBuf>,

    /// Raises log verbosity (`-v` = info, `-vv` = debug/trace).
    #[arg(short = 'v', long = "verbose", action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Source file to assemble. `-` or omitted reads stdin.
    pub input: Option<PathBuf>,
}

#[derive(Clone, Copy, PartialEq, Eq, Debug, clap::ValueEnum)]
pub enum OutputFormatArg {
    Cbm,
    Flat,
}

impl From<OutputFormatArg> for OutputFormat {
    fn from(f: OutputFormatArg) -> Self {
        match f {
            OutputFormatArg::Cbm => OutputFormat::Cbm,
            OutputFormatArg::Flat => OutputFormat::Flat,
        }
    }
}

impl Cli {
    /// The original invocation, space-joined, for the listing header.
    pub fn invocation(&self) -> String {
        std::env::args().collect::<Vec<_>>().join(" ")
    }

    pub fn tracing_filter(&self) -> &'static str {
        match self.verbose {
            0 => "warn",
            1 => "info",
            _ => "debug",
        }
    }
}
