use std::io::Write as _;
use std::process::ExitCode;
use std::rc::Rc;

use clap::Parser as _;
use tracing_subscriber::EnvFilter;

use tiny6502::cli::Cli;
use tiny6502::diagnostics::{color, Diagnostics, Severity};
use tiny6502::labelreport;
use tiny6502::listing;
use tiny6502::pass;
use tiny6502::source::SourceFile;

fn main() -> ExitCode {
    let cli = Cli::parse();

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(cli.tracing_filter()));
    tracing_subscriber::fmt().with_env_filter(filter).with_writer(std::io::stderr).init();

    let source = match load_source(&cli) {
        Ok(s) => s,
        Err(e) => {
            eprintln!("tiny6502: {}", e);
            return ExitCode::FAILURE;
        }
    };

    let mut diags = Diagnostics::new();
    let result = pass::assemble(Rc::new(source), cli.cpu, cli.case_sensitive, &mut diags);

    print_diagnostics(&diags);

    if diags.has_errors() {
        return ExitCode::FAILURE;
    }

    let format = cli.format.into();
    if let Err(e) = result.context.output.write_to(cli.output.to_string_lossy().as_ref(), format) {
        eprintln!("tiny6502: failed to write {}: {}", cli.output.display(), e);
        return ExitCode::FAILURE;
    }

    if let Some(path) = &cli.label {
        let text = labelreport::report(result.context.symbols.iter());
        if let Err(e) = write_text(path, &text) {
            eprintln!("tiny6502: failed to write {}: {}", path.display(), e);
            return ExitCode::FAILURE;
        }
    }

    if let Some(path) = &cli.list {
        let header = listing::header(
            &cli.input.as_ref().map(|p| p.display().to_string()).unwrap_or_else(|| "<stdin>".to_owned()),
            &utc_timestamp(),
            &cli.invocation(),
        );
        let body = pass::listing_text(&result.context);
        if let Err(e) = write_text(path, &format!("{}{}", header, body)) {
            eprintln!("tiny6502: failed to write {}: {}", path.display(), e);
            return ExitCode::FAILURE;
        }
    }

    ExitCode::SUCCESS
}

/// Loads the input file (or stdin) and prepends each `-D NAME=expr` as a
/// synthetic assignment line, parsed by the same grammar as the real source.
fn load_source(cli: &Cli) -> std::io::Result<SourceFile> {
    let (name, text) = match &cli.input {
        Some(path) if path.to_str() != Some("-") => (path.display().to_string(), std::fs::read_to_string(path)?),
        _ => ("<stdin>".to_owned(), read_stdin()?),
    };

    let mut prelude = String::new();
    for define in &cli.defines {
        prelude.push_str(define);
        prelude.push('\n');
    }

    Ok(SourceFile::new(name, &format!("{}{}", prelude, text)))
}

/// Seconds since the Unix epoch, UTC. Good enough for a listing header
/// provenance stamp without pulling in a date/time crate the rest of the
/// corpus never reaches for.
fn utc_timestamp() -> String {
    let secs = std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .map(|d| d.as_secs())
        .unwrap_or(0);
    format!("{}s since epoch (UTC)", secs)
}

fn read_stdin() -> std::io::Result<String> {
    use std::io::Read;
    let mut text = String::new();
    std::io::stdin().read_to_string(&mut text)?;
    Ok(text)
}

fn write_text(path: &std::path::Path, text: &str) -> std::io::Result<()> {
    let mut file = std::fs::File::create(path)?;
    file.write_all(text.as_bytes())
}

fn print_diagnostics(diags: &Diagnostics) {
    for d in diags.entries() {
        let c = match d.severity {
            Severity::Warning => color::MAGENTA,
            Severity::Error | Severity::Fatal => color::RED,
        };
        eprint!("{}{}{}", c, d, color::RESET);
    }
}
