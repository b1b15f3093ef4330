//! abek -- the ABE Kernel driver.
//!
//! Loads Kernel source files in order, optionally runs the built-in test
//! battery, and drops into an interactive line-edited REPL. Exit status
//! is non-zero on any fatal abort (queue overflow, battery failure,
//! unreadable file).

use abe_core::{report, Config};
use abe_kernel::ctx::a_sink;
use abe_kernel::io::StrSource;
use abe_kernel::read::{read_sexpr, EOF};
use abe_kernel::repl::{load_file, push_env, report_beh, run_repl};
use abe_kernel::selftest::run_battery;
use abe_kernel::{init_kernel, KernelError};
use clap::Parser;
use rustyline::error::ReadlineError;
use rustyline::DefaultEditor;
use std::path::PathBuf;
use std::process::ExitCode;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "abek")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Kernel-family Lisp on an actor-based environment", long_about = None)]
struct Cli {
    /// Run the built-in test battery
    #[arg(short = 't', long = "test")]
    test: bool,

    /// Enter the interactive REPL after loading files
    #[arg(short = 'i', long = "interactive")]
    interactive: bool,

    /// Message dispatch budget per top-level form
    #[arg(short = 'M', long = "message-limit", default_value_t = 1_000_000)]
    message_limit: usize,

    /// Admission limit for the message queue
    #[arg(long = "queue-limit", default_value_t = 1000)]
    queue_limit: usize,

    /// Kernel source files to load in order
    files: Vec<PathBuf>,
}

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    println!("abek v{} -- ABE Kernel", env!("CARGO_PKG_VERSION"));

    let mut cfg = Config::new(cli.queue_limit);
    init_kernel(&mut cfg);

    if cli.test {
        match run_battery(&mut cfg, cli.message_limit) {
            Ok(()) => println!("\nAll tests passed."),
            Err(e) => {
                eprintln!("\n{}", e);
                return ExitCode::FAILURE;
            }
        }
    }

    for file in &cli.files {
        println!("Loading {}", file.display());
        if let Err(e) = load_file(&mut cfg, file, cli.message_limit) {
            eprintln!("{}: {}", file.display(), e);
            return ExitCode::FAILURE;
        }
    }

    if cli.interactive {
        println!("Entering INTERACTIVE mode.");
        if let Err(e) = interactive(&mut cfg, cli.message_limit) {
            eprintln!("{}", e);
            report::emit(&cfg);
            return ExitCode::FAILURE;
        }
    }

    report::emit(&cfg);
    ExitCode::SUCCESS
}

/// Line-edited REPL: lines accumulate until parentheses balance, then
/// every complete form evaluates with a printing customer.
fn interactive(cfg: &mut Config, budget: usize) -> Result<(), KernelError> {
    let mut rl = DefaultEditor::new().map_err(readline_err)?;
    let env = push_env(cfg);
    let mut pending = String::new();

    loop {
        let prompt = if pending.is_empty() { "> " } else { "  " };
        match rl.readline(prompt) {
            Ok(line) => {
                pending.push_str(&line);
                pending.push('\n');
                if !forms_complete(&pending) {
                    continue;
                }
                let _ = rl.add_history_entry(pending.trim());
                let text = std::mem::take(&mut pending);
                evaluate_forms(cfg, &text, env, budget)?;
                // the dispatcher is quiescent between inputs
                cfg.force_gc();
            }
            Err(ReadlineError::Interrupted) => {
                pending.clear();
            }
            Err(ReadlineError::Eof) => {
                println!();
                return Ok(());
            }
            Err(e) => return Err(readline_err(e)),
        }
    }
}

fn evaluate_forms(
    cfg: &mut Config,
    text: &str,
    env: abe_core::Value,
    budget: usize,
) -> Result<(), KernelError> {
    let mut src = StrSource::new(text);
    loop {
        let expr = read_sexpr(cfg, &mut src);
        if expr == EOF {
            return Ok(());
        }
        if !expr.is_actor() {
            eprintln!("Read error near {}", abe_kernel::plumbing::show(cfg, expr));
            return Ok(());
        }
        let cust = cfg.actor(report_beh, a_sink());
        let a_eval = cfg.heap.atom("eval");
        let req = cfg.heap.cons(a_eval, env);
        let msg = cfg.heap.cons(cust, req);
        cfg.send(expr, msg);
        run_repl(cfg, budget)?;
    }
}

/// A quick balance check so multi-line forms keep accumulating: counts
/// parentheses outside comments and character literals.
fn forms_complete(text: &str) -> bool {
    let mut depth: i64 = 0;
    let mut chars = text.chars().peekable();
    while let Some(c) = chars.next() {
        match c {
            ';' => {
                for c in chars.by_ref() {
                    if c == '\n' {
                        break;
                    }
                }
            }
            '\'' => {
                if let Some(&next) = chars.peek() {
                    chars.next();
                    if next == '\\' {
                        chars.next();
                    }
                    if chars.peek() == Some(&'\'') {
                        chars.next();
                    }
                }
            }
            '(' => depth += 1,
            ')' => depth -= 1,
            _ => {}
        }
    }
    depth <= 0
}

fn readline_err(e: ReadlineError) -> KernelError {
    match e {
        ReadlineError::Io(io) => KernelError::Io(io),
        other => KernelError::Io(std::io::Error::other(other.to_string())),
    }
}

#[cfg(test)]
mod tests {
    use super::forms_complete;

    #[test]
    fn test_forms_complete_balancing() {
        assert!(forms_complete("(+ 1 2)"));
        assert!(forms_complete("42"));
        assert!(!forms_complete("($define! x\n"));
        assert!(forms_complete("($define! x\n  7)\n"));
    }

    #[test]
    fn test_forms_complete_ignores_comments_and_chars() {
        assert!(forms_complete("; (unclosed in comment\n"));
        assert!(forms_complete("'('"));
        assert!(!forms_complete("((')')")); // literal ')' does not close
    }
}
