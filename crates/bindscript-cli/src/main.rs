//! bindscript CLI - parse bindscript sources and print their AST.

use std::fs;
use std::path::PathBuf;
use std::process::ExitCode;

use bindscript::{ParseError, Parser};
use clap::Parser as ClapParser;
use rustyline::error::ReadlineError;
use rustyline::DefaultEditor;
use tracing::debug;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

const VERSION: &str = env!("CARGO_PKG_VERSION");

#[derive(ClapParser, Debug)]
#[command(name = "bindscript", version, about = "Parse bindscript sources and print the AST")]
struct Cli {
    /// Source file to parse.
    #[arg(value_name = "FILE")]
    file: Option<PathBuf>,

    /// Parse source given on the command line.
    #[arg(short = 'e', long = "eval", value_name = "SOURCE", conflicts_with = "file")]
    source: Option<String>,

    /// Parse a single expression instead of statements.
    #[arg(long)]
    expr: bool,

    /// After an expression parse, print the unconsumed input.
    #[arg(long, requires = "expr")]
    tail: bool,

    /// Start the REPL (after parsing FILE or SOURCE, if given).
    #[arg(short, long)]
    interactive: bool,
}

fn main() -> ExitCode {
    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .init();

    let cli = Cli::parse();
    match run(&cli) {
        Ok(true) => ExitCode::SUCCESS,
        Ok(false) => ExitCode::FAILURE,
        Err(e) => {
            eprintln!("Error: {}", e);
            ExitCode::FAILURE
        }
    }
}

/// Returns whether every parse succeeded.
fn run(cli: &Cli) -> Result<bool, String> {
    let source = match (&cli.source, &cli.file) {
        (Some(code), _) => Some(code.clone()),
        (None, Some(path)) => {
            debug!(path = %path.display(), "reading source");
            let code = fs::read_to_string(path)
                .map_err(|e| format!("Failed to read {}: {}", path.display(), e))?;
            Some(code)
        }
        (None, None) => None,
    };

    let mut ok = true;
    if let Some(code) = &source {
        ok = parse_and_print(code, cli.expr, cli.tail);
    }

    if source.is_none() || cli.interactive {
        start_repl(cli.expr)?;
    }
    Ok(ok)
}

/// Parse `code` and print the AST, or the diagnostic on failure.
fn parse_and_print(code: &str, expr_mode: bool, show_tail: bool) -> bool {
    let mut parser = Parser::new(code);
    let result: Result<(), ParseError> = if expr_mode {
        parser.parse_expr(true).map(|expr| {
            println!("{:#?}", expr);
            if show_tail {
                println!("tail: {:?}", parser.tail());
            }
        })
    } else {
        parser.parse_statements().map(|stmts| {
            for stmt in &stmts {
                println!("{:#?}", stmt);
            }
        })
    };

    match result {
        Ok(()) => true,
        Err(err) => {
            eprintln!("{}", err.excerpt(code));
            false
        }
    }
}

fn start_repl(expr_mode: bool) -> Result<(), String> {
    println!("bindscript v{} - Type 'exit' or Ctrl+D to quit", VERSION);
    println!();

    let mut rl = DefaultEditor::new().map_err(|e| format!("Failed to create editor: {}", e))?;
    let mut expr_mode = expr_mode;
    let mut buffer = String::new();

    loop {
        let prompt = if buffer.is_empty() { ">>> " } else { "... " };

        match rl.readline(prompt) {
            Ok(line) => {
                let trimmed = line.trim();

                if buffer.is_empty() && (trimmed == "exit" || trimmed == "quit") {
                    break;
                }

                if buffer.is_empty() && trimmed.starts_with(':') {
                    if handle_command(trimmed, &mut expr_mode) {
                        break;
                    }
                    continue;
                }

                if !buffer.is_empty() {
                    buffer.push('\n');
                }
                buffer.push_str(&line);

                if is_complete(&buffer) {
                    if !buffer.trim().is_empty() {
                        rl.add_history_entry(buffer.trim()).ok();
                        parse_and_print(&buffer, expr_mode, expr_mode);
                    }
                    buffer.clear();
                }
            }
            Err(ReadlineError::Interrupted) => {
                buffer.clear();
                println!("^C");
            }
            Err(ReadlineError::Eof) => break,
            Err(e) => return Err(format!("Readline error: {}", e)),
        }
    }

    Ok(())
}

/// Check whether brackets and quotes in the input are balanced, so the REPL
/// knows to keep reading lines.
fn is_complete(input: &str) -> bool {
    let mut depth: i32 = 0;
    let mut quote: Option<char> = None;
    let mut escaped = false;

    for c in input.chars() {
        if let Some(q) = quote {
            if escaped {
                escaped = false;
            } else if c == '\\' {
                escaped = true;
            } else if c == q {
                quote = None;
            }
            continue;
        }

        match c {
            '"' | '\'' => quote = Some(c),
            '{' | '[' | '(' => depth += 1,
            '}' | ']' | ')' => depth -= 1,
            _ => {}
        }
    }

    depth <= 0 && quote.is_none()
}

/// Handle a `:command` line. Returns true when the REPL should exit.
fn handle_command(cmd: &str, expr_mode: &mut bool) -> bool {
    let command = cmd[1..].split_whitespace().next().unwrap_or_default();

    match command {
        "help" => {
            println!(
                r#"
REPL Commands:
  :help     Show this help
  :expr     Parse input as a single expression
  :stmt     Parse input as statements
  :exit     Exit the REPL
"#
            );
        }
        "expr" => *expr_mode = true,
        "stmt" => *expr_mode = false,
        "exit" | "quit" => return true,
        _ => println!("Unknown command: :{}. Type :help for available commands.", command),
    }
    false
}
