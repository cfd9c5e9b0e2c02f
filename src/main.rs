//! mermaid-compose CLI entry point.

use std::fs;
use std::io::{self, Read, Write};
use std::process;
use std::str::FromStr;

use clap::{Parser, Subcommand};
use log::{LevelFilter, debug, error, info};

use mermaid_compose::{Result, diagnostics, format, parse};

/// Mermaid flowchart formatter and checker.
#[derive(Parser, Debug)]
#[command(
    name = "mermaid-compose",
    version = env!("MERMAID_COMPOSE_VERSION"),
    about = "Canonicalize, check and inspect Mermaid flowcharts"
)]
struct Cli {
    /// Log level (off, error, warn, info, debug, trace)
    #[arg(long = "log-level", default_value = "warn", global = true)]
    log_level: String,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Rewrite a flowchart in canonical form
    Fmt {
        /// Input file (reads from stdin if not provided)
        input: Option<String>,

        /// Override direction (LR, RL, TD, BT)
        #[arg(short = 'd', long = "direction")]
        direction: Option<String>,

        /// Write output to this file instead of stdout
        #[arg(short = 'o', long = "output")]
        output: Option<String>,
    },
    /// Print parse warnings and validation issues; exit 1 on errors
    Check {
        /// Input file (reads from stdin if not provided)
        input: Option<String>,
    },
    /// Print the parsed document and warnings as JSON
    Parse {
        /// Input file (reads from stdin if not provided)
        input: Option<String>,

        /// Pretty-print the JSON
        #[arg(long)]
        pretty: bool,
    },
}

fn read_input(input: Option<&str>) -> Result<String> {
    match input {
        Some(path) => Ok(fs::read_to_string(path)?),
        None => {
            let mut buf = String::new();
            io::stdin().read_to_string(&mut buf)?;
            Ok(buf)
        }
    }
}

fn write_output(output: Option<&str>, text: &str) -> Result<()> {
    match output {
        Some(path) => fs::write(path, text)?,
        None => {
            let mut stdout = io::stdout();
            stdout.write_all(text.as_bytes())?;
            stdout.flush()?;
        }
    }
    Ok(())
}

/// Runs the command; returns the process exit code.
fn run(cli: &Cli) -> Result<i32> {
    match &cli.command {
        Command::Fmt {
            input,
            direction,
            output,
        } => {
            let text = read_input(input.as_deref())?;
            let formatted = format(&text, direction.as_deref())?;
            write_output(output.as_deref(), &formatted)?;
            Ok(0)
        }
        Command::Check { input } => {
            let text = read_input(input.as_deref())?;
            let found = diagnostics(&text);
            let mut stdout = io::stdout();
            for diagnostic in &found {
                writeln!(stdout, "{diagnostic}")?;
            }
            let errors = found.iter().filter(|d| d.severity().is_error()).count();
            debug!(diagnostics = found.len(), errors; "Checked input");
            Ok(if errors > 0 { 1 } else { 0 })
        }
        Command::Parse { input, pretty } => {
            let text = read_input(input.as_deref())?;
            let result = parse(&text);
            let json = if *pretty {
                serde_json::to_string_pretty(&result)
            } else {
                serde_json::to_string(&result)
            }?;
            write_output(None, &format!("{json}\n"))?;
            Ok(0)
        }
    }
}

fn main() {
    let cli = Cli::parse();

    let log_level = LevelFilter::from_str(&cli.log_level).unwrap_or_else(|_| {
        eprintln!(
            "Invalid log level: {}. Using 'warn' instead.",
            cli.log_level
        );
        LevelFilter::Warn
    });

    env_logger::Builder::from_env(env_logger::Env::default())
        .filter_level(log_level)
        .init();

    info!(log_level:?; "Starting mermaid-compose");

    match run(&cli) {
        Ok(code) => process::exit(code),
        Err(err) => {
            error!("{err}");
            eprintln!("error: {err}");
            process::exit(1);
        }
    }
}
