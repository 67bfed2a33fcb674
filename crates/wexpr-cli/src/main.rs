//! `wexpr-tool` — convert and validate wexpr documents from the command line.
//!
//! ## Usage
//!
//! ```sh
//! # Check a document parses (prints true/false)
//! echo '@(a 1)' | wexpr-tool validate
//!
//! # Pretty-print with tabs and newlines
//! wexpr-tool humanReadable -i config.wexpr
//!
//! # Minify to a single line
//! wexpr-tool mini -i config.wexpr -o config.min.wexpr
//!
//! # Convert to the headered binary form (and back: binary input is
//! # detected by its leading 0x83 byte, so any command accepts it)
//! wexpr-tool binary -i config.wexpr -o config.bwexpr
//! wexpr-tool mini -i config.bwexpr
//! ```
//!
//! Input and output default to `-` (stdin/stdout). Any parse or decode
//! error exits non-zero; `validate` prints `false` instead of the error.

use std::io::{self, Read, Write};
use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use wexpr_core::{binary, parser, writer, Expression, ExpressionType, ParseFlags, WriteFlags};

#[derive(Parser)]
#[command(name = "wexpr-tool", version, about = "Convert and validate wexpr documents")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Check that the input parses, printing true or false
    Validate {
        #[command(flatten)]
        io: IoArgs,
    },
    /// Pretty-print the input with newlines and tab indentation
    #[command(name = "humanReadable")]
    HumanReadable {
        #[command(flatten)]
        io: IoArgs,
    },
    /// Minify the input to single-spaced text
    Mini {
        #[command(flatten)]
        io: IoArgs,
    },
    /// Convert the input to the headered binary form
    Binary {
        #[command(flatten)]
        io: IoArgs,
    },
}

#[derive(Args)]
struct IoArgs {
    /// Input path, or - for stdin
    #[arg(short, long, default_value = "-")]
    input: String,

    /// Output path, or - for stdout
    #[arg(short, long, default_value = "-")]
    output: String,
}

#[derive(Clone, Copy, PartialEq)]
enum Mode {
    Validate,
    HumanReadable,
    Mini,
    Binary,
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    let (mode, io) = match cli.command {
        Commands::Validate { io } => (Mode::Validate, io),
        Commands::HumanReadable { io } => (Mode::HumanReadable, io),
        Commands::Mini { io } => (Mode::Mini, io),
        Commands::Binary { io } => (Mode::Binary, io),
    };

    match run(mode, &io) {
        Ok(code) => code,
        Err(err) => {
            eprintln!("WexprTool: {err:#}");
            ExitCode::FAILURE
        }
    }
}

fn run(mode: Mode, io: &IoArgs) -> Result<ExitCode> {
    let input = read_input(&io.input)?;

    let expr = match parse_input(&input) {
        Ok(expr) => expr,
        Err(err) => {
            if mode == Mode::Validate {
                write_output(&io.output, b"false\n")?;
            } else {
                eprintln!("WexprTool: Error occurred with wexpr:");
                eprintln!(
                    "WexprTool: {}:{}:{}: {}",
                    display_path(&io.input),
                    err.line,
                    err.column,
                    err.message
                );
            }
            return Ok(ExitCode::FAILURE);
        }
    };

    // an empty document (or a binary file with no expression chunk)
    if expr.ty() == ExpressionType::Invalid {
        if mode == Mode::Validate {
            write_output(&io.output, b"false\n")?;
        } else {
            eprintln!("WexprTool: Got an empty expression back");
        }
        return Ok(ExitCode::FAILURE);
    }

    match mode {
        Mode::Validate => write_output(&io.output, b"true\n")?,
        Mode::HumanReadable => write_output(
            &io.output,
            writer::write(&expr, WriteFlags::HUMAN_READABLE).as_bytes(),
        )?,
        Mode::Mini => write_output(&io.output, writer::write(&expr, WriteFlags::NONE).as_bytes())?,
        Mode::Binary => write_output(&io.output, &binary::encode_file(&expr))?,
    }

    Ok(ExitCode::SUCCESS)
}

/// Binary files announce themselves with a leading 0x83; anything else is
/// treated as text.
fn parse_input(input: &[u8]) -> wexpr_core::Result<Expression> {
    if input.first() == Some(&binary::MAGIC_BYTE) {
        binary::decode_file(input)
    } else {
        parser::parse_bytes(input, ParseFlags::NONE)
    }
}

fn display_path(path: &str) -> &str {
    if path == "-" {
        "(stdin)"
    } else {
        path
    }
}

fn read_input(path: &str) -> Result<Vec<u8>> {
    if path == "-" {
        let mut buf = Vec::new();
        io::stdin()
            .read_to_end(&mut buf)
            .context("failed to read from stdin")?;
        Ok(buf)
    } else {
        std::fs::read(path).with_context(|| format!("failed to read file: {path}"))
    }
}

fn write_output(path: &str, content: &[u8]) -> Result<()> {
    if path == "-" {
        let mut stdout = io::stdout().lock();
        stdout
            .write_all(content)
            .and_then(|()| stdout.flush())
            .context("failed to write to stdout")?;
    } else {
        std::fs::write(path, content).with_context(|| format!("failed to write file: {path}"))?;
    }
    Ok(())
}
