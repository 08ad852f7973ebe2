/*!
Main binary for MQLite.
*/

use anyhow::{Context, Result};
use clap::{ArgAction, CommandFactory, Parser, Subcommand, ValueEnum};
use clap_complete::generate;
use std::fs;
use std::io::stdout;
use std::io::{self, IsTerminal, Read};
use std::path::PathBuf;
use std::process::ExitCode;

use mqlite::commands;
use mqlite::format::{Formatter, Newline};
use mqlite::pattern::Pattern;
use mqlite::value::Value;

/// Pattern match an input JSON document against an MQLite pattern.
#[derive(Parser)]
#[command(name = "mq", version, about, arg_required_else_help = true, long_about = None, disable_help_subcommand = true)]
struct Args {
    /// Optional subcommands
    #[command(subcommand)]
    command: Option<Commands>,
    /// JSON pattern to match against the input (e.g. '[{"name": null}]')
    pattern: Option<String>,
    #[arg(value_name = "FILE")]
    /// Optional path to JSON file. If omitted, reads from STDIN
    input: Option<PathBuf>,
    /// Exit with an error message and status 1 when nothing matches
    #[arg(long, action = ArgAction::SetTrue)]
    strict: bool,
    /// Escape non-ASCII characters in the output
    #[arg(long, action = ArgAction::SetTrue)]
    ascii: bool,
    /// Use N spaces of indentation (-1 to disable)
    #[arg(long, value_name = "N", default_value_t = 4, allow_negative_numbers = true)]
    indent: i64,
    /// Sort object keys before printing
    #[arg(long, action = ArgAction::SetTrue)]
    sort_keys: bool,
    /// Use a specific newline mode
    #[arg(long, value_enum, default_value_t = NewlineMode::System)]
    newline: NewlineMode,
}

/// Available subcommands for `mq`
#[derive(Subcommand)]
enum Commands {
    #[command(subcommand)]
    /// Generate additional documentation and/or completions
    Generate(GenerateCommand),
}

/// Generate shell completions and man pages
#[derive(Subcommand)]
enum GenerateCommand {
    /// Generate shell completions for the given shell to stdout.
    Shell { shell: clap_complete::Shell },
    /// Generate man pages for mq to the output directory if specified,
    /// else the current directory.
    Man {
        /// The output directory to write the man pages.
        #[clap(short, long)]
        output_dir: Option<PathBuf>,
    },
}

/// Newline modes accepted by `--newline`.
#[derive(Clone, Copy, ValueEnum)]
enum NewlineMode {
    Dos,
    Mac,
    Unix,
    System,
}

impl From<NewlineMode> for Newline {
    fn from(mode: NewlineMode) -> Self {
        match mode {
            NewlineMode::Dos => Newline::Dos,
            NewlineMode::Mac => Newline::Mac,
            NewlineMode::Unix => Newline::Unix,
            NewlineMode::System => Newline::System,
        }
    }
}

/// Entry point for the main binary.
///
/// Exit codes: 0 on success, 1 on no match under `--strict` or an
/// unrecoverable error, 2 on usage or pattern compilation errors.
fn main() -> ExitCode {
    match run(Args::parse()) {
        Ok(code) => code,
        Err(err) => {
            eprintln!("mq: error: {err:#}");
            ExitCode::FAILURE
        }
    }
}

fn run(args: Args) -> Result<ExitCode> {
    if let Some(Commands::Generate(cmd)) = args.command {
        match cmd {
            GenerateCommand::Shell { shell } => {
                let mut cmd = Args::command();
                generate(shell, &mut cmd, "mq", &mut stdout().lock());
            }
            GenerateCommand::Man { output_dir } => {
                commands::generate::generate_man_pages(
                    &Args::command(),
                    output_dir,
                )?;
            }
        }
        return Ok(ExitCode::SUCCESS);
    }

    let Some(pattern_text) = args.pattern else {
        eprintln!(
            "mq: error: a JSON pattern is required unless using a subcommand"
        );
        return Ok(ExitCode::from(2));
    };

    // malformed patterns are usage errors
    let query: Value = match serde_json::from_str(&pattern_text) {
        Ok(query) => query,
        Err(err) => {
            eprintln!("mq: error: pattern is not valid JSON: {err}");
            return Ok(ExitCode::from(2));
        }
    };
    let pattern = match Pattern::compile(&query) {
        Ok(pattern) => pattern,
        Err(err) => {
            eprintln!("mq: error: {err}");
            return Ok(ExitCode::from(2));
        }
    };

    // Parse input content
    let input_content = read_input(args.input)?;
    let data: Value = serde_json::from_str(&input_content)
        .with_context(|| "failed to parse input JSON")?;

    let result = pattern.matches(&data);

    let formatter = Formatter {
        ascii: args.ascii,
        indent: usize::try_from(args.indent).ok(),
        sort_keys: args.sort_keys,
        newline: args.newline.into(),
        color: stdout().is_terminal(),
    };

    match result {
        Some(value) => {
            if args.strict
                && matches!(&value, Value::Array(items) if items.is_empty())
            {
                eprintln!("mq: error: no match");
                return Ok(ExitCode::from(1));
            }
            formatter.print(&value)?;
            Ok(ExitCode::SUCCESS)
        }
        None if args.strict => {
            eprintln!("mq: error: no match");
            Ok(ExitCode::from(1))
        }
        None => {
            // the empty result takes the shape of the pattern root
            let empty = if matches!(query, Value::Array(_)) {
                Value::Array(vec![])
            } else {
                Value::Null
            };
            formatter.print(&empty)?;
            Ok(ExitCode::SUCCESS)
        }
    }
}

/// Read the input document from a file or STDIN, tolerating a UTF-8 BOM.
fn read_input(path: Option<PathBuf>) -> Result<String> {
    let content = match path {
        Some(path) => fs::read_to_string(&path)
            .with_context(|| format!("failed to read file {path:?}"))?,
        None => {
            if io::stdin().is_terminal() {
                anyhow::bail!(
                    "no input: pipe JSON to stdin or pass a file path"
                );
            }
            let mut buffer = String::new();
            io::stdin()
                .read_to_string(&mut buffer)
                .context("failed to read stdin")?;
            buffer
        }
    };

    Ok(match content.strip_prefix('\u{feff}') {
        Some(stripped) => stripped.to_owned(),
        None => content,
    })
}
