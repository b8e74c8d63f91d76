use bank_ledger::config::{Config, OutputFormat};
use bank_ledger::error::{Error, Result};
use bank_ledger::facade::CommandFacade;
use bank_ledger::session::{self, render_error, Session};
use bank_ledger::logger;
use clap::{Parser, Subcommand};
use std::fs::File;
use std::io::{self, BufRead, BufReader};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "bank-ledger")]
#[command(about = "Bank Ledger CLI - In-memory accounts, deposits, withdrawals and transfers")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Output format (overrides BANK_LEDGER_OUTPUT_FORMAT)
    #[arg(short, long, value_enum)]
    pub format: Option<OutputFormat>,

    /// Log filter, e.g. "info" or "bank_ledger=debug" (overrides BANK_LEDGER_LOG_LEVEL)
    #[arg(long)]
    pub log_level: Option<String>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Execute a command stream and print one result per command
    Run {
        /// Command file path (or read from stdin if not provided)
        #[arg(short = 'i', long)]
        file: Option<String>,
    },

    /// Parse a command stream without executing it
    Check {
        /// Command file path (or read from stdin if not provided)
        #[arg(short = 'i', long)]
        file: Option<String>,
    },
}

/// Open the command file, falling back to stdin
fn open_input(file: Option<PathBuf>) -> Result<Box<dyn BufRead>> {
    match file {
        Some(path) => {
            let file = File::open(&path).map_err(|e| {
                Error::Io(io::Error::new(
                    e.kind(),
                    format!("Failed to read file {}: {}", path.display(), e),
                ))
            })?;
            Ok(Box::new(BufReader::new(file)))
        }
        None => Ok(Box::new(BufReader::new(io::stdin()))),
    }
}

/// Returns the process exit code.
pub fn run(cli: Cli) -> Result<i32> {
    let mut config = Config::from_env();
    if let Some(format) = cli.format {
        config.set_output_format(format);
    }
    if let Some(level) = cli.log_level {
        config.set_log_level(level);
    }
    logger::init(config.get_log_level());
    for warning in &config.warnings {
        tracing::warn!("{}", warning);
    }

    let file = match &cli.command {
        Commands::Run { file } | Commands::Check { file } => file.clone(),
    };
    if let Some(path) = file {
        config.set_input(PathBuf::from(path));
    }
    let reader = open_input(config.get_input().cloned())?;

    match cli.command {
        Commands::Run { .. } => {
            let mut facade = CommandFacade::new();
            let stdout = io::stdout();
            Session::new(&mut facade, config.get_output_format()).run(reader, stdout.lock())?;
            Ok(0)
        }

        Commands::Check { .. } => {
            let problems = session::check(reader)?;

            for (line, error) in &problems {
                match config.get_output_format() {
                    OutputFormat::Json => println!(
                        "{}",
                        serde_json::json!({ "line": line, "status": "error", "error": error.to_string() })
                    ),
                    OutputFormat::Human => {
                        println!("line {}: {}", line, render_error(error).trim_start())
                    }
                }
            }

            if problems.is_empty() {
                if config.get_output_format() == OutputFormat::Human {
                    println!("✓ All commands are valid");
                }
                Ok(0)
            } else {
                Ok(1)
            }
        }
    }
}
