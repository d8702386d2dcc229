use clap::{Args, Parser, Subcommand};
use colored::Colorize;
use grit_vm::{ExecError, LoadError};
use std::path::PathBuf;
use std::process;
use tracing::Level;

mod commands;

/// Standardized exit codes for CLI.
/// 0 = OK/halted, 2 = input error, 3 = program ended ERRORED, 4 = fatal fault,
/// 5 = step budget exhausted, 1 = other.
pub const EXIT_OK: i32 = 0;
const EXIT_OTHER: i32 = 1;
pub const EXIT_INPUT: i32 = 2;
pub const EXIT_ERRORED: i32 = 3;
const EXIT_FAULT: i32 = 4;
pub const EXIT_BUDGET: i32 = 5;

#[derive(Parser)]
#[command(name = "gritx", version, about = "GritVM CLI — run, check, disassemble")]
struct Cli {
    /// Raise log verbosity (-v info, -vv debug, -vvv trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    /// Log level by name; overridden by -v
    #[arg(long, env = "GRITX_LOG", global = true)]
    log: Option<Level>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Load and run a program
    Run(RunArgs),
    /// Load a program without running it
    Check {
        /// Path to .gvm program (or - for stdin)
        program: String,
    },
    /// Print the loaded instructions with their indices
    Disasm {
        /// Path to .gvm program (or - for stdin)
        program: String,
    },
}

#[derive(Args)]
pub struct RunArgs {
    /// Path to .gvm program (or - for stdin)
    pub program: String,
    /// Initial data memory, comma separated
    #[arg(long, value_delimiter = ',', allow_negative_numbers = true)]
    pub mem: Vec<i64>,
    /// Initial data memory as a JSON array file
    #[arg(long, conflicts_with = "mem")]
    pub mem_file: Option<PathBuf>,
    /// Stop after this many instructions
    #[arg(long, env = "GRITX_MAX_STEPS")]
    pub max_steps: Option<u64>,
    /// Print the data memory dump after the run
    #[arg(long)]
    pub dump: bool,
    /// Include the instruction listing in the dump
    #[arg(long)]
    pub dump_program: bool,
    /// Print a JSON snapshot instead of text
    #[arg(long)]
    pub json: bool,
}

fn log_level(verbose: u8, named: Option<Level>) -> Level {
    match verbose {
        0 => named.unwrap_or(Level::WARN),
        1 => Level::INFO,
        2 => Level::DEBUG,
        _ => Level::TRACE,
    }
}

/// Map error classes to exit codes.
fn exit_code_for(err: &anyhow::Error) -> i32 {
    if err.chain().any(|c| c.is::<ExecError>()) {
        EXIT_FAULT
    } else if err.chain().any(|c| {
        c.is::<LoadError>()
            || c.is::<std::io::Error>()
            || c.is::<serde_json::Error>()
    }) {
        EXIT_INPUT
    } else {
        EXIT_OTHER
    }
}

fn main() {
    let cli = Cli::parse();

    tracing_subscriber::fmt()
        .with_max_level(log_level(cli.verbose, cli.log))
        .with_target(false)
        .with_writer(std::io::stderr)
        .compact()
        .init();

    let result = match cli.command {
        Commands::Run(args) => commands::run(&args),
        Commands::Check { program } => commands::check(&program),
        Commands::Disasm { program } => commands::disasm(&program),
    };

    match result {
        Ok(code) => process::exit(code),
        Err(e) => {
            eprintln!("{} {:#}", "error:".red().bold(), e);
            process::exit(exit_code_for(&e));
        }
    }
}
