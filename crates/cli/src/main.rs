//! Test driver CLI.
//!
//! This binary runs one or more VMH images on a transactor-attached core. It performs:
//! 1. **Load:** Resets the device and streams each image's memory-init records.
//! 2. **Start:** Sends the start PC (default `0x200`).
//! 3. **Decode:** Prints tohost output to stderr until the core reports an exit code.
//!
//! Host messages are written as JSON lines to stdout (or `--messages`) and tohost
//! notifications are read as JSON lines from stdin (or `--events`), so a bridge process
//! can sit between this driver and the co-emulation fabric.

use std::error::Error;
use std::fs::File;
use std::io::{self, BufRead, BufReader, Write};
use std::path::PathBuf;
use std::process::ExitCode;

use clap::{ArgAction, Parser};
use tracing::info;
use tracing_subscriber::EnvFilter;

use testdriver_core::config::Config;
use testdriver_core::soc::transactor::StreamTransactor;
use testdriver_core::{RunSummary, Testbench};

#[derive(Parser, Debug)]
#[command(
    name = "tb",
    author,
    version,
    about = "Run VMH images on a transactor-attached core",
    long_about = "Loads each VMH image into the core's memory, starts it, and decodes tohost output until the core exits.\n\nHost messages go to stdout as JSON lines; tohost notifications are read from stdin.\n\nExamples:\n  tb build/add.vmh build/branch.vmh\n  tb --events tohost.jsonl --messages host.jsonl --summary build/*.vmh\n  tb --start-pc 0x1000 --strict image.vmh"
)]
struct Cli {
    /// VMH images to run, in order.
    #[arg(required = true, value_name = "IMAGE")]
    images: Vec<PathBuf>,

    /// JSON configuration file.
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Start PC sent after each load (hex with 0x, or decimal). Overrides the config.
    #[arg(long, value_parser = parse_pc)]
    start_pc: Option<u32>,

    /// Exit with status 1 if any image reports a non-zero exit code.
    #[arg(long)]
    strict: bool,

    /// Read tohost notifications from this file instead of stdin.
    #[arg(long)]
    events: Option<PathBuf>,

    /// Write host messages to this file instead of stdout.
    #[arg(long)]
    messages: Option<PathBuf>,

    /// Print a pass/fail summary after the last image.
    #[arg(long)]
    summary: bool,

    /// Log verbosity (-v info, -vv debug, -vvv trace). `RUST_LOG` takes precedence.
    #[arg(short, long, action = ArgAction::Count)]
    verbose: u8,
}

fn parse_pc(arg: &str) -> Result<u32, String> {
    let parsed = match arg.strip_prefix("0x").or_else(|| arg.strip_prefix("0X")) {
        Some(hex) => u32::from_str_radix(hex, 16),
        None => arg.parse(),
    };
    parsed.map_err(|e| format!("invalid start PC '{arg}': {e}"))
}

fn init_tracing(verbose: u8) {
    let default = match verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .with_target(false)
        .init();
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    match run(&cli) {
        Ok(code) => code,
        Err(err) => {
            eprintln!("\n[!] FATAL: {err}");
            ExitCode::FAILURE
        }
    }
}

/// Builds the config and transactor from the command line, then runs every image.
fn run(cli: &Cli) -> Result<ExitCode, Box<dyn Error>> {
    let mut config = match &cli.config {
        Some(path) => Config::from_json_file(path)?,
        None => Config::default(),
    };
    if let Some(pc) = cli.start_pc {
        config.general.start_pc = pc;
    }
    if cli.strict {
        config.general.fail_on_exit_code = true;
    }

    let input: Box<dyn BufRead> = match &cli.events {
        Some(path) => Box::new(BufReader::new(File::open(path)?)),
        None => Box::new(io::stdin().lock()),
    };
    let output: Box<dyn Write> = match &cli.messages {
        Some(path) => Box::new(File::create(path)?),
        None => Box::new(io::stdout()),
    };

    let transactor = StreamTransactor::new(input, output);
    let mut bench = Testbench::new(transactor, &config, io::stderr());
    let summary = bench.run_all(&cli.images)?;
    info!(
        images = summary.len(),
        passed = summary.passed(),
        failed = summary.failed(),
        "run complete"
    );

    if cli.summary {
        summary.print(&mut io::stderr())?;
    }
    Ok(exit_code(&summary, config.general.fail_on_exit_code))
}

fn exit_code(summary: &RunSummary, fail_on_exit_code: bool) -> ExitCode {
    if summary.exit_status(fail_on_exit_code) == 0 {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    }
}
