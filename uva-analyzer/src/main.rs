use std::io::{self, BufWriter};
use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::{Context, Result, bail};
use clap::Parser;
use tracing::debug;
use tracing_subscriber::EnvFilter;
use uva_analyzer::{AnalyzerOptions, Request, run_request, serve};

const USAGE: &str = "usage: uvalang-analyzer <input-file> [buffer-file] or uvalang-analyzer --server";
const SERVER_USAGE: &str = "uvalang-analyzer --server takes no arguments. Write <input-file>\\n<buffer-file>\\n to stdin";

#[derive(Parser, Debug)]
#[command(name = "uvalang-analyzer", version, about, long_about = None)]
struct Cli {
    #[arg(
        long,
        help = "Keep running and read requests (<input-file> and <buffer-file>, one per line) from stdin"
    )]
    server: bool,

    #[arg(long, help = "Include recovered lexer and parser faults in each report")]
    report_faults: bool,

    #[arg(short, long, help = "Log debug output to stderr (RUST_LOG takes precedence)")]
    verbose: bool,

    #[arg(value_name = "FILE", help = "<input-file> [buffer-file]")]
    files: Vec<PathBuf>,
}

enum Mode {
    OneShot(Request),
    Server,
}

impl Cli {
    fn mode(&self) -> Result<Mode> {
        if self.server {
            if !self.files.is_empty() {
                bail!(SERVER_USAGE);
            }
            return Ok(Mode::Server);
        }
        match self.files.as_slice() {
            [input] => Ok(Mode::OneShot(Request::single(input))),
            [input, buffer] => Ok(Mode::OneShot(Request::new(input, buffer))),
            _ => bail!(USAGE),
        }
    }

    fn options(&self) -> AnalyzerOptions {
        AnalyzerOptions {
            report_faults: self.report_faults,
        }
    }
}

fn main() -> ExitCode {
    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(err) => {
            // --help and --version arrive here too, on stdout
            let printed = err.print();
            return if err.use_stderr() || printed.is_err() {
                ExitCode::FAILURE
            } else {
                ExitCode::SUCCESS
            };
        }
    };

    init_tracing(cli.verbose);

    match execute(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("error: {err:#}");
            ExitCode::FAILURE
        }
    }
}

fn init_tracing(verbose: bool) {
    let default_directive = if verbose { "debug" } else { "warn" };
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_directive));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .with_ansi(false)
        .init();
}

fn execute(cli: Cli) -> Result<()> {
    let mode = cli.mode()?;
    let options = cli.options();
    let mut output = BufWriter::new(io::stdout().lock());

    match mode {
        Mode::OneShot(request) => run_request(&request, &options, &mut output)?,
        Mode::Server => {
            let served = serve(io::stdin().lock(), &mut output, &options)
                .context("server stopped")?;
            debug!(served, "server finished");
        }
    }

    Ok(())
}
