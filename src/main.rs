use std::io::{self, BufWriter, Write};
use std::process;

use clap::error::ErrorKind;
use clap::{ArgAction, CommandFactory, Parser};
use color_eyre::eyre::{Report, Result};
use log::LevelFilter;
use simple_logger::SimpleLogger;

use wirecpu::memory::Memory;
use wirecpu::processor::wires::WireConfig;
use wirecpu::processor::{Processor, RunOutcome};

/// Exit status for load and execution failures
const EXIT_FAILURE: i32 = 2;
/// Exit status when the cycle budget runs out
const EXIT_BUDGET_EXHAUSTED: i32 = 3;

/// Runs a program on the wire-gated 16 bit processor and dumps the final state
#[derive(Parser, Debug)]
#[command(name = "wirecpu", version)]
struct Args {
    /// Program to execute
    #[arg(short, long, value_name = "FILE")]
    file: Option<String>,

    /// Program to execute, used when --file is not given
    #[arg(value_name = "PROGRAM")]
    programs: Vec<String>,

    /// Wire gates, one character per wire; `0` cuts the wire
    #[arg(short, long, value_name = "BITMASK", default_value = "")]
    config: String,

    /// Stop after this many cycles
    #[arg(short, long, value_name = "CYCLES")]
    max_cycles: Option<u64>,

    /// Increase log verbosity (-v info, -vv debug, -vvv trace)
    #[arg(short, long, action = ArgAction::Count)]
    verbose: u8,
}

impl Args {
    /// Program path from `--file`, falling back to the first positional
    /// argument when the option is missing or empty
    fn program(&self) -> Result<&str, clap::Error> {
        self.file
            .as_deref()
            .filter(|path| !path.is_empty())
            .or_else(|| self.programs.first().map(String::as_str))
            .filter(|path| !path.is_empty())
            .ok_or_else(|| {
                Args::command().error(
                    ErrorKind::MissingRequiredArgument,
                    "Program to execute not specified.",
                )
            })
    }

    fn log_level(&self) -> LevelFilter {
        match self.verbose {
            0 => LevelFilter::Warn,
            1 => LevelFilter::Info,
            2 => LevelFilter::Debug,
            _ => LevelFilter::Trace,
        }
    }
}

/// Exit status for a finished run
fn exit_status(outcome: RunOutcome) -> i32 {
    match outcome {
        RunOutcome::Halted { .. } => 0,
        RunOutcome::BudgetExhausted { .. } => EXIT_BUDGET_EXHAUSTED,
    }
}

fn fail(report: Report) -> ! {
    eprintln!("Error: {:?}", report);
    process::exit(EXIT_FAILURE)
}

fn main() -> Result<()> {
    color_eyre::install()?; // rust error handling
    let args = Args::parse();
    SimpleLogger::new().with_level(args.log_level()).init()?; // logging

    let path = args.program().unwrap_or_else(|err| err.exit());

    let config: WireConfig = args.config.parse()?;
    log::info!("Wire gates: {}", config);

    let mut memory = Memory::from_file(path).unwrap_or_else(|report| fail(report));
    let mut cpu = Processor::new(config);

    let outcome = cpu
        .run_with_budget(&mut memory, args.max_cycles)
        .unwrap_or_else(|report| fail(report));

    let stdout = io::stdout();
    let mut out = BufWriter::new(stdout.lock());
    cpu.dump(&memory, &mut out)?;
    out.flush()?;

    if let RunOutcome::BudgetExhausted { cycles } = outcome {
        eprintln!("Cycle budget exhausted after {} cycles", cycles);
        process::exit(exit_status(outcome));
    }

    Ok(())
}
