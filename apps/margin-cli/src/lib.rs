//! # Margin CLI
//!
//! Bulk pricing over a JSON batch of SKUs.
//!
//! ## Usage
//! ```bash
//! # Read a batch file, write the report to stdout
//! margin --input products.json
//!
//! # Read from stdin, solve every item for 12% at CM1 unless it says otherwise
//! cat products.json | margin --target 12 --tier cm1
//! ```
//!
//! ## Configuration
//! Environment variables (see [`config`]):
//! - `MARGIN_LOG` - tracing filter (default: info)
//! - `MARGIN_DEFAULT_TIER` - tier for items without one (default: cm2)
//! - `MARGIN_DEFAULT_TARGET` - target for items without one (default: unset)
//! - `MARGIN_MAX_ITERATIONS`, `MARGIN_MAX_BRACKET_EXPANSIONS`, `MARGIN_PRECISION` - solver limits
//! - `MARGIN_PRETTY` - pretty-print the report (default: true)
//!
//! Command line flags override the environment.

pub mod batch;
pub mod config;
pub mod error;

use std::fs;
use std::io::{self, Read};

use margin_core::validation::validate_target_margin;
use margin_core::Tier;
use tracing::info;

// Re-exports
pub use batch::{run_batch, BatchInput, BatchReport};
pub use config::CliConfig;
pub use error::{CliError, CliResult};

pub const USAGE: &str = "\
Margin Engine - bulk contribution margin and price report

Usage: margin [OPTIONS]

Options:
  -i, --input <PATH>     Batch file (default: - for stdin)
  -t, --target <PCT>     Target margin for items without one
      --tier <TIER>      Tier for items without one: cm0, cm1, cm2
  -h, --help             Show this help message";

/// Parsed command line.
#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    Help,
    Run(RunArgs),
}

/// Options for a batch run.
#[derive(Debug, Clone, PartialEq)]
pub struct RunArgs {
    /// `-` reads stdin.
    pub input: String,
    pub target: Option<f64>,
    pub tier: Option<Tier>,
}

impl Default for RunArgs {
    fn default() -> Self {
        Self {
            input: "-".to_string(),
            target: None,
            tier: None,
        }
    }
}

/// Parses arguments (without the program name).
pub fn parse_args<I, S>(args: I) -> CliResult<Command>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let mut run = RunArgs::default();
    let mut args = args.into_iter();

    while let Some(arg) = args.next() {
        let arg = arg.as_ref();
        match arg {
            "--help" | "-h" => return Ok(Command::Help),
            "--input" | "-i" => run.input = value_for(arg, args.next())?,
            "--target" | "-t" => {
                let raw = value_for(arg, args.next())?;
                let target = raw
                    .parse::<f64>()
                    .map_err(|_| CliError::Usage(format!("invalid target margin '{raw}'")))?;
                validate_target_margin(target).map_err(|e| CliError::Usage(e.to_string()))?;
                run.target = Some(target);
            }
            "--tier" => {
                let raw = value_for(arg, args.next())?;
                let tier = raw
                    .parse::<Tier>()
                    .map_err(|e| CliError::Usage(e.to_string()))?;
                run.tier = Some(tier);
            }
            other => return Err(CliError::Usage(format!("unexpected argument '{other}'"))),
        }
    }

    Ok(Command::Run(run))
}

fn value_for<S: AsRef<str>>(flag: &str, value: Option<S>) -> CliResult<String> {
    value
        .map(|v| v.as_ref().to_string())
        .ok_or_else(|| CliError::Usage(format!("{flag} requires a value")))
}

/// Reads the batch, evaluates it and renders the JSON report.
pub fn run(args: &RunArgs, mut config: CliConfig) -> CliResult<String> {
    if let Some(target) = args.target {
        config.default_target = Some(target);
    }
    if let Some(tier) = args.tier {
        config.default_tier = tier;
    }

    let raw = if args.input == "-" {
        let mut buf = String::new();
        io::stdin().read_to_string(&mut buf)?;
        buf
    } else {
        fs::read_to_string(&args.input)?
    };

    let input: BatchInput = serde_json::from_str(&raw)?;
    info!(input = %args.input, items = input.items.len(), "Batch loaded");

    let report = run_batch(&input, &config);

    let rendered = if config.pretty {
        serde_json::to_string_pretty(&report)?
    } else {
        serde_json::to_string(&report)?
    };
    Ok(rendered)
}
