//! # Margin CLI
//!
//! Entry point: logging, configuration, argument parsing, report output.
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  stdin / --input ──► margin-core ──► JSON report ──► stdout            │
//! │                                                                         │
//! │  logs ──► stderr  (stdout stays machine-readable)                      │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use std::env;

use margin_cli::{parse_args, run, CliConfig, Command, USAGE};
use tracing::info;
use tracing_subscriber::EnvFilter;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Load configuration
    let config = CliConfig::load()?;

    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_new(&config.log_filter)?)
        .with_target(true)
        .with_writer(std::io::stderr)
        .init();

    let args = match parse_args(env::args().skip(1))? {
        Command::Help => {
            println!("{USAGE}");
            return Ok(());
        }
        Command::Run(args) => args,
    };

    info!(
        default_tier = %config.default_tier,
        max_iterations = config.solver.max_iterations,
        "Configuration loaded"
    );

    let report = run(&args, config)?;
    println!("{report}");

    Ok(())
}
