// adcs_sim/src/main.rs

use std::process::ExitCode;

use adcs_sim::cli::Cli;
use adcs_sim::prelude::*;
use clap::Parser;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let cli = Cli::parse();
    match run(&cli) {
        Ok(code) => code,
        Err(e) => {
            error!(error = %e, "Simulation failed");
            ExitCode::FAILURE
        }
    }
}

fn run(cli: &Cli) -> Result<ExitCode, SimError> {
    if cli.list {
        for path in list_scenarios(&cli.scenario_dir) {
            println!("{}", path.display());
        }
        return Ok(ExitCode::SUCCESS);
    }

    let outcome = adcs_sim::run_scenario(&cli.scenario, cli.duration)?;
    let report = StateReport::from_outcome(&outcome);
    match &cli.report {
        Some(path) => report.write(path)?,
        None => info!("Final state:\n{}", report.to_toml()?),
    }

    Ok(if outcome.is_complete() {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    })
}
