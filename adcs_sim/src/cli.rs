// adcs_sim/src/cli.rs

use clap::Parser;
use std::path::PathBuf;

/// ADCS attitude simulator for a 1U CubeSat.
///
/// This struct defines the command-line arguments accepted by the
/// `adcs_sim` binary.
#[derive(Parser, Debug, Clone)]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// The path to the scenario TOML file to run.
    #[arg(short, long, default_value = "assets/scenarios/free_rotation.toml")]
    pub scenario: PathBuf,

    /// List the scenario files under the scenario directory and exit.
    #[arg(long, default_value_t = false)]
    pub list: bool,

    /// Directory searched by `--list`.
    #[arg(long, default_value = crate::simulation::config::DEFAULT_SCENARIO_DIR)]
    pub scenario_dir: PathBuf,

    /// Write the final (or last committed) state to this TOML file.
    #[arg(short, long)]
    pub report: Option<PathBuf>,

    /// Override the scenario duration, in simulated seconds.
    #[arg(short, long)]
    pub duration: Option<f64>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_run_free_rotation() {
        let cli = Cli::parse_from(["adcs_sim"]);
        assert_eq!(cli.scenario, PathBuf::from("assets/scenarios/free_rotation.toml"));
        assert!(!cli.list);
        assert!(cli.report.is_none());
        assert!(cli.duration.is_none());
    }

    #[test]
    fn parses_overrides() {
        let cli = Cli::parse_from([
            "adcs_sim",
            "--scenario",
            "custom.toml",
            "--report",
            "out.toml",
            "--duration",
            "42.5",
        ]);
        assert_eq!(cli.scenario, PathBuf::from("custom.toml"));
        assert_eq!(cli.report, Some(PathBuf::from("out.toml")));
        assert_eq!(cli.duration, Some(42.5));
    }
}
