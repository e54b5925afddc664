use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "dcopf", author, version, about = "Seasonal DC-OPF scenario runner", long_about = None)]
pub struct Cli {
    /// Set the logging level
    #[arg(long, default_value = "info", global = true)]
    pub log_level: tracing::Level,

    /// TOML run configuration; command-line flags override its values
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Run every scenario over the season schedule and write annual results
    Run {
        #[command(flatten)]
        data: DataArgs,

        #[command(flatten)]
        engine: EngineArgs,

        /// Scenario file (`scenarios_parameters.csv`, YAML or JSON)
        #[arg(long)]
        scenarios: Option<PathBuf>,

        /// Parallel scenario workers (0 = all cores, 1 = sequential)
        #[arg(long)]
        threads: Option<usize>,
    },
    /// Solve one season of the master tables with every unit at its own bus
    Solve {
        #[command(flatten)]
        data: DataArgs,

        #[command(flatten)]
        engine: EngineArgs,

        /// Season label to slice from the master tables
        #[arg(long)]
        season: String,

        /// Demand multiplier
        #[arg(long, default_value_t = 1.0)]
        load_factor: f64,
    },
    /// Load the master tables (and optionally a scenario file) and report counts
    Validate {
        #[command(flatten)]
        data: DataArgs,

        /// Scenario file to check against the asset catalog
        #[arg(long)]
        scenarios: Option<PathBuf>,
    },
}

/// Input and output locations.
#[derive(Args, Debug, Clone, Default)]
pub struct DataArgs {
    /// Directory holding bus.csv, branch.csv, master_gen.csv and master_load.csv
    #[arg(long)]
    pub data_dir: Option<PathBuf>,

    /// Directory receiving result tables
    #[arg(long)]
    pub out: Option<PathBuf>,
}

/// Engine settings shared by `run` and `solve`.
#[derive(Args, Debug, Clone, Default)]
pub struct EngineArgs {
    /// LP backend (clarabel, highs)
    #[arg(long)]
    pub lp_solver: Option<String>,

    /// End-of-horizon storage rule (pinned, at_least_initial, free)
    #[arg(long)]
    pub terminal_storage: Option<String>,

    /// Bus whose voltage angle is fixed at zero
    #[arg(long)]
    pub slack_bus: Option<usize>,

    /// Time step length in hours
    #[arg(long)]
    pub delta_t: Option<f64>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn cli_definition_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn run_flags_parse() {
        let cli = Cli::try_parse_from([
            "dcopf",
            "--log-level",
            "debug",
            "run",
            "--data-dir",
            "data",
            "--threads",
            "4",
            "--terminal-storage",
            "free",
        ])
        .unwrap();
        assert_eq!(cli.log_level, tracing::Level::DEBUG);
        match cli.command {
            Commands::Run {
                data,
                engine,
                threads,
                scenarios,
            } => {
                assert_eq!(data.data_dir, Some(PathBuf::from("data")));
                assert_eq!(threads, Some(4));
                assert_eq!(engine.terminal_storage.as_deref(), Some("free"));
                assert!(scenarios.is_none());
            }
            other => panic!("unexpected command {:?}", other),
        }
    }

    #[test]
    fn solve_requires_season() {
        assert!(Cli::try_parse_from(["dcopf", "solve"]).is_err());
    }
}
