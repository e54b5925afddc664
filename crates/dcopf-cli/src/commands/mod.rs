use crate::cli::{Cli, Commands};
use crate::config::RunConfig;
use anyhow::Result;

pub mod run;
pub mod solve;
pub mod validate;

/// Merge the configuration file with the command's flags and run it.
pub fn dispatch(cli: &Cli) -> Result<()> {
    let mut config = RunConfig::load_or_default(cli.config.as_deref())?;
    match &cli.command {
        Commands::Run {
            data,
            engine,
            scenarios,
            threads,
        } => {
            config.apply_data_args(data);
            config.apply_engine_args(engine);
            if let Some(path) = scenarios {
                config.scenarios = Some(path.clone());
            }
            if let Some(threads) = threads {
                config.threads = *threads;
            }
            run::handle(&config).map(|_| ())
        }
        Commands::Solve {
            data,
            engine,
            season,
            load_factor,
        } => {
            config.apply_data_args(data);
            config.apply_engine_args(engine);
            solve::handle(&config, season, *load_factor).map(|_| ())
        }
        Commands::Validate { data, scenarios } => {
            config.apply_data_args(data);
            if let Some(path) = scenarios {
                config.scenarios = Some(path.clone());
            }
            validate::handle(&config).map(|_| ())
        }
    }
}
