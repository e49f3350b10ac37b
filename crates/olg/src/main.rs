use std::path::PathBuf;

use clap::{Args as ClapArgs, Parser, Subcommand};
use color_eyre::eyre::{WrapErr, eyre};
use olg::{ScenarioSource, format_outcome, format_sweep, init_logging, save_scenario};
use olg_core::analysis::{SweepProgress, sweep_equilibrium};
use olg_core::config;

#[derive(Parser, Debug)]
#[command(name = "olg")]
#[command(about = "Steady-state equilibrium solver for two-period overlapping generations economies")]
struct Args {
    /// Log level (debug, info, warn, error)
    #[arg(short, long, default_value = "info", global = true)]
    log_level: String,

    /// Append log output to this file instead of stderr
    #[arg(long, global = true)]
    log_file: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Solve a scenario for its equilibrium interest rate
    Solve(ScenarioArgs),
    /// Solve a scenario over its sweep grid
    Sweep(ScenarioArgs),
    /// List the built-in presets, optionally writing them out as YAML
    Presets {
        /// Directory to write `{name}.yaml` files into
        #[arg(short, long)]
        write: Option<PathBuf>,
    },
}

#[derive(ClapArgs, Debug)]
struct ScenarioArgs {
    /// Scenario YAML file
    #[arg(conflicts_with = "preset", required_unless_present = "preset")]
    file: Option<PathBuf>,

    /// Built-in preset to use instead of a file
    #[arg(short, long)]
    preset: Option<String>,

    /// Print JSON instead of a text report
    #[arg(long)]
    json: bool,
}

impl ScenarioArgs {
    fn source(&self) -> color_eyre::Result<ScenarioSource> {
        match (&self.file, &self.preset) {
            (Some(path), _) => Ok(ScenarioSource::File(path.clone())),
            (None, Some(name)) => Ok(ScenarioSource::Preset(name.clone())),
            (None, None) => Err(eyre!("either a scenario file or --preset is required")),
        }
    }
}

fn run_solve(args: &ScenarioArgs) -> color_eyre::Result<()> {
    let scenario = args.source()?.load()?;
    tracing::info!(name = %scenario.name, "solving scenario");

    let outcome = scenario
        .solve()
        .wrap_err_with(|| format!("failed to solve scenario '{}'", scenario.name))?;

    if args.json {
        println!("{}", serde_json::to_string_pretty(&outcome)?);
    } else {
        print!("{}", format_outcome(&outcome));
    }
    Ok(())
}

fn run_sweep(args: &ScenarioArgs) -> color_eyre::Result<()> {
    let scenario = args.source()?.load()?;
    let sweep = scenario
        .sweep
        .as_ref()
        .ok_or_else(|| eyre!("scenario '{}' has no sweep section", scenario.name))?;

    let progress = SweepProgress::new(sweep.total_points());
    tracing::info!(
        name = %scenario.name,
        points = sweep.total_points(),
        "running sweep"
    );
    let results = sweep_equilibrium(&scenario, sweep, Some(&progress))?;
    tracing::info!(
        solved = results.solved_count(),
        completed = progress.completed(),
        "sweep finished"
    );

    if args.json {
        println!("{}", serde_json::to_string_pretty(&results)?);
    } else {
        print!("{}", format_sweep(&results));
    }
    Ok(())
}

fn run_presets(write: Option<PathBuf>) -> color_eyre::Result<()> {
    for scenario in config::all_presets() {
        match &write {
            Some(dir) => {
                let path = save_scenario(dir, &scenario)?;
                println!("{}", path.display());
            }
            None => println!("{}", scenario.name),
        }
    }
    Ok(())
}

fn main() -> color_eyre::Result<()> {
    color_eyre::install()?;

    let args = Args::parse();
    init_logging(args.log_file.as_deref(), &args.log_level)?;

    match args.command {
        Command::Solve(scenario) => run_solve(&scenario),
        Command::Sweep(scenario) => run_sweep(&scenario),
        Command::Presets { write } => run_presets(write),
    }
}
