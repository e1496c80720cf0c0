mod error;

use std::path::{Path, PathBuf};

use clap::{Args, Parser, Subcommand};
use serde::Serialize;
use tracing::debug;
use tracing_subscriber::EnvFilter;

use pd_bench::{
    Scenario, default_scenarios, find_scenario, load_scenarios, run_scenario, write_summary,
};
use pd_core::Timer;
use pd_sim::{
    CompartmentModel, GridSpec, LogisticGrowth, NamedValues, ParameterSet, RunRequest, SimOptions,
    SimProgress, Sir, Trajectory, run_sim, run_sim_with_progress,
};

use crate::error::{CliError, CliResult};

#[derive(Parser)]
#[command(name = "pd-cli")]
#[command(about = "popdyn CLI - compartmental population and epidemic models", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run a single simulation
    #[command(subcommand)]
    Run(RunCommands),
    /// Run a named scenario repeatedly and save a JSON summary
    Scenario {
        /// Worker identifier, used in the output file name
        worker_id: String,
        /// Scenario id (see `scenarios`)
        scenario: String,
        /// Number of runs
        #[arg(short = 'n', long, default_value_t = 20)]
        iterations: usize,
        /// Scenario file (YAML or JSON) instead of the built-in set
        #[arg(long)]
        file: Option<PathBuf>,
        /// Directory the summary is written to
        #[arg(long, default_value = ".")]
        out_dir: PathBuf,
    },
    /// List available scenarios
    Scenarios {
        /// Scenario file (YAML or JSON) instead of the built-in set
        #[arg(long)]
        file: Option<PathBuf>,
    },
    /// Check that the models run with default arguments
    Verify,
}

#[derive(Subcommand)]
enum RunCommands {
    /// Logistic population growth
    Logistic(RunArgs),
    /// SIR epidemic
    Sir(RunArgs),
}

#[derive(Args)]
struct RunArgs {
    /// Start time (defaults to the model's grid)
    #[arg(long, allow_negative_numbers = true)]
    start: Option<f64>,
    /// Final time (defaults to the model's grid)
    #[arg(long, allow_negative_numbers = true)]
    end: Option<f64>,
    /// Time step (defaults to the model's grid)
    #[arg(long)]
    dt: Option<f64>,
    /// Parameter override, e.g. `--set growth_rate=0.05` (repeatable)
    #[arg(long = "set", value_name = "NAME=VALUE", value_parser = parse_assignment)]
    set: Vec<(String, f64)>,
    /// Initial compartment override, e.g. `--init infected=5` (repeatable)
    #[arg(long = "init", value_name = "NAME=VALUE", value_parser = parse_assignment)]
    init: Vec<(String, f64)>,
    /// Export the trajectory (.json or .csv)
    #[arg(short, long)]
    output: Option<PathBuf>,
}

fn parse_assignment(s: &str) -> Result<(String, f64), String> {
    let (name, value) = s
        .split_once('=')
        .ok_or_else(|| format!("expected NAME=VALUE, got '{s}'"))?;
    let value: f64 = value
        .trim()
        .parse()
        .map_err(|e| format!("invalid value for '{name}': {e}"))?;
    Ok((name.trim().to_string(), value))
}

fn main() -> CliResult<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Run(run_cmd) => match run_cmd {
            RunCommands::Logistic(args) => cmd_run(&LogisticGrowth::default(), &args),
            RunCommands::Sir(args) => cmd_run(&Sir::default(), &args),
        },
        Commands::Scenario {
            worker_id,
            scenario,
            iterations,
            file,
            out_dir,
        } => cmd_scenario(&worker_id, &scenario, iterations, file.as_deref(), &out_dir),
        Commands::Scenarios { file } => cmd_scenarios(file.as_deref()),
        Commands::Verify => cmd_verify(),
    }
}

fn build_request<M: CompartmentModel>(model: &M, args: &RunArgs) -> RunRequest {
    let grid = match model.default_grid() {
        GridSpec::Uniform { start, end, step } => GridSpec::Uniform {
            start: args.start.unwrap_or(start),
            end: args.end.unwrap_or(end),
            step: args.dt.unwrap_or(step),
        },
        explicit => explicit,
    };
    let mut request = RunRequest::new(grid);
    request.parameters.extend(args.set.iter().cloned());
    request.initial.extend(args.init.iter().cloned());
    request
}

fn cmd_run<M>(model: &M, args: &RunArgs) -> CliResult<()>
where
    M: CompartmentModel,
    M::State: Serialize,
    M::Derived: Serialize,
{
    let request = build_request(model, args);
    println!("Running {} model: {}", M::NAME, M::DESCRIPTION);
    if let GridSpec::Uniform { start, end, step } = &request.grid {
        println!("  t = {start} .. {end}, dt = {step}");
    }

    let params = model.defaults().merged(&request.parameters, M::NAME)?;
    println!("\nParameters:");
    for line in parameter_lines(&params) {
        println!("{line}");
    }
    println!();

    let mut on_progress = |p: SimProgress| {
        debug!(
            step = p.step,
            time = p.time,
            fraction = p.fraction_complete(),
            "progress"
        )
    };

    let timer = Timer::start("run");
    let trajectory =
        run_sim_with_progress(model, &request, &SimOptions::default(), Some(&mut on_progress))?;
    let elapsed_ms = timer.stop() * 1000.0;

    println!("✓ Simulation completed in {elapsed_ms:.3} ms");
    print_trajectory_summary(&trajectory);

    if let Some(path) = &args.output {
        export_trajectory(&trajectory, path)?;
        println!("Trajectory saved to: {}", path.display());
    }
    Ok(())
}

fn parameter_lines<P: ParameterSet>(params: &P) -> Vec<String> {
    params
        .values()
        .into_iter()
        .map(|(name, value)| match P::unit(name) {
            Some(unit) => format!("  {name} = {value} ({unit})"),
            None => format!("  {name} = {value}"),
        })
        .collect()
}

fn print_trajectory_summary<S: NamedValues, D: NamedValues>(trajectory: &Trajectory<S, D>) {
    let first = trajectory.first();
    let last = trajectory.last();
    println!("  Time points: {}", trajectory.len());
    println!("  Time range:  {} .. {}", first.time, last.time);
    if trajectory.clamped_steps() > 0 {
        println!("  Clamped steps: {}", trajectory.clamped_steps());
    }

    println!("\nFinal state:");
    for (name, value) in last.state.values() {
        println!("  {name}: {value:.3}");
    }

    println!("\nPeaks:");
    for name in trajectory.names() {
        if let Some(peak) = trajectory.max_of(name) {
            println!("  {name}: {:.3} at t = {}", peak.value, peak.time);
        }
    }
}

fn export_trajectory<S, D>(trajectory: &Trajectory<S, D>, path: &Path) -> CliResult<()>
where
    S: NamedValues + Serialize,
    D: NamedValues + Serialize,
{
    let content = match path.extension().and_then(|e| e.to_str()) {
        Some("json") => serde_json::to_string_pretty(trajectory)?,
        Some("csv") => trajectory_csv(trajectory),
        _ => return Err(CliError::UnsupportedOutput(path.to_path_buf())),
    };
    std::fs::write(path, content).map_err(|source| CliError::Write {
        path: path.to_path_buf(),
        source,
    })
}

fn trajectory_csv<S: NamedValues, D: NamedValues>(trajectory: &Trajectory<S, D>) -> String {
    let names: Vec<_> = trajectory.names().collect();
    let mut out = String::from("time");
    for name in &names {
        out.push(',');
        out.push_str(name);
    }
    out.push('\n');

    for record in trajectory {
        out.push_str(&record.time.to_string());
        for name in &names {
            out.push_str(&format!(",{}", record.value(name).unwrap_or(f64::NAN)));
        }
        out.push('\n');
    }
    out
}

fn scenario_set(file: Option<&Path>) -> CliResult<Vec<Scenario>> {
    Ok(match file {
        Some(path) => load_scenarios(path)?,
        None => default_scenarios(),
    })
}

fn cmd_scenario(
    worker_id: &str,
    scenario_id: &str,
    iterations: usize,
    file: Option<&Path>,
    out_dir: &Path,
) -> CliResult<()> {
    let scenarios = scenario_set(file)?;
    let scenario = find_scenario(&scenarios, scenario_id)?;

    let summary = run_scenario(scenario, iterations, worker_id)?;

    println!(
        "✓ Completed {} iterations in {:.2}s",
        summary.iterations, summary.total_time_seconds
    );
    println!("  Average time per iteration: {:.2}ms", summary.avg_time_ms);
    println!(
        "  Average final {}: {:.0}",
        summary.report.final_of, summary.avg_final_value
    );

    let path = write_summary(out_dir, &summary)?;
    println!("\nResults saved to: {}", path.display());
    Ok(())
}

fn cmd_scenarios(file: Option<&Path>) -> CliResult<()> {
    let scenarios = scenario_set(file)?;
    if scenarios.is_empty() {
        println!("No scenarios found");
        return Ok(());
    }

    println!("Scenarios:");
    for s in &scenarios {
        let overrides: Vec<String> = s
            .parameters
            .iter()
            .chain(s.initial.iter())
            .map(|(k, v)| format!("{k}={v}"))
            .collect();
        println!(
            "  {:<14} {:<8} {}{}",
            s.id,
            s.model.name(),
            s.name,
            if overrides.is_empty() {
                String::new()
            } else {
                format!(" ({})", overrides.join(", "))
            }
        );
    }
    Ok(())
}

/// Run a model over its default grid and check the basic invariants.
fn check_model<M: CompartmentModel>(model: &M) -> Result<usize, String> {
    let trajectory = run_sim(model, &RunRequest::for_model(model)).map_err(|e| e.to_string())?;
    if trajectory.is_empty() {
        return Err("empty trajectory".to_string());
    }
    for record in &trajectory {
        for (name, value) in record.state.values() {
            if !value.is_finite() || value < 0.0 {
                return Err(format!("{name} = {value} at t = {}", record.time));
            }
        }
    }
    Ok(trajectory.len())
}

fn cmd_verify() -> CliResult<()> {
    let rule = "=".repeat(50);
    println!("{rule}");
    println!("popdyn Environment Verification");
    println!("{rule}");
    println!("✓ pd-cli version: {}", env!("CARGO_PKG_VERSION"));
    println!("✓ pd-sim version: {}", pd_sim::VERSION);
    println!("✓ pd-bench version: {}", pd_bench::VERSION);

    let checks = [
        (LogisticGrowth::NAME, check_model(&LogisticGrowth::default())),
        (Sir::NAME, check_model(&Sir::default())),
    ];
    let mut failures = 0;
    for (name, outcome) in &checks {
        match outcome {
            Ok(points) => println!("✓ {name} model: {points} time points"),
            Err(e) => {
                failures += 1;
                println!("✗ {name} model failed: {e}");
            }
        }
    }

    println!("\n{rule}");
    println!("Environment Information");
    println!("{rule}");
    println!(
        "Platform: {} ({})",
        std::env::consts::OS,
        std::env::consts::ARCH
    );
    if let Ok(exe) = std::env::current_exe() {
        println!("Executable: {}", exe.display());
    }

    if failures > 0 {
        return Err(CliError::VerifyFailed(failures));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn assignment_parsing() {
        assert_eq!(
            parse_assignment("growth_rate=0.05"),
            Ok(("growth_rate".to_string(), 0.05))
        );
        assert_eq!(
            parse_assignment(" infected = 3 "),
            Ok(("infected".to_string(), 3.0))
        );
        assert!(parse_assignment("growth_rate").is_err());
        assert!(parse_assignment("growth_rate=fast").is_err());
    }

    #[test]
    fn cli_parses_run_overrides() {
        let cli = Cli::try_parse_from([
            "pd-cli", "run", "sir", "--end", "30", "--set", "contact_rate=20", "--init",
            "infected=4",
        ])
        .unwrap();
        let Commands::Run(RunCommands::Sir(args)) = cli.command else {
            panic!("expected run sir");
        };

        let request = build_request(&Sir::default(), &args);
        assert_eq!(request.grid, GridSpec::uniform(0.0, 30.0, 0.125));
        assert_eq!(request.parameters.get("contact_rate"), Some(&20.0));
        assert_eq!(request.initial.get("infected"), Some(&4.0));
    }

    #[test]
    fn scenario_defaults() {
        let cli = Cli::try_parse_from(["pd-cli", "scenario", "c1", "baseline"]).unwrap();
        let Commands::Scenario {
            worker_id,
            scenario,
            iterations,
            file,
            out_dir,
        } = cli.command
        else {
            panic!("expected scenario");
        };
        assert_eq!(worker_id, "c1");
        assert_eq!(scenario, "baseline");
        assert_eq!(iterations, 20);
        assert!(file.is_none());
        assert_eq!(out_dir, PathBuf::from("."));
    }

    #[test]
    fn csv_has_header_and_one_row_per_point() {
        let model = LogisticGrowth::default();
        let trajectory = run_sim(&model, &RunRequest::uniform(0.0, 2.0, 1.0)).unwrap();
        let csv = trajectory_csv(&trajectory);
        let lines: Vec<_> = csv.lines().collect();
        assert_eq!(lines[0], "time,population,growth_rate,carrying_capacity");
        assert_eq!(lines.len(), 4);
        assert!(lines[1].starts_with("0,1000,"));
    }

    #[test]
    fn parameters_echo_with_units() {
        let params = Sir::default()
            .defaults()
            .merged(&[("contact_rate".to_string(), 40.0)].into(), Sir::NAME)
            .unwrap();
        let lines = parameter_lines(&params);
        assert_eq!(
            lines,
            vec![
                "  contact_rate = 40 (1/Day)",
                "  infectivity = 0.015 (Dimensionless)",
                "  recovery_time = 5 (Day)",
                "  total_population = 1000 (Person)",
            ]
        );
    }

    #[test]
    fn default_models_verify() {
        assert_eq!(check_model(&LogisticGrowth::default()), Ok(1001));
        assert_eq!(check_model(&Sir::default()), Ok(481));
    }
}
