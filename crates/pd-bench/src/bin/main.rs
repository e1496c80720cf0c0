//! Standalone benchmark runner: every built-in scenario, several runs each.

use std::path::PathBuf;

use pd_bench::{BenchSuite, default_scenarios, run_scenario, write_suite};
use tracing_subscriber::EnvFilter;

const RUNS_PER_SCENARIO: usize = 5;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Quiet by default
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .init();

    // Repo root is two levels up from this crate
    let crate_path = PathBuf::from(env!("CARGO_MANIFEST_DIR"));
    let repo_root = crate_path
        .parent()
        .and_then(|p| p.parent())
        .ok_or("Could not determine repo root")?
        .to_path_buf();

    println!("popdyn Benchmark Suite");
    println!("======================\n");

    let scenarios = default_scenarios();
    println!(
        "Running {} scenarios, {} runs each...\n",
        scenarios.len(),
        RUNS_PER_SCENARIO
    );

    let mut summaries = Vec::new();
    for (idx, scenario) in scenarios.iter().enumerate() {
        print!("[{}/{}] {} ... ", idx + 1, scenarios.len(), scenario.name);
        std::io::Write::flush(&mut std::io::stdout())?;

        match run_scenario(scenario, RUNS_PER_SCENARIO, "bench") {
            Ok(summary) => {
                println!("OK ({:.3}ms median)", summary.median_time_ms);
                summaries.push(summary);
            }
            Err(e) => {
                println!("FAILED");
                eprintln!("  Error: {}", e);
            }
        }
    }

    println!("\n======================");
    println!("Results");
    println!("======================\n");
    for summary in &summaries {
        println!("{} ({})", summary.scenario, summary.model.name());
        println!(
            "  Run time:    {:.4}ms (median), min: {:.4}ms, max: {:.4}ms",
            summary.median_time_ms, summary.min_time_ms, summary.max_time_ms
        );
        println!(
            "  Final {}: {:.3}",
            summary.report.final_of, summary.avg_final_value
        );
        println!();
    }

    let suite = BenchSuite {
        timestamp: chrono::Utc::now().to_rfc3339(),
        summaries,
    };
    let baseline_path = repo_root.join("benchmarks").join("baseline.json");
    write_suite(&baseline_path, &suite)?;
    println!("Baseline saved to: {}", baseline_path.display());

    Ok(())
}
