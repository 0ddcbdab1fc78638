use std::path::PathBuf;

use anyhow::{Context, bail};
use clap::Parser;
use coast_propagator::config::load_scenario;
use coast_propagator::core::LogSink;
use coast_propagator::export::{sample_solution, write_csv, write_json, writer_for_path};
use coast_propagator::scenario::run_scenario;

/// Propagate a coast scenario and optionally export the sampled trajectory.
#[derive(Parser, Debug)]
#[command(author, version, about = "Vacuum-coast scenario runner")]
struct Cli {
    /// Scenario file (.yaml/.yml or .toml)
    scenario: PathBuf,

    /// Write sampled trajectory as CSV (`-` for stdout)
    #[arg(long)]
    csv: Option<PathBuf>,

    /// Write sampled trajectory as JSON (`-` for stdout)
    #[arg(long)]
    json: Option<PathBuf>,

    /// Sampling step for exports, in scenario time units
    #[arg(long, default_value_t = 0.1)]
    step: f64,
}

fn main() -> anyhow::Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    let cli = Cli::parse();
    if cli.csv.as_deref() == Some(std::path::Path::new("-"))
        && cli.json.as_deref() == Some(std::path::Path::new("-"))
    {
        bail!("only one of --csv and --json may write to stdout");
    }

    let scenario = load_scenario(&cli.scenario)
        .with_context(|| format!("loading scenario {}", cli.scenario.display()))?;
    let run = run_scenario(&scenario, LogSink::forward_to_log(log::Level::Warn))?;

    let y = run.final_state;
    println!("scenario: {}", run.name);
    println!("segments: {}", run.solution.len());
    if let Some(tf) = run.solution.tf() {
        println!("tf: {tf}");
    }
    println!("r: {}", y.r);
    println!("v: {}", y.v);
    println!("pv: {}", y.pv);
    println!("pr: {}", y.pr);

    if cli.csv.is_some() || cli.json.is_some() {
        let rows = sample_solution(&run.solution, cli.step)?;
        if let Some(path) = &cli.csv {
            write_csv(writer_for_path(path)?, &rows)
                .with_context(|| format!("writing {}", path.display()))?;
            log::info!("wrote {} rows to {}", rows.len(), path.display());
        }
        if let Some(path) = &cli.json {
            write_json(writer_for_path(path)?, &rows)
                .with_context(|| format!("writing {}", path.display()))?;
            log::info!("wrote {} rows to {}", rows.len(), path.display());
        }
    }
    Ok(())
}
