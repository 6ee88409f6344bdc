//! Robot Arena CLI
//!
//! Runs arena scenarios headless, optionally from or to an arena file.

use clap::Parser;
use robot_arena_core::TeleportPolicy;
use robot_arena_sim::scenarios::ScenarioId;
use robot_arena_sim::{ScenarioResult, ScenarioRunner, SimConfig, SimError};
use std::path::PathBuf;
use std::process::ExitCode;
use tracing::{error, info, Level};
use tracing_subscriber::{EnvFilter, FmtSubscriber};

/// Robot Arena simulation CLI
#[derive(Parser, Debug)]
#[command(name = "robot-arena")]
#[command(about = "Run robot arena scenarios headless", long_about = None)]
struct Args {
    /// Master seed (0 = random from time)
    #[arg(short, long)]
    seed: Option<u64>,

    /// Scenario to run (default, whisker_maze, beam_maze, black_hole_sweep, teleport_field, crowd, all)
    #[arg(short = 'S', long)]
    scenario: Option<String>,

    /// Ticks to run per scenario
    #[arg(short, long)]
    ticks: Option<u64>,

    /// JSON config file; flags override its values
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Teleport handling in the collision pass (dedicated, reference)
    #[arg(long)]
    policy: Option<TeleportPolicy>,

    /// Start from an arena file instead of the scenario layout
    #[arg(long)]
    load: Option<PathBuf>,

    /// Write the final arena to a file
    #[arg(long)]
    save: Option<PathBuf>,

    /// Export frames to a JSON file
    #[arg(long)]
    export: Option<PathBuf>,

    /// Verbose output
    #[arg(short, long)]
    verbose: bool,

    /// JSON output for CI parsing
    #[arg(long)]
    json: bool,
}

fn main() -> ExitCode {
    let args = Args::parse();

    // Initialize logging
    let level = if args.verbose { Level::DEBUG } else { Level::INFO };
    let installed = if std::env::var_os("RUST_LOG").is_some() {
        tracing::subscriber::set_global_default(
            FmtSubscriber::builder()
                .with_env_filter(EnvFilter::from_default_env())
                .finish(),
        )
    } else {
        tracing::subscriber::set_global_default(FmtSubscriber::builder().with_max_level(level).finish())
    };
    if let Err(e) = installed {
        eprintln!("Failed to set tracing subscriber: {}", e);
    }

    match run(&args) {
        Ok(true) => ExitCode::SUCCESS,
        Ok(false) => ExitCode::FAILURE,
        Err(e) => {
            error!("{}", e);
            ExitCode::FAILURE
        }
    }
}

/// Merges the config file and flags.
fn resolve_config(args: &Args) -> Result<SimConfig, SimError> {
    let mut config = match &args.config {
        Some(path) => SimConfig::from_file(path)?,
        None => SimConfig::default(),
    };

    if let Some(seed) = args.seed {
        config.seed = seed;
    }
    if let Some(scenario) = &args.scenario {
        config.scenario = scenario.clone();
    }
    if let Some(ticks) = args.ticks {
        config.ticks = ticks;
    }
    if let Some(policy) = args.policy {
        config.teleport_policy = policy;
    }

    if config.seed == 0 {
        config.seed = std::time::SystemTime::now()
            .duration_since(std::time::UNIX_EPOCH)
            .map(|d| d.as_nanos() as u64)
            .unwrap_or(42);
    }
    Ok(config)
}

fn parse_scenarios(name: &str) -> Result<Vec<ScenarioId>, SimError> {
    if name == "all" {
        return Ok(ScenarioId::all());
    }
    name.parse()
        .map(|s| vec![s])
        .map_err(|_| SimError::UnknownScenario(name.to_string()))
}

/// Runs everything the flags ask for. Returns whether all runs passed.
fn run(args: &Args) -> Result<bool, SimError> {
    let config = resolve_config(args)?;
    let scenarios = parse_scenarios(&config.scenario)?;
    let single_run = args.load.is_some() || args.save.is_some() || args.export.is_some();

    if single_run && scenarios.len() > 1 {
        error!("--load, --save and --export only support a single scenario, not 'all'");
        return Ok(false);
    }

    if !args.json {
        info!("Robot Arena v{}", env!("CARGO_PKG_VERSION"));
        info!("━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━");
    }

    let runner = ScenarioRunner::from_config(&config);
    let mut results: Vec<ScenarioResult> = Vec::new();

    if single_run {
        let scenario = scenarios[0];
        let mut world = runner.build_world(scenario);

        if let Some(path) = &args.load {
            let outcome = world.load(path)?;
            info!("Loaded {} entities ({} skipped)", outcome.loaded, outcome.skipped.len());
        }

        let result = match &args.export {
            Some(path) => {
                let mut export = robot_arena_sim::SimExport::new(scenario.name(), config.seed);
                let result = runner.run_world(scenario, &mut world, Some(&mut export));
                export.finalize(result.passed);
                export.write_to_file(path).map_err(|e| SimError::io(path, e))?;
                info!("Exported {} frames to {}", export.frames.len(), path.display());
                result
            }
            None => runner.run_world(scenario, &mut world, None),
        };

        if let Some(path) = &args.save {
            world.save(path)?;
        }
        if !args.json {
            info!("{}", world.summary());
        }
        results.push(result);
    } else {
        for scenario in &scenarios {
            results.push(runner.run(*scenario));
        }
    }

    report(&results, args.json);
    Ok(results.iter().all(|r| r.passed))
}

fn report(results: &[ScenarioResult], json: bool) {
    let failed = results.iter().filter(|r| !r.passed).count();

    if json {
        let summary = serde_json::json!({
            "total": results.len(),
            "passed": results.len() - failed,
            "failed": failed,
            "results": results.iter().map(|r| {
                serde_json::json!({
                    "scenario": r.scenario.name(),
                    "seed": r.seed,
                    "passed": r.passed,
                    "ticks": r.total_ticks,
                    "entities": r.final_entity_count,
                    "absorbed": r.metrics.absorbed,
                    "teleports": r.metrics.teleports,
                    "collisions": r.metrics.collisions,
                    "failure_reason": r.failure_reason,
                })
            }).collect::<Vec<_>>(),
        });
        println!("{:#}", summary);
        return;
    }

    for r in results {
        if r.passed {
            info!(
                "✓ {} (seed={}) PASSED | entities={} absorbed={} teleports={} collisions={}",
                r.scenario.name(),
                r.seed,
                r.final_entity_count,
                r.metrics.absorbed,
                r.metrics.teleports,
                r.metrics.collisions
            );
        } else {
            error!(
                "✗ {} (seed={}) FAILED: {}",
                r.scenario.name(),
                r.seed,
                r.failure_reason.as_deref().unwrap_or("unknown")
            );
        }
    }

    info!("━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━");
    if failed == 0 {
        info!("All {} scenario runs passed", results.len());
    } else {
        error!("{}/{} scenario runs failed", failed, results.len());
    }
}
