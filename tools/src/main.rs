//! lobster-runner: headless runner for the lobster fishery simulation.
//!
//! Usage:
//!   lobster-runner --seed 12345 --config data/scenario.json
//!   lobster-runner --seed 12345 --ticks 244 --metrics-out metrics.json
//!   lobster-runner --seed 12345 --ipc-mode

use anyhow::Result;
use lobster_core::{
    metrics::{MetricsCollector, SERIES_NAMES},
    scheduler::ActivationPolicy,
    snapshot::WorldSnapshot,
    SimConfig, World,
};
use std::env;
use std::io::{self, BufRead, Write};

#[derive(serde::Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
enum IpcCommand {
    GetState,
    Step {
        #[serde(default = "one")]
        count: u64,
    },
    Quit,
}

fn one() -> u64 {
    1
}

#[derive(serde::Serialize)]
struct MetricsExport<'a> {
    run_id: &'a str,
    seed: u64,
    exported_at: String,
    config: &'a SimConfig,
    series: Vec<NamedSeries>,
    samples: &'a MetricsCollector,
}

#[derive(serde::Serialize)]
struct NamedSeries {
    name: &'static str,
    values: Vec<u64>,
}

fn main() -> Result<()> {
    env_logger::init();

    let args: Vec<String> = env::args().collect();
    let seed = parse_arg(&args, "--seed", 42u64);
    let ipc_mode = args.iter().any(|a| a == "--ipc-mode");
    let config_path = string_arg(&args, "--config");
    let metrics_out = string_arg(&args, "--metrics-out");

    let mut config = match config_path {
        Some(path) => SimConfig::load(path)?,
        None => SimConfig::default(),
    };
    if let Some(ticks) = string_arg(&args, "--ticks").and_then(|t| t.parse().ok()) {
        config.sim_length = ticks;
    }
    if args.iter().any(|a| a == "--snapshot-commit") {
        config.activation = ActivationPolicy::SnapshotCommit;
    }

    if !ipc_mode {
        println!("lobster-runner: lobster fishery simulation");
        println!("  seed:       {seed}");
        println!("  grid:       {}x{}", config.width, config.height);
        println!("  lobsters:   {}", config.num_lobsters);
        println!("  boats:      {}", config.num_boats);
        println!("  density:    {}", config.density);
        println!("  ticks:      {}", config.sim_length);
        println!("  activation: {:?}", config.activation);
        println!();
    }

    let run_id = format!("run-{seed}-{}", chrono::Utc::now().format("%Y%m%dT%H%M%S"));
    let mut world = World::new(run_id, config, seed)?;

    if ipc_mode {
        run_ipc_loop(&mut world)?;
    } else {
        world.run_to_end()?;
        print_summary(&world);
    }

    if let Some(path) = metrics_out {
        export_metrics(&world, path)?;
        if !ipc_mode {
            println!();
            println!("  metrics written to {path}");
        }
    }

    Ok(())
}

fn run_ipc_loop(world: &mut World) -> Result<()> {
    let stdin = io::stdin();
    let mut stdout = io::stdout();
    let mut handle = stdin.lock();
    let mut buffer = String::new();

    loop {
        buffer.clear();
        let bytes_read = handle.read_line(&mut buffer)?;
        if bytes_read == 0 {
            break; // EOF
        }

        let cmd: IpcCommand = match serde_json::from_str(&buffer) {
            Ok(c) => c,
            Err(e) => {
                let err_json = serde_json::json!({ "error": e.to_string() });
                writeln!(stdout, "{}", err_json)?;
                stdout.flush()?;
                continue;
            }
        };

        match cmd {
            IpcCommand::Quit => break,
            IpcCommand::Step { count } => {
                world.run_ticks(count)?;
                write_state(&mut stdout, &world.snapshot())?;
            }
            IpcCommand::GetState => {
                write_state(&mut stdout, &world.snapshot())?;
            }
        }
        stdout.flush()?;
    }
    Ok(())
}

fn write_state(out: &mut impl Write, snapshot: &WorldSnapshot) -> Result<()> {
    writeln!(out, "{}", serde_json::to_string(snapshot)?)?;
    Ok(())
}

fn export_metrics(world: &World, path: &str) -> Result<()> {
    let metrics = world.metrics();
    let series = SERIES_NAMES
        .iter()
        .map(|&name| NamedSeries {
            name,
            values: metrics.series(name).unwrap_or_default(),
        })
        .collect();
    let export = MetricsExport {
        run_id: &world.run_id,
        seed: world.seed(),
        exported_at: chrono::Utc::now().to_rfc3339(),
        config: world.config(),
        series,
        samples: metrics,
    };
    std::fs::write(path, serde_json::to_string_pretty(&export)?)
        .map_err(|e| anyhow::anyhow!("Cannot write {path}: {e}"))?;
    log::info!("metrics for {} written to {path}", world.run_id);
    Ok(())
}

fn print_summary(world: &World) {
    let census = world.census();
    let fleet = world.fleet_mix();
    let landings = world.landings();

    println!("=== RUN SUMMARY ===");
    println!("  run_id:          {}", world.run_id);
    println!("  final tick:      {}", world.tick());
    println!("  lobsters left:   {}", world.live_lobsters());
    println!("  lobsters caught: {}", census.caught);
    println!("  fleet:           {} small, {} big", fleet.small, fleet.big);
    println!("  boats searching: {}", census.searching);
    println!("  boats returning: {}", census.returning);
    println!("  boats docked:    {}", census.docked);

    println!();
    println!("=== LANDINGS ===");
    println!("  big boats:   {}", landings.big);
    println!("  small boats: {}", landings.small);
    println!("  total:       {}", landings.total());
}

fn parse_arg<T: std::str::FromStr + Copy>(args: &[String], flag: &str, default: T) -> T {
    args.windows(2)
        .find(|w| w[0] == flag)
        .and_then(|w| w[1].parse().ok())
        .unwrap_or(default)
}

fn string_arg<'a>(args: &'a [String], flag: &str) -> Option<&'a str> {
    args.windows(2)
        .find(|w| w[0] == flag)
        .map(|w| w[1].as_str())
}
