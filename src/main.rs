//! Wealth Distribution - CLI Entry Point

use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};
use std::time::Instant;
use wealth_distribution::export::ExportSystem;
use wealth_distribution::{benchmark, Config, World};

#[derive(Parser)]
#[command(name = "wealth-distribution")]
#[command(version)]
#[command(about = "Agent-based wealth distribution simulator")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run a simulation and write the Gini history
    Run {
        /// Configuration file (YAML)
        #[arg(short, long, default_value = "config.yaml")]
        config: PathBuf,

        /// Gini CSV output (defaults to <config name>.csv)
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Directory for the full result set (stats, turtles, grid, summary)
        #[arg(long)]
        results: Option<PathBuf>,

        /// Write the statistics history as JSON
        #[arg(long)]
        json: Option<PathBuf>,

        /// Override the configured random seed
        #[arg(long)]
        seed: Option<u64>,

        /// Override the configured number of ticks
        #[arg(short, long)]
        ticks: Option<u64>,

        /// Quiet mode (minimal output)
        #[arg(short, long)]
        quiet: bool,
    },

    /// Set up the land and print the grain table
    Inspect {
        /// Configuration file (YAML)
        #[arg(short, long, default_value = "config.yaml")]
        config: PathBuf,
    },

    /// Run performance benchmark
    Benchmark {
        /// Number of ticks
        #[arg(short, long, default_value = "1000")]
        ticks: u64,

        /// Population size
        #[arg(short, long, default_value = "250")]
        population: usize,
    },

    /// Generate default configuration file
    Init {
        /// Output path
        #[arg(short, long, default_value = "config.yaml")]
        output: PathBuf,
    },
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Run {
            config,
            output,
            results,
            json,
            seed,
            ticks,
            quiet,
        } => run_simulation(config, output, results, json, seed, ticks, quiet),

        Commands::Inspect { config } => inspect_land(config),

        Commands::Benchmark { ticks, population } => run_benchmark(ticks, population),

        Commands::Init { output } => generate_config(output),
    }
}

fn init_logging(level: &str) {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level)).init();
}

fn load_config(path: &Path) -> Result<Config, Box<dyn std::error::Error>> {
    let config = Config::from_file(path)
        .map_err(|e| format!("{}: {}", path.display(), e))?;
    init_logging(&config.logging.log_level);
    log::info!("Loaded config from {}", path.display());
    Ok(config)
}

/// `<config stem>.csv` in the working directory
fn default_output(config_path: &Path) -> PathBuf {
    let stem = config_path
        .file_stem()
        .map(|s| s.to_string_lossy().to_string())
        .unwrap_or_else(|| "wealth".to_string());
    PathBuf::from(format!("{}.csv", stem))
}

fn run_simulation(
    config_path: PathBuf,
    output: Option<PathBuf>,
    results: Option<PathBuf>,
    json: Option<PathBuf>,
    seed: Option<u64>,
    ticks: Option<u64>,
    quiet: bool,
) -> Result<(), Box<dyn std::error::Error>> {
    let mut config = load_config(&config_path)?;
    if let Some(s) = seed {
        config.run.seed = s;
    }
    if let Some(t) = ticks {
        config.run.max_ticks = t;
    }
    let output = output.unwrap_or_else(|| default_output(&config_path));

    let max_ticks = config.run.max_ticks;
    let stats_interval = config.logging.stats_interval;
    let mut world = World::new(config)?;

    if !quiet {
        println!("Starting simulation");
        println!("  Population: {}", world.population());
        println!("  Grid size: {}x{}", world.grid.width(), world.grid.height());
        println!("  Ticks: {}", max_ticks);
        println!("  Seed: {}", world.seed());
        println!("  Output: {:?}", output);
        println!();
        println!("{}", world.stats.summary());
    }

    let start = Instant::now();
    world.run_with_callback(max_ticks, |w| {
        if !quiet && w.time % stats_interval == 0 {
            println!("{}", w.stats.summary());
        }
    });
    let elapsed = start.elapsed();

    ExportSystem::export_gini_csv(&world.gini_series(), &output)?;
    log::info!("Wrote {} Gini samples to {}", world.stats_history.len(), output.display());

    if let Some(path) = json {
        world.stats_history.save_json(&path)?;
        log::info!("Stats history: {}", path.display());
    }

    if let Some(dir) = results {
        let manifest = ExportSystem::export_all(&world, &dir)?;
        log::info!("Results exported: {:?}", manifest);
    }

    if !quiet {
        println!();
        println!("=== Simulation Complete ===");
        println!("Time: {:.2}s", elapsed.as_secs_f64());
        println!("Ticks: {}", world.time);
        println!(
            "Speed: {:.1} ticks/s",
            world.time as f64 / elapsed.as_secs_f64().max(f64::EPSILON)
        );
        println!("Final Gini: {:.4} (normalized {:.4})", world.stats.gini, world.stats.normalized_gini);
    }

    Ok(())
}

fn inspect_land(config_path: PathBuf) -> Result<(), Box<dyn std::error::Error>> {
    let config = load_config(&config_path)?;
    let world = World::new(config)?;

    print!("{}", world.grid.render());
    println!();
    println!("Total grain: {}", world.grid.total_grain());
    println!("Initial Gini: {:.4}", world.stats.gini);

    Ok(())
}

fn run_benchmark(ticks: u64, population: usize) -> Result<(), Box<dyn std::error::Error>> {
    init_logging("warn");

    println!("=== Wealth Distribution Benchmark ===");
    println!("Ticks: {}", ticks);
    println!("Population: {}", population);
    println!();

    let result = benchmark(ticks, population)?;
    println!("{}", result);

    Ok(())
}

fn generate_config(output: PathBuf) -> Result<(), Box<dyn std::error::Error>> {
    init_logging("info");

    let config = Config::default();
    config.save(&output)?;
    println!("Configuration saved to: {:?}", output);
    Ok(())
}
