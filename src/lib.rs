//! # Wealth Distribution
//!
//! Agent-based simulation of how wealth inequality emerges on a landscape
//! of unevenly growing grain, after the NetLogo Wealth Distribution model.
//!
//! ## Features
//!
//! - **Toroidal land**: grain diffuses out from best land, then regrows
//! - **Foraging turtles**: each tick turtles face the richest direction in
//!   view, harvest, eat, age and are reborn in place
//! - **Inequality metrics**: Lorenz curve and Gini coefficient every tick
//! - **Reproducible**: one seeded random stream, single-threaded
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use wealth_distribution::{Config, World};
//!
//! let config = Config::default();
//! let mut world = World::new(config).unwrap();
//!
//! world.run_to_completion();
//!
//! for (tick, gini) in world.gini_series() {
//!     println!("{tick},{gini}");
//! }
//! ```
//!
//! ## Configuration
//!
//! ```rust
//! use wealth_distribution::Config;
//!
//! let mut config = Config::default();
//! config.turtles.num_people = 500;
//! config.turtles.inheritance = true;
//! assert!(config.validate().is_ok());
//! ```

pub mod config;
pub mod export;
pub mod grid;
pub mod heading;
pub mod population;
pub mod stats;
pub mod turtle;
pub mod world;

// Re-export main types
pub use config::{Config, ConfigError};
pub use grid::{Grid, Patch};
pub use heading::Heading;
pub use population::Population;
pub use stats::{Stats, StatsHistory};
pub use turtle::{Turtle, WealthPolicy};
pub use world::World;

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Time a run of `ticks` ticks with `population` turtles on the default land
pub fn benchmark(ticks: u64, population: usize) -> Result<BenchmarkResult, ConfigError> {
    use std::time::Instant;

    let mut config = Config::default();
    config.turtles.num_people = population;

    let start = Instant::now();
    let mut world = World::new(config)?;
    let setup_secs = start.elapsed().as_secs_f64();

    let start = Instant::now();
    world.run(ticks);
    let elapsed = start.elapsed();

    Ok(BenchmarkResult {
        ticks,
        population,
        setup_secs,
        elapsed_secs: elapsed.as_secs_f64(),
        ticks_per_second: ticks as f64 / elapsed.as_secs_f64().max(f64::EPSILON),
        final_gini: world.stats.normalized_gini,
    })
}

/// Benchmark result
#[derive(Debug, Clone)]
pub struct BenchmarkResult {
    pub ticks: u64,
    pub population: usize,
    pub setup_secs: f64,
    pub elapsed_secs: f64,
    pub ticks_per_second: f64,
    pub final_gini: f64,
}

impl std::fmt::Display for BenchmarkResult {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "=== Benchmark Results ===")?;
        writeln!(f, "Ticks: {}", self.ticks)?;
        writeln!(f, "Population: {}", self.population)?;
        writeln!(f, "Setup: {:.3}s", self.setup_secs)?;
        writeln!(f, "Time: {:.3}s", self.elapsed_secs)?;
        writeln!(f, "Speed: {:.1} ticks/s", self.ticks_per_second)?;
        writeln!(f, "Final Gini: {:.4}", self.final_gini)?;
        Ok(())
    }
}
