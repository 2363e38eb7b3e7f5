//! Result export for analysis in external tools.

use crate::grid::Grid;
use crate::stats::StatsHistory;
use crate::turtle::Turtle;
use crate::world::World;
use std::fs::File;
use std::io::{BufWriter, Result, Write};
use std::path::Path;

/// Export system for saving simulation results
pub struct ExportSystem;

impl ExportSystem {
    /// Export `(tick, gini)` pairs as a two-column CSV
    pub fn export_gini_csv<P: AsRef<Path>>(series: &[(u64, f64)], path: P) -> Result<()> {
        let mut file = BufWriter::new(File::create(path)?);

        writeln!(file, "tick,gini")?;
        for (tick, gini) in series {
            writeln!(file, "{},{}", tick, gini)?;
        }

        file.flush()
    }

    /// Export every recorded statistics sample to CSV
    pub fn export_stats_csv<P: AsRef<Path>>(history: &StatsHistory, path: P) -> Result<()> {
        let mut file = BufWriter::new(File::create(path)?);

        writeln!(
            file,
            "tick,population,gini,normalized_gini,total_wealth,mean_wealth,max_wealth,poor,middle,rich,total_grain,harvested,rebirths"
        )?;

        for s in &history.snapshots {
            writeln!(
                file,
                "{},{},{},{},{},{:.3},{},{},{},{},{},{},{}",
                s.tick,
                s.population,
                s.gini,
                s.normalized_gini,
                s.total_wealth,
                s.mean_wealth,
                s.max_wealth,
                s.classes.poor,
                s.classes.middle,
                s.classes.rich,
                s.total_grain,
                s.harvested,
                s.rebirths,
            )?;
        }

        file.flush()
    }

    /// Export current turtles to CSV
    pub fn export_turtles_csv<P: AsRef<Path>>(turtles: &[Turtle], path: P) -> Result<()> {
        let mut file = BufWriter::new(File::create(path)?);

        writeln!(
            file,
            "x,y,wealth,age,metabolism,vision,life_expectancy,heading"
        )?;

        for t in turtles {
            writeln!(
                file,
                "{},{},{},{},{},{},{},{:?}",
                t.x, t.y, t.wealth, t.age, t.metabolism, t.vision, t.life_expectancy, t.heading,
            )?;
        }

        file.flush()
    }

    /// Export every patch's grain and capacity to CSV
    pub fn export_grid_csv<P: AsRef<Path>>(grid: &Grid, path: P) -> Result<()> {
        let mut file = BufWriter::new(File::create(path)?);

        writeln!(file, "x,y,grain,max_grain")?;
        for p in grid.patches() {
            writeln!(file, "{},{},{},{}", p.x, p.y, p.grain_here(), p.max_grain_here())?;
        }

        file.flush()
    }

    /// Export world snapshot to JSON
    pub fn export_world_json<P: AsRef<Path>>(world: &World, path: P) -> Result<()> {
        let snapshot = WorldSnapshot {
            tick: world.time,
            seed: world.seed(),
            population: world.population(),
            gini: world.stats.gini,
            normalized_gini: world.stats.normalized_gini,
            total_grain: world.grid.total_grain(),
            lorenz: world.lorenz(),
            turtles: world.population.turtles(),
        };

        let json = serde_json::to_string_pretty(&snapshot)?;
        std::fs::write(path, json)?;

        Ok(())
    }

    /// Export summary statistics
    pub fn export_summary<P: AsRef<Path>>(world: &World, path: P) -> Result<()> {
        let mut file = File::create(path)?;

        writeln!(file, "=== Wealth Distribution Summary ===")?;
        writeln!(file, "Ticks: {}", world.time)?;
        writeln!(file, "Seed: {}", world.seed())?;
        writeln!(file, "Grid: {}x{}", world.grid.width(), world.grid.height())?;
        writeln!(file, "Population: {}", world.population())?;
        writeln!(file, "Wealth policy: {:?}", world.wealth_policy())?;
        writeln!(file, "Total Grain: {}", world.grid.total_grain())?;
        writeln!(file)?;

        let stats = &world.stats;
        writeln!(file, "=== Final Distribution ===")?;
        writeln!(file, "Gini (raw): {:.5}", stats.gini)?;
        writeln!(file, "Gini (normalized): {:.5}", stats.normalized_gini)?;
        writeln!(file, "Mean Wealth: {:.2}", stats.mean_wealth)?;
        writeln!(file, "Max Wealth: {}", stats.max_wealth)?;
        writeln!(
            file,
            "Classes (poor/middle/rich): {}/{}/{}",
            stats.classes.poor, stats.classes.middle, stats.classes.rich
        )?;

        let rebirths: usize = world.stats_history.snapshots.iter().map(|s| s.rebirths).sum();
        writeln!(file, "Total Rebirths: {}", rebirths)?;

        Ok(())
    }

    /// Export the full result set into a directory
    pub fn export_all<P: AsRef<Path>>(world: &World, base_path: P) -> Result<ExportManifest> {
        let base = base_path.as_ref();
        std::fs::create_dir_all(base)?;

        let gini_path = base.join("gini.csv");
        let stats_path = base.join("stats.csv");
        let turtles_path = base.join("turtles.csv");
        let grid_path = base.join("grid.csv");
        let world_path = base.join("world.json");
        let summary_path = base.join("summary.txt");

        Self::export_gini_csv(&world.gini_series(), &gini_path)?;
        Self::export_stats_csv(&world.stats_history, &stats_path)?;
        Self::export_turtles_csv(world.population.turtles(), &turtles_path)?;
        Self::export_grid_csv(&world.grid, &grid_path)?;
        Self::export_world_json(world, &world_path)?;
        Self::export_summary(world, &summary_path)?;

        Ok(ExportManifest {
            tick: world.time,
            gini_file: gini_path.to_string_lossy().to_string(),
            stats_file: stats_path.to_string_lossy().to_string(),
            turtles_file: turtles_path.to_string_lossy().to_string(),
            grid_file: grid_path.to_string_lossy().to_string(),
            world_file: world_path.to_string_lossy().to_string(),
            summary_file: summary_path.to_string_lossy().to_string(),
        })
    }
}

/// Manifest of exported files
#[derive(Debug)]
pub struct ExportManifest {
    pub tick: u64,
    pub gini_file: String,
    pub stats_file: String,
    pub turtles_file: String,
    pub grid_file: String,
    pub world_file: String,
    pub summary_file: String,
}

/// World snapshot for JSON export
#[derive(serde::Serialize)]
struct WorldSnapshot<'a> {
    tick: u64,
    seed: u64,
    population: usize,
    gini: f64,
    normalized_gini: f64,
    total_grain: u64,
    lorenz: &'a [f64],
    turtles: &'a [Turtle],
}
