//! Statistics tracking for the simulation: Lorenz curve, Gini coefficient
//! and per-tick wealth summaries.

use serde::{Deserialize, Serialize};
use std::path::Path;

/// Cumulative wealth share of the poorest turtles, one point per turtle.
///
/// Returns an empty curve when there are no turtles or total wealth is not
/// positive; the shares are undefined in that case.
pub fn compute_lorenz(wealths: &[i64]) -> Vec<f64> {
    let mut sorted = wealths.to_vec();
    sorted.sort_unstable();

    let total: i64 = sorted.iter().sum();
    if sorted.is_empty() || total <= 0 {
        return Vec::new();
    }

    let total = total as f64;
    let mut cumulative = 0i64;
    sorted
        .iter()
        .map(|&w| {
            cumulative += w;
            cumulative as f64 / total
        })
        .collect()
}

/// Raw Gini sum `Σ ((i + 1) / N - lorenz[i])` over the Lorenz points.
///
/// An empty curve yields `0.0`.
pub fn compute_gini(lorenz: &[f64]) -> f64 {
    let n = lorenz.len() as f64;
    lorenz
        .iter()
        .enumerate()
        .map(|(i, &point)| (i + 1) as f64 / n - point)
        .sum()
}

/// Scale a raw Gini sum over `n` turtles into the usual `[0, 1)` index
pub fn normalized_gini(raw: f64, n: usize) -> f64 {
    if n == 0 {
        0.0
    } else {
        2.0 * raw / n as f64
    }
}

/// Turtle counts per wealth class, relative to the richest turtle
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct WealthClasses {
    /// At most a third of the maximum wealth
    pub poor: usize,
    /// At most two thirds of the maximum wealth
    pub middle: usize,
    pub rich: usize,
}

impl WealthClasses {
    pub fn classify(wealths: &[i64]) -> Self {
        let mut classes = Self::default();
        let Some(&max) = wealths.iter().max() else {
            return classes;
        };
        let max = max as f64;

        for &w in wealths {
            let w = w as f64;
            if w <= max / 3.0 {
                classes.poor += 1;
            } else if w <= max * 2.0 / 3.0 {
                classes.middle += 1;
            } else {
                classes.rich += 1;
            }
        }
        classes
    }
}

/// What happened during a tick, fed into the statistics sample
#[derive(Clone, Copy, Debug, Default)]
pub struct TickActivity {
    pub harvested: u64,
    pub rebirths: usize,
}

/// Statistics snapshot for a simulation tick
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Stats {
    /// Ticks completed when the sample was taken (0 = after setup)
    pub tick: u64,
    pub population: usize,
    /// Raw Gini sum
    pub gini: f64,
    /// Gini index scaled to `[0, 1)`
    pub normalized_gini: f64,
    pub total_wealth: i64,
    pub mean_wealth: f64,
    pub max_wealth: i64,
    pub classes: WealthClasses,
    /// Grain left on the land
    pub total_grain: u64,
    /// Grain harvested this tick
    pub harvested: u64,
    /// Turtles reborn this tick
    pub rebirths: usize,
}

impl Stats {
    /// Measure the wealth distribution.
    ///
    /// Returns the snapshot and the Lorenz curve it was derived from.
    pub fn measure(tick: u64, wealths: &[i64], total_grain: u64, activity: TickActivity) -> (Self, Vec<f64>) {
        let lorenz = compute_lorenz(wealths);
        if lorenz.is_empty() {
            log::warn!(
                "Tick {}: wealth distribution is degenerate ({} turtles), recording Gini 0",
                tick,
                wealths.len()
            );
        }

        let gini = compute_gini(&lorenz);
        let total_wealth: i64 = wealths.iter().sum();
        let mean_wealth = if wealths.is_empty() {
            0.0
        } else {
            total_wealth as f64 / wealths.len() as f64
        };

        let stats = Self {
            tick,
            population: wealths.len(),
            gini,
            normalized_gini: normalized_gini(gini, lorenz.len()),
            total_wealth,
            mean_wealth,
            max_wealth: wealths.iter().copied().max().unwrap_or(0),
            classes: WealthClasses::classify(wealths),
            total_grain,
            harvested: activity.harvested,
            rebirths: activity.rebirths,
        };
        (stats, lorenz)
    }

    /// Save stats to JSON file
    pub fn save_json<P: AsRef<Path>>(&self, path: P) -> std::io::Result<()> {
        let json = serde_json::to_string_pretty(self)?;
        std::fs::write(path, json)
    }

    /// Format stats as a one-line summary
    pub fn summary(&self) -> String {
        format!(
            "T:{:6} | Pop:{:5} | Gini:{:.4} ({:.3}) | Wealth:{:.1} max {} | Classes:{}/{}/{} | Grain:{} | Reborn:{}",
            self.tick,
            self.population,
            self.gini,
            self.normalized_gini,
            self.mean_wealth,
            self.max_wealth,
            self.classes.poor,
            self.classes.middle,
            self.classes.rich,
            self.total_grain,
            self.rebirths,
        )
    }
}

/// Append-only history of per-tick statistics
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct StatsHistory {
    /// All recorded stats snapshots, setup sample first
    pub snapshots: Vec<Stats>,
}

impl StatsHistory {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a stats snapshot
    pub fn record(&mut self, stats: Stats) {
        self.snapshots.push(stats);
    }

    pub fn len(&self) -> usize {
        self.snapshots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.snapshots.is_empty()
    }

    pub fn latest(&self) -> Option<&Stats> {
        self.snapshots.last()
    }

    /// Get stats recorded after `tick` ticks
    pub fn get_at(&self, tick: u64) -> Option<&Stats> {
        self.snapshots.get(usize::try_from(tick).ok()?)
    }

    /// `(tick, raw gini)` pairs
    pub fn gini_series(&self) -> Vec<(u64, f64)> {
        self.snapshots.iter().map(|s| (s.tick, s.gini)).collect()
    }

    pub fn normalized_gini_series(&self) -> Vec<(u64, f64)> {
        self.snapshots
            .iter()
            .map(|s| (s.tick, s.normalized_gini))
            .collect()
    }

    /// Wealth class counts over time
    pub fn class_series(&self) -> Vec<(u64, WealthClasses)> {
        self.snapshots.iter().map(|s| (s.tick, s.classes)).collect()
    }

    /// Save the whole history to a JSON file
    pub fn save_json<P: AsRef<Path>>(&self, path: P) -> std::io::Result<()> {
        let json = serde_json::to_string_pretty(self)?;
        std::fs::write(path, json)
    }

    /// Load a history written by [`StatsHistory::save_json`]
    pub fn load_json<P: AsRef<Path>>(path: P) -> std::io::Result<Self> {
        let json = std::fs::read_to_string(path)?;
        serde_json::from_str(&json).map_err(|e| std::io::Error::new(std::io::ErrorKind::InvalidData, e))
    }
}
