//! Toroidal land grid, grain patches and occupancy indexing.

use crate::config::WorldConfig;
use crate::heading::Heading;
use rand::Rng;
use serde::{Deserialize, Serialize};
use std::fmt::Write;

/// Number of seeding passes that diffuse only from best land
pub const BEST_LAND_DIFFUSION_PASSES: usize = 5;
/// Number of seeding passes that diffuse from every patch
pub const FULL_DIFFUSION_PASSES: usize = 10;

/// A single cell of land holding a grain stock
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Patch {
    pub x: usize,
    pub y: usize,
    grain_here: u32,
    max_grain_here: u32,
    growth_increment: u32,
}

impl Patch {
    /// Create a patch filled to `max_grain`
    pub fn new(x: usize, y: usize, max_grain: u32, growth_increment: u32) -> Self {
        Self {
            x,
            y,
            grain_here: max_grain,
            max_grain_here: max_grain,
            growth_increment,
        }
    }

    #[inline]
    pub fn grain_here(&self) -> u32 {
        self.grain_here
    }

    #[inline]
    pub fn max_grain_here(&self) -> u32 {
        self.max_grain_here
    }

    #[inline]
    pub fn growth_increment(&self) -> u32 {
        self.growth_increment
    }

    pub fn set_grain_here(&mut self, grain: u32) {
        self.grain_here = grain;
    }

    pub fn set_max_grain_here(&mut self, max_grain: u32) {
        self.max_grain_here = max_grain;
    }

    /// Unclamped addition; capacity only binds once setup has frozen it.
    #[inline]
    pub fn add_grain(&mut self, amount: u32) {
        self.grain_here = self.grain_here.saturating_add(amount);
    }

    #[inline]
    pub fn remove_grain(&mut self, amount: u32) {
        self.grain_here = self.grain_here.saturating_sub(amount);
    }

    /// Grow one increment, never past capacity
    pub fn grow(&mut self) {
        if self.grain_here < self.max_grain_here {
            self.grain_here = self
                .grain_here
                .saturating_add(self.growth_increment)
                .min(self.max_grain_here);
        }
    }

    /// Split the grain evenly among `claimants` and empty the patch.
    ///
    /// Returns the share owed to each claimant. The division remainder is
    /// discarded along with the rest of the stock. With no claimants the
    /// patch is untouched and the share is zero.
    pub fn harvest_share(&mut self, claimants: usize) -> u32 {
        if claimants == 0 {
            return 0;
        }
        let share = self.grain_here / u32::try_from(claimants).unwrap_or(u32::MAX);
        self.grain_here = 0;
        share
    }
}

/// The toroidal array of patches.
///
/// Patches are stored in scan order: `x` outer, `y` inner.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Grid {
    width: usize,
    height: usize,
    patches: Vec<Patch>,
}

impl Grid {
    /// Create an empty (zero grain, zero capacity) grid
    pub fn new(width: usize, height: usize, growth_increment: u32) -> Self {
        assert!(width > 0 && height > 0, "grid dimensions must be non-zero");
        let mut patches = Vec::with_capacity(width * height);
        for x in 0..width {
            for y in 0..height {
                patches.push(Patch::new(x, y, 0, growth_increment));
            }
        }
        Self {
            width,
            height,
            patches,
        }
    }

    /// Build the land for a run.
    ///
    /// Best land starts full, grain is spread outward from it, then over the
    /// whole grid, and the resulting levels become permanent capacities.
    pub fn seed<R: Rng + ?Sized>(config: &WorldConfig, rng: &mut R, dump_grid: bool) -> Self {
        let mut grid = Self::new(config.width, config.height, config.num_grain_grown);
        let best_land = grid.place_best_land(config, rng);
        log::info!(
            "Seeded {} best-land patches out of {}",
            best_land.len(),
            grid.patches.len()
        );
        if dump_grid {
            log::debug!("Initial grain:\n{}", grid.render());
        }

        grid.shape_land(&best_land, config.diffusion_proportion, dump_grid);
        log::info!("Land ready: total grain {}", grid.total_grain());
        if dump_grid {
            log::debug!("Capacities frozen:\n{}", grid.render());
        }

        grid
    }

    /// Roll every patch in scan order; winners become full best land.
    fn place_best_land<R: Rng + ?Sized>(&mut self, config: &WorldConfig, rng: &mut R) -> Vec<usize> {
        let best_land_chance = config.percent_best_land / 100.0;
        let mut best_land = Vec::new();
        for (idx, patch) in self.patches.iter_mut().enumerate() {
            if rng.gen::<f64>() < best_land_chance {
                patch.set_max_grain_here(config.max_grain);
                patch.set_grain_here(config.max_grain);
                best_land.push(idx);
            }
        }
        best_land
    }

    /// Spread grain out from `best_land`, then across the whole grid, and
    /// freeze the result as capacity.
    fn shape_land(&mut self, best_land: &[usize], proportion: f64, dump_grid: bool) {
        for pass in 1..=BEST_LAND_DIFFUSION_PASSES {
            self.spread_from_best_land(best_land, proportion);
            if dump_grid {
                log::debug!("Diffusion 1.{}:\n{}", pass, self.render());
            }
        }

        for pass in 1..=FULL_DIFFUSION_PASSES {
            self.spread_everywhere(proportion);
            if dump_grid {
                log::debug!("Diffusion 2.{}:\n{}", pass, self.render());
            }
        }

        self.freeze_capacity();
    }

    /// One pass: refill each best-land patch to capacity, then diffuse it.
    fn spread_from_best_land(&mut self, best_land: &[usize], proportion: f64) {
        for &idx in best_land {
            let patch = &mut self.patches[idx];
            patch.set_grain_here(patch.max_grain_here());
            let (x, y) = (patch.x, patch.y);
            self.diffuse(x, y, proportion);
        }
    }

    /// One pass of diffusion from every patch in scan order
    fn spread_everywhere(&mut self, proportion: f64) {
        for x in 0..self.width {
            for y in 0..self.height {
                self.diffuse(x, y, proportion);
            }
        }
    }

    #[inline]
    pub fn width(&self) -> usize {
        self.width
    }

    #[inline]
    pub fn height(&self) -> usize {
        self.height
    }

    /// Wrap any coordinate pair onto the torus
    #[inline]
    pub fn wrap(&self, x: i64, y: i64) -> (usize, usize) {
        (
            x.rem_euclid(self.width as i64) as usize,
            y.rem_euclid(self.height as i64) as usize,
        )
    }

    #[inline]
    fn index(&self, x: usize, y: usize) -> usize {
        x * self.height + y
    }

    /// Patch at a wrapped position
    #[inline]
    pub fn cell_at(&self, x: i64, y: i64) -> &Patch {
        let (x, y) = self.wrap(x, y);
        &self.patches[self.index(x, y)]
    }

    #[inline]
    pub fn cell_at_mut(&mut self, x: i64, y: i64) -> &mut Patch {
        let (x, y) = self.wrap(x, y);
        let idx = self.index(x, y);
        &mut self.patches[idx]
    }

    /// All patches in scan order
    pub fn patches(&self) -> &[Patch] {
        &self.patches
    }

    /// Coordinates of the 8 cells around `(x, y)`, centre excluded
    pub fn neighbor_coords8(&self, x: usize, y: usize) -> [(usize, usize); 8] {
        let mut coords = [(0, 0); 8];
        let mut i = 0;
        for dx in -1..=1 {
            for dy in -1..=1 {
                if dx == 0 && dy == 0 {
                    continue;
                }
                coords[i] = self.wrap(x as i64 + dx, y as i64 + dy);
                i += 1;
            }
        }
        coords
    }

    /// The 8 patches around `(x, y)`
    pub fn neighbors8(&self, x: usize, y: usize) -> Vec<&Patch> {
        self.neighbor_coords8(x, y)
            .iter()
            .map(|&(nx, ny)| &self.patches[self.index(nx, ny)])
            .collect()
    }

    /// The `distance` patches strictly ahead of `(x, y)`, nearest first
    pub fn visible_patches(&self, x: usize, y: usize, heading: Heading, distance: u32) -> Vec<&Patch> {
        let (dx, dy) = heading.delta();
        (1..=i64::from(distance))
            .map(|step| self.cell_at(x as i64 + dx * step, y as i64 + dy * step))
            .collect()
    }

    /// Total grain in view along `heading`
    pub fn visible_grain(&self, x: usize, y: usize, heading: Heading, distance: u32) -> u64 {
        let visible = self.visible_patches(x, y, heading, distance);
        assert_eq!(
            visible.len(),
            distance as usize,
            "visibility query from ({}, {}) heading {:?} returned the wrong number of patches",
            x,
            y,
            heading
        );
        visible.iter().map(|p| u64::from(p.grain_here())).sum()
    }

    /// Wrapped coordinates one step ahead of `(x, y)`
    #[inline]
    pub fn next_cell(&self, x: usize, y: usize, heading: Heading) -> (usize, usize) {
        let (dx, dy) = heading.delta();
        self.wrap(x as i64 + dx, y as i64 + dy)
    }

    /// Spread `proportion` of the centre's grain evenly over its 8 neighbours.
    ///
    /// Each neighbour receives `floor(grain * proportion / 8)`; whatever the
    /// floor leaves behind stays on the centre.
    pub fn diffuse(&mut self, x: usize, y: usize, proportion: f64) {
        let centre = self.index(x, y);
        let grain = self.patches[centre].grain_here();
        let per_neighbour = ((f64::from(grain) * proportion) / 8.0).floor() as u32;
        if per_neighbour == 0 {
            return;
        }

        self.patches[centre].remove_grain(per_neighbour * 8);
        for (nx, ny) in self.neighbor_coords8(x, y) {
            let idx = self.index(nx, ny);
            self.patches[idx].add_grain(per_neighbour);
        }
    }

    /// Make every patch's current grain its permanent capacity
    pub fn freeze_capacity(&mut self) {
        for patch in &mut self.patches {
            patch.set_max_grain_here(patch.grain_here());
        }
    }

    /// Grow grain on every patch
    pub fn grow_all(&mut self) {
        for patch in &mut self.patches {
            patch.grow();
        }
    }

    /// Get total grain on the grid
    pub fn total_grain(&self) -> u64 {
        self.patches.iter().map(|p| u64::from(p.grain_here())).sum()
    }

    /// `(current, max)` for every patch, indexed `[x][y]`
    pub fn grain_snapshot(&self) -> Vec<Vec<(u32, u32)>> {
        self.patches
            .chunks(self.height)
            .map(|column| {
                column
                    .iter()
                    .map(|p| (p.grain_here(), p.max_grain_here()))
                    .collect()
            })
            .collect()
    }

    /// Fixed-width `current/max` table, one line per `x`
    pub fn render(&self) -> String {
        let mut out = String::with_capacity(self.patches.len() * 8);
        for column in self.patches.chunks(self.height) {
            for patch in column {
                let cell = format!("{}/{}", patch.grain_here(), patch.max_grain_here());
                let _ = write!(out, "{:>8}", cell);
            }
            out.push('\n');
        }
        out
    }
}

/// Per-cell index of turtles, rebuilt before each harvest
#[derive(Clone, Debug)]
pub struct OccupancyIndex {
    height: usize,
    cells: Vec<Vec<usize>>,
}

impl OccupancyIndex {
    /// Create a new index for a grid of the given size
    pub fn new(width: usize, height: usize) -> Self {
        Self {
            height,
            cells: vec![Vec::new(); width * height],
        }
    }

    /// Clear all entries
    pub fn clear(&mut self) {
        for cell in &mut self.cells {
            cell.clear();
        }
    }

    /// Record turtle `idx` at `(x, y)`
    #[inline]
    pub fn insert(&mut self, x: usize, y: usize, idx: usize) {
        self.cells[x * self.height + y].push(idx);
    }

    /// Get all turtle indices at a specific cell
    #[inline]
    pub fn get(&self, x: usize, y: usize) -> &[usize] {
        &self.cells[x * self.height + y]
    }

    #[inline]
    pub fn count_at(&self, x: usize, y: usize) -> usize {
        self.get(x, y).len()
    }
}
