//! The turtle population and harvest orchestration.

use crate::config::TurtleConfig;
use crate::grid::{Grid, OccupancyIndex};
use crate::turtle::{Turtle, WealthPolicy};
use rand::Rng;

/// All live turtles, in a fixed processing order
#[derive(Clone, Debug)]
pub struct Population {
    turtles: Vec<Turtle>,
    occupancy: OccupancyIndex,
}

impl Population {
    /// Create an empty population for a grid of the given size
    pub fn new(width: usize, height: usize) -> Self {
        Self {
            turtles: Vec::new(),
            occupancy: OccupancyIndex::new(width, height),
        }
    }

    /// Place `config.num_people` turtles on random patches
    pub fn spawn<R: Rng + ?Sized>(grid: &Grid, config: &TurtleConfig, rng: &mut R) -> Self {
        let mut population = Self::new(grid.width(), grid.height());
        population.turtles.reserve(config.num_people);

        for _ in 0..config.num_people {
            let x = rng.gen_range(0..grid.width());
            let y = rng.gen_range(0..grid.height());
            population.turtles.push(Turtle::new(x, y, config, rng));
        }

        log::info!("Spawned {} turtles", population.len());
        population
    }

    /// Build a population from existing turtles, wrapping any position that
    /// lies off the grid back onto the torus.
    pub fn from_turtles(grid: &Grid, mut turtles: Vec<Turtle>) -> Self {
        for turtle in &mut turtles {
            let (x, y) = grid.wrap(turtle.x as i64, turtle.y as i64);
            turtle.x = x;
            turtle.y = y;
        }
        let mut population = Self::new(grid.width(), grid.height());
        population.turtles = turtles;
        population
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.turtles.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.turtles.is_empty()
    }

    pub fn turtles(&self) -> &[Turtle] {
        &self.turtles
    }

    /// Indices of every turtle standing on `(x, y)`
    pub fn agents_at(&self, x: usize, y: usize) -> Vec<usize> {
        self.turtles
            .iter()
            .enumerate()
            .filter(|(_, t)| t.x == x && t.y == y)
            .map(|(idx, _)| idx)
            .collect()
    }

    /// Current wealth of every turtle, in population order
    pub fn wealths(&self) -> Vec<i64> {
        self.turtles.iter().map(|t| t.wealth).collect()
    }

    /// Phase 1: every turtle turns toward the most grain in view
    pub fn choose_headings(&mut self, grid: &Grid) {
        for turtle in &mut self.turtles {
            turtle.choose_heading(grid);
        }
    }

    /// Phase 2: every occupied patch is split among its occupants.
    ///
    /// The share is computed once per patch from the pre-harvest stock and
    /// then credited to each occupant. Returns the grain handed out.
    pub fn harvest(&mut self, grid: &mut Grid) -> u64 {
        self.rebuild_occupancy();

        let mut harvested = 0u64;
        for x in 0..grid.width() {
            for y in 0..grid.height() {
                let occupants = self.occupancy.get(x, y);
                if occupants.is_empty() {
                    continue;
                }

                let share = grid.cell_at_mut(x as i64, y as i64).harvest_share(occupants.len());
                for &idx in occupants {
                    self.turtles[idx].wealth += i64::from(share);
                }
                harvested += u64::from(share) * occupants.len() as u64;
            }
        }

        log::trace!("Harvested {} grain", harvested);
        harvested
    }

    /// Phase 3: every turtle moves, eats, ages and maybe is reborn.
    ///
    /// Returns the number of rebirths.
    pub fn move_eat_age_die<R: Rng + ?Sized>(
        &mut self,
        grid: &Grid,
        policy: WealthPolicy,
        config: &TurtleConfig,
        rng: &mut R,
    ) -> usize {
        self.turtles
            .iter_mut()
            .map(|t| t.move_eat_age_die(grid, policy, config, rng))
            .filter(|&reborn| reborn)
            .count()
    }

    fn rebuild_occupancy(&mut self) {
        self.occupancy.clear();
        for (idx, turtle) in self.turtles.iter().enumerate() {
            self.occupancy.insert(turtle.x, turtle.y, idx);
        }
    }
}
