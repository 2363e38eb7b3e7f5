//! Turtle structure and lifecycle.

use crate::config::TurtleConfig;
use crate::grid::Grid;
use crate::heading::Heading;
use rand::Rng;
use serde::{Deserialize, Serialize};

/// How a reborn turtle gets its starting wealth
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum WealthPolicy {
    /// `metabolism + uniform[0, initial_wealth_bound)`
    Random,
    /// `metabolism + max(0, wealth at death)`
    Inheritance,
}

impl WealthPolicy {
    pub fn from_config(config: &TurtleConfig) -> Self {
        if config.inheritance {
            Self::Inheritance
        } else {
            Self::Random
        }
    }
}

/// A mobile agent that forages, eats and ages on the grid
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Turtle {
    pub x: usize,
    pub y: usize,
    /// Grain held; may dip below zero until the death check runs
    pub wealth: i64,
    pub age: u32,
    /// Grain eaten per tick
    pub metabolism: u32,
    /// How many patches ahead the turtle can see
    pub vision: u32,
    pub life_expectancy: u32,
    pub heading: Heading,
}

impl Turtle {
    /// Create a turtle at `(x, y)` with freshly rolled attributes.
    ///
    /// Wealth is always random here regardless of policy, and the age is
    /// spread over `[0, life_expectancy)` so the population does not die in
    /// lockstep.
    pub fn new<R: Rng + ?Sized>(x: usize, y: usize, config: &TurtleConfig, rng: &mut R) -> Self {
        let mut turtle = Self {
            x,
            y,
            wealth: 0,
            age: 0,
            metabolism: 1,
            vision: 1,
            life_expectancy: 1,
            heading: Heading::North,
        };
        turtle.rebirth(WealthPolicy::Random, config, rng);
        turtle.age = rng.gen_range(0..turtle.life_expectancy);
        turtle
    }

    /// Face the direction with the most grain in view.
    ///
    /// Headings are scanned in [`Heading::ALL`] order and a later heading
    /// only wins with a strictly larger total.
    pub fn choose_heading(&mut self, grid: &Grid) -> Heading {
        let mut best = Heading::ALL[0];
        let mut best_amount = grid.visible_grain(self.x, self.y, best, self.vision);

        for &heading in &Heading::ALL[1..] {
            let amount = grid.visible_grain(self.x, self.y, heading, self.vision);
            if amount > best_amount {
                best = heading;
                best_amount = amount;
            }
        }

        self.heading = best;
        best
    }

    /// One tick of the lifecycle: step forward, eat, age, and be reborn in
    /// place when starved or too old.
    ///
    /// Returns `true` if the turtle was reborn.
    pub fn move_eat_age_die<R: Rng + ?Sized>(
        &mut self,
        grid: &Grid,
        policy: WealthPolicy,
        config: &TurtleConfig,
        rng: &mut R,
    ) -> bool {
        let (x, y) = grid.next_cell(self.x, self.y, self.heading);
        self.x = x;
        self.y = y;

        self.wealth -= i64::from(self.metabolism);
        self.age += 1;

        if self.should_die() {
            self.rebirth(policy, config, rng);
            true
        } else {
            false
        }
    }

    #[inline]
    pub fn should_die(&self) -> bool {
        self.wealth < 0 || self.age >= self.life_expectancy
    }

    /// Replace this turtle with its successor on the same patch.
    ///
    /// Draw order: heading, life expectancy, metabolism, wealth (random
    /// policy only), vision.
    pub fn rebirth<R: Rng + ?Sized>(&mut self, policy: WealthPolicy, config: &TurtleConfig, rng: &mut R) {
        let legacy = self.wealth.max(0);

        self.age = 0;
        self.heading = Heading::random(rng);
        self.life_expectancy = rng.gen_range(config.life_expectancy_min..=config.life_expectancy_max);
        self.metabolism = rng.gen_range(1..=config.metabolism_max);
        self.wealth = i64::from(self.metabolism)
            + match policy {
                WealthPolicy::Random => i64::from(rng.gen_range(0..config.initial_wealth_bound)),
                WealthPolicy::Inheritance => legacy,
            };
        self.vision = rng.gen_range(1..=config.max_vision);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    fn test_config() -> TurtleConfig {
        TurtleConfig::default()
    }

    fn fixed_turtle(x: usize, y: usize) -> Turtle {
        Turtle {
            x,
            y,
            wealth: 20,
            age: 0,
            metabolism: 3,
            vision: 2,
            life_expectancy: 50,
            heading: Heading::North,
        }
    }

    #[test]
    fn test_turtle_creation_ranges() {
        let config = test_config();
        let mut rng = ChaCha8Rng::seed_from_u64(5);

        for _ in 0..500 {
            let t = Turtle::new(3, 4, &config, &mut rng);
            assert_eq!((t.x, t.y), (3, 4));
            assert!(t.age < t.life_expectancy);
            assert!((config.life_expectancy_min..=config.life_expectancy_max).contains(&t.life_expectancy));
            assert!((1..=config.metabolism_max).contains(&t.metabolism));
            assert!((1..=config.max_vision).contains(&t.vision));
            let base = i64::from(t.metabolism);
            assert!(t.wealth >= base && t.wealth < base + i64::from(config.initial_wealth_bound));
        }
    }

    #[test]
    fn test_rebirth_draw_order() {
        let config = test_config();

        for (policy, seed) in [(WealthPolicy::Random, 23), (WealthPolicy::Inheritance, 29)] {
            let mut t = fixed_turtle(2, 2);
            t.wealth = 12;
            t.age = 50;
            t.rebirth(policy, &config, &mut ChaCha8Rng::seed_from_u64(seed));

            let mut replay = ChaCha8Rng::seed_from_u64(seed);
            let heading = Heading::random(&mut replay);
            let life_expectancy = replay.gen_range(config.life_expectancy_min..=config.life_expectancy_max);
            let metabolism = replay.gen_range(1..=config.metabolism_max);
            let endowment = match policy {
                WealthPolicy::Random => i64::from(replay.gen_range(0..config.initial_wealth_bound)),
                WealthPolicy::Inheritance => 12,
            };
            let vision = replay.gen_range(1..=config.max_vision);

            assert_eq!(t.heading, heading);
            assert_eq!(t.life_expectancy, life_expectancy);
            assert_eq!(t.metabolism, metabolism);
            assert_eq!(t.wealth, i64::from(metabolism) + endowment);
            assert_eq!(t.vision, vision);
            assert_eq!(t.age, 0);
            assert_eq!((t.x, t.y), (2, 2));
        }
    }

    #[test]
    fn test_choose_heading_picks_richest() {
        let mut grid = Grid::new(11, 11, 1);
        grid.cell_at_mut(5, 7).set_grain_here(3);
        grid.cell_at_mut(3, 5).set_grain_here(9);

        let mut t = fixed_turtle(5, 5);
        assert_eq!(t.choose_heading(&grid), Heading::West);
        assert_eq!(t.heading, Heading::West);
    }

    #[test]
    fn test_choose_heading_respects_vision() {
        let mut grid = Grid::new(11, 11, 1);
        grid.cell_at_mut(5, 9).set_grain_here(40);
        grid.cell_at_mut(6, 5).set_grain_here(1);

        let mut t = fixed_turtle(5, 5);
        t.vision = 2;
        assert_eq!(t.choose_heading(&grid), Heading::East);

        t.vision = 4;
        assert_eq!(t.choose_heading(&grid), Heading::North);
    }

    #[test]
    fn test_choose_heading_ties_keep_first() {
        let mut grid = Grid::new(11, 11, 1);
        grid.cell_at_mut(6, 5).set_grain_here(5);
        grid.cell_at_mut(5, 4).set_grain_here(5);
        grid.cell_at_mut(4, 5).set_grain_here(5);

        let mut t = fixed_turtle(5, 5);
        t.heading = Heading::West;
        assert_eq!(t.choose_heading(&grid), Heading::East);

        let empty = Grid::new(11, 11, 1);
        assert_eq!(t.choose_heading(&empty), Heading::North);
    }

    #[test]
    fn test_move_eat_age() {
        let grid = Grid::new(10, 10, 1);
        let config = test_config();
        let mut rng = ChaCha8Rng::seed_from_u64(1);

        let mut t = fixed_turtle(4, 9);
        let reborn = t.move_eat_age_die(&grid, WealthPolicy::Random, &config, &mut rng);

        assert!(!reborn);
        assert_eq!((t.x, t.y), (4, 0));
        assert_eq!(t.wealth, 17);
        assert_eq!(t.age, 1);
    }

    #[test]
    fn test_survives_one_tick_before_life_expectancy() {
        let grid = Grid::new(10, 10, 1);
        let config = test_config();
        let mut rng = ChaCha8Rng::seed_from_u64(1);

        let mut t = fixed_turtle(1, 1);
        t.age = t.life_expectancy - 2;
        assert!(!t.move_eat_age_die(&grid, WealthPolicy::Random, &config, &mut rng));
        assert_eq!(t.age, t.life_expectancy - 1);
    }

    #[test]
    fn test_dies_on_reaching_life_expectancy() {
        let grid = Grid::new(10, 10, 1);
        let config = test_config();
        let mut rng = ChaCha8Rng::seed_from_u64(1);

        let mut t = fixed_turtle(1, 1);
        t.age = t.life_expectancy - 1;
        assert!(t.move_eat_age_die(&grid, WealthPolicy::Random, &config, &mut rng));
        assert_eq!(t.age, 0);
        assert_eq!((t.x, t.y), (1, 2));
    }

    #[test]
    fn test_starvation_rebirth_in_place() {
        let grid = Grid::new(10, 10, 1);
        let config = test_config();
        let mut rng = ChaCha8Rng::seed_from_u64(9);

        let mut t = fixed_turtle(2, 2);
        t.wealth = 2;
        t.heading = Heading::East;
        assert!(t.move_eat_age_die(&grid, WealthPolicy::Random, &config, &mut rng));
        assert_eq!((t.x, t.y), (3, 2));
        assert!(t.wealth >= i64::from(t.metabolism));
    }

    #[test]
    fn test_inheritance_keeps_wealth() {
        let config = test_config();
        let mut rng = ChaCha8Rng::seed_from_u64(2);

        let mut t = fixed_turtle(0, 0);
        t.wealth = 37;
        t.rebirth(WealthPolicy::Inheritance, &config, &mut rng);
        assert_eq!(t.wealth, i64::from(t.metabolism) + 37);
        assert_eq!(t.age, 0);
    }

    #[test]
    fn test_inheritance_discards_debt() {
        let config = test_config();
        let mut rng = ChaCha8Rng::seed_from_u64(2);

        let mut t = fixed_turtle(0, 0);
        t.wealth = -12;
        t.rebirth(WealthPolicy::Inheritance, &config, &mut rng);
        assert_eq!(t.wealth, i64::from(t.metabolism));
    }

    #[test]
    fn test_policy_from_config() {
        let mut config = test_config();
        assert_eq!(WealthPolicy::from_config(&config), WealthPolicy::Random);
        config.inheritance = true;
        assert_eq!(WealthPolicy::from_config(&config), WealthPolicy::Inheritance);
    }
}
