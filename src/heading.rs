//! Cardinal headings.

use rand::Rng;
use serde::{Deserialize, Serialize};

/// One of the four directions a turtle can face.
///
/// North is `+y` and East is `+x`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Heading {
    North,
    East,
    South,
    West,
}

impl Heading {
    /// Canonical scan order. Foraging ties go to the earliest entry.
    pub const ALL: [Heading; 4] = [Heading::North, Heading::East, Heading::South, Heading::West];

    const DELTAS: [(i64, i64); 4] = [(0, 1), (1, 0), (0, -1), (-1, 0)];

    #[inline]
    fn index(self) -> usize {
        self as usize
    }

    /// Coordinate step `(dx, dy)` for one move in this heading
    #[inline]
    pub fn delta(self) -> (i64, i64) {
        Self::DELTAS[self.index()]
    }

    /// The heading pointing back the way this one came
    #[inline]
    pub fn opposite(self) -> Heading {
        Self::ALL[(self.index() + 2) % 4]
    }

    /// Uniformly random heading
    pub fn random<R: Rng + ?Sized>(rng: &mut R) -> Self {
        Self::ALL[rng.gen_range(0..Self::ALL.len())]
    }
}
