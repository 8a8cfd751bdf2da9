//! Shared primitive types used across the entire simulation.

use serde::{Deserialize, Serialize};
use std::fmt;

/// A simulation tick. One tick = one activation of every agent.
pub type Tick = u64;

/// Index of an entity in the habitat arena. Assigned in creation order
/// and never reused within a run.
pub type AgentId = usize;

/// The canonical run identifier.
pub type RunId = String;

/// A cell coordinate. `y` is the row; "north" is increasing `y`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Pos {
    pub x: usize,
    pub y: usize,
}

impl Pos {
    pub const fn new(x: usize, y: usize) -> Self {
        Self { x, y }
    }

    /// Euclidean distance between two cells.
    pub fn distance(self, other: Pos) -> f64 {
        let dx = self.x as f64 - other.x as f64;
        let dy = self.y as f64 - other.y as f64;
        (dx * dx + dy * dy).sqrt()
    }

    /// Whether `other` lies in the Moore neighborhood of this cell,
    /// this cell included.
    pub fn within_reach(self, other: Pos) -> bool {
        self.x.abs_diff(other.x) <= 1 && self.y.abs_diff(other.y) <= 1
    }

    /// The same column one row further on (`y + 1`).
    pub fn next_row(self) -> Option<Pos> {
        self.y.checked_add(1).map(|y| Pos { x: self.x, y })
    }
}

impl From<(usize, usize)> for Pos {
    fn from((x, y): (usize, usize)) -> Self {
        Self { x, y }
    }
}

impl fmt::Display for Pos {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.x, self.y)
    }
}
