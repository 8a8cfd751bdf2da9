use serde::{Deserialize, Serialize};

/// Size class a port is tagged with. Every port in the reference
/// scenario is `Big`; see `World::new`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PortSize {
    Big,
    Small,
}

/// A fixed port that tallies the catch landed there.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Home {
    pub size: PortSize,
    landed: u64,
}

impl Home {
    pub fn new(size: PortSize) -> Self {
        Self { size, landed: 0 }
    }

    pub fn add(&mut self, amount: u64) {
        self.landed += amount;
    }

    /// Total catch landed at this port so far.
    pub fn landed(&self) -> u64 {
        self.landed
    }
}
