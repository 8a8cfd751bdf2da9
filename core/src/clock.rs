//! Simulation clock: owns tick state and the running flag.

use crate::types::{RunId, Tick};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SimClock {
    pub run_id:       RunId,
    pub current_tick: Tick,
    pub running:      bool,
}

impl SimClock {
    pub fn new(run_id: RunId) -> Self {
        Self {
            run_id,
            current_tick: 0,
            running: true,
        }
    }

    /// Advance one tick. Returns the new tick number.
    /// Panics once the run has finished; callers must check.
    pub fn advance(&mut self) -> Tick {
        assert!(self.running, "advance() called on a finished run");
        self.current_tick += 1;
        self.current_tick
    }

    pub fn finish(&mut self) {
        self.running = false;
    }
}
