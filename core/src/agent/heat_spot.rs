//! The thermal front marker.
//!
//! A heat spot holds a fixed column and creeps one row further every
//! DRIFT_INTERVAL activations. Its trail (`track`) is what lobsters
//! avoid, not its current cell. The trail always runs one row ahead
//! of the spot itself.

use crate::{
    error::SimResult,
    event::SimEvent,
    grid::SpaceGrid,
    habitat::Habitat,
    types::{AgentId, Pos},
};

pub const DRIFT_INTERVAL: u64 = 5;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HeatSpot {
    column: usize,
    next_row: usize,
    history: Vec<usize>,
    turn: u64,
}

impl HeatSpot {
    /// A spot starting at `start`. Every row up to one past the start
    /// row counts as already visited.
    pub fn new(start: Pos) -> Self {
        let next_row = start.y + 1;
        Self {
            column: start.x,
            next_row,
            history: (0..=next_row).collect(),
            turn: 0,
        }
    }

    /// Every row this front has claimed, strictly increasing.
    pub fn track(&self) -> &[usize] {
        &self.history
    }

    pub fn column(&self) -> usize {
        self.column
    }

    pub fn next_row(&self) -> usize {
        self.next_row
    }

    pub fn turn(&self) -> u64 {
        self.turn
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HeatSpotAction {
    pub drift_to: Option<Pos>,
}

/// Drift on every DRIFT_INTERVAL-th activation, unless the next row is
/// off the grid.
pub(crate) fn plan_heat_spot(spot: &HeatSpot, grid: &SpaceGrid) -> HeatSpotAction {
    let turn = spot.turn + 1;
    if turn % DRIFT_INTERVAL != 0 {
        return HeatSpotAction { drift_to: None };
    }
    let dest = Pos::new(spot.column, spot.next_row);
    HeatSpotAction {
        drift_to: grid.in_bounds(dest).then_some(dest),
    }
}

impl Habitat {
    pub(crate) fn apply_heat_spot(&mut self, id: AgentId, action: HeatSpotAction) -> SimResult<()> {
        self.heat_spot_mut(id)?.turn += 1;
        let Some(dest) = action.drift_to else {
            return Ok(());
        };

        self.move_agent(id, dest)?;
        let spot = self.heat_spot_mut(id)?;
        spot.next_row += 1;
        let claimed = spot.next_row;
        spot.history.push(claimed);

        log::trace!("heat spot {id} drifted to {dest}");
        self.record(SimEvent::HeatSpotDrifted {
            tick: self.tick(),
            heat_spot_id: id,
            row: dest.y,
        });
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_spot_claims_rows_through_one_past_start() {
        let spot = HeatSpot::new(Pos::new(2, 3));
        assert_eq!(spot.track(), &[0, 1, 2, 3, 4]);
        assert_eq!(spot.next_row(), 4);
        assert_eq!(spot.column(), 2);
    }

    #[test]
    fn plans_drift_only_on_interval() {
        let grid = SpaceGrid::new(5, 10);
        let mut spot = HeatSpot::new(Pos::new(0, 3));
        for turn in 0..4 {
            spot.turn = turn;
            assert_eq!(plan_heat_spot(&spot, &grid).drift_to, None);
        }
        spot.turn = 4;
        assert_eq!(plan_heat_spot(&spot, &grid).drift_to, Some(Pos::new(0, 4)));
    }

    #[test]
    fn no_drift_past_last_row() {
        let grid = SpaceGrid::new(5, 4);
        let mut spot = HeatSpot::new(Pos::new(0, 3));
        spot.turn = 4;
        assert_eq!(plan_heat_spot(&spot, &grid).drift_to, None);
    }
}
