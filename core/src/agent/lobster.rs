//! Lobster behavior.
//!
//! A wandering lobster only moves when a heat spot is next to it: it
//! steps to a random cell of its neighborhood (its own cell included)
//! whose row none of the nearby fronts has claimed. After a move it
//! drags the crowd along (see `Habitat::crowd_cascade`).

use std::collections::{BTreeSet, HashSet};

use serde::{Deserialize, Serialize};

use crate::{
    agent::AgentKind,
    error::SimResult,
    grid::Connectivity,
    habitat::Habitat,
    rng::SimRng,
    types::{AgentId, Pos},
};

/// Chance that a lobster in the crowd advances one row after a move.
pub const NUDGE_PROBABILITY: f64 = 0.25;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LobsterState {
    Wander,
    /// Terminal. A caught lobster never moves again.
    Caught,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Lobster {
    pub state: LobsterState,
    turn: u64,
}

impl Lobster {
    pub fn new() -> Self {
        Self {
            state: LobsterState::Wander,
            turn: 0,
        }
    }

    pub fn change_state(&mut self, state: LobsterState) {
        self.state = state;
    }

    pub fn is_wandering(&self) -> bool {
        self.state == LobsterState::Wander
    }

    /// Activations this lobster has taken while wandering.
    pub fn turn(&self) -> u64 {
        self.turn
    }
}

impl Default for Lobster {
    fn default() -> Self {
        Self::new()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LobsterAction {
    pub to: Option<Pos>,
}

pub(crate) fn plan_lobster(
    habitat: &Habitat,
    id: AgentId,
    rng: &mut SimRng,
) -> SimResult<LobsterAction> {
    let pos = habitat.pos_of(id)?;
    let fronts = habitat.occupants_of_kind(pos, false, AgentKind::HeatSpot);
    if fronts.is_empty() {
        return Ok(LobsterAction { to: None });
    }

    let mut claimed = BTreeSet::new();
    for front in fronts {
        claimed.extend(habitat.heat_spot(front)?.track().iter().copied());
    }

    let candidates: Vec<Pos> = habitat
        .grid()
        .neighborhood(pos, Connectivity::Moore, true)
        .into_iter()
        .filter(|cell| !claimed.contains(&cell.y))
        .collect();

    Ok(LobsterAction {
        to: rng.pick(&candidates).copied(),
    })
}

impl Habitat {
    pub(crate) fn apply_lobster(
        &mut self,
        id: AgentId,
        action: LobsterAction,
        rng: &mut SimRng,
    ) -> SimResult<()> {
        let lobster = self.lobster_mut(id)?;
        if !lobster.is_wandering() {
            return Ok(());
        }
        lobster.turn += 1;

        let Some(to) = action.to else {
            return Ok(());
        };
        // A cascade earlier in the tick may have nudged this lobster
        // away from where it planned.
        if !self.pos_of(id)?.within_reach(to) {
            return Ok(());
        }
        self.move_agent(id, to)?;
        self.crowd_cascade(id, rng)
    }

    /// Crowd following after `origin` has moved.
    ///
    /// Every wandering neighbor on a higher row than the lobster being
    /// processed is handled first, depth first, then the lobster itself
    /// may advance a row. Each lobster is visited at most once per
    /// cascade, so mutual neighbors cannot loop.
    pub(crate) fn crowd_cascade(&mut self, origin: AgentId, rng: &mut SimRng) -> SimResult<()> {
        let mut visited = HashSet::from([origin]);
        let mut stack = vec![(origin, self.trailing_lobsters(origin)?)];

        while let Some((id, pending)) = stack.last_mut() {
            let id = *id;
            match pending.pop() {
                Some(next) => {
                    if !visited.insert(next) {
                        continue;
                    }
                    // Rows may have changed since the frame was built.
                    if self.pos_of(next)?.y > self.pos_of(id)?.y {
                        let further = self.trailing_lobsters(next)?;
                        stack.push((next, further));
                    }
                }
                None => {
                    stack.pop();
                    self.nudge(id, rng)?;
                }
            }
        }
        Ok(())
    }

    /// Wandering lobsters around `id` on a higher row, reversed so that
    /// popping yields them in neighborhood order.
    fn trailing_lobsters(&self, id: AgentId) -> SimResult<Vec<AgentId>> {
        let pos = self.pos_of(id)?;
        let mut trailing = Vec::new();
        for other in self.occupants_of_kind(pos, false, AgentKind::Lobster) {
            if self.pos_of(other)?.y > pos.y && self.lobster(other)?.is_wandering() {
                trailing.push(other);
            }
        }
        trailing.reverse();
        Ok(trailing)
    }

    fn nudge(&mut self, id: AgentId, rng: &mut SimRng) -> SimResult<()> {
        if !rng.chance(NUDGE_PROBABILITY) {
            return Ok(());
        }
        let pos = self.pos_of(id)?;
        if let Some(next) = pos.next_row().filter(|p| self.grid().in_bounds(*p)) {
            log::trace!("lobster {id} nudged to {next}");
            self.move_agent(id, next)?;
        }
        Ok(())
    }
}
