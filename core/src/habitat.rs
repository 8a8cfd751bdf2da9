//! The agent arena and the grid it indexes.
//!
//! RULE: Only Habitat writes an agent's position, and it always updates
//! the grid index and the entity together. A failed move changes neither.
//!
//! Habitat is the `Population` the scheduler drives: `plan` dispatches
//! to the read-only `plan_*` function of the agent's kind, `apply` to the
//! matching `apply_*` method.

use serde::{Deserialize, Serialize};

use crate::{
    agent::{
        boat::plan_boat, heat_spot::plan_heat_spot, lobster::plan_lobster, Action, AgentKind, Boat,
        BoatSize, Body, Entity, HeatSpot, Home, Lobster, LobsterState,
    },
    error::{SimError, SimResult},
    event::SimEvent,
    grid::{Connectivity, SpaceGrid},
    rng::SimRng,
    scheduler::Population,
    types::{AgentId, Pos, Tick},
};

/// Running totals of catch landed (or banked) per boat size.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Landings {
    pub big: u64,
    pub small: u64,
}

impl Landings {
    pub fn credit(&mut self, size: BoatSize, amount: u32) {
        match size {
            BoatSize::Big   => self.big += u64::from(amount),
            BoatSize::Small => self.small += u64::from(amount),
        }
    }

    pub fn total(&self) -> u64 {
        self.big + self.small
    }
}

#[derive(Debug, Clone)]
pub struct Habitat {
    grid: SpaceGrid,
    entities: Vec<Entity>,
    pub(crate) landings: Landings,
    tick: Tick,
    pending_events: Vec<SimEvent>,
}

impl Habitat {
    pub fn new(width: usize, height: usize) -> Self {
        Self {
            grid: SpaceGrid::new(width, height),
            entities: Vec::new(),
            landings: Landings::default(),
            tick: 0,
            pending_events: Vec::new(),
        }
    }

    pub fn grid(&self) -> &SpaceGrid {
        &self.grid
    }

    pub fn landings(&self) -> Landings {
        self.landings
    }

    pub fn tick(&self) -> Tick {
        self.tick
    }

    pub(crate) fn begin_tick(&mut self, tick: Tick) {
        self.tick = tick;
    }

    pub(crate) fn record(&mut self, event: SimEvent) {
        self.pending_events.push(event);
    }

    pub(crate) fn drain_events(&mut self) -> Vec<SimEvent> {
        std::mem::take(&mut self.pending_events)
    }

    // ── Population ─────────────────────────────────────────────

    /// Create an agent at `pos`. Fails without side effects when `pos`
    /// is off the grid.
    pub fn spawn(&mut self, pos: Pos, body: Body) -> SimResult<AgentId> {
        let id = self.entities.len();
        self.grid.place(id, pos)?;
        self.entities.push(Entity { id, pos, body });
        Ok(id)
    }

    /// One ocean marker on every cell, row-major.
    pub fn fill_ocean(&mut self) -> SimResult<Vec<AgentId>> {
        let cells: Vec<Pos> = self.grid.iter_cells().map(|(pos, _)| pos).collect();
        cells
            .into_iter()
            .map(|pos| self.spawn(pos, Body::Ocean))
            .collect()
    }

    pub fn entity(&self, id: AgentId) -> SimResult<&Entity> {
        self.entities.get(id).ok_or(SimError::UnknownAgent { id })
    }

    pub fn entities(&self) -> impl Iterator<Item = &Entity> + '_ {
        self.entities.iter()
    }

    pub fn len(&self) -> usize {
        self.entities.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entities.is_empty()
    }

    pub fn pos_of(&self, id: AgentId) -> SimResult<Pos> {
        self.entity(id).map(Entity::pos)
    }

    pub fn ids_of_kind(&self, kind: AgentKind) -> Vec<AgentId> {
        self.entities
            .iter()
            .filter(|e| e.kind() == kind)
            .map(|e| e.id)
            .collect()
    }

    /// Move an agent, keeping the grid and its recorded position in step.
    pub fn move_agent(&mut self, id: AgentId, to: Pos) -> SimResult<()> {
        let from = self.pos_of(id)?;
        self.grid.relocate(id, from, to)?;
        self.entities[id].pos = to;
        Ok(())
    }

    /// Agents of `kind` in the Moore neighborhood of `pos`.
    pub fn occupants_of_kind(&self, pos: Pos, include_center: bool, kind: AgentKind) -> Vec<AgentId> {
        self.grid
            .neighbors(pos, Connectivity::Moore, include_center)
            .into_iter()
            .filter(|&id| self.entities.get(id).is_some_and(|e| e.kind() == kind))
            .collect()
    }

    /// Wandering lobsters on the grid, by a full scan of every cell.
    pub fn count_live_lobsters(&self) -> u64 {
        self.grid
            .iter_cells()
            .flat_map(|(_, occupants)| occupants.iter())
            .filter(|&&id| {
                matches!(
                    self.entities.get(id).map(|e| &e.body),
                    Some(Body::Lobster(l)) if l.state == LobsterState::Wander
                )
            })
            .count() as u64
    }

    // ── Typed access ───────────────────────────────────────────

    pub fn lobster(&self, id: AgentId) -> SimResult<&Lobster> {
        match &self.entity(id)?.body {
            Body::Lobster(l) => Ok(l),
            _ => Err(SimError::WrongKind { id, expected: "lobster" }),
        }
    }

    pub fn boat(&self, id: AgentId) -> SimResult<&Boat> {
        match &self.entity(id)?.body {
            Body::Boat(b) => Ok(b),
            _ => Err(SimError::WrongKind { id, expected: "boat" }),
        }
    }

    pub fn heat_spot(&self, id: AgentId) -> SimResult<&HeatSpot> {
        match &self.entity(id)?.body {
            Body::HeatSpot(h) => Ok(h),
            _ => Err(SimError::WrongKind { id, expected: "heat_spot" }),
        }
    }

    pub fn home(&self, id: AgentId) -> SimResult<&Home> {
        match &self.entity(id)?.body {
            Body::Home(h) => Ok(h),
            _ => Err(SimError::WrongKind { id, expected: "home" }),
        }
    }

    fn body_mut(&mut self, id: AgentId) -> SimResult<&mut Body> {
        self.entities
            .get_mut(id)
            .map(|e| &mut e.body)
            .ok_or(SimError::UnknownAgent { id })
    }

    pub fn lobster_mut(&mut self, id: AgentId) -> SimResult<&mut Lobster> {
        match self.body_mut(id)? {
            Body::Lobster(l) => Ok(l),
            _ => Err(SimError::WrongKind { id, expected: "lobster" }),
        }
    }

    pub fn boat_mut(&mut self, id: AgentId) -> SimResult<&mut Boat> {
        match self.body_mut(id)? {
            Body::Boat(b) => Ok(b),
            _ => Err(SimError::WrongKind { id, expected: "boat" }),
        }
    }

    pub(crate) fn heat_spot_mut(&mut self, id: AgentId) -> SimResult<&mut HeatSpot> {
        match self.body_mut(id)? {
            Body::HeatSpot(h) => Ok(h),
            _ => Err(SimError::WrongKind { id, expected: "heat_spot" }),
        }
    }

    pub(crate) fn home_mut(&mut self, id: AgentId) -> SimResult<&mut Home> {
        match self.body_mut(id)? {
            Body::Home(h) => Ok(h),
            _ => Err(SimError::WrongKind { id, expected: "home" }),
        }
    }
}

impl Population for Habitat {
    type Action = Action;

    fn plan(&self, id: AgentId, rng: &mut SimRng) -> SimResult<Action> {
        let action = match &self.entity(id)?.body {
            Body::Ocean | Body::Home(_) => Action::Idle,
            Body::HeatSpot(spot) => Action::HeatSpot(plan_heat_spot(spot, &self.grid)),
            Body::Lobster(lobster) if !lobster.is_wandering() => Action::Idle,
            Body::Lobster(_) => Action::Lobster(plan_lobster(self, id, rng)?),
            Body::Boat(_) => Action::Boat(plan_boat(self, id, rng)?),
        };
        Ok(action)
    }

    fn apply(&mut self, id: AgentId, action: Action, rng: &mut SimRng) -> SimResult<Vec<AgentId>> {
        match action {
            Action::Idle => {}
            Action::HeatSpot(a) => self.apply_heat_spot(id, a)?,
            Action::Lobster(a) => self.apply_lobster(id, a, rng)?,
            Action::Boat(a) => {
                if let Some(caught) = self.apply_boat(id, a)? {
                    return Ok(vec![caught]);
                }
            }
        }
        Ok(Vec::new())
    }
}
