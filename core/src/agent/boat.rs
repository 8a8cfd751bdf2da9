//! Boat behavior: a two-state machine evaluated once per activation.
//!
//! SEARCH
//!   - Small boats may only search above SMALL_BOAT_ROW_LIMIT; past it
//!     the boat is marked unable and heads home for good.
//!   - A full boat heads home without fishing.
//!   - Otherwise: steam one row further while above the depth limit
//!     (BASE_DEPTH + turn / DEPTH_GROWTH_INTERVAL), else drift to a
//!     random neighbor cell. Then catch the first wandering lobster in
//!     reach. Filling up turns the boat for home in the same activation.
//! RETURN
//!   - Away from home: step to the ocean cell nearest the home port.
//!   - At home: land the catch, and go back to searching unless unable.

use serde::{Deserialize, Serialize};

use crate::{
    agent::{AgentKind, LobsterState},
    config::EndOfRunBanking,
    error::SimResult,
    event::SimEvent,
    grid::Connectivity,
    habitat::Habitat,
    rng::SimRng,
    types::{AgentId, Pos},
};

pub const SMALL_CAPACITY: u32 = 5;
pub const BIG_CAPACITY: u32 = 10;
/// Small boats cannot search on this row or beyond.
pub const SMALL_BOAT_ROW_LIMIT: usize = 26;
pub const BASE_DEPTH: usize = 4;
pub const DEPTH_GROWTH_INTERVAL: u64 = 5;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum BoatSize {
    Small,
    Big,
}

impl BoatSize {
    /// Fleet mix draw: `draw <= density` gives a small boat.
    pub fn from_draw(draw: f64, density: f64) -> Self {
        if draw <= density {
            Self::Small
        } else {
            Self::Big
        }
    }

    pub fn capacity(self) -> u32 {
        match self {
            Self::Small => SMALL_CAPACITY,
            Self::Big   => BIG_CAPACITY,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum BoatState {
    Search,
    Return,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReturnReason {
    Full,
    Unable,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Boat {
    pub size: BoatSize,
    pub state: BoatState,
    home: AgentId,
    held: u32,
    turn: u64,
    unable: bool,
}

impl Boat {
    pub fn new(home: AgentId, size: BoatSize) -> Self {
        Self {
            size,
            state: BoatState::Search,
            home,
            held: 0,
            turn: 0,
            unable: false,
        }
    }

    pub fn home(&self) -> AgentId {
        self.home
    }

    pub fn held(&self) -> u32 {
        self.held
    }

    pub fn turn(&self) -> u64 {
        self.turn
    }

    pub fn is_unable(&self) -> bool {
        self.unable
    }

    pub fn capacity(&self) -> u32 {
        self.size.capacity()
    }

    pub fn is_full(&self) -> bool {
        self.held >= self.capacity()
    }

    /// Load the hold directly. Panics past capacity.
    pub fn set_held(&mut self, held: u32) {
        assert!(
            held <= self.capacity(),
            "hold of {held} exceeds {:?} capacity {}",
            self.size,
            self.capacity()
        );
        self.held = held;
    }

    /// Whether this boat may keep searching from `pos`.
    pub fn can_search_at(&self, pos: Pos) -> bool {
        match self.size {
            BoatSize::Small => pos.y < SMALL_BOAT_ROW_LIMIT,
            BoatSize::Big   => true,
        }
    }

    /// Rows above this limit are crossed straight toward the front.
    pub fn depth_limit(turn: u64) -> usize {
        BASE_DEPTH + (turn / DEPTH_GROWTH_INTERVAL) as usize
    }

    fn take_catch(&mut self) -> u32 {
        std::mem::take(&mut self.held)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BoatAction {
    /// Move to `to`, then land on and catch `catch` if it is still free.
    Search { to: Pos, catch: Option<AgentId> },
    HeadHome { reason: ReturnReason },
    /// One step of the voyage home. `None` when no ocean cell is adjacent.
    Steer { to: Option<Pos> },
    Land,
}

pub(crate) fn plan_boat(habitat: &Habitat, id: AgentId, rng: &mut SimRng) -> SimResult<BoatAction> {
    let boat = habitat.boat(id)?;
    let pos = habitat.pos_of(id)?;
    let turn = boat.turn + 1;

    match boat.state {
        BoatState::Search => {
            if !boat.can_search_at(pos) {
                return Ok(BoatAction::HeadHome { reason: ReturnReason::Unable });
            }
            if boat.is_full() {
                return Ok(BoatAction::HeadHome { reason: ReturnReason::Full });
            }

            let toward_front = pos
                .next_row()
                .filter(|p| pos.y < Boat::depth_limit(turn) && habitat.grid().in_bounds(*p));
            let to = match toward_front {
                Some(p) => p,
                None => random_neighbor(habitat, pos, rng),
            };

            let catch = find_catch(habitat, to)?;
            Ok(BoatAction::Search { to, catch })
        }
        BoatState::Return => {
            let home_pos = habitat.pos_of(boat.home)?;
            if pos == home_pos {
                return Ok(BoatAction::Land);
            }
            Ok(BoatAction::Steer {
                to: route_home(habitat, pos, home_pos, rng),
            })
        }
    }
}

/// Any in-bounds cell of the neighborhood, staying put included.
fn random_neighbor(habitat: &Habitat, pos: Pos, rng: &mut SimRng) -> Pos {
    let cells = habitat.grid().neighborhood(pos, Connectivity::Moore, true);
    rng.pick(&cells).copied().unwrap_or(pos)
}

/// The first wandering lobster within reach of `pos`, its own cell included.
fn find_catch(habitat: &Habitat, pos: Pos) -> SimResult<Option<AgentId>> {
    for lobster in habitat.occupants_of_kind(pos, true, AgentKind::Lobster) {
        if habitat.lobster(lobster)?.is_wandering() {
            return Ok(Some(lobster));
        }
    }
    Ok(None)
}

/// Among the adjacent ocean cells, those closest to home; ties are
/// broken at random.
fn route_home(habitat: &Habitat, pos: Pos, home: Pos, rng: &mut SimRng) -> Option<Pos> {
    let mut waters: Vec<Pos> = Vec::new();
    for ocean in habitat.occupants_of_kind(pos, false, AgentKind::Ocean) {
        if let Ok(cell) = habitat.pos_of(ocean) {
            waters.push(cell);
        }
    }

    let nearest = waters
        .iter()
        .map(|cell| cell.distance(home))
        .fold(f64::INFINITY, f64::min);
    let finalists: Vec<Pos> = waters
        .into_iter()
        .filter(|cell| cell.distance(home) == nearest)
        .collect();
    rng.pick(&finalists).copied()
}

impl Habitat {
    /// Returns the lobster caught this activation, if any.
    pub(crate) fn apply_boat(&mut self, id: AgentId, action: BoatAction) -> SimResult<Option<AgentId>> {
        self.boat_mut(id)?.turn += 1;

        match action {
            BoatAction::Search { to, catch } => {
                self.move_agent(id, to)?;
                let Some(lobster) = catch else {
                    return Ok(None);
                };
                // Another boat may have got there first this tick, or the
                // lobster may have moved out of reach since the plan.
                let in_reach = to.within_reach(self.pos_of(lobster)?);
                if !in_reach || !self.lobster(lobster)?.is_wandering() {
                    return Ok(None);
                }
                self.haul(id, lobster)?;
                Ok(Some(lobster))
            }
            BoatAction::HeadHome { reason } => {
                let boat = self.boat_mut(id)?;
                if reason == ReturnReason::Unable {
                    boat.unable = true;
                }
                self.turn_for_home(id, reason)?;
                Ok(None)
            }
            BoatAction::Steer { to } => {
                if let Some(to) = to {
                    self.move_agent(id, to)?;
                }
                Ok(None)
            }
            BoatAction::Land => {
                self.land(id)?;
                Ok(None)
            }
        }
    }

    fn haul(&mut self, id: AgentId, lobster: AgentId) -> SimResult<()> {
        let at = self.pos_of(lobster)?;
        self.move_agent(id, at)?;
        self.lobster_mut(lobster)?.change_state(LobsterState::Caught);

        let boat = self.boat_mut(id)?;
        assert!(
            boat.held < boat.capacity(),
            "boat {id} would exceed its capacity of {}",
            boat.capacity()
        );
        boat.held += 1;
        let full = boat.is_full();

        log::trace!("boat {id} caught lobster {lobster} at {at}");
        self.record(SimEvent::LobsterCaught {
            tick: self.tick(),
            boat_id: id,
            lobster_id: lobster,
            pos: at,
        });

        if full {
            self.turn_for_home(id, ReturnReason::Full)?;
        }
        Ok(())
    }

    fn turn_for_home(&mut self, id: AgentId, reason: ReturnReason) -> SimResult<()> {
        let boat = self.boat_mut(id)?;
        boat.state = BoatState::Return;
        let held = boat.held;
        log::debug!("boat {id} heading home ({reason:?}) holding {held}");
        self.record(SimEvent::BoatReturning {
            tick: self.tick(),
            boat_id: id,
            held,
            reason,
        });
        Ok(())
    }

    fn land(&mut self, id: AgentId) -> SimResult<()> {
        let boat = self.boat_mut(id)?;
        if !boat.unable {
            boat.state = BoatState::Search;
        }
        let size = boat.size;
        let port = boat.home;
        let amount = boat.take_catch();
        if amount == 0 {
            return Ok(());
        }

        self.landings.credit(size, amount);
        self.home_mut(port)?.add(u64::from(amount));
        log::debug!("boat {id} landed {amount} at port {port}");
        self.record(SimEvent::CatchLanded {
            tick: self.tick(),
            boat_id: id,
            port_id: port,
            size,
            amount,
        });
        Ok(())
    }

    /// End-of-run banking: whatever is still in the hold counts as landed.
    pub(crate) fn bank_held_catch(&mut self, id: AgentId, policy: EndOfRunBanking) -> SimResult<u32> {
        let boat = self.boat_mut(id)?;
        let size = boat.size;
        let amount = boat.take_catch();
        if amount == 0 {
            return Ok(0);
        }

        let credited = match policy {
            EndOfRunBanking::BySize   => size,
            EndOfRunBanking::AllToBig => BoatSize::Big,
        };
        self.landings.credit(credited, amount);
        self.record(SimEvent::CatchBanked {
            tick: self.tick(),
            boat_id: id,
            size: credited,
            amount,
        });
        Ok(amount)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        agent::{Body, Home, Lobster, PortSize},
        rng::{RngBank, StreamSlot},
    };

    fn rng(seed: u64) -> SimRng {
        RngBank::new(seed).for_stream(StreamSlot::Activation)
    }

    fn harbor() -> (Habitat, AgentId) {
        let mut habitat = Habitat::new(10, 30);
        let port = habitat.spawn(Pos::new(5, 0), Body::Home(Home::new(PortSize::Big))).unwrap();
        (habitat, port)
    }

    #[test]
    fn depth_limit_grows_every_five_turns() {
        assert_eq!(Boat::depth_limit(1), 4);
        assert_eq!(Boat::depth_limit(4), 4);
        assert_eq!(Boat::depth_limit(5), 5);
        assert_eq!(Boat::depth_limit(12), 6);
    }

    #[test]
    fn small_boat_past_row_limit_is_unable() {
        let (mut habitat, port) = harbor();
        let boat = habitat
            .spawn(Pos::new(3, SMALL_BOAT_ROW_LIMIT), Body::Boat(Boat::new(port, BoatSize::Small)))
            .unwrap();
        let action = plan_boat(&habitat, boat, &mut rng(1)).unwrap();
        assert_eq!(action, BoatAction::HeadHome { reason: ReturnReason::Unable });

        habitat.apply_boat(boat, action).unwrap();
        let state = habitat.boat(boat).unwrap();
        assert!(state.is_unable());
        assert_eq!(state.state, BoatState::Return);
    }

    #[test]
    fn big_boat_keeps_searching_past_row_limit() {
        let (mut habitat, port) = harbor();
        let boat = habitat
            .spawn(Pos::new(3, SMALL_BOAT_ROW_LIMIT + 1), Body::Boat(Boat::new(port, BoatSize::Big)))
            .unwrap();
        let action = plan_boat(&habitat, boat, &mut rng(1)).unwrap();
        assert!(matches!(action, BoatAction::Search { .. }));
    }

    #[test]
    fn heads_for_the_front_above_depth_limit() {
        let (mut habitat, port) = harbor();
        let boat = habitat
            .spawn(Pos::new(7, 1), Body::Boat(Boat::new(port, BoatSize::Small)))
            .unwrap();
        let action = plan_boat(&habitat, boat, &mut rng(1)).unwrap();
        assert_eq!(action, BoatAction::Search { to: Pos::new(7, 2), catch: None });
    }

    #[test]
    fn catching_the_last_slot_turns_for_home() {
        let (mut habitat, port) = harbor();
        let boat = habitat
            .spawn(Pos::new(5, 10), Body::Boat(Boat::new(port, BoatSize::Small)))
            .unwrap();
        habitat.boat_mut(boat).unwrap().set_held(SMALL_CAPACITY - 1);
        let lobster = habitat.spawn(Pos::new(6, 11), Body::Lobster(Lobster::new())).unwrap();

        let caught = habitat
            .apply_boat(boat, BoatAction::Search { to: Pos::new(5, 10), catch: Some(lobster) })
            .unwrap();

        assert_eq!(caught, Some(lobster));
        assert_eq!(habitat.pos_of(boat).unwrap(), Pos::new(6, 11));
        let state = habitat.boat(boat).unwrap();
        assert_eq!(state.held(), SMALL_CAPACITY);
        assert_eq!(state.state, BoatState::Return);
        assert!(!habitat.lobster(lobster).unwrap().is_wandering());
    }

    #[test]
    fn catch_of_an_already_caught_lobster_is_void() {
        let (mut habitat, port) = harbor();
        let boat = habitat
            .spawn(Pos::new(5, 10), Body::Boat(Boat::new(port, BoatSize::Big)))
            .unwrap();
        let lobster = habitat.spawn(Pos::new(5, 11), Body::Lobster(Lobster::new())).unwrap();
        habitat.lobster_mut(lobster).unwrap().change_state(LobsterState::Caught);

        let caught = habitat
            .apply_boat(boat, BoatAction::Search { to: Pos::new(5, 10), catch: Some(lobster) })
            .unwrap();
        assert_eq!(caught, None);
        assert_eq!(habitat.boat(boat).unwrap().held(), 0);
    }

    #[test]
    fn catch_of_a_lobster_out_of_reach_is_void() {
        let (mut habitat, port) = harbor();
        let boat = habitat
            .spawn(Pos::new(5, 2), Body::Boat(Boat::new(port, BoatSize::Big)))
            .unwrap();
        // Planned from (5, 3) while the lobster sat at (5, 4).
        let lobster = habitat.spawn(Pos::new(5, 6), Body::Lobster(Lobster::new())).unwrap();

        let caught = habitat
            .apply_boat(boat, BoatAction::Search { to: Pos::new(5, 3), catch: Some(lobster) })
            .unwrap();

        assert_eq!(caught, None);
        assert_eq!(habitat.pos_of(boat).unwrap(), Pos::new(5, 3));
        assert_eq!(habitat.boat(boat).unwrap().held(), 0);
        assert!(habitat.lobster(lobster).unwrap().is_wandering());
    }

    #[test]
    fn fleet_draw_at_density_is_small() {
        assert_eq!(BoatSize::from_draw(0.5, 0.5), BoatSize::Small);
        assert_eq!(BoatSize::from_draw(0.49, 0.5), BoatSize::Small);
        assert_eq!(BoatSize::from_draw(0.51, 0.5), BoatSize::Big);
        assert_eq!(BoatSize::from_draw(0.3, 0.0), BoatSize::Big);
    }

    #[test]
    fn route_home_picks_nearest_ocean_cell() {
        let (mut habitat, port) = harbor();
        habitat.fill_ocean().unwrap();
        let boat = habitat
            .spawn(Pos::new(5, 4), Body::Boat(Boat::new(port, BoatSize::Big)))
            .unwrap();
        habitat.boat_mut(boat).unwrap().state = BoatState::Return;

        let action = plan_boat(&habitat, boat, &mut rng(4)).unwrap();
        assert_eq!(action, BoatAction::Steer { to: Some(Pos::new(5, 3)) });
    }

    #[test]
    fn no_ocean_nearby_means_holding_position() {
        let (mut habitat, port) = harbor();
        let boat = habitat
            .spawn(Pos::new(5, 4), Body::Boat(Boat::new(port, BoatSize::Big)))
            .unwrap();
        habitat.boat_mut(boat).unwrap().state = BoatState::Return;
        let action = plan_boat(&habitat, boat, &mut rng(4)).unwrap();
        assert_eq!(action, BoatAction::Steer { to: None });
    }

    #[test]
    fn landing_credits_port_and_aggregate() {
        let (mut habitat, port) = harbor();
        let boat = habitat
            .spawn(Pos::new(5, 0), Body::Boat(Boat::new(port, BoatSize::Small)))
            .unwrap();
        {
            let state = habitat.boat_mut(boat).unwrap();
            state.set_held(4);
            state.state = BoatState::Return;
        }

        let action = plan_boat(&habitat, boat, &mut rng(2)).unwrap();
        assert_eq!(action, BoatAction::Land);
        habitat.apply_boat(boat, action).unwrap();

        assert_eq!(habitat.landings().small, 4);
        assert_eq!(habitat.landings().big, 0);
        assert_eq!(habitat.home(port).unwrap().landed(), 4);
        let state = habitat.boat(boat).unwrap();
        assert_eq!(state.held(), 0);
        assert_eq!(state.state, BoatState::Search);
    }

    #[test]
    fn unable_boat_stays_docked_after_landing() {
        let (mut habitat, port) = harbor();
        let boat = habitat
            .spawn(Pos::new(5, 0), Body::Boat(Boat::new(port, BoatSize::Small)))
            .unwrap();
        {
            let state = habitat.boat_mut(boat).unwrap();
            state.unable = true;
            state.state = BoatState::Return;
        }
        habitat.apply_boat(boat, BoatAction::Land).unwrap();
        assert_eq!(habitat.boat(boat).unwrap().state, BoatState::Return);
    }

    #[test]
    fn banking_policy_picks_the_aggregate() {
        let (mut habitat, port) = harbor();
        let boat = habitat
            .spawn(Pos::new(1, 5), Body::Boat(Boat::new(port, BoatSize::Small)))
            .unwrap();

        habitat.boat_mut(boat).unwrap().set_held(3);
        assert_eq!(habitat.bank_held_catch(boat, EndOfRunBanking::BySize).unwrap(), 3);
        assert_eq!(habitat.landings().small, 3);

        habitat.boat_mut(boat).unwrap().set_held(2);
        habitat.bank_held_catch(boat, EndOfRunBanking::AllToBig).unwrap();
        assert_eq!(habitat.landings().big, 2);
        assert_eq!(habitat.boat(boat).unwrap().held(), 0);
    }

    #[test]
    #[should_panic]
    fn overfilling_the_hold_panics() {
        let mut boat = Boat::new(0, BoatSize::Small);
        boat.set_held(SMALL_CAPACITY + 1);
    }
}
