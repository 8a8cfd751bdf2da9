//! Snapshot serialization: what an observer needs to draw the world.
//!
//! An AgentView carries just enough to choose a visual: kind, cell, and
//! the lobster state or boat size/state discriminants.

use crate::{
    agent::{AgentKind, BoatSize, BoatState, Body, Entity, LobsterState},
    habitat::Landings,
    metrics::MetricSample,
    types::{AgentId, Pos, RunId, Tick},
};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AgentView {
    pub id: AgentId,
    pub kind: AgentKind,
    pub pos: Pos,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub lobster_state: Option<LobsterState>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub boat_size: Option<BoatSize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub boat_state: Option<BoatState>,
}

impl AgentView {
    pub fn from_entity(entity: &Entity) -> Self {
        let mut view = Self {
            id: entity.id,
            kind: entity.kind(),
            pos: entity.pos(),
            lobster_state: None,
            boat_size: None,
            boat_state: None,
        };
        match entity.body() {
            Body::Lobster(lobster) => view.lobster_state = Some(lobster.state),
            Body::Boat(boat) => {
                view.boat_size = Some(boat.size);
                view.boat_state = Some(boat.state);
            }
            Body::Ocean | Body::HeatSpot(_) | Body::Home(_) => {}
        }
        view
    }
}

/// Full observable state after a tick. Ocean markers are left out;
/// they cover every cell and carry no state.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WorldSnapshot {
    pub run_id: RunId,
    pub tick: Tick,
    pub running: bool,
    pub width: usize,
    pub height: usize,
    pub live_lobsters: u64,
    pub landings: Landings,
    pub latest_metrics: Option<MetricSample>,
    pub agents: Vec<AgentView>,
}
