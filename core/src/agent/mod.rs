//! Agent bodies and the per-kind actions they plan each tick.
//!
//! Every agent lives in the `Habitat` arena as an `Entity`. The
//! kind-specific state is the `Body`; behavior lives next to each body
//! type as a `plan_*` function (read-only) and an `apply_*` method on
//! `Habitat` (the only code allowed to mutate).

pub mod boat;
pub mod heat_spot;
pub mod home;
pub mod lobster;

pub use boat::{Boat, BoatAction, BoatSize, BoatState, ReturnReason};
pub use heat_spot::{HeatSpot, HeatSpotAction};
pub use home::{Home, PortSize};
pub use lobster::{Lobster, LobsterAction, LobsterState};

use serde::{Deserialize, Serialize};

use crate::types::{AgentId, Pos};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AgentKind {
    Ocean,
    HeatSpot,
    Home,
    Lobster,
    Boat,
}

impl AgentKind {
    pub fn name(&self) -> &'static str {
        match self {
            Self::Ocean    => "ocean",
            Self::HeatSpot => "heat_spot",
            Self::Home     => "home",
            Self::Lobster  => "lobster",
            Self::Boat     => "boat",
        }
    }
}

/// Kind-specific agent state. Ocean cells carry none.
#[derive(Debug, Clone, PartialEq)]
pub enum Body {
    Ocean,
    HeatSpot(HeatSpot),
    Home(Home),
    Lobster(Lobster),
    Boat(Boat),
}

impl Body {
    pub fn kind(&self) -> AgentKind {
        match self {
            Body::Ocean       => AgentKind::Ocean,
            Body::HeatSpot(_) => AgentKind::HeatSpot,
            Body::Home(_)     => AgentKind::Home,
            Body::Lobster(_)  => AgentKind::Lobster,
            Body::Boat(_)     => AgentKind::Boat,
        }
    }
}

/// An agent in the arena. `pos` is only ever written by `Habitat`,
/// together with the grid index.
#[derive(Debug, Clone, PartialEq)]
pub struct Entity {
    pub id: AgentId,
    pub(crate) pos: Pos,
    pub(crate) body: Body,
}

impl Entity {
    pub fn pos(&self) -> Pos {
        self.pos
    }

    pub fn body(&self) -> &Body {
        &self.body
    }

    pub fn kind(&self) -> AgentKind {
        self.body.kind()
    }
}

/// What one agent decided to do this tick.
#[derive(Debug, Clone, PartialEq)]
pub enum Action {
    /// Ocean cells and ports have no behavior.
    Idle,
    HeatSpot(HeatSpotAction),
    Lobster(LobsterAction),
    Boat(BoatAction),
}
