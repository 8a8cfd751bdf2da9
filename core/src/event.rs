//! The event log: every notable state change during a run.
//!
//! RULE: Events are observations, never inputs. Nothing in the
//! simulation reads the log back to decide what to do.

use serde::{Deserialize, Serialize};

use crate::{
    agent::{BoatSize, ReturnReason},
    types::{AgentId, Pos, RunId, Tick},
};

/// Every event emitted during simulation.
/// Variants are appended, never removed or reordered.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum SimEvent {
    // ── Engine events ──────────────────────────────
    RunInitialized {
        run_id: RunId,
        seed: u64,
        lobsters: usize,
        small_boats: usize,
        big_boats: usize,
    },
    TickStarted {
        tick: Tick,
    },
    TickCompleted {
        tick: Tick,
        live_lobsters: u64,
    },
    RunFinished {
        tick: Tick,
        big_landings: u64,
        small_landings: u64,
    },

    // ── Thermal front ──────────────────────────────
    HeatSpotDrifted {
        tick: Tick,
        heat_spot_id: AgentId,
        row: usize,
    },

    // ── Fleet ──────────────────────────────────────
    LobsterCaught {
        tick: Tick,
        boat_id: AgentId,
        lobster_id: AgentId,
        pos: Pos,
    },
    BoatReturning {
        tick: Tick,
        boat_id: AgentId,
        held: u32,
        reason: ReturnReason,
    },
    CatchLanded {
        tick: Tick,
        boat_id: AgentId,
        port_id: AgentId,
        size: BoatSize,
        amount: u32,
    },
    CatchBanked {
        tick: Tick,
        boat_id: AgentId,
        size: BoatSize,
        amount: u32,
    },
}

impl SimEvent {
    /// Stable string name of the variant.
    pub fn type_name(&self) -> &'static str {
        match self {
            SimEvent::RunInitialized { .. }  => "run_initialized",
            SimEvent::TickStarted { .. }     => "tick_started",
            SimEvent::TickCompleted { .. }   => "tick_completed",
            SimEvent::RunFinished { .. }     => "run_finished",
            SimEvent::HeatSpotDrifted { .. } => "heat_spot_drifted",
            SimEvent::LobsterCaught { .. }   => "lobster_caught",
            SimEvent::BoatReturning { .. }   => "boat_returning",
            SimEvent::CatchLanded { .. }     => "catch_landed",
            SimEvent::CatchBanked { .. }     => "catch_banked",
        }
    }

    /// The tick the event belongs to. Run initialization is tick 0.
    pub fn tick(&self) -> Tick {
        match self {
            SimEvent::RunInitialized { .. } => 0,
            SimEvent::TickStarted { tick }
            | SimEvent::TickCompleted { tick, .. }
            | SimEvent::RunFinished { tick, .. }
            | SimEvent::HeatSpotDrifted { tick, .. }
            | SimEvent::LobsterCaught { tick, .. }
            | SimEvent::BoatReturning { tick, .. }
            | SimEvent::CatchLanded { tick, .. }
            | SimEvent::CatchBanked { tick, .. } => *tick,
        }
    }
}
