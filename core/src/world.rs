//! The World: the heart of the lobster fishery simulation.
//!
//! TICK ORDER (fixed, documented, never reordered):
//!   1. Scheduler activates every registered agent, in creation order:
//!      ports, ocean cells, heat spots, boats, lobsters.
//!   2. Live lobster recount (full grid scan).
//!   3. One metric sample.
//!   4. At the horizon: every boat banks its hold, a second metric
//!      sample is taken and the run is marked finished.
//!
//! RULES:
//!   - All randomness flows through the RngBank.
//!   - Notable state changes are recorded in the event log.
//!   - Observers read World state after step(); step() returns nothing.

use serde::{Deserialize, Serialize};

use crate::{
    agent::{AgentKind, Boat, BoatSize, BoatState, Body, HeatSpot, Home, Lobster, LobsterState, PortSize},
    clock::SimClock,
    config::SimConfig,
    error::{SimError, SimResult},
    event::SimEvent,
    habitat::{Habitat, Landings},
    metrics::{MetricSample, MetricsCollector},
    rng::{RngBank, StreamSlot},
    scheduler::Scheduler,
    snapshot::{AgentView, WorldSnapshot},
    types::{AgentId, Pos, RunId, Tick},
};

pub const PORT_COUNT: usize = 3;
/// Port choice for a new boat: below the first cutoff the first port,
/// below the second the second, otherwise the third.
pub const PORT_SHARE_CUTOFFS: [f64; 2] = [0.33, 0.66];
/// Boats start somewhere in rows 0..=BOAT_MAX_START_ROW.
pub const BOAT_MAX_START_ROW: usize = 3;
/// Lobsters start on this row or beyond.
pub const LOBSTER_MIN_START_ROW: usize = 4;

/// Agent counts by state.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Census {
    pub wandering: usize,
    pub caught: usize,
    pub searching: usize,
    pub returning: usize,
    /// Unable boats sitting at their home port for good.
    pub docked: usize,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FleetMix {
    pub small: usize,
    pub big: usize,
}

pub struct World {
    pub run_id: RunId,
    pub clock: SimClock,
    config: SimConfig,
    rng_bank: RngBank,
    habitat: Habitat,
    scheduler: Scheduler,
    metrics: MetricsCollector,
    event_log: Vec<SimEvent>,
    live_lobsters: u64,
}

impl World {
    /// A world with an empty grid and nothing scheduled. Use the `add_*`
    /// methods to build a custom scenario.
    pub fn empty(run_id: RunId, config: SimConfig, seed: u64) -> SimResult<Self> {
        config.validate()?;
        Ok(Self {
            clock: SimClock::new(run_id.clone()),
            habitat: Habitat::new(config.width, config.height),
            rng_bank: RngBank::new(seed),
            scheduler: Scheduler::new(),
            metrics: MetricsCollector::new(),
            event_log: Vec::new(),
            live_lobsters: 0,
            config,
            run_id,
        })
    }

    /// Build the reference scenario: three big ports on the first row,
    /// ocean everywhere, a line of heat spots, the fleet near the ports
    /// and the lobsters further out.
    pub fn new(run_id: RunId, config: SimConfig, seed: u64) -> SimResult<Self> {
        let mut world = Self::empty(run_id, config, seed)?;
        world.populate()?;

        let fleet = world.fleet_mix();
        world.live_lobsters = world.habitat.count_live_lobsters();
        log::info!(
            "run {} initialized: seed={seed} grid={}x{} lobsters={} boats={} (small={}, big={})",
            world.run_id,
            world.config.width,
            world.config.height,
            world.live_lobsters,
            fleet.small + fleet.big,
            fleet.small,
            fleet.big,
        );
        world.event_log.push(SimEvent::RunInitialized {
            run_id: world.run_id.clone(),
            seed,
            lobsters: world.config.num_lobsters,
            small_boats: fleet.small,
            big_boats: fleet.big,
        });
        Ok(world)
    }

    fn populate(&mut self) -> SimResult<()> {
        let mut rng = self.rng_bank.for_stream(StreamSlot::Setup);
        let (width, height) = (self.config.width, self.config.height);

        let ports = (1..=PORT_COUNT)
            .map(|k| self.add_port(Pos::new(width * k / (PORT_COUNT + 1), 0), PortSize::Big))
            .collect::<SimResult<Vec<_>>>()?;

        self.fill_ocean()?;

        for x in 0..width {
            self.add_heat_spot(Pos::new(x, self.config.heat_start_row))?;
        }

        let boat_rows = BOAT_MAX_START_ROW.min(height - 1);
        for _ in 0..self.config.num_boats {
            let pos = Pos::new(rng.range_inclusive(0, width - 1), rng.range_inclusive(0, boat_rows));
            let size_draw = rng.next_f64();
            let port_draw = rng.next_f64();

            let home = match port_draw {
                d if d < PORT_SHARE_CUTOFFS[0] => ports[0],
                d if d < PORT_SHARE_CUTOFFS[1] => ports[1],
                _ => ports[2],
            };
            self.add_boat(pos, home, BoatSize::from_draw(size_draw, self.config.density))?;
        }

        let lobster_rows = LOBSTER_MIN_START_ROW.min(height - 1);
        for _ in 0..self.config.num_lobsters {
            let pos = Pos::new(
                rng.range_inclusive(0, width - 1),
                rng.range_inclusive(lobster_rows, height - 1),
            );
            self.add_lobster(pos)?;
        }
        Ok(())
    }

    // ── Scenario building ──────────────────────────────────────

    fn spawn_scheduled(&mut self, pos: Pos, body: Body) -> SimResult<AgentId> {
        let id = self.habitat.spawn(pos, body)?;
        self.scheduler.add(id);
        Ok(id)
    }

    pub fn add_port(&mut self, pos: Pos, size: PortSize) -> SimResult<AgentId> {
        self.spawn_scheduled(pos, Body::Home(Home::new(size)))
    }

    /// One ocean marker on every cell.
    pub fn fill_ocean(&mut self) -> SimResult<()> {
        for id in self.habitat.fill_ocean()? {
            self.scheduler.add(id);
        }
        Ok(())
    }

    pub fn add_heat_spot(&mut self, pos: Pos) -> SimResult<AgentId> {
        self.spawn_scheduled(pos, Body::HeatSpot(HeatSpot::new(pos)))
    }

    pub fn add_lobster(&mut self, pos: Pos) -> SimResult<AgentId> {
        self.spawn_scheduled(pos, Body::Lobster(Lobster::new()))
    }

    /// Add a boat homed at the port `home`.
    pub fn add_boat(&mut self, pos: Pos, home: AgentId, size: BoatSize) -> SimResult<AgentId> {
        self.habitat.home(home)?;
        self.spawn_scheduled(pos, Body::Boat(Boat::new(home, size)))
    }

    // ── Ticking ────────────────────────────────────────────────

    /// Advance one tick. A finished run is left untouched.
    pub fn step(&mut self) -> SimResult<()> {
        if !self.clock.running {
            log::warn!(
                "step() called on finished run {} at tick {}",
                self.run_id,
                self.clock.current_tick
            );
            return Ok(());
        }

        let tick = self.clock.advance();
        self.habitat.begin_tick(tick);
        self.event_log.push(SimEvent::TickStarted { tick });

        let mut rng = self.rng_bank.for_stream_at_tick(StreamSlot::Activation, tick);
        let report = self
            .scheduler
            .step(&mut self.habitat, &mut rng, self.config.activation)?;

        self.live_lobsters = self.habitat.count_live_lobsters();
        self.collect_metrics(tick);

        let finished = self.scheduler.steps() >= self.config.sim_length;
        if finished {
            self.bank_all_boats()?;
            self.collect_metrics(tick);
            self.clock.finish();
        }

        self.event_log.extend(self.habitat.drain_events());
        let landings = self.habitat.landings();
        if finished {
            log::info!(
                "run {} finished at tick {tick}: lobsters={} big={} small={}",
                self.run_id,
                self.live_lobsters,
                landings.big,
                landings.small
            );
            self.event_log.push(SimEvent::RunFinished {
                tick,
                big_landings: landings.big,
                small_landings: landings.small,
            });
        }
        self.event_log.push(SimEvent::TickCompleted {
            tick,
            live_lobsters: self.live_lobsters,
        });

        log::debug!(
            "tick={tick} activated={} caught={} lobsters={} big={} small={}",
            report.activated,
            report.retired.len(),
            self.live_lobsters,
            landings.big,
            landings.small
        );
        Ok(())
    }

    /// Step until the horizon is reached. Returns the final tick.
    pub fn run_to_end(&mut self) -> SimResult<Tick> {
        while self.clock.running {
            self.step()?;
        }
        Ok(self.clock.current_tick)
    }

    /// Run at most `n` ticks, stopping early if the run finishes.
    pub fn run_ticks(&mut self, n: u64) -> SimResult<()> {
        for _ in 0..n {
            if !self.clock.running {
                break;
            }
            self.step()?;
        }
        Ok(())
    }

    fn collect_metrics(&mut self, tick: Tick) {
        let landings = self.habitat.landings();
        self.metrics.collect(MetricSample {
            tick,
            lobsters: self.live_lobsters,
            big_landings: landings.big,
            small_landings: landings.small,
        });
    }

    fn bank_all_boats(&mut self) -> SimResult<()> {
        let policy = self.config.end_of_run_banking;
        for id in self.habitat.ids_of_kind(AgentKind::Boat) {
            self.habitat.bank_held_catch(id, policy)?;
        }
        Ok(())
    }

    // ── Observation ────────────────────────────────────────────

    pub fn config(&self) -> &SimConfig {
        &self.config
    }

    pub fn seed(&self) -> u64 {
        self.rng_bank.master_seed()
    }

    pub fn habitat(&self) -> &Habitat {
        &self.habitat
    }

    pub fn scheduler(&self) -> &Scheduler {
        &self.scheduler
    }

    pub fn is_running(&self) -> bool {
        self.clock.running
    }

    pub fn tick(&self) -> Tick {
        self.clock.current_tick
    }

    /// Live lobster count as of the last completed tick.
    pub fn live_lobsters(&self) -> u64 {
        self.live_lobsters
    }

    /// Recount wandering lobsters now. Read-only.
    pub fn count_live_lobsters(&self) -> u64 {
        self.habitat.count_live_lobsters()
    }

    pub fn landings(&self) -> Landings {
        self.habitat.landings()
    }

    pub fn metrics(&self) -> &MetricsCollector {
        &self.metrics
    }

    pub fn events(&self) -> &[SimEvent] {
        &self.event_log
    }

    pub fn events_for_tick(&self, tick: Tick) -> Vec<&SimEvent> {
        self.event_log.iter().filter(|e| e.tick() == tick).collect()
    }

    /// Direct access to a boat, for scenario setup.
    pub fn boat_mut(&mut self, id: AgentId) -> SimResult<&mut Boat> {
        self.habitat.boat_mut(id)
    }

    pub fn census(&self) -> Census {
        let mut census = Census::default();
        for entity in self.habitat.entities() {
            match entity.body() {
                Body::Lobster(l) => match l.state {
                    LobsterState::Wander => census.wandering += 1,
                    LobsterState::Caught => census.caught += 1,
                },
                Body::Boat(b) => match b.state {
                    BoatState::Search => census.searching += 1,
                    BoatState::Return => {
                        census.returning += 1;
                        let at_home = self.habitat.pos_of(b.home()).ok() == Some(entity.pos());
                        if b.is_unable() && at_home {
                            census.docked += 1;
                        }
                    }
                },
                Body::Ocean | Body::HeatSpot(_) | Body::Home(_) => {}
            }
        }
        census
    }

    pub fn fleet_mix(&self) -> FleetMix {
        let mut mix = FleetMix::default();
        for entity in self.habitat.entities() {
            if let Body::Boat(b) = entity.body() {
                match b.size {
                    BoatSize::Small => mix.small += 1,
                    BoatSize::Big   => mix.big += 1,
                }
            }
        }
        mix
    }

    /// Every agent, ocean markers included, in creation order.
    pub fn agent_views(&self) -> Vec<AgentView> {
        self.habitat.entities().map(AgentView::from_entity).collect()
    }

    pub fn snapshot(&self) -> WorldSnapshot {
        WorldSnapshot {
            run_id: self.run_id.clone(),
            tick: self.clock.current_tick,
            running: self.clock.running,
            width: self.config.width,
            height: self.config.height,
            live_lobsters: self.live_lobsters,
            landings: self.habitat.landings(),
            latest_metrics: self.metrics.latest().copied(),
            agents: self
                .habitat
                .entities()
                .filter(|e| e.kind() != AgentKind::Ocean)
                .map(AgentView::from_entity)
                .collect(),
        }
    }

    /// The snapshot as a JSON string.
    pub fn snapshot_json(&self) -> SimResult<String> {
        serde_json::to_string(&self.snapshot()).map_err(SimError::from)
    }
}
