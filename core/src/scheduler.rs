//! Activation scheduler and the population trait it drives.
//!
//! RULE: The scheduler owns the set of active agents. Agents never
//! hold a handle to it; an agent leaves the schedule because `apply`
//! reported it as retired, and the scheduler removes it.
//!
//! Two activation policies:
//!   - Sequential: plan and apply one agent at a time, in registration
//!     order. Later agents see earlier agents' moves within the tick.
//!   - SnapshotCommit: every agent plans against the state as of the
//!     start of the tick, then all plans are applied in registration
//!     order. Conflicts are resolved by `apply`.

use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use crate::{error::SimResult, rng::SimRng, types::AgentId, types::Tick};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ActivationPolicy {
    #[default]
    Sequential,
    SnapshotCommit,
}

/// Something the scheduler can activate agent by agent.
pub trait Population {
    type Action;

    /// Decide what `id` does this tick. Must not mutate shared state.
    fn plan(&self, id: AgentId, rng: &mut SimRng) -> SimResult<Self::Action>;

    /// Carry out a planned action. Returns the agents that must leave
    /// the schedule as a consequence.
    fn apply(
        &mut self,
        id: AgentId,
        action: Self::Action,
        rng: &mut SimRng,
    ) -> SimResult<Vec<AgentId>>;
}

/// Outcome of one scheduler step.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StepReport {
    pub tick: Tick,
    pub activated: usize,
    pub retired: Vec<AgentId>,
}

#[derive(Debug, Clone, Default)]
pub struct Scheduler {
    /// Activation order.
    agents: Vec<AgentId>,
    members: HashSet<AgentId>,
    steps: Tick,
}

impl Scheduler {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register an agent. Registering twice is a no-op.
    pub fn add(&mut self, id: AgentId) {
        if self.members.insert(id) {
            self.agents.push(id);
        }
    }

    /// Deregister an agent. Returns whether it was registered.
    pub fn remove(&mut self, id: AgentId) -> bool {
        if !self.members.remove(&id) {
            return false;
        }
        self.agents.retain(|&other| other != id);
        true
    }

    pub fn contains(&self, id: AgentId) -> bool {
        self.members.contains(&id)
    }

    /// Registered agents in activation order.
    pub fn agent_ids(&self) -> &[AgentId] {
        &self.agents
    }

    pub fn len(&self) -> usize {
        self.agents.len()
    }

    pub fn is_empty(&self) -> bool {
        self.agents.is_empty()
    }

    /// Number of completed steps.
    pub fn steps(&self) -> Tick {
        self.steps
    }

    /// Activate every registered agent exactly once.
    pub fn step<P: Population>(
        &mut self,
        population: &mut P,
        rng: &mut SimRng,
        policy: ActivationPolicy,
    ) -> SimResult<StepReport> {
        let order = self.agents.clone();
        let mut report = StepReport {
            tick: self.steps + 1,
            ..StepReport::default()
        };

        match policy {
            ActivationPolicy::Sequential => {
                for id in order {
                    // Retired earlier this tick by another agent.
                    if !self.contains(id) {
                        continue;
                    }
                    let action = population.plan(id, rng)?;
                    let retired = population.apply(id, action, rng)?;
                    report.activated += 1;
                    self.retire(retired, &mut report);
                }
            }
            ActivationPolicy::SnapshotCommit => {
                let mut staged = Vec::with_capacity(order.len());
                for id in order {
                    staged.push((id, population.plan(id, rng)?));
                }
                for (id, action) in staged {
                    if !self.contains(id) {
                        continue;
                    }
                    let retired = population.apply(id, action, rng)?;
                    report.activated += 1;
                    self.retire(retired, &mut report);
                }
            }
        }

        self.steps += 1;
        Ok(report)
    }

    fn retire(&mut self, retired: Vec<AgentId>, report: &mut StepReport) {
        for id in retired {
            if self.remove(id) {
                report.retired.push(id);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rng::{RngBank, StreamSlot};

    /// Each agent holds a counter; agent 0 retires agent 2 on its turn.
    /// Plans capture the counter value seen at plan time.
    struct Counters {
        values: Vec<u32>,
        applied: Vec<AgentId>,
    }

    impl Population for Counters {
        type Action = u32;

        fn plan(&self, id: AgentId, _rng: &mut SimRng) -> SimResult<u32> {
            Ok(self.values.iter().sum::<u32>() + self.values[id])
        }

        fn apply(&mut self, id: AgentId, seen: u32, _rng: &mut SimRng) -> SimResult<Vec<AgentId>> {
            self.values[id] = seen + 1;
            self.applied.push(id);
            Ok(if id == 0 { vec![2] } else { vec![] })
        }
    }

    fn rng() -> SimRng {
        RngBank::new(1).for_stream(StreamSlot::Activation)
    }

    fn scheduler_with(ids: &[AgentId]) -> Scheduler {
        let mut scheduler = Scheduler::new();
        for &id in ids {
            scheduler.add(id);
        }
        scheduler
    }

    #[test]
    fn add_is_idempotent_and_remove_reports() {
        let mut scheduler = scheduler_with(&[0, 1, 1]);
        assert_eq!(scheduler.agent_ids(), &[0, 1]);
        assert!(scheduler.remove(1));
        assert!(!scheduler.remove(1));
        assert_eq!(scheduler.len(), 1);
    }

    #[test]
    fn removal_keeps_order_and_membership_in_step() {
        let mut scheduler = scheduler_with(&[4, 0, 7, 2]);
        assert!(scheduler.remove(7));
        assert!(!scheduler.contains(7));
        assert!(scheduler.contains(2));
        assert_eq!(scheduler.agent_ids(), &[4, 0, 2]);

        scheduler.add(7);
        assert_eq!(scheduler.agent_ids(), &[4, 0, 2, 7]);
        assert_eq!(scheduler.len(), 4);
    }

    #[test]
    fn sequential_skips_agents_retired_mid_tick() {
        let mut scheduler = scheduler_with(&[0, 1, 2]);
        let mut pop = Counters { values: vec![0, 0, 0], applied: vec![] };
        let report = scheduler
            .step(&mut pop, &mut rng(), ActivationPolicy::Sequential)
            .unwrap();

        assert_eq!(pop.applied, vec![0, 1]);
        assert_eq!(report.retired, vec![2]);
        assert_eq!(report.activated, 2);
        assert_eq!(scheduler.agent_ids(), &[0, 1]);
        assert_eq!(scheduler.steps(), 1);
    }

    #[test]
    fn sequential_plans_see_earlier_applies() {
        let mut scheduler = scheduler_with(&[0, 1]);
        let mut pop = Counters { values: vec![0, 0], applied: vec![] };
        scheduler.step(&mut pop, &mut rng(), ActivationPolicy::Sequential).unwrap();
        // Agent 1 planned after agent 0 had already written 1.
        assert_eq!(pop.values, vec![1, 2]);
    }

    #[test]
    fn snapshot_commit_plans_against_tick_start() {
        let mut scheduler = scheduler_with(&[0, 1]);
        let mut pop = Counters { values: vec![0, 0], applied: vec![] };
        scheduler
            .step(&mut pop, &mut rng(), ActivationPolicy::SnapshotCommit)
            .unwrap();
        assert_eq!(pop.values, vec![1, 1]);
    }

    #[test]
    fn step_count_advances_even_when_empty() {
        let mut scheduler = Scheduler::new();
        let mut pop = Counters { values: vec![], applied: vec![] };
        scheduler.step(&mut pop, &mut rng(), ActivationPolicy::Sequential).unwrap();
        scheduler.step(&mut pop, &mut rng(), ActivationPolicy::Sequential).unwrap();
        assert_eq!(scheduler.steps(), 2);
    }
}
