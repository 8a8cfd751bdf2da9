//! Lobster fishery simulation core.
//!
//! A grid of ocean cells, a thermal front creeping across it, lobsters
//! edging away from the front, and a fleet of small and big boats that
//! fish them and land the catch at three ports.

pub mod agent;
pub mod clock;
pub mod config;
pub mod error;
pub mod event;
pub mod grid;
pub mod habitat;
pub mod metrics;
pub mod rng;
pub mod scheduler;
pub mod snapshot;
pub mod types;
pub mod world;

pub use config::SimConfig;
pub use error::{SimError, SimResult};
pub use world::World;
