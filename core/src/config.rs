use serde::{Deserialize, Serialize};

use crate::{
    error::{SimError, SimResult},
    scheduler::ActivationPolicy,
    types::Tick,
};

/// Which landings aggregate a boat's hold goes to when the run ends.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EndOfRunBanking {
    /// Each boat banks into its own size's aggregate.
    #[default]
    BySize,
    /// Every boat banks into the big-boat aggregate, whatever its size.
    AllToBig,
}

/// World parameters. Every field is optional in a config file; missing
/// fields take the reference scenario's values.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SimConfig {
    pub height: usize,
    pub width: usize,
    pub num_lobsters: usize,
    pub num_boats: usize,
    /// Random movement bias. Carried for parameter compatibility; no
    /// rule reads it.
    pub movement: f64,
    /// A boat is small when its size draw falls below this.
    pub density: f64,
    /// The run ends once this many ticks have completed.
    pub sim_length: Tick,
    /// Row the line of heat spots starts on.
    pub heat_start_row: usize,
    pub activation: ActivationPolicy,
    pub end_of_run_banking: EndOfRunBanking,
}

impl Default for SimConfig {
    fn default() -> Self {
        Self {
            height: 53,
            width: 53,
            num_lobsters: 300,
            num_boats: 82,
            movement: 0.3,
            density: 0.6,
            sim_length: 30,
            heat_start_row: 3,
            activation: ActivationPolicy::Sequential,
            end_of_run_banking: EndOfRunBanking::BySize,
        }
    }
}

impl SimConfig {
    /// Load from a JSON file.
    /// In tests, use SimConfig::default_test().
    pub fn load(path: &str) -> anyhow::Result<Self> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| anyhow::anyhow!("Cannot read {path}: {e}"))?;
        let config: SimConfig = serde_json::from_str(&content)
            .map_err(|e| anyhow::anyhow!("Cannot parse {path}: {e}"))?;
        config.validate()?;
        Ok(config)
    }

    /// Small world with hardcoded values for use in unit tests.
    pub fn default_test() -> Self {
        Self {
            height: 10,
            width: 10,
            num_lobsters: 20,
            num_boats: 4,
            sim_length: 30,
            ..Self::default()
        }
    }

    pub fn validate(&self) -> SimResult<()> {
        let invalid = |reason: String| Err(SimError::InvalidConfig { reason });

        if self.width == 0 || self.height == 0 {
            return invalid(format!("grid must be non-empty, got {}x{}", self.width, self.height));
        }
        if !(0.0..=1.0).contains(&self.density) {
            return invalid(format!("density must be within [0, 1], got {}", self.density));
        }
        if !(0.0..=1.0).contains(&self.movement) {
            return invalid(format!("movement must be within [0, 1], got {}", self.movement));
        }
        if self.sim_length == 0 {
            return invalid("sim_length must be at least 1".to_string());
        }
        if self.heat_start_row >= self.height {
            return invalid(format!(
                "heat_start_row {} is outside a grid of height {}",
                self.heat_start_row, self.height
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_reference_scenario() {
        let config = SimConfig::default();
        assert_eq!((config.width, config.height), (53, 53));
        assert_eq!(config.num_lobsters, 300);
        assert_eq!(config.num_boats, 82);
        assert_eq!(config.sim_length, 30);
        assert_eq!(config.activation, ActivationPolicy::Sequential);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn partial_json_fills_defaults() {
        let config: SimConfig =
            serde_json::from_str(r#"{ "sim_length": 244, "activation": "snapshot_commit" }"#).unwrap();
        assert_eq!(config.sim_length, 244);
        assert_eq!(config.activation, ActivationPolicy::SnapshotCommit);
        assert_eq!(config.num_boats, 82);
        assert_eq!(config.end_of_run_banking, EndOfRunBanking::BySize);
    }

    #[test]
    fn rejects_bad_values() {
        let bad_density = SimConfig { density: 1.5, ..SimConfig::default() };
        assert!(matches!(bad_density.validate(), Err(SimError::InvalidConfig { .. })));

        let empty = SimConfig { width: 0, ..SimConfig::default() };
        assert!(empty.validate().is_err());

        let no_horizon = SimConfig { sim_length: 0, ..SimConfig::default() };
        assert!(no_horizon.validate().is_err());

        let front_off_grid = SimConfig { height: 3, ..SimConfig::default() };
        assert!(front_off_grid.validate().is_err());
    }

    #[test]
    fn load_reports_missing_file() {
        let err = SimConfig::load("/definitely/not/here.json").unwrap_err();
        assert!(err.to_string().contains("Cannot read"));
    }
}
