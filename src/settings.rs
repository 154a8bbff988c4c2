//! Simulation settings
//!
//! Owned by the [`SimContext`](crate::sim::SimContext) rather than a global
//! scheduler. Loadable from JSON; scalars are raw Q48.16 values.

use serde::{Deserialize, Serialize};

use crate::consts::DEFAULT_SPREAD_MULTIPLIER;
use crate::error::BodyError;
use crate::sim::GridConfig;

/// Per-simulation constants
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SimConfig {
    /// Ticks of velocity the future bounds are swept over
    #[serde(default = "default_spread")]
    pub spread_multiplier: i64,
    /// Layout of the default uniform-grid partition
    #[serde(default)]
    pub grid: GridConfig,
}

fn default_spread() -> i64 {
    DEFAULT_SPREAD_MULTIPLIER
}

impl Default for SimConfig {
    fn default() -> Self {
        Self {
            spread_multiplier: DEFAULT_SPREAD_MULTIPLIER,
            grid: GridConfig::default(),
        }
    }
}

impl SimConfig {
    pub fn from_json(json: &str) -> Result<Self, BodyError> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn to_json(&self) -> Result<String, BodyError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Same settings with a different sweep multiplier
    pub fn with_spread_multiplier(mut self, spread_multiplier: i64) -> Self {
        self.spread_multiplier = spread_multiplier;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::math::Fixed;

    #[test]
    fn test_empty_json_uses_defaults() {
        let config = SimConfig::from_json("{}").expect("valid json");
        assert_eq!(config, SimConfig::default());
    }

    #[test]
    fn test_json_round_trip() {
        let mut config = SimConfig::default().with_spread_multiplier(5);
        config.grid.cell_size = Fixed::from_int(4);
        let json = config.to_json().expect("serializable");
        assert_eq!(SimConfig::from_json(&json).expect("valid json"), config);
    }
}
