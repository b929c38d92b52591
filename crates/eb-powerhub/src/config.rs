//! Simulation run configuration files.

use std::path::Path;

use chrono::{DateTime, TimeDelta, Utc};
use eb_core::SimulationTime;
use eb_sim::SimOptions;
use serde::{Deserialize, Serialize};

use crate::error::{PowerHubError, PowerHubResult};
use crate::setpoints::Setpoints;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SimulationConfig {
    pub steps: u64,
    pub step_size_seconds: i64,
    pub start: DateTime<Utc>,
    #[serde(default = "default_record_every")]
    pub record_every: u64,
    #[serde(default)]
    pub setpoints: Setpoints,
}

fn default_record_every() -> u64 {
    1
}

impl SimulationConfig {
    pub fn new(start: DateTime<Utc>) -> Self {
        Self {
            steps: 24 * 60 * 60,
            step_size_seconds: 1,
            start,
            record_every: 60,
            setpoints: Setpoints::default(),
        }
    }

    pub fn validate(&self) -> PowerHubResult<()> {
        if self.step_size_seconds <= 0 {
            return Err(PowerHubError::Config {
                what: format!("step size must be positive, got {}", self.step_size_seconds),
            });
        }
        if self.record_every == 0 {
            return Err(PowerHubError::Config {
                what: "record_every must be at least 1".into(),
            });
        }
        self.setpoints.validate()
    }

    pub fn simulation_time(&self) -> SimulationTime {
        SimulationTime::new(TimeDelta::seconds(self.step_size_seconds), self.start)
    }

    pub fn sim_options(&self) -> SimOptions {
        SimOptions {
            steps: self.steps,
            record_every: self.record_every,
        }
    }
}

pub fn load_yaml(path: &Path) -> PowerHubResult<SimulationConfig> {
    let content = std::fs::read_to_string(path)?;
    let config: SimulationConfig = serde_yaml::from_str(&content)?;
    config.validate()?;
    Ok(config)
}

pub fn load_json(path: &Path) -> PowerHubResult<SimulationConfig> {
    let content = std::fs::read_to_string(path)?;
    let config: SimulationConfig = serde_json::from_str(&content)?;
    config.validate()?;
    Ok(config)
}

/// Load by extension: `.json` as JSON, anything else as YAML.
pub fn load_config(path: &Path) -> PowerHubResult<SimulationConfig> {
    match path.extension().and_then(|ext| ext.to_str()) {
        Some("json") => load_json(path),
        _ => load_yaml(path),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn yaml_with_defaults() {
        let yaml = "steps: 100\nstep_size_seconds: 5\nstart: 2024-06-01T00:00:00Z\n";
        let config: SimulationConfig = serde_yaml::from_str(yaml).unwrap();
        config.validate().unwrap();
        assert_eq!(config.record_every, 1);
        assert_eq!(config.setpoints, Setpoints::default());
        assert_eq!(config.simulation_time().step_seconds(), 5.0);
    }

    #[test]
    fn rejects_zero_step() {
        let mut config = SimulationConfig::new(Utc.with_ymd_and_hms(2024, 6, 1, 0, 0, 0).unwrap());
        config.step_size_seconds = 0;
        assert!(matches!(
            config.validate(),
            Err(PowerHubError::Config { .. })
        ));
    }
}
