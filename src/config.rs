//! Validated, typed view over the YAML configuration file.

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::warn;

fn default_num_aircraft() -> u32 {
    75
}
fn default_message_interval_min() -> f64 {
    1.0
}
fn default_message_interval_max() -> f64 {
    5.0
}
fn default_emergency_frequency() -> f64 {
    0.001
}
fn default_separation_frequency() -> f64 {
    0.002
}
fn default_bootstrap_servers() -> String {
    "localhost:9092".to_string()
}
fn default_topic() -> String {
    "adsb_messages".to_string()
}
fn default_jet_ratio() -> f64 {
    0.7
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SimulationSection {
    pub num_aircraft: u32,
    pub message_interval_min: f64,
    pub message_interval_max: f64,
    pub emergency_frequency: f64,
    pub separation_frequency: f64,
}

impl Default for SimulationSection {
    fn default() -> Self {
        Self {
            num_aircraft: default_num_aircraft(),
            message_interval_min: default_message_interval_min(),
            message_interval_max: default_message_interval_max(),
            emergency_frequency: default_emergency_frequency(),
            separation_frequency: default_separation_frequency(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct KafkaSection {
    pub bootstrap_servers: String,
    pub topic: String,
}

impl Default for KafkaSection {
    fn default() -> Self {
        Self {
            bootstrap_servers: default_bootstrap_servers(),
            topic: default_topic(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AircraftTypesSection {
    pub jet_ratio: f64,
}

impl Default for AircraftTypesSection {
    fn default() -> Self {
        Self {
            jet_ratio: default_jet_ratio(),
        }
    }
}

/// Top-level configuration record, as loaded from YAML.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct Config {
    pub simulation: SimulationSection,
    pub kafka: KafkaSection,
    pub aircraft_types: AircraftTypesSection,
}

impl Config {
    /// Load configuration from `path`. A missing file or a parse failure
    /// logs a warning and falls back to defaults; missing keys within an
    /// otherwise valid file fall back field-by-field via serde defaults.
    pub fn load(path: &str) -> Self {
        if !Path::new(path).exists() {
            warn!("config file {} not found, using defaults", path);
            return Self::default();
        }

        let contents = match fs::read_to_string(path) {
            Ok(c) => c,
            Err(e) => {
                warn!("failed to read config file {}: {}, using defaults", path, e);
                return Self::default();
            }
        };

        match serde_yaml::from_str(&contents) {
            Ok(config) => config,
            Err(e) => {
                warn!("failed to parse config file {}: {}, using defaults", path, e);
                Self::default()
            }
        }
    }

    /// Validate and clamp values that must respect a relationship between
    /// two fields (e.g. `message_interval_max >= message_interval_min`),
    /// which serde defaults alone cannot express.
    pub fn validated(mut self) -> Self {
        if self.simulation.message_interval_max < self.simulation.message_interval_min {
            warn!(
                "message_interval_max ({}) < message_interval_min ({}), clamping",
                self.simulation.message_interval_max, self.simulation.message_interval_min
            );
            self.simulation.message_interval_max = self.simulation.message_interval_min;
        }
        if self.simulation.num_aircraft == 0 {
            warn!("num_aircraft must be > 0, falling back to default");
            self.simulation.num_aircraft = default_num_aircraft();
        }
        self.aircraft_types.jet_ratio = self.aircraft_types.jet_ratio.clamp(0.0, 1.0);
        self.simulation.emergency_frequency = self.simulation.emergency_frequency.clamp(0.0, 1.0);
        self.simulation.separation_frequency =
            self.simulation.separation_frequency.clamp(0.0, 1.0);
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_spec_table() {
        let config = Config::default();
        assert_eq!(config.simulation.num_aircraft, 75);
        assert_eq!(config.simulation.message_interval_min, 1.0);
        assert_eq!(config.simulation.message_interval_max, 5.0);
        assert_eq!(config.simulation.emergency_frequency, 0.001);
        assert_eq!(config.simulation.separation_frequency, 0.002);
        assert_eq!(config.kafka.bootstrap_servers, "localhost:9092");
        assert_eq!(config.kafka.topic, "adsb_messages");
        assert_eq!(config.aircraft_types.jet_ratio, 0.7);
    }

    #[test]
    fn missing_file_falls_back_to_defaults() {
        let config = Config::load("/nonexistent/path/to/config.yaml");
        assert_eq!(config.simulation.num_aircraft, 75);
    }

    #[test]
    fn partial_yaml_fills_missing_keys_from_defaults() {
        let yaml = "simulation:\n  num_aircraft: 10\n";
        let config: Config = serde_yaml::from_str(yaml).unwrap();
        assert_eq!(config.simulation.num_aircraft, 10);
        assert_eq!(config.simulation.emergency_frequency, 0.001);
        assert_eq!(config.kafka.topic, "adsb_messages");
    }

    #[test]
    fn validated_clamps_inverted_interval_bounds() {
        let mut config = Config::default();
        config.simulation.message_interval_min = 10.0;
        config.simulation.message_interval_max = 2.0;
        let config = config.validated();
        assert_eq!(config.simulation.message_interval_max, 10.0);
    }
}
