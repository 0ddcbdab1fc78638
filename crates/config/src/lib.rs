//! Configuration models and loaders for coast propagation runs.

use std::fs::File;
use std::path::{Path, PathBuf};

use coast_core::LogSink;
use coast_pvg::{
    DEFAULT_POOL_CAPACITY, DEFAULT_SAMPLES_PER_ARC, Phase, StateVector, VacuumCoast,
};
use coast_twobody::SolverSettings;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Settings for building a [`VacuumCoast`].
#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
#[serde(default)]
pub struct PropagatorConfig {
    /// Gravitational parameter; 1.0 for normalised units.
    pub mu: f64,
    pub samples_per_arc: usize,
    pub max_iterations: usize,
    pub pool_capacity: usize,
}

impl Default for PropagatorConfig {
    fn default() -> Self {
        Self {
            mu: 1.0,
            samples_per_arc: DEFAULT_SAMPLES_PER_ARC,
            max_iterations: SolverSettings::default().max_iterations,
            pool_capacity: DEFAULT_POOL_CAPACITY,
        }
    }
}

impl PropagatorConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(self.mu > 0.0 && self.mu.is_finite()) {
            return Err(ConfigError::Invalid(format!(
                "mu must be positive and finite (got {})",
                self.mu
            )));
        }
        if self.samples_per_arc == 0 {
            return Err(ConfigError::Invalid("samples_per_arc must be at least 1".into()));
        }
        if self.max_iterations == 0 {
            return Err(ConfigError::Invalid("max_iterations must be at least 1".into()));
        }
        if self.pool_capacity == 0 {
            return Err(ConfigError::Invalid("pool_capacity must be at least 1".into()));
        }
        Ok(())
    }

    /// Validate and build a propagator reporting through `log`.
    pub fn build(&self, log: LogSink) -> Result<VacuumCoast, ConfigError> {
        self.validate()?;
        Ok(VacuumCoast::new(self.mu)
            .with_samples_per_arc(self.samples_per_arc)
            .with_solver_settings(SolverSettings {
                max_iterations: self.max_iterations,
            })
            .with_pool_capacity(self.pool_capacity)
            .with_log_sink(log))
    }
}

/// One coast arc of a scenario.
#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
pub struct ArcConfig {
    pub t0: f64,
    pub tf: f64,
    #[serde(default)]
    pub phase: Phase,
}

/// Initial state plus a chain of contiguous coast arcs.
#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
pub struct CoastScenario {
    pub name: String,
    #[serde(default)]
    pub propagator: PropagatorConfig,
    pub initial: StateVector,
    pub arcs: Vec<ArcConfig>,
}

impl CoastScenario {
    /// Check the propagator settings and that arcs run forward and join end to start.
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.propagator.validate()?;
        if self.arcs.is_empty() {
            return Err(ConfigError::Invalid(format!(
                "scenario '{}' has no arcs",
                self.name
            )));
        }
        for (i, arc) in self.arcs.iter().enumerate() {
            if !(arc.tf > arc.t0) {
                return Err(ConfigError::Invalid(format!(
                    "arc {i} of '{}' must end after it starts ({} -> {})",
                    self.name, arc.t0, arc.tf
                )));
            }
        }
        for (i, pair) in self.arcs.windows(2).enumerate() {
            if pair[1].t0 != pair[0].tf {
                return Err(ConfigError::Invalid(format!(
                    "arc {} of '{}' starts at {} but arc {i} ends at {}",
                    i + 1,
                    self.name,
                    pair[1].t0,
                    pair[0].tf
                )));
            }
        }
        Ok(())
    }
}

/// Errors that can occur while loading configuration files.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read configuration: {0}")]
    Io(#[from] std::io::Error),
    #[error("failed to parse YAML: {0}")]
    Parse(#[from] serde_yaml::Error),
    #[error("failed to parse TOML: {0}")]
    Toml(#[from] toml::de::Error),
    #[error("invalid configuration: {0}")]
    Invalid(String),
}

/// Load and validate a scenario from a YAML or TOML file.
pub fn load_scenario<P: AsRef<Path>>(path: P) -> Result<CoastScenario, ConfigError> {
    let scenario: CoastScenario = load_document(path.as_ref())?;
    scenario.validate()?;
    Ok(scenario)
}

/// Load every `.toml`/`.yaml`/`.yml` scenario in a directory, sorted by file name.
pub fn load_scenarios<P: AsRef<Path>>(dir: P) -> Result<Vec<CoastScenario>, ConfigError> {
    let mut entries: Vec<PathBuf> = std::fs::read_dir(dir.as_ref())?
        .filter_map(|entry| entry.ok().map(|e| e.path()))
        .filter(|path| {
            path.extension()
                .map(|ext| ext == "toml" || ext == "yaml" || ext == "yml")
                .unwrap_or(false)
        })
        .collect();
    entries.sort();
    entries.iter().map(load_scenario).collect()
}

/// Load and validate standalone propagator settings.
pub fn load_propagator_config<P: AsRef<Path>>(path: P) -> Result<PropagatorConfig, ConfigError> {
    let config: PropagatorConfig = load_document(path.as_ref())?;
    config.validate()?;
    Ok(config)
}

fn load_document<T>(path: &Path) -> Result<T, ConfigError>
where
    T: for<'de> Deserialize<'de>,
{
    if path.extension().map(|ext| ext == "toml").unwrap_or(false) {
        let contents = std::fs::read_to_string(path)?;
        Ok(toml::from_str(&contents)?)
    } else {
        let reader = File::open(path)?;
        Ok(serde_yaml::from_reader(reader)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    const SCENARIO_YAML: &str = r#"
name: leo-coast
propagator:
  mu: 1.0
  samples_per_arc: 10
initial:
  r: [1.0, 0.0, 0.0]
  v: [0.0, 1.0, 0.0]
  pv: [0.0, 1.0, 0.0]
arcs:
  - t0: 0.0
    tf: 1.0
    phase: { kind: coast, stage: 1 }
  - t0: 1.0
    tf: 2.5
"#;

    fn write_temp(suffix: &str, contents: &str) -> tempfile::NamedTempFile {
        let mut file = tempfile::Builder::new()
            .suffix(suffix)
            .tempfile()
            .expect("temp file");
        file.write_all(contents.as_bytes()).expect("write");
        file
    }

    #[test]
    fn yaml_scenario_fills_defaults() {
        let file = write_temp(".yaml", SCENARIO_YAML);
        let scenario = load_scenario(file.path()).expect("scenario");
        assert_eq!(scenario.arcs.len(), 2);
        assert_eq!(scenario.propagator.samples_per_arc, 10);
        assert_eq!(scenario.propagator.max_iterations, 200);
        assert_eq!(scenario.initial.pr, coast_core::V3::ZERO);
        assert_eq!(scenario.arcs[1].phase, Phase::default());
    }

    #[test]
    fn toml_propagator_config_is_validated() {
        let file = write_temp(".toml", "mu = -1.0\n");
        let err = load_propagator_config(file.path()).unwrap_err();
        assert!(matches!(err, ConfigError::Invalid(_)), "{err}");

        let file = write_temp(".toml", "mu = 398600.4418\nsamples_per_arc = 40\n");
        let config = load_propagator_config(file.path()).expect("config");
        assert_eq!(config.samples_per_arc, 40);
        assert_eq!(config.pool_capacity, DEFAULT_POOL_CAPACITY);
    }

    #[test]
    fn gapped_arcs_are_rejected() {
        let gapped = SCENARIO_YAML.replace("t0: 1.0", "t0: 1.5");
        let file = write_temp(".yaml", &gapped);
        assert!(matches!(
            load_scenario(file.path()),
            Err(ConfigError::Invalid(_))
        ));
    }
}
