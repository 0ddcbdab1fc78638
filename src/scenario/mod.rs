//! Running configured coast scenarios end to end.

use coast_config::{CoastScenario, ConfigError};
use coast_core::LogSink;
use coast_pvg::{CoastIntegrator, PropagationError, Solution, StateVector};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ScenarioError {
    #[error("scenario configuration rejected: {0}")]
    Config(#[from] ConfigError),
    #[error("arc {index} ({t0} -> {tf}) failed: {source}")]
    Arc {
        index: usize,
        t0: f64,
        tf: f64,
        #[source]
        source: PropagationError,
    },
}

/// Outcome of a scenario run.
#[derive(Debug, Clone)]
pub struct ScenarioRun {
    pub name: String,
    pub final_state: StateVector,
    pub solution: Solution,
}

/// Propagate the scenario's arcs in order, recording each one.
pub fn run_scenario(scenario: &CoastScenario, log: LogSink) -> Result<ScenarioRun, ScenarioError> {
    scenario.validate()?;
    let coast = scenario.propagator.build(log)?;

    let mut solution = Solution::new();
    let mut state = scenario.initial;
    for (index, arc) in scenario.arcs.iter().enumerate() {
        state = coast
            .integrate_with_solution(&state, &arc.phase, arc.t0, arc.tf, &mut solution)
            .map_err(|source| ScenarioError::Arc {
                index,
                t0: arc.t0,
                tf: arc.tf,
                source,
            })?;
        log::debug!(target: "coast", "arc {index} of '{}' done at t = {}", scenario.name, arc.tf);
    }

    log::info!(
        target: "coast",
        "scenario '{}' finished with {} segments",
        scenario.name,
        solution.len()
    );
    Ok(ScenarioRun {
        name: scenario.name.clone(),
        final_state: state,
        solution,
    })
}
