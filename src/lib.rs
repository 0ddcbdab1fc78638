//! Analytic vacuum-coast propagation for primer-vector guidance.
//!
//! The physics lives in the member crates; this crate re-exports them under one roof
//! so front-ends (CLI, tests, host solvers) share a single dependency.

pub mod scenario;

pub use coast_config as config;
pub use coast_core as core;
pub use coast_export as export;
pub use coast_orbits as orbits;
pub use coast_pvg as pvg;
pub use coast_twobody as twobody;

/// Returns the version of the library for smoke tests.
pub fn version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
