//! Phase descriptors carried alongside propagated arcs.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Thrust regime of a phase.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PhaseKind {
    #[default]
    Coast,
    Burn,
}

/// Opaque tag identifying which guidance segment an arc belongs to.
///
/// The coast propagator attaches it to recorded segments without looking at it.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Phase {
    #[serde(default)]
    pub kind: PhaseKind,
    /// Vehicle stage index.
    #[serde(default)]
    pub stage: u32,
    #[serde(default)]
    pub label: Option<String>,
}

impl Phase {
    pub fn coast(stage: u32) -> Self {
        Self {
            kind: PhaseKind::Coast,
            stage,
            label: None,
        }
    }

    pub fn burn(stage: u32) -> Self {
        Self {
            kind: PhaseKind::Burn,
            stage,
            label: None,
        }
    }

    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.label = Some(label.into());
        self
    }
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let kind = match self.kind {
            PhaseKind::Coast => "coast",
            PhaseKind::Burn => "burn",
        };
        match &self.label {
            Some(label) => write!(f, "{kind} (stage {}, {label})", self.stage),
            None => write!(f, "{kind} (stage {})", self.stage),
        }
    }
}
