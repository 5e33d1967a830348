#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Run-level sequencing of phases and the menu flow around them.

mod flow;
mod manager;

use phasewalk_core::{CollaboratorError, GeometryError};
use phasewalk_world::PhaseSettings;
use thiserror::Error;

pub use flow::{RunFlow, Screen};
pub use manager::PhaseManager;

/// Configuration for a whole run.
#[derive(Clone, Debug, PartialEq)]
pub struct RunSettings {
    /// Settings handed to every phase.
    pub phase: PhaseSettings,
    /// Number of completed phases that finishes the run. `None` runs forever.
    pub phase_limit: Option<u32>,
    /// Looping track played while a phase is active.
    pub music: Option<String>,
}

impl RunSettings {
    /// Creates run settings without a phase limit or music.
    #[must_use]
    pub fn new(phase: PhaseSettings) -> Self {
        Self {
            phase,
            phase_limit: None,
            music: None,
        }
    }
}

/// Failures that abort a run.
#[derive(Debug, Error)]
pub enum RunError {
    /// Generated content described impossible geometry.
    #[error("invalid phase content: {0}")]
    Geometry(#[from] GeometryError),
    /// A presentation collaborator failed.
    #[error(transparent)]
    Collaborator(#[from] CollaboratorError),
}
