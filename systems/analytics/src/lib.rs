#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Deterministic analytics system that folds world signals into run statistics.

use phasewalk_core::{LossReason, Signal};
use serde::Serialize;

/// Aggregated statistics for a run.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize)]
pub struct RunReport {
    /// Simulation ticks observed across every phase.
    pub ticks: u64,
    /// Phases that were activated.
    pub phases_started: u32,
    /// Phases that ended successfully.
    pub phases_completed: u32,
    /// Phases lost because life ran out.
    pub lost_to_exhaustion: u32,
    /// Phases lost because a mandatory event failed.
    pub lost_to_events: u32,
    /// Events the player entered.
    pub events_started: u32,
    /// Events that resolved.
    pub events_resolved: u32,
    /// Events that failed.
    pub events_failed: u32,
}

impl RunReport {
    /// Total number of lost phases.
    #[must_use]
    pub const fn phases_lost(&self) -> u32 {
        self.lost_to_exhaustion + self.lost_to_events
    }

    /// Share of finished phases that were completed, if any finished.
    #[must_use]
    pub fn completion_rate(&self) -> Option<f32> {
        let finished = self.phases_completed + self.phases_lost();
        if finished == 0 {
            return None;
        }
        Some(self.phases_completed as f32 / finished as f32)
    }
}

/// Pure analytics system that accumulates a [`RunReport`].
#[derive(Debug, Default)]
pub struct Analytics {
    report: RunReport,
}

impl Analytics {
    /// Creates an analytics system with an empty report.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Current aggregated report.
    #[must_use]
    pub const fn report(&self) -> &RunReport {
        &self.report
    }

    /// Clears every counter.
    pub fn reset(&mut self) {
        self.report = RunReport::default();
    }

    /// Consumes world signals and folds them into the report.
    pub fn handle(&mut self, signals: &[Signal]) {
        let report = &mut self.report;
        for signal in signals {
            match signal {
                Signal::TickAdvanced { .. } => report.ticks += 1,
                Signal::PhaseStarted { .. } => report.phases_started += 1,
                Signal::PhaseCompleted { .. } => report.phases_completed += 1,
                Signal::PhaseLost { reason, .. } => match reason {
                    LossReason::LifeDepleted => report.lost_to_exhaustion += 1,
                    LossReason::MandatoryEventFailed(_) => report.lost_to_events += 1,
                },
                Signal::EventStarted { .. } => report.events_started += 1,
                Signal::EventResolved { .. } => report.events_resolved += 1,
                Signal::EventFailed { .. } => report.events_failed += 1,
                Signal::MandatoryAdvanced { .. } => {}
            }
        }
    }
}
