//! Goal-seeking input used by headless runs.

use phasewalk_core::{Controls, EventState, InputSource, InputVector, Point};
use phasewalk_world::{query, Phase};

/// Distance under which an axis counts as reached.
const ARRIVAL_TOLERANCE: f32 = 4.0;

/// [`InputSource`] that walks the player towards the next objective and
/// confirms every menu.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub(crate) struct Autopilot {
    position: Point,
    target: Option<Point>,
}

impl Autopilot {
    /// Re-targets the autopilot using the current phase state.
    pub(crate) fn observe(&mut self, phase: &Phase) {
        self.position = query::player(phase).bounds().center();
        self.target = Some(waypoint(phase));
    }

    /// Forgets the current objective, e.g. when no phase is active.
    pub(crate) fn idle(&mut self) {
        self.target = None;
    }
}

impl InputSource for Autopilot {
    fn poll(&mut self) -> Controls {
        let direction = self.target.map_or(InputVector::ZERO, |target| {
            InputVector::new(
                step_towards(self.position.x, target.x),
                step_towards(self.position.y, target.y),
            )
        });
        Controls {
            movement: direction,
            attack: direction,
            confirm: true,
            ..Controls::default()
        }
    }
}

/// Next point of interest: the current mandatory event's start or end zone,
/// falling back to the goal.
fn waypoint(phase: &Phase) -> Point {
    match query::current_mandatory(phase) {
        Some(event) if event.state() == EventState::Idle => event.zones().start().center(),
        Some(event) if event.state() == EventState::Active => event.zones().end().center(),
        _ => query::goal(phase).bounds().center(),
    }
}

fn step_towards(from: f32, to: f32) -> i8 {
    let delta = to - from;
    if delta.abs() <= ARRIVAL_TOLERANCE {
        0
    } else if delta > 0.0 {
        1
    } else {
        -1
    }
}
