//! Scripted encounters keyed by spatial triggers.
//!
//! An [`Event`] walks a forward-only lifecycle: it idles until the player
//! enters its start zone, pulls the player into its event zone while active,
//! and ends either resolved or failed. What counts as starting, failing, or
//! resolving is delegated to an [`EventRules`] implementation so encounter
//! variants can differ without changing the lifecycle itself.

use std::fmt;

use log::debug;
use phasewalk_core::{
    DialogueId, EntityKind, EventCheck, EventId, EventState, GeometryError, InputVector, Point,
    Rect, Signal, TimeoutPolicy,
};

/// The three regions that describe an encounter.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct EventZones {
    start: Rect,
    event: Rect,
    end: Rect,
}

impl EventZones {
    /// Validates and bundles the zones of an encounter.
    ///
    /// Every zone must have a positive, finite size and the end zone must
    /// overlap the event zone, otherwise the player could never reach it.
    pub fn new(start: Rect, event: Rect, end: Rect) -> Result<Self, GeometryError> {
        let start = start.validated()?;
        let event = event.validated()?;
        let end = end.validated()?;
        if !end.intersects(&event) {
            return Err(GeometryError::DetachedEndZone);
        }
        Ok(Self { start, event, end })
    }

    /// Zone whose entry starts the encounter.
    #[must_use]
    pub const fn start(&self) -> Rect {
        self.start
    }

    /// Zone the encounter occupies once started.
    #[must_use]
    pub const fn event(&self) -> Rect {
        self.event
    }

    /// Zone whose entry resolves the encounter.
    #[must_use]
    pub const fn end(&self) -> Rect {
        self.end
    }
}

/// Everything a rule may inspect when judging an encounter.
#[derive(Clone, Copy, Debug)]
pub struct EventContext<'a> {
    /// Zones of the encounter being judged.
    pub zones: &'a EventZones,
    /// Player bounding box in world coordinates.
    pub player: Rect,
    /// Antagonist bounding box in world coordinates.
    pub antagonist: Rect,
    /// Attack direction requested this tick.
    pub attack: InputVector,
}

/// Capability deciding how a particular kind of encounter behaves.
///
/// The defaults describe a plain zone encounter.
pub trait EventRules: fmt::Debug {
    /// Whether an idle encounter starts this tick.
    fn try_start(&self, context: &EventContext<'_>) -> bool {
        context.player.intersects(&context.zones.start())
    }

    /// Whether an active encounter fails this tick.
    fn check_failed(&self, _context: &EventContext<'_>) -> bool {
        false
    }

    /// Whether an active encounter resolves this tick.
    fn check_resolved(&self, context: &EventContext<'_>) -> bool {
        context.player.intersects(&context.zones.end())
    }

    /// Combines the failure and resolution checks. Failure wins ties.
    fn evaluate(&self, context: &EventContext<'_>) -> EventCheck {
        if self.check_failed(context) {
            EventCheck::Failed
        } else if self.check_resolved(context) {
            EventCheck::Resolved
        } else {
            EventCheck::Continue
        }
    }
}

/// Reach the end zone to resolve. Never fails.
#[derive(Clone, Copy, Debug, Default)]
pub struct ZoneRules;

impl EventRules for ZoneRules {}

/// Fails when the antagonist catches the player mid-encounter.
#[derive(Clone, Copy, Debug, Default)]
pub struct HazardRules;

impl EventRules for HazardRules {
    fn check_failed(&self, context: &EventContext<'_>) -> bool {
        context.antagonist.intersects(&context.player)
    }
}

/// Resolves only when the player attacks from inside the end zone.
#[derive(Clone, Copy, Debug, Default)]
pub struct StrikeRules;

impl EventRules for StrikeRules {
    fn check_resolved(&self, context: &EventContext<'_>) -> bool {
        !context.attack.is_zero() && context.player.intersects(&context.zones.end())
    }
}

/// Content describing an encounter before the phase assigns it an id.
#[derive(Debug)]
pub struct EventSpec {
    zones: EventZones,
    mandatory: bool,
    time_budget: u32,
    dialogue: Option<DialogueId>,
    rules: Box<dyn EventRules>,
}

impl EventSpec {
    /// Creates a zone encounter without dialogue.
    #[must_use]
    pub fn new(zones: EventZones, mandatory: bool, time_budget: u32) -> Self {
        Self {
            zones,
            mandatory,
            time_budget,
            dialogue: None,
            rules: Box::new(ZoneRules),
        }
    }

    /// Replaces the rules deciding how the encounter behaves.
    #[must_use]
    pub fn with_rules<R>(mut self, rules: R) -> Self
    where
        R: EventRules + 'static,
    {
        self.rules = Box::new(rules);
        self
    }

    /// Attaches a dialogue sequence shown when the encounter starts.
    #[must_use]
    pub fn with_dialogue(mut self, dialogue: DialogueId) -> Self {
        self.dialogue = Some(dialogue);
        self
    }

    /// Whether the encounter gates phase completion.
    #[must_use]
    pub const fn is_mandatory(&self) -> bool {
        self.mandatory
    }

    /// Zones of the encounter.
    #[must_use]
    pub const fn zones(&self) -> &EventZones {
        &self.zones
    }
}

/// World state the phase feeds to every reachable event each tick.
#[derive(Clone, Copy, Debug)]
pub struct Snapshot {
    /// Player bounding box in world coordinates.
    pub player: Rect,
    /// Antagonist bounding box in world coordinates.
    pub antagonist: Rect,
    /// Attack direction requested this tick.
    pub attack: InputVector,
}

/// Scripted encounter owned by a phase.
#[derive(Debug)]
pub struct Event {
    id: EventId,
    mandatory: bool,
    zones: EventZones,
    time_budget: u32,
    dialogue: Option<DialogueId>,
    rules: Box<dyn EventRules>,
    state: EventState,
    active_ticks: u32,
    current: Rect,
    screen: Rect,
    end_screen: Rect,
}

impl Event {
    /// Materialises an encounter from its [`EventSpec`]. It starts idle, occupying its start zone.
    #[must_use]
    pub fn from_spec(id: EventId, spec: EventSpec) -> Self {
        let EventSpec {
            zones,
            mandatory,
            time_budget,
            dialogue,
            rules,
        } = spec;
        Self {
            id,
            mandatory,
            zones,
            time_budget,
            dialogue,
            rules,
            state: EventState::Idle,
            active_ticks: 0,
            current: zones.start(),
            screen: zones.start(),
            end_screen: zones.end(),
        }
    }

    /// Identifier assigned by the owning phase.
    #[must_use]
    pub const fn id(&self) -> EventId {
        self.id
    }

    /// Whether the encounter gates phase completion.
    #[must_use]
    pub const fn is_mandatory(&self) -> bool {
        self.mandatory
    }

    /// Role used when drawing the encounter.
    #[must_use]
    pub const fn kind(&self) -> EntityKind {
        if self.mandatory {
            EntityKind::MandatoryEvent
        } else {
            EntityKind::OptionalEvent
        }
    }

    /// Current lifecycle state.
    #[must_use]
    pub const fn state(&self) -> EventState {
        self.state
    }

    /// Whether the encounter has ever started.
    #[must_use]
    pub const fn is_started(&self) -> bool {
        !matches!(self.state, EventState::Idle)
    }

    /// Whether the encounter is currently running.
    #[must_use]
    pub const fn in_execution(&self) -> bool {
        matches!(self.state, EventState::Active)
    }

    /// Zones the encounter was built with.
    #[must_use]
    pub const fn zones(&self) -> &EventZones {
        &self.zones
    }

    /// Duration budget in ticks. Zero means unlimited.
    #[must_use]
    pub const fn time_budget(&self) -> u32 {
        self.time_budget
    }

    /// Ticks spent in the active state.
    #[must_use]
    pub const fn active_ticks(&self) -> u32 {
        self.active_ticks
    }

    /// Dialogue sequence attached to the encounter.
    #[must_use]
    pub const fn dialogue(&self) -> Option<DialogueId> {
        self.dialogue
    }

    /// World position of the zone the encounter currently occupies.
    #[must_use]
    pub const fn position(&self) -> Point {
        self.current.origin()
    }

    /// World box of the zone the encounter currently occupies.
    #[must_use]
    pub const fn bounds(&self) -> Rect {
        self.current
    }

    /// Camera-relative box of the occupied zone as of the last translation.
    #[must_use]
    pub const fn screen(&self) -> Rect {
        self.screen
    }

    /// Camera-relative box of the end zone as of the last translation.
    #[must_use]
    pub const fn end_screen(&self) -> Rect {
        self.end_screen
    }

    /// Re-expresses the displayed geometry relative to `origin`.
    pub fn apply_translation(&mut self, origin: Point) {
        self.screen = self.current.relative_to(origin);
        self.end_screen = self.zones.end().relative_to(origin);
    }

    /// Advances the lifecycle by one tick and re-translates the geometry.
    ///
    /// A single tick performs at most one transition.
    pub fn update(
        &mut self,
        origin: Point,
        snapshot: Snapshot,
        timeout: TimeoutPolicy,
        out: &mut Vec<Signal>,
    ) {
        match self.state {
            EventState::Idle => {
                if self.rules.try_start(&self.context(snapshot)) {
                    self.current = self.zones.event();
                    self.transition(EventState::Active, out);
                }
            }
            EventState::Active => {
                self.active_ticks = self.active_ticks.saturating_add(1);
                let verdict = match self.rules.evaluate(&self.context(snapshot)) {
                    EventCheck::Continue if self.budget_spent() => match timeout {
                        TimeoutPolicy::Ignore => EventCheck::Continue,
                        TimeoutPolicy::Fail => EventCheck::Failed,
                        TimeoutPolicy::Resolve => EventCheck::Resolved,
                    },
                    verdict => verdict,
                };
                match verdict {
                    EventCheck::Continue => {}
                    EventCheck::Resolved => self.transition(EventState::Resolved, out),
                    EventCheck::Failed => self.transition(EventState::Failed, out),
                }
            }
            EventState::Resolved | EventState::Failed => {}
        }
        self.apply_translation(origin);
    }

    fn context(&self, snapshot: Snapshot) -> EventContext<'_> {
        EventContext {
            zones: &self.zones,
            player: snapshot.player,
            antagonist: snapshot.antagonist,
            attack: snapshot.attack,
        }
    }

    fn budget_spent(&self) -> bool {
        self.time_budget > 0 && self.active_ticks >= self.time_budget
    }

    fn transition(&mut self, next: EventState, out: &mut Vec<Signal>) {
        debug_assert!(self.state.permits(next), "{:?} -> {next:?}", self.state);
        debug!("event {} {:?} -> {:?}", self.id.get(), self.state, next);
        self.state = next;
        let event = self.id;
        let mandatory = self.mandatory;
        out.push(match next {
            EventState::Active => Signal::EventStarted {
                event,
                mandatory,
                dialogue: self.dialogue,
            },
            EventState::Resolved => Signal::EventResolved { event, mandatory },
            EventState::Failed => Signal::EventFailed { event, mandatory },
            EventState::Idle => return,
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn zones() -> EventZones {
        EventZones::new(
            Rect::new(100.0, 100.0, 100.0, 75.0),
            Rect::new(100.0, 100.0, 300.0, 150.0),
            Rect::new(200.0, 175.0, 100.0, 75.0),
        )
        .expect("valid zones")
    }

    fn snapshot(player: Rect) -> Snapshot {
        Snapshot {
            player,
            antagonist: Rect::new(5_000.0, 5_000.0, 10.0, 10.0),
            attack: InputVector::ZERO,
        }
    }

    fn far_away() -> Rect {
        Rect::new(2_000.0, 2_000.0, 10.0, 10.0)
    }

    fn in_start_zone() -> Rect {
        Rect::new(110.0, 110.0, 10.0, 10.0)
    }

    fn in_end_zone() -> Rect {
        Rect::new(210.0, 180.0, 10.0, 10.0)
    }

    #[test]
    fn zones_reject_detached_end_zone() {
        let error = EventZones::new(
            Rect::new(0.0, 0.0, 10.0, 10.0),
            Rect::new(0.0, 0.0, 10.0, 10.0),
            Rect::new(50.0, 50.0, 10.0, 10.0),
        )
        .expect_err("end zone must overlap the event zone");
        assert_eq!(error, GeometryError::DetachedEndZone);
    }

    #[test]
    fn zones_reject_degenerate_rectangles() {
        assert!(EventZones::new(
            Rect::new(0.0, 0.0, 0.0, 10.0),
            Rect::new(0.0, 0.0, 10.0, 10.0),
            Rect::new(0.0, 0.0, 10.0, 10.0),
        )
        .is_err());
    }

    #[test]
    fn entering_start_zone_pulls_event_into_event_zone() {
        let mut event = Event::from_spec(EventId::new(0), EventSpec::new(zones(), true, 0));
        let mut signals = Vec::new();

        event.update(
            Point::new(50.0, 40.0),
            snapshot(in_start_zone()),
            TimeoutPolicy::Ignore,
            &mut signals,
        );

        assert_eq!(event.state(), EventState::Active);
        assert!(event.is_started());
        assert!(event.in_execution());
        assert_eq!(event.bounds(), zones().event());
        assert_eq!(event.screen(), Rect::new(50.0, 60.0, 300.0, 150.0));
        assert_eq!(
            signals,
            vec![Signal::EventStarted {
                event: EventId::new(0),
                mandatory: true,
                dialogue: None,
            }]
        );
    }

    #[test]
    fn start_and_resolution_never_share_a_tick() {
        let mut event = Event::from_spec(EventId::new(3), EventSpec::new(zones(), false, 0));
        let mut signals = Vec::new();
        let overlapping_both = Rect::new(150.0, 150.0, 100.0, 50.0);

        event.update(
            Point::ZERO,
            snapshot(overlapping_both),
            TimeoutPolicy::Ignore,
            &mut signals,
        );
        assert_eq!(event.state(), EventState::Active);

        event.update(
            Point::ZERO,
            snapshot(overlapping_both),
            TimeoutPolicy::Ignore,
            &mut signals,
        );
        assert_eq!(event.state(), EventState::Resolved);
        assert_eq!(signals.len(), 2);
    }

    #[test]
    fn lifecycle_never_moves_backwards() {
        let mut event = Event::from_spec(EventId::new(1), EventSpec::new(zones(), true, 0));
        let mut signals = Vec::new();
        let script = [
            far_away(),
            in_start_zone(),
            far_away(),
            in_end_zone(),
            in_start_zone(),
            far_away(),
            in_end_zone(),
        ];
        let mut observed = vec![event.state()];

        for player in script {
            event.update(
                Point::ZERO,
                snapshot(player),
                TimeoutPolicy::Ignore,
                &mut signals,
            );
            observed.push(event.state());
        }

        for pair in observed.windows(2) {
            assert!(
                pair[0] == pair[1] || pair[0].permits(pair[1]),
                "illegal transition {:?} -> {:?}",
                pair[0],
                pair[1]
            );
        }
        assert_eq!(event.state(), EventState::Resolved);
        assert_eq!(event.bounds(), zones().event());
    }

    #[test]
    fn hazard_rules_fail_when_antagonist_reaches_player() {
        let spec = EventSpec::new(zones(), true, 0).with_rules(HazardRules);
        let mut event = Event::from_spec(EventId::new(2), spec);
        let mut signals = Vec::new();
        event.update(
            Point::ZERO,
            snapshot(in_start_zone()),
            TimeoutPolicy::Ignore,
            &mut signals,
        );

        let caught = Snapshot {
            player: Rect::new(150.0, 150.0, 10.0, 10.0),
            antagonist: Rect::new(145.0, 145.0, 20.0, 20.0),
            attack: InputVector::ZERO,
        };
        event.update(Point::ZERO, caught, TimeoutPolicy::Ignore, &mut signals);

        assert_eq!(event.state(), EventState::Failed);
        assert_eq!(
            signals.last(),
            Some(&Signal::EventFailed {
                event: EventId::new(2),
                mandatory: true,
            })
        );
    }

    #[test]
    fn strike_rules_require_an_attack_inside_end_zone() {
        let spec = EventSpec::new(zones(), false, 0).with_rules(StrikeRules);
        let mut event = Event::from_spec(EventId::new(4), spec);
        let mut signals = Vec::new();
        event.update(
            Point::ZERO,
            snapshot(in_start_zone()),
            TimeoutPolicy::Ignore,
            &mut signals,
        );

        event.update(
            Point::ZERO,
            snapshot(in_end_zone()),
            TimeoutPolicy::Ignore,
            &mut signals,
        );
        assert_eq!(event.state(), EventState::Active);

        let striking = Snapshot {
            attack: InputVector::new(1, 0),
            ..snapshot(in_end_zone())
        };
        event.update(Point::ZERO, striking, TimeoutPolicy::Ignore, &mut signals);
        assert_eq!(event.state(), EventState::Resolved);
    }

    #[test]
    fn timeout_policy_decides_exhausted_budget() {
        for (policy, expected) in [
            (TimeoutPolicy::Ignore, EventState::Active),
            (TimeoutPolicy::Fail, EventState::Failed),
            (TimeoutPolicy::Resolve, EventState::Resolved),
        ] {
            let mut event = Event::from_spec(EventId::new(5), EventSpec::new(zones(), true, 3));
            let mut signals = Vec::new();
            event.update(Point::ZERO, snapshot(in_start_zone()), policy, &mut signals);
            for _ in 0..3 {
                event.update(Point::ZERO, snapshot(far_away()), policy, &mut signals);
            }
            assert_eq!(event.state(), expected, "policy {policy:?}");
            assert_eq!(event.active_ticks(), 3);
        }
    }

    #[test]
    fn terminal_events_still_follow_the_camera() {
        let mut event = Event::from_spec(EventId::new(6), EventSpec::new(zones(), true, 0));
        let mut signals = Vec::new();
        event.update(
            Point::ZERO,
            snapshot(in_start_zone()),
            TimeoutPolicy::Ignore,
            &mut signals,
        );
        event.update(
            Point::ZERO,
            snapshot(in_end_zone()),
            TimeoutPolicy::Ignore,
            &mut signals,
        );
        assert_eq!(event.state(), EventState::Resolved);

        event.update(
            Point::new(100.0, 100.0),
            snapshot(far_away()),
            TimeoutPolicy::Ignore,
            &mut signals,
        );

        assert_eq!(event.screen(), Rect::new(0.0, 0.0, 300.0, 150.0));
        assert_eq!(event.end_screen(), Rect::new(100.0, 75.0, 100.0, 75.0));
        assert_eq!(signals.len(), 2);
    }
}
