#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Authoritative phase simulation for Phasewalk.
//!
//! A [`Phase`] owns every entity and event of one level segment. Each call to
//! [`Phase::update`] consumes the phase and hands back either the same phase
//! advanced by one tick or a freshly built successor, so no state leaks
//! across level boundaries.

pub mod camera;
pub mod entity;
pub mod event;

use std::collections::VecDeque;

use log::{debug, info};
use phasewalk_core::{
    CompletionReason, Controls, EntityId, EntityKind, EventId, EventState, GeometryError,
    LossReason, MandatoryFailurePolicy, PhaseId, PhaseStatus, Point, Rect, Signal, Size,
    TimeoutPolicy,
};

pub use camera::Camera;
pub use entity::SpatialEntity;
pub use event::{
    Event, EventContext, EventRules, EventSpec, EventZones, HazardRules, Snapshot, StrikeRules,
    ZoneRules,
};

const DEFAULT_PLAYER_SPEED: f32 = 5.0;
const DEFAULT_LIFE_DRAIN: f32 = 0.001;

/// Tuning shared by every phase of a run.
#[derive(Clone, Debug, PartialEq)]
pub struct PhaseSettings {
    /// Extent of the playable world.
    pub world: Size,
    /// Extent of the camera viewport.
    pub viewport: Size,
    /// World units the player travels per tick along each pressed axis.
    pub player_speed: f32,
    /// Life removed from the player every simulated tick.
    pub life_drain: f32,
    /// What happens when an active event exhausts its budget.
    pub timeout: TimeoutPolicy,
    /// What happens to the phase when a mandatory event fails.
    pub mandatory_failure: MandatoryFailurePolicy,
}

impl PhaseSettings {
    /// Settings with an explicit world and viewport and default tuning.
    #[must_use]
    pub fn new(world: Size, viewport: Size) -> Self {
        Self {
            world,
            viewport,
            player_speed: DEFAULT_PLAYER_SPEED,
            life_drain: DEFAULT_LIFE_DRAIN,
            timeout: TimeoutPolicy::default(),
            mandatory_failure: MandatoryFailurePolicy::default(),
        }
    }
}

/// Raw placement of every item in a phase, validated by [`Phase::new`].
#[derive(Debug)]
pub struct PhaseContent {
    /// Player box.
    pub player: Rect,
    /// Initial player life.
    pub player_life: f32,
    /// Goal collectible box.
    pub goal: Rect,
    /// Antagonist box.
    pub antagonist: Rect,
    /// Scenery obstacle boxes.
    pub obstacles: Vec<Rect>,
    /// Non-player character boxes.
    pub npcs: Vec<Rect>,
    /// Encounters in placement order. Mandatory ones are exposed one at a time.
    pub events: Vec<EventSpec>,
}

/// Produces the content of successive phases.
pub trait ContentSource {
    /// Builds the content of the phase with the given ordinal.
    fn next_content(&mut self, ordinal: u32) -> Result<PhaseContent, GeometryError>;
}

/// One level segment.
#[derive(Debug)]
pub struct Phase {
    id: PhaseId,
    ordinal: u32,
    tick: u64,
    settings: PhaseSettings,
    camera: Camera,
    player: SpatialEntity,
    goal: SpatialEntity,
    antagonist: SpatialEntity,
    obstacles: Vec<SpatialEntity>,
    npcs: Vec<SpatialEntity>,
    mandatory: VecDeque<Event>,
    optional: Vec<Event>,
    status: PhaseStatus,
}

impl Phase {
    /// Validates `content` and assembles a running phase.
    pub fn new(
        id: PhaseId,
        ordinal: u32,
        content: PhaseContent,
        settings: PhaseSettings,
    ) -> Result<Self, GeometryError> {
        let PhaseContent {
            player,
            player_life,
            goal,
            antagonist,
            obstacles,
            npcs,
            events,
        } = content;

        let player_size = player.validated()?.size()?;
        let max_x = settings.world.width() - player_size.width();
        let max_y = settings.world.height() - player_size.height();
        if !(0.0..=max_x).contains(&player.x) || !(0.0..=max_y).contains(&player.y) {
            return Err(GeometryError::InvalidBounds {
                width: settings.world.width(),
                height: settings.world.height(),
            });
        }

        let mut next_entity = 0;
        let mut place = |kind: EntityKind, rect: Rect, life: f32| {
            let size = rect.validated()?.size()?;
            let entity = SpatialEntity::new(
                EntityId::new(next_entity),
                kind,
                rect.origin(),
                size,
                life,
            );
            next_entity += 1;
            Ok::<_, GeometryError>(entity)
        };

        let player = place(EntityKind::Player, player, player_life)?;
        let goal = place(EntityKind::Goal, goal, 0.0)?;
        let antagonist = place(EntityKind::Antagonist, antagonist, 0.0)?;
        let obstacles = obstacles
            .into_iter()
            .map(|rect| place(EntityKind::Obstacle, rect, 0.0))
            .collect::<Result<Vec<_>, _>>()?;
        let npcs = npcs
            .into_iter()
            .map(|rect| place(EntityKind::Npc, rect, 0.0))
            .collect::<Result<Vec<_>, _>>()?;

        let mut mandatory = VecDeque::new();
        let mut optional = Vec::new();
        for (index, spec) in events.into_iter().enumerate() {
            let id = EventId::new(u32::try_from(index).unwrap_or(u32::MAX));
            if spec.is_mandatory() {
                mandatory.push_back(Event::from_spec(id, spec));
            } else {
                optional.push(Event::from_spec(id, spec));
            }
        }

        let camera = Camera::new(settings.viewport, settings.world);
        let mut phase = Self {
            id,
            ordinal,
            tick: 0,
            settings,
            camera,
            player,
            goal,
            antagonist,
            obstacles,
            npcs,
            mandatory,
            optional,
            status: PhaseStatus::Running,
        };
        phase.camera.follow(phase.player.bounds().center());
        phase.translate_all();
        Ok(phase)
    }

    /// Pulls content for `ordinal` from `source` and builds a phase from it.
    pub fn generate(
        id: PhaseId,
        ordinal: u32,
        source: &mut dyn ContentSource,
        settings: PhaseSettings,
    ) -> Result<Self, GeometryError> {
        let content = source.next_content(ordinal)?;
        Self::new(id, ordinal, content, settings)
    }

    /// Advances the phase by one tick.
    ///
    /// Returns a successor built from `source` when the phase is complete,
    /// the unchanged phase while it is lost, and the simulated phase
    /// otherwise.
    pub fn update(
        mut self,
        controls: Controls,
        source: &mut dyn ContentSource,
        out: &mut Vec<Signal>,
    ) -> Result<Phase, GeometryError> {
        if let Some(reason) = self.completion() {
            info!("phase {} complete: {reason:?}", self.ordinal);
            out.push(Signal::PhaseCompleted {
                phase: self.id,
                reason,
            });
            let successor = Self::generate(
                self.id.next(),
                self.ordinal.saturating_add(1),
                source,
                self.settings.clone(),
            )?;
            out.push(Signal::PhaseStarted {
                phase: successor.id,
                ordinal: successor.ordinal,
            });
            return Ok(successor);
        }

        if self.is_lost() {
            return Ok(self);
        }

        self.simulate(controls, out);
        Ok(self)
    }

    /// Identity of the phase.
    #[must_use]
    pub const fn id(&self) -> PhaseId {
        self.id
    }

    /// Level number within the run.
    #[must_use]
    pub const fn ordinal(&self) -> u32 {
        self.ordinal
    }

    /// Number of ticks simulated so far.
    #[must_use]
    pub const fn tick(&self) -> u64 {
        self.tick
    }

    /// Simulation status.
    #[must_use]
    pub const fn status(&self) -> PhaseStatus {
        self.status
    }

    /// Whether the world is frozen after a loss.
    #[must_use]
    pub const fn is_lost(&self) -> bool {
        matches!(self.status, PhaseStatus::Lost(_))
    }

    /// Reports what would complete the phase on the next update, if anything.
    #[must_use]
    pub fn completion(&self) -> Option<CompletionReason> {
        if self.player.bounds().intersects(&self.goal.bounds()) {
            Some(CompletionReason::GoalCollected)
        } else if self.mandatory.is_empty() {
            Some(CompletionReason::MandatoryEventsCleared)
        } else {
            None
        }
    }

    fn simulate(&mut self, controls: Controls, out: &mut Vec<Signal>) {
        let player_size = self.player.size();
        let max = Point::new(
            self.settings.world.width() - player_size.width(),
            self.settings.world.height() - player_size.height(),
        );
        self.player.apply_movement(
            controls.movement.scaled(self.settings.player_speed),
            Point::ZERO,
            max,
        );
        self.camera.follow(self.player.bounds().center());
        let origin = self.camera.origin();

        let snapshot = Snapshot {
            player: self.player.bounds(),
            antagonist: self.antagonist.bounds(),
            attack: controls.attack,
        };
        let timeout = self.settings.timeout;
        if let Some(current) = self.mandatory.front_mut() {
            current.update(origin, snapshot, timeout, out);
        }
        for event in &mut self.optional {
            event.update(origin, snapshot, timeout, out);
        }
        self.translate_all();

        self.advance_mandatory_cursor(out);
        self.optional.retain(|event| !event.state().is_terminal());

        self.player.drain_life(self.settings.life_drain);
        if self.player.is_depleted() && !self.is_lost() {
            self.mark_lost(LossReason::LifeDepleted, out);
        }

        self.tick = self.tick.saturating_add(1);
        out.push(Signal::TickAdvanced {
            phase: self.id,
            tick: self.tick,
        });
    }

    fn advance_mandatory_cursor(&mut self, out: &mut Vec<Signal>) {
        let Some(current) = self.mandatory.front() else {
            return;
        };
        match current.state() {
            EventState::Resolved => {
                let _ = self.mandatory.pop_front();
                let next = self.mandatory.front().map(Event::id);
                debug!("mandatory cursor advanced to {next:?}");
                out.push(Signal::MandatoryAdvanced { next });
            }
            EventState::Failed => {
                let failed = current.id();
                match self.settings.mandatory_failure {
                    MandatoryFailurePolicy::LosePhase => {
                        self.mark_lost(LossReason::MandatoryEventFailed(failed), out);
                    }
                    MandatoryFailurePolicy::Block => {
                        debug!("mandatory event {} failed and blocks the cursor", failed.get());
                    }
                }
            }
            EventState::Idle | EventState::Active => {}
        }
    }

    fn mark_lost(&mut self, reason: LossReason, out: &mut Vec<Signal>) {
        info!("phase {} lost: {reason:?}", self.ordinal);
        self.status = PhaseStatus::Lost(reason);
        out.push(Signal::PhaseLost {
            phase: self.id,
            reason,
        });
    }

    fn translate_all(&mut self) {
        let origin = self.camera.origin();
        self.player.apply_translation(origin);
        self.goal.apply_translation(origin);
        self.antagonist.apply_translation(origin);
        for entity in self.obstacles.iter_mut().chain(self.npcs.iter_mut()) {
            entity.apply_translation(origin);
        }
        for event in self.mandatory.iter_mut().chain(self.optional.iter_mut()) {
            event.apply_translation(origin);
        }
    }
}

/// Query functions that provide read-only access to phase state.
pub mod query {
    use phasewalk_core::{Drawable, Frame, Tag};

    use super::{Camera, Event, Phase, SpatialEntity};

    /// Retrieves the player entity.
    #[must_use]
    pub fn player(phase: &Phase) -> &SpatialEntity {
        &phase.player
    }

    /// Retrieves the goal collectible.
    #[must_use]
    pub fn goal(phase: &Phase) -> &SpatialEntity {
        &phase.goal
    }

    /// Retrieves the antagonist.
    #[must_use]
    pub fn antagonist(phase: &Phase) -> &SpatialEntity {
        &phase.antagonist
    }

    /// Retrieves the scenery obstacles.
    #[must_use]
    pub fn obstacles(phase: &Phase) -> &[SpatialEntity] {
        &phase.obstacles
    }

    /// Retrieves the non-player characters.
    #[must_use]
    pub fn npcs(phase: &Phase) -> &[SpatialEntity] {
        &phase.npcs
    }

    /// Provides read-only access to the camera.
    #[must_use]
    pub fn camera(phase: &Phase) -> &Camera {
        &phase.camera
    }

    /// Event currently exposed as the mandatory one, if any remain.
    #[must_use]
    pub fn current_mandatory(phase: &Phase) -> Option<&Event> {
        phase.mandatory.front()
    }

    /// Mandatory events still tracked, current one first.
    pub fn mandatory_events(phase: &Phase) -> impl Iterator<Item = &Event> {
        phase.mandatory.iter()
    }

    /// Optional events still reachable.
    pub fn optional_events(phase: &Phase) -> impl Iterator<Item = &Event> {
        phase.optional.iter()
    }

    /// Every entity the phase simulates, including the player.
    pub fn entities(phase: &Phase) -> impl Iterator<Item = &SpatialEntity> {
        [&phase.player, &phase.goal, &phase.antagonist]
            .into_iter()
            .chain(phase.obstacles.iter())
            .chain(phase.npcs.iter())
    }

    /// Every item tracked by the phase, pending mandatory events included.
    #[must_use]
    pub fn all_drawables(phase: &Phase) -> Vec<Drawable> {
        entities(phase)
            .map(entity_drawable)
            .chain(phase.mandatory.iter().map(event_drawable))
            .chain(phase.optional.iter().map(event_drawable))
            .collect()
    }

    /// Items available for interaction, independent of the viewport.
    ///
    /// The player is not part of the reachable set; it is added separately
    /// when culling.
    #[must_use]
    pub fn reachable(phase: &Phase) -> Vec<Drawable> {
        [&phase.goal, &phase.antagonist]
            .into_iter()
            .chain(phase.obstacles.iter())
            .chain(phase.npcs.iter())
            .map(entity_drawable)
            .chain(phase.mandatory.front().map(event_drawable))
            .chain(
                phase
                    .optional
                    .iter()
                    .filter(|event| !event.state().is_terminal())
                    .map(event_drawable),
            )
            .collect()
    }

    /// Builds the culled frame handed to presentation.
    #[must_use]
    pub fn frame(phase: &Phase) -> Frame {
        let drawables = phase
            .camera
            .cull(entity_drawable(&phase.player), reachable(phase));
        Frame {
            phase: phase.id,
            ordinal: phase.ordinal,
            origin: phase.camera.origin(),
            viewport: phase.camera.viewport(),
            drawables,
            life: phase.player.life(),
            status: phase.status,
        }
    }

    fn entity_drawable(entity: &SpatialEntity) -> Drawable {
        Drawable {
            tag: Tag::Entity(entity.id()),
            kind: entity.kind(),
            screen: entity.screen(),
        }
    }

    fn event_drawable(event: &Event) -> Drawable {
        Drawable {
            tag: Tag::Event(event.id()),
            kind: event.kind(),
            screen: event.screen(),
        }
    }
}
