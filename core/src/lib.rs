#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Core contracts shared across the Phasewalk runtime.
//!
//! This crate defines the vocabulary that connects adapters, the
//! authoritative phase simulation, and pure systems. Adapters collect
//! [`Controls`] through an [`InputSource`], the world advances a phase one
//! tick at a time and broadcasts [`Signal`] values describing what changed,
//! and presentation collaborators receive culled [`Frame`] snapshots through
//! the [`Renderer`] contract. Systems consume signal streams and never reach
//! into global state.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Canonical banner emitted when the experience boots.
pub const WELCOME_BANNER: &str = "Welcome to Phasewalk.";

/// Point expressed in world or screen units.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Point {
    /// Horizontal coordinate, growing to the right.
    pub x: f32,
    /// Vertical coordinate, growing downwards.
    pub y: f32,
}

impl Point {
    /// Origin of the coordinate system.
    pub const ZERO: Self = Self::new(0.0, 0.0);

    /// Creates a new point.
    #[must_use]
    pub const fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }

    /// Returns the point shifted by the provided offsets.
    #[must_use]
    pub fn offset(self, dx: f32, dy: f32) -> Self {
        Self::new(self.x + dx, self.y + dy)
    }

    /// Expresses the point relative to `origin`.
    #[must_use]
    pub fn relative_to(self, origin: Point) -> Self {
        Self::new(self.x - origin.x, self.y - origin.y)
    }

    /// Clamps each axis into the provided inclusive bounds.
    ///
    /// Bounds whose maximum lies below the minimum collapse onto the minimum.
    #[must_use]
    pub fn clamp(self, min: Point, max: Point) -> Self {
        Self::new(self.x.min(max.x).max(min.x), self.y.min(max.y).max(min.y))
    }

    /// Reports whether both coordinates are finite numbers.
    #[must_use]
    pub fn is_finite(&self) -> bool {
        self.x.is_finite() && self.y.is_finite()
    }
}

/// Width and height of a placed object.
///
/// Sizes are validated on construction so downstream code never observes a
/// degenerate box.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Size {
    width: f32,
    height: f32,
}

impl Size {
    /// Creates a size, rejecting zero, negative, or non-finite dimensions.
    pub fn new(width: f32, height: f32) -> Result<Self, GeometryError> {
        if !width.is_finite() || !height.is_finite() || width <= 0.0 || height <= 0.0 {
            return Err(GeometryError::InvalidSize { width, height });
        }
        Ok(Self { width, height })
    }

    /// Horizontal extent.
    #[must_use]
    pub const fn width(&self) -> f32 {
        self.width
    }

    /// Vertical extent.
    #[must_use]
    pub const fn height(&self) -> f32 {
        self.height
    }

    /// Half of the size along each axis, as a point offset.
    #[must_use]
    pub fn half(&self) -> Point {
        Point::new(self.width * 0.5, self.height * 0.5)
    }
}

/// Axis-aligned bounding box.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Rect {
    /// Left edge.
    pub x: f32,
    /// Top edge.
    pub y: f32,
    /// Horizontal extent.
    pub width: f32,
    /// Vertical extent.
    pub height: f32,
}

impl Rect {
    /// Creates a rectangle from raw components without validation.
    ///
    /// Use [`Rect::validated`] for rectangles sourced from content.
    #[must_use]
    pub const fn new(x: f32, y: f32, width: f32, height: f32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    /// Builds a rectangle anchored at `origin` with the provided size.
    #[must_use]
    pub const fn from_origin_and_size(origin: Point, size: Size) -> Self {
        Self::new(origin.x, origin.y, size.width, size.height)
    }

    /// Checks that the rectangle has finite coordinates and a positive area.
    pub fn validated(self) -> Result<Self, GeometryError> {
        if !self.origin().is_finite() {
            return Err(GeometryError::NonFiniteOrigin {
                x: self.x,
                y: self.y,
            });
        }
        let _ = Size::new(self.width, self.height)?;
        Ok(self)
    }

    /// Upper-left corner.
    #[must_use]
    pub const fn origin(&self) -> Point {
        Point::new(self.x, self.y)
    }

    /// Size of the rectangle.
    ///
    /// Only meaningful for validated rectangles; degenerate inputs yield an
    /// error.
    pub fn size(&self) -> Result<Size, GeometryError> {
        Size::new(self.width, self.height)
    }

    /// Geometric centre.
    #[must_use]
    pub fn center(&self) -> Point {
        Point::new(self.x + self.width * 0.5, self.y + self.height * 0.5)
    }

    /// Right edge.
    #[must_use]
    pub fn right(&self) -> f32 {
        self.x + self.width
    }

    /// Bottom edge.
    #[must_use]
    pub fn bottom(&self) -> f32 {
        self.y + self.height
    }

    /// Reports whether the two rectangles overlap with a positive area.
    ///
    /// Rectangles that only share an edge do not intersect.
    #[must_use]
    pub fn intersects(&self, other: &Rect) -> bool {
        self.x < other.right()
            && other.x < self.right()
            && self.y < other.bottom()
            && other.y < self.bottom()
    }

    /// Returns the same rectangle expressed relative to `origin`.
    #[must_use]
    pub fn relative_to(&self, origin: Point) -> Self {
        let anchor = self.origin().relative_to(origin);
        Self::new(anchor.x, anchor.y, self.width, self.height)
    }
}

/// Unique identifier assigned to a spatial entity within a phase.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct EntityId(u32);

impl EntityId {
    /// Creates a new entity identifier with the provided numeric value.
    #[must_use]
    pub const fn new(value: u32) -> Self {
        Self(value)
    }

    /// Retrieves the numeric representation of the identifier.
    #[must_use]
    pub const fn get(&self) -> u32 {
        self.0
    }
}

/// Unique identifier assigned to an event within a phase.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct EventId(u32);

impl EventId {
    /// Creates a new event identifier with the provided numeric value.
    #[must_use]
    pub const fn new(value: u32) -> Self {
        Self(value)
    }

    /// Retrieves the numeric representation of the identifier.
    #[must_use]
    pub const fn get(&self) -> u32 {
        self.0
    }
}

/// Identity of a constructed phase. Successors always receive a fresh id.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct PhaseId(u64);

impl PhaseId {
    /// Creates a new phase identifier with the provided numeric value.
    #[must_use]
    pub const fn new(value: u64) -> Self {
        Self(value)
    }

    /// Retrieves the numeric representation of the identifier.
    #[must_use]
    pub const fn get(&self) -> u64 {
        self.0
    }

    /// Identifier that follows this one.
    #[must_use]
    pub const fn next(self) -> Self {
        Self(self.0.wrapping_add(1))
    }
}

/// Identifier of a dialogue sequence held by a [`DialogueStore`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct DialogueId(u32);

impl DialogueId {
    /// Creates a new dialogue identifier with the provided numeric value.
    #[must_use]
    pub const fn new(value: u32) -> Self {
        Self(value)
    }

    /// Retrieves the numeric representation of the identifier.
    #[must_use]
    pub const fn get(&self) -> u32 {
        self.0
    }
}

/// Identifies a drawable item regardless of whether it is an entity or an event.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Tag {
    /// A spatial entity.
    Entity(EntityId),
    /// A scripted event.
    Event(EventId),
}

/// Role an item plays inside a phase.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum EntityKind {
    /// The player-controlled entity.
    Player,
    /// Collectible that completes the phase on contact.
    Goal,
    /// Antagonist roaming the phase.
    Antagonist,
    /// Scenery obstacle.
    Obstacle,
    /// Non-player character.
    Npc,
    /// Event that gates phase completion.
    MandatoryEvent,
    /// Event that may be skipped.
    OptionalEvent,
}

/// Two-dimensional input vector with components in {-1, 0, +1}.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct InputVector {
    x: i8,
    y: i8,
}

impl InputVector {
    /// Vector with no direction.
    pub const ZERO: Self = Self { x: 0, y: 0 };

    /// Creates a vector, reducing each component to its sign.
    #[must_use]
    pub const fn new(x: i8, y: i8) -> Self {
        Self {
            x: x.signum(),
            y: y.signum(),
        }
    }

    /// Horizontal component.
    #[must_use]
    pub const fn x(&self) -> i8 {
        self.x
    }

    /// Vertical component.
    #[must_use]
    pub const fn y(&self) -> i8 {
        self.y
    }

    /// Reports whether the vector has no direction.
    #[must_use]
    pub const fn is_zero(&self) -> bool {
        self.x == 0 && self.y == 0
    }

    /// Scales the vector into a world-space delta.
    #[must_use]
    pub fn scaled(&self, factor: f32) -> Point {
        Point::new(f32::from(self.x) * factor, f32::from(self.y) * factor)
    }
}

/// Input gathered for a single simulation tick.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Controls {
    /// Directional movement requested by the player.
    pub movement: InputVector,
    /// Directional attack requested by the player.
    pub attack: InputVector,
    /// Confirmation button (start, resume, retry).
    pub confirm: bool,
    /// Pause button.
    pub pause: bool,
    /// Return-to-menu button.
    pub menu: bool,
}

/// Lifecycle state of a scripted event.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum EventState {
    /// Waiting for the player to enter the start zone.
    Idle,
    /// Encounter in progress.
    Active,
    /// Encounter completed successfully.
    Resolved,
    /// Encounter failed.
    Failed,
}

impl EventState {
    /// Reports whether no further transitions are possible.
    #[must_use]
    pub const fn is_terminal(self) -> bool {
        matches!(self, Self::Resolved | Self::Failed)
    }

    /// Reports whether moving from `self` to `next` respects the forward-only lifecycle.
    #[must_use]
    pub const fn permits(self, next: EventState) -> bool {
        matches!(
            (self, next),
            (Self::Idle, Self::Active) | (Self::Active, Self::Resolved | Self::Failed)
        )
    }
}

/// Verdict produced while an event is active.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum EventCheck {
    /// The encounter keeps running.
    Continue,
    /// The encounter finished successfully.
    Resolved,
    /// The encounter failed.
    Failed,
}

/// Decides what happens when an active event exhausts its duration budget.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TimeoutPolicy {
    /// The budget is recorded but never enforced.
    #[default]
    Ignore,
    /// The event fails once the budget is spent.
    Fail,
    /// The event resolves once the budget is spent.
    Resolve,
}

/// Decides how a failed mandatory event affects its phase.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MandatoryFailurePolicy {
    /// The phase is lost.
    #[default]
    LosePhase,
    /// The failed event stays current, so only the goal can complete the phase.
    Block,
}

/// Why a phase ended successfully.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum CompletionReason {
    /// The player touched the goal collectible.
    GoalCollected,
    /// No unresolved mandatory events remain.
    MandatoryEventsCleared,
}

/// Why a phase was lost.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum LossReason {
    /// The player's depletable resource reached zero.
    LifeDepleted,
    /// A mandatory event failed.
    MandatoryEventFailed(EventId),
}

/// Simulation status of a phase.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum PhaseStatus {
    /// The phase is simulating.
    Running,
    /// The phase is frozen after a loss.
    Lost(LossReason),
}

/// Notifications broadcast by the world after processing a tick.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Signal {
    /// Announces that a phase was constructed and activated.
    PhaseStarted {
        /// Identity of the new phase.
        phase: PhaseId,
        /// Level number within the run.
        ordinal: u32,
    },
    /// Indicates that one simulation tick ran.
    TickAdvanced {
        /// Phase that was simulated.
        phase: PhaseId,
        /// Tick index after advancing.
        tick: u64,
    },
    /// Reports that the player entered an event's start zone.
    EventStarted {
        /// Event that started.
        event: EventId,
        /// Whether the event gates completion.
        mandatory: bool,
        /// Dialogue sequence presentation layers should display, if any.
        dialogue: Option<DialogueId>,
    },
    /// Reports that an event resolved.
    EventResolved {
        /// Event that resolved.
        event: EventId,
        /// Whether the event gated completion.
        mandatory: bool,
    },
    /// Reports that an event failed.
    EventFailed {
        /// Event that failed.
        event: EventId,
        /// Whether the event gated completion.
        mandatory: bool,
    },
    /// Confirms that the mandatory cursor moved past a resolved event.
    MandatoryAdvanced {
        /// Event now exposed as the current mandatory event, if any remain.
        next: Option<EventId>,
    },
    /// Announces that a phase was completed.
    PhaseCompleted {
        /// Phase that ended.
        phase: PhaseId,
        /// What satisfied the completion check.
        reason: CompletionReason,
    },
    /// Announces that a phase was lost and frozen.
    PhaseLost {
        /// Phase that was lost.
        phase: PhaseId,
        /// What caused the loss.
        reason: LossReason,
    },
}

/// Single item handed to presentation, positioned in camera-relative space.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Drawable {
    /// Identity of the item.
    pub tag: Tag,
    /// Role of the item.
    pub kind: EntityKind,
    /// Bounding box in screen coordinates.
    pub screen: Rect,
}

/// Culled snapshot of a phase ready for drawing.
#[derive(Clone, Debug, PartialEq)]
pub struct Frame {
    /// Phase the frame was produced from.
    pub phase: PhaseId,
    /// Level number within the run.
    pub ordinal: u32,
    /// World-space origin of the camera.
    pub origin: Point,
    /// Size of the viewport in screen units.
    pub viewport: Size,
    /// Items to draw, in paint order. The player is always present and last.
    pub drawables: Vec<Drawable>,
    /// Remaining player life.
    pub life: f32,
    /// Simulation status of the phase.
    pub status: PhaseStatus,
}

/// One line of a dialogue sequence.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct DialogueLine {
    /// Character speaking the line.
    pub speaker: String,
    /// Text spoken.
    pub text: String,
}

/// Presentation collaborator that paints frames.
pub trait Renderer {
    /// Paints every drawable of the frame at its camera-relative box.
    fn draw(&mut self, frame: &Frame) -> Result<(), CollaboratorError>;
}

/// Collaborator that reports player input once per tick.
pub trait InputSource {
    /// Captures the controls for the upcoming tick.
    fn poll(&mut self) -> Controls;
}

/// Fire-and-forget sound playback.
pub trait AudioService {
    /// Starts a named sound, optionally looping it.
    fn play(&mut self, name: &str, looping: bool) -> Result<(), CollaboratorError>;

    /// Stops a named sound if it is playing.
    fn stop(&mut self, name: &str) -> Result<(), CollaboratorError>;
}

/// Read-only mapping from dialogue identifiers to ordered lines.
pub trait DialogueStore {
    /// Returns the lines of a sequence, if it exists.
    fn sequence(&self, id: DialogueId) -> Option<&[DialogueLine]>;
}

/// Errors raised when content describes impossible geometry.
#[derive(Clone, Copy, Debug, PartialEq, Error)]
pub enum GeometryError {
    /// Width or height was zero, negative, or not a finite number.
    #[error("invalid size {width}x{height}: dimensions must be positive and finite")]
    InvalidSize {
        /// Offending width.
        width: f32,
        /// Offending height.
        height: f32,
    },
    /// A coordinate was not a finite number.
    #[error("non-finite origin ({x}, {y})")]
    NonFiniteOrigin {
        /// Offending horizontal coordinate.
        x: f32,
        /// Offending vertical coordinate.
        y: f32,
    },
    /// The world or viewport has no usable extent.
    #[error("invalid bounds {width}x{height}")]
    InvalidBounds {
        /// Offending width.
        width: f32,
        /// Offending height.
        height: f32,
    },
    /// An event's end zone does not overlap the zone the player is pulled into.
    #[error("event end zone lies outside its event zone")]
    DetachedEndZone,
}

/// Failures reported by presentation collaborators.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum CollaboratorError {
    /// The renderer could not present a frame.
    #[error("renderer failed: {0}")]
    Render(String),
    /// The audio backend could not play or stop a sound.
    #[error("audio failed: {0}")]
    Audio(String),
}
