#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Shared rendering contracts for Phasewalk adapters.

use anyhow::Result as AnyResult;
use glam::Vec2;
use log::warn;
use phasewalk_core::{
    CollaboratorError, Controls, DialogueId, DialogueLine, DialogueStore, EntityKind, Frame,
    PhaseStatus, Renderer,
};
use std::{error::Error, fmt, time::Duration};

/// RGBA color used when presenting frames.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Color {
    /// Red channel intensity in the range 0.0..=1.0.
    pub red: f32,
    /// Green channel intensity in the range 0.0..=1.0.
    pub green: f32,
    /// Blue channel intensity in the range 0.0..=1.0.
    pub blue: f32,
    /// Alpha channel intensity in the range 0.0..=1.0.
    pub alpha: f32,
}

impl Color {
    /// Creates a new color from floating point channels.
    #[must_use]
    pub const fn new(red: f32, green: f32, blue: f32, alpha: f32) -> Self {
        Self {
            red,
            green,
            blue,
            alpha,
        }
    }

    /// Creates an opaque color from byte RGB values.
    #[must_use]
    pub const fn from_rgb_u8(red: u8, green: u8, blue: u8) -> Self {
        Self {
            red: red as f32 / 255.0,
            green: green as f32 / 255.0,
            blue: blue as f32 / 255.0,
            alpha: 1.0,
        }
    }

    /// Returns a new color lightened towards white by the provided amount.
    #[must_use]
    pub fn lighten(self, amount: f32) -> Self {
        let amount = amount.clamp(0.0, 1.0);

        Self {
            red: lighten_channel(self.red, amount),
            green: lighten_channel(self.green, amount),
            blue: lighten_channel(self.blue, amount),
            alpha: self.alpha,
        }
    }
}

fn lighten_channel(channel: f32, amount: f32) -> f32 {
    channel + (1.0 - channel) * amount
}

/// Colors assigned to each kind of drawable.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Palette {
    /// Player fill.
    pub player: Color,
    /// Goal collectible fill.
    pub goal: Color,
    /// Antagonist fill.
    pub antagonist: Color,
    /// Obstacle fill.
    pub obstacle: Color,
    /// Non-player character fill.
    pub npc: Color,
    /// Mandatory event fill.
    pub mandatory_event: Color,
    /// Optional event fill.
    pub optional_event: Color,
}

impl Palette {
    /// Looks up the fill used for `kind`.
    #[must_use]
    pub const fn color(&self, kind: EntityKind) -> Color {
        match kind {
            EntityKind::Player => self.player,
            EntityKind::Goal => self.goal,
            EntityKind::Antagonist => self.antagonist,
            EntityKind::Obstacle => self.obstacle,
            EntityKind::Npc => self.npc,
            EntityKind::MandatoryEvent => self.mandatory_event,
            EntityKind::OptionalEvent => self.optional_event,
        }
    }
}

impl Default for Palette {
    fn default() -> Self {
        Self {
            player: Color::from_rgb_u8(64, 160, 255),
            goal: Color::from_rgb_u8(255, 214, 64),
            antagonist: Color::from_rgb_u8(200, 40, 60),
            obstacle: Color::from_rgb_u8(110, 110, 120),
            npc: Color::from_rgb_u8(90, 190, 110),
            mandatory_event: Color::new(0.85, 0.45, 1.0, 0.6),
            optional_event: Color::new(0.6, 0.85, 1.0, 0.45),
        }
    }
}

/// Input snapshot gathered by adapters before updating the scene.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub struct FrameInput {
    /// Movement, attack and menu buttons for this frame.
    pub controls: Controls,
    /// Whether the adapter detected a request to show the next dialogue line.
    pub advance_dialogue: bool,
    /// Whether the adapter detected a request to close the window.
    pub quit: bool,
}

/// Rectangle painted in screen space.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SceneItem {
    /// Upper-left corner in screen units.
    pub position: Vec2,
    /// Width and height in screen units.
    pub size: Vec2,
    /// Fill color.
    pub color: Color,
    /// Role of the item in the phase.
    pub kind: EntityKind,
}

/// Scene description combining the culled phase items and overlays.
#[derive(Clone, Debug, PartialEq, Default)]
pub struct Scene {
    /// Items in paint order.
    pub items: Vec<SceneItem>,
    /// Remaining player life, shown as a bar.
    pub life: f32,
    /// Level number within the run.
    pub ordinal: u32,
    /// Centered banner text such as menu prompts.
    pub banner: Option<String>,
    /// Dialogue line currently displayed.
    pub dialogue: Option<DialogueLine>,
}

impl Scene {
    /// Converts a culled frame into paintable items.
    #[must_use]
    pub fn from_frame(frame: &Frame, palette: &Palette) -> Self {
        let items = frame
            .drawables
            .iter()
            .map(|drawable| SceneItem {
                position: Vec2::new(drawable.screen.x, drawable.screen.y),
                size: Vec2::new(drawable.screen.width, drawable.screen.height),
                color: palette.color(drawable.kind),
                kind: drawable.kind,
            })
            .collect();
        let banner = match frame.status {
            PhaseStatus::Running => None,
            PhaseStatus::Lost(_) => Some("Phase lost".to_owned()),
        };
        Self {
            items,
            life: frame.life.max(0.0),
            ordinal: frame.ordinal,
            banner,
            dialogue: None,
        }
    }
}

/// Presentation descriptor consumed by rendering backends.
#[derive(Clone, Debug, PartialEq)]
pub struct Presentation {
    /// Title used by the created window.
    pub window_title: String,
    /// Solid color used to clear each frame.
    pub clear_color: Color,
    /// Window size in screen units.
    pub viewport: Vec2,
    /// Scene content that should be displayed.
    pub scene: Scene,
}

impl Presentation {
    /// Constructs a new presentation descriptor, rejecting empty viewports.
    pub fn new<T>(
        window_title: T,
        clear_color: Color,
        viewport: Vec2,
        scene: Scene,
    ) -> Result<Self, RenderingError>
    where
        T: Into<String>,
    {
        if !(viewport.x > 0.0 && viewport.y > 0.0) || !viewport.is_finite() {
            return Err(RenderingError::InvalidViewport {
                width: viewport.x,
                height: viewport.y,
            });
        }
        Ok(Self {
            window_title: window_title.into(),
            clear_color,
            viewport,
            scene,
        })
    }
}

/// Rendering backend capable of presenting Phasewalk scenes.
pub trait RenderingBackend {
    /// Runs the rendering backend until it is requested to exit.
    ///
    /// The provided `update_scene` closure receives the frame delta and the
    /// input captured by the adapter, and rebuilds the scene before it is
    /// rendered. Returning `Err` stops the backend and surfaces the error.
    fn run<F>(self, presentation: Presentation, update_scene: F) -> AnyResult<()>
    where
        F: FnMut(Duration, FrameInput, &mut Scene) -> AnyResult<()> + 'static;
}

/// [`Renderer`] that keeps the most recent frame for a backend to paint.
#[derive(Debug, Default)]
pub struct FrameCapture {
    latest: Option<Frame>,
    frames_seen: u64,
}

impl FrameCapture {
    /// Creates an empty capture.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Most recent frame, if any was drawn.
    #[must_use]
    pub fn latest(&self) -> Option<&Frame> {
        self.latest.as_ref()
    }

    /// Number of frames received so far.
    #[must_use]
    pub const fn frames_seen(&self) -> u64 {
        self.frames_seen
    }

    /// Forgets the stored frame.
    pub fn clear(&mut self) {
        self.latest = None;
    }
}

impl Renderer for FrameCapture {
    fn draw(&mut self, frame: &Frame) -> Result<(), CollaboratorError> {
        self.latest = Some(frame.clone());
        self.frames_seen += 1;
        Ok(())
    }
}

/// Walks through the lines of one dialogue sequence.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct DialogueCursor {
    sequence: Option<DialogueId>,
    line: usize,
}

impl DialogueCursor {
    /// Creates a closed cursor.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            sequence: None,
            line: 0,
        }
    }

    /// Starts showing `sequence` from its first line.
    pub fn open(&mut self, sequence: DialogueId) {
        self.sequence = Some(sequence);
        self.line = 0;
    }

    /// Stops showing the current sequence.
    pub fn close(&mut self) {
        *self = Self::new();
    }

    /// Sequence being shown, if any.
    #[must_use]
    pub const fn sequence(&self) -> Option<DialogueId> {
        self.sequence
    }

    /// Whether a sequence is being shown.
    #[must_use]
    pub const fn is_open(&self) -> bool {
        self.sequence.is_some()
    }

    /// Line currently shown.
    #[must_use]
    pub fn line<'a>(&self, store: &'a dyn DialogueStore) -> Option<&'a DialogueLine> {
        let lines = store.sequence(self.sequence?)?;
        lines.get(self.line)
    }

    /// Moves to the next line. Returns `true` once the sequence is exhausted,
    /// closing the cursor.
    pub fn advance(&mut self, store: &dyn DialogueStore) -> bool {
        let Some(sequence) = self.sequence else {
            return true;
        };
        let Some(lines) = store.sequence(sequence) else {
            warn!("dialogue {} is missing", sequence.get());
            self.close();
            return true;
        };
        self.line += 1;
        if self.line >= lines.len() {
            self.close();
            return true;
        }
        false
    }
}

/// Errors that can occur when constructing rendering descriptors.
#[derive(Debug, PartialEq)]
pub enum RenderingError {
    /// The window must have a positive, finite extent.
    InvalidViewport {
        /// Provided width.
        width: f32,
        /// Provided height.
        height: f32,
    },
}

impl fmt::Display for RenderingError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidViewport { width, height } => {
                write!(
                    f,
                    "viewport must be positive and finite (received {width}x{height})"
                )
            }
        }
    }
}

impl Error for RenderingError {}
