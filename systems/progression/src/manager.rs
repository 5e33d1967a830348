use std::mem;

use log::{info, warn};
use phasewalk_core::{AudioService, Controls, DialogueId, InputVector, PhaseId, Renderer, Signal};
use phasewalk_world::{query, ContentSource, Phase};

use crate::{RunError, RunSettings};

/// Owns the active phase and the collaborators it talks to.
///
/// Collaborators are injected at construction and never reached through
/// global state. The manager renders after every update, including the
/// updates of a lost phase, so presentation keeps showing the frozen world.
///
/// A failure to build a successor phase consumes the finished one: the
/// manager is left without an active phase until [`PhaseManager::start_phase`]
/// is called again.
#[derive(Debug)]
pub struct PhaseManager<S, R, A> {
    settings: RunSettings,
    source: S,
    renderer: R,
    audio: A,
    phase: Option<Phase>,
    next_id: PhaseId,
    counter: u32,
    dialogue: Option<DialogueId>,
    signals: Vec<Signal>,
    music_playing: bool,
}

impl<S, R, A> PhaseManager<S, R, A>
where
    S: ContentSource,
    R: Renderer,
    A: AudioService,
{
    /// Creates a manager with no active phase.
    pub fn new(settings: RunSettings, source: S, renderer: R, audio: A) -> Self {
        Self {
            settings,
            source,
            renderer,
            audio,
            phase: None,
            next_id: PhaseId::new(0),
            counter: 0,
            dialogue: None,
            signals: Vec::new(),
            music_playing: false,
        }
    }

    /// Builds and activates a phase for the current counter, replacing any
    /// active one. A music loop that is already playing carries on.
    pub fn start_phase(&mut self) -> Result<(), RunError> {
        let phase = Phase::generate(
            self.next_id,
            self.counter,
            &mut self.source,
            self.settings.phase.clone(),
        )?;
        info!("starting phase {} ({:?})", phase.ordinal(), phase.id());
        self.next_id = phase.id().next();
        self.signals.push(Signal::PhaseStarted {
            phase: phase.id(),
            ordinal: phase.ordinal(),
        });
        self.dialogue = None;
        let frame = query::frame(&phase);
        self.phase = Some(phase);

        if let (Some(track), false) = (&self.settings.music, self.music_playing) {
            self.audio.play(track, true)?;
            self.music_playing = true;
        }
        self.renderer.draw(&frame)?;
        Ok(())
    }

    /// Advances the active phase by one tick and renders the result.
    ///
    /// Does nothing when no phase is active.
    pub fn update(&mut self, movement: InputVector, attack: InputVector) -> Result<(), RunError> {
        let Some(phase) = self.phase.take() else {
            return Ok(());
        };
        let previous = phase.id();
        let first_new = self.signals.len();
        let controls = Controls {
            movement,
            attack,
            ..Controls::default()
        };

        let phase = match phase.update(controls, &mut self.source, &mut self.signals) {
            Ok(phase) => phase,
            Err(error) => {
                warn!("phase {} could not be replaced: {error}", previous.get());
                self.dialogue = None;
                return Err(error.into());
            }
        };
        if phase.id() != previous {
            self.counter = self.counter.saturating_add(1);
            self.next_id = phase.id().next();
            self.dialogue = None;
            info!("phase counter now {}", self.counter);
        }

        for signal in &self.signals[first_new..] {
            if let Signal::EventStarted {
                dialogue: Some(dialogue),
                ..
            } = signal
            {
                self.dialogue = Some(*dialogue);
            }
        }

        let frame = query::frame(&phase);
        self.phase = Some(phase);
        self.renderer.draw(&frame)?;
        Ok(())
    }

    /// Drops the active phase and silences its music.
    pub fn quit_phase(&mut self) -> Result<(), RunError> {
        if self.phase.take().is_none() {
            warn!("quit requested without an active phase");
        }
        self.dialogue = None;
        if let (Some(track), true) = (&self.settings.music, self.music_playing) {
            self.audio.stop(track)?;
            self.music_playing = false;
        }
        Ok(())
    }

    /// Dialogue sequence waiting to be shown, if any.
    #[must_use]
    pub const fn current_dialogue(&self) -> Option<DialogueId> {
        self.dialogue
    }

    /// Clears the dialogue signal once presentation has shown it.
    pub fn finish_dialogue(&mut self) {
        self.dialogue = None;
    }

    /// Number of phases completed since the last reset.
    #[must_use]
    pub const fn phase_counter(&self) -> u32 {
        self.counter
    }

    /// Restarts the run from the first phase ordinal.
    pub fn reset_counter(&mut self) {
        self.counter = 0;
    }

    /// Whether the active phase is frozen after a loss.
    #[must_use]
    pub fn is_lost(&self) -> bool {
        self.phase.as_ref().map_or(false, Phase::is_lost)
    }

    /// Whether the counter reached the configured phase limit.
    #[must_use]
    pub fn run_complete(&self) -> bool {
        self.settings
            .phase_limit
            .map_or(false, |limit| self.counter >= limit)
    }

    /// Drains the signals gathered since the last call.
    pub fn take_signals(&mut self) -> Vec<Signal> {
        mem::take(&mut self.signals)
    }

    /// Active phase, if any.
    #[must_use]
    pub const fn phase(&self) -> Option<&Phase> {
        self.phase.as_ref()
    }

    /// Settings the run was configured with.
    #[must_use]
    pub const fn settings(&self) -> &RunSettings {
        &self.settings
    }

    /// Provides read-only access to the renderer.
    #[must_use]
    pub const fn renderer(&self) -> &R {
        &self.renderer
    }

    /// Provides mutable access to the renderer.
    pub fn renderer_mut(&mut self) -> &mut R {
        &mut self.renderer
    }

    /// Provides read-only access to the audio service.
    #[must_use]
    pub const fn audio(&self) -> &A {
        &self.audio
    }
}
