use log::info;
use phasewalk_core::{AudioService, Controls, Renderer};
use phasewalk_world::ContentSource;

use crate::{PhaseManager, RunError};

/// Screen the run is currently showing.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Screen {
    /// Title screen waiting for the player to start.
    MainMenu,
    /// A phase is being simulated.
    Playing,
    /// Simulation is suspended.
    Paused,
    /// The active phase was lost.
    GameOver,
    /// The configured number of phases was completed.
    Finished,
}

/// Menu state machine wrapped around a [`PhaseManager`].
#[derive(Debug)]
pub struct RunFlow<S, R, A> {
    manager: PhaseManager<S, R, A>,
    screen: Screen,
}

impl<S, R, A> RunFlow<S, R, A>
where
    S: ContentSource,
    R: Renderer,
    A: AudioService,
{
    /// Wraps `manager`, starting at the main menu.
    pub fn new(manager: PhaseManager<S, R, A>) -> Self {
        Self {
            manager,
            screen: Screen::MainMenu,
        }
    }

    /// Screen currently shown.
    #[must_use]
    pub const fn screen(&self) -> Screen {
        self.screen
    }

    /// Provides read-only access to the manager.
    #[must_use]
    pub const fn manager(&self) -> &PhaseManager<S, R, A> {
        &self.manager
    }

    /// Provides mutable access to the manager.
    pub fn manager_mut(&mut self) -> &mut PhaseManager<S, R, A> {
        &mut self.manager
    }

    /// Processes one frame of input and returns the screen to show next.
    pub fn step(&mut self, controls: Controls) -> Result<Screen, RunError> {
        let next = match self.screen {
            Screen::MainMenu if controls.confirm => {
                self.manager.start_phase()?;
                Screen::Playing
            }
            Screen::MainMenu => Screen::MainMenu,
            Screen::Playing if controls.pause => Screen::Paused,
            Screen::Playing => self.play(controls)?,
            Screen::Paused if controls.confirm => Screen::Playing,
            Screen::Paused if controls.menu => {
                self.manager.quit_phase()?;
                Screen::MainMenu
            }
            Screen::Paused => Screen::Paused,
            Screen::GameOver if controls.confirm => {
                self.manager.start_phase()?;
                Screen::Playing
            }
            Screen::GameOver if controls.menu => {
                self.manager.quit_phase()?;
                Screen::MainMenu
            }
            Screen::GameOver => Screen::GameOver,
            Screen::Finished if controls.confirm || controls.menu => {
                self.manager.reset_counter();
                self.manager.quit_phase()?;
                Screen::MainMenu
            }
            Screen::Finished => Screen::Finished,
        };

        if next != self.screen {
            info!("screen {:?} -> {next:?}", self.screen);
            self.screen = next;
        }
        Ok(next)
    }

    fn play(&mut self, controls: Controls) -> Result<Screen, RunError> {
        if self.manager.current_dialogue().is_none() {
            if let Err(error) = self.manager.update(controls.movement, controls.attack) {
                if self.manager.phase().is_none() {
                    info!("screen {:?} -> {:?}", self.screen, Screen::MainMenu);
                    self.screen = Screen::MainMenu;
                }
                return Err(error);
            }
        }

        Ok(if self.manager.is_lost() {
            Screen::GameOver
        } else if self.manager.run_complete() {
            Screen::Finished
        } else {
            Screen::Playing
        })
    }
}
