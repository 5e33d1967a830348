//! Collaborators that report through the log instead of a device.

use log::{debug, info};
use phasewalk_core::{AudioService, CollaboratorError, Frame, Renderer};

/// [`Renderer`] that summarises every `interval`-th frame.
#[derive(Debug)]
pub(crate) struct LoggingRenderer {
    interval: u64,
    frames: u64,
}

impl LoggingRenderer {
    pub(crate) fn new(interval: u64) -> Self {
        Self {
            interval: interval.max(1),
            frames: 0,
        }
    }
}

impl Renderer for LoggingRenderer {
    fn draw(&mut self, frame: &Frame) -> Result<(), CollaboratorError> {
        if self.frames % self.interval == 0 {
            debug!(
                "frame {}: phase {} origin ({:.0}, {:.0}) life {:.3} drawables {} {:?}",
                self.frames,
                frame.ordinal,
                frame.origin.x,
                frame.origin.y,
                frame.life,
                frame.drawables.len(),
                frame.status,
            );
        }
        self.frames += 1;
        Ok(())
    }
}

/// [`AudioService`] that logs playback requests.
#[derive(Debug, Default)]
pub(crate) struct LoggingAudio;

impl AudioService for LoggingAudio {
    fn play(&mut self, name: &str, looping: bool) -> Result<(), CollaboratorError> {
        info!("audio: play {name} (looping: {looping})");
        Ok(())
    }

    fn stop(&mut self, name: &str) -> Result<(), CollaboratorError> {
        info!("audio: stop {name}");
        Ok(())
    }
}
