//! TOML configuration for the Phasewalk binary.

use std::{fs, path::Path};

use anyhow::{bail, Context, Result};
use phasewalk_core::{GeometryError, MandatoryFailurePolicy, Size, TimeoutPolicy};
use phasewalk_system_generation::{Footprint, GenerationConfig};
use phasewalk_system_progression::RunSettings;
use phasewalk_world::PhaseSettings;
use serde::Deserialize;

/// Top-level configuration file layout. Every section is optional.
#[derive(Clone, Debug, Default, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub(crate) struct GameConfig {
    pub(crate) window: WindowConfig,
    pub(crate) world: WorldConfig,
    pub(crate) player: PlayerConfig,
    pub(crate) events: EventPolicyConfig,
    pub(crate) generation: GenerationConfig,
    pub(crate) run: RunConfig,
}

/// Window and viewport settings. The viewport always matches the window.
#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub(crate) struct WindowConfig {
    pub(crate) title: String,
    pub(crate) width: f32,
    pub(crate) height: f32,
    pub(crate) vsync: bool,
    pub(crate) show_fps: bool,
}

impl Default for WindowConfig {
    fn default() -> Self {
        Self {
            title: "Phasewalk".to_owned(),
            width: 800.0,
            height: 600.0,
            vsync: true,
            show_fps: false,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub(crate) struct WorldConfig {
    pub(crate) width: f32,
    pub(crate) height: f32,
}

impl Default for WorldConfig {
    fn default() -> Self {
        Self {
            width: 4000.0,
            height: 2000.0,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub(crate) struct PlayerConfig {
    pub(crate) speed: f32,
    pub(crate) life_drain: f32,
}

impl Default for PlayerConfig {
    fn default() -> Self {
        Self {
            speed: 5.0,
            life_drain: 0.001,
        }
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub(crate) struct EventPolicyConfig {
    pub(crate) timeout: TimeoutPolicy,
    pub(crate) mandatory_failure: MandatoryFailurePolicy,
}

#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub(crate) struct RunConfig {
    pub(crate) seed: u64,
    pub(crate) phase_limit: Option<u32>,
    pub(crate) music: Option<String>,
}

impl Default for RunConfig {
    fn default() -> Self {
        Self {
            seed: 0,
            phase_limit: Some(5),
            music: Some("theme".to_owned()),
        }
    }
}

impl GameConfig {
    /// Reads and parses the configuration at `path`.
    pub(crate) fn load(path: &Path) -> Result<Self> {
        let contents = fs::read_to_string(path)
            .with_context(|| format!("failed to read config at {}", path.display()))?;
        Self::parse(&contents)
            .with_context(|| format!("failed to parse config at {}", path.display()))
    }

    pub(crate) fn parse(contents: &str) -> Result<Self> {
        toml::from_str(contents).context("invalid config toml")
    }

    /// Window extent as a validated size.
    pub(crate) fn viewport(&self) -> Result<Size, GeometryError> {
        Size::new(self.window.width, self.window.height)
    }

    /// Builds the run settings shared by every phase.
    ///
    /// The world must cover twice the window, the area content spawns into.
    pub(crate) fn run_settings(&self) -> Result<RunSettings> {
        let world = Size::new(self.world.width, self.world.height)?;
        let viewport = self.viewport()?;
        if world.width() < viewport.width() * 2.0 || world.height() < viewport.height() * 2.0 {
            bail!(
                "world {}x{} must be at least twice the window {}x{}",
                world.width(),
                world.height(),
                viewport.width(),
                viewport.height()
            );
        }
        for (name, value) in [
            ("player.speed", self.player.speed),
            ("player.life_drain", self.player.life_drain),
        ] {
            if !value.is_finite() || value < 0.0 {
                bail!("{name} must be a non-negative number, got {value}");
            }
        }

        let mut phase = PhaseSettings::new(world, viewport);
        phase.player_speed = self.player.speed;
        phase.life_drain = self.player.life_drain;
        phase.timeout = self.events.timeout;
        phase.mandatory_failure = self.events.mandatory_failure;

        let mut settings = RunSettings::new(phase);
        settings.phase_limit = self.run.phase_limit;
        settings.music = self.run.music.clone();
        Ok(settings)
    }

    /// Generation tunables with the spawn screen tied to the window.
    pub(crate) fn generation(&self) -> GenerationConfig {
        GenerationConfig {
            screen: Footprint::new(self.window.width, self.window.height),
            ..self.generation.clone()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_file_uses_defaults() {
        let config = GameConfig::parse("").expect("empty config is valid");
        assert_eq!(config, GameConfig::default());

        let settings = config.run_settings().expect("default geometry is valid");
        assert_eq!(settings.phase.world.width(), 4000.0);
        assert_eq!(settings.phase.timeout, TimeoutPolicy::Ignore);
        assert_eq!(
            settings.phase.mandatory_failure,
            MandatoryFailurePolicy::LosePhase
        );
        assert_eq!(settings.phase_limit, Some(5));
    }

    #[test]
    fn sections_override_defaults() {
        let config = GameConfig::parse(
            r#"
            [window]
            width = 1024
            height = 768

            [player]
            life_drain = 0.01

            [events]
            timeout = "fail"
            mandatory_failure = "block"

            [generation]
            mandatory_events = 4

            [run]
            seed = 99
            "#,
        )
        .expect("valid config");

        let settings = config.run_settings().expect("valid geometry");
        assert_eq!(settings.phase.viewport.width(), 1024.0);
        assert_eq!(settings.phase.life_drain, 0.01);
        assert_eq!(settings.phase.timeout, TimeoutPolicy::Fail);
        assert_eq!(
            settings.phase.mandatory_failure,
            MandatoryFailurePolicy::Block
        );
        assert_eq!(config.run.seed, 99);

        let generation = config.generation();
        assert_eq!(generation.mandatory_events, 4);
        assert_eq!(generation.screen, Footprint::new(1024.0, 768.0));
    }

    #[test]
    fn unknown_policy_is_rejected() {
        let error = GameConfig::parse("[events]\ntimeout = \"explode\"\n")
            .expect_err("unknown policy");
        assert!(format!("{error:#}").contains("invalid config toml"));
    }

    #[test]
    fn degenerate_world_is_reported() {
        let config = GameConfig::parse("[world]\nwidth = 0\n").expect("parses");
        let error = config.run_settings().expect_err("zero width");
        assert!(matches!(
            error.downcast_ref::<GeometryError>(),
            Some(GeometryError::InvalidSize { .. })
        ));
    }

    #[test]
    fn world_smaller_than_the_spawn_area_is_rejected() {
        let narrow = "[world]\nwidth = 1200\nheight = 2000\n";
        let config = GameConfig::parse(narrow).expect("parses");
        let error = config.run_settings().expect_err("narrow world");
        assert!(error.to_string().contains("twice the window"));
    }

    #[test]
    fn non_finite_or_negative_tuning_is_rejected() {
        for section in [
            "[player]\nlife_drain = nan\n",
            "[player]\nspeed = inf\n",
            "[player]\nspeed = -1.0\n",
        ] {
            let config = GameConfig::parse(section).expect("parses");
            let error = config.run_settings().expect_err("invalid tuning");
            assert!(error.to_string().contains("non-negative"), "{section}");
        }
    }

    #[test]
    fn bundled_config_parses() {
        let config = GameConfig::parse(include_str!("../assets/phasewalk.toml"))
            .expect("bundled config is valid");
        assert!(config.run_settings().is_ok());
    }
}
