#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Seeded content generation for Phasewalk phases.
//!
//! [`Generator`] scatters the antagonist, goal, scenery and events uniformly
//! across a spawn area twice the size of the screen. The same seed and
//! configuration always yield the same sequence of phases.

use log::debug;
use phasewalk_core::{DialogueId, GeometryError, Point, Rect, Size};
use phasewalk_world::{
    ContentSource, EventSpec, EventZones, HazardRules, PhaseContent, StrikeRules,
};
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use serde::{Deserialize, Serialize};

/// Width and height pair as written in configuration files.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Footprint {
    /// Horizontal extent.
    pub width: f32,
    /// Vertical extent.
    pub height: f32,
}

impl Footprint {
    /// Creates a footprint.
    #[must_use]
    pub const fn new(width: f32, height: f32) -> Self {
        Self { width, height }
    }

    /// Validates the footprint into a [`Size`].
    pub fn to_size(self) -> Result<Size, GeometryError> {
        Size::new(self.width, self.height)
    }
}

/// Tunables controlling what a generated phase contains.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GenerationConfig {
    /// Screen extent. The player spawns at this point and everything else
    /// spawns within twice this extent.
    pub screen: Footprint,
    /// Player box size.
    pub player: Footprint,
    /// Initial player life.
    pub player_life: f32,
    /// Antagonist box size.
    pub antagonist: Footprint,
    /// Goal box size.
    pub goal: Footprint,
    /// Obstacles per phase.
    pub obstacles: u32,
    /// Obstacle box size.
    pub obstacle: Footprint,
    /// Non-player characters per phase.
    pub npcs: u32,
    /// Non-player character box size.
    pub npc: Footprint,
    /// Mandatory events per phase.
    pub mandatory_events: u32,
    /// Optional events per phase.
    pub optional_events: u32,
    /// Tick budget assigned to every event. Zero means unlimited.
    pub event_budget: u32,
    /// Number of dialogue sequences available to mandatory events. Zero
    /// disables dialogue.
    pub dialogues: u32,
}

impl Default for GenerationConfig {
    fn default() -> Self {
        Self {
            screen: Footprint::new(800.0, 600.0),
            player: Footprint::new(100.0, 150.0),
            player_life: 1.0,
            antagonist: Footprint::new(100.0, 150.0),
            goal: Footprint::new(50.0, 50.0),
            obstacles: 2,
            obstacle: Footprint::new(23.0, 40.0),
            npcs: 2,
            npc: Footprint::new(67.0, 100.0),
            mandatory_events: 2,
            optional_events: 2,
            event_budget: 30 * 60,
            dialogues: 0,
        }
    }
}

/// Deterministic [`ContentSource`] backed by a ChaCha stream.
#[derive(Debug)]
pub struct Generator {
    config: GenerationConfig,
    rng: ChaCha8Rng,
}

impl Generator {
    /// Creates a generator seeded with `seed`.
    #[must_use]
    pub fn new(config: GenerationConfig, seed: u64) -> Self {
        Self {
            config,
            rng: ChaCha8Rng::seed_from_u64(seed),
        }
    }

    fn spawn_point(&mut self) -> Point {
        let width = (self.config.screen.width * 2.0).max(1.0);
        let height = (self.config.screen.height * 2.0).max(1.0);
        Point::new(
            self.rng.gen_range(0.0..width).floor(),
            self.rng.gen_range(0.0..height).floor(),
        )
    }

    fn scatter(&mut self, footprint: Footprint) -> Result<Rect, GeometryError> {
        let size = footprint.to_size()?;
        Ok(Rect::from_origin_and_size(self.spawn_point(), size))
    }

    fn mandatory_event(&mut self, ordinal: u32, index: u32) -> Result<EventSpec, GeometryError> {
        let Point { x, y } = self.spawn_point();
        let zones = EventZones::new(
            Rect::new(x, y, 100.0, 75.0),
            Rect::new(x, y, 300.0, 150.0),
            Rect::new(x + 100.0, y + 75.0, 100.0, 75.0),
        )?;
        let spec = EventSpec::new(zones, true, self.config.event_budget);
        Ok(match self.config.dialogues {
            0 => spec,
            count => spec.with_dialogue(DialogueId::new(ordinal.wrapping_add(index) % count)),
        })
    }

    fn optional_event(&mut self, index: u32) -> Result<EventSpec, GeometryError> {
        let Point { x, y } = self.spawn_point();
        let zones = EventZones::new(
            Rect::new(x, y, 50.0, 25.0),
            Rect::new(x, y, 150.0, 50.0),
            Rect::new(x + 50.0, y, 50.0, 25.0),
        )?;
        let spec = EventSpec::new(zones, false, self.config.event_budget);
        Ok(if index % 2 == 0 {
            spec.with_rules(StrikeRules)
        } else {
            spec.with_rules(HazardRules)
        })
    }
}

impl ContentSource for Generator {
    fn next_content(&mut self, ordinal: u32) -> Result<PhaseContent, GeometryError> {
        let player = Rect::from_origin_and_size(
            Point::new(self.config.screen.width, self.config.screen.height),
            self.config.player.to_size()?,
        );
        let antagonist = self.scatter(self.config.antagonist)?;
        let goal = self.scatter(self.config.goal)?;

        let mut obstacles = Vec::new();
        for _ in 0..self.config.obstacles {
            obstacles.push(self.scatter(self.config.obstacle)?);
        }
        let mut npcs = Vec::new();
        for _ in 0..self.config.npcs {
            npcs.push(self.scatter(self.config.npc)?);
        }

        let mut events = Vec::new();
        for index in 0..self.config.mandatory_events {
            events.push(self.mandatory_event(ordinal, index)?);
        }
        for index in 0..self.config.optional_events {
            events.push(self.optional_event(index)?);
        }

        debug!(
            "generated phase {ordinal}: {} obstacles, {} npcs, {} events",
            obstacles.len(),
            npcs.len(),
            events.len()
        );

        Ok(PhaseContent {
            player,
            player_life: self.config.player_life,
            goal,
            antagonist,
            obstacles,
            npcs,
            events,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn spawn_points_stay_inside_twice_the_screen() {
        let mut generator = Generator::new(GenerationConfig::default(), 7);
        for _ in 0..256 {
            let point = generator.spawn_point();
            assert!((0.0..1600.0).contains(&point.x));
            assert!((0.0..1200.0).contains(&point.y));
        }
    }

    #[test]
    fn dialogue_ids_cycle_through_available_sequences() {
        let config = GenerationConfig {
            dialogues: 3,
            ..GenerationConfig::default()
        };
        let mut generator = Generator::new(config, 1);
        let spec = generator.mandatory_event(2, 2).expect("valid event");
        let event = phasewalk_world::Event::from_spec(phasewalk_core::EventId::new(0), spec);
        assert_eq!(event.dialogue(), Some(DialogueId::new(1)));
    }

    #[test]
    fn invalid_footprint_is_reported() {
        let config = GenerationConfig {
            goal: Footprint::new(0.0, 10.0),
            ..GenerationConfig::default()
        };
        let mut generator = Generator::new(config, 3);
        let error = generator.next_content(0).expect_err("zero width goal");
        assert!(matches!(error, GeometryError::InvalidSize { .. }));
    }
}
