#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Macroquad-backed rendering adapter for Phasewalk.
//!
//! Macroquad's optional audio stack depends on native ALSA development
//! libraries, which are unavailable in the containerised CI environment.
//! The adapter therefore depends on macroquad without its default `audio`
//! feature; sound is routed through the `AudioService` collaborator instead.

use anyhow::{anyhow, Result};
use glam::Vec2;
use log::info;
use macroquad::input::{is_key_down, is_key_pressed, KeyCode};
use phasewalk_core::{Controls, InputVector};
use phasewalk_rendering::{Color, FrameInput, Presentation, RenderingBackend, Scene};
use std::{
    sync::mpsc,
    time::{Duration, Instant},
};

const HUD_FONT_SIZE: f32 = 24.0;
const BANNER_FONT_SIZE: f32 = 40.0;
const LIFE_BAR_WIDTH: f32 = 200.0;
const LIFE_BAR_HEIGHT: f32 = 14.0;
const DIALOGUE_BOX_HEIGHT: f32 = 96.0;

/// Keyboard state sampled for a single frame.
///
/// Separated from macroquad polling so key mappings can be replayed in tests.
#[doc(hidden)]
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct KeyObservations {
    /// `A` held.
    pub left: bool,
    /// `D` held.
    pub right: bool,
    /// `W` held.
    pub up: bool,
    /// `S` held.
    pub down: bool,
    /// Left arrow held.
    pub attack_left: bool,
    /// Right arrow held.
    pub attack_right: bool,
    /// Up arrow held.
    pub attack_up: bool,
    /// Down arrow held.
    pub attack_down: bool,
    /// `Enter` pressed this frame.
    pub confirm: bool,
    /// `P` pressed this frame.
    pub pause: bool,
    /// `M` pressed this frame.
    pub menu: bool,
    /// `Space` pressed this frame.
    pub advance_dialogue: bool,
    /// `Escape` or `Q` pressed this frame.
    pub quit: bool,
}

impl KeyObservations {
    fn poll() -> Self {
        Self {
            left: is_key_down(KeyCode::A),
            right: is_key_down(KeyCode::D),
            up: is_key_down(KeyCode::W),
            down: is_key_down(KeyCode::S),
            attack_left: is_key_down(KeyCode::Left),
            attack_right: is_key_down(KeyCode::Right),
            attack_up: is_key_down(KeyCode::Up),
            attack_down: is_key_down(KeyCode::Down),
            confirm: is_key_pressed(KeyCode::Enter),
            pause: is_key_pressed(KeyCode::P),
            menu: is_key_pressed(KeyCode::M),
            advance_dialogue: is_key_pressed(KeyCode::Space),
            quit: is_key_pressed(KeyCode::Escape) || is_key_pressed(KeyCode::Q),
        }
    }

    /// Folds the observed keys into the input handed to the scene update.
    #[must_use]
    pub fn to_frame_input(self) -> FrameInput {
        FrameInput {
            controls: Controls {
                movement: axis_pair(self.left, self.right, self.up, self.down),
                attack: axis_pair(
                    self.attack_left,
                    self.attack_right,
                    self.attack_up,
                    self.attack_down,
                ),
                confirm: self.confirm,
                pause: self.pause,
                menu: self.menu,
            },
            advance_dialogue: self.advance_dialogue,
            quit: self.quit,
        }
    }
}

fn axis(negative: bool, positive: bool) -> i8 {
    i8::from(positive) - i8::from(negative)
}

fn axis_pair(left: bool, right: bool, up: bool, down: bool) -> InputVector {
    InputVector::new(axis(left, right), axis(up, down))
}

/// Rendering backend implemented on top of macroquad.
#[derive(Debug, Default)]
pub struct MacroquadBackend {
    swap_interval: Option<i32>,
    show_fps: bool,
}

impl MacroquadBackend {
    /// Returns a backend that requests the platform's default swap interval.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Configures the backend to request a specific swap interval from the platform.
    #[must_use]
    pub fn with_swap_interval(mut self, swap_interval: Option<i32>) -> Self {
        self.swap_interval = swap_interval;
        self
    }

    /// Configures the backend to either synchronise presentation with the display refresh rate
    /// or render as fast as possible.
    #[must_use]
    pub fn with_vsync(self, enabled: bool) -> Self {
        let swap_interval = if enabled { Some(1) } else { Some(0) };
        self.with_swap_interval(swap_interval)
    }

    /// Configures whether the backend logs frame timing once per second.
    #[must_use]
    pub fn with_show_fps(mut self, show: bool) -> Self {
        self.show_fps = show;
        self
    }
}

#[derive(Debug, Default)]
struct FpsCounter {
    elapsed: Duration,
    frames: u32,
    render_accum: Duration,
}

#[derive(Clone, Copy, Debug, PartialEq)]
struct FpsMetrics {
    per_second: f32,
    avg_render: Duration,
}

impl FpsCounter {
    /// Records a rendered frame and returns the averages once one second has elapsed.
    fn record_frame(&mut self, frame: Duration, render: Duration) -> Option<FpsMetrics> {
        self.elapsed += frame;
        self.frames = self.frames.saturating_add(1);
        self.render_accum += render;

        if self.elapsed < Duration::from_secs(1) {
            return None;
        }

        let metrics = FpsMetrics {
            per_second: self.frames as f32 / self.elapsed.as_secs_f32(),
            avg_render: self.render_accum / self.frames,
        };
        *self = Self::default();
        Some(metrics)
    }
}

impl RenderingBackend for MacroquadBackend {
    fn run<F>(self, presentation: Presentation, mut update_scene: F) -> Result<()>
    where
        F: FnMut(Duration, FrameInput, &mut Scene) -> Result<()> + 'static,
    {
        let Self {
            swap_interval,
            show_fps,
        } = self;

        let Presentation {
            window_title,
            clear_color,
            viewport,
            scene,
        } = presentation;

        let mut config = macroquad::window::Conf {
            window_title,
            window_width: viewport.x.round() as i32,
            window_height: viewport.y.round() as i32,
            ..macroquad::window::Conf::default()
        };
        if let Some(swap_interval) = swap_interval {
            config.platform.swap_interval = Some(swap_interval);
        }

        let (outcome_sender, outcome_receiver) = mpsc::channel::<Result<()>>();

        macroquad::Window::from_config(config, async move {
            let mut scene = scene;
            let background = to_macroquad_color(clear_color);
            let mut fps_counter = FpsCounter::default();

            let outcome = loop {
                let input = KeyObservations::poll().to_frame_input();
                if input.quit {
                    break Ok(());
                }

                let dt_seconds = macroquad::time::get_frame_time();
                let frame_dt = Duration::from_secs_f32(dt_seconds.max(0.0));
                if let Err(error) = update_scene(frame_dt, input, &mut scene) {
                    break Err(error);
                }

                let render_start = Instant::now();
                macroquad::window::clear_background(background);
                let metrics = SceneMetrics::new(
                    viewport,
                    macroquad::window::screen_width(),
                    macroquad::window::screen_height(),
                );
                draw_items(&scene, &metrics);
                draw_hud(&scene);
                draw_dialogue(&scene);
                draw_banner(&scene);
                let render_duration = render_start.elapsed();

                if let Some(FpsMetrics {
                    per_second,
                    avg_render,
                }) = fps_counter.record_frame(frame_dt, render_duration)
                {
                    if show_fps {
                        info!(
                            "FPS: {:.2} | render: {:>6.2}ms",
                            per_second,
                            avg_render.as_secs_f64() * 1_000.0,
                        );
                    }
                }

                macroquad::window::next_frame().await;
            };

            let _ = outcome_sender.send(outcome);
        });

        outcome_receiver
            .recv()
            .unwrap_or_else(|_| Err(anyhow!("window closed before the game loop finished")))
    }
}

/// Maps the fixed-size logical viewport onto the actual window.
#[derive(Clone, Copy, Debug, PartialEq)]
struct SceneMetrics {
    scale: f32,
    offset: Vec2,
}

impl SceneMetrics {
    fn new(viewport: Vec2, screen_width: f32, screen_height: f32) -> Self {
        if viewport.x <= f32::EPSILON || viewport.y <= f32::EPSILON {
            return Self {
                scale: 1.0,
                offset: Vec2::ZERO,
            };
        }
        let scale = (screen_width / viewport.x).min(screen_height / viewport.y);
        let used = viewport * scale;
        Self {
            scale,
            offset: Vec2::new(
                (screen_width - used.x) * 0.5,
                (screen_height - used.y) * 0.5,
            ),
        }
    }

    fn to_screen(&self, position: Vec2) -> Vec2 {
        self.offset + position * self.scale
    }
}

fn draw_items(scene: &Scene, metrics: &SceneMetrics) {
    for item in &scene.items {
        let corner = metrics.to_screen(item.position);
        let size = item.size * metrics.scale;
        let color = to_macroquad_color(item.color);
        macroquad::shapes::draw_rectangle(corner.x, corner.y, size.x, size.y, color);
        macroquad::shapes::draw_rectangle_lines(
            corner.x,
            corner.y,
            size.x,
            size.y,
            1.0,
            to_macroquad_color(item.color.lighten(0.4)),
        );
    }
}

fn draw_hud(scene: &Scene) {
    let fill = scene.life.clamp(0.0, 1.0) * LIFE_BAR_WIDTH;
    macroquad::shapes::draw_rectangle(
        12.0,
        12.0,
        LIFE_BAR_WIDTH,
        LIFE_BAR_HEIGHT,
        macroquad::color::DARKGRAY,
    );
    macroquad::shapes::draw_rectangle(12.0, 12.0, fill, LIFE_BAR_HEIGHT, macroquad::color::RED);
    let _ = macroquad::text::draw_text(
        &format!("Phase {}", scene.ordinal + 1),
        12.0,
        48.0,
        HUD_FONT_SIZE,
        macroquad::color::WHITE,
    );
}

fn draw_dialogue(scene: &Scene) {
    let Some(line) = &scene.dialogue else {
        return;
    };
    let width = macroquad::window::screen_width();
    let top = macroquad::window::screen_height() - DIALOGUE_BOX_HEIGHT;
    macroquad::shapes::draw_rectangle(
        0.0,
        top,
        width,
        DIALOGUE_BOX_HEIGHT,
        macroquad::color::Color::new(0.0, 0.0, 0.0, 0.75),
    );
    let _ = macroquad::text::draw_text(
        &line.speaker,
        16.0,
        top + 30.0,
        HUD_FONT_SIZE,
        macroquad::color::YELLOW,
    );
    let _ = macroquad::text::draw_text(
        &line.text,
        16.0,
        top + 62.0,
        HUD_FONT_SIZE,
        macroquad::color::WHITE,
    );
}

fn draw_banner(scene: &Scene) {
    let Some(banner) = &scene.banner else {
        return;
    };
    let dimensions = macroquad::text::measure_text(banner, None, BANNER_FONT_SIZE as u16, 1.0);
    let x = (macroquad::window::screen_width() - dimensions.width) * 0.5;
    let y = macroquad::window::screen_height() * 0.5;
    let _ = macroquad::text::draw_text(banner, x, y, BANNER_FONT_SIZE, macroquad::color::WHITE);
}

fn to_macroquad_color(color: Color) -> macroquad::color::Color {
    macroquad::color::Color::new(color.red, color.green, color.blue, color.alpha)
}
