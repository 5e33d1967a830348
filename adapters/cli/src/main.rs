#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Command-line adapter that boots the Phasewalk experience.

mod autopilot;
mod config;
mod dialogue;
mod services;

use std::{path::PathBuf, process};

use anyhow::{Context, Result};
use clap::Parser;
use glam::Vec2;
use log::{error, info, warn};
use phasewalk_core::{AudioService, DialogueStore, Frame, InputSource, Renderer, WELCOME_BANNER};
use phasewalk_rendering::{
    Color, DialogueCursor, FrameCapture, Palette, Presentation, RenderingBackend, Scene,
};
use phasewalk_rendering_macroquad::MacroquadBackend;
use phasewalk_system_analytics::Analytics;
use phasewalk_system_generation::Generator;
use phasewalk_system_progression::{PhaseManager, RunFlow, Screen};
use phasewalk_world::ContentSource;

use crate::{
    autopilot::Autopilot,
    config::GameConfig,
    dialogue::DialogueBook,
    services::{LoggingAudio, LoggingRenderer},
};

const CLEAR_COLOR: Color = Color::from_rgb_u8(18, 18, 28);
const HEADLESS_LOG_INTERVAL: u64 = 60;

#[derive(Parser, Debug)]
#[command(
    about = "Explore procedurally generated phases and clear their events",
    version
)]
struct Args {
    /// TOML configuration file
    #[arg(long, value_name = "PATH")]
    config: Option<PathBuf>,

    /// TOML dialogue book shown when events start
    #[arg(long, value_name = "PATH")]
    dialogues: Option<PathBuf>,

    /// Seed overriding the configured one
    #[arg(long)]
    seed: Option<u64>,

    /// Run without a window, steering the player automatically
    #[arg(long)]
    headless: bool,

    /// Frames simulated by a headless run
    #[arg(long, default_value_t = 3600)]
    ticks: u64,

    /// Overrides the configured vsync setting
    #[arg(long)]
    vsync: Option<bool>,
}

/// Entry point for the Phasewalk command-line interface.
fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let args = Args::parse();
    if let Err(error) = run(args) {
        error!("{error:#}");
        process::exit(1);
    }
}

fn run(args: Args) -> Result<()> {
    let mut config = match &args.config {
        Some(path) => GameConfig::load(path)?,
        None => GameConfig::default(),
    };
    if let Some(vsync) = args.vsync {
        config.window.vsync = vsync;
    }
    let book = match &args.dialogues {
        Some(path) => DialogueBook::load(path)?,
        None => DialogueBook::default(),
    };

    let seed = args.seed.unwrap_or(config.run.seed);
    let mut generation = config.generation();
    let available = u32::try_from(book.len()).unwrap_or(u32::MAX);
    generation.dialogues = match generation.dialogues {
        0 => available,
        configured => configured.min(available),
    };
    let generator = Generator::new(generation, seed);

    info!("{WELCOME_BANNER} (seed {seed})");
    if args.headless {
        run_headless(&config, generator, &book, args.ticks)
    } else {
        run_windowed(&config, generator, book)
    }
}

fn run_headless(
    config: &GameConfig,
    generator: Generator,
    book: &DialogueBook,
    ticks: u64,
) -> Result<()> {
    let settings = config.run_settings().context("invalid run settings")?;
    let manager = PhaseManager::new(
        settings,
        generator,
        LoggingRenderer::new(HEADLESS_LOG_INTERVAL),
        LoggingAudio,
    );
    let mut flow = RunFlow::new(manager);
    let mut autopilot = Autopilot::default();
    let mut analytics = Analytics::new();

    for _ in 0..ticks {
        if let Some(id) = flow.manager().current_dialogue() {
            for line in book.sequence(id).unwrap_or_default() {
                info!("{}: {}", line.speaker, line.text);
            }
            flow.manager_mut().finish_dialogue();
        }

        match flow.manager().phase() {
            Some(phase) => autopilot.observe(phase),
            None => autopilot.idle(),
        }
        let screen = flow.step(autopilot.poll())?;
        analytics.handle(&flow.manager_mut().take_signals());
        if screen == Screen::Finished {
            break;
        }
    }

    let report = analytics.report();
    let summary = toml::to_string(report).context("failed to encode run report")?;
    println!("{summary}");
    if let Some(rate) = report.completion_rate() {
        info!("completion rate {:.0}%", rate * 100.0);
    }
    Ok(())
}

fn run_windowed(config: &GameConfig, generator: Generator, book: DialogueBook) -> Result<()> {
    let settings = config.run_settings().context("invalid run settings")?;
    let manager = PhaseManager::new(settings, generator, FrameCapture::new(), LoggingAudio);
    let mut flow = RunFlow::new(manager);
    let mut cursor = DialogueCursor::new();
    let mut analytics = Analytics::new();
    let mut last_screen = flow.screen();
    let palette = Palette::default();

    let presentation = Presentation::new(
        config.window.title.clone(),
        CLEAR_COLOR,
        Vec2::new(config.window.width, config.window.height),
        compose_scene(last_screen, None, &palette),
    )?;
    let backend = MacroquadBackend::new()
        .with_vsync(config.window.vsync)
        .with_show_fps(config.window.show_fps);

    backend.run(presentation, move |_dt, input, scene| {
        let screen = flow.step(input.controls)?;
        analytics.handle(&flow.manager_mut().take_signals());
        let advance = input.advance_dialogue;
        sync_dialogue(flow.manager_mut(), &mut cursor, &book, advance);

        if screen != last_screen && matches!(screen, Screen::GameOver | Screen::Finished) {
            info!("run so far: {:?}", analytics.report());
        }
        last_screen = screen;

        *scene = compose_scene(screen, flow.manager().renderer().latest(), &palette);
        scene.dialogue = cursor.line(&book).cloned();
        Ok(())
    })
}

/// Keeps the on-screen dialogue in step with the manager's dialogue signal.
fn sync_dialogue<S, R, A>(
    manager: &mut PhaseManager<S, R, A>,
    cursor: &mut DialogueCursor,
    book: &dyn DialogueStore,
    advance: bool,
) where
    S: ContentSource,
    R: Renderer,
    A: AudioService,
{
    let Some(id) = manager.current_dialogue() else {
        cursor.close();
        return;
    };

    if cursor.sequence() != Some(id) {
        cursor.open(id);
    } else if advance && cursor.advance(book) {
        manager.finish_dialogue();
        return;
    }

    if cursor.line(book).is_none() {
        warn!("dialogue {} has no lines to show", id.get());
        cursor.close();
        manager.finish_dialogue();
    }
}

fn compose_scene(screen: Screen, frame: Option<&Frame>, palette: &Palette) -> Scene {
    let mut scene = match frame {
        Some(frame) if screen != Screen::MainMenu => Scene::from_frame(frame, palette),
        _ => Scene::default(),
    };
    if let Some(banner) = banner(screen) {
        scene.banner = Some(banner);
    }
    scene
}

fn banner(screen: Screen) -> Option<String> {
    match screen {
        Screen::MainMenu => Some(format!("{WELCOME_BANNER} Press Enter to start.")),
        Screen::Playing => None,
        Screen::Paused => Some("Paused. Enter resumes, M returns to the menu.".to_owned()),
        Screen::GameOver => Some("Phase lost. Enter retries, M returns to the menu.".to_owned()),
        Screen::Finished => Some("Run complete. Press Enter.".to_owned()),
    }
}
