use phasewalk_core::{
    AudioService, CollaboratorError, Controls, DialogueId, Frame, GeometryError, InputVector,
    PhaseId, Rect, Renderer, Signal, Size,
};
use phasewalk_system_progression::{PhaseManager, RunFlow, RunSettings, Screen};
use phasewalk_world::{ContentSource, EventSpec, EventZones, PhaseContent, PhaseSettings};

#[derive(Default)]
struct Recorder {
    frames: Vec<Frame>,
}

impl Renderer for Recorder {
    fn draw(&mut self, frame: &Frame) -> Result<(), CollaboratorError> {
        self.frames.push(frame.clone());
        Ok(())
    }
}

#[derive(Default)]
struct Jukebox {
    log: Vec<String>,
}

impl AudioService for Jukebox {
    fn play(&mut self, name: &str, looping: bool) -> Result<(), CollaboratorError> {
        self.log.push(format!("play {name} looping={looping}"));
        Ok(())
    }

    fn stop(&mut self, name: &str) -> Result<(), CollaboratorError> {
        self.log.push(format!("stop {name}"));
        Ok(())
    }
}

struct Scripted {
    life: f32,
    dialogue: Option<DialogueId>,
}

impl ContentSource for Scripted {
    fn next_content(&mut self, _ordinal: u32) -> Result<PhaseContent, GeometryError> {
        let zones = EventZones::new(
            Rect::new(100.0, 100.0, 50.0, 50.0),
            Rect::new(90.0, 90.0, 100.0, 100.0),
            Rect::new(100.0, 100.0, 50.0, 50.0),
        )?;
        let event = EventSpec::new(zones, true, 0);
        let event = match self.dialogue {
            Some(dialogue) => event.with_dialogue(dialogue),
            None => event,
        };
        Ok(PhaseContent {
            player: Rect::new(110.0, 110.0, 20.0, 20.0),
            player_life: self.life,
            goal: Rect::new(3000.0, 1500.0, 50.0, 50.0),
            antagonist: Rect::new(2000.0, 1000.0, 100.0, 150.0),
            obstacles: Vec::new(),
            npcs: Vec::new(),
            events: vec![event],
        })
    }
}

type Manager = PhaseManager<Scripted, Recorder, Jukebox>;

fn manager(source: Scripted, phase_limit: Option<u32>) -> Manager {
    let mut settings = RunSettings::new(PhaseSettings::new(
        Size::new(4000.0, 2000.0).expect("world"),
        Size::new(800.0, 600.0).expect("viewport"),
    ));
    settings.phase_limit = phase_limit;
    settings.music = Some("theme".to_owned());
    PhaseManager::new(settings, source, Recorder::default(), Jukebox::default())
}

fn sturdy() -> Scripted {
    Scripted {
        life: 1.0,
        dialogue: None,
    }
}

fn fragile() -> Scripted {
    Scripted {
        life: 0.0005,
        dialogue: None,
    }
}

fn confirm() -> Controls {
    Controls {
        confirm: true,
        ..Controls::default()
    }
}

fn idle() -> Controls {
    Controls::default()
}

fn tick(manager: &Manager) -> u64 {
    manager.phase().map_or(0, |phase| phase.tick())
}

#[test]
fn update_without_active_phase_is_a_no_op() {
    let mut manager = manager(sturdy(), None);

    manager
        .update(InputVector::new(1, 0), InputVector::ZERO)
        .expect("no-op update");

    assert!(manager.phase().is_none());
    assert!(manager.renderer().frames.is_empty());
    assert!(manager.take_signals().is_empty());
}

#[test]
fn starting_and_quitting_controls_music_and_rendering() {
    let mut manager = manager(sturdy(), None);

    manager.start_phase().expect("start");
    assert_eq!(manager.renderer().frames.len(), 1);
    assert_eq!(
        manager.take_signals(),
        vec![Signal::PhaseStarted {
            phase: PhaseId::new(0),
            ordinal: 0,
        }]
    );

    manager
        .update(InputVector::ZERO, InputVector::ZERO)
        .expect("update");
    assert_eq!(manager.renderer().frames.len(), 2);

    manager.quit_phase().expect("quit");
    assert!(manager.phase().is_none());
    assert_eq!(
        manager.audio().log,
        vec![
            "play theme looping=true".to_owned(),
            "stop theme".to_owned(),
        ]
    );
}

#[test]
fn completed_phases_advance_the_counter() {
    let mut manager = manager(sturdy(), Some(1));
    manager.start_phase().expect("start");

    for _ in 0..2 {
        manager
            .update(InputVector::ZERO, InputVector::ZERO)
            .expect("update");
    }
    assert_eq!(manager.phase_counter(), 0);
    assert!(!manager.run_complete());

    manager
        .update(InputVector::ZERO, InputVector::ZERO)
        .expect("update");

    assert_eq!(manager.phase_counter(), 1);
    assert!(manager.run_complete());
    let phase = manager.phase().expect("successor");
    assert_eq!(phase.id(), PhaseId::new(1));
    assert_eq!(phase.ordinal(), 1);

    manager.reset_counter();
    assert_eq!(manager.phase_counter(), 0);
}

#[test]
fn started_events_raise_their_dialogue() {
    let source = Scripted {
        life: 1.0,
        dialogue: Some(DialogueId::new(4)),
    };
    let mut manager = manager(source, None);
    manager.start_phase().expect("start");
    assert_eq!(manager.current_dialogue(), None);

    manager
        .update(InputVector::ZERO, InputVector::ZERO)
        .expect("update");
    assert_eq!(manager.current_dialogue(), Some(DialogueId::new(4)));

    manager.finish_dialogue();
    assert_eq!(manager.current_dialogue(), None);
}

#[test]
fn lost_phase_keeps_rendering_the_frozen_world() {
    let mut manager = manager(fragile(), None);
    manager.start_phase().expect("start");

    manager
        .update(InputVector::ZERO, InputVector::ZERO)
        .expect("update");
    assert!(manager.is_lost());

    manager
        .update(InputVector::new(1, 1), InputVector::ZERO)
        .expect("update");
    let frames = &manager.renderer().frames;
    assert_eq!(frames.len(), 3);
    assert_eq!(frames[1], frames[2]);
}

#[test]
fn flow_runs_from_menu_to_finish_and_back() {
    let source = Scripted {
        life: 1.0,
        dialogue: Some(DialogueId::new(0)),
    };
    let mut flow = RunFlow::new(manager(source, Some(1)));
    assert_eq!(flow.screen(), Screen::MainMenu);
    assert_eq!(flow.step(idle()).expect("idle menu"), Screen::MainMenu);

    assert_eq!(flow.step(confirm()).expect("start"), Screen::Playing);
    assert_eq!(flow.step(idle()).expect("tick"), Screen::Playing);
    assert_eq!(tick(flow.manager()), 1);

    assert_eq!(flow.step(idle()).expect("dialogue"), Screen::Playing);
    assert_eq!(tick(flow.manager()), 1);

    flow.manager_mut().finish_dialogue();
    assert_eq!(flow.step(idle()).expect("tick"), Screen::Playing);
    assert_eq!(tick(flow.manager()), 2);

    assert_eq!(flow.step(idle()).expect("complete"), Screen::Finished);

    assert_eq!(flow.step(confirm()).expect("menu"), Screen::MainMenu);
    assert_eq!(flow.manager().phase_counter(), 0);
    assert!(flow.manager().phase().is_none());
}

#[test]
fn pause_suspends_simulation_until_resumed() {
    let mut flow = RunFlow::new(manager(sturdy(), None));
    let _ = flow.step(confirm()).expect("start");

    let pause = Controls {
        pause: true,
        ..Controls::default()
    };
    assert_eq!(flow.step(pause).expect("pause"), Screen::Paused);
    assert_eq!(flow.step(idle()).expect("paused"), Screen::Paused);
    assert_eq!(tick(flow.manager()), 0);

    assert_eq!(flow.step(confirm()).expect("resume"), Screen::Playing);
    assert_eq!(flow.step(pause).expect("pause again"), Screen::Paused);
    let menu = Controls {
        menu: true,
        ..Controls::default()
    };
    assert_eq!(flow.step(menu).expect("quit"), Screen::MainMenu);
    assert!(flow.manager().phase().is_none());
}

#[test]
fn losing_offers_a_retry_of_the_same_ordinal() {
    let mut flow = RunFlow::new(manager(fragile(), None));
    let _ = flow.step(confirm()).expect("start");

    assert_eq!(flow.step(idle()).expect("lose"), Screen::GameOver);
    assert_eq!(flow.step(idle()).expect("idle"), Screen::GameOver);

    assert_eq!(flow.step(confirm()).expect("retry"), Screen::Playing);
    let phase = flow.manager().phase().expect("retried phase");
    assert_eq!(phase.id(), PhaseId::new(1));
    assert_eq!(phase.ordinal(), 0);
    assert!(!phase.is_lost());
}

#[test]
fn retrying_keeps_a_single_music_loop() {
    let mut flow = RunFlow::new(manager(fragile(), None));
    let _ = flow.step(confirm()).expect("start");
    assert_eq!(flow.step(idle()).expect("lose"), Screen::GameOver);
    assert_eq!(flow.step(confirm()).expect("retry"), Screen::Playing);

    assert_eq!(
        flow.manager().audio().log,
        vec!["play theme looping=true".to_owned()]
    );

    let pause = Controls {
        pause: true,
        ..Controls::default()
    };
    let menu = Controls {
        menu: true,
        ..Controls::default()
    };
    let _ = flow.step(pause).expect("pause");
    assert_eq!(flow.step(menu).expect("quit"), Screen::MainMenu);
    assert_eq!(
        flow.manager().audio().log,
        vec![
            "play theme looping=true".to_owned(),
            "stop theme".to_owned(),
        ]
    );
}

/// Yields one phase without mandatory events, then runs dry.
struct SinglePhase;

impl ContentSource for SinglePhase {
    fn next_content(&mut self, ordinal: u32) -> Result<PhaseContent, GeometryError> {
        if ordinal > 0 {
            return Err(GeometryError::InvalidBounds {
                width: 0.0,
                height: 0.0,
            });
        }
        Ok(PhaseContent {
            player: Rect::new(110.0, 110.0, 20.0, 20.0),
            player_life: 1.0,
            goal: Rect::new(3000.0, 1500.0, 50.0, 50.0),
            antagonist: Rect::new(2000.0, 1000.0, 100.0, 150.0),
            obstacles: Vec::new(),
            npcs: Vec::new(),
            events: Vec::new(),
        })
    }
}

#[test]
fn failed_successor_returns_the_flow_to_the_menu() {
    let settings = RunSettings::new(PhaseSettings::new(
        Size::new(4000.0, 2000.0).expect("world"),
        Size::new(800.0, 600.0).expect("viewport"),
    ));
    let manager = PhaseManager::new(
        settings,
        SinglePhase,
        Recorder::default(),
        Jukebox::default(),
    );
    let mut flow = RunFlow::new(manager);
    assert_eq!(flow.step(confirm()).expect("start"), Screen::Playing);

    let _ = flow.step(idle()).expect_err("successor cannot be built");

    assert_eq!(flow.screen(), Screen::MainMenu);
    assert!(flow.manager().phase().is_none());
    assert_eq!(flow.step(confirm()).expect("start again"), Screen::Playing);
    assert_eq!(flow.manager().phase().map(|phase| phase.ordinal()), Some(0));
}
