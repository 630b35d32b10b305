//! Whole-session behaviour through the frame driver

use city_runner::audio::AudioManager;
use city_runner::error::PresentError;
use city_runner::persistence::snapshot::{KEY_CHARACTER, KEY_ENERGY, KEY_LEVEL, KEY_LIVES};
use city_runner::persistence::{KeyValueStore, MemoryStore};
use city_runner::platform::{Action, Source};
use city_runner::present::{Hud, Overlay, Presenter};
use city_runner::sim::{Character, GameOverReason, GameState, Level};
use city_runner::{Driver, FrameOutcome, InitError, Session, Tuning};

/// Records everything it is asked to present
#[derive(Default)]
struct Recorder {
    missing: Vec<&'static str>,
    video_available: bool,
    overlays: Vec<Overlay>,
    huds: Vec<Hud>,
    renders: u64,
}

impl Presenter for Recorder {
    fn has_target(&self, id: &str) -> bool {
        !self.missing.contains(&id)
    }

    fn publish_hud(&mut self, hud: &Hud) {
        self.huds.push(hud.clone());
    }

    fn show_overlay(&mut self, overlay: &Overlay) -> Result<(), PresentError> {
        if matches!(overlay, Overlay::CharacterVideo(_)) && !self.video_available {
            return Err(PresentError::AssetUnavailable("intro.mp4".into()));
        }
        self.overlays.push(overlay.clone());
        Ok(())
    }

    fn render(&mut self, _state: &GameState) {
        self.renders += 1;
    }
}

fn start(tuning: Tuning, store: MemoryStore) -> Driver<Recorder> {
    let session = Session::new(99, tuning, Box::new(store), AudioManager::disabled()).unwrap();
    Driver::new(session, Recorder::default()).unwrap()
}

/// Run until the driver halts, returning the number of admitted frames
fn run_to_halt(driver: &mut Driver<Recorder>, limit: u32) -> u32 {
    for frame in 0..limit {
        if driver.run_frame(frame as f64 * 16.7) == FrameOutcome::Halted {
            return frame + 1;
        }
    }
    panic!("driver did not halt within {limit} frames");
}

fn count(overlays: &[Overlay], pred: impl Fn(&Overlay) -> bool) -> usize {
    overlays.iter().filter(|o| pred(o)).count()
}

#[test]
fn test_missing_targets_is_fatal() {
    let session = Session::new(
        1,
        Tuning::default(),
        Box::new(MemoryStore::new()),
        AudioManager::disabled(),
    )
    .unwrap();
    let presenter = Recorder {
        missing: vec!["hearts", "gameCanvas"],
        ..Recorder::default()
    };
    let Err(err) = Driver::new(session, presenter) else {
        panic!("driver started without required targets");
    };
    assert_eq!(
        err,
        InitError::MissingTargets(vec!["hearts".into(), "gameCanvas".into()])
    );
}

#[test]
fn test_win_threshold_completes_once_and_persists() {
    let mut tuning = Tuning::default();
    tuning.runner.win_distance = 2.0;
    let mut driver = start(tuning, MemoryStore::new());

    run_to_halt(&mut driver, 2000);

    let session = driver.session();
    assert!(session.is_finished());
    assert_eq!(session.next_level(), Some(Level::Highway));
    assert_eq!(
        session.store().get(KEY_LEVEL).as_deref(),
        Some(Level::Highway.as_str())
    );

    let overlays = &driver.presenter().overlays;
    assert_eq!(count(overlays, |o| matches!(o, Overlay::LevelBanner(_))), 1);
    assert_eq!(overlays.last(), Some(&Overlay::Loading(Level::Highway)));
    assert_eq!(count(overlays, |o| matches!(o, Overlay::GameOver { .. })), 0);

    // Distance froze at the frame the threshold was crossed
    let last = driver.presenter().huds.last().unwrap();
    assert!(last.distance >= 2 && last.distance < 4);
}

#[test]
fn test_fatal_damage_raises_game_over_once() {
    let mut tuning = Tuning::default();
    tuning.starting_lives = 1;
    tuning.spawn.enemy_frames = 1;
    tuning.spawn.min_interval_frames = 1;
    let mut driver = start(tuning, MemoryStore::new());

    run_to_halt(&mut driver, 5000);

    let overlays = &driver.presenter().overlays;
    assert_eq!(count(overlays, |o| matches!(o, Overlay::GameOver { .. })), 1);
    assert!(matches!(
        overlays.last(),
        Some(Overlay::GameOver {
            reason: GameOverReason::OutOfLives,
            ..
        })
    ));
    assert_eq!(driver.session().state().progress.lives, 0);
    assert_eq!(driver.session().store().get(KEY_LIVES).as_deref(), Some("0"));
}

#[test]
fn test_terminal_state_ignores_input() {
    let mut tuning = Tuning::default();
    tuning.runner.win_distance = 1.0;
    let mut driver = start(tuning, MemoryStore::new());

    let mut frame = 0;
    while !driver.session().is_terminal() {
        driver.run_frame(frame as f64 * 16.7);
        frame += 1;
        assert!(frame < 100);
    }
    let frozen = driver.session().state().progress.clone();

    for action in [Action::Jump, Action::Shoot, Action::ActivateSpecial, Action::Pause] {
        driver.input_mut().press(action, Source::Keyboard);
        driver.run_frame(frame as f64 * 16.7);
        frame += 1;
    }
    assert_eq!(driver.session().state().progress, frozen);
}

#[test]
fn test_highway_runs_out_of_fuel() {
    let mut tuning = Tuning::default();
    tuning.highway.fuel_drain = 10.0;
    let mut store = MemoryStore::new();
    store.set(KEY_LEVEL, "highway").unwrap();
    let mut driver = start(tuning, store);

    run_to_halt(&mut driver, 2000);

    let overlays = &driver.presenter().overlays;
    assert_eq!(
        count(overlays, |o| matches!(
            o,
            Overlay::GameOver {
                reason: GameOverReason::OutOfFuel,
                ..
            }
        )),
        1
    );
    assert_eq!(driver.presenter().huds.last().and_then(|h| h.fuel), Some(0));
}

#[test]
fn test_character_video_falls_back_to_message() {
    let mut driver = start(Tuning::default(), MemoryStore::new());
    driver.session_mut().select_character(Character::Julian);
    driver.run_frame(0.0);

    assert_eq!(
        driver.presenter().overlays,
        vec![Overlay::CharacterMessage("You chose Julian!".into())]
    );
    assert_eq!(
        driver.session().store().get(KEY_CHARACTER).as_deref(),
        Some("julian")
    );
}

#[test]
fn test_next_session_resumes_from_snapshot() {
    let mut tuning = Tuning::default();
    tuning.runner.win_distance = 2.0;
    let mut driver = start(tuning.clone(), MemoryStore::new());
    driver.session_mut().select_character(Character::Kim);
    run_to_halt(&mut driver, 2000);

    let (session, _) = driver.into_parts();
    let next = Session::new(100, tuning, session.into_store(), AudioManager::disabled()).unwrap();
    assert_eq!(next.state().level, Level::Highway);
    assert_eq!(next.state().character, Character::Kim);
    assert!(next.state().progress.fuel.is_some());
}

#[test]
fn test_selecting_character_on_highway_keeps_carried_energy() {
    let tuning = Tuning::default();
    let mut store = MemoryStore::new();
    store.set(KEY_LEVEL, "highway").unwrap();
    store.set(KEY_ENERGY, "80").unwrap();

    let mut first =
        Session::new(1, tuning.clone(), Box::new(store), AudioManager::disabled()).unwrap();
    let capacity = first.state().progress.fuel.unwrap().capacity;
    assert_eq!(capacity, 140.0);

    // A reload re-applies the character picked on the selection page
    first.select_character(Character::Kim);
    assert_eq!(first.store().get(KEY_ENERGY).as_deref(), Some("80"));

    let reloaded = Session::new(2, tuning, first.into_store(), AudioManager::disabled()).unwrap();
    assert_eq!(reloaded.state().level, Level::Highway);
    assert_eq!(reloaded.state().character, Character::Kim);
    assert_eq!(reloaded.state().progress.fuel.unwrap().capacity, capacity);
}
