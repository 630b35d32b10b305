//! City Runner entry point
//!
//! Handles platform-specific initialization and runs the game loop.

#[cfg(target_arch = "wasm32")]
use wasm_bindgen::prelude::*;

#[cfg(target_arch = "wasm32")]
mod wasm_game {
    use wasm_bindgen::JsCast;
    use wasm_bindgen::prelude::*;

    use city_runner::audio::{AudioBackend, AudioManager, WebAudio};
    use city_runner::persistence::LocalStore;
    use city_runner::platform::web::{self, SharedDriver, WebPresenter};
    use city_runner::sim::Character;
    use city_runner::{Driver, FrameOutcome, QualityPreset, Session, Tuning};

    fn query_param<'a>(search: &'a str, name: &str) -> Option<&'a str> {
        search
            .trim_start_matches('?')
            .split('&')
            .filter_map(|pair| pair.split_once('='))
            .find(|(key, _)| *key == name)
            .map(|(_, value)| value)
    }

    pub fn run() -> Result<(), JsValue> {
        console_error_panic_hook::set_once();
        console_log::init_with_level(log::Level::Info).expect("Failed to init logger");

        log::info!("City Runner starting...");

        let window = web_sys::window().expect("no window");
        let document = window.document().expect("no document");

        let seed = js_sys::Date::now() as u64;
        let audio = AudioManager::from_result(
            WebAudio::new().map(|backend| Box::new(backend) as Box<dyn AudioBackend>),
        );
        let mut session = Session::new(seed, Tuning::default(), Box::new(LocalStore::open()), audio)
            .map_err(|e| JsValue::from_str(&e.to_string()))?;

        // A character chosen on the selection page arrives as ?character=<id>
        let search = window.location().search().unwrap_or_default();
        let chosen = query_param(&search, "character").and_then(Character::from_str);
        if let Some(character) = chosen {
            session.select_character(character);
        }

        let presenter = WebPresenter::new(document.clone());
        let mut driver = Driver::new(session, presenter).map_err(|e| {
            if let Some(el) = document.get_element_by_id("loading") {
                el.set_text_content(Some(&e.to_string()));
            }
            JsValue::from_str(&e.to_string())
        })?;

        let preset = query_param(&search, "quality").and_then(QualityPreset::from_str);
        if let Some(preset) = preset {
            if driver.session().settings().quality != preset {
                let mut settings = driver.session().settings().clone();
                settings.apply_preset(preset);
                driver.apply_settings(settings);
            }
        }

        if let Some(loading) = document.get_element_by_id("loading") {
            let _ = loading.set_attribute("class", "hidden");
        }

        let driver: SharedDriver = std::rc::Rc::new(std::cell::RefCell::new(driver));
        web::install_listeners(&document, driver.clone())?;

        log::info!("Game initialized with seed: {seed}");
        request_animation_frame(driver);
        Ok(())
    }

    fn request_animation_frame(driver: SharedDriver) {
        let Some(window) = web_sys::window() else {
            return;
        };
        let closure = Closure::once(move |time: f64| {
            game_loop(driver, time);
        });
        let _ = window.request_animation_frame(closure.as_ref().unchecked_ref());
        closure.forget();
    }

    fn game_loop(driver: SharedDriver, time: f64) {
        let (outcome, next_level) = {
            let mut d = driver.borrow_mut();
            let outcome = d.run_frame(time);
            (outcome, d.session().next_level())
        };

        match outcome {
            FrameOutcome::Skipped | FrameOutcome::Rendered => request_animation_frame(driver),
            FrameOutcome::Halted => {
                // Progress is already saved; a reload resumes at the next level
                if next_level.is_some() {
                    if let Some(window) = web_sys::window() {
                        let _ = window.location().reload();
                    }
                }
            }
        }
    }
}

#[cfg(target_arch = "wasm32")]
#[wasm_bindgen(start)]
pub fn wasm_main() -> Result<(), JsValue> {
    wasm_game::run()
}

#[cfg(not(target_arch = "wasm32"))]
mod native {
    use city_runner::audio::AudioManager;
    use city_runner::persistence::{KeyValueStore, MemoryStore};
    use city_runner::platform::{Action, Source};
    use city_runner::present::LogPresenter;
    use city_runner::sim::{Character, GameState, Level};
    use city_runner::{Driver, FrameOutcome, InitError, QualityPreset, Session, Settings, Tuning};

    /// Safety cap for the headless run
    const MAX_FRAMES: u64 = 60 * 60 * 10;

    /// Actions a simple autopilot holds this frame
    fn autopilot(state: &GameState) -> Vec<Action> {
        let player = &state.player.body;
        match state.level {
            Level::Streets => {
                let threat = state.enemies.iter().any(|e| {
                    let gap = e.body.left() - player.right();
                    (0.0..120.0).contains(&gap)
                });
                let mut actions = vec![Action::Shoot];
                if threat {
                    actions.push(Action::Jump);
                }
                if state.player.can_use_special {
                    actions.push(Action::ActivateSpecial);
                }
                actions
            }
            Level::Highway => {
                let ahead = state.enemies.iter().find(|e| {
                    e.body.bottom() < player.top()
                        && e.body.right() > player.left()
                        && e.body.left() < player.right()
                });
                let mut actions = vec![Action::Shoot];
                if let Some(enemy) = ahead {
                    let mid = state.tuning.view_width / 2.0;
                    actions.push(if enemy.body.center().x > mid {
                        Action::SteerLeft
                    } else {
                        Action::SteerRight
                    });
                }
                actions
            }
        }
    }

    fn play_level(
        seed: u64,
        tuning: &Tuning,
        store: Box<dyn KeyValueStore>,
        character: Option<Character>,
        quality: Option<QualityPreset>,
    ) -> Result<(Session, Option<Level>), InitError> {
        let mut session = Session::new(seed, tuning.clone(), store, AudioManager::disabled())?;
        if let Some(character) = character {
            session.select_character(character);
        }
        let mut driver = Driver::new(session, LogPresenter::new())?;
        if let Some(preset) = quality {
            driver.apply_settings(Settings::from_preset(preset));
        }

        let mut held: Vec<Action> = Vec::new();
        let mut frame: u64 = 0;
        loop {
            let wanted = autopilot(driver.session().state());
            let input = driver.input_mut();
            for action in held.iter().filter(|a| !wanted.contains(a)) {
                input.release(*action, Source::Keyboard);
            }
            for action in wanted.iter().filter(|a| !held.contains(a)) {
                input.press(*action, Source::Keyboard);
            }
            held = wanted;

            let now_ms = frame as f64 * 1000.0 / 60.0;
            if driver.run_frame(now_ms) == FrameOutcome::Halted {
                break;
            }
            frame += 1;
            if frame >= MAX_FRAMES {
                log::warn!("Stopping demo after {MAX_FRAMES} frames");
                break;
            }
        }

        let (session, presenter) = driver.into_parts();
        if let Some(hud) = &presenter.last_hud {
            log::info!(
                "Level {} ended: distance {} lives {} ({} frames rendered)",
                hud.level.number(),
                hud.distance,
                hud.lives,
                presenter.frames_rendered
            );
        }
        let next = session.next_level();
        Ok((session, next))
    }

    pub fn run() -> Result<(), InitError> {
        let mut args = std::env::args().skip(1);
        let seed = args
            .next()
            .and_then(|s| s.parse::<u64>().ok())
            .unwrap_or(42);
        let tuning = match args.next() {
            Some(path) if path != "-" => {
                let json = std::fs::read_to_string(&path)
                    .map_err(|e| city_runner::ConfigError::Parse(format!("{path}: {e}")))?;
                Tuning::from_json(&json)?
            }
            _ => Tuning::default(),
        };
        let quality = args.next().and_then(|s| QualityPreset::from_str(&s));

        log::info!("City Runner (native demo) starting with seed {seed}");

        let (session, next) = play_level(
            seed,
            &tuning,
            Box::new(MemoryStore::new()),
            Some(Character::Juan),
            quality,
        )?;
        if next.is_some() {
            // Same store: the new session resumes from the saved snapshot and settings
            play_level(seed.wrapping_add(1), &tuning, session.into_store(), None, None)?;
        }
        Ok(())
    }
}

#[cfg(not(target_arch = "wasm32"))]
fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    if let Err(e) = native::run() {
        log::error!("{e}");
        std::process::exit(1);
    }
}

#[cfg(target_arch = "wasm32")]
fn main() {
    // WASM entry point is wasm_main, this is just to satisfy the compiler
}
