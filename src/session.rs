//! A single play session
//!
//! Owns the simulation state and its collaborators. Simulation events are
//! turned into audio cues, overlay requests and snapshot writes here, so the
//! simulation itself never touches storage, sound or the UI.

use crate::audio::{AudioManager, Cue};
use crate::error::InitError;
use crate::persistence::{KeyValueStore, ProgressSnapshot};
use crate::present::{Hud, Overlay};
use crate::settings::Settings;
use crate::sim::{Character, GameEvent, GameState, Level, TickInput, tick};
use crate::tuning::Tuning;

pub struct Session {
    state: GameState,
    store: Box<dyn KeyValueStore>,
    audio: AudioManager,
    settings: Settings,
    /// Overlays waiting to be shown by the presenter
    overlays: Vec<Overlay>,
    /// Level to load once the transition cutscene has finished
    next_level: Option<Level>,
}

impl std::fmt::Debug for Session {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Session")
            .field("level", &self.state.level)
            .field("character", &self.state.character)
            .field("phase", &self.state.progress.phase)
            .field("audio", &self.audio)
            .finish_non_exhaustive()
    }
}

impl Session {
    /// Start a session from whatever progress the store holds
    pub fn new(
        seed: u64,
        tuning: Tuning,
        store: Box<dyn KeyValueStore>,
        mut audio: AudioManager,
    ) -> Result<Self, InitError> {
        tuning.validate()?;

        let settings = Settings::load(&*store);
        let snapshot = ProgressSnapshot::load(&*store, &tuning);
        // Out of lives means starting over from the first level
        let level = if snapshot.lives > 0 {
            snapshot.level
        } else {
            Level::Streets
        };

        let mut state = GameState::new(
            seed,
            tuning,
            level,
            snapshot.character,
            snapshot.lives,
            snapshot.energy,
        );
        settings.configure_effects(&mut state.effects);
        audio.set_volume(settings.sfx_gain());

        log::info!(
            "Session started: level {} as {} (seed {seed})",
            level.number(),
            snapshot.character.display_name()
        );

        Ok(Self {
            state,
            store,
            audio,
            settings,
            overlays: Vec::new(),
            next_level: None,
        })
    }

    pub fn state(&self) -> &GameState {
        &self.state
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    pub fn store(&self) -> &dyn KeyValueStore {
        &*self.store
    }

    /// Give back the store, ending the session
    pub fn into_store(self) -> Box<dyn KeyValueStore> {
        self.store
    }

    pub fn audio_mut(&mut self) -> &mut AudioManager {
        &mut self.audio
    }

    pub fn is_running(&self) -> bool {
        self.state.progress.is_running()
    }

    pub fn is_paused(&self) -> bool {
        self.state.progress.phase == crate::sim::GamePhase::Paused
    }

    pub fn is_terminal(&self) -> bool {
        self.state.progress.is_terminal()
    }

    /// Terminal, with every effect and cutscene played out
    pub fn is_finished(&self) -> bool {
        self.is_terminal() && self.state.is_settled()
    }

    /// Level to load after the transition, once known
    pub fn next_level(&self) -> Option<Level> {
        self.next_level
    }

    /// Choose a character. Persisted at once and announced with an intro.
    pub fn select_character(&mut self, character: Character) {
        self.state.character = character;
        log::info!("Character selected: {}", character.display_name());
        self.save_snapshot();
        self.overlays.push(Overlay::CharacterVideo(character));
    }

    /// Apply new settings and persist them
    pub fn apply_settings(&mut self, settings: Settings) {
        settings.configure_effects(&mut self.state.effects);
        self.audio.set_volume(settings.sfx_gain());
        if let Err(e) = settings.save(&mut *self.store) {
            log::warn!("Settings not saved: {e}");
        }
        self.settings = settings;
    }

    /// Toggle pause from outside the input stream (e.g. focus loss)
    pub fn pause(&mut self) {
        if self.is_running() {
            self.update(&TickInput {
                pause: true,
                ..TickInput::default()
            });
        }
    }

    /// Advance one frame of play
    pub fn update(&mut self, input: &TickInput) {
        tick(&mut self.state, input);
        self.dispatch_events();
    }

    /// Advance effects and cutscenes only (terminal or paused frames)
    pub fn settle(&mut self) {
        self.state.settle();
        self.dispatch_events();
    }

    pub fn hud(&self, fps: u32) -> Hud {
        Hud::from_state(&self.state, fps)
    }

    /// Overlays requested since the last call
    pub fn take_overlays(&mut self) -> Vec<Overlay> {
        std::mem::take(&mut self.overlays)
    }

    fn dispatch_events(&mut self) {
        for event in self.state.drain_events() {
            if let Some(cue) = Cue::for_event(&event) {
                self.audio.play(cue);
            }
            match event {
                GameEvent::GameOver { reason } => {
                    self.save_snapshot();
                    self.overlays.push(Overlay::GameOver {
                        reason,
                        distance: self.state.progress.distance as u32,
                    });
                }
                GameEvent::LevelComplete { level } => {
                    self.save_snapshot();
                    self.overlays.push(Overlay::LevelBanner(level));
                    if self.state.cutscene.is_none() {
                        self.next_level = level.next();
                    }
                }
                GameEvent::TransitionFinished => {
                    self.next_level = self.state.level.next();
                    if let Some(next) = self.next_level {
                        self.overlays.push(Overlay::Loading(next));
                    }
                }
                GameEvent::EnemyDestroyed { kind } => log::debug!("{kind:?} destroyed"),
                GameEvent::PickupCollected { kind } => log::debug!("{kind:?} collected"),
                GameEvent::Damaged { lives } => log::debug!("Hit, {lives} lives left"),
                _ => {}
            }
        }
    }

    fn save_snapshot(&mut self) {
        let snapshot = ProgressSnapshot::capture(&self.state);
        match snapshot.save(&mut *self.store) {
            Ok(()) => log::info!(
                "Progress saved: level {} lives {}",
                snapshot.level.number(),
                snapshot.lives
            ),
            Err(e) => log::warn!("Progress not saved: {e}"),
        }
    }
}
