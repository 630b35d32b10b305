//! Presentation contract
//!
//! The simulation never draws. A `Presenter` receives the HUD values every
//! admitted frame, one-shot overlays on state transitions, and read-only
//! access to the state for rendering.

use crate::error::{InitError, PresentError};
use crate::sim::{Character, GameOverReason, GamePhase, GameState, Level};

/// Drawing surface id
pub const CANVAS_TARGET: &str = "gameCanvas";

/// Element ids that must exist before a session may start
pub const REQUIRED_TARGETS: &[&str] = &["score", "energy", "hearts", CANVAS_TARGET];

/// Per-frame HUD values
#[derive(Debug, Clone, PartialEq)]
pub struct Hud {
    pub level: Level,
    /// Whole distance units, the score
    pub distance: u32,
    /// Energy percentage (0 - 100)
    pub energy: u8,
    /// Fuel percentage (0 - 100), highway only
    pub fuel: Option<u8>,
    pub lives: u8,
    pub max_lives: u8,
    /// Highway only
    pub cars_avoided: Option<u32>,
    pub special_ready: bool,
    pub paused: bool,
    pub fps: u32,
}

impl Hud {
    pub fn from_state(state: &GameState, fps: u32) -> Self {
        let percent = |ratio: f32| (ratio.clamp(0.0, 1.0) * 100.0).round() as u8;
        let player = &state.player;
        let progress = &state.progress;
        let energy = if player.max_energy > 0.0 {
            player.energy / player.max_energy
        } else {
            0.0
        };
        Self {
            level: state.level,
            distance: progress.distance.max(0.0) as u32,
            energy: percent(energy),
            fuel: progress.fuel.map(|tank| percent(tank.ratio())),
            lives: progress.lives,
            max_lives: progress.max_lives,
            cars_avoided: (state.level == Level::Highway).then_some(progress.cars_avoided),
            special_ready: player.can_use_special,
            paused: progress.phase == GamePhase::Paused,
            fps,
        }
    }

    /// Hearts row, filled then empty
    pub fn hearts(&self) -> String {
        let filled = self.lives.min(self.max_lives) as usize;
        let empty = self.max_lives as usize - filled;
        format!("{}{}", "♥".repeat(filled), "♡".repeat(empty))
    }
}

/// One-shot UI requests
#[derive(Debug, Clone, PartialEq)]
pub enum Overlay {
    /// Level cleared banner
    LevelBanner(Level),
    GameOver { reason: GameOverReason, distance: u32 },
    /// Character intro video
    CharacterVideo(Character),
    /// Text substitute for the intro video
    CharacterMessage(String),
    /// Next level is loading
    Loading(Level),
}

impl Overlay {
    /// Substitute to show when this overlay cannot be presented
    pub fn fallback(&self) -> Option<Overlay> {
        match self {
            Overlay::CharacterVideo(character) => Some(Overlay::CharacterMessage(format!(
                "You chose {}!",
                character.display_name()
            ))),
            _ => None,
        }
    }

    pub fn title(&self) -> String {
        match self {
            Overlay::LevelBanner(level) => format!("Level {} complete!", level.number()),
            Overlay::GameOver { reason, distance } => {
                format!("{} Distance: {distance}", reason.message())
            }
            Overlay::CharacterVideo(character) => character.display_name().to_string(),
            Overlay::CharacterMessage(message) => message.clone(),
            Overlay::Loading(level) => format!("Loading level {}...", level.number()),
        }
    }
}

/// Render and UI sink
pub trait Presenter {
    /// Whether a UI element with this id exists. The canvas only counts
    /// once it can be drawn to.
    fn has_target(&self, id: &str) -> bool;

    fn publish_hud(&mut self, hud: &Hud);

    fn show_overlay(&mut self, overlay: &Overlay) -> Result<(), PresentError>;

    fn render(&mut self, state: &GameState);
}

/// Fail if any required target is absent
pub fn check_targets<P: Presenter + ?Sized>(presenter: &P) -> Result<(), InitError> {
    let missing: Vec<String> = REQUIRED_TARGETS
        .iter()
        .filter(|id| !presenter.has_target(id))
        .map(|id| id.to_string())
        .collect();
    if missing.is_empty() {
        Ok(())
    } else {
        Err(InitError::MissingTargets(missing))
    }
}

/// Show an overlay, substituting its fallback on failure. Never fails.
pub fn show_with_fallback<P: Presenter + ?Sized>(presenter: &mut P, overlay: &Overlay) {
    let Err(e) = presenter.show_overlay(overlay) else {
        return;
    };
    match overlay.fallback() {
        Some(fallback) => {
            log::warn!("{e}, showing text instead");
            if let Err(e) = presenter.show_overlay(&fallback) {
                log::warn!("Fallback overlay failed: {e}");
            }
        }
        None => log::warn!("Overlay not shown: {e}"),
    }
}

/// Headless presenter for native runs. Every target exists, videos do not.
#[derive(Debug, Default)]
pub struct LogPresenter {
    pub last_hud: Option<Hud>,
    pub frames_rendered: u64,
}

impl LogPresenter {
    pub fn new() -> Self {
        Self::default()
    }
}

impl Presenter for LogPresenter {
    fn has_target(&self, _id: &str) -> bool {
        true
    }

    fn publish_hud(&mut self, hud: &Hud) {
        let crossed_hundred = self
            .last_hud
            .as_ref()
            .is_none_or(|last| last.distance / 100 != hud.distance / 100);
        if crossed_hundred || self.last_hud.as_ref().is_some_and(|l| l.lives != hud.lives) {
            log::debug!(
                "distance {} energy {}% lives {}{}",
                hud.distance,
                hud.energy,
                hud.hearts(),
                hud.fuel.map(|f| format!(" fuel {f}%")).unwrap_or_default()
            );
        }
        self.last_hud = Some(hud.clone());
    }

    fn show_overlay(&mut self, overlay: &Overlay) -> Result<(), PresentError> {
        if let Overlay::CharacterVideo(character) = overlay {
            return Err(PresentError::AssetUnavailable(format!(
                "{}.mp4",
                character.as_str()
            )));
        }
        log::info!("[overlay] {}", overlay.title());
        Ok(())
    }

    fn render(&mut self, _state: &GameState) {
        self.frames_rendered += 1;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tuning::Tuning;

    struct Partial;

    impl Presenter for Partial {
        fn has_target(&self, id: &str) -> bool {
            id == "score" || id == "gameCanvas"
        }
        fn publish_hud(&mut self, _hud: &Hud) {}
        fn show_overlay(&mut self, _overlay: &Overlay) -> Result<(), PresentError> {
            Ok(())
        }
        fn render(&mut self, _state: &GameState) {}
    }

    #[test]
    fn test_missing_targets_are_listed() {
        let err = check_targets(&Partial).unwrap_err();
        assert_eq!(
            err,
            InitError::MissingTargets(vec!["energy".into(), "hearts".into()])
        );
        assert!(check_targets(&LogPresenter::new()).is_ok());
    }

    /// Every element exists; the canvas may lack a drawing context
    struct Canvas {
        drawable: bool,
    }

    impl Presenter for Canvas {
        fn has_target(&self, id: &str) -> bool {
            id != CANVAS_TARGET || self.drawable
        }
        fn publish_hud(&mut self, _hud: &Hud) {}
        fn show_overlay(&mut self, _overlay: &Overlay) -> Result<(), PresentError> {
            Ok(())
        }
        fn render(&mut self, _state: &GameState) {}
    }

    #[test]
    fn test_undrawable_canvas_blocks_start() {
        let err = check_targets(&Canvas { drawable: false }).unwrap_err();
        assert_eq!(err, InitError::MissingTargets(vec![CANVAS_TARGET.into()]));
        assert!(check_targets(&Canvas { drawable: true }).is_ok());
    }

    #[test]
    fn test_hud_from_highway_state() {
        let state = GameState::new(3, Tuning::default(), Level::Highway, Character::Kim, 2, 50.0);
        let hud = Hud::from_state(&state, 60);
        assert_eq!(hud.level, Level::Highway);
        assert_eq!(hud.distance, 0);
        assert_eq!(hud.fuel, Some(100));
        assert_eq!(hud.cars_avoided, Some(0));
        assert_eq!(hud.lives, 2);
        assert_eq!(hud.hearts(), "♥♥♡♡♡");
    }

    #[test]
    fn test_hud_streets_has_no_fuel() {
        let state = GameState::new(3, Tuning::default(), Level::Streets, Character::Juan, 5, 25.0);
        let hud = Hud::from_state(&state, 0);
        assert_eq!(hud.fuel, None);
        assert_eq!(hud.cars_avoided, None);
        assert_eq!(hud.energy, 25);
    }

    #[test]
    fn test_video_falls_back_to_message() {
        let video = Overlay::CharacterVideo(Character::Julian);
        assert_eq!(
            video.fallback(),
            Some(Overlay::CharacterMessage("You chose Julian!".into()))
        );
        assert_eq!(Overlay::Loading(Level::Highway).fallback(), None);
    }
}
