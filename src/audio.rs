//! Audio cues
//!
//! Procedurally generated sound effects - no external files needed!
//! Each cue is a short table of oscillator tones. A backend plays them;
//! the manager swallows backend failures and goes quiet for the rest of
//! the session.

use crate::error::AudioError;
use crate::sim::{EnemyKind, GameEvent};

/// Sound effect types
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Cue {
    Jump,
    Shoot,
    /// Player took damage
    Hit,
    Explosion,
    Pickup,
    SpecialReady,
    Special,
    Boost,
    GameOver,
    LevelComplete,
}

/// Oscillator waveform
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Wave {
    Sine,
    Square,
    Sawtooth,
    Triangle,
}

/// One oscillator note with an exponential decay envelope
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Tone {
    pub freq: f32,
    /// Frequency glide target over the tone's duration
    pub glide_to: Option<f32>,
    /// Seconds after the cue starts
    pub delay: f64,
    /// Seconds
    pub duration: f64,
    pub wave: Wave,
    /// Peak gain before volume scaling
    pub gain: f32,
}

const fn tone(freq: f32, delay: f64, duration: f64, wave: Wave, gain: f32) -> Tone {
    Tone {
        freq,
        glide_to: None,
        delay,
        duration,
        wave,
        gain,
    }
}

const fn glide(freq: f32, to: f32, duration: f64, wave: Wave, gain: f32) -> Tone {
    Tone {
        freq,
        glide_to: Some(to),
        delay: 0.0,
        duration,
        wave,
        gain,
    }
}

const JUMP: &[Tone] = &[glide(200.0, 600.0, 0.15, Wave::Triangle, 0.3)];
const SHOOT: &[Tone] = &[glide(900.0, 300.0, 0.08, Wave::Square, 0.15)];
const HIT: &[Tone] = &[
    glide(150.0, 60.0, 0.15, Wave::Sawtooth, 0.4),
    tone(80.0, 0.0, 0.12, Wave::Sine, 0.3),
];
const EXPLOSION: &[Tone] = &[
    glide(100.0, 30.0, 0.4, Wave::Sawtooth, 0.5),
    tone(1500.0, 0.0, 0.1, Wave::Square, 0.2),
];
const PICKUP: &[Tone] = &[
    tone(600.0, 0.0, 0.15, Wave::Sine, 0.25),
    tone(800.0, 0.08, 0.15, Wave::Sine, 0.25),
    tone(1000.0, 0.16, 0.15, Wave::Sine, 0.25),
];
const SPECIAL_READY: &[Tone] = &[
    tone(1200.0, 0.0, 0.3, Wave::Sine, 0.2),
    tone(1800.0, 0.02, 0.3, Wave::Sine, 0.2),
    tone(2400.0, 0.04, 0.3, Wave::Sine, 0.2),
];
const SPECIAL: &[Tone] = &[
    glide(300.0, 1200.0, 0.4, Wave::Triangle, 0.35),
    glide(150.0, 600.0, 0.4, Wave::Sine, 0.25),
];
const BOOST: &[Tone] = &[
    glide(80.0, 240.0, 0.5, Wave::Sawtooth, 0.35),
    glide(60.0, 180.0, 0.5, Wave::Square, 0.15),
];
const GAME_OVER: &[Tone] = &[
    tone(400.0, 0.0, 0.3, Wave::Sine, 0.3),
    tone(350.0, 0.2, 0.3, Wave::Sine, 0.3),
    tone(300.0, 0.4, 0.3, Wave::Sine, 0.3),
    tone(200.0, 0.6, 0.3, Wave::Sine, 0.3),
];
const LEVEL_COMPLETE: &[Tone] = &[
    tone(400.0, 0.0, 0.4, Wave::Triangle, 0.3),
    tone(500.0, 0.1, 0.4, Wave::Triangle, 0.3),
    tone(600.0, 0.2, 0.4, Wave::Triangle, 0.3),
    tone(800.0, 0.3, 0.4, Wave::Triangle, 0.3),
];

impl Cue {
    pub fn tones(self) -> &'static [Tone] {
        match self {
            Cue::Jump => JUMP,
            Cue::Shoot => SHOOT,
            Cue::Hit => HIT,
            Cue::Explosion => EXPLOSION,
            Cue::Pickup => PICKUP,
            Cue::SpecialReady => SPECIAL_READY,
            Cue::Special => SPECIAL,
            Cue::Boost => BOOST,
            Cue::GameOver => GAME_OVER,
            Cue::LevelComplete => LEVEL_COMPLETE,
        }
    }

    /// Cue for a simulation event, if it has one
    pub fn for_event(event: &GameEvent) -> Option<Self> {
        match event {
            GameEvent::Jumped => Some(Cue::Jump),
            GameEvent::Shot => Some(Cue::Shoot),
            GameEvent::Damaged { .. } => Some(Cue::Hit),
            GameEvent::EnemyDestroyed { kind } => match kind {
                EnemyKind::Police | EnemyKind::Racer => Some(Cue::Explosion),
                EnemyKind::Monster | EnemyKind::Jumper => Some(Cue::Hit),
            },
            GameEvent::PickupCollected { .. } => Some(Cue::Pickup),
            GameEvent::SpecialReady => Some(Cue::SpecialReady),
            GameEvent::SpecialActivated => Some(Cue::Special),
            GameEvent::Boosted => Some(Cue::Boost),
            GameEvent::GameOver { .. } => Some(Cue::GameOver),
            GameEvent::LevelComplete { .. } => Some(Cue::LevelComplete),
            GameEvent::SpecialEnded
            | GameEvent::Paused
            | GameEvent::Resumed
            | GameEvent::TransitionFinished => None,
        }
    }
}

/// Something that can play tones
pub trait AudioBackend {
    /// Schedule one tone at `volume` (already scaled, 0.0 - 1.0)
    fn play_tone(&mut self, tone: &Tone, volume: f32) -> Result<(), AudioError>;

    /// Wake the backend after a user gesture
    fn resume(&mut self) -> Result<(), AudioError> {
        Ok(())
    }
}

/// Audio manager for the game
pub struct AudioManager {
    backend: Option<Box<dyn AudioBackend>>,
    volume: f32,
    muted: bool,
}

impl Default for AudioManager {
    fn default() -> Self {
        Self::disabled()
    }
}

impl std::fmt::Debug for AudioManager {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AudioManager")
            .field("enabled", &self.is_enabled())
            .field("volume", &self.volume)
            .field("muted", &self.muted)
            .finish()
    }
}

impl AudioManager {
    pub fn new(backend: Box<dyn AudioBackend>) -> Self {
        Self {
            backend: Some(backend),
            volume: 0.8,
            muted: false,
        }
    }

    /// A manager with no backend; every cue is a no-op
    pub fn disabled() -> Self {
        Self {
            backend: None,
            volume: 0.0,
            muted: true,
        }
    }

    /// Wrap a backend construction result, disabling audio on failure
    pub fn from_result(backend: Result<Box<dyn AudioBackend>, AudioError>) -> Self {
        match backend {
            Ok(backend) => Self::new(backend),
            Err(e) => {
                log::warn!("Audio disabled: {e}");
                Self::disabled()
            }
        }
    }

    pub fn is_enabled(&self) -> bool {
        self.backend.is_some()
    }

    /// Set effective volume (0.0 - 1.0)
    pub fn set_volume(&mut self, volume: f32) {
        self.volume = volume.clamp(0.0, 1.0);
    }

    pub fn set_muted(&mut self, muted: bool) {
        self.muted = muted;
    }

    /// Resume audio context (required after user gesture)
    pub fn resume(&mut self) {
        if let Some(backend) = self.backend.as_mut() {
            if let Err(e) = backend.resume() {
                self.disable(e);
            }
        }
    }

    /// Play a cue. Never fails; a backend error disables audio.
    pub fn play(&mut self, cue: Cue) {
        if self.muted || self.volume <= 0.0 {
            return;
        }
        let Some(backend) = self.backend.as_mut() else {
            return;
        };
        for tone in cue.tones() {
            if let Err(e) = backend.play_tone(tone, self.volume) {
                self.disable(e);
                return;
            }
        }
    }

    fn disable(&mut self, error: AudioError) {
        log::warn!("Audio backend failed ({error}), audio disabled");
        self.backend = None;
    }
}

#[cfg(target_arch = "wasm32")]
pub use web::WebAudio;

#[cfg(target_arch = "wasm32")]
mod web {
    use web_sys::{AudioContext, GainNode, OscillatorNode, OscillatorType};

    use super::{AudioBackend, Tone, Wave};
    use crate::error::AudioError;

    fn backend_err(e: wasm_bindgen::JsValue) -> AudioError {
        AudioError::Backend(format!("{e:?}"))
    }

    /// Web Audio API backend
    pub struct WebAudio {
        ctx: AudioContext,
    }

    impl WebAudio {
        /// May fail outside a secure context
        pub fn new() -> Result<Self, AudioError> {
            let ctx = AudioContext::new().map_err(|_| AudioError::Unsupported)?;
            Ok(Self { ctx })
        }

        /// Create an oscillator routed through a gain node
        fn create_osc(&self, tone: &Tone) -> Result<(OscillatorNode, GainNode), AudioError> {
            let osc = self.ctx.create_oscillator().map_err(backend_err)?;
            let gain = self.ctx.create_gain().map_err(backend_err)?;

            osc.set_type(match tone.wave {
                Wave::Sine => OscillatorType::Sine,
                Wave::Square => OscillatorType::Square,
                Wave::Sawtooth => OscillatorType::Sawtooth,
                Wave::Triangle => OscillatorType::Triangle,
            });
            osc.frequency().set_value(tone.freq);
            osc.connect_with_audio_node(&gain).map_err(backend_err)?;
            gain.connect_with_audio_node(&self.ctx.destination())
                .map_err(backend_err)?;

            Ok((osc, gain))
        }
    }

    impl AudioBackend for WebAudio {
        fn play_tone(&mut self, tone: &Tone, volume: f32) -> Result<(), AudioError> {
            // Browsers start the context suspended until a user gesture
            if self.ctx.state() == web_sys::AudioContextState::Suspended {
                let _ = self.ctx.resume();
            }

            let (osc, gain) = self.create_osc(tone)?;
            let t = self.ctx.current_time() + tone.delay;

            gain.gain()
                .set_value_at_time(volume * tone.gain, t)
                .map_err(backend_err)?;
            gain.gain()
                .exponential_ramp_to_value_at_time(0.01, t + tone.duration)
                .map_err(backend_err)?;
            if let Some(to) = tone.glide_to {
                osc.frequency()
                    .set_value_at_time(tone.freq, t)
                    .map_err(backend_err)?;
                osc.frequency()
                    .exponential_ramp_to_value_at_time(to, t + tone.duration)
                    .map_err(backend_err)?;
            }

            osc.start_with_when(t).map_err(backend_err)?;
            osc.stop_with_when(t + tone.duration + 0.05)
                .map_err(backend_err)?;
            Ok(())
        }

        fn resume(&mut self) -> Result<(), AudioError> {
            self.ctx.resume().map(|_| ()).map_err(backend_err)
        }
    }
}

#[cfg(test)]
mod tests {
    use std::cell::RefCell;
    use std::rc::Rc;

    use super::*;
    use crate::sim::{GameOverReason, PickupKind};

    #[derive(Default)]
    struct Recorder {
        played: Rc<RefCell<Vec<(f32, f32)>>>,
        fail_after: Option<usize>,
    }

    impl AudioBackend for Recorder {
        fn play_tone(&mut self, tone: &Tone, volume: f32) -> Result<(), AudioError> {
            let mut played = self.played.borrow_mut();
            if self.fail_after.is_some_and(|n| played.len() >= n) {
                return Err(AudioError::Backend("device lost".into()));
            }
            played.push((tone.freq, volume));
            Ok(())
        }
    }

    #[test]
    fn test_every_cue_has_tones() {
        for cue in [
            Cue::Jump,
            Cue::Shoot,
            Cue::Hit,
            Cue::Explosion,
            Cue::Pickup,
            Cue::SpecialReady,
            Cue::Special,
            Cue::Boost,
            Cue::GameOver,
            Cue::LevelComplete,
        ] {
            let tones = cue.tones();
            assert!(!tones.is_empty(), "{cue:?}");
            assert!(tones.iter().all(|t| t.freq > 0.0 && t.duration > 0.0));
        }
    }

    #[test]
    fn test_event_mapping() {
        assert_eq!(Cue::for_event(&GameEvent::Jumped), Some(Cue::Jump));
        assert_eq!(
            Cue::for_event(&GameEvent::PickupCollected {
                kind: PickupKind::Heart
            }),
            Some(Cue::Pickup)
        );
        assert_eq!(
            Cue::for_event(&GameEvent::GameOver {
                reason: GameOverReason::OutOfFuel
            }),
            Some(Cue::GameOver)
        );
        assert_eq!(Cue::for_event(&GameEvent::Paused), None);
    }

    #[test]
    fn test_play_scales_volume() {
        let played = Rc::new(RefCell::new(Vec::new()));
        let mut audio = AudioManager::new(Box::new(Recorder {
            played: played.clone(),
            fail_after: None,
        }));
        audio.set_volume(0.5);
        audio.play(Cue::Pickup);
        let played = played.borrow();
        assert_eq!(played.len(), 3);
        assert!(played.iter().all(|(_, v)| *v == 0.5));
    }

    #[test]
    fn test_muted_plays_nothing() {
        let played = Rc::new(RefCell::new(Vec::new()));
        let mut audio = AudioManager::new(Box::new(Recorder {
            played: played.clone(),
            fail_after: None,
        }));
        audio.set_muted(true);
        audio.play(Cue::Jump);
        assert!(played.borrow().is_empty());
    }

    #[test]
    fn test_backend_failure_disables_audio() {
        let played = Rc::new(RefCell::new(Vec::new()));
        let mut audio = AudioManager::new(Box::new(Recorder {
            played: played.clone(),
            fail_after: Some(1),
        }));
        audio.play(Cue::GameOver);
        assert!(!audio.is_enabled());
        assert_eq!(played.borrow().len(), 1);

        // Later cues are silently dropped
        audio.play(Cue::Jump);
        assert_eq!(played.borrow().len(), 1);
    }

    #[test]
    fn test_unsupported_backend_starts_disabled() {
        let audio = AudioManager::from_result(Err(AudioError::Unsupported));
        assert!(!audio.is_enabled());
        let mut audio = audio;
        audio.play(Cue::Boost);
    }
}
