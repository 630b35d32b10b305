//! Frame driver
//!
//! Called once per platform frame callback. Decides whether the frame is
//! admitted, advances the session, presents, and reports whether the loop
//! should keep scheduling itself.

use crate::error::InitError;
use crate::platform::{FpsCounter, FrameClock, InputBuffer};
use crate::present::{self, Presenter};
use crate::session::Session;
use crate::settings::Settings;

/// What happened on one platform callback
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FrameOutcome {
    /// Throttled; nothing changed
    Skipped,
    /// Frame advanced and presented; schedule the next one
    Rendered,
    /// Session over and fully settled; stop scheduling
    Halted,
}

pub struct Driver<P: Presenter> {
    session: Session,
    presenter: P,
    clock: FrameClock,
    fps: FpsCounter,
    input: InputBuffer,
    halted: bool,
}

impl<P: Presenter> Driver<P> {
    /// Fails if the presenter lacks any required target
    pub fn new(session: Session, presenter: P) -> Result<Self, InitError> {
        if let Err(e) = present::check_targets(&presenter) {
            log::error!("Cannot start: {e}");
            return Err(e);
        }
        let clock = FrameClock::new(session.settings().quality.target_fps());
        Ok(Self {
            session,
            presenter,
            clock,
            fps: FpsCounter::default(),
            input: InputBuffer::new(),
            halted: false,
        })
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    pub fn session_mut(&mut self) -> &mut Session {
        &mut self.session
    }

    pub fn into_parts(self) -> (Session, P) {
        (self.session, self.presenter)
    }

    pub fn presenter(&self) -> &P {
        &self.presenter
    }

    pub fn presenter_mut(&mut self) -> &mut P {
        &mut self.presenter
    }

    /// Buffered input for the next admitted frame
    pub fn input_mut(&mut self) -> &mut InputBuffer {
        &mut self.input
    }

    pub fn clock_mut(&mut self) -> &mut FrameClock {
        &mut self.clock
    }

    /// Apply and persist new settings, retuning the frame throttle
    pub fn apply_settings(&mut self, settings: Settings) {
        self.clock.set_target_fps(settings.quality.target_fps());
        self.session.apply_settings(settings);
    }

    pub fn fps(&self) -> u32 {
        self.fps.fps()
    }

    pub fn is_halted(&self) -> bool {
        self.halted
    }

    /// Run one platform callback at wall-clock time `now_ms`
    pub fn run_frame(&mut self, now_ms: f64) -> FrameOutcome {
        if self.halted {
            return FrameOutcome::Halted;
        }
        if self.clock.admit(now_ms).is_none() {
            return FrameOutcome::Skipped;
        }
        self.fps.record(now_ms);

        if self.session.is_terminal() {
            self.session.settle();
        } else {
            let input = self.input.take_tick_input();
            if self.session.is_paused() && !input.pause {
                // Paused frames still play out effects
                self.session.settle();
            } else {
                self.session.update(&input);
            }
        }

        self.present();

        if self.session.is_finished() {
            log::info!("Session finished, stopping frame loop");
            self.halted = true;
            return FrameOutcome::Halted;
        }
        FrameOutcome::Rendered
    }

    fn present(&mut self) {
        for overlay in self.session.take_overlays() {
            present::show_with_fallback(&mut self.presenter, &overlay);
        }
        let hud = self.session.hud(self.fps.fps());
        self.presenter.publish_hud(&hud);
        self.presenter.render(self.session.state());
    }
}
