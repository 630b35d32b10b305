//! Browser glue: DOM presenter and input listeners

use std::cell::RefCell;
use std::collections::HashSet;
use std::rc::Rc;

use wasm_bindgen::JsCast;
use wasm_bindgen::prelude::*;
use web_sys::{CanvasRenderingContext2d, Document, HtmlCanvasElement, KeyboardEvent};

use super::input::{Action, Source};
use crate::driver::Driver;
use crate::error::PresentError;
use crate::present::{CANVAS_TARGET, Hud, Overlay, Presenter};
use crate::sim::{Aabb, EnemyKind, GameState, Level, PickupKind, PropKind};

fn css(color: u32) -> String {
    format!("#{color:06x}")
}

/// Presenter backed by DOM elements and a 2D canvas
pub struct WebPresenter {
    document: Document,
    ctx: Option<CanvasRenderingContext2d>,
    /// Optional elements already reported missing
    warned: HashSet<String>,
}

impl WebPresenter {
    pub fn new(document: Document) -> Self {
        let ctx = document
            .get_element_by_id(CANVAS_TARGET)
            .and_then(|el| el.dyn_into::<HtmlCanvasElement>().ok())
            .and_then(|canvas| canvas.get_context("2d").ok().flatten())
            .and_then(|ctx| ctx.dyn_into::<CanvasRenderingContext2d>().ok());
        Self {
            document,
            ctx,
            warned: HashSet::new(),
        }
    }

    fn set_text(&mut self, id: &str, text: &str) {
        match self.document.get_element_by_id(id) {
            Some(el) => el.set_text_content(Some(text)),
            None => self.warn_missing(id),
        }
    }

    fn set_visible(&self, id: &str, visible: bool) -> Result<(), PresentError> {
        let el = self
            .document
            .get_element_by_id(id)
            .ok_or_else(|| PresentError::MissingElement(id.to_string()))?;
        let _ = el.set_attribute("class", if visible { "" } else { "hidden" });
        Ok(())
    }

    fn warn_missing(&mut self, id: &str) {
        if self.warned.insert(id.to_string()) {
            log::warn!("UI element #{id} not found, skipping");
        }
    }

    fn fill(ctx: &CanvasRenderingContext2d, color: u32, body: &Aabb) {
        ctx.set_fill_style_str(&css(color));
        ctx.fill_rect(
            body.pos.x as f64,
            body.pos.y as f64,
            body.size.x as f64,
            body.size.y as f64,
        );
    }
}

impl Presenter for WebPresenter {
    fn has_target(&self, id: &str) -> bool {
        if id == CANVAS_TARGET {
            return self.ctx.is_some();
        }
        self.document.get_element_by_id(id).is_some()
    }

    fn publish_hud(&mut self, hud: &Hud) {
        self.set_text("score", &hud.distance.to_string());
        self.set_text("energy", &format!("{}%", hud.energy));
        self.set_text("hearts", &hud.hearts());
        if let Some(fuel) = hud.fuel {
            self.set_text("fuel", &format!("{fuel}%"));
        }
        if let Some(cars) = hud.cars_avoided {
            self.set_text("carsAvoided", &cars.to_string());
        }
        if hud.fps > 0 {
            self.set_text("fps", &hud.fps.to_string());
        }
    }

    fn show_overlay(&mut self, overlay: &Overlay) -> Result<(), PresentError> {
        match overlay {
            Overlay::GameOver { distance, .. } => {
                self.set_visible("gameOver", true)?;
                self.set_text("finalScore", &distance.to_string());
                self.set_text("gameOverMessage", &overlay.title());
            }
            Overlay::CharacterVideo(character) => {
                let video = self
                    .document
                    .get_element_by_id("characterVideo")
                    .ok_or_else(|| PresentError::MissingElement("characterVideo".into()))?;
                video
                    .set_attribute("src", &format!("videos/{}.mp4", character.as_str()))
                    .map_err(|_| PresentError::AssetUnavailable(character.as_str().into()))?;
                self.set_visible("videoOverlay", true)?;
                self.set_text("characterName", character.display_name());
            }
            Overlay::CharacterMessage(message) => {
                self.set_visible("messageOverlay", true)?;
                self.set_text("message", message);
            }
            Overlay::LevelBanner(_) | Overlay::Loading(_) => {
                self.set_visible("messageOverlay", true)?;
                self.set_text("message", &overlay.title());
            }
        }
        Ok(())
    }

    fn render(&mut self, state: &GameState) {
        let Some(ctx) = self.ctx.as_ref() else {
            return;
        };
        let view = state.view();
        let shake = state.effects.shake_offset();

        ctx.save();
        let _ = ctx.translate(shake.x as f64, shake.y as f64);

        let (sky, ground) = match state.level {
            Level::Streets => (0x87CEEB, 0x555555),
            Level::Highway => (0x2E8B57, 0x333333),
        };
        Self::fill(ctx, sky, &view);
        match state.level {
            Level::Streets => {
                let ground_y = state.tuning.ground_line();
                let strip = Aabb::new(0.0, ground_y, view.size.x, view.size.y - ground_y);
                Self::fill(ctx, ground, &strip);
            }
            Level::Highway => {
                let margin = state.tuning.highway.road_margin;
                let road = Aabb::new(margin, 0.0, view.size.x - 2.0 * margin, view.size.y);
                Self::fill(ctx, ground, &road);
            }
        }

        for prop in state.props.iter() {
            let color = match prop.kind {
                PropKind::Building => 0x696969,
                PropKind::Sign => 0xDAA520,
                PropKind::Tree => 0x006400,
                PropKind::Rock => 0x808080,
            };
            Self::fill(ctx, color, &prop.body);
        }
        for pickup in state.pickups.iter() {
            let color = match pickup.kind {
                PickupKind::Energy => 0xFFD700,
                PickupKind::Heart => 0xFF1493,
                PickupKind::Fuel => 0x00BFFF,
            };
            Self::fill(ctx, color, &pickup.body);
        }
        for enemy in state.enemies.iter() {
            let color = match enemy.kind {
                EnemyKind::Monster => 0x8B0000,
                EnemyKind::Jumper => 0x9400D3,
                EnemyKind::Racer => 0xFF4500,
                EnemyKind::Police => 0x0000CD,
            };
            Self::fill(ctx, color, &enemy.body);
        }
        for projectile in state.projectiles.iter() {
            Self::fill(ctx, 0xFFFF00, &projectile.body);
        }

        ctx.set_global_alpha(if state.player.is_invulnerable() { 0.5 } else { 1.0 });
        let player_color = if state.player.special_active() { 0xFFD700 } else { 0xFFFFFF };
        Self::fill(ctx, player_color, &state.player.body);
        ctx.set_global_alpha(1.0);

        if let Some(cutscene) = &state.cutscene {
            Self::fill(ctx, 0xC0C0C0, &cutscene.car);
        }

        for particle in state.effects.particles.iter() {
            ctx.set_global_alpha(particle.alpha() as f64);
            ctx.set_fill_style_str(&css(particle.color));
            let half = particle.size / 2.0;
            ctx.fill_rect(
                (particle.pos.x - half) as f64,
                (particle.pos.y - half) as f64,
                particle.size as f64,
                particle.size as f64,
            );
        }
        ctx.restore();

        if let Some(flash) = &state.effects.flash {
            ctx.set_global_alpha(flash.alpha as f64);
            Self::fill(ctx, flash.color, &view);
        }
        ctx.set_global_alpha(1.0);
    }
}

/// Shared handle the listeners and the frame loop hold
pub type SharedDriver = Rc<RefCell<Driver<WebPresenter>>>;

fn current_level(driver: &SharedDriver) -> Level {
    driver.borrow().session().state().level
}

/// Keyboard, on-screen buttons and focus loss
pub fn install_listeners(document: &Document, driver: SharedDriver) -> Result<(), JsValue> {
    let window = web_sys::window().ok_or_else(|| JsValue::from_str("no window"))?;

    for (event_name, pressed) in [("keydown", true), ("keyup", false)] {
        let driver = driver.clone();
        let closure = Closure::<dyn FnMut(_)>::new(move |event: KeyboardEvent| {
            let level = current_level(&driver);
            let Some(action) = Action::from_key(level, &event.key()) else {
                return;
            };
            event.prevent_default();
            let mut d = driver.borrow_mut();
            if pressed {
                d.session_mut().audio_mut().resume();
                d.input_mut().press(action, Source::Keyboard);
            } else {
                d.input_mut().release(action, Source::Keyboard);
            }
        });
        window.add_event_listener_with_callback(event_name, closure.as_ref().unchecked_ref())?;
        closure.forget();
    }

    for id in ["jumpBtn", "attackBtn", "specialBtn", "pauseBtn"] {
        let Some(button) = document.get_element_by_id(id) else {
            log::warn!("Button #{id} not found, touch control disabled");
            continue;
        };
        for (event_name, pressed, source) in [
            ("touchstart", true, Source::Touch),
            ("touchend", false, Source::Touch),
            ("touchcancel", false, Source::Touch),
            ("mousedown", true, Source::Button),
            ("mouseup", false, Source::Button),
            ("mouseleave", false, Source::Button),
        ] {
            let driver = driver.clone();
            let closure = Closure::<dyn FnMut(_)>::new(move |event: web_sys::Event| {
                event.prevent_default();
                let level = current_level(&driver);
                let Some(action) = Action::from_button(level, id) else {
                    return;
                };
                let mut d = driver.borrow_mut();
                if pressed {
                    d.session_mut().audio_mut().resume();
                    d.input_mut().press(action, source);
                } else {
                    d.input_mut().release(action, source);
                }
            });
            button.add_event_listener_with_callback(event_name, closure.as_ref().unchecked_ref())?;
            closure.forget();
        }
    }

    {
        let driver = driver.clone();
        let closure = Closure::<dyn FnMut(_)>::new(move |_event: web_sys::FocusEvent| {
            let mut d = driver.borrow_mut();
            d.input_mut().release_all();
            if d.session().settings().pause_on_blur {
                log::info!("Window lost focus, pausing");
                d.session_mut().pause();
            }
        });
        window.add_event_listener_with_callback("blur", closure.as_ref().unchecked_ref())?;
        closure.forget();
    }

    Ok(())
}
