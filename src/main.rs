//! Tone Rain entry point
//!
//! In the browser this wires the session to a 2D canvas, the tone input and
//! speech synthesis. Natively it plays one seeded run headlessly and logs the
//! result.

#[cfg(target_arch = "wasm32")]
use wasm_bindgen::prelude::*;

#[cfg(target_arch = "wasm32")]
mod web_game {
    use std::cell::RefCell;
    use std::f64::consts::TAU;
    use std::rc::Rc;

    use glam::Vec2;
    use wasm_bindgen::prelude::*;
    use web_sys::{
        CanvasRenderingContext2d, Document, HtmlCanvasElement, HtmlInputElement, KeyboardEvent,
        PointerEvent,
    };

    use tone_rain::consts::SPLASH_GROWTH;
    use tone_rain::medals;
    use tone_rain::platform::LocalStorage;
    use tone_rain::sim::{EffectKind, GamePhase};
    use tone_rain::speech::{self, WebSpeaker};
    use tone_rain::{GameSession, ToneLabels};

    /// Browser-side state around the session
    struct Game {
        session: GameSession,
        speaker: WebSpeaker,
        document: Document,
        canvas: HtmlCanvasElement,
        ctx: CanvasRenderingContext2d,
        tone_input: HtmlInputElement,
        dpr: f64,
    }

    impl Game {
        fn now() -> f64 {
            web_sys::window()
                .and_then(|w| w.performance())
                .map(|p| p.now())
                .unwrap_or_else(js_sys::Date::now)
        }

        /// Match the backing store to the CSS size; the session works in CSS pixels
        fn resize(&mut self) {
            let rect = self.canvas.get_bounding_client_rect();
            if rect.width() <= 0.0 || rect.height() <= 0.0 {
                return;
            }
            self.dpr = web_sys::window().map_or(1.0, |w| w.device_pixel_ratio());
            let width = (rect.width() * self.dpr).round() as u32;
            let height = (rect.height() * self.dpr).round() as u32;
            if self.canvas.width() != width || self.canvas.height() != height {
                self.canvas.set_width(width);
                self.canvas.set_height(height);
            }
            let _ = self.ctx.set_transform(self.dpr, 0.0, 0.0, self.dpr, 0.0, 0.0);
            self.session.resize(rect.width() as f32, rect.height() as f32);
        }

        fn update(&mut self, time: f64) {
            self.session.frame(time);
            let events = self.session.drain_events();
            if self.session.settings().speech {
                speech::speak_events(&mut self.speaker, &events, time);
            }
            if self.session.input().is_empty() && !self.tone_input.value().is_empty() {
                self.tone_input.set_value("");
            }
        }

        fn render(&self) {
            let ctx = &self.ctx;
            let field = self.session.playfield();
            let labels = self.session.settings().tone_labels;
            ctx.clear_rect(0.0, 0.0, f64::from(field.arena.width), f64::from(field.arena.height));

            ctx.set_text_align("center");
            ctx.set_text_baseline("middle");

            for drop in &field.drops {
                let (x, y, r) = (f64::from(drop.pos.x), f64::from(drop.pos.y), f64::from(drop.radius));
                ctx.set_global_alpha(1.0);
                ctx.begin_path();
                let _ = ctx.arc(x, y, r, 0.0, TAU);
                ctx.set_fill_style_str("rgba(80, 190, 215, 0.92)");
                ctx.fill();
                ctx.set_stroke_style_str("rgba(255, 255, 255, 0.6)");
                ctx.set_line_width(2.0);
                ctx.stroke();

                ctx.set_fill_style_str("#0b2530");
                ctx.set_font(&format!("600 {}px sans-serif", (r * 0.62).round()));
                let _ = ctx.fill_text(drop.text, x, y);
            }

            for effect in field.effects.iter() {
                let alpha = f64::from(effect.alpha().max(0.0));
                let pos = effect.draw_pos();
                let (x, y) = (f64::from(pos.x), f64::from(pos.y));
                ctx.set_global_alpha(alpha);
                match &effect.kind {
                    EffectKind::Splash { radius } => {
                        let r = f64::from(radius + effect.progress() * SPLASH_GROWTH);
                        ctx.begin_path();
                        let _ = ctx.arc(x, y, r, 0.0, TAU);
                        ctx.set_stroke_style_str("rgba(145, 229, 246, 1)");
                        ctx.set_line_width(3.0);
                        ctx.stroke();
                    }
                    EffectKind::Reveal { tones, size } => {
                        ctx.set_fill_style_str("#ff6b6b");
                        ctx.set_font(&format!("700 {}px sans-serif", size.round()));
                        let _ = ctx.fill_text(&labels.format(tones), x, y);
                    }
                    EffectKind::Caption { lines, font_size } => {
                        let line_height = f64::from(*font_size) * 1.2;
                        ctx.set_fill_style_str("#f4f8fb");
                        ctx.set_font(&format!("{}px sans-serif", font_size.round()));
                        let top = y - line_height * (lines.len() as f64 - 1.0) / 2.0;
                        for (i, line) in lines.iter().enumerate() {
                            let _ = ctx.fill_text(line, x, top + line_height * i as f64);
                        }
                    }
                }
            }
            ctx.set_global_alpha(1.0);
        }

        fn set_text(&self, id: &str, text: &str) {
            if let Some(el) = self.document.get_element_by_id(id) {
                if el.text_content().as_deref() != Some(text) {
                    el.set_text_content(Some(text));
                }
            }
        }

        fn set_hidden(&self, id: &str, hidden: bool) {
            if let Some(el) = self.document.get_element_by_id(id) {
                let _ = if hidden {
                    el.set_attribute("hidden", "")
                } else {
                    el.remove_attribute("hidden")
                };
            }
        }

        /// Update HUD elements in DOM
        fn update_hud(&self) {
            let session = &self.session;
            let level = session.level();
            self.set_text("hud-score", &session.score().to_string());
            self.set_text("hud-lives", &session.lives().to_string());
            self.set_text("hud-level", level.label);
            self.set_text(
                "hud-best",
                &session.progress().high_score(level.id).to_string(),
            );
            self.set_text("status-message", session.status());

            let medal_row: Vec<&str> = medals::medal_row(session.progress().high_score(level.id))
                .into_iter()
                .map(|slot| if slot.achieved { slot.tier.label() } else { "-" })
                .collect();
            self.set_text("medal-row", &medal_row.join(" "));

            let button = match session.phase() {
                GamePhase::Running => "Pause",
                GamePhase::Paused => "Resume",
                GamePhase::GameOver => "Restart",
                GamePhase::Idle | GamePhase::FinalReveal => "Start",
            };
            self.set_text("start-btn", button);
            self.tone_input.set_disabled(session.phase() != GamePhase::Running);

            match (session.dialog(), session.dialog_text()) {
                (Some(dialog), Some(text)) => {
                    self.set_text("dialog-title", dialog.title);
                    self.set_text("dialog-text", text);
                    self.set_hidden("dialog", false);
                }
                _ => self.set_hidden("dialog", true),
            }
        }

        /// Rebuild the level picker from what is currently selectable
        fn render_level_options(&self) {
            let Some(select) = self.document.get_element_by_id("level-select") else {
                return;
            };
            let current = self.session.level().id;
            let options: String = self
                .session
                .levels()
                .levels()
                .iter()
                .map(|level| {
                    let locked = !self.session.progress().is_unlocked(level.id);
                    format!(
                        "<option value=\"{}\"{}{}>{}</option>",
                        level.id,
                        if level.id == current { " selected" } else { "" },
                        if locked { " disabled" } else { "" },
                        level.label
                    )
                })
                .collect();
            select.set_inner_html(&options);
        }
    }

    fn element<T: JsCast>(document: &Document, id: &str) -> Result<T, JsValue> {
        document
            .get_element_by_id(id)
            .ok_or_else(|| JsValue::from_str(&format!("missing #{id}")))?
            .dyn_into::<T>()
            .map_err(|_| JsValue::from_str(&format!("#{id} has the wrong element type")))
    }

    pub fn run() -> Result<(), JsValue> {
        console_error_panic_hook::set_once();
        let _ = console_log::init_with_level(log::Level::Info);

        log::info!("Tone Rain starting...");

        let window = web_sys::window().ok_or("no window")?;
        let document = window.document().ok_or("no document")?;

        let canvas: HtmlCanvasElement = element(&document, "arena")?;
        let ctx: CanvasRenderingContext2d = canvas
            .get_context("2d")?
            .ok_or("no 2d context")?
            .dyn_into()
            .map_err(|_| JsValue::from_str("not a 2d context"))?;
        let tone_input: HtmlInputElement = element(&document, "tone-input")?;

        let labels = ToneLabels::from_query(&window.location().search().unwrap_or_default());
        let seed = js_sys::Date::now() as u64;
        let session = GameSession::with_defaults(Box::new(LocalStorage::open()), seed)
            .with_tone_labels(labels);
        log::info!("Game initialized with seed: {seed}");

        let game = Rc::new(RefCell::new(Game {
            session,
            speaker: WebSpeaker::new(),
            document,
            canvas,
            ctx,
            tone_input,
            dpr: 1.0,
        }));
        {
            let mut g = game.borrow_mut();
            g.resize();
            g.render_level_options();
            g.update_hud();
        }

        setup_input_handlers(game.clone())?;
        request_animation_frame(game);
        log::info!("Tone Rain running!");
        Ok(())
    }

    fn on<E, F>(target: &web_sys::EventTarget, event: &str, handler: F) -> Result<(), JsValue>
    where
        E: wasm_bindgen::convert::FromWasmAbi + 'static,
        F: FnMut(E) + 'static,
    {
        let closure = Closure::<dyn FnMut(E)>::new(handler);
        target.add_event_listener_with_callback(event, closure.as_ref().unchecked_ref())?;
        closure.forget();
        Ok(())
    }

    fn setup_input_handlers(game: Rc<RefCell<Game>>) -> Result<(), JsValue> {
        let window = web_sys::window().ok_or("no window")?;
        let document = game.borrow().document.clone();
        let by_id = |id: &str| document.get_element_by_id(id);

        // Typed tone patterns
        {
            let game = game.clone();
            let input = game.borrow().tone_input.clone();
            on(&input, "input", move |_event: web_sys::Event| {
                let mut g = game.borrow_mut();
                let raw = g.tone_input.value();
                g.session.input_text(&raw, Game::now());
                let shown = g.session.input().to_string();
                if g.tone_input.value() != shown {
                    g.tone_input.set_value(&shown);
                }
            })?;
        }

        // Start / pause / restart
        if let Some(btn) = by_id("start-btn") {
            let game = game.clone();
            on(&btn, "click", move |_event: web_sys::Event| {
                let mut g = game.borrow_mut();
                if let Err(err) = g.session.toggle(Game::now()) {
                    log::info!("Start refused: {err}");
                }
                g.render_level_options();
                let _ = g.tone_input.focus();
            })?;
        }

        // Replay the last word
        if let Some(btn) = by_id("replay-btn") {
            let game = game.clone();
            on(&btn, "click", move |_event: web_sys::Event| {
                game.borrow_mut().session.replay_last();
            })?;
        }

        // Tap a drop to hear it
        {
            let game = game.clone();
            let canvas = game.borrow().canvas.clone();
            on(&canvas, "pointerdown", move |event: PointerEvent| {
                let point = Vec2::new(event.offset_x() as f32, event.offset_y() as f32);
                game.borrow_mut().session.replay_at(point);
            })?;
        }

        // On-screen keypad
        for digit in ['1', '2', '3', '4'] {
            if let Some(btn) = by_id(&format!("key-{digit}")) {
                let game = game.clone();
                on(&btn, "click", move |_event: web_sys::Event| {
                    let mut g = game.borrow_mut();
                    g.session.append_digit(digit, Game::now());
                    let shown = g.session.input().to_string();
                    g.tone_input.set_value(&shown);
                })?;
            }
        }
        if let Some(btn) = by_id("key-back") {
            let game = game.clone();
            on(&btn, "click", move |_event: web_sys::Event| {
                let mut g = game.borrow_mut();
                g.session.backspace(Game::now());
                let shown = g.session.input().to_string();
                g.tone_input.set_value(&shown);
            })?;
        }

        // Level picker
        if let Some(select) = by_id("level-select") {
            let game = game.clone();
            on(&select, "change", move |event: web_sys::Event| {
                let Some(select) = event
                    .target()
                    .and_then(|t| t.dyn_into::<web_sys::HtmlSelectElement>().ok())
                else {
                    return;
                };
                let mut g = game.borrow_mut();
                if !g.session.select_level(&select.value()) {
                    select.set_value(g.session.level().id);
                }
                g.render_level_options();
            })?;
        }

        // Dismiss the end-of-run dialog
        if let Some(btn) = by_id("dialog-close") {
            let game = game.clone();
            on(&btn, "click", move |_event: web_sys::Event| {
                game.borrow_mut().session.dismiss_dialog();
            })?;
        }

        // Speech on/off, saved with the other settings
        if let Some(toggle) = by_id("speech-toggle").and_then(|el| el.dyn_into::<HtmlInputElement>().ok()) {
            toggle.set_checked(game.borrow().session.settings().speech);
            let game = game.clone();
            let target = toggle.clone();
            on(&target, "change", move |_event: web_sys::Event| {
                let mut g = game.borrow_mut();
                let mut settings = g.session.settings().clone();
                settings.speech = toggle.checked();
                g.session.set_settings(settings);
            })?;
        }

        // Keyboard: space toggles, Escape pauses
        {
            let game = game.clone();
            on(&window, "keydown", move |event: KeyboardEvent| {
                let mut g = game.borrow_mut();
                match event.key().as_str() {
                    "Escape" => {
                        g.session.pause();
                    }
                    "Enter" if g.session.phase() != GamePhase::Running => {
                        let _ = g.session.toggle(Game::now());
                    }
                    _ => {}
                }
            })?;
        }

        on(&window, "resize", move |_event: web_sys::Event| {
            game.borrow_mut().resize();
        })?;

        Ok(())
    }

    fn request_animation_frame(game: Rc<RefCell<Game>>) {
        let Some(window) = web_sys::window() else {
            return;
        };
        let closure = Closure::once(move |time: f64| {
            game_loop(game, time);
        });
        let _ = window.request_animation_frame(closure.as_ref().unchecked_ref());
        closure.forget();
    }

    fn game_loop(game: Rc<RefCell<Game>>, time: f64) {
        {
            let mut g = game.borrow_mut();
            let before = g.session.phase();
            g.update(time);
            g.render();
            g.update_hud();
            if g.session.phase() != before && g.session.phase() == GamePhase::GameOver {
                g.render_level_options();
            }
        }

        request_animation_frame(game);
    }
}

#[cfg(target_arch = "wasm32")]
#[wasm_bindgen(start)]
pub fn wasm_main() -> Result<(), JsValue> {
    web_game::run()
}

#[cfg(not(target_arch = "wasm32"))]
fn main() {
    env_logger::init();

    let seed = std::env::args()
        .nth(1)
        .and_then(|arg| arg.parse().ok())
        .unwrap_or(42);
    log::info!("Tone Rain (native) starting headless demo, seed {seed}");

    let summary = demo::autoplay(seed);
    println!("{}", summary.message);
}

#[cfg(target_arch = "wasm32")]
fn main() {
    // WASM entry point is wasm_main
}

/// Headless autoplay: a simulated player with a reaction delay who lets
/// every seventh word fall.
#[cfg(not(target_arch = "wasm32"))]
mod demo {
    use tone_rain::platform::MemoryStore;
    use tone_rain::sim::GamePhase;
    use tone_rain::speech::{self, LogSpeaker};
    use tone_rain::{GameSession, RunSummary};

    const FRAME_MS: f64 = 1000.0 / 60.0;
    const TIME_LIMIT_MS: f64 = 30.0 * 60.0 * 1000.0;
    /// Fraction of the arena a drop must fall before the player answers
    const REACTION_DEPTH: f32 = 0.35;
    const SKIP_EVERY: u64 = 7;

    pub fn autoplay(seed: u64) -> RunSummary {
        let mut session = GameSession::with_defaults(Box::new(MemoryStore::new()), seed);
        let mut speaker = LogSpeaker::new();
        let mut now = 0.0;

        if let Err(err) = session.start(now) {
            log::error!("Could not start: {err}");
        }
        while session.phase() != GamePhase::GameOver && now < TIME_LIMIT_MS {
            now += FRAME_MS;
            session.frame(now);

            let line = session.playfield().arena.height * REACTION_DEPTH;
            let answer = session
                .playfield()
                .drops
                .iter()
                .filter(|drop| drop.pos.y > line && (drop.id + 1) % SKIP_EVERY != 0)
                .map(|drop| drop.tones)
                .next();
            if let Some(tones) = answer {
                session.input_text(tones, now);
            }

            let events = session.drain_events();
            speech::speak_events(&mut speaker, &events, now);
        }

        log::info!(
            "Spoke {} words over {:.1}s",
            speaker.spoken().len(),
            now / 1000.0
        );
        match session.summary() {
            Some(summary) => summary.clone(),
            None => RunSummary {
                level_id: session.level().id,
                score: session.score(),
                recorded: false,
                is_high_score: false,
                new_medal: None,
                unlocked_level: None,
                message: format!("Stopped after {:.0}s. Score: {}.", now / 1000.0, session.score()),
                dialog: None,
            },
        }
    }
}
