//! Base Runner entry point
//!
//! Handles platform-specific initialization and runs the game loop.

#[cfg(target_arch = "wasm32")]
use wasm_bindgen::prelude::*;

#[cfg(target_arch = "wasm32")]
mod wasm_game {
    use anyhow::{Context, anyhow};
    use std::cell::RefCell;
    use std::rc::Rc;
    use wasm_bindgen::prelude::*;
    use web_sys::{Document, HtmlCanvasElement, KeyboardEvent, MouseEvent, TouchEvent};

    use base_runner::consts::*;
    use base_runner::persistence::{ScoreStore, StorageScoreStore};
    use base_runner::platform::input::is_jump_key;
    use base_runner::platform::{JumpButton, LocalStorage, MemoryStorage};
    use base_runner::render::{CanvasSurface, draw_scene};
    use base_runner::sim::GamePhase;
    use base_runner::{NoHooks, QualityPreset, Session, Settings, Tuning};

    /// Game instance holding all state
    struct Game {
        session: Session,
        quality: QualityPreset,
        surface: CanvasSurface,
        jump: JumpButton,
        accumulator: f64,
        last_time: f64,
        // FPS tracking
        frame_times: [f64; 60],
        frame_index: usize,
        fps: u32,
    }

    impl Game {
        /// Run simulation ticks for one display frame
        fn update(&mut self, dt_ms: f64, time: f64) {
            self.accumulator += dt_ms.min(MAX_FRAME_MS);

            let mut substeps = 0;
            while self.accumulator >= TICK_MS && substeps < MAX_SUBSTEPS {
                if self.jump.take_press() && self.session.phase() == GamePhase::Playing {
                    self.session.request_jump();
                }
                if let Err(e) = self.session.tick() {
                    log::error!("Tick failed: {:#}", e);
                }
                self.accumulator -= TICK_MS;
                substeps += 1;
            }
            if substeps == MAX_SUBSTEPS {
                // Fell behind; drop the backlog instead of spiralling
                self.accumulator = self.accumulator.min(TICK_MS);
            }

            // Track frame times for FPS
            self.frame_times[self.frame_index] = time;
            self.frame_index = (self.frame_index + 1) % 60;
            let oldest_time = self.frame_times[self.frame_index];
            if oldest_time > 0.0 {
                let elapsed = time - oldest_time;
                if elapsed > 0.0 {
                    self.fps = (60000.0 / elapsed).round() as u32;
                }
            }
        }

        fn render(&mut self) {
            self.surface.begin_frame();
            draw_scene(&mut self.surface, self.session.state(), self.quality);
        }

        fn start(&mut self) {
            if self.session.start() {
                self.jump.reset();
                self.accumulator = 0.0;
            }
        }

        /// Update HUD elements in DOM
        fn update_hud(&self, document: &Document) {
            let snap = self.session.snapshot();

            set_text(document, "score", &snap.display_score.to_string());
            set_text(document, "high-score", &snap.high_score.to_string());
            set_text(
                document,
                "coins",
                &format!("{}/{}", snap.coins, snap.coins_needed),
            );
            set_text(document, "fps", &self.fps.to_string());
            set_text(
                document,
                "power-timer",
                &format!("{:.1}s", snap.power_mode_remaining_ms / 1000.0),
            );
            set_hidden(document, "power-indicator", !snap.power_mode);

            set_hidden(document, "start-screen", snap.phase != GamePhase::Menu);
            set_hidden(document, "hud", snap.phase == GamePhase::Menu);
            set_hidden(document, "game-over-screen", snap.phase != GamePhase::GameOver);

            if let Some(summary) = &snap.game_over {
                set_text(document, "final-score", &summary.final_score.to_string());
                set_hidden(document, "new-high-score", !summary.new_high_score);
                let rank = summary.rank.map(|r| format!("#{}", r)).unwrap_or_default();
                set_text(document, "leaderboard-rank", &rank);
            }
        }
    }

    fn set_text(document: &Document, id: &str, text: &str) {
        if let Some(el) = document.get_element_by_id(id) {
            if el.text_content().as_deref() != Some(text) {
                el.set_text_content(Some(text));
            }
        }
    }

    fn set_hidden(document: &Document, id: &str, hidden: bool) {
        if let Some(el) = document.get_element_by_id(id) {
            let _ = el.class_list().toggle_with_force("hidden", hidden);
        }
    }

    /// `?address=...` from the page URL, if present
    fn address_from_url(window: &web_sys::Window) -> Option<String> {
        let search = window.location().search().ok()?;
        search
            .trim_start_matches('?')
            .split('&')
            .filter_map(|pair| pair.split_once('='))
            .find(|(key, _)| *key == "address")
            .map(|(_, value)| value.to_string())
            .filter(|value| !value.is_empty())
    }

    pub fn run() -> anyhow::Result<()> {
        console_error_panic_hook::set_once();
        console_log::init_with_level(log::Level::Info)
            .map_err(|e| anyhow!("failed to init logger: {}", e))?;

        log::info!("Base Runner starting...");

        let window = web_sys::window().context("no window")?;
        let document = window.document().context("no document")?;

        // Hide loading indicator
        if let Some(loading) = document.get_element_by_id("loading") {
            let _ = loading.set_attribute("class", "hidden");
        }

        let canvas: HtmlCanvasElement = document
            .get_element_by_id("canvas")
            .context("no #canvas element")?
            .dyn_into()
            .map_err(|_| anyhow!("#canvas is not a canvas element"))?;

        let mut surface = CanvasSurface::new(canvas.clone(), WORLD_WIDTH, WORLD_HEIGHT)?;
        let dpr = window.device_pixel_ratio();
        let width = (canvas.client_width() as f64 * dpr) as u32;
        let height = (canvas.client_height() as f64 * dpr) as u32;
        surface.resize(width, height);

        let settings = match LocalStorage::new() {
            Ok(storage) => Settings::load(&storage),
            Err(e) => {
                log::warn!("Settings storage unavailable: {:#}", e);
                Settings::default()
            }
        };
        let store: Box<dyn ScoreStore> = match LocalStorage::new() {
            Ok(storage) => Box::new(StorageScoreStore::new(storage)),
            Err(e) => {
                log::warn!("Score storage unavailable, scores will not persist: {:#}", e);
                Box::new(StorageScoreStore::new(MemoryStorage::new()))
            }
        };

        let seed = js_sys::Date::now() as u64;
        let hooks = Box::new(NoHooks);
        let mut session = Session::new(Tuning::default(), &settings, seed, store, hooks)?;
        if let Some(address) = address_from_url(&window) {
            log::info!("Player address {}", address);
            session.set_player_address(Some(address));
        }
        log::info!("Game initialized with seed: {}", seed);

        let game = Rc::new(RefCell::new(Game {
            session,
            quality: settings.quality,
            surface,
            jump: JumpButton::new(),
            accumulator: 0.0,
            last_time: 0.0,
            frame_times: [0.0; 60],
            frame_index: 0,
            fps: 0,
        }));

        setup_input_handlers(&window, &canvas, game.clone());
        setup_button(&document, "start-btn", game.clone());
        setup_button(&document, "restart-btn", game.clone());

        request_animation_frame(game);

        log::info!("Base Runner running!");
        Ok(())
    }

    fn setup_input_handlers(
        window: &web_sys::Window,
        canvas: &HtmlCanvasElement,
        game: Rc<RefCell<Game>>,
    ) {
        // Keyboard
        {
            let game = game.clone();
            let closure = Closure::<dyn FnMut(_)>::new(move |event: KeyboardEvent| {
                if is_jump_key(&event.code()) {
                    event.prevent_default();
                    game.borrow_mut().jump.press();
                }
            });
            let _ = window
                .add_event_listener_with_callback("keydown", closure.as_ref().unchecked_ref());
            closure.forget();
        }
        {
            let game = game.clone();
            let closure = Closure::<dyn FnMut(_)>::new(move |event: KeyboardEvent| {
                if is_jump_key(&event.code()) {
                    game.borrow_mut().jump.release();
                }
            });
            let _ = window
                .add_event_listener_with_callback("keyup", closure.as_ref().unchecked_ref());
            closure.forget();
        }

        // Touch
        {
            let game = game.clone();
            let closure = Closure::<dyn FnMut(_)>::new(move |event: TouchEvent| {
                event.prevent_default();
                game.borrow_mut().jump.press();
            });
            let _ = canvas
                .add_event_listener_with_callback("touchstart", closure.as_ref().unchecked_ref());
            closure.forget();
        }
        {
            let game = game.clone();
            let closure = Closure::<dyn FnMut(_)>::new(move |_event: TouchEvent| {
                game.borrow_mut().jump.release();
            });
            let _ = canvas
                .add_event_listener_with_callback("touchend", closure.as_ref().unchecked_ref());
            closure.forget();
        }

        // Mouse
        {
            let game = game.clone();
            let closure = Closure::<dyn FnMut(_)>::new(move |_event: MouseEvent| {
                game.borrow_mut().jump.press();
            });
            let _ = canvas
                .add_event_listener_with_callback("mousedown", closure.as_ref().unchecked_ref());
            closure.forget();
        }
        {
            let closure = Closure::<dyn FnMut(_)>::new(move |_event: MouseEvent| {
                game.borrow_mut().jump.release();
            });
            let _ = window
                .add_event_listener_with_callback("mouseup", closure.as_ref().unchecked_ref());
            closure.forget();
        }
    }

    fn setup_button(document: &Document, id: &str, game: Rc<RefCell<Game>>) {
        if let Some(btn) = document.get_element_by_id(id) {
            let closure = Closure::<dyn FnMut(_)>::new(move |_event: MouseEvent| {
                game.borrow_mut().start();
            });
            let _ = btn.add_event_listener_with_callback("click", closure.as_ref().unchecked_ref());
            closure.forget();
        }
    }

    fn request_animation_frame(game: Rc<RefCell<Game>>) {
        let Some(window) = web_sys::window() else {
            log::error!("Window gone, stopping frame loop");
            return;
        };
        let closure = Closure::once(move |time: f64| {
            game_loop(game, time);
        });
        if let Err(e) = window.request_animation_frame(closure.as_ref().unchecked_ref()) {
            log::error!("requestAnimationFrame failed: {:?}", e);
        }
        closure.forget();
    }

    fn game_loop(game: Rc<RefCell<Game>>, time: f64) {
        match game.try_borrow_mut() {
            Ok(mut g) => {
                let dt = if g.last_time > 0.0 {
                    time - g.last_time
                } else {
                    TICK_MS
                };
                g.last_time = time;

                g.update(dt, time);
                g.render();
                if let Some(document) = web_sys::window().and_then(|w| w.document()) {
                    g.update_hud(&document);
                }
            }
            Err(e) => log::error!("Frame skipped: {}", e),
        }

        // Always schedule the next frame
        request_animation_frame(game);
    }
}

#[cfg(target_arch = "wasm32")]
#[wasm_bindgen(start)]
pub fn wasm_main() {
    if let Err(e) = wasm_game::run() {
        log::error!("Failed to start: {:#}", e);
    }
}

#[cfg(not(target_arch = "wasm32"))]
fn main() -> anyhow::Result<()> {
    env_logger::init();
    log::info!("Base Runner (native) starting...");
    log::info!("Native mode runs a headless autopilot - build for wasm32 to play");

    let seed = std::env::args()
        .nth(1)
        .map(|s| s.parse::<u64>())
        .transpose()?
        .unwrap_or(42);
    let summary = headless::run(seed, 60 * 120)?;
    println!("{}", serde_json::to_string_pretty(&summary)?);
    Ok(())
}

#[cfg(target_arch = "wasm32")]
fn main() {
    // WASM entry point is wasm_main, this is just to satisfy the compiler
}

#[cfg(not(target_arch = "wasm32"))]
mod headless {
    use base_runner::persistence::StorageScoreStore;
    use base_runner::platform::MemoryStorage;
    use base_runner::sim::{GamePhase, GameState};
    use base_runner::{NoHooks, Session, Settings, Snapshot, Tuning};

    /// How far ahead (world units, scaled by game speed) the autopilot looks
    const LOOKAHEAD: f32 = 70.0;

    /// Jump when an obstacle is about to reach the player
    fn should_jump(state: &GameState) -> bool {
        let player = state.player.bounds();
        let ground_y = state.ground_y();
        let reach = LOOKAHEAD * state.game_speed;
        state.obstacles.active_obstacles().any(|obstacle| {
            let b = obstacle.bounds(ground_y);
            let gap = b.pos.x - player.right();
            gap > 0.0 && gap < reach && b.bottom() > player.pos.y
        })
    }

    /// Play one seeded run and return the final telemetry
    pub fn run(seed: u64, max_ticks: u64) -> anyhow::Result<Snapshot> {
        let store = StorageScoreStore::new(MemoryStorage::new());
        let mut session = Session::new(
            Tuning::default(),
            &Settings::default(),
            seed,
            Box::new(store),
            Box::new(NoHooks),
        )?;
        session.start();

        for _ in 0..max_ticks {
            if session.phase() != GamePhase::Playing {
                break;
            }
            if should_jump(session.state()) {
                session.request_jump();
            }
            if let Err(e) = session.tick() {
                log::error!("Tick failed: {:#}", e);
            }
        }

        let snapshot = session.snapshot();
        log::info!(
            "Run finished after {} ticks: {:?}, score {}",
            session.state().time_ticks,
            snapshot.phase,
            snapshot.display_score
        );
        Ok(snapshot)
    }
}
