//! Retro Racer entry point
//!
//! On web: wires the session to requestAnimationFrame, keyboard events,
//! LocalStorage and a JS theme generator. Drawing is left to the page, which
//! pulls a JSON snapshot each frame.
//!
//! On native: runs a headless attract-mode session steered by the autopilot.

#[cfg(target_arch = "wasm32")]
use wasm_bindgen::prelude::*;

#[cfg(target_arch = "wasm32")]
mod wasm_game {
    use std::cell::RefCell;

    use wasm_bindgen::JsCast;
    use wasm_bindgen::prelude::*;
    use wasm_bindgen_futures::{JsFuture, spawn_local};

    use retro_racer::App;
    use retro_racer::persistence::LocalStorage;
    use retro_racer::platform::web::AnimationLoop;
    use retro_racer::platform::{InputEvent, InputSampler, LoopControl};
    use retro_racer::sim::FrameOutcome;
    use retro_racer::theme::{GeneratorError, ThemeGenerator, ThemeRequest, generate_theme};

    /// Game instance holding all state
    struct Game {
        app: App<LocalStorage>,
        input: InputSampler,
        /// Called with (final score, high score) when a session ends
        on_game_over: Option<js_sys::Function>,
    }

    thread_local! {
        static GAME: RefCell<Option<Game>> = const { RefCell::new(None) };
        static FRAMES: RefCell<Option<AnimationLoop>> = const { RefCell::new(None) };
    }

    fn with_game<T>(f: impl FnOnce(&mut Game) -> T) -> Option<T> {
        GAME.with(|g| g.borrow_mut().as_mut().map(f))
    }

    /// Theme generator implemented by a page-supplied JS function:
    /// `(prompt: string, schemaJson: string) => Promise<string>`
    struct JsThemeGenerator {
        function: js_sys::Function,
    }

    impl ThemeGenerator for JsThemeGenerator {
        async fn generate(&self, request: &ThemeRequest) -> Result<String, GeneratorError> {
            let schema = request.schema.to_string();
            let promise = self
                .function
                .call2(
                    &JsValue::NULL,
                    &JsValue::from_str(&request.prompt),
                    &JsValue::from_str(&schema),
                )
                .map_err(|e| GeneratorError(format!("{:?}", e)))?;
            let value = JsFuture::from(js_sys::Promise::resolve(&promise))
                .await
                .map_err(|e| GeneratorError(format!("{:?}", e)))?;
            value
                .as_string()
                .ok_or_else(|| GeneratorError("generator resolved to a non-string".to_string()))
        }
    }

    fn stop_frames() {
        FRAMES.with(|f| {
            if let Some(frames) = f.borrow_mut().take() {
                frames.cancel();
            }
        });
    }

    fn game_frame(time: f64) -> LoopControl {
        let finished = with_game(|g| {
            let input = g.input.snapshot(&g.app.settings().keys);
            match g.app.frame(time, &input) {
                Some(FrameOutcome::GameOver { final_score }) => {
                    Some((final_score, g.app.high_score(), g.on_game_over.clone()))
                }
                Some(_) => None,
                // Session ended elsewhere
                None => Some((g.app.last_score(), g.app.high_score(), None)),
            }
        });

        match finished {
            Some(None) => LoopControl::Continue,
            Some(Some((score, high, callback))) => {
                // Called outside the game borrow so the page may call back in
                if let Some(callback) = callback {
                    let _ = callback.call2(
                        &JsValue::NULL,
                        &JsValue::from_f64(score as f64),
                        &JsValue::from_f64(high as f64),
                    );
                }
                LoopControl::Stop
            }
            None => LoopControl::Stop,
        }
    }

    /// Start (or restart) a session and its frame loop
    #[wasm_bindgen]
    pub fn start_game() -> Result<(), JsValue> {
        stop_frames();
        with_game(|g| g.app.start_game())
            .ok_or_else(|| JsValue::from_str("game not initialized"))?;
        let frames = AnimationLoop::start(game_frame)?;
        FRAMES.with(|f| *f.borrow_mut() = Some(frames));
        Ok(())
    }

    /// Leave the current session and stop scheduling frames
    #[wasm_bindgen]
    pub fn back_to_menu() {
        stop_frames();
        with_game(|g| g.app.back_to_menu());
    }

    /// Register `(finalScore, highScore) => void`
    #[wasm_bindgen]
    pub fn set_game_over_callback(callback: js_sys::Function) {
        with_game(|g| g.on_game_over = Some(callback));
    }

    /// JSON snapshot of the running session, or null
    #[wasm_bindgen]
    pub fn snapshot_json() -> Option<String> {
        with_game(|g| g.app.snapshot())
            .flatten()
            .and_then(|s| serde_json::to_string(&s).ok())
    }

    #[wasm_bindgen]
    pub fn high_score() -> f64 {
        with_game(|g| g.app.high_score() as f64).unwrap_or(0.0)
    }

    /// CSS custom properties of the active theme as a JSON object
    #[wasm_bindgen]
    pub fn theme_css_json() -> String {
        with_game(|g| {
            let vars: serde_json::Map<String, serde_json::Value> = g
                .app
                .theme()
                .active()
                .css_variables()
                .into_iter()
                .map(|(name, value)| (name, serde_json::Value::from(value)))
                .collect();
            serde_json::Value::Object(vars).to_string()
        })
        .unwrap_or_else(|| "{}".to_string())
    }

    /// Error message from the last theme request, if any
    #[wasm_bindgen]
    pub fn theme_error() -> Option<String> {
        with_game(|g| g.app.theme().error().map(str::to_string)).flatten()
    }

    #[wasm_bindgen]
    pub fn theme_loading() -> bool {
        with_game(|g| g.app.theme().is_loading()).unwrap_or(false)
    }

    /// Ask `generator` for a theme. Returns false if the description was
    /// rejected locally (see `theme_error`). `on_done` is called once the
    /// request settles.
    #[wasm_bindgen]
    pub fn request_theme(
        description: String,
        generator: js_sys::Function,
        on_done: Option<js_sys::Function>,
    ) -> bool {
        let Some(request) = with_game(|g| g.app.begin_theme_request(&description)).flatten()
        else {
            return false;
        };

        spawn_local(async move {
            let generator = JsThemeGenerator {
                function: generator,
            };
            let result = generate_theme(&generator, &request.description).await;
            with_game(|g| g.app.finish_theme_request(request.ticket, result));
            if let Some(on_done) = on_done {
                let _ = on_done.call0(&JsValue::NULL);
            }
        });
        true
    }

    fn setup_input_handlers() -> Result<(), JsValue> {
        let window = web_sys::window().ok_or_else(|| JsValue::from_str("no window"))?;

        // Key down
        {
            let closure = Closure::<dyn FnMut(_)>::new(move |event: web_sys::KeyboardEvent| {
                with_game(|g| g.input.process_event(&InputEvent::KeyDown(event.key())));
            });
            window.add_event_listener_with_callback("keydown", closure.as_ref().unchecked_ref())?;
            closure.forget();
        }

        // Key up
        {
            let closure = Closure::<dyn FnMut(_)>::new(move |event: web_sys::KeyboardEvent| {
                with_game(|g| g.input.process_event(&InputEvent::KeyUp(event.key())));
            });
            window.add_event_listener_with_callback("keyup", closure.as_ref().unchecked_ref())?;
            closure.forget();
        }

        // Window blur: key-up events are lost, release everything
        {
            let closure = Closure::<dyn FnMut(_)>::new(move |_event: web_sys::FocusEvent| {
                with_game(|g| g.input.process_event(&InputEvent::FocusLost));
            });
            window.add_event_listener_with_callback("blur", closure.as_ref().unchecked_ref())?;
            closure.forget();
        }

        Ok(())
    }

    pub fn run() -> Result<(), JsValue> {
        console_error_panic_hook::set_once();
        console_log::init_with_level(log::Level::Info)
            .map_err(|e| JsValue::from_str(&e.to_string()))?;
        log::info!("Retro Racer starting...");

        let seed = js_sys::Date::now() as u64;
        let game = Game {
            app: App::new(LocalStorage, seed),
            input: InputSampler::new(),
            on_game_over: None,
        };
        GAME.with(|g| *g.borrow_mut() = Some(game));

        setup_input_handlers()?;
        log::info!("Retro Racer ready");
        Ok(())
    }
}

#[cfg(target_arch = "wasm32")]
#[wasm_bindgen(start)]
pub fn wasm_main() -> Result<(), JsValue> {
    wasm_game::run()
}

#[cfg(target_arch = "wasm32")]
fn main() {
    // WASM entry point is wasm_main, this is just to satisfy the compiler
}

/// Upper bound on an attract-mode run (10 minutes at 60 Hz)
#[cfg(not(target_arch = "wasm32"))]
const MAX_DEMO_FRAMES: usize = 60 * 60 * 10;

#[cfg(not(target_arch = "wasm32"))]
fn main() {
    use std::time::{SystemTime, UNIX_EPOCH};

    use retro_racer::App;
    use retro_racer::persistence::MemoryStore;
    use retro_racer::platform::{FixedStepClock, LoopControl, LoopHandle, run_frames};
    use retro_racer::sim::{FrameOutcome, autopilot};

    env_logger::init();
    log::info!("Retro Racer (native) starting attract mode...");

    let seed = std::env::args()
        .nth(1)
        .and_then(|arg| arg.parse::<u64>().ok())
        .unwrap_or_else(|| {
            SystemTime::now()
                .duration_since(UNIX_EPOCH)
                .map(|d| d.as_millis() as u64)
                .unwrap_or(0)
        });

    let mut app = App::new(MemoryStore::new(), seed);
    app.start_game();

    let mut clock = FixedStepClock::display_rate();
    let handle = LoopHandle::new();
    let frames = run_frames(&mut clock, &handle, MAX_DEMO_FRAMES, |now| {
        let input = app.world().map(autopilot::steer).unwrap_or_default();
        match app.frame(now, &input) {
            Some(FrameOutcome::Baseline | FrameOutcome::Running) => LoopControl::Continue,
            Some(FrameOutcome::GameOver { .. }) | None => LoopControl::Stop,
        }
    });

    match app.world() {
        Some(world) => log::info!(
            "Autopilot survived {} frames ({:.1}s), score {}",
            frames,
            world.elapsed,
            world.display_score()
        ),
        None => log::info!(
            "Autopilot crashed after {} frames, score {} (high score {})",
            frames,
            app.last_score(),
            app.high_score()
        ),
    }
}
