//! Application shell around a racing session
//!
//! Owns everything that outlives a single `World`: screen, high score,
//! settings, theme and the traffic RNG.

use rand::SeedableRng;
use rand_pcg::Pcg32;
use serde::Serialize;

use crate::highscores::HighScore;
use crate::persistence::KeyValueStore;
use crate::settings::Settings;
use crate::sim::{FrameOutcome, TickInput, World, tick};
use crate::theme::{Theme, ThemeError, ThemeRequest, ThemeState};

/// Which screen is showing
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Screen {
    MainMenu,
    Playing,
    GameOver,
}

/// An opponent as the presentation layer draws it
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OpponentView {
    pub id: u64,
    pub x: f32,
    pub y: f32,
    pub color: String,
}

/// Read-only view of the running session for one rendered frame
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Snapshot {
    pub player_x: f32,
    pub player_y: f32,
    pub player_color: String,
    pub opponents: Vec<OpponentView>,
    pub road_scroll_offset: f32,
    pub score: u64,
}

/// The game application
pub struct App<S: KeyValueStore> {
    store: S,
    settings: Settings,
    high_score: HighScore,
    theme: ThemeState,
    rng: Pcg32,
    screen: Screen,
    world: Option<World>,
    last_score: u64,
}

impl<S: KeyValueStore> App<S> {
    /// Load settings and high score from `store`. A seed in the settings
    /// overrides `seed`.
    pub fn new(store: S, seed: u64) -> Self {
        let settings = Settings::load(&store);
        let high_score = HighScore::load(&store);
        let seed = settings.seed.unwrap_or(seed);
        log::info!("Traffic seed: {}", seed);

        Self {
            store,
            settings,
            high_score,
            theme: ThemeState::default(),
            rng: Pcg32::seed_from_u64(seed),
            screen: Screen::MainMenu,
            world: None,
            last_score: 0,
        }
    }

    #[inline]
    pub fn screen(&self) -> Screen {
        self.screen
    }

    /// Running session, if any
    pub fn world(&self) -> Option<&World> {
        self.world.as_ref()
    }

    pub fn high_score(&self) -> u64 {
        self.high_score.best()
    }

    /// Final score of the most recent session
    pub fn last_score(&self) -> u64 {
        self.last_score
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    pub fn theme(&self) -> &ThemeState {
        &self.theme
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    /// Begin a new session from any screen
    pub fn start_game(&mut self) {
        self.world = Some(World::new(self.settings.tuning.clone()));
        self.last_score = 0;
        self.screen = Screen::Playing;
        log::info!("Session started");
    }

    pub fn play_again(&mut self) {
        self.start_game();
    }

    /// Discard any session and show the menu
    pub fn back_to_menu(&mut self) {
        if self.world.take().is_some() {
            log::info!("Session abandoned");
        }
        self.screen = Screen::MainMenu;
    }

    /// Run one frame of the current session. Returns None when not playing.
    pub fn frame(&mut self, now_ms: f64, input: &TickInput) -> Option<FrameOutcome> {
        if self.screen != Screen::Playing {
            return None;
        }
        let world = self.world.as_mut()?;
        let outcome = tick(world, input, now_ms, &mut self.rng);

        if let FrameOutcome::GameOver { final_score } = outcome {
            self.end_session(final_score);
        }
        Some(outcome)
    }

    fn end_session(&mut self, final_score: u64) {
        if let Some(world) = self.world.take() {
            log::info!(
                "Game over: score {} after {:.1}s, {} opponents spawned",
                final_score,
                world.elapsed,
                world.spawned
            );
        }
        if let Err(e) = self.high_score.record(final_score, &mut self.store) {
            log::warn!("High score not persisted: {}", e);
        }
        self.last_score = final_score;
        self.screen = Screen::GameOver;
    }

    /// Start a theme request; None if the description was rejected locally
    pub fn begin_theme_request(&mut self, description: &str) -> Option<ThemeRequest> {
        self.theme.begin(description)
    }

    /// Apply the outcome of a theme request. Returns false if a newer
    /// request superseded it.
    pub fn finish_theme_request(
        &mut self,
        ticket: u64,
        result: Result<Theme, ThemeError>,
    ) -> bool {
        self.theme.finish(ticket, result)
    }

    /// What the presentation layer needs to draw the current frame
    pub fn snapshot(&self) -> Option<Snapshot> {
        let world = self.world.as_ref()?;
        let theme = self.theme.active();
        Some(Snapshot {
            player_x: world.player_x,
            player_y: world.tuning().player_y,
            player_color: theme.player_car_color.clone(),
            opponents: world
                .opponents
                .iter()
                .map(|op| OpponentView {
                    id: op.id,
                    x: op.pos.x,
                    y: op.pos.y,
                    color: theme.opponent_color(op.color).unwrap_or_default().to_string(),
                })
                .collect(),
            road_scroll_offset: world.road_scroll_offset,
            score: world.display_score(),
        })
    }
}
