//! Retro Racer - A lane-dodging arcade racer
//!
//! Core modules:
//! - `sim`: Frame-driven simulation (player, traffic, collisions, score)
//! - `platform`: Input sampling and frame scheduling (browser/native)
//! - `persistence`: Key-value storage (LocalStorage on web)
//! - `theme`: Color palettes and AI theme ingestion
//! - `tuning`: Data-driven game balance
//! - `app`: Menu / playing / game-over shell around a session

pub mod app;
pub mod highscores;
pub mod persistence;
pub mod platform;
pub mod settings;
pub mod sim;
pub mod theme;
pub mod tuning;

pub use app::{App, Screen};
pub use highscores::HighScore;
pub use settings::{KeyBindings, Settings};
pub use theme::{Theme, ThemeError};
pub use tuning::Tuning;

/// Default game configuration constants (see `Tuning` for the runtime copy)
pub mod consts {
    /// Road (playfield) dimensions in pixels
    pub const ROAD_WIDTH: f32 = 384.0;
    pub const ROAD_HEIGHT: f32 = 640.0;

    /// Player car
    pub const PLAYER_CAR_WIDTH: f32 = 40.0;
    pub const PLAYER_CAR_HEIGHT: f32 = 80.0;
    /// Top edge of the player car, 20px above the bottom of the road
    pub const PLAYER_Y: f32 = ROAD_HEIGHT - PLAYER_CAR_HEIGHT - 20.0;
    /// Horizontal steering speed (pixels/s)
    pub const PLAYER_TURN_SPEED: f32 = 300.0;

    /// Opponent cars
    pub const OPPONENT_CAR_WIDTH: f32 = 40.0;
    pub const OPPONENT_CAR_HEIGHT: f32 = 80.0;
    /// Traffic speed at session start (pixels/s)
    pub const BASE_SPEED: f32 = 150.0;
    /// Traffic speed gained per second survived (pixels/s²)
    pub const SPEED_RAMP: f32 = 2.0;
    /// Minimum wall-clock time between spawns
    pub const SPAWN_INTERVAL_MS: f64 = 1200.0;
    /// Lane centers as fractions of the road width
    pub const LANE_FRACTIONS: [f32; 3] = [0.25, 0.5, 0.75];

    /// Road stripes (cosmetic)
    pub const STRIPE_HEIGHT: f32 = 40.0;
    pub const STRIPE_GAP: f32 = 20.0;

    /// Distance-to-score divisor
    pub const SCORE_DIVISOR: f32 = 100.0;
}
