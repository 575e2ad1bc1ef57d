//! Data-driven game balance
//!
//! Every gameplay constant lives in `Tuning` so a session can be configured
//! from persisted settings. Defaults come from `crate::consts`.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::consts::*;

/// Rejected tuning values
#[derive(Debug, Clone, PartialEq, Error)]
pub enum TuningError {
    #[error("{field} must be a finite number, got {value}")]
    NotFinite { field: &'static str, value: f64 },
    #[error("{field} must be positive, got {value}")]
    NotPositive { field: &'static str, value: f64 },
    #[error("road width {road} cannot fit a {car}px wide car")]
    RoadTooNarrow { road: f32, car: f32 },
    #[error("lane fraction {0} is outside 0..=1")]
    LaneOutOfRange(f32),
}

/// Gameplay constants for one session
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Tuning {
    pub road_width: f32,
    pub road_height: f32,
    pub player_width: f32,
    pub player_height: f32,
    /// Top edge of the player car (fixed)
    pub player_y: f32,
    pub turn_speed: f32,
    pub opponent_width: f32,
    pub opponent_height: f32,
    pub base_speed: f32,
    pub speed_ramp: f32,
    pub spawn_interval_ms: f64,
    pub lane_fractions: [f32; 3],
    pub stripe_height: f32,
    pub stripe_gap: f32,
    pub score_divisor: f32,
}

impl Default for Tuning {
    fn default() -> Self {
        Self {
            road_width: ROAD_WIDTH,
            road_height: ROAD_HEIGHT,
            player_width: PLAYER_CAR_WIDTH,
            player_height: PLAYER_CAR_HEIGHT,
            player_y: PLAYER_Y,
            turn_speed: PLAYER_TURN_SPEED,
            opponent_width: OPPONENT_CAR_WIDTH,
            opponent_height: OPPONENT_CAR_HEIGHT,
            base_speed: BASE_SPEED,
            speed_ramp: SPEED_RAMP,
            spawn_interval_ms: SPAWN_INTERVAL_MS,
            lane_fractions: LANE_FRACTIONS,
            stripe_height: STRIPE_HEIGHT,
            stripe_gap: STRIPE_GAP,
            score_divisor: SCORE_DIVISOR,
        }
    }
}

impl Tuning {
    /// Traffic speed after `elapsed` seconds (linear ramp)
    #[inline]
    pub fn speed_at(&self, elapsed: f32) -> f32 {
        self.base_speed + elapsed * self.speed_ramp
    }

    /// Lowest allowed player center
    #[inline]
    pub fn min_player_x(&self) -> f32 {
        self.player_width / 2.0
    }

    /// Highest allowed player center
    #[inline]
    pub fn max_player_x(&self) -> f32 {
        self.road_width - self.player_width / 2.0
    }

    /// Length of one stripe + gap, the wrap period of the road scroll
    #[inline]
    pub fn stripe_pitch(&self) -> f32 {
        self.stripe_height + self.stripe_gap
    }

    /// Check that the values describe a playable road
    pub fn validate(&self) -> Result<(), TuningError> {
        let positive: [(&'static str, f64); 12] = [
            ("roadWidth", self.road_width as f64),
            ("roadHeight", self.road_height as f64),
            ("playerWidth", self.player_width as f64),
            ("playerHeight", self.player_height as f64),
            ("turnSpeed", self.turn_speed as f64),
            ("opponentWidth", self.opponent_width as f64),
            ("opponentHeight", self.opponent_height as f64),
            ("baseSpeed", self.base_speed as f64),
            ("speedRamp", self.speed_ramp as f64),
            ("spawnIntervalMs", self.spawn_interval_ms),
            ("stripeHeight", self.stripe_height as f64),
            ("scoreDivisor", self.score_divisor as f64),
        ];
        let other = [
            ("playerY", self.player_y as f64),
            ("stripeGap", self.stripe_gap as f64),
        ];
        let lanes = self.lane_fractions.map(|f| ("laneFractions", f as f64));

        // serde_json reads out-of-range f32 values as infinity
        for &(field, value) in positive.iter().chain(&other).chain(&lanes) {
            if !value.is_finite() {
                return Err(TuningError::NotFinite { field, value });
            }
        }
        for (field, value) in positive {
            if value <= 0.0 {
                return Err(TuningError::NotPositive { field, value });
            }
        }
        if self.stripe_gap < 0.0 {
            return Err(TuningError::NotPositive {
                field: "stripeGap",
                value: self.stripe_gap as f64,
            });
        }
        if self.road_width < self.player_width {
            return Err(TuningError::RoadTooNarrow {
                road: self.road_width,
                car: self.player_width,
            });
        }
        if let Some(&bad) = self
            .lane_fractions
            .iter()
            .find(|f| !(0.0..=1.0).contains(*f))
        {
            return Err(TuningError::LaneOutOfRange(bad));
        }
        Ok(())
    }
}
