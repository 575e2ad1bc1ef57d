//! Session state and core simulation types
//!
//! Everything a frame step reads or writes lives in `World`.

use glam::Vec2;

use crate::tuning::Tuning;

/// Number of opponent palette slots
pub const COLOR_SLOTS: usize = 3;

/// Index into the active theme's opponent colors
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ColorSlot(u8);

impl ColorSlot {
    /// Slot for `index`, or None past the last palette slot
    pub fn new(index: usize) -> Option<Self> {
        (index < COLOR_SLOTS).then_some(Self(index as u8))
    }

    /// Slot for `index` modulo the slot count
    pub fn wrapping(index: usize) -> Self {
        Self((index % COLOR_SLOTS) as u8)
    }

    #[inline]
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

/// An opponent car
#[derive(Debug, Clone, PartialEq)]
pub struct Opponent {
    /// Unique, strictly increasing per session
    pub id: u64,
    /// x = lane center, y = top edge
    pub pos: Vec2,
    pub color: ColorSlot,
}

/// Result of a single frame step
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FrameOutcome {
    /// First frame: timing baseline recorded, nothing simulated
    Baseline,
    /// World advanced, keep scheduling frames
    Running,
    /// Player hit traffic; the session is over
    GameOver { final_score: u64 },
}

/// Complete state of one session
#[derive(Debug, Clone)]
pub struct World {
    /// Horizontal center of the player car
    pub player_x: f32,
    /// Live opponents in spawn order
    pub opponents: Vec<Opponent>,
    /// Simulated seconds since session start
    pub elapsed: f32,
    pub score: f32,
    /// Cosmetic stripe animation offset, always in [0, stripe pitch)
    pub road_scroll_offset: f32,
    /// Opponents spawned this session
    pub spawned: u32,
    /// Set once the player crashes
    pub final_score: Option<u64>,
    pub(crate) last_frame_ms: Option<f64>,
    pub(crate) last_spawn_ms: Option<f64>,
    pub(crate) last_opponent_id: Option<u64>,
    tuning: Tuning,
}

impl Default for World {
    fn default() -> Self {
        Self::new(Tuning::default())
    }
}

impl World {
    /// Fresh session: player centered, empty road, zero time and score
    pub fn new(tuning: Tuning) -> Self {
        Self {
            player_x: tuning.road_width / 2.0,
            opponents: Vec::new(),
            elapsed: 0.0,
            score: 0.0,
            road_scroll_offset: 0.0,
            spawned: 0,
            final_score: None,
            last_frame_ms: None,
            last_spawn_ms: None,
            last_opponent_id: None,
            tuning,
        }
    }

    #[inline]
    pub fn tuning(&self) -> &Tuning {
        &self.tuning
    }

    /// Current traffic speed (pixels/s)
    #[inline]
    pub fn speed(&self) -> f32 {
        self.tuning.speed_at(self.elapsed)
    }

    /// Score as shown on the HUD
    #[inline]
    pub fn display_score(&self) -> u64 {
        self.score.floor() as u64
    }

    #[inline]
    pub fn is_over(&self) -> bool {
        self.final_score.is_some()
    }
}
