//! Frame-driven simulation module
//!
//! All gameplay logic lives here. This module must stay platform-free:
//! - Time arrives as frame timestamps from the caller
//! - Randomness comes from a caller-supplied RNG
//! - Stable iteration order (spawn order)
//! - No rendering or platform dependencies

pub mod autopilot;
pub mod collision;
pub mod spawn;
pub mod state;
pub mod tick;

pub use collision::{Rect, cars_collide, first_collision, opponent_rect, player_rect};
pub use spawn::{lane_centers, spawn_opponent};
pub use state::{COLOR_SLOTS, ColorSlot, FrameOutcome, Opponent, World};
pub use tick::{TickInput, tick};
