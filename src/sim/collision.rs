//! Collision detection between the player car and traffic
//!
//! Cars are axis-aligned rectangles. The player rectangle is anchored by its
//! horizontal center and a fixed top edge; opponents by lane center and top edge.

use glam::Vec2;

use super::state::Opponent;
use crate::tuning::Tuning;

/// Axis-aligned rectangle (top-left origin, y grows downward)
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Rect {
    /// Top-left corner
    pub min: Vec2,
    pub size: Vec2,
}

impl Rect {
    /// Rectangle from a horizontal center and a top edge
    pub fn from_center_top(center_x: f32, top: f32, width: f32, height: f32) -> Self {
        Self {
            min: Vec2::new(center_x - width / 2.0, top),
            size: Vec2::new(width, height),
        }
    }

    #[inline]
    pub fn center_x(&self) -> f32 {
        self.min.x + self.size.x / 2.0
    }

    #[inline]
    pub fn top(&self) -> f32 {
        self.min.y
    }

    #[inline]
    pub fn bottom(&self) -> f32 {
        self.min.y + self.size.y
    }

    /// Horizontal overlap: centers closer than the sum of half-widths
    pub fn overlaps_x(&self, other: &Rect) -> bool {
        (other.center_x() - self.center_x()).abs() < (self.size.x + other.size.x) / 2.0
    }

    /// Vertical overlap: open spans intersect (touching edges do not count)
    pub fn overlaps_y(&self, other: &Rect) -> bool {
        self.top() < other.bottom() && self.bottom() > other.top()
    }

    pub fn overlaps(&self, other: &Rect) -> bool {
        self.overlaps_x(other) && self.overlaps_y(other)
    }
}

/// The player's car at horizontal center `player_x`
pub fn player_rect(tuning: &Tuning, player_x: f32) -> Rect {
    Rect::from_center_top(
        player_x,
        tuning.player_y,
        tuning.player_width,
        tuning.player_height,
    )
}

/// An opponent car at its current position
pub fn opponent_rect(tuning: &Tuning, opponent: &Opponent) -> Rect {
    Rect::from_center_top(
        opponent.pos.x,
        opponent.pos.y,
        tuning.opponent_width,
        tuning.opponent_height,
    )
}

/// Check whether the player car overlaps an opponent
pub fn cars_collide(tuning: &Tuning, player_x: f32, opponent: &Opponent) -> bool {
    player_rect(tuning, player_x).overlaps(&opponent_rect(tuning, opponent))
}

/// First opponent (in spawn order) the player is touching
pub fn first_collision<'a>(
    tuning: &Tuning,
    player_x: f32,
    opponents: &'a [Opponent],
) -> Option<&'a Opponent> {
    let player = player_rect(tuning, player_x);
    opponents
        .iter()
        .find(|op| player.overlaps(&opponent_rect(tuning, op)))
}
