//! Attract-mode autopilot
//!
//! Picks the lane whose nearest oncoming car is farthest away and steers
//! toward it. Used by the headless demo; players never see it in a session.

use super::spawn::lane_centers;
use super::state::World;
use super::tick::TickInput;

/// How close (pixels) the car must be to the target lane center to stop steering
const LANE_DEADZONE: f32 = 4.0;

/// Seconds of travel ahead of the player that count as danger
const LOOKAHEAD_SECS: f32 = 2.5;

/// Gap (pixels) between the player's front bumper and the nearest oncoming
/// car in `lane_x`, or None when the lane is clear within the lookahead.
fn lane_gap(world: &World, lane_x: f32) -> Option<f32> {
    let tuning = world.tuning();
    let reach = (tuning.player_width + tuning.opponent_width) / 2.0;
    let lookahead = world.speed() * LOOKAHEAD_SECS;
    let player_bottom = tuning.player_y + tuning.player_height;

    world
        .opponents
        .iter()
        .filter(|op| (op.pos.x - lane_x).abs() < reach)
        // Still ahead of (or beside) the player
        .filter(|op| op.pos.y < player_bottom)
        .map(|op| tuning.player_y - (op.pos.y + tuning.opponent_height))
        .filter(|gap| *gap < lookahead)
        .min_by(|a, b| a.partial_cmp(b).unwrap_or(std::cmp::Ordering::Equal))
}

/// Choose steering for the next frame
pub fn steer(world: &World) -> TickInput {
    let lanes = lane_centers(world.tuning());
    let x = world.player_x;

    // Rank lanes: clear lanes first, then by the largest gap, then by distance
    let target = lanes
        .iter()
        .map(|&lane| (lane, lane_gap(world, lane).unwrap_or(f32::INFINITY)))
        .max_by(|(lane_a, gap_a), (lane_b, gap_b)| {
            gap_a
                .partial_cmp(gap_b)
                .unwrap_or(std::cmp::Ordering::Equal)
                .then_with(|| {
                    (lane_b - x)
                        .abs()
                        .partial_cmp(&(lane_a - x).abs())
                        .unwrap_or(std::cmp::Ordering::Equal)
                })
        })
        .map(|(lane, _)| lane)
        .unwrap_or(x);

    let delta = target - x;
    TickInput {
        left: delta < -LANE_DEADZONE,
        right: delta > LANE_DEADZONE,
    }
}
