//! Per-frame simulation step
//!
//! Advances the world by the wall-clock time since the previous frame.

use rand::Rng;

use super::collision::first_collision;
use super::spawn::spawn_opponent;
use super::state::{FrameOutcome, World};

/// Steering controls held at the start of a frame
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TickInput {
    pub left: bool,
    pub right: bool,
}

impl TickInput {
    /// Net steering direction: -1 left, +1 right, 0 for none or both
    #[inline]
    pub fn direction(&self) -> f32 {
        (self.right as i8 - self.left as i8) as f32
    }
}

/// Advance the world by one frame.
///
/// `now_ms` is the frame timestamp from a monotonic clock. The first call of
/// a session only records the baseline. Once the player has crashed the world
/// is frozen and every further call reports the same game over.
pub fn tick<R: Rng + ?Sized>(
    world: &mut World,
    input: &TickInput,
    now_ms: f64,
    rng: &mut R,
) -> FrameOutcome {
    if let Some(final_score) = world.final_score {
        return FrameOutcome::GameOver { final_score };
    }

    let Some(last_frame_ms) = world.last_frame_ms else {
        world.last_frame_ms = Some(now_ms);
        return FrameOutcome::Baseline;
    };
    let dt = ((now_ms - last_frame_ms).max(0.0) / 1000.0) as f32;
    world.last_frame_ms = Some(now_ms);

    world.elapsed += dt;
    let tuning = world.tuning().clone();
    let speed = tuning.speed_at(world.elapsed);
    let travel = speed * dt;

    // Steering
    world.player_x = (world.player_x + input.direction() * tuning.turn_speed * dt)
        .clamp(tuning.min_player_x(), tuning.max_player_x());

    world.road_scroll_offset = (world.road_scroll_offset + travel) % tuning.stripe_pitch();

    // Traffic moves toward the player; cars past the bottom edge leave the road
    for opponent in &mut world.opponents {
        opponent.pos.y += travel;
    }
    world.opponents.retain(|op| op.pos.y < tuning.road_height);

    world.score += travel / tuning.score_divisor;

    let spawn_due = world
        .last_spawn_ms
        .is_none_or(|last| now_ms - last > tuning.spawn_interval_ms);
    if spawn_due {
        world.last_spawn_ms = Some(now_ms);
        let opponent = spawn_opponent(&tuning, rng, now_ms, world.last_opponent_id);
        world.last_opponent_id = Some(opponent.id);
        world.spawned += 1;
        log::trace!(
            "Spawned opponent {} at x={} (speed {:.1})",
            opponent.id,
            opponent.pos.x,
            speed
        );
        world.opponents.push(opponent);
    }

    if let Some(hit) = first_collision(&tuning, world.player_x, &world.opponents) {
        let final_score = world.display_score();
        log::debug!(
            "Collision with opponent {} after {:.2}s, final score {}",
            hit.id,
            world.elapsed,
            final_score
        );
        world.final_score = Some(final_score);
        return FrameOutcome::GameOver { final_score };
    }

    FrameOutcome::Running
}
