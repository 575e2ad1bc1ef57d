//! Platform abstraction layer
//!
//! Handles browser/native differences for:
//! - Frame timing and loop scheduling
//! - Input events
//! - Storage (see `persistence`)

pub mod clock;
pub mod input;
#[cfg(target_arch = "wasm32")]
pub mod web;

pub use clock::{
    FixedStepClock, FrameClock, LoopControl, LoopHandle, OwnedStep, StepRef, run_frames,
};
#[cfg(not(target_arch = "wasm32"))]
pub use clock::SystemClock;
pub use input::{InputEvent, InputSampler};
