//! Frame timing and cancellable frame loops
//!
//! A loop schedules the next step only after the current one returns, and a
//! cancelled `LoopHandle` guarantees no further step runs.

use std::cell::{Cell, RefCell};
use std::rc::{Rc, Weak};
#[cfg(not(target_arch = "wasm32"))]
use std::time::Instant;

/// Source of frame timestamps in milliseconds
pub trait FrameClock {
    fn now_ms(&mut self) -> f64;
}

/// Deterministic clock advancing a fixed step per reading
#[derive(Debug, Clone)]
pub struct FixedStepClock {
    next_ms: f64,
    step_ms: f64,
}

impl FixedStepClock {
    /// First reading returns `start_ms`
    pub fn new(start_ms: f64, step_ms: f64) -> Self {
        Self {
            next_ms: start_ms,
            step_ms,
        }
    }

    /// 60 Hz display refresh starting at 0
    pub fn display_rate() -> Self {
        Self::new(0.0, 1000.0 / 60.0)
    }
}

impl FrameClock for FixedStepClock {
    fn now_ms(&mut self) -> f64 {
        let now = self.next_ms;
        self.next_ms += self.step_ms;
        now
    }
}

/// Monotonic wall clock measured from creation (native only; the browser
/// hands timestamps to the animation frame callback)
#[cfg(not(target_arch = "wasm32"))]
#[derive(Debug, Clone)]
pub struct SystemClock {
    origin: Instant,
}

#[cfg(not(target_arch = "wasm32"))]
impl Default for SystemClock {
    fn default() -> Self {
        Self {
            origin: Instant::now(),
        }
    }
}

#[cfg(not(target_arch = "wasm32"))]
impl FrameClock for SystemClock {
    fn now_ms(&mut self) -> f64 {
        self.origin.elapsed().as_secs_f64() * 1000.0
    }
}

/// What a frame step wants next
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoopControl {
    Continue,
    Stop,
}

/// Shared cancellation flag for a running loop
#[derive(Debug, Clone, Default)]
pub struct LoopHandle {
    cancelled: Rc<Cell<bool>>,
}

impl LoopHandle {
    pub fn new() -> Self {
        Self::default()
    }

    /// Stop the loop; takes effect before the next step
    pub fn cancel(&self) {
        self.cancelled.set(true);
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancelled.get()
    }
}

struct StepState<F> {
    step: F,
    handle: LoopHandle,
}

/// A frame step owned by a loop.
///
/// Platform callbacks hold a `StepRef` instead of the step itself, so
/// dropping the owner frees the step and everything it captured even while
/// a frame request is still pending.
pub struct OwnedStep<F> {
    inner: Rc<RefCell<StepState<F>>>,
    handle: LoopHandle,
}

/// Weak reference to an `OwnedStep`, held by the platform callback
pub struct StepRef<F> {
    inner: Weak<RefCell<StepState<F>>>,
}

impl<F> Clone for StepRef<F> {
    fn clone(&self) -> Self {
        Self {
            inner: self.inner.clone(),
        }
    }
}

impl<F: FnMut(f64) -> LoopControl> OwnedStep<F> {
    pub fn new(step: F) -> Self {
        let handle = LoopHandle::new();
        Self {
            inner: Rc::new(RefCell::new(StepState {
                step,
                handle: handle.clone(),
            })),
            handle,
        }
    }

    pub fn handle(&self) -> LoopHandle {
        self.handle.clone()
    }

    pub fn downgrade(&self) -> StepRef<F> {
        StepRef {
            inner: Rc::downgrade(&self.inner),
        }
    }
}

impl<F> Drop for OwnedStep<F> {
    fn drop(&mut self) {
        self.handle.cancel();
    }
}

impl<F: FnMut(f64) -> LoopControl> StepRef<F> {
    /// Run one frame. Returns true if another frame should be requested.
    ///
    /// Does nothing once the owner is gone or the loop is cancelled.
    pub fn run(&self, now_ms: f64) -> bool {
        let Some(inner) = self.inner.upgrade() else {
            return false;
        };
        let mut state = inner.borrow_mut();
        if state.handle.is_cancelled() {
            return false;
        }
        if (state.step)(now_ms) == LoopControl::Stop {
            state.handle.cancel();
            return false;
        }
        // The step itself may have cancelled the loop
        !state.handle.is_cancelled()
    }

    /// Whether the owning loop still exists
    pub fn is_live(&self) -> bool {
        self.inner.strong_count() > 0
    }
}

/// Run frame steps back to back until a step stops, the handle is cancelled,
/// or `max_frames` steps have run. Returns the number of steps run.
pub fn run_frames<C, F>(
    clock: &mut C,
    handle: &LoopHandle,
    max_frames: usize,
    mut step: F,
) -> usize
where
    C: FrameClock + ?Sized,
    F: FnMut(f64) -> LoopControl,
{
    let mut frames = 0;
    while frames < max_frames && !handle.is_cancelled() {
        let now = clock.now_ms();
        frames += 1;
        if step(now) == LoopControl::Stop {
            break;
        }
    }
    frames
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fixed_step_clock() {
        let mut clock = FixedStepClock::new(100.0, 16.0);
        assert_eq!(clock.now_ms(), 100.0);
        assert_eq!(clock.now_ms(), 116.0);
        assert_eq!(clock.now_ms(), 132.0);
    }

    #[cfg(not(target_arch = "wasm32"))]
    #[test]
    fn test_system_clock_monotonic() {
        let mut clock = SystemClock::default();
        let a = clock.now_ms();
        let b = clock.now_ms();
        assert!(b >= a);
    }

    #[test]
    fn test_run_frames_until_stop() {
        let mut clock = FixedStepClock::new(0.0, 10.0);
        let handle = LoopHandle::new();
        let mut seen = Vec::new();
        let frames = run_frames(&mut clock, &handle, 100, |now| {
            seen.push(now);
            if now >= 30.0 {
                LoopControl::Stop
            } else {
                LoopControl::Continue
            }
        });
        assert_eq!(frames, 4);
        assert_eq!(seen, vec![0.0, 10.0, 20.0, 30.0]);
    }

    #[test]
    fn test_cancel_stops_further_frames() {
        let mut clock = FixedStepClock::display_rate();
        let handle = LoopHandle::new();
        let inner = handle.clone();
        let mut calls = 0;
        let frames = run_frames(&mut clock, &handle, 100, |_| {
            calls += 1;
            if calls == 3 {
                inner.cancel();
            }
            LoopControl::Continue
        });
        assert_eq!(frames, 3);
        assert_eq!(calls, 3);
        assert!(handle.is_cancelled());
    }

    #[test]
    fn test_cancelled_before_start() {
        let mut clock = FixedStepClock::display_rate();
        let handle = LoopHandle::new();
        handle.cancel();
        let frames = run_frames(&mut clock, &handle, 100, |_| LoopControl::Continue);
        assert_eq!(frames, 0);
    }

    #[test]
    fn test_owned_step_runs_until_stop() {
        let mut calls = 0;
        let owned = OwnedStep::new(move |_| {
            calls += 1;
            if calls == 2 {
                LoopControl::Stop
            } else {
                LoopControl::Continue
            }
        });
        let step = owned.downgrade();
        assert!(step.run(0.0));
        assert!(!step.run(16.0));
        assert!(owned.handle().is_cancelled());
        assert!(!step.run(32.0));
    }

    #[test]
    fn test_dropping_owner_frees_step() {
        let captured = Rc::new(Cell::new(0));
        let counter = captured.clone();
        let owned = OwnedStep::new(move |_| {
            counter.set(counter.get() + 1);
            LoopControl::Continue
        });
        let step = owned.downgrade();
        let handle = owned.handle();
        assert!(step.run(0.0));
        assert_eq!(Rc::strong_count(&captured), 2);

        drop(owned);
        // The step and its captures are gone; a late frame does nothing
        assert_eq!(Rc::strong_count(&captured), 1);
        assert!(!step.is_live());
        assert!(!step.run(16.0));
        assert_eq!(captured.get(), 1);
        assert!(handle.is_cancelled());
    }

    #[test]
    fn test_cancel_from_handle() {
        let owned = OwnedStep::new(|_| LoopControl::Continue);
        let step = owned.downgrade();
        owned.handle().cancel();
        assert!(!step.run(0.0));
    }

    #[test]
    fn test_max_frames() {
        let mut clock = FixedStepClock::display_rate();
        let handle = LoopHandle::new();
        assert_eq!(run_frames(&mut clock, &handle, 5, |_| LoopControl::Continue), 5);
    }
}
