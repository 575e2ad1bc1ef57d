//! Keyboard input sampling
//!
//! Key events arrive between frames and only update the set of held keys.
//! Each frame reads one snapshot; presses that start and end between two
//! frames are not seen.

use std::collections::HashSet;

use crate::settings::{KeyBindings, Steer};
use crate::sim::TickInput;

/// Platform-independent input events
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InputEvent {
    KeyDown(String),
    KeyUp(String),
    /// Window lost focus; key-up events will not arrive
    FocusLost,
}

/// Currently held keys
#[derive(Debug, Clone, Default)]
pub struct InputSampler {
    held: HashSet<String>,
}

impl InputSampler {
    pub fn new() -> Self {
        Self::default()
    }

    /// Process an input event and update state
    pub fn process_event(&mut self, event: &InputEvent) {
        match event {
            InputEvent::KeyDown(key) => {
                self.held.insert(key.clone());
            }
            InputEvent::KeyUp(key) => {
                self.held.remove(key.as_str());
            }
            InputEvent::FocusLost => self.held.clear(),
        }
    }

    pub fn is_held(&self, key: &str) -> bool {
        self.held.contains(key)
    }

    /// Steering state for the coming frame
    pub fn snapshot(&self, bindings: &KeyBindings) -> TickInput {
        let mut input = TickInput::default();
        for key in &self.held {
            match bindings.control_for(key) {
                Some(Steer::Left) => input.left = true,
                Some(Steer::Right) => input.right = true,
                None => {}
            }
        }
        input
    }
}
