//! Hotkey bindings and debounce for operator actions.
//!
//! Each [`Action`] is bound to a key name and a debounce delay. The input
//! listener owns a [`Debouncer`] and only forwards an action once its delay
//! has elapsed since the last accepted trigger, so the edit session only ever
//! sees already-debounced tokens.

use std::collections::HashMap;
use std::time::{Duration, Instant};

use serde::{Deserialize, Serialize};

/// Discrete operator actions delivered to the batch controller.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Action {
    /// Finalize the current image and move to the next one
    NextImage,
    /// Undo the most recent rectangle
    Undo,
    /// Stop the batch, keeping images already finalized
    Terminate,
}

impl Action {
    /// Get the display name for this action.
    pub fn name(&self) -> &'static str {
        match self {
            Action::NextImage => "Next image",
            Action::Undo => "Undo",
            Action::Terminate => "Terminate",
        }
    }

    /// Get all actions.
    pub fn all() -> &'static [Action] {
        &[Action::NextImage, Action::Undo, Action::Terminate]
    }
}

/// A key name bound to an action, with its debounce delay.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct KeyBinding {
    /// Key name as typed on the input line (e.g. `d`, `ctrl+z`, `esc`)
    pub key: String,
    /// Minimum time between two accepted triggers, in milliseconds
    pub delay_ms: u64,
}

impl KeyBinding {
    /// Create a binding.
    pub fn new(key: impl Into<String>, delay_ms: u64) -> Self {
        Self {
            key: key.into(),
            delay_ms,
        }
    }

    /// Debounce delay as a duration.
    pub fn delay(&self) -> Duration {
        Duration::from_millis(self.delay_ms)
    }

    fn matches(&self, key: &str) -> bool {
        self.key.trim().eq_ignore_ascii_case(key.trim())
    }
}

/// Keybinding configuration for the application.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct KeyBindings {
    /// Hotkey for moving to the next image
    pub next_image: KeyBinding,
    /// Hotkey for undo
    pub undo: KeyBinding,
    /// Hotkey for terminating the batch
    pub terminate: KeyBinding,
}

impl Default for KeyBindings {
    fn default() -> Self {
        Self {
            next_image: KeyBinding::new("d", 125),
            undo: KeyBinding::new("ctrl+z", 125),
            terminate: KeyBinding::new("esc", 1000),
        }
    }
}

impl KeyBindings {
    /// Get the action bound to a key name, if any. Matching ignores case.
    pub fn action_for_key(&self, key: &str) -> Option<Action> {
        Action::all()
            .iter()
            .copied()
            .find(|action| self.binding(*action).matches(key))
    }

    /// Get the binding for an action.
    pub fn binding(&self, action: Action) -> &KeyBinding {
        match action {
            Action::NextImage => &self.next_image,
            Action::Undo => &self.undo,
            Action::Terminate => &self.terminate,
        }
    }

    /// Check whether two actions share a key.
    /// Returns the first conflicting pair, if any.
    pub fn key_conflict(&self) -> Option<(Action, Action)> {
        let actions = Action::all();
        for (i, a) in actions.iter().enumerate() {
            for b in &actions[i + 1..] {
                if self.binding(*a).matches(&self.binding(*b).key) {
                    return Some((*a, *b));
                }
            }
        }
        None
    }
}

/// Tracks the last accepted trigger of every action.
#[derive(Debug, Clone)]
pub struct Debouncer {
    delays: HashMap<Action, Duration>,
    last_trigger: HashMap<Action, Instant>,
}

impl Debouncer {
    /// Create a debouncer using the delays of `bindings`.
    pub fn new(bindings: &KeyBindings) -> Self {
        let delays = Action::all()
            .iter()
            .map(|action| (*action, bindings.binding(*action).delay()))
            .collect();
        Self {
            delays,
            last_trigger: HashMap::new(),
        }
    }

    /// Decide whether a trigger of `action` at `now` should be forwarded.
    ///
    /// The first trigger is always accepted. Later ones are accepted once
    /// more than the action's delay has passed since the last accepted one.
    pub fn accept(&mut self, action: Action, now: Instant) -> bool {
        let delay = self.delays.get(&action).copied().unwrap_or_default();
        let too_soon = self
            .last_trigger
            .get(&action)
            .is_some_and(|last| now.saturating_duration_since(*last) <= delay);
        if too_soon {
            log::trace!("Debounced {:?}", action);
            return false;
        }
        self.last_trigger.insert(action, now);
        true
    }
}
