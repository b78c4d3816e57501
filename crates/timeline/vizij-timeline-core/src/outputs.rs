//! Output contracts from the core engine.
//!
//! Outputs carry the resolved value of every target that received at least
//! one contribution this tick, and a separate list of semantic events.
//! Adapters apply changes to the host and transport events.

use serde::{Deserialize, Serialize};

use crate::ids::{ClipId, TargetId, TimerId};
use crate::value::Value;

/// One resolved target value this tick.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Change {
    pub target: TargetId,
    pub key: String, // target name
    pub value: Value,
}

/// Discrete signals emitted during a tick.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[non_exhaustive]
pub enum TimelineEvent {
    InstanceStarted { timer: TimerId },
    InstanceStopped { timer: TimerId },
    TimerLooped { timer: TimerId, loop_count: u32 },
    TimerPaused { timer: TimerId },
    CompositeActivated { timer: TimerId },
    CompositeDeactivated { timer: TimerId },
    ClipActivated { clip: ClipId },
    ClipDeactivated { clip: ClipId },
}

/// Outputs returned by Engine::update().
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Outputs {
    #[serde(default)]
    pub changes: Vec<Change>,
    #[serde(default)]
    pub events: Vec<TimelineEvent>,
    /// Events beyond the per-tick cap.
    #[serde(default)]
    pub dropped_events: usize,
    #[serde(skip, default = "uncapped")]
    event_cap: usize,
}

fn uncapped() -> usize {
    usize::MAX
}

impl Default for Outputs {
    fn default() -> Self {
        Self {
            changes: Vec::new(),
            events: Vec::new(),
            dropped_events: 0,
            event_cap: uncapped(),
        }
    }
}

impl Outputs {
    pub fn with_event_cap(event_cap: usize) -> Self {
        Self {
            event_cap,
            ..Self::default()
        }
    }

    #[inline]
    pub fn clear(&mut self) {
        self.changes.clear();
        self.events.clear();
        self.dropped_events = 0;
    }

    #[inline]
    pub fn push_change(&mut self, change: Change) {
        self.changes.push(change);
    }

    #[inline]
    pub fn push_event(&mut self, event: TimelineEvent) {
        if self.events.len() < self.event_cap {
            self.events.push(event);
        } else {
            self.dropped_events += 1;
        }
    }

    /// Resolved value for `key`, if it changed this tick.
    pub fn value_of(&self, key: &str) -> Option<&Value> {
        self.changes.iter().find(|c| c.key == key).map(|c| &c.value)
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.changes.is_empty() && self.events.is_empty()
    }
}
