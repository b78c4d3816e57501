//! Durable engine state.
//!
//! A [`Snapshot`] captures everything the tick pipeline carries between ticks:
//! timer clocks, instance state and clip edges. Descriptions are not part of
//! it; restore into an engine built from the same timelines.

use serde::{Deserialize, Serialize};

use crate::engine::Engine;
use crate::error::{Result, TimelineError};
use crate::ids::TimerId;
use crate::time::DiscreteTime;
use crate::timer::{Activation, TimerData};

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct RootSnapshot {
    pub paused: bool,
    pub loop_count: u32,
    pub activation: Activation,
    pub requested: bool,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct TimerSnapshot {
    pub data: TimerData,
    pub active: bool,
    pub enabled: bool,
    /// Present for root timers only.
    #[serde(default)]
    pub root: Option<RootSnapshot>,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ClipSnapshot {
    pub local_time: DiscreteTime,
    pub active: bool,
    pub active_previous: bool,
    pub driver_enabled: bool,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Snapshot {
    pub timers: Vec<TimerSnapshot>,
    pub clips: Vec<ClipSnapshot>,
}

impl Snapshot {
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string(self)?)
    }

    pub fn from_json(s: &str) -> Result<Self> {
        Ok(serde_json::from_str(s)?)
    }
}

impl Engine {
    pub fn snapshot(&self) -> Snapshot {
        let timers = self
            .timers
            .iter()
            .map(|node| TimerSnapshot {
                data: node.timer.data(),
                active: node.active,
                enabled: node.enabled,
                root: node.as_root().map(|r| RootSnapshot {
                    paused: r.paused,
                    loop_count: r.loop_count(),
                    activation: r.activation,
                    requested: r.requested,
                }),
            })
            .collect();
        let clips = self
            .clips
            .iter()
            .map(|c| ClipSnapshot {
                local_time: c.local_time,
                active: c.active,
                active_previous: c.active_previous,
                driver_enabled: c.driver_enabled,
            })
            .collect();
        Snapshot { timers, clips }
    }

    /// Restores state captured by [`Engine::snapshot`].
    ///
    /// The layout (timer count, which timers are roots, clip count) must match;
    /// nothing is written when it does not.
    pub fn restore(&mut self, snap: &Snapshot) -> Result<()> {
        if snap.timers.len() != self.timers.len() {
            return Err(TimelineError::SnapshotMismatch {
                reason: format!(
                    "{} timers in snapshot, {} in engine",
                    snap.timers.len(),
                    self.timers.len()
                ),
            });
        }
        if snap.clips.len() != self.clips.len() {
            return Err(TimelineError::SnapshotMismatch {
                reason: format!(
                    "{} clips in snapshot, {} in engine",
                    snap.clips.len(),
                    self.clips.len()
                ),
            });
        }
        for (node, ts) in self.timers.iter().zip(&snap.timers) {
            if node.is_root() != ts.root.is_some() {
                return Err(TimelineError::SnapshotMismatch {
                    reason: format!("timer {:?} root/composite kind differs", node.id),
                });
            }
        }

        for (i, ts) in snap.timers.iter().enumerate() {
            let Some(node) = self.timers.get_mut(TimerId(i as u32)) else {
                continue;
            };
            node.timer.set_data(ts.data);
            node.active = ts.active;
            node.enabled = ts.enabled;
            if let (Some(root), Some(rs)) = (node.as_root_mut(), &ts.root) {
                root.paused = rs.paused;
                root.activation = rs.activation;
                root.requested = rs.requested;
                if let Some(rb) = root.range.as_mut() {
                    rb.loop_count = rs.loop_count;
                }
            }
        }
        for (clip, cs) in self.clips.iter_mut().zip(&snap.clips) {
            clip.local_time = cs.local_time;
            clip.active = cs.active;
            clip.active_previous = cs.active_previous;
            clip.driver_enabled = cs.driver_enabled;
            clip.extrapolated = None;
            clip.timer_data = self
                .timers
                .get(clip.timer)
                .map(|n| n.timer.data())
                .unwrap_or_default();
        }
        log::debug!(
            "restored snapshot: {} timers, {} clips",
            snap.timers.len(),
            snap.clips.len()
        );
        Ok(())
    }
}
