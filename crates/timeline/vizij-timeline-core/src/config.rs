//! Core configuration for vizij-timeline-core.

use serde::{Deserialize, Serialize};

/// Configuration for blend tolerances, sizing hints and per-tick limits.
/// Keep this minimal; expand as needed without breaking API.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Weights at or below this count as absent when resolving a mix.
    pub blend_epsilon: f32,
    /// Clips per gather shard in the blend phase.
    pub blend_chunk_size: usize,
    /// Initial capacity hint for the per-tick blend map.
    pub target_capacity: usize,
    /// Maximum events to retain per tick; the rest are counted and dropped.
    pub max_events_per_tick: usize,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            blend_epsilon: f32::EPSILON,
            blend_chunk_size: 64,
            target_capacity: 256,
            max_events_per_tick: 1024,
        }
    }
}
