//! Clock sources.
//!
//! A root timer is driven by a [`ClockSettings`]; each tick the host supplies
//! one [`ClockInput`] (frame time) and every clock turns it into [`ClockData`].

use serde::{Deserialize, Serialize};

use crate::time::DiscreteTime;

#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum ClockMode {
    /// Scaled host time (pauses and slow-motion apply).
    #[default]
    GameTime,
    /// Host time ignoring the host time scale.
    UnscaledGameTime,
    /// Fixed delta per tick, independent of the host.
    Constant,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ClockSettings {
    #[serde(default)]
    pub mode: ClockMode,
    #[serde(default)]
    pub constant_delta: DiscreteTime,
    #[serde(default = "one")]
    pub constant_scale: f32,
    #[serde(default)]
    pub reverse: bool,
}

fn one() -> f32 {
    1.0
}

impl Default for ClockSettings {
    fn default() -> Self {
        Self {
            mode: ClockMode::GameTime,
            constant_delta: DiscreteTime::ZERO,
            constant_scale: 1.0,
            reverse: false,
        }
    }
}

/// Frame time provided by the host once per tick.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct ClockInput {
    /// Scaled frame delta.
    pub delta: DiscreteTime,
    /// Frame delta before the host time scale is applied.
    pub unscaled_delta: DiscreteTime,
    /// Host time scale.
    pub scale: f32,
}

impl ClockInput {
    /// Frame input where scaled and unscaled delta agree.
    pub fn from_secs(dt: f32) -> Self {
        let d = DiscreteTime::from_secs_f32(dt);
        Self {
            delta: d,
            unscaled_delta: d,
            scale: 1.0,
        }
    }

    pub fn from_ticks(ticks: i64) -> Self {
        let d = DiscreteTime::from_ticks(ticks);
        Self {
            delta: d,
            unscaled_delta: d,
            scale: 1.0,
        }
    }
}

impl Default for ClockInput {
    fn default() -> Self {
        Self {
            delta: DiscreteTime::ZERO,
            unscaled_delta: DiscreteTime::ZERO,
            scale: 1.0,
        }
    }
}

/// Per-tick output of a clock.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct ClockData {
    pub delta_time: DiscreteTime,
    pub scale: f32,
}

impl ClockSettings {
    /// Selects delta and scale for this clock's mode; `reverse` negates the
    /// delta after selection.
    pub fn clock_data(&self, input: &ClockInput) -> ClockData {
        let (delta_time, scale) = match self.mode {
            ClockMode::GameTime => (input.delta, input.scale),
            ClockMode::UnscaledGameTime => (input.unscaled_delta, 1.0),
            ClockMode::Constant => (
                self.constant_delta.mul_f64(self.constant_scale as f64),
                self.constant_scale,
            ),
        };
        ClockData {
            delta_time: if self.reverse { -delta_time } else { delta_time },
            scale,
        }
    }
}
