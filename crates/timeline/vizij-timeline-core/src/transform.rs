//! Per-clip mapping from driving time to local clip time.

use serde::{Deserialize, Serialize};

use crate::range::ActiveRange;
use crate::time::DiscreteTime;

/// `local = (t - start) * scale + clip_in`.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct TimeTransform {
    /// Clip start in driving time.
    pub start: DiscreteTime,
    /// Clip end in driving time.
    pub end: DiscreteTime,
    /// Local time at `start`.
    #[serde(default)]
    pub clip_in: DiscreteTime,
    #[serde(default = "one")]
    pub scale: f64,
}

fn one() -> f64 {
    1.0
}

impl TimeTransform {
    pub fn new(start: DiscreteTime, end: DiscreteTime) -> Self {
        Self {
            start,
            end,
            clip_in: DiscreteTime::ZERO,
            scale: 1.0,
        }
    }

    /// Clip span in driving time.
    #[inline]
    pub fn duration(&self) -> DiscreteTime {
        self.range().duration()
    }

    #[inline]
    pub fn range(&self) -> ActiveRange {
        ActiveRange::new(self.start, self.end)
    }

    /// Clip span in local time.
    #[inline]
    pub fn local_duration(&self) -> DiscreteTime {
        self.duration().mul_f64(self.scale)
    }

    /// Maps driving time to local time without any range restriction.
    #[inline]
    pub fn to_local_time_unbound(&self, t: DiscreteTime) -> DiscreteTime {
        (t - self.start).mul_f64(self.scale) + self.clip_in
    }

    /// Local time at the clip's start edge.
    #[inline]
    pub fn local_start(&self) -> DiscreteTime {
        self.clip_in
    }

    /// Local time at the clip's end edge.
    #[inline]
    pub fn local_end(&self) -> DiscreteTime {
        self.clip_in + self.local_duration()
    }

    /// Whether `local` lies inside the clip: `[clip_in, clip_in + duration * scale)`.
    #[inline]
    pub fn is_local_time_bounded(&self, local: DiscreteTime) -> bool {
        local >= self.local_start() && local < self.local_end()
    }
}
