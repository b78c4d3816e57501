//! Clip records: local time, activation and the value a clip contributes.

use serde::{Deserialize, Serialize};

use crate::extrapolation::{local_time, ClipExtrapolation, ExtrapolationKind};
use crate::ids::{CurveHandle, TargetId, TimerId};
use crate::range::ActiveRange;
use crate::time::DiscreteTime;
use crate::timer::{Activation, TimerData};
use crate::transform::TimeTransform;
use crate::value::{Value, ValueKind};

/// Samples host-owned curves. Curve evaluation itself is outside this crate.
pub trait CurveSampler {
    fn sample_curve(&self, curve: CurveHandle, local_time: f32) -> f32;
}

impl<F> CurveSampler for F
where
    F: Fn(CurveHandle, f32) -> f32,
{
    fn sample_curve(&self, curve: CurveHandle, local_time: f32) -> f32 {
        self(curve, local_time)
    }
}

/// Sampler for timelines without curves; every curve reads 0.
#[derive(Clone, Copy, Debug, Default)]
pub struct NoCurves;

impl CurveSampler for NoCurves {
    fn sample_curve(&self, _curve: CurveHandle, _local_time: f32) -> f32 {
        0.0
    }
}

/// Contribution weight of a clip.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ClipWeight {
    Value(f32),
    /// Animated weight sampled at the clip's local time.
    Curve(CurveHandle),
}

impl ClipWeight {
    pub fn sample(&self, sampler: &dyn CurveSampler, local_secs: f32) -> f32 {
        match *self {
            ClipWeight::Value(w) => w,
            ClipWeight::Curve(c) => sampler.sample_curve(c, local_secs),
        }
    }
}

/// What a clip writes into its target.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ClipValue {
    Constant(Value),
    /// One curve per component of `kind`.
    Curves {
        kind: ValueKind,
        curves: Vec<CurveHandle>,
    },
}

impl ClipValue {
    pub fn kind(&self) -> ValueKind {
        match self {
            ClipValue::Constant(v) => v.kind(),
            ClipValue::Curves { kind, .. } => *kind,
        }
    }

    pub fn sample(&self, sampler: &dyn CurveSampler, local_secs: f32) -> Value {
        match self {
            ClipValue::Constant(v) => *v,
            ClipValue::Curves { kind, curves } => {
                let mut components = [0.0f32; 4];
                for (slot, curve) in components.iter_mut().zip(curves.iter()) {
                    *slot = sampler.sample_curve(*curve, local_secs);
                }
                kind.from_components(&components[..kind.arity()])
            }
        }
    }
}

/// Read-only view of a clip's per-tick state.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct ClipState {
    pub local_time: DiscreteTime,
    pub active: bool,
    pub active_previous: bool,
    pub activation: Activation,
    pub extrapolated: Option<ExtrapolationKind>,
}

/// Runtime clip: static description plus the state rebuilt every tick.
#[derive(Clone, Debug)]
pub struct ClipRecord {
    pub name: String,
    pub timer: TimerId,
    pub transform: TimeTransform,
    pub extrapolation: ClipExtrapolation,
    /// `None` marks an unweighted clip (last writer wins).
    pub weight: Option<ClipWeight>,
    pub target: TargetId,
    pub value: ClipValue,
    /// Pre-filter range only; activation comes from local time.
    pub visibility_range: ActiveRange,

    pub timer_data: TimerData,
    /// False while the instance is stopped or a composite above is inactive.
    pub driver_enabled: bool,
    pub local_time: DiscreteTime,
    pub extrapolated: Option<ExtrapolationKind>,
    pub active: bool,
    pub active_previous: bool,
}

impl ClipRecord {
    /// Takes this tick's data from the driving timer, then updates.
    pub fn drive(&mut self, data: TimerData, enabled: bool) -> Activation {
        self.timer_data = data;
        self.driver_enabled = enabled;
        self.update()
    }

    /// Recomputes local time and the active flag from the latest timer data.
    pub fn update(&mut self) -> Activation {
        self.active_previous = self.active;
        if self.driver_enabled {
            let lt = local_time(&self.transform, &self.extrapolation, self.timer_data.time);
            self.local_time = lt.time;
            self.extrapolated = lt.extrapolated;
            self.active = self.transform.is_local_time_bounded(lt.time);
        } else {
            self.local_time = self.transform.to_local_time_unbound(self.timer_data.time);
            self.extrapolated = None;
            self.active = false;
        }
        self.activation()
    }

    #[inline]
    pub fn activation(&self) -> Activation {
        Activation::from_edges(self.active_previous, self.active)
    }

    #[inline]
    pub fn local_secs(&self) -> f32 {
        self.local_time.as_secs_f32()
    }

    pub fn state(&self) -> ClipState {
        ClipState {
            local_time: self.local_time,
            active: self.active,
            active_previous: self.active_previous,
            activation: self.activation(),
            extrapolated: self.extrapolated,
        }
    }
}
