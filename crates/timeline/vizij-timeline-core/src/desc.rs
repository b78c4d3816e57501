//! Baked timeline description.
//!
//! This is the shape authoring/baking tools produce. Timers, clips and targets
//! reference each other by index into the description's own lists; composite
//! timers must follow their parent. `Engine::add_timeline` validates the whole
//! description before anything ticks.

use serde::{Deserialize, Serialize};

use crate::clip::{ClipValue, ClipWeight};
use crate::clock::ClockSettings;
use crate::error::Result;
use crate::extrapolation::ClipExtrapolation;
use crate::range::ActiveRange;
use crate::time::DiscreteTime;
use crate::timer::RangeBehavior;
use crate::transform::TimeTransform;
use crate::value::Value;

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct TimelineDesc {
    #[serde(default)]
    pub name: String,
    pub timers: Vec<TimerDesc>,
    #[serde(default)]
    pub clips: Vec<ClipDesc>,
    #[serde(default)]
    pub targets: Vec<TargetDesc>,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum TimerDesc {
    Root {
        name: String,
        #[serde(default)]
        clock: ClockSettings,
        #[serde(default)]
        range: Option<RangeBehavior>,
        #[serde(default = "default_true")]
        auto_start: bool,
    },
    Composite {
        name: String,
        /// Index of the parent timer in `TimelineDesc::timers`.
        parent: usize,
        #[serde(default)]
        offset: DiscreteTime,
        #[serde(default = "default_scale")]
        scale: f64,
        /// In the parent's time domain.
        #[serde(default)]
        active_range: ActiveRange,
    },
}

fn default_true() -> bool {
    true
}

fn default_scale() -> f64 {
    1.0
}

impl TimerDesc {
    pub fn name(&self) -> &str {
        match self {
            TimerDesc::Root { name, .. } | TimerDesc::Composite { name, .. } => name,
        }
    }

    pub fn root(name: &str, clock: ClockSettings, range: Option<RangeBehavior>) -> Self {
        TimerDesc::Root {
            name: name.to_string(),
            clock,
            range,
            auto_start: true,
        }
    }

    pub fn composite(
        name: &str,
        parent: usize,
        offset: DiscreteTime,
        scale: f64,
        active_range: ActiveRange,
    ) -> Self {
        TimerDesc::Composite {
            name: name.to_string(),
            parent,
            offset,
            scale,
            active_range,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ClipDesc {
    pub name: String,
    /// Index of the driving timer in `TimelineDesc::timers`.
    pub timer: usize,
    pub transform: TimeTransform,
    #[serde(default)]
    pub extrapolation: ClipExtrapolation,
    #[serde(default)]
    pub weight: Option<ClipWeight>,
    /// Index into `TimelineDesc::targets`.
    pub target: usize,
    pub value: ClipValue,
    /// Defaults to the clip's own range.
    #[serde(default)]
    pub visibility_range: Option<ActiveRange>,
}

impl ClipDesc {
    pub fn new(
        name: &str,
        timer: usize,
        transform: TimeTransform,
        target: usize,
        value: ClipValue,
    ) -> Self {
        Self {
            name: name.to_string(),
            timer,
            transform,
            extrapolation: ClipExtrapolation::default(),
            weight: None,
            target,
            value,
            visibility_range: None,
        }
    }

    pub fn with_weight(mut self, weight: ClipWeight) -> Self {
        self.weight = Some(weight);
        self
    }

    pub fn with_extrapolation(mut self, extrapolation: ClipExtrapolation) -> Self {
        self.extrapolation = extrapolation;
        self
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct TargetDesc {
    /// Host property path; also the key of output changes.
    pub name: String,
    pub default: Value,
    #[serde(default)]
    pub additive: bool,
}

impl TargetDesc {
    pub fn new(name: &str, default: Value) -> Self {
        Self {
            name: name.to_string(),
            default,
            additive: false,
        }
    }
}

/// Parses a baked timeline from JSON. Graph validation happens when the
/// description is added to an engine.
pub fn parse_timeline_json(s: &str) -> Result<TimelineDesc> {
    Ok(serde_json::from_str(s)?)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_fill_optional_fields() {
        let json = r#"{
            "timers": [ { "kind": "root", "name": "main" } ],
            "clips": [],
            "targets": []
        }"#;
        let desc = parse_timeline_json(json).unwrap();
        match &desc.timers[0] {
            TimerDesc::Root { auto_start, range, clock, .. } => {
                assert!(*auto_start);
                assert!(range.is_none());
                assert_eq!(*clock, ClockSettings::default());
            }
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn malformed_json_is_reported() {
        assert!(matches!(
            parse_timeline_json("{ \"timers\": 3 }"),
            Err(crate::error::TimelineError::Json(_))
        ));
    }
}
