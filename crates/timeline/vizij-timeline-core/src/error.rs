//! Error types for timeline construction.
//!
//! Only configuration problems are errors. Everything that can happen while
//! ticking a validated timeline has a defined fallback instead.

use thiserror::Error;

use crate::ids::TimerId;
use crate::value::ValueKind;

#[derive(Debug, Clone, PartialEq, Error)]
#[non_exhaustive]
pub enum TimelineError {
    #[error("composite timer '{timer}' references missing parent index {parent}")]
    MissingParentTimer { timer: String, parent: usize },

    #[error("composite timer '{timer}' must be declared after its parent (index {parent})")]
    ParentNotEarlier { timer: String, parent: usize },

    #[error("composite timer '{timer}' has a non-finite scale {scale}")]
    InvalidCompositeScale { timer: String, scale: f64 },

    #[error("clip '{clip}' references missing timer index {timer}")]
    MissingTimer { clip: String, timer: usize },

    #[error("clip '{clip}' ends before it starts ({start} > {end} ticks)")]
    InvalidClipRange { clip: String, start: i64, end: i64 },

    #[error("clip '{clip}' has invalid scale {scale}; expected a finite value > 0")]
    InvalidClipScale { clip: String, scale: f64 },

    #[error("clip '{clip}' provides {actual} curves for a {kind:?} value (expected {expected})")]
    CurveArityMismatch {
        clip: String,
        kind: ValueKind,
        expected: usize,
        actual: usize,
    },

    #[error("clip '{clip}' writes {actual:?} into target '{target}' of kind {expected:?}")]
    TargetKindMismatch {
        clip: String,
        target: String,
        expected: ValueKind,
        actual: ValueKind,
    },

    #[error("clip '{clip}' references missing target index {target}")]
    MissingTarget { clip: String, target: usize },

    #[error("duplicate target name '{name}'")]
    DuplicateTarget { name: String },

    #[error("target '{name}' already bound with {field} {existing}, redeclared as {declared}")]
    TargetRedeclared {
        name: String,
        field: &'static str,
        existing: String,
        declared: String,
    },

    #[error("timer {0:?} is not a root timer of this engine")]
    UnknownTimer(TimerId),

    #[error("snapshot does not match engine layout: {reason}")]
    SnapshotMismatch { reason: String },

    #[error("timeline json error: {0}")]
    Json(String),
}

impl From<serde_json::Error> for TimelineError {
    fn from(err: serde_json::Error) -> Self {
        TimelineError::Json(err.to_string())
    }
}

pub type Result<T, E = TimelineError> = std::result::Result<T, E>;
