//! Vizij Timeline Core (engine-agnostic)
//!
//! Deterministic timeline scheduling on fixed-point time: root timers driven by
//! clocks, composite timers mapped onto their parents, clips with extrapolation,
//! and a top-4 weighted blend per bound target. Adapters feed one
//! [`ClockInput`] plus [`Inputs`] per tick into [`Engine::update`] and apply
//! the returned [`Outputs`].

pub mod accumulate;
pub mod binding;
pub mod clip;
pub mod clock;
pub mod composite;
pub mod config;
pub mod desc;
pub mod engine;
pub mod error;
pub mod extrapolation;
pub mod ids;
pub mod inputs;
pub mod mix;
pub mod outputs;
pub mod range;
pub mod snapshot;
pub mod time;
pub mod timer;
pub mod transform;
pub mod value;

// Re-exports for consumers (adapters)
pub use accumulate::{BlendMap, Contribution};
pub use binding::{TargetRow, TargetTable};
pub use clip::{ClipState, ClipValue, ClipWeight, CurveSampler, NoCurves};
pub use clock::{ClockData, ClockInput, ClockMode, ClockSettings};
pub use composite::{CompositeLink, TimerTable, TimerTree};
pub use config::Config;
pub use desc::{parse_timeline_json, ClipDesc, TargetDesc, TimelineDesc, TimerDesc};
pub use engine::{Engine, TimelineHandles};
pub use error::{Result, TimelineError};
pub use extrapolation::{ClipExtrapolation, ExtrapolationKind, ExtrapolationPosition};
pub use ids::{ClipId, CurveHandle, TargetId, TimerId};
pub use inputs::{Inputs, TimelineCommand};
pub use mix::{MixData, MIX_SLOTS};
pub use outputs::{Change, Outputs, TimelineEvent};
pub use range::{in_range_incl_loops, ActiveRange, ClosedRange};
pub use snapshot::Snapshot;
pub use time::{DiscreteTime, TICKS_PER_SECOND};
pub use timer::{Activation, RangeBehavior, RangeKind, RangeOutcome, Timer, TimerData};
pub use transform::TimeTransform;
pub use value::{Mixable, Quat, Value, ValueKind};
