//! Timers and range behaviors.
//!
//! A [`Timer`] accumulates clock deltas. Root timers additionally own a
//! [`RootTimer`] record: the clock that drives them, an optional
//! [`RangeBehavior`] bounding their time, and the activation state of the
//! timeline instance they represent.

use serde::{Deserialize, Serialize};

use crate::clock::{ClockData, ClockSettings};
use crate::range::ActiveRange;
use crate::time::DiscreteTime;

/// Time accumulator shared by root and composite timers.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Timer {
    pub time: DiscreteTime,
    pub delta_time: DiscreteTime,
    pub time_scale: f64,
}

impl Default for Timer {
    fn default() -> Self {
        Self {
            time: DiscreteTime::ZERO,
            delta_time: DiscreteTime::ZERO,
            time_scale: 1.0,
        }
    }
}

impl Timer {
    #[inline]
    pub fn data(&self) -> TimerData {
        TimerData {
            time: self.time,
            delta_time: self.delta_time,
            time_scale: self.time_scale,
        }
    }

    #[inline]
    pub fn set_data(&mut self, data: TimerData) {
        self.time = data.time;
        self.delta_time = data.delta_time;
        self.time_scale = data.time_scale;
    }
}

/// Per-tick snapshot broadcast from a timer to its dependents.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct TimerData {
    pub time: DiscreteTime,
    pub delta_time: DiscreteTime,
    pub time_scale: f64,
}

impl Default for TimerData {
    fn default() -> Self {
        Timer::default().data()
    }
}

/// Four-state activation, stepped once per tick.
///
/// Used for timeline instances (from the requested state) and for clips (from
/// the previous and current active flags), so "current" and "previous" are
/// never written separately.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Activation {
    #[default]
    Inactive,
    ActivatingThisTick,
    Active,
    DeactivatingThisTick,
}

impl Activation {
    /// Derives the state from last tick's and this tick's flag.
    #[inline]
    pub fn from_edges(previous: bool, current: bool) -> Self {
        match (previous, current) {
            (false, false) => Activation::Inactive,
            (false, true) => Activation::ActivatingThisTick,
            (true, true) => Activation::Active,
            (true, false) => Activation::DeactivatingThisTick,
        }
    }

    /// Advances one tick towards `wants_active`.
    #[inline]
    pub fn step(self, wants_active: bool) -> Self {
        Self::from_edges(self.is_active(), wants_active)
    }

    /// Active this tick (including the activation edge).
    #[inline]
    pub fn is_active(self) -> bool {
        matches!(self, Activation::ActivatingThisTick | Activation::Active)
    }

    /// Active last tick (including the deactivation edge).
    #[inline]
    pub fn was_active(self) -> bool {
        matches!(self, Activation::Active | Activation::DeactivatingThisTick)
    }

    #[inline]
    pub fn is_edge(self) -> bool {
        matches!(
            self,
            Activation::ActivatingThisTick | Activation::DeactivatingThisTick
        )
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum RangeKind {
    /// Reset to the range start and stop the instance at the far edge.
    AutoStop,
    /// Clamp at the far edge and pause.
    AutoPause,
    /// Wrap back into the range, counting iterations.
    Loop,
}

/// Bounds a root timer to `range`.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct RangeBehavior {
    pub kind: RangeKind,
    pub range: ActiveRange,
    #[serde(default)]
    pub loop_count: u32,
    /// AutoStop only: observe the boundary for one tick before stopping.
    #[serde(default)]
    pub sample_last_frame: bool,
}

/// What a range behavior did this tick.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum RangeOutcome {
    Continue,
    /// Auto-stop hit; the instance must deactivate.
    Stopped,
    /// Auto-pause hit the boundary in the direction of travel.
    Paused,
    /// Loop wrapped `iterations` times.
    Looped { iterations: u32 },
}

impl RangeBehavior {
    pub fn new(kind: RangeKind, range: ActiveRange) -> Self {
        Self {
            kind,
            range,
            loop_count: 0,
            sample_last_frame: false,
        }
    }

    /// Applies the behavior after `time` advanced from `previous`.
    pub fn apply(
        &mut self,
        time: &mut DiscreteTime,
        previous: DiscreteTime,
        reverse: bool,
    ) -> RangeOutcome {
        let start = self.range.start;
        let end = self.range.end;
        match self.kind {
            RangeKind::AutoStop if !reverse => {
                if *time < start {
                    *time = start;
                }
                if *time >= end {
                    if self.sample_last_frame && previous < end {
                        *time = end;
                    } else {
                        *time = start;
                        return RangeOutcome::Stopped;
                    }
                }
                RangeOutcome::Continue
            }
            RangeKind::AutoStop => {
                if *time > end {
                    *time = end;
                }
                if *time <= start {
                    if self.sample_last_frame && previous > start {
                        *time = start;
                    } else {
                        *time = end;
                        return RangeOutcome::Stopped;
                    }
                }
                RangeOutcome::Continue
            }
            RangeKind::AutoPause => {
                *time = self.range.closed().clamp(*time);
                let boundary = if reverse { start } else { end };
                if *time == boundary {
                    RangeOutcome::Paused
                } else {
                    RangeOutcome::Continue
                }
            }
            RangeKind::Loop => {
                if !reverse && *time < start {
                    *time = start;
                }
                if reverse && *time > end {
                    *time = end;
                }
                let outside = if reverse { *time < start } else { *time >= end };
                if !outside {
                    return RangeOutcome::Continue;
                }
                let period = self.range.duration();
                if period <= DiscreteTime::ZERO {
                    *time = start;
                    return RangeOutcome::Continue;
                }
                let offset = *time - start;
                let wraps = offset.div_floor(period).unsigned_abs();
                let iterations = u32::try_from(wraps).unwrap_or(u32::MAX);
                self.loop_count = self.loop_count.saturating_add(iterations);
                *time = start + offset.rem_euclid(period);
                RangeOutcome::Looped { iterations }
            }
        }
    }
}

/// State carried by root timers only.
#[derive(Clone, Debug, PartialEq)]
pub struct RootTimer {
    pub clock: ClockSettings,
    pub range: Option<RangeBehavior>,
    pub paused: bool,
    pub activation: Activation,
    /// Whether the host wants this instance running.
    pub requested: bool,
}

impl RootTimer {
    pub fn new(clock: ClockSettings, range: Option<RangeBehavior>, auto_start: bool) -> Self {
        Self {
            clock,
            range,
            paused: false,
            activation: Activation::Inactive,
            requested: auto_start,
        }
    }

    /// Time the instance restarts from: range start, or range end when the
    /// clock runs in reverse.
    pub fn reset_time(&self) -> DiscreteTime {
        match &self.range {
            Some(rb) if self.clock.reverse => rb.range.end,
            Some(rb) => rb.range.start,
            None => DiscreteTime::ZERO,
        }
    }

    /// Restarts `timer` on the activation edge.
    pub fn reset(&mut self, timer: &mut Timer, data: &ClockData) {
        self.paused = false;
        timer.time = self.reset_time();
        timer.delta_time = DiscreteTime::ZERO;
        timer.time_scale = data.scale as f64;
    }

    /// Advances `timer` by one clock tick and applies the range behavior.
    pub fn advance(&mut self, timer: &mut Timer, data: &ClockData) -> RangeOutcome {
        timer.time_scale = data.scale as f64;
        if self.paused {
            timer.delta_time = DiscreteTime::ZERO;
            return RangeOutcome::Continue;
        }
        let previous = timer.time;
        timer.time += data.delta_time;
        timer.delta_time = data.delta_time;

        let reverse = if data.delta_time == DiscreteTime::ZERO {
            self.clock.reverse
        } else {
            data.delta_time < DiscreteTime::ZERO
        };
        let outcome = match self.range.as_mut() {
            Some(rb) => rb.apply(&mut timer.time, previous, reverse),
            None => RangeOutcome::Continue,
        };
        if outcome == RangeOutcome::Paused {
            self.paused = true;
        }
        outcome
    }

    pub fn loop_count(&self) -> u32 {
        self.range.as_ref().map(|rb| rb.loop_count).unwrap_or(0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn t(ticks: i64) -> DiscreteTime {
        DiscreteTime::from_ticks(ticks)
    }

    #[test]
    fn activation_steps_through_edges() {
        let mut a = Activation::Inactive;
        a = a.step(true);
        assert_eq!(a, Activation::ActivatingThisTick);
        a = a.step(true);
        assert_eq!(a, Activation::Active);
        a = a.step(false);
        assert_eq!(a, Activation::DeactivatingThisTick);
        assert!(a.was_active() && !a.is_active());
        a = a.step(false);
        assert_eq!(a, Activation::Inactive);
    }

    #[test]
    fn loop_wraps_forward_and_counts() {
        let mut rb = RangeBehavior::new(RangeKind::Loop, ActiveRange::from_ticks(0, 10));
        let mut time = t(23);
        let out = rb.apply(&mut time, t(0), false);
        assert_eq!(out, RangeOutcome::Looped { iterations: 2 });
        assert_eq!(time, t(3));
        assert_eq!(rb.loop_count, 2);
    }

    #[test]
    fn loop_wraps_in_reverse() {
        let mut rb = RangeBehavior::new(RangeKind::Loop, ActiveRange::from_ticks(0, 10));
        let mut time = t(-1);
        assert_eq!(rb.apply(&mut time, t(2), true), RangeOutcome::Looped { iterations: 1 });
        assert_eq!(time, t(9));
        let mut time = t(-10);
        rb.apply(&mut time, t(0), true);
        assert_eq!(time, t(0));
        assert_eq!(rb.loop_count, 2);
    }

    #[test]
    fn zero_length_loop_snaps_to_start() {
        let mut rb = RangeBehavior::new(RangeKind::Loop, ActiveRange::from_ticks(5, 5));
        let mut time = t(17);
        assert_eq!(rb.apply(&mut time, t(5), false), RangeOutcome::Continue);
        assert_eq!(time, t(5));
        assert_eq!(rb.loop_count, 0);
    }

    #[test]
    fn auto_pause_clamps_at_travel_boundary() {
        let mut rb = RangeBehavior::new(RangeKind::AutoPause, ActiveRange::from_ticks(0, 10));
        let mut time = t(12);
        assert_eq!(rb.apply(&mut time, t(8), false), RangeOutcome::Paused);
        assert_eq!(time, t(10));
        let mut time = t(-3);
        assert_eq!(rb.apply(&mut time, t(1), true), RangeOutcome::Paused);
        assert_eq!(time, t(0));
        let mut time = t(-3);
        assert_eq!(rb.apply(&mut time, t(1), false), RangeOutcome::Continue);
        assert_eq!(time, t(0));
    }

    #[test]
    fn auto_stop_reverse_mirrors_forward() {
        let mut rb = RangeBehavior::new(RangeKind::AutoStop, ActiveRange::from_ticks(0, 10));
        rb.sample_last_frame = true;
        let mut time = t(-2);
        assert_eq!(rb.apply(&mut time, t(1), true), RangeOutcome::Continue);
        assert_eq!(time, t(0));
        let mut time = t(-1);
        assert_eq!(rb.apply(&mut time, t(0), true), RangeOutcome::Stopped);
        assert_eq!(time, t(10));
    }

    #[test]
    fn paused_root_skips_accumulation() {
        let mut root = RootTimer::new(
            ClockSettings::default(),
            Some(RangeBehavior::new(RangeKind::AutoPause, ActiveRange::from_ticks(0, 4))),
            true,
        );
        let mut timer = Timer::default();
        let data = ClockData {
            delta_time: t(3),
            scale: 1.0,
        };
        assert_eq!(root.advance(&mut timer, &data), RangeOutcome::Continue);
        assert_eq!(root.advance(&mut timer, &data), RangeOutcome::Paused);
        assert!(root.paused);
        assert_eq!(timer.time, t(4));
        root.advance(&mut timer, &data);
        assert_eq!(timer.time, t(4));
        assert_eq!(timer.delta_time, DiscreteTime::ZERO);
    }
}
