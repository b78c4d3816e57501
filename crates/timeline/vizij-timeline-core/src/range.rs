//! Time intervals.
//!
//! [`ActiveRange`] is half-open `[start, end)` and drives activation, range
//! behaviors and clip visibility. [`ClosedRange`] is `[start, end]` and is
//! used where both edges are reachable (e.g. auto-pause clamping).

use serde::{Deserialize, Serialize};

use crate::time::DiscreteTime;

/// Half-open interval `[start, end)`. Valid iff `start < end`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ActiveRange {
    pub start: DiscreteTime,
    pub end: DiscreteTime,
}

impl ActiveRange {
    /// Covers every representable time.
    pub const UNBOUNDED: ActiveRange = ActiveRange {
        start: DiscreteTime::MIN,
        end: DiscreteTime::MAX,
    };

    /// Invalid range that neither contains nor overlaps anything.
    pub const EMPTY: ActiveRange = ActiveRange {
        start: DiscreteTime::ZERO,
        end: DiscreteTime::ZERO,
    };

    #[inline]
    pub const fn new(start: DiscreteTime, end: DiscreteTime) -> Self {
        Self { start, end }
    }

    #[inline]
    pub const fn from_ticks(start: i64, end: i64) -> Self {
        Self::new(DiscreteTime::from_ticks(start), DiscreteTime::from_ticks(end))
    }

    pub fn from_secs(start: f64, end: f64) -> Self {
        Self::new(DiscreteTime::from_secs_f64(start), DiscreteTime::from_secs_f64(end))
    }

    #[inline]
    pub fn is_valid(&self) -> bool {
        self.start < self.end
    }

    /// `end - start`, saturating to [`DiscreteTime::MAX`] when the tick count
    /// overflows (e.g. for [`ActiveRange::UNBOUNDED`]).
    #[inline]
    pub fn duration(&self) -> DiscreteTime {
        match self.end.ticks().checked_sub(self.start.ticks()) {
            Some(d) => DiscreteTime::from_ticks(d),
            None => DiscreteTime::MAX,
        }
    }

    /// Alias of [`ActiveRange::duration`].
    #[inline]
    pub fn length(&self) -> DiscreteTime {
        self.duration()
    }

    #[inline]
    pub fn contains(&self, t: DiscreteTime) -> bool {
        self.start <= t && t < self.end
    }

    #[inline]
    pub fn contains_range(&self, other: &ActiveRange) -> bool {
        self.start <= other.start && self.end >= other.end
    }

    #[inline]
    pub fn overlaps(&self, other: &ActiveRange) -> bool {
        self.is_valid() && other.is_valid() && self.start < other.end && other.start < self.end
    }

    /// Clamps `t` into `[start, end]`.
    #[inline]
    pub fn clamp(&self, t: DiscreteTime) -> DiscreteTime {
        t.max(self.start).min(self.end)
    }

    #[inline]
    pub fn closed(&self) -> ClosedRange {
        ClosedRange::new(self.start, self.end)
    }
}

impl Default for ActiveRange {
    fn default() -> Self {
        Self::UNBOUNDED
    }
}

/// Closed interval `[start, end]`. Valid iff `start <= end`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ClosedRange {
    pub start: DiscreteTime,
    pub end: DiscreteTime,
}

impl ClosedRange {
    #[inline]
    pub const fn new(start: DiscreteTime, end: DiscreteTime) -> Self {
        Self { start, end }
    }

    #[inline]
    pub fn is_valid(&self) -> bool {
        self.start <= self.end
    }

    #[inline]
    pub fn contains(&self, t: DiscreteTime) -> bool {
        self.start <= t && t <= self.end
    }

    #[inline]
    pub fn overlaps(&self, other: &ClosedRange) -> bool {
        self.is_valid() && other.is_valid() && self.start <= other.end && other.start <= self.end
    }

    #[inline]
    pub fn clamp(&self, t: DiscreteTime) -> DiscreteTime {
        t.max(self.start).min(self.end)
    }

    #[inline]
    pub fn duration(&self) -> DiscreteTime {
        match self.end.ticks().checked_sub(self.start.ticks()) {
            Some(d) => DiscreteTime::from_ticks(d),
            None => DiscreteTime::MAX,
        }
    }
}

/// Loop-aware visibility test: does `active_range` touch `clip_range` on any
/// iteration of a timeline that loops over `timeline_range`?
pub fn in_range_incl_loops(
    clip_range: &ActiveRange,
    active_range: &ActiveRange,
    timeline_range: &ActiveRange,
) -> bool {
    if !active_range.is_valid() {
        return false;
    }
    if clip_range.overlaps(active_range) {
        return true;
    }
    if !timeline_range.is_valid() {
        return false;
    }
    // The query spans more than one full loop, so every clip is touched.
    if timeline_range.length() < active_range.length() {
        return true;
    }
    if timeline_range.contains_range(active_range) {
        return false;
    }

    let length = timeline_range.length();
    let origin = timeline_range.start;
    let wrap = |t: DiscreteTime| origin + (t - origin).rem_euclid(length);

    let mut start_range = *timeline_range;
    start_range.start = wrap(active_range.start);
    let mut end_range = *timeline_range;
    end_range.end = wrap(active_range.end);

    start_range.overlaps(clip_range) || end_range.overlaps(clip_range)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn half_open_edges() {
        let r = ActiveRange::from_ticks(2, 6);
        assert!(r.contains(r.start));
        assert!(!r.contains(r.end));
        assert_eq!(r.length().ticks(), 4);
        assert_eq!(r.clamp(DiscreteTime::from_ticks(9)).ticks(), 6);
    }

    #[test]
    fn overlap_is_symmetric_and_requires_validity() {
        let a = ActiveRange::from_ticks(0, 5);
        let b = ActiveRange::from_ticks(4, 8);
        let c = ActiveRange::from_ticks(5, 8);
        assert!(a.overlaps(&b) && b.overlaps(&a));
        assert!(!a.overlaps(&c) && !c.overlaps(&a));
        assert!(!a.overlaps(&ActiveRange::EMPTY));
    }

    #[test]
    fn unbounded_duration_saturates() {
        assert_eq!(ActiveRange::UNBOUNDED.duration(), DiscreteTime::MAX);
        assert!(ActiveRange::UNBOUNDED.contains(DiscreteTime::ZERO));
    }

    #[test]
    fn closed_range_includes_end() {
        let r = ClosedRange::new(DiscreteTime::from_ticks(1), DiscreteTime::from_ticks(3));
        assert!(r.contains(DiscreteTime::from_ticks(3)));
        assert!(ClosedRange::new(DiscreteTime::ZERO, DiscreteTime::ZERO).is_valid());
    }

    #[test]
    fn loop_visibility_wraps_across_seam() {
        let timeline = ActiveRange::from_ticks(0, 10);
        let near_start = ActiveRange::from_ticks(0, 2);
        let near_end = ActiveRange::from_ticks(8, 10);
        let middle = ActiveRange::from_ticks(4, 6);

        // Query [9, 11) wraps to [9, 10) + [0, 1).
        let query = ActiveRange::from_ticks(9, 11);
        assert!(in_range_incl_loops(&near_start, &query, &timeline));
        assert!(in_range_incl_loops(&near_end, &query, &timeline));
        assert!(!in_range_incl_loops(&middle, &query, &timeline));
    }

    #[test]
    fn loop_visibility_long_query_and_invalid_inputs() {
        let timeline = ActiveRange::from_ticks(0, 10);
        let middle = ActiveRange::from_ticks(4, 6);
        assert!(in_range_incl_loops(&middle, &ActiveRange::from_ticks(12, 30), &timeline));
        assert!(!in_range_incl_loops(&middle, &ActiveRange::EMPTY, &timeline));
        assert!(!in_range_incl_loops(&middle, &ActiveRange::from_ticks(7, 9), &ActiveRange::EMPTY));
        assert!(!in_range_incl_loops(&middle, &ActiveRange::from_ticks(7, 9), &timeline));
    }
}
