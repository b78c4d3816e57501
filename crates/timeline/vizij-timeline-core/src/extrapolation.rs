//! Extrapolation of clip local time outside the clip's native range.
//!
//! Each clip carries up to three policies (Hold, Loop, PingPong), each with
//! its own [`ExtrapolationPosition`]. Per side, Loop wins over PingPong, which
//! wins over Hold; a side no policy covers continues the raw mapping.

use serde::{Deserialize, Serialize};

use crate::time::DiscreteTime;
use crate::transform::TimeTransform;

/// Which side(s) of a clip a policy covers.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ExtrapolationPosition {
    #[default]
    None,
    Pre,
    Post,
    Both,
}

impl ExtrapolationPosition {
    pub const PRE_BIT: u8 = 0b01;
    pub const POST_BIT: u8 = 0b10;

    #[inline]
    pub fn bits(self) -> u8 {
        match self {
            ExtrapolationPosition::None => 0,
            ExtrapolationPosition::Pre => Self::PRE_BIT,
            ExtrapolationPosition::Post => Self::POST_BIT,
            ExtrapolationPosition::Both => Self::PRE_BIT | Self::POST_BIT,
        }
    }

    #[inline]
    pub fn from_bits(bits: u8) -> Self {
        match bits & (Self::PRE_BIT | Self::POST_BIT) {
            0 => ExtrapolationPosition::None,
            Self::PRE_BIT => ExtrapolationPosition::Pre,
            Self::POST_BIT => ExtrapolationPosition::Post,
            _ => ExtrapolationPosition::Both,
        }
    }

    #[inline]
    pub fn covers(self, side: Side) -> bool {
        let bit = match side {
            Side::Pre => Self::PRE_BIT,
            Side::Post => Self::POST_BIT,
        };
        self.bits() & bit != 0
    }
}

impl std::ops::BitOr for ExtrapolationPosition {
    type Output = ExtrapolationPosition;

    fn bitor(self, rhs: Self) -> Self::Output {
        Self::from_bits(self.bits() | rhs.bits())
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Side {
    Pre,
    Post,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum ExtrapolationKind {
    Hold,
    Loop,
    PingPong,
}

/// Extrapolation records attached to one clip.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClipExtrapolation {
    #[serde(default)]
    pub hold: ExtrapolationPosition,
    #[serde(default, rename = "loop")]
    pub looping: ExtrapolationPosition,
    #[serde(default)]
    pub ping_pong: ExtrapolationPosition,
}

impl ClipExtrapolation {
    pub fn hold(position: ExtrapolationPosition) -> Self {
        Self {
            hold: position,
            ..Self::default()
        }
    }

    pub fn looping(position: ExtrapolationPosition) -> Self {
        Self {
            looping: position,
            ..Self::default()
        }
    }

    pub fn ping_pong(position: ExtrapolationPosition) -> Self {
        Self {
            ping_pong: position,
            ..Self::default()
        }
    }

    /// Policy applying on `side`, by precedence.
    pub fn policy_for(&self, side: Side) -> Option<ExtrapolationKind> {
        if self.looping.covers(side) {
            Some(ExtrapolationKind::Loop)
        } else if self.ping_pong.covers(side) {
            Some(ExtrapolationKind::PingPong)
        } else if self.hold.covers(side) {
            Some(ExtrapolationKind::Hold)
        } else {
            None
        }
    }
}

/// Local time after extrapolation, plus the policy that produced it.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct LocalTime {
    pub time: DiscreteTime,
    pub extrapolated: Option<ExtrapolationKind>,
}

/// Computes the clip's local time for driving time `t`.
pub fn local_time(transform: &TimeTransform, ex: &ClipExtrapolation, t: DiscreteTime) -> LocalTime {
    let raw = LocalTime {
        time: transform.to_local_time_unbound(t),
        extrapolated: None,
    };
    let side = if t < transform.start {
        Side::Pre
    } else if t >= transform.end {
        Side::Post
    } else {
        return raw;
    };
    let Some(kind) = ex.policy_for(side) else {
        return raw;
    };

    let duration = transform.duration();
    let time = match kind {
        ExtrapolationKind::Loop => {
            if duration <= DiscreteTime::ZERO {
                DiscreteTime::ZERO
            } else {
                let wrapped = (t - transform.start).rem_euclid(duration);
                wrapped.mul_f64(transform.scale) + transform.clip_in
            }
        }
        ExtrapolationKind::PingPong => {
            if duration <= DiscreteTime::ZERO {
                DiscreteTime::ZERO
            } else {
                let wrapped = (t - transform.start).rem_euclid(duration + duration);
                let folded = duration - (wrapped - duration).abs();
                folded.mul_f64(transform.scale) + transform.clip_in
            }
        }
        ExtrapolationKind::Hold => match side {
            Side::Pre => transform.local_start(),
            Side::Post => transform.local_end(),
        },
    };
    LocalTime {
        time,
        extrapolated: Some(kind),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tr(start: i64, end: i64) -> TimeTransform {
        TimeTransform::new(DiscreteTime::from_ticks(start), DiscreteTime::from_ticks(end))
    }

    fn at(transform: &TimeTransform, ex: &ClipExtrapolation, t: i64) -> i64 {
        local_time(transform, ex, DiscreteTime::from_ticks(t)).time.ticks()
    }

    #[test]
    fn position_bits_round_trip() {
        for p in [
            ExtrapolationPosition::None,
            ExtrapolationPosition::Pre,
            ExtrapolationPosition::Post,
            ExtrapolationPosition::Both,
        ] {
            assert_eq!(ExtrapolationPosition::from_bits(p.bits()), p);
        }
        assert_eq!(
            ExtrapolationPosition::Pre | ExtrapolationPosition::Post,
            ExtrapolationPosition::Both
        );
    }

    #[test]
    fn no_policy_continues_raw_mapping() {
        let t = tr(10, 20);
        let ex = ClipExtrapolation::default();
        assert_eq!(at(&t, &ex, 5), -5);
        assert_eq!(at(&t, &ex, 25), 15);
    }

    #[test]
    fn loop_wraps_driving_time_on_both_sides() {
        let t = tr(10, 20);
        let ex = ClipExtrapolation::looping(ExtrapolationPosition::Both);
        assert_eq!(at(&t, &ex, 23), 3);
        assert_eq!(at(&t, &ex, 9), 9);
    }

    #[test]
    fn mixed_pre_and_post_policies() {
        let t = tr(10, 20);
        let ex = ClipExtrapolation {
            hold: ExtrapolationPosition::Pre,
            ping_pong: ExtrapolationPosition::Post,
            ..Default::default()
        };
        assert_eq!(at(&t, &ex, 0), 0);
        assert_eq!(at(&t, &ex, 24), 6);
        assert_eq!(at(&t, &ex, 30), 0);
    }

    #[test]
    fn zero_duration_collapses_to_zero() {
        let t = tr(10, 10);
        let ex = ClipExtrapolation::looping(ExtrapolationPosition::Both);
        assert_eq!(at(&t, &ex, 42), 0);
    }
}
