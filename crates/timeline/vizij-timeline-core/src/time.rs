//! Fixed-point discrete time.
//!
//! All scheduling math runs on [`DiscreteTime`], a signed 64-bit tick count at
//! [`TICKS_PER_SECOND`]. Arithmetic saturates at [`DiscreteTime::MIN`] /
//! [`DiscreteTime::MAX`], which double as the "unbounded" sentinels used by
//! open ranges.

use std::fmt;
use std::ops::{Add, AddAssign, Neg, Rem, Sub, SubAssign};

use serde::{Deserialize, Serialize};

/// Number of ticks in one second (microsecond resolution).
pub const TICKS_PER_SECOND: i64 = 1_000_000;

/// Signed tick count. Ordering is total.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DiscreteTime(i64);

impl DiscreteTime {
    pub const ZERO: DiscreteTime = DiscreteTime(0);
    pub const MAX: DiscreteTime = DiscreteTime(i64::MAX);
    pub const MIN: DiscreteTime = DiscreteTime(i64::MIN);

    #[inline]
    pub const fn from_ticks(ticks: i64) -> Self {
        DiscreteTime(ticks)
    }

    #[inline]
    pub const fn ticks(self) -> i64 {
        self.0
    }

    /// Converts seconds to ticks, rounding to the nearest tick. Out-of-range
    /// inputs saturate; NaN maps to zero.
    #[inline]
    pub fn from_secs_f64(secs: f64) -> Self {
        DiscreteTime((secs * TICKS_PER_SECOND as f64).round() as i64)
    }

    #[inline]
    pub fn from_secs_f32(secs: f32) -> Self {
        Self::from_secs_f64(secs as f64)
    }

    #[inline]
    pub fn as_secs_f64(self) -> f64 {
        self.0 as f64 / TICKS_PER_SECOND as f64
    }

    #[inline]
    pub fn as_secs_f32(self) -> f32 {
        self.as_secs_f64() as f32
    }

    #[inline]
    pub fn saturating_add(self, rhs: DiscreteTime) -> Self {
        DiscreteTime(self.0.saturating_add(rhs.0))
    }

    #[inline]
    pub fn saturating_sub(self, rhs: DiscreteTime) -> Self {
        DiscreteTime(self.0.saturating_sub(rhs.0))
    }

    /// Scales by a real factor, rounding to the nearest tick and saturating.
    #[inline]
    pub fn mul_f64(self, scale: f64) -> Self {
        DiscreteTime((self.0 as f64 * scale).round() as i64)
    }

    /// Number of whole `period`s in `self`, rounded toward negative infinity.
    /// A zero period yields zero.
    #[inline]
    pub fn div_floor(self, period: DiscreteTime) -> i64 {
        if period.0 == 0 {
            return 0;
        }
        self.0.div_euclid(period.0)
    }

    /// Non-negative remainder used for loop wrapping. A zero period yields zero.
    #[inline]
    pub fn rem_euclid(self, period: DiscreteTime) -> Self {
        if period.0 == 0 {
            return Self::ZERO;
        }
        DiscreteTime(self.0.rem_euclid(period.0))
    }

    #[inline]
    pub fn abs(self) -> Self {
        DiscreteTime(self.0.saturating_abs())
    }

    #[inline]
    pub fn min(self, other: DiscreteTime) -> Self {
        Ord::min(self, other)
    }

    #[inline]
    pub fn max(self, other: DiscreteTime) -> Self {
        Ord::max(self, other)
    }

    #[inline]
    pub fn clamp(self, lo: DiscreteTime, hi: DiscreteTime) -> Self {
        if self < lo {
            lo
        } else if self > hi {
            hi
        } else {
            self
        }
    }
}

impl Add for DiscreteTime {
    type Output = DiscreteTime;

    #[inline]
    fn add(self, rhs: DiscreteTime) -> Self::Output {
        self.saturating_add(rhs)
    }
}

impl AddAssign for DiscreteTime {
    #[inline]
    fn add_assign(&mut self, rhs: DiscreteTime) {
        *self = *self + rhs;
    }
}

impl Sub for DiscreteTime {
    type Output = DiscreteTime;

    #[inline]
    fn sub(self, rhs: DiscreteTime) -> Self::Output {
        self.saturating_sub(rhs)
    }
}

impl SubAssign for DiscreteTime {
    #[inline]
    fn sub_assign(&mut self, rhs: DiscreteTime) {
        *self = *self - rhs;
    }
}

impl Neg for DiscreteTime {
    type Output = DiscreteTime;

    #[inline]
    fn neg(self) -> Self::Output {
        DiscreteTime(self.0.saturating_neg())
    }
}

/// Truncating remainder (sign follows the dividend). Zero divisor yields zero.
impl Rem for DiscreteTime {
    type Output = DiscreteTime;

    #[inline]
    fn rem(self, rhs: DiscreteTime) -> Self::Output {
        if rhs.0 == 0 {
            return Self::ZERO;
        }
        DiscreteTime(self.0.wrapping_rem(rhs.0))
    }
}

impl fmt::Debug for DiscreteTime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match *self {
            Self::MAX => write!(f, "DiscreteTime(+inf)"),
            Self::MIN => write!(f, "DiscreteTime(-inf)"),
            t => write!(f, "DiscreteTime({}t = {:.6}s)", t.0, t.as_secs_f64()),
        }
    }
}

impl fmt::Display for DiscreteTime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:.6}s", self.as_secs_f64())
    }
}
