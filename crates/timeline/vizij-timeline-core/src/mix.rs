//! Bounded weighted mixing.
//!
//! [`MixData`] keeps the four strongest contributions for one target, sorted
//! by descending weight. [`MixData::resolve`] folds them into one value with a
//! two-level lerp tree (nested binary mixing), backfilling the target's
//! default for non-additive blends whose weights sum below one.

use crate::value::Mixable;

pub const MIX_SLOTS: usize = 4;

#[derive(Clone, Debug, PartialEq)]
pub struct MixData<T> {
    /// Descending; unused slots are 0.
    pub weights: [f32; MIX_SLOTS],
    pub values: [T; MIX_SLOTS],
    pub additive: bool,
}

impl<T: Mixable> MixData<T> {
    pub fn new(additive: bool) -> Self {
        Self {
            weights: [0.0; MIX_SLOTS],
            values: std::array::from_fn(|_| T::neutral()),
            additive,
        }
    }

    /// Entry written by an unweighted contributor: full weight, one value.
    pub fn single(value: T, additive: bool) -> Self {
        let mut mix = Self::new(additive);
        mix.weights[0] = 1.0;
        mix.values[0] = value;
        mix
    }

    /// Inserts before the first slot with a strictly smaller weight, evicting
    /// slot 3. Returns false when the candidate is not stronger than any slot
    /// (equal weights keep the earlier contributor).
    pub fn insert(&mut self, weight: f32, value: T) -> bool {
        let Some(slot) = (0..MIX_SLOTS).find(|&i| weight > self.weights[i]) else {
            return false;
        };
        for j in (slot + 1..MIX_SLOTS).rev() {
            self.weights[j] = self.weights[j - 1];
            self.values[j] = self.values[j - 1].clone();
        }
        self.weights[slot] = weight;
        self.values[slot] = value;
        true
    }

    /// Resolves the accumulated contributions against `default`.
    pub fn resolve(&self, default: &T, epsilon: f32) -> T {
        if self.weights[0] <= epsilon {
            return default.clone();
        }
        let mut w = self.weights;
        let mut v = self.values.clone();

        let mut total: f32 = w.iter().sum();
        if total < 1.0 && !self.additive {
            // The default fills the first free slot in index order, not by rank.
            if let Some(free) = (1..MIX_SLOTS).find(|&i| w[i] <= epsilon) {
                w[free] = 1.0 - total;
                v[free] = default.clone();
                total = 1.0;
            }
        }
        for x in w.iter_mut() {
            *x /= total;
        }

        let result = if w[1] <= epsilon {
            v[0].clone()
        } else if w[2] <= epsilon {
            T::lerp(&v[0], &v[1], w[1])
        } else {
            let w_hi = w[0] + w[1];
            let hi = T::lerp(&v[0], &v[1], w[1] / w_hi);
            // The low pair can round away entirely in f32.
            let w_lo = 1.0 - w_hi;
            if w_lo <= epsilon {
                hi
            } else {
                let lo = T::lerp(&v[2], &v[3], w[3] / w_lo);
                T::lerp(&lo, &hi, w_hi)
            }
        };

        if self.additive {
            T::add(default, &result)
        } else {
            result
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::value::Quat;

    const EPS: f32 = f32::EPSILON;

    fn approx(a: f32, b: f32) {
        assert!((a - b).abs() <= 1e-5, "left={a} right={b}");
    }

    #[test]
    fn keeps_four_strongest() {
        let mut mix = MixData::<f32>::new(false);
        for (i, w) in [0.9, 0.8, 0.7, 0.6].into_iter().enumerate() {
            assert!(mix.insert(w, i as f32));
        }
        assert!(!mix.insert(0.5, 4.0));
        assert_eq!(mix.weights, [0.9, 0.8, 0.7, 0.6]);

        assert!(mix.insert(0.75, 9.0));
        assert_eq!(mix.weights, [0.9, 0.8, 0.75, 0.7]);
        assert_eq!(mix.values, [0.0, 1.0, 9.0, 2.0]);
    }

    #[test]
    fn equal_weight_keeps_earlier_slot() {
        let mut mix = MixData::<f32>::new(false);
        mix.insert(0.5, 1.0);
        mix.insert(0.5, 2.0);
        assert_eq!(mix.values[0], 1.0);
        assert_eq!(mix.values[1], 2.0);

        let mut full = MixData::<f32>::new(false);
        for _ in 0..4 {
            full.insert(0.25, 1.0);
        }
        assert!(!full.insert(0.25, 7.0));
    }

    #[test]
    fn empty_mix_resolves_to_default() {
        let mix = MixData::<f32>::new(false);
        assert_eq!(mix.resolve(&3.0, EPS), 3.0);
        let additive = MixData::<f32>::new(true);
        assert_eq!(additive.resolve(&3.0, EPS), 3.0);
    }

    #[test]
    fn under_weight_blend_backfills_default() {
        let mut mix = MixData::<f32>::new(false);
        mix.insert(0.3, 1.0);
        mix.insert(0.2, 2.0);
        // (1, 0.3) + (2, 0.2) + (10, 0.5)
        approx(mix.resolve(&10.0, EPS), 5.7);
    }

    #[test]
    fn backfill_uses_first_free_slot_in_index_order() {
        let mut mix = MixData::<f32>::new(false);
        mix.insert(0.3, 1.0);
        mix.insert(0.2, 2.0);
        mix.insert(0.1, 3.0);
        // Default (weight 0.4) lands in slot 3, after the weaker 0.1 contributor.
        let w_hi = 0.5f32;
        let hi = 1.0 + (2.0 - 1.0) * (0.2 / w_hi);
        let lo = 3.0 + (10.0 - 3.0) * (0.4 / (1.0 - w_hi));
        approx(mix.resolve(&10.0, EPS), lo + (hi - lo) * w_hi);
    }

    #[test]
    fn negligible_low_pair_resolves_to_high_pair() {
        let mut mix = MixData::<f32>::new(false);
        mix.insert(1.0, 1.0);
        mix.insert(0.0995, 2.0);
        mix.insert(1.32e-7, 3.0);
        let r = mix.resolve(&0.0, EPS);
        assert!(r.is_finite());
        approx(r, 1.0 + 0.0995 / 1.0995);

        let mut exact = MixData::<f32>::new(false);
        exact.insert(1.0, 0.0);
        exact.insert(1.0, 4.0);
        exact.insert(1e-10, 8.0);
        let r = exact.resolve(&0.0, 0.0);
        assert!(r.is_finite());
        approx(r, 2.0);
    }

    #[test]
    fn two_contributors_normalize_over_one() {
        let mut mix = MixData::<f32>::new(false);
        mix.insert(1.0, 0.0);
        mix.insert(1.0, 4.0);
        approx(mix.resolve(&100.0, EPS), 2.0);
    }

    #[test]
    fn additive_composes_on_default_without_backfill() {
        let mut mix = MixData::<f32>::new(true);
        mix.insert(0.5, 2.0);
        approx(mix.resolve(&10.0, EPS), 12.0);
    }

    #[test]
    fn quaternion_mix_stays_normalized() {
        let s = std::f32::consts::FRAC_1_SQRT_2;
        let mut mix = MixData::<Quat>::new(false);
        mix.insert(0.6, Quat([0.0, 0.0, s, s]));
        mix.insert(0.4, Quat([0.0, 0.0, 0.0, 1.0]));
        let q = mix.resolve(&Quat([0.0, 0.0, 0.0, 1.0]), EPS).0;
        approx(q.iter().map(|c| c * c).sum::<f32>().sqrt(), 1.0);
    }
}
