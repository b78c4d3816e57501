//! Animated value kinds and their blend operations.
//!
//! The set is closed: float, vec2, vec3, vec4 and quaternion. Each kind
//! implements [`Mixable`] (lerp + additive compose) so the blend algorithm in
//! [`crate::mix`] stays generic without boxing.

use serde::{Deserialize, Serialize};

#[derive(Copy, Clone, Debug, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum ValueKind {
    Float,
    Vec2,
    Vec3,
    Vec4,
    Quat,
}

impl ValueKind {
    /// Number of scalar components.
    #[inline]
    pub fn arity(self) -> usize {
        match self {
            ValueKind::Float => 1,
            ValueKind::Vec2 => 2,
            ValueKind::Vec3 => 3,
            ValueKind::Vec4 | ValueKind::Quat => 4,
        }
    }

    /// Additive identity of the kind (identity rotation for quaternions).
    pub fn identity(self) -> Value {
        match self {
            ValueKind::Float => Value::Float(0.0),
            ValueKind::Vec2 => Value::Vec2([0.0; 2]),
            ValueKind::Vec3 => Value::Vec3([0.0; 3]),
            ValueKind::Vec4 => Value::Vec4([0.0; 4]),
            ValueKind::Quat => Value::Quat(QUAT_IDENTITY),
        }
    }

    /// Builds a value from sampled components. Missing components read as 0;
    /// quaternions are normalized.
    pub fn from_components(self, c: &[f32]) -> Value {
        let at = |i: usize| c.get(i).copied().unwrap_or(0.0);
        match self {
            ValueKind::Float => Value::Float(at(0)),
            ValueKind::Vec2 => Value::Vec2([at(0), at(1)]),
            ValueKind::Vec3 => Value::Vec3([at(0), at(1), at(2)]),
            ValueKind::Vec4 => Value::Vec4([at(0), at(1), at(2), at(3)]),
            ValueKind::Quat => Value::Quat(normalize4([at(0), at(1), at(2), at(3)])),
        }
    }
}

/// Quaternion (x, y, z, w) identity.
pub const QUAT_IDENTITY: [f32; 4] = [0.0, 0.0, 0.0, 1.0];

#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq)]
#[serde(tag = "type", content = "data", rename_all = "lowercase")]
pub enum Value {
    Float(f32),
    Vec2([f32; 2]),
    Vec3([f32; 3]),
    Vec4([f32; 4]),
    /// Quaternion (x, y, z, w)
    Quat([f32; 4]),
}

impl Value {
    #[inline]
    pub fn kind(&self) -> ValueKind {
        match self {
            Value::Float(_) => ValueKind::Float,
            Value::Vec2(_) => ValueKind::Vec2,
            Value::Vec3(_) => ValueKind::Vec3,
            Value::Vec4(_) => ValueKind::Vec4,
            Value::Quat(_) => ValueKind::Quat,
        }
    }
}

/// Blend operations a value type needs for weighted mixing.
pub trait Mixable: Clone {
    fn lerp(a: &Self, b: &Self, t: f32) -> Self;
    /// Composes `delta` on top of `base` (additive blending).
    fn add(base: &Self, delta: &Self) -> Self;
    /// Filler for unused mix slots.
    fn neutral() -> Self;
}

#[inline]
pub fn lerp_f32(a: f32, b: f32, t: f32) -> f32 {
    a + (b - a) * t
}

#[inline]
fn lerp_array<const N: usize>(a: &[f32; N], b: &[f32; N], t: f32) -> [f32; N] {
    let mut out = [0.0f32; N];
    for i in 0..N {
        out[i] = lerp_f32(a[i], b[i], t);
    }
    out
}

#[inline]
fn add_array<const N: usize>(a: &[f32; N], b: &[f32; N]) -> [f32; N] {
    let mut out = [0.0f32; N];
    for i in 0..N {
        out[i] = a[i] + b[i];
    }
    out
}

#[inline]
fn dot4(a: [f32; 4], b: [f32; 4]) -> f32 {
    a[0] * b[0] + a[1] * b[1] + a[2] * b[2] + a[3] * b[3]
}

#[inline]
fn normalize4(mut q: [f32; 4]) -> [f32; 4] {
    let len2 = dot4(q, q);
    if len2 > 0.0 {
        let inv_len = len2.sqrt().recip();
        q[0] *= inv_len;
        q[1] *= inv_len;
        q[2] *= inv_len;
        q[3] *= inv_len;
        q
    } else {
        QUAT_IDENTITY
    }
}

/// Quaternion NLERP with shortest-arc correction.
/// If dot < 0, negate the second quaternion to ensure the shortest path.
/// Returns a normalized quaternion (x,y,z,w).
#[inline]
pub fn nlerp_quat(a: [f32; 4], mut b: [f32; 4], t: f32) -> [f32; 4] {
    if dot4(a, b) < 0.0 {
        b = [-b[0], -b[1], -b[2], -b[3]];
    }
    normalize4(lerp_array(&a, &b, t))
}

/// Hamilton product `a * b` on (x, y, z, w) quaternions.
#[inline]
pub fn mul_quat(a: [f32; 4], b: [f32; 4]) -> [f32; 4] {
    let [ax, ay, az, aw] = a;
    let [bx, by, bz, bw] = b;
    [
        aw * bx + ax * bw + ay * bz - az * by,
        aw * by - ax * bz + ay * bw + az * bx,
        aw * bz + ax * by - ay * bx + az * bw,
        aw * bw - ax * bx - ay * by - az * bz,
    ]
}

impl Mixable for f32 {
    fn lerp(a: &Self, b: &Self, t: f32) -> Self {
        lerp_f32(*a, *b, t)
    }
    fn add(base: &Self, delta: &Self) -> Self {
        base + delta
    }
    fn neutral() -> Self {
        0.0
    }
}

impl<const N: usize> Mixable for [f32; N] {
    fn lerp(a: &Self, b: &Self, t: f32) -> Self {
        lerp_array(a, b, t)
    }
    fn add(base: &Self, delta: &Self) -> Self {
        add_array(base, delta)
    }
    fn neutral() -> Self {
        [0.0; N]
    }
}

/// Rotation wrapper so quaternions blend as rotations, not as vec4s.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Quat(pub [f32; 4]);

impl Mixable for Quat {
    fn lerp(a: &Self, b: &Self, t: f32) -> Self {
        Quat(nlerp_quat(a.0, b.0, t))
    }
    fn add(base: &Self, delta: &Self) -> Self {
        Quat(normalize4(mul_quat(base.0, delta.0)))
    }
    fn neutral() -> Self {
        Quat(QUAT_IDENTITY)
    }
}

impl Mixable for Value {
    /// Mismatched kinds step: `a` below `t = 0.5`, `b` from there on.
    fn lerp(a: &Self, b: &Self, t: f32) -> Self {
        match (a, b) {
            (Value::Float(x), Value::Float(y)) => Value::Float(lerp_f32(*x, *y, t)),
            (Value::Vec2(x), Value::Vec2(y)) => Value::Vec2(lerp_array(x, y, t)),
            (Value::Vec3(x), Value::Vec3(y)) => Value::Vec3(lerp_array(x, y, t)),
            (Value::Vec4(x), Value::Vec4(y)) => Value::Vec4(lerp_array(x, y, t)),
            (Value::Quat(x), Value::Quat(y)) => Value::Quat(nlerp_quat(*x, *y, t)),
            _ => {
                if t < 0.5 {
                    *a
                } else {
                    *b
                }
            }
        }
    }

    /// Mismatched kinds keep `base`.
    fn add(base: &Self, delta: &Self) -> Self {
        match (base, delta) {
            (Value::Float(x), Value::Float(y)) => Value::Float(x + y),
            (Value::Vec2(x), Value::Vec2(y)) => Value::Vec2(add_array(x, y)),
            (Value::Vec3(x), Value::Vec3(y)) => Value::Vec3(add_array(x, y)),
            (Value::Vec4(x), Value::Vec4(y)) => Value::Vec4(add_array(x, y)),
            (Value::Quat(x), Value::Quat(y)) => Value::Quat(normalize4(mul_quat(*x, *y))),
            _ => *base,
        }
    }

    fn neutral() -> Self {
        Value::Float(0.0)
    }
}
