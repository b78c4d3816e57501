//! Identifiers for core entities. Handles are dense indices into the engine's tables.

use serde::{Deserialize, Serialize};

/// Handle into the engine's timer table (root or composite).
#[derive(Copy, Clone, Debug, Eq, PartialEq, Ord, PartialOrd, Hash, Serialize, Deserialize)]
pub struct TimerId(pub u32);

/// Handle of a clip record.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Ord, PartialOrd, Hash, Serialize, Deserialize)]
pub struct ClipId(pub u32);

/// Identifier of a bound target (the property a clip's value is written to).
#[derive(Copy, Clone, Debug, Eq, PartialEq, Ord, PartialOrd, Hash, Serialize, Deserialize)]
pub struct TargetId(pub u32);

/// Opaque reference to a curve owned by the host's curve sampler.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash, Serialize, Deserialize)]
pub struct CurveHandle(pub u32);

impl TimerId {
    #[inline]
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

impl ClipId {
    #[inline]
    pub fn index(self) -> usize {
        self.0 as usize
    }
}
