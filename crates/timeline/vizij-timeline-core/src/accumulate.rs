//! Accumulation of per-target contributions and resolution into final Values.
//!
//! Contributions are gathered per shard (a contiguous chunk of clips, in clip
//! handle order) and merged into the [`BlendMap`] sequentially, shard by
//! shard. Gathering touches only its own chunk, so shards may be produced in
//! parallel; the sequential merge keeps the tie-break deterministic: among
//! equal weights the lower clip handle keeps the earlier slot.

use hashbrown::HashMap;

use crate::binding::TargetTable;
use crate::clip::{ClipRecord, CurveSampler};
use crate::ids::TargetId;
use crate::mix::MixData;
use crate::value::Value;

/// One active clip's output for this tick.
#[derive(Clone, Debug, PartialEq)]
pub struct Contribution {
    pub target: TargetId,
    /// `None` for unweighted clips.
    pub weight: Option<f32>,
    pub value: Value,
}

/// Collects contributions of the active clips in `clips`.
pub fn gather_shard(clips: &[ClipRecord], sampler: &dyn CurveSampler, out: &mut Vec<Contribution>) {
    out.clear();
    for clip in clips.iter().filter(|c| c.active) {
        let t = clip.local_secs();
        out.push(Contribution {
            target: clip.target,
            weight: clip.weight.map(|w| w.sample(sampler, t)),
            value: clip.value.sample(sampler, t),
        });
    }
}

/// Per-tick map from target to its accumulated mix. Rebuilt every tick.
#[derive(Default, Debug)]
pub struct BlendMap {
    map: HashMap<TargetId, MixData<Value>>,
}

impl BlendMap {
    pub fn new() -> Self {
        Self::default()
    }

    /// Clears last tick's entries and presizes for `capacity` targets.
    pub fn begin_tick(&mut self, capacity: usize) {
        self.map.clear();
        self.map.reserve(capacity);
    }

    pub fn len(&self) -> usize {
        self.map.len()
    }

    pub fn is_empty(&self) -> bool {
        self.map.is_empty()
    }

    pub fn get(&self, target: TargetId) -> Option<&MixData<Value>> {
        self.map.get(&target)
    }

    /// Unweighted write: replaces whatever the target holds.
    pub fn write_unweighted(&mut self, target: TargetId, value: Value, additive: bool) {
        self.map.insert(target, MixData::single(value, additive));
    }

    /// Weighted write: ordered top-4 insertion.
    pub fn insert_weighted(
        &mut self,
        target: TargetId,
        weight: f32,
        value: Value,
        additive: bool,
    ) -> bool {
        self.map
            .entry(target)
            .or_insert_with(|| MixData::new(additive))
            .insert(weight, value)
    }

    /// Merges gathered shards: every unweighted contribution first, then every
    /// weighted one, each pass in shard order.
    pub fn merge_shards(&mut self, shards: &[Vec<Contribution>], targets: &TargetTable) {
        let additive = |t: TargetId| targets.get(t).map(|r| r.additive).unwrap_or(false);
        for c in shards.iter().flatten().filter(|c| c.weight.is_none()) {
            self.write_unweighted(c.target, c.value, additive(c.target));
        }
        for c in shards.iter().flatten() {
            if let Some(w) = c.weight {
                self.insert_weighted(c.target, w, c.value, additive(c.target));
            }
        }
    }

    /// Resolves every accumulated target against its default, ordered by target id.
    pub fn resolve(&self, targets: &TargetTable, epsilon: f32) -> Vec<(TargetId, Value)> {
        let mut out: Vec<(TargetId, Value)> = self
            .map
            .iter()
            .filter_map(|(id, mix)| {
                let row = targets.get(*id)?;
                Some((*id, mix.resolve(&row.default, epsilon)))
            })
            .collect();
        out.sort_by_key(|(id, _)| *id);
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::binding::TargetRow;

    fn targets() -> (TargetTable, TargetId) {
        let mut table = TargetTable::new();
        let id = table.upsert(TargetRow {
            name: "x".into(),
            default: Value::Float(0.0),
            additive: false,
        });
        (table, id)
    }

    fn weighted(target: TargetId, w: f32, v: f32) -> Contribution {
        Contribution {
            target,
            weight: Some(w),
            value: Value::Float(v),
        }
    }

    #[test]
    fn unweighted_last_writer_wins() {
        let (table, x) = targets();
        let mut map = BlendMap::new();
        map.begin_tick(4);
        let shards = vec![
            vec![Contribution {
                target: x,
                weight: None,
                value: Value::Float(1.0),
            }],
            vec![Contribution {
                target: x,
                weight: None,
                value: Value::Float(2.0),
            }],
        ];
        map.merge_shards(&shards, &table);
        assert_eq!(map.resolve(&table, f32::EPSILON), vec![(x, Value::Float(2.0))]);
    }

    #[test]
    fn ties_across_shards_favor_earlier_shard() {
        let (table, x) = targets();
        let mut map = BlendMap::new();
        map.begin_tick(1);
        let shards = vec![
            vec![weighted(x, 0.5, 1.0)],
            vec![weighted(x, 0.5, 2.0), weighted(x, 0.6, 3.0)],
        ];
        map.merge_shards(&shards, &table);
        let mix = map.get(x).cloned().unwrap();
        assert_eq!(mix.weights, [0.6, 0.5, 0.5, 0.0]);
        assert_eq!(mix.values[1], Value::Float(1.0));
        assert_eq!(mix.values[2], Value::Float(2.0));
    }

    #[test]
    fn begin_tick_clears_previous_entries() {
        let (table, x) = targets();
        let mut map = BlendMap::new();
        map.begin_tick(1);
        map.merge_shards(&[vec![weighted(x, 1.0, 5.0)]], &table);
        assert_eq!(map.len(), 1);
        map.begin_tick(1);
        assert!(map.is_empty());
    }
}
