//! Target table.
//!
//! Targets are identified by a small string key (the host's property path) and
//! resolved once to a dense [`TargetId`]. Each row carries the default value
//! blends resolve against and whether blends compose additively on top of it.

use hashbrown::HashMap;

use crate::error::{Result, TimelineError};
use crate::ids::TargetId;
use crate::value::{Value, ValueKind};

/// One row in the target table.
#[derive(Clone, Debug, PartialEq)]
pub struct TargetRow {
    pub name: String,
    pub default: Value,
    pub additive: bool,
}

impl TargetRow {
    #[inline]
    pub fn kind(&self) -> ValueKind {
        self.default.kind()
    }

    /// A later timeline may bind this row again only with an identical
    /// kind, additive flag and default.
    pub fn check_redeclared(&self, default: &Value, additive: bool) -> Result<()> {
        let conflict = if self.kind() != default.kind() {
            Some((
                "kind",
                format!("{:?}", self.kind()),
                format!("{:?}", default.kind()),
            ))
        } else if self.additive != additive {
            Some(("additive", self.additive.to_string(), additive.to_string()))
        } else if self.default != *default {
            Some((
                "default",
                format!("{:?}", self.default),
                format!("{:?}", default),
            ))
        } else {
            None
        };
        match conflict {
            Some((field, existing, declared)) => Err(TimelineError::TargetRedeclared {
                name: self.name.clone(),
                field,
                existing,
                declared,
            }),
            None => Ok(()),
        }
    }
}

#[derive(Default, Debug)]
pub struct TargetTable {
    rows: Vec<TargetRow>,
    by_name: HashMap<String, TargetId>,
}

impl TargetTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn get(&self, id: TargetId) -> Option<&TargetRow> {
        self.rows.get(id.0 as usize)
    }

    pub fn lookup(&self, name: &str) -> Option<TargetId> {
        self.by_name.get(name).copied()
    }

    /// Returns the existing id for `name`, or appends a new row.
    pub fn upsert(&mut self, row: TargetRow) -> TargetId {
        if let Some(id) = self.by_name.get(&row.name) {
            return *id;
        }
        let id = TargetId(self.rows.len() as u32);
        self.by_name.insert(row.name.clone(), id);
        self.rows.push(row);
        id
    }

    /// Replaces the default value of an existing target, keeping its kind.
    pub fn set_default(&mut self, id: TargetId, default: Value) -> bool {
        match self.rows.get_mut(id.0 as usize) {
            Some(row) if row.kind() == default.kind() => {
                row.default = default;
                true
            }
            _ => false,
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = (TargetId, &TargetRow)> {
        self.rows
            .iter()
            .enumerate()
            .map(|(i, r)| (TargetId(i as u32), r))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn upsert_reuses_existing_name() {
        let mut table = TargetTable::new();
        let row = TargetRow {
            name: "node/opacity".into(),
            default: Value::Float(1.0),
            additive: false,
        };
        let a = table.upsert(row.clone());
        let b = table.upsert(row);
        assert_eq!(a, b);
        assert_eq!(table.len(), 1);
        assert!(!table.set_default(a, Value::Vec2([0.0, 0.0])));
        assert!(table.set_default(a, Value::Float(0.5)));
        assert_eq!(table.get(a).map(|r| r.default), Some(Value::Float(0.5)));
    }

    #[test]
    fn redeclaration_must_match_every_field() {
        let row = TargetRow {
            name: "node/offset".into(),
            default: Value::Vec2([0.0, 0.0]),
            additive: true,
        };
        assert!(row.check_redeclared(&Value::Vec2([0.0, 0.0]), true).is_ok());

        let field_of = |default: Value, additive: bool| {
            match row.check_redeclared(&default, additive) {
                Err(TimelineError::TargetRedeclared { field, .. }) => field,
                other => panic!("expected a redeclaration error, got {other:?}"),
            }
        };
        assert_eq!(field_of(Value::Float(0.0), true), "kind");
        assert_eq!(field_of(Value::Vec2([0.0, 0.0]), false), "additive");
        assert_eq!(field_of(Value::Vec2([1.0, 0.0]), true), "default");
    }
}
