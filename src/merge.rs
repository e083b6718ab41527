//! Read-time merge of stored settings over the complete default object.

use std::collections::BTreeMap;

use serde_json::{Map, Value};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MergePolicy {
    /// The stored value replaces the default whenever it is present and not null.
    StoredWins,
    /// Like `StoredWins`, but an empty string, list or object keeps the default.
    DefaultIfEmpty,
    /// Objects merge key by key (stored wins per key); other values behave like `StoredWins`.
    DeepMerge,
}

#[derive(Debug, Clone)]
pub struct MergeTable {
    fallback: MergePolicy,
    fields: BTreeMap<&'static str, MergePolicy>,
}

impl MergeTable {
    pub fn new(fallback: MergePolicy) -> Self {
        Self {
            fallback,
            fields: BTreeMap::new(),
        }
    }

    pub fn with_field(mut self, field: &'static str, policy: MergePolicy) -> Self {
        self.fields.insert(field, policy);
        self
    }

    /// Policy used for `SiteSettings`: shallow stored-wins, except the hero
    /// slider, which never renders empty.
    pub fn site_settings() -> Self {
        Self::new(MergePolicy::StoredWins).with_field("heroImages", MergePolicy::DefaultIfEmpty)
    }

    pub fn policy_for(&self, field: &str) -> MergePolicy {
        self.fields.get(field).copied().unwrap_or(self.fallback)
    }

    pub fn merge(&self, defaults: &Map<String, Value>, stored: &Map<String, Value>) -> Map<String, Value> {
        let mut out = defaults.clone();
        for (field, value) in stored {
            if value.is_null() {
                continue;
            }
            match self.policy_for(field) {
                MergePolicy::StoredWins => {
                    out.insert(field.clone(), value.clone());
                }
                MergePolicy::DefaultIfEmpty => {
                    if !is_empty(value) || !out.contains_key(field) {
                        out.insert(field.clone(), value.clone());
                    }
                }
                MergePolicy::DeepMerge => {
                    let merged = match (out.get(field), value) {
                        (Some(Value::Object(base)), Value::Object(over)) => {
                            Value::Object(deep_merge(base, over))
                        }
                        _ => value.clone(),
                    };
                    out.insert(field.clone(), merged);
                }
            }
        }
        out
    }
}

fn is_empty(value: &Value) -> bool {
    match value {
        Value::Null => true,
        Value::String(s) => s.is_empty(),
        Value::Array(items) => items.is_empty(),
        Value::Object(map) => map.is_empty(),
        Value::Bool(_) | Value::Number(_) => false,
    }
}

fn deep_merge(base: &Map<String, Value>, over: &Map<String, Value>) -> Map<String, Value> {
    let mut out = base.clone();
    for (key, value) in over {
        let merged = match (out.get(key), value) {
            (Some(Value::Object(b)), Value::Object(o)) => Value::Object(deep_merge(b, o)),
            _ => value.clone(),
        };
        out.insert(key.clone(), merged);
    }
    out
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use serde_json::json;

    use super::*;

    fn obj(value: Value) -> Map<String, Value> {
        match value {
            Value::Object(map) => map,
            other => panic!("expected object, got {other}"),
        }
    }

    #[test]
    fn stored_wins_per_top_level_field() {
        let defaults = obj(json!({"a": "default-a", "b": "default-b"}));
        let stored = obj(json!({"b": "stored-b"}));
        let merged = MergeTable::new(MergePolicy::StoredWins).merge(&defaults, &stored);
        assert_eq!(Value::Object(merged), json!({"a": "default-a", "b": "stored-b"}));
    }

    #[test]
    fn default_if_empty_replaces_empty_list_wholesale() {
        let defaults = obj(json!({"heroImages": ["x", "y"]}));
        let table = MergeTable::site_settings();

        let merged = table.merge(&defaults, &obj(json!({"heroImages": []})));
        assert_eq!(merged["heroImages"], json!(["x", "y"]));

        let merged = table.merge(&defaults, &obj(json!({"heroImages": ["z"]})));
        assert_eq!(merged["heroImages"], json!(["z"]));
    }

    #[test]
    fn null_stored_value_keeps_default() {
        let defaults = obj(json!({"contactPhone": "+254"}));
        let merged = MergeTable::site_settings().merge(&defaults, &obj(json!({"contactPhone": null})));
        assert_eq!(merged["contactPhone"], json!("+254"));
    }

    #[test]
    fn deep_merge_combines_nested_objects() {
        let defaults = obj(json!({"social": {"x": "dx", "youtube": "dy"}}));
        let stored = obj(json!({"social": {"x": "sx"}}));
        let table = MergeTable::new(MergePolicy::StoredWins).with_field("social", MergePolicy::DeepMerge);
        let merged = table.merge(&defaults, &stored);
        assert_eq!(merged["social"], json!({"x": "sx", "youtube": "dy"}));
    }

    #[test]
    fn policy_lookup_falls_back_to_table_default() {
        let table = MergeTable::site_settings();
        assert_eq!(table.policy_for("heroImages"), MergePolicy::DefaultIfEmpty);
        assert_eq!(table.policy_for("logoUrl"), MergePolicy::StoredWins);
    }
}
