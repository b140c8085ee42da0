//! Instance prop storage.
//!
//! Props are split into values whose names the registry schema declares and
//! an explicit bucket of extra, undeclared values. The split is decided by
//! whoever constructs the map (the registry at the store boundary); on the
//! wire both halves serialize as one flat JSON object.

use serde::de::Deserializer;
use serde::ser::{SerializeMap, Serializer};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;

#[derive(Debug, Clone, Default)]
pub struct PropMap {
    declared: BTreeMap<String, Value>,
    extra: BTreeMap<String, Value>,
}

impl PropMap {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a map, routing each value by `is_declared`
    pub fn classified(
        values: impl IntoIterator<Item = (String, Value)>,
        is_declared: impl Fn(&str) -> bool,
    ) -> Self {
        let mut map = Self::new();
        for (name, value) in values {
            if is_declared(&name) {
                map.declared.insert(name, value);
            } else {
                map.extra.insert(name, value);
            }
        }
        map
    }

    /// Re-route every value, e.g. after loading from storage
    pub fn reclassify(self, is_declared: impl Fn(&str) -> bool) -> Self {
        Self::classified(self.into_values(), is_declared)
    }

    pub fn get(&self, name: &str) -> Option<&Value> {
        self.declared.get(name).or_else(|| self.extra.get(name))
    }

    pub fn get_str(&self, name: &str) -> Option<&str> {
        self.get(name).and_then(Value::as_str)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.declared.contains_key(name) || self.extra.contains_key(name)
    }

    pub fn is_declared(&self, name: &str) -> bool {
        self.declared.contains_key(name)
    }

    pub fn declared(&self) -> &BTreeMap<String, Value> {
        &self.declared
    }

    pub fn extra(&self) -> &BTreeMap<String, Value> {
        &self.extra
    }

    pub fn insert_declared(&mut self, name: impl Into<String>, value: Value) {
        let name = name.into();
        self.extra.remove(&name);
        self.declared.insert(name, value);
    }

    pub fn insert_extra(&mut self, name: impl Into<String>, value: Value) {
        let name = name.into();
        self.declared.remove(&name);
        self.extra.insert(name, value);
    }

    /// Shallow merge: every key in `patch` overwrites the current value
    pub fn merge(&mut self, patch: &PropMap) {
        for (name, value) in &patch.declared {
            self.insert_declared(name.clone(), value.clone());
        }
        for (name, value) in &patch.extra {
            // a key the schema already declares stays declared
            if self.declared.contains_key(name) {
                self.declared.insert(name.clone(), value.clone());
            } else {
                self.extra.insert(name.clone(), value.clone());
            }
        }
    }

    pub fn remove(&mut self, name: &str) -> Option<Value> {
        self.declared
            .remove(name)
            .or_else(|| self.extra.remove(name))
    }

    pub fn len(&self) -> usize {
        self.declared.len() + self.extra.len()
    }

    pub fn is_empty(&self) -> bool {
        self.declared.is_empty() && self.extra.is_empty()
    }

    /// All values in name order, declared and extra interleaved
    pub fn iter(&self) -> impl Iterator<Item = (&String, &Value)> {
        let mut all: Vec<(&String, &Value)> =
            self.declared.iter().chain(self.extra.iter()).collect();
        all.sort_by(|a, b| a.0.cmp(b.0));
        all.into_iter()
    }

    pub fn into_values(self) -> BTreeMap<String, Value> {
        let mut all = self.declared;
        all.extend(self.extra);
        all
    }

    pub fn to_json(&self) -> Value {
        Value::Object(
            self.iter()
                .map(|(k, v)| (k.clone(), v.clone()))
                .collect(),
        )
    }
}

impl PartialEq for PropMap {
    fn eq(&self, other: &Self) -> bool {
        self.len() == other.len() && self.iter().eq(other.iter())
    }
}

impl FromIterator<(String, Value)> for PropMap {
    fn from_iter<T: IntoIterator<Item = (String, Value)>>(iter: T) -> Self {
        Self {
            declared: BTreeMap::new(),
            extra: iter.into_iter().collect(),
        }
    }
}

impl Serialize for PropMap {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.len()))?;
        for (k, v) in self.iter() {
            map.serialize_entry(k, v)?;
        }
        map.end()
    }
}

impl<'de> Deserialize<'de> for PropMap {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        // unclassified until a schema is applied
        let values = BTreeMap::<String, Value>::deserialize(deserializer)?;
        Ok(Self {
            declared: BTreeMap::new(),
            extra: values,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn schema(name: &str) -> bool {
        matches!(name, "headline" | "title")
    }

    #[test]
    fn test_classified_split() {
        let map = PropMap::classified(
            vec![
                ("headline".to_string(), json!("Hi")),
                ("data-test".to_string(), json!("x")),
            ],
            schema,
        );

        assert!(map.is_declared("headline"));
        assert!(!map.is_declared("data-test"));
        assert_eq!(map.extra().len(), 1);
        assert_eq!(map.get_str("data-test"), Some("x"));
    }

    #[test]
    fn test_serializes_flat_and_compares_by_content() {
        let map = PropMap::classified(
            vec![
                ("headline".to_string(), json!("Hi")),
                ("extra".to_string(), json!(1)),
            ],
            schema,
        );

        let json = serde_json::to_value(&map).unwrap();
        assert_eq!(json, json!({"extra": 1, "headline": "Hi"}));

        let back: PropMap = serde_json::from_value(json).unwrap();
        assert_eq!(back, map);
        assert!(!back.is_declared("headline"));
        assert!(back.reclassify(schema).is_declared("headline"));
    }

    #[test]
    fn test_merge_overwrites_and_keeps_declared_side() {
        let mut map = PropMap::classified(vec![("title".to_string(), json!("Old"))], schema);
        let patch: PropMap = vec![
            ("title".to_string(), json!("New")),
            ("other".to_string(), json!(true)),
        ]
        .into_iter()
        .collect();

        map.merge(&patch);
        assert_eq!(map.get_str("title"), Some("New"));
        assert!(map.is_declared("title"));
        assert!(!map.is_declared("other"));

        let once = map.clone();
        map.merge(&patch);
        assert_eq!(map, once);
    }
}
