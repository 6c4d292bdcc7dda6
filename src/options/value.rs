//! Parsed option values handed to task bodies.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

use super::spec::OptionKind;

/// A single coerced option value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum OptionValue {
    Boolean(bool),
    Numeric(f64),
    String(String),
    Array(Vec<String>),
    Map(BTreeMap<String, String>),
}

impl OptionValue {
    /// The declared kind this value satisfies.
    pub fn kind(&self) -> OptionKind {
        match self {
            OptionValue::Boolean(_) => OptionKind::Boolean,
            OptionValue::Numeric(_) => OptionKind::Numeric,
            OptionValue::String(_) => OptionKind::String,
            OptionValue::Array(_) => OptionKind::Array,
            OptionValue::Map(_) => OptionKind::Map,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            OptionValue::String(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            OptionValue::Boolean(b) => Some(*b),
            _ => None,
        }
    }

    pub fn as_f64(&self) -> Option<f64> {
        match self {
            OptionValue::Numeric(n) => Some(*n),
            _ => None,
        }
    }

    pub fn as_array(&self) -> Option<&[String]> {
        match self {
            OptionValue::Array(items) => Some(items),
            _ => None,
        }
    }

    pub fn as_map(&self) -> Option<&BTreeMap<String, String>> {
        match self {
            OptionValue::Map(map) => Some(map),
            _ => None,
        }
    }
}

impl fmt::Display for OptionValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OptionValue::Boolean(b) => write!(f, "{}", b),
            OptionValue::Numeric(n) if n.fract() == 0.0 && n.abs() < 1e15 => {
                write!(f, "{}", *n as i64)
            }
            OptionValue::Numeric(n) => write!(f, "{}", n),
            OptionValue::String(s) => write!(f, "{}", s),
            OptionValue::Array(items) => write!(f, "{}", items.join(" ")),
            OptionValue::Map(map) => {
                let pairs: Vec<String> = map.iter().map(|(k, v)| format!("{}:{}", k, v)).collect();
                write!(f, "{}", pairs.join(" "))
            }
        }
    }
}

impl From<bool> for OptionValue {
    fn from(value: bool) -> Self {
        OptionValue::Boolean(value)
    }
}

impl From<f64> for OptionValue {
    fn from(value: f64) -> Self {
        OptionValue::Numeric(value)
    }
}

impl From<i64> for OptionValue {
    fn from(value: i64) -> Self {
        OptionValue::Numeric(value as f64)
    }
}

impl From<&str> for OptionValue {
    fn from(value: &str) -> Self {
        OptionValue::String(value.to_string())
    }
}

impl From<String> for OptionValue {
    fn from(value: String) -> Self {
        OptionValue::String(value)
    }
}

impl From<Vec<String>> for OptionValue {
    fn from(value: Vec<String>) -> Self {
        OptionValue::Array(value)
    }
}

impl From<BTreeMap<String, String>> for OptionValue {
    fn from(value: BTreeMap<String, String>) -> Self {
        OptionValue::Map(value)
    }
}

/// Resolved options for one invocation, keyed by option name.
///
/// Lookups accept either `dry-run` or `dry_run`.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct OptionValues(BTreeMap<String, OptionValue>);

impl OptionValues {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, name: &str, value: OptionValue) {
        self.0.insert(normalize(name), value);
    }

    pub fn get(&self, name: &str) -> Option<&OptionValue> {
        self.0.get(&normalize(name))
    }

    pub fn contains(&self, name: &str) -> bool {
        self.0.contains_key(&normalize(name))
    }

    /// String value of an option, if set.
    pub fn string(&self, name: &str) -> Option<&str> {
        self.get(name).and_then(OptionValue::as_str)
    }

    /// Boolean value of an option; unset flags read as `false`.
    pub fn flag(&self, name: &str) -> bool {
        self.get(name).and_then(OptionValue::as_bool).unwrap_or(false)
    }

    pub fn numeric(&self, name: &str) -> Option<f64> {
        self.get(name).and_then(OptionValue::as_f64)
    }

    pub fn array(&self, name: &str) -> Option<&[String]> {
        self.get(name).and_then(OptionValue::as_array)
    }

    pub fn map(&self, name: &str) -> Option<&BTreeMap<String, String>> {
        self.get(name).and_then(OptionValue::as_map)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &OptionValue)> {
        self.0.iter()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// JSON view of the options, as exposed to task results.
    pub fn to_json(&self) -> serde_json::Value {
        serde_json::to_value(self).unwrap_or(serde_json::Value::Null)
    }
}

fn normalize(name: &str) -> String {
    name.trim_start_matches('-').replace('-', "_")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lookup_accepts_dashes_and_underscores() {
        let mut values = OptionValues::new();
        values.insert("dry-run", OptionValue::Boolean(true));
        assert!(values.flag("dry_run"));
        assert!(values.flag("dry-run"));
        assert!(values.contains("--dry-run"));
    }

    #[test]
    fn test_unset_flag_reads_false() {
        let values = OptionValues::new();
        assert!(!values.flag("force"));
        assert_eq!(values.string("name"), None);
    }

    #[test]
    fn test_numeric_display_drops_integral_fraction() {
        assert_eq!(OptionValue::Numeric(3.0).to_string(), "3");
        assert_eq!(OptionValue::Numeric(2.5).to_string(), "2.5");
    }

    #[test]
    fn test_map_display_uses_key_colon_value() {
        let mut map = BTreeMap::new();
        map.insert("a".to_string(), "1".to_string());
        map.insert("b".to_string(), "2".to_string());
        assert_eq!(OptionValue::Map(map).to_string(), "a:1 b:2");
    }

    #[test]
    fn test_to_json_is_untagged() {
        let mut values = OptionValues::new();
        values.insert("count", OptionValue::Numeric(2.0));
        values.insert("tags", OptionValue::Array(vec!["x".into()]));
        assert_eq!(
            values.to_json(),
            serde_json::json!({"count": 2.0, "tags": ["x"]})
        );
    }
}
