//! Solr request parameters
//!
//! Parameters are multi-valued (`facet.field` is repeated once per field),
//! so every key maps to a list of values.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// A parameter value as written in configuration files.
///
/// TOML tables may hold strings, integers, booleans or string arrays:
///
/// ```toml
/// rows = 20
/// facet = true
/// "facet.field" = ["Langue", "Corpus_fac"]
/// ```
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(untagged)]
pub enum ParamValue {
    Text(String),
    Integer(i64),
    Flag(bool),
    List(Vec<String>),
}

impl From<ParamValue> for Vec<String> {
    fn from(value: ParamValue) -> Self {
        match value {
            ParamValue::Text(s) => vec![s],
            ParamValue::Integer(n) => vec![n.to_string()],
            ParamValue::Flag(b) => vec![b.to_string()],
            ParamValue::List(values) => values,
        }
    }
}

/// Ordered, multi-valued set of Solr request parameters.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(
    from = "BTreeMap<String, ParamValue>",
    into = "BTreeMap<String, Vec<String>>"
)]
pub struct SolrParams {
    values: BTreeMap<String, Vec<String>>,
}

impl SolrParams {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace all values of `key` with a single value.
    pub fn set(&mut self, key: impl Into<String>, value: impl ToString) -> &mut Self {
        self.values.insert(key.into(), vec![value.to_string()]);
        self
    }

    /// Add one more value for `key`.
    pub fn append(&mut self, key: impl Into<String>, value: impl ToString) -> &mut Self {
        self.values
            .entry(key.into())
            .or_default()
            .push(value.to_string());
        self
    }

    /// Builder form of [`SolrParams::set`].
    pub fn with(mut self, key: impl Into<String>, value: impl ToString) -> Self {
        self.set(key, value);
        self
    }

    /// First value of `key`.
    pub fn get(&self, key: &str) -> Option<&str> {
        self.values
            .get(key)
            .and_then(|values| values.first())
            .map(String::as_str)
    }

    pub fn get_all(&self, key: &str) -> &[String] {
        self.values.get(key).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.values.contains_key(key)
    }

    pub fn remove(&mut self, key: &str) -> Option<Vec<String>> {
        self.values.remove(key)
    }

    /// Merge `other` into these parameters; keys present in `other` win.
    pub fn merge(&mut self, other: SolrParams) {
        self.values.extend(other.values);
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// Flattened `(key, value)` pairs, one per value, ready for URL encoding.
    pub fn pairs(&self) -> Vec<(&str, &str)> {
        self.values
            .iter()
            .flat_map(|(key, values)| values.iter().map(move |v| (key.as_str(), v.as_str())))
            .collect()
    }
}

impl From<BTreeMap<String, ParamValue>> for SolrParams {
    fn from(map: BTreeMap<String, ParamValue>) -> Self {
        Self {
            values: map.into_iter().map(|(k, v)| (k, v.into())).collect(),
        }
    }
}

impl From<SolrParams> for BTreeMap<String, Vec<String>> {
    fn from(params: SolrParams) -> Self {
        params.values
    }
}

impl<K: Into<String>, V: ToString> FromIterator<(K, V)> for SolrParams {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut params = SolrParams::new();
        for (key, value) in iter {
            params.append(key, value);
        }
        params
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_set_replaces_values() {
        let mut params = SolrParams::new();
        params.append("facet.field", "Langue");
        params.set("facet.field", "Corpus_fac");
        assert_eq!(params.get_all("facet.field"), ["Corpus_fac".to_string()]);
    }

    #[test]
    fn test_append_keeps_all_values() {
        let params: SolrParams = [("facet.field", "Langue"), ("facet.field", "Corpus_fac")]
            .into_iter()
            .collect();
        assert_eq!(params.get_all("facet.field").len(), 2);
        assert_eq!(params.get("facet.field"), Some("Langue"));
    }

    #[test]
    fn test_merge_overrides_keys() {
        let mut params = SolrParams::new().with("rows", 10).with("fl", "ID");
        params.merge(SolrParams::new().with("rows", 50));
        assert_eq!(params.get("rows"), Some("50"));
        assert_eq!(params.get("fl"), Some("ID"));
    }

    #[test]
    fn test_pairs_flatten_multi_values() {
        let params: SolrParams = [("b", "2"), ("a", "1"), ("b", "3")].into_iter().collect();
        assert_eq!(params.pairs(), vec![("a", "1"), ("b", "2"), ("b", "3")]);
    }

    #[test]
    fn test_deserialize_mixed_value_types() {
        let json = r#"{"rows": 20, "facet": true, "fl": "ID", "facet.field": ["Langue", "Annee"]}"#;
        let params: SolrParams = serde_json::from_str(json).unwrap();
        assert_eq!(params.get("rows"), Some("20"));
        assert_eq!(params.get("facet"), Some("true"));
        assert_eq!(params.get("fl"), Some("ID"));
        assert_eq!(params.get_all("facet.field").len(), 2);
    }
}
