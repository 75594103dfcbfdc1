//! Facet counts shaped into aggregations
//!
//! Solr returns the counts of a facet field as one flat array alternating
//! values and counts: `["fr", 12, "en", 3]`. Each field becomes a
//! `value → count` map stored under the label of the field.

use serde_json::Value;
use std::collections::HashMap;

use crate::error::{Result, SearchError};

/// Counts of one facet field, by value.
pub type FacetCounts = HashMap<String, u64>;

/// Facet counts by aggregation label.
pub type Aggregations = HashMap<String, FacetCounts>;

/// Solr facet field → aggregation label.
pub const AGGREGATION_LABELS: &[(&str, &str)] = &[
    ("Annee", "year"),
    ("AnneePublication", "year"),
    ("TypeArticle_fac", "article_type"),
    ("Langue", "language"),
    ("TitreCollection_fac", "collection"),
    ("Auteur_tri", "author"),
    ("Fonds_fac", "fund"),
    ("Corpus_fac", "publication_type"),
];

pub fn aggregation_label(field: &str) -> Option<&'static str> {
    AGGREGATION_LABELS
        .iter()
        .find(|(f, _)| *f == field)
        .map(|&(_, label)| label)
}

/// Pair up the flat `[value, count, value, count, …]` array of a facet field.
pub fn parse_facet_counts(field: &str, counts: &Value) -> Result<FacetCounts> {
    let invalid = |reason: String| SearchError::Facet {
        field: field.to_string(),
        reason,
    };

    let entries = counts
        .as_array()
        .ok_or_else(|| invalid(format!("expected an array, got {}", counts)))?;
    if entries.len() % 2 != 0 {
        return Err(invalid(format!(
            "odd number of entries ({})",
            entries.len()
        )));
    }

    entries
        .chunks_exact(2)
        .map(|pair| {
            let value = match &pair[0] {
                Value::String(s) => s.clone(),
                Value::Number(n) => n.to_string(),
                other => return Err(invalid(format!("invalid facet value {}", other))),
            };
            let count = pair[1]
                .as_u64()
                .ok_or_else(|| invalid(format!("invalid count {} for '{}'", pair[1], value)))?;
            Ok((value, count))
        })
        .collect()
}

/// Build the aggregations of a result set.
///
/// Fields without a label and fields whose counts cannot be read are logged
/// and left out.
pub fn build_aggregations(facet_fields: &HashMap<String, Value>) -> Aggregations {
    let mut aggregations = Aggregations::new();

    for (field, counts) in facet_fields {
        let Some(label) = aggregation_label(field) else {
            tracing::warn!(field = %field, "Skipping facet field without aggregation label");
            continue;
        };
        match parse_facet_counts(field, counts) {
            Ok(parsed) => {
                aggregations.insert(label.to_string(), parsed);
            }
            Err(e) => tracing::warn!(error = %e, "Skipping facet field"),
        }
    }

    aggregations
}
