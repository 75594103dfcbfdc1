//! Search results returned by Solr
//!
//! Only the parts the search layer reads are modelled: the matching
//! documents, the hit count and the raw facet field counts.

use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::HashMap;

/// A stored Solr document.
pub type Document = Map<String, Value>;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SolrResults {
    /// Documents of the requested page
    pub docs: Vec<Document>,
    /// Total number of matching documents (`numFound`)
    pub hits: u64,
    /// Offset of the first returned document
    pub start: u64,
    /// Raw `facet_counts.facet_fields` entries, one flat value/count array per field
    pub facet_fields: HashMap<String, Value>,
}

#[derive(Deserialize)]
struct ResponseBody {
    response: Option<ResponseSection>,
    #[serde(default)]
    facet_counts: Option<FacetCounts>,
}

#[derive(Deserialize)]
struct ResponseSection {
    #[serde(rename = "numFound")]
    num_found: u64,
    #[serde(default)]
    start: u64,
    #[serde(default)]
    docs: Vec<Document>,
}

#[derive(Deserialize)]
struct FacetCounts {
    #[serde(default)]
    facet_fields: HashMap<String, Value>,
}

impl SolrResults {
    /// Parse a Solr JSON response (`wt=json`).
    pub fn from_json(body: &str) -> Result<Self> {
        let body: ResponseBody = serde_json::from_str(body)?;
        let response = body
            .response
            .ok_or_else(|| Error::InvalidResponse("missing 'response' section".to_string()))?;

        Ok(Self {
            docs: response.docs,
            hits: response.num_found,
            start: response.start,
            facet_fields: body.facet_counts.map(|f| f.facet_fields).unwrap_or_default(),
        })
    }

    /// Identifiers (`ID` field) of the returned documents, in result order.
    pub fn ids(&self) -> Vec<&str> {
        self.docs.iter().filter_map(document_id).collect()
    }
}

/// The `ID` of a document, when it is a string.
pub fn document_id(doc: &Document) -> Option<&str> {
    doc.get("ID").and_then(Value::as_str)
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = r#"{
        "responseHeader": {"status": 0, "QTime": 3},
        "response": {
            "numFound": 42,
            "start": 10,
            "docs": [
                {"ID": "1035302ar", "Corpus_fac": "Article"},
                {"ID": "unb:scl21_1art05", "Corpus_fac": "Culturel"},
                {"Corpus_fac": "Thèses"}
            ]
        },
        "facet_counts": {
            "facet_queries": {},
            "facet_fields": {"Corpus_fac": ["Article", 12, "Culturel", 14]}
        }
    }"#;

    #[test]
    fn test_parse_response() {
        let results = SolrResults::from_json(SAMPLE).unwrap();
        assert_eq!(results.hits, 42);
        assert_eq!(results.start, 10);
        assert_eq!(results.docs.len(), 3);
        assert!(results.facet_fields.contains_key("Corpus_fac"));
    }

    #[test]
    fn test_ids_skip_documents_without_id() {
        let results = SolrResults::from_json(SAMPLE).unwrap();
        assert_eq!(results.ids(), vec!["1035302ar", "unb:scl21_1art05"]);
    }

    #[test]
    fn test_facets_are_optional() {
        let results =
            SolrResults::from_json(r#"{"response": {"numFound": 0, "docs": []}}"#).unwrap();
        assert_eq!(results.hits, 0);
        assert!(results.facet_fields.is_empty());
    }

    #[test]
    fn test_missing_response_section_is_an_error() {
        let err = SolrResults::from_json(r#"{"error": {"msg": "undefined field"}}"#).unwrap_err();
        assert!(matches!(err, Error::InvalidResponse(_)));
    }

    #[test]
    fn test_malformed_json_is_an_error() {
        let err = SolrResults::from_json("<html>").unwrap_err();
        assert!(matches!(err, Error::Json(_)));
    }
}
