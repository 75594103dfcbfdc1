//! Error types for the document search layer

/// Document search errors
#[derive(Debug, thiserror::Error)]
pub enum SearchError {
    #[error("Solr error: {0}")]
    Solr(#[from] solrq::Error),

    #[error("Invalid facet counts for '{field}': {reason}")]
    Facet { field: String, reason: String },

    #[error("Unknown search operator: {0}")]
    UnknownOperator(String),
}

pub type Result<T> = std::result::Result<T, SearchError>;
