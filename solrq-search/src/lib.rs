//! Érudit document search on top of [`solrq`]
//!
//! Reads the parameters of a search request (basic and advanced terms,
//! publication years, facet filters, sorting, paging), compiles them into
//! Solr `q` / `fq` strings and shapes the response into document
//! identifiers and aggregations.
//!
//! - `/recherche?basic_search_term=test&basic_search_field=meta`
//!   → `q = (*:*) AND (Metadonnees:"test")`
//! - `…&filter_years=2015&filter_years=2016`
//!   → `fq = (*:*) AND (((Annee:"2015")) OR (Annee:"2016"))`

pub mod aggregations;
pub mod config;
pub mod document_filter;
pub mod error;
pub mod filters;
pub mod legacy;
pub mod params;

pub use aggregations::{build_aggregations, parse_facet_counts, Aggregations, FacetCounts};
pub use config::Config;
pub use document_filter::{EruditDocumentSolrFilter, FilterOutcome, PageWindow};
pub use error::{Result, SearchError};
pub use filters::{build_solr_filters, SearchClause, SearchOperator, SolrFilters};
pub use params::QueryParams;
