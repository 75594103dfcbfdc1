//! Érudit document filter
//!
//! Turns the query parameters of a search request into a Solr query, runs it
//! and returns what the listing needs: the hit count, the identifiers of the
//! documents of the requested page and the facet aggregations.
//!
//! The basic and advanced search terms go into `q`; every other filter
//! narrows `fq` so it does not weigh on relevance.

use serde::Serialize;
use solrq::{solr_escape, Query, Search, SolrParams, Q};
use std::sync::Arc;
use std::time::Duration;

use crate::aggregations::{build_aggregations, Aggregations};
use crate::config::{Config, SearchConfig};
use crate::error::Result;
use crate::filters::{build_solr_filters, is_search_field, SearchClause, SearchOperator, SolrFilters};
use crate::legacy::{add_correspondences_to_search_query, group_results_by_field_correspondence};
use crate::params::QueryParams;

/// Sorting applied when the request does not ask for one.
pub const DEFAULT_SORT: &str = "relevance";

/// Prefixes removed from the Solr identifiers of documents.
const DROPPED_ID_PREFIXES: &[&str] = &["unb:"];

/// Outcome of a filtered search.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct FilterOutcome {
    /// Total number of matching documents
    pub count: u64,
    /// Identifiers of the documents of the requested page
    pub localidentifiers: Vec<String>,
    pub aggregations: Aggregations,
}

/// Rows of one result page.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct PageWindow {
    pub rows: usize,
    pub start: usize,
}

impl PageWindow {
    /// Read `page` and `page_size` from the request.
    ///
    /// A missing or invalid page size falls back to `default_size` and is
    /// capped at `max_size`; a missing or invalid page is the first one.
    pub fn from_params(params: &QueryParams, default_size: usize, max_size: usize) -> Self {
        let rows = params
            .get("page_size")
            .and_then(|s| s.trim().parse::<usize>().ok())
            .filter(|&n| n > 0)
            .unwrap_or(default_size)
            .min(max_size);
        let page = params
            .get("page")
            .and_then(|s| s.trim().parse::<usize>().ok())
            .unwrap_or(1);

        Self {
            rows,
            start: page.saturating_sub(1).saturating_mul(rows),
        }
    }
}

/// Solr `sort` value for a `sort_by` request value.
pub fn solr_sorting(sort_by: &str) -> Option<&'static str> {
    match sort_by {
        "relevance" => Some("score desc"),
        "title_asc" => Some("Titre_tri asc"),
        "title_desc" => Some("Titre_tri desc"),
        "author_asc" => Some("Auteur_tri asc"),
        "author_desc" => Some("Auteur_tri desc"),
        "pubdate_asc" => Some("DateAjoutErudit asc"),
        "pubdate_desc" => Some("DateAjoutErudit desc"),
        _ => None,
    }
}

/// Term as searched in a logical field.
///
/// `*` matches everything and wildcard terms are escaped but left unquoted;
/// any other term is searched as a phrase.
pub fn prepare_term(term: &str) -> String {
    if term == "*" {
        term.to_string()
    } else if term.contains('*') {
        solr_escape(term)
    } else {
        quote(term)
    }
}

/// Quote a value as a phrase.
pub fn quote(value: &str) -> String {
    format!("\"{}\"", value.replace('\\', "\\\\").replace('"', "\\\""))
}

/// Document identifier without its source prefix.
pub fn clean_localidentifier(id: &str) -> String {
    DROPPED_ID_PREFIXES
        .iter()
        .fold(id.to_string(), |id, prefix| id.replace(prefix, ""))
}

/// Filter backend of the Érudit document search.
#[derive(Debug, Clone)]
pub struct EruditDocumentSolrFilter {
    search: Search,
    settings: SearchConfig,
}

impl EruditDocumentSolrFilter {
    pub fn new(search: Search, settings: SearchConfig) -> Self {
        Self { search, settings }
    }

    /// Filter searching the Solr core of `config`.
    pub fn from_config(config: &Config) -> Result<Self> {
        let client = solrq::HttpSolrClient::new(
            &config.solr.base_url,
            Duration::from_secs(config.solr.timeout_secs),
        )?;
        let search = Search::new(Arc::new(client))
            .with_filters_mapping(config.search.filters_mapping.clone())
            .with_extra_params(config.solr.extra_params.clone());

        Ok(Self::new(search, config.search.clone()))
    }

    pub fn search(&self) -> &Search {
        &self.search
    }

    pub fn settings(&self) -> &SearchConfig {
        &self.settings
    }

    /// Read the request filters; searched fields must be advanced search
    /// fields or keys of the filters mapping.
    pub fn build_solr_filters(&self, params: &QueryParams) -> SolrFilters {
        let mapping = self.search.filters_mapping();
        build_solr_filters(params, self.settings.max_advanced_parameters, |field| {
            is_search_field(field) || mapping.contains_key(field)
        })
    }

    /// Compile the filters into a query over every document.
    pub fn apply_solr_filters(&self, filters: &SolrFilters) -> Query<'_> {
        let query = Query::match_all(&self.search).filter_safe([main_query(filters)], NO_FIELDS);

        let mut query = match year_range(filters) {
            Some(range) => query.filter_query_safe([], [("Annee", range)]),
            None => query,
        };

        for filter in &filters.field_filters {
            query = filter_solr_multiple(&query, filter.field, &filter.values);
        }

        if let Some(extra_q) = &filters.extra_q {
            query = query.filter_query_safe([], [("TexteComplet", prepare_term(extra_q))]);
        }

        query
    }

    /// Solr sorting requested by `sort_by`.
    pub fn get_solr_sorting(&self, params: &QueryParams) -> Option<&'static str> {
        solr_sorting(params.get("sort_by").unwrap_or(DEFAULT_SORT))
    }

    /// Restrict a query to the configured corpora and fund.
    pub fn restrict<'a>(&self, query: &Query<'a>) -> Query<'a> {
        let corpora = self
            .settings
            .corpora
            .iter()
            .map(|corpus| Q::field("Corpus_fac", corpus.as_str()))
            .reduce(|acc, q| acc | q);
        let fund: Vec<(&str, &str)> = self
            .settings
            .fund
            .iter()
            .map(|fund| ("Fonds_fac", fund.as_str()))
            .collect();

        query.filter(corpora, fund)
    }

    /// Run the search described by the request parameters.
    pub async fn filter(&self, params: &QueryParams) -> Result<FilterOutcome> {
        let params = self
            .settings
            .correspondences
            .iter()
            .fold(params.clone(), |params, c| {
                add_correspondences_to_search_query(&params, &c.param, &c.values)
            });

        let filters = self.build_solr_filters(&params);
        let query = self.restrict(&self.apply_solr_filters(&filters));

        let window = PageWindow::from_params(
            &params,
            self.settings.default_page_size,
            self.settings.max_page_size,
        );
        let mut overrides = SolrParams::new()
            .with("rows", window.rows)
            .with("start", window.start);
        if let Some(sort) = self.get_solr_sorting(&params) {
            overrides.set("sort", sort);
        }

        tracing::debug!(
            q = query.q().unwrap_or_default(),
            fq = query.fq().unwrap_or_default(),
            rows = window.rows,
            start = window.start,
            "Filtering Érudit documents"
        );
        let results = query.get_results(overrides).await?;

        let mut aggregations = build_aggregations(&results.facet_fields);
        for c in &self.settings.correspondences {
            group_results_by_field_correspondence(&mut aggregations, &c.aggregation, &c.values);
        }

        Ok(FilterOutcome {
            count: results.hits,
            localidentifiers: results.ids().into_iter().map(clean_localidentifier).collect(),
            aggregations,
        })
    }
}

const NO_FIELDS: [(&str, &str); 0] = [];

/// Basic search clause, then each advanced clause folded in from the left.
fn main_query(filters: &SolrFilters) -> Q {
    let basic = clause_q(&filters.basic);
    let basic = match filters.basic.operator {
        Some(SearchOperator::Not) => !basic,
        _ => basic,
    };

    filters.advanced.iter().fold(basic, |query, clause| {
        let q = clause_q(clause);
        match clause.operator {
            Some(SearchOperator::Or) => query | q,
            Some(SearchOperator::Not) => query & !q,
            Some(SearchOperator::And) | None => query & q,
        }
    })
}

fn clause_q(clause: &SearchClause) -> Q {
    Q::field(clause.field.as_str(), prepare_term(&clause.term))
}

/// `[start TO end]`, `*` standing for a missing or non-numeric bound.
fn year_range(filters: &SolrFilters) -> Option<String> {
    let bound = |year: &Option<String>| {
        year.as_deref()
            .map(str::trim)
            .filter(|y| y.parse::<i32>().is_ok())
            .map(str::to_string)
    };
    let start = bound(&filters.pub_year_start);
    let end = bound(&filters.pub_year_end);
    if start.is_none() && end.is_none() {
        return None;
    }

    Some(format!(
        "[{} TO {}]",
        start.as_deref().unwrap_or("*"),
        end.as_deref().unwrap_or("*")
    ))
}

/// Narrow `fq` to documents whose `field` has any of `values`.
fn filter_solr_multiple<'a>(query: &Query<'a>, field: &str, values: &[String]) -> Query<'a> {
    let mut any = Q::empty();
    for value in values {
        any |= Q::field(field, quote(value));
    }
    query.filter_query_safe([any], NO_FIELDS)
}
