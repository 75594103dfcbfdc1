//! Query-string compiler
//!
//! A [`Query`] holds the compiled `q` and `fq` strings of one search. Every
//! filtering call returns a new `Query` whose strings wrap the previous ones,
//! so a base query can be shared and refined in several directions.

use crate::escape::{escape_colons, solr_escape};
use crate::error::Result;
use crate::params::SolrParams;
use crate::q::{Clause, Operand, Q};
use crate::results::SolrResults;
use crate::search::Search;

/// Solr query matching every document.
pub const MATCH_ALL: &str = "*:*";

#[derive(Debug, Clone)]
pub struct Query<'a> {
    search: &'a Search,
    q: Option<String>,
    fq: Option<String>,
}

impl<'a> Query<'a> {
    /// Query without any condition yet.
    pub fn new(search: &'a Search) -> Self {
        Self {
            search,
            q: None,
            fq: None,
        }
    }

    /// Query whose `q` and `fq` both start from [`MATCH_ALL`].
    pub fn match_all(search: &'a Search) -> Self {
        Self::with_base(search, Some(MATCH_ALL.to_string()), Some(MATCH_ALL.to_string()))
    }

    pub fn with_base(search: &'a Search, q: Option<String>, fq: Option<String>) -> Self {
        Self { search, q, fq }
    }

    /// Compiled main query string.
    pub fn q(&self) -> Option<&str> {
        self.q.as_deref()
    }

    /// Compiled filter query string.
    pub fn fq(&self) -> Option<&str> {
        self.fq.as_deref()
    }

    pub fn search(&self) -> &'a Search {
        self.search
    }

    /// Narrow the main query with `Q` expressions and keyword clauses.
    ///
    /// Values are fully escaped, see [`solr_escape`].
    pub fn filter(&self, args: impl IntoIterator<Item = Q>, kwargs: impl Into<Clause>) -> Self {
        let q = self.prepare_querystring(self.q.as_deref(), args, &kwargs.into(), false);
        Self::with_base(self.search, Some(q), self.fq.clone())
    }

    /// Like [`Query::filter`], but values only get their `:` escaped.
    pub fn filter_safe(
        &self,
        args: impl IntoIterator<Item = Q>,
        kwargs: impl Into<Clause>,
    ) -> Self {
        let q = self.prepare_querystring(self.q.as_deref(), args, &kwargs.into(), true);
        Self::with_base(self.search, Some(q), self.fq.clone())
    }

    /// Narrow the filter query; relevance scoring is left untouched.
    pub fn filter_query(
        &self,
        args: impl IntoIterator<Item = Q>,
        kwargs: impl Into<Clause>,
    ) -> Self {
        let fq = self.prepare_querystring(self.fq.as_deref(), args, &kwargs.into(), false);
        Self::with_base(self.search, self.q.clone(), Some(fq))
    }

    /// Like [`Query::filter_query`], but values only get their `:` escaped.
    pub fn filter_query_safe(
        &self,
        args: impl IntoIterator<Item = Q>,
        kwargs: impl Into<Clause>,
    ) -> Self {
        let fq = self.prepare_querystring(self.fq.as_deref(), args, &kwargs.into(), true);
        Self::with_base(self.search, self.q.clone(), Some(fq))
    }

    /// Execute the query.
    ///
    /// The search's fixed parameters are merged with `overrides` (which win),
    /// and `fq` is attached when set. Client errors are returned as is.
    pub async fn get_results(&self, overrides: SolrParams) -> Result<SolrResults> {
        let mut params = self.search.extra_params().clone();
        params.merge(overrides);
        if let Some(fq) = &self.fq {
            params.set("fq", fq);
        }

        let q = self.q.as_deref().unwrap_or(MATCH_ALL);
        tracing::debug!(q, fq = ?self.fq, "Executing Solr query");

        self.search.client().search(q, &params).await
    }

    fn prepare_querystring(
        &self,
        base: Option<&str>,
        args: impl IntoIterator<Item = Q>,
        kwargs: &Clause,
        safe: bool,
    ) -> String {
        let mut qs = base.map(str::to_string);

        let qargs = args
            .into_iter()
            .filter_map(|q| self.q_querystring(&q, safe))
            .reduce(|acc, sub| format!("{} AND {}", acc, sub));
        if let Some(qargs) = qargs {
            qs = Some(match qs {
                Some(base) => format!("({}) AND ({})", base, qargs),
                None => format!("({})", qargs),
            });
        }

        if let Some(kwargs) = self.clause_querystring(kwargs, safe) {
            qs = Some(match qs {
                Some(base) => format!("({}) AND ({})", base, kwargs),
                None => kwargs,
            });
        }

        qs.unwrap_or_else(|| MATCH_ALL.to_string())
    }

    /// Render a node: operands are rendered, parenthesised and joined with
    /// the node's operator; a node without operands renders its own clause.
    fn q_querystring(&self, q: &Q, safe: bool) -> Option<String> {
        let mut parts = Vec::with_capacity(q.operands().len());

        for operand in q.operands() {
            let (rendered, compound) = match operand {
                Operand::Node(node) => (self.q_querystring(node, safe), true),
                Operand::Clause(clause) => (self.clause_querystring(clause, safe), clause.len() > 1),
            };
            let Some(mut rendered) = rendered else {
                continue;
            };

            if q.is_negated() {
                rendered = if compound {
                    format!("NOT ({})", rendered)
                } else {
                    format!("NOT {}", rendered)
                };
            }

            parts.push(format!("({})", rendered));
        }

        if parts.is_empty() {
            return self.clause_querystring(q.params(), safe);
        }
        Some(parts.join(&format!(" {} ", q.operator())))
    }

    /// Render a clause as AND-ed `field:value` conditions, going through the
    /// search's filter mapping for mapped fields.
    fn clause_querystring(&self, clause: &Clause, safe: bool) -> Option<String> {
        let parts: Vec<String> = clause
            .iter()
            .map(|(field, value)| {
                let value = if safe {
                    escape_colons(value)
                } else {
                    solr_escape(value)
                };
                match self.search.filters_mapping().get(field) {
                    Some(template) => template.replace(&format!("{{{}}}", field), &value),
                    None => format!("{}:{}", field, value),
                }
            })
            .collect();

        if parts.is_empty() {
            None
        } else {
            Some(parts.join(" AND "))
        }
    }
}
