use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use crate::client::SolrClient;
use crate::error::Result;
use crate::params::SolrParams;
use crate::q::{Clause, Q};
use crate::query::Query;
use crate::results::SolrResults;

/// A Solr client bound to the configuration its queries compile against.
///
/// - `filters_mapping`: logical filter name → template, where `{name}` is
///   replaced by the (escaped) value, e.g.
///   `"author" => "(Auteur_tri:*{author}* OR Auteur_fac:*{author}*)"`
/// - `extra_params`: parameters sent with every execution (rows, fl, facets)
#[derive(Clone)]
pub struct Search {
    client: Arc<dyn SolrClient>,
    filters_mapping: HashMap<String, String>,
    extra_params: SolrParams,
}

impl Search {
    pub fn new(client: Arc<dyn SolrClient>) -> Self {
        Self {
            client,
            filters_mapping: HashMap::new(),
            extra_params: SolrParams::new(),
        }
    }

    pub fn with_filters_mapping<I, K, V>(mut self, mapping: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        self.filters_mapping = mapping
            .into_iter()
            .map(|(k, v)| (k.into(), v.into()))
            .collect();
        self
    }

    pub fn with_extra_params(mut self, params: SolrParams) -> Self {
        self.extra_params = params;
        self
    }

    pub fn filters_mapping(&self) -> &HashMap<String, String> {
        &self.filters_mapping
    }

    pub fn extra_params(&self) -> &SolrParams {
        &self.extra_params
    }

    pub fn client(&self) -> &dyn SolrClient {
        self.client.as_ref()
    }

    /// A fresh query without conditions.
    pub fn query(&self) -> Query<'_> {
        Query::new(self)
    }

    /// Shorthand for `self.query().filter(args, kwargs)`.
    pub fn filter(&self, args: impl IntoIterator<Item = Q>, kwargs: impl Into<Clause>) -> Query<'_> {
        self.query().filter(args, kwargs)
    }

    /// Run the unfiltered query.
    pub async fn results(&self) -> Result<SolrResults> {
        self.query().get_results(SolrParams::new()).await
    }
}

impl fmt::Debug for Search {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Search")
            .field("filters_mapping", &self.filters_mapping)
            .field("extra_params", &self.extra_params)
            .finish_non_exhaustive()
    }
}
