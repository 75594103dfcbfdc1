//! End-to-end tests: Q expressions compiled by a Search and executed
//! against an in-memory Solr client.

use async_trait::async_trait;
use solrq::{Error, Q, Query, Result, Search, SolrClient, SolrParams, SolrResults, MATCH_ALL};
use std::sync::{Arc, Mutex};

/// Answers every request with a fixed JSON body and records what it got.
struct FakeSolr {
    body: String,
    requests: Mutex<Vec<(String, SolrParams)>>,
}

impl FakeSolr {
    fn new(body: &str) -> Arc<Self> {
        Arc::new(Self {
            body: body.to_string(),
            requests: Mutex::new(Vec::new()),
        })
    }

    fn last_request(&self) -> (String, SolrParams) {
        self.requests.lock().unwrap().last().cloned().unwrap()
    }
}

#[async_trait]
impl SolrClient for FakeSolr {
    async fn search(&self, q: &str, params: &SolrParams) -> Result<SolrResults> {
        self.requests
            .lock()
            .unwrap()
            .push((q.to_string(), params.clone()));
        SolrResults::from_json(&self.body)
    }
}

const NONE: [(&str, &str); 0] = [];

const BODY: &str = r#"{
    "response": {"numFound": 2, "start": 0, "docs": [{"ID": "a1"}, {"ID": "a2"}]},
    "facet_counts": {"facet_fields": {"Langue": ["fr", 2]}}
}"#;

fn author_search(client: Arc<FakeSolr>) -> Search {
    Search::new(client)
        .with_filters_mapping([("author", "(Auteur_tri:*{author}* OR Auteur_fac:*{author}*)")])
        .with_extra_params(
            SolrParams::new()
                .with("fl", "ID")
                .with("facet", true)
                .with("rows", 10),
        )
}

#[test]
fn test_or_and_not_rendering() {
    let search = Search::new(FakeSolr::new(BODY));

    let query = search.filter([Q::field("a", "1") | Q::field("a", "2")], [("b", "3")]);
    assert_eq!(query.q(), Some("(((a:1) OR (a:2))) AND (b:3)"));

    let query = search.filter([Q::field("a", "1") & !Q::field("a", "2")], [("b", "3")]);
    assert_eq!(query.q(), Some("(((a:1) AND ((NOT a:2)))) AND (b:3)"));
}

#[test]
fn test_mapped_field_inside_expression() {
    let search = author_search(FakeSolr::new(BODY));
    let query = search.filter(
        [Q::field("author", "tremblay") | Q::field("Langue", "fr")],
        NONE,
    );
    assert_eq!(
        query.q(),
        Some("(((Auteur_tri:*tremblay* OR Auteur_fac:*tremblay*)) OR (Langue:fr))")
    );
}

#[test]
fn test_shared_base_refined_in_two_directions() {
    let search = Search::new(FakeSolr::new(BODY));
    let base = Query::match_all(&search).filter_safe([Q::field("Metadonnees", "\"test\"")], NONE);

    let french = base.filter_query_safe([Q::field("Langue", "\"fr\"")], NONE);
    let english = base.filter_query_safe([Q::field("Langue", "\"en\"")], NONE);

    assert_eq!(base.q(), Some("(*:*) AND (Metadonnees:\"test\")"));
    assert_eq!(base.fq(), Some(MATCH_ALL));
    assert_eq!(french.fq(), Some("(*:*) AND (Langue:\"fr\")"));
    assert_eq!(english.fq(), Some("(*:*) AND (Langue:\"en\")"));
}

#[tokio::test]
async fn test_execute_compiled_query() {
    let client = FakeSolr::new(BODY);
    let search = author_search(client.clone());

    let results = search
        .filter([], [("author", "tremblay")])
        .filter_query([], [("Langue", "fr")])
        .get_results(SolrParams::new().with("rows", 2).with("start", 0))
        .await
        .unwrap();

    assert_eq!(results.hits, 2);
    assert_eq!(results.ids(), vec!["a1", "a2"]);

    let (q, params) = client.last_request();
    assert_eq!(q, "(Auteur_tri:*tremblay* OR Auteur_fac:*tremblay*)");
    assert_eq!(params.get("fq"), Some("Langue:fr"));
    assert_eq!(params.get("rows"), Some("2"));
    assert_eq!(params.get("fl"), Some("ID"));
    assert_eq!(params.get("facet"), Some("true"));
}

#[tokio::test]
async fn test_search_results_runs_match_all() {
    let client = FakeSolr::new(BODY);
    let search = author_search(client.clone());

    let results = search.results().await.unwrap();
    assert_eq!(results.facet_fields.len(), 1);

    let (q, params) = client.last_request();
    assert_eq!(q, MATCH_ALL);
    assert!(!params.contains_key("fq"));
}

#[tokio::test]
async fn test_client_errors_propagate() {
    let client = FakeSolr::new(r#"{"error": {"msg": "boom"}}"#);
    let search = Search::new(client);

    let err = search.results().await.unwrap_err();
    assert!(matches!(err, Error::InvalidResponse(_)));
}
