//! Search filters read from HTTP query parameters
//!
//! [`build_solr_filters`] only collects and validates what the request asks
//! for; turning the filters into a Solr query is the document filter's job.

use serde::Serialize;
use std::fmt;
use std::str::FromStr;

use crate::error::SearchError;
use crate::params::QueryParams;

/// Default term of the basic search.
pub const DEFAULT_SEARCH_TERM: &str = "*";
/// Default (logical) field of basic and advanced searches.
pub const DEFAULT_SEARCH_FIELD: &str = "all";
/// Number of advanced search slots read from a request.
pub const MAX_ADVANCED_PARAMETERS: usize = 10;

/// Operator joining an advanced search clause to the expression before it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum SearchOperator {
    And,
    Or,
    Not,
}

impl SearchOperator {
    pub fn as_str(&self) -> &'static str {
        match self {
            SearchOperator::And => "AND",
            SearchOperator::Or => "OR",
            SearchOperator::Not => "NOT",
        }
    }

    /// Label shown to readers of a search summary.
    pub fn label(&self) -> &'static str {
        match self {
            SearchOperator::And => "ET",
            SearchOperator::Or => "OU",
            SearchOperator::Not => "NON",
        }
    }
}

impl FromStr for SearchOperator {
    type Err = SearchError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "AND" => Ok(SearchOperator::And),
            "OR" => Ok(SearchOperator::Or),
            "NOT" => Ok(SearchOperator::Not),
            other => Err(SearchError::UnknownOperator(other.to_string())),
        }
    }
}

impl fmt::Display for SearchOperator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A term searched in one logical field.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SearchClause {
    pub term: String,
    pub field: String,
    /// `None` for a plain basic search, `Not` when it is negated
    pub operator: Option<SearchOperator>,
}

/// Values of one multi-valued filter, OR-ed together on a Solr field.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FieldFilter {
    pub param: &'static str,
    pub field: &'static str,
    pub values: Vec<String>,
}

/// Multi-valued request parameters and the Solr field each one filters on.
///
/// Plain filters come first; the `filter_*` ones narrow the results after an
/// aggregation was clicked and are applied last.
pub const FIELD_FILTERS: &[(&str, &str)] = &[
    ("languages", "Langue"),
    ("funds", "Fonds_fac"),
    ("publication_types", "Corpus_fac"),
    ("disciplines", "Discipline_fac"),
    ("journals", "TitreCollection_fac"),
    ("filter_years", "Annee"),
    ("filter_languages", "Langue"),
    ("filter_article_types", "TypeArticle_fac"),
    ("filter_collections", "TitreCollection_fac"),
    ("filter_authors", "Auteur_tri"),
    ("filter_funds", "Fonds_fac"),
    ("filter_publication_types", "Corpus_fac"),
];

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SolrFilters {
    pub basic: SearchClause,
    pub advanced: Vec<SearchClause>,
    pub pub_year_start: Option<String>,
    pub pub_year_end: Option<String>,
    pub field_filters: Vec<FieldFilter>,
    /// Free text refinement searched in the full text
    pub extra_q: Option<String>,
}

/// Collect the search filters of a request.
///
/// Advanced slots `1..=max_advanced` are read; a slot is kept only when its
/// term is non-empty, its operator is `AND`, `OR` or `NOT` and its field is
/// accepted by `is_known_field`. An unknown basic search field falls back to
/// [`DEFAULT_SEARCH_FIELD`].
pub fn build_solr_filters<F>(
    params: &QueryParams,
    max_advanced: usize,
    is_known_field: F,
) -> SolrFilters
where
    F: Fn(&str) -> bool,
{
    let basic = SearchClause {
        term: params
            .get("basic_search_term")
            .unwrap_or(DEFAULT_SEARCH_TERM)
            .to_string(),
        field: params
            .get("basic_search_field")
            .filter(|field| is_known_field(field))
            .unwrap_or(DEFAULT_SEARCH_FIELD)
            .to_string(),
        operator: params
            .contains_key("basic_search_operator")
            .then_some(SearchOperator::Not),
    };

    let advanced = (1..=max_advanced)
        .filter_map(|slot| advanced_clause(params, slot, &is_known_field))
        .collect();

    let field_filters = FIELD_FILTERS
        .iter()
        .filter_map(|&(param, field)| {
            let values: Vec<String> = params
                .get_list(param)
                .into_iter()
                .filter(|v| !v.is_empty())
                .map(str::to_string)
                .collect();
            (!values.is_empty()).then_some(FieldFilter {
                param,
                field,
                values,
            })
        })
        .collect();

    SolrFilters {
        basic,
        advanced,
        pub_year_start: non_empty(params.get("pub_year_start")),
        pub_year_end: non_empty(params.get("pub_year_end")),
        field_filters,
        extra_q: non_empty(params.get("filter_extra_q")),
    }
}

fn advanced_clause(
    params: &QueryParams,
    slot: usize,
    is_known_field: &dyn Fn(&str) -> bool,
) -> Option<SearchClause> {
    let term = params.get(&format!("advanced_search_term{}", slot))?;
    if term.is_empty() {
        return None;
    }
    let operator = params
        .get(&format!("advanced_search_operator{}", slot))?
        .parse::<SearchOperator>()
        .ok()?;
    let field = params
        .get(&format!("advanced_search_field{}", slot))
        .unwrap_or(DEFAULT_SEARCH_FIELD);
    if !is_known_field(field) {
        tracing::debug!(slot, field, "Dropping advanced search clause on unknown field");
        return None;
    }

    Some(SearchClause {
        term: term.to_string(),
        field: field.to_string(),
        operator: Some(operator),
    })
}

fn non_empty(value: Option<&str>) -> Option<String> {
    value.filter(|v| !v.is_empty()).map(str::to_string)
}

/// Reader-facing labels of the advanced search fields.
pub const ADVANCED_SEARCH_FIELDS: &[(&str, &str)] = &[
    ("all", "Tous les champs"),
    ("meta", "Tous les champs (sauf texte intégral)"),
    ("full_text", "Texte intégral"),
    ("title_abstract_keywords", "Titre, résumé, mots-clés"),
    ("title", "Titre"),
    ("author", "Auteur"),
    ("author_affiliation", "Affiliation de l'auteur"),
    ("journal_title", "Titre de la revue"),
    ("bibliography", "Bibliographie"),
    ("title_reviewd", "Ouvrage recensé"),
    ("issn", "ISSN"),
    ("isbn", "ISBN"),
];

/// Whether `field` is one of [`ADVANCED_SEARCH_FIELDS`].
pub fn is_search_field(field: &str) -> bool {
    ADVANCED_SEARCH_FIELDS.iter().any(|&(name, _)| name == field)
}

/// Search form filters listed in a summary, with their labels.
pub const SUMMARY_FILTER_LABELS: &[(&str, &str)] = &[
    ("funds", "Fonds"),
    ("publication_types", "Types de publication"),
    ("languages", "Langues"),
    ("disciplines", "Disciplines"),
    ("journals", "Revues"),
];

/// Searched value(s) of a summary element.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum ElementTerm {
    One(String),
    Many(Vec<String>),
}

impl fmt::Display for ElementTerm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ElementTerm::One(term) => f.write_str(term),
            ElementTerm::Many(terms) => f.write_str(&terms.join(", ")),
        }
    }
}

impl From<&[String]> for ElementTerm {
    fn from(values: &[String]) -> Self {
        match values {
            [one] => ElementTerm::One(one.clone()),
            many => ElementTerm::Many(many.to_vec()),
        }
    }
}

/// One element of a readable search summary, e.g.
/// ` ET (Titre, résumé, mots-clés : drama*)`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SearchElement {
    pub term: ElementTerm,
    pub field: String,
    pub operator: Option<SearchOperator>,
    pub text: String,
}

impl SearchElement {
    fn clause(clause: &SearchClause) -> Self {
        let label = ADVANCED_SEARCH_FIELDS
            .iter()
            .find(|(name, _)| *name == clause.field)
            .map_or(clause.field.as_str(), |&(_, label)| label);
        let text = match clause.operator {
            None => format!("({} : {})", label, clause.term),
            Some(op) => format!(" {} ({} : {})", op.label(), label, clause.term),
        };
        Self {
            term: ElementTerm::One(clause.term.clone()),
            field: label.to_string(),
            operator: clause.operator,
            text,
        }
    }

    /// Element joined to the summary with `ET`.
    fn narrowing(term: ElementTerm, field: &str, body: String) -> Self {
        let and = SearchOperator::And;
        Self {
            term,
            field: field.to_string(),
            operator: Some(and),
            text: format!(" {} ({})", and.label(), body),
        }
    }
}

/// Describe the searched terms of `filters` the way they are shown to
/// readers: `(Titre : pedagogi*) ET (Auteur : tremblay)`.
///
/// The publication year range and the search form filters follow the
/// search clauses.
pub fn search_elements(filters: &SolrFilters) -> Vec<SearchElement> {
    let mut elements = vec![SearchElement::clause(&filters.basic)];
    elements.extend(filters.advanced.iter().map(SearchElement::clause));

    let range = match (&filters.pub_year_start, &filters.pub_year_end) {
        (Some(start), Some(end)) => Some(SearchElement::narrowing(
            ElementTerm::Many(vec![start.clone(), end.clone()]),
            "pub_year",
            format!("Publié entre {} et {}", start, end),
        )),
        (Some(start), None) => Some(SearchElement::narrowing(
            ElementTerm::One(start.clone()),
            "pub_year_start",
            format!("Publié depuis {}", start),
        )),
        (None, Some(end)) => Some(SearchElement::narrowing(
            ElementTerm::One(end.clone()),
            "pub_year_end",
            format!("Publié jusqu'à {}", end),
        )),
        (None, None) => None,
    };
    elements.extend(range);

    for filter in &filters.field_filters {
        let Some(&(_, label)) = SUMMARY_FILTER_LABELS
            .iter()
            .find(|(param, _)| *param == filter.param)
        else {
            continue;
        };
        let term = ElementTerm::from(filter.values.as_slice());
        let body = format!("{} : {}", label, term);
        elements.push(SearchElement::narrowing(term, label, body));
    }

    elements
}

/// Concatenated summary of [`search_elements`].
pub fn describe(filters: &SolrFilters) -> String {
    search_elements(filters)
        .into_iter()
        .map(|e| e.text)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn build(query: &str) -> SolrFilters {
        build_solr_filters(&QueryParams::parse(query), MAX_ADVANCED_PARAMETERS, is_search_field)
    }

    #[test]
    fn test_basic_search_defaults() {
        let filters = build("");
        assert_eq!(filters.basic.term, "*");
        assert_eq!(filters.basic.field, "all");
        assert_eq!(filters.basic.operator, None);
        assert!(filters.advanced.is_empty());
        assert!(filters.field_filters.is_empty());
    }

    #[test]
    fn test_basic_operator_presence_negates() {
        let filters = build("basic_search_term=test&basic_search_operator=anything");
        assert_eq!(filters.basic.operator, Some(SearchOperator::Not));
    }

    #[test]
    fn test_advanced_slots_are_validated() {
        let filters = build(
            "advanced_search_term1=intro&advanced_search_operator1=AND\
             &advanced_search_term2=&advanced_search_operator2=OR\
             &advanced_search_term3=drama&advanced_search_operator3=XOR\
             &advanced_search_term4=drama\
             &advanced_search_term5=essai&advanced_search_field5=title&advanced_search_operator5=NOT",
        );
        assert_eq!(
            filters.advanced,
            vec![
                SearchClause {
                    term: "intro".to_string(),
                    field: "all".to_string(),
                    operator: Some(SearchOperator::And),
                },
                SearchClause {
                    term: "essai".to_string(),
                    field: "title".to_string(),
                    operator: Some(SearchOperator::Not),
                },
            ]
        );
    }

    #[test]
    fn test_only_ten_advanced_slots_are_read() {
        let filters = build(
            "advanced_search_term10=ten&advanced_search_operator10=OR\
             &advanced_search_term11=eleven&advanced_search_operator11=OR",
        );
        assert_eq!(filters.advanced.len(), 1);
        assert_eq!(filters.advanced[0].term, "ten");
    }

    #[test]
    fn test_operators_are_case_sensitive() {
        assert!("and".parse::<SearchOperator>().is_err());
        assert_eq!("OR".parse::<SearchOperator>().unwrap(), SearchOperator::Or);
    }

    #[test]
    fn test_field_filters_keep_order_and_values() {
        let filters = build("filter_years=2015&languages=fr&filter_years=2016&languages=");
        let summary: Vec<_> = filters
            .field_filters
            .iter()
            .map(|f| (f.param, f.field, f.values.clone()))
            .collect();
        assert_eq!(
            summary,
            vec![
                ("languages", "Langue", vec!["fr".to_string()]),
                ("filter_years", "Annee", vec!["2015".to_string(), "2016".to_string()]),
            ]
        );
    }

    #[test]
    fn test_year_bounds_and_extra_q() {
        let filters = build("pub_year_start=2012&pub_year_end=&filter_extra_q=foobar");
        assert_eq!(filters.pub_year_start.as_deref(), Some("2012"));
        assert_eq!(filters.pub_year_end, None);
        assert_eq!(filters.extra_q.as_deref(), Some("foobar"));
    }

    #[test]
    fn test_describe_search() {
        let filters = build(
            "basic_search_term=pedagogi*&basic_search_field=title_abstract_keywords\
             &advanced_search_term1=drama*&advanced_search_field1=title_abstract_keywords\
             &advanced_search_operator1=AND&pub_year_start=2012",
        );
        assert_eq!(
            describe(&filters),
            "(Titre, résumé, mots-clés : pedagogi*) ET (Titre, résumé, mots-clés : drama*) \
             ET (Publié depuis 2012)"
        );
    }

    #[test]
    fn test_unknown_fields_are_not_searched() {
        let filters = build(
            "basic_search_term=x&basic_search_field=*:* OR Corpus_fac\
             &advanced_search_term1=y&advanced_search_field1=ID:erudit) OR (Fonds_fac\
             &advanced_search_operator1=AND\
             &advanced_search_term2=z&advanced_search_field2=issn&advanced_search_operator2=OR",
        );
        assert_eq!(filters.basic.field, "all");
        assert_eq!(filters.advanced.len(), 1);
        assert_eq!(filters.advanced[0].field, "issn");
    }

    #[test]
    fn test_custom_known_fields() {
        let filters = build_solr_filters(
            &QueryParams::parse("basic_search_term=x&basic_search_field=doi"),
            MAX_ADVANCED_PARAMETERS,
            |field| field == "doi",
        );
        assert_eq!(filters.basic.field, "doi");
    }

    #[test]
    fn test_single_year_bound_elements() {
        let elements = search_elements(&build("pub_year_end=2016"));
        assert_eq!(elements[1].field, "pub_year_end");
        assert_eq!(elements[1].term, ElementTerm::One("2016".to_string()));
        assert_eq!(elements[1].text, " ET (Publié jusqu'à 2016)");

        let elements = search_elements(&build("pub_year_start=2012"));
        assert_eq!(elements[1].field, "pub_year_start");
    }

    #[test]
    fn test_year_range_element_lists_both_bounds() {
        let elements = search_elements(&build("pub_year_start=2012&pub_year_end=2016"));
        assert_eq!(elements[1].field, "pub_year");
        assert_eq!(
            elements[1].term,
            ElementTerm::Many(vec!["2012".to_string(), "2016".to_string()])
        );
        assert_eq!(elements[1].text, " ET (Publié entre 2012 et 2016)");
    }

    #[test]
    fn test_form_filters_are_summarized() {
        let filters = build("languages=fr&languages=en&journals=foo&filter_years=2015");
        let texts: Vec<_> = search_elements(&filters)
            .into_iter()
            .skip(1)
            .map(|e| (e.field, e.term, e.text))
            .collect();
        assert_eq!(
            texts,
            vec![
                (
                    "Langues".to_string(),
                    ElementTerm::Many(vec!["fr".to_string(), "en".to_string()]),
                    " ET (Langues : fr, en)".to_string(),
                ),
                (
                    "Revues".to_string(),
                    ElementTerm::One("foo".to_string()),
                    " ET (Revues : foo)".to_string(),
                ),
            ]
        );
    }
}
