//! Configuration of the document search
//!
//! Default config location: ~/.solrq/config.toml

use anyhow::{anyhow, Context, Result};
use serde::{Deserialize, Serialize};
use solrq::SolrParams;
use std::collections::{BTreeMap, HashMap};
use std::fs;
use std::path::{Path, PathBuf};

/// Main configuration
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
pub struct Config {
    #[serde(default)]
    pub solr: SolrConfig,
    #[serde(default)]
    pub search: SearchConfig,
    #[serde(default)]
    pub observability: ObservabilityConfig,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct SolrConfig {
    /// Base URL of the Solr core; `select` is appended to it
    #[serde(default = "default_base_url")]
    pub base_url: String,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
    /// Parameters sent with every search
    #[serde(default = "default_extra_params")]
    pub extra_params: SolrParams,
}

fn default_base_url() -> String {
    "http://localhost:8983/solr/erudit/".to_string()
}

fn default_timeout_secs() -> u64 {
    solrq::client::DEFAULT_TIMEOUT_SECS
}

/// Facet fields requested by default, see [`crate::aggregations`].
pub const DEFAULT_FACET_FIELDS: &[&str] = &[
    "Annee",
    "TypeArticle_fac",
    "Langue",
    "TitreCollection_fac",
    "Auteur_tri",
    "Fonds_fac",
    "Corpus_fac",
];

fn default_extra_params() -> SolrParams {
    let mut params = SolrParams::new()
        .with("fl", "ID,Corpus_fac")
        .with("facet", true)
        .with("facet.mincount", 1);
    for field in DEFAULT_FACET_FIELDS {
        params.append("facet.field", field);
    }
    params
}

impl Default for SolrConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            timeout_secs: default_timeout_secs(),
            extra_params: default_extra_params(),
        }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct SearchConfig {
    /// Number of advanced search slots read from a request
    #[serde(default = "default_max_advanced_parameters")]
    pub max_advanced_parameters: usize,
    #[serde(default = "default_page_size")]
    pub default_page_size: usize,
    #[serde(default = "default_max_page_size")]
    pub max_page_size: usize,
    /// Logical search field → Solr template with a `{field}` placeholder
    #[serde(default = "default_filters_mapping")]
    pub filters_mapping: BTreeMap<String, String>,
    /// Corpora the results are restricted to (empty: no restriction)
    #[serde(default = "default_corpora")]
    pub corpora: Vec<String>,
    /// Fund the results are restricted to
    #[serde(default = "default_fund")]
    pub fund: Option<String>,
    /// Misspelled facet values grouped with their canonical value
    #[serde(default = "default_correspondences")]
    pub correspondences: Vec<Correspondence>,
}

/// Facet values that are variants of a canonical value.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq, Eq)]
pub struct Correspondence {
    /// Request parameter whose values get the variants appended
    pub param: String,
    /// Aggregation whose counts are grouped
    pub aggregation: String,
    /// Canonical value → variants
    pub values: HashMap<String, Vec<String>>,
}

fn default_max_advanced_parameters() -> usize {
    crate::filters::MAX_ADVANCED_PARAMETERS
}

fn default_page_size() -> usize {
    10
}

fn default_max_page_size() -> usize {
    50
}

fn default_filters_mapping() -> BTreeMap<String, String> {
    [
        ("all", "TexteComplet:{all}"),
        ("meta", "Metadonnees:{meta}"),
        ("full_text", "TexteComplet:{full_text}"),
        (
            "title_abstract_keywords",
            "(Titre_idx:{title_abstract_keywords} OR Resume_idx:{title_abstract_keywords} \
             OR MotsCles_idx:{title_abstract_keywords})",
        ),
        ("title", "Titre_idx:{title}"),
        ("author", "(Auteur_tri:{author} OR Auteur_fac:{author})"),
        ("author_affiliation", "AuteurAff_idx:{author_affiliation}"),
        ("journal_title", "TitreCollection_fac:{journal_title}"),
        ("bibliography", "Bibliographie_idx:{bibliography}"),
        ("title_reviewd", "TitreRefBiblio_idx:{title_reviewd}"),
        ("issn", "ISSN:{issn}"),
        ("isbn", "ISBN:{isbn}"),
    ]
    .into_iter()
    .map(|(k, v)| (k.to_string(), v.to_string()))
    .collect()
}

fn default_corpora() -> Vec<String> {
    vec![
        "Article".to_string(),
        "Culturel".to_string(),
        "Thèses".to_string(),
    ]
}

fn default_fund() -> Option<String> {
    Some("Érudit".to_string())
}

fn default_correspondences() -> Vec<Correspondence> {
    vec![Correspondence {
        param: "filter_article_types".to_string(),
        aggregation: "article_type".to_string(),
        values: HashMap::from([(
            "Compte rendu".to_string(),
            vec!["Compterendu".to_string()],
        )]),
    }]
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            max_advanced_parameters: default_max_advanced_parameters(),
            default_page_size: default_page_size(),
            max_page_size: default_max_page_size(),
            filters_mapping: default_filters_mapping(),
            corpora: default_corpora(),
            fund: default_fund(),
            correspondences: default_correspondences(),
        }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ObservabilityConfig {
    /// Log output format: "pretty" or "json"
    #[serde(default = "default_log_format")]
    pub log_format: String,

    /// Log level filter string
    /// Override with RUST_LOG env var
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

fn default_log_format() -> String {
    "pretty".to_string()
}

fn default_log_level() -> String {
    "info,solrq=debug".to_string()
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_format: default_log_format(),
            log_level: default_log_level(),
        }
    }
}

/// Replace a leading `~` component with the home directory.
pub fn expand_tilde(path: &Path) -> Result<PathBuf> {
    let Ok(rest) = path.strip_prefix("~") else {
        return Ok(path.to_path_buf());
    };
    let home = dirs::home_dir().context("Cannot determine home directory")?;
    if rest.as_os_str().is_empty() {
        Ok(home)
    } else {
        Ok(home.join(rest))
    }
}

/// `~/.solrq/config.toml`
pub fn default_config_path() -> PathBuf {
    dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(".solrq")
        .join("config.toml")
}

impl Config {
    /// Load config from the default location
    pub fn load() -> Result<Self> {
        Self::load_or_default(&default_config_path())
    }

    /// Load config from a file, or use defaults when it does not exist
    pub fn load_or_default(path: &Path) -> Result<Self> {
        let path = expand_tilde(path)?;
        if !path.exists() {
            tracing::debug!(path = %path.display(), "No config file, using defaults");
            return Ok(Config::default());
        }

        let content = fs::read_to_string(&path)?;
        let config: Config = toml::from_str(&content)?;
        config.validate()?;
        Ok(config)
    }

    /// Write the config as TOML, creating missing parent directories.
    ///
    /// A config that would not load back is rejected before anything is written.
    pub fn save(&self, path: &Path) -> Result<()> {
        self.validate()?;
        let path = expand_tilde(path)?;
        let content = toml::to_string_pretty(self)?;

        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create {}", parent.display()))?;
        }
        fs::write(&path, content).with_context(|| format!("Failed to write {}", path.display()))
    }

    fn validate(&self) -> Result<()> {
        if self.search.default_page_size == 0 {
            return Err(anyhow!("search.default_page_size must be at least 1"));
        }
        if self.search.max_page_size < self.search.default_page_size {
            return Err(anyhow!(
                "search.max_page_size ({}) is lower than search.default_page_size ({})",
                self.search.max_page_size,
                self.search.default_page_size
            ));
        }
        url::Url::parse(&self.solr.base_url)
            .map_err(|e| anyhow!("Invalid solr.base_url '{}': {}", self.solr.base_url, e))?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_extra_params() {
        let config = Config::default();
        let params = &config.solr.extra_params;
        assert_eq!(params.get("fl"), Some("ID,Corpus_fac"));
        assert_eq!(params.get("facet"), Some("true"));
        assert_eq!(params.get_all("facet.field").len(), DEFAULT_FACET_FIELDS.len());
    }

    #[test]
    fn test_default_mapping_covers_advanced_fields() {
        let config = Config::default();
        for (field, _) in crate::filters::ADVANCED_SEARCH_FIELDS {
            let template = config
                .search
                .filters_mapping
                .get(*field)
                .unwrap_or_else(|| panic!("no mapping for {}", field));
            assert!(template.contains(&format!("{{{}}}", field)), "{}", template);
        }
    }

    #[test]
    fn test_partial_file_keeps_defaults() {
        let config: Config = toml::from_str(
            r#"
[solr]
base_url = "http://solr:8983/solr/erudit"

[search]
default_page_size = 20
"#,
        )
        .unwrap();
        assert_eq!(config.solr.base_url, "http://solr:8983/solr/erudit");
        assert_eq!(config.solr.timeout_secs, 10);
        assert_eq!(config.search.default_page_size, 20);
        assert_eq!(config.search.max_advanced_parameters, 10);
        assert_eq!(config.observability.log_format, "pretty");
    }
}
