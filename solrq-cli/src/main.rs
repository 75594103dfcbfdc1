use anyhow::{anyhow, Context, Result};
use clap::{Parser, Subcommand};
use serde_json::json;
use solrq_search::config::{default_config_path, Config};
use solrq_search::document_filter::PageWindow;
use solrq_search::filters::{describe, search_elements};
use solrq_search::{EruditDocumentSolrFilter, QueryParams};
use std::path::{Path, PathBuf};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

#[derive(Parser, Debug)]
#[command(name = "solrq")]
#[command(about = "Compile and run Érudit document searches against Solr")]
#[command(version)]
struct Cli {
    /// Config file (default: ~/.solrq/config.toml)
    #[arg(short, long, global = true, env = "SOLRQ_CONFIG")]
    config: Option<PathBuf>,

    /// Override the Solr core URL of the config
    #[arg(long, global = true, env = "SOLR_URL")]
    solr_url: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Print the Solr parameters a search request compiles to
    Compile {
        /// Request parameters as key=value
        #[arg(value_parser = parse_param)]
        params: Vec<(String, String)>,

        /// URL-encoded query string, e.g. "basic_search_term=test&languages=fr"
        #[arg(short, long)]
        query: Option<String>,
    },

    /// Run a search request and print the matching documents and aggregations
    Search {
        /// Request parameters as key=value
        #[arg(value_parser = parse_param)]
        params: Vec<(String, String)>,

        /// URL-encoded query string, e.g. "basic_search_term=test&languages=fr"
        #[arg(short, long)]
        query: Option<String>,
    },

    /// Write the default configuration file
    InitConfig {
        /// Overwrite an existing file
        #[arg(long)]
        force: bool,
    },
}

fn parse_param(s: &str) -> std::result::Result<(String, String), String> {
    s.split_once('=')
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .ok_or_else(|| format!("expected key=value, got '{}'", s))
}

fn request_params(query: Option<&str>, params: Vec<(String, String)>) -> QueryParams {
    let mut request = query.map(QueryParams::parse).unwrap_or_default();
    for (key, value) in params {
        request.append(key, value);
    }
    request
}

fn init_logging(config: &Config) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(&config.observability.log_level));

    // stdout carries the command output
    if config.observability.log_format == "json" {
        tracing_subscriber::registry()
            .with(filter)
            .with(tracing_subscriber::fmt::layer().json().with_writer(std::io::stderr))
            .init();
    } else {
        tracing_subscriber::registry()
            .with(filter)
            .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
            .init();
    }
}

fn init_config(path: &Path, force: bool) -> Result<()> {
    if path.exists() && !force {
        return Err(anyhow!(
            "{} already exists, use --force to overwrite it",
            path.display()
        ));
    }
    Config::default().save(path)?;
    tracing::info!(path = %path.display(), "Wrote default config");
    println!("Wrote {}", path.display());
    Ok(())
}

fn load_config(path: &Path, solr_url: Option<String>) -> Result<Config> {
    let mut config = Config::load_or_default(path)
        .with_context(|| format!("Failed to load {}", path.display()))?;
    if let Some(url) = solr_url {
        config.solr.base_url = url;
    }
    Ok(config)
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let config_path = cli.config.unwrap_or_else(default_config_path);

    // init-config must not depend on the file it is about to write
    let config = match cli.command {
        Commands::InitConfig { .. } => Config::default(),
        _ => load_config(&config_path, cli.solr_url)?,
    };
    init_logging(&config);

    match cli.command {
        Commands::InitConfig { force } => init_config(&config_path, force)?,
        Commands::Compile { params, query } => {
            let filter = EruditDocumentSolrFilter::from_config(&config)?;
            let request = request_params(query.as_deref(), params);
            let filters = filter.build_solr_filters(&request);
            let compiled = filter.restrict(&filter.apply_solr_filters(&filters));
            let window = PageWindow::from_params(
                &request,
                config.search.default_page_size,
                config.search.max_page_size,
            );

            let output = json!({
                "q": compiled.q(),
                "fq": compiled.fq(),
                "sort": filter.get_solr_sorting(&request),
                "rows": window.rows,
                "start": window.start,
                "description": describe(&filters),
                "elements": search_elements(&filters),
            });
            println!("{}", serde_json::to_string_pretty(&output)?);
        }
        Commands::Search { params, query } => {
            let filter = EruditDocumentSolrFilter::from_config(&config)?;
            tracing::debug!(solr = %config.solr.base_url, "Document filter ready");
            let request = request_params(query.as_deref(), params);
            let outcome = filter.filter(&request).await?;
            tracing::info!(
                count = outcome.count,
                page = outcome.localidentifiers.len(),
                "Search done"
            );
            println!("{}", serde_json::to_string_pretty(&outcome)?);
        }
    }

    Ok(())
}
