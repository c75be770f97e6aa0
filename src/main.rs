//! solr-template command line client
//!
//! Small front end over the template for poking at a core.

use anyhow::{bail, Result};
use futures::TryStreamExt;
use solr_template::{
    client::SolrDocument,
    query::{Criteria, PageRequest, Query, TermsQuery},
    Settings, SolrTemplate,
};
use std::path::PathBuf;
use tracing::info;
use tracing_subscriber::{EnvFilter, FmtSubscriber};

/// Rows printed by `query`
const QUERY_ROWS: u32 = 10;

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize logging
    FmtSubscriber::builder()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_target(false)
        .init();

    let args: Vec<String> = std::env::args().skip(1).collect();
    let command = args.first().map(String::as_str).unwrap_or("ping");

    if matches!(command, "-h" | "--help") {
        print_usage();
        return Ok(());
    }
    if matches!(command, "-V" | "--version") {
        println!("solr-template {}", solr_template::VERSION);
        return Ok(());
    }

    let settings = load_settings()?;
    let template = SolrTemplate::initialize(&settings)?;

    match command {
        "ping" => {
            let response = template.ping().await?;
            println!("{}", response.status.as_deref().unwrap_or("UNKNOWN"));
            if !response.is_ok() {
                bail!("ping failed");
            }
        }
        "count" => {
            let query = match args.get(1) {
                Some(q) => Query::new(Criteria::raw(q.as_str())),
                None => Query::all(),
            };
            println!("{}", template.count(&query).await?);
        }
        "query" => {
            let Some(q) = args.get(1) else {
                bail!("usage: solr-template query <q>");
            };
            let query = Query::new(Criteria::raw(q.as_str())).with_page(PageRequest::of(0, QUERY_ROWS));
            let page = template.query_for_page::<SolrDocument>(&query).await?;
            info!("{} documents match", page.total_elements());
            println!("{}", serde_json::to_string_pretty(&page.page)?);
        }
        "dump" => {
            let cursor = template
                .query_for_cursor::<SolrDocument>(&Query::all())
                .await?;
            cursor
                .into_stream()
                .try_for_each(|doc| async move {
                    println!("{}", serde_json::Value::Object(doc));
                    Ok::<_, solr_template::SolrError>(())
                })
                .await?;
        }
        "terms" => {
            let Some(field) = args.get(1) else {
                bail!("usage: solr-template terms <field>");
            };
            let page = template
                .query_for_terms_page(&TermsQuery::on_fields([field.as_str()]))
                .await?;
            println!("{}", serde_json::to_string_pretty(&page)?);
        }
        other => {
            print_usage();
            bail!("unknown command: {}", other);
        }
    }

    Ok(())
}

/// Load settings from file or use defaults
fn load_settings() -> Result<Settings> {
    // Check environment variable first
    if let Ok(path) = std::env::var("SOLR_TEMPLATE_SETTINGS_PATH") {
        let path = PathBuf::from(path);
        if path.exists() {
            info!("Loading settings from: {}", path.display());
            let mut settings = Settings::from_file(&path)?;
            settings.merge_env();
            return Ok(settings);
        }
    }

    let paths = [
        PathBuf::from("settings.yml"),
        PathBuf::from("config/settings.yml"),
        dirs::config_dir()
            .map(|p| p.join("solr-template/settings.yml"))
            .unwrap_or_default(),
    ];

    for path in paths.iter() {
        if path.is_file() {
            info!("Loading settings from: {}", path.display());
            let mut settings = Settings::from_file(path)?;
            settings.merge_env();
            return Ok(settings);
        }
    }

    info!("No settings file found, using defaults");
    let mut settings = Settings::default();
    settings.merge_env();
    Ok(settings)
}

/// Print usage information
fn print_usage() {
    println!(
        r#"
solr-template v{}

USAGE:
    solr-template <COMMAND>

COMMANDS:
    ping             Ping the configured core (default)
    count [q]        Count documents matching q (all when omitted)
    query <q>        Print the first {} documents matching q
    dump             Stream every document with a cursor
    terms <field>    Print indexed terms of a field

ENVIRONMENT VARIABLES:
    SOLR_TEMPLATE_SETTINGS_PATH  Path to settings.yml
    SOLR_BASE_URL                Solr base URL
    SOLR_CORE                    Core name
    SOLR_TIMEOUT                 Request timeout in seconds
    SOLR_SERVER_VERSION          Solr server version
    RUST_LOG                     Log filter
"#,
        solr_template::VERSION,
        QUERY_ROWS
    );
}
