//! vibefilter - run a pseudo-query filter over a JSON dataset

use anyhow::{Context, Result};
use clap::Parser as ClapParser;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use vibefilter::catalog::{InMemoryCatalog, InMemoryListStore};
use vibefilter::{FilterConfig, FilterRequest, FilterSession, Table, Value};

const DATASET_ID: &str = "cli";

/// vibefilter - filter JSON records with a pseudo-query
#[derive(ClapParser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// JSON file holding an array of records
    #[arg(short = 'D', long)]
    data: PathBuf,

    /// Filter query, e.g. "#{age} >= {18} and #{city} in {['NYC','LA']}"
    #[arg(short, long)]
    query: String,

    /// JSON file mapping list names to arrays of values
    #[arg(short = 'L', long)]
    lists: Option<PathBuf>,

    /// Owner of the named lists
    #[arg(short, long, default_value = "cli")]
    user: String,

    /// Number of matching rows to skip
    #[arg(short, long, default_value = "0")]
    offset: usize,

    /// Page size (defaults to the configured default_limit)
    #[arg(short, long)]
    limit: Option<usize>,

    /// JSON page-size config file
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Print only the number of matching rows
    #[arg(long)]
    count: bool,

    /// Enable debug logging
    #[arg(short, long)]
    debug: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    let log_level = if args.debug { "debug" } else { "info" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(log_level)).init();

    let config = match &args.config {
        Some(path) => FilterConfig::from_file(path)?,
        None => FilterConfig::default(),
    };

    let table = load_table(&args.data)?;
    log::info!(
        "loaded {} row(s) with {} column(s) from {}",
        table.len(),
        table.columns().len(),
        args.data.display()
    );

    let catalog = Arc::new(InMemoryCatalog::new());
    catalog.register(DATASET_ID, table);

    let lists = Arc::new(InMemoryListStore::new());
    if let Some(path) = &args.lists {
        load_lists(path, &args.user, &lists)?;
    }

    let session = FilterSession::in_memory(catalog, lists, config);

    let output = if args.count {
        let total = session
            .count(&args.user, DATASET_ID, &args.query)
            .await
            .context("Filter failed")?;
        serde_json::json!({ "total_count": total })
    } else {
        let mut request = FilterRequest::new(&args.user, DATASET_ID, &args.query);
        request.offset = args.offset;
        request.limit = args.limit;
        session
            .filter(&request)
            .await
            .context("Filter failed")?
            .to_json()
    };

    println!(
        "{}",
        serde_json::to_string_pretty(&output).context("Failed to render result")?
    );
    Ok(())
}

fn load_table(path: &Path) -> Result<Table> {
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read dataset {}", path.display()))?;
    Table::from_json_str(&text).with_context(|| format!("Invalid dataset {}", path.display()))
}

/// Registers every list of a `{"name": [values]}` file for `user`
fn load_lists(path: &Path, user: &str, store: &InMemoryListStore) -> Result<()> {
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read lists {}", path.display()))?;
    let lists: serde_json::Map<String, serde_json::Value> = serde_json::from_str(&text)
        .with_context(|| format!("Lists file {} must be a JSON object", path.display()))?;

    for (name, items) in lists {
        let items = match items {
            serde_json::Value::Array(items) => items.into_iter().map(Value::from).collect(),
            other => anyhow::bail!("list '{}' must be an array, found {}", name, other),
        };
        store.insert(user, name, items);
    }

    log::info!("loaded {} named list(s) for user '{}'", store.len(), user);
    Ok(())
}
