use anyhow::Result;
use clap::Parser;
use search_cli::{open_index, QueryOptions};
use search_core::SearchConfig;
use std::path::PathBuf;
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing_subscriber::{fmt, EnvFilter};

#[derive(Parser)]
struct Args {
    /// Index directory path
    #[arg(long, default_value = "./index")]
    index: PathBuf,
    /// JSON file with ranking settings; missing keys keep their defaults
    #[arg(long)]
    config: Option<PathBuf>,
    /// Number of results per query
    #[arg(long)]
    k: Option<usize>,
    /// Snippet width in tokens
    #[arg(long)]
    window: Option<usize>,
    /// Skip this many ranked results
    #[arg(long, default_value_t = 0)]
    offset: usize,
    /// Wrap query terms in snippets with <em>
    #[arg(long)]
    highlight: bool,
    /// Query to run; reads queries from stdin when omitted
    query: Vec<String>,
}

fn load_config(args: &Args) -> Result<SearchConfig> {
    let mut config = match &args.config {
        Some(path) => SearchConfig::from_json_file(path)?,
        None => SearchConfig::default(),
    };
    if let Some(k) = args.k { config.top_k = k; }
    if let Some(w) = args.window { config.snippet_width = w; }
    config.validate()?;
    Ok(config)
}

#[tokio::main]
async fn main() -> Result<()> {
    fmt().with_env_filter(EnvFilter::from_default_env()).init();
    let args = Args::parse();
    let config = load_config(&args)?;
    let app = open_index(&args.index, config)?;
    tracing::info!(index = %args.index.display(), "index opened");
    let options = QueryOptions { offset: args.offset, highlight: args.highlight };

    if !args.query.is_empty() {
        let response = app.query(&args.query.join(" "), options).await;
        println!("{}", serde_json::to_string_pretty(&response)?);
        return Ok(());
    }

    eprintln!("Enter search query (\"exit\" to quit):");
    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    while let Some(line) = lines.next_line().await? {
        let line = line.trim();
        if line == "exit" {
            break;
        }
        if line.is_empty() {
            continue;
        }
        let response = app.query(line, options).await;
        println!("{}", serde_json::to_string(&response)?);
    }
    Ok(())
}
