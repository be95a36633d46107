//! Embed a filtered place table and run one similarity query against it.
//!
//! Usage:
//!   cargo run --bin build-index -- --input places_filtered.csv
//!   cargo run --bin build-index -- --query "bảo tàng lịch sử" --top-k 3

use clap::Parser;
use std::path::PathBuf;

use geoprep::config::{Config, DEFAULT_CONFIG_PATH};
use geoprep::constants::{ADDRESS_COLUMN, NAME_COLUMN, RATING_COLUMN, TYPE_COLUMN};
use geoprep::index::{build_collection, load_documents, search};
use geoprep::infra::FastEmbedder;
use geoprep::observability::init_logging;

#[derive(Parser)]
#[command(name = "build-index")]
#[command(about = "Build an in-memory embedding index over places and query it")]
struct Args {
    #[arg(long, default_value = DEFAULT_CONFIG_PATH)]
    config: PathBuf,
    /// Filtered place CSV
    #[arg(long)]
    input: Option<PathBuf>,
    #[arg(long)]
    query: Option<String>,
    #[arg(long)]
    top_k: Option<usize>,
}

fn main() -> anyhow::Result<()> {
    dotenv::dotenv().ok();
    let _guard = init_logging();

    let args = Args::parse();
    let mut config = Config::load_or_default(&args.config)?;
    if let Some(input) = args.input {
        config.index.input_file = input;
    }
    if let Some(query) = args.query {
        config.index.query_text = query;
    }
    if let Some(top_k) = args.top_k {
        config.index.top_k = top_k;
    }
    config.validate_index()?;
    let index = &config.index;

    eprintln!("📂 Loading {}", index.input_file.display());
    let documents = load_documents(&index.input_file)?;

    eprintln!("🧠 Loading model {}", index.model);
    let mut embedder = FastEmbedder::new(&index.model)?;

    eprintln!("📥 Indexing {} documents...", documents.len());
    let collection = build_collection(&index.collection_name, documents, &mut embedder)?;

    let matches = search(&collection, &mut embedder, &index.query_text, index.top_k)?;

    println!("\n🔎 Query: {}", index.query_text);
    println!("   Results: {}", matches.len());
    let field = |m: &geoprep::index::QueryMatch, key: &str| {
        m.metadata.get(key).cloned().unwrap_or_default()
    };
    for (rank, m) in matches.iter().enumerate() {
        println!("\n{}. {}", rank + 1, field(m, NAME_COLUMN));
        println!("   Address: {}", field(m, ADDRESS_COLUMN));
        println!("   Type: {}", field(m, TYPE_COLUMN));
        println!("   Rating: {}", field(m, RATING_COLUMN));
        println!("   Document: {}", m.document);
        println!("   Similarity: {:.1}%", m.similarity_percent());
    }
    Ok(())
}
