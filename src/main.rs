use clap::Parser;
use helpdex::{api, Corpus, DocumentIndex, SearchEngine};
use std::sync::Arc;
use std::time::Instant;
use tracing_subscriber::EnvFilter;

// CLI Arguments
#[derive(Parser, Debug)]
#[command(author, version, about = "Help-center markdown index and search", long_about = None)]
struct Args {
    /// Directory containing the markdown articles
    #[arg(short, long, default_value = "articles")]
    path: String,

    /// Free-text query to run against the corpus
    #[arg(short, long)]
    query: Option<String>,

    /// Serve the HTTP API on this address instead of running a query
    #[arg(short, long)]
    serve: Option<String>,

    /// Print search results as JSON
    #[arg(long)]
    json: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let args = Args::parse();

    let start = Instant::now();
    let corpus = Corpus::load_dir(&args.path)?;
    println!(
        "Loaded {} documents from {} in {:?}",
        corpus.len(),
        args.path,
        start.elapsed()
    );

    let engine = Arc::new(SearchEngine::new(DocumentIndex::new(corpus)));

    if let Some(addr) = args.serve {
        return api::serve(engine, &addr).await;
    }

    if let Some(query) = args.query {
        if args.json {
            let results = engine.search(&query);
            println!("{}", serde_json::to_string_pretty(&results)?);
            return Ok(());
        }
        println!();
        println!("Searching for: \"{}\"", query);
        println!();
        do_search(&engine, &query);
        return Ok(());
    }

    // No query: print the document listing.
    for doc in engine.index().list_documents() {
        println!("{}\t{}", doc.id, doc.title);
    }

    Ok(())
}

// Perform search and display results
fn do_search(engine: &SearchEngine, query: &str) {
    let start = Instant::now();
    let results = engine.search(query);
    let duration = start.elapsed();

    println!("Search found {} documents in {:?}", results.len(), duration);
    println!();

    for result in results {
        println!(
            "[{:.1}] {} ({})",
            result.score, result.document.title, result.document.id
        );
        for m in &result.matches {
            println!("    {}: {}", m.line, m.text);
        }
    }
}
