use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use ir_core::corpus::load_corpus;
use ir_core::{DocId, DocMeta, EngineConfig, SearchEngine};
use tracing_subscriber::{fmt, EnvFilter};

use std::io::{self, BufRead, Write};
use std::path::{Path, PathBuf};

#[derive(Parser)]
#[command(name = "indexer")]
#[command(about = "Build a boolean inverted index, analyze term frequencies, and search it", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Args)]
struct CorpusArgs {
    /// Input path (JSON, JSONL or text file, or a directory of them)
    #[arg(long)]
    input: PathBuf,
    /// Hash buckets for the inverted index
    #[arg(long, default_value_t = EngineConfig::default().index_buckets)]
    index_buckets: usize,
    /// Hash buckets for the frequency table
    #[arg(long, default_value_t = EngineConfig::default().frequency_buckets)]
    frequency_buckets: usize,
}

impl CorpusArgs {
    fn config(&self) -> EngineConfig {
        EngineConfig { index_buckets: self.index_buckets, frequency_buckets: self.frequency_buckets }
    }
}

#[derive(Subcommand)]
enum Commands {
    /// Index a corpus with frequency tracking and write the Zipf report
    Build {
        #[command(flatten)]
        corpus: CorpusArgs,
        /// Where to write the rank/frequency CSV
        #[arg(long, default_value = "data/zipf.csv")]
        zipf_csv: PathBuf,
        /// Run this query once the index is built
        #[arg(long)]
        query: Option<String>,
        /// Print every term and its document ids
        #[arg(long, default_value_t = false)]
        dump: bool,
    },
    /// Index a corpus and answer boolean queries
    Search {
        #[command(flatten)]
        corpus: CorpusArgs,
        /// Run a single query and exit instead of reading queries from stdin
        #[arg(long)]
        query: Option<String>,
    },
}

fn main() -> Result<()> {
    fmt().with_env_filter(EnvFilter::from_default_env()).init();
    let cli = Cli::parse();

    match cli.command {
        Commands::Build { corpus, zipf_csv, query, dump } => build(&corpus, &zipf_csv, query.as_deref(), dump),
        Commands::Search { corpus, query } => search(&corpus, query.as_deref()),
    }
}

/// Load the corpus and index every document. Ids follow corpus order.
fn index_corpus(args: &CorpusArgs, with_zipf: bool) -> Result<(SearchEngine, Vec<DocMeta>)> {
    let docs = load_corpus(&args.input)
        .with_context(|| format!("loading corpus from {}", args.input.display()))?;
    let mut engine = SearchEngine::new(args.config());
    engine.init();

    let mut metas = Vec::with_capacity(docs.len());
    for (doc_id, doc) in docs.iter().enumerate() {
        let doc_id = DocId::try_from(doc_id).context("corpus exceeds the document id range")?;
        if with_zipf {
            engine.build_index_for_document_with_zipf(&doc.content, doc_id);
        } else {
            engine.build_index_for_document(&doc.content, doc_id);
        }
        metas.push(doc.meta());
    }

    let stats = engine.stats();
    tracing::info!(
        documents = metas.len(),
        terms = stats.terms,
        postings = stats.postings,
        longest_chain = stats.longest_chain,
        "index built"
    );
    Ok((engine, metas))
}

fn build(args: &CorpusArgs, zipf_csv: &Path, query: Option<&str>, dump: bool) -> Result<()> {
    let (mut engine, metas) = index_corpus(args, true)?;

    if dump {
        print_index(&engine);
    }

    let report = engine.analyze_zipf();
    if let Some(parent) = zipf_csv.parent().filter(|p| !p.as_os_str().is_empty()) {
        if let Err(e) = std::fs::create_dir_all(parent) {
            tracing::warn!(path = %parent.display(), error = %e, "could not create output directory");
        }
    }
    // A failed export is reported but does not stop the run.
    match engine.export_zipf_csv(&report, zipf_csv) {
        Ok(()) => println!("Zipf data for {} terms saved to {}", report.len(), zipf_csv.display()),
        Err(e) => tracing::warn!(error = %e, "zipf export failed"),
    }

    if let Some(q) = query {
        let ids = engine.boolean_search(q);
        print_results(q, &ids, &metas);
    }

    engine.teardown();
    Ok(())
}

fn search(args: &CorpusArgs, query: Option<&str>) -> Result<()> {
    let (mut engine, metas) = index_corpus(args, false)?;

    if let Some(q) = query {
        let ids = engine.boolean_search(q);
        print_results(q, &ids, &metas);
        engine.teardown();
        return Ok(());
    }

    println!("Index built with {} documents. Ready for queries.", metas.len());
    println!("Supported logic: implicit AND (\"word1 word2\"), NOT (\"word1 NOT word2\" or \"word1 -word2\").");
    let stdin = io::stdin();
    let mut lines = stdin.lock().lines();
    loop {
        print!("Enter search query (or 'q' to quit): ");
        io::stdout().flush()?;
        let Some(line) = lines.next() else { break };
        let line = line?;
        let q = line.trim();
        if q.eq_ignore_ascii_case("q") {
            break;
        }
        if q.is_empty() {
            continue;
        }
        let ids = engine.boolean_search(q);
        print_results(q, &ids, &metas);
    }

    engine.teardown();
    Ok(())
}

fn print_index(engine: &SearchEngine) {
    println!("--- Inverted Index Contents ---");
    for entry in engine.index().entries() {
        let ids: Vec<String> = entry.postings.iter().map(|d| d.to_string()).collect();
        println!("{} -> {}", entry.term, ids.join(" "));
    }
    println!("--- End Inverted Index Contents ---");
}

fn print_results(query: &str, ids: &[DocId], metas: &[DocMeta]) {
    if ids.is_empty() {
        println!("No documents found for \"{query}\".");
        return;
    }
    println!("Found {} documents for \"{query}\":", ids.len());
    for &doc_id in ids {
        let meta = metas.get(doc_id as usize);
        println!("  Document ID: {doc_id}");
        println!("    Title: {}", meta.map(|m| m.title.as_str()).unwrap_or("N/A"));
        println!("    URL: {}", meta.and_then(|m| m.url.as_deref()).unwrap_or("N/A"));
    }
}
