use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use serde::{Deserialize, Serialize};
use sift_core::corpus::write_record;
use sift_core::{Analyzer, BuildStats, IndexStore, Searcher};
use tracing_subscriber::{EnvFilter, fmt};
use walkdir::WalkDir;

use std::fs::File;
use std::io::{self, BufRead, BufReader, BufWriter, Write};
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// A document as produced by an upstream extractor.
#[derive(Debug, Deserialize)]
struct InputDoc {
    title: String,
    #[serde(alias = "content")]
    body: String,
    #[serde(default)]
    url: Option<String>,
}

#[derive(Parser)]
#[command(name = "indexer")]
#[command(about = "Prepare corpora and inspect in-memory search indexes", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Args)]
struct IndexArgs {
    /// Corpus file, one `title\x03content\x03url` record per line
    #[arg(long)]
    corpus: PathBuf,
    /// Stopword file (one word per line); the built-in English list is used otherwise
    #[arg(long)]
    stopwords: Option<PathBuf>,
    /// Stem terms with the English Snowball stemmer
    #[arg(long, default_value_t = false)]
    stem: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Convert JSON/JSONL documents (a file or a directory of them) into a corpus file
    Pack {
        #[arg(long)]
        input: PathBuf,
        #[arg(long)]
        output: PathBuf,
    },
    /// Build the index and report what went into it
    Stats {
        #[command(flatten)]
        index: IndexArgs,
        /// Print the report as JSON
        #[arg(long, default_value_t = false)]
        json: bool,
    },
    /// Build the index, then answer queries read from stdin, one per line
    Query {
        #[command(flatten)]
        index: IndexArgs,
    },
}

#[derive(Serialize)]
struct StatsReport {
    corpus: String,
    built_at: String,
    #[serde(flatten)]
    stats: BuildStats,
}

fn main() -> Result<()> {
    fmt().with_env_filter(EnvFilter::from_default_env()).with_writer(io::stderr).init();
    let cli = Cli::parse();

    match cli.command {
        Commands::Pack { input, output } => pack(&input, &output),
        Commands::Stats { index, json } => stats(&index, json),
        Commands::Query { index } => query_loop(&index),
    }
}

fn load_index(args: &IndexArgs) -> Result<(IndexStore, BuildStats, Analyzer)> {
    let analyzer = match &args.stopwords {
        Some(path) => Analyzer::from_stopwords_file(path)
            .with_context(|| format!("loading stopwords from {}", path.display()))?,
        None => Analyzer::english(),
    }
    .with_stemming(args.stem);
    let (index, stats) = IndexStore::open(&args.corpus, &analyzer)
        .with_context(|| format!("building index from {}", args.corpus.display()))?;
    Ok((index, stats, analyzer))
}

fn pack(input: &Path, output: &Path) -> Result<()> {
    let mut files: Vec<PathBuf> = Vec::new();
    if input.is_dir() {
        for entry in WalkDir::new(input).sort_by_file_name().into_iter().filter_map(|e| e.ok()) {
            let p = entry.path();
            if p.is_file() && matches!(p.extension().and_then(|s| s.to_str()), Some("json" | "jsonl")) {
                files.push(p.to_path_buf());
            }
        }
    } else if input.is_file() {
        files.push(input.to_path_buf());
    } else {
        anyhow::bail!("input {} does not exist", input.display());
    }

    let out = File::create(output).with_context(|| format!("creating {}", output.display()))?;
    let mut out = BufWriter::new(out);
    let mut written = 0usize;
    for file in files {
        let docs = if file.extension().and_then(|s| s.to_str()) == Some("jsonl") {
            read_jsonl(&file)?
        } else {
            read_json(&file)?
        };
        for doc in docs {
            write_record(&mut out, &doc.title, &doc.body, doc.url.as_deref().unwrap_or(""))?;
            written += 1;
        }
    }
    out.flush()?;
    tracing::info!(written, output = %output.display(), "corpus written");
    Ok(())
}

fn read_jsonl(file: &Path) -> Result<Vec<InputDoc>> {
    let reader = BufReader::new(File::open(file).with_context(|| format!("opening {}", file.display()))?);
    let mut docs = Vec::new();
    for (n, line) in reader.lines().enumerate() {
        let line = line?;
        if line.trim().is_empty() { continue; }
        match serde_json::from_str::<InputDoc>(&line) {
            Ok(doc) => docs.push(doc),
            Err(err) => tracing::warn!(file = %file.display(), line = n + 1, error = %err, "skipping document"),
        }
    }
    Ok(docs)
}

fn read_json(file: &Path) -> Result<Vec<InputDoc>> {
    let reader = BufReader::new(File::open(file).with_context(|| format!("opening {}", file.display()))?);
    let json: serde_json::Value = serde_json::from_reader(reader)
        .with_context(|| format!("parsing {}", file.display()))?;
    let docs = match json {
        serde_json::Value::Array(arr) => arr
            .into_iter()
            .map(serde_json::from_value)
            .collect::<Result<Vec<InputDoc>, _>>()?,
        obj @ serde_json::Value::Object(_) => vec![serde_json::from_value(obj)?],
        _ => Vec::new(),
    };
    Ok(docs)
}

fn stats(args: &IndexArgs, json: bool) -> Result<()> {
    let (_index, stats, _) = load_index(args)?;
    let report = StatsReport {
        corpus: args.corpus.display().to_string(),
        built_at: time::OffsetDateTime::now_utc().format(&time::format_description::well_known::Rfc3339).unwrap_or_default(),
        stats,
    };
    if json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        println!("corpus:    {}", report.corpus);
        println!("documents: {}", stats.documents);
        println!("terms:     {}", stats.terms);
        println!("postings:  {}", stats.postings);
        println!("skipped:   {}", stats.skipped);
    }
    Ok(())
}

fn query_loop(args: &IndexArgs) -> Result<()> {
    let (index, _, analyzer) = load_index(args)?;
    let searcher = Searcher::new(Arc::new(index), Arc::new(analyzer));
    let stdin = io::stdin();
    let mut stdout = io::stdout().lock();
    write!(stdout, "Please Enter: ")?;
    stdout.flush()?;
    for line in stdin.lock().lines() {
        let line = line?;
        let query = line.trim();
        if !query.is_empty() {
            writeln!(stdout, "{}", searcher.search_json(query)?)?;
        }
        write!(stdout, "Please Enter: ")?;
        stdout.flush()?;
    }
    writeln!(stdout)?;
    Ok(())
}
