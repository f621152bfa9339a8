use anyhow::Result;
use clap::Parser;
use server::{build_app, load_searcher, IndexConfig};
use std::net::SocketAddr;
use std::path::PathBuf;
use tokio::net::TcpListener;
use tracing_subscriber::{fmt, EnvFilter};

#[derive(Parser)]
struct Args {
    /// Corpus file, one `title\x03content\x03url` record per line
    #[arg(long, default_value = "./data/raw_html/raw")]
    corpus: PathBuf,
    /// Stopword file (one word per line); the built-in English list is used otherwise
    #[arg(long)]
    stopwords: Option<PathBuf>,
    /// Stem terms with the English Snowball stemmer
    #[arg(long, default_value_t = false)]
    stem: bool,
    /// Directory of static files served next to the search endpoint
    #[arg(long, default_value = "./wwwroot")]
    www_root: PathBuf,
    /// Host to bind
    #[arg(long, default_value = "0.0.0.0")]
    host: String,
    /// Port to bind
    #[arg(long, default_value_t = 8080)]
    port: u16,
}

#[tokio::main]
async fn main() -> Result<()> {
    fmt().with_env_filter(EnvFilter::from_default_env()).init();
    let args = Args::parse();

    let config = IndexConfig { corpus: args.corpus, stopwords: args.stopwords, stem: args.stem };
    let searcher = load_searcher(&config)?;
    let www_root = args.www_root.is_dir().then_some(args.www_root);
    let app = build_app(searcher, www_root);

    let addr: SocketAddr = format!("{}:{}", args.host, args.port).parse()?;
    let listener = TcpListener::bind(addr).await?;
    tracing::info!(%addr, "server listening");
    axum::serve(listener, app).await?;
    Ok(())
}
