use anyhow::{Context, Result};
use axum::{extract::{Path, Query, State}, http::StatusCode, response::{IntoResponse, Response}, routing::get, Json, Router};
use sift_core::{Analyzer, IndexStore, SearchHit, Searcher};
use serde::Deserialize;
use std::path::PathBuf;
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer, AllowOrigin};
use tower_http::services::ServeDir;
use tower_http::trace::TraceLayer;

#[derive(Deserialize)]
pub struct SearchParams {
    pub words: Option<String>,
}

#[derive(Clone)]
pub struct AppState {
    pub searcher: Searcher,
}

/// Where the index comes from and how terms are analyzed.
#[derive(Debug, Clone)]
pub struct IndexConfig {
    pub corpus: PathBuf,
    pub stopwords: Option<PathBuf>,
    pub stem: bool,
}

/// Build the index once at startup. Any failure to open the corpus or the
/// stopword file aborts startup.
pub fn load_searcher(config: &IndexConfig) -> Result<Searcher> {
    let analyzer = match &config.stopwords {
        Some(path) => Analyzer::from_stopwords_file(path)
            .with_context(|| format!("loading stopwords from {}", path.display()))?,
        None => Analyzer::english(),
    }
    .with_stemming(config.stem);

    let (index, stats) = IndexStore::open(&config.corpus, &analyzer)
        .with_context(|| format!("building index from {}", config.corpus.display()))?;
    tracing::info!(documents = stats.documents, terms = stats.terms, skipped = stats.skipped, "index ready");
    Ok(Searcher::new(Arc::new(index), Arc::new(analyzer)))
}

pub fn build_app(searcher: Searcher, www_root: Option<PathBuf>) -> Router {
    let app_state = AppState { searcher };

    // CORS: read CORS_ALLOW_ORIGIN (comma-separated) or allow Any by default
    let cors = match std::env::var("CORS_ALLOW_ORIGIN") {
        Ok(val) => {
            let origins: Vec<_> = val
                .split(',')
                .filter_map(|s| s.trim().parse().ok())
                .collect();
            if origins.is_empty() {
                CorsLayer::new().allow_origin(Any).allow_methods(Any).allow_headers(Any)
            } else {
                CorsLayer::new().allow_origin(AllowOrigin::list(origins)).allow_methods(Any).allow_headers(Any)
            }
        }
        Err(_) => CorsLayer::new().allow_origin(Any).allow_methods(Any).allow_headers(Any),
    };

    let mut app = Router::new()
        .route("/health", get(|| async { "ok" }))
        .route("/s", get(search_handler))
        .route("/doc/:doc_id", get(doc_handler))
        .with_state(app_state);
    if let Some(root) = www_root {
        tracing::info!(root = %root.display(), "serving static files");
        app = app.fallback_service(ServeDir::new(root));
    }
    app.layer(cors).layer(TraceLayer::new_for_http())
}

pub async fn search_handler(State(state): State<AppState>, Query(params): Query<SearchParams>) -> Response {
    let Some(query) = params.words else {
        return (StatusCode::BAD_REQUEST, "query parameter `words` is required").into_response();
    };
    tracing::info!(query = %query, "search request");
    let hits: Vec<SearchHit> = state.searcher.search(&query);
    Json(hits).into_response()
}

pub async fn doc_handler(State(state): State<AppState>, Path(doc_id): Path<u64>) -> Response {
    match state.searcher.index().document(doc_id) {
        Some(doc) => Json(doc.clone()).into_response(),
        None => (StatusCode::NOT_FOUND, Json(serde_json::json!({ "error": "not found" }))).into_response(),
    }
}
