use anyhow::Result;
use axum::{extract::{Path, Query, State}, http::{HeaderMap, StatusCode}, routing::{get, post}, Json, Router};
use ir_core::corpus::load_corpus;
use ir_core::{DocId, DocMeta, Document, EngineConfig, SearchEngine, SharedEngine};
use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use std::path::Path as FsPath;
use std::sync::Arc;
use tower_http::cors::{AllowOrigin, Any, CorsLayer};
use tower_http::trace::TraceLayer;

#[derive(Deserialize)]
pub struct SearchParams {
    #[serde(alias = "query")]
    pub q: String,
    /// Cap on listed results; `total_hits` is always the full count.
    pub limit: Option<usize>,
}

#[derive(Serialize)]
pub struct SearchResponse {
    pub query: String,
    pub took_s: f64,
    pub total_hits: usize,
    pub results: Vec<SearchHit>,
}

#[derive(Serialize)]
pub struct SearchHit {
    pub doc_id: DocId,
    pub title: String,
    pub url: Option<String>,
}

#[derive(Deserialize)]
pub struct ZipfParams {
    #[serde(default = "default_top")]
    pub top: usize,
}
fn default_top() -> usize { 50 }

#[derive(Serialize)]
pub struct ZipfEntry {
    pub rank: usize,
    pub term: String,
    pub frequency: u64,
    pub fitted: f64,
}

#[derive(Serialize)]
pub struct BatchResponse {
    pub indexed: usize,
    pub first_doc_id: Option<DocId>,
}

#[derive(Clone)]
pub struct AppState {
    pub engine: SharedEngine,
    /// Metadata by doc id; ids are positions in this list.
    pub docs: Arc<RwLock<Vec<DocMeta>>>,
    pub admin_token: Option<String>,
}

impl AppState {
    /// Index `docs` under fresh ids. Metadata is published before the
    /// postings so a search never returns an id without metadata.
    pub fn add_documents(&self, docs: &[Document]) -> Result<Option<DocId>> {
        let first = {
            let mut metas = self.docs.write();
            let first = first_new_id(metas.len(), docs.len())?;
            metas.extend(docs.iter().map(Document::meta));
            first
        };
        let mut engine = self.engine.write();
        for (doc_id, doc) in (first..).zip(docs) {
            engine.build_index_for_document_with_zipf(&doc.content, doc_id);
        }
        Ok((!docs.is_empty()).then_some(first))
    }
}

/// First of `count` consecutive ids starting at `start`. Fails unless the
/// whole run fits in a `DocId`.
fn first_new_id(start: usize, count: usize) -> Result<DocId> {
    let first = DocId::try_from(start)?;
    if let Some(last) = (start + count).checked_sub(1) {
        DocId::try_from(last)?;
    }
    Ok(first)
}

/// Load the corpus at `corpus` and index it.
pub fn load_state<P: AsRef<FsPath>>(corpus: P, config: EngineConfig, admin_token: Option<String>) -> Result<AppState> {
    let docs = load_corpus(corpus.as_ref())?;
    let mut engine = SearchEngine::new(config);
    engine.init();
    let state = AppState { engine: engine.into_shared(), docs: Arc::new(RwLock::new(Vec::new())), admin_token };
    state.add_documents(&docs)?;
    tracing::info!(documents = docs.len(), terms = state.engine.read().stats().terms, "index ready");
    Ok(state)
}

pub fn build_app<P: AsRef<FsPath>>(corpus: P, config: EngineConfig) -> Result<Router> {
    let admin_token = std::env::var("ADMIN_TOKEN").ok();
    Ok(router(load_state(corpus, config, admin_token)?))
}

pub fn router(app_state: AppState) -> Router {
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

    Router::new()
        .route("/health", get(|| async { "ok" }))
        .route("/search", get(search_handler))
        .route("/doc/:doc_id", get(doc_handler))
        .route("/zipf", get(zipf_handler))
        .route("/index/batch", post(index_batch))
        .with_state(app_state)
        .layer(cors)
        .layer(TraceLayer::new_for_http())
}

pub async fn search_handler(State(state): State<AppState>, Query(params): Query<SearchParams>) -> Json<SearchResponse> {
    let start = std::time::Instant::now();
    let ids = state.engine.read().boolean_search(&params.q);
    let total_hits = ids.len();
    let limit = params.limit.unwrap_or(usize::MAX);

    let docs = state.docs.read();
    let results = ids
        .into_iter()
        .take(limit)
        .map(|doc_id| {
            let meta = docs.get(doc_id as usize);
            SearchHit {
                doc_id,
                title: meta.map(|m| m.title.clone()).unwrap_or_else(|| "N/A".into()),
                url: meta.and_then(|m| m.url.clone()),
            }
        })
        .collect();

    let elapsed = start.elapsed();
    Json(SearchResponse { query: params.q, took_s: elapsed.as_secs_f64(), total_hits, results })
}

pub async fn doc_handler(State(state): State<AppState>, Path(doc_id): Path<DocId>) -> (StatusCode, Json<serde_json::Value>) {
    match state.docs.read().get(doc_id as usize) {
        Some(meta) => (StatusCode::OK, Json(serde_json::json!({
            "doc_id": doc_id,
            "title": meta.title,
            "url": meta.url,
        }))),
        None => (StatusCode::NOT_FOUND, Json(serde_json::json!({ "error": "not found" }))),
    }
}

pub async fn zipf_handler(State(state): State<AppState>, Query(params): Query<ZipfParams>) -> Json<Vec<ZipfEntry>> {
    let report = state.engine.read().analyze_zipf();
    let entries = report
        .rows()
        .zip(report.entries())
        .take(params.top)
        .map(|(row, e)| ZipfEntry { rank: row.rank, term: e.term.clone(), frequency: row.frequency, fitted: row.fitted })
        .collect();
    Json(entries)
}

async fn index_batch(State(state): State<AppState>, headers: HeaderMap, Json(docs): Json<Vec<Document>>) -> Result<Json<BatchResponse>, (StatusCode, String)> {
    authorize(&state, &headers)?;
    let first_doc_id = state
        .add_documents(&docs)
        .map_err(|e| (StatusCode::UNPROCESSABLE_ENTITY, e.to_string()))?;
    tracing::info!(indexed = docs.len(), ?first_doc_id, "batch indexed");
    Ok(Json(BatchResponse { indexed: docs.len(), first_doc_id }))
}

fn authorize(state: &AppState, headers: &HeaderMap) -> Result<(), (StatusCode, String)> {
    let required = match &state.admin_token {
        Some(t) => t,
        None => return Err((StatusCode::UNAUTHORIZED, "ADMIN_TOKEN not set".into())),
    };
    let provided = headers.get("X-ADMIN-TOKEN").and_then(|v| v.to_str().ok()).unwrap_or("");
    if provided == required {
        Ok(())
    } else {
        Err((StatusCode::UNAUTHORIZED, "invalid admin token".into()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn batch_may_fill_the_id_range_exactly() {
        let max = DocId::MAX as usize;
        assert_eq!(first_new_id(max, 1).unwrap(), DocId::MAX);
        assert_eq!(first_new_id(max - 2, 3).unwrap(), DocId::MAX - 2);
        assert!(first_new_id(max, 2).is_err());
        assert!(first_new_id(max + 1, 0).is_err());
    }

    #[test]
    fn empty_batch_only_checks_the_start() {
        assert_eq!(first_new_id(0, 0).unwrap(), 0);
        assert_eq!(first_new_id(DocId::MAX as usize, 0).unwrap(), DocId::MAX);
    }
}
