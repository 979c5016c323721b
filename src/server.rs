//! HTTP surface over a shared catalog.
//!
//! All handlers read from an immutable catalog snapshot; `POST /reload`
//! builds a replacement catalog and publishes it atomically.

use crate::catalog::{CatalogStats, SearchHit, SharedCatalog};
use crate::config::DEFAULT_SEARCH_LIMIT;
use crate::document::{self, Document};
use crate::error::KbError;
use crate::render;
use axum::extract::{Path, Query, State};
use axum::http::{header, StatusCode};
use axum::response::{Html, IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use serde::{Deserialize, Serialize};
use serde_json::json;
use tracing::{info, warn};

/// Document metadata without the body, for listing endpoints.
#[derive(Debug, Clone, Serialize)]
pub struct DocSummary {
    /// Document id.
    pub id: String,
    /// Short docid handle.
    pub docid: String,
    /// Document title.
    pub title: String,
    /// Document category.
    pub category: String,
    /// Body size in bytes.
    pub size: usize,
}

impl From<&Document> for DocSummary {
    fn from(doc: &Document) -> Self {
        Self {
            id: doc.id.clone(),
            docid: doc.docid.clone(),
            title: doc.title.clone(),
            category: doc.category.clone(),
            size: doc.size,
        }
    }
}

/// Query parameters for `GET /search`.
#[derive(Debug, Deserialize)]
pub struct SearchParams {
    /// Search query.
    pub q: Option<String>,
    /// Maximum number of results.
    pub limit: Option<usize>,
    /// Restrict results to a category.
    pub category: Option<String>,
}

/// Query parameters for `GET /docs/{id}`.
#[derive(Debug, Deserialize)]
pub struct ShowParams {
    /// Return raw markdown instead of rendered HTML.
    #[serde(default)]
    pub raw: bool,
}

/// Build the application router.
pub fn router(shared: SharedCatalog) -> Router {
    Router::new()
        .route("/docs", get(list_docs))
        .route("/docs/*id", get(show_doc))
        .route("/categories", get(list_categories))
        .route("/categories/:name", get(show_category))
        .route("/search", get(search))
        .route("/healthz", get(healthz))
        .route("/reload", post(reload))
        .with_state(shared)
}

/// Run the server until interrupted.
pub async fn serve(shared: SharedCatalog, addr: &str) -> std::io::Result<()> {
    let app = router(shared);
    let listener = tokio::net::TcpListener::bind(addr).await?;
    info!(%addr, "qkb serving catalog");
    axum::serve(listener, app).await
}

fn error_response(err: &KbError) -> Response {
    let status = match err {
        KbError::DocumentNotFound(_) | KbError::CategoryNotFound(_) => StatusCode::NOT_FOUND,
        KbError::BadQuery(_) => StatusCode::BAD_REQUEST,
        _ => StatusCode::INTERNAL_SERVER_ERROR,
    };
    (status, Json(json!({ "error": err.to_string() }))).into_response()
}

async fn list_docs(State(shared): State<SharedCatalog>) -> Json<Vec<DocSummary>> {
    let catalog = shared.current();
    Json(catalog.all().iter().map(DocSummary::from).collect())
}

async fn show_doc(
    State(shared): State<SharedCatalog>,
    Path(id): Path<String>,
    Query(params): Query<ShowParams>,
) -> Response {
    let catalog = shared.current();
    match catalog.resolve(&id) {
        Ok(doc) => {
            if params.raw {
                (
                    [(header::CONTENT_TYPE, "text/markdown; charset=utf-8")],
                    doc.body.clone(),
                )
                    .into_response()
            } else {
                Html(render::render_page(doc)).into_response()
            }
        }
        Err(err) => error_response(&err),
    }
}

async fn list_categories(State(shared): State<SharedCatalog>) -> Response {
    let catalog = shared.current();
    Json(catalog.stats().categories).into_response()
}

async fn show_category(
    State(shared): State<SharedCatalog>,
    Path(name): Path<String>,
) -> Response {
    let catalog = shared.current();
    match catalog.list_category(&name) {
        Ok(docs) => {
            let summaries: Vec<DocSummary> = docs.into_iter().map(DocSummary::from).collect();
            Json(summaries).into_response()
        }
        Err(err) => error_response(&err),
    }
}

async fn search(
    State(shared): State<SharedCatalog>,
    Query(params): Query<SearchParams>,
) -> Response {
    let Some(query) = params.q.filter(|q| !q.trim().is_empty()) else {
        return error_response(&KbError::BadQuery(
            "Missing query parameter 'q'".to_string(),
        ));
    };

    let catalog = shared.current();
    let limit = params.limit.unwrap_or(DEFAULT_SEARCH_LIMIT);

    let category_slug = match params.category.as_deref() {
        Some(name) => {
            let slug = document::slugify_path(name);
            if !catalog.categories().contains(&slug) {
                return error_response(&KbError::CategoryNotFound(name.to_string()));
            }
            Some(slug)
        }
        None => None,
    };

    // Category filtering happens after scoring, so search wide and
    // truncate last; otherwise low-ranked in-category hits are lost.
    match catalog.search(&query, usize::MAX) {
        Ok(mut hits) => {
            if let Some(slug) = category_slug {
                hits.retain(|h| h.category == slug);
            }
            hits.truncate(limit);
            Json::<Vec<SearchHit>>(hits).into_response()
        }
        Err(err) => error_response(&err),
    }
}

async fn healthz(State(shared): State<SharedCatalog>) -> Json<CatalogStats> {
    Json(shared.current().stats())
}

async fn reload(State(shared): State<SharedCatalog>) -> Response {
    // Rebuilding walks the filesystem; keep it off the async workers.
    let result = tokio::task::spawn_blocking(move || shared.reload()).await;

    let result = match result {
        Ok(r) => r,
        Err(join_err) => {
            warn!(error = %join_err, "reload task panicked");
            return (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(json!({ "error": "reload task failed" })),
            )
                .into_response();
        }
    };

    match result {
        Ok(stats) => {
            info!(total = stats.total_documents, "catalog reloaded");
            Json(stats).into_response()
        }
        Err(err) => {
            warn!(error = %err, "catalog reload failed, keeping current snapshot");
            error_response(&err)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::Catalog;
    use std::fs;
    use std::path::Path as FsPath;

    fn write_tree(root: &FsPath) {
        let cat_a = root.join("cat-a");
        fs::create_dir_all(&cat_a).unwrap();
        for i in 0..5 {
            fs::write(
                cat_a.join(format!("widget-{i}.md")),
                format!("# Widget guide {i}\n\nwidget widget widget widget\n"),
            )
            .unwrap();
        }
        let cat_b = root.join("cat-b");
        fs::create_dir_all(&cat_b).unwrap();
        fs::write(
            cat_b.join("other.md"),
            "# Unrelated topic\n\nA single widget mention.\n",
        )
        .unwrap();
    }

    fn shared_catalog(root: &FsPath) -> SharedCatalog {
        SharedCatalog::new(Catalog::load(root, "**/*.md", &[]).unwrap())
    }

    async fn body_json(response: Response) -> serde_json::Value {
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[tokio::test]
    async fn category_filter_keeps_low_ranked_hits() {
        let dir = tempfile::tempdir().unwrap();
        write_tree(dir.path());
        let shared = shared_catalog(dir.path());

        // The cat-b hit ranks below the limit; scoping to cat-b must
        // still surface it.
        let response = search(
            State(shared),
            Query(SearchParams {
                q: Some("widget".to_string()),
                limit: Some(3),
                category: Some("cat-b".to_string()),
            }),
        )
        .await;

        assert_eq!(response.status(), StatusCode::OK);
        let hits = body_json(response).await;
        let hits = hits.as_array().unwrap();
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0]["category"], "cat-b");
    }

    #[tokio::test]
    async fn unknown_category_is_404() {
        let dir = tempfile::tempdir().unwrap();
        write_tree(dir.path());
        let shared = shared_catalog(dir.path());

        let response = search(
            State(shared),
            Query(SearchParams {
                q: Some("widget".to_string()),
                limit: None,
                category: Some("cat-z".to_string()),
            }),
        )
        .await;

        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn missing_query_is_400() {
        let dir = tempfile::tempdir().unwrap();
        write_tree(dir.path());
        let shared = shared_catalog(dir.path());

        let response = search(
            State(shared),
            Query(SearchParams {
                q: None,
                limit: None,
                category: None,
            }),
        )
        .await;

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }
}
