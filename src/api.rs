use crate::document::DocumentMeta;
use crate::engine::{SearchEngine, SearchResult};
use crate::markdown::{self, Frontmatter};
use axum::{
    extract::{Path, Query, State},
    response::{IntoResponse, Json},
    routing::get,
    Router,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tower_http::{cors::CorsLayer, trace::TraceLayer};

// ========== Request/Response Types ==========

#[derive(Debug, Deserialize)]
pub struct SearchRequest {
    pub q: String,
}

#[derive(Debug, Deserialize)]
pub struct ContentRequest {
    pub path: String,
}

#[derive(Debug, Serialize)]
pub struct SearchResponse {
    pub results: Vec<SearchResult>,
    pub total: usize,
    pub query: String,
}

#[derive(Debug, Serialize)]
pub struct ContentResponse {
    pub path: String,
    pub content: String,
}

#[derive(Debug, Serialize)]
pub struct RenderResponse {
    pub frontmatter: Frontmatter,
    pub html_content: String,
    pub excerpt: String,
}

#[derive(Debug, Serialize)]
pub struct ApiResponse<T> {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

impl<T> ApiResponse<T> {
    fn success(data: T) -> Self {
        Self {
            success: true,
            data: Some(data),
            message: None,
        }
    }

    fn error_msg(message: String) -> Self {
        ApiResponse {
            success: false,
            data: None,
            message: Some(message),
        }
    }
}

// ========== Handlers ==========

async fn health_check() -> impl IntoResponse {
    Json(ApiResponse::success("OK"))
}

async fn list_documents(State(engine): State<Arc<SearchEngine>>) -> impl IntoResponse {
    let documents: Vec<DocumentMeta> = engine.index().list_documents();
    Json(ApiResponse::success(documents))
}

async fn get_document(
    State(engine): State<Arc<SearchEngine>>,
    Path(id): Path<String>,
) -> impl IntoResponse {
    match engine.index().get_document(&id) {
        Some(doc) => Json(ApiResponse::success(doc)),
        None => Json(ApiResponse::error_msg(format!(
            "Document with id '{}' not found",
            id
        ))),
    }
}

async fn get_content(
    State(engine): State<Arc<SearchEngine>>,
    Query(req): Query<ContentRequest>,
) -> impl IntoResponse {
    let content = engine.index().get_content(&req.path);
    Json(ApiResponse::success(ContentResponse {
        path: req.path,
        content,
    }))
}

async fn search_documents(
    State(engine): State<Arc<SearchEngine>>,
    Query(req): Query<SearchRequest>,
) -> impl IntoResponse {
    let results = engine.search(&req.q);

    let response = SearchResponse {
        total: results.len(),
        results,
        query: req.q,
    };

    Json(ApiResponse::success(response))
}

async fn render_document(
    State(engine): State<Arc<SearchEngine>>,
    Query(req): Query<ContentRequest>,
) -> impl IntoResponse {
    let content = engine.index().get_content(&req.path);
    let parsed = markdown::parse(&content);

    Json(ApiResponse::success(RenderResponse {
        frontmatter: parsed.frontmatter,
        html_content: parsed.html_content,
        excerpt: parsed.excerpt,
    }))
}

// ========== Router ==========

pub fn create_router(engine: Arc<SearchEngine>) -> Router {
    Router::new()
        .route("/health", get(health_check))
        .route("/documents", get(list_documents))
        .route("/documents/:id", get(get_document))
        .route("/content", get(get_content))
        .route("/search", get(search_documents))
        .route("/render", get(render_document))
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(engine)
}

/// Serve the API until the process is stopped.
pub async fn serve(engine: Arc<SearchEngine>, addr: &str) -> anyhow::Result<()> {
    let app = create_router(engine);
    let listener = tokio::net::TcpListener::bind(addr).await?;
    tracing::info!(%addr, "serving help-center API");
    axum::serve(listener, app).await?;
    Ok(())
}
