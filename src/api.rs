//! HTTP API serving the query pipeline and health probe.
//!
//! Consumed by the dashboard and any plain HTTP client. All origins are
//! permitted; the dashboard is served from a different port.
//!
//! | Method | Path | Description |
//! |--------|------|-------------|
//! | `GET`  | `/` | Service name and version |
//! | `GET`  | `/health` | Liveness probe |
//! | `GET`  | `/api/products` | Search products for a query |
//!
//! Request validation happens here, before the orchestrator runs: a too
//! short query or an out-of-range `limit`/`min_rating` is rejected with
//! 422 and the offending parameter named. A total fetch failure maps to
//! 502 so "source unreachable" is never confused with an empty result.

use std::sync::Arc;

use axum::extract::{Query, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::get;
use axum::{Json, Router};
use chrono::Utc;
use serde::{Deserialize, Serialize};
use tower_http::cors::{Any, CorsLayer};
use tracing::{error, info};

use crate::search::{SearchOptions, Searcher};
use crate::{Product, Result, ScrapeError};

const NAME: &str = env!("CARGO_PKG_NAME");
const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Shared state passed to route handlers.
#[derive(Clone)]
struct AppState {
    searcher: Arc<Searcher>,
}

/// Builds the API router over a searcher.
pub fn router(searcher: Arc<Searcher>) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/", get(root))
        .route("/health", get(health))
        .route("/api/products", get(products))
        .layer(cors)
        .with_state(AppState { searcher })
}

/// Binds and serves the API until the process is terminated.
pub async fn serve(searcher: Arc<Searcher>, bind: &str) -> Result<()> {
    let app = router(searcher);
    let listener = tokio::net::TcpListener::bind(bind).await?;
    info!("listening on http://{bind}");
    axum::serve(listener, app).await?;
    Ok(())
}

#[derive(Debug, Serialize)]
struct RootResponse {
    name: &'static str,
    version: &'static str,
}

async fn root() -> Json<RootResponse> {
    Json(RootResponse {
        name: NAME,
        version: VERSION,
    })
}

#[derive(Debug, Serialize)]
struct HealthResponse {
    status: &'static str,
    timestamp: String,
    version: &'static str,
}

async fn health() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy",
        timestamp: Utc::now().to_rfc3339(),
        version: VERSION,
    })
}

/// Query-string parameters for `/api/products`. All optional at the type
/// level so validation can name the missing/invalid parameter itself.
#[derive(Debug, Deserialize)]
struct ProductsParams {
    query: Option<String>,
    limit: Option<usize>,
    min_rating: Option<f64>,
}

/// Response envelope for a product search.
#[derive(Debug, Serialize)]
struct ProductsResponse {
    query: String,
    count: usize,
    cached: bool,
    products: Vec<Product>,
}

async fn products(
    State(state): State<AppState>,
    Query(params): Query<ProductsParams>,
) -> Response {
    let Some(query) = params.query else {
        return error_response(ScrapeError::InvalidQuery(
            "query parameter is required".to_string(),
        ));
    };

    let options = SearchOptions {
        limit: params.limit.unwrap_or(20),
        min_rating: params.min_rating.unwrap_or(0.0),
    };

    match state.searcher.search(&query, options).await {
        Ok(result) => Json(ProductsResponse {
            query: result.query,
            count: result.products.len(),
            cached: result.cached,
            products: result.products,
        })
        .into_response(),
        Err(e) => error_response(e),
    }
}

#[derive(Debug, Serialize)]
struct ErrorBody {
    detail: String,
}

fn error_response(err: ScrapeError) -> Response {
    let status = match &err {
        ScrapeError::InvalidQuery(_) | ScrapeError::InvalidParameter(_) => {
            StatusCode::UNPROCESSABLE_ENTITY
        }
        ScrapeError::TotalFetchFailure(_) => StatusCode::BAD_GATEWAY,
        _ => {
            error!(error = %err, "request failed");
            StatusCode::INTERNAL_SERVER_ERROR
        }
    };

    (
        status,
        Json(ErrorBody {
            detail: err.to_string(),
        }),
    )
        .into_response()
}
