//! HTTP server.
//!
//! The catalog is loaded once before the listener binds, so no request ever
//! sees a partially loaded catalog. Handlers read a snapshot of the current
//! catalog; `POST /catalog/reload` builds a new one off the async runtime and
//! swaps it in.
//!
//! # Endpoints
//!
//! | Method | Path | Description |
//! |--------|------|-------------|
//! | `GET`  | `/products/search?name=` | In-stock products whose name contains `name` |
//! | `POST` | `/products/quote` | Render a cart to a quotation PDF |
//! | `POST` | `/products/send` | Email a rendered quotation |
//! | `GET`  | `/debug/warehouses` | Per-warehouse row counts |
//! | `POST` | `/catalog/reload` | Rebuild the catalog from disk |
//! | `GET`  | `/health` | Health check (returns version) |
//!
//! # Error Contract
//!
//! ```json
//! { "error": { "code": "bad_request", "message": "missing required query parameter: name" } }
//! ```
//!
//! Error codes: `bad_request` (400), `mail_disabled` (400), `not_found` (404),
//! `internal` (500).

use axum::{
    extract::{Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};
use tracing::{info, warn};

use catalog_core::catalog::CatalogHandle;
use catalog_core::models::CatalogSummary;
use catalog_core::quote::CartItem;
use catalog_core::search::{search, SearchOutcome};

use crate::config::Config;
use crate::loader::{load_catalog, reload_catalog};
use crate::mail::{Mailer, SmtpMailer};
use crate::quotes::{find_quote, generate_quote};

/// Shared application state passed to all route handlers via Axum's `State` extractor.
#[derive(Clone)]
pub struct AppState {
    config: Arc<Config>,
    catalog: Arc<CatalogHandle>,
    /// `None` when `[mail]` is not configured.
    mailer: Option<Arc<dyn Mailer>>,
}

impl AppState {
    pub fn new(config: Config, catalog: Arc<CatalogHandle>, mailer: Option<Arc<dyn Mailer>>) -> Self {
        Self {
            config: Arc::new(config),
            catalog,
            mailer,
        }
    }
}

/// Load the catalog, then serve until the process is terminated.
pub async fn run_server(config: &Config) -> anyhow::Result<()> {
    let catalog_config = config.catalog.clone();
    let catalog = tokio::task::spawn_blocking(move || load_catalog(&catalog_config)).await?;
    let mailer: Option<Arc<dyn Mailer>> = config
        .mail
        .clone()
        .map(|m| Arc::new(SmtpMailer::new(m)) as Arc<dyn Mailer>);
    if mailer.is_none() {
        info!("no [mail] section configured; quotation delivery is disabled");
    }

    let state = AppState::new(config.clone(), Arc::new(CatalogHandle::new(catalog)), mailer);
    serve(state).await
}

/// Serve an already-built state. Used by [`run_server`] and by tests that
/// need a custom mailer.
pub async fn serve(state: AppState) -> anyhow::Result<()> {
    let bind_addr = state.config.server.bind.clone();
    let app = router(state);

    let listener = tokio::net::TcpListener::bind(&bind_addr).await?;
    info!(addr = %bind_addr, "server listening");
    axum::serve(listener, app).await?;

    Ok(())
}

pub fn router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/products/search", get(handle_search))
        .route("/products/quote", post(handle_quote))
        .route("/products/send", post(handle_send))
        .route("/debug/warehouses", get(handle_warehouses))
        .route("/catalog/reload", post(handle_reload))
        .route("/health", get(handle_health))
        .layer(cors)
        .with_state(state)
}

// ============ Error response ============

#[derive(Serialize)]
struct ErrorBody {
    error: ErrorDetail,
}

#[derive(Serialize)]
struct ErrorDetail {
    code: String,
    message: String,
}

/// Internal error type that converts into an Axum HTTP response.
#[derive(Debug)]
struct AppError {
    status: StatusCode,
    code: &'static str,
    message: String,
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let body = ErrorBody {
            error: ErrorDetail {
                code: self.code.to_string(),
                message: self.message,
            },
        };
        (self.status, Json(body)).into_response()
    }
}

fn bad_request(message: impl Into<String>) -> AppError {
    AppError {
        status: StatusCode::BAD_REQUEST,
        code: "bad_request",
        message: message.into(),
    }
}

fn not_found(message: impl Into<String>) -> AppError {
    AppError {
        status: StatusCode::NOT_FOUND,
        code: "not_found",
        message: message.into(),
    }
}

fn mail_disabled() -> AppError {
    AppError {
        status: StatusCode::BAD_REQUEST,
        code: "mail_disabled",
        message: "quotation delivery is not configured (missing [mail] section)".to_string(),
    }
}

fn internal(message: impl Into<String>) -> AppError {
    AppError {
        status: StatusCode::INTERNAL_SERVER_ERROR,
        code: "internal",
        message: message.into(),
    }
}

// ============ GET /products/search ============

#[derive(Deserialize)]
struct SearchParams {
    name: Option<String>,
}

/// Query validation happens before the catalog is touched.
async fn handle_search(
    State(state): State<AppState>,
    Query(params): Query<SearchParams>,
) -> Result<Json<SearchOutcome>, AppError> {
    let query = params
        .name
        .ok_or_else(|| bad_request("missing required query parameter: name"))?;
    if query.trim().is_empty() {
        return Err(bad_request("query parameter 'name' must not be empty"));
    }

    let catalog = state.catalog.snapshot();
    let outcome = search(&catalog, &query).map_err(|e| bad_request(e.to_string()))?;
    Ok(Json(outcome))
}

// ============ POST /products/quote ============

#[derive(Deserialize)]
struct QuoteRequest {
    #[serde(default)]
    file_name: Option<String>,
    #[serde(default)]
    cart: Vec<CartItem>,
}

#[derive(Serialize)]
struct QuoteResponse {
    message: String,
    file: String,
    lines: usize,
    total: f64,
}

async fn handle_quote(
    State(state): State<AppState>,
    Json(req): Json<QuoteRequest>,
) -> Result<Json<QuoteResponse>, AppError> {
    if req.cart.is_empty() {
        return Err(bad_request("cart must contain at least one item"));
    }

    let dir = state.config.quotes.dir.clone();
    let generated = tokio::task::spawn_blocking(move || {
        generate_quote(&dir, req.file_name.as_deref(), &req.cart)
    })
    .await
    .map_err(|e| internal(e.to_string()))?
    .map_err(|e| {
        let msg = e.to_string();
        if msg.contains("invalid file name") {
            bad_request(msg)
        } else {
            internal(msg)
        }
    })?;

    Ok(Json(QuoteResponse {
        message: "Quotation generated".to_string(),
        file: generated.file,
        lines: generated.lines,
        total: generated.total,
    }))
}

// ============ POST /products/send ============

#[derive(Deserialize)]
struct SendRequest {
    #[serde(default)]
    email: Option<String>,
    #[serde(default)]
    pdf_file: Option<String>,
}

#[derive(Serialize)]
struct MessageResponse {
    message: String,
}

async fn handle_send(
    State(state): State<AppState>,
    Json(req): Json<SendRequest>,
) -> Result<Json<MessageResponse>, AppError> {
    let non_blank = |v: Option<String>| v.filter(|s| !s.trim().is_empty());
    let (Some(email), Some(pdf_file)) = (non_blank(req.email), non_blank(req.pdf_file)) else {
        return Err(bad_request("missing required fields: email or pdf_file"));
    };

    let mailer = state.mailer.clone().ok_or_else(mail_disabled)?;
    let path = find_quote(&state.config.quotes.dir, &pdf_file).map_err(|e| {
        let msg = e.to_string();
        if msg.contains("not found") {
            not_found(msg)
        } else {
            bad_request(msg)
        }
    })?;

    let recipient = email.clone();
    tokio::task::spawn_blocking(move || mailer.send_quote(&recipient, &path))
        .await
        .map_err(|e| internal(e.to_string()))?
        .map_err(|e| {
            warn!(recipient = %email, error = %e, "quotation delivery failed");
            internal(format!("{:#}", e))
        })?;

    Ok(Json(MessageResponse {
        message: format!("Quotation sent to {}.", email),
    }))
}

// ============ GET /debug/warehouses ============

async fn handle_warehouses(State(state): State<AppState>) -> Json<CatalogSummary> {
    Json(state.catalog.snapshot().summary())
}

// ============ POST /catalog/reload ============

async fn handle_reload(State(state): State<AppState>) -> Result<Json<CatalogSummary>, AppError> {
    let catalog_config = state.config.catalog.clone();
    let handle = state.catalog.clone();
    let catalog = tokio::task::spawn_blocking(move || reload_catalog(&catalog_config, &handle))
        .await
        .map_err(|e| internal(e.to_string()))?;
    let summary = catalog.summary();
    info!(warehouses = summary.total_warehouses, "catalog reloaded");
    Ok(Json(summary))
}

// ============ GET /health ============

#[derive(Serialize)]
struct HealthResponse {
    status: String,
    version: String,
}

async fn handle_health() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
    })
}
