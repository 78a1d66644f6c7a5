//! capgate decision service
//!
//! Run with: cargo run --features server --bin capgate-server
//!
//! Endpoints:
//!   GET  /status        - Service status
//!   POST /resolve       - Single permission check for a posted user record
//!   POST /capabilities  - Capability bundle for a posted user record
//!
//! The caller posts the user record it already holds; the service keeps no
//! session state of its own.

use axum::{http::StatusCode, routing::{get, post}, Json, Router};
use serde::{Deserialize, Serialize};
use tower_http::cors::{Any, CorsLayer};
use tracing::info;
use tracing_subscriber::EnvFilter;

use capgate::{capabilities, resolve_named, CapabilityBundle, Session, UserRecord};

// ============================================================================
// Request/Response Types
// ============================================================================

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct ResolveReq {
    user: Option<UserRecord>,
    #[serde(default)]
    loading: bool,
    module: String,
    sub_module: String,
    permission: String,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct CapabilitiesReq {
    user: Option<UserRecord>,
    #[serde(default)]
    loading: bool,
    module: String,
    sub_module: String,
}

#[derive(Serialize)]
struct StatusRes {
    service: &'static str,
    version: &'static str,
}

#[derive(Serialize)]
struct ResolveRes {
    allowed: bool,
}

#[derive(Serialize)]
struct ApiResponse<T> {
    success: bool,
    data: Option<T>,
    error: Option<String>,
}

impl<T> ApiResponse<T> {
    fn ok(data: T) -> Self {
        Self { success: true, data: Some(data), error: None }
    }

    fn err(msg: impl Into<String>) -> Self {
        Self { success: false, data: None, error: Some(msg.into()) }
    }
}

// ============================================================================
// Handlers
// ============================================================================

fn session(user: Option<UserRecord>, loading: bool) -> Session {
    match user {
        Some(u) => Session::new(u).with_loading(loading),
        None if loading => Session::pending(),
        None => Session::anonymous(),
    }
}

async fn get_status() -> Json<ApiResponse<StatusRes>> {
    Json(ApiResponse::ok(StatusRes { service: "capgate", version: env!("CARGO_PKG_VERSION") }))
}

async fn post_resolve(Json(req): Json<ResolveReq>) -> (StatusCode, Json<ApiResponse<ResolveRes>>) {
    let s = session(req.user, req.loading);
    match resolve_named(&s, &req.module, &req.sub_module, &req.permission) {
        Ok(allowed) => (StatusCode::OK, Json(ApiResponse::ok(ResolveRes { allowed }))),
        Err(e) => (StatusCode::BAD_REQUEST, Json(ApiResponse::err(e.to_string()))),
    }
}

async fn post_capabilities(Json(req): Json<CapabilitiesReq>) -> Json<ApiResponse<CapabilityBundle>> {
    let s = session(req.user, req.loading);
    Json(ApiResponse::ok(capabilities(&s, &req.module, &req.sub_module)))
}

// ============================================================================
// Main
// ============================================================================

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    // CORS for demo
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let app = Router::new()
        .route("/status", get(get_status))
        .route("/resolve", post(post_resolve))
        .route("/capabilities", post(post_capabilities))
        .layer(cors);

    let port = std::env::var("PORT").unwrap_or_else(|_| "3000".into());
    let addr = format!("0.0.0.0:{}", port);
    info!(%addr, "capgate decision service listening");

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, app).await?;
    Ok(())
}
