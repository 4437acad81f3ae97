pub mod config;
pub mod dtos;
pub mod handlers;
pub mod middleware;
pub mod models;
pub mod services;
pub mod utils;

use axum::{
    http::{HeaderValue, Method, StatusCode},
    middleware::{from_fn, from_fn_with_state},
    routing::{get, patch, post, put},
    Json, Router,
};
use service_core::error::AppError;
use service_core::middleware::{
    security_headers::security_headers_middleware, tracing::request_id_middleware,
};
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use crate::config::ServiceConfig;
use crate::services::{Database, JwtService, MikrotikClient};

#[derive(Clone)]
pub struct AppState {
    pub config: ServiceConfig,
    pub db: Database,
    pub jwt: JwtService,
    pub mikrotik: MikrotikClient,
}

pub fn build_router(state: AppState) -> Result<Router, AppError> {
    // Everything except auth, health and metrics requires a bearer token.
    let protected_routes = Router::new()
        .route(
            "/api/clients",
            get(handlers::clients::list_clients).post(handlers::clients::create_client),
        )
        .route(
            "/api/clients/:id",
            get(handlers::clients::get_client)
                .put(handlers::clients::update_client)
                .delete(handlers::clients::delete_client),
        )
        .route(
            "/api/billing",
            get(handlers::billing::list_billing).post(handlers::billing::upsert_billing),
        )
        .route(
            "/api/billing/stats/dashboard",
            get(handlers::billing::dashboard_stats),
        )
        .route(
            "/api/invoices",
            get(handlers::invoices::list_invoices).post(handlers::invoices::create_invoice),
        )
        .route("/api/invoices/:id", get(handlers::invoices::get_invoice))
        .route(
            "/api/invoices/:id/status",
            patch(handlers::invoices::update_invoice_status),
        )
        .route(
            "/api/mikrotik/users",
            get(handlers::mikrotik::list_router_users).post(handlers::mikrotik::create_router_user),
        )
        .route(
            "/api/mikrotik/users/:username",
            put(handlers::mikrotik::update_router_user)
                .delete(handlers::mikrotik::delete_router_user),
        )
        .layer(from_fn_with_state(
            state.clone(),
            middleware::auth_middleware,
        ));

    let cors = CorsLayer::new()
        .allow_origin(
            state
                .config
                .security
                .allowed_origins
                .iter()
                .map(|o| {
                    o.parse::<HeaderValue>().unwrap_or_else(|e| {
                        tracing::error!("Invalid CORS origin '{}': {}. Using fallback.", o, e);
                        HeaderValue::from_static("http://localhost:5173")
                    })
                })
                .collect::<Vec<HeaderValue>>(),
        )
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PUT,
            Method::PATCH,
            Method::DELETE,
            Method::OPTIONS,
        ])
        .allow_headers([
            axum::http::header::AUTHORIZATION,
            axum::http::header::CONTENT_TYPE,
        ]);

    let app = Router::new()
        .route("/", get(root))
        .route("/api/health", get(health_check))
        .route("/metrics", get(handlers::metrics::metrics))
        .route("/api/auth/register", post(handlers::auth::register))
        .route("/api/auth/login", post(handlers::auth::login))
        .merge(protected_routes)
        .with_state(state)
        .layer(TraceLayer::new_for_http().make_span_with(
            |request: &axum::http::Request<_>| {
                let request_id = request
                    .headers()
                    .get("x-request-id")
                    .and_then(|value| value.to_str().ok())
                    .unwrap_or("-");

                tracing::info_span!(
                    "http_request",
                    request_id = %request_id,
                    method = %request.method(),
                    uri = %request.uri(),
                    version = ?request.version(),
                )
            },
        ))
        .layer(from_fn(request_id_middleware))
        .layer(from_fn(security_headers_middleware))
        .layer(cors);

    Ok(app)
}

/// Service banner with the endpoint index.
async fn root() -> Json<serde_json::Value> {
    Json(serde_json::json!({
        "status": "OK",
        "message": "ISP Billing API Server",
        "version": env!("CARGO_PKG_VERSION"),
        "endpoints": {
            "health": "/api/health",
            "auth": "/api/auth",
            "clients": "/api/clients",
            "billing": "/api/billing",
            "invoices": "/api/invoices",
            "mikrotik": "/api/mikrotik"
        }
    }))
}

/// Service health check: verifies the database is reachable.
async fn health_check(
    axum::extract::State(state): axum::extract::State<AppState>,
) -> Result<Json<serde_json::Value>, (StatusCode, Json<serde_json::Value>)> {
    if let Err(e) = state.db.health_check().await {
        tracing::error!(error = %e, "PostgreSQL health check failed");
        return Err((
            StatusCode::SERVICE_UNAVAILABLE,
            Json(serde_json::json!({
                "status": "unhealthy",
                "checks": { "postgres": "down" }
            })),
        ));
    }

    Ok(Json(serde_json::json!({
        "status": "healthy",
        "service": state.config.service_name,
        "version": state.config.service_version,
        "checks": { "postgres": "up" }
    })))
}
