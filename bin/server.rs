// Data Alchemist - Web Server
// REST API with Axum: validate datasets posted as JSON

use anyhow::{Context, Result};
use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Json},
    routing::{get, post},
    Router,
};
use clap::Parser;
use data_alchemist::{
    validate_kind, validate_selected, Advisor, AdvisorConfig, AllocationConfig, DataBundle,
    EntityKind,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tower::ServiceBuilder;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser, Debug)]
#[command(name = "data-alchemist-server")]
#[command(about = "HTTP API for dataset validation")]
struct Args {
    #[arg(long, default_value = "3000", env = "ALCHEMIST_PORT")]
    port: u16,

    /// Advisory oracle endpoint; unset disables advisory checks
    #[arg(long, env = "ALCHEMIST_ADVISORY_URL")]
    advisory_url: Option<String>,

    #[arg(long, default_value = "30", env = "ALCHEMIST_ADVISORY_TIMEOUT_SECS")]
    advisory_timeout_secs: u64,
}

/// Shared application state
#[derive(Clone)]
struct AppState {
    advisor: Arc<dyn Advisor>,
}

/// API Response wrapper
#[derive(Serialize)]
struct ApiResponse<T> {
    success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    data: Option<T>,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<String>,
}

impl<T> ApiResponse<T> {
    fn ok(data: T) -> Self {
        Self {
            success: true,
            data: Some(data),
            error: None,
        }
    }

    fn err(message: impl Into<String>) -> Self {
        Self {
            success: false,
            data: None,
            error: Some(message.into()),
        }
    }
}

/// Body of POST /api/validate
#[derive(Deserialize)]
struct ValidateRequest {
    #[serde(flatten)]
    bundle: DataBundle,
    /// Defaults to all three datasets
    #[serde(default)]
    kinds: Option<Vec<EntityKind>>,
    #[serde(default)]
    allocation: Option<AllocationConfig>,
}

// ============================================================================
// API Handlers
// ============================================================================

/// GET /api/health - Health check
async fn health_check(State(state): State<AppState>) -> impl IntoResponse {
    Json(ApiResponse::ok(format!("OK (advisor: {})", state.advisor.name())))
}

/// POST /api/validate - Validate a bundle, one report per dataset
async fn validate_datasets(
    State(state): State<AppState>,
    Json(request): Json<ValidateRequest>,
) -> impl IntoResponse {
    let kinds = request
        .kinds
        .unwrap_or_else(|| EntityKind::ALL.to_vec());

    let mut report = validate_selected(&kinds, &request.bundle, state.advisor.as_ref()).await;
    if let Some(allocation) = request.allocation {
        report = report.with_allocation(allocation);
    }

    tracing::info!("{}", report.summary());
    (StatusCode::OK, Json(ApiResponse::ok(report)))
}

/// POST /api/validate/:kind - Validate one dataset against the rest of the bundle
async fn validate_one(
    State(state): State<AppState>,
    Path(kind): Path<String>,
    Json(bundle): Json<DataBundle>,
) -> impl IntoResponse {
    let kind: EntityKind = match kind.parse() {
        Ok(kind) => kind,
        Err(e) => {
            return (StatusCode::BAD_REQUEST, Json(ApiResponse::<()>::err(e.to_string()))).into_response();
        }
    };

    let result = validate_kind(kind, &bundle, state.advisor.as_ref()).await;
    tracing::info!(%kind, "{}", result.summary_line());
    (StatusCode::OK, Json(ApiResponse::ok(result))).into_response()
}

// ============================================================================
// Main Server
// ============================================================================

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "data_alchemist=info,tower_http=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let args = Args::parse();

    let advisor: Arc<dyn Advisor> = AdvisorConfig::new(args.advisory_url, args.advisory_timeout_secs)
        .build()
        .context("Failed to set up advisory oracle")?
        .into();
    tracing::info!(advisor = advisor.name(), "advisory oracle ready");

    let state = AppState { advisor };

    // Build API routes
    let api_routes = Router::new()
        .route("/health", get(health_check))
        .route("/validate", post(validate_datasets))
        .route("/validate/:kind", post(validate_one))
        .with_state(state);

    let app = Router::new().nest("/api", api_routes).layer(
        ServiceBuilder::new()
            .layer(TraceLayer::new_for_http())
            .layer(CorsLayer::permissive()),
    );

    let addr = format!("0.0.0.0:{}", args.port);
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Failed to bind to {}", addr))?;

    println!("🚀 Data Alchemist API running on http://localhost:{}", args.port);
    println!("   POST /api/validate         all datasets");
    println!("   POST /api/validate/:kind   clients | workers | tasks");

    axum::serve(listener, app)
        .await
        .context("Server error")?;

    Ok(())
}
