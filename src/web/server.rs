use axum::{
    extract::DefaultBodyLimit,
    http::{HeaderName, HeaderValue, StatusCode},
    response::{IntoResponse, Json, Response},
    routing::{get, post},
    Router,
};
use serde::{Deserialize, Serialize};
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;
use tokio::net::TcpListener;
use tower::limit::ConcurrencyLimitLayer;
use tower::ServiceBuilder;
use tower_governor::{governor::GovernorConfigBuilder, GovernorLayer};
use tower_http::set_header::SetResponseHeaderLayer;
use tower_http::timeout::TimeoutLayer;

use crate::calling::report::to_legacy_text;
use crate::calling::{run_pipeline, CallingConfig};
use crate::cli::ServeArgs;
use crate::utils::validation::{derive_report_name, validate_filename, validate_text_content};

/// Security configuration constants to prevent `DoS` attacks
pub const MAX_TEXT_FIELD_SIZE: usize = 16 * 1024 * 1024; // 16MB
pub const MAX_BODY_SIZE: usize = 2 * MAX_TEXT_FIELD_SIZE + 64 * 1024;

/// Body of `POST /api/call`
#[derive(Debug, Deserialize)]
pub struct CallRequest {
    /// Marker definition text
    pub markers: String,
    /// Read-count table text
    pub reads: String,
    /// Thresholds; defaults when omitted
    #[serde(default)]
    pub config: Option<CallingConfig>,
    /// Name of the read file, used to suggest a report file name
    #[serde(default)]
    pub reads_filename: Option<String>,
}

/// Error response body
#[derive(Serialize)]
pub struct ErrorResponse {
    pub error: String,
    pub error_type: String,
    pub details: Option<String>,
}

/// Create a safe error response that prevents information disclosure
/// while logging detailed errors server-side for debugging
pub fn create_safe_error_response(
    error_type: &str,
    user_message: &str,
    internal_error: Option<&str>,
) -> ErrorResponse {
    if let Some(internal_msg) = internal_error {
        tracing::error!("Internal error ({}): {}", error_type, internal_msg);
    }

    ErrorResponse {
        error: user_message.to_string(),
        error_type: error_type.to_string(),
        details: None,
    }
}

fn bad_request(error_type: &str, message: &str) -> Response {
    (
        StatusCode::BAD_REQUEST,
        Json(create_safe_error_response(error_type, message, None)),
    )
        .into_response()
}

/// Run the web server
///
/// # Errors
///
/// Returns an error if the tokio runtime cannot be created or the server fails to start.
pub fn run(args: ServeArgs) -> anyhow::Result<()> {
    let rt = tokio::runtime::Runtime::new()?;
    rt.block_on(async move { run_server(args).await })
}

/// Routes and per-request layers, without rate limiting.
///
/// Rate limiting keys on the peer address, which only exists when served
/// through [`run`].
pub fn api_router() -> Router {
    Router::new()
        .route("/health", get(health_handler))
        .route("/api/defaults", get(defaults_handler))
        .route("/api/call", post(call_handler))
        .layer(
            ServiceBuilder::new()
                .layer(SetResponseHeaderLayer::if_not_present(
                    HeaderName::from_static("x-content-type-options"),
                    HeaderValue::from_static("nosniff"),
                ))
                .layer(SetResponseHeaderLayer::if_not_present(
                    HeaderName::from_static("x-frame-options"),
                    HeaderValue::from_static("DENY"),
                ))
                .layer(SetResponseHeaderLayer::if_not_present(
                    HeaderName::from_static("referrer-policy"),
                    HeaderValue::from_static("strict-origin-when-cross-origin"),
                ))
                .layer(TimeoutLayer::with_status_code(
                    StatusCode::REQUEST_TIMEOUT,
                    Duration::from_secs(60),
                ))
                .layer(ConcurrencyLimitLayer::new(32))
                .layer(DefaultBodyLimit::max(MAX_BODY_SIZE)),
        )
}

/// Create the application router with all routes and middleware configured.
///
/// # Errors
///
/// Returns an error if the rate limiter configuration is rejected.
pub fn create_router() -> anyhow::Result<Router> {
    let governor_conf = GovernorConfigBuilder::default()
        .per_second(2)
        .burst_size(20)
        .finish()
        .ok_or_else(|| anyhow::anyhow!("Invalid rate limiter configuration"))?;

    Ok(api_router().layer(GovernorLayer {
        config: Arc::new(governor_conf),
    }))
}

async fn run_server(args: ServeArgs) -> anyhow::Result<()> {
    let app = create_router()?;

    let addr = format!("{}:{}", args.address, args.port);
    println!("Starting mh-caller API at http://{addr}");

    let listener = TcpListener::bind(&addr).await?;
    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .await?;

    Ok(())
}

async fn health_handler() -> impl IntoResponse {
    Json(serde_json::json!({
        "status": "ok",
        "version": env!("CARGO_PKG_VERSION"),
    }))
}

async fn defaults_handler() -> impl IntoResponse {
    Json(CallingConfig::default())
}

/// API endpoint for calling alleles
async fn call_handler(Json(request): Json<CallRequest>) -> Response {
    let start_time = std::time::Instant::now();

    if request.markers.len() > MAX_TEXT_FIELD_SIZE || request.reads.len() > MAX_TEXT_FIELD_SIZE {
        return bad_request("input_too_large", "Marker or read text exceeds the size limit");
    }
    if validate_text_content(&request.markers).is_err() {
        return bad_request("invalid_markers", "Marker definitions are empty or not text");
    }
    if validate_text_content(&request.reads).is_err() {
        return bad_request("invalid_reads", "Read table is empty or not text");
    }

    let config = match request.config.unwrap_or_default().validated() {
        Ok(config) => config,
        Err(e) => return bad_request("invalid_config", &e.to_string()),
    };

    let download_name = match request.reads_filename.as_deref().map(validate_filename) {
        Some(Ok(name)) => Some(derive_report_name(&name)),
        Some(Err(e)) => return bad_request("invalid_filename", &e.to_string()),
        None => None,
    };

    // Alignment is CPU-bound; keep it off the async workers so the timeout can fire
    let pipeline_config = config.clone();
    let task = tokio::task::spawn_blocking(move || {
        run_pipeline(&request.markers, &request.reads, &pipeline_config)
    });

    let output = match task.await {
        Ok(Ok(output)) => output,
        Ok(Err(e)) => {
            return (
                StatusCode::UNPROCESSABLE_ENTITY,
                Json(create_safe_error_response(
                    "parse_error",
                    "Failed to parse input",
                    Some(&e.to_string()),
                )),
            )
                .into_response();
        }
        Err(e) => {
            return (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(create_safe_error_response(
                    "internal_error",
                    "Allele calling failed",
                    Some(&e.to_string()),
                )),
            )
                .into_response();
        }
    };

    #[allow(clippy::cast_possible_truncation)] // Processing time won't exceed u64
    let processing_time = start_time.elapsed().as_millis() as u64;

    Json(serde_json::json!({
        "status": output.summary.status(),
        "summary": output.summary,
        "records": output.records,
        "report_text": to_legacy_text(&output.records),
        "download_name": download_name,
        "processing_info": {
            "processing_time_ms": processing_time,
            "configuration": config,
        }
    }))
    .into_response()
}
