use axum::{
    extract::{Path, State},
    http::HeaderMap,
    response::IntoResponse,
    Json,
};
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::sync::Arc;

use atlas_core::error::SearchError;
use atlas_core::search::{parse_request, search};
use atlas_core::session::{AuthResponse, LoginRequest, ProfileUpdate, SignupRequest};
use atlas_core::types::{DatasetDetails, SearchResponse, User};

use crate::auth::bearer_token;
use crate::error::ApiError;
use crate::AppContext;

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

/// Hold the response back by the configured artificial latency, if any.
async fn simulate_latency(ctx: &AppContext) {
    if !ctx.latency.is_zero() {
        tokio::time::sleep(ctx.latency).await;
    }
}

fn parse_json<T: DeserializeOwned>(body: &str) -> Result<T, ApiError> {
    serde_json::from_str(body).map_err(|e| ApiError::BadRequest(format!("Invalid JSON body: {e}")))
}

#[derive(Serialize)]
pub(crate) struct SuccessResponse {
    success: bool,
}

fn success() -> Json<SuccessResponse> {
    Json(SuccessResponse { success: true })
}

fn ensure_dataset(ctx: &AppContext, id: &str) -> Result<(), ApiError> {
    match ctx.catalog.get(id) {
        Some(_) => Ok(()),
        None => Err(ApiError::NotFound("Dataset not found")),
    }
}

// ---------------------------------------------------------------------------
// Health + static data
// ---------------------------------------------------------------------------

#[derive(Serialize)]
pub(crate) struct HealthResponse {
    status: &'static str,
    datasets: usize,
    #[serde(rename = "uptimeSecs")]
    uptime_secs: u64,
}

pub async fn api_health(State(ctx): State<AppContext>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok",
        datasets: ctx.catalog.len(),
        uptime_secs: ctx.start_time.elapsed().as_secs(),
    })
}

/// `GET /api/datasets` — every record in catalog order, pre-serialized at startup.
pub async fn api_datasets(State(ctx): State<AppContext>) -> impl IntoResponse {
    simulate_latency(&ctx).await;
    ([("content-type", "application/json")], ctx.cache.datasets_json.clone())
}

// ---------------------------------------------------------------------------
// Search
// ---------------------------------------------------------------------------

/// `POST /api/search` — run the search pipeline over the catalog.
///
/// The body is read raw so that malformed JSON maps to a 400 with our own message
/// rather than axum's rejection text. The pipeline itself is cheap; it runs on the
/// blocking pool only so that a faulting booster is contained to its task, and a
/// panic there surfaces as a 500.
pub async fn api_search(
    State(ctx): State<AppContext>,
    body: String,
) -> Result<Json<SearchResponse>, ApiError> {
    simulate_latency(&ctx).await;
    let request = parse_request(&body)?;

    let catalog = Arc::clone(&ctx.catalog);
    let booster = Arc::clone(&ctx.booster);
    let response = tokio::task::spawn_blocking(move || {
        search(catalog.all_datasets(), &request, booster.as_ref())
    })
    .await
    .map_err(|e| SearchError::Internal(e.to_string()))?;

    Ok(Json(response))
}

// ---------------------------------------------------------------------------
// Dataset detail + saved datasets
// ---------------------------------------------------------------------------

pub async fn api_dataset(
    State(ctx): State<AppContext>,
    Path(id): Path<String>,
) -> Result<Json<DatasetDetails>, ApiError> {
    simulate_latency(&ctx).await;
    ctx.catalog.details(&id).map(Json).ok_or(ApiError::NotFound("Dataset not found"))
}

pub async fn api_save_dataset(
    State(ctx): State<AppContext>,
    headers: HeaderMap,
    Path(id): Path<String>,
) -> Result<Json<SuccessResponse>, ApiError> {
    let token = bearer_token(&headers)?;
    ensure_dataset(&ctx, &id)?;
    ctx.sessions.save_dataset(token, &id)?;
    Ok(success())
}

pub async fn api_unsave_dataset(
    State(ctx): State<AppContext>,
    headers: HeaderMap,
    Path(id): Path<String>,
) -> Result<Json<SuccessResponse>, ApiError> {
    let token = bearer_token(&headers)?;
    ensure_dataset(&ctx, &id)?;
    ctx.sessions.unsave_dataset(token, &id)?;
    Ok(success())
}

// ---------------------------------------------------------------------------
// Mock auth + profile
// ---------------------------------------------------------------------------

pub async fn api_login(
    State(ctx): State<AppContext>,
    body: String,
) -> Result<Json<AuthResponse>, ApiError> {
    let req: LoginRequest = parse_json(&body)?;
    let resp = ctx.sessions.login(&req)?;
    simulate_latency(&ctx).await;
    Ok(Json(resp))
}

pub async fn api_signup(
    State(ctx): State<AppContext>,
    body: String,
) -> Result<Json<AuthResponse>, ApiError> {
    let req: SignupRequest = parse_json(&body)?;
    let resp = ctx.sessions.signup(&req)?;
    simulate_latency(&ctx).await;
    Ok(Json(resp))
}

pub async fn api_logout(
    State(ctx): State<AppContext>,
    headers: HeaderMap,
) -> Result<Json<SuccessResponse>, ApiError> {
    let token = bearer_token(&headers)?;
    if !ctx.sessions.logout(token) {
        return Err(ApiError::Unauthorized);
    }
    Ok(success())
}

pub async fn api_profile(
    State(ctx): State<AppContext>,
    headers: HeaderMap,
) -> Result<Json<User>, ApiError> {
    let token = bearer_token(&headers)?;
    simulate_latency(&ctx).await;
    Ok(Json(ctx.sessions.profile(token)?))
}

pub async fn api_update_profile(
    State(ctx): State<AppContext>,
    headers: HeaderMap,
    body: String,
) -> Result<Json<User>, ApiError> {
    let token = bearer_token(&headers)?;
    let update: ProfileUpdate = parse_json(&body)?;
    simulate_latency(&ctx).await;
    Ok(Json(ctx.sessions.update_profile(token, update)?))
}
