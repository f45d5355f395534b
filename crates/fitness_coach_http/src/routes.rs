use std::sync::Arc;

use axum::Json;
use axum::debug_handler;
use axum::extract::State;
use axum::extract::rejection::JsonRejection;
use axum::http::StatusCode;
use axum::response::IntoResponse;
use fitness_coach::canned::canned_reply;
use fitness_coach::profile_store::StoredProfile;
use fitness_coach::{CoachRequest, MetricsResult, UserDetails};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use tracing::info;

use crate::error::{ApiError, ApiResult};
use crate::state::AppState;

/// `{ "response": ... }`, the success shape of both chat endpoints.
#[derive(Debug, Serialize, Deserialize)]
pub struct ChatResponse {
    pub response: String,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CannedRequest {
    #[serde(default)]
    pub user_input: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MetricsRequest {
    #[serde(default)]
    pub user_details: UserDetails,
}

fn body<T>(payload: Result<Json<T>, JsonRejection>) -> ApiResult<T> {
    payload
        .map(|Json(v)| v)
        .map_err(|e| ApiError::BadRequest(e.body_text()))
}

#[debug_handler]
pub async fn health() -> impl IntoResponse {
    (StatusCode::OK, "ok")
}

#[debug_handler]
pub async fn metrics_endpoint(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    let body = state.metrics.render();
    ([("content-type", "text/plain; version=0.0.4")], body)
}

#[debug_handler]
pub async fn workout(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<CoachRequest>, JsonRejection>,
) -> ApiResult<Json<ChatResponse>> {
    let request = body(payload)?;
    let reply = state.coach.respond(&request).await?;
    info!(class = ?reply.class, "coach replied");
    Ok(Json(ChatResponse {
        response: reply.response,
    }))
}

#[debug_handler]
pub async fn canned(
    payload: Result<Json<CannedRequest>, JsonRejection>,
) -> ApiResult<Json<ChatResponse>> {
    let request = body(payload)?;
    let input = request.user_input.unwrap_or_default();
    Ok(Json(ChatResponse {
        response: canned_reply(&input).to_string(),
    }))
}

#[debug_handler]
pub async fn compute_metrics(
    payload: Result<Json<MetricsRequest>, JsonRejection>,
) -> ApiResult<Json<MetricsResult>> {
    let request = body(payload)?;
    let profile = request.user_details.validate()?;
    Ok(Json(profile.metrics()))
}

#[debug_handler]
pub async fn get_profile(State(state): State<Arc<AppState>>) -> ApiResult<Json<StoredProfile>> {
    state
        .profiles
        .load()
        .await?
        .map(Json)
        .ok_or(ApiError::NotFound("profile"))
}

#[debug_handler]
pub async fn put_profile(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<StoredProfile>, JsonRejection>,
) -> ApiResult<Json<StoredProfile>> {
    let profile = body(payload)?;
    state.profiles.save(&profile).await?;
    info!("profile saved");
    Ok(Json(profile))
}

#[debug_handler]
pub async fn patch_profile(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<Map<String, Value>>, JsonRejection>,
) -> ApiResult<Json<StoredProfile>> {
    let patch = body(payload)?;
    state
        .profiles
        .update(patch)
        .await?
        .map(Json)
        .ok_or(ApiError::NotFound("profile"))
}

#[debug_handler]
pub async fn delete_profile(State(state): State<Arc<AppState>>) -> ApiResult<StatusCode> {
    state.profiles.clear().await?;
    info!("profile cleared");
    Ok(StatusCode::NO_CONTENT)
}
