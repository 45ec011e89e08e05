//! Route handlers
//!
//! `POST /submit` only acknowledges; clients poll `GET /submit` for
//! progress and the outcome.

use crate::server::AppState;
use axum::Json;
use axum::extract::{Query, State};
use axum::http::{StatusCode, header};
use axum::response::{IntoResponse, Response};
use serde::Deserialize;
use serde_json::{Value, json};
use std::sync::Arc;
use tracing::info;

/// Body of `POST /submit`
///
/// A missing `codeContent` is read as empty content, which the pipeline
/// then rejects as a validation failure rather than a malformed request.
#[derive(Debug, Deserialize)]
pub struct SubmitRequest {
    #[serde(rename = "codeContent", default)]
    code_content: String,
}

#[derive(Debug, Deserialize)]
pub struct TokenQuery {
    code: Option<String>,
}

pub async fn status() -> Json<Value> {
    Json(json!({ "status": "OK" }))
}

/// Acknowledge with 202 once the submission task is running
pub async fn submit(
    State(state): State<Arc<AppState>>,
    Json(request): Json<SubmitRequest>,
) -> Response {
    info!(bytes = request.code_content.len(), "submission received");
    drop(state.submitter.start(request.code_content));
    (StatusCode::ACCEPTED, Json(json!({ "result": true }))).into_response()
}

pub async fn latest_submission(State(state): State<Arc<AppState>>) -> Response {
    match state.tracker.latest() {
        Some(result) => Json(result).into_response(),
        None => Json(json!({})).into_response(),
    }
}

pub async fn authorize(State(state): State<Arc<AppState>>) -> Response {
    let url = state.oauth.build_authorize_redirect();
    (StatusCode::FOUND, [(header::LOCATION, url.to_string())]).into_response()
}

pub async fn token(
    State(state): State<Arc<AppState>>,
    Query(query): Query<TokenQuery>,
) -> Response {
    match state.oauth.exchange_code_for_token(query.code.as_deref()).await {
        Ok(credentials) => Json(json!({
            "result": true,
            "scopes": credentials.scopes,
        }))
        .into_response(),
        Err(e) => (
            StatusCode::BAD_GATEWAY,
            Json(json!({ "result": false, "message": e.to_string() })),
        )
            .into_response(),
    }
}

pub async fn authenticated(State(state): State<Arc<AppState>>) -> Json<Value> {
    Json(json!({ "result": state.oauth.is_authenticated() }))
}
