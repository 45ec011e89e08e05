//! HTTP surface mounted under `/assemble`

mod handlers;

use crate::auth::OAuthExchange;
use crate::submit::{SubmissionTracker, Submitter};
use axum::Router;
use axum::routing::get;
use std::sync::Arc;

/// Path prefix every route is mounted under
pub const BASE_PATH: &str = "/assemble";

/// Shared state for the handlers
pub struct AppState {
    /// Submission pipeline
    pub submitter: Arc<Submitter>,
    /// OAuth flow
    pub oauth: Arc<OAuthExchange>,
    /// Latest submission
    pub tracker: Arc<SubmissionTracker>,
}

/// Build the router
pub fn router(state: Arc<AppState>) -> Router {
    let routes = Router::new()
        .route("/status", get(handlers::status))
        .route(
            "/submit",
            get(handlers::latest_submission).post(handlers::submit),
        )
        .route("/auth/authorize", get(handlers::authorize))
        .route("/auth/token", get(handlers::token).post(handlers::token))
        .route("/auth/authenticated", get(handlers::authenticated));

    Router::new()
        .nest(BASE_PATH, routes)
        .with_state(state)
}
