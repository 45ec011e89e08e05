//! Serve command - run the HTTP service

use anyhow::{Context, Result};
use assemble::auth::{CredentialStore, OAuthExchange};
use assemble::config::Config;
use assemble::platform::GitHubFactory;
use assemble::repo::GitCli;
use assemble::server::{AppState, BASE_PATH, router};
use assemble::submit::{SubmissionTracker, Submitter};
use std::sync::Arc;
use tokio::net::TcpListener;
use tower::ServiceBuilder;
use tower_http::trace::TraceLayer;
use tracing::info;

/// Wire the service together and serve until ctrl-c
pub async fn run_serve(config: Config) -> Result<()> {
    let credentials = Arc::new(CredentialStore::new());
    let tracker = Arc::new(SubmissionTracker::new());

    let oauth = Arc::new(
        OAuthExchange::from_config(&config, Arc::clone(&credentials))
            .context("could not set up GitHub authentication")?,
    );
    let submitter = Arc::new(Submitter::new(
        config.submit_settings(),
        Arc::clone(&credentials),
        Arc::clone(&tracker),
        Arc::new(GitHubFactory::new(config.api_url.clone())),
        Arc::new(GitCli::new(config.git_program.clone(), config.remote_timeout)),
    ));

    let state = Arc::new(AppState {
        submitter,
        oauth,
        tracker,
    });
    let app = router(state).layer(ServiceBuilder::new().layer(TraceLayer::new_for_http()));

    let addr = format!("{}:{}", config.bind, config.port);
    let listener = TcpListener::bind(&addr)
        .await
        .with_context(|| format!("could not bind {addr}"))?;
    info!(
        upstream = %config.upstream,
        work_dir = %config.work_dir.display(),
        "listening on http://{addr}{BASE_PATH}"
    );

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;
    info!("server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if tokio::signal::ctrl_c().await.is_err() {
        std::future::pending::<()>().await;
    }
}
