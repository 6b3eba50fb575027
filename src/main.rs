mod agents;
mod auth;
mod config;
mod drive;
mod error;
mod extract;
mod routes;
mod session;
mod state;
mod storage;
mod templates;

use axum::{extract::DefaultBodyLimit, middleware, routing::get, Router};
use std::sync::Arc;
use tower_http::trace::TraceLayer;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "brainscan=info,tower_http=info".into()),
        )
        .init();

    let config = Arc::new(config::Config::from_env()?);

    storage::ensure_dirs(&config.upload_folder)?;

    let oauth = auth::OAuthFlow::from_file(&config.client_secret_file, config.redirect_uri())?;

    let state = Arc::new(state::AppState {
        keys: session::SessionKeys::new(&config.secret_key),
        oauth,
        evaluator: Arc::new(agents::GeminiAgent::new(config.gemini_api_key.clone())),
        publisher: Arc::new(drive::DriveClient::new(config.drive_folder_id.clone())),
        config: config.clone(),
    });

    let app = Router::new()
        .route("/", get(routes::index).post(routes::submit))
        .route("/login", get(routes::login))
        .route("/oauth2callback", get(routes::oauth2callback))
        .route("/logout", get(routes::logout))
        .route("/healthz", get(routes::healthz))
        .nest_service("/static", tower_http::services::ServeDir::new("static"))
        .layer(middleware::from_fn_with_state(
            state.clone(),
            routes::require_login,
        ))
        .layer(DefaultBodyLimit::max(20 * 1024 * 1024))
        .layer(TraceLayer::new_for_http())
        .with_state(state);

    let addr = format!("{}:{}", config.host, config.port);
    tracing::info!("Brainscan listening on http://{}", addr);

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
