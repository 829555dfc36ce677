mod app;
mod config;
mod db;
mod error;
mod state;
mod users;

use tracing_subscriber::EnvFilter;

use crate::state::AppState;

const DEFAULT_LOG_FILTER: &str = "userdesk=debug,axum=info,tower_http=info";

/// `RUST_LOG` overrides the default filter; `LOG_FORMAT=json` switches to JSON lines.
fn init_tracing() {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_FILTER));
    let builder = tracing_subscriber::fmt().with_env_filter(filter);

    match std::env::var("LOG_FORMAT").as_deref() {
        Ok("json") => builder
            .json()
            .with_current_span(true)
            .flatten_event(true)
            .init(),
        _ => builder.with_target(false).init(),
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    init_tracing();

    // Missing configuration aborts here, before anything is bound.
    let state = AppState::init()?;
    tracing::info!(
        max_connections = state.config.db.max_connections,
        acquire_timeout_secs = state.config.db.acquire_timeout.as_secs(),
        "database pool configured"
    );

    let app = app::build_app(state.clone());
    let served = app::serve(app, &state).await;

    state.db.close().await;
    served
}
