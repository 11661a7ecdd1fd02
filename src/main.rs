use std::sync::Arc;
use std::time::Duration;

use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use hostel_desk::api::router;
use hostel_desk::config::AppConfig;
use hostel_desk::db::SqliteSessionStorage;
use hostel_desk::remote::{HostelApi, HttpBackend};
use hostel_desk::state::AppState;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| "hostel_desk=debug".to_string()),
        ))
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = AppConfig::new_from_env()?;

    let storage = SqliteSessionStorage::connect(&config.database_url).await?;
    let backend = HttpBackend::new(config.api_base_url.clone())?;
    info!("using hostel backend at {}", backend.base_url());
    let api = HostelApi::new(Arc::new(backend));

    let state = AppState::new(
        api,
        Arc::new(storage),
        config.toast_capacity,
        Duration::from_secs(config.exit_poll_interval_secs),
    );

    let _listener = state.cache.spawn_session_listener();
    let _exit_reset = state.spawn_exit_reset();
    match state.session.restore().await {
        Ok(Some(user)) => info!("restored session for {}", user.email),
        Ok(None) => info!("no persisted session"),
        Err(e) => warn!("failed to restore session: {}", e),
    }

    let app = router(state);

    info!("listening on http://{}", config.bind_addr);
    let listener = tokio::net::TcpListener::bind(config.bind_addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
