use health_coach::{
    gemini::GeminiProvider,
    timers::{spawn_heart_rate_timer, spawn_rollover_timer},
    router, AdviceClient, AppState, Config, JsonFileStore, SessionStore,
};
use std::{net::SocketAddr, sync::Arc};
use tokio::fs;
use tracing::{info, warn};
use tracing_subscriber::{fmt, EnvFilter};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive("info".parse()?))
        .init();

    let config = Config::from_env()?;
    if let Some(parent) = config.data_path.parent() {
        fs::create_dir_all(parent).await?;
    }

    let store = JsonFileStore::new(&config.data_path);
    info!("storing daily metrics in {}", store.path().display());
    let session = SessionStore::open_with_system_clock(store).await;

    if config.gemini.api_key.is_none() {
        warn!("API_KEY is not set, the coach will answer with its fallback message");
    }
    let advice = AdviceClient::new(Arc::new(GeminiProvider::new(config.gemini.clone())?));

    let state = AppState::new(session, advice);
    spawn_rollover_timer(state.clone(), config.rollover_interval);
    spawn_heart_rate_timer(state.clone(), config.heart_rate_interval);

    let addr = SocketAddr::from(([0, 0, 0, 0], config.port));
    info!("listening on http://{addr}");
    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, router(state)).await?;

    Ok(())
}
