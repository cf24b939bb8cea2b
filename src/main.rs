//! Courtside Back binary entrypoint wiring the scoreboard store, REST and SSE layers.

use std::{env, net::SocketAddr, sync::Arc};

use anyhow::{Context, bail};
use axum::Router;
use courtside_back::{
    config::AppConfig,
    dao::scoreboard_store::{MemoryScoreboardStore, ScoreboardStore},
    routes,
    services::{clock_ticker, scoreboard_service, storage_supervisor},
    state::{
        AppState, SharedState,
        clock::{Clock, SystemClock},
    },
};
use tokio::net::TcpListener;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    init_tracing();

    let config = AppConfig::load();
    let store = connect_store().await?;

    let clock: Arc<dyn Clock> = Arc::new(SystemClock);
    let scoreboard = scoreboard_service::bootstrap(store.as_ref(), &config, clock.now())
        .await
        .context("loading scoreboard")?;

    let app_state = AppState::new(store, scoreboard, clock, config);

    tokio::spawn(storage_supervisor::run(app_state.clone()));
    clock_ticker::spawn(&app_state);

    let app = build_router(app_state);

    let port = env::var("PORT")
        .or_else(|_| env::var("SERVER_PORT"))
        .ok()
        .and_then(|value| value.parse::<u16>().ok())
        .unwrap_or(8080);

    let addr = SocketAddr::from(([0, 0, 0, 0], port));
    info!(%addr, "starting server");

    let listener = TcpListener::bind(addr).await.context("binding server")?;
    let service = app.into_make_service();
    axum::serve(listener, service)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("serving axum")?;

    Ok(())
}

/// Build the store selected by `STORE_BACKEND` (`mongo` unless told otherwise).
async fn connect_store() -> anyhow::Result<Arc<dyn ScoreboardStore>> {
    let backend = env::var("STORE_BACKEND").unwrap_or_else(|_| "mongo".into());
    match backend.trim().to_ascii_lowercase().as_str() {
        "memory" => {
            warn!("using in-memory store; scoreboard and history are lost on restart");
            Ok(Arc::new(MemoryScoreboardStore::new()))
        }
        "mongo" | "mongodb" => connect_mongo().await,
        other => bail!("unknown STORE_BACKEND `{other}` (expected `mongo` or `memory`)"),
    }
}

#[cfg(feature = "mongo-store")]
async fn connect_mongo() -> anyhow::Result<Arc<dyn ScoreboardStore>> {
    use courtside_back::dao::scoreboard_store::mongodb::{MongoConfig, MongoScoreboardStore};

    let mongo_uri = env::var("MONGO_URI").unwrap_or_else(|_| "mongodb://localhost:27017".into());
    let mongo_db = env::var("MONGO_DB").ok();

    let config = MongoConfig::from_uri(&mongo_uri, mongo_db.as_deref())
        .await
        .context("parsing MongoDB configuration")?;
    let store = MongoScoreboardStore::connect(config)
        .await
        .context("connecting to MongoDB")?;
    info!(database = mongo_db.as_deref().unwrap_or("courtside"), "connected to MongoDB");
    Ok(Arc::new(store))
}

#[cfg(not(feature = "mongo-store"))]
async fn connect_mongo() -> anyhow::Result<Arc<dyn ScoreboardStore>> {
    bail!("built without the `mongo-store` feature; set STORE_BACKEND=memory")
}

/// Build the top-level router and attach cross-cutting middleware layers.
fn build_router(state: SharedState) -> Router<()> {
    routes::router(state)
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
}

/// Configure tracing subscribers so logs include spans by default.
fn init_tracing() {
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "info,tower_http=debug".into());
    tracing_subscriber::registry()
        .with(env_filter)
        .with(tracing_subscriber::fmt::layer())
        .init();
}

/// Wait for Ctrl+C or SIGTERM and shut the server down gracefully.
async fn shutdown_signal() {
    #[cfg(unix)]
    {
        use tokio::signal::unix::{SignalKind, signal};

        match signal(SignalKind::terminate()) {
            Ok(mut term) => {
                tokio::select! {
                    _ = tokio::signal::ctrl_c() => {},
                    _ = term.recv() => {},
                }
            }
            Err(err) => {
                warn!(error = %err, "failed to install SIGTERM handler; waiting for Ctrl+C");
                let _ = tokio::signal::ctrl_c().await;
            }
        }
    }

    #[cfg(not(unix))]
    {
        let _ = tokio::signal::ctrl_c().await;
    }

    info!("shutdown signal received");
}
