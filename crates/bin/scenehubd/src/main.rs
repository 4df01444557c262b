//! # scenehubd — scenehub daemon
//!
//! Composition root that wires all adapters together and starts the server.
//!
//! ## Responsibilities
//! - Load configuration (`scenehub.toml`, `SCENEHUB_*` env vars)
//! - Install the `tracing` subscriber
//! - Open the `SQLite` database and run migrations
//! - Wire the scene engine: event bus, dispatcher, trigger listener
//! - Build the axum router and serve until SIGINT/SIGTERM
//!
//! ## Dependency rule
//! This is the **only** crate that depends on all other crates.
//! It is the wiring layer — no domain logic belongs here.

mod config;

use std::sync::Arc;

use tracing_subscriber::EnvFilter;

use scenehub_adapter_http_axum::router;
use scenehub_adapter_http_axum::state::AppState;
use scenehub_adapter_storage_sqlite_sqlx::SqliteSceneRepository;
use scenehub_adapter_virtual::{VirtualDeviceManager, VirtualHome};
use scenehub_app::event_bus::InProcessEventBus;
use scenehub_app::scene_engine::{SceneDispatcher, TriggerListener};
use scenehub_app::services::scene_service::SceneService;

use crate::config::Config;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let config = Config::load()?;

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::new(&config.logging.filter))
        .init();

    // Database
    let db = scenehub_adapter_storage_sqlite_sqlx::Config {
        database_url: config.database_url().to_string(),
    }
    .build()
    .await?;
    let scenes = Arc::new(SqliteSceneRepository::new(db.pool().clone()));

    // Integrations
    let devices = if config.integrations.virtual_enabled {
        VirtualDeviceManager::default()
    } else {
        tracing::warn!("virtual integration disabled, no devices available");
        VirtualDeviceManager::with_devices(Vec::new())
    };
    let home = Arc::new(VirtualHome::default());

    // Engine
    let event_bus = Arc::new(InProcessEventBus::new(config.engine.event_bus_capacity));
    let dispatcher = Arc::new(SceneDispatcher::new(
        Arc::clone(&scenes),
        Arc::new(devices),
        Arc::clone(&event_bus),
        Arc::clone(&home),
    ));
    let triggers = event_bus
        .take_triggers()
        .ok_or("trigger queue already taken")?;
    let listener_task = tokio::spawn(TriggerListener::new(dispatcher).run(triggers));
    let home_events = event_bus.subscribe();
    let home_task = tokio::spawn(async move { home.follow(home_events).await });

    // HTTP
    let state = AppState::new(SceneService::new(scenes, Arc::clone(&event_bus)), event_bus);
    let app = router::build(state);

    let bind_addr = config.bind_addr();
    let listener = tokio::net::TcpListener::bind(&bind_addr).await?;
    tracing::info!(%bind_addr, "scenehubd listening");
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    listener_task.abort();
    home_task.abort();
    tracing::info!("scenehubd stopped");
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(err) = tokio::signal::ctrl_c().await {
            tracing::error!(%err, "failed to listen for ctrl-c");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(err) => {
                tracing::error!(%err, "failed to listen for SIGTERM");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {},
        () = terminate => {},
    }
    tracing::info!("shutdown requested");
}
