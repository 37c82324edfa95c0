mod config;
mod db;
mod errors;
mod models;
mod notify;
mod routes;
mod state;
mod store;
mod tracking;

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use chrono::Utc;
use tower::ServiceBuilder;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::{error, info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::config::Config;
use crate::db::create_pool;
use crate::notify::email::EmailTransport;
use crate::notify::settings::{load_or_init, FileSettingsStore, SettingsStore};
use crate::notify::sms::SmsTransport;
use crate::notify::transport::LogTransport;
use crate::notify::{Notifier, Transports};
use crate::routes::build_router;
use crate::state::AppState;
use crate::store::{FlightStore, PgFlightStore};
use crate::tracking::fetcher::StatusFetcher;
use crate::tracking::jobs::spawn_periodic;
use crate::tracking::provider::AeroDataBoxClient;
use crate::tracking::retention::RetentionSweeper;
use crate::tracking::scheduler::{PollConfig, PollScheduler};
use crate::tracking::status_map::{StatusKeywordTable, StatusMapper};

#[tokio::main]
async fn main() -> Result<()> {
    // Load configuration first (fails on missing or malformed env vars)
    let config = Config::from_env()?;

    // Initialize structured logging
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            EnvFilter::new(format!("{}={}", env!("CARGO_PKG_NAME"), &config.rust_log))
        }))
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting flight tracker v{}", env!("CARGO_PKG_VERSION"));

    // Record store: unreachable at startup is fatal
    let pool = create_pool(&config.database_url).await?;
    let store: Arc<dyn FlightStore> = Arc::new(PgFlightStore::new(pool));
    store
        .ping()
        .await
        .context("Record store is unreachable")?;

    // Status mapping
    let table = match &config.status_keywords_path {
        Some(path) => StatusKeywordTable::load(path)?,
        None => StatusKeywordTable::default(),
    };
    let mapper = StatusMapper::new(table);
    info!("Status keyword table v{} loaded", mapper.version());

    // External provider
    if config.flight_api_key.is_empty() {
        warn!("FLIGHT_API_KEY is not set; provider lookups will be rejected");
    }
    let provider = Arc::new(AeroDataBoxClient::new(
        config.flight_api_url.clone(),
        config.flight_api_key.clone(),
        config.flight_api_host.clone(),
        config.flight_api_timeout_secs,
    ));
    let fetcher = Arc::new(StatusFetcher::new(provider, mapper));

    // Notifications
    if config.email.is_none() {
        warn!("Email relay credentials not configured; email notifications will fail");
    }
    let settings_store: Arc<dyn SettingsStore> =
        Arc::new(FileSettingsStore::new(&config.notification_settings_path));
    let settings = load_or_init(settings_store.as_ref())
        .await
        .with_context(|| {
            format!(
                "Failed to load notification settings from {}",
                config.notification_settings_path.display()
            )
        })?;
    let notifier = Arc::new(Notifier::new(
        settings,
        settings_store,
        Transports {
            email: Arc::new(EmailTransport::new(config.email.clone())),
            sms: Arc::new(SmsTransport::new(
                config.sms_api_url.clone(),
                config.sms_api_key.clone(),
            )),
            log: Arc::new(LogTransport),
        },
    ));

    // Pipeline
    let scheduler = Arc::new(PollScheduler::new(
        store.clone(),
        fetcher,
        notifier.clone(),
        PollConfig {
            inter_call_delay: Duration::from_millis(config.inter_call_delay_ms),
            lookback: chrono::Duration::hours(config.lookback_hours),
            rearm: config.rearm,
        },
    ));
    let sweeper = Arc::new(RetentionSweeper::new(
        store.clone(),
        config.retention_months,
    ));
    info!(
        "Polling every {}s (lookback {}h, call spacing {}ms, re-arm {:?})",
        config.poll_interval_secs, config.lookback_hours, config.inter_call_delay_ms, config.rearm
    );

    // Background jobs
    let poll_job = spawn_periodic(
        "flight-status",
        Duration::from_secs(config.poll_interval_secs),
        true,
        {
            let scheduler = scheduler.clone();
            move || {
                let scheduler = scheduler.clone();
                async move {
                    scheduler.tick().await;
                }
            }
        },
    );
    let sweep_job = spawn_periodic(
        "retention",
        Duration::from_secs(config.sweep_interval_hours * 3600),
        false,
        {
            let sweeper = sweeper.clone();
            move || {
                let sweeper = sweeper.clone();
                async move {
                    if let Err(e) = sweeper.sweep(Utc::now()).await {
                        error!("Retention sweep failed: {e}");
                    }
                }
            }
        },
    );

    // Build app state
    let state = AppState {
        store,
        scheduler,
        sweeper,
        notifier,
    };

    // Build router
    let app = build_router(state).layer(
        ServiceBuilder::new()
            .layer(TraceLayer::new_for_http())
            .layer(CorsLayer::permissive()),
    );

    let addr: SocketAddr = format!("0.0.0.0:{}", config.port).parse()?;
    info!("Listening on {addr}");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    // Let in-flight ticks finish before exiting
    poll_job.stop().await;
    sweep_job.stop().await;
    info!("Shutdown complete");

    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        error!("Failed to listen for shutdown signal: {e}");
        std::future::pending::<()>().await;
    }
    info!("Shutdown signal received");
}
