//! Server mode
//!
//! This module contains the HTTP server startup logic.
//! The record cache is fully built before the listener is bound.

use actix_web::{
    App, HttpServer,
    middleware::{Compress, Condition},
    web,
};
use anyhow::{Context, Result};
use tracing::{info, warn};

use crate::api::middleware::TimingMiddleware;
use crate::api::services::{AppStartTime, city_routes, health_routes};
use crate::config::StaticConfig;
use crate::runtime::lifetime;
use crate::system::reload::setup_reload_mechanism;

/// Worker 数量上限
const MAX_WORKERS: usize = 32;

/// Run the HTTP server
///
/// This function:
/// 1. Builds the record cache (blocking until complete)
/// 2. Installs the SIGHUP reload handler
/// 3. Configures and starts the HTTP server
/// 4. Listens for graceful shutdown signals
///
/// **Note**: Logging system must be initialized before calling this function
pub async fn run_server(config: StaticConfig) -> Result<()> {
    let app_start_time = AppStartTime {
        start_datetime: chrono::Utc::now(),
    };

    let startup = lifetime::startup::prepare_server_startup(&config)
        .await
        .map_err(|e| {
            tracing::error!("Server startup failed: {:#}", e);
            e
        })?;

    setup_reload_mechanism(startup.store.clone(), startup.database_path.clone());

    let store = startup.store;
    let policy = startup.address_policy;
    let compress = config.server.compress;
    let workers = config.server.workers.clamp(1, MAX_WORKERS);
    let bind_address = config.server.bind_address()?;

    if compress {
        info!("Transparent response compression enabled");
    }
    warn!("Using {} workers for the server", workers);

    let server = HttpServer::new(move || {
        App::new()
            .wrap(TimingMiddleware)
            .wrap(Condition::new(compress, Compress::default()))
            .app_data(web::Data::new(store.clone()))
            .app_data(web::Data::new(policy.clone()))
            .app_data(web::Data::new(app_start_time.clone()))
            .service(health_routes())
            .service(city_routes())
    })
    .workers(workers)
    .disable_signals()
    .bind(&bind_address)
    .with_context(|| format!("Failed to bind {}", bind_address))?
    .run();

    warn!("Starting server at http://{}", bind_address);

    let handle = server.handle();
    tokio::spawn(async move {
        lifetime::shutdown::listen_for_shutdown().await;
        handle.stop(true).await;
    });

    server.await?;
    info!("Server stopped");
    Ok(())
}
