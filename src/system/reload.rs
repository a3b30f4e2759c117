//! Database reload
//!
//! A reload opens the database file again, builds a brand-new snapshot on a
//! blocking thread and swaps it in. The live snapshot keeps serving until the
//! swap, and keeps serving unchanged if the rebuild fails.
//!
//! On unix the reload is triggered by `SIGHUP`.

use std::path::PathBuf;
use std::sync::Arc;

use tracing::{error, info};

use crate::errors::{GeocacheError, Result};
use crate::services::geoip::BuildStats;
use crate::services::{GeoSnapshot, GeoStore};

/// 重新加载数据库并替换当前快照
pub async fn reload_database(store: Arc<GeoStore>, path: PathBuf) -> Result<BuildStats> {
    info!("Reloading GeoIP database from {}", path.display());

    let snapshot = tokio::task::spawn_blocking(move || GeoSnapshot::open(&path))
        .await
        .map_err(|e| GeocacheError::build(format!("reload task failed: {}", e)))??;

    let stats = snapshot.stats();
    let previous = store.replace(snapshot);
    info!(
        "GeoIP database reloaded: {} records (was {}), built in {} ms",
        stats.records,
        previous.stats().records,
        stats.elapsed.as_millis()
    );
    Ok(stats)
}

/// Setup SIGHUP signal handler for reload
#[cfg(unix)]
pub fn setup_reload_mechanism(store: Arc<GeoStore>, path: PathBuf) {
    use tokio::signal::unix::{SignalKind, signal};
    use tracing::warn;

    tokio::spawn(async move {
        let mut stream = match signal(SignalKind::hangup()) {
            Ok(s) => s,
            Err(e) => {
                warn!(
                    "Failed to create SIGHUP handler: {}. Database reload via signal disabled.",
                    e
                );
                return;
            }
        };

        while stream.recv().await.is_some() {
            info!("Received SIGHUP, triggering database reload...");
            if let Err(e) = reload_database(store.clone(), path.clone()).await {
                error!("Reload failed, keeping the current database: {}", e);
            }
        }
    });
}

#[cfg(not(unix))]
pub fn setup_reload_mechanism(_store: Arc<GeoStore>, _path: PathBuf) {
    tracing::debug!("Signal-driven reload is not available on this platform");
}
