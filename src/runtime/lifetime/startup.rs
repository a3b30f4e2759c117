use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use tracing::{debug, info};

use crate::config::StaticConfig;
use crate::services::{GeoSnapshot, GeoStore};
use crate::utils::ClientAddressPolicy;

pub struct StartupContext {
    pub store: Arc<GeoStore>,
    pub database_path: PathBuf,
    pub address_policy: ClientAddressPolicy,
}

/// 准备服务器启动的上下文
///
/// 打开数据库并完整构建记录缓存；只有成功返回后服务器才会开始监听。
pub async fn prepare_server_startup(config: &StaticConfig) -> Result<StartupContext> {
    let start_time = std::time::Instant::now();
    debug!("Starting pre-startup processing...");

    config.validate().context("Invalid configuration")?;

    let database_path = PathBuf::from(&config.database.path);
    let path = database_path.clone();
    let snapshot = tokio::task::spawn_blocking(move || GeoSnapshot::open(&path))
        .await
        .context("Cache build task panicked")?
        .with_context(|| {
            format!(
                "Failed to load GeoIP database {}",
                database_path.display()
            )
        })?;

    let info = snapshot.info();
    let stats = snapshot.stats();
    info!(
        "GeoIP database ready: {} (IPv{}), {} networks -> {} records",
        info.database_type, info.ip_version, stats.networks, stats.records
    );

    if config.server.trusted_proxies.is_empty() {
        debug!("No trusted proxies configured, `me` resolves to the connection peer");
    } else {
        info!(
            "Trusted proxies for `me` resolution: {:?}",
            config.server.trusted_proxies
        );
    }

    debug!(
        "Pre-startup processing completed in {} ms",
        start_time.elapsed().as_millis()
    );

    Ok(StartupContext {
        store: Arc::new(GeoStore::new(snapshot)),
        database_path,
        address_policy: ClientAddressPolicy::new(config.server.trusted_proxies.clone()),
    })
}
