use actix_web::{HttpResponse, Responder, web};
use serde::Serialize;
use std::sync::Arc;
use tracing::trace;

use crate::services::GeoStore;
use crate::services::geoip::{BuildStats, DatabaseInfo};

// 应用启动时间结构体
#[derive(Clone, Debug)]
pub struct AppStartTime {
    pub start_datetime: chrono::DateTime<chrono::Utc>,
}

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub timestamp: String,
    pub uptime_seconds: u64,
    pub loaded_at: String,
    pub database: DatabaseInfo,
    pub cache: BuildStats,
}

/// Health Service
///
/// 服务只会在缓存构建成功后开始监听，因此 ready 与 live 都无条件返回 200。
pub struct HealthService;

impl HealthService {
    pub async fn health_check(
        store: web::Data<Arc<GeoStore>>,
        app_start_time: web::Data<AppStartTime>,
    ) -> impl Responder {
        trace!("Received health check request");

        let snapshot = store.load();
        let now = chrono::Utc::now();
        let uptime_seconds = (now - app_start_time.start_datetime).num_seconds().max(0) as u64;

        HttpResponse::Ok().json(HealthResponse {
            status: "healthy",
            timestamp: now.to_rfc3339(),
            uptime_seconds,
            loaded_at: snapshot.loaded_at().to_rfc3339(),
            database: snapshot.info().clone(),
            cache: snapshot.stats(),
        })
    }

    pub async fn readiness_check() -> impl Responder {
        trace!("Received readiness check request");
        HttpResponse::Ok().finish()
    }

    pub async fn liveness_check() -> impl Responder {
        trace!("Received liveness check request");
        HttpResponse::Ok().finish()
    }
}

pub fn health_routes() -> actix_web::Scope {
    web::scope("/health")
        .route("", web::get().to(HealthService::health_check))
        .route("/ready", web::get().to(HealthService::readiness_check))
        .route("/live", web::get().to(HealthService::liveness_check))
}
