use std::sync::Arc;

use actix_web::http::StatusCode;
use actix_web::{HttpRequest, HttpResponse, Responder, web};
use tracing::{error, trace};

use crate::errors::GeocacheError;
use crate::services::{GeoStore, LookupOutcome};
use crate::utils::ClientAddressPolicy;

pub struct CityService;

impl CityService {
    /// `GET /geoip/v2.1/city/{ip}`
    ///
    /// - 非法地址 → 400（不会触达数据库读取器）
    /// - 不在任何网络内 → 404
    /// - 命中 → 200 + JSON
    /// - 读取器错误 / 缓存不一致 → 500
    pub async fn lookup_city(
        req: HttpRequest,
        path: web::Path<String>,
        store: web::Data<Arc<GeoStore>>,
        policy: web::Data<ClientAddressPolicy>,
    ) -> impl Responder {
        let token = path.into_inner();

        let Some(ip) = policy.resolve(&token, &req) else {
            trace!("Rejected address parameter: {:?}", token);
            return Self::empty_response(StatusCode::BAD_REQUEST);
        };

        let snapshot = store.load();
        match snapshot.service().lookup(ip) {
            Ok(LookupOutcome::Found(record)) => HttpResponse::Ok().json(record),
            Ok(LookupOutcome::NotFound) => Self::empty_response(StatusCode::NOT_FOUND),
            Err(e @ GeocacheError::Consistency(_)) => {
                error!(
                    "Record cache out of sync with reader for {} ({})",
                    ip,
                    e.message()
                );
                Self::empty_response(StatusCode::INTERNAL_SERVER_ERROR)
            }
            Err(e) => {
                error!("Lookup failed for {}: {}", ip, e);
                Self::empty_response(StatusCode::INTERNAL_SERVER_ERROR)
            }
        }
    }

    #[inline]
    fn empty_response(status: StatusCode) -> HttpResponse {
        HttpResponse::build(status).finish()
    }
}

pub fn city_routes() -> actix_web::Scope {
    web::scope("/geoip/v2.1").route("/city/{ip}", web::get().to(CityService::lookup_city))
}
