//! IP → GeoRecord 查询服务

use std::net::IpAddr;
use std::sync::Arc;

use tracing::trace;

use super::model::GeoRecord;
use super::record_cache::RecordCache;
use super::source::OffsetResolver;
use crate::errors::{GeocacheError, Result};

/// 查询结果
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum LookupOutcome<'a> {
    Found(&'a GeoRecord),
    /// 地址不在任何网络内
    NotFound,
}

impl<'a> LookupOutcome<'a> {
    pub fn record(self) -> Option<&'a GeoRecord> {
        match self {
            LookupOutcome::Found(record) => Some(record),
            LookupOutcome::NotFound => None,
        }
    }
}

/// 查询服务
///
/// 缓存与读取器来自同一个数据库，读取器返回的偏移必然在缓存中；
/// 不在时返回 `Consistency` 错误，由调用方记录日志。
pub struct LookupService {
    resolver: Arc<dyn OffsetResolver>,
    cache: RecordCache,
}

impl LookupService {
    pub fn new(resolver: Arc<dyn OffsetResolver>, cache: RecordCache) -> Self {
        Self { resolver, cache }
    }

    /// 查询单个地址
    ///
    /// - 读取器错误 → `GeocacheError::Lookup`
    /// - 读取器给出的偏移不在缓存中 → `GeocacheError::Consistency`
    pub fn lookup(&self, ip: IpAddr) -> Result<LookupOutcome<'_>> {
        let Some(offset) = self.resolver.lookup_offset(ip)? else {
            trace!("No network covers {}", ip);
            return Ok(LookupOutcome::NotFound);
        };

        self.cache
            .get(offset)
            .map(LookupOutcome::Found)
            .ok_or_else(|| GeocacheError::consistency(offset))
    }

    pub fn cache(&self) -> &RecordCache {
        &self.cache
    }
}
