//! 数据库快照与原子替换
//!
//! 一个 [`GeoSnapshot`] 是同一个数据库文件的读取器 + 记录缓存。
//! 请求每次取出一个快照并只在这个快照内完成查询；
//! 重新加载时构建全新的快照再整体替换，从不修改正在使用的缓存。

use std::path::Path;
use std::sync::Arc;

use arc_swap::ArcSwap;
use chrono::{DateTime, Utc};
use tracing::info;

use super::lookup::LookupService;
use super::maxmind::MaxMindDatabase;
use super::record_cache::{BuildStats, RecordCache};
use super::source::{DatabaseInfo, NetworkSource, OffsetResolver};
use crate::errors::Result;

pub struct GeoSnapshot {
    service: LookupService,
    info: DatabaseInfo,
    loaded_at: DateTime<Utc>,
}

impl GeoSnapshot {
    /// 从任意读取器构建快照（构建完成前不会对外可见）
    pub fn build<D>(database: D) -> Result<Self>
    where
        D: NetworkSource + OffsetResolver + 'static,
    {
        let cache = RecordCache::build(&database)?;
        let info = database.info();

        Ok(Self {
            service: LookupService::new(Arc::new(database), cache),
            info,
            loaded_at: Utc::now(),
        })
    }

    /// 打开 MaxMind 数据库文件并构建快照
    pub fn open(path: &Path) -> Result<Self> {
        let database = MaxMindDatabase::open(path)?;
        let snapshot = Self::build(database)?;

        info!(
            "Loaded {} (build epoch {}) from {}",
            snapshot.info.database_type,
            snapshot.info.build_epoch,
            path.display()
        );
        Ok(snapshot)
    }

    pub fn service(&self) -> &LookupService {
        &self.service
    }

    pub fn info(&self) -> &DatabaseInfo {
        &self.info
    }

    pub fn stats(&self) -> BuildStats {
        self.service.cache().stats()
    }

    pub fn loaded_at(&self) -> DateTime<Utc> {
        self.loaded_at
    }
}

/// 当前生效的快照
pub struct GeoStore {
    current: ArcSwap<GeoSnapshot>,
}

impl GeoStore {
    pub fn new(snapshot: GeoSnapshot) -> Self {
        Self {
            current: ArcSwap::from_pointee(snapshot),
        }
    }

    /// 取出当前快照，调用方持有期间不受后续替换影响
    pub fn load(&self) -> Arc<GeoSnapshot> {
        self.current.load_full()
    }

    /// 整体替换快照，返回被替换的旧快照
    pub fn replace(&self, snapshot: GeoSnapshot) -> Arc<GeoSnapshot> {
        self.current.swap(Arc::new(snapshot))
    }
}
