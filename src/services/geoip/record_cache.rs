//! 按数据偏移去重的记录缓存
//!
//! 启动时遍历数据库中的全部网络，每个不同的偏移只解码一次。
//! 构建完成后缓存不可变，请求路径上的读取不需要任何锁。

use std::collections::hash_map::Entry;
use std::time::{Duration, Instant};

use rustc_hash::FxHashMap;
use serde::Serialize;
use tracing::{debug, info};

use super::model::{GeoRecord, RecordOffset};
use super::source::{NetworkEntry, NetworkSource};
use crate::errors::{GeocacheError, Result};

/// 每遍历这么多网络打印一次进度
const PROGRESS_INTERVAL: u64 = 1_000_000;

/// 构建统计
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct BuildStats {
    /// 遍历过的网络前缀数
    pub networks: u64,
    /// 解码的不同记录数
    pub records: usize,
    #[serde(serialize_with = "serialize_millis")]
    pub elapsed: Duration,
}

fn serialize_millis<S: serde::Serializer>(d: &Duration, s: S) -> std::result::Result<S::Ok, S::Error> {
    s.serialize_u64(u64::try_from(d.as_millis()).unwrap_or(u64::MAX))
}

/// 偏移 → 已解码记录，覆盖一个数据库中的全部偏移
#[derive(Debug, Default)]
pub struct RecordCache {
    records: FxHashMap<RecordOffset, GeoRecord>,
    stats: BuildStats,
}

impl RecordCache {
    /// 构建完整缓存
    ///
    /// 任一网络枚举或记录解码失败都会中止构建并返回错误，
    /// 不会产出部分填充的缓存。
    pub fn build<S: NetworkSource>(source: &S) -> Result<Self> {
        let started = Instant::now();
        let mut records: FxHashMap<RecordOffset, GeoRecord> = FxHashMap::default();
        let mut networks: u64 = 0;

        for entry in source.networks()? {
            let entry = entry?;
            networks += 1;

            let offset = entry.offset()?;
            if let Entry::Vacant(slot) = records.entry(offset) {
                let record = entry.decode().map_err(|e| {
                    GeocacheError::build(format!(
                        "failed to decode record at offset {}: {}",
                        offset,
                        e.message()
                    ))
                })?;
                slot.insert(record);
            }

            if networks % PROGRESS_INTERVAL == 0 {
                debug!(
                    "Record cache: {} networks scanned, {} distinct records",
                    networks,
                    records.len()
                );
            }
        }

        records.shrink_to_fit();
        let stats = BuildStats {
            networks,
            records: records.len(),
            elapsed: started.elapsed(),
        };

        info!(
            "Record cache built: {} networks, {} distinct records in {} ms",
            stats.networks,
            stats.records,
            stats.elapsed.as_millis()
        );

        Ok(Self { records, stats })
    }

    #[inline]
    pub fn get(&self, offset: RecordOffset) -> Option<&GeoRecord> {
        self.records.get(&offset)
    }

    pub fn contains(&self, offset: RecordOffset) -> bool {
        self.records.contains_key(&offset)
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn stats(&self) -> BuildStats {
        self.stats
    }
}
