//! MaxMind GeoLite2 / GeoIP2 City 数据库实现
//!
//! 使用本地 `.mmdb` 文件，基于 `maxminddb` crate 提供网络枚举、
//! 偏移查询和记录解码。

use std::net::IpAddr;
use std::path::Path;

use maxminddb::{LookupResult, Reader, WithinOptions};
use tracing::{debug, trace};

use super::model::{GeoRecord, RecordOffset};
use super::source::{DatabaseInfo, NetworkEntry, NetworkSource, OffsetResolver};
use crate::errors::{GeocacheError, Result};

/// MaxMind 数据库句柄
pub struct MaxMindDatabase {
    reader: Reader<Vec<u8>>,
}

impl MaxMindDatabase {
    /// 从文件路径打开数据库（整个文件读入内存）
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let reader = Reader::open_readfile(path).map_err(|e| {
            GeocacheError::database_open(format!("{}: {}", path.display(), e))
        })?;

        debug!(
            "Opened {} ({}), {} nodes",
            path.display(),
            reader.metadata.database_type,
            reader.metadata.node_count
        );

        Ok(Self { reader })
    }
}

/// 枚举得到的单个网络
pub struct MaxMindEntry<'a> {
    result: LookupResult<'a, Vec<u8>>,
}

impl NetworkEntry for MaxMindEntry<'_> {
    fn offset(&self) -> Result<RecordOffset> {
        self.result
            .offset()
            .map(RecordOffset::new)
            .ok_or_else(|| GeocacheError::build("network has no data record"))
    }

    fn decode(&self) -> Result<GeoRecord> {
        match self.result.decode::<GeoRecord>() {
            Ok(Some(record)) => Ok(record),
            Ok(None) => Err(GeocacheError::build("data record is empty")),
            Err(e) => Err(GeocacheError::build(e.to_string())),
        }
    }
}

impl NetworkSource for MaxMindDatabase {
    type Entry<'a> = MaxMindEntry<'a>;

    fn networks(&self) -> Result<impl Iterator<Item = Result<Self::Entry<'_>>> + '_> {
        let networks = self
            .reader
            .networks(WithinOptions::default())
            .map_err(|e| GeocacheError::build(format!("cannot enumerate networks: {}", e)))?;

        Ok(networks.map(|item| {
            item.map(|result| MaxMindEntry { result })
                .map_err(|e| GeocacheError::build(format!("network enumeration failed: {}", e)))
        }))
    }
}

impl OffsetResolver for MaxMindDatabase {
    fn lookup_offset(&self, ip: IpAddr) -> Result<Option<RecordOffset>> {
        let result = self
            .reader
            .lookup(ip)
            .map_err(|e| GeocacheError::lookup(format!("{}: {}", ip, e)))?;

        let offset = result.offset().map(RecordOffset::new);
        trace!("MaxMind offset for {}: {:?}", ip, offset);
        Ok(offset)
    }

    fn info(&self) -> DatabaseInfo {
        let metadata = &self.reader.metadata;
        DatabaseInfo {
            database_type: metadata.database_type.clone(),
            build_epoch: metadata.build_epoch,
            ip_version: metadata.ip_version,
            node_count: metadata.node_count,
        }
    }
}
