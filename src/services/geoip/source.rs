//! 数据库读取器抽象
//!
//! 缓存层只依赖读取器的三个能力：
//! - 枚举所有 (network, offset)
//! - 按偏移解码记录
//! - IP → offset 查询
//!
//! 枚举与解码只在构建缓存时使用（[`NetworkSource`]），
//! 请求路径上只需要 [`OffsetResolver`]，因此后者是对象安全的。

use std::net::IpAddr;
use std::sync::Arc;

use serde::Serialize;

use super::model::{GeoRecord, RecordOffset};
use crate::errors::Result;

/// 枚举过程中产出的一个网络条目
pub trait NetworkEntry {
    /// 该网络指向的数据记录偏移
    ///
    /// 没有数据记录的网络视为数据库损坏，返回错误。
    fn offset(&self) -> Result<RecordOffset>;

    /// 解码该偏移处的记录
    fn decode(&self) -> Result<GeoRecord>;
}

/// 数据库网络树的完整枚举
pub trait NetworkSource {
    type Entry<'a>: NetworkEntry
    where
        Self: 'a;

    /// 按树的遍历顺序逐个产出所有网络前缀，每个只出现一次
    fn networks(&self) -> Result<impl Iterator<Item = Result<Self::Entry<'_>>> + '_>;
}

/// IP → 记录偏移
pub trait OffsetResolver: Send + Sync {
    /// `Ok(None)` 表示该地址不在数据库覆盖范围内
    fn lookup_offset(&self, ip: IpAddr) -> Result<Option<RecordOffset>>;

    /// 数据库元信息（用于日志与健康检查）
    fn info(&self) -> DatabaseInfo {
        DatabaseInfo::default()
    }
}

impl<T: NetworkSource> NetworkSource for Arc<T> {
    type Entry<'a>
        = T::Entry<'a>
    where
        Self: 'a;

    fn networks(&self) -> Result<impl Iterator<Item = Result<Self::Entry<'_>>> + '_> {
        (**self).networks()
    }
}

impl<T: OffsetResolver + ?Sized> OffsetResolver for Arc<T> {
    fn lookup_offset(&self, ip: IpAddr) -> Result<Option<RecordOffset>> {
        (**self).lookup_offset(ip)
    }

    fn info(&self) -> DatabaseInfo {
        (**self).info()
    }
}

/// 数据库元信息，用于日志与 `/health`
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct DatabaseInfo {
    pub database_type: String,
    pub build_epoch: u64,
    pub ip_version: u16,
    pub node_count: u32,
}
