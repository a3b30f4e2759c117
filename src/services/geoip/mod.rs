//! GeoIP 服务模块
//!
//! 启动时把数据库中每条不同的数据记录解码进内存缓存，
//! 之后的每次 IP 查询只剩一次偏移查询 + 一次哈希表读取。
//!
//! - `model`: City 记录结构与偏移类型
//! - `source`: 读取器抽象（枚举 / 解码 / 偏移查询）
//! - `maxmind`: 基于 `.mmdb` 文件的读取器实现
//! - `record_cache`: 偏移去重缓存
//! - `lookup`: 查询服务
//! - `snapshot`: 读取器 + 缓存快照，支持整体替换

mod lookup;
mod maxmind;
mod model;
mod record_cache;
mod snapshot;
mod source;

pub use lookup::{LookupOutcome, LookupService};
pub use maxmind::{MaxMindDatabase, MaxMindEntry};
pub use model::{
    City, Continent, Country, GeoRecord, Location, Names, Postal, RecordOffset,
    RepresentedCountry, Subdivision, Traits,
};
pub use record_cache::{BuildStats, RecordCache};
pub use snapshot::{GeoSnapshot, GeoStore};
pub use source::{DatabaseInfo, NetworkEntry, NetworkSource, OffsetResolver};
