//! GeoIP2 City 记录模型
//!
//! 字段与 MaxMind GeoIP2 City 数据库的 data section 一一对应。
//! 所有字段都带默认值：数据库中缺失的子结构会解码为零值，
//! 序列化时也总是输出完整结构（空 names 为 `{}`，空 subdivisions 为 `[]`）。

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

/// 本地化名称，语言代码 → 显示名称
pub type Names = BTreeMap<String, String>;

/// 数据库 data section 中的记录偏移
///
/// 只在同一个已打开的数据库内有意义，不能持久化，
/// 也不能跨数据库文件比较。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct RecordOffset(usize);

impl RecordOffset {
    pub const fn new(raw: usize) -> Self {
        Self(raw)
    }

    pub const fn get(self) -> usize {
        self.0
    }
}

impl fmt::Display for RecordOffset {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// 一条完整的 City 记录
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GeoRecord {
    pub city: City,
    pub continent: Continent,
    pub country: Country,
    pub location: Location,
    pub postal: Postal,
    pub registered_country: Country,
    pub represented_country: RepresentedCountry,
    pub subdivisions: Vec<Subdivision>,
    pub traits: Traits,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct City {
    pub geoname_id: u32,
    pub names: Names,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Continent {
    pub code: String,
    pub geoname_id: u32,
    pub names: Names,
}

/// `country` 与 `registered_country` 共用
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Country {
    pub geoname_id: u32,
    pub iso_code: String,
    pub names: Names,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Location {
    pub accuracy_radius: u16,
    pub latitude: f64,
    pub longitude: f64,
    pub metro_code: u32,
    pub time_zone: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Postal {
    pub code: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RepresentedCountry {
    pub geoname_id: u32,
    pub iso_code: String,
    pub names: Names,
    #[serde(rename = "type")]
    pub kind: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Subdivision {
    pub geoname_id: u32,
    pub iso_code: String,
    pub names: Names,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Traits {
    pub is_anonymous_proxy: bool,
    pub is_satellite_provider: bool,
}
