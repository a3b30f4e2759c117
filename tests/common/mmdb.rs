//! 最小 MaxMind DB 写入器
//!
//! 只支持 IPv4 树、24 位记录，数据按 serde_json 值编码。
//! 用于在临时目录生成真实的 `.mmdb` 文件，覆盖 `MaxMindDatabase`。

use std::net::Ipv4Addr;
use std::path::{Path, PathBuf};

use serde_json::{Value, json};

const METADATA_MARKER: &[u8] = b"\xAB\xCD\xEFMaxMind.com";
const DATA_SECTION_SEPARATOR: usize = 16;

pub const FIXTURE_DATABASE_TYPE: &str = "GeoIP2-City-Test";

#[derive(Debug, Clone, Copy)]
enum Slot {
    Empty,
    Node(usize),
    Data(usize),
}

pub struct MmdbWriter {
    nodes: Vec<[Slot; 2]>,
    data: Vec<u8>,
}

impl MmdbWriter {
    pub fn new() -> Self {
        Self {
            nodes: vec![[Slot::Empty, Slot::Empty]],
            data: Vec::new(),
        }
    }

    /// 追加一条数据记录，返回其在数据段中的偏移
    pub fn add_record(&mut self, record: &Value) -> usize {
        let offset = self.data.len();
        encode(record, &mut self.data);
        offset
    }

    /// 插入网络；短前缀需先于被其包含的长前缀插入
    pub fn insert(&mut self, network: Ipv4Addr, prefix_len: u8, record: usize) {
        let bits = u32::from(network);
        let mut node = 0;

        for depth in 0..prefix_len {
            let bit = ((bits >> (31 - depth)) & 1) as usize;
            if depth + 1 == prefix_len {
                self.nodes[node][bit] = Slot::Data(record);
                return;
            }

            node = match self.nodes[node][bit] {
                Slot::Node(next) => next,
                inherited => {
                    // 拆分已有的叶子：两个子节点都继承原来的值
                    let next = self.nodes.len();
                    self.nodes.push([inherited, inherited]);
                    self.nodes[node][bit] = Slot::Node(next);
                    next
                }
            };
        }
    }

    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    pub fn to_bytes(&self) -> Vec<u8> {
        let node_count = self.nodes.len();
        let mut out = Vec::new();

        for children in &self.nodes {
            for slot in children {
                let value = match *slot {
                    Slot::Node(index) => index,
                    Slot::Empty => node_count,
                    Slot::Data(offset) => node_count + DATA_SECTION_SEPARATOR + offset,
                };
                assert!(value < 1 << 24, "record does not fit in 24 bits");
                out.extend_from_slice(&(value as u32).to_be_bytes()[1..]);
            }
        }

        out.extend_from_slice(&[0u8; DATA_SECTION_SEPARATOR]);
        out.extend_from_slice(&self.data);
        out.extend_from_slice(METADATA_MARKER);
        encode(
            &json!({
                "binary_format_major_version": 2,
                "binary_format_minor_version": 0,
                "build_epoch": 1_700_000_000u64,
                "database_type": FIXTURE_DATABASE_TYPE,
                "description": { "en": "geocache test fixture" },
                "ip_version": 4,
                "languages": ["en"],
                "node_count": node_count,
                "record_size": 24,
            }),
            &mut out,
        );
        out
    }

    pub fn write_to(&self, path: &Path) {
        std::fs::write(path, self.to_bytes()).unwrap();
    }
}

/// 写入标准测试库：
/// - 10.0.0.0/8 与 10.1.0.0/16 → 同一条 US 记录
/// - 192.0.2.0/24 → DE 记录
pub fn write_city_fixture(dir: &Path) -> PathBuf {
    let mut writer = MmdbWriter::new();

    let us = writer.add_record(&json!({
        "continent": { "code": "NA", "geoname_id": 6255149, "names": { "en": "North America" } },
        "country": { "geoname_id": 6252001, "iso_code": "US", "names": { "en": "United States" } },
        "location": { "accuracy_radius": 1000, "latitude": 37.751, "longitude": -97.822, "time_zone": "America/Chicago" },
    }));
    let de = writer.add_record(&json!({
        "city": { "geoname_id": 2950159, "names": { "de": "Berlin", "en": "Berlin" } },
        "country": { "geoname_id": 2921044, "iso_code": "DE", "names": { "en": "Germany" } },
        "postal": { "code": "10115" },
        "subdivisions": [ { "geoname_id": 2950157, "iso_code": "BE", "names": { "en": "Land Berlin" } } ],
        "traits": { "is_anonymous_proxy": false, "is_satellite_provider": true },
    }));

    writer.insert(Ipv4Addr::new(10, 0, 0, 0), 8, us);
    writer.insert(Ipv4Addr::new(10, 1, 0, 0), 16, us);
    writer.insert(Ipv4Addr::new(192, 0, 2, 0), 24, de);

    let path = dir.join("GeoIP2-City-Test.mmdb");
    writer.write_to(&path);
    path
}

// =============================================================================
// 数据段编码
// =============================================================================

const TYPE_UTF8_STRING: u8 = 2;
const TYPE_DOUBLE: u8 = 3;
const TYPE_MAP: u8 = 7;
const TYPE_UINT32: u8 = 6;
const TYPE_UINT64: u8 = 9;
const TYPE_ARRAY: u8 = 11;
const TYPE_BOOLEAN: u8 = 14;

fn encode(value: &Value, out: &mut Vec<u8>) {
    match value {
        Value::Object(map) => {
            control(TYPE_MAP, map.len(), out);
            for (key, value) in map {
                encode_str(key, out);
                encode(value, out);
            }
        }
        Value::Array(items) => {
            control(TYPE_ARRAY, items.len(), out);
            for item in items {
                encode(item, out);
            }
        }
        Value::String(text) => encode_str(text, out),
        Value::Bool(flag) => control(TYPE_BOOLEAN, *flag as usize, out),
        Value::Number(number) => match number.as_u64() {
            Some(unsigned) => {
                let bytes = unsigned.to_be_bytes();
                let skip = bytes.iter().take_while(|b| **b == 0).count();
                let type_num = if unsigned <= u64::from(u32::MAX) {
                    TYPE_UINT32
                } else {
                    TYPE_UINT64
                };
                control(type_num, bytes.len() - skip, out);
                out.extend_from_slice(&bytes[skip..]);
            }
            None => {
                let float = number.as_f64().unwrap();
                control(TYPE_DOUBLE, 8, out);
                out.extend_from_slice(&float.to_be_bytes());
            }
        },
        Value::Null => panic!("null has no mmdb encoding"),
    }
}

fn encode_str(text: &str, out: &mut Vec<u8>) {
    control(TYPE_UTF8_STRING, text.len(), out);
    out.extend_from_slice(text.as_bytes());
}

/// 控制字节：高 3 位类型，低 5 位长度；类型 > 7 时写入扩展类型字节
fn control(type_num: u8, size: usize, out: &mut Vec<u8>) {
    let (size_bits, size_bytes): (u8, Vec<u8>) = match size {
        0..29 => (size as u8, Vec::new()),
        29..285 => (29, vec![(size - 29) as u8]),
        285..65821 => (30, ((size - 285) as u16).to_be_bytes().to_vec()),
        _ => panic!("value too large for the test writer"),
    };

    if type_num <= 7 {
        out.push((type_num << 5) | size_bits);
    } else {
        out.push(size_bits);
        out.push(type_num - 7);
    }
    out.extend_from_slice(&size_bytes);
}
