//! Shared test fixtures
//!
//! `StubDatabase` stands in for the mmdb reader: a list of (CIDR, offset)
//! networks plus a table of records per offset. It counts decode and
//! offset-lookup calls and can be told to fail at specific points.

#![allow(dead_code)]

pub mod mmdb;

use std::collections::HashMap;
use std::net::IpAddr;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use tracing::field::{Field, Visit};
use tracing::subscriber::DefaultGuard;
use tracing::{Event, Level, Subscriber};
use tracing_subscriber::layer::{Context, Layer, SubscriberExt};

use geocache::errors::{GeocacheError, Result};
use geocache::services::geoip::{
    Country, DatabaseInfo, GeoRecord, NetworkEntry, NetworkSource, OffsetResolver, RecordOffset,
};
use geocache::utils::ip::ip_in_cidr;

#[derive(Default)]
pub struct StubDatabase {
    /// (cidr, offset); `None` offset models a network without data
    networks: Vec<(String, Option<usize>)>,
    records: HashMap<usize, GeoRecord>,
    /// networks answered by `lookup_offset` but never enumerated
    hidden: Vec<(String, usize)>,
    fail_enumeration_at: Option<usize>,
    fail_decode_at: Option<usize>,
    fail_lookups: bool,
    decode_calls: Mutex<HashMap<usize, usize>>,
    lookup_calls: AtomicUsize,
}

impl StubDatabase {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn network(mut self, cidr: &str, offset: usize) -> Self {
        self.networks.push((cidr.to_string(), Some(offset)));
        self
    }

    pub fn network_without_data(mut self, cidr: &str) -> Self {
        self.networks.push((cidr.to_string(), None));
        self
    }

    pub fn record(mut self, offset: usize, record: GeoRecord) -> Self {
        self.records.insert(offset, record);
        self
    }

    pub fn hidden_network(mut self, cidr: &str, offset: usize) -> Self {
        self.hidden.push((cidr.to_string(), offset));
        self
    }

    /// Enumeration yields an error instead of the `index`-th network.
    pub fn fail_enumeration_at(mut self, index: usize) -> Self {
        self.fail_enumeration_at = Some(index);
        self
    }

    pub fn fail_decode_at(mut self, offset: usize) -> Self {
        self.fail_decode_at = Some(offset);
        self
    }

    pub fn fail_lookups(mut self) -> Self {
        self.fail_lookups = true;
        self
    }

    pub fn decode_calls(&self, offset: usize) -> usize {
        self.decode_calls
            .lock()
            .unwrap()
            .get(&offset)
            .copied()
            .unwrap_or(0)
    }

    pub fn total_decode_calls(&self) -> usize {
        self.decode_calls.lock().unwrap().values().sum()
    }

    pub fn lookup_calls(&self) -> usize {
        self.lookup_calls.load(Ordering::SeqCst)
    }

    fn prefix_len(cidr: &str) -> u8 {
        cidr.split_once('/')
            .and_then(|(_, len)| len.parse().ok())
            .unwrap_or(0)
    }
}

pub struct StubEntry<'a> {
    db: &'a StubDatabase,
    offset: Option<usize>,
}

impl NetworkEntry for StubEntry<'_> {
    fn offset(&self) -> Result<RecordOffset> {
        self.offset
            .map(RecordOffset::new)
            .ok_or_else(|| GeocacheError::build("network has no data record"))
    }

    fn decode(&self) -> Result<GeoRecord> {
        let offset = self
            .offset
            .ok_or_else(|| GeocacheError::build("network has no data record"))?;
        *self
            .db
            .decode_calls
            .lock()
            .unwrap()
            .entry(offset)
            .or_insert(0) += 1;

        if self.db.fail_decode_at == Some(offset) {
            return Err(GeocacheError::build("corrupt data section"));
        }
        self.db
            .records
            .get(&offset)
            .cloned()
            .ok_or_else(|| GeocacheError::build("no record stored at offset"))
    }
}

impl NetworkSource for StubDatabase {
    type Entry<'a> = StubEntry<'a>;

    fn networks(&self) -> Result<impl Iterator<Item = Result<Self::Entry<'_>>> + '_> {
        Ok(self
            .networks
            .iter()
            .enumerate()
            .map(move |(index, (_, offset))| {
                if self.fail_enumeration_at == Some(index) {
                    return Err(GeocacheError::build("trie walk failed"));
                }
                Ok(StubEntry {
                    db: self,
                    offset: *offset,
                })
            }))
    }
}

impl OffsetResolver for StubDatabase {
    fn lookup_offset(&self, ip: IpAddr) -> Result<Option<RecordOffset>> {
        self.lookup_calls.fetch_add(1, Ordering::SeqCst);
        if self.fail_lookups {
            return Err(GeocacheError::lookup(format!("{}: invalid search tree", ip)));
        }

        let visible = self
            .networks
            .iter()
            .filter_map(|(cidr, offset)| offset.map(|o| (cidr, o)));
        let hidden = self.hidden.iter().map(|(cidr, offset)| (cidr, *offset));

        // 最长前缀匹配
        Ok(visible
            .chain(hidden)
            .filter(|(cidr, _)| ip_in_cidr(&ip, cidr))
            .max_by_key(|(cidr, _)| Self::prefix_len(cidr))
            .map(|(_, offset)| RecordOffset::new(offset)))
    }

    fn info(&self) -> DatabaseInfo {
        DatabaseInfo {
            database_type: "Stub-City".to_string(),
            build_epoch: 1_700_000_000,
            ip_version: 6,
            node_count: self.networks.len() as u32,
        }
    }
}

pub fn country_record(iso_code: &str, name: &str) -> GeoRecord {
    let mut record = GeoRecord {
        country: Country {
            geoname_id: 6252001,
            iso_code: iso_code.to_string(),
            ..Default::default()
        },
        ..Default::default()
    };
    record
        .country
        .names
        .insert("en".to_string(), name.to_string());
    record
}

/// Two networks sharing offset 42 (US), one at offset 7 (DE), IPv6 at 99 (JP).
pub fn sample_database() -> StubDatabase {
    StubDatabase::new()
        .network("10.0.0.0/8", 42)
        .network("10.1.0.0/16", 42)
        .network("192.0.2.0/24", 7)
        .network("2001:db8::/32", 99)
        .record(42, country_record("US", "United States"))
        .record(7, country_record("DE", "Germany"))
        .record(99, country_record("JP", "Japan"))
}

// =============================================================================
// 日志捕获
// =============================================================================

/// 记录当前线程上所有 ERROR 级别事件的 message
#[derive(Clone, Default)]
pub struct ErrorLog {
    messages: Arc<Mutex<Vec<String>>>,
}

impl ErrorLog {
    /// 安装为当前线程的默认 subscriber，guard 释放前一直有效
    pub fn install() -> (Self, DefaultGuard) {
        let log = Self::default();
        let subscriber = tracing_subscriber::registry().with(log.clone());
        (log, tracing::subscriber::set_default(subscriber))
    }

    pub fn messages(&self) -> Vec<String> {
        self.messages.lock().unwrap().clone()
    }
}

struct MessageVisitor(String);

impl Visit for MessageVisitor {
    fn record_debug(&mut self, field: &Field, value: &dyn std::fmt::Debug) {
        if field.name() == "message" {
            self.0 = format!("{:?}", value);
        }
    }
}

impl<S: Subscriber> Layer<S> for ErrorLog {
    fn on_event(&self, event: &Event<'_>, _ctx: Context<'_, S>) {
        if *event.metadata().level() == Level::ERROR {
            let mut visitor = MessageVisitor(String::new());
            event.record(&mut visitor);
            self.messages.lock().unwrap().push(visitor.0);
        }
    }
}
