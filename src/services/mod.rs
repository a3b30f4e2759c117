pub mod geoip;

pub use geoip::{GeoRecord, GeoSnapshot, GeoStore, LookupOutcome, LookupService, RecordCache};
