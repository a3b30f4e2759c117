//! Geocache - GeoIP2 City lookups over HTTP
//!
//! At startup every network prefix in the database is walked once and each
//! distinct data record is decoded exactly once, keyed by its data-section
//! offset. Serving a lookup afterwards is an offset query plus a read from an
//! immutable map, with no decoding and no locking.
//!
//! # Architecture
//! - `services`: record cache builder, lookup service, database snapshots
//! - `api`: HTTP routes and middleware
//! - `config`: Configuration management (TOML, env, CLI flags)
//! - `runtime`: Application lifecycle and execution modes
//! - `system`: Logging and signal-driven reload
//! - `utils`: Address parsing and client IP resolution

pub mod api;
pub mod config;
pub mod errors;
pub mod runtime;
pub mod services;
pub mod system;
pub mod utils;
