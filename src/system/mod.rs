//! System-level modules
//!
//! - Logging initialization
//! - Signal-driven database reload

pub mod logging;
pub mod reload;
