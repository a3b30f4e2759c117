//! Mode routing
//!
//! - Server mode (HTTP server)
//! - CLI mode (one-shot lookups)

pub mod cli;
pub mod server;

pub use cli::{lookup_line, run_lookup};
pub use server::run_server;
