//! Command-line argument parsing
//!
//! Flags given here override the configuration file and environment.

use std::path::PathBuf;

use clap::{Parser, Subcommand};

#[derive(Debug, Parser)]
#[command(
    name = "geocache",
    version,
    about = "GeoIP2 City lookup service backed by an in-memory record cache"
)]
pub struct Cli {
    /// Configuration file (TOML)
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// TCP address to listen to, e.g. `:8080` or `127.0.0.1:8080`
    #[arg(long, global = true)]
    pub addr: Option<String>,

    /// Enable transparent response compression
    #[arg(long, global = true)]
    pub compress: bool,

    /// Path to the GeoLite2 or GeoIP2 City database
    #[arg(long = "db-file", alias = "dbFile", global = true)]
    pub db_file: Option<String>,

    /// Log filter, e.g. `info` or `geocache=debug`
    #[arg(long, global = true)]
    pub log_level: Option<String>,

    #[command(subcommand)]
    pub command: Option<Command>,
}

#[derive(Debug, Clone, PartialEq, Eq, Subcommand)]
pub enum Command {
    /// Run the HTTP server (default)
    Serve,
    /// Build the cache and print the record for each address as JSON
    Lookup {
        #[arg(required = true)]
        addresses: Vec<String>,
    },
    /// Print a sample configuration file
    Config,
}

impl Cli {
    pub fn command(&self) -> Command {
        self.command.clone().unwrap_or(Command::Serve)
    }
}
