//! CLI mode
//!
//! `geocache lookup <IP>...` builds the record cache exactly like the server
//! and prints one JSON line per address. Unparsable addresses and reader
//! errors produce an `error` line and a non-zero exit code.

use std::io::Write;
use std::path::Path;

use anyhow::{Context, Result};
use serde_json::json;

use crate::config::StaticConfig;
use crate::errors::GeocacheError;
use crate::services::{GeoSnapshot, LookupOutcome};
use crate::utils::{SELF_ADDRESS_TOKEN, parse_ip};

/// 执行查询，返回是否全部成功
pub fn run_lookup(config: &StaticConfig, addresses: &[String]) -> Result<bool> {
    config.validate().context("Invalid configuration")?;

    let path = Path::new(&config.database.path);
    let snapshot = GeoSnapshot::open(path)
        .with_context(|| format!("Failed to load GeoIP database {}", path.display()))?;

    let stdout = std::io::stdout();
    let mut out = stdout.lock();
    let mut all_ok = true;

    for address in addresses {
        let line = match lookup_line(&snapshot, address) {
            Ok(line) => line,
            Err(e) => {
                all_ok = false;
                json!({ "ip": address, "error": e.format_simple() }).to_string()
            }
        };
        writeln!(out, "{}", line)?;
    }

    Ok(all_ok)
}

/// 查询单个地址并格式化为一行 JSON
pub fn lookup_line(snapshot: &GeoSnapshot, address: &str) -> Result<String, GeocacheError> {
    if address == SELF_ADDRESS_TOKEN {
        return Err(GeocacheError::invalid_address(
            "`me` needs an observed peer address and is only available over HTTP",
        ));
    }

    let ip = parse_ip(address)
        .ok_or_else(|| GeocacheError::invalid_address(format!("not an IP address: {}", address)))?;

    // 不在覆盖范围内不算失败，record 输出为 null
    let line = match snapshot.service().lookup(ip)? {
        LookupOutcome::Found(record) => json!({ "ip": address, "record": record }),
        LookupOutcome::NotFound => json!({ "ip": address, "record": null }),
    };
    Ok(line.to_string())
}
