use std::path::Path;

use serde::{Deserialize, Serialize};

use super::args::Cli;
use crate::errors::{GeocacheError, Result};

/// 未指定 `--config` 时尝试加载的配置文件（可不存在）
pub const DEFAULT_CONFIG_FILE: &str = "geocache.toml";

/// 环境变量前缀，例如 `GEOCACHE__SERVER__ADDR=:9090`
pub const ENV_PREFIX: &str = "GEOCACHE";

/// 静态配置（启动时加载）
///
/// - server: 监听地址、压缩、worker 数量、可信代理
/// - database: GeoIP 数据库路径
/// - logging: 日志配置
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct StaticConfig {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub database: DatabaseConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl StaticConfig {
    /// 从 TOML 文件和环境变量加载配置
    ///
    /// 优先级：ENV > 配置文件 > 默认值
    /// 显式指定的配置文件必须存在；默认配置文件可以不存在。
    pub fn load(path: Option<&Path>) -> Result<Self> {
        use config::{Config, Environment, File};

        let (path, required) = match path {
            Some(path) => (path, true),
            None => (Path::new(DEFAULT_CONFIG_FILE), false),
        };

        let settings = Config::builder()
            .add_source(File::from(path).required(required))
            .add_source(
                Environment::with_prefix(ENV_PREFIX)
                    .separator("__")
                    .list_separator(",")
                    .with_list_parse_key("server.trusted_proxies")
                    .try_parsing(true),
            )
            .build()?;

        let config: StaticConfig = settings.try_deserialize()?;
        if path.exists() {
            eprintln!("[INFO] Configuration loaded from: {}", path.display());
        }
        Ok(config)
    }

    /// 命令行参数覆盖配置文件与环境变量
    pub fn apply_cli(&mut self, cli: &Cli) {
        if let Some(ref addr) = cli.addr {
            self.server.addr = addr.clone();
        }
        if cli.compress {
            self.server.compress = true;
        }
        if let Some(ref db_file) = cli.db_file {
            self.database.path = db_file.clone();
        }
        if let Some(ref level) = cli.log_level {
            self.logging.level = level.clone();
        }
    }

    pub fn validate(&self) -> Result<()> {
        if self.database.path.trim().is_empty() {
            return Err(GeocacheError::configuration("database.path must not be empty"));
        }
        self.server.bind_address()?;
        if !matches!(self.logging.format.as_str(), "text" | "json") {
            return Err(GeocacheError::configuration(format!(
                "Invalid logging.format '{}'. Valid: text, json",
                self.logging.format
            )));
        }
        Ok(())
    }

    /// 生成示例 TOML 配置文件
    pub fn generate_sample_config() -> String {
        toml::to_string_pretty(&Self::default())
            .unwrap_or_else(|e| format!("Error generating sample config: {}", e))
    }
}

/// 服务器配置
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    /// TCP 监听地址，`:8080` 表示所有网卡
    #[serde(default = "default_server_addr")]
    pub addr: String,
    /// 是否启用透明响应压缩（gzip / brotli）
    #[serde(default)]
    pub compress: bool,
    #[serde(default = "default_workers")]
    pub workers: usize,
    /// 允许通过 X-Forwarded-For / X-Real-IP 传递客户端地址的代理（IP 或 CIDR）
    #[serde(default)]
    pub trusted_proxies: Vec<String>,
}

impl ServerConfig {
    /// 实际绑定的地址：`:port` 补全为 `0.0.0.0:port`
    pub fn bind_address(&self) -> Result<String> {
        let addr = self.addr.trim();
        let normalized = if addr.starts_with(':') {
            format!("0.0.0.0{}", addr)
        } else {
            addr.to_string()
        };

        let port_ok = normalized
            .rsplit_once(':')
            .is_some_and(|(host, port)| !host.is_empty() && port.parse::<u16>().is_ok());
        if !port_ok {
            return Err(GeocacheError::configuration(format!(
                "Invalid listen address '{}', expected host:port or :port",
                self.addr
            )));
        }
        Ok(normalized)
    }
}

/// GeoIP 数据库配置
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatabaseConfig {
    #[serde(default = "default_database_path")]
    pub path: String,
}

/// 日志配置
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    #[serde(default = "default_log_level")]
    pub level: String,
    #[serde(default = "default_log_format")]
    pub format: String,
    #[serde(default)]
    pub file: Option<String>,
    #[serde(default = "default_max_backups")]
    pub max_backups: u32,
    #[serde(default = "default_enable_rotation")]
    pub enable_rotation: bool,
}

// ============================================================
// Default value functions
// ============================================================

fn default_server_addr() -> String {
    ":8080".to_string()
}

fn default_workers() -> usize {
    num_cpus::get()
}

fn default_database_path() -> String {
    "/usr/local/share/GeoIP/GeoLite2-City.mmdb".to_string()
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_log_format() -> String {
    "text".to_string()
}

fn default_max_backups() -> u32 {
    5
}

fn default_enable_rotation() -> bool {
    true
}

// ============================================================
// Default implementations
// ============================================================

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            addr: default_server_addr(),
            compress: false,
            workers: default_workers(),
            trusted_proxies: Vec::new(),
        }
    }
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            path: default_database_path(),
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: default_log_format(),
            file: None,
            max_backups: default_max_backups(),
            enable_rotation: default_enable_rotation(),
        }
    }
}
