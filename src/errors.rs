use std::fmt;

use crate::services::geoip::RecordOffset;

#[derive(Debug, Clone)]
pub enum GeocacheError {
    Configuration(String),
    DatabaseOpen(String),
    Build(String),
    InvalidAddress(String),
    Lookup(String),
    Consistency(String),
    FileOperation(String),
}

impl GeocacheError {
    /// 获取错误代码
    pub fn code(&self) -> &'static str {
        match self {
            GeocacheError::Configuration(_) => "E001",
            GeocacheError::DatabaseOpen(_) => "E002",
            GeocacheError::Build(_) => "E003",
            GeocacheError::InvalidAddress(_) => "E004",
            GeocacheError::Lookup(_) => "E005",
            GeocacheError::Consistency(_) => "E006",
            GeocacheError::FileOperation(_) => "E007",
        }
    }

    /// 获取错误类型名称
    pub fn error_type(&self) -> &'static str {
        match self {
            GeocacheError::Configuration(_) => "Configuration Error",
            GeocacheError::DatabaseOpen(_) => "Database Open Error",
            GeocacheError::Build(_) => "Cache Build Error",
            GeocacheError::InvalidAddress(_) => "Invalid Address",
            GeocacheError::Lookup(_) => "Lookup Error",
            GeocacheError::Consistency(_) => "Cache Consistency Error",
            GeocacheError::FileOperation(_) => "File Operation Error",
        }
    }

    /// 获取错误详情
    pub fn message(&self) -> &str {
        match self {
            GeocacheError::Configuration(msg) => msg,
            GeocacheError::DatabaseOpen(msg) => msg,
            GeocacheError::Build(msg) => msg,
            GeocacheError::InvalidAddress(msg) => msg,
            GeocacheError::Lookup(msg) => msg,
            GeocacheError::Consistency(msg) => msg,
            GeocacheError::FileOperation(msg) => msg,
        }
    }

    /// 格式化为彩色输出（用于 Server 模式）
    pub fn format_colored(&self) -> String {
        use colored::Colorize;
        format!(
            "{} {} {}\n  {}",
            "[ERROR]".red().bold(),
            self.code().yellow(),
            self.error_type().red(),
            self.message().white()
        )
    }

    /// 格式化为简洁输出（用于 CLI 模式）
    pub fn format_simple(&self) -> String {
        format!("{}: {}", self.error_type(), self.message())
    }
}

impl fmt::Display for GeocacheError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.format_simple())
    }
}

impl std::error::Error for GeocacheError {}

// 便捷的构造函数
impl GeocacheError {
    pub fn configuration<T: Into<String>>(msg: T) -> Self {
        GeocacheError::Configuration(msg.into())
    }

    pub fn database_open<T: Into<String>>(msg: T) -> Self {
        GeocacheError::DatabaseOpen(msg.into())
    }

    pub fn build<T: Into<String>>(msg: T) -> Self {
        GeocacheError::Build(msg.into())
    }

    pub fn invalid_address<T: Into<String>>(msg: T) -> Self {
        GeocacheError::InvalidAddress(msg.into())
    }

    pub fn lookup<T: Into<String>>(msg: T) -> Self {
        GeocacheError::Lookup(msg.into())
    }

    /// The reader produced an offset that was never seen while building the cache.
    pub fn consistency(offset: RecordOffset) -> Self {
        GeocacheError::Consistency(format!("offset without a record: {}", offset))
    }

    pub fn file_operation<T: Into<String>>(msg: T) -> Self {
        GeocacheError::FileOperation(msg.into())
    }
}

impl From<std::io::Error> for GeocacheError {
    fn from(err: std::io::Error) -> Self {
        GeocacheError::FileOperation(err.to_string())
    }
}

impl From<config::ConfigError> for GeocacheError {
    fn from(err: config::ConfigError) -> Self {
        GeocacheError::Configuration(err.to_string())
    }
}

pub type Result<T> = std::result::Result<T, GeocacheError>;
