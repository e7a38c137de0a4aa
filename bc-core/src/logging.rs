//! Logging Standards and Conventions
//!
//! Validation logs through `tracing` with structured fields.
//!
//! | Level | Usage |
//! |-------|-------|
//! | WARN  | Transaction or block rejected |
//! | INFO  | Block accepted |
//! | DEBUG | Top-level validation calls, failed program verification |
//! | TRACE | Every entry visited, every VM step |
//!
//! ```ignore
//! warn!(
//!     tx_id = %tx_id,
//!     error_code = e.code(),
//!     error = %e,
//!     "transaction rejected"
//! );
//! ```

use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

/// Log level
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    Error,
    Warn,
    #[default]
    Info,
    Debug,
    Trace,
}

impl LogLevel {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Error => "error",
            Self::Warn => "warn",
            Self::Info => "info",
            Self::Debug => "debug",
            Self::Trace => "trace",
        }
    }

    /// Parse from string
    pub fn parse(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "error" => Some(Self::Error),
            "warn" | "warning" => Some(Self::Warn),
            "info" => Some(Self::Info),
            "debug" => Some(Self::Debug),
            "trace" => Some(Self::Trace),
            _ => None,
        }
    }
}

impl From<LogLevel> for tracing::Level {
    fn from(level: LogLevel) -> Self {
        match level {
            LogLevel::Trace => tracing::Level::TRACE,
            LogLevel::Debug => tracing::Level::DEBUG,
            LogLevel::Info => tracing::Level::INFO,
            LogLevel::Warn => tracing::Level::WARN,
            LogLevel::Error => tracing::Level::ERROR,
        }
    }
}

impl std::fmt::Display for LogLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Standard log field names
pub mod fields {
    pub const TX_ID: &str = "tx_id";
    pub const BLOCK_ID: &str = "block_id";
    pub const ENTRY_ID: &str = "entry_id";
    pub const ENTRY_TYPE: &str = "entry_type";
    pub const OPERATION: &str = "operation";
    pub const HEIGHT: &str = "height";
    pub const COUNT: &str = "count";
    pub const ERROR: &str = "error";
    /// Stable code of the root cause
    pub const ERROR_CODE: &str = "error_code";
}

/// Operation names
pub mod operations {
    pub const VALIDATE_TX: &str = "validate_tx";
    pub const VALIDATE_BLOCK: &str = "validate_block";
    pub const CHECK_ENTRY: &str = "check_entry";
    pub const BUILD_TX: &str = "build_tx";
}

/// Log format
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    /// Pretty-printed for development
    #[default]
    Pretty,
    /// JSON for production
    Json,
    /// Compact single-line
    Compact,
}

/// Logging configuration for binaries embedding the validator
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LogConfig {
    pub level: LogLevel,
    pub format: LogFormat,
    /// Include source file/line
    pub include_source: bool,
    pub include_thread_id: bool,
    /// Environment filter string (e.g., "bc_core=debug,bc_vm=trace")
    pub filter: Option<String>,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            level: LogLevel::Info,
            format: LogFormat::Pretty,
            include_source: true,
            include_thread_id: false,
            filter: None,
        }
    }
}

impl LogConfig {
    pub fn production() -> Self {
        Self {
            level: LogLevel::Info,
            format: LogFormat::Json,
            include_source: false,
            include_thread_id: true,
            filter: None,
        }
    }

    pub fn development() -> Self {
        Self {
            level: LogLevel::Debug,
            format: LogFormat::Pretty,
            include_source: true,
            include_thread_id: false,
            filter: None,
        }
    }

    pub fn with_filter(mut self, filter: impl Into<String>) -> Self {
        self.filter = Some(filter.into());
        self
    }

    /// Filter directives; both validation crates at `level` by default
    pub fn directives(&self) -> String {
        match &self.filter {
            Some(f) => f.clone(),
            None => format!("bc_core={level},bc_vm={level}", level = self.level),
        }
    }
}

/// Install a global `fmt` subscriber. Fails if one is already set.
pub fn init_logging(config: &LogConfig) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    let filter = EnvFilter::try_new(config.directives())?;

    match config.format {
        LogFormat::Json => {
            let subscriber = tracing_subscriber::registry().with(filter).with(
                fmt::layer()
                    .json()
                    .with_thread_ids(config.include_thread_id)
                    .with_file(config.include_source)
                    .with_line_number(config.include_source),
            );
            tracing::subscriber::set_global_default(subscriber)?;
        }
        LogFormat::Pretty => {
            let subscriber = tracing_subscriber::registry().with(filter).with(
                fmt::layer()
                    .pretty()
                    .with_thread_ids(config.include_thread_id)
                    .with_file(config.include_source)
                    .with_line_number(config.include_source),
            );
            tracing::subscriber::set_global_default(subscriber)?;
        }
        LogFormat::Compact => {
            let subscriber = tracing_subscriber::registry().with(filter).with(
                fmt::layer()
                    .compact()
                    .with_thread_ids(config.include_thread_id)
                    .with_file(config.include_source)
                    .with_line_number(config.include_source),
            );
            tracing::subscriber::set_global_default(subscriber)?;
        }
    }

    Ok(())
}

/// Structured log event builder
#[derive(Debug, Clone)]
pub struct LogEvent {
    pub level: LogLevel,
    pub message: String,
    pub fields: HashMap<String, serde_json::Value>,
}

impl LogEvent {
    pub fn new(level: LogLevel, message: impl Into<String>) -> Self {
        Self {
            level,
            message: message.into(),
            fields: HashMap::new(),
        }
    }

    pub fn info(message: impl Into<String>) -> Self {
        Self::new(LogLevel::Info, message)
    }

    pub fn warn(message: impl Into<String>) -> Self {
        Self::new(LogLevel::Warn, message)
    }

    pub fn debug(message: impl Into<String>) -> Self {
        Self::new(LogLevel::Debug, message)
    }

    pub fn field<V: Serialize>(mut self, key: &str, value: V) -> Self {
        if let Ok(v) = serde_json::to_value(value) {
            self.fields.insert(key.to_string(), v);
        }
        self
    }

    pub fn emit(&self) {
        match self.level {
            LogLevel::Trace => tracing::trace!(fields = ?self.fields, "{}", self.message),
            LogLevel::Debug => tracing::debug!(fields = ?self.fields, "{}", self.message),
            LogLevel::Info => tracing::info!(fields = ?self.fields, "{}", self.message),
            LogLevel::Warn => tracing::warn!(fields = ?self.fields, "{}", self.message),
            LogLevel::Error => tracing::error!(fields = ?self.fields, "{}", self.message),
        }
    }
}
