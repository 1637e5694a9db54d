// Standard library imports
use std::{env, str::FromStr, sync::Arc, time::Duration};

// Third party imports
use dotenv::dotenv;
use serde::{Deserialize, Serialize};

// Internal imports
use crate::error::{MonitorError, MonitorResult};
use crate::types::DataMode;

/// RPC mặc định (devnet)
pub const DEFAULT_RPC_URL: &str = "https://api.devnet.solana.com";
/// Dịch vụ tra cứu vị trí IP mặc định
pub const DEFAULT_GEO_LOOKUP_URL: &str = "https://ipapi.co";
/// Chu kỳ làm mới (giây)
pub const DEFAULT_REFRESH_INTERVAL_SECS: u64 = 30;
/// Số node tối đa xử lý trong một lần làm mới
pub const DEFAULT_MAX_NODES: usize = 50;

/// Cấu hình dịch vụ giám sát
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Config {
    // RPC
    pub rpc_url: String,
    /// Timeout cho mỗi lời gọi RPC; `None` = không giới hạn
    pub rpc_timeout_secs: Option<u64>,

    // Geo
    pub geo_lookup_url: String,

    // Pipeline
    pub refresh_interval_secs: u64,
    pub max_nodes: usize,
    pub demo_mode: bool,
    /// Độ trễ giả lập ở chế độ demo (ms)
    pub demo_delay_ms: u64,

    // API
    pub api_host: String,
    pub api_port: u16,

    // Logging
    pub log_dir: Option<String>,
}

impl Default for Config {
    fn default() -> Self {
        Self::new()
    }
}

impl Config {
    pub fn new() -> Self {
        Self {
            rpc_url: DEFAULT_RPC_URL.to_string(),
            rpc_timeout_secs: None,
            geo_lookup_url: DEFAULT_GEO_LOOKUP_URL.to_string(),
            refresh_interval_secs: DEFAULT_REFRESH_INTERVAL_SECS,
            max_nodes: DEFAULT_MAX_NODES,
            demo_mode: false,
            demo_delay_ms: 800,
            api_host: "0.0.0.0".to_string(),
            api_port: 8080,
            log_dir: None,
        }
    }

    pub fn from_env() -> MonitorResult<Self> {
        dotenv().ok();

        let defaults = Self::new();
        let config = Config {
            rpc_url: env::var("RPC_URL").unwrap_or(defaults.rpc_url),
            rpc_timeout_secs: env_opt("RPC_TIMEOUT_SECS")?,
            geo_lookup_url: env::var("GEO_LOOKUP_URL").unwrap_or(defaults.geo_lookup_url),
            refresh_interval_secs: env_or("REFRESH_INTERVAL_SECS", defaults.refresh_interval_secs)?,
            max_nodes: env_or("MAX_NODES", defaults.max_nodes)?,
            demo_mode: env_or("DEMO_MODE", defaults.demo_mode)?,
            demo_delay_ms: env_or("DEMO_DELAY_MS", defaults.demo_delay_ms)?,
            api_host: env::var("API_HOST").unwrap_or(defaults.api_host),
            api_port: env_or("API_PORT", defaults.api_port)?,
            log_dir: env::var("LOG_DIR").ok().filter(|dir| !dir.is_empty()),
        };
        config.validate()?;
        Ok(config)
    }

    /// Kiểm tra tính hợp lệ
    pub fn validate(&self) -> MonitorResult<()> {
        if self.refresh_interval_secs == 0 {
            return Err(MonitorError::config_error("REFRESH_INTERVAL_SECS must be greater than 0"));
        }
        if self.max_nodes == 0 {
            return Err(MonitorError::config_error("MAX_NODES must be greater than 0"));
        }
        if self.rpc_url.is_empty() {
            return Err(MonitorError::config_error("RPC_URL must not be empty"));
        }
        Ok(())
    }

    /// Chế độ dữ liệu ban đầu
    pub fn initial_mode(&self) -> DataMode {
        if self.demo_mode {
            DataMode::Demo
        } else {
            DataMode::Live
        }
    }

    pub fn refresh_interval(&self) -> Duration {
        Duration::from_secs(self.refresh_interval_secs)
    }

    pub fn demo_delay(&self) -> Duration {
        Duration::from_millis(self.demo_delay_ms)
    }

    pub fn rpc_timeout(&self) -> Option<Duration> {
        self.rpc_timeout_secs.map(Duration::from_secs)
    }
}

fn env_or<T: FromStr>(key: &str, default: T) -> MonitorResult<T> {
    match env::var(key) {
        Ok(raw) => raw
            .trim()
            .parse()
            .map_err(|_| MonitorError::config_error(format!("invalid value for {}: {}", key, raw))),
        Err(_) => Ok(default),
    }
}

fn env_opt<T: FromStr>(key: &str) -> MonitorResult<Option<T>> {
    match env::var(key) {
        Ok(raw) if !raw.trim().is_empty() => raw
            .trim()
            .parse()
            .map(Some)
            .map_err(|_| MonitorError::config_error(format!("invalid value for {}: {}", key, raw))),
        _ => Ok(None),
    }
}

/// Khởi tạo cấu hình toàn cục.
///
/// Khi biến môi trường không hợp lệ thì dùng mặc định và trả kèm lỗi; việc ghi
/// log lỗi đó thuộc về caller vì lúc này logger có thể chưa được khởi tạo.
pub fn init_config() -> (Arc<Config>, Option<MonitorError>) {
    match Config::from_env() {
        Ok(config) => (Arc::new(config), None),
        Err(e) => (Arc::new(Config::new()), Some(e)),
    }
}
