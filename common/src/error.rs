// Third party imports
use thiserror::Error;

/// Lỗi chung của pipeline giám sát pNode
#[derive(Debug, Error)]
pub enum MonitorError {
    /// Lỗi gọi RPC (lỗi mạng hoặc đối tượng `error` của JSON-RPC)
    #[error("RPC error: {0}")]
    Rpc(String),

    /// Phản hồi không đúng định dạng
    #[error("Invalid response: {0}")]
    InvalidResponse(String),

    /// Lỗi tra cứu vị trí địa lý
    #[error("Geo lookup error: {0}")]
    GeoLookup(String),

    /// Lỗi HTTP
    #[error("HTTP error: {0}")]
    Http(String),

    /// Lỗi cấu hình
    #[error("Config error: {0}")]
    Config(String),

    /// Lỗi serialization
    #[error("Serialization error: {0}")]
    Serialization(String),
}

impl MonitorError {
    /// Tạo lỗi RPC
    pub fn rpc_error<T: ToString>(msg: T) -> Self {
        Self::Rpc(msg.to_string())
    }

    /// Tạo lỗi phản hồi không hợp lệ
    pub fn invalid_response<T: ToString>(msg: T) -> Self {
        Self::InvalidResponse(msg.to_string())
    }

    /// Tạo lỗi tra cứu địa lý
    pub fn geo_error<T: ToString>(msg: T) -> Self {
        Self::GeoLookup(msg.to_string())
    }

    /// Tạo lỗi cấu hình
    pub fn config_error<T: ToString>(msg: T) -> Self {
        Self::Config(msg.to_string())
    }
}

impl From<reqwest::Error> for MonitorError {
    fn from(err: reqwest::Error) -> Self {
        Self::Http(err.to_string())
    }
}

impl From<serde_json::Error> for MonitorError {
    fn from(err: serde_json::Error) -> Self {
        Self::Serialization(err.to_string())
    }
}

/// Kiểu kết quả chung
pub type MonitorResult<T> = Result<T, MonitorError>;
