// Re-exports for common crate
pub mod prelude {
    pub use crate::cache::MemoryCache;
    pub use crate::config::Config;
    pub use crate::error::{MonitorError, MonitorResult};
    pub use crate::types::*;
}

pub mod cache;
pub mod config;
pub mod error;
pub mod logger;
pub mod types;

// Re-exports
pub use cache::MemoryCache;
pub use config::{init_config, Config};
pub use error::{MonitorError, MonitorResult};
pub use types::{
    ClusterOverview,
    DataMode,
    DataOrigin,
    GeoLocation,
    NetworkStats,
    NodeRecord,
    NodeStatus,
    RegionCount,
};
