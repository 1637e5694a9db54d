// Third party imports
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Vùng mặc định khi không xác định được vị trí
pub const DEFAULT_REGION: &str = "Global";
/// Mã quốc gia mặc định khi không xác định được vị trí
pub const DEFAULT_COUNTRY: &str = "UN";
/// Giá trị thay thế cho địa chỉ / phiên bản không có
pub const UNKNOWN: &str = "Unknown";

/// Trạng thái của một node (suy ra, không phải dữ liệu gốc)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum NodeStatus {
    /// Có cổng xử lý (TPU), đang tham gia xử lý
    Active,
    /// Có mặt trong gossip nhưng không xử lý
    Gossip,
    /// Không hoạt động
    Offline,
}

impl Default for NodeStatus {
    fn default() -> Self {
        Self::Offline
    }
}

impl NodeStatus {
    /// Tên hiển thị
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Active => "Active",
            Self::Gossip => "Gossip",
            Self::Offline => "Offline",
        }
    }
}

/// Vị trí địa lý thô của một IP
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GeoLocation {
    /// Mã vùng
    pub region: String,
    /// Mã quốc gia
    pub country: String,
}

impl GeoLocation {
    /// Tạo vị trí mới
    pub fn new(region: impl Into<String>, country: impl Into<String>) -> Self {
        Self {
            region: region.into(),
            country: country.into(),
        }
    }
}

impl Default for GeoLocation {
    fn default() -> Self {
        Self::new(DEFAULT_REGION, DEFAULT_COUNTRY)
    }
}

/// Một node quan sát được trong mạng
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NodeRecord {
    /// Khóa định danh (pubkey)
    pub identity: String,
    /// Tên hiển thị, chỉ có khi khớp với validator
    pub display_name: Option<String>,
    /// Địa chỉ mạng (IP, có thể kèm port) hoặc "Unknown"
    pub network_address: String,
    /// Trạng thái
    pub status: NodeStatus,
    /// Tỷ lệ uptime (%), trong khoảng [0, 100]
    pub uptime_ratio: f64,
    /// Vùng
    pub region: String,
    /// Mã quốc gia
    pub country_code: String,
    /// Phiên bản phần mềm hoặc "Unknown"
    pub software_version: String,
    /// Thời điểm quan sát gần nhất
    pub last_observed_at: DateTime<Utc>,
    /// Điểm uy tín tổng hợp
    pub reputation_score: u32,
    /// Lượng stake (đơn vị hiển thị)
    pub stake_amount: Option<f64>,
    /// Phần thưởng 24h (chỉ có ở dữ liệu tổng hợp)
    pub rewards_24h: Option<f64>,
    /// Thứ hạng, bắt đầu từ 1; 0 khi chưa xếp hạng
    pub rank: usize,
}

impl NodeRecord {
    /// Stake, coi `None` là 0
    pub fn stake_or_zero(&self) -> f64 {
        self.stake_amount.unwrap_or(0.0)
    }
}

/// Thống kê mạng, luôn tính lại từ toàn bộ tập node
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NetworkStats {
    pub total_nodes: usize,
    pub active_nodes: usize,
    pub gossip_nodes: usize,
    pub offline_nodes: usize,
    pub average_uptime: f64,
    /// Điểm sức khỏe mạng 0-100
    pub network_health_score: u32,
    pub most_active_region: String,
    pub total_stake: f64,
}

/// Phân bố node theo vùng
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RegionCount {
    pub region: String,
    pub count: usize,
    pub active: usize,
}

/// Thông tin tổng quan cluster
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ClusterOverview {
    pub epoch: u64,
    pub slot_height: u64,
    /// Tổng stake (đơn vị hiển thị)
    pub active_stake: f64,
}

/// Chế độ nguồn dữ liệu
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DataMode {
    /// Lấy dữ liệu thật từ RPC
    Live,
    /// Dữ liệu tổng hợp
    Demo,
}

impl Default for DataMode {
    fn default() -> Self {
        Self::Live
    }
}

/// Nguồn gốc của tập node đang hiển thị
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DataOrigin {
    /// Từ pipeline thật
    Live,
    /// Từ chế độ demo
    Demo,
    /// Dữ liệu thay thế khi pipeline thật thất bại
    Fallback,
}
