// Standard library imports
use std::cmp::Ordering;

// Third party imports
use serde::{Deserialize, Serialize};

// Internal imports
use pnode_common::NodeRecord;

/// Số dòng mỗi trang mặc định
pub const DEFAULT_PAGE_SIZE: usize = 10;

/// Các cột có thể sắp xếp
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SortKey {
    Rank,
    Status,
    ReputationScore,
    Uptime,
    Region,
    Stake,
}

impl Default for SortKey {
    fn default() -> Self {
        Self::Rank
    }
}

impl SortKey {
    /// Bộ so sánh tăng dần của từng cột
    fn compare(&self, a: &NodeRecord, b: &NodeRecord) -> Ordering {
        match self {
            Self::Rank => a.rank.cmp(&b.rank),
            Self::Status => a.status.as_str().cmp(b.status.as_str()),
            Self::ReputationScore => a.reputation_score.cmp(&b.reputation_score),
            Self::Uptime => a.uptime_ratio.total_cmp(&b.uptime_ratio),
            Self::Region => a.region.cmp(&b.region),
            Self::Stake => a.stake_or_zero().total_cmp(&b.stake_or_zero()),
        }
    }
}

/// Chiều sắp xếp
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortDirection {
    Asc,
    Desc,
}

impl Default for SortDirection {
    fn default() -> Self {
        Self::Asc
    }
}

/// Trạng thái sắp xếp của bảng
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct SortState {
    pub key: SortKey,
    pub direction: SortDirection,
}

impl SortState {
    /// Bấm vào tiêu đề cột: cùng cột thì đảo chiều, cột mới bắt đầu giảm dần
    pub fn toggle(self, key: SortKey) -> Self {
        if self.key == key {
            let direction = match self.direction {
                SortDirection::Asc => SortDirection::Desc,
                SortDirection::Desc => SortDirection::Asc,
            };
            Self { key, direction }
        } else {
            Self {
                key,
                direction: SortDirection::Desc,
            }
        }
    }
}

/// Truy vấn bảng node
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct NodeQuery {
    pub search: Option<String>,
    pub sort: SortKey,
    pub direction: SortDirection,
    /// Trang, bắt đầu từ 1
    pub page: usize,
    pub page_size: usize,
}

impl Default for NodeQuery {
    fn default() -> Self {
        Self {
            search: None,
            sort: SortKey::default(),
            direction: SortDirection::default(),
            page: 1,
            page_size: DEFAULT_PAGE_SIZE,
        }
    }
}

/// Một trang kết quả
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NodePage {
    pub items: Vec<NodeRecord>,
    /// Số node khớp bộ lọc
    pub total: usize,
    pub page: usize,
    pub page_size: usize,
    pub total_pages: usize,
}

/// Lọc theo định danh (không phân biệt hoa thường) hoặc địa chỉ
pub fn matches_search(node: &NodeRecord, query: &str) -> bool {
    let needle = query.to_lowercase();
    node.identity.to_lowercase().contains(&needle) || node.network_address.contains(query)
}

pub fn sort_nodes(nodes: &mut [NodeRecord], key: SortKey, direction: SortDirection) {
    nodes.sort_by(|a, b| match direction {
        SortDirection::Asc => key.compare(a, b),
        SortDirection::Desc => key.compare(b, a),
    });
}

/// Lọc, sắp xếp và phân trang
pub fn query_nodes(nodes: &[NodeRecord], query: &NodeQuery) -> NodePage {
    let search = query.search.as_deref().map(str::trim).filter(|s| !s.is_empty());
    let mut filtered: Vec<NodeRecord> = match search {
        Some(needle) => nodes.iter().filter(|n| matches_search(n, needle)).cloned().collect(),
        None => nodes.to_vec(),
    };
    sort_nodes(&mut filtered, query.sort, query.direction);

    let page_size = query.page_size.max(1);
    let total = filtered.len();
    let total_pages = total.div_ceil(page_size).max(1);
    let page = query.page.clamp(1, total_pages);

    let items = filtered
        .into_iter()
        .skip((page - 1).saturating_mul(page_size))
        .take(page_size)
        .collect();

    NodePage {
        items,
        total,
        page,
        page_size,
        total_pages,
    }
}
