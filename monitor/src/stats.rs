// Internal imports
use pnode_common::{NetworkStats, NodeRecord, NodeStatus, RegionCount};

/// Giá trị khi không có vùng nào có node Active
pub const NO_REGION: &str = "N/A";

fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

/// Đếm theo vùng, giữ thứ tự xuất hiện đầu tiên
pub fn region_distribution(nodes: &[NodeRecord]) -> Vec<RegionCount> {
    let mut counts: Vec<RegionCount> = Vec::new();
    for node in nodes {
        let active = usize::from(node.status == NodeStatus::Active);
        match counts.iter_mut().find(|entry| entry.region == node.region) {
            Some(entry) => {
                entry.count += 1;
                entry.active += active;
            }
            None => counts.push(RegionCount {
                region: node.region.clone(),
                count: 1,
                active,
            }),
        }
    }
    counts
}

/// Vùng có nhiều node Active nhất; vùng xuất hiện trước thắng khi bằng nhau
fn most_active_region(nodes: &[NodeRecord]) -> String {
    let mut best: Option<&RegionCount> = None;
    let distribution = region_distribution(nodes);
    for entry in distribution.iter().filter(|entry| entry.active > 0) {
        if best.map_or(true, |b| entry.active > b.active) {
            best = Some(entry);
        }
    }
    best.map_or_else(|| NO_REGION.to_string(), |entry| entry.region.clone())
}

/// Tính thống kê mạng từ toàn bộ tập node
pub fn calculate_network_stats(nodes: &[NodeRecord]) -> NetworkStats {
    let total = nodes.len();
    let count = |status: NodeStatus| nodes.iter().filter(|n| n.status == status).count();
    let active_nodes = count(NodeStatus::Active);
    let gossip_nodes = count(NodeStatus::Gossip);
    let offline_nodes = count(NodeStatus::Offline);
    let total_stake = nodes.iter().map(NodeRecord::stake_or_zero).sum();

    if total == 0 {
        return NetworkStats {
            total_nodes: 0,
            active_nodes: 0,
            gossip_nodes: 0,
            offline_nodes: 0,
            average_uptime: 0.0,
            network_health_score: 0,
            most_active_region: NO_REGION.to_string(),
            total_stake,
        };
    }

    let n = total as f64;
    let average_uptime = nodes.iter().map(|node| node.uptime_ratio).sum::<f64>() / n;
    let health = (active_nodes as f64 / n * 50.0)
        + (average_uptime / 100.0 * 30.0)
        + ((100.0 - offline_nodes as f64 / n * 100.0) * 0.2);

    NetworkStats {
        total_nodes: total,
        active_nodes,
        gossip_nodes,
        offline_nodes,
        average_uptime: round2(average_uptime),
        network_health_score: health.round().clamp(0.0, 100.0) as u32,
        most_active_region: most_active_region(nodes),
        total_stake,
    }
}
