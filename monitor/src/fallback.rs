// Third party imports
use chrono::{Duration, Utc};
use rand::{seq::SliceRandom, Rng};

// Internal imports
use crate::ranker::assign_sequential_ranks;
use pnode_common::{NodeRecord, NodeStatus};

/// Số node tổng hợp luôn được sinh ra
pub const MOCK_NODE_COUNT: usize = 50;

/// Các vùng cố định và danh sách quốc gia của từng vùng
pub const REGIONS: [(&str, &[&str]); 6] = [
    ("NA-East", &["US", "CA"]),
    ("NA-West", &["US", "CA", "MX"]),
    ("EU-Central", &["DE", "NL", "PL", "CZ"]),
    ("EU-West", &["GB", "FR", "IE", "ES"]),
    ("APAC-Tokyo", &["JP", "KR"]),
    ("APAC-Singapore", &["SG", "AU", "IN"]),
];

pub const VERSIONS: [&str; 5] = ["v1.2.4", "v1.2.3", "v1.2.2", "v1.2.1", "v1.1.9"];

const HASH_CHARS: &[u8] = b"abcdefghijklmnopqrstuvwxyzABCDEFGHIJKLMNOPQRSTUVWXYZ0123456789";
const HASH_LEN: usize = 44;

fn generate_hash<R: Rng + ?Sized>(rng: &mut R) -> String {
    let mut hash = String::with_capacity(HASH_LEN + 2);
    hash.push_str("Qm");
    for _ in 0..HASH_LEN {
        hash.push(HASH_CHARS[rng.gen_range(0..HASH_CHARS.len())] as char);
    }
    hash
}

fn generate_ip<R: Rng + ?Sized>(rng: &mut R) -> String {
    format!(
        "{}.{}.{}.{}",
        rng.gen_range(10..210),
        rng.gen_range(0..255),
        rng.gen_range(0..255),
        rng.gen_range(0..255)
    )
}

/// Active 75%, Gossip 17%, Offline 8%
fn random_status<R: Rng + ?Sized>(rng: &mut R) -> NodeStatus {
    let roll: f64 = rng.gen();
    if roll < 0.75 {
        NodeStatus::Active
    } else if roll < 0.92 {
        NodeStatus::Gossip
    } else {
        NodeStatus::Offline
    }
}

fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

/// Sinh một node tổng hợp (chưa xếp hạng)
pub fn generate_node<R: Rng + ?Sized>(rng: &mut R) -> NodeRecord {
    let (region, countries) = REGIONS[rng.gen_range(0..REGIONS.len())];
    let status = random_status(rng);

    let (base_uptime, base_reputation) = match status {
        NodeStatus::Active => (95.0, 70),
        NodeStatus::Gossip => (80.0, 50),
        NodeStatus::Offline => (40.0, 20),
    };
    let last_seen_hours = match status {
        NodeStatus::Active => 0,
        NodeStatus::Gossip => rng.gen_range(0..2),
        NodeStatus::Offline => rng.gen_range(2..26),
    };

    NodeRecord {
        identity: generate_hash(rng),
        display_name: None,
        network_address: generate_ip(rng),
        status,
        uptime_ratio: round2(base_uptime + rng.gen_range(0.0..5.0)).min(100.0),
        region: region.to_string(),
        country_code: countries.choose(rng).copied().unwrap_or("UN").to_string(),
        software_version: VERSIONS.choose(rng).copied().unwrap_or("Unknown").to_string(),
        last_observed_at: Utc::now() - Duration::hours(last_seen_hours),
        reputation_score: base_reputation + rng.gen_range(0..30),
        stake_amount: Some(rng.gen_range(10_000..110_000) as f64),
        rewards_24h: Some(round2(rng.gen_range(5.0..55.0))),
        rank: 0,
    }
}

/// Sinh đúng 50 node tổng hợp, xếp hạng 1..=50 theo thứ tự sinh
pub fn generate_mock_nodes_with<R: Rng + ?Sized>(rng: &mut R) -> Vec<NodeRecord> {
    let mut nodes: Vec<NodeRecord> = (0..MOCK_NODE_COUNT).map(|_| generate_node(rng)).collect();
    assign_sequential_ranks(&mut nodes);
    nodes
}

pub fn generate_mock_nodes() -> Vec<NodeRecord> {
    generate_mock_nodes_with(&mut rand::thread_rng())
}
