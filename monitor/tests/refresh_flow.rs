use std::sync::{
    atomic::{AtomicBool, Ordering},
    Arc,
};
use std::time::Duration;

use async_trait::async_trait;
use pnode_common::{DataMode, DataOrigin, GeoLocation, MonitorError, MonitorResult, NodeStatus};
use pnode_monitor::rpc::{ClusterNode, EpochInfo, Supply, VoteAccount, VoteAccounts};
use pnode_monitor::{
    query_nodes, GeoCache, GeoLookup, GeoResolver, NodePipeline, NodeQuery, RefreshOutcome, RefreshScheduler,
    RpcGateway, SchedulerConfig, SortDirection, SortKey,
};

/// Gateway giả: trả về tập node cố định, có thể bật lỗi
struct FakeGateway {
    nodes: Vec<ClusterNode>,
    votes: VoteAccounts,
    failing: AtomicBool,
}

impl FakeGateway {
    fn new(nodes: Vec<ClusterNode>, votes: VoteAccounts) -> Self {
        Self {
            nodes,
            votes,
            failing: AtomicBool::new(false),
        }
    }

    fn set_failing(&self, failing: bool) {
        self.failing.store(failing, Ordering::SeqCst);
    }
}

#[async_trait]
impl RpcGateway for FakeGateway {
    async fn get_cluster_nodes(&self) -> MonitorResult<Vec<ClusterNode>> {
        if self.failing.load(Ordering::SeqCst) {
            return Err(MonitorError::rpc_error("connection refused"));
        }
        Ok(self.nodes.clone())
    }

    async fn get_vote_accounts(&self) -> MonitorResult<VoteAccounts> {
        Ok(self.votes.clone())
    }

    async fn get_epoch_info(&self) -> MonitorResult<EpochInfo> {
        Ok(EpochInfo {
            epoch: 500,
            absolute_slot: 123_456,
            block_height: None,
        })
    }

    async fn get_supply(&self) -> MonitorResult<Supply> {
        Ok(Supply {
            total: 1_000_000_000_000,
            circulating: 0,
        })
    }
}

struct FixedGeo;

#[async_trait]
impl GeoLookup for FixedGeo {
    async fn lookup(&self, ip: &str) -> MonitorResult<GeoLocation> {
        if ip.starts_with("9.") {
            return Err(MonitorError::geo_error("rate limited"));
        }
        Ok(GeoLocation::new("CA", "US"))
    }
}

fn node(pubkey: &str, gossip: &str, tpu: Option<&str>, version: Option<&str>) -> ClusterNode {
    ClusterNode {
        pubkey: pubkey.to_string(),
        gossip: Some(gossip.to_string()),
        tpu: tpu.map(str::to_string),
        rpc: None,
        version: version.map(str::to_string),
    }
}

fn vote(pubkey: &str, lamports: u64) -> VoteAccount {
    VoteAccount {
        node_pubkey: pubkey.to_string(),
        vote_pubkey: format!("vote-{}", pubkey),
        activated_stake: lamports,
        commission: None,
    }
}

fn scheduler(gateway: Arc<FakeGateway>) -> RefreshScheduler {
    let geo = GeoResolver::new(Arc::new(FixedGeo), Arc::new(GeoCache::new()));
    let config = SchedulerConfig {
        refresh_interval: Duration::from_secs(3600),
        demo_delay: Duration::ZERO,
        initial_mode: DataMode::Live,
    };
    RefreshScheduler::new(NodePipeline::new(gateway, geo), config)
}

fn sample_gateway() -> FakeGateway {
    FakeGateway::new(
        vec![
            node("A", "1.2.3.4", Some("1.2.3.4:1234"), Some("v1")),
            node("B", "5.6.7.8:8001", Some("5.6.7.8:8003"), Some("1.18.0")),
            node("C", "9.9.9.9:8001", None, None),
        ],
        VoteAccounts {
            current: vec![vote("B", 5_000_000_000)],
            delinquent: vec![],
        },
    )
}

#[tokio::test]
async fn live_refresh_produces_ranked_normalized_nodes() {
    let scheduler = scheduler(Arc::new(sample_gateway()));
    let outcome = scheduler.refresh().await;
    assert_eq!(outcome, RefreshOutcome::Applied { generation: 1, origin: DataOrigin::Live });

    let snapshot = scheduler.snapshot().await;
    let ids: Vec<&str> = snapshot.nodes.iter().map(|n| n.identity.as_str()).collect();
    assert_eq!(ids, vec!["B", "A", "C"]);
    assert_eq!(snapshot.nodes.iter().map(|n| n.rank).collect::<Vec<_>>(), vec![1, 2, 3]);

    // Node có stake
    let b = &snapshot.nodes[0];
    assert_eq!(b.stake_amount, Some(5.0));
    assert_eq!(b.reputation_score, 100);
    assert_eq!(b.display_name.as_deref(), Some("Validator B"));
    assert!(b.uptime_ratio >= 99.0 && b.uptime_ratio < 100.0);

    // Node không có stake
    let a = &snapshot.nodes[1];
    assert_eq!(a.status, NodeStatus::Active);
    assert_eq!(a.reputation_score, 60);
    assert_eq!(a.stake_amount, Some(0.0));
    assert_eq!(a.uptime_ratio, 0.0);
    assert_eq!(a.region, "CA");

    // Lỗi geo bị hạ cấp thành vị trí mặc định
    let c = &snapshot.nodes[2];
    assert_eq!(c.status, NodeStatus::Gossip);
    assert_eq!(c.reputation_score, 20);
    assert_eq!(c.region, "Global");
    assert_eq!(c.country_code, "UN");
    assert_eq!(c.software_version, "Unknown");

    assert_eq!(snapshot.cluster.epoch, 500);
    assert_eq!(snapshot.cluster.active_stake, 1000.0);
    assert_eq!(snapshot.stats.total_nodes, 3);
    assert_eq!(snapshot.stats.active_nodes, 2);
    assert_eq!(snapshot.stats.total_stake, 5.0);
    assert!(!snapshot.loading);
}

#[tokio::test]
async fn gossip_failure_switches_to_fallback_and_recovers() {
    let gateway = Arc::new(sample_gateway());
    let scheduler = scheduler(Arc::clone(&gateway));

    gateway.set_failing(true);
    let outcome = scheduler.refresh().await;
    assert_eq!(outcome, RefreshOutcome::Applied { generation: 1, origin: DataOrigin::Fallback });

    let snapshot = scheduler.snapshot().await;
    assert_eq!(snapshot.nodes.len(), 50);
    let mut ranks: Vec<usize> = snapshot.nodes.iter().map(|n| n.rank).collect();
    ranks.sort_unstable();
    assert_eq!(ranks, (1..=50).collect::<Vec<_>>());
    assert!(snapshot.nodes.iter().all(|n| (0.0..=100.0).contains(&n.uptime_ratio)));

    gateway.set_failing(false);
    scheduler.refresh().await;
    let snapshot = scheduler.snapshot().await;
    assert_eq!(snapshot.origin, Some(DataOrigin::Live));
    assert_eq!(snapshot.nodes.len(), 3);
    assert_eq!(snapshot.generation, 2);
}

#[tokio::test]
async fn demo_mode_and_table_query() {
    let scheduler = scheduler(Arc::new(sample_gateway()));
    let outcome = scheduler.set_mode(DataMode::Demo).await;
    assert!(matches!(outcome, Some(RefreshOutcome::Applied { origin: DataOrigin::Demo, .. })));
    assert!(scheduler.set_mode(DataMode::Demo).await.is_none());

    let snapshot = scheduler.snapshot().await;
    let query = NodeQuery {
        sort: SortKey::Stake,
        direction: SortDirection::Desc,
        page_size: 50,
        ..NodeQuery::default()
    };
    let page = query_nodes(&snapshot.nodes, &query);
    assert_eq!(page.total, 50);
    assert!(page
        .items
        .windows(2)
        .all(|pair| pair[0].stake_or_zero() >= pair[1].stake_or_zero()));
}
