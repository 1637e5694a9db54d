// Standard library imports
use std::sync::Arc;

// Third party imports
use futures::future::join_all;
use tracing::{debug, info, warn};

// Internal imports
use crate::geo::GeoResolver;
use crate::normalizer::{lamports_to_units, normalize_node};
use crate::ranker::rank_nodes;
use crate::rpc::RpcGateway;
use pnode_common::{config::DEFAULT_MAX_NODES, ClusterOverview, MonitorResult, NodeRecord};

/// Pipeline thu thập dữ liệu node thật.
///
/// Trả lỗi có kiểu khi nguồn gossip không khả dụng; việc thay thế bằng dữ liệu
/// tổng hợp là trách nhiệm của scheduler.
#[derive(Clone)]
pub struct NodePipeline {
    gateway: Arc<dyn RpcGateway>,
    geo: GeoResolver,
    max_nodes: usize,
}

impl NodePipeline {
    pub fn new(gateway: Arc<dyn RpcGateway>, geo: GeoResolver) -> Self {
        Self {
            gateway,
            geo,
            max_nodes: DEFAULT_MAX_NODES,
        }
    }

    /// Giới hạn số node gossip đưa vào chuẩn hóa
    pub fn with_max_nodes(mut self, max_nodes: usize) -> Self {
        self.max_nodes = max_nodes.max(1);
        self
    }

    pub fn geo(&self) -> &GeoResolver {
        &self.geo
    }

    /// Lấy, chuẩn hóa và xếp hạng tập node
    pub async fn acquire(&self) -> MonitorResult<Vec<NodeRecord>> {
        let cluster_nodes = self.gateway.get_cluster_nodes().await?;
        let gossip_nodes: Vec<_> = cluster_nodes
            .into_iter()
            .filter(|node| node.has_gossip_address())
            .collect();
        info!("Found {} nodes in gossip", gossip_nodes.len());

        // Thiếu thông tin stake không làm hỏng cả lần làm mới
        let stakes = match self.gateway.get_vote_accounts().await {
            Ok(accounts) => accounts.into_stake_records(),
            Err(e) => {
                warn!("Vote accounts fetch failed, stake info will be missing: {}", e);
                Vec::new()
            }
        };

        let selected = &gossip_nodes[..gossip_nodes.len().min(self.max_nodes)];
        debug!("Normalizing {} nodes against {} stake records", selected.len(), stakes.len());

        // join_all giữ thứ tự gossip trước khi xếp hạng
        let normalized = join_all(
            selected
                .iter()
                .map(|node| normalize_node(node, &stakes, &self.geo)),
        )
        .await;

        Ok(rank_nodes(&normalized))
    }

    /// Tổng quan cluster; lỗi trả về giá trị rỗng
    pub async fn cluster_overview(&self) -> ClusterOverview {
        let epoch = match self.gateway.get_epoch_info().await {
            Ok(info) => info,
            Err(e) => {
                warn!("Failed to fetch epoch info: {}", e);
                return ClusterOverview::default();
            }
        };
        let supply = match self.gateway.get_supply().await {
            Ok(supply) => supply,
            Err(e) => {
                warn!("Failed to fetch supply: {}", e);
                return ClusterOverview::default();
            }
        };

        ClusterOverview {
            epoch: epoch.epoch,
            slot_height: epoch.absolute_slot,
            active_stake: lamports_to_units(supply.total),
        }
    }
}
