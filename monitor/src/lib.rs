//! Theo dõi các storage node tham gia gossip của một cluster Solana.
//!
//! Luồng dữ liệu: `rpc` -> `normalizer` (kèm `geo`) -> `ranker` -> `stats`,
//! được điều phối bởi `scheduler`; khi nguồn thật lỗi thì dùng `fallback`.

pub mod api;
pub mod fallback;
pub mod geo;
pub mod normalizer;
pub mod pipeline;
pub mod ranker;
pub mod rpc;
pub mod scheduler;
pub mod stats;
pub mod table;

// Re-exports
pub use api::{create_router, serve, ApiResponse, AppState};
pub use fallback::generate_mock_nodes;
pub use geo::{clean_ip, GeoCache, GeoLookup, GeoResolver, IpApiLookup};
pub use normalizer::normalize_node;
pub use pipeline::NodePipeline;
pub use ranker::rank_nodes;
pub use rpc::{RpcGateway, SolanaRpcClient};
pub use scheduler::{DashboardSnapshot, RefreshOutcome, RefreshScheduler, SchedulerConfig};
pub use stats::{calculate_network_stats, region_distribution};
pub use table::{query_nodes, NodePage, NodeQuery, SortDirection, SortKey, SortState};
