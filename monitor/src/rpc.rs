// Standard library imports
use std::time::Duration;

// Third party imports
use async_trait::async_trait;
use serde::{de::DeserializeOwned, Deserialize, Serialize};
use serde_json::{json, Value};
use tracing::debug;

// Internal imports
use pnode_common::{MonitorError, MonitorResult};

/// Số đơn vị gốc (lamport) trong một đơn vị hiển thị
pub const LAMPORTS_PER_UNIT: f64 = 1_000_000_000.0;

/// Bản ghi gossip của một node (kết quả `getClusterNodes`)
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClusterNode {
    /// Khóa định danh
    pub pubkey: String,
    /// Địa chỉ gossip `ip:port`
    #[serde(default)]
    pub gossip: Option<String>,
    /// Địa chỉ TPU (cổng xử lý)
    #[serde(default)]
    pub tpu: Option<String>,
    #[serde(default)]
    pub rpc: Option<String>,
    #[serde(default)]
    pub version: Option<String>,
}

impl ClusterNode {
    /// Node có quảng bá cổng xử lý không
    pub fn has_processing_port(&self) -> bool {
        self.tpu.as_deref().map_or(false, |tpu| !tpu.is_empty())
    }

    /// Node có địa chỉ gossip không
    pub fn has_gossip_address(&self) -> bool {
        self.gossip.as_deref().map_or(false, |addr| !addr.is_empty())
    }
}

/// Tài khoản vote / stake của một validator
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VoteAccount {
    /// Khóa định danh của node
    pub node_pubkey: String,
    #[serde(default)]
    pub vote_pubkey: String,
    /// Stake đang kích hoạt (lamport)
    pub activated_stake: u64,
    #[serde(default)]
    pub commission: Option<u8>,
}

/// Kết quả `getVoteAccounts`
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct VoteAccounts {
    #[serde(default)]
    pub current: Vec<VoteAccount>,
    #[serde(default)]
    pub delinquent: Vec<VoteAccount>,
}

/// Tài khoản stake kèm trạng thái delinquent
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StakeRecord {
    pub account: VoteAccount,
    pub delinquent: bool,
}

impl VoteAccounts {
    /// Gộp `current` rồi `delinquent` thành một danh sách
    pub fn into_stake_records(self) -> Vec<StakeRecord> {
        self.current
            .into_iter()
            .map(|account| StakeRecord { account, delinquent: false })
            .chain(
                self.delinquent
                    .into_iter()
                    .map(|account| StakeRecord { account, delinquent: true }),
            )
            .collect()
    }
}

/// Kết quả `getEpochInfo`
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EpochInfo {
    pub epoch: u64,
    pub absolute_slot: u64,
    #[serde(default)]
    pub block_height: Option<u64>,
}

/// Kết quả `getSupply`
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Supply {
    /// Tổng cung (lamport)
    pub total: u64,
    #[serde(default)]
    pub circulating: u64,
}

#[derive(Debug, Deserialize)]
struct ContextWrapped<T> {
    value: T,
}

/// Cổng RPC: các lời gọi pipeline phụ thuộc vào
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait RpcGateway: Send + Sync {
    /// Danh sách node trong gossip
    async fn get_cluster_nodes(&self) -> MonitorResult<Vec<ClusterNode>>;

    /// Danh sách tài khoản vote
    async fn get_vote_accounts(&self) -> MonitorResult<VoteAccounts>;

    /// Thông tin epoch hiện tại
    async fn get_epoch_info(&self) -> MonitorResult<EpochInfo>;

    /// Tổng cung
    async fn get_supply(&self) -> MonitorResult<Supply>;
}

/// Client JSON-RPC qua HTTP
#[derive(Debug, Clone)]
pub struct SolanaRpcClient {
    endpoint: String,
    client: reqwest::Client,
}

impl SolanaRpcClient {
    /// Tạo client mới
    pub fn new(endpoint: impl Into<String>, timeout: Option<Duration>) -> MonitorResult<Self> {
        let mut builder = reqwest::Client::builder();
        if let Some(timeout) = timeout {
            builder = builder.timeout(timeout);
        }
        Ok(Self {
            endpoint: endpoint.into(),
            client: builder.build()?,
        })
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    /// Gửi một request JSON-RPC và giải mã trường `result`
    async fn call<T>(&self, method: &str, params: Vec<Value>) -> MonitorResult<T>
    where
        T: DeserializeOwned,
    {
        let request = json!({
            "jsonrpc": "2.0",
            "id": 1,
            "method": method,
            "params": params,
        });

        debug!("RPC call {} -> {}", method, self.endpoint);

        let response = self
            .client
            .post(&self.endpoint)
            .json(&request)
            .send()
            .await
            .map_err(|e| MonitorError::rpc_error(format!("{} transport failure: {}", method, e)))?;

        if !response.status().is_success() {
            return Err(MonitorError::rpc_error(format!(
                "{} failed with status: {}",
                method,
                response.status()
            )));
        }

        let body: Value = response.json().await?;
        decode_rpc_result(method, body)
    }
}

/// Tách `result` / `error` khỏi phản hồi JSON-RPC
fn decode_rpc_result<T: DeserializeOwned>(method: &str, mut body: Value) -> MonitorResult<T> {
    if let Some(error) = body.get("error") {
        return Err(MonitorError::rpc_error(format!("{} returned error: {}", method, error)));
    }

    match body.get_mut("result") {
        Some(result) => serde_json::from_value(result.take()).map_err(|e| {
            MonitorError::invalid_response(format!("{} result could not be decoded: {}", method, e))
        }),
        None => Err(MonitorError::invalid_response(format!(
            "{} response has no result",
            method
        ))),
    }
}

#[async_trait]
impl RpcGateway for SolanaRpcClient {
    async fn get_cluster_nodes(&self) -> MonitorResult<Vec<ClusterNode>> {
        self.call("getClusterNodes", vec![]).await
    }

    async fn get_vote_accounts(&self) -> MonitorResult<VoteAccounts> {
        self.call("getVoteAccounts", vec![]).await
    }

    async fn get_epoch_info(&self) -> MonitorResult<EpochInfo> {
        self.call("getEpochInfo", vec![]).await
    }

    async fn get_supply(&self) -> MonitorResult<Supply> {
        let wrapped: ContextWrapped<Supply> = self.call("getSupply", vec![]).await?;
        Ok(wrapped.value)
    }
}
