// Standard library imports
use std::{
    sync::{
        atomic::{AtomicU64, AtomicUsize, Ordering},
        Arc, Mutex,
    },
    time::Duration,
};

// Third party imports
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tokio::{sync::RwLock, task::JoinHandle, time::MissedTickBehavior};
use tracing::{debug, info, warn};

// Internal imports
use crate::fallback::generate_mock_nodes;
use crate::pipeline::NodePipeline;
use crate::stats::calculate_network_stats;
use pnode_common::{ClusterOverview, Config, DataMode, DataOrigin, NetworkStats, NodeRecord};

/// Cấu hình scheduler
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SchedulerConfig {
    /// Chu kỳ làm mới
    pub refresh_interval: Duration,
    /// Độ trễ giả lập ở chế độ demo
    pub demo_delay: Duration,
    /// Chế độ ban đầu
    pub initial_mode: DataMode,
}

impl Default for SchedulerConfig {
    fn default() -> Self {
        Self {
            refresh_interval: Duration::from_secs(30),
            demo_delay: Duration::from_millis(800),
            initial_mode: DataMode::Live,
        }
    }
}

impl From<&Config> for SchedulerConfig {
    fn from(config: &Config) -> Self {
        Self {
            refresh_interval: config.refresh_interval(),
            demo_delay: config.demo_delay(),
            initial_mode: config.initial_mode(),
        }
    }
}

/// Dữ liệu scheduler cung cấp cho tầng hiển thị
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DashboardSnapshot {
    pub nodes: Vec<NodeRecord>,
    pub stats: NetworkStats,
    pub loading: bool,
    pub last_refreshed_at: Option<DateTime<Utc>>,
    pub mode: DataMode,
    /// `None` trước lần làm mới đầu tiên
    pub origin: Option<DataOrigin>,
    pub cluster: ClusterOverview,
    /// Thế hệ của kết quả đang hiển thị
    pub generation: u64,
}

/// Kết quả của một lần làm mới
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RefreshOutcome {
    /// Kết quả đã được áp dụng
    Applied { generation: u64, origin: DataOrigin },
    /// Có lần làm mới mới hơn, kết quả bị bỏ
    Discarded { generation: u64 },
}

#[derive(Debug, Default)]
struct SchedulerState {
    nodes: Vec<NodeRecord>,
    loading: bool,
    last_refreshed_at: Option<DateTime<Utc>>,
    mode: DataMode,
    origin: Option<DataOrigin>,
    cluster: ClusterOverview,
    applied_generation: u64,
}

/// Scheduler làm mới dữ liệu.
///
/// Hai trạng thái: `Idle` và `Loading`. Lỗi của pipeline không bao giờ được trả
/// ra ngoài: scheduler thay bằng dữ liệu tổng hợp và ghi log lý do.
pub struct RefreshScheduler {
    pipeline: NodePipeline,
    config: SchedulerConfig,
    state: RwLock<SchedulerState>,
    generation: AtomicU64,
    in_flight: AtomicUsize,
    task: Mutex<Option<JoinHandle<()>>>,
}

/// Giảm bộ đếm khi lần làm mới kết thúc hoặc bị hủy
struct InFlightGuard<'a>(&'a AtomicUsize);

impl Drop for InFlightGuard<'_> {
    fn drop(&mut self) {
        self.0.fetch_sub(1, Ordering::SeqCst);
    }
}

impl RefreshScheduler {
    pub fn new(pipeline: NodePipeline, config: SchedulerConfig) -> Self {
        // Chưa có dữ liệu: Loading cho tới lần làm mới đầu tiên
        let state = SchedulerState {
            mode: config.initial_mode,
            loading: true,
            ..SchedulerState::default()
        };
        Self {
            pipeline,
            config,
            state: RwLock::new(state),
            generation: AtomicU64::new(0),
            in_flight: AtomicUsize::new(0),
            task: Mutex::new(None),
        }
    }

    /// Thế hệ mới nhất đã phát ra
    pub fn latest_generation(&self) -> u64 {
        self.generation.load(Ordering::SeqCst)
    }

    /// Số lần làm mới đang chạy
    pub fn in_flight(&self) -> usize {
        self.in_flight.load(Ordering::SeqCst)
    }

    pub async fn mode(&self) -> DataMode {
        self.state.read().await.mode
    }

    /// Chạy pipeline một lần (Idle -> Loading -> Idle)
    pub async fn refresh(&self) -> RefreshOutcome {
        self.in_flight.fetch_add(1, Ordering::SeqCst);
        let _in_flight = InFlightGuard(&self.in_flight);
        let generation = self.generation.fetch_add(1, Ordering::SeqCst) + 1;
        let mode = {
            let mut state = self.state.write().await;
            state.loading = true;
            state.mode
        };
        debug!("Refresh generation {} started ({:?})", generation, mode);

        let (nodes, origin, cluster) = self.run(mode).await;

        let mut state = self.state.write().await;
        if generation != self.latest_generation() {
            debug!(
                "Discarding stale refresh generation {} (latest {})",
                generation,
                self.latest_generation()
            );
            return RefreshOutcome::Discarded { generation };
        }

        info!("Refresh generation {} applied: {} nodes from {:?}", generation, nodes.len(), origin);
        state.nodes = nodes;
        state.origin = Some(origin);
        state.cluster = cluster;
        state.applied_generation = generation;
        state.last_refreshed_at = Some(Utc::now());
        state.loading = false;

        RefreshOutcome::Applied { generation, origin }
    }

    async fn run(&self, mode: DataMode) -> (Vec<NodeRecord>, DataOrigin, ClusterOverview) {
        match mode {
            DataMode::Demo => {
                if !self.config.demo_delay.is_zero() {
                    tokio::time::sleep(self.config.demo_delay).await;
                }
                (generate_mock_nodes(), DataOrigin::Demo, ClusterOverview::default())
            }
            DataMode::Live => match self.pipeline.acquire().await {
                Ok(nodes) => {
                    let cluster = self.pipeline.cluster_overview().await;
                    (nodes, DataOrigin::Live, cluster)
                }
                Err(e) => {
                    warn!("Live data error, switching to fallback data: {}", e);
                    (generate_mock_nodes(), DataOrigin::Fallback, ClusterOverview::default())
                }
            },
        }
    }

    /// Đổi chế độ; nếu thay đổi thì làm mới ngay
    pub async fn set_mode(&self, mode: DataMode) -> Option<RefreshOutcome> {
        {
            let mut state = self.state.write().await;
            if state.mode == mode {
                return None;
            }
            info!("Data mode changed: {:?} -> {:?}", state.mode, mode);
            state.mode = mode;
        }
        Some(self.refresh().await)
    }

    /// Ảnh chụp trạng thái hiện tại; thống kê luôn tính lại
    pub async fn snapshot(&self) -> DashboardSnapshot {
        let state = self.state.read().await;
        DashboardSnapshot {
            stats: calculate_network_stats(&state.nodes),
            nodes: state.nodes.clone(),
            loading: state.loading,
            last_refreshed_at: state.last_refreshed_at,
            mode: state.mode,
            origin: state.origin,
            cluster: state.cluster.clone(),
            generation: state.applied_generation,
        }
    }

    /// Khởi động vòng lặp định kỳ; tick đầu tiên chạy ngay
    pub fn start(self: &Arc<Self>) {
        let mut guard = match self.task.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        };
        if guard.as_ref().map_or(false, |handle| !handle.is_finished()) {
            warn!("Refresh scheduler already running");
            return;
        }

        // Vòng lặp chỉ giữ Weak để Drop của scheduler vẫn dừng được nó
        let weak = Arc::downgrade(self);
        let period = self.config.refresh_interval;
        *guard = Some(tokio::spawn(async move {
            let mut interval = tokio::time::interval(period);
            interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
            loop {
                interval.tick().await;
                let Some(scheduler) = weak.upgrade() else {
                    break;
                };
                let pending = scheduler.in_flight();
                if pending > 0 {
                    warn!("Refresh tick overlaps {} in-flight run(s), upstream may be stalled", pending);
                }
                // Mỗi lần làm mới chạy riêng để một lời gọi treo không chặn các tick sau
                tokio::spawn(async move {
                    scheduler.refresh().await;
                });
            }
        }));
        info!("Refresh scheduler started (every {:?})", period);
    }

    pub fn is_running(&self) -> bool {
        match self.task.lock() {
            Ok(guard) => guard.as_ref().map_or(false, |handle| !handle.is_finished()),
            Err(_) => false,
        }
    }

    /// Dừng vòng lặp định kỳ
    pub fn shutdown(&self) {
        let handle = match self.task.lock() {
            Ok(mut guard) => guard.take(),
            Err(poisoned) => poisoned.into_inner().take(),
        };
        if let Some(handle) = handle {
            handle.abort();
            info!("Refresh scheduler stopped");
        }
    }
}

impl Drop for RefreshScheduler {
    fn drop(&mut self) {
        self.shutdown();
    }
}
