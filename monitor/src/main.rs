// Standard library imports
use std::{net::SocketAddr, sync::Arc};

// Third party imports
use anyhow::Context;
use tokio::signal;
use tracing::{error, info, warn};

// Internal imports
use pnode_common::{init_config, logger::init_logging};
use pnode_monitor::{
    api::{serve, AppState},
    GeoCache, GeoResolver, IpApiLookup, NodePipeline, RefreshScheduler, SchedulerConfig, SolanaRpcClient,
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let (config, config_error) = init_config();
    // Giữ guard để file log được flush khi thoát
    let _log_guard = init_logging(config.log_dir.as_deref())?;
    if let Some(e) = config_error {
        warn!("Cấu hình môi trường không hợp lệ, dùng giá trị mặc định: {}", e);
    }

    info!("Khởi động pNode monitor");
    info!("RPC endpoint: {}", config.rpc_url);

    let gateway = SolanaRpcClient::new(config.rpc_url.clone(), config.rpc_timeout())
        .context("Không thể tạo RPC client")?;
    let lookup = IpApiLookup::new(config.geo_lookup_url.clone(), config.rpc_timeout())
        .context("Không thể tạo geo lookup client")?;
    let geo = GeoResolver::new(Arc::new(lookup), Arc::new(GeoCache::new()));
    let pipeline = NodePipeline::new(Arc::new(gateway), geo).with_max_nodes(config.max_nodes);

    let scheduler = Arc::new(RefreshScheduler::new(pipeline, SchedulerConfig::from(config.as_ref())));
    scheduler.start();

    let addr: SocketAddr = format!("{}:{}", config.api_host, config.api_port)
        .parse()
        .with_context(|| format!("Địa chỉ API không hợp lệ: {}:{}", config.api_host, config.api_port))?;
    let state = AppState {
        scheduler: Arc::clone(&scheduler),
    };

    let shutdown = async {
        if let Err(e) = signal::ctrl_c().await {
            error!("Không thể lắng nghe tín hiệu dừng: {}", e);
        }
        info!("Nhận tín hiệu dừng, đang tắt...");
    };

    if let Err(e) = serve(addr, state, shutdown).await {
        error!("API server lỗi: {}", e);
    }

    scheduler.shutdown();
    info!("pNode monitor đã dừng");
    Ok(())
}
