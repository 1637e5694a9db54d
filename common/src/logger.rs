// Standard library imports
use std::path::Path;

// Third party imports
use tracing::info;
use tracing_appender::{
    non_blocking::WorkerGuard,
    rolling::{RollingFileAppender, Rotation},
};
use tracing_subscriber::{
    fmt::{self, format::FmtSpan},
    prelude::*,
    EnvFilter,
};

// Internal imports
use crate::error::{MonitorError, MonitorResult};

/// Tên file log
pub const LOG_FILE_NAME: &str = "pnode-monitor.log";

/// Khởi tạo logging.
///
/// Luôn ghi ra stderr; khi có `log_dir` thì ghi thêm file xoay vòng theo ngày.
/// Guard trả về phải được giữ cho tới khi tiến trình kết thúc.
pub fn init_logging(log_dir: Option<&str>) -> MonitorResult<Option<WorkerGuard>> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into());
    let stderr_layer = fmt::Layer::new()
        .with_writer(std::io::stderr)
        .with_ansi(true);

    match log_dir {
        Some(dir) => {
            let dir_path = Path::new(dir);
            if !dir_path.exists() {
                std::fs::create_dir_all(dir_path)
                    .map_err(|e| MonitorError::config_error(format!("cannot create log dir {}: {}", dir, e)))?;
            }

            let file_appender = RollingFileAppender::new(Rotation::DAILY, dir_path, LOG_FILE_NAME);
            let (non_blocking, guard) = tracing_appender::non_blocking(file_appender);

            tracing_subscriber::registry()
                .with(filter)
                .with(stderr_layer)
                .with(
                    fmt::Layer::new()
                        .with_writer(non_blocking)
                        .with_ansi(false)
                        .with_span_events(FmtSpan::CLOSE),
                )
                .try_init()
                .map_err(|e| MonitorError::config_error(format!("logger already initialised: {}", e)))?;

            info!("Writing logs to {}", dir_path.join(LOG_FILE_NAME).display());
            Ok(Some(guard))
        }
        None => {
            tracing_subscriber::registry()
                .with(filter)
                .with(stderr_layer)
                .try_init()
                .map_err(|e| MonitorError::config_error(format!("logger already initialised: {}", e)))?;

            Ok(None)
        }
    }
}
