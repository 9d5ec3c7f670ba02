//! 健康检查路由
//!
//! | 路径 | 方法 | 说明 | 认证 |
//! |------|------|------|------|
//! | /api/health | GET | 健康检查 | 无 |

use axum::{Json, Router, extract::State, routing::get};
use serde::Serialize;
use std::time::SystemTime;

use crate::core::ServerState;

/// 健康检查路由 - 公共路由 (无需认证)
pub fn router() -> Router<ServerState> {
    Router::new().route("/api/health", get(health))
}

/// 健康检查响应
#[derive(Serialize)]
pub struct HealthResponse {
    /// 状态 (healthy | degraded)
    status: &'static str,
    /// 版本号
    version: &'static str,
    /// 运行时间 (秒)
    uptime_seconds: u64,
    /// 数据库是否可达
    database: &'static str,
}

// 服务器启动时间
static START_TIME: std::sync::OnceLock<SystemTime> = std::sync::OnceLock::new();

/// Pin the uptime baseline. Called once at server startup; later calls
/// (and the first-probe fallback in [`get_uptime_seconds`]) are no-ops.
pub fn record_start_time() {
    let _ = START_TIME.set(SystemTime::now());
}

fn get_uptime_seconds() -> u64 {
    let start = START_TIME.get_or_init(SystemTime::now);
    SystemTime::now()
        .duration_since(*start)
        .map(|d| d.as_secs())
        .unwrap_or(0)
}

pub async fn health(State(state): State<ServerState>) -> Json<HealthResponse> {
    let db_ok = state.db.query("RETURN 1").await.is_ok();

    Json(HealthResponse {
        status: if db_ok { "healthy" } else { "degraded" },
        version: env!("CARGO_PKG_VERSION"),
        uptime_seconds: get_uptime_seconds(),
        database: if db_ok { "ok" } else { "error" },
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn start_time_is_set_once_and_only_once() {
        record_start_time();
        let first = *START_TIME.get().expect("start time recorded");

        // A later call must not move the baseline
        record_start_time();
        assert_eq!(*START_TIME.get().expect("start time kept"), first);
        assert!(get_uptime_seconds() < 60);
    }
}
