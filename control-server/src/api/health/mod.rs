//! 健康检查路由
//!
//! # 路由列表
//!
//! | 路径 | 方法 | 说明 |
//! |------|------|------|
//! | / | GET | 服务横幅 |
//! | /healthcheck | GET | 存活检查 |
//!
//! 存活检查不触达管道、远程服务或数据库。

use axum::{Json, Router, routing::get};
use serde::Serialize;

use crate::core::ServerState;
use crate::utils::time::now_millis;

pub fn router() -> Router<ServerState> {
    Router::new()
        .route("/", get(root))
        .route("/healthcheck", get(healthcheck))
}

/// 健康检查响应
#[derive(Serialize)]
pub struct HealthResponse {
    /// 状态 (healthy)
    status: &'static str,
    /// 服务名
    service: &'static str,
    /// 版本号
    version: &'static str,
    /// 响应时刻 (unix 毫秒)
    timestamp: i64,
}

/// GET / - 服务横幅
async fn root() -> Json<serde_json::Value> {
    Json(serde_json::json!({ "message": "Traffic Control Service is running" }))
}

/// GET /healthcheck - 存活检查
async fn healthcheck() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy",
        service: "traffic-control",
        version: env!("CARGO_PKG_VERSION"),
        timestamp: now_millis(),
    })
}
