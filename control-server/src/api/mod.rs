//! API 路由模块
//!
//! # 结构
//!
//! - [`health`] - 健康检查
//! - [`process`] - 观测批次处理管道入口
//! - [`metadata`] - 元数据查询与删除 (直通仓储层)

pub mod health;
pub mod metadata;
pub mod process;

use axum::Router;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use crate::core::ServerState;

/// 组装完整的应用路由
pub fn build_app(state: ServerState) -> Router {
    Router::<ServerState>::new()
        .merge(health::router())
        .merge(process::router())
        .merge(metadata::router())
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
