//! Metadata API 模块
//!
//! # 路由列表
//!
//! | 路径 | 方法 | 说明 |
//! |------|------|------|
//! | /metadata/traffic-light/{id} | GET | 按红绿灯查询 |
//! | /metadata/traffic-light/{id} | DELETE | 按红绿灯删除 |
//! | /metadata/type/{kind} | GET | 按类型查询 |
//! | /metadata/recent | GET | 按创建时间倒序查询 |
//! | /metadata/stats | GET | 聚合统计 |
//!
//! 元数据端点直通仓储层，不经过编排管道。

mod handler;

use axum::{Router, routing::get};

use crate::core::ServerState;

pub fn router() -> Router<ServerState> {
    Router::new().nest("/metadata", routes())
}

fn routes() -> Router<ServerState> {
    Router::new()
        .route(
            "/traffic-light/{id}",
            get(handler::by_traffic_light).delete(handler::delete_by_traffic_light),
        )
        .route("/type/{kind}", get(handler::by_kind))
        .route("/recent", get(handler::recent))
        .route("/stats", get(handler::stats))
}
