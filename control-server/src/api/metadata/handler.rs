//! Metadata API Handlers

use axum::{
    Json,
    extract::{Path, Query, State},
};
use serde::{Deserialize, Serialize};

use crate::core::ServerState;
use crate::db::models::{MetadataRecord, MetadataStats};
use crate::db::repository::metadata;
use crate::utils::AppResult;

const DEFAULT_LIMIT: i64 = 100;
const DEFAULT_RECENT_LIMIT: i64 = 50;

/// 列表查询参数
#[derive(Deserialize)]
pub struct LimitQuery {
    limit: Option<i64>,
}

/// 元数据列表响应
#[derive(Serialize)]
pub struct MetadataResponse {
    status: &'static str,
    message: &'static str,
    data: Vec<MetadataRecord>,
    count: usize,
    limit: i64,
}

impl MetadataResponse {
    fn new(data: Vec<MetadataRecord>, limit: i64) -> Self {
        Self {
            status: "success",
            message: "Metadata retrieved successfully",
            count: data.len(),
            data,
            limit,
        }
    }
}

/// 聚合统计响应
#[derive(Serialize)]
pub struct StatsResponse {
    status: &'static str,
    message: &'static str,
    stats: MetadataStats,
}

/// 删除操作响应
#[derive(Serialize)]
pub struct DeletionResponse {
    status: &'static str,
    message: String,
    deleted_count: u64,
    traffic_light_id: String,
}

/// GET /metadata/traffic-light/{id} - 按红绿灯查询
pub async fn by_traffic_light(
    State(state): State<ServerState>,
    Path(id): Path<String>,
    Query(query): Query<LimitQuery>,
) -> AppResult<Json<MetadataResponse>> {
    let limit = query.limit.unwrap_or(DEFAULT_LIMIT);
    let entries = metadata::find_by_traffic_light(&state.pool, &id, limit).await?;
    Ok(Json(MetadataResponse::new(entries, limit)))
}

/// GET /metadata/type/{kind} - 按类型查询
pub async fn by_kind(
    State(state): State<ServerState>,
    Path(kind): Path<String>,
    Query(query): Query<LimitQuery>,
) -> AppResult<Json<MetadataResponse>> {
    let limit = query.limit.unwrap_or(DEFAULT_LIMIT);
    let entries = metadata::find_by_kind(&state.pool, &kind, limit).await?;
    Ok(Json(MetadataResponse::new(entries, limit)))
}

/// GET /metadata/recent - 按创建时间倒序查询
pub async fn recent(
    State(state): State<ServerState>,
    Query(query): Query<LimitQuery>,
) -> AppResult<Json<MetadataResponse>> {
    let limit = query.limit.unwrap_or(DEFAULT_RECENT_LIMIT);
    let entries = metadata::find_recent(&state.pool, limit).await?;
    Ok(Json(MetadataResponse::new(entries, limit)))
}

/// GET /metadata/stats - 聚合统计
pub async fn stats(State(state): State<ServerState>) -> AppResult<Json<StatsResponse>> {
    let stats = metadata::stats(&state.pool).await?;
    Ok(Json(StatsResponse {
        status: "success",
        message: "Metadata statistics retrieved successfully",
        stats,
    }))
}

/// DELETE /metadata/traffic-light/{id} - 按红绿灯删除 (不可逆)
pub async fn delete_by_traffic_light(
    State(state): State<ServerState>,
    Path(id): Path<String>,
) -> AppResult<Json<DeletionResponse>> {
    let deleted_count = metadata::delete_by_traffic_light(&state.pool, &id).await?;
    tracing::info!(traffic_light_id = %id, deleted = deleted_count, "Metadata deleted");
    Ok(Json(DeletionResponse {
        status: "success",
        message: format!("Deleted {deleted_count} metadata entries"),
        deleted_count,
        traffic_light_id: id,
    }))
}
