//! Process API Handlers

use axum::{
    Json,
    extract::State,
    response::{IntoResponse, Response},
};
use serde::Serialize;
use serde_json::Value;

use crate::core::ServerState;
use crate::models::{BatchKind, OptimizationData};
use crate::pipeline::PipelineOutcome;
use crate::utils::AppError;

/// 处理成功响应
#[derive(Serialize)]
pub struct ProcessResponse {
    status: &'static str,
    message: &'static str,
    data_type: BatchKind,
    traffic_light_id: String,
    timestamp: String,
    sensor_count: usize,
    /// 与输入传感器同序的优化结果
    optimizations: Vec<OptimizationData>,
}

impl From<PipelineOutcome> for ProcessResponse {
    fn from(outcome: PipelineOutcome) -> Self {
        Self {
            status: "success",
            message: "Data processed and optimized successfully",
            data_type: outcome.kind,
            traffic_light_id: outcome.traffic_light_id,
            timestamp: outcome.timestamp,
            sensor_count: outcome.sensor_count,
            optimizations: outcome.optimizations,
        }
    }
}

/// POST /process - 处理一个观测批次 (或旧版单传感器负载)
///
/// 管道挂在独立任务上执行: 客户端断开不会取消进行中的远程调用,
/// 被放弃的运行结果由运行时丢弃。
pub async fn process(State(state): State<ServerState>, Json(raw): Json<Value>) -> Response {
    let orchestrator = state.orchestrator.clone();
    let handle = tokio::spawn(async move { orchestrator.process(raw).await });

    match handle.await {
        Ok(Ok(outcome)) => Json(ProcessResponse::from(outcome)).into_response(),
        Ok(Err(err)) => {
            tracing::warn!(stage = %err.stage, reason = %err.kind, "Pipeline run failed");
            err.into_response()
        }
        Err(e) => {
            tracing::error!(error = %e, "Pipeline task aborted");
            AppError::internal("pipeline task aborted").into_response()
        }
    }
}
