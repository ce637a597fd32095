//! 管道编排器 - 核心状态机
//!
//! 一次 /process 请求驱动一个批次顺序走完:
//!
//! ```text
//! Validating → Uploading → Recording → Downloading → Evaluating → Finalizing → Done
//! ```
//!
//! 任意阶段失败都会映射为唯一的 `PipelineError { stage, kind }` 终态，
//! 后续阶段不再执行。每个外部调用在一次请求内只尝试一次；编排器内部
//! 不做重试，重试等价于调用方重新发起整个 /process 请求。

use std::sync::Arc;

use serde_json::Value;
use sqlx::SqlitePool;

use super::error::{FailureKind, PipelineError, Stage};
use super::validator::Validator;
use crate::clients::{StorageClient, StorageKey, SyncClient};
use crate::db::models::NewMetadataRecord;
use crate::db::repository::metadata;
use crate::models::{BatchKind, OptimizationBatch, OptimizationData};

/// 元数据记录的阶段标签
const STAGE_UPLOADED: &str = "uploaded";
const STAGE_OPTIMIZED: &str = "optimized";

/// 成功运行的聚合结果
#[derive(Debug)]
pub struct PipelineOutcome {
    pub kind: BatchKind,
    pub traffic_light_id: String,
    pub timestamp: String,
    pub sensor_count: usize,
    /// 与输入传感器同序的优化结果
    pub optimizations: Vec<OptimizationData>,
}

/// 管道编排器
///
/// 持有两个远程客户端的能力接口、本地元数据池与校验器。
/// 并发请求各自独立运行，共享状态只有元数据池。
#[derive(Clone)]
pub struct Orchestrator {
    storage: Arc<dyn StorageClient>,
    sync: Arc<dyn SyncClient>,
    pool: SqlitePool,
    validator: Validator,
}

impl Orchestrator {
    pub fn new(
        storage: Arc<dyn StorageClient>,
        sync: Arc<dyn SyncClient>,
        pool: SqlitePool,
        validator: Validator,
    ) -> Self {
        Self {
            storage,
            sync,
            pool,
            validator,
        }
    }

    /// 驱动一个批次走完整个管道
    pub async fn process(&self, raw: Value) -> Result<PipelineOutcome, PipelineError> {
        // Validating: 结构校验失败立即终止，不发起任何远程调用
        let batch = self
            .validator
            .validate(&raw)
            .map_err(|e| PipelineError::at(Stage::Validating, e))?;
        tracing::info!(
            traffic_light_id = %batch.traffic_light_id,
            sensors = batch.sensors.len(),
            "Batch accepted, starting pipeline"
        );

        let key = StorageKey {
            traffic_light_id: batch.traffic_light_id.clone(),
            timestamp: batch.unix_timestamp,
            kind: batch.kind,
        };

        // Uploading: 原始负载落入远端存储。失败时本地不留任何记录,
        // 避免元数据指向不存在的负载。
        let payload = serde_json::to_value(&batch).map_err(|e| {
            PipelineError::at(
                Stage::Uploading,
                FailureKind::Contract(format!("batch serialization: {e}")),
            )
        })?;
        self.storage
            .upload(&key, &payload)
            .await
            .map_err(|e| PipelineError::at(Stage::Uploading, e))?;
        tracing::info!(stage = %Stage::Uploading, "Raw batch stored");

        // Recording: 第一条元数据记录。失败时已上传的负载成为孤儿,
        // 不做补偿删除 (已知限制)。
        metadata::insert(
            &self.pool,
            NewMetadataRecord {
                kind: batch.kind.as_str().to_string(),
                timestamp: batch.unix_timestamp,
                traffic_light_id: batch.traffic_light_id.clone(),
                sensor_count: batch.sensors.len() as i64,
                stage: STAGE_UPLOADED.to_string(),
            },
        )
        .await
        .map_err(|e| PipelineError::at(Stage::Recording, e))?;
        tracing::info!(stage = %Stage::Recording, "Metadata registered");

        // Downloading: 回读刚上传的负载，作为进入评估前的往返校验
        self.storage
            .download(&key)
            .await
            .map_err(|e| PipelineError::at(Stage::Downloading, e))?;
        tracing::info!(stage = %Stage::Downloading, "Round-trip verification passed");

        // Evaluating: 提交传感器序列。结果必须与输入同长同序;
        // 长度不符即使远端返回了 HTTP 成功也按失败处理。
        let results = self
            .sync
            .evaluate(&batch)
            .await
            .map_err(|e| PipelineError::at(Stage::Evaluating, e))?;
        if results.len() != batch.sensors.len() {
            return Err(PipelineError::at(
                Stage::Evaluating,
                FailureKind::Contract(format!(
                    "evaluate returned {} results for {} sensors",
                    results.len(),
                    batch.sensors.len()
                )),
            ));
        }
        tracing::info!(
            stage = %Stage::Evaluating,
            results = results.len(),
            "Optimization received"
        );

        // Finalizing: 优化结果以 optimization 类型写回同一组合键,
        // 并追加第二条元数据记录。
        let optimized = OptimizationBatch::from_results(results).ok_or_else(|| {
            PipelineError::at(
                Stage::Finalizing,
                FailureKind::Contract("evaluate returned no results".to_string()),
            )
        })?;
        let final_key = StorageKey {
            traffic_light_id: batch.traffic_light_id.clone(),
            timestamp: batch.unix_timestamp,
            kind: BatchKind::Optimization,
        };
        let final_payload = serde_json::to_value(&optimized).map_err(|e| {
            PipelineError::at(
                Stage::Finalizing,
                FailureKind::Contract(format!("result serialization: {e}")),
            )
        })?;
        self.storage
            .upload(&final_key, &final_payload)
            .await
            .map_err(|e| PipelineError::at(Stage::Finalizing, e))?;
        metadata::insert(
            &self.pool,
            NewMetadataRecord {
                kind: BatchKind::Optimization.as_str().to_string(),
                timestamp: batch.unix_timestamp,
                traffic_light_id: batch.traffic_light_id.clone(),
                sensor_count: batch.sensors.len() as i64,
                stage: STAGE_OPTIMIZED.to_string(),
            },
        )
        .await
        .map_err(|e| PipelineError::at(Stage::Finalizing, e))?;

        tracing::info!(
            traffic_light_id = %batch.traffic_light_id,
            "✅ Pipeline completed"
        );

        Ok(PipelineOutcome {
            kind: batch.kind,
            traffic_light_id: batch.traffic_light_id,
            timestamp: batch.timestamp,
            sensor_count: batch.sensors.len(),
            optimizations: optimized.optimizations,
        })
    }
}
