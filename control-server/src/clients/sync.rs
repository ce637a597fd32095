//! Sync 服务客户端
//!
//! 封装 traffic-sync 的 /evaluate 调用：提交一批传感器观测，取回与输入
//! 同序的优化结果。长度契约 (结果数 == 传感器数) 由编排器检查，不在这里。

use std::time::Duration;

use async_trait::async_trait;
use serde_json::Value;

use super::{ClientError, ensure_success};
use crate::models::{Batch, OptimizationData};

/// 评估调用的能力接口
#[async_trait]
pub trait SyncClient: Send + Sync {
    /// 对一批观测执行评估，返回按输入顺序排列的优化结果
    async fn evaluate(&self, batch: &Batch) -> Result<Vec<OptimizationData>, ClientError>;
}

/// 基于 reqwest 的 HTTP 实现
pub struct HttpSyncClient {
    base_url: String,
    timeout: Duration,
    client: reqwest::Client,
}

impl HttpSyncClient {
    pub fn new(base_url: String, timeout: Duration) -> Self {
        Self {
            base_url,
            timeout,
            client: reqwest::Client::new(),
        }
    }
}

#[async_trait]
impl SyncClient for HttpSyncClient {
    async fn evaluate(&self, batch: &Batch) -> Result<Vec<OptimizationData>, ClientError> {
        let url = format!("{}/evaluate", self.base_url);

        tracing::debug!(
            traffic_light_id = %batch.traffic_light_id,
            sensors = batch.sensors.len(),
            "Submitting batch for evaluation"
        );

        let resp = self
            .client
            .post(&url)
            .timeout(self.timeout)
            .json(batch)
            .send()
            .await
            .map_err(ClientError::transport)?;
        let resp = ensure_success(resp).await?;

        let body: Value = resp
            .json()
            .await
            .map_err(|e| ClientError::Malformed(format!("evaluate response: {e}")))?;
        parse_evaluate_response(body)
    }
}

/// 同步服务历史上有三种响应形态：裸数组、单个优化对象、带 `optimizations`
/// 数组的包装对象。统一收敛成有序的结果列表。
fn parse_evaluate_response(body: Value) -> Result<Vec<OptimizationData>, ClientError> {
    let malformed = |e: serde_json::Error| ClientError::Malformed(format!("evaluate response: {e}"));
    match body {
        Value::Array(_) => serde_json::from_value(body).map_err(malformed),
        Value::Object(mut map) => {
            if let Some(list @ Value::Array(_)) = map.remove("optimizations") {
                serde_json::from_value(list).map_err(malformed)
            } else {
                let single: OptimizationData =
                    serde_json::from_value(Value::Object(map)).map_err(malformed)?;
                Ok(vec![single])
            }
        }
        other => Err(ClientError::Malformed(format!(
            "evaluate response: expected object or array, got {other}"
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn optimization_json(tls: &str) -> Value {
        json!({
            "version": "2.0",
            "type": "optimization",
            "timestamp": "2025-05-19T14:20:00Z",
            "traffic_light_id": tls,
            "optimization": {"green_time_sec": 40, "red_time_sec": 20},
            "impact": {
                "original_congestion": 70,
                "optimized_congestion": 45,
                "original_category": "severe",
                "optimized_category": "mild"
            }
        })
    }

    #[test]
    fn parses_bare_array() {
        let body = json!([optimization_json("21"), optimization_json("22")]);
        let results = parse_evaluate_response(body).unwrap();
        assert_eq!(results.len(), 2);
        assert_eq!(results[0].traffic_light_id, "21");
        assert_eq!(results[1].traffic_light_id, "22");
    }

    #[test]
    fn parses_wrapper_object() {
        let body = json!({
            "version": "2.0",
            "type": "optimization",
            "timestamp": "2025-05-19T14:20:00Z",
            "traffic_light_id": "21",
            "optimizations": [optimization_json("21")]
        });
        let results = parse_evaluate_response(body).unwrap();
        assert_eq!(results.len(), 1);
    }

    #[test]
    fn parses_single_object() {
        let results = parse_evaluate_response(optimization_json("21")).unwrap();
        assert_eq!(results.len(), 1);
        assert_eq!(results[0].optimization.green_time_sec, 40);
    }

    #[test]
    fn rejects_non_json_shapes() {
        assert!(matches!(
            parse_evaluate_response(json!("nope")),
            Err(ClientError::Malformed(_))
        ));
        assert!(matches!(
            parse_evaluate_response(json!({"answer": 42})),
            Err(ClientError::Malformed(_))
        ));
    }
}
