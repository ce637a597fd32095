//! Storage 服务客户端
//!
//! 封装 traffic-storage 的原始负载上传与下载。每次调用都是一次独立的
//! HTTP 往返：客户端不做隐式重试，也不缓存任何负载。

use std::time::Duration;

use async_trait::async_trait;
use serde_json::{Value, json};

use super::{ClientError, ensure_success};
use crate::models::BatchKind;
use crate::utils::time::unix_to_iso;

/// 组合键：按 (红绿灯 ID, unix 时间戳, 数据类型) 定位一份负载
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StorageKey {
    pub traffic_light_id: String,
    pub timestamp: i64,
    pub kind: BatchKind,
}

/// 原始负载存取的能力接口
#[async_trait]
pub trait StorageClient: Send + Sync {
    /// 上传一份负载到远端存储
    async fn upload(&self, key: &StorageKey, payload: &Value) -> Result<(), ClientError>;

    /// 按组合键取回一份负载
    async fn download(&self, key: &StorageKey) -> Result<Value, ClientError>;
}

/// 基于 reqwest 的 HTTP 实现
pub struct HttpStorageClient {
    base_url: String,
    timeout: Duration,
    client: reqwest::Client,
}

impl HttpStorageClient {
    pub fn new(base_url: String, timeout: Duration) -> Self {
        Self {
            base_url,
            timeout,
            client: reqwest::Client::new(),
        }
    }
}

/// 存储服务按 unix 时间戳索引；上传前把负载的 ISO 时间戳替换为键里的 unix 值
fn prepare_payload(payload: &Value, key: &StorageKey) -> Value {
    let mut prepared = payload.clone();
    if let Some(obj) = prepared.as_object_mut() {
        obj.insert("timestamp".to_string(), json!(key.timestamp));
    }
    prepared
}

#[async_trait]
impl StorageClient for HttpStorageClient {
    async fn upload(&self, key: &StorageKey, payload: &Value) -> Result<(), ClientError> {
        let url = format!("{}/upload", self.base_url);
        let body = prepare_payload(payload, key);

        let resp = self
            .client
            .post(&url)
            .timeout(self.timeout)
            .json(&body)
            .send()
            .await
            .map_err(ClientError::transport)?;
        ensure_success(resp).await?;

        tracing::debug!(
            traffic_light_id = %key.traffic_light_id,
            kind = %key.kind,
            "Payload uploaded to storage"
        );
        Ok(())
    }

    async fn download(&self, key: &StorageKey) -> Result<Value, ClientError> {
        let url = format!("{}/download", self.base_url);
        let body = json!({
            "traffic_light_id": key.traffic_light_id,
            "timestamp": key.timestamp,
            "type": key.kind,
        });

        let resp = self
            .client
            .post(&url)
            .timeout(self.timeout)
            .json(&body)
            .send()
            .await
            .map_err(ClientError::transport)?;
        let resp = ensure_success(resp).await?;

        let mut result: Value = resp
            .json()
            .await
            .map_err(|e| ClientError::Malformed(format!("download response: {e}")))?;

        // 下游继续使用 ISO 时间戳
        if let Some(unix) = result.get("timestamp").and_then(Value::as_i64)
            && let Some(iso) = unix_to_iso(unix)
        {
            result["timestamp"] = json!(iso);
        }
        Ok(result)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn prepare_payload_swaps_timestamp_for_unix() {
        let key = StorageKey {
            traffic_light_id: "21".to_string(),
            timestamp: 1747664400,
            kind: BatchKind::Data,
        };
        let payload = json!({"timestamp": "2025-05-19T14:20:00Z", "traffic_light_id": "21"});

        let prepared = prepare_payload(&payload, &key);

        assert_eq!(prepared["timestamp"], json!(1747664400));
        assert_eq!(prepared["traffic_light_id"], json!("21"));
        // Original is untouched
        assert_eq!(payload["timestamp"], json!("2025-05-19T14:20:00Z"));
    }
}
