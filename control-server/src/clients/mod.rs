//! 远程服务客户端
//!
//! Storage 与 Sync 两个窄能力接口。编排器只依赖这里的 trait，
//! 测试用内存实现替换 HTTP 实现，无需任何网络。

pub mod storage;
pub mod sync;

pub use storage::{HttpStorageClient, StorageClient, StorageKey};
pub use sync::{HttpSyncClient, SyncClient};

use thiserror::Error;

/// 客户端错误
///
/// 传输失败与远程拒绝是不同的失败类别，调用方据此决定重试策略：
/// 传输失败是瞬态的，远程拒绝在本服务视角下是终态。
#[derive(Debug, Error)]
pub enum ClientError {
    /// 远程服务不可达或超时
    #[error("Transport error: {0}")]
    Transport(String),

    /// 远程服务返回非 2xx
    #[error("Remote rejected request ({status}): {body}")]
    Rejected { status: u16, body: String },

    /// 响应体无法按约定的形态解析
    #[error("Malformed response: {0}")]
    Malformed(String),
}

impl ClientError {
    pub(crate) fn transport(e: reqwest::Error) -> Self {
        ClientError::Transport(e.to_string())
    }
}

/// 把非 2xx 响应转成 [`ClientError::Rejected`]，带上响应体
pub(crate) async fn ensure_success(
    resp: reqwest::Response,
) -> Result<reqwest::Response, ClientError> {
    let status = resp.status();
    if status.is_success() {
        return Ok(resp);
    }
    let body = resp.text().await.unwrap_or_default();
    Err(ClientError::Rejected {
        status: status.as_u16(),
        body,
    })
}
