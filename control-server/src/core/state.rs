use std::sync::Arc;
use std::time::Duration;

use sqlx::SqlitePool;

use crate::clients::{HttpStorageClient, HttpSyncClient, StorageClient, SyncClient};
use crate::core::Config;
use crate::db::DbService;
use crate::pipeline::{Orchestrator, Validator};
use crate::utils::AppError;

/// 服务器状态 - 持有所有服务的共享引用
///
/// 使用 Arc 与连接池实现浅拷贝，所有权成本极低。
/// 配置与客户端在启动后只读；并发请求间唯一的共享可变状态是元数据池,
/// 写序列化交给 SQLite 事务保证。
///
/// # 组件
///
/// | 字段 | 类型 | 说明 |
/// |------|------|------|
/// | config | Config | 配置项 (不可变) |
/// | pool | SqlitePool | 元数据库连接池 |
/// | orchestrator | Orchestrator | 管道编排器 |
#[derive(Clone)]
pub struct ServerState {
    /// 服务器配置
    pub config: Config,
    /// 元数据库连接池
    pub pool: SqlitePool,
    /// 管道编排器
    pub orchestrator: Orchestrator,
}

impl ServerState {
    /// 创建服务器状态 (手动构造)
    ///
    /// 测试场景用它把编排器接到内存实现上；生产路径用 [`ServerState::initialize`]。
    pub fn new(
        config: Config,
        pool: SqlitePool,
        storage: Arc<dyn StorageClient>,
        sync: Arc<dyn SyncClient>,
    ) -> Self {
        let validator = Validator::new(
            config.min_sensors_per_batch,
            config.max_sensors_per_batch,
            config.min_timestamp,
            config.max_timestamp,
        );
        let orchestrator = Orchestrator::new(storage, sync, pool.clone(), validator);
        Self {
            config,
            pool,
            orchestrator,
        }
    }

    /// 初始化服务器状态
    ///
    /// 按顺序初始化：
    /// 1. 数据库 (连接池 + 迁移)
    /// 2. Storage / Sync HTTP 客户端
    /// 3. 校验器与编排器
    pub async fn initialize(config: &Config) -> Result<Self, AppError> {
        let db = DbService::new(&config.database_url).await?;

        let timeout = Duration::from_millis(config.request_timeout_ms);
        let storage: Arc<dyn StorageClient> = Arc::new(HttpStorageClient::new(
            config.storage_api_url.clone(),
            timeout,
        ));
        let sync: Arc<dyn SyncClient> =
            Arc::new(HttpSyncClient::new(config.sync_api_url.clone(), timeout));

        tracing::info!(
            storage = %config.storage_api_url,
            sync = %config.sync_api_url,
            "Remote clients configured"
        );

        Ok(Self::new(config.clone(), db.pool, storage, sync))
    }
}
