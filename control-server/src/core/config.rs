/// 服务器配置 - 编排服务的所有配置项
///
/// # 环境变量
///
/// 所有配置项都可以通过环境变量覆盖：
///
/// | 环境变量 | 默认值 | 说明 |
/// |----------|--------|------|
/// | HTTP_PORT | 8003 | HTTP 服务端口 |
/// | DATABASE_URL | sqlite://traffic_control.db | 元数据库连接串 |
/// | STORAGE_API_URL | http://localhost:8000 | Storage 服务地址 |
/// | SYNC_API_URL | http://localhost:8002 | Sync 服务地址 |
/// | MIN_SENSORS_PER_BATCH | 1 | 批次最小传感器数 |
/// | MAX_SENSORS_PER_BATCH | 10 | 批次最大传感器数 |
/// | MIN_TIMESTAMP | 946684800 | 可接受时间戳下界 (2000-01-01) |
/// | MAX_TIMESTAMP | 4102444800 | 可接受时间戳上界 (2100-01-01) |
/// | REQUEST_TIMEOUT_MS | 30000 | 远程调用超时(毫秒) |
///
/// # 示例
///
/// ```ignore
/// STORAGE_API_URL=http://storage:8000 HTTP_PORT=8080 cargo run
/// ```
#[derive(Debug, Clone)]
pub struct Config {
    /// HTTP API 服务端口
    pub http_port: u16,
    /// 元数据库连接串 (SQLite)
    pub database_url: String,
    /// Storage 服务基础 URL (原始负载上传/下载)
    pub storage_api_url: String,
    /// Sync 服务基础 URL (优化评估)
    pub sync_api_url: String,
    /// 批次最小传感器数
    pub min_sensors_per_batch: usize,
    /// 批次最大传感器数
    pub max_sensors_per_batch: usize,
    /// 可接受时间戳下界 (unix 秒)
    pub min_timestamp: i64,
    /// 可接受时间戳上界 (unix 秒)
    pub max_timestamp: i64,
    /// 远程调用超时 (毫秒)
    pub request_timeout_ms: u64,
}

impl Config {
    /// 从环境变量加载配置
    ///
    /// 如果环境变量未设置，使用默认值。启动后不再变化。
    pub fn from_env() -> Self {
        Self {
            http_port: std::env::var("HTTP_PORT")
                .ok()
                .and_then(|p| p.parse().ok())
                .unwrap_or(8003),
            database_url: std::env::var("DATABASE_URL")
                .unwrap_or_else(|_| "sqlite://traffic_control.db".into()),
            storage_api_url: std::env::var("STORAGE_API_URL")
                .unwrap_or_else(|_| "http://localhost:8000".into()),
            sync_api_url: std::env::var("SYNC_API_URL")
                .unwrap_or_else(|_| "http://localhost:8002".into()),
            min_sensors_per_batch: std::env::var("MIN_SENSORS_PER_BATCH")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(1),
            max_sensors_per_batch: std::env::var("MAX_SENSORS_PER_BATCH")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(10),
            min_timestamp: std::env::var("MIN_TIMESTAMP")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(946684800), // 2000-01-01
            max_timestamp: std::env::var("MAX_TIMESTAMP")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(4102444800), // 2100-01-01
            request_timeout_ms: std::env::var("REQUEST_TIMEOUT_MS")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(30000),
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self::from_env()
    }
}
