//! Traffic Control Service - 车流观测编排服务
//!
//! # 架构概述
//!
//! 本服务把一个观测批次顺序推过六个阶段：校验、上传原始负载、登记元数据、
//! 回读校验、远程优化评估、回写优化结果。除编排状态机外，其余都是薄封装：
//!
//! - **管道** (`pipeline`): 校验器 + 编排状态机 + 阶段化失败
//! - **客户端** (`clients`): Storage / Sync 两个远程能力接口
//! - **数据库** (`db`): SQLite 元数据索引
//! - **HTTP API** (`api`): /process、/healthcheck 与元数据端点
//!
//! # 模块结构
//!
//! ```text
//! control-server/src/
//! ├── core/      # 配置、状态、服务器
//! ├── api/       # HTTP 路由和处理器
//! ├── pipeline/  # 校验器与编排状态机
//! ├── clients/   # Storage / Sync 远程客户端
//! ├── db/        # 元数据存储 (SQLite)
//! ├── models/    # 批次与优化结果的序列化模型
//! └── utils/     # 错误、日志、时间工具
//! ```

pub mod api;
pub mod clients;
pub mod core;
pub mod db;
pub mod models;
pub mod pipeline;
pub mod utils;

// Re-export 公共类型
pub use core::{Config, Server, ServerState};
pub use models::{Batch, BatchKind, OptimizationData, SensorData};
pub use pipeline::{Orchestrator, PipelineError, Stage, ValidationError, Validator};
pub use utils::{AppError, AppResult};

// Re-export logger function
pub use utils::logger::init_logger;

/// 进程启动前的环境准备 (dotenv + 日志)
pub fn setup_environment() {
    // .env 文件可选，缺失时静默跳过
    let _ = dotenv::dotenv();

    let level = std::env::var("LOG_LEVEL").unwrap_or_else(|_| "info".into());
    init_logger(&level);
}

pub fn print_banner() {
    println!(
        r#"
  ______              ______ ____
 /_  __/______ _ ____/ / __// __/
  / /  / __/ _ `/ __/ /_/ / / /__
 /_/  /_/  \_,_/_/ /_/___/_/\___/
   ______            __           __
  / ____/___  ____  / /__________ / /
 / /   / __ \/ __ \/ __/ ___/ __ \/ /
/ /___/ /_/ / / / / /_/ /  / /_/ / /
\____/\____/_/ /_/\__/_/   \____/_/
    "#
    );
}
