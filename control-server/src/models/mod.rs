//! Wire Models
//!
//! 观测批次与优化结果的序列化模型。校验器负责把任意 JSON 收敛到这些类型；
//! 之后的管道阶段只操作类型化数据。

pub mod optimization;
pub mod traffic;

pub use optimization::{ImpactDetails, OptimizationBatch, OptimizationData, OptimizationDetails};
pub use traffic::{Batch, BatchKind, SensorData, TrafficMetrics};
