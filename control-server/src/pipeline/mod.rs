//! 处理管道 - 校验、编排与失败归类
//!
//! # 模块结构
//!
//! - [`Validator`] - 结构校验与旧版形态归一化
//! - [`Orchestrator`] - 六阶段编排状态机
//! - [`PipelineError`] - 带阶段的终态失败

pub mod error;
pub mod orchestrator;
pub mod validator;


pub use error::{FailureKind, PipelineError, Stage};
pub use orchestrator::{Orchestrator, PipelineOutcome};
pub use validator::{ValidationError, Validator};
