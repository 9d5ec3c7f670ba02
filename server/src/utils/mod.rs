//! 工具模块 - 通用工具函数和类型
//!
//! # 内容
//!
//! - [`AppError`] - 应用错误类型
//! - [`AppResponse`] - API 响应结构
//! - 日志、时间等工具

pub mod error;
pub mod logger;
pub mod time;

pub use error::{AppError, AppResponse};

/// 处理器的 Result 类型别名
pub type AppResult<T> = Result<T, AppError>;
