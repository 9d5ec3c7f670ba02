//! API 路由模块
//!
//! # 结构
//!
//! - [`health`] - 健康检查
//! - [`tables`] - 桌台管理接口
//! - [`taxes`] - 税率管理接口
//! - [`orders`] - 订单管理接口
//! - [`billing`] - 账单与支付接口
//! - [`statistics`] - 报表统计接口

pub mod billing;
pub mod health;
pub mod orders;
pub mod statistics;
pub mod tables;
pub mod taxes;

// Re-export common types for handlers
pub use crate::utils::{AppResponse, AppResult};
