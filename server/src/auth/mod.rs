//! 认证授权模块
//!
//! 提供 JWT 认证、强类型角色/能力与中间件：
//! - [`JwtService`] - JWT 令牌服务
//! - [`CurrentUser`] - 当前用户上下文
//! - [`Role`] / [`Capability`] - 强类型 RBAC
//! - [`require_auth`] - 认证中间件
//! - [`require_capability`] - 能力检查中间件

pub mod extractor;
pub mod jwt;
pub mod middleware;
pub mod permissions;

pub use jwt::{Claims, CurrentUser, JwtConfig, JwtError, JwtService};
pub use middleware::{require_auth, require_capability};
pub use permissions::{Capability, Role};
