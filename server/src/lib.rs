//! Mesa POS Server - 餐厅收银与账单引擎
//!
//! # 架构概述
//!
//! - **账单引擎** (`billing`): 账单生成、追加合并、支付核对、收据渲染
//! - **订单** (`db/repository/order`): 订单生命周期与桌台占用派生
//! - **数据库** (`db`): 嵌入式 SurrealDB 存储
//! - **认证** (`auth`): JWT + 强类型角色/能力
//! - **HTTP API** (`api`): RESTful API 接口
//!
//! # 模块结构
//!
//! ```text
//! server/src/
//! ├── core/          # 配置、状态、HTTP 服务
//! ├── auth/          # JWT 认证、角色/能力
//! ├── api/           # HTTP 路由和处理器
//! ├── billing/       # 账单引擎
//! ├── money/         # 金额运算 (Decimal)
//! ├── db/            # 数据库层
//! └── utils/         # 工具函数
//! ```

pub mod api;
pub mod auth;
pub mod billing;
pub mod core;
pub mod db;
pub mod money;
pub mod utils;

// Re-export 公共类型
pub use auth::{Capability, CurrentUser, JwtService, Role};
pub use billing::BillingEngine;
pub use core::{Config, Server, ServerState};
pub use utils::{AppError, AppResponse, AppResult};

// Re-export logger functions
pub use utils::logger::{init_logger, init_logger_with_file};

/// 进程级环境准备：dotenv、工作目录、日志
pub fn setup_environment() -> anyhow::Result<()> {
    dotenv::dotenv().ok();

    let work_dir = std::env::var("WORK_DIR").unwrap_or_else(|_| "/var/lib/mesa".into());
    let log_dir = std::path::Path::new(&work_dir).join("logs");
    std::fs::create_dir_all(&log_dir)?;

    let log_level = std::env::var("LOG_LEVEL").ok();
    init_logger_with_file(log_level.as_deref(), log_dir.to_str());

    Ok(())
}

pub fn print_banner() {
    println!(
        r#"
    __  ___
   /  |/  /__  _________ _
  / /|_/ / _ \/ ___/ __ `/
 / /  / /  __(__  ) /_/ /
/_/  /_/\___/____/\__,_/
         P O S
    "#
    );
}
