use std::path::PathBuf;
use std::sync::Arc;

use surrealdb::Surreal;
use surrealdb::engine::local::Db;

use crate::auth::JwtService;
use crate::core::Config;
use crate::db::DbService;
use crate::db::repository::{
    BillRepository, DiningTableRepository, MenuRepository, OrderRepository, TaxRepository,
};

/// 服务器状态 - 持有所有服务的共享引用
///
/// 使用 Arc/浅拷贝实现低成本 Clone，注入到每个请求处理函数。
///
/// # 组件
///
/// | 字段 | 类型 | 说明 |
/// |------|------|------|
/// | config | Config | 配置项 (不可变) |
/// | db | Surreal<Db> | 嵌入式数据库 |
/// | jwt_service | Arc<JwtService> | JWT 认证服务 |
#[derive(Clone, Debug)]
pub struct ServerState {
    /// 服务器配置
    pub config: Config,
    /// 嵌入式数据库 (SurrealDB)
    pub db: Surreal<Db>,
    /// JWT 认证服务 (Arc 共享所有权)
    pub jwt_service: Arc<JwtService>,
}

impl ServerState {
    /// 手动构造 (通常使用 [`ServerState::initialize`] 代替)
    pub fn new(config: Config, db: Surreal<Db>, jwt_service: Arc<JwtService>) -> Self {
        Self {
            config,
            db,
            jwt_service,
        }
    }

    /// 初始化服务器状态：打开数据库、定义索引、构建 JWT 服务
    pub async fn initialize(config: &Config) -> anyhow::Result<Self> {
        let data_dir = PathBuf::from(&config.work_dir).join("db");
        let db_service = DbService::new(&data_dir).await?;
        let jwt_service = Arc::new(JwtService::with_config(config.jwt.clone()));

        Ok(Self::new(config.clone(), db_service.db, jwt_service))
    }

    pub fn jwt_service(&self) -> Arc<JwtService> {
        self.jwt_service.clone()
    }

    pub fn db(&self) -> Surreal<Db> {
        self.db.clone()
    }

    // 每个仓库都只是数据库句柄的浅拷贝包装，按需构造
    pub fn tables(&self) -> DiningTableRepository {
        DiningTableRepository::new(self.db.clone())
    }

    pub fn taxes(&self) -> TaxRepository {
        TaxRepository::new(self.db.clone())
    }

    pub fn orders(&self) -> OrderRepository {
        OrderRepository::new(self.db.clone())
    }

    pub fn bills(&self) -> BillRepository {
        BillRepository::new(self.db.clone())
    }

    pub fn menu(&self) -> MenuRepository {
        MenuRepository::new(self.db.clone())
    }
}
