//! Role and Capability Definitions
//!
//! 强类型 RBAC：角色和能力都是枚举，授权检查在编译期就有名字，
//! 不再用自由字符串权限。角色到能力的映射是静态表。

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Staff roles, ordered by authority
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Admin,
    Manager,
    Cashier,
    Waiter,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Admin => "admin",
            Role::Manager => "manager",
            Role::Cashier => "cashier",
            Role::Waiter => "waiter",
        }
    }

    /// Static role -> capability mapping
    pub fn capabilities(&self) -> &'static [Capability] {
        match self {
            // Admin 由 has_capability 短路，这里列全以便枚举展示
            Role::Admin => &[
                Capability::ManageOrders,
                Capability::TakePayments,
                Capability::ViewReports,
                Capability::ManageTables,
                Capability::ManageTaxes,
                Capability::VoidOrders,
            ],
            Role::Manager => &[
                Capability::ManageOrders,
                Capability::TakePayments,
                Capability::ViewReports,
                Capability::ManageTables,
                Capability::ManageTaxes,
                Capability::VoidOrders,
            ],
            Role::Cashier => &[
                Capability::ManageOrders,
                Capability::TakePayments,
            ],
            Role::Waiter => &[Capability::ManageOrders],
        }
    }
}

impl FromStr for Role {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "admin" => Ok(Role::Admin),
            "manager" => Ok(Role::Manager),
            "cashier" => Ok(Role::Cashier),
            "waiter" => Ok(Role::Waiter),
            other => Err(format!("Unknown role: {}", other)),
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Guarded operations
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Capability {
    /// Create orders, drive status transitions, remove unbilled items
    ManageOrders,
    /// Record payments and browse the bill ledger
    TakePayments,
    /// Sales and item statistics
    ViewReports,
    /// Table CRUD and forced status overrides
    ManageTables,
    /// Tax registry CRUD
    ManageTaxes,
    /// Cancel or delete orders
    VoidOrders,
}

impl Capability {
    pub fn as_str(&self) -> &'static str {
        match self {
            Capability::ManageOrders => "orders:manage",
            Capability::TakePayments => "billing:pay",
            Capability::ViewReports => "reports:view",
            Capability::ManageTables => "tables:manage",
            Capability::ManageTaxes => "taxes:manage",
            Capability::VoidOrders => "orders:void",
        }
    }
}

impl fmt::Display for Capability {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn role_round_trips_through_str() {
        for role in [Role::Admin, Role::Manager, Role::Cashier, Role::Waiter] {
            assert_eq!(role.as_str().parse::<Role>().ok(), Some(role));
        }
        assert!("superuser".parse::<Role>().is_err());
    }

    #[test]
    fn waiter_capabilities_are_orders_only() {
        let caps = Role::Waiter.capabilities();
        assert_eq!(caps, &[Capability::ManageOrders]);
    }

    #[test]
    fn cashier_can_bill_but_not_manage_tables() {
        let caps = Role::Cashier.capabilities();
        assert!(caps.contains(&Capability::TakePayments));
        assert!(!caps.contains(&Capability::ManageTables));
    }
}
