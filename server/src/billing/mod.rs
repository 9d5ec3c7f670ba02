//! Billing Module
//!
//! 账单引擎：生成与合并 ([`engine`])、支付核对 ([`payment`])、
//! 收据渲染 ([`receipt`])。

pub mod engine;
pub mod payment;
pub mod receipt;

pub use engine::BillingEngine;
pub use receipt::render_receipt;

#[cfg(test)]
mod tests;
