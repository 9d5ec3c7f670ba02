//! Database Models
//!
//! SurrealDB 实体与 API 请求/响应结构

pub mod serde_helpers;

pub mod bill;
pub mod dining_table;
pub mod menu;
pub mod order;
pub mod tax;

pub use bill::{
    Bill, BillDetail, BillGenerateRequest, BillListQuery, PaymentMode, PaymentRequest,
    PaymentStatus, ReceiptLine, ReceiptView, SplitPaymentDetails, TaxLine,
};
pub use dining_table::{
    DiningTable, DiningTableCreate, DiningTableUpdate, TableStatus, TableStatusForce,
};
pub use menu::{MenuItem, MenuVariant};
pub use order::{
    Order, OrderCreate, OrderDetail, OrderItem, OrderItemCreate, OrderStatus, OrderStatusUpdate,
    OrderType,
};
pub use tax::{Tax, TaxCreate, TaxUpdate};
