//! Receipt rendering
//!
//! 收据是对账单冻结快照的纯读投影：税费明细来自 bill.tax_lines，
//! 不回读当前税率配置，历史收据不随税率变更而漂移。

use crate::db::models::{BillDetail, ReceiptLine, ReceiptView};
use crate::money;

/// Render a receipt view from an assembled bill detail
pub fn render_receipt(detail: &BillDetail, store_name: &str) -> ReceiptView {
    let mut lines = Vec::new();
    let mut order_numbers = Vec::with_capacity(detail.orders.len());
    let mut table_name = None;

    for order in &detail.orders {
        order_numbers.push(order.order.order_number.clone());
        if table_name.is_none() {
            table_name = order.table_name.clone();
        }
        for item in &order.items {
            lines.push(ReceiptLine {
                name: item.name.clone(),
                variant_name: item.variant_name.clone(),
                quantity: item.quantity,
                price: item.price,
                line_total: money::to_f64(money::line_total(item)),
            });
        }
    }

    let bill = &detail.bill;
    ReceiptView {
        store_name: store_name.to_string(),
        bill_number: bill.bill_number.clone(),
        order_numbers,
        table_name,
        lines,
        subtotal: bill.subtotal,
        tax_lines: bill.tax_lines.clone(),
        tax_amount: bill.tax_amount,
        discount: bill.discount,
        total_amount: bill.total_amount,
        payment_status: bill.payment_status,
        payment_mode: bill.payment_mode,
        paid_at: bill.paid_at,
        issued_by: bill.user_name.clone(),
        created_at: bill.created_at,
    }
}
