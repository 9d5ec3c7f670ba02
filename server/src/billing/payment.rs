//! Payment reconciliation
//!
//! 支付登记前先做全部校验：拆分支付 (CASH_UPI) 的现金 + UPI 合计
//! 必须落在账单总额 ±0.01 以内，否则整个支付不落库。

use crate::db::models::{BillDetail, PaymentRequest, PaymentStatus};
use crate::money;
use crate::utils::{AppError, AppResult};
use surrealdb::RecordId;

use super::engine::BillingEngine;

impl BillingEngine {
    /// Settle a bill.
    ///
    /// Completes the bill, marks every attached order COMPLETED and
    /// releases tables with no remaining active orders, atomically.
    pub async fn pay(&self, bill_id: &RecordId, request: &PaymentRequest) -> AppResult<BillDetail> {
        let bill = self.bills().find_by_id_required(bill_id).await?;

        if bill.payment_status == PaymentStatus::Completed {
            return Err(AppError::conflict("Bill is already paid"));
        }

        let payment_details = if request.payment_mode.is_split() {
            let details = request.payment_details.as_ref().ok_or_else(|| {
                AppError::validation("Split payment requires cash and upi amounts")
            })?;

            money::validate_payment_amount(details.cash, "cash")?;
            money::validate_payment_amount(details.upi, "upi")?;

            let paid = money::to_decimal(details.cash) + money::to_decimal(details.upi);
            let expected = money::to_decimal(bill.total_amount);
            if !money::amounts_match(paid, expected) {
                return Err(AppError::validation(format!(
                    "Split amounts ({:.2}) do not match bill total ({:.2})",
                    money::to_f64(paid),
                    bill.total_amount
                )));
            }

            Some(serde_json::to_string(details).map_err(|e| {
                AppError::internal(format!("Failed to serialize payment details: {}", e))
            })?)
        } else {
            None
        };

        // Tables referenced by the bill's orders, for the release pass
        let orders = self.orders().for_bill(bill_id).await?;
        let tables: Vec<RecordId> = orders
            .iter()
            .filter_map(|o| o.dining_table.clone())
            .collect();

        let updated = self
            .bills()
            .complete_payment(bill_id, request.payment_mode, payment_details, tables)
            .await?;

        tracing::info!(
            bill_number = %updated.bill_number,
            payment_mode = %request.payment_mode.as_str(),
            total_amount = updated.total_amount,
            "Bill settled"
        );

        self.detail_of(updated).await
    }
}
