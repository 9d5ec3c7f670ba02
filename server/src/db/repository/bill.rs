//! Bill Repository
//!
//! 账单的持久化。账单创建、追加合并与支付结算都是多实体写入，
//! 必须原子完成：挂接订单用 `bill = NONE` 守护防止重复开票，
//! 支付后桌台释放按活跃订单数派生。

use super::{BaseRepository, RepoError, RepoResult, parse_id};
use crate::db::models::{Bill, PaymentMode, PaymentStatus, TaxLine};
use crate::money::BillTotals;
use crate::utils::time::{now_millis, today_compact};
use serde_json::json;
use surrealdb::engine::local::Db;
use surrealdb::{RecordId, Surreal};
use uuid::Uuid;

const TABLE: &str = "bill";

#[derive(Clone)]
pub struct BillRepository {
    base: BaseRepository,
}

impl BillRepository {
    pub fn new(db: Surreal<Db>) -> Self {
        Self {
            base: BaseRepository::new(db),
        }
    }

    /// Generate the next sequential bill number.
    ///
    /// Format: BIL{YYYYMMDD}{sequence}, sequence starts at 10001.
    pub async fn next_bill_number(&self) -> RepoResult<String> {
        let seq = self.base.next_sequence("bill_number").await?;
        Ok(format!("BIL{}{}", today_compact(), 10000 + seq))
    }

    /// Parse a bill id string
    pub fn parse(&self, id: &str) -> RepoResult<RecordId> {
        parse_id(id, TABLE)
    }

    pub async fn find_by_id(&self, id: &RecordId) -> RepoResult<Option<Bill>> {
        let bill: Option<Bill> = self.base.db().select(id.clone()).await?;
        Ok(bill)
    }

    pub async fn find_by_id_required(&self, id: &RecordId) -> RepoResult<Bill> {
        self.find_by_id(id)
            .await?
            .ok_or_else(|| RepoError::NotFound(format!("Bill {} not found", id)))
    }

    /// Open (unpaid) bill referenced by any order on the given table.
    ///
    /// Bills carry no table field; the relation lives on the orders, so the
    /// lookup goes order -> bill and filters on payment status.
    pub async fn find_open_for_table(&self, table: &RecordId) -> RepoResult<Option<Bill>> {
        let bill_ids: Vec<RecordId> = self
            .base
            .db()
            .query("SELECT VALUE bill FROM order WHERE dining_table = $table AND bill != NONE")
            .bind(("table", table.clone()))
            .await?
            .take(0)?;
        if bill_ids.is_empty() {
            return Ok(None);
        }

        let mut bills: Vec<Bill> = self
            .base
            .db()
            .query("SELECT * FROM bill WHERE id IN $ids AND payment_status = 'PENDING' ORDER BY created_at DESC")
            .bind(("ids", bill_ids))
            .await?
            .take(0)?;
        Ok(if bills.is_empty() {
            None
        } else {
            Some(bills.remove(0))
        })
    }

    /// List bills filtered by payment status and creation time range
    pub async fn find_all(
        &self,
        payment_status: Option<PaymentStatus>,
        start_millis: Option<i64>,
        end_millis: Option<i64>,
    ) -> RepoResult<Vec<Bill>> {
        let mut conditions = Vec::new();
        if payment_status.is_some() {
            conditions.push("payment_status = $payment_status");
        }
        if start_millis.is_some() {
            conditions.push("created_at >= $start");
        }
        if end_millis.is_some() {
            conditions.push("created_at < $end");
        }
        let where_clause = if conditions.is_empty() {
            String::new()
        } else {
            format!(" WHERE {}", conditions.join(" AND "))
        };

        let query = format!("SELECT * FROM bill{} ORDER BY created_at DESC", where_clause);
        let mut request = self.base.db().query(query);
        if let Some(status) = payment_status {
            request = request.bind(("payment_status", status.as_str()));
        }
        if let Some(start) = start_millis {
            request = request.bind(("start", start));
        }
        if let Some(end) = end_millis {
            request = request.bind(("end", end));
        }

        let bills: Vec<Bill> = request.await?.take(0)?;
        Ok(bills)
    }

    /// Create a bill and attach the given orders to it, atomically.
    ///
    /// Orders are attached with a `bill = NONE` guard so a concurrently
    /// generated bill cannot claim the same order twice.
    pub async fn create_with_orders(
        &self,
        totals: &BillTotals,
        order_ids: Vec<RecordId>,
        user_id: &str,
        user_name: &str,
    ) -> RepoResult<Bill> {
        let bill_id = RecordId::from_table_key(TABLE, Uuid::new_v4().simple().to_string());
        let bill_number = self.next_bill_number().await?;
        let now = now_millis();

        self.base
            .db()
            .query(
                r#"
                BEGIN TRANSACTION;
                CREATE ONLY $bill_id CONTENT {
                    bill_number: $bill_number,
                    subtotal: $subtotal,
                    tax_amount: $tax_amount,
                    discount: $discount,
                    total_amount: $total_amount,
                    tax_lines: $tax_lines,
                    payment_mode: NONE,
                    payment_details: NONE,
                    payment_status: 'PENDING',
                    paid_at: NONE,
                    user_id: $user_id,
                    user_name: $user_name,
                    created_at: $now,
                    updated_at: $now
                };
                UPDATE order SET bill = $bill_id, updated_at = $now
                    WHERE id IN $order_ids AND bill = NONE;
                COMMIT TRANSACTION;
                "#,
            )
            .bind(("bill_id", bill_id.clone()))
            .bind(("bill_number", bill_number))
            .bind(("subtotal", totals.subtotal))
            .bind(("tax_amount", totals.tax_amount))
            .bind(("discount", totals.discount))
            .bind(("total_amount", totals.total_amount))
            .bind(("tax_lines", tax_lines_value(&totals.tax_lines)))
            .bind(("user_id", user_id.to_string()))
            .bind(("user_name", user_name.to_string()))
            .bind(("now", now))
            .bind(("order_ids", order_ids))
            .await?
            .check()?;

        self.find_by_id_required(&bill_id).await
    }

    /// Fold a new round of orders into an open bill: recompute the stored
    /// totals and tax snapshot, attach the new orders, all atomically
    pub async fn update_totals_and_attach(
        &self,
        bill_id: &RecordId,
        totals: &BillTotals,
        new_order_ids: Vec<RecordId>,
    ) -> RepoResult<Bill> {
        self.base
            .db()
            .query(
                r#"
                BEGIN TRANSACTION;
                UPDATE $bill_id SET
                    subtotal = $subtotal,
                    tax_amount = $tax_amount,
                    discount = $discount,
                    total_amount = $total_amount,
                    tax_lines = $tax_lines,
                    updated_at = $now;
                UPDATE order SET bill = $bill_id, updated_at = $now
                    WHERE id IN $order_ids AND bill = NONE;
                COMMIT TRANSACTION;
                "#,
            )
            .bind(("bill_id", bill_id.clone()))
            .bind(("subtotal", totals.subtotal))
            .bind(("tax_amount", totals.tax_amount))
            .bind(("discount", totals.discount))
            .bind(("total_amount", totals.total_amount))
            .bind(("tax_lines", tax_lines_value(&totals.tax_lines)))
            .bind(("now", now_millis()))
            .bind(("order_ids", new_order_ids))
            .await?
            .check()?;

        self.find_by_id_required(bill_id).await
    }

    /// Settle a bill: record the payment, complete every attached order and
    /// release tables whose active-order count reaches zero, atomically
    pub async fn complete_payment(
        &self,
        bill_id: &RecordId,
        payment_mode: PaymentMode,
        payment_details: Option<String>,
        tables: Vec<RecordId>,
    ) -> RepoResult<Bill> {
        let now = now_millis();

        self.base
            .db()
            .query(
                r#"
                BEGIN TRANSACTION;
                UPDATE $bill_id SET
                    payment_status = 'COMPLETED',
                    payment_mode = $payment_mode,
                    payment_details = $payment_details,
                    paid_at = $now,
                    updated_at = $now;
                UPDATE order SET status = 'COMPLETED', updated_at = $now
                    WHERE bill = $bill_id AND status != 'CANCELLED';
                FOR $table IN $tables {
                    LET $active = (SELECT VALUE count() FROM order WHERE dining_table = $table AND status NOT IN ['COMPLETED', 'CANCELLED'] GROUP ALL)[0] OR 0;
                    IF $active == 0 {
                        UPDATE $table SET status = 'AVAILABLE';
                    };
                };
                COMMIT TRANSACTION;
                "#,
            )
            .bind(("bill_id", bill_id.clone()))
            .bind(("payment_mode", payment_mode.as_str()))
            .bind(("payment_details", payment_details))
            .bind(("now", now))
            .bind(("tables", tables))
            .await?
            .check()?;

        self.find_by_id_required(bill_id).await
    }
}

fn tax_lines_value(lines: &[TaxLine]) -> Vec<serde_json::Value> {
    lines
        .iter()
        .map(|line| {
            json!({
                "name": line.name,
                "rate": line.rate,
                "amount": line.amount,
            })
        })
        .collect()
}
