//! Bill generation and consolidation
//!
//! 账单生成的两种模式：
//! - 桌台模式：把该桌全部活跃订单并入一张账单。桌上已有未支付账单时
//!   追加合并 (fold-in)：新订单挂接到旧账单，金额整体重算后覆盖。
//! - 订单模式：单独为一个订单开票，已有账单则拒绝。
//!
//! 金额永远从当前订单明细整体重算，不做增量修补。

use rust_decimal::Decimal;
use surrealdb::Surreal;
use surrealdb::engine::local::Db;

use surrealdb::RecordId;

use crate::auth::CurrentUser;
use crate::db::models::{Bill, BillDetail, BillGenerateRequest, Order, OrderDetail};
use crate::db::repository::{
    BillRepository, OrderRepository, RepoError, TaxRepository, parse_id,
};
use crate::money;
use crate::utils::{AppError, AppResult};

/// Billing engine over the order, bill and tax repositories
#[derive(Clone)]
pub struct BillingEngine {
    orders: OrderRepository,
    bills: BillRepository,
    taxes: TaxRepository,
}

impl BillingEngine {
    pub fn new(db: Surreal<Db>) -> Self {
        Self {
            orders: OrderRepository::new(db.clone()),
            bills: BillRepository::new(db.clone()),
            taxes: TaxRepository::new(db),
        }
    }

    /// Generate (or fold) a bill per the request mode
    pub async fn generate(
        &self,
        request: &BillGenerateRequest,
        user: &CurrentUser,
    ) -> AppResult<BillDetail> {
        match (&request.table_id, &request.order_id) {
            (Some(table_id), None) => {
                self.generate_for_table(table_id, request.discount, user).await
            }
            (None, Some(order_id)) => {
                self.generate_for_order(order_id, request.discount, user).await
            }
            _ => Err(AppError::validation(
                "Exactly one of table_id or order_id must be provided",
            )),
        }
    }

    /// Table mode: consolidate every active order on the table.
    ///
    /// With an open bill already on the table, new unbilled rounds are
    /// attached to it and the stored totals are recomputed from the full
    /// combined item set. Re-generating with no new orders is a no-op
    /// recomputation, so the call is idempotent.
    async fn generate_for_table(
        &self,
        table_id: &str,
        discount: Option<f64>,
        user: &CurrentUser,
    ) -> AppResult<BillDetail> {
        let table = parse_id(table_id, "dining_table")?;
        if self.orders.table_status(&table).await?.is_none() {
            return Err(AppError::not_found(format!("Table {} not found", table_id)));
        }

        let open_bill = self.bills.find_open_for_table(&table).await?;
        let new_orders = self.orders.unbilled_active_for_table(&table).await?;

        match open_bill {
            Some(bill) => {
                let bill_id = bill_record_id(&bill)?;
                let mut combined = self.orders.for_bill(&bill_id).await?;
                combined.extend(new_orders.iter().cloned());

                let subtotal = self.combined_subtotal(&combined).await?;
                let discount = discount.unwrap_or(bill.discount);
                let totals = self.compute_totals(subtotal, discount).await?;

                let new_ids = order_record_ids(&new_orders)?;
                let updated = self
                    .bills
                    .update_totals_and_attach(&bill_id, &totals, new_ids)
                    .await?;
                self.detail_of(updated).await
            }
            None => {
                if new_orders.is_empty() {
                    return Err(AppError::not_found("No active orders to bill"));
                }

                let subtotal = self.combined_subtotal(&new_orders).await?;
                let totals = self.compute_totals(subtotal, discount.unwrap_or(0.0)).await?;

                let order_ids = order_record_ids(&new_orders)?;
                let bill = self
                    .bills
                    .create_with_orders(&totals, order_ids, &user.id, &user.username)
                    .await?;
                self.detail_of(bill).await
            }
        }
    }

    /// Order mode: bill a single order on its own
    async fn generate_for_order(
        &self,
        order_id: &str,
        discount: Option<f64>,
        user: &CurrentUser,
    ) -> AppResult<BillDetail> {
        let order_rid = self.orders.parse(order_id)?;
        let order = self
            .orders
            .find_by_id(&order_rid)
            .await?
            .ok_or_else(|| AppError::not_found(format!("Order {} not found", order_id)))?;

        if order.bill.is_some() {
            return Err(AppError::conflict("Bill already generated for this order"));
        }

        let subtotal = self.combined_subtotal(std::slice::from_ref(&order)).await?;
        let totals = self.compute_totals(subtotal, discount.unwrap_or(0.0)).await?;

        let bill = self
            .bills
            .create_with_orders(&totals, vec![order_rid], &user.id, &user.username)
            .await?;
        self.detail_of(bill).await
    }

    /// Subtotal over the items of every order in the set
    async fn combined_subtotal(&self, orders: &[Order]) -> AppResult<Decimal> {
        let mut subtotal = Decimal::ZERO;
        for order in orders {
            let order_id = order_record_id(order)?;
            let items = self.orders.items_of(&order_id).await?;
            subtotal += money::items_subtotal(&items);
        }
        Ok(subtotal)
    }

    /// Totals under the currently active taxes, with discount validation
    async fn compute_totals(
        &self,
        subtotal: Decimal,
        discount: f64,
    ) -> AppResult<money::BillTotals> {
        money::validate_discount(discount, subtotal)?;
        let active_taxes = self.taxes.find_active().await?;
        Ok(money::bill_totals(subtotal, &active_taxes, discount))
    }

    /// Load a bill with its attached order details
    pub async fn detail(&self, bill_id: &RecordId) -> AppResult<BillDetail> {
        let bill = self.bills.find_by_id_required(bill_id).await?;
        self.detail_of(bill).await
    }

    pub(crate) async fn detail_of(&self, bill: Bill) -> AppResult<BillDetail> {
        let bill_id = bill_record_id(&bill)?;
        let orders = self.orders.for_bill(&bill_id).await?;

        let mut details: Vec<OrderDetail> = Vec::with_capacity(orders.len());
        for order in orders {
            details.push(self.orders.to_detail(order).await?);
        }

        Ok(BillDetail {
            bill,
            orders: details,
        })
    }

    pub fn bills(&self) -> &BillRepository {
        &self.bills
    }

    pub fn orders(&self) -> &OrderRepository {
        &self.orders
    }
}

fn bill_record_id(bill: &Bill) -> Result<RecordId, RepoError> {
    bill.id
        .clone()
        .ok_or_else(|| RepoError::Database("Bill record without id".to_string()))
}

fn order_record_id(order: &Order) -> Result<RecordId, RepoError> {
    order
        .id
        .clone()
        .ok_or_else(|| RepoError::Database("Order record without id".to_string()))
}

fn order_record_ids(orders: &[Order]) -> Result<Vec<RecordId>, RepoError> {
    orders.iter().map(order_record_id).collect()
}
