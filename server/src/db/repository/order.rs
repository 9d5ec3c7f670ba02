//! Order Repository
//!
//! 订单及明细的读写。所有改变桌台占用状态的写路径都在同一个
//! SurrealDB 事务内完成：桌台释放取决于该桌活跃订单数是否归零，
//! 而不是无条件置空。

use super::{BaseRepository, RepoError, RepoResult, parse_id};
use crate::db::models::{
    DiningTable, Order, OrderDetail, OrderItem, OrderStatus, OrderType, TableStatus,
};
use crate::money;
use crate::utils::time::{now_millis, today_compact};
use serde_json::json;
use surrealdb::engine::local::Db;
use surrealdb::{RecordId, Surreal};
use uuid::Uuid;

const TABLE: &str = "order";

/// Statuses that keep a table occupied
const ACTIVE_FILTER: &str = "status NOT IN ['COMPLETED', 'CANCELLED']";

/// Prepared line item for order creation (price already snapshotted)
#[derive(Debug, Clone)]
pub struct NewOrderItem {
    pub menu_item: RecordId,
    pub variant: Option<RecordId>,
    pub name: String,
    pub variant_name: Option<String>,
    pub price: f64,
    pub quantity: i32,
    pub note: Option<String>,
}

/// Prepared order header for creation
#[derive(Debug, Clone)]
pub struct NewOrder {
    pub order_type: OrderType,
    pub dining_table: Option<RecordId>,
    pub customer_name: Option<String>,
    pub customer_phone: Option<String>,
    pub note: Option<String>,
}

#[derive(Clone)]
pub struct OrderRepository {
    base: BaseRepository,
}

impl OrderRepository {
    pub fn new(db: Surreal<Db>) -> Self {
        Self {
            base: BaseRepository::new(db),
        }
    }

    /// Generate the next sequential order number.
    ///
    /// Format: ORD{YYYYMMDD}{sequence}, sequence starts at 10001.
    pub async fn next_order_number(&self) -> RepoResult<String> {
        let seq = self.base.next_sequence("order_number").await?;
        Ok(format!("ORD{}{}", today_compact(), 10000 + seq))
    }

    /// Create an order with its items in one transaction.
    ///
    /// For dine-in orders the table is marked OCCUPIED in the same
    /// transaction that creates the order.
    pub async fn create(&self, order: NewOrder, items: Vec<NewOrderItem>) -> RepoResult<Order> {
        let order_id = RecordId::from_table_key(TABLE, Uuid::new_v4().simple().to_string());
        let order_number = self.next_order_number().await?;
        let now = now_millis();

        // Record links are cast in-script from "table:key" strings so the
        // whole item batch can travel through a single bind.
        let item_values: Vec<serde_json::Value> = items
            .iter()
            .map(|item| {
                json!({
                    "menu_item": item.menu_item.to_string(),
                    "variant": item.variant.as_ref().map(|v| v.to_string()),
                    "name": item.name,
                    "variant_name": item.variant_name,
                    "price": item.price,
                    "quantity": item.quantity,
                    "note": item.note,
                })
            })
            .collect();

        self.base
            .db()
            .query(
                r#"
                BEGIN TRANSACTION;
                CREATE ONLY $order_id CONTENT {
                    order_number: $order_number,
                    order_type: $order_type,
                    dining_table: $dining_table,
                    customer_name: $customer_name,
                    customer_phone: $customer_phone,
                    note: $note,
                    status: 'PENDING',
                    bill: NONE,
                    created_at: $now,
                    updated_at: $now
                };
                FOR $item IN $items {
                    CREATE order_item CONTENT {
                        order_ref: $order_id,
                        menu_item: <record> $item.menu_item,
                        variant: IF $item.variant != NONE THEN <record> $item.variant ELSE NONE END,
                        name: $item.name,
                        variant_name: $item.variant_name,
                        price: $item.price,
                        quantity: $item.quantity,
                        note: $item.note
                    };
                };
                IF $dining_table != NONE {
                    UPDATE $dining_table SET status = 'OCCUPIED';
                };
                COMMIT TRANSACTION;
                "#,
            )
            .bind(("order_id", order_id.clone()))
            .bind(("order_number", order_number))
            .bind(("order_type", order.order_type))
            .bind(("dining_table", order.dining_table))
            .bind(("customer_name", order.customer_name))
            .bind(("customer_phone", order.customer_phone))
            .bind(("note", order.note))
            .bind(("now", now))
            .bind(("items", item_values))
            .await?
            .check()?;

        self.find_by_id_required(&order_id).await
    }

    /// Find order by id
    pub async fn find_by_id(&self, id: &RecordId) -> RepoResult<Option<Order>> {
        let order: Option<Order> = self.base.db().select(id.clone()).await?;
        Ok(order)
    }

    async fn find_by_id_required(&self, id: &RecordId) -> RepoResult<Order> {
        self.find_by_id(id)
            .await?
            .ok_or_else(|| RepoError::NotFound(format!("Order {} not found", id)))
    }

    /// Parse an order id string
    pub fn parse(&self, id: &str) -> RepoResult<RecordId> {
        parse_id(id, TABLE)
    }

    /// Items of one order
    pub async fn items_of(&self, order_id: &RecordId) -> RepoResult<Vec<OrderItem>> {
        let items: Vec<OrderItem> = self
            .base
            .db()
            .query("SELECT * FROM order_item WHERE order_ref = $order")
            .bind(("order", order_id.clone()))
            .await?
            .take(0)?;
        Ok(items)
    }

    /// Order with items, derived total and table name
    pub async fn detail(&self, id: &RecordId) -> RepoResult<Option<OrderDetail>> {
        let Some(order) = self.find_by_id(id).await? else {
            return Ok(None);
        };
        Ok(Some(self.to_detail(order).await?))
    }

    /// Assemble the detail view for an already-loaded order
    pub async fn to_detail(&self, order: Order) -> RepoResult<OrderDetail> {
        let order_id = order
            .id
            .clone()
            .ok_or_else(|| RepoError::Database("Order record without id".to_string()))?;
        let items = self.items_of(&order_id).await?;
        let total = money::to_f64(money::items_subtotal(&items));

        let table_name = match &order.dining_table {
            Some(table_id) => {
                let table: Option<DiningTable> = self.base.db().select(table_id.clone()).await?;
                table.map(|t| t.name)
            }
            None => None,
        };

        Ok(OrderDetail {
            order,
            items,
            total,
            table_name,
        })
    }

    /// List orders, optionally filtered by status and/or table
    pub async fn find_all(
        &self,
        status: Option<OrderStatus>,
        table: Option<RecordId>,
    ) -> RepoResult<Vec<Order>> {
        let mut conditions = Vec::new();
        if status.is_some() {
            conditions.push("status = $status");
        }
        if table.is_some() {
            conditions.push("dining_table = $table");
        }
        let where_clause = if conditions.is_empty() {
            String::new()
        } else {
            format!(" WHERE {}", conditions.join(" AND "))
        };

        let query = format!("SELECT * FROM order{} ORDER BY created_at DESC", where_clause);
        let mut request = self.base.db().query(query);
        if let Some(status) = status {
            request = request.bind(("status", status.as_str()));
        }
        if let Some(table) = table {
            request = request.bind(("table", table));
        }

        let orders: Vec<Order> = request.await?.take(0)?;
        Ok(orders)
    }

    /// Active orders bound to a table (the occupancy justification)
    pub async fn active_for_table(&self, table: &RecordId) -> RepoResult<Vec<Order>> {
        let query = format!(
            "SELECT * FROM order WHERE dining_table = $table AND {} ORDER BY created_at",
            ACTIVE_FILTER
        );
        let orders: Vec<Order> = self
            .base
            .db()
            .query(query)
            .bind(("table", table.clone()))
            .await?
            .take(0)?;
        Ok(orders)
    }

    /// Active orders for a table that have no bill yet (the "new round")
    /// captured when re-generating a bill for an already-billed table
    pub async fn unbilled_active_for_table(&self, table: &RecordId) -> RepoResult<Vec<Order>> {
        let query = format!(
            "SELECT * FROM order WHERE dining_table = $table AND bill = NONE AND {} ORDER BY created_at",
            ACTIVE_FILTER
        );
        let orders: Vec<Order> = self
            .base
            .db()
            .query(query)
            .bind(("table", table.clone()))
            .await?
            .take(0)?;
        Ok(orders)
    }

    /// Orders attached to a bill
    pub async fn for_bill(&self, bill: &RecordId) -> RepoResult<Vec<Order>> {
        let orders: Vec<Order> = self
            .base
            .db()
            .query("SELECT * FROM order WHERE bill = $bill ORDER BY created_at")
            .bind(("bill", bill.clone()))
            .await?
            .take(0)?;
        Ok(orders)
    }

    /// Drive a status transition through the explicit transition table.
    ///
    /// On CANCELLED the table is released in the same transaction iff no
    /// other active order still references it.
    pub async fn update_status(&self, id: &RecordId, next: OrderStatus) -> RepoResult<Order> {
        let order = self.find_by_id_required(id).await?;

        if !order.status.can_transition_to(next) {
            return Err(RepoError::Conflict(format!(
                "Invalid status transition {} -> {}",
                order.status.as_str(),
                next.as_str()
            )));
        }

        let release_table = format!(
            r#"
            BEGIN TRANSACTION;
            UPDATE $order SET status = $status, updated_at = $now;
            IF $table != NONE {{
                LET $active = (SELECT VALUE count() FROM order WHERE dining_table = $table AND {} GROUP ALL)[0] OR 0;
                IF $active == 0 {{
                    UPDATE $table SET status = 'AVAILABLE';
                }};
            }};
            COMMIT TRANSACTION;
            "#,
            ACTIVE_FILTER
        );

        self.base
            .db()
            .query(release_table)
            .bind(("order", id.clone()))
            .bind(("status", next.as_str()))
            .bind(("table", order.dining_table.clone()))
            .bind(("now", now_millis()))
            .await?
            .check()?;

        self.find_by_id_required(id).await
    }

    /// Delete an order and its items; releases the table when the deleted
    /// order was the last active one on it
    pub async fn delete(&self, id: &RecordId) -> RepoResult<bool> {
        let order = self.find_by_id_required(id).await?;

        let script = format!(
            r#"
            BEGIN TRANSACTION;
            DELETE order_item WHERE order_ref = $order;
            DELETE $order;
            IF $table != NONE {{
                LET $active = (SELECT VALUE count() FROM order WHERE dining_table = $table AND {} GROUP ALL)[0] OR 0;
                IF $active == 0 {{
                    UPDATE $table SET status = 'AVAILABLE';
                }};
            }};
            COMMIT TRANSACTION;
            "#,
            ACTIVE_FILTER
        );

        self.base
            .db()
            .query(script)
            .bind(("order", id.clone()))
            .bind(("table", order.dining_table))
            .await?
            .check()?;

        Ok(true)
    }

    /// Remove one item from an unbilled, non-terminal order.
    ///
    /// Billed and finalized orders are financial records; their item sets
    /// must not change retroactively.
    pub async fn delete_item(&self, order_id: &RecordId, item_id: &str) -> RepoResult<bool> {
        let order = self.find_by_id_required(order_id).await?;

        if order.bill.is_some() {
            return Err(RepoError::Conflict(
                "Cannot delete items from an order that has a bill".to_string(),
            ));
        }
        if order.status.is_terminal() {
            return Err(RepoError::Conflict(format!(
                "Cannot delete items from a {} order",
                order.status.as_str()
            )));
        }

        let item_thing = parse_id(item_id, "order_item")?;
        let item: Option<OrderItem> = self.base.db().select(item_thing.clone()).await?;
        let item =
            item.ok_or_else(|| RepoError::NotFound(format!("Order item {} not found", item_id)))?;
        if &item.order != order_id {
            return Err(RepoError::Validation(format!(
                "Item {} does not belong to order {}",
                item_id, order_id
            )));
        }

        self.base
            .db()
            .query("DELETE $item")
            .bind(("item", item_thing))
            .await?;
        Ok(true)
    }

    /// Table record lookup used by validation paths
    pub async fn table_status(&self, table: &RecordId) -> RepoResult<Option<TableStatus>> {
        let table: Option<DiningTable> = self.base.db().select(table.clone()).await?;
        Ok(table.map(|t| t.status))
    }
}
