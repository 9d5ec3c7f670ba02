//! Billing engine tests against an in-memory database

use surrealdb::Surreal;
use surrealdb::engine::local::{Db, Mem};

use super::*;
use crate::auth::{CurrentUser, Role};
use crate::db::define_schema;
use crate::db::models::{
    BillGenerateRequest, OrderStatus, OrderType, PaymentMode, PaymentRequest, PaymentStatus,
    SplitPaymentDetails, TableStatus,
};
use crate::db::repository::{DiningTableRepository, OrderRepository, TaxRepository};
use crate::db::repository::order::{NewOrder, NewOrderItem};
use surrealdb::RecordId;

async fn test_db() -> Surreal<Db> {
    let db = Surreal::new::<Mem>(()).await.expect("in-memory db");
    db.use_ns("mesa").use_db("pos").await.expect("ns/db");
    define_schema(&db).await.expect("schema");
    db
}

fn cashier() -> CurrentUser {
    CurrentUser {
        id: "user:cashier1".to_string(),
        username: "carla".to_string(),
        role: Role::Cashier,
    }
}

async fn seed_table(db: &Surreal<Db>, name: &str) -> RecordId {
    let repo = DiningTableRepository::new(db.clone());
    let table = repo
        .create(crate::db::models::DiningTableCreate {
            name: name.to_string(),
            capacity: Some(4),
            floor: None,
            position: None,
        })
        .await
        .expect("create table");
    table.id.expect("table id")
}

async fn seed_tax(db: &Surreal<Db>, name: &str, percentage: f64) {
    let repo = TaxRepository::new(db.clone());
    repo.create(crate::db::models::TaxCreate {
        name: name.to_string(),
        percentage,
        is_active: Some(true),
    })
    .await
    .expect("create tax");
}

async fn seed_menu_item(db: &Surreal<Db>, key: &str, name: &str, price: f64) -> RecordId {
    let id = RecordId::from_table_key("menu_item", key);
    db.query("CREATE ONLY $id CONTENT { name: $name, price: $price, is_active: true }")
        .bind(("id", id.clone()))
        .bind(("name", name.to_string()))
        .bind(("price", price))
        .await
        .expect("create menu item")
        .check()
        .expect("menu item insert");
    id
}

fn line(menu_item: &RecordId, name: &str, price: f64, quantity: i32) -> NewOrderItem {
    NewOrderItem {
        menu_item: menu_item.clone(),
        variant: None,
        name: name.to_string(),
        variant_name: None,
        price,
        quantity,
        note: None,
    }
}

async fn place_order(
    db: &Surreal<Db>,
    table: Option<RecordId>,
    items: Vec<NewOrderItem>,
) -> crate::db::models::Order {
    let repo = OrderRepository::new(db.clone());
    repo.create(
        NewOrder {
            order_type: if table.is_some() {
                OrderType::DineIn
            } else {
                OrderType::Takeaway
            },
            dining_table: table,
            customer_name: None,
            customer_phone: None,
            note: None,
        },
        items,
    )
    .await
    .expect("create order")
}

fn table_generate(table: &RecordId) -> BillGenerateRequest {
    BillGenerateRequest {
        table_id: Some(table.to_string()),
        order_id: None,
        discount: None,
    }
}

#[tokio::test]
async fn order_creation_occupies_the_table() {
    let db = test_db().await;
    let table = seed_table(&db, "T1").await;
    let dish = seed_menu_item(&db, "paneer", "Paneer Tikka", 100.0).await;

    let order = place_order(&db, Some(table.clone()), vec![line(&dish, "Paneer Tikka", 100.0, 2)])
        .await;

    assert_eq!(order.status, OrderStatus::Pending);
    assert!(order.order_number.starts_with("ORD"));

    let tables = DiningTableRepository::new(db.clone());
    let stored = tables.find_by_id(&table.to_string()).await.expect("find").expect("table");
    assert_eq!(stored.status, TableStatus::Occupied);
}

#[tokio::test]
async fn table_bill_consolidates_and_folds_in_new_rounds() {
    let db = test_db().await;
    let table = seed_table(&db, "T2").await;
    seed_tax(&db, "GST", 5.0).await;
    let dish = seed_menu_item(&db, "dish", "Dish", 100.0).await;

    place_order(&db, Some(table.clone()), vec![line(&dish, "Dish", 100.0, 2)]).await;

    let engine = BillingEngine::new(db.clone());
    let first = engine
        .generate(&table_generate(&table), &cashier())
        .await
        .expect("first bill");

    assert_eq!(first.bill.subtotal, 200.0);
    assert_eq!(first.bill.tax_amount, 10.0);
    assert_eq!(first.bill.total_amount, 210.0);
    assert_eq!(first.orders.len(), 1);

    // New round arrives on the same table
    place_order(&db, Some(table.clone()), vec![line(&dish, "Dish", 50.0, 1)]).await;

    let folded = engine
        .generate(&table_generate(&table), &cashier())
        .await
        .expect("folded bill");

    // Same bill, recomputed from the combined item set
    assert_eq!(folded.bill.id, first.bill.id);
    assert_eq!(folded.bill.bill_number, first.bill.bill_number);
    assert_eq!(folded.bill.subtotal, 250.0);
    assert_eq!(folded.bill.tax_amount, 12.5);
    assert_eq!(folded.bill.total_amount, 262.5);
    assert_eq!(folded.orders.len(), 2);
}

#[tokio::test]
async fn open_tab_discount_carries_forward_on_regeneration() {
    let db = test_db().await;
    let table = seed_table(&db, "T13").await;
    let dish = seed_menu_item(&db, "dish13", "Dish", 100.0).await;
    place_order(&db, Some(table.clone()), vec![line(&dish, "Dish", 100.0, 1)]).await;

    let engine = BillingEngine::new(db.clone());
    let first = engine
        .generate(
            &BillGenerateRequest {
                table_id: Some(table.to_string()),
                order_id: None,
                discount: Some(20.0),
            },
            &cashier(),
        )
        .await
        .expect("bill with discount");
    assert_eq!(first.bill.discount, 20.0);
    assert_eq!(first.bill.total_amount, 80.0);

    // New round, regenerated without an explicit discount: the open tab's
    // discount sticks while the totals are recomputed over the combined set
    place_order(&db, Some(table.clone()), vec![line(&dish, "Dish", 50.0, 1)]).await;
    let folded = engine
        .generate(&table_generate(&table), &cashier())
        .await
        .expect("folded bill");

    assert_eq!(folded.bill.id, first.bill.id);
    assert_eq!(folded.bill.subtotal, 150.0);
    assert_eq!(folded.bill.discount, 20.0);
    assert_eq!(folded.bill.total_amount, 130.0);

    // An explicit discount on regeneration overrides the carried one
    let overridden = engine
        .generate(
            &BillGenerateRequest {
                table_id: Some(table.to_string()),
                order_id: None,
                discount: Some(5.0),
            },
            &cashier(),
        )
        .await
        .expect("re-discounted bill");
    assert_eq!(overridden.bill.discount, 5.0);
    assert_eq!(overridden.bill.total_amount, 145.0);
}

#[tokio::test]
async fn regenerating_without_new_orders_is_idempotent() {
    let db = test_db().await;
    let table = seed_table(&db, "T3").await;
    let dish = seed_menu_item(&db, "dish3", "Dish", 80.0).await;
    place_order(&db, Some(table.clone()), vec![line(&dish, "Dish", 80.0, 1)]).await;

    let engine = BillingEngine::new(db.clone());
    let first = engine.generate(&table_generate(&table), &cashier()).await.expect("bill");
    let second = engine.generate(&table_generate(&table), &cashier()).await.expect("re-bill");

    assert_eq!(first.bill.id, second.bill.id);
    assert_eq!(second.bill.total_amount, 80.0);
    assert_eq!(second.orders.len(), 1);
}

#[tokio::test]
async fn order_mode_rejects_an_already_billed_order() {
    let db = test_db().await;
    let dish = seed_menu_item(&db, "togo", "To Go", 60.0).await;
    let order = place_order(&db, None, vec![line(&dish, "To Go", 60.0, 1)]).await;
    let order_id = order.id.expect("order id");

    let engine = BillingEngine::new(db.clone());
    let request = BillGenerateRequest {
        table_id: None,
        order_id: Some(order_id.to_string()),
        discount: None,
    };

    engine.generate(&request, &cashier()).await.expect("first bill");
    let second = engine.generate(&request, &cashier()).await;
    assert!(second.is_err(), "second billing of the same order must fail");
}

#[tokio::test]
async fn billing_a_table_without_active_orders_is_not_found() {
    let db = test_db().await;
    let table = seed_table(&db, "T4").await;

    let engine = BillingEngine::new(db.clone());
    let result = engine.generate(&table_generate(&table), &cashier()).await;
    assert!(result.is_err());
}

#[tokio::test]
async fn discount_cannot_exceed_the_subtotal() {
    let db = test_db().await;
    let table = seed_table(&db, "T5").await;
    let dish = seed_menu_item(&db, "dish5", "Dish", 50.0).await;
    place_order(&db, Some(table.clone()), vec![line(&dish, "Dish", 50.0, 1)]).await;

    let engine = BillingEngine::new(db.clone());
    let request = BillGenerateRequest {
        table_id: Some(table.to_string()),
        order_id: None,
        discount: Some(60.0),
    };
    assert!(engine.generate(&request, &cashier()).await.is_err());
}

#[tokio::test]
async fn split_payment_must_match_the_total_within_tolerance() {
    let db = test_db().await;
    let table = seed_table(&db, "T6").await;
    seed_tax(&db, "GST", 5.0).await;
    let dish = seed_menu_item(&db, "dish6", "Dish", 125.0).await;
    place_order(&db, Some(table.clone()), vec![line(&dish, "Dish", 125.0, 2)]).await;

    let engine = BillingEngine::new(db.clone());
    let bill = engine.generate(&table_generate(&table), &cashier()).await.expect("bill");
    let bill_id = bill.bill.id.expect("bill id");
    assert_eq!(bill.bill.total_amount, 262.5);

    // 100 + 149.50 = 249.50, off by 13.00
    let short = PaymentRequest {
        payment_mode: PaymentMode::CashUpi,
        payment_details: Some(SplitPaymentDetails {
            cash: 100.0,
            upi: 149.50,
        }),
    };
    assert!(engine.pay(&bill_id, &short).await.is_err());

    // Bill must remain unpaid after the failed attempt
    let detail = engine.detail(&bill_id).await.expect("detail");
    assert_eq!(detail.bill.payment_status, PaymentStatus::Pending);

    let exact = PaymentRequest {
        payment_mode: PaymentMode::CashUpi,
        payment_details: Some(SplitPaymentDetails {
            cash: 100.0,
            upi: 162.5,
        }),
    };
    let paid = engine.pay(&bill_id, &exact).await.expect("payment");
    assert_eq!(paid.bill.payment_status, PaymentStatus::Completed);
    assert!(paid.bill.paid_at.is_some());
}

#[tokio::test]
async fn payment_completes_orders_and_releases_the_table() {
    let db = test_db().await;
    let table = seed_table(&db, "T7").await;
    let dish = seed_menu_item(&db, "dish7", "Dish", 90.0).await;
    place_order(&db, Some(table.clone()), vec![line(&dish, "Dish", 90.0, 1)]).await;

    let engine = BillingEngine::new(db.clone());
    let bill = engine.generate(&table_generate(&table), &cashier()).await.expect("bill");
    let bill_id = bill.bill.id.expect("bill id");

    let paid = engine
        .pay(
            &bill_id,
            &PaymentRequest {
                payment_mode: PaymentMode::Cash,
                payment_details: None,
            },
        )
        .await
        .expect("payment");

    for order in &paid.orders {
        assert_eq!(order.order.status, OrderStatus::Completed);
    }

    let tables = DiningTableRepository::new(db.clone());
    let stored = tables.find_by_id(&table.to_string()).await.expect("find").expect("table");
    assert_eq!(stored.status, TableStatus::Available);
}

#[tokio::test]
async fn paying_twice_is_a_conflict() {
    let db = test_db().await;
    let table = seed_table(&db, "T8").await;
    let dish = seed_menu_item(&db, "dish8", "Dish", 40.0).await;
    place_order(&db, Some(table.clone()), vec![line(&dish, "Dish", 40.0, 1)]).await;

    let engine = BillingEngine::new(db.clone());
    let bill = engine.generate(&table_generate(&table), &cashier()).await.expect("bill");
    let bill_id = bill.bill.id.expect("bill id");

    let cash = PaymentRequest {
        payment_mode: PaymentMode::Cash,
        payment_details: None,
    };
    engine.pay(&bill_id, &cash).await.expect("first payment");
    assert!(engine.pay(&bill_id, &cash).await.is_err());
}

#[tokio::test]
async fn table_stays_occupied_while_any_order_is_active() {
    let db = test_db().await;
    let table = seed_table(&db, "T9").await;
    let dish = seed_menu_item(&db, "dish9", "Dish", 30.0).await;

    let first = place_order(&db, Some(table.clone()), vec![line(&dish, "Dish", 30.0, 1)]).await;
    let second = place_order(&db, Some(table.clone()), vec![line(&dish, "Dish", 30.0, 1)]).await;

    let orders = OrderRepository::new(db.clone());
    let tables = DiningTableRepository::new(db.clone());

    orders
        .update_status(&first.id.expect("id"), OrderStatus::Cancelled)
        .await
        .expect("cancel first");
    let stored = tables.find_by_id(&table.to_string()).await.expect("find").expect("table");
    assert_eq!(stored.status, TableStatus::Occupied);

    orders
        .update_status(&second.id.expect("id"), OrderStatus::Cancelled)
        .await
        .expect("cancel second");
    let stored = tables.find_by_id(&table.to_string()).await.expect("find").expect("table");
    assert_eq!(stored.status, TableStatus::Available);
}

#[tokio::test]
async fn status_transitions_follow_the_lifecycle() {
    let db = test_db().await;
    let dish = seed_menu_item(&db, "dish10", "Dish", 30.0).await;
    let order = place_order(&db, None, vec![line(&dish, "Dish", 30.0, 1)]).await;
    let id = order.id.expect("id");

    let orders = OrderRepository::new(db.clone());

    // PENDING cannot jump straight to SERVED
    assert!(orders.update_status(&id, OrderStatus::Served).await.is_err());

    let order = orders.update_status(&id, OrderStatus::Preparing).await.expect("preparing");
    assert_eq!(order.status, OrderStatus::Preparing);
    let order = orders.update_status(&id, OrderStatus::Ready).await.expect("ready");
    assert_eq!(order.status, OrderStatus::Ready);

    // COMPLETED is reserved for the payment path
    assert!(orders.update_status(&id, OrderStatus::Completed).await.is_err());

    let order = orders.update_status(&id, OrderStatus::Cancelled).await.expect("cancel");
    assert_eq!(order.status, OrderStatus::Cancelled);

    // Terminal states accept no further transitions
    assert!(orders.update_status(&id, OrderStatus::Pending).await.is_err());
}

#[tokio::test]
async fn items_cannot_be_removed_after_billing() {
    let db = test_db().await;
    let table = seed_table(&db, "T11").await;
    let dish = seed_menu_item(&db, "dish11", "Dish", 30.0).await;
    let order = place_order(&db, Some(table.clone()), vec![line(&dish, "Dish", 30.0, 2)]).await;
    let order_id = order.id.expect("id");

    let orders = OrderRepository::new(db.clone());
    let items = orders.items_of(&order_id).await.expect("items");
    let item_id = items[0].id.clone().expect("item id");

    let engine = BillingEngine::new(db.clone());
    engine.generate(&table_generate(&table), &cashier()).await.expect("bill");

    let result = orders.delete_item(&order_id, &item_id.to_string()).await;
    assert!(result.is_err(), "billed orders must keep their items");
}

#[tokio::test]
async fn tax_snapshot_survives_later_rate_changes() {
    let db = test_db().await;
    let table = seed_table(&db, "T12").await;
    seed_tax(&db, "GST", 5.0).await;
    let dish = seed_menu_item(&db, "dish12", "Dish", 100.0).await;
    place_order(&db, Some(table.clone()), vec![line(&dish, "Dish", 100.0, 1)]).await;

    let engine = BillingEngine::new(db.clone());
    let bill = engine.generate(&table_generate(&table), &cashier()).await.expect("bill");
    let bill_id = bill.bill.id.clone().expect("bill id");
    assert_eq!(bill.bill.tax_lines.len(), 1);
    assert_eq!(bill.bill.tax_lines[0].rate, 5.0);
    assert_eq!(bill.bill.tax_lines[0].amount, 5.0);

    // Deactivate the tax afterwards; the stored snapshot must not move
    let taxes = TaxRepository::new(db.clone());
    let all = taxes.find_all().await.expect("taxes");
    taxes
        .update(
            &all[0].id.clone().expect("tax id").to_string(),
            crate::db::models::TaxUpdate {
                name: None,
                percentage: Some(12.0),
                is_active: None,
            },
        )
        .await
        .expect("update tax");

    let detail = engine.detail(&bill_id).await.expect("detail");
    let receipt = render_receipt(&detail, "Mesa POS");
    assert_eq!(receipt.tax_lines.len(), 1);
    assert_eq!(receipt.tax_lines[0].rate, 5.0);
    assert_eq!(receipt.tax_amount, 5.0);
    assert_eq!(receipt.total_amount, 105.0);
    assert_eq!(receipt.order_numbers.len(), 1);
    assert_eq!(receipt.lines.len(), 1);
    assert_eq!(receipt.lines[0].line_total, 100.0);
}
