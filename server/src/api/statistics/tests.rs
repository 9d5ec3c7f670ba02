use super::handler::{payment_buckets, round2};
use crate::db::models::{Bill, PaymentMode, PaymentStatus};

fn paid_bill(mode: PaymentMode, total: f64, details: Option<&str>) -> Bill {
    Bill {
        id: None,
        bill_number: "BIL2026082910001".to_string(),
        subtotal: total,
        tax_amount: 0.0,
        discount: 0.0,
        total_amount: total,
        tax_lines: vec![],
        payment_mode: Some(mode),
        payment_details: details.map(|d| d.to_string()),
        payment_status: PaymentStatus::Completed,
        paid_at: Some(1_700_000_000_000),
        user_id: "user:1".to_string(),
        user_name: "carla".to_string(),
        created_at: 1_700_000_000_000,
        updated_at: 1_700_000_000_000,
    }
}

#[test]
fn single_modes_bucket_by_total() {
    let bills = vec![
        paid_bill(PaymentMode::Cash, 100.0, None),
        paid_bill(PaymentMode::Cash, 50.0, None),
        paid_bill(PaymentMode::Card, 80.0, None),
    ];
    let rows = payment_buckets(&bills);

    let cash = rows.iter().find(|r| r.mode == "CASH").expect("cash bucket");
    assert_eq!(cash.bill_count, 2);
    assert_eq!(cash.amount, 150.0);

    let card = rows.iter().find(|r| r.mode == "CARD").expect("card bucket");
    assert_eq!(card.bill_count, 1);
    assert_eq!(card.amount, 80.0);
}

#[test]
fn split_payments_distribute_across_cash_and_upi() {
    let bills = vec![paid_bill(
        PaymentMode::CashUpi,
        262.5,
        Some(r#"{"cash":100.0,"upi":162.5}"#),
    )];
    let rows = payment_buckets(&bills);

    let cash = rows.iter().find(|r| r.mode == "CASH").expect("cash bucket");
    assert_eq!(cash.amount, 100.0);
    let upi = rows.iter().find(|r| r.mode == "UPI").expect("upi bucket");
    assert_eq!(upi.amount, 162.5);
    assert!(rows.iter().all(|r| r.mode != "CASH_UPI"));
}

#[test]
fn corrupt_split_details_fall_back_to_combined_bucket() {
    let bills = vec![
        paid_bill(PaymentMode::CashUpi, 120.0, Some("not-json")),
        paid_bill(PaymentMode::CashUpi, 30.0, None),
    ];
    let rows = payment_buckets(&bills);

    let combined = rows
        .iter()
        .find(|r| r.mode == "CASH_UPI")
        .expect("combined bucket");
    assert_eq!(combined.bill_count, 2);
    assert_eq!(combined.amount, 150.0);
}

#[test]
fn pending_bills_are_ignored() {
    let mut bill = paid_bill(PaymentMode::Cash, 75.0, None);
    bill.payment_status = PaymentStatus::Pending;
    assert!(payment_buckets(&[bill]).is_empty());
}

#[test]
fn round2_normalizes_float_accumulation() {
    assert_eq!(round2(0.1 + 0.2), 0.3);
    assert_eq!(round2(1.0 / 3.0), 0.33);
}
