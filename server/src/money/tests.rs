use super::*;
use crate::db::models::{OrderItem, Tax};
use surrealdb::RecordId;

fn item(price: f64, quantity: i32) -> OrderItem {
    OrderItem {
        id: None,
        order: RecordId::from_table_key("order", "o1"),
        menu_item: RecordId::from_table_key("menu_item", "m1"),
        variant: None,
        name: "Test Item".to_string(),
        variant_name: None,
        price,
        quantity,
        note: None,
    }
}

fn tax(name: &str, percentage: f64) -> Tax {
    Tax {
        id: None,
        name: name.to_string(),
        percentage,
        is_active: true,
        created_at: 0,
        updated_at: 0,
    }
}

#[test]
fn line_total_multiplies_price_by_quantity() {
    assert_eq!(line_total(&item(125.0, 2)), to_decimal(250.0));
    assert_eq!(line_total(&item(0.5, 3)), to_decimal(1.5));
}

#[test]
fn subtotal_sums_all_lines() {
    let items = vec![item(100.0, 2), item(25.0, 2)];
    assert_eq!(items_subtotal(&items), to_decimal(250.0));
}

#[test]
fn tax_breakdown_computes_per_line_amounts() {
    let taxes = vec![tax("CGST", 2.5), tax("SGST", 2.5)];
    let (lines, total) = tax_breakdown(to_decimal(250.0), &taxes);

    assert_eq!(lines.len(), 2);
    assert_eq!(lines[0].name, "CGST");
    assert_eq!(lines[0].rate, 2.5);
    assert_eq!(lines[0].amount, 6.25);
    assert_eq!(lines[1].amount, 6.25);
    assert_eq!(total, to_decimal(12.50));
}

#[test]
fn tax_breakdown_five_percent_of_250_is_12_50() {
    let taxes = vec![tax("GST", 5.0)];
    let (_, total) = tax_breakdown(to_decimal(250.0), &taxes);
    assert_eq!(total, to_decimal(12.50));
}

#[test]
fn tax_breakdown_empty_when_no_active_taxes() {
    let (lines, total) = tax_breakdown(to_decimal(250.0), &[]);
    assert!(lines.is_empty());
    assert_eq!(total, Decimal::ZERO);
}

#[test]
fn bill_totals_honor_the_arithmetic_invariant() {
    let taxes = vec![tax("GST", 5.0)];
    let totals = bill_totals(to_decimal(250.0), &taxes, 10.0);

    assert_eq!(totals.subtotal, 250.0);
    assert_eq!(totals.tax_amount, 12.5);
    assert_eq!(totals.discount, 10.0);
    assert_eq!(totals.total_amount, 252.5);
    assert!(
        (totals.total_amount - (totals.subtotal + totals.tax_amount - totals.discount)).abs()
            < 1e-9
    );
}

#[test]
fn bill_totals_round_to_two_decimal_places() {
    // 33.33 * 3 = 99.99; 5% of 99.99 = 4.9995 -> 5.00
    let taxes = vec![tax("GST", 5.0)];
    let totals = bill_totals(to_decimal(99.99), &taxes, 0.0);
    assert_eq!(totals.tax_amount, 5.0);
    assert_eq!(totals.total_amount, 104.99);
}

#[test]
fn amounts_match_within_one_cent() {
    assert!(amounts_match(to_decimal(250.00), to_decimal(250.00)));
    assert!(amounts_match(to_decimal(249.995), to_decimal(250.00)));
    assert!(amounts_match(to_decimal(250.01), to_decimal(250.00)));
}

#[test]
fn amounts_match_rejects_larger_gaps() {
    assert!(!amounts_match(to_decimal(249.50), to_decimal(250.00)));
    assert!(!amounts_match(to_decimal(250.02), to_decimal(250.00)));
}

#[test]
fn validate_unit_price_rejects_non_finite_and_negative() {
    assert!(validate_unit_price(120.0).is_ok());
    assert!(validate_unit_price(0.0).is_ok());
    assert!(validate_unit_price(-1.0).is_err());
    assert!(validate_unit_price(f64::NAN).is_err());
    assert!(validate_unit_price(f64::INFINITY).is_err());
    assert!(validate_unit_price(2_000_000.0).is_err());
}

#[test]
fn validate_quantity_bounds() {
    assert!(validate_quantity(1).is_ok());
    assert!(validate_quantity(9999).is_ok());
    assert!(validate_quantity(0).is_err());
    assert!(validate_quantity(-2).is_err());
    assert!(validate_quantity(10000).is_err());
}

#[test]
fn validate_discount_cannot_exceed_subtotal() {
    assert!(validate_discount(50.0, to_decimal(250.0)).is_ok());
    assert!(validate_discount(250.0, to_decimal(250.0)).is_ok());
    assert!(validate_discount(250.01, to_decimal(250.0)).is_err());
    assert!(validate_discount(-5.0, to_decimal(250.0)).is_err());
    assert!(validate_discount(f64::NAN, to_decimal(250.0)).is_err());
}

#[test]
fn to_decimal_maps_non_finite_to_zero() {
    assert_eq!(to_decimal(f64::NAN), Decimal::ZERO);
    assert_eq!(to_decimal(f64::INFINITY), Decimal::ZERO);
    assert_eq!(to_decimal(1.5), Decimal::new(15, 1));
}
