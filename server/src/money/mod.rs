//! Money calculation utilities using rust_decimal for precision
//!
//! This module provides precise decimal arithmetic for monetary calculations.
//! All calculations are done using `Decimal` internally, then converted to `f64`
//! for storage/serialization.

use rust_decimal::prelude::*;

use crate::db::models::{OrderItem, Tax, TaxLine};
use crate::utils::AppError;

#[cfg(test)]
mod tests;

/// Rounding strategy for monetary values (2 decimal places, half-up)
const DECIMAL_PLACES: u32 = 2;

/// Tolerance for monetary comparisons (0.01)
pub const MONEY_TOLERANCE: Decimal = Decimal::from_parts(1, 0, 0, false, 2);

/// Maximum allowed price per item
const MAX_PRICE: f64 = 1_000_000.0;
/// Maximum allowed quantity per item
const MAX_QUANTITY: i32 = 9999;
/// Maximum allowed payment amount
const MAX_PAYMENT_AMOUNT: f64 = 1_000_000.0;

/// Validate that a f64 value is finite (not NaN, not Infinity)
#[inline]
pub fn require_finite(value: f64, field_name: &str) -> Result<(), AppError> {
    if !value.is_finite() {
        return Err(AppError::validation(format!(
            "{} must be a finite number, got {}",
            field_name, value
        )));
    }
    Ok(())
}

/// Validate a unit price captured onto an order item
pub fn validate_unit_price(price: f64) -> Result<(), AppError> {
    require_finite(price, "price")?;
    if price < 0.0 {
        return Err(AppError::validation(format!(
            "price must be non-negative, got {}",
            price
        )));
    }
    if price > MAX_PRICE {
        return Err(AppError::validation(format!(
            "price exceeds maximum allowed ({}), got {}",
            MAX_PRICE, price
        )));
    }
    Ok(())
}

/// Validate an order item quantity
pub fn validate_quantity(quantity: i32) -> Result<(), AppError> {
    if quantity <= 0 {
        return Err(AppError::validation(format!(
            "quantity must be positive, got {}",
            quantity
        )));
    }
    if quantity > MAX_QUANTITY {
        return Err(AppError::validation(format!(
            "quantity exceeds maximum allowed ({}), got {}",
            MAX_QUANTITY, quantity
        )));
    }
    Ok(())
}

/// Validate an absolute discount amount against the bill subtotal
pub fn validate_discount(discount: f64, subtotal: Decimal) -> Result<(), AppError> {
    require_finite(discount, "discount")?;
    if discount < 0.0 {
        return Err(AppError::validation(format!(
            "discount must be non-negative, got {}",
            discount
        )));
    }
    if to_decimal(discount) > subtotal {
        return Err(AppError::validation(format!(
            "discount ({}) exceeds bill subtotal ({})",
            discount,
            to_f64(subtotal)
        )));
    }
    Ok(())
}

/// Validate a split-payment component amount
pub fn validate_payment_amount(amount: f64, field_name: &str) -> Result<(), AppError> {
    require_finite(amount, field_name)?;
    if amount < 0.0 {
        return Err(AppError::validation(format!(
            "{} must be non-negative, got {}",
            field_name, amount
        )));
    }
    if amount > MAX_PAYMENT_AMOUNT {
        return Err(AppError::validation(format!(
            "{} exceeds maximum allowed ({}), got {}",
            field_name, MAX_PAYMENT_AMOUNT, amount
        )));
    }
    Ok(())
}

/// Convert f64 to Decimal for calculation
///
/// Input values should be pre-validated via `require_finite()` at the boundary.
/// If NaN/Infinity somehow reaches here, logs an error and returns ZERO
/// to avoid silent data corruption in financial calculations.
#[inline]
pub fn to_decimal(value: f64) -> Decimal {
    Decimal::from_f64(value).unwrap_or_else(|| {
        tracing::error!(value = ?value, "Non-finite f64 in monetary calculation, defaulting to zero");
        Decimal::ZERO
    })
}

/// Convert Decimal back to f64 for storage, rounded to 2 decimal places
#[inline]
pub fn to_f64(value: Decimal) -> f64 {
    value
        .round_dp_with_strategy(DECIMAL_PLACES, RoundingStrategy::MidpointAwayFromZero)
        .to_f64()
        .unwrap_or_default()
}

/// Line total for a single order item: price × quantity
#[inline]
pub fn line_total(item: &OrderItem) -> Decimal {
    to_decimal(item.price) * Decimal::from(item.quantity)
}

/// Subtotal over a set of order items
pub fn items_subtotal<'a, I>(items: I) -> Decimal
where
    I: IntoIterator<Item = &'a OrderItem>,
{
    items.into_iter().map(line_total).sum()
}

/// Tax breakdown for a subtotal under the currently active tax rows.
///
/// Each line carries the rate snapshot and the tax-exclusive amount
/// `subtotal × rate / 100`. The returned total is the exact Decimal sum of
/// the line amounts, which equals `subtotal × Σrate / 100`.
pub fn tax_breakdown(subtotal: Decimal, active_taxes: &[Tax]) -> (Vec<TaxLine>, Decimal) {
    let mut lines = Vec::with_capacity(active_taxes.len());
    let mut total = Decimal::ZERO;
    for tax in active_taxes {
        let rate = to_decimal(tax.percentage);
        let amount = subtotal * rate / Decimal::ONE_HUNDRED;
        total += amount;
        lines.push(TaxLine {
            name: tax.name.clone(),
            rate: tax.percentage,
            amount: to_f64(amount),
        });
    }
    (lines, total)
}

/// Bill totals, computed from scratch (never incrementally patched)
#[derive(Debug, Clone, PartialEq)]
pub struct BillTotals {
    pub subtotal: f64,
    pub tax_amount: f64,
    pub discount: f64,
    pub total_amount: f64,
    pub tax_lines: Vec<TaxLine>,
}

/// Compute bill totals: subtotal, tax breakdown and
/// `total = subtotal + tax - discount`.
pub fn bill_totals(subtotal: Decimal, active_taxes: &[Tax], discount: f64) -> BillTotals {
    let (tax_lines, tax_total) = tax_breakdown(subtotal, active_taxes);
    let discount_dec = to_decimal(discount);
    let total = subtotal + tax_total - discount_dec;
    BillTotals {
        subtotal: to_f64(subtotal),
        tax_amount: to_f64(tax_total),
        discount: to_f64(discount_dec),
        total_amount: to_f64(total),
        tax_lines,
    }
}

/// Compare a paid amount against an expected total within [`MONEY_TOLERANCE`]
pub fn amounts_match(paid: Decimal, expected: Decimal) -> bool {
    (paid - expected).abs() <= MONEY_TOLERANCE
}
