//! Pricing Calculator
//!
//! Computes the settlement split for a purchase. Uses rust_decimal for
//! precise calculations, stores as f64.
//!
//! The commission is rounded to whole rupees (the domain has no minor
//! currency unit) with half-up rounding; the farmer earning is derived as
//! `subtotal - commission` so the split always sums back to the subtotal.

use rust_decimal::prelude::*;
use thiserror::Error;

/// Rounding precision for monetary values (whole rupees, half-up)
const DECIMAL_PLACES: u32 = 0;

/// Pricing precondition failures, surfaced before any I/O
#[derive(Debug, Error, PartialEq)]
pub enum PricingError {
    #[error("price per unit must be positive, got {0}")]
    NonPositivePrice(f64),

    #[error("quantity must be positive, got {0}")]
    NonPositiveQuantity(f64),

    #[error("delivery charge must be non-negative, got {0}")]
    NegativeDeliveryCharge(f64),

    #[error("commission rate must be between 0 and 1, got {0}")]
    CommissionRateOutOfRange(f64),

    #[error("{field} must be a finite number, got {value}")]
    NotFinite { field: &'static str, value: f64 },
}

/// Convert f64 to Decimal for calculation
#[inline]
fn to_decimal(value: f64) -> Decimal {
    Decimal::from_f64(value).unwrap_or_default()
}

/// Convert Decimal back to f64 for storage
#[inline]
fn to_f64(value: Decimal) -> f64 {
    value.to_f64().unwrap_or_default()
}

/// Round to whole rupees, half-up
#[inline]
fn round_rupees(value: Decimal) -> Decimal {
    value.round_dp_with_strategy(DECIMAL_PLACES, RoundingStrategy::MidpointAwayFromZero)
}

/// Money split for one purchase, fixed at order creation
#[derive(Debug, Clone, PartialEq)]
pub struct PricingBreakdown {
    /// price_per_unit x quantity
    pub subtotal: f64,
    /// Platform cut, rounded to whole rupees
    pub commission: f64,
    /// subtotal - commission
    pub farmer_earning: f64,
    /// Buyer total: subtotal + delivery charge
    pub total_price: f64,
}

#[inline]
fn require_finite(value: f64, field: &'static str) -> Result<(), PricingError> {
    if !value.is_finite() {
        return Err(PricingError::NotFinite { field, value });
    }
    Ok(())
}

/// Compute the settlement split for a purchase
///
/// The commission is absorbed from the farmer's side; the buyer pays
/// `subtotal + delivery_charge` and never sees the commission.
pub fn compute_pricing(
    price_per_unit: f64,
    quantity: f64,
    delivery_charge: f64,
    commission_rate: f64,
) -> Result<PricingBreakdown, PricingError> {
    require_finite(price_per_unit, "price_per_unit")?;
    require_finite(quantity, "quantity")?;
    require_finite(delivery_charge, "delivery_charge")?;
    require_finite(commission_rate, "commission_rate")?;

    if price_per_unit <= 0.0 {
        return Err(PricingError::NonPositivePrice(price_per_unit));
    }
    if quantity <= 0.0 {
        return Err(PricingError::NonPositiveQuantity(quantity));
    }
    if delivery_charge < 0.0 {
        return Err(PricingError::NegativeDeliveryCharge(delivery_charge));
    }
    if !(0.0..=1.0).contains(&commission_rate) {
        return Err(PricingError::CommissionRateOutOfRange(commission_rate));
    }

    let subtotal = to_decimal(price_per_unit) * to_decimal(quantity);
    let commission = round_rupees(subtotal * to_decimal(commission_rate));
    let farmer_earning = subtotal - commission;
    let total_price = subtotal + to_decimal(delivery_charge);

    Ok(PricingBreakdown {
        subtotal: to_f64(subtotal),
        commission: to_f64(commission),
        farmer_earning: to_f64(farmer_earning),
        total_price: to_f64(total_price),
    })
}
