//! Stock Ledger
//!
//! Pure reserve/restore operations on a listing's remaining quantity.
//! Uses rust_decimal so fractional-unit listings never drift; callers
//! apply the returned listing inside the same store transaction as the
//! order write it accompanies.

use super::error::{EngineError, EngineResult};
use rust_decimal::prelude::*;
use shared::models::{Listing, ListingStatus};

#[inline]
fn to_decimal(value: f64) -> Decimal {
    Decimal::from_f64(value).unwrap_or_default()
}

/// Reserve `quantity` units of stock
///
/// Fails with [`EngineError::InsufficientStock`] when the listing is not
/// active or holds less than the requested quantity. On success returns
/// the listing with the stock decremented; the listing flips to `Sold`
/// when the last of the stock is taken.
pub fn reserve(listing: &Listing, quantity: f64) -> EngineResult<Listing> {
    if !quantity.is_finite() || quantity <= 0.0 {
        return Err(EngineError::InvalidInput(format!(
            "reservation quantity must be positive, got {}",
            quantity
        )));
    }
    if !listing.is_active() {
        return Err(EngineError::InsufficientStock {
            available: 0.0,
            requested: quantity,
        });
    }
    if quantity > listing.quantity {
        return Err(EngineError::InsufficientStock {
            available: listing.quantity,
            requested: quantity,
        });
    }

    let remaining = to_decimal(listing.quantity) - to_decimal(quantity);
    let mut updated = listing.clone();
    updated.quantity = remaining.max(Decimal::ZERO).to_f64().unwrap_or_default();
    updated.status = if remaining <= Decimal::ZERO {
        ListingStatus::Sold
    } else {
        ListingStatus::Active
    };
    Ok(updated)
}

/// Restore `quantity` units of stock after a rejection
///
/// Forces the listing back to `Active` even if it had been marked `Sold`.
/// Safe because each order can enter `Rejected` at most once — the status
/// is terminal, so a second restore for the same order cannot happen.
pub fn restore(listing: &Listing, quantity: f64) -> Listing {
    let mut updated = listing.clone();
    updated.quantity = (to_decimal(listing.quantity) + to_decimal(quantity))
        .to_f64()
        .unwrap_or_default();
    updated.status = ListingStatus::Active;
    updated
}

#[cfg(test)]
mod tests {
    use super::*;

    fn listing(quantity: f64, status: ListingStatus) -> Listing {
        Listing {
            id: Some("l-1".to_string()),
            farmer_id: "farmer-1".to_string(),
            crop_name: "Wheat".to_string(),
            quantity,
            unit: "kg".to_string(),
            price_per_unit: 50.0,
            status,
            version: 0,
            created_at: 0,
        }
    }

    #[test]
    fn reserve_decrements_and_stays_active() {
        let updated = reserve(&listing(100.0, ListingStatus::Active), 20.0).unwrap();
        assert_eq!(updated.quantity, 80.0);
        assert_eq!(updated.status, ListingStatus::Active);
    }

    #[test]
    fn reserving_last_of_stock_marks_sold() {
        let updated = reserve(&listing(80.0, ListingStatus::Active), 80.0).unwrap();
        assert_eq!(updated.quantity, 0.0);
        assert_eq!(updated.status, ListingStatus::Sold);
    }

    #[test]
    fn reserve_rejects_overdraw() {
        let err = reserve(&listing(40.0, ListingStatus::Active), 41.0).unwrap_err();
        match err {
            EngineError::InsufficientStock {
                available,
                requested,
            } => {
                assert_eq!(available, 40.0);
                assert_eq!(requested, 41.0);
            }
            other => panic!("expected InsufficientStock, got {other:?}"),
        }
    }

    #[test]
    fn reserve_rejects_inactive_listing() {
        for status in [ListingStatus::Sold, ListingStatus::Expired] {
            let err = reserve(&listing(50.0, status), 1.0).unwrap_err();
            assert!(matches!(err, EngineError::InsufficientStock { .. }));
        }
    }

    #[test]
    fn reserve_rejects_non_positive_quantity() {
        for qty in [0.0, -3.0, f64::NAN] {
            let err = reserve(&listing(50.0, ListingStatus::Active), qty).unwrap_err();
            assert!(matches!(err, EngineError::InvalidInput(_)));
        }
    }

    #[test]
    fn fractional_quantities_do_not_drift() {
        let updated = reserve(&listing(0.3, ListingStatus::Active), 0.1).unwrap();
        assert_eq!(updated.quantity, 0.2);
    }

    #[test]
    fn restore_reactivates_sold_listing() {
        let restored = restore(&listing(0.0, ListingStatus::Sold), 20.0);
        assert_eq!(restored.quantity, 20.0);
        assert_eq!(restored.status, ListingStatus::Active);
    }

    #[test]
    fn restore_reactivates_regardless_of_prior_status() {
        let restored = restore(&listing(5.0, ListingStatus::Expired), 10.0);
        assert_eq!(restored.quantity, 15.0);
        assert_eq!(restored.status, ListingStatus::Active);
    }
}
