//! Listing Model

use serde::{Deserialize, Serialize};

/// Listing status
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum ListingStatus {
    #[default]
    Active,
    Sold,
    Expired,
}

/// Listing entity — a farmer's for-sale produce batch
///
/// Invariant: `status == Active` implies `quantity > 0`; when the last of
/// the stock is reserved the status flips to `Sold`. The `version` field is
/// bumped on every write and checked by conditional updates.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Listing {
    pub id: Option<String>,
    pub farmer_id: String,
    pub crop_name: String,
    /// Remaining stock, never negative
    pub quantity: f64,
    /// e.g. "kg", "maund", "dozen", "piece"
    pub unit: String,
    /// Price per unit in rupees
    pub price_per_unit: f64,
    pub status: ListingStatus,
    /// Optimistic concurrency token, bumped on every write
    pub version: u64,
    /// Creation time, epoch milliseconds UTC
    pub created_at: i64,
}

impl Listing {
    /// Whether new reservations may be taken against this listing
    pub fn is_active(&self) -> bool {
        self.status == ListingStatus::Active
    }
}

/// Create listing payload
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewListing {
    pub crop_name: String,
    pub quantity: f64,
    pub unit: String,
    pub price_per_unit: f64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_serializes_as_snake_case() {
        let json = serde_json::to_string(&ListingStatus::Sold).unwrap();
        assert_eq!(json, "\"sold\"");
        let back: ListingStatus = serde_json::from_str("\"expired\"").unwrap();
        assert_eq!(back, ListingStatus::Expired);
    }

    #[test]
    fn listing_roundtrips_with_camel_case_fields() {
        let listing = Listing {
            id: Some("l-1".to_string()),
            farmer_id: "f-1".to_string(),
            crop_name: "Wheat".to_string(),
            quantity: 100.0,
            unit: "kg".to_string(),
            price_per_unit: 50.0,
            status: ListingStatus::Active,
            version: 0,
            created_at: 0,
        };
        let json = serde_json::to_value(&listing).unwrap();
        assert_eq!(json["pricePerUnit"], 50.0);
        assert_eq!(json["cropName"], "Wheat");
    }
}
