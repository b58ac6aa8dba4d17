//! MarketEngine - order placement, lifecycle transitions, and queries
//!
//! # Placement Flow
//!
//! ```text
//! place_order(actor, listing_id, quantity)
//!     ├─ 1. Role and quantity preconditions
//!     ├─ 2. Optimistic read of the listing (fresh per attempt)
//!     ├─ 3. Stock reservation (ledger) + pricing (calculator)
//!     ├─ 4. Atomic write: listing (version-checked), order, notification
//!     ├─ 5. On version conflict: retry from step 2, bounded
//!     └─ 6. Broadcast the committed notification
//! ```
//!
//! Transitions run entirely inside one write transaction, so the status
//! read, stock restore, history append, and notification write are
//! serialized against concurrent placements — a second rejection always
//! observes the committed `Rejected` status and fails the transition
//! table check instead of double-restoring stock.

use super::error::{EngineError, EngineResult};
use super::ledger;
use super::notify::{self, NotificationEmitter};
use super::storage::{MarketStore, TransactionRunner};
use crate::config::EngineConfig;
use crate::pricing::compute_pricing;
use crate::utils::time::now_millis;
use shared::models::{
    Actor, Listing, ListingStatus, NewListing, Notification, Order, OrderHistoryItem, OrderStatus,
    UserRole,
};
use std::path::Path;
use tokio::sync::broadcast;

/// Order lifecycle & settlement engine
///
/// Owns an explicitly injected store handle and configuration — the
/// composition root constructs and wires it, there is no hidden global.
#[derive(Debug)]
pub struct MarketEngine {
    store: MarketStore,
    config: EngineConfig,
    emitter: NotificationEmitter,
}

impl MarketEngine {
    /// Create an engine over an already-opened store
    pub fn new(store: MarketStore, config: EngineConfig) -> Self {
        tracing::info!(
            delivery_charge = config.delivery_charge,
            commission_rate = config.commission_rate,
            "MarketEngine started"
        );
        Self {
            store,
            config,
            emitter: NotificationEmitter::new(),
        }
    }

    /// Open the store at `path` and build the engine
    pub fn open(path: impl AsRef<Path>, config: EngineConfig) -> EngineResult<Self> {
        Ok(Self::new(MarketStore::open(path)?, config))
    }

    /// In-memory engine (tests and demos)
    pub fn open_in_memory(config: EngineConfig) -> EngineResult<Self> {
        Ok(Self::new(MarketStore::open_in_memory()?, config))
    }

    /// Subscribe to committed notifications
    pub fn subscribe(&self) -> broadcast::Receiver<Notification> {
        self.emitter.subscribe()
    }

    /// The engine's configuration
    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Retry a conflict-prone operation a bounded number of times
    ///
    /// Each attempt must re-read its optimistic state; when the retries
    /// are exhausted the conflict surfaces as
    /// [`EngineError::TransactionConflict`] for the caller to present as
    /// "please try again".
    fn with_conflict_retry<T>(&self, mut op: impl FnMut() -> EngineResult<T>) -> EngineResult<T> {
        let mut attempts = 0;
        loop {
            match op() {
                Err(err) if err.is_conflict() => {
                    attempts += 1;
                    if attempts > self.config.max_txn_retries {
                        tracing::warn!(attempts, "Conditional write kept losing races, giving up");
                        return Err(EngineError::TransactionConflict);
                    }
                    tracing::debug!(attempt = attempts, "Version conflict, retrying");
                }
                other => return other,
            }
        }
    }

    // ========== Listings ==========

    /// Create a listing (farmer action)
    pub fn create_listing(&self, actor: &Actor, input: NewListing) -> EngineResult<Listing> {
        if actor.role != UserRole::Farmer {
            tracing::warn!(user_id = %actor.user_id, "Non-farmer attempted to create a listing");
            return Err(EngineError::Unauthorized(
                "only farmers can create listings".to_string(),
            ));
        }
        if input.crop_name.trim().is_empty() {
            return Err(EngineError::InvalidInput("crop name is required".to_string()));
        }
        if !input.quantity.is_finite() || input.quantity <= 0.0 {
            return Err(EngineError::InvalidInput(format!(
                "quantity must be positive, got {}",
                input.quantity
            )));
        }
        if !input.price_per_unit.is_finite() || input.price_per_unit <= 0.0 {
            return Err(EngineError::InvalidInput(format!(
                "price per unit must be positive, got {}",
                input.price_per_unit
            )));
        }

        let listing = Listing {
            id: Some(uuid::Uuid::new_v4().to_string()),
            farmer_id: actor.user_id.clone(),
            crop_name: input.crop_name,
            quantity: input.quantity,
            unit: input.unit,
            price_per_unit: input.price_per_unit,
            status: ListingStatus::Active,
            version: 0,
            created_at: now_millis(),
        };
        self.store
            .with_txn(|txn| txn.insert_listing(&listing).map_err(EngineError::from))?;
        tracing::info!(
            listing_id = listing.id.as_deref().unwrap_or_default(),
            farmer_id = %listing.farmer_id,
            crop = %listing.crop_name,
            "Listing created"
        );
        Ok(listing)
    }

    /// Get a listing by id
    pub fn get_listing(&self, listing_id: &str) -> EngineResult<Listing> {
        self.store
            .get_listing(listing_id)?
            .ok_or_else(|| EngineError::NotFound(format!("Listing {listing_id}")))
    }

    /// All active listings, newest first (marketplace view)
    pub fn active_listings(&self) -> EngineResult<Vec<Listing>> {
        let mut listings: Vec<Listing> = self
            .store
            .all_listings()?
            .into_iter()
            .filter(Listing::is_active)
            .collect();
        listings.sort_by_key(|l| std::cmp::Reverse(l.created_at));
        Ok(listings)
    }

    /// All of one farmer's listings, newest first
    pub fn listings_by_farmer(&self, farmer_id: &str) -> EngineResult<Vec<Listing>> {
        let mut listings: Vec<Listing> = self
            .store
            .all_listings()?
            .into_iter()
            .filter(|l| l.farmer_id == farmer_id)
            .collect();
        listings.sort_by_key(|l| std::cmp::Reverse(l.created_at));
        Ok(listings)
    }

    // ========== Order Placement ==========

    /// Place an order against a listing (buyer action)
    ///
    /// The order creation, stock decrement, and farmer notification are
    /// one atomic write; concurrent placements against the same listing
    /// can never jointly reserve more than the available stock.
    pub fn place_order(
        &self,
        actor: &Actor,
        listing_id: &str,
        quantity: f64,
    ) -> EngineResult<Order> {
        if actor.role != UserRole::Buyer {
            tracing::warn!(user_id = %actor.user_id, "Non-buyer attempted to place an order");
            return Err(EngineError::Unauthorized(
                "only buyers can place orders".to_string(),
            ));
        }
        if !quantity.is_finite() || quantity <= 0.0 {
            return Err(EngineError::InvalidInput(format!(
                "order quantity must be positive, got {}",
                quantity
            )));
        }

        let (order, notification) = self.with_conflict_retry(|| {
            // Optimistic read: validated state, re-checked by version at write
            let listing = self
                .store
                .get_listing(listing_id)?
                .ok_or_else(|| EngineError::NotFound(format!("Listing {listing_id}")))?;
            if listing.farmer_id == actor.user_id {
                return Err(EngineError::InvalidInput(
                    "farmers cannot purchase their own listing".to_string(),
                ));
            }

            let mut reserved = ledger::reserve(&listing, quantity)?;
            let pricing = compute_pricing(
                listing.price_per_unit,
                quantity,
                self.config.delivery_charge,
                self.config.commission_rate,
            )?;

            let now = now_millis();
            let order = Order {
                id: Some(uuid::Uuid::new_v4().to_string()),
                listing_id: listing.id.clone().unwrap_or_else(|| listing_id.to_string()),
                buyer_id: actor.user_id.clone(),
                farmer_id: listing.farmer_id.clone(),
                crop_name: listing.crop_name.clone(),
                quantity,
                unit: listing.unit.clone(),
                price_per_unit: listing.price_per_unit,
                subtotal: pricing.subtotal,
                delivery_charge: self.config.delivery_charge,
                commission: pricing.commission,
                farmer_earning: pricing.farmer_earning,
                total_price: pricing.total_price,
                status: OrderStatus::Pending,
                history: vec![OrderHistoryItem {
                    status: OrderStatus::Pending,
                    timestamp: now,
                }],
                created_at: now,
            };
            let notification = notify::new_order_notification(&order);

            self.store.with_txn(|txn| {
                txn.put_listing_checked(&mut reserved)?;
                txn.put_order(&order)?;
                txn.push_notification(&notification)?;
                Ok::<_, EngineError>(())
            })?;
            Ok((order, notification))
        })?;

        self.emitter.broadcast(&notification);
        tracing::info!(
            order_id = order.id.as_deref().unwrap_or_default(),
            listing_id = %order.listing_id,
            buyer_id = %order.buyer_id,
            quantity = order.quantity,
            total_price = order.total_price,
            "Order placed"
        );
        Ok(order)
    }

    // ========== Order Lifecycle ==========

    /// Move an order to `target` status
    ///
    /// Farmer-side edges (accept/reject/delivery chain) require the
    /// actor to own the order's farmer side; cancellation requires the
    /// order's buyer. Entering `Rejected` restores the reserved stock.
    pub fn transition_order(
        &self,
        actor: &Actor,
        order_id: &str,
        target: OrderStatus,
    ) -> EngineResult<Order> {
        let (order, notification) = self.store.with_txn(|txn| {
            let mut order = txn
                .get_order(order_id)?
                .ok_or_else(|| EngineError::NotFound(format!("Order {order_id}")))?;

            if target == OrderStatus::Cancelled {
                if actor.user_id != order.buyer_id {
                    tracing::warn!(
                        user_id = %actor.user_id,
                        order_id,
                        "Unauthorized cancellation attempt"
                    );
                    return Err(EngineError::Unauthorized(
                        "only the order's buyer can cancel it".to_string(),
                    ));
                }
            } else if actor.user_id != order.farmer_id {
                tracing::warn!(
                    user_id = %actor.user_id,
                    order_id,
                    target = %target,
                    "Unauthorized status update attempt"
                );
                return Err(EngineError::Unauthorized(
                    "only the order's farmer can update its status".to_string(),
                ));
            }

            if !order.status.can_transition_to(target) {
                return Err(EngineError::IllegalTransition {
                    from: order.status,
                    to: target,
                });
            }

            // Rejection returns the reserved stock to the listing; the
            // listing may have been removed out-of-band, in which case
            // there is nothing to restore.
            if target == OrderStatus::Rejected
                && let Some(listing) = txn.get_listing(&order.listing_id)?
            {
                let mut restored = ledger::restore(&listing, order.quantity);
                txn.put_listing_checked(&mut restored)?;
            }

            order.status = target;
            order.history.push(OrderHistoryItem {
                status: target,
                timestamp: now_millis(),
            });
            txn.put_order(&order)?;

            let notification = notify::order_update_notification(&order, target);
            txn.push_notification(&notification)?;
            Ok::<_, EngineError>((order, notification))
        })?;

        self.emitter.broadcast(&notification);
        tracing::info!(
            order_id = order.id.as_deref().unwrap_or_default(),
            status = %order.status,
            "Order status updated"
        );
        Ok(order)
    }

    /// Cancel an accepted order (buyer action)
    pub fn cancel_order(&self, actor: &Actor, order_id: &str) -> EngineResult<Order> {
        self.transition_order(actor, order_id, OrderStatus::Cancelled)
    }

    /// Get an order by id
    pub fn get_order(&self, order_id: &str) -> EngineResult<Order> {
        self.store
            .get_order(order_id)?
            .ok_or_else(|| EngineError::NotFound(format!("Order {order_id}")))
    }

    /// Orders sold by a farmer, newest first
    pub fn orders_for_farmer(&self, farmer_id: &str) -> EngineResult<Vec<Order>> {
        let mut orders: Vec<Order> = self
            .store
            .all_orders()?
            .into_iter()
            .filter(|o| o.farmer_id == farmer_id)
            .collect();
        orders.sort_by_key(|o| std::cmp::Reverse(o.created_at));
        Ok(orders)
    }

    /// Orders placed by a buyer, newest first
    pub fn orders_for_buyer(&self, buyer_id: &str) -> EngineResult<Vec<Order>> {
        let mut orders: Vec<Order> = self
            .store
            .all_orders()?
            .into_iter()
            .filter(|o| o.buyer_id == buyer_id)
            .collect();
        orders.sort_by_key(|o| std::cmp::Reverse(o.created_at));
        Ok(orders)
    }

    // ========== Notifications ==========

    /// A user's notifications, newest first
    pub fn notifications_for_user(&self, user_id: &str) -> EngineResult<Vec<Notification>> {
        let mut notifications = self.store.notifications_for_user(user_id)?;
        notifications.sort_by_key(|n| std::cmp::Reverse(n.created_at));
        Ok(notifications)
    }

    /// Count of unread notifications
    pub fn unread_count(&self, user_id: &str) -> EngineResult<usize> {
        Ok(self
            .store
            .notifications_for_user(user_id)?
            .iter()
            .filter(|n| !n.is_read)
            .count())
    }

    /// Mark the given notifications as read, in one batch
    ///
    /// Unknown ids are skipped; returns how many were flipped.
    pub fn mark_notifications_read(
        &self,
        user_id: &str,
        notification_ids: &[String],
    ) -> EngineResult<usize> {
        if notification_ids.is_empty() {
            return Ok(0);
        }
        self.store.with_txn(|txn| {
            let mut flipped = 0;
            for id in notification_ids {
                if txn.mark_notification_read(user_id, id).map_err(EngineError::from)? {
                    flipped += 1;
                }
            }
            Ok(flipped)
        })
    }
}
