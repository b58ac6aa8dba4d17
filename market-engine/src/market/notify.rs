//! Notification Emitter
//!
//! Builds the notification documents emitted by order events and fans
//! committed notifications out over a broadcast channel for real-time
//! display layers. Persistence happens inside the enclosing store
//! transaction (a failed notification write aborts the whole operation);
//! the broadcast only fires after commit.

use crate::utils::time::now_millis;
use shared::models::{Notification, NotificationType, Order, OrderStatus};
use tokio::sync::broadcast;

/// Broadcast channel capacity for committed notifications
const NOTIFY_CHANNEL_CAPACITY: usize = 1024;

/// Fan-out side of the notification pipeline
#[derive(Debug)]
pub struct NotificationEmitter {
    tx: broadcast::Sender<Notification>,
}

impl Default for NotificationEmitter {
    fn default() -> Self {
        Self::new()
    }
}

impl NotificationEmitter {
    pub fn new() -> Self {
        let (tx, _) = broadcast::channel(NOTIFY_CHANNEL_CAPACITY);
        Self { tx }
    }

    /// Subscribe to committed notifications
    pub fn subscribe(&self) -> broadcast::Receiver<Notification> {
        self.tx.subscribe()
    }

    /// Broadcast a committed notification
    ///
    /// Fire-and-forget: a send with no active receivers is expected when
    /// no display layer is attached.
    pub fn broadcast(&self, notification: &Notification) {
        if self.tx.send(notification.clone()).is_err() {
            tracing::debug!(
                user_id = %notification.user_id,
                "Notification broadcast skipped: no active receivers"
            );
        }
    }
}

fn fresh_id() -> String {
    uuid::Uuid::new_v4().to_string()
}

/// Notification to the farmer when a buyer places an order
pub fn new_order_notification(order: &Order) -> Notification {
    Notification {
        id: Some(fresh_id()),
        user_id: order.farmer_id.clone(),
        kind: NotificationType::NewOrder,
        title: "New Order Received!".to_string(),
        message: format!(
            "A buyer placed an order for {} {} of {}.",
            order.quantity, order.unit, order.crop_name
        ),
        link: "/orders".to_string(),
        is_read: false,
        created_at: now_millis(),
    }
}

/// Notification to the counter-party when an order changes status
///
/// Farmer-driven transitions notify the buyer (their purchases page);
/// the buyer's cancellation notifies the farmer (their orders page).
pub fn order_update_notification(order: &Order, target: OrderStatus) -> Notification {
    let buyer_is_recipient = target != OrderStatus::Cancelled;
    let (user_id, link) = if buyer_is_recipient {
        (order.buyer_id.clone(), "/my-purchases".to_string())
    } else {
        (order.farmer_id.clone(), "/orders".to_string())
    };
    Notification {
        id: Some(fresh_id()),
        user_id,
        kind: NotificationType::OrderUpdate,
        title: format!("Order Status: {}", target.display_name()),
        message: format!("Your order for {} has been updated.", order.crop_name),
        link,
        is_read: false,
        created_at: now_millis(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use shared::models::OrderHistoryItem;

    fn order() -> Order {
        Order {
            id: Some("o-1".to_string()),
            listing_id: "l-1".to_string(),
            buyer_id: "buyer-1".to_string(),
            farmer_id: "farmer-1".to_string(),
            crop_name: "Wheat".to_string(),
            quantity: 20.0,
            unit: "kg".to_string(),
            price_per_unit: 50.0,
            subtotal: 1000.0,
            delivery_charge: 250.0,
            commission: 20.0,
            farmer_earning: 980.0,
            total_price: 1250.0,
            status: OrderStatus::Pending,
            history: vec![OrderHistoryItem {
                status: OrderStatus::Pending,
                timestamp: 0,
            }],
            created_at: 0,
        }
    }

    #[test]
    fn new_order_goes_to_the_farmer() {
        let notification = new_order_notification(&order());
        assert_eq!(notification.user_id, "farmer-1");
        assert_eq!(notification.kind, NotificationType::NewOrder);
        assert_eq!(notification.title, "New Order Received!");
        assert_eq!(notification.link, "/orders");
        assert!(!notification.is_read);
        assert!(notification.message.contains("20 kg of Wheat"));
    }

    #[test]
    fn status_update_goes_to_the_buyer() {
        let notification = order_update_notification(&order(), OrderStatus::Accepted);
        assert_eq!(notification.user_id, "buyer-1");
        assert_eq!(notification.kind, NotificationType::OrderUpdate);
        assert_eq!(notification.title, "Order Status: accepted");
        assert_eq!(notification.link, "/my-purchases");
    }

    #[test]
    fn cancellation_notifies_the_farmer() {
        let notification = order_update_notification(&order(), OrderStatus::Cancelled);
        assert_eq!(notification.user_id, "farmer-1");
        assert_eq!(notification.link, "/orders");
        assert_eq!(notification.title, "Order Status: cancelled");
    }

    #[test]
    fn in_warehouse_title_uses_spaces() {
        let notification = order_update_notification(&order(), OrderStatus::InWarehouse);
        assert_eq!(notification.title, "Order Status: in warehouse");
    }

    #[test]
    fn broadcast_reaches_subscribers() {
        let emitter = NotificationEmitter::new();
        let mut rx = emitter.subscribe();
        let notification = new_order_notification(&order());
        emitter.broadcast(&notification);
        let received = rx.try_recv().unwrap();
        assert_eq!(received.user_id, "farmer-1");
    }

    #[test]
    fn broadcast_without_receivers_is_silent() {
        let emitter = NotificationEmitter::new();
        emitter.broadcast(&new_order_notification(&order()));
    }
}
