//! Change-notification bus.
//!
//! The kitchen display and the customer confirmation page keep themselves
//! current by listening for row-change events and re-fetching, so the
//! services publish a small `ChangeEvent` after every committed write to
//! the orders, order-items or tables collections. Delivery is best-effort:
//! a slow or absent listener never blocks a write.

use serde::Serialize;
use tokio::sync::broadcast;
use utoipa::ToSchema;
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum Collection {
    Orders,
    OrderItems,
    RestaurantTables,
}

impl Collection {
    pub fn as_str(&self) -> &'static str {
        match self {
            Collection::Orders => "orders",
            Collection::OrderItems => "order_items",
            Collection::RestaurantTables => "restaurant_tables",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum ChangeAction {
    Created,
    Updated,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct ChangeEvent {
    pub collection: Collection,
    pub entity_id: Uuid,
    pub action: ChangeAction,
}

#[derive(Clone)]
pub struct EventBus {
    tx: broadcast::Sender<ChangeEvent>,
}

impl EventBus {
    pub fn new(capacity: usize) -> Self {
        let (tx, _) = broadcast::channel(capacity);
        Self { tx }
    }

    pub fn publish(&self, collection: Collection, entity_id: Uuid, action: ChangeAction) {
        let event = ChangeEvent {
            collection,
            entity_id,
            action,
        };
        // Err means no subscriber is currently listening, which is fine.
        if self.tx.send(event).is_err() {
            tracing::trace!(collection = collection.as_str(), "no event subscribers");
        }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<ChangeEvent> {
        self.tx.subscribe()
    }
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new(256)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn subscriber_receives_published_event() {
        let bus = EventBus::new(8);
        let mut rx = bus.subscribe();
        let id = Uuid::new_v4();
        bus.publish(Collection::Orders, id, ChangeAction::Created);
        let event = rx.recv().await.expect("event");
        assert_eq!(event.collection, Collection::Orders);
        assert_eq!(event.entity_id, id);
        assert_eq!(event.action, ChangeAction::Created);
    }

    #[test]
    fn publish_without_subscribers_is_a_noop() {
        let bus = EventBus::new(8);
        bus.publish(
            Collection::RestaurantTables,
            Uuid::new_v4(),
            ChangeAction::Updated,
        );
    }
}
