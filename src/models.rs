use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

/// Staff roles. The role gates every operation through
/// [`crate::middleware::auth::ensure`] rather than per-page allow-lists.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    Admin,
    Manager,
    Cashier,
    Waiter,
    Kitchen,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Admin => "admin",
            Role::Manager => "manager",
            Role::Cashier => "cashier",
            Role::Waiter => "waiter",
            Role::Kitchen => "kitchen",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "admin" => Some(Role::Admin),
            "manager" => Some(Role::Manager),
            "cashier" => Some(Role::Cashier),
            "waiter" => Some(Role::Waiter),
            "kitchen" => Some(Role::Kitchen),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum TableStatus {
    Available,
    Occupied,
    Reserved,
    Serving,
    Maintenance,
}

impl TableStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            TableStatus::Available => "available",
            TableStatus::Occupied => "occupied",
            TableStatus::Reserved => "reserved",
            TableStatus::Serving => "serving",
            TableStatus::Maintenance => "maintenance",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "available" => Some(TableStatus::Available),
            "occupied" => Some(TableStatus::Occupied),
            "reserved" => Some(TableStatus::Reserved),
            "serving" => Some(TableStatus::Serving),
            "maintenance" => Some(TableStatus::Maintenance),
            _ => None,
        }
    }
}

/// Order lifecycle: active -> ongoing -> serving -> completed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum OrderStatus {
    Active,
    Ongoing,
    Serving,
    Completed,
}

impl OrderStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            OrderStatus::Active => "active",
            OrderStatus::Ongoing => "ongoing",
            OrderStatus::Serving => "serving",
            OrderStatus::Completed => "completed",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "active" => Some(OrderStatus::Active),
            "ongoing" => Some(OrderStatus::Ongoing),
            "serving" => Some(OrderStatus::Serving),
            "completed" => Some(OrderStatus::Completed),
            _ => None,
        }
    }

    /// Legal forward transitions for the manual status buttons. `completed`
    /// is only reachable through payment processing, never through here.
    /// Writing the current status again is allowed so that the manual
    /// "ready to serve" button and the kitchen auto-promotion stay
    /// idempotent with each other.
    pub fn can_transition_to(&self, next: OrderStatus) -> bool {
        if *self == next {
            return true;
        }
        matches!(
            (self, next),
            (OrderStatus::Active, OrderStatus::Ongoing)
                | (OrderStatus::Active, OrderStatus::Serving)
                | (OrderStatus::Ongoing, OrderStatus::Serving)
        )
    }

    pub fn is_open(&self) -> bool {
        !matches!(self, OrderStatus::Completed)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum OrderSource {
    Staff,
    Customer,
}

impl OrderSource {
    pub fn as_str(&self) -> &'static str {
        match self {
            OrderSource::Staff => "staff",
            OrderSource::Customer => "customer",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "staff" => Some(OrderSource::Staff),
            "customer" => Some(OrderSource::Customer),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum PaymentMethod {
    Cash,
    Card,
    Upi,
    Credit,
}

impl PaymentMethod {
    pub fn as_str(&self) -> &'static str {
        match self {
            PaymentMethod::Cash => "cash",
            PaymentMethod::Card => "card",
            PaymentMethod::Upi => "upi",
            PaymentMethod::Credit => "credit",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "cash" => Some(PaymentMethod::Cash),
            "card" => Some(PaymentMethod::Card),
            "upi" => Some(PaymentMethod::Upi),
            "credit" => Some(PaymentMethod::Credit),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum PaymentStatus {
    Pending,
    Paid,
    Credit,
}

impl PaymentStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            PaymentStatus::Pending => "pending",
            PaymentStatus::Paid => "paid",
            PaymentStatus::Credit => "credit",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "pending" => Some(PaymentStatus::Pending),
            "paid" => Some(PaymentStatus::Paid),
            "credit" => Some(PaymentStatus::Credit),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum DietaryTag {
    Veg,
    NonVeg,
}

impl DietaryTag {
    pub fn as_str(&self) -> &'static str {
        match self {
            DietaryTag::Veg => "veg",
            DietaryTag::NonVeg => "non_veg",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "veg" => Some(DietaryTag::Veg),
            "non_veg" => Some(DietaryTag::NonVeg),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum StockStatus {
    InStock,
    Low,
    Out,
}

impl StockStatus {
    /// `out` iff empty, `low` iff 0 < stock <= threshold, else `in_stock`.
    pub fn classify(current_stock: i32, threshold: i32) -> Self {
        if current_stock <= 0 {
            StockStatus::Out
        } else if current_stock <= threshold {
            StockStatus::Low
        } else {
            StockStatus::InStock
        }
    }
}

/// Kitchen display priority tier, derived from order age only. Purely a
/// styling signal; nothing is scheduled off it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum OrderPriority {
    Low,
    Medium,
    High,
}

impl OrderPriority {
    pub fn for_age_minutes(minutes: i64) -> Self {
        if minutes > 30 {
            OrderPriority::High
        } else if minutes > 15 {
            OrderPriority::Medium
        } else {
            OrderPriority::Low
        }
    }
}

// API-facing models. Password hashes never leave the database layer.

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct User {
    pub id: Uuid,
    pub username: String,
    pub role: Role,
    pub full_name: String,
    pub phone: Option<String>,
    pub email: Option<String>,
    pub active: bool,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct Floor {
    pub id: Uuid,
    pub name: String,
    pub floor_number: i32,
    pub active: bool,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct RestaurantTable {
    pub id: Uuid,
    pub floor_id: Uuid,
    pub table_number: i32,
    pub capacity: i32,
    pub status: TableStatus,
    pub qr_token: Uuid,
    pub current_order_id: Option<Uuid>,
    pub active: bool,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct Category {
    pub id: Uuid,
    pub name: String,
    pub display_order: i32,
    pub active: bool,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct MenuItem {
    pub id: Uuid,
    pub category_id: Uuid,
    pub name: String,
    pub description: Option<String>,
    /// Minor currency units (paise).
    pub price: i64,
    pub dietary_tag: DietaryTag,
    pub available: bool,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct InventoryItem {
    pub id: Uuid,
    pub menu_item_id: Uuid,
    pub menu_item_name: String,
    pub total_quantity: i32,
    pub current_stock: i32,
    pub low_stock_threshold: i32,
    pub status: StockStatus,
    pub last_restocked_at: Option<DateTime<Utc>>,
    pub last_restocked_by: Option<Uuid>,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct Order {
    pub id: Uuid,
    pub order_number: String,
    pub table_id: Uuid,
    pub customer_name: String,
    pub guest_count: i32,
    pub subtotal: i64,
    pub tax: i64,
    pub total: i64,
    pub status: OrderStatus,
    pub source: OrderSource,
    pub payment_method: Option<PaymentMethod>,
    pub payment_status: PaymentStatus,
    pub credit_room_number: Option<String>,
    pub credit_guest_name: Option<String>,
    pub created_by: Option<Uuid>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub completed_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct OrderItem {
    pub id: Uuid,
    pub order_id: Uuid,
    pub menu_item_id: Uuid,
    pub name: String,
    pub quantity: i32,
    pub unit_price: i64,
    pub total_price: i64,
    pub note: Option<String>,
    pub prepared: bool,
    pub prepared_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
}

/// Shared restaurant configuration (single row). Lives in the database so
/// every terminal sees the same tax rate and UPI id.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct RestaurantSettings {
    pub id: Uuid,
    pub restaurant_name: String,
    pub address: String,
    pub phone: String,
    pub gstin: String,
    /// Tax rate in basis points (1800 = 18%).
    pub tax_rate_bps: i32,
    pub service_charge_bps: i32,
    pub currency: String,
    pub upi_vpa: String,
    pub updated_at: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn forward_transitions_are_legal() {
        assert!(OrderStatus::Active.can_transition_to(OrderStatus::Ongoing));
        assert!(OrderStatus::Active.can_transition_to(OrderStatus::Serving));
        assert!(OrderStatus::Ongoing.can_transition_to(OrderStatus::Serving));
    }

    #[test]
    fn backward_and_payment_transitions_are_rejected() {
        assert!(!OrderStatus::Serving.can_transition_to(OrderStatus::Active));
        assert!(!OrderStatus::Serving.can_transition_to(OrderStatus::Ongoing));
        assert!(!OrderStatus::Active.can_transition_to(OrderStatus::Completed));
        assert!(!OrderStatus::Serving.can_transition_to(OrderStatus::Completed));
        assert!(!OrderStatus::Completed.can_transition_to(OrderStatus::Active));
    }

    #[test]
    fn rewriting_current_status_is_idempotent() {
        assert!(OrderStatus::Serving.can_transition_to(OrderStatus::Serving));
        assert!(OrderStatus::Active.can_transition_to(OrderStatus::Active));
    }

    #[test]
    fn stock_classification_boundaries() {
        assert_eq!(StockStatus::classify(0, 10), StockStatus::Out);
        assert_eq!(StockStatus::classify(1, 10), StockStatus::Low);
        assert_eq!(StockStatus::classify(10, 10), StockStatus::Low);
        assert_eq!(StockStatus::classify(11, 10), StockStatus::InStock);
    }

    #[test]
    fn priority_tiers_by_age() {
        assert_eq!(OrderPriority::for_age_minutes(10), OrderPriority::Low);
        assert_eq!(OrderPriority::for_age_minutes(15), OrderPriority::Low);
        assert_eq!(OrderPriority::for_age_minutes(16), OrderPriority::Medium);
        assert_eq!(OrderPriority::for_age_minutes(30), OrderPriority::Medium);
        assert_eq!(OrderPriority::for_age_minutes(31), OrderPriority::High);
    }

    #[test]
    fn status_strings_round_trip() {
        for status in [
            OrderStatus::Active,
            OrderStatus::Ongoing,
            OrderStatus::Serving,
            OrderStatus::Completed,
        ] {
            assert_eq!(OrderStatus::parse(status.as_str()), Some(status));
        }
        assert_eq!(OrderStatus::parse("shipped"), None);
    }
}
