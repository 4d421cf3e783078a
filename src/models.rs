use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::entity::{order_items, order_statuses, service_appointments};

/// The role a user holds. `users.role_id` is the single source of truth; the
/// string form carried in access tokens is always derived from it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
pub enum Role {
    Client,
    Designer,
}

impl Role {
    pub const fn id(self) -> i32 {
        match self {
            Role::Client => 1,
            Role::Designer => 2,
        }
    }

    pub fn from_id(id: i32) -> Option<Self> {
        match id {
            1 => Some(Role::Client),
            2 => Some(Role::Designer),
            _ => None,
        }
    }

    pub const fn as_str(self) -> &'static str {
        match self {
            Role::Client => "Client",
            Role::Designer => "Designer",
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "Client" => Some(Role::Client),
            "Designer" => Some(Role::Designer),
            _ => None,
        }
    }

    /// Where a freshly logged-in user should land.
    pub const fn landing_path(self) -> &'static str {
        match self {
            Role::Client => "/client",
            Role::Designer => "/admin",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum OrderStatusKind {
    Queued,
    InProgress,
    Done,
    Cancelled,
}

impl OrderStatusKind {
    pub const ALL: [OrderStatusKind; 4] = [
        OrderStatusKind::Queued,
        OrderStatusKind::InProgress,
        OrderStatusKind::Done,
        OrderStatusKind::Cancelled,
    ];

    pub const fn id(self) -> i32 {
        match self {
            OrderStatusKind::Queued => 1,
            OrderStatusKind::InProgress => 2,
            OrderStatusKind::Done => 3,
            OrderStatusKind::Cancelled => 4,
        }
    }

    pub fn from_id(id: i32) -> Option<Self> {
        Self::ALL.into_iter().find(|s| s.id() == id)
    }

    pub const fn is_terminal(self) -> bool {
        matches!(self, OrderStatusKind::Done | OrderStatusKind::Cancelled)
    }

    /// Done and Cancelled are final; every other change must actually move the order.
    pub fn can_transition_to(self, next: OrderStatusKind) -> bool {
        !self.is_terminal() && self != next
    }
}

/// `"service"` marks a service, every other product type string a physical good.
pub fn is_service_type(product_type: &str) -> bool {
    product_type == "service"
}

pub const fn product_type_of(is_service: bool) -> &'static str {
    if is_service { "service" } else { "product" }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum AppointmentStatus {
    Booked,
    Confirmed,
    Completed,
    Cancelled,
}

impl AppointmentStatus {
    pub const fn as_str(self) -> &'static str {
        match self {
            AppointmentStatus::Booked => "booked",
            AppointmentStatus::Confirmed => "confirmed",
            AppointmentStatus::Completed => "completed",
            AppointmentStatus::Cancelled => "cancelled",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "booked" => Some(AppointmentStatus::Booked),
            "confirmed" => Some(AppointmentStatus::Confirmed),
            "completed" => Some(AppointmentStatus::Completed),
            "cancelled" => Some(AppointmentStatus::Cancelled),
            _ => None,
        }
    }

    pub const fn is_open(self) -> bool {
        matches!(self, AppointmentStatus::Booked | AppointmentStatus::Confirmed)
    }
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct User {
    pub id: Uuid,
    pub full_name: String,
    pub email: String,
    pub role: Role,
    pub role_id: i32,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct Category {
    pub id: Uuid,
    pub name: String,
    pub description: Option<String>,
    pub product_count: u64,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct Product {
    pub id: Uuid,
    pub name: String,
    pub description: Option<String>,
    pub price: i64,
    pub category_id: Option<Uuid>,
    pub product_type: String,
    pub is_service: bool,
    pub is_active: bool,
    pub image_url: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct OrderStatus {
    pub id: i32,
    pub name: String,
    pub description: Option<String>,
    pub display_order: i32,
    pub color: String,
}

impl From<order_statuses::Model> for OrderStatus {
    fn from(model: order_statuses::Model) -> Self {
        Self {
            id: model.id,
            name: model.name,
            description: model.description,
            display_order: model.display_order,
            color: model.color,
        }
    }
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct Order {
    pub id: Uuid,
    pub client_id: Uuid,
    pub order_date: DateTime<Utc>,
    pub total_amount: i64,
    pub current_status_id: i32,
    pub notes: Option<String>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct OrderItem {
    pub id: Uuid,
    pub order_id: Uuid,
    pub product_id: Uuid,
    pub quantity: i32,
    pub unit_price: i64,
    pub line_total: i64,
}

impl From<order_items::Model> for OrderItem {
    fn from(model: order_items::Model) -> Self {
        Self {
            line_total: model.unit_price * i64::from(model.quantity),
            id: model.id,
            order_id: model.order_id,
            product_id: model.product_id,
            quantity: model.quantity,
            unit_price: model.unit_price,
        }
    }
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct StatusHistoryEntry {
    pub id: i32,
    pub status_id: i32,
    pub status_name: String,
    pub changed_at: DateTime<Utc>,
    pub changed_by: Uuid,
    pub changed_by_name: String,
    pub comment: Option<String>,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct Appointment {
    pub id: Uuid,
    pub client_id: Uuid,
    pub service_id: Uuid,
    pub appointment_at: DateTime<Utc>,
    pub end_at: DateTime<Utc>,
    pub duration_minutes: i32,
    pub status: String,
    pub notes: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

pub fn appointment_end(start: DateTime<Utc>, duration_minutes: i32) -> DateTime<Utc> {
    start + Duration::minutes(i64::from(duration_minutes))
}

impl From<service_appointments::Model> for Appointment {
    fn from(model: service_appointments::Model) -> Self {
        Self {
            end_at: appointment_end(model.appointment_at, model.duration_minutes),
            id: model.id,
            client_id: model.client_id,
            service_id: model.service_id,
            appointment_at: model.appointment_at,
            duration_minutes: model.duration_minutes,
            status: model.status,
            notes: model.notes,
            created_at: model.created_at,
            updated_at: model.updated_at,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn role_ids_match_seeded_rows() {
        assert_eq!(Role::Client.id(), 1);
        assert_eq!(Role::Designer.id(), 2);
        assert_eq!(Role::from_id(1), Some(Role::Client));
        assert_eq!(Role::from_id(2), Some(Role::Designer));
        assert_eq!(Role::from_id(3), None);
        assert_eq!(Role::from_name(Role::Designer.as_str()), Some(Role::Designer));
        assert_eq!(Role::from_name("designer"), None);
    }

    #[test]
    fn landing_path_depends_on_role() {
        assert_eq!(Role::Designer.landing_path(), "/admin");
        assert_eq!(Role::Client.landing_path(), "/client");
    }

    #[test]
    fn terminal_statuses_reject_every_transition() {
        for next in OrderStatusKind::ALL {
            assert!(!OrderStatusKind::Done.can_transition_to(next));
            assert!(!OrderStatusKind::Cancelled.can_transition_to(next));
        }
    }

    #[test]
    fn open_statuses_move_anywhere_but_themselves() {
        use OrderStatusKind::*;
        assert!(Queued.can_transition_to(InProgress));
        assert!(Queued.can_transition_to(Done));
        assert!(Queued.can_transition_to(Cancelled));
        assert!(InProgress.can_transition_to(Done));
        assert!(InProgress.can_transition_to(Queued));
        assert!(InProgress.can_transition_to(Cancelled));
        assert!(!Queued.can_transition_to(Queued));
        assert!(!InProgress.can_transition_to(InProgress));
    }

    #[test]
    fn status_ids_round_trip() {
        for status in OrderStatusKind::ALL {
            assert_eq!(OrderStatusKind::from_id(status.id()), Some(status));
        }
        assert_eq!(OrderStatusKind::from_id(0), None);
        assert_eq!(OrderStatusKind::from_id(5), None);
    }

    #[test]
    fn only_exact_service_type_marks_a_service() {
        let cases = [
            ("service", true),
            ("product", false),
            ("Service", false),
            ("services", false),
            (" service", false),
            ("", false),
        ];
        for (input, expected) in cases {
            assert_eq!(is_service_type(input), expected, "input {input:?}");
        }
        assert_eq!(product_type_of(true), "service");
        assert_eq!(product_type_of(false), "product");
    }

    #[test]
    fn appointment_end_adds_duration() {
        let start = Utc.with_ymd_and_hms(2030, 5, 1, 10, 0, 0).unwrap();
        let end = appointment_end(start, 90);
        assert_eq!(end, Utc.with_ymd_and_hms(2030, 5, 1, 11, 30, 0).unwrap());
    }

    #[test]
    fn appointment_status_parsing() {
        assert_eq!(AppointmentStatus::parse("booked"), Some(AppointmentStatus::Booked));
        assert_eq!(AppointmentStatus::parse("BOOKED"), None);
        assert!(AppointmentStatus::Confirmed.is_open());
        assert!(!AppointmentStatus::Completed.is_open());
    }
}
