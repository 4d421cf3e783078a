pub mod categories;
pub mod order_items;
pub mod order_status_history;
pub mod order_statuses;
pub mod orders;
pub mod products;
pub mod roles;
pub mod service_appointments;
pub mod users;

pub use categories::Entity as Categories;
pub use order_items::Entity as OrderItems;
pub use order_status_history::Entity as OrderStatusHistory;
pub use order_statuses::Entity as OrderStatuses;
pub use orders::Entity as Orders;
pub use products::Entity as Products;
pub use roles::Entity as Roles;
pub use service_appointments::Entity as ServiceAppointments;
pub use users::Entity as Users;
