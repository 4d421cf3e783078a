pub mod appointments;
pub mod auth;
pub mod categories;
pub mod orders;
pub mod products;
