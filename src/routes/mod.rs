use axum::Router;

use crate::state::AppState;

pub mod admin;
pub mod appointments;
pub mod auth;
pub mod catalog;
pub mod doc;
pub mod health;
pub mod orders;
pub mod params;

// Build the API router without binding state; it will be provided at the top level.
pub fn create_api_router() -> Router<AppState> {
    Router::new()
        .merge(catalog::router())
        .nest("/auth", auth::router())
        .nest("/orders", orders::router())
        .nest("/appointments", appointments::router())
        .nest("/admin", admin::router())
}
