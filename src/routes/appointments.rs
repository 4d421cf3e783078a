use axum::{
    Json, Router,
    extract::{Path, Query, State},
    http::StatusCode,
    routing::{get, post},
};
use uuid::Uuid;

use crate::{
    dto::appointments::{AppointmentList, BookAppointmentRequest},
    error::AppResult,
    middleware::auth::AuthUser,
    models::Appointment,
    response::ApiResponse,
    routes::params::AppointmentListQuery,
    services::appointment_service,
    state::AppState,
};

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(list_appointments).post(book_appointment))
        .route("/{id}/cancel", post(cancel_appointment))
}

#[utoipa::path(
    get,
    path = "/api/appointments",
    params(AppointmentListQuery),
    responses(
        (status = 200, description = "The caller's appointments", body = ApiResponse<AppointmentList>),
        (status = 403, description = "Clients only"),
    ),
    security(("bearer_auth" = [])),
    tag = "Appointments"
)]
pub async fn list_appointments(
    State(state): State<AppState>,
    user: AuthUser,
    Query(query): Query<AppointmentListQuery>,
) -> AppResult<Json<ApiResponse<AppointmentList>>> {
    let resp = appointment_service::list_my_appointments(&state, &user, query).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    post,
    path = "/api/appointments",
    request_body = BookAppointmentRequest,
    responses(
        (status = 201, description = "Appointment booked", body = ApiResponse<Appointment>),
        (status = 409, description = "Slot overlaps another booking of the service"),
        (status = 422, description = "Not a bookable service, bad duration or past date"),
    ),
    security(("bearer_auth" = [])),
    tag = "Appointments"
)]
pub async fn book_appointment(
    State(state): State<AppState>,
    user: AuthUser,
    Json(payload): Json<BookAppointmentRequest>,
) -> AppResult<(StatusCode, Json<ApiResponse<Appointment>>)> {
    let resp = appointment_service::book_appointment(&state, &user, payload).await?;
    Ok((StatusCode::CREATED, Json(resp)))
}

#[utoipa::path(
    post,
    path = "/api/appointments/{id}/cancel",
    params(
        ("id" = Uuid, Path, description = "Appointment ID")
    ),
    responses(
        (status = 200, description = "Appointment cancelled", body = ApiResponse<Appointment>),
        (status = 404, description = "Appointment not found"),
        (status = 409, description = "Appointment already completed or cancelled"),
    ),
    security(("bearer_auth" = [])),
    tag = "Appointments"
)]
pub async fn cancel_appointment(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<Uuid>,
) -> AppResult<Json<ApiResponse<Appointment>>> {
    let resp = appointment_service::cancel_my_appointment(&state, &user, id).await?;
    Ok(Json(resp))
}
