mod common;

use chrono::{DateTime, Duration, TimeZone, Utc};
use design_studio_api::{
    dto::appointments::{BookAppointmentRequest, UpdateAppointmentStatusRequest},
    entity::products::Entity as Products,
    error::AppError,
    middleware::auth::AuthUser,
    models::{AppointmentStatus, Product},
    routes::params::AppointmentListQuery,
    services::{appointment_service, product_service},
    state::AppState,
};
use sea_orm::EntityTrait;
use uuid::Uuid;

fn slot(hour: u32, minute: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2099, 1, 15, hour, minute, 0).unwrap()
}

fn booking(service_id: Uuid, at: DateTime<Utc>, minutes: Option<i32>) -> BookAppointmentRequest {
    BookAppointmentRequest {
        service_id,
        appointment_at: at,
        duration_minutes: minutes,
        notes: Some("Bring brand guidelines".into()),
    }
}

async fn consultation(state: &AppState) -> anyhow::Result<(AuthUser, Product)> {
    let designer = common::designer(state).await?;
    let service = common::product(
        state,
        &designer,
        common::product_request("Consultation", 300_000, "service"),
    )
    .await?;
    Ok((designer, service))
}

#[tokio::test]
async fn booking_starts_booked_with_derived_end() -> anyhow::Result<()> {
    let app = common::setup().await?;
    let state = &app.state;
    let (_, service) = consultation(state).await?;
    let client = common::client(state).await?;

    let appointment =
        appointment_service::book_appointment(state, &client, booking(service.id, slot(10, 0), None))
            .await?
            .data
            .expect("appointment");
    assert_eq!(appointment.status, "booked");
    assert_eq!(appointment.duration_minutes, 60);
    assert_eq!(appointment.end_at, slot(11, 0));
    assert_eq!(appointment.client_id, client.user_id);

    let mine = appointment_service::list_my_appointments(
        state,
        &client,
        AppointmentListQuery::default(),
    )
    .await?
    .data
    .expect("appointments");
    assert_eq!(mine.items.len(), 1);
    assert_eq!(mine.items[0].id, appointment.id);
    Ok(())
}

#[tokio::test]
async fn overlapping_bookings_are_rejected() -> anyhow::Result<()> {
    let app = common::setup().await?;
    let state = &app.state;
    let (designer, service) = consultation(state).await?;
    let first_client = common::client(state).await?;
    let second_client = common::client(state).await?;

    let first = appointment_service::book_appointment(
        state,
        &first_client,
        booking(service.id, slot(10, 0), Some(90)),
    )
    .await?
    .data
    .expect("appointment");

    for (start, minutes) in [(slot(9, 0), Some(61)), (slot(10, 30), Some(15)), (slot(11, 29), None)] {
        let clash =
            appointment_service::book_appointment(state, &second_client, booking(service.id, start, minutes))
                .await;
        assert!(
            matches!(clash, Err(AppError::Conflict(_))),
            "booking at {start} should clash"
        );
    }

    // Touching slots are fine.
    appointment_service::book_appointment(
        state,
        &second_client,
        booking(service.id, slot(9, 0), Some(60)),
    )
    .await?;
    appointment_service::book_appointment(
        state,
        &second_client,
        booking(service.id, slot(11, 30), Some(30)),
    )
    .await?;

    // Another service is independent.
    let other = common::product(
        state,
        &designer,
        common::product_request("Portfolio review", 150_000, "service"),
    )
    .await?;
    appointment_service::book_appointment(
        state,
        &second_client,
        booking(other.id, slot(10, 0), None),
    )
    .await?;

    // A cancelled booking frees its slot.
    appointment_service::cancel_my_appointment(state, &first_client, first.id).await?;
    appointment_service::book_appointment(
        state,
        &second_client,
        booking(service.id, slot(10, 0), Some(90)),
    )
    .await?;
    Ok(())
}

#[tokio::test]
async fn only_active_services_in_the_future_can_be_booked() -> anyhow::Result<()> {
    let app = common::setup().await?;
    let state = &app.state;
    let (designer, service) = consultation(state).await?;
    let client = common::client(state).await?;

    let good = common::product(state, &designer, common::product_request("Poster", 5_000, "product"))
        .await?;
    let not_a_service =
        appointment_service::book_appointment(state, &client, booking(good.id, slot(10, 0), None))
            .await;
    assert!(matches!(not_a_service, Err(AppError::Validation(_))));

    let missing =
        appointment_service::book_appointment(state, &client, booking(Uuid::new_v4(), slot(10, 0), None))
            .await;
    assert!(matches!(missing, Err(AppError::Validation(_))));

    let past = appointment_service::book_appointment(
        state,
        &client,
        booking(service.id, Utc::now() - Duration::hours(1), None),
    )
    .await;
    assert!(matches!(past, Err(AppError::Validation(_))));

    let too_short = appointment_service::book_appointment(
        state,
        &client,
        booking(service.id, slot(10, 0), Some(5)),
    )
    .await;
    assert!(matches!(too_short, Err(AppError::Validation(_))));

    let by_designer = appointment_service::book_appointment(
        state,
        &designer,
        booking(service.id, slot(10, 0), None),
    )
    .await;
    assert!(matches!(by_designer, Err(AppError::Forbidden)));
    Ok(())
}

#[tokio::test]
async fn closed_appointments_keep_their_status() -> anyhow::Result<()> {
    let app = common::setup().await?;
    let state = &app.state;
    let (designer, service) = consultation(state).await?;
    let client = common::client(state).await?;
    let stranger = common::client(state).await?;

    let appointment =
        appointment_service::book_appointment(state, &client, booking(service.id, slot(14, 0), None))
            .await?
            .data
            .expect("appointment");

    let foreign = appointment_service::cancel_my_appointment(state, &stranger, appointment.id).await;
    assert!(matches!(foreign, Err(AppError::NotFound)));

    let confirmed = appointment_service::set_appointment_status(
        state,
        &designer,
        appointment.id,
        UpdateAppointmentStatusRequest {
            status: AppointmentStatus::Confirmed,
        },
    )
    .await?
    .data
    .expect("appointment");
    assert_eq!(confirmed.status, "confirmed");

    let completed = appointment_service::set_appointment_status(
        state,
        &designer,
        appointment.id,
        UpdateAppointmentStatusRequest {
            status: AppointmentStatus::Completed,
        },
    )
    .await?
    .data
    .expect("appointment");
    assert_eq!(completed.status, "completed");

    let late_cancel = appointment_service::cancel_my_appointment(state, &client, appointment.id).await;
    assert!(matches!(late_cancel, Err(AppError::Conflict(_))));

    let reopened = appointment_service::set_appointment_status(
        state,
        &designer,
        appointment.id,
        UpdateAppointmentStatusRequest {
            status: AppointmentStatus::Booked,
        },
    )
    .await;
    assert!(matches!(reopened, Err(AppError::Conflict(_))));

    let completed_only = appointment_service::list_all_appointments(
        state,
        &designer,
        AppointmentListQuery {
            status: Some(AppointmentStatus::Completed),
            service_id: Some(service.id),
            ..Default::default()
        },
    )
    .await?
    .data
    .expect("appointments");
    assert_eq!(completed_only.items.len(), 1);

    let by_client = appointment_service::list_all_appointments(
        state,
        &client,
        AppointmentListQuery::default(),
    )
    .await;
    assert!(matches!(by_client, Err(AppError::Forbidden)));
    Ok(())
}

#[tokio::test]
async fn booked_service_cannot_be_deleted() -> anyhow::Result<()> {
    let app = common::setup().await?;
    let state = &app.state;
    let (designer, service) = consultation(state).await?;
    let client = common::client(state).await?;

    let appointment =
        appointment_service::book_appointment(state, &client, booking(service.id, slot(16, 0), None))
            .await?
            .data
            .expect("appointment");

    let deleted = product_service::delete_product(state, &designer, service.id).await;
    assert!(matches!(deleted, Err(AppError::Conflict(_))));
    assert!(Products::find_by_id(service.id).one(&state.orm).await?.is_some());

    // Cancelled bookings still reference the service.
    appointment_service::cancel_my_appointment(state, &client, appointment.id).await?;
    let still_blocked = product_service::delete_product(state, &designer, service.id).await;
    assert!(matches!(still_blocked, Err(AppError::Conflict(_))));
    Ok(())
}
