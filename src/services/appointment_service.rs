use chrono::{DateTime, Duration, Utc};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, Condition, ConnectionTrait, EntityTrait, PaginatorTrait,
    QueryFilter, QueryOrder, QuerySelect, Set, TransactionTrait,
};
use uuid::Uuid;

use crate::{
    dto::appointments::{
        AppointmentList, BookAppointmentRequest, MAX_DURATION_MINUTES,
        UpdateAppointmentStatusRequest,
    },
    entity::{
        products::Entity as Products,
        service_appointments::{
            ActiveModel as AppointmentActive, Column as ApptCol, Entity as Appointments,
            Model as AppointmentModel,
        },
    },
    error::{AppError, AppResult},
    middleware::auth::{AuthUser, ensure_client, ensure_designer},
    models::{Appointment, AppointmentStatus, appointment_end},
    response::{ApiResponse, Meta},
    routes::params::AppointmentListQuery,
    state::AppState,
};

/// Book a service slot. The slot must not overlap another live booking of the
/// same service.
pub async fn book_appointment(
    state: &AppState,
    user: &AuthUser,
    payload: BookAppointmentRequest,
) -> AppResult<ApiResponse<Appointment>> {
    ensure_client(user)?;
    let now = Utc::now();
    payload.validate(now)?;

    let txn = state.orm.begin().await?;

    let service = Products::find_by_id(payload.service_id).one(&txn).await?;
    match service {
        Some(p) if p.is_service && p.is_active => {}
        Some(p) if !p.is_service => {
            return Err(AppError::validation(
                "service_id",
                "Only services can be booked",
            ));
        }
        Some(_) => {
            return Err(AppError::validation(
                "service_id",
                "Service is not available",
            ));
        }
        None => {
            return Err(AppError::validation(
                "service_id",
                "Service does not exist",
            ));
        }
    }

    let start = payload.appointment_at;
    let duration = payload.duration();
    let end = appointment_end(start, duration);
    if let Some(clash) = find_overlap(&txn, payload.service_id, start, duration).await? {
        return Err(AppError::Conflict(format!(
            "The service is already booked from {} to {}",
            clash.appointment_at.to_rfc3339(),
            appointment_end(clash.appointment_at, clash.duration_minutes).to_rfc3339()
        )));
    }

    let appointment = AppointmentActive {
        id: Set(Uuid::new_v4()),
        client_id: Set(user.user_id),
        service_id: Set(payload.service_id),
        appointment_at: Set(start),
        duration_minutes: Set(duration),
        status: Set(AppointmentStatus::Booked.as_str().to_string()),
        notes: Set(payload
            .notes
            .map(|n| n.trim().to_string())
            .filter(|n| !n.is_empty())),
        created_at: Set(now),
        updated_at: Set(now),
    }
    .insert(&txn)
    .await?;
    txn.commit().await?;

    tracing::info!(
        appointment_id = %appointment.id,
        service_id = %appointment.service_id,
        start = %start,
        end = %end,
        "appointment booked"
    );
    Ok(ApiResponse::success(
        "Appointment booked",
        Appointment::from(appointment),
        Some(Meta::empty()),
    ))
}

pub async fn list_my_appointments(
    state: &AppState,
    user: &AuthUser,
    query: AppointmentListQuery,
) -> AppResult<ApiResponse<AppointmentList>> {
    ensure_client(user)?;
    list_appointments_for(&state.orm, Some(user.user_id), query).await
}

pub async fn cancel_my_appointment(
    state: &AppState,
    user: &AuthUser,
    id: Uuid,
) -> AppResult<ApiResponse<Appointment>> {
    ensure_client(user)?;
    let appointment = Appointments::find()
        .filter(
            Condition::all()
                .add(ApptCol::Id.eq(id))
                .add(ApptCol::ClientId.eq(user.user_id)),
        )
        .one(&state.orm)
        .await?;
    let appointment = match appointment {
        Some(a) => a,
        None => return Err(AppError::NotFound),
    };

    let updated = apply_status(&state.orm, appointment, AppointmentStatus::Cancelled).await?;
    tracing::info!(appointment_id = %id, by = %user.user_id, "appointment cancelled by client");
    Ok(ApiResponse::success(
        "Appointment cancelled",
        Appointment::from(updated),
        Some(Meta::empty()),
    ))
}

pub async fn list_all_appointments(
    state: &AppState,
    user: &AuthUser,
    query: AppointmentListQuery,
) -> AppResult<ApiResponse<AppointmentList>> {
    ensure_designer(user)?;
    list_appointments_for(&state.orm, None, query).await
}

pub async fn set_appointment_status(
    state: &AppState,
    user: &AuthUser,
    id: Uuid,
    payload: UpdateAppointmentStatusRequest,
) -> AppResult<ApiResponse<Appointment>> {
    ensure_designer(user)?;
    let appointment = Appointments::find_by_id(id).one(&state.orm).await?;
    let appointment = match appointment {
        Some(a) => a,
        None => return Err(AppError::NotFound),
    };

    let updated = apply_status(&state.orm, appointment, payload.status).await?;
    tracing::info!(
        appointment_id = %id,
        status = payload.status.as_str(),
        by = %user.user_id,
        "appointment status changed"
    );
    Ok(ApiResponse::success(
        "Appointment updated",
        Appointment::from(updated),
        Some(Meta::empty()),
    ))
}

/// Completed and cancelled appointments are closed and keep their status.
async fn apply_status<C: ConnectionTrait>(
    db: &C,
    appointment: AppointmentModel,
    next: AppointmentStatus,
) -> AppResult<AppointmentModel> {
    let current = AppointmentStatus::parse(&appointment.status).ok_or_else(|| {
        AppError::Internal(anyhow::anyhow!(
            "appointment {} has unknown status {}",
            appointment.id,
            appointment.status
        ))
    })?;
    if !current.is_open() {
        return Err(AppError::Conflict(format!(
            "Appointment is already {}",
            current.as_str()
        )));
    }
    if current == next {
        return Ok(appointment);
    }

    let mut active: AppointmentActive = appointment.into();
    active.status = Set(next.as_str().to_string());
    active.updated_at = Set(Utc::now());
    Ok(active.update(db).await?)
}

/// First live appointment of `service_id` sharing any time with
/// `[start, start + duration)`.
async fn find_overlap<C: ConnectionTrait>(
    db: &C,
    service_id: Uuid,
    start: DateTime<Utc>,
    duration: i32,
) -> AppResult<Option<AppointmentModel>> {
    let end = appointment_end(start, duration);
    let earliest = start - Duration::minutes(i64::from(MAX_DURATION_MINUTES));

    let condition = Condition::all()
        .add(ApptCol::ServiceId.eq(service_id))
        .add(ApptCol::Status.ne(AppointmentStatus::Cancelled.as_str()))
        .add(ApptCol::AppointmentAt.lt(end))
        .add(ApptCol::AppointmentAt.gt(earliest));

    let candidates = Appointments::find()
        .filter(condition)
        .order_by_asc(ApptCol::AppointmentAt)
        .all(db)
        .await?;

    Ok(candidates
        .into_iter()
        .find(|other| appointment_end(other.appointment_at, other.duration_minutes) > start))
}

async fn list_appointments_for<C: ConnectionTrait>(
    db: &C,
    client_id: Option<Uuid>,
    query: AppointmentListQuery,
) -> AppResult<ApiResponse<AppointmentList>> {
    let (page, limit, offset) = query.pagination().normalize();

    let mut condition = Condition::all();
    if let Some(client_id) = client_id {
        condition = condition.add(ApptCol::ClientId.eq(client_id));
    }
    if let Some(service_id) = query.service_id {
        condition = condition.add(ApptCol::ServiceId.eq(service_id));
    }
    if let Some(status) = query.status {
        condition = condition.add(ApptCol::Status.eq(status.as_str()));
    }

    let finder = Appointments::find()
        .filter(condition)
        .order_by_asc(ApptCol::AppointmentAt);
    let total = finder.clone().count(db).await?;
    let items = finder
        .limit(limit as u64)
        .offset(offset as u64)
        .all(db)
        .await?
        .into_iter()
        .map(Appointment::from)
        .collect();

    Ok(ApiResponse::success(
        "Appointments",
        AppointmentList { items },
        Some(Meta::paged(page, limit, total)),
    ))
}
