use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::{
    error::{AppResult, FieldErrors},
    models::{Appointment, AppointmentStatus},
};

pub const DEFAULT_DURATION_MINUTES: i32 = 60;
pub const MIN_DURATION_MINUTES: i32 = 15;
pub const MAX_DURATION_MINUTES: i32 = 480;

#[derive(Debug, Deserialize, ToSchema)]
pub struct BookAppointmentRequest {
    pub service_id: Uuid,
    pub appointment_at: DateTime<Utc>,
    pub duration_minutes: Option<i32>,
    pub notes: Option<String>,
}

impl BookAppointmentRequest {
    pub fn duration(&self) -> i32 {
        self.duration_minutes.unwrap_or(DEFAULT_DURATION_MINUTES)
    }

    pub fn validate(&self, now: DateTime<Utc>) -> AppResult<()> {
        let mut errors = FieldErrors::new();
        errors
            .check(
                (MIN_DURATION_MINUTES..=MAX_DURATION_MINUTES).contains(&self.duration()),
                "duration_minutes",
                "Duration must be between 15 and 480 minutes",
            )
            .check(
                self.appointment_at > now,
                "appointment_at",
                "Appointment must be in the future",
            );
        errors.into_result()
    }
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct UpdateAppointmentStatusRequest {
    pub status: AppointmentStatus,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct AppointmentList {
    pub items: Vec<Appointment>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    fn request(offset: Duration, duration: Option<i32>) -> (BookAppointmentRequest, DateTime<Utc>) {
        let now = Utc::now();
        let req = BookAppointmentRequest {
            service_id: Uuid::new_v4(),
            appointment_at: now + offset,
            duration_minutes: duration,
            notes: None,
        };
        (req, now)
    }

    #[test]
    fn duration_defaults_to_an_hour() {
        let (req, now) = request(Duration::days(1), None);
        assert_eq!(req.duration(), 60);
        assert!(req.validate(now).is_ok());
    }

    #[test]
    fn duration_bounds_are_inclusive() {
        for (minutes, ok) in [(14, false), (15, true), (480, true), (481, false)] {
            let (req, now) = request(Duration::days(1), Some(minutes));
            assert_eq!(req.validate(now).is_ok(), ok, "duration {minutes}");
        }
    }

    #[test]
    fn past_appointments_are_rejected() {
        let (req, now) = request(Duration::hours(-1), None);
        assert!(req.validate(now).is_err());
    }
}
