use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::{error::FieldErrors, error::AppResult, models::Role};

#[derive(Deserialize, Debug, ToSchema)]
pub struct RegisterRequest {
    pub full_name: String,
    pub email: String,
    pub password: String,
    pub confirm_password: String,
}

impl RegisterRequest {
    pub fn validate(&self) -> AppResult<()> {
        let full_name = self.full_name.trim();
        let email = self.email.trim();
        let password_len = self.password.chars().count();

        let mut errors = FieldErrors::new();
        errors
            .check(!full_name.is_empty(), "full_name", "Full name is required")
            .check(
                full_name.chars().count() <= 100,
                "full_name",
                "Full name must be at most 100 characters",
            )
            .check(is_plausible_email(email), "email", "Email address is invalid")
            .check(
                (6..=100).contains(&password_len),
                "password",
                "Password must be between 6 and 100 characters",
            )
            .check(
                self.password == self.confirm_password,
                "confirm_password",
                "Passwords do not match",
            );
        errors.into_result()
    }
}

fn is_plausible_email(email: &str) -> bool {
    match email.split_once('@') {
        Some((local, domain)) => {
            !local.is_empty()
                && domain.contains('.')
                && !domain.starts_with('.')
                && !domain.ends_with('.')
                && email.len() <= 256
                && !email.chars().any(char::is_whitespace)
        }
        None => false,
    }
}

#[derive(Deserialize, Debug, ToSchema)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

impl LoginRequest {
    pub fn validate(&self) -> AppResult<()> {
        let mut errors = FieldErrors::new();
        errors
            .check(!self.email.trim().is_empty(), "email", "Email is required")
            .check(!self.password.is_empty(), "password", "Password is required");
        errors.into_result()
    }
}

#[derive(Debug, Serialize, ToSchema)]
pub struct LoginResponse {
    pub token: String,
    pub role: Role,
    /// Landing page for the user's role.
    pub redirect: String,
}

#[derive(Debug, Deserialize, Serialize, ToSchema)]
pub struct Claims {
    pub sub: String,
    pub role: String,
    pub exp: usize,
}
