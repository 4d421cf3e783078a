use axum::{
    extract::{FromRef, FromRequestParts},
    http::header,
};
use chrono::{Duration, Utc};
use jsonwebtoken::{DecodingKey, EncodingKey, Header, Validation, decode, encode};
use uuid::Uuid;

use crate::{config::AppConfig, dto::auth::Claims, error::AppError, models::Role, state::AppState};

#[derive(Debug, Clone)]
pub struct AuthUser {
    pub user_id: Uuid,
    pub role: Role,
}

pub fn ensure_role(user: &AuthUser, role: Role) -> Result<(), AppError> {
    if user.role != role {
        return Err(AppError::Forbidden);
    }
    Ok(())
}

pub fn ensure_designer(user: &AuthUser) -> Result<(), AppError> {
    ensure_role(user, Role::Designer)
}

pub fn ensure_client(user: &AuthUser) -> Result<(), AppError> {
    ensure_role(user, Role::Client)
}

/// Sign an access token. The role claim is derived from the user's `role_id`.
pub fn issue_token(config: &AppConfig, user_id: Uuid, role: Role) -> Result<String, AppError> {
    let expiration = Utc::now()
        .checked_add_signed(Duration::hours(config.jwt_ttl_hours))
        .ok_or_else(|| AppError::Internal(anyhow::anyhow!("Failed to set expiration")))?;

    let claims = Claims {
        sub: user_id.to_string(),
        role: role.as_str().to_string(),
        exp: expiration.timestamp() as usize,
    };

    encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(config.jwt_secret.as_bytes()),
    )
    .map_err(|e| AppError::Internal(anyhow::anyhow!(e.to_string())))
}

pub fn decode_token(config: &AppConfig, token: &str) -> Result<AuthUser, AppError> {
    let decoded = decode::<Claims>(
        token,
        &DecodingKey::from_secret(config.jwt_secret.as_bytes()),
        &Validation::default(),
    )
    .map_err(|_| AppError::Unauthorized("Invalid or expired token".into()))?;

    let user_id = Uuid::parse_str(&decoded.claims.sub)
        .map_err(|_| AppError::Unauthorized("Invalid user id in token".into()))?;
    let role = Role::from_name(&decoded.claims.role)
        .ok_or_else(|| AppError::Unauthorized("Unknown role in token".into()))?;

    Ok(AuthUser { user_id, role })
}

impl<S> FromRequestParts<S> for AuthUser
where
    AppState: FromRef<S>,
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut axum::http::request::Parts,
        state: &S,
    ) -> Result<Self, Self::Rejection> {
        let auth_header = parts
            .headers
            .get(header::AUTHORIZATION)
            .ok_or_else(|| AppError::Unauthorized("Missing Authorization header".into()))?;

        let auth_str = auth_header
            .to_str()
            .map_err(|_| AppError::Unauthorized("Invalid Authorization header".into()))?;

        let Some(token) = auth_str.strip_prefix("Bearer ") else {
            return Err(AppError::Unauthorized("Invalid Authorization scheme".into()));
        };

        let state = AppState::from_ref(state);
        decode_token(&state.config, token.trim())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn token_round_trip_keeps_role() {
        let config = AppConfig::for_database("sqlite::memory:", "wwwroot");
        let user_id = Uuid::new_v4();
        let token = issue_token(&config, user_id, Role::Designer).unwrap();

        let user = decode_token(&config, &token).unwrap();
        assert_eq!(user.user_id, user_id);
        assert_eq!(user.role, Role::Designer);
        assert!(ensure_designer(&user).is_ok());
        assert!(matches!(ensure_client(&user), Err(AppError::Forbidden)));
    }

    #[test]
    fn foreign_signature_is_rejected() {
        let config = AppConfig::for_database("sqlite::memory:", "wwwroot");
        let mut other = config.clone();
        other.jwt_secret = "another-secret".into();
        let token = issue_token(&other, Uuid::new_v4(), Role::Client).unwrap();

        assert!(matches!(
            decode_token(&config, &token),
            Err(AppError::Unauthorized(_))
        ));
    }
}
