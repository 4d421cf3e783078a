use argon2::{
    Argon2, PasswordHasher,
    password_hash::{PasswordHash, PasswordVerifier, SaltString},
};
use chrono::Utc;
use password_hash::rand_core::OsRng;
use sea_orm::{ActiveModelTrait, ColumnTrait, ConnectionTrait, EntityTrait, QueryFilter, Set};
use uuid::Uuid;

use crate::{
    dto::auth::{LoginRequest, LoginResponse, RegisterRequest},
    entity::{
        roles::Entity as Roles,
        users::{ActiveModel as UserActive, Column as UserCol, Entity as Users, Model as UserModel},
    },
    error::{AppError, AppResult},
    middleware::auth::{AuthUser, issue_token},
    models::{Role, User},
    response::{ApiResponse, Meta},
    state::AppState,
};

pub async fn register_user(
    state: &AppState,
    payload: RegisterRequest,
) -> AppResult<ApiResponse<User>> {
    payload.validate()?;
    let user = create_user(
        &state.orm,
        &payload.full_name,
        &payload.email,
        &payload.password,
        Role::Client,
    )
    .await?;

    tracing::info!(user_id = %user.id, "user registered");
    Ok(ApiResponse::success(
        "User created",
        user_from_entity(user)?,
        Some(Meta::empty()),
    ))
}

/// Insert a user holding `role`. Emails are stored trimmed and lowercased.
pub async fn create_user<C: ConnectionTrait>(
    db: &C,
    full_name: &str,
    email: &str,
    password: &str,
    role: Role,
) -> AppResult<UserModel> {
    let email = normalize_email(email);
    if find_by_email(db, &email).await?.is_some() {
        return Err(AppError::Conflict("Email is already taken".to_string()));
    }

    let password_hash = hash_password(password)?;
    let user = UserActive {
        id: Set(Uuid::new_v4()),
        full_name: Set(full_name.trim().to_string()),
        email: Set(email),
        password_hash: Set(password_hash),
        role_id: Set(role.id()),
        created_at: Set(Utc::now()),
    }
    .insert(db)
    .await?;
    Ok(user)
}

pub async fn login_user(
    state: &AppState,
    payload: LoginRequest,
) -> AppResult<ApiResponse<LoginResponse>> {
    payload.validate()?;
    let user = find_by_email(&state.orm, &normalize_email(&payload.email)).await?;

    let user = match user {
        Some(u) => u,
        None => return Err(AppError::Unauthorized("Invalid email or password".into())),
    };

    let parsed_hash = PasswordHash::new(&user.password_hash)
        .map_err(|_| AppError::Internal(anyhow::anyhow!("Invalid password hash")))?;

    let argon2 = Argon2::default();
    if argon2
        .verify_password(payload.password.as_bytes(), &parsed_hash)
        .is_err()
    {
        return Err(AppError::Unauthorized("Invalid email or password".into()));
    }

    let role = role_of(&user)?;
    let token = issue_token(&state.config, user.id, role)?;

    tracing::info!(user_id = %user.id, role = role.as_str(), "user logged in");

    let resp = LoginResponse {
        token: format!("Bearer {}", token),
        role,
        redirect: role.landing_path().to_string(),
    };
    Ok(ApiResponse::success("Logged in", resp, Some(Meta::empty())))
}

pub async fn current_user(state: &AppState, user: &AuthUser) -> AppResult<ApiResponse<User>> {
    let model = Users::find_by_id(user.user_id).one(&state.orm).await?;
    let model = match model {
        Some(m) => m,
        None => return Err(AppError::NotFound),
    };
    Ok(ApiResponse::success(
        "Current user",
        user_from_entity(model)?,
        Some(Meta::empty()),
    ))
}

/// Role name of a user as recorded in the `roles` table.
pub async fn role_lookup<C: ConnectionTrait>(db: &C, user_id: Uuid) -> AppResult<String> {
    let found = Users::find_by_id(user_id)
        .find_also_related(Roles)
        .one(db)
        .await?;
    match found {
        Some((_, Some(role))) => Ok(role.name),
        Some((user, None)) => Err(AppError::Internal(anyhow::anyhow!(
            "user {} references missing role {}",
            user.id,
            user.role_id
        ))),
        None => Err(AppError::NotFound),
    }
}

async fn find_by_email<C: ConnectionTrait>(db: &C, email: &str) -> AppResult<Option<UserModel>> {
    let user = Users::find()
        .filter(UserCol::Email.eq(email))
        .one(db)
        .await?;
    Ok(user)
}

fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

fn hash_password(password: &str) -> AppResult<String> {
    let salt = SaltString::generate(&mut OsRng);
    let argon2 = Argon2::default();
    let hash = argon2
        .hash_password(password.as_bytes(), &salt)
        .map_err(|e| AppError::Internal(anyhow::anyhow!(e.to_string())))?
        .to_string();
    Ok(hash)
}

fn role_of(user: &UserModel) -> AppResult<Role> {
    Role::from_id(user.role_id).ok_or_else(|| {
        AppError::Internal(anyhow::anyhow!(
            "user {} has unknown role id {}",
            user.id,
            user.role_id
        ))
    })
}

pub(crate) fn user_from_entity(model: UserModel) -> AppResult<User> {
    let role = role_of(&model)?;
    Ok(User {
        id: model.id,
        full_name: model.full_name,
        email: model.email,
        role,
        role_id: model.role_id,
        created_at: model.created_at,
    })
}
