#![allow(dead_code)]

use design_studio_api::{
    config::AppConfig,
    db::{create_orm_conn, run_migrations},
    dto::{categories::CategoryRequest, products::ProductRequest},
    middleware::auth::AuthUser,
    models::{Category, Product, Role},
    services::{auth_service::create_user, category_service, product_service},
    state::AppState,
};
use tempfile::TempDir;
use uuid::Uuid;

/// A migrated in-memory database plus a throwaway web root.
pub struct TestApp {
    pub state: AppState,
    pub web_root: TempDir,
}

pub async fn setup() -> anyhow::Result<TestApp> {
    let web_root = tempfile::tempdir()?;
    let config = AppConfig::for_database("sqlite::memory:", web_root.path());
    let orm = create_orm_conn(&config.database_url).await?;
    run_migrations(&orm).await?;
    Ok(TestApp {
        state: AppState::new(orm, config),
        web_root,
    })
}

pub async fn user(state: &AppState, role: Role) -> anyhow::Result<AuthUser> {
    let email = format!("{}@example.com", Uuid::new_v4());
    let model = create_user(&state.orm, "Test User", &email, "secret-pass", role).await?;
    Ok(AuthUser {
        user_id: model.id,
        role,
    })
}

pub async fn designer(state: &AppState) -> anyhow::Result<AuthUser> {
    user(state, Role::Designer).await
}

pub async fn client(state: &AppState) -> anyhow::Result<AuthUser> {
    user(state, Role::Client).await
}

pub async fn category(state: &AppState, by: &AuthUser, name: &str) -> anyhow::Result<Category> {
    let resp = category_service::create_category(
        state,
        by,
        CategoryRequest {
            name: name.into(),
            description: None,
        },
    )
    .await?;
    Ok(resp.data.expect("category"))
}

pub fn product_request(name: &str, price: i64, product_type: &str) -> ProductRequest {
    ProductRequest {
        name: name.into(),
        description: Some(format!("{name} description")),
        price,
        category_id: None,
        product_type: product_type.into(),
        is_active: true,
    }
}

pub async fn product(
    state: &AppState,
    by: &AuthUser,
    request: ProductRequest,
) -> anyhow::Result<Product> {
    let resp = product_service::create_product(state, by, request).await?;
    Ok(resp.data.expect("product"))
}
