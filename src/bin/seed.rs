use design_studio_api::{
    config::AppConfig,
    db::{create_orm_conn, run_migrations},
    seed::{CLIENT_EMAIL, DESIGNER_EMAIL, seed_demo_data},
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,design_studio_api=debug".into()),
        )
        .init();

    let database_url = AppConfig::database_url_from_env()?;
    let orm = create_orm_conn(&database_url).await?;
    // Roles and order statuses come from migrations.
    run_migrations(&orm).await?;

    let report = seed_demo_data(&orm).await?;
    if report.is_empty() {
        println!("Seed data already present, nothing to do");
    } else {
        println!(
            "Seed completed: {} user(s), {} categor(ies), {} product(s). Accounts: {DESIGNER_EMAIL}, {CLIENT_EMAIL}",
            report.users_created, report.categories_created, report.products_created
        );
    }
    Ok(())
}
