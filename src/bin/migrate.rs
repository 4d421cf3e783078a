use design_studio_api::{
    config::AppConfig,
    db::{create_orm_conn, run_migrations},
    migration::Migrator,
};
use sea_orm_migration::MigratorTrait;

/// `migrate` applies pending migrations; `migrate status` lists them; `migrate down`
/// rolls back the most recent one.
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .init();

    let database_url = AppConfig::database_url_from_env()?;
    let orm = create_orm_conn(&database_url).await?;

    match std::env::args().nth(1).as_deref() {
        None | Some("up") => {
            run_migrations(&orm).await?;
            println!("Migrations applied");
        }
        Some("down") => {
            Migrator::down(&orm, Some(1)).await?;
            println!("Rolled back the last migration");
        }
        Some("status") => {
            Migrator::status(&orm).await?;
        }
        Some(other) => anyhow::bail!("unknown command '{other}', expected up, down or status"),
    }
    Ok(())
}
