//! Seed an administrator account.
//!
//! Reads `ADMIN_USERNAME` and `ADMIN_PASSWORD` plus the usual `DATABASE_*`
//! variables, then inserts the user with an Argon2 password hash.

use anyhow::{Context, Result};
use tracing::info;
use tracing_subscriber::{EnvFilter, FmtSubscriber};

use auth::{models::NewUser, repositories::UserRepository, validation::validate_new_user};
use common::database::{self, DatabaseConfig};

#[tokio::main]
async fn main() -> Result<()> {
    let subscriber = FmtSubscriber::builder()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .finish();

    tracing::subscriber::set_global_default(subscriber).expect("setting default subscriber failed");

    let new_user = NewUser {
        username: std::env::var("ADMIN_USERNAME").context("ADMIN_USERNAME is not set")?,
        password: std::env::var("ADMIN_PASSWORD").context("ADMIN_PASSWORD is not set")?,
    };

    if let Err(errors) = validate_new_user(&new_user) {
        anyhow::bail!("Invalid administrator account: {}", errors.join("; "));
    }

    let db_config = DatabaseConfig::from_env()?;
    let pool = database::init_pool(&db_config).await?;
    database::run_migrations(&pool).await?;

    let repository = UserRepository::new(pool);
    if repository.find_by_username(&new_user.username).await?.is_some() {
        anyhow::bail!("User {} already exists", new_user.username);
    }

    let user = repository.create(&new_user).await?;
    info!("Created administrator {} with id {}", user.username, user.id);

    Ok(())
}
