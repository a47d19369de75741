//! Create a staff superuser account.
//!
//! # Examples
//! ```sh
//! cargo run --bin create-superuser -- --email admin@example.com --name Admin \
//!     --password 'correct horse' --database-url postgres://localhost/recipes
//! ```
#![cfg_attr(not(any(test, doctest)), deny(clippy::unwrap_used))]
#![cfg_attr(not(any(test, doctest)), forbid(clippy::expect_used))]

use std::env;
use std::sync::Arc;

use clap::Parser;
use color_eyre::eyre::{Context, Result, eyre};
use tokio::runtime::Builder;

use recipe_backend::domain::{NewAccount, UserService};
use recipe_backend::outbound::persistence::{
    DbPool, DieselUserRepository, PoolConfig, run_migrations,
};
use recipe_backend::outbound::security::Sha256PasswordHasher;

const DATABASE_URL_ENV: &str = "RECIPES_DATABASE_URL";

/// `create-superuser` command arguments.
#[derive(Debug, Clone, Parser)]
#[command(
    name = "create-superuser",
    about = "Create a staff superuser account",
    version
)]
struct CliArgs {
    #[arg(long, value_name = "address")]
    email: String,
    #[arg(long, value_name = "name")]
    name: String,
    #[arg(long, value_name = "password")]
    password: String,
    /// Database connection URL. Falls back to `RECIPES_DATABASE_URL` when omitted.
    #[arg(long = "database-url", value_name = "url")]
    database_url: Option<String>,
}

fn main() -> Result<()> {
    color_eyre::install()?;
    let args = CliArgs::parse();
    let runtime = Builder::new_current_thread()
        .enable_all()
        .build()
        .wrap_err("failed to create Tokio runtime")?;
    runtime.block_on(run(args))
}

fn resolve_database_url(explicit: Option<String>) -> Result<String> {
    match explicit {
        Some(value) if value.trim().is_empty() => {
            Err(eyre!("--database-url must not be empty when provided"))
        }
        Some(value) => Ok(value),
        None => env::var(DATABASE_URL_ENV).map_err(|_| {
            eyre!("database URL missing: set --database-url or {DATABASE_URL_ENV}")
        }),
    }
}

async fn run(args: CliArgs) -> Result<()> {
    let CliArgs {
        email,
        name,
        password,
        database_url,
    } = args;
    let account = NewAccount::try_from_parts(&email, &name, &password)
        .wrap_err("invalid superuser details")?;

    let database_url = resolve_database_url(database_url)?;
    run_migrations(&database_url).await?;
    let pool = DbPool::new(PoolConfig::new(&database_url))
        .await
        .wrap_err("failed to create database pool")?;

    let service = UserService::new(
        Arc::new(DieselUserRepository::new(pool)),
        Arc::new(Sha256PasswordHasher::default()),
    );
    let user = service
        .create_superuser(account)
        .await
        .map_err(|error| eyre!("failed to create superuser: {error}"))?;

    println!("created superuser {} ({})", user.email(), user.id());
    Ok(())
}
