//! PostgreSQL adapters built on Diesel and `diesel-async`.
//!
//! Repositories only translate between row structs and domain values; the
//! row structs (`models.rs`) and table definitions (`schema.rs`) never leave
//! this module. Connections come from a bb8 pool and every database failure
//! is mapped to the owning port's error type.
//!
//! ```ignore
//! use recipe_backend::outbound::persistence::{DbPool, DieselRecipeStore, PoolConfig};
//!
//! let pool = DbPool::new(PoolConfig::new("postgres://localhost/recipes")).await?;
//! let store = DieselRecipeStore::new(pool);
//! ```

mod diesel_helpers;
mod diesel_recipe_store;
mod diesel_user_repository;
mod migrations;
mod models;
mod pool;
mod schema;

pub use diesel_recipe_store::DieselRecipeStore;
pub use diesel_user_repository::DieselUserRepository;
pub use migrations::{MIGRATIONS, MigrationError, run_migrations};
pub use pool::{DbPool, PoolConfig, PoolError};
