//! Process-local adapters backing the persistence ports.
//!
//! The server falls back to these when no database URL is configured; unit
//! and HTTP tests use them as realistic doubles. Data is lost on restart.

mod recipe_store;
mod user_repository;

pub use recipe_store::MemoryRecipeStore;
pub use user_repository::MemoryUserRepository;
