//! Domain ports and supporting types for the hexagonal boundary.

mod macros;
pub(crate) use macros::define_port_error;

mod image_store;
mod password_hasher;
mod recipe_commands;
mod recipe_store;
mod user_accounts;
mod user_repository;

#[cfg(test)]
pub use image_store::MockImageStore;
pub use image_store::{ImageStore, ImageStoreError};
#[cfg(test)]
pub use password_hasher::MockPasswordHasher;
pub use password_hasher::PasswordHasher;
#[cfg(test)]
pub use recipe_commands::{MockAttributeCatalogue, MockRecipeCommand, MockRecipeQuery};
pub use recipe_commands::{AttributeCatalogue, RecipeCommand, RecipeQuery};
pub use recipe_store::{RecipeStore, RecipeStoreError, RecipeTx, TxFuture};
#[cfg(test)]
pub use user_accounts::{MockLoginService, MockUserAccounts};
pub use user_accounts::{LoginService, UserAccounts};
#[cfg(test)]
pub use user_repository::MockUserRepository;
pub use user_repository::{StoredUser, UserPersistenceError, UserRepository};
