//! Builders wiring domain services onto the configured adapters.

use std::io;
use std::path::Path;
use std::sync::Arc;

use actix_web::web;
use tracing::warn;

use recipe_backend::domain::ports::{ImageStore, PasswordHasher, RecipeStore, UserRepository};
use recipe_backend::domain::{AttributeService, RecipeService, UserService};
use recipe_backend::inbound::http::state::{HttpState, HttpStatePorts};
use recipe_backend::outbound::media::FsImageStore;
use recipe_backend::outbound::memory::{MemoryRecipeStore, MemoryUserRepository};
use recipe_backend::outbound::persistence::{DieselRecipeStore, DieselUserRepository};
use recipe_backend::outbound::security::Sha256PasswordHasher;

use super::ServerConfig;

/// Bundle the driving ports over one recipe store and one user repository.
fn ports_over<S, R, M, H>(
    store: Arc<S>,
    users: Arc<R>,
    images: Arc<M>,
    hasher: Arc<H>,
) -> HttpStatePorts
where
    S: RecipeStore + 'static,
    R: UserRepository + 'static,
    M: ImageStore + 'static,
    H: PasswordHasher + 'static,
{
    let accounts = Arc::new(UserService::new(users, hasher));
    let recipes = Arc::new(RecipeService::new(Arc::clone(&store), images));
    HttpStatePorts {
        login: accounts.clone(),
        accounts,
        recipes: recipes.clone(),
        recipes_query: recipes,
        attributes: Arc::new(AttributeService::new(store)),
    }
}

fn open_media_root(root: &Path) -> io::Result<Arc<FsImageStore>> {
    FsImageStore::open(root).map(Arc::new).map_err(|error| {
        io::Error::other(format!(
            "open media root {}: {error}",
            root.display()
        ))
    })
}

/// Build the handler state: Diesel adapters when a pool is configured,
/// in-memory adapters otherwise.
///
/// # Errors
/// Returns [`io::Error`] when the media root cannot be opened.
pub(crate) fn build_http_state(config: &ServerConfig) -> io::Result<web::Data<HttpState>> {
    let images = open_media_root(&config.media_root)?;
    let hasher = Arc::new(Sha256PasswordHasher::default());
    let ports = match &config.db_pool {
        Some(pool) => ports_over(
            Arc::new(DieselRecipeStore::new(pool.clone())),
            Arc::new(DieselUserRepository::new(pool.clone())),
            images,
            hasher,
        ),
        None => {
            warn!("no database configured; recipes and accounts are kept in memory");
            ports_over(
                Arc::new(MemoryRecipeStore::default()),
                Arc::new(MemoryUserRepository::default()),
                images,
                hasher,
            )
        }
    };
    let state = HttpState::new(ports).with_max_upload_bytes(config.max_upload_bytes);
    Ok(web::Data::new(state))
}
