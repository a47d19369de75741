//! Test utilities for the backend crate.
//!
//! Shared by unit tests (in `src/`) and integration tests (in `tests/`). Only
//! compiled for tests or with the `test-support` feature.

pub mod cap_fs {
    //! Capability-safe filesystem helpers for tests.

    use std::io;
    use std::path::Path;

    use cap_std::{ambient_authority, fs::Dir};

    fn split(path: &Path) -> io::Result<(Dir, &Path)> {
        let parent = path
            .parent()
            .filter(|parent| !parent.as_os_str().is_empty())
            .unwrap_or_else(|| Path::new("."));
        let name = path
            .file_name()
            .map(Path::new)
            .ok_or_else(|| io::Error::new(io::ErrorKind::InvalidInput, "path has no file name"))?;
        Ok((Dir::open_ambient_dir(parent, ambient_authority())?, name))
    }

    /// Read a whole file through `cap_std`.
    pub fn read_file(path: &Path) -> io::Result<Vec<u8>> {
        let (dir, name) = split(path)?;
        dir.read(name)
    }

    /// Report whether `path` exists; unreadable parents count as missing.
    pub fn path_exists(path: &Path) -> bool {
        split(path).is_ok_and(|(dir, name)| dir.exists(name))
    }
}

pub mod memory_state {
    //! Fully in-memory [`HttpState`] for handler and flow tests.

    use std::io;
    use std::path::{Path, PathBuf};
    use std::sync::Arc;

    use tempfile::TempDir;

    use crate::domain::{AttributeService, RecipeService, UserService};
    use crate::inbound::http::state::{HttpState, HttpStatePorts};
    use crate::outbound::media::FsImageStore;
    use crate::outbound::memory::{MemoryRecipeStore, MemoryUserRepository};
    use crate::outbound::security::Sha256PasswordHasher;

    /// Handler state plus the temporary media root backing it.
    ///
    /// Dropping the harness deletes the media directory.
    pub struct MemoryHarness {
        pub state: HttpState,
        media: TempDir,
    }

    impl MemoryHarness {
        /// Wire every port to the in-memory adapters.
        ///
        /// Password hashing uses a single round to keep tests fast.
        pub fn new() -> io::Result<Self> {
            let media = TempDir::new()?;
            let images = Arc::new(FsImageStore::open(media.path())?);
            let store = Arc::new(MemoryRecipeStore::default());
            let users = Arc::new(UserService::new(
                Arc::new(MemoryUserRepository::default()),
                Arc::new(Sha256PasswordHasher::with_iterations(1)),
            ));
            let recipes = Arc::new(RecipeService::new(Arc::clone(&store), images));
            let state = HttpState::new(HttpStatePorts {
                login: users.clone(),
                accounts: users,
                recipes: recipes.clone(),
                recipes_query: recipes,
                attributes: Arc::new(AttributeService::new(store)),
            });
            Ok(Self { state, media })
        }

        /// Override the upload limit.
        #[must_use]
        pub fn with_max_upload_bytes(mut self, limit: usize) -> Self {
            self.state = self.state.with_max_upload_bytes(limit);
            self
        }

        pub fn media_root(&self) -> &Path {
            self.media.path()
        }

        /// Absolute location of a stored image path such as `uploads/recipe/x.jpg`.
        pub fn media_path(&self, relative: &str) -> PathBuf {
            self.media.path().join(relative)
        }
    }
}
