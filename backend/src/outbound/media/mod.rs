//! Filesystem image storage rooted at the configured media directory.
//!
//! All access goes through a `cap_std` directory handle, so relative paths
//! cannot escape the media root.

use std::path::{Component, Path};
use std::sync::Arc;

use async_trait::async_trait;
use cap_std::{ambient_authority, fs::Dir};
use tracing::debug;

use crate::domain::ports::{ImageStore, ImageStoreError};

/// [`ImageStore`] writing files beneath a media root.
#[derive(Clone)]
pub struct FsImageStore {
    root: Arc<Dir>,
}

impl FsImageStore {
    /// Open (creating when needed) the media root at `path`.
    pub fn open(path: impl AsRef<Path>) -> std::io::Result<Self> {
        let path = path.as_ref();
        Dir::create_ambient_dir_all(path, ambient_authority())?;
        let root = Dir::open_ambient_dir(path, ambient_authority())?;
        Ok(Self {
            root: Arc::new(root),
        })
    }
}

fn checked(path: &str) -> Result<&Path, ImageStoreError> {
    let candidate = Path::new(path);
    let is_plain = !path.is_empty()
        && candidate
            .components()
            .all(|component| matches!(component, Component::Normal(_)));
    if is_plain {
        Ok(candidate)
    } else {
        Err(ImageStoreError::invalid_path(path))
    }
}

fn io_error(error: std::io::Error) -> ImageStoreError {
    ImageStoreError::io(error.to_string())
}

#[async_trait]
impl ImageStore for FsImageStore {
    async fn save(&self, path: &str, bytes: Vec<u8>) -> Result<(), ImageStoreError> {
        let relative = checked(path)?.to_path_buf();
        let root = Arc::clone(&self.root);
        tokio::task::spawn_blocking(move || {
            if let Some(parent) = relative.parent().filter(|p| !p.as_os_str().is_empty()) {
                root.create_dir_all(parent)?;
            }
            root.write(&relative, bytes)
        })
        .await
        .map_err(|err| ImageStoreError::io(format!("image write task failed: {err}")))?
        .map_err(io_error)?;
        debug!(path, "image saved");
        Ok(())
    }

    async fn remove(&self, path: &str) -> Result<(), ImageStoreError> {
        let relative = checked(path)?.to_path_buf();
        let root = Arc::clone(&self.root);
        tokio::task::spawn_blocking(move || match root.remove_file(&relative) {
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => Ok(()),
            other => other,
        })
        .await
        .map_err(|err| ImageStoreError::io(format!("image remove task failed: {err}")))?
        .map_err(io_error)
    }
}
