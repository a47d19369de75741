//! Driven port for storing uploaded recipe images.
//!
//! Paths are relative to the store's root, e.g. `uploads/recipe/<uuid>.jpg`.

use async_trait::async_trait;

use super::define_port_error;

define_port_error! {
    /// Failures raised by image storage adapters.
    pub enum ImageStoreError {
        /// The path escapes the storage root or is otherwise unusable.
        InvalidPath { path: String } => "invalid image path: {path}",
        /// Reading or writing the file failed.
        Io { message: String } => "image storage failed: {message}",
    }
}

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ImageStore: Send + Sync {
    /// Write `bytes` to `path`, creating parent directories as needed.
    async fn save(&self, path: &str, bytes: Vec<u8>) -> Result<(), ImageStoreError>;

    /// Remove the file at `path`. Missing files are not an error.
    async fn remove(&self, path: &str) -> Result<(), ImageStoreError>;
}
