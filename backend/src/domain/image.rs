//! Recipe image uploads and storage path allocation.

use std::path::Path;

use uuid::Uuid;

/// Directory, relative to the media root, holding recipe images.
pub const RECIPE_IMAGE_DIR: &str = "uploads/recipe";

/// Reasons an upload is refused before it reaches storage.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ImageUploadError {
    #[error("image body must not be empty")]
    Empty,
    #[error("content type {content_type:?} is not an image")]
    NotAnImage { content_type: String },
    #[error("image exceeds the {limit} byte upload limit")]
    TooLarge { limit: usize },
}

impl ImageUploadError {
    pub fn code(&self) -> &'static str {
        match self {
            Self::Empty => "empty",
            Self::NotAnImage { .. } => "unsupported_media_type",
            Self::TooLarge { .. } => "too_large",
        }
    }
}

/// Image bytes accepted for a recipe.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageUpload {
    filename: String,
    bytes: Vec<u8>,
}

impl ImageUpload {
    /// Validate an upload against its declared content type and size limit.
    ///
    /// # Examples
    /// ```
    /// use recipe_backend::domain::ImageUpload;
    ///
    /// let upload = ImageUpload::try_new("dish.jpg", "image/jpeg", vec![1, 2, 3], 1024).unwrap();
    /// assert_eq!(upload.bytes().len(), 3);
    /// assert!(ImageUpload::try_new("notes.txt", "text/plain", vec![1], 1024).is_err());
    /// ```
    pub fn try_new(
        filename: impl Into<String>,
        content_type: &str,
        bytes: Vec<u8>,
        limit: usize,
    ) -> Result<Self, ImageUploadError> {
        let essence = content_type
            .split(';')
            .next()
            .unwrap_or_default()
            .trim()
            .to_ascii_lowercase();
        if !essence.starts_with("image/") || essence.len() == "image/".len() {
            return Err(ImageUploadError::NotAnImage {
                content_type: content_type.to_owned(),
            });
        }
        if bytes.is_empty() {
            return Err(ImageUploadError::Empty);
        }
        if bytes.len() > limit {
            return Err(ImageUploadError::TooLarge { limit });
        }
        Ok(Self {
            filename: filename.into(),
            bytes,
        })
    }

    /// Client-supplied file name; only its extension is retained.
    pub fn filename(&self) -> &str {
        self.filename.as_str()
    }

    pub fn bytes(&self) -> &[u8] {
        &self.bytes
    }

    pub fn into_bytes(self) -> Vec<u8> {
        self.bytes
    }
}

/// Allocate a fresh storage path for an uploaded recipe image.
///
/// The result is `uploads/recipe/<uuid><ext>` where `<ext>` is the original
/// extension including its dot. Extensions containing anything other than
/// ASCII alphanumerics are dropped so the path stays inside the directory.
///
/// # Examples
/// ```
/// use recipe_backend::domain::recipe_image_path;
///
/// let path = recipe_image_path("dinner.JPG");
/// assert!(path.starts_with("uploads/recipe/"));
/// assert!(path.ends_with(".JPG"));
/// ```
pub fn recipe_image_path(original_filename: &str) -> String {
    let extension = Path::new(original_filename)
        .extension()
        .and_then(|ext| ext.to_str())
        .filter(|ext| !ext.is_empty() && ext.chars().all(|c| c.is_ascii_alphanumeric()))
        .map(|ext| format!(".{ext}"))
        .unwrap_or_default();
    format!("{RECIPE_IMAGE_DIR}/{}{extension}", Uuid::new_v4())
}
