//! Domain primitives, entities, ports and services.
//!
//! Purpose: hold the recipe, attribute and user model together with the
//! use-cases operating on them. Nothing here depends on actix or Diesel;
//! adapters reach the domain through the traits in [`ports`].
//!
//! Public surface:
//! - [`Error`] / [`ErrorCode`]: transport-agnostic failure payload.
//! - [`Recipe`], [`RecipeAttribute`], [`User`] and their value types.
//! - [`RecipeService`], [`AttributeService`], [`UserService`]: use-case
//!   implementations of the driving ports.

pub mod attribute;
pub mod attribute_service;
pub mod error;
pub mod image;
pub mod ports;
pub mod recipe;
pub mod recipe_service;
pub mod resolver;
pub mod trace_id;
pub mod user;
pub mod user_service;

pub use self::attribute::{
    ATTRIBUTE_NAME_MAX, AttributeId, AttributeKind, AttributeName, AttributeSpec,
    AttributeValidationError, RecipeAttribute,
};
pub use self::attribute_service::AttributeService;
pub use self::error::{Error, ErrorCode, ErrorValidationError};
pub use self::image::{ImageUpload, ImageUploadError, RECIPE_IMAGE_DIR, recipe_image_path};
pub use self::recipe::{
    CookingTime, LINK_MAX, Price, PriceError, Recipe, RecipeChanges, RecipeDraft, RecipeFields,
    RecipeFilter, RecipeId, RecipeLink, RecipeParts, RecipeValidationError, TITLE_MAX, Title,
};
pub use self::recipe_service::RecipeService;
pub use self::resolver::{Resolved, get_or_create};
pub use self::trace_id::{TRACE_ID_HEADER, TraceId};
pub use self::user::{
    DisplayName, EmailAddress, LoginCredentials, NewAccount, Password, PasswordHash,
    ProfileUpdate, User, UserFlags, UserId, UserValidationError,
};
pub use self::user_service::UserService;
