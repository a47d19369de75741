//! Diesel row structs and their conversion into domain values.
//!
//! Rows stay private to the persistence layer. Conversions re-run domain
//! validation, so a row that no longer satisfies it is reported as a query
//! error instead of leaking an invalid value.

use diesel::prelude::*;
use uuid::Uuid;

use crate::domain::{
    AttributeId, AttributeKind, AttributeName, CookingTime, DisplayName, EmailAddress,
    PasswordHash, Price, RecipeAttribute, RecipeFields, RecipeId, RecipeLink, Title, User,
    UserFlags, UserId,
};

use super::schema::{recipes, users};

#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = users)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub(crate) struct UserRow {
    pub id: Uuid,
    pub email: String,
    pub name: String,
    pub password_hash: String,
    pub is_active: bool,
    pub is_staff: bool,
    pub is_superuser: bool,
}

impl UserRow {
    pub(crate) fn into_domain(self) -> Result<(User, PasswordHash), String> {
        let email = EmailAddress::new(&self.email)
            .map_err(|err| format!("stored email for user {}: {err}", self.id))?;
        let name = DisplayName::new(self.name)
            .map_err(|err| format!("stored name for user {}: {err}", self.id))?;
        let flags = UserFlags {
            is_active: self.is_active,
            is_staff: self.is_staff,
            is_superuser: self.is_superuser,
        };
        let user = User::with_flags(UserId::from_uuid(self.id), email, name, flags);
        Ok((user, PasswordHash::new(self.password_hash)))
    }
}

#[derive(Debug, Insertable)]
#[diesel(table_name = users)]
pub(crate) struct NewUserRow<'a> {
    pub id: Uuid,
    pub email: &'a str,
    pub name: &'a str,
    pub password_hash: &'a str,
    pub is_active: bool,
    pub is_staff: bool,
    pub is_superuser: bool,
}

impl<'a> NewUserRow<'a> {
    pub(crate) fn new(user: &'a User, password_hash: &'a PasswordHash) -> Self {
        let flags = user.flags();
        Self {
            id: *user.id().as_uuid(),
            email: user.email().as_ref(),
            name: user.name().as_ref(),
            password_hash: password_hash.as_str(),
            is_active: flags.is_active,
            is_staff: flags.is_staff,
            is_superuser: flags.is_superuser,
        }
    }
}

/// Profile changes; a `None` digest leaves the stored one untouched.
#[derive(Debug, AsChangeset)]
#[diesel(table_name = users)]
pub(crate) struct UserChangeset<'a> {
    pub name: &'a str,
    pub password_hash: Option<&'a str>,
}

#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = recipes)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub(crate) struct RecipeRow {
    pub id: i64,
    pub user_id: Uuid,
    pub title: String,
    pub description: String,
    pub time_minutes: i32,
    pub price_cents: i32,
    pub link: String,
    pub image: Option<String>,
}

impl RecipeRow {
    pub(crate) fn id(&self) -> RecipeId {
        RecipeId::new(self.id)
    }

    pub(crate) fn owner(&self) -> UserId {
        UserId::from_uuid(self.user_id)
    }

    /// Split into validated scalar fields and the image path.
    pub(crate) fn into_fields(self) -> Result<(RecipeFields, Option<String>), String> {
        let corrupt = |err: &dyn std::fmt::Display| format!("stored recipe {}: {err}", self.id);
        let fields = RecipeFields {
            title: Title::new(self.title.clone()).map_err(|err| corrupt(&err))?,
            description: self.description.clone(),
            time_minutes: CookingTime::new(i64::from(self.time_minutes))
                .map_err(|err| corrupt(&err))?,
            price: Price::from_cents(self.price_cents).map_err(|err| corrupt(&err))?,
            link: RecipeLink::new(self.link.clone()).map_err(|err| corrupt(&err))?,
        };
        Ok((fields, self.image))
    }
}

#[derive(Debug, Insertable, AsChangeset)]
#[diesel(table_name = recipes)]
pub(crate) struct RecipeValues<'a> {
    pub title: &'a str,
    pub description: &'a str,
    pub time_minutes: i32,
    pub price_cents: i32,
    pub link: &'a str,
}

impl<'a> From<&'a RecipeFields> for RecipeValues<'a> {
    fn from(fields: &'a RecipeFields) -> Self {
        Self {
            title: fields.title.as_ref(),
            description: fields.description.as_str(),
            time_minutes: fields.time_minutes.minutes(),
            price_cents: fields.price.cents(),
            link: fields.link.as_ref(),
        }
    }
}

/// `(id, user_id, name)` selected from either `tags` or `ingredients`.
#[derive(Debug, Clone, Queryable)]
pub(crate) struct AttributeRow {
    pub id: i64,
    pub user_id: Uuid,
    pub name: String,
}

impl AttributeRow {
    pub(crate) fn into_domain(self, kind: AttributeKind) -> Result<RecipeAttribute, String> {
        let name = AttributeName::new(self.name)
            .map_err(|err| format!("stored {kind} {}: {err}", self.id))?;
        Ok(RecipeAttribute::new(
            AttributeId::new(self.id),
            UserId::from_uuid(self.user_id),
            kind,
            name,
        ))
    }
}
