//! Diesel table definitions mirroring `backend/migrations`.
//!
//! Keep in sync with the SQL migrations; `diesel print-schema` against a
//! migrated database regenerates this file.

diesel::table! {
    /// Registered accounts.
    users (id) {
        id -> Uuid,
        /// Unique, domain lower-cased address.
        email -> Varchar,
        name -> Varchar,
        /// `sha256$<iterations>$<salt>$<digest>` encoding.
        password_hash -> Text,
        is_active -> Bool,
        is_staff -> Bool,
        is_superuser -> Bool,
        created_at -> Timestamptz,
    }
}

diesel::table! {
    /// Recipes; every row belongs to exactly one user.
    recipes (id) {
        id -> Int8,
        user_id -> Uuid,
        title -> Varchar,
        description -> Text,
        time_minutes -> Int4,
        /// Price in cents, 0..=99999.
        price_cents -> Int4,
        link -> Varchar,
        /// Media-root relative path of the uploaded image.
        image -> Nullable<Text>,
        created_at -> Timestamptz,
    }
}

diesel::table! {
    /// Tags, unique per `(user_id, name)`.
    tags (id) {
        id -> Int8,
        user_id -> Uuid,
        name -> Varchar,
    }
}

diesel::table! {
    /// Ingredients, unique per `(user_id, name)`.
    ingredients (id) {
        id -> Int8,
        user_id -> Uuid,
        name -> Varchar,
    }
}

diesel::table! {
    recipe_tags (recipe_id, tag_id) {
        recipe_id -> Int8,
        tag_id -> Int8,
    }
}

diesel::table! {
    recipe_ingredients (recipe_id, ingredient_id) {
        recipe_id -> Int8,
        ingredient_id -> Int8,
    }
}

diesel::joinable!(recipes -> users (user_id));
diesel::joinable!(tags -> users (user_id));
diesel::joinable!(ingredients -> users (user_id));
diesel::joinable!(recipe_tags -> recipes (recipe_id));
diesel::joinable!(recipe_tags -> tags (tag_id));
diesel::joinable!(recipe_ingredients -> recipes (recipe_id));
diesel::joinable!(recipe_ingredients -> ingredients (ingredient_id));

diesel::allow_tables_to_appear_in_same_query!(
    users,
    recipes,
    tags,
    ingredients,
    recipe_tags,
    recipe_ingredients,
);
