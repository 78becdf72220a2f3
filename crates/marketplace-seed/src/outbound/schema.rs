//! Diesel table definitions for the marketplace tables the generator writes.
//!
//! The marketplace application owns the schema and its migrations; these
//! definitions must mirror it.

diesel::table! {
    /// Product taxonomy. `slug` is unique.
    categories (id) {
        id -> Uuid,
        title -> Varchar,
        slug -> Varchar,
    }
}

diesel::table! {
    /// Sellers and viewers. `email` is unique.
    users (id) {
        id -> Uuid,
        name -> Varchar,
        email -> Varchar,
        password -> Varchar,
        phone -> Varchar,
    }
}

diesel::table! {
    /// Product listings.
    products (id) {
        id -> Uuid,
        title -> Varchar,
        description -> Text,
        price_in_cents -> Int4,
        status -> Varchar,
        owner_id -> Uuid,
        category_id -> Uuid,
    }
}

diesel::table! {
    /// Uploaded files. The product link is cleared when its product goes.
    attachments (id) {
        id -> Uuid,
        path -> Varchar,
        product_id -> Nullable<Uuid>,
    }
}

diesel::table! {
    /// Product view history.
    views (id) {
        id -> Uuid,
        product_id -> Uuid,
        viewer_id -> Uuid,
        created_at -> Timestamptz,
    }
}

diesel::joinable!(products -> categories (category_id));
diesel::joinable!(products -> users (owner_id));
diesel::joinable!(attachments -> products (product_id));
diesel::joinable!(views -> products (product_id));
diesel::joinable!(views -> users (viewer_id));

diesel::allow_tables_to_appear_in_same_query!(attachments, categories, products, users, views);
