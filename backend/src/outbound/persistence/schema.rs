//! Diesel table definitions for the PostgreSQL schema.
//!
//! These definitions must match the migrations exactly; Diesel uses them for
//! compile-time query validation and type-safe SQL generation.

diesel::table! {
    /// Application users.
    ///
    /// `id` is a `SERIAL` primary key. `email` carries a unique constraint
    /// plus a secondary index for lookup and search.
    users (id) {
        /// Storage-assigned primary key.
        id -> Int4,
        /// Display name (1–255 characters, enforced in the domain).
        #[max_length = 255]
        name -> Varchar,
        /// Unique contact email address.
        #[max_length = 255]
        email -> Varchar,
        /// Optional contact phone number.
        #[max_length = 50]
        phone -> Nullable<Varchar>,
        /// Record creation timestamp, assigned by the database.
        created_at -> Timestamptz,
        /// Last mutation timestamp, refreshed by every update.
        updated_at -> Timestamptz,
    }
}
