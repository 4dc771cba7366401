//! Diesel table definitions for the PostgreSQL schema.
//!
//! Must match `migrations/` exactly; regenerate with `diesel print-schema`
//! after changing a migration.

diesel::table! {
    /// Form submissions, one row per contact email.
    form_submissions (id) {
        /// Primary key, assigned by a `BIGSERIAL` sequence.
        id -> Int8,
        /// Submitter name (max 100 characters).
        name -> Varchar,
        /// Contact address, unique across rows.
        email -> Varchar,
        /// Postal address (max 500 characters).
        address -> Varchar,
        /// Optional phone number (max 20 characters).
        phone_number -> Nullable<Varchar>,
        /// Optional comments (max 1000 characters).
        comments -> Nullable<Text>,
        /// One of `PENDING`, `APPROVED`, `REJECTED`, `PROCESSING`.
        status -> Varchar,
        /// Insertion timestamp.
        created_at -> Timestamptz,
        /// Last modification timestamp.
        updated_at -> Timestamptz,
        /// Caller network origin recorded at creation.
        submitted_by_ip -> Nullable<Varchar>,
    }
}
