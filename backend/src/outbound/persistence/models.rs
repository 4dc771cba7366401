//! Internal Diesel row structs for database operations.
//!
//! These types never leave the persistence layer.

use chrono::{DateTime, Utc};
use diesel::prelude::*;

use super::schema::form_submissions;

/// Row struct for reading from the form_submissions table.
#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = form_submissions)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub(crate) struct SubmissionRow {
    pub id: i64,
    pub name: String,
    pub email: String,
    pub address: String,
    pub phone_number: Option<String>,
    pub comments: Option<String>,
    pub status: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub submitted_by_ip: Option<String>,
}

/// Insertable struct for new submissions. Timestamps use column defaults.
#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = form_submissions)]
pub(crate) struct NewSubmissionRow<'a> {
    pub name: &'a str,
    pub email: &'a str,
    pub address: &'a str,
    pub phone_number: Option<&'a str>,
    pub comments: Option<&'a str>,
    pub status: &'a str,
    pub submitted_by_ip: Option<&'a str>,
}

/// Changeset for overwriting a submission. `created_at` is never written.
#[derive(Debug, Clone, AsChangeset)]
#[diesel(table_name = form_submissions)]
#[diesel(treat_none_as_null = true)]
pub(crate) struct SubmissionUpdate<'a> {
    pub name: &'a str,
    pub email: &'a str,
    pub address: &'a str,
    pub phone_number: Option<&'a str>,
    pub comments: Option<&'a str>,
    pub status: &'a str,
    pub submitted_by_ip: Option<&'a str>,
}
