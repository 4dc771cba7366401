//! Ordering and filtering criteria for submission queries.

use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use pagination::SortDirection;

use super::{Submission, SubmissionStatus};

/// Column a submission listing may be ordered by.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum SortField {
    /// Store-assigned identifier.
    Id,
    /// Submitter name.
    Name,
    /// Contact address.
    Email,
    /// Review status.
    Status,
    /// Insertion time.
    #[default]
    CreatedAt,
    /// Time of the last mutation.
    UpdatedAt,
}

impl SortField {
    /// Every sortable field.
    pub const ALL: [Self; 6] = [
        Self::Id,
        Self::Name,
        Self::Email,
        Self::Status,
        Self::CreatedAt,
        Self::UpdatedAt,
    ];

    /// Query-string spelling.
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Id => "id",
            Self::Name => "name",
            Self::Email => "email",
            Self::Status => "status",
            Self::CreatedAt => "createdAt",
            Self::UpdatedAt => "updatedAt",
        }
    }
}

impl fmt::Display for SortField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error returned for an unknown sort field.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("cannot sort by {value}")]
pub struct ParseSortFieldError {
    /// Rejected input.
    pub value: String,
}

impl FromStr for SortField {
    type Err = ParseSortFieldError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalised = s.trim().replace('_', "");
        Self::ALL
            .into_iter()
            .find(|field| field.as_str().eq_ignore_ascii_case(&normalised))
            .ok_or_else(|| ParseSortFieldError {
                value: s.to_owned(),
            })
    }
}

/// Sort key plus direction. Ties are always broken by id in the same
/// direction so page boundaries are stable.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct SubmissionSort {
    /// Primary sort key.
    pub field: SortField,
    /// Direction applied to both the key and the id tiebreak.
    pub direction: SortDirection,
}

impl SubmissionSort {
    /// Construct a sort.
    pub const fn new(field: SortField, direction: SortDirection) -> Self {
        Self { field, direction }
    }

    /// Total order over submissions matching this sort.
    pub fn compare(&self, a: &Submission, b: &Submission) -> Ordering {
        let primary = match self.field {
            SortField::Id => Ordering::Equal,
            SortField::Name => a.fields.name().cmp(b.fields.name()),
            SortField::Email => a.email.as_ref().cmp(b.email.as_ref()),
            SortField::Status => a.status.as_str().cmp(b.status.as_str()),
            SortField::CreatedAt => a.created_at.cmp(&b.created_at),
            SortField::UpdatedAt => a.updated_at.cmp(&b.updated_at),
        };
        let ordering = primary.then_with(|| a.id.cmp(&b.id));
        match self.direction {
            SortDirection::Asc => ordering,
            SortDirection::Desc => ordering.reverse(),
        }
    }
}

/// Multi-criteria search. Every criterion is optional; set criteria are
/// combined with AND.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SubmissionFilter {
    /// Case-insensitive substring of the name.
    pub name: Option<String>,
    /// Exact email address.
    pub email: Option<String>,
    /// Case-insensitive substring of the address.
    pub address: Option<String>,
    /// Exact phone number.
    pub phone_number: Option<String>,
    /// Exact status.
    pub status: Option<SubmissionStatus>,
    /// Inclusive lower bound on `created_at`.
    pub created_from: Option<DateTime<Utc>>,
    /// Inclusive upper bound on `created_at`.
    pub created_to: Option<DateTime<Utc>>,
}

impl SubmissionFilter {
    /// Whether `submission` satisfies every set criterion.
    pub fn matches(&self, submission: &Submission) -> bool {
        let name_ok = self
            .name
            .as_deref()
            .is_none_or(|needle| contains_ignore_case(submission.fields.name(), needle));
        let email_ok = self
            .email
            .as_deref()
            .is_none_or(|email| submission.email.as_ref() == email);
        let address_ok = self
            .address
            .as_deref()
            .is_none_or(|needle| contains_ignore_case(submission.fields.address(), needle));
        let phone_ok = self
            .phone_number
            .as_deref()
            .is_none_or(|phone| submission.fields.phone_number() == Some(phone));
        let status_ok = self.status.is_none_or(|status| submission.status == status);
        let from_ok = self
            .created_from
            .is_none_or(|from| submission.created_at >= from);
        let to_ok = self.created_to.is_none_or(|to| submission.created_at <= to);

        name_ok && email_ok && address_ok && phone_ok && status_ok && from_ok && to_ok
    }
}

/// Case-insensitive substring test shared by in-process stores.
pub fn contains_ignore_case(haystack: &str, needle: &str) -> bool {
    haystack.to_lowercase().contains(&needle.to_lowercase())
}
