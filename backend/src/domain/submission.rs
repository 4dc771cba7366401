//! Form submission data model.
//!
//! A [`Submission`] is the only persisted entity. Inbound adapters build a
//! [`SubmissionDraft`] (create) or [`SubmissionFields`] (edit) from raw
//! strings; both constructors enforce the field limits so the service and
//! the stores only ever see valid values.

use std::fmt;
use std::str::FromStr;
use std::sync::OnceLock;

use chrono::{DateTime, Utc};
use regex::Regex;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Maximum length of a submitter name, in characters.
pub const NAME_MAX: usize = 100;
/// Maximum length of an email address, in characters.
pub const EMAIL_MAX: usize = 255;
/// Maximum length of a postal address, in characters.
pub const ADDRESS_MAX: usize = 500;
/// Maximum length of a phone number, in characters.
pub const PHONE_NUMBER_MAX: usize = 20;
/// Maximum length of free-form comments, in characters.
pub const COMMENTS_MAX: usize = 1000;

/// Validation failures raised while building submission values.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SubmissionValidationError {
    /// Name was missing or blank.
    #[error("name must not be empty")]
    EmptyName,
    /// Name exceeded [`NAME_MAX`].
    #[error("name must be at most {max} characters")]
    NameTooLong { max: usize },
    /// Email was missing or blank.
    #[error("email must not be empty")]
    EmptyEmail,
    /// Email did not look like `local@domain.tld`.
    #[error("email must be a valid email address")]
    InvalidEmail,
    /// Email exceeded [`EMAIL_MAX`].
    #[error("email must be at most {max} characters")]
    EmailTooLong { max: usize },
    /// Address was missing or blank.
    #[error("address must not be empty")]
    EmptyAddress,
    /// Address exceeded [`ADDRESS_MAX`].
    #[error("address must be at most {max} characters")]
    AddressTooLong { max: usize },
    /// Phone number exceeded [`PHONE_NUMBER_MAX`].
    #[error("phone number must be at most {max} characters")]
    PhoneNumberTooLong { max: usize },
    /// Comments exceeded [`COMMENTS_MAX`].
    #[error("comments must be at most {max} characters")]
    CommentsTooLong { max: usize },
}

impl SubmissionValidationError {
    /// Name of the offending field as clients see it.
    pub fn field(&self) -> &'static str {
        match self {
            Self::EmptyName | Self::NameTooLong { .. } => "name",
            Self::EmptyEmail | Self::InvalidEmail | Self::EmailTooLong { .. } => "email",
            Self::EmptyAddress | Self::AddressTooLong { .. } => "address",
            Self::PhoneNumberTooLong { .. } => "phoneNumber",
            Self::CommentsTooLong { .. } => "comments",
        }
    }

    /// Stable machine-readable reason.
    pub fn code(&self) -> &'static str {
        match self {
            Self::EmptyName | Self::EmptyEmail | Self::EmptyAddress => "required",
            Self::InvalidEmail => "invalid_format",
            Self::NameTooLong { .. }
            | Self::EmailTooLong { .. }
            | Self::AddressTooLong { .. }
            | Self::PhoneNumberTooLong { .. }
            | Self::CommentsTooLong { .. } => "too_long",
        }
    }

    /// Upper length bound that was violated, if any.
    pub fn max(&self) -> Option<usize> {
        match self {
            Self::NameTooLong { max }
            | Self::EmailTooLong { max }
            | Self::AddressTooLong { max }
            | Self::PhoneNumberTooLong { max }
            | Self::CommentsTooLong { max } => Some(*max),
            Self::EmptyName | Self::EmptyEmail | Self::EmptyAddress | Self::InvalidEmail => None,
        }
    }
}

/// Store-assigned submission identifier.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, ToSchema,
)]
#[serde(transparent)]
pub struct SubmissionId(i64);

impl SubmissionId {
    /// Wrap a raw identifier.
    pub const fn new(id: i64) -> Self {
        Self(id)
    }

    /// Raw identifier value.
    pub const fn as_i64(self) -> i64 {
        self.0
    }
}

impl fmt::Display for SubmissionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Review status of a submission.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum SubmissionStatus {
    /// Awaiting review.
    #[default]
    Pending,
    /// Accepted by a reviewer.
    Approved,
    /// Declined by a reviewer.
    Rejected,
    /// Being worked on.
    Processing,
}

impl SubmissionStatus {
    /// Every status, in declaration order.
    pub const ALL: [Self; 4] = [
        Self::Pending,
        Self::Approved,
        Self::Rejected,
        Self::Processing,
    ];

    /// Canonical upper-case spelling used on the wire and in storage.
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Pending => "PENDING",
            Self::Approved => "APPROVED",
            Self::Rejected => "REJECTED",
            Self::Processing => "PROCESSING",
        }
    }
}

impl fmt::Display for SubmissionStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error returned when a status string is not one of the known values.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown submission status: {value}")]
pub struct ParseSubmissionStatusError {
    /// Rejected input.
    pub value: String,
}

impl FromStr for SubmissionStatus {
    type Err = ParseSubmissionStatusError;

    /// Parses case-insensitively, so `approved` and `APPROVED` are equal.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        Self::ALL
            .into_iter()
            .find(|status| status.as_str().eq_ignore_ascii_case(trimmed))
            .ok_or_else(|| ParseSubmissionStatusError {
                value: s.to_owned(),
            })
    }
}

static EMAIL_RE: OnceLock<Regex> = OnceLock::new();

fn email_regex() -> &'static Regex {
    EMAIL_RE.get_or_init(|| {
        // One `@`, no whitespace, and a dot somewhere in the domain part.
        let pattern = r"^[^\s@]+@[^\s@]+\.[^\s@]+$";
        Regex::new(pattern).unwrap_or_else(|error| panic!("email regex failed to compile: {error}"))
    })
}

/// Syntactically valid email address, trimmed of surrounding whitespace.
///
/// Comparison is case-sensitive: `A@x.io` and `a@x.io` are distinct.
///
/// # Examples
/// ```
/// use form_intake::domain::EmailAddress;
///
/// let email = EmailAddress::new("  ada@example.com ").expect("valid email");
/// assert_eq!(email.as_ref(), "ada@example.com");
/// assert!(EmailAddress::new("not-an-email").is_err());
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct EmailAddress(String);

impl EmailAddress {
    /// Validate and construct an address.
    pub fn new(email: impl AsRef<str>) -> Result<Self, SubmissionValidationError> {
        let email = email.as_ref().trim();
        if email.is_empty() {
            return Err(SubmissionValidationError::EmptyEmail);
        }
        if email.chars().count() > EMAIL_MAX {
            return Err(SubmissionValidationError::EmailTooLong { max: EMAIL_MAX });
        }
        if !email_regex().is_match(email) {
            return Err(SubmissionValidationError::InvalidEmail);
        }
        Ok(Self(email.to_owned()))
    }
}

impl AsRef<str> for EmailAddress {
    fn as_ref(&self) -> &str {
        self.0.as_str()
    }
}

impl fmt::Display for EmailAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<EmailAddress> for String {
    fn from(value: EmailAddress) -> Self {
        value.0
    }
}

impl TryFrom<String> for EmailAddress {
    type Error = SubmissionValidationError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

fn required(
    value: &str,
    max: usize,
    empty: SubmissionValidationError,
    too_long: SubmissionValidationError,
) -> Result<String, SubmissionValidationError> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(empty);
    }
    if trimmed.chars().count() > max {
        return Err(too_long);
    }
    Ok(trimmed.to_owned())
}

/// Blank optional strings collapse to `None`.
fn optional(
    value: Option<&str>,
    max: usize,
    too_long: SubmissionValidationError,
) -> Result<Option<String>, SubmissionValidationError> {
    let Some(trimmed) = value.map(str::trim).filter(|v| !v.is_empty()) else {
        return Ok(None);
    };
    if trimmed.chars().count() > max {
        return Err(too_long);
    }
    Ok(Some(trimmed.to_owned()))
}

/// The editable content of a submission.
///
/// Email and status are deliberately absent: edits never touch them.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubmissionFields {
    name: String,
    address: String,
    phone_number: Option<String>,
    comments: Option<String>,
}

impl SubmissionFields {
    /// Validate and construct the editable fields.
    ///
    /// # Examples
    /// ```
    /// use form_intake::domain::SubmissionFields;
    ///
    /// let fields = SubmissionFields::new("Ada", "1 Loop Rd", Some(""), None)
    ///     .expect("valid fields");
    /// assert_eq!(fields.phone_number(), None);
    /// ```
    pub fn new(
        name: &str,
        address: &str,
        phone_number: Option<&str>,
        comments: Option<&str>,
    ) -> Result<Self, SubmissionValidationError> {
        Ok(Self {
            name: required(
                name,
                NAME_MAX,
                SubmissionValidationError::EmptyName,
                SubmissionValidationError::NameTooLong { max: NAME_MAX },
            )?,
            address: required(
                address,
                ADDRESS_MAX,
                SubmissionValidationError::EmptyAddress,
                SubmissionValidationError::AddressTooLong { max: ADDRESS_MAX },
            )?,
            phone_number: optional(
                phone_number,
                PHONE_NUMBER_MAX,
                SubmissionValidationError::PhoneNumberTooLong {
                    max: PHONE_NUMBER_MAX,
                },
            )?,
            comments: optional(
                comments,
                COMMENTS_MAX,
                SubmissionValidationError::CommentsTooLong { max: COMMENTS_MAX },
            )?,
        })
    }

    /// Submitter name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Postal address.
    pub fn address(&self) -> &str {
        &self.address
    }

    /// Phone number, if supplied.
    pub fn phone_number(&self) -> Option<&str> {
        self.phone_number.as_deref()
    }

    /// Free-form comments, if supplied.
    pub fn comments(&self) -> Option<&str> {
        self.comments.as_deref()
    }
}

/// Validated create request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubmissionDraft {
    /// Contact address; must be unique across submissions.
    pub email: EmailAddress,
    /// Editable content.
    pub fields: SubmissionFields,
    /// Initial status; `None` means [`SubmissionStatus::Pending`].
    pub status: Option<SubmissionStatus>,
    /// Network origin of the caller, advisory only.
    pub submitted_by_ip: Option<String>,
}

/// Record handed to the store for insertion.
///
/// The store assigns the identifier and both timestamps.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewSubmission {
    /// Contact address.
    pub email: EmailAddress,
    /// Editable content.
    pub fields: SubmissionFields,
    /// Resolved initial status.
    pub status: SubmissionStatus,
    /// Network origin of the caller.
    pub submitted_by_ip: Option<String>,
}

impl From<SubmissionDraft> for NewSubmission {
    fn from(draft: SubmissionDraft) -> Self {
        Self {
            email: draft.email,
            fields: draft.fields,
            status: draft.status.unwrap_or_default(),
            submitted_by_ip: draft.submitted_by_ip,
        }
    }
}

/// A persisted form submission.
///
/// ## Invariants
/// - `id` and `created_at` never change after insertion.
/// - `updated_at >= created_at`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Submission {
    /// Store-assigned identifier.
    pub id: SubmissionId,
    /// Contact address.
    pub email: EmailAddress,
    /// Editable content.
    pub fields: SubmissionFields,
    /// Current review status.
    pub status: SubmissionStatus,
    /// Insertion time.
    pub created_at: DateTime<Utc>,
    /// Time of the last mutation.
    pub updated_at: DateTime<Utc>,
    /// Network origin recorded at creation.
    pub submitted_by_ip: Option<String>,
}

impl Submission {
    /// Build a persisted record from its stored parts.
    pub fn from_new(
        id: SubmissionId,
        new: NewSubmission,
        created_at: DateTime<Utc>,
        updated_at: DateTime<Utc>,
    ) -> Self {
        Self {
            id,
            email: new.email,
            fields: new.fields,
            status: new.status,
            created_at,
            updated_at,
            submitted_by_ip: new.submitted_by_ip,
        }
    }
}
