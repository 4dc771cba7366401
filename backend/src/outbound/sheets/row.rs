//! Spreadsheet row layout for mirrored submissions.

use serde::Serialize;

use crate::domain::Submission;

/// Column headers, in sheet order.
pub const SHEET_COLUMNS: [&str; 9] = [
    "ID",
    "Name",
    "Email",
    "Address",
    "Phone Number",
    "Comments",
    "Status",
    "Submitted Date",
    "IP Address",
];

const SUBMITTED_DATE_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// One submission flattened into spreadsheet cells.
///
/// Every cell is a string; absent optional values become empty cells.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SheetRow {
    #[serde(rename = "ID")]
    pub id: String,
    #[serde(rename = "Name")]
    pub name: String,
    #[serde(rename = "Email")]
    pub email: String,
    #[serde(rename = "Address")]
    pub address: String,
    #[serde(rename = "Phone Number")]
    pub phone_number: String,
    #[serde(rename = "Comments")]
    pub comments: String,
    #[serde(rename = "Status")]
    pub status: String,
    #[serde(rename = "Submitted Date")]
    pub submitted_date: String,
    #[serde(rename = "IP Address")]
    pub ip_address: String,
}

impl SheetRow {
    /// Cells in [`SHEET_COLUMNS`] order.
    pub fn cells(&self) -> [&str; 9] {
        [
            self.id.as_str(),
            self.name.as_str(),
            self.email.as_str(),
            self.address.as_str(),
            self.phone_number.as_str(),
            self.comments.as_str(),
            self.status.as_str(),
            self.submitted_date.as_str(),
            self.ip_address.as_str(),
        ]
    }
}

impl From<&Submission> for SheetRow {
    fn from(submission: &Submission) -> Self {
        let fields = &submission.fields;
        Self {
            id: submission.id.to_string(),
            name: fields.name().to_owned(),
            email: submission.email.as_ref().to_owned(),
            address: fields.address().to_owned(),
            phone_number: fields.phone_number().unwrap_or_default().to_owned(),
            comments: fields.comments().unwrap_or_default().to_owned(),
            status: submission.status.as_str().to_owned(),
            submitted_date: submission
                .created_at
                .format(SUBMITTED_DATE_FORMAT)
                .to_string(),
            ip_address: submission.submitted_by_ip.clone().unwrap_or_default(),
        }
    }
}

#[cfg(test)]
mod tests {
    //! Regression coverage for this module.
    use super::*;
    use chrono::{TimeZone, Utc};
    use rstest::{fixture, rstest};

    use crate::domain::{
        EmailAddress, NewSubmission, SubmissionFields, SubmissionId, SubmissionStatus,
    };

    #[fixture]
    fn submission() -> Submission {
        let created = Utc
            .with_ymd_and_hms(2025, 3, 4, 5, 6, 7)
            .single()
            .expect("valid timestamp");
        let new = NewSubmission {
            email: EmailAddress::new("ada@example.com").expect("valid email"),
            fields: SubmissionFields::new("Ada Lovelace", "1 Analytical Way", None, None)
                .expect("valid fields"),
            status: SubmissionStatus::Approved,
            submitted_by_ip: None,
        };
        Submission::from_new(SubmissionId::new(42), new, created, created)
    }

    #[rstest]
    fn flattens_submission_into_cells(submission: Submission) {
        let row = SheetRow::from(&submission);

        assert_eq!(
            row.cells(),
            [
                "42",
                "Ada Lovelace",
                "ada@example.com",
                "1 Analytical Way",
                "",
                "",
                "APPROVED",
                "2025-03-04 05:06:07",
                "",
            ]
        );
    }

    #[rstest]
    fn serialises_with_column_headers(mut submission: Submission) {
        submission.submitted_by_ip = Some("203.0.113.9".to_owned());
        let value = serde_json::to_value(SheetRow::from(&submission)).expect("row serialises");
        let object = value.as_object().expect("row is an object");

        let keys: Vec<&str> = object.keys().map(String::as_str).collect();
        for column in SHEET_COLUMNS {
            assert!(keys.contains(&column), "missing column {column}");
        }
        assert_eq!(value["IP Address"], "203.0.113.9");
    }
}
