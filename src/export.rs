//! Spreadsheet export of community submissions.

use rust_xlsxwriter::{Format, Workbook};
use time::Date;
use tracing::info;

use crate::db::DbPool;
use crate::error::{ClubError, ClubResult};
use crate::models::community::CommunitySubmission;
use crate::models::parse_date;
use crate::util::{format_en_in, today};

pub const XLSX_CONTENT_TYPE: &str =
    "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet";
pub const SHEET_NAME: &str = "Community Submissions";

/// Header and width (in characters) of each column, in order.
pub const COLUMNS: [(&str, f64); 8] = [
    ("ID", 5.0),
    ("Full Name", 20.0),
    ("Email", 25.0),
    ("Roll Number", 15.0),
    ("Year", 10.0),
    ("Branch", 15.0),
    ("Status", 12.0),
    ("Submitted Date", 20.0),
];

/// An inclusive range of creation dates.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DateRange {
    pub from: Date,
    pub to: Date,
}

impl DateRange {
    pub fn new(from: Date, to: Date) -> ClubResult<Self> {
        if from > to {
            return Err(ClubError::BadRequest(
                "fromDate must not be after toDate".to_owned(),
            ));
        }

        Ok(Self { from, to })
    }

    /// Builds a range from the raw `fromDate` and `toDate` query values.
    /// Blank values count as missing, and unless both are given there is
    /// no range at all.
    pub fn from_query(from: Option<&str>, to: Option<&str>) -> ClubResult<Option<Self>> {
        fn present(value: Option<&str>) -> Option<&str> {
            value.map(str::trim).filter(|value| !value.is_empty())
        }

        match (present(from), present(to)) {
            (Some(from), Some(to)) => {
                let range = Self::new(parse_date("fromDate", from)?, parse_date("toDate", to)?)?;
                Ok(Some(range))
            }
            _ => Ok(None),
        }
    }
}

/// A finished export, ready to be sent as a download.
#[derive(Debug)]
pub struct Spreadsheet {
    pub file_name: String,
    pub content: Vec<u8>,
}

pub async fn export_community_submissions(
    range: Option<DateRange>,
    pool: &DbPool,
) -> ClubResult<Spreadsheet> {
    let submissions = match range {
        Some(range) => CommunitySubmission::created_between(range.from, range.to, pool).await?,
        None => CommunitySubmission::all(pool).await?,
    };
    if submissions.is_empty() {
        return Err(ClubError::NoData);
    }

    let spreadsheet = Spreadsheet {
        file_name: file_name(range.as_ref(), today()),
        content: render(&submissions)?,
    };
    info!(
        rows = submissions.len(),
        file_name = %spreadsheet.file_name,
        "exported community submissions"
    );

    Ok(spreadsheet)
}

pub fn file_name(range: Option<&DateRange>, today: Date) -> String {
    match range {
        Some(range) => format!(
            "community_submissions_{}_to_{}.xlsx",
            range.from, range.to
        ),
        None => format!("community_submissions_all_{}.xlsx", today),
    }
}

/// The cells of one submission's row, in [`COLUMNS`] order (minus the ID).
pub fn row_text(submission: &CommunitySubmission) -> [String; 7] {
    [
        submission.fullname.clone(),
        submission.email.clone(),
        submission.rollno.clone(),
        submission.year.clone(),
        submission.branch.clone(),
        submission.status.to_string(),
        format_en_in(submission.created_at),
    ]
}

pub fn render(submissions: &[CommunitySubmission]) -> ClubResult<Vec<u8>> {
    let mut workbook = Workbook::new();
    let header = Format::new().set_bold();

    let worksheet = workbook.add_worksheet();
    worksheet.set_name(SHEET_NAME)?;

    for (col, (title, width)) in COLUMNS.iter().enumerate() {
        let col = col as u16;
        worksheet.set_column_width(col, *width)?;
        worksheet.write_string_with_format(0, col, *title, &header)?;
    }

    for (index, submission) in submissions.iter().enumerate() {
        let row = index as u32 + 1;
        worksheet.write_number(row, 0, submission.id as f64)?;
        for (offset, text) in row_text(submission).iter().enumerate() {
            worksheet.write_string(row, offset as u16 + 1, text)?;
        }
    }

    workbook.save_to_buffer().map_err(Into::into)
}

#[cfg(test)]
mod tests {
    use time::macros::{date, datetime};

    use super::*;
    use crate::models::community::CommunityStatus;

    fn submission(id: i64) -> CommunitySubmission {
        CommunitySubmission {
            id,
            fullname: "Ada Lovelace".to_owned(),
            email: "ada@example.com".to_owned(),
            rollno: "21CS042".to_owned(),
            year: "2nd".to_owned(),
            branch: "CSE".to_owned(),
            status: CommunityStatus::Contacted,
            created_at: datetime!(2025-01-04 21:04:09),
        }
    }

    #[test]
    fn inverted_ranges_are_rejected() {
        assert!(DateRange::new(date!(2025 - 02 - 01), date!(2025 - 01 - 01)).is_err());
        assert!(DateRange::new(date!(2025 - 01 - 01), date!(2025 - 01 - 01)).is_ok());

        let inverted = DateRange::from_query(Some("2025-02-01"), Some("2025-01-01"));
        assert!(matches!(inverted, Err(ClubError::BadRequest(_))));
    }

    #[test]
    fn a_range_needs_both_ends() {
        assert_eq!(DateRange::from_query(None, None).unwrap(), None);
        assert_eq!(DateRange::from_query(Some("2025-01-01"), None).unwrap(), None);
        assert_eq!(DateRange::from_query(Some("2025-01-01"), Some("  ")).unwrap(), None);
        assert_eq!(
            DateRange::from_query(Some("2025-01-01"), Some("2025-01-31")).unwrap(),
            Some(DateRange {
                from: date!(2025 - 01 - 01),
                to: date!(2025 - 01 - 31),
            })
        );
        assert!(DateRange::from_query(Some("yesterday"), Some("2025-01-31")).is_err());
    }

    #[test]
    fn file_names_reflect_the_range() {
        let range = DateRange::new(date!(2025 - 01 - 01), date!(2025 - 01 - 31)).unwrap();
        assert_eq!(
            file_name(Some(&range), date!(2025 - 10 - 18)),
            "community_submissions_2025-01-01_to_2025-01-31.xlsx"
        );
        assert_eq!(
            file_name(None, date!(2025 - 10 - 18)),
            "community_submissions_all_2025-10-18.xlsx"
        );
    }

    #[test]
    fn rows_follow_the_column_order() {
        assert_eq!(
            row_text(&submission(7)),
            [
                "Ada Lovelace".to_owned(),
                "ada@example.com".to_owned(),
                "21CS042".to_owned(),
                "2nd".to_owned(),
                "CSE".to_owned(),
                "contacted".to_owned(),
                "5/1/2025, 2:34:09 am".to_owned(),
            ]
        );
        assert_eq!(COLUMNS.len(), row_text(&submission(7)).len() + 1);
    }

    #[test]
    fn renders_an_xlsx_archive() {
        let content = render(&[submission(1), submission(2)]).unwrap();
        assert!(content.starts_with(b"PK"));
    }
}
