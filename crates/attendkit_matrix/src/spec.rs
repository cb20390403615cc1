//! Reshape options, records and top-level error types.

use std::cmp::Ordering;
use std::path::PathBuf;

use attendkit_io_xlsx::{EnumSheetCell, XlsxReadError, XlsxWriteError};
use chrono::{Datelike, NaiveDate};
use thiserror::Error;

use crate::conf::{
    C_FILE_IN_DEFAULT, C_FILE_OUT_DEFAULT, C_FLAG_NO, C_FLAG_YES, C_SHEET_IN_DEFAULT,
    C_SHEET_OUT_DEFAULT, N_ROWS_METADATA_DEFAULT, N_ROWS_PLACEHOLDER_HEADER_DEFAULT,
};

////////////////////////////////////////////////////////////////////////////////
// #region EnumsInit

/// Tie-break when one employee has several records for the same column.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum EnumDuplicatePolicy {
    /// Keep the flag of the first record in source row order.
    #[default]
    First,
    /// Any `Yes` among the duplicates wins.
    AnyPresent,
}

/// What a matrix column stands for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum EnumColumnKeyMode {
    /// Day of month (1-31); different months share a column.
    #[default]
    DayOfMonth,
    /// Full calendar date; one column per distinct date.
    CalendarDate,
}

/// Reading order for ambiguous numeric dates such as `03/04/2024`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum EnumDateOrder {
    /// `MM/DD/YYYY` first, `DD/MM/YYYY` as fallback.
    #[default]
    MonthFirst,
    /// `DD/MM/YYYY` first, `MM/DD/YYYY` as fallback.
    DayFirst,
}

/// Binary presence classification of one status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EnumPresenceFlag {
    /// Status denotes presence.
    Yes,
    /// Anything else, including missing status.
    No,
}

impl EnumPresenceFlag {
    /// Cell text written to the matrix.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Yes => C_FLAG_YES,
            Self::No => C_FLAG_NO,
        }
    }
}

/// Pivot column key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum EnumColumnKey {
    /// Day of month.
    Day(u32),
    /// Calendar date.
    Date(NaiveDate),
}

impl EnumColumnKey {
    /// Build the key of `date` under `rule`.
    pub fn from_date(date: NaiveDate, rule: EnumColumnKeyMode) -> Self {
        match rule {
            EnumColumnKeyMode::DayOfMonth => Self::Day(date.day()),
            EnumColumnKeyMode::CalendarDate => Self::Date(date),
        }
    }

    /// Output column label.
    pub fn label(&self) -> String {
        match self {
            Self::Day(n_day) => n_day.to_string(),
            Self::Date(date) => date.format("%Y-%m-%d").to_string(),
        }
    }
}

// #endregion
////////////////////////////////////////////////////////////////////////////////
// #region StructsInit

/// Where the authoritative header row sits in the source sheet.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SpecHeaderRecovery {
    /// Leading metadata rows to discard.
    pub n_rows_metadata: usize,
    /// Placeholder header rows after the metadata, replaced by the next row.
    pub n_rows_placeholder_header: usize,
    /// Do not count fully blank rows as metadata/header/data rows.
    pub if_skip_blank_rows: bool,
}

impl Default for SpecHeaderRecovery {
    fn default() -> Self {
        Self {
            n_rows_metadata: N_ROWS_METADATA_DEFAULT,
            n_rows_placeholder_header: N_ROWS_PLACEHOLDER_HEADER_DEFAULT,
            if_skip_blank_rows: true,
        }
    }
}

/// Normalization and pivot policies.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct SpecPivotOptions {
    /// Duplicate employee/column tie-break.
    pub rule_duplicates: EnumDuplicatePolicy,
    /// Column axis.
    pub rule_column_key: EnumColumnKeyMode,
    /// Ambiguous numeric date order.
    pub rule_date_order: EnumDateOrder,
}

/// Input options for [`crate::pipeline::run_reshape`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SpecReshapeOptions {
    /// Source workbook.
    pub path_file_in: PathBuf,
    /// Source worksheet name.
    pub sheet_in: String,
    /// Output workbook, overwritten if present.
    pub path_file_out: PathBuf,
    /// Output worksheet name.
    pub sheet_out: String,
    /// Header recovery layout.
    pub spec_header: SpecHeaderRecovery,
    /// Pivot policies.
    pub spec_pivot: SpecPivotOptions,
}

impl Default for SpecReshapeOptions {
    fn default() -> Self {
        Self {
            path_file_in: PathBuf::from(C_FILE_IN_DEFAULT),
            sheet_in: C_SHEET_IN_DEFAULT.to_string(),
            path_file_out: PathBuf::from(C_FILE_OUT_DEFAULT),
            sheet_out: C_SHEET_OUT_DEFAULT.to_string(),
            spec_header: SpecHeaderRecovery::default(),
            spec_pivot: SpecPivotOptions::default(),
        }
    }
}

/// Data rows under the recovered header.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct SpecRecoveredTable {
    /// Trimmed header names.
    pub columns: Vec<String>,
    /// Data rows, each `columns.len()` wide, with 1-based sheet row numbers.
    pub rows: Vec<(usize, Vec<EnumSheetCell>)>,
}

/// Positions of the required columns in [`SpecRecoveredTable::columns`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SpecColumnIndices {
    /// `E. Code` position.
    pub idx_employee_code: usize,
    /// `Name` position.
    pub idx_employee_name: usize,
    /// `Date` position.
    pub idx_date: usize,
    /// `Status` position.
    pub idx_status: usize,
}

/// One attendance observation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SpecAttendanceRecord {
    /// Trimmed employee code.
    pub employee_code: String,
    /// Trimmed employee name.
    pub employee_name: String,
    /// Parsed date; `None` when the cell could not be read as a date.
    pub date: Option<NaiveDate>,
    /// Raw status text; `None` for blank cells.
    pub status: Option<String>,
    /// 1-based sheet row the record came from.
    pub n_row_source: usize,
}

/// Matrix row key.
///
/// Ordered by employee code, numerically when both codes are numbers, then by
/// name. Text order breaks numeric ties so `"01"` and `"1"` stay distinct.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct SpecIdentityKey {
    /// Employee code.
    pub employee_code: String,
    /// Employee name.
    pub employee_name: String,
}

impl Ord for SpecIdentityKey {
    fn cmp(&self, other: &Self) -> Ordering {
        compare_codes(&self.employee_code, &other.employee_code)
            .then_with(|| self.employee_name.cmp(&other.employee_name))
    }
}

impl PartialOrd for SpecIdentityKey {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

/// Numeric codes sort before text codes so the order stays total on mixed input.
fn compare_codes(a: &str, b: &str) -> Ordering {
    let parse_finite = |c: &str| c.parse::<f64>().ok().filter(|n| n.is_finite());
    match (parse_finite(a), parse_finite(b)) {
        (Some(n_a), Some(n_b)) => n_a.total_cmp(&n_b).then_with(|| a.cmp(b)),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => a.cmp(b),
    }
}

// #endregion
////////////////////////////////////////////////////////////////////////////////
// #region Errors

/// Fatal reshape failures. Data-quality issues are never errors.
#[derive(Debug, Error)]
pub enum ReshapeError {
    /// Source workbook/sheet could not be loaded.
    #[error(transparent)]
    Source(#[from] XlsxReadError),
    /// The sheet ends before the authoritative header row.
    #[error(
        "Header row not found in sheet {sheet:?}: expected it after {n_rows_skipped} leading rows, \
         sheet has {n_rows_available}"
    )]
    HeaderRowMissing {
        /// Sheet name.
        sheet: String,
        /// Metadata + placeholder rows that precede the header.
        n_rows_skipped: usize,
        /// Non-blank rows the sheet actually has.
        n_rows_available: usize,
    },
    /// A required column is absent after header recovery.
    #[error("Required column {column:?} not found; header has: [{}]", .columns_found.join(", "))]
    MissingColumn {
        /// Missing column name.
        column: String,
        /// Header names that were found.
        columns_found: Vec<String>,
    },
    /// Matrix could not be turned into a data frame.
    #[error("Failed to build matrix frame: {0}")]
    Frame(String),
    /// Output workbook could not be written.
    #[error("Failed to write {}: {source}", .path.display())]
    Destination {
        /// Output path.
        path: PathBuf,
        /// Underlying writer error.
        source: XlsxWriteError,
    },
}

// #endregion
////////////////////////////////////////////////////////////////////////////////
