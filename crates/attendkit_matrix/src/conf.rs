//! Column names, flag literals and default run configuration.

/// Employee identifier column.
pub const C_COL_EMPLOYEE_CODE: &str = "E. Code";
/// Employee display name column.
pub const C_COL_EMPLOYEE_NAME: &str = "Name";
/// Attendance date column.
pub const C_COL_DATE: &str = "Date";
/// Attendance status column.
pub const C_COL_STATUS: &str = "Status";

/// Normalized status literal that marks presence.
pub const C_STATUS_PRESENT: &str = "present";
/// Normalized status literal that is expected and not counted as unusual.
pub const C_STATUS_ABSENT: &str = "absent";
/// Cell text for a present employee/day.
pub const C_FLAG_YES: &str = "Yes";
/// Cell text for an absent or missing employee/day.
pub const C_FLAG_NO: &str = "No";

/// Default source workbook.
pub const C_FILE_IN_DEFAULT: &str = "Daily Attendance Report (2).xls";
/// Default source worksheet.
pub const C_SHEET_IN_DEFAULT: &str = "DailyAttendance_DetailedReport";
/// Default output workbook.
pub const C_FILE_OUT_DEFAULT: &str = "Attendance_Matrix.xlsx";
/// Default output worksheet.
pub const C_SHEET_OUT_DEFAULT: &str = "Sheet1";

/// Metadata rows above the header block in the daily attendance export.
pub const N_ROWS_METADATA_DEFAULT: usize = 7;
/// Placeholder header rows between the metadata block and the real header.
pub const N_ROWS_PLACEHOLDER_HEADER_DEFAULT: usize = 1;
