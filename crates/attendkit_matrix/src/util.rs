//! Cell normalization helpers: date parsing and presence classification.

use attendkit_io_xlsx::{EnumSheetCell, convert_excel_serial_to_datetime};
use chrono::{NaiveDate, NaiveDateTime, NaiveTime};

use crate::conf::{C_STATUS_ABSENT, C_STATUS_PRESENT};
use crate::spec::{EnumDateOrder, EnumPresenceFlag};

const TUP_FMTS_DATETIME: [&str; 6] = [
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%dT%H:%M:%S",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%d %H:%M",
    "%Y/%m/%d %H:%M:%S",
];

// Two-digit year forms go first: `%Y` would read "24" as year 24.
const TUP_FMTS_DATE_NAMED: [&str; 8] = [
    "%d-%b-%y",
    "%d-%b-%Y",
    "%d %b %Y",
    "%d-%B-%Y",
    "%d %B %Y",
    "%b %d, %Y",
    "%B %d, %Y",
    "%b %d %Y",
];

const TUP_FMTS_TIME: [&str; 5] = ["%H:%M:%S", "%H:%M", "%H:%M:%S%.f", "%I:%M:%S %p", "%I:%M %p"];

////////////////////////////////////////////////////////////////////////////////
// #region PresenceClassification

/// Trim and lower-case a status for comparison.
pub fn normalize_status(status: &str) -> String {
    status.trim().to_lowercase()
}

/// `Yes` only for a status equal to `present` after trim + lower-case.
pub fn classify_presence(status: Option<&str>) -> EnumPresenceFlag {
    match status {
        Some(c_status) if normalize_status(c_status) == C_STATUS_PRESENT => EnumPresenceFlag::Yes,
        _ => EnumPresenceFlag::No,
    }
}

/// Non-empty status that is neither `present` nor `absent`.
pub fn is_status_other(status: Option<&str>) -> bool {
    let Some(c_status) = status else {
        return false;
    };
    let c_norm = normalize_status(c_status);
    !c_norm.is_empty() && c_norm != C_STATUS_PRESENT && c_norm != C_STATUS_ABSENT
}

// #endregion
////////////////////////////////////////////////////////////////////////////////
// #region DateParsing

/// Parse a source cell into a calendar date; `None` when it is not a date.
///
/// Native spreadsheet datetimes keep their date part, numbers are Excel serials,
/// text goes through [`parse_date_text`].
pub fn parse_date_cell(cell: &EnumSheetCell, rule_date_order: EnumDateOrder) -> Option<NaiveDate> {
    match cell {
        EnumSheetCell::DateTime(dt) => Some(dt.date()),
        EnumSheetCell::Number(n) => convert_excel_serial_to_datetime(*n).map(|dt| dt.date()),
        EnumSheetCell::Text(c_text) => parse_date_text(c_text, rule_date_order),
        EnumSheetCell::Empty | EnumSheetCell::Bool(_) => None,
    }
}

/// Parse date text in the forms attendance exports use.
pub fn parse_date_text(text: &str, rule_date_order: EnumDateOrder) -> Option<NaiveDate> {
    let c_text = text.trim();
    if c_text.is_empty() {
        return None;
    }

    for c_fmt in TUP_FMTS_DATETIME {
        if let Ok(dt) = NaiveDateTime::parse_from_str(c_text, c_fmt) {
            return Some(dt.date());
        }
    }

    if let Some(date) = parse_date_only(c_text, rule_date_order) {
        return Some(date);
    }

    // Trailing time-of-day after whitespace: "06/01/2024 08:30", "01-Jun-2024 9:05 AM".
    let (c_date_part, c_time_part) = c_text.split_once(char::is_whitespace)?;
    let c_time_part = c_time_part.trim();
    let if_time_valid = TUP_FMTS_TIME
        .iter()
        .any(|c_fmt| NaiveTime::parse_from_str(c_time_part, c_fmt).is_ok());
    if !if_time_valid {
        return None;
    }
    parse_date_only(c_date_part, rule_date_order)
}

fn parse_date_only(c_text: &str, rule_date_order: EnumDateOrder) -> Option<NaiveDate> {
    for c_fmt in TUP_FMTS_DATE_NAMED {
        if let Ok(date) = NaiveDate::parse_from_str(c_text, c_fmt) {
            return Some(date);
        }
    }

    if c_text.len() == 8 && c_text.bytes().all(|b| b.is_ascii_digit()) {
        return NaiveDate::parse_from_str(c_text, "%Y%m%d").ok();
    }

    parse_numeric_date(c_text, rule_date_order)
}

/// `Y-M-D`, `a/b/Y` or `a.b.y` with one separator kind used twice.
fn parse_numeric_date(c_text: &str, rule_date_order: EnumDateOrder) -> Option<NaiveDate> {
    let chr_sep = c_text.chars().find(|chr| matches!(chr, '-' | '/' | '.'))?;
    let l_parts: Vec<&str> = c_text.split(chr_sep).collect();
    if l_parts.len() != 3
        || l_parts
            .iter()
            .any(|c_part| c_part.is_empty() || !c_part.bytes().all(|b| b.is_ascii_digit()))
    {
        return None;
    }

    let l_nums: Vec<i64> = l_parts
        .iter()
        .map(|c_part| c_part.parse::<i64>().ok())
        .collect::<Option<Vec<_>>>()?;

    if l_parts[0].len() == 4 {
        return build_date(l_nums[0], l_nums[1], l_nums[2]);
    }
    if l_parts[2].len() != 4 && l_parts[2].len() != 2 {
        return None;
    }

    let n_year = expand_two_digit_year(l_nums[2], l_parts[2].len());
    let (n_month_first, n_day_first) = match rule_date_order {
        EnumDateOrder::MonthFirst => (l_nums[0], l_nums[1]),
        EnumDateOrder::DayFirst => (l_nums[1], l_nums[0]),
    };
    build_date(n_year, n_month_first, n_day_first)
        .or_else(|| build_date(n_year, n_day_first, n_month_first))
}

fn expand_two_digit_year(n_year: i64, n_len_digits: usize) -> i64 {
    if n_len_digits != 2 {
        return n_year;
    }
    if n_year < 70 { 2000 + n_year } else { 1900 + n_year }
}

fn build_date(n_year: i64, n_month: i64, n_day: i64) -> Option<NaiveDate> {
    NaiveDate::from_ymd_opt(
        i32::try_from(n_year).ok()?,
        u32::try_from(n_month).ok()?,
        u32::try_from(n_day).ok()?,
    )
}

// #endregion
////////////////////////////////////////////////////////////////////////////////
