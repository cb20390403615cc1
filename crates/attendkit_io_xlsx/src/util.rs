//! Stateless helper utilities shared by the reader and writer kernels.

use std::collections::BTreeMap;

use chrono::{Duration, NaiveDate, NaiveDateTime};

use crate::conf::{
    N_LEN_EXCEL_SHEET_NAME_MAX, N_NCOLS_EXCEL_MAX, N_NROWS_EXCEL_MAX, TUP_EXCEL_ILLEGAL,
};
use crate::spec::{EnumSheetCell, XlsxWriteError};

/// Largest serial Excel accepts (`9999-12-31`).
const N_EXCEL_SERIAL_MAX: f64 = 2_958_465.0;
const N_SECONDS_PER_DAY: f64 = 86_400.0;

////////////////////////////////////////////////////////////////////////////////
// #region CellValueConversion

/// Render a source cell as text.
///
/// Integral numbers lose their `.0`, so a code stored as `1001.0` reads `"1001"`.
pub fn derive_text_from_sheet_cell(cell: &EnumSheetCell) -> String {
    match cell {
        EnumSheetCell::Empty => String::new(),
        EnumSheetCell::Text(val) => val.clone(),
        EnumSheetCell::Number(val) => {
            if val.is_finite() && val.fract() == 0.0 && val.abs() < 1e15 {
                format!("{}", *val as i64)
            } else {
                val.to_string()
            }
        }
        EnumSheetCell::Bool(val) => val.to_string(),
        EnumSheetCell::DateTime(val) => {
            if val.time() == chrono::NaiveTime::MIN {
                val.date().format("%Y-%m-%d").to_string()
            } else {
                val.format("%Y-%m-%d %H:%M:%S").to_string()
            }
        }
    }
}

/// Convert an Excel 1900-system serial number into a timestamp.
///
/// Serial 60 is Excel's phantom `1900-02-29`; it maps onto `1900-02-28`.
pub fn convert_excel_serial_to_datetime(serial: f64) -> Option<NaiveDateTime> {
    if !serial.is_finite() || !(1.0..=N_EXCEL_SERIAL_MAX + 1.0).contains(&serial) {
        return None;
    }

    let n_days = serial.trunc() as i64;
    let date_epoch = if n_days >= 61 {
        NaiveDate::from_ymd_opt(1899, 12, 30)?
    } else if n_days == 60 {
        return NaiveDate::from_ymd_opt(1900, 2, 28)?.and_hms_opt(0, 0, 0);
    } else {
        NaiveDate::from_ymd_opt(1899, 12, 31)?
    };

    let n_seconds = (serial.fract() * N_SECONDS_PER_DAY).round() as i64;
    let dt_midnight = date_epoch
        .checked_add_signed(Duration::days(n_days))?
        .and_hms_opt(0, 0, 0)?;
    dt_midnight.checked_add_signed(Duration::seconds(n_seconds))
}

/// Estimate displayed width units of a text value (wide chars count ~1.6).
pub fn estimate_unicode_string_width(s: &str) -> usize {
    let n_ascii = s.chars().filter(|chr| chr.is_ascii()).count();
    let n_non_ascii = s.chars().count().saturating_sub(n_ascii);
    n_ascii + (n_non_ascii as f64 * 1.6).round() as usize
}

// #endregion
////////////////////////////////////////////////////////////////////////////////
// #region DataFrameLikeUtils

/// Reject repeated column names, listing each offender with its positions.
pub fn validate_unique_columns(columns: &[String]) -> Result<(), XlsxWriteError> {
    let mut dict_pos: BTreeMap<&str, Vec<usize>> = BTreeMap::new();
    for (n_idx, c_name) in columns.iter().enumerate() {
        dict_pos.entry(c_name.as_str()).or_default().push(n_idx);
    }

    let l_duplicates: Vec<String> = dict_pos
        .into_iter()
        .filter(|(_, l_pos)| l_pos.len() > 1)
        .map(|(c_name, l_pos)| format!("{c_name:?} x{} at indices {l_pos:?}", l_pos.len()))
        .collect();
    if l_duplicates.is_empty() {
        Ok(())
    } else {
        Err(XlsxWriteError::DuplicateColumns(l_duplicates.join("; ")))
    }
}

// #endregion
////////////////////////////////////////////////////////////////////////////////
// #region SheetNormalization

/// Replace invalid chars and trim to valid Excel sheet name.
pub fn sanitize_sheet_name(name: &str, replace_to: &str) -> String {
    let mut c_name = name.to_string();
    for c_illegal in TUP_EXCEL_ILLEGAL {
        c_name = c_name.replace(c_illegal, replace_to);
    }
    c_name = c_name.trim().to_string();
    if c_name.is_empty() {
        c_name = "Sheet".to_string();
    }

    c_name.chars().take(N_LEN_EXCEL_SHEET_NAME_MAX).collect()
}

/// Check that a frame plus its header rows fits on one worksheet.
pub fn validate_sheet_extent(
    n_rows_body: usize,
    n_cols: usize,
    n_rows_header: usize,
) -> Result<(), XlsxWriteError> {
    let n_rows = n_rows_body.saturating_add(n_rows_header);
    if n_rows > N_NROWS_EXCEL_MAX || n_cols > N_NCOLS_EXCEL_MAX {
        return Err(XlsxWriteError::SheetTooLarge {
            n_rows,
            n_cols,
            n_rows_max: N_NROWS_EXCEL_MAX,
            n_cols_max: N_NCOLS_EXCEL_MAX,
        });
    }
    Ok(())
}

// #endregion
////////////////////////////////////////////////////////////////////////////////
