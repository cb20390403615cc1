//! Header recovery and record extraction from a raw sheet grid.

use attendkit_io_xlsx::{EnumSheetCell, SpecSheetGrid, derive_text_from_sheet_cell};
use log::{debug, warn};

use crate::conf::{C_COL_DATE, C_COL_EMPLOYEE_CODE, C_COL_EMPLOYEE_NAME, C_COL_STATUS};
use crate::report::ReportReshapeBuilder;
use crate::spec::{
    ReshapeError, SpecAttendanceRecord, SpecColumnIndices, SpecHeaderRecovery, SpecPivotOptions,
    SpecRecoveredTable,
};
use crate::util::{is_status_other, parse_date_cell};

static CELL_EMPTY: EnumSheetCell = EnumSheetCell::Empty;

/// Only cells without any content count; whitespace text is content.
fn is_blank_row(row: &[EnumSheetCell]) -> bool {
    row.iter().all(|cell| matches!(cell, EnumSheetCell::Empty))
}

/// Locate the authoritative header row and return the rows beneath it.
///
/// `spec_header.n_rows_metadata` rows are discarded, then
/// `spec_header.n_rows_placeholder_header` placeholder header rows; the next row
/// supplies the column names (stringified, trimmed). Blank rows are not counted
/// when `if_skip_blank_rows` is set.
pub fn recover_header(
    grid: &SpecSheetGrid,
    spec_header: &SpecHeaderRecovery,
) -> Result<SpecRecoveredTable, ReshapeError> {
    let mut l_rows_kept = grid
        .rows
        .iter()
        .enumerate()
        .map(|(n_idx, row)| (n_idx + 1, row))
        .filter(|(_, row)| !spec_header.if_skip_blank_rows || !is_blank_row(row));

    // Saturating: an oversized offset runs past the sheet and reports the missing header.
    let n_rows_skipped = spec_header
        .n_rows_metadata
        .saturating_add(spec_header.n_rows_placeholder_header);
    let Some((n_row_header, row_header)) = l_rows_kept.nth(n_rows_skipped) else {
        let n_rows_available = grid.rows.iter().filter(|row| !is_blank_row(row)).count();
        return Err(ReshapeError::HeaderRowMissing {
            sheet: grid.sheet_name.clone(),
            n_rows_skipped,
            n_rows_available,
        });
    };

    let columns: Vec<String> = row_header
        .iter()
        .map(|cell| derive_text_from_sheet_cell(cell).trim().to_string())
        .collect();
    debug!("Recovered header at sheet row {n_row_header}: {columns:?}");

    let rows = l_rows_kept
        .map(|(n_row, row)| (n_row, row.clone()))
        .collect::<Vec<_>>();

    Ok(SpecRecoveredTable { columns, rows })
}

/// Resolve the required columns; the first occurrence wins on duplicates.
pub fn resolve_required_columns(columns: &[String]) -> Result<SpecColumnIndices, ReshapeError> {
    let find_column = |c_name: &str| -> Result<usize, ReshapeError> {
        let mut l_positions = columns
            .iter()
            .enumerate()
            .filter(|(_, c_col)| c_col.as_str() == c_name)
            .map(|(n_idx, _)| n_idx);
        let n_idx = l_positions.next().ok_or_else(|| ReshapeError::MissingColumn {
            column: c_name.to_string(),
            columns_found: columns.iter().filter(|c| !c.is_empty()).cloned().collect(),
        })?;
        if l_positions.next().is_some() {
            warn!("Column {c_name:?} appears more than once in the header; using position {n_idx}");
        }
        Ok(n_idx)
    };

    Ok(SpecColumnIndices {
        idx_employee_code: find_column(C_COL_EMPLOYEE_CODE)?,
        idx_employee_name: find_column(C_COL_EMPLOYEE_NAME)?,
        idx_date: find_column(C_COL_DATE)?,
        idx_status: find_column(C_COL_STATUS)?,
    })
}

/// Turn data rows into attendance records, in source row order.
///
/// Rows with a blank employee code or name cannot be keyed and are dropped.
/// Dates that do not parse are kept as `None` for the pivot to exclude.
pub fn extract_attendance_records(
    table: &SpecRecoveredTable,
    indices: &SpecColumnIndices,
    spec_pivot: &SpecPivotOptions,
    builder: &mut ReportReshapeBuilder,
) -> Vec<SpecAttendanceRecord> {
    let mut l_records = Vec::with_capacity(table.rows.len());

    for (n_row, row) in &table.rows {
        builder.add_row_read();
        let cell_at = |n_idx: usize| row.get(n_idx).unwrap_or(&CELL_EMPTY);

        let employee_code = derive_text_from_sheet_cell(cell_at(indices.idx_employee_code))
            .trim()
            .to_string();
        let employee_name = derive_text_from_sheet_cell(cell_at(indices.idx_employee_name))
            .trim()
            .to_string();
        if employee_code.is_empty() || employee_name.is_empty() {
            debug!("Sheet row {n_row}: blank employee code or name, skipped");
            builder.add_blank_identity();
            continue;
        }

        let cell_status = cell_at(indices.idx_status);
        let status = if cell_status.is_blank() {
            None
        } else {
            Some(derive_text_from_sheet_cell(cell_status))
        };
        if is_status_other(status.as_deref()) {
            builder.add_status_other();
        }

        l_records.push(SpecAttendanceRecord {
            employee_code,
            employee_name,
            date: parse_date_cell(cell_at(indices.idx_date), spec_pivot.rule_date_order),
            status,
            n_row_source: *n_row,
        });
    }

    l_records
}

#[cfg(test)]
mod tests {
    use attendkit_io_xlsx::{EnumSheetCell, SpecSheetGrid};
    use chrono::NaiveDate;

    use super::*;

    fn text(c: &str) -> EnumSheetCell {
        EnumSheetCell::Text(c.to_string())
    }

    fn grid_with_header(l_header: &[&str], l_data: Vec<Vec<EnumSheetCell>>) -> SpecSheetGrid {
        let n_width = l_header.len();
        let mut rows = Vec::new();
        for n_idx in 0..7 {
            let mut row = vec![EnumSheetCell::Empty; n_width];
            row[0] = text(&format!("meta {n_idx}"));
            rows.push(row);
        }
        rows.push(vec![EnumSheetCell::Empty; n_width]);
        let mut row_placeholder = vec![EnumSheetCell::Empty; n_width];
        row_placeholder[0] = text("Daily Attendance Detailed Report");
        rows.push(row_placeholder);
        rows.push(l_header.iter().map(|c| text(c)).collect());
        rows.extend(l_data);
        SpecSheetGrid {
            sheet_name: "DailyAttendance_DetailedReport".to_string(),
            rows,
        }
    }

    #[test]
    fn recover_header_skips_metadata_blank_and_placeholder_rows() {
        let grid = grid_with_header(
            &[" E. Code ", "Name", "Dept", "Date", "Status "],
            vec![vec![
                text("E1"),
                text("Alice"),
                text("Ops"),
                text("2024-06-01"),
                text("Present"),
            ]],
        );

        let table = recover_header(&grid, &SpecHeaderRecovery::default()).expect("header");
        assert_eq!(table.columns, vec!["E. Code", "Name", "Dept", "Date", "Status"]);
        assert_eq!(table.rows.len(), 1);
        assert_eq!(table.rows[0].0, 11);
    }

    #[test]
    fn recover_header_counts_blank_rows_when_asked() {
        let grid = grid_with_header(&["E. Code", "Name", "Date", "Status"], vec![]);
        let spec_header = SpecHeaderRecovery {
            n_rows_metadata: 8,
            if_skip_blank_rows: false,
            ..SpecHeaderRecovery::default()
        };
        let table = recover_header(&grid, &spec_header).expect("header");
        assert_eq!(table.columns, vec!["E. Code", "Name", "Date", "Status"]);
        assert!(table.rows.is_empty());
    }

    #[test]
    fn recover_header_reports_short_sheet() {
        let grid = SpecSheetGrid {
            sheet_name: "Detail".to_string(),
            rows: vec![vec![text("only row")]],
        };
        let err = recover_header(&grid, &SpecHeaderRecovery::default()).expect_err("short");
        assert!(matches!(
            err,
            ReshapeError::HeaderRowMissing {
                n_rows_skipped: 8,
                n_rows_available: 1,
                ..
            }
        ));
    }

    #[test]
    fn recover_header_rejects_overflowing_offsets() {
        let grid = grid_with_header(&["E. Code", "Name", "Date", "Status"], vec![]);
        let spec_header = SpecHeaderRecovery {
            n_rows_metadata: usize::MAX,
            n_rows_placeholder_header: 1,
            ..SpecHeaderRecovery::default()
        };
        let err = recover_header(&grid, &spec_header).expect_err("offset past sheet end");
        assert!(matches!(
            err,
            ReshapeError::HeaderRowMissing {
                n_rows_skipped: usize::MAX,
                n_rows_available: 9,
                ..
            }
        ));
    }

    #[test]
    fn recover_header_counts_whitespace_rows_as_content() {
        let mut grid = grid_with_header(&["E. Code", "Name", "Date", "Status"], vec![]);
        grid.rows[7] = vec![text(" "); 4];

        let table = recover_header(&grid, &SpecHeaderRecovery::default()).expect("header");
        assert_eq!(table.columns[0], "Daily Attendance Detailed Report");
        assert_eq!(table.rows.len(), 1);
    }

    #[test]
    fn resolve_required_columns_names_missing_column() {
        let columns = vec!["E. Code".to_string(), "Name".to_string(), "Date".to_string()];
        let err = resolve_required_columns(&columns).expect_err("missing status");
        match err {
            ReshapeError::MissingColumn { column, columns_found } => {
                assert_eq!(column, "Status");
                assert_eq!(columns_found.len(), 3);
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn resolve_required_columns_uses_first_duplicate() {
        let columns: Vec<String> = ["Name", "E. Code", "Date", "Status", "Name"]
            .iter()
            .map(|c| c.to_string())
            .collect();
        let indices = resolve_required_columns(&columns).expect("columns");
        assert_eq!(indices.idx_employee_name, 0);
        assert_eq!(indices.idx_employee_code, 1);
        assert_eq!(indices.idx_status, 3);
    }

    #[test]
    fn extract_attendance_records_normalizes_cells() {
        let grid = grid_with_header(
            &["E. Code", "Name", "Date", "Status"],
            vec![
                vec![
                    EnumSheetCell::Number(1001.0),
                    text(" Alice "),
                    text("2024-06-01"),
                    text("Present"),
                ],
                vec![EnumSheetCell::Empty, text("Ghost"), text("2024-06-01"), text("Present")],
                vec![text("1002"), text("Bob"), text("N/A"), EnumSheetCell::Empty],
                vec![text("1003"), text("Carol"), text("2024-06-02"), text("Leave")],
            ],
        );
        let table = recover_header(&grid, &SpecHeaderRecovery::default()).expect("header");
        let indices = resolve_required_columns(&table.columns).expect("columns");

        let mut builder = ReportReshapeBuilder::default();
        let l_records = extract_attendance_records(
            &table,
            &indices,
            &SpecPivotOptions::default(),
            &mut builder,
        );

        assert_eq!(l_records.len(), 3);
        assert_eq!(l_records[0].employee_code, "1001");
        assert_eq!(l_records[0].employee_name, "Alice");
        assert_eq!(l_records[0].date, NaiveDate::from_ymd_opt(2024, 6, 1));
        assert_eq!(l_records[1].date, None);
        assert_eq!(l_records[1].status, None);
        assert_eq!(l_records[2].status.as_deref(), Some("Leave"));

        let report = builder.build();
        assert_eq!(report.cnt_rows_read, 4);
        assert_eq!(report.cnt_rows_blank_identity, 1);
        assert_eq!(report.cnt_status_other, 1);
    }
}
