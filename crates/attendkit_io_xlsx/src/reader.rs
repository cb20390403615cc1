//! Workbook reader kernel that loads one worksheet into a cell grid.

use std::path::Path;

use calamine::{Data, Reader, open_workbook_auto};
use log::debug;

use crate::spec::{EnumSheetCell, SpecSheetGrid, XlsxReadError};

/// Load `sheet_name` from the workbook at `path_file_in`.
///
/// The workbook format (xls, xlsx, xlsm, xlsb, ods) is picked from the file
/// extension. The returned grid is anchored at `A1`: leading empty rows and
/// columns outside the used range are materialized as [`EnumSheetCell::Empty`].
pub fn read_sheet_grid<P>(path_file_in: P, sheet_name: &str) -> Result<SpecSheetGrid, XlsxReadError>
where
    P: AsRef<Path>,
{
    let path_file_in = path_file_in.as_ref();
    let mut workbook = open_workbook_auto(path_file_in).map_err(|err| XlsxReadError::Open {
        path: path_file_in.to_path_buf(),
        message: err.to_string(),
    })?;

    let l_sheet_names = workbook.sheet_names();
    if !l_sheet_names.iter().any(|c_name| c_name == sheet_name) {
        return Err(XlsxReadError::SheetNotFound {
            path: path_file_in.to_path_buf(),
            sheet: sheet_name.to_string(),
            sheets_available: l_sheet_names,
        });
    }

    let range = workbook
        .worksheet_range(sheet_name)
        .map_err(|err| XlsxReadError::Sheet {
            path: path_file_in.to_path_buf(),
            sheet: sheet_name.to_string(),
            message: err.to_string(),
        })?;

    let Some((n_row_start, n_col_start)) = range.start() else {
        debug!("Sheet {sheet_name:?} in {} is empty", path_file_in.display());
        return Ok(SpecSheetGrid {
            sheet_name: sheet_name.to_string(),
            rows: Vec::new(),
        });
    };
    let n_row_start = n_row_start as usize;
    let n_col_start = n_col_start as usize;
    let n_width_grid = n_col_start + range.width();

    let mut l_rows = Vec::with_capacity(n_row_start + range.height());
    for _ in 0..n_row_start {
        l_rows.push(vec![EnumSheetCell::Empty; n_width_grid]);
    }
    for row in range.rows() {
        let mut l_cells = Vec::with_capacity(n_width_grid);
        l_cells.resize(n_col_start, EnumSheetCell::Empty);
        l_cells.extend(row.iter().map(convert_calamine_cell));
        l_rows.push(l_cells);
    }

    debug!(
        "Loaded sheet {sheet_name:?} from {}: {} rows x {} cols",
        path_file_in.display(),
        l_rows.len(),
        n_width_grid
    );

    Ok(SpecSheetGrid {
        sheet_name: sheet_name.to_string(),
        rows: l_rows,
    })
}

fn convert_calamine_cell(cell: &Data) -> EnumSheetCell {
    match cell {
        Data::Empty | Data::Error(_) => EnumSheetCell::Empty,
        Data::String(val) => EnumSheetCell::Text(val.clone()),
        Data::Int(val) => EnumSheetCell::Number(*val as f64),
        Data::Float(val) => EnumSheetCell::Number(*val),
        Data::Bool(val) => EnumSheetCell::Bool(*val),
        Data::DateTime(val) => match val.as_datetime() {
            Some(dt) => EnumSheetCell::DateTime(dt),
            None => EnumSheetCell::Number(val.as_f64()),
        },
        Data::DateTimeIso(val) | Data::DurationIso(val) => EnumSheetCell::Text(val.clone()),
    }
}

#[cfg(test)]
mod tests {
    use std::path::{Path, PathBuf};
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::{SystemTime, UNIX_EPOCH};

    use rust_xlsxwriter::{Format, Workbook};

    use super::read_sheet_grid;
    use crate::spec::{EnumSheetCell, XlsxReadError};

    static N_TEST_DIRS: AtomicUsize = AtomicUsize::new(0);

    struct TestDir {
        path: PathBuf,
    }

    impl TestDir {
        fn new() -> Self {
            let n = SystemTime::now()
                .duration_since(UNIX_EPOCH)
                .expect("clock")
                .as_nanos();
            let n_seq = N_TEST_DIRS.fetch_add(1, Ordering::SeqCst);
            let path =
                std::env::temp_dir().join(format!("attendkit_xlsx_reader_test_{n}_{n_seq}"));
            std::fs::create_dir_all(&path).expect("create test dir");
            Self { path }
        }

        fn path(&self) -> &Path {
            &self.path
        }
    }

    impl Drop for TestDir {
        fn drop(&mut self) {
            let _ = std::fs::remove_dir_all(&self.path);
        }
    }

    #[test]
    fn read_sheet_grid_anchors_at_a1() {
        let tmp = TestDir::new();
        let path_xlsx = tmp.path().join("in.xlsx");

        let mut workbook = Workbook::new();
        let worksheet = workbook.add_worksheet();
        worksheet.set_name("Detail").expect("name");
        worksheet.write_string(2, 1, "E. Code").expect("write");
        worksheet.write_number(3, 1, 1001.0).expect("write");
        let fmt_date = Format::new().set_num_format("yyyy-mm-dd");
        worksheet
            .write_number_with_format(3, 2, 45_444.0, &fmt_date)
            .expect("write");
        workbook.save(&path_xlsx).expect("save");

        let grid = read_sheet_grid(&path_xlsx, "Detail").expect("read");
        assert_eq!(grid.sheet_name, "Detail");
        assert_eq!(grid.height(), 4);
        assert_eq!(grid.width(), 3);
        assert!(grid.rows[0].iter().all(EnumSheetCell::is_blank));
        assert_eq!(grid.rows[2][0], EnumSheetCell::Empty);
        assert_eq!(grid.rows[2][1], EnumSheetCell::Text("E. Code".to_string()));
        assert_eq!(grid.rows[3][1], EnumSheetCell::Number(1001.0));
        match &grid.rows[3][2] {
            EnumSheetCell::DateTime(dt) => assert_eq!(dt.format("%Y-%m-%d").to_string(), "2024-06-01"),
            other => panic!("expected datetime cell, got {other:?}"),
        }
    }

    #[test]
    fn read_sheet_grid_names_missing_sheet() {
        let tmp = TestDir::new();
        let path_xlsx = tmp.path().join("in.xlsx");

        let mut workbook = Workbook::new();
        workbook
            .add_worksheet()
            .set_name("Other")
            .expect("name");
        workbook.save(&path_xlsx).expect("save");

        let err = read_sheet_grid(&path_xlsx, "DailyAttendance_DetailedReport")
            .expect_err("must fail");
        assert!(matches!(err, XlsxReadError::SheetNotFound { .. }));
        let msg = err.to_string();
        assert!(msg.contains("DailyAttendance_DetailedReport"));
        assert!(msg.contains("Other"));
    }

    #[test]
    fn read_sheet_grid_reports_missing_file() {
        let tmp = TestDir::new();
        let err = read_sheet_grid(tmp.path().join("absent.xlsx"), "Sheet1").expect_err("must fail");
        assert!(matches!(err, XlsxReadError::Open { .. }));
        assert!(err.to_string().contains("absent.xlsx"));
    }
}
