//! End-to-end reshape: source sheet in, presence matrix workbook out.

use std::path::Path;

use attendkit_io_xlsx::{
    SpecSheetGrid, SpecXlsxFormatPresets, SpecXlsxSheetWriteOptions, SpecXlsxWriteOptions,
    XlsxWriteError, XlsxWriter, read_sheet_grid,
};
use log::{info, warn};

use crate::header::{extract_attendance_records, recover_header, resolve_required_columns};
use crate::pivot::{AttendanceMatrix, pivot_attendance_records};
use crate::report::{ReportReshape, ReportReshapeBuilder};
use crate::spec::{ReshapeError, SpecReshapeOptions};

/// Frozen identity columns in the output sheet.
const N_COLS_IDENTITY: usize = 2;

/// Reshape an in-memory sheet grid into the presence matrix.
pub fn reshape_sheet_grid(
    grid: &SpecSheetGrid,
    options: &SpecReshapeOptions,
) -> Result<(AttendanceMatrix, ReportReshape), ReshapeError> {
    let mut builder = ReportReshapeBuilder::default();

    let table = recover_header(grid, &options.spec_header)?;
    info!(
        "Recovered header with {} columns and {} data rows",
        table.columns.len(),
        table.rows.len()
    );
    let indices = resolve_required_columns(&table.columns)?;

    let l_records =
        extract_attendance_records(&table, &indices, &options.spec_pivot, &mut builder);
    let matrix = pivot_attendance_records(&l_records, &options.spec_pivot, &mut builder);
    info!(
        "Pivoted {} employees x {} columns",
        matrix.rows.len(),
        matrix.keys.len()
    );

    collect_quality_warnings(&mut builder, options);
    Ok((matrix, builder.build()))
}

fn collect_quality_warnings(builder: &mut ReportReshapeBuilder, options: &SpecReshapeOptions) {
    let mut l_warnings = Vec::new();
    if builder.cnt_rows_blank_identity > 0 {
        l_warnings.push(format!(
            "{} rows without employee code or name were excluded",
            builder.cnt_rows_blank_identity
        ));
    }
    if builder.cnt_dates_unparseable > 0 {
        l_warnings.push(format!(
            "{} rows with an unparseable date were excluded",
            builder.cnt_dates_unparseable
        ));
    }
    if builder.cnt_status_other > 0 {
        l_warnings.push(format!(
            "{} rows have a status other than present/absent and count as No",
            builder.cnt_status_other
        ));
    }
    if builder.cnt_duplicates > 0 {
        l_warnings.push(format!(
            "{} duplicate employee/day records resolved with policy {:?}",
            builder.cnt_duplicates, options.spec_pivot.rule_duplicates
        ));
    }
    if builder.cnt_employees == 0 {
        l_warnings.push("No attendance records remained; matrix has identity columns only".into());
    }

    for c_warning in l_warnings {
        warn!("{c_warning}");
        builder.add_warning(c_warning);
    }
}

/// Write the matrix as a single-sheet workbook, replacing any existing file.
pub fn write_attendance_matrix(
    matrix: &AttendanceMatrix,
    path_file_out: &Path,
    sheet_name: &str,
) -> Result<(), ReshapeError> {
    let df_matrix = matrix.to_dataframe()?;
    let to_destination_error = |source: XlsxWriteError| ReshapeError::Destination {
        path: path_file_out.to_path_buf(),
        source,
    };

    let mut writer = XlsxWriter::new(
        path_file_out.to_path_buf(),
        SpecXlsxFormatPresets::default(),
        SpecXlsxWriteOptions::default(),
    );
    let sheet_options = SpecXlsxSheetWriteOptions {
        col_freeze: N_COLS_IDENTITY,
        ..SpecXlsxSheetWriteOptions::default()
    };
    writer
        .write_sheet_from_dataframe(&df_matrix, sheet_name, &sheet_options)
        .map_err(to_destination_error)?;
    writer.close().map_err(to_destination_error)?;

    for report in writer.report() {
        for c_warning in report.warnings {
            warn!("{c_warning}");
        }
    }
    info!("Wrote {}", writer.file_out());
    Ok(())
}

/// Read the configured source sheet, reshape it and write the matrix.
pub fn run_reshape(options: &SpecReshapeOptions) -> Result<ReportReshape, ReshapeError> {
    info!(
        "Reading sheet {:?} from {}",
        options.sheet_in,
        options.path_file_in.display()
    );
    let grid = read_sheet_grid(&options.path_file_in, &options.sheet_in)?;

    let (matrix, report) = reshape_sheet_grid(&grid, options)?;
    write_attendance_matrix(&matrix, &options.path_file_out, &options.sheet_out)?;
    info!("{report}");
    Ok(report)
}
