//! XLSX writer kernel that renders polars data frames into a workbook.

use std::collections::BTreeSet;
use std::path::PathBuf;

use log::debug;
use polars::prelude::{AnyValue, DataFrame};
use rust_xlsxwriter::{Format, FormatAlign, FormatBorder, Workbook, Worksheet};

use crate::conf::SpecXlsxFormatPresets;
use crate::spec::{
    EnumAutofitColumnsRule, EnumCellValue, SpecAutofitCellsPolicy, SpecCellFormat,
    SpecXlsxReport, SpecXlsxSheetWriteOptions, SpecXlsxWriteOptions, XlsxWriteError,
};
use crate::util::{
    estimate_unicode_string_width, sanitize_sheet_name, validate_sheet_extent,
    validate_unique_columns,
};

const N_ROWS_HEADER: usize = 1;
/// Excel column width cap, in character units.
const N_WIDTH_COLUMN_MAX: usize = 255;

/// Stateful workbook writer.
pub struct XlsxWriter {
    path_file_out: PathBuf,
    workbook: Workbook,
    fmt_presets: SpecXlsxFormatPresets,
    write_options: SpecXlsxWriteOptions,
    set_sheet_names_existing: BTreeSet<String>,
    l_reports: Vec<SpecXlsxReport>,
    if_closed: bool,
}

impl XlsxWriter {
    /// Create writer bound to output path and format/options presets.
    ///
    /// The workbook is buffered in memory until [`Self::close`] is called; an
    /// existing file at `path_file_out` is replaced at that point.
    pub fn new(
        path_file_out: PathBuf,
        fmt_presets: SpecXlsxFormatPresets,
        write_options: SpecXlsxWriteOptions,
    ) -> Self {
        Self {
            path_file_out,
            workbook: Workbook::new(),
            fmt_presets,
            write_options,
            set_sheet_names_existing: BTreeSet::new(),
            l_reports: Vec::new(),
            if_closed: false,
        }
    }

    /// Return output file path as string.
    pub fn file_out(&self) -> String {
        self.path_file_out.to_string_lossy().to_string()
    }

    /// Return immutable snapshot of per-sheet write reports.
    pub fn report(&self) -> Vec<SpecXlsxReport> {
        self.l_reports.clone()
    }

    /// Flush workbook to disk. Idempotent.
    pub fn close(&mut self) -> Result<(), XlsxWriteError> {
        if self.if_closed {
            return Ok(());
        }
        self.workbook.save(&self.path_file_out)?;
        self.if_closed = true;
        debug!("Saved workbook {}", self.path_file_out.display());
        Ok(())
    }

    /// Write one sheet from an in-memory dataframe.
    ///
    /// Column names become a single bold header row; no index column is written.
    /// The frame must fit on one worksheet and the sanitized sheet name must be
    /// new to this workbook.
    pub fn write_sheet_from_dataframe(
        &mut self,
        df_data: &DataFrame,
        sheet_name: &str,
        options: &SpecXlsxSheetWriteOptions,
    ) -> Result<(), XlsxWriteError> {
        if self.if_closed {
            return Err(XlsxWriteError::Closed);
        }
        self.write_sheet(df_data, sheet_name, options)
    }

    fn write_sheet(
        &mut self,
        df_data: &DataFrame,
        sheet_name: &str,
        options: &SpecXlsxSheetWriteOptions,
    ) -> Result<(), XlsxWriteError> {
        let policy_autofit = &options.policy_autofit;
        validate_policy_autofit(policy_autofit)?;

        let l_colnames: Vec<String> = df_data
            .get_column_names_str()
            .into_iter()
            .map(ToString::to_string)
            .collect();
        validate_unique_columns(&l_colnames)?;

        let n_rows_body = df_data.height();
        let n_cols = l_colnames.len();
        validate_sheet_extent(n_rows_body, n_cols, N_ROWS_HEADER)?;

        let c_sheet_name = sanitize_sheet_name(sheet_name, "_");
        if !self.set_sheet_names_existing.insert(c_sheet_name.clone()) {
            return Err(XlsxWriteError::DuplicateSheet(c_sheet_name));
        }
        let mut report = SpecXlsxReport {
            sheet_name: c_sheet_name.clone(),
            n_rows: n_rows_body,
            n_cols,
            warnings: Vec::new(),
        };
        if c_sheet_name != sheet_name {
            report.warn(format!("Sheet name {sheet_name:?} written as {c_sheet_name:?}"));
        }

        let l_fmt_body = self.derive_column_formats(df_data);
        let fmt_header = derive_rust_xlsx_format(&self.fmt_presets.fmt_header);

        let worksheet = self.workbook.add_worksheet();
        worksheet.set_name(&c_sheet_name)?;

        let mut l_widths = Vec::with_capacity(n_cols);
        for (n_idx_col, c_name) in l_colnames.iter().enumerate() {
            let n_col = cast_col_num(n_idx_col)?;
            if c_name.is_empty() {
                worksheet.write_blank(0, n_col, &fmt_header)?;
            } else {
                worksheet.write_string_with_format(0, n_col, c_name, &fmt_header)?;
            }
            l_widths.push(estimate_unicode_string_width(c_name));
        }

        worksheet.set_freeze_panes(
            cast_row_num(options.row_freeze.unwrap_or(N_ROWS_HEADER))?,
            cast_col_num(options.col_freeze)?,
        )?;

        let n_rows_measured = match policy_autofit.rule_columns {
            EnumAutofitColumnsRule::All => {
                policy_autofit.height_body_inferred_max.unwrap_or(usize::MAX)
            }
            EnumAutofitColumnsRule::Header | EnumAutofitColumnsRule::None => 0,
        };
        for (n_idx_col, col) in df_data.get_columns().iter().enumerate() {
            let n_col = cast_col_num(n_idx_col)?;
            for n_idx_row in 0..n_rows_body {
                let value = derive_cell_value_from_any_value(
                    col.get(n_idx_row)
                        .map_err(|err| XlsxWriteError::Frame(err.to_string()))?,
                );
                if n_idx_row < n_rows_measured {
                    l_widths[n_idx_col] = l_widths[n_idx_col].max(estimate_width_len(&value));
                }
                write_cell_with_format(
                    worksheet,
                    cast_row_num(N_ROWS_HEADER + n_idx_row)?,
                    n_col,
                    &value,
                    &l_fmt_body[n_idx_col],
                )?;
            }
        }

        if policy_autofit.rule_columns != EnumAutofitColumnsRule::None {
            let n_max = usize::min(N_WIDTH_COLUMN_MAX, policy_autofit.width_cell_max);
            for (n_idx_col, n_width) in l_widths.into_iter().enumerate() {
                let n_width_final =
                    (n_width + policy_autofit.width_cell_padding).clamp(policy_autofit.width_cell_min, n_max);
                worksheet.set_column_width(cast_col_num(n_idx_col)?, n_width_final as f64)?;
            }
        }

        debug!(
            "Wrote sheet {:?}: {} rows x {} columns",
            report.sheet_name, report.n_rows, report.n_cols
        );
        self.l_reports.push(report);
        Ok(())
    }

    /// Body cell format per column, picked from the column dtype.
    fn derive_column_formats(&self, df_data: &DataFrame) -> Vec<Format> {
        df_data
            .get_columns()
            .iter()
            .map(|col| {
                let dtype = col.dtype();
                let fmt_base = if !self.write_options.infer_numeric_cols {
                    &self.fmt_presets.fmt_text
                } else if dtype.is_integer() {
                    &self.fmt_presets.fmt_integer
                } else if dtype.is_float() {
                    &self.fmt_presets.fmt_decimal
                } else {
                    &self.fmt_presets.fmt_text
                };
                derive_rust_xlsx_format(&fmt_base.merge(&self.write_options.base_format_patch))
            })
            .collect()
    }
}

/// Estimate displayed width units for one normalized cell value.
pub fn estimate_width_len(value: &EnumCellValue) -> usize {
    match value {
        EnumCellValue::None => 0,
        EnumCellValue::String(s) => estimate_unicode_string_width(s),
        EnumCellValue::Number(n) => n.to_string().len(),
    }
}

fn validate_policy_autofit(policy_autofit: &SpecAutofitCellsPolicy) -> Result<(), XlsxWriteError> {
    if policy_autofit.width_cell_min == 0 {
        return Err(XlsxWriteError::InvalidOptions(
            "policy_autofit.width_cell_min must be >= 1.".to_string(),
        ));
    }
    if policy_autofit.width_cell_max < policy_autofit.width_cell_min
        || policy_autofit.width_cell_min > N_WIDTH_COLUMN_MAX
    {
        return Err(XlsxWriteError::InvalidOptions(format!(
            "policy_autofit needs width_cell_min <= width_cell_max and width_cell_min <= \
             {N_WIDTH_COLUMN_MAX}."
        )));
    }
    Ok(())
}

fn derive_cell_value_from_any_value(value: AnyValue<'_>) -> EnumCellValue {
    match value {
        AnyValue::Null => EnumCellValue::None,
        AnyValue::String(val) => EnumCellValue::String(val.to_string()),
        AnyValue::StringOwned(val) => EnumCellValue::String(val.to_string()),
        AnyValue::Boolean(val) => {
            EnumCellValue::String(if val { "True" } else { "False" }.to_string())
        }
        AnyValue::UInt8(val) => EnumCellValue::Number(val.into()),
        AnyValue::UInt16(val) => EnumCellValue::Number(val.into()),
        AnyValue::UInt32(val) => EnumCellValue::Number(val.into()),
        AnyValue::UInt64(val) => EnumCellValue::Number(val as f64),
        AnyValue::Int8(val) => EnumCellValue::Number(val.into()),
        AnyValue::Int16(val) => EnumCellValue::Number(val.into()),
        AnyValue::Int32(val) => EnumCellValue::Number(val.into()),
        AnyValue::Int64(val) => EnumCellValue::Number(val as f64),
        AnyValue::Float32(val) if val.is_finite() => EnumCellValue::Number(val.into()),
        AnyValue::Float64(val) if val.is_finite() => EnumCellValue::Number(val),
        AnyValue::Float32(_) | AnyValue::Float64(_) => EnumCellValue::None,
        _ => EnumCellValue::String(value.to_string()),
    }
}

fn write_cell_with_format(
    worksheet: &mut Worksheet,
    n_row: u32,
    n_col: u16,
    value: &EnumCellValue,
    format: &Format,
) -> Result<(), XlsxWriteError> {
    match value {
        EnumCellValue::None => {
            worksheet.write_blank(n_row, n_col, format)?;
        }
        EnumCellValue::String(val) => {
            worksheet.write_string_with_format(n_row, n_col, val, format)?;
        }
        EnumCellValue::Number(val) => {
            worksheet.write_number_with_format(n_row, n_col, *val, format)?;
        }
    }
    Ok(())
}

fn derive_rust_xlsx_format(spec: &SpecCellFormat) -> Format {
    let mut format = Format::new();

    if let Some(val) = &spec.font_name {
        format = format.set_font_name(val.as_str());
    }
    if let Some(val) = spec.font_size {
        format = format.set_font_size(val as f64);
    }
    if spec.bold.unwrap_or(false) {
        format = format.set_bold();
    }
    for val in [&spec.align, &spec.valign].into_iter().flatten() {
        if let Some(align) = derive_format_align(val) {
            format = format.set_align(align);
        }
    }
    if let Some(val) = &spec.num_format {
        format = format.set_num_format(val.as_str());
    }
    if let Some(val) = spec.border {
        format = format.set_border(derive_format_border(val));
    }

    format
}

fn derive_format_border(border: i64) -> FormatBorder {
    match border {
        1 => FormatBorder::Thin,
        2 => FormatBorder::Medium,
        5 => FormatBorder::Thick,
        6 => FormatBorder::Double,
        _ => FormatBorder::None,
    }
}

fn derive_format_align(align: &str) -> Option<FormatAlign> {
    match align.trim().to_ascii_lowercase().as_str() {
        "left" => Some(FormatAlign::Left),
        "center" => Some(FormatAlign::Center),
        "right" => Some(FormatAlign::Right),
        "top" => Some(FormatAlign::Top),
        "bottom" => Some(FormatAlign::Bottom),
        "vcenter" => Some(FormatAlign::VerticalCenter),
        _ => None,
    }
}

fn cast_row_num(value: usize) -> Result<u32, XlsxWriteError> {
    u32::try_from(value).map_err(|_| XlsxWriteError::IndexOverflow { axis: "row", value })
}

fn cast_col_num(value: usize) -> Result<u16, XlsxWriteError> {
    u16::try_from(value).map_err(|_| XlsxWriteError::IndexOverflow {
        axis: "column",
        value,
    })
}
