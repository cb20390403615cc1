//! Spreadsheet limits and default format presets.

use crate::spec::SpecCellFormat;

/// Excel worksheet maximum row count.
pub const N_NROWS_EXCEL_MAX: usize = 1_048_576;
/// Excel worksheet maximum column count.
pub const N_NCOLS_EXCEL_MAX: usize = 16_384;
/// Excel sheet name maximum length.
pub const N_LEN_EXCEL_SHEET_NAME_MAX: usize = 31;
/// Characters not allowed in sheet names.
pub const TUP_EXCEL_ILLEGAL: [&str; 7] = ["*", ":", "?", "/", "\\", "[", "]"];

/// Named format presets used by [`crate::writer::XlsxWriter`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SpecXlsxFormatPresets {
    /// Generic text cells.
    pub fmt_text: SpecCellFormat,
    /// Integer number cells.
    pub fmt_integer: SpecCellFormat,
    /// Decimal number cells.
    pub fmt_decimal: SpecCellFormat,
    /// Header cells.
    pub fmt_header: SpecCellFormat,
}

impl Default for SpecXlsxFormatPresets {
    fn default() -> Self {
        derive_default_xlsx_formats()
    }
}

/// Calibri 11 presets: thin-bordered body cells, bold centered header.
pub fn derive_default_xlsx_formats() -> SpecXlsxFormatPresets {
    let fmt_base = SpecCellFormat {
        font_name: Some("Calibri".to_string()),
        font_size: Some(11),
        border: Some(1),
        align: Some("left".to_string()),
        valign: Some("vcenter".to_string()),
        ..Default::default()
    };
    let derive_with_num_format = |c_num_format: &str| {
        fmt_base.merge(&SpecCellFormat {
            num_format: Some(c_num_format.to_string()),
            ..Default::default()
        })
    };

    SpecXlsxFormatPresets {
        fmt_integer: derive_with_num_format("0"),
        fmt_decimal: derive_with_num_format("0.0000"),
        fmt_header: fmt_base.merge(&SpecCellFormat {
            bold: Some(true),
            align: Some("center".to_string()),
            ..Default::default()
        }),
        fmt_text: fmt_base,
    }
}
