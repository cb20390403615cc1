//! Shared spreadsheet models, options and error types.

use std::path::PathBuf;

use chrono::NaiveDateTime;
use thiserror::Error;

////////////////////////////////////////////////////////////////////////////////
// #region CellFormats

/// Cell format patch; `None` fields inherit from the format it is merged onto.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default)]
pub struct SpecCellFormat {
    /// Font family name.
    pub font_name: Option<String>,
    /// Font size in points.
    pub font_size: Option<i64>,
    /// Bold style.
    pub bold: Option<bool>,
    /// Horizontal alignment: `left`, `center`, `right`.
    pub align: Option<String>,
    /// Vertical alignment: `top`, `vcenter`, `bottom`.
    pub valign: Option<String>,
    /// Border style index for all sides (0 = none, 1 = thin).
    pub border: Option<i64>,
    /// Number format code.
    pub num_format: Option<String>,
}

impl SpecCellFormat {
    /// Overlay `patch` onto `self`; set fields of `patch` win.
    pub fn merge(&self, patch: &SpecCellFormat) -> SpecCellFormat {
        SpecCellFormat {
            font_name: patch.font_name.clone().or_else(|| self.font_name.clone()),
            font_size: patch.font_size.or(self.font_size),
            bold: patch.bold.or(self.bold),
            align: patch.align.clone().or_else(|| self.align.clone()),
            valign: patch.valign.clone().or_else(|| self.valign.clone()),
            border: patch.border.or(self.border),
            num_format: patch.num_format.clone().or_else(|| self.num_format.clone()),
        }
    }
}

/// Normalized cell value on the write path.
#[derive(Debug, Clone, PartialEq)]
pub enum EnumCellValue {
    /// Missing/blank value.
    None,
    /// Text value.
    String(String),
    /// Numeric value.
    Number(f64),
}

// #endregion
////////////////////////////////////////////////////////////////////////////////
// #region SourceCells

/// One cell as loaded from a source workbook.
#[derive(Debug, Clone, PartialEq)]
pub enum EnumSheetCell {
    /// Blank cell (or a cell outside the used range).
    Empty,
    /// Text cell, untrimmed.
    Text(String),
    /// Numeric cell (integers are widened).
    Number(f64),
    /// Boolean cell.
    Bool(bool),
    /// Date/time cell resolved by the reader.
    DateTime(NaiveDateTime),
}

impl EnumSheetCell {
    /// `true` for empty cells and whitespace-only text.
    pub fn is_blank(&self) -> bool {
        match self {
            Self::Empty => true,
            Self::Text(val) => val.trim().is_empty(),
            _ => false,
        }
    }
}

/// Rectangular cell grid of one worksheet, anchored at `A1`.
///
/// Rows before the first used row are kept as empty rows so row positions
/// match what a spreadsheet user sees.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct SpecSheetGrid {
    /// Worksheet name the grid was read from.
    pub sheet_name: String,
    /// Rows of cells; every row has the same width.
    pub rows: Vec<Vec<EnumSheetCell>>,
}

impl SpecSheetGrid {
    /// Number of rows in the grid.
    pub fn height(&self) -> usize {
        self.rows.len()
    }

    /// Number of columns in the grid.
    pub fn width(&self) -> usize {
        self.rows.first().map_or(0, Vec::len)
    }
}

// #endregion
////////////////////////////////////////////////////////////////////////////////
// #region WriteOptions

/// Which cells drive the inferred column width.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum EnumAutofitColumnsRule {
    /// Keep the default Excel width.
    None,
    /// Header text only.
    #[default]
    Header,
    /// Header text and the first `height_body_inferred_max` body rows.
    All,
}

/// Column width inference for one sheet.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SpecAutofitCellsPolicy {
    /// Cells considered.
    pub rule_columns: EnumAutofitColumnsRule,
    /// Body rows inspected under [`EnumAutofitColumnsRule::All`]; `None` scans all.
    pub height_body_inferred_max: Option<usize>,
    /// Lower bound on the final width.
    pub width_cell_min: usize,
    /// Upper bound on the final width.
    pub width_cell_max: usize,
    /// Added to the widest measured cell.
    pub width_cell_padding: usize,
}

impl Default for SpecAutofitCellsPolicy {
    fn default() -> Self {
        Self {
            rule_columns: EnumAutofitColumnsRule::Header,
            height_body_inferred_max: Some(20_000),
            width_cell_min: 4,
            width_cell_max: 60,
            width_cell_padding: 2,
        }
    }
}

/// Writer-wide options.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SpecXlsxWriteOptions {
    /// Use integer/decimal number formats for numeric dtypes.
    pub infer_numeric_cols: bool,
    /// Merged into every body cell format.
    pub base_format_patch: SpecCellFormat,
}

impl Default for SpecXlsxWriteOptions {
    fn default() -> Self {
        Self {
            infer_numeric_cols: true,
            base_format_patch: SpecCellFormat {
                border: Some(0),
                ..Default::default()
            },
        }
    }
}

/// Per-sheet call options.
#[derive(Default, Debug, Clone)]
pub struct SpecXlsxSheetWriteOptions {
    /// Number of frozen leading columns.
    pub col_freeze: usize,
    /// Frozen row count; the header row when `None`.
    pub row_freeze: Option<usize>,
    /// Column autofit policy.
    pub policy_autofit: SpecAutofitCellsPolicy,
}

/// Outcome of one sheet write.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct SpecXlsxReport {
    /// Final worksheet name after sanitizing.
    pub sheet_name: String,
    /// Body rows written (header excluded).
    pub n_rows: usize,
    /// Columns written.
    pub n_cols: usize,
    /// Non-fatal warnings.
    pub warnings: Vec<String>,
}

impl SpecXlsxReport {
    /// Add a warning message.
    pub fn warn(&mut self, msg: impl AsRef<str>) {
        self.warnings.push(msg.as_ref().to_string());
    }
}

// #endregion
////////////////////////////////////////////////////////////////////////////////
// #region Errors

/// Source workbook could not be loaded.
#[derive(Debug, Error)]
pub enum XlsxReadError {
    /// Workbook file missing, unreadable, or of an unknown format.
    #[error("Failed to open workbook {}: {message}", .path.display())]
    Open {
        /// Workbook path.
        path: PathBuf,
        /// Underlying reader error text.
        message: String,
    },
    /// Requested worksheet is not in the workbook.
    #[error(
        "Sheet {sheet:?} not found in {}; available sheets: {}",
        .path.display(),
        .sheets_available.join(", ")
    )]
    SheetNotFound {
        /// Workbook path.
        path: PathBuf,
        /// Requested sheet name.
        sheet: String,
        /// Sheet names present in the workbook.
        sheets_available: Vec<String>,
    },
    /// Worksheet exists but its cells could not be decoded.
    #[error("Failed to load sheet {sheet:?} from {}: {message}", .path.display())]
    Sheet {
        /// Workbook path.
        path: PathBuf,
        /// Sheet name.
        sheet: String,
        /// Underlying reader error text.
        message: String,
    },
}

/// Workbook could not be built or saved.
#[derive(Debug, Error)]
pub enum XlsxWriteError {
    /// Writer was already closed.
    #[error("Cannot write after close().")]
    Closed,
    /// Data frame has repeated column names.
    #[error("Duplicate column names detected: {0}")]
    DuplicateColumns(String),
    /// Invalid option combination.
    #[error("{0}")]
    InvalidOptions(String),
    /// Worksheet name already used in this workbook.
    #[error("Sheet {0:?} already exists in the workbook")]
    DuplicateSheet(String),
    /// Frame does not fit on a single worksheet.
    #[error(
        "Frame of {n_rows} rows x {n_cols} columns exceeds the worksheet limit of \
         {n_rows_max} rows x {n_cols_max} columns"
    )]
    SheetTooLarge {
        /// Rows needed, header included.
        n_rows: usize,
        /// Columns needed.
        n_cols: usize,
        /// Worksheet row limit.
        n_rows_max: usize,
        /// Worksheet column limit.
        n_cols_max: usize,
    },
    /// Row/column position does not fit the Excel address space.
    #[error("{axis} index overflow: {value}")]
    IndexOverflow {
        /// `row` or `column`.
        axis: &'static str,
        /// Offending index.
        value: usize,
    },
    /// Data frame cell access failed.
    #[error("Failed to access cell value: {0}")]
    Frame(String),
    /// Low-level xlsx error, including the final save.
    #[error("xlsx write error: {0}")]
    Xlsx(#[from] rust_xlsxwriter::XlsxError),
}

// #endregion
////////////////////////////////////////////////////////////////////////////////
