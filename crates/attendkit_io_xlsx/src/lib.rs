//! `attendkit_io_xlsx` v1:
//! Spreadsheet I/O kernel for the attendance tooling.
//!
//! Modules:
//! - `conf`   : Excel limits and default format presets
//! - `spec`   : cell models, options and error types
//! - `util`   : pure helper functions
//! - `reader` : calamine-backed worksheet loader
//! - `writer` : rust_xlsxwriter-backed data frame writer
pub mod conf;
pub mod reader;
pub mod spec;
pub mod util;
pub mod writer;

pub use conf::{
    N_LEN_EXCEL_SHEET_NAME_MAX, N_NCOLS_EXCEL_MAX, N_NROWS_EXCEL_MAX, SpecXlsxFormatPresets,
    TUP_EXCEL_ILLEGAL,
};
pub use reader::read_sheet_grid;
pub use spec::{
    EnumAutofitColumnsRule, EnumCellValue, EnumSheetCell, SpecAutofitCellsPolicy, SpecCellFormat,
    SpecSheetGrid, SpecXlsxReport, SpecXlsxSheetWriteOptions, SpecXlsxWriteOptions,
    XlsxReadError, XlsxWriteError,
};
pub use util::{
    convert_excel_serial_to_datetime, derive_text_from_sheet_cell, sanitize_sheet_name,
    validate_sheet_extent,
};
pub use writer::XlsxWriter;
