//! `attendkit_matrix` v1:
//! Daily attendance export to employee x day presence matrix.
//!
//! Modules:
//! - `conf`     : column names, flag literals and run defaults
//! - `spec`     : policies/options/records/errors
//! - `util`     : date parsing and presence classification
//! - `header`   : header recovery and record extraction
//! - `pivot`    : long-to-wide pivot
//! - `report`   : data-quality report model
//! - `pipeline` : read, reshape and write orchestration

pub mod conf;
pub mod header;
pub mod pipeline;
pub mod pivot;
pub mod report;
pub mod spec;
mod util;

pub use header::{extract_attendance_records, recover_header, resolve_required_columns};
pub use pipeline::{reshape_sheet_grid, run_reshape, write_attendance_matrix};
pub use pivot::{AttendanceMatrix, SpecMatrixRow, pivot_attendance_records};
pub use report::{ReportReshape, ReportReshapeBuilder};
pub use spec::{
    EnumColumnKey, EnumColumnKeyMode, EnumDateOrder, EnumDuplicatePolicy, EnumPresenceFlag,
    ReshapeError, SpecAttendanceRecord, SpecColumnIndices, SpecHeaderRecovery, SpecIdentityKey,
    SpecPivotOptions, SpecRecoveredTable, SpecReshapeOptions,
};
pub use util::{classify_presence, parse_date_cell, parse_date_text};
