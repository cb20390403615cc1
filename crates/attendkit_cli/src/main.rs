use std::path::PathBuf;

use anyhow::{Context, Result};
use attendkit_matrix::conf::{
    C_FILE_IN_DEFAULT, C_FILE_OUT_DEFAULT, C_SHEET_IN_DEFAULT, C_SHEET_OUT_DEFAULT,
    N_ROWS_METADATA_DEFAULT, N_ROWS_PLACEHOLDER_HEADER_DEFAULT,
};
use attendkit_matrix::{
    EnumColumnKeyMode, EnumDateOrder, EnumDuplicatePolicy, SpecHeaderRecovery, SpecPivotOptions,
    SpecReshapeOptions, run_reshape,
};
use clap::{Parser, ValueEnum};
use log::debug;

/// Reshape a daily attendance export into an employee x day presence matrix.
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Source workbook (xls, xlsx, xlsb, ods)
    #[arg(value_name = "INPUT", default_value = C_FILE_IN_DEFAULT)]
    path_file_in: PathBuf,

    /// Source worksheet name
    #[arg(long = "sheet", value_name = "NAME", default_value = C_SHEET_IN_DEFAULT)]
    sheet_in: String,

    /// Output workbook, overwritten if present
    #[arg(short = 'o', long = "output", value_name = "FILE", default_value = C_FILE_OUT_DEFAULT)]
    path_file_out: PathBuf,

    /// Output worksheet name
    #[arg(long = "sheet-out", value_name = "NAME", default_value = C_SHEET_OUT_DEFAULT)]
    sheet_out: String,

    /// Metadata rows above the placeholder header
    #[arg(long = "rows-metadata", value_name = "N", default_value_t = N_ROWS_METADATA_DEFAULT)]
    n_rows_metadata: usize,

    /// Placeholder header rows replaced by the row after them
    #[arg(
        long = "rows-placeholder",
        value_name = "N",
        default_value_t = N_ROWS_PLACEHOLDER_HEADER_DEFAULT
    )]
    n_rows_placeholder_header: usize,

    /// Count blank rows when skipping metadata and header rows
    #[arg(long = "keep-blank-rows")]
    if_keep_blank_rows: bool,

    /// Which record wins when an employee has several for one day
    #[arg(long = "duplicates", value_enum, default_value_t = ArgDuplicates::First)]
    rule_duplicates: ArgDuplicates,

    /// Column axis of the matrix
    #[arg(long = "column-key", value_enum, default_value_t = ArgColumnKey::Day)]
    rule_column_key: ArgColumnKey,

    /// Reading order for ambiguous numeric dates
    #[arg(long = "date-order", value_enum, default_value_t = ArgDateOrder::MonthFirst)]
    rule_date_order: ArgDateOrder,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
enum ArgDuplicates {
    /// First record in sheet order
    First,
    /// Present if any record says present
    AnyPresent,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
enum ArgColumnKey {
    /// Day of month (1-31)
    Day,
    /// Full calendar date (YYYY-MM-DD)
    Date,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
enum ArgDateOrder {
    /// MM/DD/YYYY
    MonthFirst,
    /// DD/MM/YYYY
    DayFirst,
}

impl Cli {
    fn into_options(self) -> SpecReshapeOptions {
        SpecReshapeOptions {
            path_file_in: self.path_file_in,
            sheet_in: self.sheet_in,
            path_file_out: self.path_file_out,
            sheet_out: self.sheet_out,
            spec_header: SpecHeaderRecovery {
                n_rows_metadata: self.n_rows_metadata,
                n_rows_placeholder_header: self.n_rows_placeholder_header,
                if_skip_blank_rows: !self.if_keep_blank_rows,
            },
            spec_pivot: SpecPivotOptions {
                rule_duplicates: match self.rule_duplicates {
                    ArgDuplicates::First => EnumDuplicatePolicy::First,
                    ArgDuplicates::AnyPresent => EnumDuplicatePolicy::AnyPresent,
                },
                rule_column_key: match self.rule_column_key {
                    ArgColumnKey::Day => EnumColumnKeyMode::DayOfMonth,
                    ArgColumnKey::Date => EnumColumnKeyMode::CalendarDate,
                },
                rule_date_order: match self.rule_date_order {
                    ArgDateOrder::MonthFirst => EnumDateOrder::MonthFirst,
                    ArgDateOrder::DayFirst => EnumDateOrder::DayFirst,
                },
            },
        }
    }
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let options = Cli::parse().into_options();
    debug!("Options: {options:?}");

    let report = run_reshape(&options).with_context(|| {
        format!(
            "Failed to build attendance matrix from {}",
            options.path_file_in.display()
        )
    })?;
    debug!("Report counters: {:?}", report.to_dict());

    println!(
        "Attendance matrix saved to {}",
        options.path_file_out.display()
    );
    Ok(())
}
