//! Reshape report models and mutable report builder.

use std::collections::BTreeMap;
use std::fmt;

/// Data-quality counters and diagnostics for one reshape run.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct ReportReshape {
    /// Data rows read under the recovered header.
    pub cnt_rows_read: u64,
    /// Records that landed in the matrix (duplicates included).
    pub cnt_records_pivoted: u64,
    /// Rows dropped for a blank employee code or name.
    pub cnt_rows_blank_identity: u64,
    /// Records dropped because the date could not be parsed.
    pub cnt_dates_unparseable: u64,
    /// Non-empty statuses that are neither present nor absent.
    pub cnt_status_other: u64,
    /// Records that hit an already filled employee/column cell.
    pub cnt_duplicates: u64,
    /// Matrix rows.
    pub cnt_employees: u64,
    /// Matrix day/date columns.
    pub cnt_days: u64,
    /// Non-fatal warnings collected during the run.
    pub warnings: Vec<String>,
}

impl ReportReshape {
    /// Number of collected warnings.
    pub fn warning_count(&self) -> usize {
        self.warnings.len()
    }

    /// Records excluded from the matrix for any reason.
    pub fn cnt_rows_excluded(&self) -> u64 {
        self.cnt_rows_blank_identity + self.cnt_dates_unparseable
    }

    /// Machine-readable counters.
    pub fn to_dict(&self) -> BTreeMap<String, u64> {
        let mut dict_counts = BTreeMap::new();
        dict_counts.insert("cnt_rows_read".to_string(), self.cnt_rows_read);
        dict_counts.insert("cnt_records_pivoted".to_string(), self.cnt_records_pivoted);
        dict_counts.insert("cnt_rows_blank_identity".to_string(), self.cnt_rows_blank_identity);
        dict_counts.insert("cnt_dates_unparseable".to_string(), self.cnt_dates_unparseable);
        dict_counts.insert("cnt_status_other".to_string(), self.cnt_status_other);
        dict_counts.insert("cnt_duplicates".to_string(), self.cnt_duplicates);
        dict_counts.insert("cnt_employees".to_string(), self.cnt_employees);
        dict_counts.insert("cnt_days".to_string(), self.cnt_days);
        dict_counts.insert("cnt_warnings".to_string(), self.warning_count() as u64);
        dict_counts
    }

    /// Human-readable one-line summary.
    pub fn format(&self, prefix: &str) -> String {
        let dict_counts = self.to_dict();
        format!(
            "{prefix} rows={} pivoted={} employees={} days={} blank_identity={} \
             unparseable_dates={} other_status={} duplicates={} warnings={}",
            dict_counts["cnt_rows_read"],
            dict_counts["cnt_records_pivoted"],
            dict_counts["cnt_employees"],
            dict_counts["cnt_days"],
            dict_counts["cnt_rows_blank_identity"],
            dict_counts["cnt_dates_unparseable"],
            dict_counts["cnt_status_other"],
            dict_counts["cnt_duplicates"],
            dict_counts["cnt_warnings"]
        )
    }
}

impl fmt::Display for ReportReshape {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.format("[RESHAPE]"))
    }
}

/// Mutable accumulator for reshape statistics.
#[derive(Debug, Default, Clone)]
pub struct ReportReshapeBuilder {
    /// See [`ReportReshape::cnt_rows_read`].
    pub cnt_rows_read: u64,
    /// See [`ReportReshape::cnt_records_pivoted`].
    pub cnt_records_pivoted: u64,
    /// See [`ReportReshape::cnt_rows_blank_identity`].
    pub cnt_rows_blank_identity: u64,
    /// See [`ReportReshape::cnt_dates_unparseable`].
    pub cnt_dates_unparseable: u64,
    /// See [`ReportReshape::cnt_status_other`].
    pub cnt_status_other: u64,
    /// See [`ReportReshape::cnt_duplicates`].
    pub cnt_duplicates: u64,
    /// See [`ReportReshape::cnt_employees`].
    pub cnt_employees: u64,
    /// See [`ReportReshape::cnt_days`].
    pub cnt_days: u64,
    /// See [`ReportReshape::warnings`].
    pub warnings: Vec<String>,
}

impl ReportReshapeBuilder {
    /// Increment read row count by one.
    pub fn add_row_read(&mut self) {
        self.cnt_rows_read += 1;
    }

    /// Increment pivoted record count by one.
    pub fn add_pivoted(&mut self) {
        self.cnt_records_pivoted += 1;
    }

    /// Increment blank-identity count by one.
    pub fn add_blank_identity(&mut self) {
        self.cnt_rows_blank_identity += 1;
    }

    /// Increment unparseable-date count by one.
    pub fn add_date_unparseable(&mut self) {
        self.cnt_dates_unparseable += 1;
    }

    /// Increment unusual-status count by one.
    pub fn add_status_other(&mut self) {
        self.cnt_status_other += 1;
    }

    /// Increment duplicate count by one.
    pub fn add_duplicate(&mut self) {
        self.cnt_duplicates += 1;
    }

    /// Record the final matrix shape.
    pub fn set_shape(&mut self, cnt_employees: u64, cnt_days: u64) {
        self.cnt_employees = cnt_employees;
        self.cnt_days = cnt_days;
    }

    /// Add warning message.
    pub fn add_warning(&mut self, warning: String) {
        self.warnings.push(warning);
    }

    /// Finalize builder into immutable report.
    pub fn build(self) -> ReportReshape {
        ReportReshape {
            cnt_rows_read: self.cnt_rows_read,
            cnt_records_pivoted: self.cnt_records_pivoted,
            cnt_rows_blank_identity: self.cnt_rows_blank_identity,
            cnt_dates_unparseable: self.cnt_dates_unparseable,
            cnt_status_other: self.cnt_status_other,
            cnt_duplicates: self.cnt_duplicates,
            cnt_employees: self.cnt_employees,
            cnt_days: self.cnt_days,
            warnings: self.warnings,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{ReportReshape, ReportReshapeBuilder};

    #[test]
    fn report_reshape_to_dict_and_format() {
        let report = ReportReshape {
            cnt_rows_read: 6,
            cnt_records_pivoted: 4,
            cnt_rows_blank_identity: 1,
            cnt_dates_unparseable: 1,
            cnt_status_other: 2,
            cnt_duplicates: 1,
            cnt_employees: 2,
            cnt_days: 2,
            warnings: vec!["w".to_string()],
        };

        let dict_counts = report.to_dict();
        assert_eq!(dict_counts["cnt_rows_read"], 6);
        assert_eq!(dict_counts["cnt_records_pivoted"], 4);
        assert_eq!(dict_counts["cnt_duplicates"], 1);
        assert_eq!(dict_counts["cnt_warnings"], 1);
        assert_eq!(report.cnt_rows_excluded(), 2);

        let txt = report.format("[RESHAPE]");
        assert_eq!(
            txt,
            "[RESHAPE] rows=6 pivoted=4 employees=2 days=2 blank_identity=1 \
             unparseable_dates=1 other_status=2 duplicates=1 warnings=1"
        );
        assert_eq!(report.to_string(), txt);
    }

    #[test]
    fn report_builder_accumulates_counts() {
        let mut builder = ReportReshapeBuilder::default();
        builder.add_row_read();
        builder.add_row_read();
        builder.add_pivoted();
        builder.add_date_unparseable();
        builder.set_shape(1, 1);
        builder.add_warning("late".to_string());

        let report = builder.build();
        assert_eq!(report.cnt_rows_read, 2);
        assert_eq!(report.cnt_records_pivoted, 1);
        assert_eq!(report.cnt_dates_unparseable, 1);
        assert_eq!(report.cnt_employees, 1);
        assert_eq!(report.warnings, vec!["late".to_string()]);
    }
}
