//! Long-to-wide pivot of attendance records into the presence matrix.

use std::collections::btree_map::Entry;
use std::collections::{BTreeMap, BTreeSet};

use log::debug;
use polars::prelude::{Column, DataFrame};

use crate::conf::{C_COL_EMPLOYEE_CODE, C_COL_EMPLOYEE_NAME};
use crate::report::ReportReshapeBuilder;
use crate::spec::{
    EnumColumnKey, EnumDuplicatePolicy, EnumPresenceFlag, ReshapeError, SpecAttendanceRecord,
    SpecIdentityKey, SpecPivotOptions,
};
use crate::util::classify_presence;

/// One employee row of the matrix.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SpecMatrixRow {
    /// Employee code and name.
    pub identity: SpecIdentityKey,
    /// One flag per [`AttendanceMatrix::keys`] entry.
    pub flags: Vec<EnumPresenceFlag>,
}

/// Wide attendance table: one row per employee, one column per day.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct AttendanceMatrix {
    /// Column keys, strictly ascending.
    pub keys: Vec<EnumColumnKey>,
    /// Rows ordered by identity.
    pub rows: Vec<SpecMatrixRow>,
}

impl AttendanceMatrix {
    /// Output header: identity columns followed by the column labels.
    pub fn column_names(&self) -> Vec<String> {
        let mut l_names = vec![C_COL_EMPLOYEE_CODE.to_string(), C_COL_EMPLOYEE_NAME.to_string()];
        l_names.extend(self.keys.iter().map(EnumColumnKey::label));
        l_names
    }

    /// Flag at one employee/column, `None` when either is absent.
    pub fn flag(
        &self,
        employee_code: &str,
        employee_name: &str,
        key: EnumColumnKey,
    ) -> Option<EnumPresenceFlag> {
        let idx_key = self.keys.binary_search(&key).ok()?;
        self.rows
            .iter()
            .find(|row| {
                row.identity.employee_code == employee_code
                    && row.identity.employee_name == employee_name
            })
            .and_then(|row| row.flags.get(idx_key).copied())
    }

    /// Convert to a data frame of string columns, ready for the xlsx writer.
    pub fn to_dataframe(&self) -> Result<DataFrame, ReshapeError> {
        let mut l_columns = Vec::with_capacity(self.keys.len() + 2);
        l_columns.push(Column::new(
            C_COL_EMPLOYEE_CODE.into(),
            self.rows
                .iter()
                .map(|row| row.identity.employee_code.clone())
                .collect::<Vec<String>>(),
        ));
        l_columns.push(Column::new(
            C_COL_EMPLOYEE_NAME.into(),
            self.rows
                .iter()
                .map(|row| row.identity.employee_name.clone())
                .collect::<Vec<String>>(),
        ));
        for (idx_key, key) in self.keys.iter().enumerate() {
            let l_values: Vec<String> = self
                .rows
                .iter()
                .map(|row| {
                    row.flags
                        .get(idx_key)
                        .copied()
                        .unwrap_or(EnumPresenceFlag::No)
                        .as_str()
                        .to_string()
                })
                .collect();
            l_columns.push(Column::new(key.label().into(), l_values));
        }
        DataFrame::new(l_columns).map_err(|e| ReshapeError::Frame(e.to_string()))
    }
}

/// Pivot records into the presence matrix.
///
/// Records without a parsed date are skipped and counted. Missing
/// employee/column pairs are filled with `No`. On duplicates the policy in
/// `spec_pivot.rule_duplicates` decides which flag stays.
pub fn pivot_attendance_records(
    records: &[SpecAttendanceRecord],
    spec_pivot: &SpecPivotOptions,
    builder: &mut ReportReshapeBuilder,
) -> AttendanceMatrix {
    let mut dict_cells: BTreeMap<SpecIdentityKey, BTreeMap<EnumColumnKey, EnumPresenceFlag>> =
        BTreeMap::new();
    let mut set_keys = BTreeSet::new();

    for record in records {
        let Some(date) = record.date else {
            debug!("Sheet row {}: unparseable date, skipped", record.n_row_source);
            builder.add_date_unparseable();
            continue;
        };
        let key = EnumColumnKey::from_date(date, spec_pivot.rule_column_key);
        let flag = classify_presence(record.status.as_deref());
        set_keys.insert(key);
        builder.add_pivoted();

        let identity = SpecIdentityKey {
            employee_code: record.employee_code.clone(),
            employee_name: record.employee_name.clone(),
        };
        match dict_cells.entry(identity).or_default().entry(key) {
            Entry::Vacant(entry) => {
                entry.insert(flag);
            }
            Entry::Occupied(mut entry) => {
                builder.add_duplicate();
                debug!(
                    "Sheet row {}: duplicate {:?} for {}, policy {:?}",
                    record.n_row_source,
                    key,
                    record.employee_code,
                    spec_pivot.rule_duplicates
                );
                if spec_pivot.rule_duplicates == EnumDuplicatePolicy::AnyPresent
                    && flag == EnumPresenceFlag::Yes
                {
                    entry.insert(EnumPresenceFlag::Yes);
                }
            }
        }
    }

    let keys: Vec<EnumColumnKey> = set_keys.into_iter().collect();
    let rows: Vec<SpecMatrixRow> = dict_cells
        .into_iter()
        .map(|(identity, dict_row)| SpecMatrixRow {
            identity,
            flags: keys
                .iter()
                .map(|key| dict_row.get(key).copied().unwrap_or(EnumPresenceFlag::No))
                .collect(),
        })
        .collect();

    builder.set_shape(rows.len() as u64, keys.len() as u64);
    AttendanceMatrix { keys, rows }
}

#[cfg(test)]
mod tests {
    use chrono::NaiveDate;
    use polars::prelude::AnyValue;

    use super::*;
    use crate::spec::EnumColumnKeyMode;

    fn record(code: &str, name: &str, date: &str, status: &str) -> SpecAttendanceRecord {
        SpecAttendanceRecord {
            employee_code: code.to_string(),
            employee_name: name.to_string(),
            date: NaiveDate::parse_from_str(date, "%Y-%m-%d").ok(),
            status: if status.is_empty() {
                None
            } else {
                Some(status.to_string())
            },
            n_row_source: 0,
        }
    }

    fn flags(matrix: &AttendanceMatrix, idx_row: usize) -> Vec<&'static str> {
        matrix.rows[idx_row]
            .flags
            .iter()
            .map(EnumPresenceFlag::as_str)
            .collect()
    }

    #[test]
    fn pivot_builds_one_row_per_employee_and_one_column_per_day() {
        let l_records = vec![
            record("E1", "Alice", "2024-06-01", "Present"),
            record("E1", "Alice", "2024-06-02", "Absent"),
            record("E2", "Bob", "2024-06-01", "present"),
        ];
        let mut builder = ReportReshapeBuilder::default();
        let matrix =
            pivot_attendance_records(&l_records, &SpecPivotOptions::default(), &mut builder);

        assert_eq!(matrix.column_names(), vec!["E. Code", "Name", "1", "2"]);
        assert_eq!(matrix.rows.len(), 2);
        assert_eq!(matrix.rows[0].identity.employee_code, "E1");
        assert_eq!(flags(&matrix, 0), vec!["Yes", "No"]);
        assert_eq!(matrix.rows[1].identity.employee_name, "Bob");
        // E2 has no record for day 2.
        assert_eq!(flags(&matrix, 1), vec!["Yes", "No"]);

        let report = builder.build();
        assert_eq!(report.cnt_records_pivoted, 3);
        assert_eq!(report.cnt_employees, 2);
        assert_eq!(report.cnt_days, 2);
        assert_eq!(report.cnt_duplicates, 0);
    }

    #[test]
    fn pivot_keeps_first_occurrence_on_duplicates() {
        let l_records = vec![
            record("E1", "Alice", "2024-06-01", "Present"),
            record("E1", "Alice", "2024-06-01", "Absent"),
            record("E2", "Bob", "2024-06-01", "Absent"),
            record("E2", "Bob", "2024-06-01", "Present"),
        ];
        let mut builder = ReportReshapeBuilder::default();
        let matrix =
            pivot_attendance_records(&l_records, &SpecPivotOptions::default(), &mut builder);

        assert_eq!(flags(&matrix, 0), vec!["Yes"]);
        assert_eq!(flags(&matrix, 1), vec!["No"]);
        assert_eq!(builder.build().cnt_duplicates, 2);
    }

    #[test]
    fn pivot_any_present_policy_lets_yes_win() {
        let l_records = vec![
            record("E2", "Bob", "2024-06-01", "Absent"),
            record("E2", "Bob", "2024-06-01", "Present"),
            record("E2", "Bob", "2024-06-01", "Leave"),
        ];
        let spec_pivot = SpecPivotOptions {
            rule_duplicates: EnumDuplicatePolicy::AnyPresent,
            ..SpecPivotOptions::default()
        };
        let mut builder = ReportReshapeBuilder::default();
        let matrix = pivot_attendance_records(&l_records, &spec_pivot, &mut builder);

        assert_eq!(flags(&matrix, 0), vec!["Yes"]);
    }

    #[test]
    fn pivot_skips_unparseable_dates_without_stray_column() {
        let l_records = vec![
            record("E1", "Alice", "2024-06-01", "Present"),
            record("E1", "Alice", "N/A", "Present"),
            record("E3", "Carol", "N/A", "Present"),
        ];
        let mut builder = ReportReshapeBuilder::default();
        let matrix =
            pivot_attendance_records(&l_records, &SpecPivotOptions::default(), &mut builder);

        assert_eq!(matrix.column_names(), vec!["E. Code", "Name", "1"]);
        // Carol only has an unusable date and is dropped entirely.
        assert_eq!(matrix.rows.len(), 1);
        assert_eq!(builder.build().cnt_dates_unparseable, 2);
    }

    #[test]
    fn pivot_collapses_months_by_day_unless_calendar_dates_requested() {
        let l_records = vec![
            record("E1", "Alice", "2024-06-10", "Present"),
            record("E1", "Alice", "2024-07-10", "Absent"),
            record("E1", "Alice", "2024-07-02", "Present"),
        ];

        let mut builder = ReportReshapeBuilder::default();
        let matrix =
            pivot_attendance_records(&l_records, &SpecPivotOptions::default(), &mut builder);
        assert_eq!(matrix.column_names(), vec!["E. Code", "Name", "2", "10"]);
        assert_eq!(flags(&matrix, 0), vec!["Yes", "Yes"]);

        let spec_pivot = SpecPivotOptions {
            rule_column_key: EnumColumnKeyMode::CalendarDate,
            ..SpecPivotOptions::default()
        };
        let mut builder = ReportReshapeBuilder::default();
        let matrix = pivot_attendance_records(&l_records, &spec_pivot, &mut builder);
        assert_eq!(
            matrix.column_names(),
            vec!["E. Code", "Name", "2024-06-10", "2024-07-02", "2024-07-10"]
        );
        assert_eq!(flags(&matrix, 0), vec!["Yes", "Yes", "No"]);
    }

    #[test]
    fn pivot_orders_rows_by_identity() {
        let l_records = vec![
            record("10", "Zed", "2024-06-01", "Present"),
            record("9", "Amy", "2024-06-01", "Present"),
            record("9", "Aaron", "2024-06-01", "Absent"),
        ];
        let mut builder = ReportReshapeBuilder::default();
        let matrix =
            pivot_attendance_records(&l_records, &SpecPivotOptions::default(), &mut builder);

        let l_names: Vec<&str> = matrix
            .rows
            .iter()
            .map(|row| row.identity.employee_name.as_str())
            .collect();
        assert_eq!(l_names, vec!["Aaron", "Amy", "Zed"]);
        assert_eq!(
            matrix.flag("9", "Amy", EnumColumnKey::Day(1)),
            Some(EnumPresenceFlag::Yes)
        );
        assert_eq!(matrix.flag("9", "Amy", EnumColumnKey::Day(2)), None);
    }

    #[test]
    fn empty_matrix_has_only_identity_columns() {
        let mut builder = ReportReshapeBuilder::default();
        let matrix = pivot_attendance_records(&[], &SpecPivotOptions::default(), &mut builder);
        let df = matrix.to_dataframe().expect("frame");

        assert_eq!(df.get_column_names_str(), vec!["E. Code", "Name"]);
        assert_eq!(df.height(), 0);
    }

    #[test]
    fn to_dataframe_renders_flags_as_text() {
        let l_records = vec![
            record("E1", "Alice", "2024-06-01", "Present"),
            record("E2", "Bob", "2024-06-02", "Present"),
        ];
        let mut builder = ReportReshapeBuilder::default();
        let matrix =
            pivot_attendance_records(&l_records, &SpecPivotOptions::default(), &mut builder);
        let df = matrix.to_dataframe().expect("frame");

        assert_eq!(df.get_column_names_str(), vec!["E. Code", "Name", "1", "2"]);
        let col_day_1 = df.column("1").expect("day 1");
        assert_eq!(col_day_1.get(0).expect("cell"), AnyValue::String("Yes"));
        assert_eq!(col_day_1.get(1).expect("cell"), AnyValue::String("No"));
    }
}
