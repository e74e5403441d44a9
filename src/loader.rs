//! Typed loading of study input tables
//!
//! Each loader reads a CSV or Parquet file with [`read_table`] and converts
//! the record batches into domain records. Required columns are looked up by
//! name; a missing column, or a null or unparseable value in a required
//! column, is a [`CohortError::Schema`] naming the table, column and row.
//! Rows are numbered from 1 across all batches of a table.

use std::path::Path;

use arrow::array::{Array, ArrayRef};
use arrow::record_batch::RecordBatch;
use chrono::NaiveDate;
use log::{debug, warn};

use crate::error::{CohortError, Result};
use crate::models::{Case, Control, Demographics, DiagnosisEvent, Gender};
use crate::utils::arrow_utils::{
    arrow_array_to_date, arrow_array_to_f64, arrow_array_to_i64, arrow_array_to_string,
};
use crate::utils::io::{column_by_name, read_table};

pub const PERSON_ID: &str = "person_id";
pub const GENDER: &str = "gender";
pub const AGE: &str = "age";
pub const CONDITION_START_AGE: &str = "condition_start_age";
pub const CONDITION_START_DATE: &str = "condition_start_date";
pub const YEAR_OF_BIRTH: &str = "year_of_birth";
pub const MONTH_OF_BIRTH: &str = "month_of_birth";
pub const DAY_OF_BIRTH: &str = "day_of_birth";

/// Load candidate controls (`person_id`, `gender`, `age`)
pub fn load_controls(path: &Path) -> Result<Vec<Control>> {
    controls_from_batches(&read_table(path)?)
}

/// Load precomputed cases (`person_id`, `gender`, `condition_start_age`)
pub fn load_cases(path: &Path) -> Result<Vec<Case>> {
    cases_from_batches(&read_table(path)?)
}

/// Load dementia diagnosis events (`person_id`, `condition_start_date`)
pub fn load_diagnosis_events(path: &Path) -> Result<Vec<DiagnosisEvent>> {
    diagnosis_events_from_batches(&read_table(path)?)
}

/// Load demographics (`person_id`, birth date parts, `gender`)
pub fn load_demographics(path: &Path) -> Result<Vec<Demographics>> {
    demographics_from_batches(&read_table(path)?)
}

/// Convert control batches into records
pub fn controls_from_batches(batches: &[RecordBatch]) -> Result<Vec<Control>> {
    const TABLE: &str = "controls";
    let mut controls = Vec::new();
    let mut row = 0;

    for batch in batches {
        let ids = column_by_name(batch, TABLE, PERSON_ID)?;
        let genders = column_by_name(batch, TABLE, GENDER)?;
        let ages = column_by_name(batch, TABLE, AGE)?;

        for i in 0..batch.num_rows() {
            row += 1;
            let cell = Cell { table: TABLE, row, index: i };
            let age = cell.f64(ages, AGE)?;
            controls.push(Control::new(cell.string(ids, PERSON_ID)?, cell.gender(genders)?, age)?);
        }
    }

    debug!("Extracted {} controls", controls.len());
    Ok(controls)
}

/// Convert precomputed case batches into records
pub fn cases_from_batches(batches: &[RecordBatch]) -> Result<Vec<Case>> {
    const TABLE: &str = "cases";
    let mut cases = Vec::new();
    let mut row = 0;

    for batch in batches {
        let ids = column_by_name(batch, TABLE, PERSON_ID)?;
        let genders = column_by_name(batch, TABLE, GENDER)?;
        let ages = column_by_name(batch, TABLE, CONDITION_START_AGE)?;

        for i in 0..batch.num_rows() {
            row += 1;
            let cell = Cell { table: TABLE, row, index: i };
            let age = cell.f64(ages, CONDITION_START_AGE)?;
            cases.push(Case::new(cell.string(ids, PERSON_ID)?, cell.gender(genders)?, age)?);
        }
    }

    debug!("Extracted {} cases", cases.len());
    Ok(cases)
}

/// Convert diagnosis event batches into records
pub fn diagnosis_events_from_batches(batches: &[RecordBatch]) -> Result<Vec<DiagnosisEvent>> {
    const TABLE: &str = "diagnoses";
    let mut events = Vec::new();
    let mut row = 0;

    for batch in batches {
        let ids = column_by_name(batch, TABLE, PERSON_ID)?;
        let dates = column_by_name(batch, TABLE, CONDITION_START_DATE)?;

        for i in 0..batch.num_rows() {
            row += 1;
            let cell = Cell { table: TABLE, row, index: i };
            events.push(DiagnosisEvent::new(
                cell.string(ids, PERSON_ID)?,
                cell.date(dates, CONDITION_START_DATE)?,
            ));
        }
    }

    debug!("Extracted {} diagnosis events", events.len());
    Ok(events)
}

/// Convert demographic batches into records
///
/// Rows whose birth date parts do not form a calendar date are skipped with
/// a warning.
pub fn demographics_from_batches(batches: &[RecordBatch]) -> Result<Vec<Demographics>> {
    const TABLE: &str = "demographics";
    let mut people = Vec::new();
    let mut skipped = 0;
    let mut row = 0;

    for batch in batches {
        let ids = column_by_name(batch, TABLE, PERSON_ID)?;
        let years = column_by_name(batch, TABLE, YEAR_OF_BIRTH)?;
        let months = column_by_name(batch, TABLE, MONTH_OF_BIRTH)?;
        let days = column_by_name(batch, TABLE, DAY_OF_BIRTH)?;
        let genders = column_by_name(batch, TABLE, GENDER)?;

        for i in 0..batch.num_rows() {
            row += 1;
            let cell = Cell { table: TABLE, row, index: i };
            let person_id = cell.string(ids, PERSON_ID)?;
            let year = cell.i64(years, YEAR_OF_BIRTH)?;
            let month = cell.i64(months, MONTH_OF_BIRTH)?;
            let day = cell.i64(days, DAY_OF_BIRTH)?;
            let gender = cell.gender(genders)?;

            match birth_date(year, month, day) {
                Some(date) => people.push(Demographics::new(person_id, date, gender)),
                None => {
                    warn!(
                        "Skipping demographics row {row} for person {person_id}: \
                         {year}-{month}-{day} is not a valid birth date"
                    );
                    skipped += 1;
                }
            }
        }
    }

    if skipped > 0 {
        warn!("Skipped {skipped} demographics rows without a valid birth date");
    }
    debug!("Extracted {} demographics records", people.len());
    Ok(people)
}

fn birth_date(year: i64, month: i64, day: i64) -> Option<NaiveDate> {
    NaiveDate::from_ymd_opt(
        i32::try_from(year).ok()?,
        u32::try_from(month).ok()?,
        u32::try_from(day).ok()?,
    )
}

/// Position of one row within a table, for typed reads with error context
struct Cell<'a> {
    table: &'a str,
    row: usize,
    index: usize,
}

impl Cell<'_> {
    fn error(&self, column: &str, array: &ArrayRef) -> CohortError {
        let detail = if array.is_null(self.index) {
            "is null".to_string()
        } else {
            format!("cannot be read from a {} column", array.data_type())
        };
        CohortError::invalid_value(self.table, column, self.row, &detail)
    }

    fn string(&self, array: &ArrayRef, column: &str) -> Result<String> {
        arrow_array_to_string(array, self.index)
            .filter(|s| !s.is_empty())
            .ok_or_else(|| {
                if array.is_null(self.index) {
                    self.error(column, array)
                } else {
                    CohortError::invalid_value(self.table, column, self.row, "is empty or not text")
                }
            })
    }

    fn f64(&self, array: &ArrayRef, column: &str) -> Result<f64> {
        arrow_array_to_f64(array, self.index).ok_or_else(|| self.error(column, array))
    }

    fn i64(&self, array: &ArrayRef, column: &str) -> Result<i64> {
        arrow_array_to_i64(array, self.index).ok_or_else(|| self.error(column, array))
    }

    fn date(&self, array: &ArrayRef, column: &str) -> Result<NaiveDate> {
        arrow_array_to_date(array, self.index).ok_or_else(|| self.error(column, array))
    }

    fn gender(&self, array: &ArrayRef) -> Result<Gender> {
        let value = self.string(array, GENDER)?;
        value.parse().map_err(|_| {
            CohortError::invalid_value(
                self.table,
                GENDER,
                self.row,
                &format!("has unrecognised value '{value}'"),
            )
        })
    }
}
