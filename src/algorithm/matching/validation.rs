//! Validation functions for the matching algorithm
//!
//! Records built through `Case::new` and `Control::new` are already valid,
//! but their fields are public, so the matcher re-checks the fields it
//! relies on before any allocation happens.

use crate::error::{CohortError, Result};
use crate::models::{Case, Control, PersonId};

/// Validate that every case and control carries usable matching fields
///
/// Rows are numbered from 1, as in the loader.
pub fn validate_records(cases: &[Case], controls: &[Control]) -> Result<()> {
    for (row, case) in (1..).zip(cases) {
        check_person_id("cases", row, &case.person_id)?;
        check_age("cases", "condition_start_age", row, case.condition_start_age)?;
    }

    for (row, control) in (1..).zip(controls) {
        check_person_id("controls", row, &control.person_id)?;
        check_age("controls", "age", row, control.age)?;
    }

    Ok(())
}

fn check_person_id(table: &str, row: usize, person_id: &PersonId) -> Result<()> {
    if person_id.as_str().trim().is_empty() {
        return Err(CohortError::invalid_value(table, "person_id", row, "is empty"));
    }
    Ok(())
}

fn check_age(table: &str, column: &str, row: usize, age: f64) -> Result<()> {
    if !(age.is_finite() && age >= 0.0) {
        return Err(CohortError::invalid_value(
            table,
            column,
            row,
            &format!("must be a finite non-negative number, got {age}"),
        ));
    }
    Ok(())
}
