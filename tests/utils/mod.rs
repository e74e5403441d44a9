//! Fixtures shared by the integration tests

use std::fs::File;
use std::io::Write;
use std::path::{Path, PathBuf};

use dementia_cohort::{Case, Control, Gender, MatchedRecord};

/// Build a case, panicking on invalid input
#[must_use]
pub fn case(id: &str, gender: Gender, age: f64) -> Case {
    Case::new(id, gender, age).unwrap()
}

/// Build a control, panicking on invalid input
#[must_use]
pub fn control(id: &str, gender: Gender, age: f64) -> Control {
    Control::new(id, gender, age).unwrap()
}

/// Identifiers of matched records, in output order
#[must_use]
pub fn matched_ids(records: &[MatchedRecord]) -> Vec<String> {
    records.iter().map(|r| r.person_id.to_string()).collect()
}

/// Write a CSV file with a header row
pub fn write_csv(dir: &Path, name: &str, header: &str, rows: &[String]) -> PathBuf {
    let path = dir.join(name);
    let mut file = File::create(&path).unwrap();
    writeln!(file, "{header}").unwrap();
    for row in rows {
        writeln!(file, "{row}").unwrap();
    }
    path
}

/// Control rows (`person_id,gender,age`) covering every whole age for both genders
///
/// Each age gets `per_age` controls at `age`, `age + 0.25`, `age + 0.5`, ...
#[must_use]
pub fn control_rows(ages: std::ops::RangeInclusive<u32>, per_age: usize) -> Vec<String> {
    let mut rows = Vec::new();
    for age in ages {
        for gender in ["M", "F"] {
            for k in 0..per_age {
                let value = f64::from(age) + 0.25 * k as f64;
                rows.push(format!("K{gender}{age}_{k},{gender},{value:.2}"));
            }
        }
    }
    rows
}
