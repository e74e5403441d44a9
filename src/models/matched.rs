//! Matched control records

use serde::Serialize;

use crate::models::individual::{Case, Control};
use crate::models::types::{Gender, PersonId};

/// Diagnosis label carried by matched controls
pub const CONTROL_DIAGNOSIS: u8 = 0;

/// Diagnosis label carried by cases
pub const CASE_DIAGNOSIS: u8 = 1;

/// A control allocated to a case during a matching run
///
/// Records are created once per assignment and never mutated afterwards.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MatchedRecord {
    /// Control identifier
    pub person_id: PersonId,
    /// Control gender
    pub gender: Gender,
    /// Control age
    pub age: f64,
    /// Always `CONTROL_DIAGNOSIS`
    pub diagnosis: u8,
    /// Identifier of the case this control was allocated to
    pub matched_case_id: PersonId,
}

impl MatchedRecord {
    /// Stamp a control as matched to the given case
    #[must_use]
    pub fn new(control: &Control, case: &Case) -> Self {
        Self {
            person_id: control.person_id.clone(),
            gender: control.gender,
            age: control.age,
            diagnosis: CONTROL_DIAGNOSIS,
            matched_case_id: case.person_id.clone(),
        }
    }
}
