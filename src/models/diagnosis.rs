//! Diagnosis events and demographics
//!
//! These are the raw inputs from which cases are derived: one row per
//! recorded dementia diagnosis, and one demographic row per person.

use chrono::NaiveDate;

use crate::models::types::{Gender, PersonId};

/// A single recorded dementia diagnosis
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DiagnosisEvent {
    /// Individual with the diagnosis
    pub person_id: PersonId,
    /// Date the condition was recorded
    pub condition_start_date: NaiveDate,
}

impl DiagnosisEvent {
    /// Create a new diagnosis event
    pub fn new(person_id: impl Into<PersonId>, condition_start_date: NaiveDate) -> Self {
        Self {
            person_id: person_id.into(),
            condition_start_date,
        }
    }
}

/// Demographic record for one individual
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Demographics {
    /// Unique identifier
    pub person_id: PersonId,
    /// Date of birth
    pub birth_date: NaiveDate,
    /// Gender
    pub gender: Gender,
}

impl Demographics {
    /// Create a new demographic record
    pub fn new(person_id: impl Into<PersonId>, birth_date: NaiveDate, gender: Gender) -> Self {
        Self {
            person_id: person_id.into(),
            birth_date,
            gender,
        }
    }
}
