//! Case and control entity models
//!
//! Both record types are validated on construction so that the matching
//! engine can rely on finite, non-negative ages.

use serde::Serialize;

use crate::error::{CohortError, Result};
use crate::models::types::{Gender, PersonId};

/// Diagnosed individual eligible to be matched against controls
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Case {
    /// Unique identifier
    pub person_id: PersonId,
    /// Gender
    pub gender: Gender,
    /// Age in fractional years at the onset of the condition
    pub condition_start_age: f64,
}

impl Case {
    /// Create a case, rejecting negative or non-finite onset ages
    pub fn new(
        person_id: impl Into<PersonId>,
        gender: Gender,
        condition_start_age: f64,
    ) -> Result<Self> {
        let person_id = person_id.into();
        check_age(&person_id, "condition_start_age", condition_start_age)?;
        Ok(Self {
            person_id,
            gender,
            condition_start_age,
        })
    }

    /// Age used for matching and modelling (the onset age)
    #[must_use]
    pub const fn age(&self) -> f64 {
        self.condition_start_age
    }
}

/// Individual without the diagnosis, a candidate for matching
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Control {
    /// Unique identifier
    pub person_id: PersonId,
    /// Gender
    pub gender: Gender,
    /// Age in fractional years
    pub age: f64,
}

impl Control {
    /// Create a control, rejecting negative or non-finite ages
    pub fn new(person_id: impl Into<PersonId>, gender: Gender, age: f64) -> Result<Self> {
        let person_id = person_id.into();
        check_age(&person_id, "age", age)?;
        Ok(Self {
            person_id,
            gender,
            age,
        })
    }
}

fn check_age(person_id: &PersonId, field: &str, age: f64) -> Result<()> {
    if age.is_finite() && age >= 0.0 {
        Ok(())
    } else {
        Err(CohortError::schema(format!(
            "person {person_id}: {field} must be a finite non-negative number, got {age}"
        )))
    }
}
