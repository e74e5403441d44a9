//! Matching criteria definitions for case-control matching
//!
//! This module provides the parameters that decide whether a control is an
//! eligible match for a case, and how many controls each case may receive.

use crate::config::{CohortConfig, validate_matching};
use crate::error::Result;
use crate::models::{Case, Control};

/// Criteria for matching cases to controls
///
/// A control is eligible for a case when it has the same gender and its age
/// lies in `[case_age - age_tolerance, case_age + age_tolerance]`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MatchingCriteria {
    /// Maximum allowed absolute difference in years between case and control
    age_tolerance: f64,

    /// Number of controls to allocate to each case (an upper bound)
    num_controls: usize,
}

impl MatchingCriteria {
    /// Create validated criteria
    ///
    /// Fails with `InvalidParameter` if `age_tolerance` is negative or not
    /// finite, or if `num_controls` is zero.
    pub fn new(age_tolerance: f64, num_controls: usize) -> Result<Self> {
        validate_matching(age_tolerance, num_controls)?;
        Ok(Self {
            age_tolerance,
            num_controls,
        })
    }

    /// Build criteria from the matching part of a cohort configuration
    pub fn from_config(config: &CohortConfig) -> Result<Self> {
        Self::new(config.age_tolerance, config.num_controls)
    }

    /// Age tolerance in years
    #[must_use]
    pub const fn age_tolerance(&self) -> f64 {
        self.age_tolerance
    }

    /// Controls requested per case
    #[must_use]
    pub const fn num_controls(&self) -> usize {
        self.num_controls
    }

    /// Inclusive age window for a case
    #[must_use]
    pub fn age_window(&self, case_age: f64) -> (f64, f64) {
        (case_age - self.age_tolerance, case_age + self.age_tolerance)
    }

    /// Check if a control's age falls within the window around the case age
    #[must_use]
    pub fn is_age_match(&self, case_age: f64, control_age: f64) -> bool {
        let (lower, upper) = self.age_window(case_age);
        control_age >= lower && control_age <= upper
    }

    /// Check gender and age eligibility, ignoring prior allocation
    #[must_use]
    pub fn is_eligible(&self, case: &Case, control: &Control) -> bool {
        case.gender == control.gender && self.is_age_match(case.age(), control.age)
    }

    /// Convert to a human-readable string representation
    #[must_use]
    pub fn to_string_representation(&self) -> String {
        format!(
            "Matching Criteria:\n\
             - Require same gender: true\n\
             - Age tolerance: ±{} years\n\
             - Controls per case: {}",
            self.age_tolerance, self.num_controls
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::CohortError;
    use crate::models::Gender;

    #[test]
    fn test_parameter_validation() {
        assert!(matches!(
            MatchingCriteria::new(-1.0, 5),
            Err(CohortError::InvalidParameter(_))
        ));
        assert!(matches!(
            MatchingCriteria::new(1.0, 0),
            Err(CohortError::InvalidParameter(_))
        ));
        assert!(matches!(
            MatchingCriteria::new(f64::NAN, 1),
            Err(CohortError::InvalidParameter(_))
        ));
    }

    #[test]
    fn test_age_window_is_inclusive() {
        let criteria = MatchingCriteria::new(1.0, 2).unwrap();
        assert!(criteria.is_age_match(50.0, 49.0));
        assert!(criteria.is_age_match(50.0, 51.0));
        assert!(!criteria.is_age_match(50.0, 51.5));

        let exact = MatchingCriteria::new(0.0, 1).unwrap();
        assert!(exact.is_age_match(50.0, 50.0));
        assert!(!exact.is_age_match(50.0, 50.25));
    }

    #[test]
    fn test_eligibility_requires_same_gender() {
        let criteria = MatchingCriteria::new(2.0, 1).unwrap();
        let case = Case::new("1", Gender::Male, 60.0).unwrap();
        let male = Control::new("a", Gender::Male, 61.0).unwrap();
        let female = Control::new("b", Gender::Female, 60.0).unwrap();
        assert!(criteria.is_eligible(&case, &male));
        assert!(!criteria.is_eligible(&case, &female));
        assert!(criteria.to_string_representation().contains("±2"));
    }
}
