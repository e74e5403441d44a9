//! Case selection by onset age
//!
//! Only cases whose onset age lies strictly inside the study window take
//! part in matching. The filter preserves input order, which is the priority
//! order used by the matcher.

use crate::config::validate_cutoffs;
use crate::error::Result;
use crate::models::Case;

/// Keep cases with `lower < condition_start_age < higher`, in input order
///
/// # Arguments
/// * `cases` - Cases with onset ages
/// * `lower` - Exclusive lower age cutoff
/// * `higher` - Exclusive upper age cutoff
///
/// # Returns
/// The cases strictly inside the cutoffs
///
/// # Errors
/// Returns `InvalidRange` if `lower >= higher` or either bound is not finite.
pub fn filter_cases(cases: &[Case], lower: f64, higher: f64) -> Result<Vec<Case>> {
    validate_cutoffs(lower, higher)?;

    Ok(cases
        .iter()
        .filter(|case| is_within_cutoffs(case.age(), lower, higher))
        .cloned()
        .collect())
}

/// Strict membership in the open interval `(lower, higher)`
#[must_use]
pub fn is_within_cutoffs(age: f64, lower: f64, higher: f64) -> bool {
    age > lower && age < higher
}
