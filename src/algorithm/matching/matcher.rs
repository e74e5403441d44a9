//! Core matching algorithm implementation
//!
//! This module implements the `Matcher` struct which orchestrates one
//! matching run: validation, pool indexing, the sequential allocation loop
//! and result assembly.

use std::time::Instant;

use log::{debug, info};

use crate::algorithm::matching::control_data::ControlPool;
use crate::algorithm::matching::criteria::MatchingCriteria;
use crate::algorithm::matching::sequential::perform_sequential_matching;
use crate::algorithm::matching::types::{MatchingResult, UsedSet};
use crate::algorithm::matching::validation::validate_records;
use crate::error::Result;
use crate::models::{Case, Control};
use crate::utils::logging::progress;

/// Matcher for allocating controls to cases
#[derive(Debug, Clone)]
pub struct Matcher {
    /// Matching criteria
    criteria: MatchingCriteria,
    /// Whether to draw a progress bar during the allocation loop
    show_progress: bool,
}

impl Matcher {
    /// Create a new matcher with the given criteria
    #[must_use]
    pub const fn new(criteria: MatchingCriteria) -> Self {
        Self {
            criteria,
            show_progress: false,
        }
    }

    /// Enable or disable the progress bar
    #[must_use]
    pub const fn with_progress(mut self, show_progress: bool) -> Self {
        self.show_progress = show_progress;
        self
    }

    /// The criteria this matcher applies
    #[must_use]
    pub const fn criteria(&self) -> &MatchingCriteria {
        &self.criteria
    }

    /// Allocate controls to cases, in case order
    ///
    /// Every call starts from an empty allocation state. A control is
    /// allocated at most once per call. Cases that cannot be fully served
    /// receive fewer controls; this is reflected in the result's
    /// allocations, never reported as an error.
    ///
    /// # Errors
    /// Returns a schema error if any record carries an unusable identifier
    /// or age. No partial result is produced in that case.
    pub fn match_all(&self, controls: &[Control], cases: &[Case]) -> Result<MatchingResult> {
        let start_time = Instant::now();

        validate_records(cases, controls)?;

        info!(
            "Matching {} cases with control pool of {} candidates",
            cases.len(),
            controls.len()
        );
        debug!("{}", self.criteria.to_string_representation());

        let pool = ControlPool::new(controls);
        let mut used = UsedSet::new();

        let pb = self.show_progress.then(|| {
            progress::create_main_progress_bar(cases.len() as u64, Some("Matching cases"))
        });

        let (records, allocations) =
            perform_sequential_matching(cases, &pool, &mut used, &self.criteria, pb.as_ref());

        if let Some(pb) = &pb {
            progress::finish_progress_bar(pb, Some("Matching complete"));
        }

        let result = MatchingResult {
            records,
            allocations,
            matching_time: start_time.elapsed(),
        };

        info!(
            "Matching complete: {} of {} cases matched with {} controls in {:.2?} \
             ({} cases short of {} controls)",
            result.matched_case_count(),
            result.case_count(),
            result.matched_control_count(),
            result.matching_time,
            result.shortfall_cases().count(),
            self.criteria.num_controls()
        );

        Ok(result)
    }
}

/// Match cases to controls with the given tolerance and controls per case
///
/// Convenience entry point equivalent to building `MatchingCriteria` and a
/// `Matcher` and calling `Matcher::match_all`.
///
/// # Arguments
/// * `controls` - Candidate control pool; its order breaks ties
/// * `cases` - Cases to serve, in priority order
/// * `age_tolerance` - Maximum absolute age difference in years
/// * `num_controls` - Controls requested per case
///
/// # Returns
/// Matched records in allocation order with a per-case allocation audit
///
/// # Errors
/// Returns `InvalidParameter` for a negative tolerance or zero
/// `num_controls`, and `Schema` for unusable records.
pub fn match_all(
    controls: &[Control],
    cases: &[Case],
    age_tolerance: f64,
    num_controls: usize,
) -> Result<MatchingResult> {
    let criteria = MatchingCriteria::new(age_tolerance, num_controls)?;
    Matcher::new(criteria).match_all(controls, cases)
}
