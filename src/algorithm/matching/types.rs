//! Type definitions for the matching algorithm
//!
//! This module contains the allocation state and the result types shared by
//! the matching stages.

use std::time::Duration;

use rustc_hash::FxHashSet;
use serde::Serialize;

use crate::models::{MatchedRecord, PersonId};

/// Identifiers of controls already allocated during one matching run
///
/// The set only grows. Each run owns its own set, so independent runs in the
/// same process never see each other's allocations.
#[derive(Debug, Default, Clone)]
pub struct UsedSet {
    ids: FxHashSet<PersonId>,
}

impl UsedSet {
    /// Create an empty set
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Check whether a control has already been allocated
    #[must_use]
    pub fn contains(&self, person_id: &PersonId) -> bool {
        self.ids.contains(person_id)
    }

    /// Record a control as allocated; returns `false` if it already was
    pub fn commit(&mut self, person_id: PersonId) -> bool {
        self.ids.insert(person_id)
    }

    /// Number of allocated controls
    #[must_use]
    pub fn len(&self) -> usize {
        self.ids.len()
    }

    /// Check if nothing has been allocated yet
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }
}

/// Outcome of matching a single case
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CaseAllocation {
    /// Case identifier
    pub case_id: PersonId,
    /// Controls requested for the case
    pub requested: usize,
    /// Controls actually allocated
    pub matched: usize,
}

impl CaseAllocation {
    /// Number of missing controls (zero when fully matched)
    #[must_use]
    pub const fn shortfall(&self) -> usize {
        self.requested.saturating_sub(self.matched)
    }
}

/// Result of the matching process
#[derive(Debug, Clone)]
pub struct MatchingResult {
    /// Matched controls in allocation order (case order, then priority order)
    pub records: Vec<MatchedRecord>,
    /// One entry per input case, in case order
    pub allocations: Vec<CaseAllocation>,
    /// Time taken for matching
    pub matching_time: Duration,
}

impl MatchingResult {
    /// Number of cases considered
    #[must_use]
    pub fn case_count(&self) -> usize {
        self.allocations.len()
    }

    /// Number of cases that received at least one control
    #[must_use]
    pub fn matched_case_count(&self) -> usize {
        self.allocations.iter().filter(|a| a.matched > 0).count()
    }

    /// Number of controls allocated
    #[must_use]
    pub fn matched_control_count(&self) -> usize {
        self.records.len()
    }

    /// Cases that received fewer controls than requested
    pub fn shortfall_cases(&self) -> impl Iterator<Item = &CaseAllocation> {
        self.allocations.iter().filter(|a| a.shortfall() > 0)
    }

    /// Matched records allocated to one case
    pub fn records_for_case<'a>(
        &'a self,
        case_id: &'a PersonId,
    ) -> impl Iterator<Item = &'a MatchedRecord> + 'a {
        self.records
            .iter()
            .filter(move |r| &r.matched_case_id == case_id)
    }

    /// Consume the result, keeping only the flat record collection
    #[must_use]
    pub fn into_records(self) -> Vec<MatchedRecord> {
        self.records
    }
}
