//! Dementia phenotype detection
//!
//! A person has the phenotype when the diagnosis recurs: two distinct
//! diagnosis dates no more than twelve months apart.

use chrono::{Duration, NaiveDate};
use itertools::Itertools;
use log::debug;
use rayon::prelude::*;
use rustc_hash::FxHashMap;

use crate::models::{DiagnosisEvent, PersonId};

/// Maximum gap between two diagnoses for the phenotype to hold
pub const RECURRENCE_WINDOW_DAYS: i64 = 365;

/// Check whether a set of diagnosis dates meets the recurrence rule
///
/// Dates may be unsorted and contain duplicates; repeated records of the
/// same date count once.
#[must_use]
pub fn has_dementia_phenotype(dates: &[NaiveDate]) -> bool {
    let window = Duration::days(RECURRENCE_WINDOW_DAYS);
    dates
        .iter()
        .sorted()
        .dedup()
        .tuple_windows()
        .any(|(earlier, later)| *later <= *earlier + window)
}

/// Phenotype-positive person with the date of their first diagnosis
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PhenotypeOnset {
    /// Individual meeting the phenotype
    pub person_id: PersonId,
    /// Earliest recorded diagnosis date
    pub onset_date: NaiveDate,
}

/// Find every phenotype-positive person, ordered by identifier
pub fn detect_phenotype(events: &[DiagnosisEvent]) -> Vec<PhenotypeOnset> {
    let mut by_person: FxHashMap<&PersonId, Vec<NaiveDate>> = FxHashMap::default();
    for event in events {
        by_person
            .entry(&event.person_id)
            .or_default()
            .push(event.condition_start_date);
    }

    let mut onsets: Vec<PhenotypeOnset> = by_person
        .into_par_iter()
        .filter(|(_, dates)| has_dementia_phenotype(dates))
        .filter_map(|(person_id, dates)| {
            dates.iter().min().map(|&onset_date| PhenotypeOnset {
                person_id: person_id.clone(),
                onset_date,
            })
        })
        .collect();

    onsets.sort_by(|a, b| a.person_id.cmp(&b.person_id));

    debug!(
        "{} of {} diagnosed persons meet the recurrence rule",
        onsets.len(),
        events.iter().map(|e| &e.person_id).unique().count()
    );

    onsets
}
