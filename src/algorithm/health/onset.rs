//! Case derivation from diagnosis events and demographics
//!
//! Phenotype-positive persons are joined with their demographic record and
//! turned into cases whose onset age is the whole number of years between
//! birth and first diagnosis.

use chrono::NaiveDate;
use log::{info, warn};
use rustc_hash::{FxHashMap, FxHashSet};

use crate::algorithm::health::phenotype::detect_phenotype;
use crate::error::Result;
use crate::models::{Case, Demographics, DiagnosisEvent, PersonId};

/// Mean length of a year used for age computation
pub const DAYS_PER_YEAR: f64 = 365.24;

/// Whole years between two dates, `floor(days / 365.24)`
///
/// Over long spans the 365.24-day year runs slightly short of the calendar,
/// so the age can increase a day before the birthday.
///
/// # Arguments
/// * `birth_date` - Date of birth
/// * `at` - Date at which the age is taken
///
/// # Returns
/// The floored age in years
#[must_use]
pub fn age_in_years(birth_date: NaiveDate, at: NaiveDate) -> f64 {
    let days = (at - birth_date).num_days() as f64;
    (days / DAYS_PER_YEAR).floor()
}

/// Cases derived from diagnosis data
#[derive(Debug, Clone, Default)]
pub struct CaseDerivation {
    /// Phenotype-positive cases ordered by identifier
    pub cases: Vec<Case>,
    /// Everyone with at least one dementia diagnosis record
    pub diagnosed_ids: FxHashSet<PersonId>,
}

/// Derive cases with onset ages from raw diagnosis events
///
/// Only persons meeting the recurrence rule and present in the demographics
/// become cases. Persons whose first diagnosis predates their birth date are
/// skipped with a warning.
///
/// # Arguments
/// * `events` - Dementia diagnosis events, one per diagnosis record
/// * `demographics` - Birth date and gender per person
///
/// # Returns
/// Cases ordered by identifier, plus every identifier with a diagnosis
pub fn derive_cases(
    events: &[DiagnosisEvent],
    demographics: &[Demographics],
) -> Result<CaseDerivation> {
    let diagnosed_ids: FxHashSet<PersonId> =
        events.iter().map(|e| e.person_id.clone()).collect();

    let mut by_person: FxHashMap<&PersonId, &Demographics> = FxHashMap::default();
    for record in demographics {
        if by_person.insert(&record.person_id, record).is_some() {
            warn!(
                "Duplicate demographic record for person {}, keeping the last one",
                record.person_id
            );
        }
    }

    let onsets = detect_phenotype(events);
    let mut cases = Vec::with_capacity(onsets.len());
    let mut without_demographics = 0usize;

    for onset in onsets {
        let Some(record) = by_person.get(&onset.person_id) else {
            without_demographics += 1;
            continue;
        };

        if onset.onset_date < record.birth_date {
            warn!(
                "Person {}: first diagnosis {} precedes birth date {}, skipping",
                onset.person_id, onset.onset_date, record.birth_date
            );
            continue;
        }

        let age = age_in_years(record.birth_date, onset.onset_date);
        cases.push(Case::new(onset.person_id, record.gender, age)?);
    }

    if without_demographics > 0 {
        warn!("{without_demographics} phenotype-positive persons have no demographic record");
    }

    info!(
        "Derived {} dementia cases from {} diagnosed persons",
        cases.len(),
        diagnosed_ids.len()
    );

    Ok(CaseDerivation {
        cases,
        diagnosed_ids,
    })
}
