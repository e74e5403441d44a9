//! Sequential matching implementation
//!
//! Cases are processed strictly in input order. Each case reads the current
//! allocation state, selects its controls, and commits them before the next
//! case is considered, so earlier cases always get first pick.

use indicatif::ProgressBar;
use rustc_hash::FxHashSet;
use smallvec::SmallVec;

use crate::algorithm::matching::control_data::ControlPool;
use crate::algorithm::matching::criteria::MatchingCriteria;
use crate::algorithm::matching::types::{CaseAllocation, UsedSet};
use crate::models::{Case, MatchedRecord, PersonId};

/// Eligible control with its signed age difference to the case
#[derive(Debug, Clone, Copy)]
struct Candidate {
    idx: usize,
    difference: f64,
    pool_order: usize,
}

/// Select controls for one case without modifying the allocation state
///
/// Eligible controls (same gender, inside the age window, not yet used) are
/// split by the sign of `control_age - case_age`. Controls at or above the
/// case age come first, closest first; the remainder is filled from controls
/// below the case age, closest first. Equal differences keep pool order.
///
/// # Arguments
/// * `case` - Case to serve
/// * `pool` - Age-sorted control pool
/// * `used` - Controls already allocated in this run
/// * `criteria` - Age tolerance and number of controls
///
/// # Returns
/// Pool indices in selection order, at most `num_controls` of them
#[must_use]
pub fn select_controls(
    case: &Case,
    pool: &ControlPool<'_>,
    used: &UsedSet,
    criteria: &MatchingCriteria,
) -> SmallVec<[usize; 32]> {
    let case_age = case.age();
    let (lower, upper) = criteria.age_window(case_age);
    let (start_idx, end_idx) = pool.find_age_range(lower, upper);

    let mut at_or_above = SmallVec::<[Candidate; 32]>::new();
    let mut below = SmallVec::<[Candidate; 32]>::new();

    for idx in start_idx..end_idx {
        if pool.gender(idx) != case.gender {
            continue;
        }
        if used.contains(pool.person_id(idx)) {
            continue;
        }

        let candidate = Candidate {
            idx,
            difference: pool.age(idx) - case_age,
            pool_order: pool.pool_order(idx),
        };
        if candidate.difference >= 0.0 {
            at_or_above.push(candidate);
        } else {
            below.push(candidate);
        }
    }

    // Pool order as secondary key makes the tie-break independent of the age index layout
    at_or_above.sort_by(|a, b| {
        a.difference
            .total_cmp(&b.difference)
            .then(a.pool_order.cmp(&b.pool_order))
    });
    below.sort_by(|a, b| {
        a.difference
            .abs()
            .total_cmp(&b.difference.abs())
            .then(a.pool_order.cmp(&b.pool_order))
    });

    let wanted = criteria.num_controls();
    let mut selected = SmallVec::<[usize; 32]>::new();
    let mut selected_ids: FxHashSet<&PersonId> = FxHashSet::default();

    for candidate in at_or_above.iter().chain(below.iter()) {
        if selected.len() == wanted {
            break;
        }
        // A person listed twice in the pool is still only one control
        if selected_ids.insert(pool.person_id(candidate.idx)) {
            selected.push(candidate.idx);
        }
    }

    selected
}

/// Match every case in order, committing allocations as it goes
///
/// Returns the matched records in allocation order together with one
/// allocation summary per case. Cases without eligible controls contribute
/// no records.
pub fn perform_sequential_matching(
    cases: &[Case],
    pool: &ControlPool<'_>,
    used: &mut UsedSet,
    criteria: &MatchingCriteria,
    progress: Option<&ProgressBar>,
) -> (Vec<MatchedRecord>, Vec<CaseAllocation>) {
    let mut records = Vec::with_capacity(
        cases
            .len()
            .saturating_mul(criteria.num_controls())
            .min(pool.len()),
    );
    let mut allocations = Vec::with_capacity(cases.len());

    for (case_idx, case) in cases.iter().enumerate() {
        let selected = select_controls(case, pool, used, criteria);

        for &ctrl_idx in &selected {
            let committed = used.commit(pool.person_id(ctrl_idx).clone());
            debug_assert!(committed, "control allocated twice");
            records.push(MatchedRecord::new(pool.control(ctrl_idx), case));
        }

        allocations.push(CaseAllocation {
            case_id: case.person_id.clone(),
            requested: criteria.num_controls(),
            matched: selected.len(),
        });

        if let Some(pb) = progress {
            pb.inc(1);
            if case_idx % 100 == 0 {
                pb.set_message(format!("Allocated {} controls", records.len()));
            }
        }
    }

    (records, allocations)
}
