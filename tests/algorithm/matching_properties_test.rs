//! Property tests for the matching invariants

use std::collections::{HashMap, HashSet};

use dementia_cohort::{Case, Control, Gender, match_all};
use proptest::prelude::*;

fn gender() -> impl Strategy<Value = Gender> {
    prop_oneof![Just(Gender::Male), Just(Gender::Female)]
}

/// Ages on a quarter-year grid so that ties and exact matches are common
fn age() -> impl Strategy<Value = f64> {
    (160u32..=200).prop_map(|q| f64::from(q) / 4.0)
}

fn controls() -> impl Strategy<Value = Vec<Control>> {
    prop::collection::vec((gender(), age()), 0..60).prop_map(|rows| {
        rows.into_iter()
            .enumerate()
            .map(|(i, (g, a))| Control::new(format!("K{i}"), g, a).unwrap())
            .collect()
    })
}

fn cases() -> impl Strategy<Value = Vec<Case>> {
    prop::collection::vec((gender(), age()), 0..15).prop_map(|rows| {
        rows.into_iter()
            .enumerate()
            .map(|(i, (g, a))| Case::new(format!("C{i}"), g, a).unwrap())
            .collect()
    })
}

proptest! {
    #[test]
    fn matching_invariants_hold(
        controls in controls(),
        cases in cases(),
        tolerance in prop_oneof![Just(0.0), Just(0.5), Just(1.0), Just(3.0)],
        num_controls in 1usize..6,
    ) {
        let result = match_all(&controls, &cases, tolerance, num_controls).unwrap();
        let by_case: HashMap<_, _> = cases.iter().map(|c| (c.person_id.clone(), c)).collect();

        // No double assignment
        let mut seen = HashSet::new();
        for record in &result.records {
            prop_assert!(seen.insert(record.person_id.clone()));
        }

        // Eligibility
        for record in &result.records {
            let case = by_case[&record.matched_case_id];
            prop_assert_eq!(record.gender, case.gender);
            prop_assert!((record.age - case.condition_start_age).abs() <= tolerance);
        }

        // Cardinality bound, and allocations agree with the records
        prop_assert_eq!(result.allocations.len(), cases.len());
        for allocation in &result.allocations {
            let count = result.records_for_case(&allocation.case_id).count();
            prop_assert!(count <= num_controls);
            prop_assert_eq!(count, allocation.matched);
        }
    }

    #[test]
    fn matching_is_deterministic(
        controls in controls(),
        cases in cases(),
        num_controls in 1usize..6,
    ) {
        let first = match_all(&controls, &cases, 1.0, num_controls).unwrap();
        let second = match_all(&controls, &cases, 1.0, num_controls).unwrap();
        prop_assert_eq!(first.records, second.records);
    }

    #[test]
    fn shortfall_only_when_pool_is_exhausted(
        controls in controls(),
        cases in cases(),
        num_controls in 1usize..6,
    ) {
        let result = match_all(&controls, &cases, 1.0, num_controls).unwrap();
        let used: HashSet<_> = result.records.iter().map(|r| r.person_id.clone()).collect();

        // A short case had no unused eligible control left over at the end
        for (case, allocation) in cases.iter().zip(&result.allocations) {
            if allocation.matched < num_controls {
                let leftover = controls.iter().any(|c| {
                    c.gender == case.gender
                        && (c.age - case.condition_start_age).abs() <= 1.0
                        && !used.contains(&c.person_id)
                });
                prop_assert!(!leftover);
            }
        }
    }
}
