//! Tests for case filtering and control matching

use dementia_cohort::algorithm::matching::UsedSet;
use dementia_cohort::models::CONTROL_DIAGNOSIS;
use dementia_cohort::{
    CohortError, Gender, Matcher, MatchingCriteria, PersonId, filter_cases, match_all,
};

use crate::utils::{case, control, matched_ids};

#[test]
fn test_reference_scenario() {
    let cases = vec![case("1", Gender::Male, 50.0)];
    let controls = vec![
        control("A", Gender::Male, 51.0),
        control("B", Gender::Male, 50.0),
        control("C", Gender::Male, 49.0),
    ];

    let result = match_all(&controls, &cases, 1.0, 2).unwrap();

    assert_eq!(matched_ids(&result.records), vec!["B", "A"]);
    for record in &result.records {
        assert_eq!(record.diagnosis, CONTROL_DIAGNOSIS);
        assert_eq!(record.matched_case_id, PersonId::from("1"));
    }
}

#[test]
fn test_non_negative_differences_take_priority() {
    let cases = vec![case("1", Gender::Female, 60.0)];
    let controls = vec![
        control("minus2", Gender::Female, 58.0),
        control("minus1", Gender::Female, 59.0),
        control("exact", Gender::Female, 60.0),
        control("plus1", Gender::Female, 61.0),
    ];

    let result = match_all(&controls, &cases, 2.0, 2).unwrap();
    assert_eq!(matched_ids(&result.records), vec!["exact", "plus1"]);

    // With room for more, negatives follow closest-below first
    let result = match_all(&controls, &cases, 2.0, 4).unwrap();
    assert_eq!(
        matched_ids(&result.records),
        vec!["exact", "plus1", "minus1", "minus2"]
    );
}

#[test]
fn test_earlier_case_has_priority() {
    let controls = vec![
        control("A", Gender::Male, 70.0),
        control("B", Gender::Male, 70.5),
    ];
    let first = case("first", Gender::Male, 70.0);
    let second = case("second", Gender::Male, 70.2);

    let result = match_all(&controls, &[first.clone(), second.clone()], 1.0, 2).unwrap();
    assert_eq!(result.records_for_case(&first.person_id).count(), 2);
    assert_eq!(result.records_for_case(&second.person_id).count(), 0);

    // Reversing the order reverses the priority
    let result = match_all(&controls, &[second.clone(), first.clone()], 1.0, 2).unwrap();
    assert_eq!(result.records_for_case(&second.person_id).count(), 2);
    assert_eq!(result.records_for_case(&first.person_id).count(), 0);
}

#[test]
fn test_no_control_is_reused_across_cases() {
    let controls = vec![
        control("A", Gender::Female, 80.0),
        control("B", Gender::Female, 80.0),
        control("C", Gender::Female, 81.0),
    ];
    let cases = vec![
        case("1", Gender::Female, 80.0),
        case("2", Gender::Female, 80.0),
    ];

    let result = match_all(&controls, &cases, 1.0, 2).unwrap();
    assert_eq!(matched_ids(&result.records), vec!["A", "B", "C"]);

    let allocations: Vec<(usize, usize)> = result
        .allocations
        .iter()
        .map(|a| (a.requested, a.matched))
        .collect();
    assert_eq!(allocations, vec![(2, 2), (2, 1)]);
    assert_eq!(result.shortfall_cases().count(), 1);
}

#[test]
fn test_empty_pool_and_gender_mismatch_are_silent() {
    let cases = vec![case("1", Gender::Male, 65.0)];

    let result = match_all(&[], &cases, 1.0, 3).unwrap();
    assert!(result.records.is_empty());
    assert_eq!(result.allocations[0].matched, 0);

    let controls = vec![control("A", Gender::Female, 65.0)];
    let result = match_all(&controls, &cases, 1.0, 3).unwrap();
    assert!(result.records.is_empty());
}

#[test]
fn test_no_cases_gives_empty_output() {
    let controls = vec![control("A", Gender::Female, 65.0)];
    let result = match_all(&controls, &[], 1.0, 3).unwrap();
    assert!(result.records.is_empty());
    assert_eq!(result.case_count(), 0);
}

#[test]
fn test_zero_tolerance_requires_exact_age() {
    let cases = vec![case("1", Gender::Male, 72.0)];
    let controls = vec![
        control("near", Gender::Male, 72.01),
        control("exact", Gender::Male, 72.0),
    ];

    let result = match_all(&controls, &cases, 0.0, 5).unwrap();
    assert_eq!(matched_ids(&result.records), vec!["exact"]);
}

#[test]
fn test_tolerance_window_is_inclusive() {
    let cases = vec![case("1", Gender::Male, 50.0)];
    let controls = vec![
        control("low", Gender::Male, 48.0),
        control("high", Gender::Male, 52.0),
        control("outside", Gender::Male, 52.5),
    ];

    let result = match_all(&controls, &cases, 2.0, 5).unwrap();
    assert_eq!(matched_ids(&result.records), vec!["high", "low"]);
}

#[test]
fn test_runs_do_not_share_state() {
    let cases = vec![case("1", Gender::Female, 50.0)];
    let controls = vec![control("A", Gender::Female, 50.0)];
    let matcher = Matcher::new(MatchingCriteria::new(1.0, 1).unwrap());

    let first = matcher.match_all(&controls, &cases).unwrap();
    let second = matcher.match_all(&controls, &cases).unwrap();
    assert_eq!(first.records, second.records);
    assert_eq!(matched_ids(&second.records), vec!["A"]);
}

#[test]
fn test_used_set_commit() {
    let mut used = UsedSet::new();
    assert!(used.commit(PersonId::from("A")));
    assert!(!used.commit(PersonId::from("A")));
    assert!(used.contains(&PersonId::from("A")));
    assert_eq!(used.len(), 1);
}

#[test]
fn test_invalid_matching_parameters() {
    let cases = vec![case("1", Gender::Male, 50.0)];
    assert!(matches!(
        match_all(&[], &cases, -1.0, 2),
        Err(CohortError::InvalidParameter(_))
    ));
    assert!(matches!(
        match_all(&[], &cases, 1.0, 0),
        Err(CohortError::InvalidParameter(_))
    ));
    assert!(matches!(
        match_all(&[], &cases, f64::NAN, 2),
        Err(CohortError::InvalidParameter(_))
    ));
}

#[test]
fn test_filter_bounds_are_strict() {
    let cases = vec![
        case("at_lower", Gender::Male, 45.0),
        case("inside_b", Gender::Female, 70.0),
        case("inside_a", Gender::Male, 45.5),
        case("at_higher", Gender::Female, 85.0),
    ];

    let kept = filter_cases(&cases, 45.0, 85.0).unwrap();
    let ids: Vec<&str> = kept.iter().map(|c| c.person_id.as_str()).collect();
    assert_eq!(ids, vec!["inside_b", "inside_a"]);
}

#[test]
fn test_filter_rejects_malformed_range() {
    let cases = vec![case("1", Gender::Male, 50.0)];
    assert!(matches!(
        filter_cases(&cases, 85.0, 45.0),
        Err(CohortError::InvalidRange { .. })
    ));
    assert!(matches!(
        filter_cases(&cases, 50.0, 50.0),
        Err(CohortError::InvalidRange { .. })
    ));
    assert!(matches!(
        filter_cases(&cases, f64::NAN, 50.0),
        Err(CohortError::InvalidRange { .. })
    ));
}
