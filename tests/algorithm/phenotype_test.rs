//! Tests for case derivation from diagnosis events

use chrono::NaiveDate;
use dementia_cohort::algorithm::health::{derive_cases, has_dementia_phenotype};
use dementia_cohort::models::{Demographics, DiagnosisEvent};
use dementia_cohort::{Gender, PersonId};

fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

#[test]
fn test_recurrence_rule() {
    // Within a year of each other
    assert!(has_dementia_phenotype(&[date(2015, 1, 1), date(2015, 12, 31)]));
    // Exactly 365 days apart still counts
    assert!(has_dementia_phenotype(&[date(2015, 1, 1), date(2016, 1, 1)]));
    // 366 days apart does not
    assert!(!has_dementia_phenotype(&[date(2016, 1, 1), date(2017, 1, 1)]));
    // A repeated record of the same date is a single diagnosis
    assert!(!has_dementia_phenotype(&[date(2015, 5, 5), date(2015, 5, 5)]));
    // Any consecutive pair may satisfy the rule
    assert!(has_dementia_phenotype(&[
        date(2020, 6, 1),
        date(2010, 1, 1),
        date(2020, 1, 1),
    ]));
}

#[test]
fn test_derive_cases_end_to_end() {
    let events = vec![
        // Recurrent: onset 2015-03-01
        DiagnosisEvent::new("20", date(2015, 9, 1)),
        DiagnosisEvent::new("20", date(2015, 3, 1)),
        // Single diagnosis: not a case, but diagnosed
        DiagnosisEvent::new("5", date(2014, 1, 1)),
        // Recurrent: onset 2012-07-15
        DiagnosisEvent::new("3", date(2012, 7, 15)),
        DiagnosisEvent::new("3", date(2012, 8, 15)),
        // Recurrent but absent from demographics
        DiagnosisEvent::new("99", date(2012, 1, 1)),
        DiagnosisEvent::new("99", date(2012, 2, 1)),
    ];
    let demographics = vec![
        Demographics::new("20", date(1940, 3, 2), Gender::Female),
        Demographics::new("3", date(1935, 7, 15), Gender::Male),
        Demographics::new("5", date(1950, 1, 1), Gender::Male),
    ];

    let derivation = derive_cases(&events, &demographics).unwrap();

    let ids: Vec<&str> = derivation.cases.iter().map(|c| c.person_id.as_str()).collect();
    assert_eq!(ids, vec!["3", "20"]);

    // 28,125 days / 365.24 = 77.004
    assert_eq!(derivation.cases[0].condition_start_age, 77.0);
    assert_eq!(derivation.cases[0].gender, Gender::Male);
    // One day short of the 75th birthday
    assert_eq!(derivation.cases[1].condition_start_age, 74.0);

    assert_eq!(derivation.diagnosed_ids.len(), 4);
    assert!(derivation.diagnosed_ids.contains(&PersonId::from("5")));
}
