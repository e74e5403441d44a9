//! End-to-end tests of the study pipeline

use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};

use dementia_cohort::algorithm::model::Feature;
use dementia_cohort::report::{
    BALANCE_REPORT_FILE, CONFUSION_MATRIX_FILE, MATCHED_CONTROLS_FILE, MODEL_ACCURACY_FILE,
    MODEL_SUMMARY_FILE, PRECISION_RECALL_FILE, ROC_CURVE_FILE, STUDY_SUMMARY_FILE,
};
use dementia_cohort::{CaseSource, CohortConfig, CohortError, StudyConfig, run_study};
use tempfile::TempDir;

use crate::utils::{control_rows, write_csv};

const CASES: u32 = 40;

fn study_config(dir: &Path, controls_file: PathBuf, case_source: CaseSource) -> StudyConfig {
    StudyConfig {
        cohort: CohortConfig::builder()
            .age_cutoffs(45.0, 85.0)
            .age_tolerance(1.0)
            .num_controls(3)
            .prediction_range(3.0)
            .build()
            .unwrap(),
        controls_file,
        case_source,
        output_dir: dir.join("output"),
        categorical_features: vec![Feature::Gender],
        continuous_features: vec![Feature::AgeModel],
        seed: 42,
        test_fraction: 0.2,
        exclude_diagnosed_controls: false,
        show_progress: false,
    }
}

fn gender_of(i: u32) -> &'static str {
    if i % 2 == 0 { "F" } else { "M" }
}

/// Diagnoses and demographics for `CASES` recurrent cases plus non-cases
fn write_diagnosis_inputs(dir: &Path) -> CaseSource {
    let mut diagnoses = Vec::new();
    let mut people = Vec::new();
    for i in 1..=CASES {
        diagnoses.push(format!("{i},2015-06-01"));
        diagnoses.push(format!("{i},2015-09-01"));
        people.push(format!("{i},{},1,1,{}", 2015 - (55 + i % 24), gender_of(i)));
    }
    // Single diagnosis and a too-wide gap: diagnosed, never cases
    diagnoses.push("41,2015-06-01".to_string());
    diagnoses.push("42,2010-01-01".to_string());
    diagnoses.push("42,2015-01-01".to_string());
    people.push("41,1950,1,1,F".to_string());
    people.push("42,1951,1,1,M".to_string());

    CaseSource::Diagnoses {
        dementia_file: write_csv(dir, "dementia.csv", "person_id,condition_start_date", &diagnoses),
        demographics_file: write_csv(
            dir,
            "person.csv",
            "person_id,year_of_birth,month_of_birth,day_of_birth,gender",
            &people,
        ),
    }
}

#[test]
fn test_full_study_from_diagnoses() {
    let dir = TempDir::new().unwrap();
    let case_source = write_diagnosis_inputs(dir.path());
    let controls = write_csv(
        dir.path(),
        "controls.csv",
        "person_id,gender,age",
        &control_rows(45..=90, 4),
    );
    let config = study_config(dir.path(), controls, case_source);

    let outcome = run_study(&config).unwrap();

    assert_eq!(outcome.cases.len(), CASES as usize);
    assert_eq!(outcome.matching.matched_control_count(), 3 * CASES as usize);
    assert_eq!(outcome.matching.shortfall_cases().count(), 0);
    // Cases are matched in identifier order
    let first: Vec<&str> = outcome.cases.iter().take(3).map(|c| c.person_id.as_str()).collect();
    assert_eq!(first, vec!["1", "2", "3"]);

    let model = outcome.model();
    assert_eq!(model.train_size + model.test_size, 4 * CASES as usize);
    assert_eq!(model.test_size, 32);
    assert!((0.0..=1.0).contains(&model.accuracy));
    assert_eq!(model.summary.len(), 2);
    assert_eq!(model.summary[0].predictor, "gender");
    assert_eq!(model.summary[1].predictor, "age_model");

    let out = &config.output_dir;
    for file in [
        MODEL_ACCURACY_FILE,
        MODEL_SUMMARY_FILE,
        MATCHED_CONTROLS_FILE,
        BALANCE_REPORT_FILE,
        ROC_CURVE_FILE,
        PRECISION_RECALL_FILE,
        CONFUSION_MATRIX_FILE,
        STUDY_SUMMARY_FILE,
    ] {
        assert!(out.join(file).is_file(), "missing {file}");
    }

    let accuracy = fs::read_to_string(out.join(MODEL_ACCURACY_FILE)).unwrap();
    assert!(accuracy.starts_with("Final Model Accuracy: "));

    let matched = fs::read_to_string(out.join(MATCHED_CONTROLS_FILE)).unwrap();
    assert_eq!(matched.lines().count(), 1 + 3 * CASES as usize);

    let summary = fs::read_to_string(out.join(MODEL_SUMMARY_FILE)).unwrap();
    assert!(summary.starts_with(
        "Predictor Variable,Beta Coefficient,p-value,Odds Ratio,2.5% CI,97.5% CI"
    ));

    let json: serde_json::Value =
        serde_json::from_str(&fs::read_to_string(out.join(STUDY_SUMMARY_FILE)).unwrap()).unwrap();
    assert_eq!(json["cases_eligible"].as_u64(), Some(40));
    assert_eq!(json["matched_controls"].as_u64(), Some(120));
    assert_eq!(json["parameters"]["num_controls"].as_u64(), Some(3));
}

#[test]
fn test_diagnosed_persons_leave_the_control_pool() {
    let dir = TempDir::new().unwrap();
    let case_source = write_diagnosis_inputs(dir.path());

    // Diagnosed persons also listed as controls, at their cases' ages
    let mut rows = control_rows(45..=90, 4);
    rows.push("41,F,56".to_string());
    for i in 1..=CASES {
        rows.push(format!("{i},{},{}", gender_of(i), 55 + i % 24));
    }
    let controls = write_csv(dir.path(), "controls.csv", "person_id,gender,age", &rows);

    let mut config = study_config(dir.path(), controls, case_source);
    config.exclude_diagnosed_controls = true;
    let outcome = run_study(&config).unwrap();

    let diagnosed: HashSet<String> = (1..=42).map(|i: u32| i.to_string()).collect();
    for record in &outcome.matching.records {
        assert!(!diagnosed.contains(record.person_id.as_str()));
    }
    assert_eq!(outcome.summary.control_pool_size, 46 * 2 * 4);
}

#[test]
fn test_precomputed_cases_with_cutoffs() {
    let dir = TempDir::new().unwrap();
    let mut case_rows: Vec<String> = (0..30)
        .map(|i: u32| format!("C{i},{},{}", gender_of(i), 50 + i))
        .collect();
    // Exactly on the cutoffs: excluded
    case_rows.push("edge_low,M,45".to_string());
    case_rows.push("edge_high,F,85".to_string());
    let cases_file = write_csv(
        dir.path(),
        "cases.csv",
        "person_id,gender,condition_start_age",
        &case_rows,
    );
    let controls = write_csv(
        dir.path(),
        "controls.csv",
        "person_id,gender,age",
        &control_rows(40..=90, 3),
    );

    let config = study_config(dir.path(), controls, CaseSource::Precomputed { cases_file });
    let outcome = run_study(&config).unwrap();

    assert_eq!(outcome.summary.cases_loaded, 32);
    assert_eq!(outcome.cases.len(), 30);
    assert!(outcome.cases.iter().all(|c| !c.person_id.as_str().starts_with("edge")));
    assert_eq!(outcome.matching.matched_control_count(), 90);
}

#[test]
fn test_invalid_configuration_fails_before_io() {
    let dir = TempDir::new().unwrap();
    let mut config = study_config(
        dir.path(),
        dir.path().join("missing.csv"),
        CaseSource::Precomputed {
            cases_file: dir.path().join("missing_cases.csv"),
        },
    );
    config.test_fraction = 1.5;

    assert!(matches!(
        run_study(&config),
        Err(CohortError::InvalidParameter(_))
    ));
    assert!(!config.output_dir.exists());
}

#[test]
fn test_missing_input_file() {
    let dir = TempDir::new().unwrap();
    let config = study_config(
        dir.path(),
        dir.path().join("missing.csv"),
        CaseSource::Precomputed {
            cases_file: dir.path().join("missing_cases.csv"),
        },
    );
    assert!(matches!(run_study(&config), Err(CohortError::Io(_))));
}
